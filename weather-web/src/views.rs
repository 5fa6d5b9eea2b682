//! Server-rendered pages, backed by the handlebars templates in `templates/`.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use weather_core::{BoxForm, BoxReport, FieldMessages, PointReport};

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("point_form", include_str!("../templates/point_form.hbs")),
    ("point_result", include_str!("../templates/point_result.hbs")),
    ("box_form", include_str!("../templates/box_form.hbs")),
    ("box_result", include_str!("../templates/box_result.hbs")),
    ("echo_form", include_str!("../templates/echo_form.hbs")),
    ("echo_result", include_str!("../templates/echo_result.hbs")),
    ("error", include_str!("../templates/error.hbs")),
];

#[derive(Serialize)]
struct TemplateContext<'a, T: Serialize> {
    title: &'a str,
    body: T,
}

#[derive(Serialize)]
struct PointView<'a> {
    station: &'a str,
    temperature: String,
    observed_at: Option<String>,
}

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    errors: &'a [String],
}

impl<'a> FieldView<'a> {
    fn new(
        name: &'static str,
        label: &'static str,
        value: &'a str,
        errors: &'a FieldMessages,
    ) -> Self {
        Self {
            name,
            label,
            value,
            errors: errors.get(name).map(Vec::as_slice).unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct BoxFormView<'a> {
    fields: Vec<FieldView<'a>>,
}

#[derive(Serialize)]
struct StationRow<'a> {
    name: &'a str,
    temperature: String,
}

#[derive(Serialize)]
struct BoxResultView<'a> {
    stations: Vec<StationRow<'a>>,
    mean: String,
}

#[derive(Serialize)]
struct EchoView<'a> {
    data: &'a str,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    message: &'a str,
}

/// Template registry, built once at startup and shared by the handlers.
#[derive(Debug)]
pub struct Views {
    hbs: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut hbs = Handlebars::new();
        for (name, source) in PARTIALS {
            hbs.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            hbs.register_template_string(name, *source)?;
        }
        Ok(Self { hbs })
    }

    fn render<T>(&self, template: &str, title: &str, body: T) -> Result<String, RenderError>
    where
        T: Serialize,
    {
        self.hbs.render(template, &TemplateContext { title, body })
    }

    pub fn point_form(&self) -> Result<String, RenderError> {
        self.render("point_form", "Weather by coordinates", ())
    }

    pub fn point_result(&self, report: &PointReport) -> Result<String, RenderError> {
        let body = PointView {
            station: &report.station,
            temperature: report.temperature_display(),
            observed_at: report
                .observed_at
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string()),
        };
        self.render("point_result", "Current weather", body)
    }

    /// The area form, refilled with `form` and annotated with `errors`.
    pub fn box_form(&self, form: &BoxForm, errors: &FieldMessages) -> Result<String, RenderError> {
        let body = BoxFormView {
            fields: vec![
                FieldView::new("lat_bottom", "Bottom latitude", &form.lat_bottom, errors),
                FieldView::new("lon_left", "Left longitude", &form.lon_left, errors),
                FieldView::new("lat_top", "Top latitude", &form.lat_top, errors),
                FieldView::new("lon_right", "Right longitude", &form.lon_right, errors),
            ],
        };
        self.render("box_form", "Weather in an area", body)
    }

    pub fn box_result(&self, report: &BoxReport) -> Result<String, RenderError> {
        let body = BoxResultView {
            stations: report
                .stations
                .iter()
                .map(|(name, kelvin)| StationRow {
                    name,
                    temperature: format!("{kelvin:.1}"),
                })
                .collect(),
            mean: report.mean.to_string(),
        };
        self.render("box_result", "Weather in an area", body)
    }

    pub fn echo_form(&self) -> Result<String, RenderError> {
        self.render("echo_form", "Echo", ())
    }

    pub fn echo_result(&self, data: &str) -> Result<String, RenderError> {
        self.render("echo_result", "Echo", EchoView { data })
    }

    pub fn error_page(&self, message: &str) -> Result<String, RenderError> {
        self.render("error", "Something went wrong", ErrorView { message })
    }
}
