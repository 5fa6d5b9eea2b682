//! HTTP front-end: forms, lookups and the echo page.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use handlebars::RenderError;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use weather_core::{
    BoxForm, FieldMessages, PointPolicy, WeatherError, WeatherProvider, lookup_box, lookup_point,
    parse_box, parse_point,
};

use crate::views::Views;

/// Application context handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub point_policy: PointPolicy,
    pub views: Arc<Views>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataForm {
    pub data: String,
}

fn page(status: StatusCode, rendered: Result<String, RenderError>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// Error page with the status matching the failure kind.
fn failure(views: &Views, err: WeatherError) -> Response {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %err, "request aborted");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    page(status, views.error_page(&err.to_string()))
}

/// GET / and GET /index
async fn point_form(State(state): State<AppState>) -> Response {
    page(StatusCode::OK, state.views.point_form())
}

/// POST /index
async fn point_lookup(State(state): State<AppState>, Form(form): Form<DataForm>) -> Response {
    let report = match parse_point(&form.data, state.point_policy) {
        Ok(at) => lookup_point(state.provider.as_ref(), at).await,
        Err(err) => Err(err),
    };

    match report {
        Ok(report) => page(StatusCode::OK, state.views.point_result(&report)),
        Err(err) => failure(&state.views, err),
    }
}

/// GET /box
async fn box_form(State(state): State<AppState>) -> Response {
    page(StatusCode::OK, state.views.box_form(&BoxForm::default(), &FieldMessages::new()))
}

/// POST /box
async fn box_lookup(State(state): State<AppState>, Form(form): Form<BoxForm>) -> Response {
    let area = match parse_box(&form) {
        Ok(area) => area,
        Err(WeatherError::FieldValidation(errors)) => {
            return page(StatusCode::UNPROCESSABLE_ENTITY, state.views.box_form(&form, &errors));
        }
        Err(other) => return failure(&state.views, other),
    };

    match lookup_box(state.provider.as_ref(), area).await {
        Ok(report) => page(StatusCode::OK, state.views.box_result(&report)),
        Err(err) => failure(&state.views, err),
    }
}

/// GET /send
async fn echo_form(State(state): State<AppState>) -> Response {
    page(StatusCode::OK, state.views.echo_form())
}

/// POST /send
async fn echo(State(state): State<AppState>, Form(form): Form<DataForm>) -> Response {
    page(StatusCode::OK, state.views.echo_result(&form.data))
}

/// GET /health
async fn health_check() -> &'static str {
    "ok"
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(point_form))
        .route("/index", get(point_form).post(point_lookup))
        .route("/box", get(box_form).post(box_lookup))
        .route("/send", get(echo_form).post(echo))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until the process is stopped.
pub async fn run_http_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use weather_core::{BoundingBox, Coordinate, StationReading, UpstreamError};

    /// Returns canned readings and remembers what it was asked for.
    #[derive(Debug, Default)]
    struct FakeProvider {
        readings: Vec<StationReading>,
        fail: bool,
        points: Mutex<Vec<Coordinate>>,
        areas: Mutex<Vec<BoundingBox>>,
    }

    impl FakeProvider {
        fn with(readings: &[(&str, f64)]) -> Self {
            Self {
                readings: readings
                    .iter()
                    .map(|(station, kelvin)| StationReading {
                        station: station.to_string(),
                        kelvin: *kelvin,
                        observed_at: None,
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn upstream_error() -> WeatherError {
            WeatherError::Upstream(UpstreamError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream down".into(),
            })
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_at(&self, at: Coordinate) -> weather_core::Result<StationReading> {
            self.points.lock().unwrap().push(at);
            if self.fail {
                return Err(Self::upstream_error());
            }
            Ok(self.readings[0].clone())
        }

        async fn stations_in(
            &self,
            area: BoundingBox,
        ) -> weather_core::Result<Vec<StationReading>> {
            self.areas.lock().unwrap().push(area);
            if self.fail {
                return Err(Self::upstream_error());
            }
            Ok(self.readings.clone())
        }
    }

    async fn spawn_app(provider: Arc<FakeProvider>, point_policy: PointPolicy) -> String {
        let state = AppState {
            provider,
            point_policy,
            views: Arc::new(Views::new().unwrap()),
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn post(url: String, form: &[(&str, &str)]) -> (StatusCode, String) {
        let res = reqwest::Client::new().post(url).form(form).send().await.unwrap();
        let status = res.status();
        (status, res.text().await.unwrap())
    }

    #[tokio::test]
    async fn index_serves_point_form() {
        let base = spawn_app(Arc::new(FakeProvider::default()), PointPolicy::Strict).await;

        for path in ["/", "/index"] {
            let res = reqwest::get(format!("{base}{path}")).await.unwrap();
            assert!(res.status().is_success());
            assert!(res.text().await.unwrap().contains("name=\"data\""));
        }
    }

    #[tokio::test]
    async fn point_lookup_renders_celsius() {
        let provider = Arc::new(FakeProvider::with(&[("Paris", 295.15)]));
        let base = spawn_app(provider.clone(), PointPolicy::Strict).await;

        let (status, body) = post(format!("{base}/index"), &[("data", "48.85 2.35")]).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Paris"));
        assert!(body.contains("23.0 &deg;C"));
        assert_eq!(*provider.points.lock().unwrap(), vec![Coordinate::new(48.85, 2.35)]);
    }

    #[tokio::test]
    async fn invalid_point_is_rejected_without_calling_api() {
        let provider = Arc::new(FakeProvider::with(&[("Paris", 295.15)]));
        let base = spawn_app(provider.clone(), PointPolicy::Strict).await;

        for data in ["", "abc", "80 10", "10 -180"] {
            let (status, body) = post(format!("{base}/index"), &[("data", data)]).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{data:?}");
            assert!(body.contains("Something went wrong"));
        }
        assert!(provider.points.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_policy_rejects_ordinary_points() {
        let provider = Arc::new(FakeProvider::with(&[("Paris", 295.15)]));
        let base = spawn_app(provider.clone(), PointPolicy::Legacy).await;

        let (status, _) = post(format!("{base}/index"), &[("data", "48.85 2.35")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(provider.points.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_server_error() {
        let base = spawn_app(Arc::new(FakeProvider::failing()), PointPolicy::Strict).await;

        let (status, body) = post(format!("{base}/index"), &[("data", "48.85 2.35")]).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Weather API request failed"));

        let (status, _) = post(
            format!("{base}/box"),
            &[("lat_bottom", "32"), ("lon_left", "12"), ("lat_top", "37"), ("lon_right", "15")],
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn box_lookup_renders_stations_and_mean() {
        let provider = Arc::new(FakeProvider::with(&[("A", 300.0), ("B", 310.0)]));
        let base = spawn_app(provider.clone(), PointPolicy::Strict).await;

        let (status, body) = post(
            format!("{base}/box"),
            &[("lat_bottom", "32"), ("lon_left", "12"), ("lat_top", "37"), ("lon_right", "15")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<td>A</td><td>300.0 K</td>"));
        assert!(body.contains("<td>B</td><td>310.0 K</td>"));
        assert!(body.contains("305.0 K"));
        assert_eq!(
            *provider.areas.lock().unwrap(),
            vec![BoundingBox::new(Coordinate::new(32.0, 12.0), Coordinate::new(37.0, 15.0))]
        );
    }

    #[tokio::test]
    async fn box_field_errors_rerender_form() {
        let provider = Arc::new(FakeProvider::with(&[("A", 300.0)]));
        let base = spawn_app(provider.clone(), PointPolicy::Strict).await;

        let (status, body) = post(
            format!("{base}/box"),
            &[("lat_bottom", "-80"), ("lon_left", "12"), ("lat_top", "37"), ("lon_right", "east")],
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("bottom latitude must be strictly between -80 and 80"));
        assert!(body.contains("&#x27;east&#x27; is not a number"));
        assert!(body.contains("name=\"lat_top\" value=\"37\""));
        assert!(provider.areas.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn box_without_stations_is_server_error() {
        let base = spawn_app(Arc::new(FakeProvider::with(&[])), PointPolicy::Strict).await;

        let (status, body) = post(
            format!("{base}/box"),
            &[("lat_bottom", "32"), ("lon_left", "12"), ("lat_top", "37"), ("lon_right", "15")],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("zero stations"));
    }

    #[tokio::test]
    async fn echo_returns_data_unmodified() {
        let provider = Arc::new(FakeProvider::default());
        let base = spawn_app(provider.clone(), PointPolicy::Strict).await;

        let (status, body) = post(format!("{base}/send"), &[("data", "48.85,2.35")]).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("48.85,2.35"));
        assert!(provider.points.lock().unwrap().is_empty());
    }

    #[test]
    fn render_failure_falls_back_to_plain_500() {
        let err = RenderError::from(handlebars::RenderErrorReason::Other("broken".into()));
        let res = page(StatusCode::OK, Err(err));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let base = spawn_app(Arc::new(FakeProvider::default()), PointPolicy::Strict).await;
        let body = reqwest::get(format!("{base}/health")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }
}
