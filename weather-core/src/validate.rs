//! Parsing and range checks for coordinates typed into the forms.

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::{
    config::PointPolicy,
    error::{FieldMessages, Result, WeatherError},
    model::{BoundingBox, Coordinate},
};

/// Parse one axis value. Rejects anything that is not a finite number.
pub fn parse_axis(raw: &str) -> std::result::Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("value is required".to_string());
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("'{trimmed}' is not a finite number")),
        Err(_) => Err(format!("'{trimmed}' is not a number")),
    }
}

/// Parse the single-point form value `"<lat> <lon>"`.
///
/// The two numbers are separated by whitespace or by one comma between them.
pub fn parse_point(raw: &str, policy: PointPolicy) -> Result<Coordinate> {
    let parts: Vec<&str> = match raw.split_once(',') {
        Some((lat, lon)) => vec![lat.trim(), lon.trim()],
        None => raw.split_whitespace().collect(),
    };

    let malformed = |part: &&str| {
        part.is_empty() || part.contains(|c: char| c == ',' || c.is_whitespace())
    };
    if parts.len() != 2 || parts.iter().any(malformed) {
        debug!(input = raw, "rejecting point input with wrong shape");
        return Err(WeatherError::Validation(
            "expected a latitude and a longitude, e.g. \"48.85 2.35\"".to_string(),
        ));
    }

    let latitude =
        parse_axis(parts[0]).map_err(|m| WeatherError::Validation(format!("latitude: {m}")))?;
    let longitude =
        parse_axis(parts[1]).map_err(|m| WeatherError::Validation(format!("longitude: {m}")))?;

    check_point(Coordinate::new(latitude, longitude), policy)
}

/// Apply the configured range policy to an already parsed coordinate.
pub fn check_point(coordinate: Coordinate, policy: PointPolicy) -> Result<Coordinate> {
    match policy {
        PointPolicy::Strict => {
            if !coordinate.latitude.is_finite() || !coordinate.longitude.is_finite() {
                return Err(WeatherError::Validation(
                    "coordinates must be finite numbers".to_string(),
                ));
            }
            coordinate.validate().map_err(|errors| {
                debug!(%coordinate, "rejecting out-of-range point");
                WeatherError::Validation(flatten_messages(&field_messages(&errors)))
            })?;
        }
        PointPolicy::Legacy => {
            let Coordinate { latitude, longitude } = coordinate;
            if (-80.0 < latitude && latitude < 80.0) || (-180.0 < longitude && longitude < 180.0) {
                debug!(%coordinate, "rejecting point under legacy policy");
                return Err(WeatherError::Validation(
                    "coordinates rejected by legacy range check".to_string(),
                ));
            }
        }
    }

    Ok(coordinate)
}

/// Raw bounding-box form, one string per corner axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxForm {
    pub lat_bottom: String,
    pub lon_left: String,
    pub lat_top: String,
    pub lon_right: String,
}

impl BoxForm {
    pub fn new(lat_bottom: &str, lon_left: &str, lat_top: &str, lon_right: &str) -> Self {
        Self {
            lat_bottom: lat_bottom.to_string(),
            lon_left: lon_left.to_string(),
            lat_top: lat_top.to_string(),
            lon_right: lon_right.to_string(),
        }
    }
}

/// Parsed box fields. A field that failed to parse is `None` and already
/// has its own message, so range checks skip it.
#[derive(Debug, Validate)]
struct BoxFields {
    #[validate(range(
        exclusive_min = -80.0,
        exclusive_max = 80.0,
        message = "bottom latitude must be strictly between -80 and 80"
    ))]
    lat_bottom: Option<f64>,

    #[validate(range(
        exclusive_min = -180.0,
        exclusive_max = 180.0,
        message = "left longitude must be strictly between -180 and 180"
    ))]
    lon_left: Option<f64>,

    #[validate(range(
        exclusive_min = -80.0,
        exclusive_max = 80.0,
        message = "top latitude must be strictly between -80 and 80"
    ))]
    lat_top: Option<f64>,

    #[validate(range(
        exclusive_min = -180.0,
        exclusive_max = 180.0,
        message = "right longitude must be strictly between -180 and 180"
    ))]
    lon_right: Option<f64>,
}

/// Validate the four box fields independently and collect every failure.
pub fn parse_box(form: &BoxForm) -> Result<BoundingBox> {
    let mut messages = FieldMessages::new();
    let mut parse = |name: &str, raw: &str| match parse_axis(raw) {
        Ok(value) => Some(value),
        Err(message) => {
            messages.entry(name.to_string()).or_default().push(message);
            None
        }
    };

    let fields = BoxFields {
        lat_bottom: parse("lat_bottom", &form.lat_bottom),
        lon_left: parse("lon_left", &form.lon_left),
        lat_top: parse("lat_top", &form.lat_top),
        lon_right: parse("lon_right", &form.lon_right),
    };

    if let Err(errors) = fields.validate() {
        for (field, field_msgs) in field_messages(&errors) {
            messages.entry(field).or_default().extend(field_msgs);
        }
    }

    match fields {
        BoxFields {
            lat_bottom: Some(lat_bottom),
            lon_left: Some(lon_left),
            lat_top: Some(lat_top),
            lon_right: Some(lon_right),
        } if messages.is_empty() => Ok(BoundingBox::new(
            Coordinate::new(lat_bottom, lon_left),
            Coordinate::new(lat_top, lon_right),
        )),
        _ => {
            debug!(fields = messages.len(), "rejecting bounding box form");
            Err(WeatherError::FieldValidation(messages))
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> FieldMessages {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let msgs = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), msgs)
        })
        .collect()
}

fn flatten_messages(messages: &FieldMessages) -> String {
    messages.values().flatten().cloned().collect::<Vec<_>>().join("; ")
}
