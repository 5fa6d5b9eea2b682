use std::collections::BTreeMap;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

/// Messages keyed by form field name.
pub type FieldMessages = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid coordinates: {0}")]
    Validation(String),

    #[error("Invalid fields: {}", join_fields(.0))]
    FieldValidation(FieldMessages),

    #[error("Weather API request failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Cannot compute a mean temperature over zero stations")]
    EmptyAggregate,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of the outbound call to the weather API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WeatherError {
    /// True for errors caused by user input rather than the server side.
    pub fn is_validation(&self) -> bool {
        matches!(self, WeatherError::Validation(_) | WeatherError::FieldValidation(_))
    }
}

fn join_fields(fields: &FieldMessages) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_validation_message_lists_every_field() {
        let mut fields = FieldMessages::new();
        fields.insert("lat_top".into(), vec!["too large".into()]);
        fields.insert("lon_left".into(), vec!["not a number".into()]);

        let msg = WeatherError::FieldValidation(fields).to_string();
        assert_eq!(msg, "Invalid fields: lat_top: too large, lon_left: not a number");
    }

    #[test]
    fn only_input_errors_count_as_validation() {
        assert!(WeatherError::Validation("x".into()).is_validation());
        assert!(WeatherError::FieldValidation(FieldMessages::new()).is_validation());
        assert!(!WeatherError::EmptyAggregate.is_validation());
        assert!(!WeatherError::Config("x".into()).is_validation());
    }
}
