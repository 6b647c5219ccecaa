use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl RelayError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            RelayError::HttpClientError(_) => "Could not build the HTTP probe client".to_string(),
            RelayError::IoError(e) => format!("File or network operation failed: {}", e),
            RelayError::ConfigError { message } => format!("Configuration problem: {}", message),
            RelayError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            RelayError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RelayError::HttpClientError(_) => "Check the TLS setup of the host",
            RelayError::IoError(_) => "Check that the port is free and the config file is readable",
            RelayError::ConfigError { .. } => "Check the TOML syntax of the config file",
            RelayError::InvalidConfigValueError { .. } | RelayError::MissingConfigError { .. } => {
                "Fix the value in the config file or the matching environment variable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_message_names_field() {
        let err = RelayError::InvalidConfigValueError {
            field: "rate_limit.max_requests".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };

        assert!(err.to_string().contains("rate_limit.max_requests"));
        assert!(err.user_friendly_message().contains("Value must be at least 1"));
    }
}
