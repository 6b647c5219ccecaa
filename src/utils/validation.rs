use crate::utils::error::{RelayError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RelayError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Accepts `*` or an absolute http(s) origin without path.
pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    if origin == "*" {
        return Ok(());
    }
    validate_url(field_name, origin)?;

    let trimmed = origin.trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if url.path() == "/" && url.query().is_none() => Ok(()),
        _ => Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin must not carry a path or query".to_string(),
        }),
    }
}

pub fn validate_positive_number<T>(field_name: &str, value: T, min_value: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min_value {
        return Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RelayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("services.HOME", "https://example.com").is_ok());
        assert!(validate_url("services.HOME", "http://example.com").is_ok());
        assert!(validate_url("services.HOME", "").is_err());
        assert!(validate_url("services.HOME", "invalid-url").is_err());
        assert!(validate_url("services.HOME", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_origin() {
        assert!(validate_origin("allowed_origins", "*").is_ok());
        assert!(validate_origin("allowed_origins", "https://app.example.com").is_ok());
        assert!(validate_origin("allowed_origins", "https://app.example.com/page").is_err());
        assert!(validate_origin("allowed_origins", "app.example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("rate_limit.max_requests", 20u32, 1).is_ok());
        assert!(validate_positive_number("rate_limit.max_requests", 0u32, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("api_key", "secret").is_ok());
        assert!(validate_non_empty_string("api_key", "   ").is_err());
    }
}
