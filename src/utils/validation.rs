use crate::utils::error::{DashboardError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> DashboardError {
    DashboardError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Absolute http(s) URL.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// Every entry of `values` must be one of `allowed`.
pub fn validate_choices(field_name: &str, values: &[String], allowed: &[&str]) -> Result<()> {
    match values.iter().find(|v| !allowed.contains(&v.as_str())) {
        Some(value) => Err(invalid(
            field_name,
            value,
            format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DashboardError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.api_base", "https://sheets.googleapis.com").is_ok());
        assert!(validate_url("source.api_base", "http://localhost:8080").is_ok());
        assert!(validate_url("source.api_base", "").is_err());
        assert!(validate_url("source.api_base", "invalid-url").is_err());
        assert!(validate_url("source.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("refresh.interval_seconds", 60, 1).is_ok());
        assert!(validate_positive_number("refresh.interval_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_choices() {
        let formats = vec!["xlsx".to_string(), "csv".to_string()];
        assert!(validate_choices("load.output_formats", &formats, &["xlsx", "csv", "json"]).is_ok());

        let invalid = vec!["pdf".to_string()];
        assert!(validate_choices("load.output_formats", &invalid, &["xlsx", "csv", "json"]).is_err());
    }

    #[test]
    fn test_validate_required_and_non_empty() {
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("source.path", &missing),
            Err(DashboardError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_string("source.worksheet", "   ").is_err());
        assert!(validate_range("source.timeout_seconds", 30, 1, 300).is_ok());
        assert!(validate_range("source.timeout_seconds", 0, 1, 300).is_err());
    }
}
