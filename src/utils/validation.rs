use crate::utils::error::{FieldErrors, Result, TheaterError};
use std::net::SocketAddr;
use url::Url;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_database_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TheaterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            scheme => Err(TheaterError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported database scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TheaterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_bind_address(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse::<SocketAddr>()
        .map_err(|e| TheaterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(TheaterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(TheaterError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Valid values: {}", allowed.join(", ")),
    })
}

// 以下為請求欄位檢查：錯誤寫入 FieldErrors，回傳通過檢查的值

pub fn require<T>(errors: &mut FieldErrors, field_name: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field_name, REQUIRED);
    }
    value
}

pub fn require_text(
    errors: &mut FieldErrors,
    field_name: &str,
    value: Option<String>,
    max_length: usize,
) -> Option<String> {
    let value = require(errors, field_name, value)?;

    if value.trim().is_empty() {
        errors.add(field_name, BLANK);
        return None;
    }

    if value.chars().count() > max_length {
        errors.add(
            field_name,
            format!("Ensure this field has no more than {} characters.", max_length),
        );
        return None;
    }

    Some(value)
}

pub fn require_at_least(
    errors: &mut FieldErrors,
    field_name: &str,
    value: Option<i64>,
    min_value: i64,
) -> Option<i64> {
    let value = require(errors, field_name, value)?;

    if value < min_value {
        errors.add(
            field_name,
            format!(
                "Ensure this value is greater than or equal to {}.",
                min_value
            ),
        );
        return None;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_database_url() {
        assert!(validate_database_url("database.url", "postgres://localhost/theater").is_ok());
        assert!(validate_database_url("database.url", "postgresql://u:p@db:5432/t").is_ok());
        assert!(validate_database_url("database.url", "").is_err());
        assert!(validate_database_url("database.url", "not a url").is_err());
        assert!(validate_database_url("database.url", "mysql://localhost/theater").is_err());
    }

    #[test]
    fn test_validate_bind_address() {
        assert!(validate_bind_address("server.bind", "127.0.0.1:8000").is_ok());
        assert!(validate_bind_address("server.bind", "localhost").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("database.max_connections", 5, 1).is_ok());
        assert!(validate_positive_number("database.max_connections", 0, 1).is_err());
    }

    #[test]
    fn test_require_text() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            require_text(&mut errors, "name", Some("Room 1".into()), 256),
            Some("Room 1".to_string())
        );
        assert!(errors.is_empty());

        assert!(require_text(&mut errors, "name", None, 256).is_none());
        assert!(require_text(&mut errors, "title", Some("   ".into()), 256).is_none());
        assert!(require_text(&mut errors, "label", Some("x".repeat(257)), 256).is_none());

        assert_eq!(errors.get("name").unwrap(), &[REQUIRED.to_string()]);
        assert_eq!(errors.get("title").unwrap(), &[BLANK.to_string()]);
        assert_eq!(
            errors.get("label").unwrap(),
            &["Ensure this field has no more than 256 characters.".to_string()]
        );
    }

    #[test]
    fn test_require_at_least() {
        let mut errors = FieldErrors::new();
        assert_eq!(require_at_least(&mut errors, "capacity", Some(0), 0), Some(0));
        assert!(require_at_least(&mut errors, "quantity", Some(0), 1).is_none());
        assert_eq!(
            errors.get("quantity").unwrap(),
            &["Ensure this value is greater than or equal to 1.".to_string()]
        );
    }
}
