use crate::domain::rules::{INSUFFICIENT_TICKETS, MOVIE_EXIST, SOLD_OUT, WRONG_DURATION};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Key for errors that belong to the request as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// 欄位層級錯誤：`field -> [messages]`，序列化後即為 400 回應本體
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum TheaterError {
    #[error("Invalid input: {0}")]
    InputError(FieldErrors),

    #[error("Invalid pk \"{id}\" - object does not exist.")]
    UnknownReference { field: &'static str, id: i64 },

    #[error("{}", WRONG_DURATION)]
    InvalidDuration,

    #[error("{}", MOVIE_EXIST)]
    ScheduleConflict,

    #[error("{}", SOLD_OUT)]
    SoldOut,

    #[error("{}", INSUFFICIENT_TICKETS)]
    InsufficientCapacity,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 請求資料缺漏或格式錯誤
    Input,
    /// 業務規則拒絕（排程衝突、售罄等）
    Rule,
    Storage,
    Config,
}

impl TheaterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputError(_) | Self::UnknownReference { .. } => ErrorCategory::Input,
            Self::InvalidDuration
            | Self::ScheduleConflict
            | Self::SoldOut
            | Self::InsufficientCapacity => ErrorCategory::Rule,
            Self::DatabaseError(_) | Self::IoError(_) | Self::CsvError(_) => {
                ErrorCategory::Storage
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn is_rule_violation(&self) -> bool {
        self.category() == ErrorCategory::Rule
    }

    /// 欄位層級錯誤（包含不存在的外鍵）
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::InputError(errors) => Some(errors.clone()),
            Self::UnknownReference { field, .. } => {
                Some(FieldErrors::single(field, self.to_string()))
            }
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Could not reach the theater database".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the request body against the required fields",
            ErrorCategory::Rule => "Pick another showtime or a smaller ticket quantity",
            ErrorCategory::Storage => {
                "Check that the database is running and DATABASE_URL points to it"
            }
            ErrorCategory::Config => "Fix the configuration file or command line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, TheaterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_display_fixed_messages() {
        assert_eq!(TheaterError::InvalidDuration.to_string(), "WRONG_DURATION");
        assert_eq!(TheaterError::ScheduleConflict.to_string(), "MOVIE_EXIST");
        assert_eq!(TheaterError::SoldOut.to_string(), "SOLD_OUT");
        assert_eq!(
            TheaterError::InsufficientCapacity.to_string(),
            "INSUFFICIENT_TICKETS"
        );
    }

    #[test]
    fn test_unknown_reference_is_field_scoped() {
        let err = TheaterError::UnknownReference { field: "room", id: 42 };
        assert_eq!(err.category(), ErrorCategory::Input);

        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields.get("room").unwrap(),
            &["Invalid pk \"42\" - object does not exist.".to_string()]
        );
    }

    #[test]
    fn test_field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("name", "This field is required.");
        errors.add("capacity", "This field is required.");
        errors.add("name", "second");

        assert_eq!(errors.get("name").unwrap().len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["capacity", "name"]);
        assert_eq!(
            errors.to_string(),
            "capacity: This field is required.; name: This field is required. second"
        );
    }
}
