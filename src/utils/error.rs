use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot read input '{path}': {source}")]
    InputReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {column} on line {line}: {value:?} ({reason})")]
    RecordParseError {
        line: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PlotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlotError::ConfigError { .. }
            | PlotError::ConfigValidationError { .. }
            | PlotError::InvalidConfigValueError { .. }
            | PlotError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PlotError::RecordParseError { .. }
            | PlotError::InputReadError { .. }
            | PlotError::CsvError(_) => ErrorCategory::Input,
            PlotError::ProcessingError { .. } => ErrorCategory::Processing,
            PlotError::IoError(_) | PlotError::ZipError(_) | PlotError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlotError::RecordParseError { .. } | PlotError::InputReadError { .. } => {
                ErrorSeverity::Medium
            }
            PlotError::CsvError(_) | PlotError::ProcessingError { .. } => ErrorSeverity::High,
            PlotError::IoError(_) | PlotError::ZipError(_) | PlotError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
            PlotError::ConfigError { .. }
            | PlotError::ConfigValidationError { .. }
            | PlotError::InvalidConfigValueError { .. }
            | PlotError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            PlotError::RecordParseError { line, column, .. } => {
                format!("Input file has a malformed {} value on line {}", column, line)
            }
            PlotError::IoError(e) => format!("File access failed: {}", e),
            PlotError::InputReadError { path, .. } => {
                format!("Input file '{}' could not be read", path)
            }
            PlotError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            PlotError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PlotError::RecordParseError { .. } => {
                "Fix the offending line or rerun with --on-malformed skip"
            }
            PlotError::CsvError(_) => "Check that the output directory is writable",
            PlotError::IoError(_) => "Check file paths and permissions",
            PlotError::InputReadError { .. } => "Check --input and --assets-dir and the file's permissions",
            PlotError::ZipError(_) => "Disable compression or free up disk space",
            PlotError::SerializationError(_) => "Report this as a bug",
            PlotError::ConfigError { .. }
            | PlotError::ConfigValidationError { .. }
            | PlotError::InvalidConfigValueError { .. }
            | PlotError::MissingConfigError { .. } => {
                "Review the configuration file or command-line flags"
            }
            PlotError::ProcessingError { .. } => "Rerun with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_recoverable_input_error() {
        let err = PlotError::RecordParseError {
            line: 3,
            column: "latitude",
            value: "abc".to_string(),
            reason: "invalid float literal".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("line 3"));
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = PlotError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Output);
    }

    #[test]
    fn test_input_read_error_is_input_category() {
        let err = PlotError::InputReadError {
            path: "assets/points.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("assets/points.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
