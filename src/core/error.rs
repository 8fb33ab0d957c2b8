//! Error types for the logging core

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level name or numeric value already taken in the active registry
    #[error("level collision: {kind} '{offender}' already registered")]
    LevelCollision { kind: &'static str, offender: String },

    /// Level name or numeric value not present in the active registry
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    /// `child()` called without an object bindings value
    #[error("child bindings must be a JSON object, got {got}")]
    MissingBindings { got: &'static str },

    /// Redaction path failed syntax validation
    #[error("invalid redact path '{path}': {message}")]
    InvalidRedactPath { path: String, message: String },

    /// Invalid configuration with the offending option named
    #[error("invalid configuration for {option}: {message}")]
    InvalidConfiguration { option: String, message: String },

    /// Value exceeded the recursion depth cap in strict stringify mode
    #[error("value nesting exceeds depth limit of {limit} in strict mode")]
    DepthLimit { limit: usize },

    /// Destination rejected at add-time (router entry validation)
    #[error("destination '{name}' rejected: {message}")]
    InvalidDestination { name: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a level name collision error
    pub fn name_collision(name: impl Into<String>) -> Self {
        LoggerError::LevelCollision {
            kind: "name",
            offender: name.into(),
        }
    }

    /// Create a level value collision error
    pub fn value_collision(value: u32) -> Self {
        LoggerError::LevelCollision {
            kind: "value",
            offender: value.to_string(),
        }
    }

    /// Create an unknown level error
    pub fn unknown_level(level: impl Into<String>) -> Self {
        LoggerError::UnknownLevel(level.into())
    }

    /// Create an invalid redact path error
    pub fn redact_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidRedactPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(option: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Create an invalid destination error
    pub fn destination(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidDestination {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::name_collision("info");
        assert!(matches!(err, LoggerError::LevelCollision { .. }));

        let err = LoggerError::config("redact", "paths must be strings");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::redact_path("a..b", "empty segment");
        assert!(matches!(err, LoggerError::InvalidRedactPath { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::value_collision(30);
        assert_eq!(
            err.to_string(),
            "level collision: value '30' already registered"
        );

        let err = LoggerError::unknown_level("verbose");
        assert_eq!(err.to_string(), "unknown level: verbose");

        let err = LoggerError::DepthLimit { limit: 128 };
        assert_eq!(
            err.to_string(),
            "value nesting exceeds depth limit of 128 in strict mode"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log line", "cannot write to sink", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log line"));
        assert!(err.to_string().contains("cannot write to sink"));
    }
}
