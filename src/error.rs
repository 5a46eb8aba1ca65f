use std::path::PathBuf;
use thiserror::Error;

/// rdoc-dictionary error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Store error in {path}: {message}")]
    Store { path: PathBuf, message: String },

    #[error("Unknown markup node kind: {0}")]
    UnknownMarkup(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Method not found: {entity} {method}")]
    MethodNotFound { entity: String, method: String },

    #[error("Command failed ({status}): {command}")]
    CommandFailed { command: String, status: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// Result type alias for rdoc-dictionary operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a store error
    pub fn store(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Store {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a method lookup error
    pub fn method_not_found(entity: impl Into<String>, method: impl Into<String>) -> Self {
        Error::MethodNotFound {
            entity: entity.into(),
            method: method.into(),
        }
    }

    /// Create an external command failure
    pub fn command_failed(command: impl Into<String>, status: impl Into<String>) -> Self {
        Error::CommandFailed {
            command: command.into(),
            status: status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_store_error_display() {
        let err = Error::store("/stores/core/Array.json", "missing field `name`");
        assert!(err.to_string().contains("/stores/core/Array.json"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("dictionary_name must not be empty");
        assert_eq!(
            err.to_string(),
            "Config validation error: dictionary_name must not be empty"
        );
    }

    #[test]
    fn test_unknown_markup_display() {
        let err = Error::UnknownMarkup("BLOCKQUOTE".to_string());
        assert_eq!(err.to_string(), "Unknown markup node kind: BLOCKQUOTE");
    }

    #[test]
    fn test_method_not_found_display() {
        let err = Error::method_not_found("Array", "Array#each");
        assert_eq!(err.to_string(), "Method not found: Array Array#each");
    }

    #[test]
    fn test_command_failed_display() {
        let err = Error::command_failed("rsync -r a b", "exit status: 23");
        assert_eq!(err.to_string(), "Command failed (exit status: 23): rsync -r a b");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
