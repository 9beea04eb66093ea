//! CLI-specific error types and exit code mapping

use hostlog_core::error::HostlogError;
use hostlog_pipeline::IngestError;
use hostlog_storage::SqliteStoreError;
use hostlog_visibility::ScoringError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The requested host or mapping does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from hostlog-core.
    #[error("{0}")]
    Core(#[from] HostlogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                    |
    /// |------|----------------------------|
    /// | 0    | Success                    |
    /// | 1    | General / command error    |
    /// | 2    | Configuration error        |
    /// | 3    | Host or mapping not found  |
    /// | 10   | IO error                   |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(HostlogError::Config(_)) => 2,
            Self::NotFound(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        Self::Core(e.into())
    }
}

impl From<SqliteStoreError> for CliError {
    fn from(e: SqliteStoreError) -> Self {
        Self::Core(e.into())
    }
}

impl From<ScoringError> for CliError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::NoEntries { host } => {
                Self::NotFound(format!("no log entries for host '{host}'"))
            }
            other => Self::Core(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlog_core::error::{ConfigError, StorageError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = HostlogError::Config(ConfigError::ParseFailed {
            reason: "expected '='".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_not_found() {
        let err = CliError::NotFound("mapping for 10.0.0.1".to_owned());
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_storage_error() {
        let err: CliError = HostlogError::Storage(StorageError::Query("locked".to_owned())).into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_scoring_no_entries_maps_to_not_found() {
        let err: CliError = ScoringError::NoEntries {
            host: "10.0.0.9".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::NotFound(_)));
        assert!(err.to_string().contains("10.0.0.9"));
    }

    #[test]
    fn test_scoring_storage_error_stays_core() {
        let err: CliError = ScoringError::HostListing(StorageError::Connection(
            "pool timed out".to_owned(),
        ))
        .into();
        assert!(matches!(err, CliError::Core(HostlogError::Scoring(_))));
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(format!("{}", err), "execution failed");
    }
}
