//! CLI-specific error types and exit code mapping

use adminscan_core::error::AdminscanError;

/// CLI-specific error type.
///
/// Faults inside the console never surface here; they are rendered and the
/// prompt continues. These are the errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// One or more `--exec` lines failed.
    #[error("{0}")]
    Command(String),

    /// The interactive line editor could not be started.
    #[error("line editor error: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),

    /// IO error (stdout write, export directory, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from adminscan-core.
    #[error("{0}")]
    Core(#[from] AdminscanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                 |
    /// |------|-------------------------|
    /// | 0    | Success                 |
    /// | 1    | General / command error |
    /// | 2    | Configuration error     |
    /// | 10   | IO error                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(AdminscanError::Config(_)) => 2,
            Self::Io(_) | Self::Editor(_) | Self::Core(AdminscanError::Io(_)) => 10,
            Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminscan_core::error::ConfigError;
    use adminscan_stream::ScanError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad endpoint".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = AdminscanError::Config(ConfigError::ParseFailed {
            reason: "expected '='".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2, "core config error should map to 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let err = CliError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "stdout closed",
        ));
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("2 command(s) failed".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "2 command(s) failed");
    }

    #[test]
    fn test_from_scan_error() {
        let err: CliError = AdminscanError::from(ScanError::HttpStatus(502)).into();
        assert!(matches!(err, CliError::Core(AdminscanError::Scan(_))));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "scan error: HTTP error! status: 502");
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }
}
