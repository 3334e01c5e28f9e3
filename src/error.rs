use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that can escape the widget layer.
///
/// Most interaction failures are recovered where they happen (a missing
/// menu, a stale row index, an unreadable entry); these variants cover the
/// setup paths that genuinely cannot continue.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration file could not be used.
    #[error("Config error: {0}")]
    Config(String),

    /// File filter pattern could not be compiled.
    #[error("Invalid filter pattern: {0}")]
    Glob(#[from] globset::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn terminal_error_display() {
        let err = AppError::Terminal("failed to enter raw mode".into());
        assert_eq!(err.to_string(), "Terminal error: failed to enter raw mode");
    }

    #[test]
    fn invalid_path_error_display() {
        let err = AppError::InvalidPath("/nonexistent".into());
        assert_eq!(err.to_string(), "Invalid path: /nonexistent");
    }

    #[test]
    fn glob_error_conversion() {
        let glob_err = globset::Glob::new("[unclosed").unwrap_err();
        let app_err: AppError = glob_err.into();
        assert!(matches!(app_err, AppError::Glob(_)));
        assert!(app_err.to_string().starts_with("Invalid filter pattern"));
    }
}
