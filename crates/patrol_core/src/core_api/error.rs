use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    NotFound,
    Io,
    OutOfRange,
    NotANumber,
    MissingGlobal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Maps an I/O failure on `path` to `NotFound` or `Io`.
    pub fn from_io(err: &io::Error, action: &str, path: &Path) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => CoreErrorCode::NotFound,
            _ => CoreErrorCode::Io,
        };
        Self::new(code, format!("failed to {action} {}: {err}", path.display()))
    }

    /// Always `Io`, whatever the underlying error kind.
    pub fn io(err: &io::Error, action: &str, path: &Path) -> Self {
        Self::new(
            CoreErrorCode::Io,
            format!("failed to {action} {}: {err}", path.display()),
        )
    }

    /// Input was rejected before anything was mutated.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.code,
            CoreErrorCode::OutOfRange | CoreErrorCode::NotANumber
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
