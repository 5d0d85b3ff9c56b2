/*
 * Error type shared by every layer of the crate. Native failures are folded
 * into `NativeCallFailure` so callers only need to distinguish what went wrong
 * at the decoration level, not which Win32 call produced it.
 */
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Custom decoration is only implemented for Windows.
    UnsupportedPlatform(String),
    /// A native handle could not be located, or a null handle was supplied.
    HandleResolutionFailure(String),
    /// An OS call (install/restore handler, extend frame, ...) failed.
    NativeCallFailure(String),
    InvalidParameters(String),
    /// Lifecycle misuse, such as opening a binder that was already disposed.
    InvalidState(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::UnsupportedPlatform(msg) => write!(f, "Unsupported platform: {msg}"),
            PlatformError::HandleResolutionFailure(msg) => {
                write!(f, "Handle resolution failed: {msg}")
            }
            PlatformError::NativeCallFailure(msg) => write!(f, "Native call failed: {msg}"),
            PlatformError::InvalidParameters(msg) => {
                write!(f, "Invalid decoration parameters: {msg}")
            }
            PlatformError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
        }
    }
}

impl std::error::Error for PlatformError {}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::NativeCallFailure(format!("{err} ({:?})", err.code()))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
