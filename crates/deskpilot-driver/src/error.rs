//! Driver error types.
//!
//! Every driver tier surfaces failures through [`DriverError`].  The chain
//! treats any error as "try the next tier", so variants exist to make the
//! logged reason precise rather than to drive control flow.

use crate::capability::Capability;

/// Unified error type for automation drivers.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The driver does not implement the requested capability (or this
    /// particular variant of it).
    #[error("driver `{driver}` does not support {capability}")]
    Unsupported {
        driver: String,
        capability: Capability,
    },

    /// The driver's backing runtime is not present on this machine.
    #[error("driver `{driver}` is unavailable: {reason}")]
    Unavailable { driver: String, reason: String },

    /// An external program exited unsuccessfully.
    #[error("`{program}` exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    /// Spawning or waiting on an external program failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The arguments of a capability call cannot be expressed by the driver.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The native input library reported an error.
    #[error("native input error: {0}")]
    Native(String),
}

/// Convenience alias used throughout the driver crate.
pub type Result<T> = std::result::Result<T, DriverError>;
