//! Error types for the init process.
//!
//! Uses thiserror for derive macros. Every variant is fatal: the run stops
//! at the first error and the final command line is never written, which is
//! the fail-closed signal for the supervising entrypoint. Task metadata
//! problems are deliberately absent here; they are logged as warnings and
//! leave the metadata record empty instead of aborting the run.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for init process operations.
///
/// Each variant maps to a process exit code; see `exit_codes`.
#[derive(Error, Debug)]
pub enum InitError {
    /// A process environment entry could not be read as a key/value pair.
    #[error("unrecognizable environment variable: {0}")]
    EnvironmentMalformed(String),

    /// A remote source value is not a well-formed S3 arn.
    #[error("unrecognizable S3 arn: {0}")]
    RemoteReferenceMalformed(String),

    /// The bucket region lookup failed.
    #[error("bucket region lookup failed: {0}")]
    RemoteLookupFailed(String),

    /// The object download failed.
    #[error("S3 download failed: {0}")]
    RemoteTransferFailed(String),

    /// A config fragment or staged file could not be read.
    #[error("cannot read config file: {0}")]
    LocalFileUnreadable(String),

    /// An output file could not be created or appended to.
    #[error("filesystem write failed: {0}")]
    FilesystemWriteFailed(String),
}

impl InitError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            InitError::EnvironmentMalformed(_) => exit_codes::ENVIRONMENT_ERROR,
            InitError::RemoteReferenceMalformed(_) => exit_codes::ENVIRONMENT_ERROR,
            InitError::RemoteLookupFailed(_) => exit_codes::REMOTE_FAILURE,
            InitError::RemoteTransferFailed(_) => exit_codes::REMOTE_FAILURE,
            InitError::LocalFileUnreadable(_) => exit_codes::FILESYSTEM_FAILURE,
            InitError::FilesystemWriteFailed(_) => exit_codes::FILESYSTEM_FAILURE,
        }
    }
}

/// Result type alias for init process operations.
pub type Result<T> = std::result::Result<T, InitError>;
