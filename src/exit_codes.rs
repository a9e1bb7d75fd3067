//! Exit code constants for the init process.
//!
//! The supervising entrypoint only launches Fluent Bit when this process
//! exits 0; any non-zero code leaves the invoker script without its final
//! command line and the agent is never started.
//!
//! - 0: Success
//! - 1: Environment error (malformed variables or remote references)
//! - 2: Remote fetch failure (bucket lookup or object transfer)
//! - 3: Filesystem failure (config fragment or output file I/O)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Environment error: unreadable environment state or a malformed S3 arn.
pub const ENVIRONMENT_ERROR: i32 = 1;

/// Remote fetch failure: bucket region lookup or object download failed.
pub const REMOTE_FAILURE: i32 = 2;

/// Filesystem failure: a fragment could not be read or an output file
/// could not be created or appended to.
pub const FILESYSTEM_FAILURE: i32 = 3;
