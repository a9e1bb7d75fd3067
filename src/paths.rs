//! Output path resolution for the init process.
//!
//! All files the init process creates or references live at fixed locations
//! inside the container image. This module resolves them once, up front, so
//! the rest of the code never builds paths ad hoc. The default root is `/`,
//! matching the image layout; tests resolve against a temporary root.

use std::path::{Path, PathBuf};

/// Staging directory for config files downloaded from S3.
pub const STAGING_DIR_NAME: &str = "fluent-bit-init-s3-files";

/// Main config file assembled by this process and handed to Fluent Bit.
pub const MAIN_CONFIG_FILE_NAME: &str = "fluent-bit-init.conf";

/// The image's original main config, included first in the assembled config.
pub const BASE_CONFIG_PATH: &str = "fluent-bit/etc/fluent-bit.conf";

/// Invoker script: metadata exports followed by the final command line.
pub const INVOKER_FILE_NAME: &str = "fluent-bit-invoker.sh";

/// Resolved output paths for one init run.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct InitPaths {
    /// Directory that staged S3 config files are downloaded into.
    pub staging_dir: PathBuf,

    /// The assembled main config file (`-c` target of the final command).
    pub main_config: PathBuf,

    /// The base config shipped in the image, included via the bootstrap line.
    pub base_config: PathBuf,

    /// The invoker script consumed by the container entrypoint.
    pub invoker: PathBuf,
}

impl InitPaths {
    /// Resolve the canonical paths used inside the container image.
    pub fn resolve() -> Self {
        Self::resolve_from("/")
    }

    /// Resolve all paths under a specific root directory.
    ///
    /// This is how tests run the whole process against a temp directory.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            staging_dir: root.join(STAGING_DIR_NAME),
            main_config: root.join(MAIN_CONFIG_FILE_NAME),
            base_config: root.join(BASE_CONFIG_PATH),
            invoker: root.join(INVOKER_FILE_NAME),
        }
    }
}
