//! The assembled main config file.
//!
//! Fluent Bit is pointed at one generated config file that pulls everything
//! else in via `@INCLUDE` directives. The file is append-only for the whole
//! run: it is created empty, seeded with the bootstrap include of the
//! image's base config, and then grows one include line per generic
//! fragment, in processing order. Nothing is ever rewritten or reordered.

use crate::error::{InitError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Include directive keyword understood by Fluent Bit.
pub const INCLUDE_DIRECTIVE: &str = "@INCLUDE";

/// Append-only writer over the assembled main config file.
pub struct MainConfigFile {
    path: PathBuf,
}

impl MainConfigFile {
    /// Create the main config file and seed it with the bootstrap include
    /// of the base config. Must happen before any fragment processing so
    /// the base config keeps include precedence.
    pub fn create(path: &Path, base_config: &Path) -> Result<Self> {
        File::create(path).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot create main config file '{}': {}",
                path.display(),
                err
            ))
        })?;

        let file = Self {
            path: path.to_path_buf(),
        };
        file.append_include(base_config)?;
        Ok(file)
    }

    /// Path of the assembled config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `@INCLUDE` line referencing the given fragment.
    pub fn append_include(&self, fragment: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                InitError::FilesystemWriteFailed(format!(
                    "cannot open main config file '{}': {}",
                    self.path.display(),
                    err
                ))
            })?;

        writeln!(file, "{} {}", INCLUDE_DIRECTIVE, fragment.display()).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot write include for '{}' into '{}': {}",
                fragment.display(),
                self.path.display(),
                err
            ))
        })?;

        Ok(())
    }
}
