//! The invoker script: the run's sole externally consumed output.
//!
//! The script is created empty at process start, gains one export line per
//! non-empty metadata attribute, and finally the fully assembled command
//! line. The command write is the terminal action of a successful run; if
//! anything fails before it, the script stays incomplete and the container
//! entrypoint must not start the agent.

use crate::error::{InitError, Result};
use crate::metadata::EcsTaskMetadata;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only writer over the invoker script.
pub struct InvokerFile {
    path: PathBuf,
}

impl InvokerFile {
    /// Create the invoker script, empty. First filesystem action of a run.
    pub fn create(path: &Path) -> Result<Self> {
        File::create(path).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot create invoker script '{}': {}",
                path.display(),
                err
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the invoker script.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the metadata export lines, one per non-empty attribute.
    pub fn write_exports(&self, metadata: &EcsTaskMetadata) -> Result<()> {
        for line in metadata.export_lines() {
            self.append_line(&line)?;
        }
        Ok(())
    }

    /// Append the final command line. Terminal action of the whole run.
    pub fn write_command(&self, command: &str) -> Result<()> {
        self.append_line(command)
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                InitError::FilesystemWriteFailed(format!(
                    "cannot open invoker script '{}': {}",
                    self.path.display(),
                    err
                ))
            })?;

        writeln!(file, "{}", line).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot write '{}' into invoker script '{}': {}",
                line,
                self.path.display(),
                err
            ))
        })?;

        Ok(())
    }
}
