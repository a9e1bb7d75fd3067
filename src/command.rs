//! Fluent Bit invocation command assembly.
//!
//! The command starts from a fixed base (exec, the binary, the bundled
//! output-plugin extensions) plus exactly one `-c` flag pointing at the
//! assembled main config file. Parser fragments add one `-R` flag each as
//! they are classified; the command is rendered exactly once at the end of
//! the run.

use std::path::Path;
use tracing::info;

/// The Fluent Bit binary inside the image.
pub const FLUENT_BIT_BIN: &str = "/fluent-bit/bin/fluent-bit";

/// Bundled output-plugin extensions, always loaded.
pub const EXTENSION_LIBS: &[&str] = &[
    "/fluent-bit/firehose.so",
    "/fluent-bit/cloudwatch.so",
    "/fluent-bit/kinesis.so",
];

/// The Fluent Bit command line, built incrementally over one run.
#[derive(Debug, Clone)]
pub struct FluentBitCommand {
    tokens: Vec<String>,
}

impl FluentBitCommand {
    /// The fixed base command plus the `-c` flag for the main config file.
    pub fn new(main_config: &Path) -> Self {
        let mut tokens = vec!["exec".to_string(), FLUENT_BIT_BIN.to_string()];
        for lib in EXTENSION_LIBS {
            tokens.push("-e".to_string());
            tokens.push((*lib).to_string());
        }
        tokens.push("-c".to_string());
        tokens.push(main_config.display().to_string());
        Self { tokens }
    }

    /// Append a `-R` flag loading the given parser definition file.
    pub fn add_parser_file(&mut self, path: &Path) {
        self.tokens.push("-R".to_string());
        self.tokens.push(path.display().to_string());
        info!(command = %self.render(), "command updated with parser file");
    }

    /// Render the final command line.
    pub fn render(&self) -> String {
        shell_words::join(&self.tokens)
    }
}
