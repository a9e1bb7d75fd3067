//! Config fragment classification.
//!
//! A fragment's fate is decided by its content, never its extension or
//! origin: text containing a `[PARSER]` section must be loaded through a
//! dedicated `-R` flag (Fluent Bit rejects parser definitions inside the
//! main config), everything else is pulled in with an `@INCLUDE` line.

use crate::command::FluentBitCommand;
use crate::directive::MainConfigFile;
use crate::error::{InitError, Result};
use std::fs;
use std::path::Path;

/// Section marker identifying a parser definition block.
pub const PARSER_SECTION_MARKER: &str = "[PARSER]";

/// How a fragment enters the final configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Declares parsers; becomes a `-R` command flag.
    Parser,
    /// Anything else; becomes an `@INCLUDE` line in the main config.
    Generic,
}

/// Classify fragment content. Pure and idempotent.
pub fn classify(content: &str) -> FragmentKind {
    if content.contains(PARSER_SECTION_MARKER) {
        FragmentKind::Parser
    } else {
        FragmentKind::Generic
    }
}

/// Read, classify, and route one fragment.
///
/// Parser fragments extend the command; generic fragments extend the main
/// config file. A fragment is never both.
pub fn process_fragment(
    path: &Path,
    command: &mut FluentBitCommand,
    main_config: &MainConfigFile,
) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|err| {
        InitError::LocalFileUnreadable(format!("cannot open file '{}': {}", path.display(), err))
    })?;

    match classify(&content) {
        FragmentKind::Parser => command.add_parser_file(path),
        FragmentKind::Generic => main_config.append_include(path)?,
    }

    Ok(())
}
