//! Init process for the Fluent Bit ECS sidecar image.
//!
//! Runs once before the agent starts: discovers config fragments declared
//! through environment variables, stages any that live in S3, merges them
//! into one main config file, and writes the invoker script (task metadata
//! exports plus the final Fluent Bit command line) that the container
//! entrypoint executes. Exits non-zero without writing the command line if
//! any step fails, so the agent never starts with incomplete configuration.

pub mod command;
pub mod directive;
pub mod error;
pub mod exit_codes;
pub mod fetch;
pub mod fragment;
pub mod invoker;
pub mod metadata;
pub mod paths;
pub mod run;
pub mod source;

#[cfg(test)]
mod test_support;

use fetch::HttpObjectStore;
use metadata::HttpMetadataClient;
use paths::InitPaths;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths = InitPaths::resolve();
    let metadata_client = HttpMetadataClient::new();

    match run::run(&paths, &metadata_client, |region| {
        HttpObjectStore::new(region.to_string())
    }) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
