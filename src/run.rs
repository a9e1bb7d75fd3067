//! Top-level orchestration of one init run.
//!
//! The run is strictly sequential and fail-fast:
//!
//! 1. Create the invoker script, empty
//! 2. Resolve task metadata (soft failures only)
//! 3. Write the metadata export lines into the invoker script
//! 4. Create and seed the main config file, build the base command
//! 5. Create the staging directory and scan the environment for sources
//! 6. Per source, in discovery order: download S3 objects into staging,
//!    classify local files immediately
//! 7. Classify every staged file, in name order
//! 8. Write the final command line into the invoker script
//!
//! The first error aborts the run; files written so far stay on disk, but
//! the final command line is never written, so the entrypoint reading the
//! invoker script will not start the agent.

use crate::command::FluentBitCommand;
use crate::directive::MainConfigFile;
use crate::error::{InitError, Result};
use crate::fetch::{FALLBACK_REGION, ObjectStore, S3Fetcher};
use crate::fragment::process_fragment;
use crate::invoker::InvokerFile;
use crate::metadata::{self, MetadataClient};
use crate::paths::InitPaths;
use crate::source::{self, ConfigSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute one init run.
///
/// The storage client is built once, after metadata resolution, so its
/// default region can follow the task's own region; `make_store` receives
/// that region (or the fallback) and is called exactly once.
pub fn run<M, S, F>(paths: &InitPaths, metadata_client: &M, make_store: F) -> Result<()>
where
    M: MetadataClient,
    S: ObjectStore,
    F: FnOnce(&str) -> S,
{
    let invoker = InvokerFile::create(&paths.invoker)?;

    let metadata = metadata::resolve(metadata_client);
    invoker.write_exports(&metadata)?;

    let main_config = MainConfigFile::create(&paths.main_config, &paths.base_config)?;
    let mut command = FluentBitCommand::new(&paths.main_config);

    fs::create_dir_all(&paths.staging_dir).map_err(|err| {
        InitError::FilesystemWriteFailed(format!(
            "cannot create staging directory '{}': {}",
            paths.staging_dir.display(),
            err
        ))
    })?;

    let sources = source::scan_environment()?;
    info!(count = sources.len(), "discovered config sources");

    let default_region = if metadata.region.is_empty() {
        FALLBACK_REGION
    } else {
        metadata.region.as_str()
    };
    let fetcher = S3Fetcher::new(make_store(default_region), paths.staging_dir.clone());

    for config_source in sources {
        match config_source {
            ConfigSource::S3Object { bucket, key } => {
                fetcher.fetch(&bucket, &key)?;
            }
            ConfigSource::LocalFile { path } => {
                process_fragment(&path, &mut command, &main_config)?;
            }
        }
    }

    for staged in list_staged_files(&paths.staging_dir)? {
        process_fragment(&staged, &mut command, &main_config)?;
    }

    let rendered = command.render();
    invoker.write_command(&rendered)?;
    info!(command = %rendered, "invoker script finalized");

    Ok(())
}

/// List the staged files, sorted by name for a deterministic pass.
fn list_staged_files(staging_dir: &Path) -> Result<Vec<PathBuf>> {
    let unreadable = |err: std::io::Error| {
        InitError::LocalFileUnreadable(format!(
            "unable to read staged config files in '{}': {}",
            staging_dir.display(),
            err
        ))
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(staging_dir).map_err(unreadable)? {
        files.push(entry.map_err(unreadable)?.path());
    }
    files.sort();
    Ok(files)
}
