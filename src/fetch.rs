//! Remote config source fetching.
//!
//! [`S3Fetcher`] resolves each object's bucket region and stages its bytes
//! into the staging directory, one file per object, named by the key's
//! final path segment. The storage transport itself sits behind the
//! [`ObjectStore`] trait; the production implementation speaks the S3 HTTP
//! endpoints through ureq, tests substitute a fake.
//!
//! Two sources whose keys share a final path segment stage to the same
//! file; the later download overwrites the earlier one. Known behavior,
//! left as-is.

use crate::error::{InitError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Region used when neither the task metadata nor the bucket location
/// lookup yields one. Buckets in us-east-1 report an empty location.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Storage transport capability: bucket region lookup plus object download.
///
/// This is the seam between the fetch logic and the wire protocol. The
/// fetcher never cares how bytes move, only that they land in `dest`.
pub trait ObjectStore {
    /// Look up the region a bucket lives in. `None` or an empty string
    /// means the store did not report one.
    fn bucket_location(&self, bucket: &str) -> Result<Option<String>>;

    /// Download one object into the destination file, using the bucket's
    /// resolved region.
    fn download(&self, bucket: &str, key: &str, region: &str, dest: &Path) -> Result<()>;
}

/// Fetches remote config fragments into the staging directory.
///
/// Owns the one storage client for the whole run; constructed once at
/// startup and used for every fetch.
pub struct S3Fetcher<S: ObjectStore> {
    store: S,
    staging_dir: PathBuf,
}

impl<S: ObjectStore> S3Fetcher<S> {
    pub fn new(store: S, staging_dir: PathBuf) -> Self {
        Self { store, staging_dir }
    }

    /// Fetch one object into the staging directory.
    ///
    /// Resolves the bucket's actual region first (buckets may live in a
    /// different region than the client default), then downloads the object
    /// to `<staging>/<final path segment of key>`. Returns the staged path.
    pub fn fetch(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let region = self
            .store
            .bucket_location(bucket)?
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| FALLBACK_REGION.to_string());
        debug!(bucket, region, "resolved bucket region");

        let file_name = key.rsplit('/').next().unwrap_or(key);
        let dest = self.staging_dir.join(file_name);

        self.store.download(bucket, key, &region, &dest)?;
        info!(bucket, key, dest = %dest.display(), "staged S3 config file");

        Ok(dest)
    }
}

/// Production store speaking the S3 HTTP endpoints through ureq.
///
/// Region discovery uses the `x-amz-bucket-region` header of a HEAD probe
/// against the bucket endpoint; S3 reports it even on error responses.
/// Requests are unsigned; swapping in a signing client changes only this
/// type.
pub struct HttpObjectStore {
    agent: ureq::Agent,
    default_region: String,
}

impl HttpObjectStore {
    /// Create the store with the client's default region, used to address
    /// the bucket-region probe.
    pub fn new(default_region: String) -> Self {
        Self {
            agent: ureq::agent(),
            default_region,
        }
    }
}

impl ObjectStore for HttpObjectStore {
    fn bucket_location(&self, bucket: &str) -> Result<Option<String>> {
        let url = format!("https://{}.s3.{}.amazonaws.com/", bucket, self.default_region);

        let region = match self.agent.head(&url).call() {
            Ok(response) => response.header("x-amz-bucket-region").map(str::to_string),
            // S3 answers the probe with the region header even on 403/404.
            Err(ureq::Error::Status(_, response)) => {
                response.header("x-amz-bucket-region").map(str::to_string)
            }
            Err(err) => {
                return Err(InitError::RemoteLookupFailed(format!(
                    "cannot resolve region of bucket '{}': {}",
                    bucket, err
                )));
            }
        };

        Ok(region)
    }

    fn download(&self, bucket: &str, key: &str, region: &str, dest: &Path) -> Result<()> {
        let url = format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key);

        let response = self.agent.get(&url).call().map_err(|err| {
            InitError::RemoteTransferFailed(format!(
                "cannot download '{}' from bucket '{}': {}",
                key, bucket, err
            ))
        })?;

        let mut file = File::create(dest).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot create staging file '{}': {}",
                dest.display(),
                err
            ))
        })?;

        io::copy(&mut response.into_reader(), &mut file).map_err(|err| {
            InitError::RemoteTransferFailed(format!(
                "transfer of '{}' from bucket '{}' interrupted: {}",
                key, bucket, err
            ))
        })?;

        Ok(())
    }
}
