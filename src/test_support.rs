//! Shared helpers for unit tests.

use crate::error::{InitError, Result};
use crate::fetch::ObjectStore;
use crate::metadata::MetadataClient;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

/// Sets (or unsets) an environment variable and restores the previous
/// value on drop. Tests using this must run under `#[serial]`: the process
/// environment is global.
pub(crate) struct EnvVarGuard {
    key: String,
    previous: Option<OsString>,
}

impl EnvVarGuard {
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var_os(key);
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_string(),
            previous,
        }
    }

    pub(crate) fn unset(key: &str) -> Self {
        let previous = std::env::var_os(key);
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(&self.key, value),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}

/// Metadata client returning a canned body, or failing every request.
pub(crate) struct FakeMetadataClient {
    body: std::result::Result<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeMetadataClient {
    pub(crate) fn with_body(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            body: Err(message.to_string()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl MetadataClient for FakeMetadataClient {
    fn get(&self, url: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.requests.borrow_mut().push(url.to_string());
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(message) => Err(message.clone().into()),
        }
    }
}

/// One download recorded by [`FakeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadRecord {
    pub(crate) bucket: String,
    pub(crate) key: String,
    pub(crate) region: String,
}

/// In-memory object store: canned bucket region, canned object contents,
/// and a record of every download for assertions.
pub(crate) struct FakeStore {
    region: Option<String>,
    objects: HashMap<(String, String), String>,
    lookup_error: Option<String>,
    downloads: RefCell<Vec<DownloadRecord>>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self {
            region: None,
            objects: HashMap::new(),
            lookup_error: None,
            downloads: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub(crate) fn with_object(mut self, bucket: &str, key: &str, content: &str) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), content.to_string());
        self
    }

    pub(crate) fn failing_lookup(mut self, message: &str) -> Self {
        self.lookup_error = Some(message.to_string());
        self
    }

    pub(crate) fn downloads(&self) -> Vec<DownloadRecord> {
        self.downloads.borrow().clone()
    }
}

impl ObjectStore for FakeStore {
    fn bucket_location(&self, bucket: &str) -> Result<Option<String>> {
        if let Some(message) = &self.lookup_error {
            return Err(InitError::RemoteLookupFailed(format!(
                "bucket '{}': {}",
                bucket, message
            )));
        }
        Ok(self.region.clone())
    }

    fn download(&self, bucket: &str, key: &str, region: &str, dest: &Path) -> Result<()> {
        self.downloads.borrow_mut().push(DownloadRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            region: region.to_string(),
        });

        let content = self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| {
                InitError::RemoteTransferFailed(format!("no such object: {}/{}", bucket, key))
            })?;

        std::fs::write(dest, content).map_err(|err| {
            InitError::FilesystemWriteFailed(format!(
                "cannot write staged file '{}': {}",
                dest.display(),
                err
            ))
        })
    }
}
