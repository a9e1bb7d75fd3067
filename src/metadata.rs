//! ECS task metadata retrieval and export-line generation.
//!
//! The metadata endpoint enriches the agent's environment with the task's
//! identity (region, cluster, task id, ...). Metadata is an enrichment, not
//! a correctness requirement: every failure on this path is logged as a
//! warning and leaves the affected fields empty, and the run continues.
//!
//! Retrieval goes through the [`MetadataClient`] trait so tests never touch
//! the network; the production implementation is a blocking ureq client.

use serde::Deserialize;
use std::env;
use tracing::warn;

/// Environment variable naming the ECS task metadata V4 endpoint.
pub const METADATA_ENDPOINT_VAR: &str = "ECS_CONTAINER_METADATA_URI_V4";

/// HTTP fetch capability for the metadata endpoint.
///
/// Errors are opaque here because every caller treats them the same way:
/// log a warning and fall back to an empty metadata record.
pub trait MetadataClient {
    /// Fetch the given URL and return the response body.
    fn get(&self, url: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Production metadata client backed by a blocking ureq agent.
pub struct HttpMetadataClient {
    agent: ureq::Agent,
}

impl HttpMetadataClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::agent(),
        }
    }
}

impl Default for HttpMetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataClient for HttpMetadataClient {
    fn get(&self, url: &str) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let body = self.agent.get(url).call()?.into_string()?;
        Ok(body)
    }
}

/// The `/task` document fields this process consumes.
///
/// Unknown fields are ignored; missing fields default to empty strings so a
/// partial document still yields a usable record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskDocument {
    #[serde(rename = "Cluster")]
    cluster: String,
    #[serde(rename = "TaskARN")]
    task_arn: String,
    #[serde(rename = "Family")]
    family: String,
    #[serde(rename = "Revision")]
    revision: String,
    #[serde(rename = "LaunchType")]
    launch_type: String,
}

/// ECS task metadata, exported into the invoker script as environment
/// variables for the agent process.
///
/// Derived fields (task id, region, task definition) are computed once at
/// construction; the record is never mutated afterwards. Any field may be
/// empty, in which case its export line is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EcsTaskMetadata {
    /// AWS region, taken from the task arn's region segment.
    pub region: String,
    /// Cluster name.
    pub cluster: String,
    /// Full task arn.
    pub task_arn: String,
    /// Task id: the final `/` segment of the task arn's resource.
    pub task_id: String,
    /// Task family.
    pub family: String,
    /// Launch type; empty on container agents that predate the field.
    pub launch_type: String,
    /// Task definition revision number.
    pub revision: String,
    /// Derived `family:revision` string.
    pub task_definition: String,
}

impl EcsTaskMetadata {
    /// Build a metadata record from the raw `/task` endpoint document.
    ///
    /// An unparseable task arn is logged and leaves region and task id
    /// empty; the fields taken verbatim from the document are kept.
    pub fn from_task_document(body: &str) -> serde_json::Result<Self> {
        let doc: TaskDocument = serde_json::from_str(body)?;

        let (region, task_id) = match parse_task_arn(&doc.task_arn) {
            Some(parsed) => parsed,
            None => {
                warn!(task_arn = %doc.task_arn, "failed to parse ECS task arn");
                (String::new(), String::new())
            }
        };

        let task_definition = if doc.family.is_empty() && doc.revision.is_empty() {
            String::new()
        } else {
            format!("{}:{}", doc.family, doc.revision)
        };

        Ok(Self {
            region,
            cluster: doc.cluster,
            task_arn: doc.task_arn,
            task_id,
            family: doc.family,
            launch_type: doc.launch_type,
            revision: doc.revision,
            task_definition,
        })
    }

    /// The fixed export schema: attribute name and value, in declaration
    /// order. This is the single source of truth for what gets exported.
    fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("AWS_REGION", &self.region),
            ("ECS_CLUSTER", &self.cluster),
            ("ECS_TASK_ARN", &self.task_arn),
            ("ECS_TASK_ID", &self.task_id),
            ("ECS_FAMILY", &self.family),
            ("ECS_LAUNCH_TYPE", &self.launch_type),
            ("ECS_REVISION", &self.revision),
            ("ECS_TASK_DEFINITION", &self.task_definition),
        ]
    }

    /// One `export NAME=value` line per non-empty attribute, in schema order.
    pub fn export_lines(&self) -> Vec<String> {
        self.fields()
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("export {}={}", name, value))
            .collect()
    }
}

/// Extract `(region, task id)` from a task arn.
///
/// Arn layout: `arn:partition:service:region:account:resource`; the task id
/// is the final `/` segment of the resource.
fn parse_task_arn(arn: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return None;
    }

    let region = parts[3];
    let resource = parts[5];
    let task_id = resource.rsplit('/').next().unwrap_or(resource);

    Some((region.to_string(), task_id.to_string()))
}

/// Retrieve the task metadata record, or an empty one on any failure.
///
/// Looks up the V4 endpoint from the environment, fetches `{endpoint}/task`
/// and parses the response. Every failure is soft: a warning is logged and
/// the empty record is returned.
pub fn resolve(client: &dyn MetadataClient) -> EcsTaskMetadata {
    let endpoint = match env::var(METADATA_ENDPOINT_VAR) {
        Ok(uri) if !uri.is_empty() => uri,
        _ => {
            warn!("unable to locate the ECS task metadata endpoint; no metadata will be exported");
            return EcsTaskMetadata::default();
        }
    };

    let body = match client.get(&format!("{}/task", endpoint)) {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "failed to fetch ECS task metadata");
            return EcsTaskMetadata::default();
        }
    };

    match EcsTaskMetadata::from_task_document(&body) {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!(error = %err, "failed to parse ECS task metadata");
            EcsTaskMetadata::default()
        }
    }
}
