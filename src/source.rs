//! Environment scanning and config source classification.
//!
//! Config fragments are declared through naming-convention environment
//! variables: keys matching the S3 pattern carry an S3 arn pointing at a
//! remote fragment, keys matching the file pattern carry a path to a
//! fragment built into the image. Everything else is ignored.
//!
//! The host environment does not guarantee enumeration order, so discovery
//! order only affects the cosmetic ordering of include lines and command
//! flags, never correctness.

use crate::error::{InitError, Result};
use regex::Regex;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Key pattern marking a remote S3 config source.
pub const S3_SOURCE_PATTERN: &str = "aws_fluent_bit_s3_";

/// Key pattern marking a built-in config file source.
pub const FILE_SOURCE_PATTERN: &str = "aws_fluent_bit_file_";

static S3_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(S3_SOURCE_PATTERN).expect("static pattern compiles"));

static FILE_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FILE_SOURCE_PATTERN).expect("static pattern compiles"));

/// One discovered config source, consumed immediately by the fetch/process
/// step that follows discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A fragment stored in S3, named by bucket and object key.
    S3Object { bucket: String, key: String },

    /// A fragment shipped in the image at the given path.
    LocalFile { path: PathBuf },
}

/// Scan the process environment for config sources.
///
/// Fatal on any environment entry that cannot be read as a key/value pair
/// and on any S3 value that is not a well-formed arn: malformed environment
/// state is a configuration error, not a recoverable condition.
pub fn scan_environment() -> Result<Vec<ConfigSource>> {
    classify_vars(env::vars_os())
}

/// Classify an explicit set of environment variables.
///
/// Split out from [`scan_environment`] so the classification rules can be
/// tested without mutating the process environment.
pub fn classify_vars<I>(vars: I) -> Result<Vec<ConfigSource>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut sources = Vec::new();

    for (key, value) in vars {
        let key = key.into_string().map_err(|raw| {
            InitError::EnvironmentMalformed(format!(
                "variable name is not valid unicode: {:?}",
                raw
            ))
        })?;
        let value = value.into_string().map_err(|raw| {
            InitError::EnvironmentMalformed(format!(
                "value of '{}' is not valid unicode: {:?}",
                key, raw
            ))
        })?;

        // The two patterns are tested independently; their literals cannot
        // both match a sane key, but neither takes precedence by design.
        if S3_KEY_REGEX.is_match(&key) {
            let (bucket, object_key) = parse_s3_arn(&value)?;
            sources.push(ConfigSource::S3Object {
                bucket,
                key: object_key,
            });
        }
        if FILE_KEY_REGEX.is_match(&key) {
            sources.push(ConfigSource::LocalFile {
                path: PathBuf::from(value),
            });
        }
    }

    Ok(sources)
}

/// Parse an S3 arn of the form `arn:aws:s3:::bucket/key` into bucket and key.
///
/// The region and account segments are empty for S3 arns and discarded
/// either way. Both bucket and key must be non-empty.
pub fn parse_s3_arn(arn: &str) -> Result<(String, String)> {
    let malformed = || InitError::RemoteReferenceMalformed(arn.to_string());

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" || parts[2] != "s3" {
        return Err(malformed());
    }

    let (bucket, key) = parts[5].split_once('/').ok_or_else(malformed)?;
    if bucket.is_empty() || key.is_empty() {
        return Err(malformed());
    }

    Ok((bucket.to_string(), key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn ignores_keys_matching_neither_pattern() {
        let sources = classify_vars(vars(&[
            ("PATH", "/usr/bin"),
            ("HOME", "/root"),
            ("aws_fluent_bit", "close but no match"),
        ]))
        .unwrap();

        assert!(sources.is_empty());
    }

    #[test]
    fn classifies_s3_keys_as_remote_sources() {
        let sources = classify_vars(vars(&[(
            "aws_fluent_bit_s3_parser",
            "arn:aws:s3:::my-bucket/conf/extra.conf",
        )]))
        .unwrap();

        assert_eq!(
            sources,
            vec![ConfigSource::S3Object {
                bucket: "my-bucket".to_string(),
                key: "conf/extra.conf".to_string(),
            }]
        );
    }

    #[test]
    fn classifies_file_keys_as_local_sources() {
        let sources = classify_vars(vars(&[(
            "aws_fluent_bit_file_builtin",
            "/fluent-bit/etc/extra.conf",
        )]))
        .unwrap();

        assert_eq!(
            sources,
            vec![ConfigSource::LocalFile {
                path: PathBuf::from("/fluent-bit/etc/extra.conf"),
            }]
        );
    }

    #[test]
    fn pattern_matches_anywhere_in_the_key() {
        // Substring semantics: the marker does not have to be a prefix.
        let sources = classify_vars(vars(&[(
            "custom_aws_fluent_bit_file_1",
            "/fragment.conf",
        )]))
        .unwrap();

        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn preserves_declaration_order() {
        let sources = classify_vars(vars(&[
            ("aws_fluent_bit_file_a", "/a.conf"),
            ("aws_fluent_bit_s3_b", "arn:aws:s3:::bucket/b.conf"),
            ("aws_fluent_bit_file_c", "/c.conf"),
        ]))
        .unwrap();

        assert_eq!(sources.len(), 3);
        assert!(matches!(sources[0], ConfigSource::LocalFile { .. }));
        assert!(matches!(sources[1], ConfigSource::S3Object { .. }));
        assert!(matches!(sources[2], ConfigSource::LocalFile { .. }));
    }

    #[test]
    fn malformed_s3_arn_is_fatal() {
        let result = classify_vars(vars(&[("aws_fluent_bit_s3_bad", "arn:aws:s3:::bucket-only")]));

        assert!(matches!(
            result,
            Err(InitError::RemoteReferenceMalformed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_environment_entry_is_fatal() {
        use std::os::unix::ffi::OsStringExt;

        let key = OsString::from_vec(vec![0x66, 0x6f, 0x80]);
        let result = classify_vars(vec![(key, OsString::from("value"))]);

        assert!(matches!(result, Err(InitError::EnvironmentMalformed(_))));
    }

    #[test]
    fn parse_s3_arn_extracts_bucket_and_key() {
        let (bucket, key) = parse_s3_arn("arn:aws:s3:::ygloa-bucket/s3_parser.conf").unwrap();
        assert_eq!(bucket, "ygloa-bucket");
        assert_eq!(key, "s3_parser.conf");
    }

    #[test]
    fn parse_s3_arn_keeps_nested_key_paths_intact() {
        let (bucket, key) = parse_s3_arn("arn:aws:s3:::bucket/a/b/c.conf").unwrap();
        assert_eq!(bucket, "bucket");
        assert_eq!(key, "a/b/c.conf");
    }

    #[test]
    fn parse_s3_arn_rejects_malformed_references() {
        for arn in [
            "",
            "bucket/key",
            "arn:aws:s3:::no-slash",
            "arn:aws:s3:::/key-without-bucket",
            "arn:aws:s3:::bucket/",
            "arn:aws:ec2:::bucket/key",
            "s3://bucket/key",
        ] {
            let result = parse_s3_arn(arn);
            assert!(
                matches!(result, Err(InitError::RemoteReferenceMalformed(_))),
                "expected '{}' to be rejected",
                arn
            );
        }
    }

    #[test]
    fn classification_is_repeatable() {
        let input = vars(&[("aws_fluent_bit_s3_x", "arn:aws:s3:::bucket/key.conf")]);
        let first = classify_vars(input.clone()).unwrap();
        let second = classify_vars(input).unwrap();
        assert_eq!(first, second);
    }
}
