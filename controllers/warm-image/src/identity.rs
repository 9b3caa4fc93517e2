//! Workload identity and content versioning.
//!
//! A WarmImage's specification is fingerprinted into a content version that
//! names and labels the generated workload. The version is a pure function
//! of the spec: reprocessing an unchanged resource lands on the same
//! workload name, and any spec change produces a new one.

use crate::error::ControllerError;
use cluster_client::Selector;
use crds::WarmImageSpec;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Label carrying the owning resource name on generated workloads
pub const NAME_LABEL: &str = "name";

/// Label carrying the content version on generated workloads
pub const VERSION_LABEL: &str = "version";

/// Hex characters of the content hash kept in names and labels
const VERSION_LEN: usize = 16;

/// Longest workload name we generate (DNS-1123 label bound)
const MAX_WORKLOAD_NAME: usize = 63;

/// Computes the content version of a specification.
///
/// The spec is serialized through `serde_json::Value`, whose objects keep
/// keys in sorted order, so two semantically identical specs hash the same
/// regardless of how their source documents ordered fields.
pub fn content_version(spec: &WarmImageSpec) -> Result<String, ControllerError> {
    let canonical = serde_json::to_value(spec)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(&digest[..VERSION_LEN / 2]))
}

/// Derives the generated workload's name: `<resource>-<version>`.
///
/// The version suffix always survives intact; an over-long resource name is
/// truncated to keep the result within the platform's name bounds, so
/// distinct versions of the same resource still get distinct names.
#[must_use]
pub fn workload_name(resource: &str, version: &str) -> String {
    let budget = MAX_WORKLOAD_NAME - version.len() - 1;
    let prefix = if resource.len() > budget {
        resource[..budget].trim_end_matches('-')
    } else {
        resource
    };
    format!("{prefix}-{version}")
}

/// Labels attached to a generated workload and its pod template.
#[must_use]
pub fn workload_labels(resource: &str, version: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (NAME_LABEL.to_string(), resource.to_string()),
        (VERSION_LABEL.to_string(), version.to_string()),
    ])
}

/// Selects every generated workload for a resource name, any version.
#[must_use]
pub fn any_version_selector(resource: &str) -> Selector {
    Selector::new().matching(NAME_LABEL, resource)
}

/// Selects generated workloads for a resource name carrying a version other
/// than `version` (the stale generations).
#[must_use]
pub fn other_version_selector(resource: &str, version: &str) -> Selector {
    Selector::new()
        .matching(NAME_LABEL, resource)
        .excluding(VERSION_LABEL, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::PullSecretReference;

    fn spec(image: &str) -> WarmImageSpec {
        WarmImageSpec {
            image: image.to_string(),
            image_pull_secrets: None,
        }
    }

    #[test]
    fn content_version_is_deterministic() {
        let a = content_version(&spec("nginx:1.0")).expect("hash spec");
        let b = content_version(&spec("nginx:1.0")).expect("hash spec");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn content_version_changes_with_spec() {
        let v1 = content_version(&spec("nginx:1.0")).expect("hash spec");
        let v2 = content_version(&spec("nginx:2.0")).expect("hash spec");
        assert_ne!(v1, v2);

        let with_secrets = WarmImageSpec {
            image: "nginx:1.0".to_string(),
            image_pull_secrets: Some(vec![PullSecretReference {
                name: "registry-creds".to_string(),
            }]),
        };
        assert_ne!(
            v1,
            content_version(&with_secrets).expect("hash spec with secrets")
        );
    }

    #[test]
    fn content_version_ignores_source_key_order() {
        let forward: WarmImageSpec = serde_json::from_str(
            r#"{"image": "nginx:1.0", "imagePullSecrets": [{"name": "creds"}]}"#,
        )
        .expect("decode spec");
        let reversed: WarmImageSpec = serde_json::from_str(
            r#"{"imagePullSecrets": [{"name": "creds"}], "image": "nginx:1.0"}"#,
        )
        .expect("decode spec");
        assert_eq!(
            content_version(&forward).expect("hash forward"),
            content_version(&reversed).expect("hash reversed"),
        );
    }

    #[test]
    fn workload_name_joins_resource_and_version() {
        assert_eq!(workload_name("img-a", "0123456789abcdef"), "img-a-0123456789abcdef");
    }

    #[test]
    fn workload_name_truncates_long_resource_names() {
        let resource = "a".repeat(200);
        let name = workload_name(&resource, "0123456789abcdef");
        assert_eq!(name.len(), 63);
        assert!(name.ends_with("-0123456789abcdef"));
    }

    #[test]
    fn workload_name_avoids_doubled_hyphen_on_truncation() {
        // Truncation landing on a hyphen must not produce "--"
        let mut resource = "b".repeat(45);
        resource.push('-');
        resource.push_str(&"c".repeat(20));
        let name = workload_name(&resource, "0123456789abcdef");
        assert!(!name.contains("--"), "unexpected doubled hyphen in {name}");
    }

    #[test]
    fn other_version_selector_excludes_current() {
        let selector = other_version_selector("img-a", "v2hash");
        assert!(selector.matches(&workload_labels("img-a", "v1hash")));
        assert!(!selector.matches(&workload_labels("img-a", "v2hash")));
        assert!(!selector.matches(&workload_labels("img-b", "v1hash")));
    }

    #[test]
    fn any_version_selector_matches_every_generation() {
        let selector = any_version_selector("img-a");
        assert!(selector.matches(&workload_labels("img-a", "v1hash")));
        assert!(selector.matches(&workload_labels("img-a", "v2hash")));
        assert!(!selector.matches(&workload_labels("img-b", "v2hash")));
    }
}
