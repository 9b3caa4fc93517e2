//! Test utilities for unit testing the reconciler and watcher.
//!
//! This module provides helpers for creating test resources and the fixed
//! owner reference generated workloads are checked against.

use crds::{PullSecretReference, WarmImage, WarmImageSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

/// Owner reference used by reconciler and builder tests
pub fn test_owner_ref() -> OwnerReference {
    OwnerReference {
        api_version: "apps/v1".to_string(),
        kind: "Deployment".to_string(),
        name: "warm-image-controller".to_string(),
        uid: "6a9c6cdd-0000-4000-8000-000000000000".to_string(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Creates a WarmImage with the given name, image, and resource version
pub fn warm_image(name: &str, image: &str, revision: &str) -> WarmImage {
    WarmImage {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            resource_version: Some(revision.to_string()),
            ..ObjectMeta::default()
        },
        spec: WarmImageSpec {
            image: image.to_string(),
            image_pull_secrets: None,
        },
    }
}

/// Creates a WarmImage carrying pull-secret references
pub fn warm_image_with_secrets(
    name: &str,
    image: &str,
    revision: &str,
    secrets: &[&str],
) -> WarmImage {
    let mut resource = warm_image(name, image, revision);
    resource.spec.image_pull_secrets = Some(
        secrets
            .iter()
            .map(|secret| PullSecretReference {
                name: (*secret).to_string(),
            })
            .collect(),
    );
    resource
}

/// Creates a malformed WarmImage with no `metadata.name`
pub fn nameless_warm_image(image: &str, revision: &str) -> WarmImage {
    WarmImage {
        metadata: ObjectMeta {
            resource_version: Some(revision.to_string()),
            ..ObjectMeta::default()
        },
        spec: WarmImageSpec {
            image: image.to_string(),
            image_pull_secrets: None,
        },
    }
}
