//! WarmImage CRD
//!
//! Declares an image that should be kept pre-pulled on every node.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "warmimage.microscaler.io",
    version = "v1alpha1",
    kind = "WarmImage"
)]
#[serde(rename_all = "camelCase")]
pub struct WarmImageSpec {
    /// Image reference to keep resident on every node
    pub image: String,

    /// Pull credentials for the image, propagated verbatim into the
    /// generated workload's pod spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<PullSecretReference>>,
}

/// Reference to a pull-credential Secret in the controller's namespace
///
/// Mirrors the Kubernetes `LocalObjectReference` shape so user manifests
/// read the same as a pod's `imagePullSecrets` entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PullSecretReference {
    /// Name of the referenced Secret
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_serializes_camel_case() {
        let spec = WarmImageSpec {
            image: "nginx:1.0".to_string(),
            image_pull_secrets: Some(vec![PullSecretReference {
                name: "registry-creds".to_string(),
            }]),
        };
        let value = serde_json::to_value(&spec).expect("serialize spec");
        assert_eq!(
            value,
            json!({
                "image": "nginx:1.0",
                "imagePullSecrets": [{"name": "registry-creds"}],
            })
        );
    }

    #[test]
    fn pull_secrets_default_to_none() {
        let spec: WarmImageSpec =
            serde_json::from_value(json!({"image": "nginx:1.0"})).expect("deserialize spec");
        assert_eq!(spec.image, "nginx:1.0");
        assert!(spec.image_pull_secrets.is_none());
        // Absent secrets must not appear on the wire either
        let value = serde_json::to_value(&spec).expect("serialize spec");
        assert_eq!(value, json!({"image": "nginx:1.0"}));
    }

    #[test]
    fn spec_missing_image_is_rejected() {
        let result = serde_json::from_value::<WarmImageSpec>(json!({
            "imagePullSecrets": [{"name": "registry-creds"}],
        }));
        assert!(result.is_err(), "spec without image must not decode");
    }
}
