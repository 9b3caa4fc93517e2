//! Desired-state builder for generated workloads.
//!
//! Materializes the DaemonSet template for a WarmImage: one pod per node
//! running the declared image under a long-sleeping placeholder process,
//! which keeps the image resident without doing any work.

use crate::identity;
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec};
use k8s_openapi::api::core::v1::{Container, LocalObjectReference, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};

/// Container name inside every generated workload
const CONTAINER_NAME: &str = "the-image";

/// Placeholder command keeping the image's pod alive indefinitely
const SLEEP_COMMAND: &str = "sleep 10000000000";

/// Builds the DaemonSet realizing `resource` at `version`.
///
/// Pure function of its inputs: identical arguments produce byte-identical
/// payloads. The owner reference ties the workload to the controller's own
/// Deployment so the platform garbage-collects generated workloads if the
/// controller is removed.
#[must_use]
pub fn build_daemon_set(
    resource: &crds::WarmImage,
    name: &str,
    version: &str,
    owner: &OwnerReference,
) -> DaemonSet {
    let labels = identity::workload_labels(name, version);
    DaemonSet {
        metadata: ObjectMeta {
            name: Some(identity::workload_name(name, version)),
            labels: Some(labels.clone()),
            owner_references: Some(vec![owner.clone()]),
            ..ObjectMeta::default()
        },
        spec: Some(DaemonSetSpec {
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(resource.spec.image.clone()),
                        command: Some(vec!["/bin/sh".to_string()]),
                        args: Some(vec!["-c".to_string(), SLEEP_COMMAND.to_string()]),
                        ..Container::default()
                    }],
                    image_pull_secrets: resource.spec.image_pull_secrets.as_ref().map(|secrets| {
                        secrets
                            .iter()
                            .map(|secret| LocalObjectReference {
                                name: secret.name.clone(),
                            })
                            .collect()
                    }),
                    ..PodSpec::default()
                }),
            },
            ..DaemonSetSpec::default()
        }),
        ..DaemonSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{content_version, workload_labels, workload_name};
    use crate::test_utils::{test_owner_ref, warm_image, warm_image_with_secrets};

    #[test]
    fn daemon_set_carries_identity_labels_and_owner() {
        let resource = warm_image("img-a", "nginx:1.0", "1");
        let version = content_version(&resource.spec).expect("hash spec");
        let owner = test_owner_ref();

        let ds = build_daemon_set(&resource, "img-a", &version, &owner);

        assert_eq!(
            ds.metadata.name.as_deref(),
            Some(workload_name("img-a", &version).as_str())
        );
        let labels = workload_labels("img-a", &version);
        assert_eq!(ds.metadata.labels.as_ref(), Some(&labels));
        assert_eq!(ds.metadata.owner_references.as_deref(), Some(&[owner][..]));

        let spec = ds.spec.expect("daemon set spec");
        // apps/v1 requires the selector to match the pod template labels
        assert_eq!(spec.selector.match_labels.as_ref(), Some(&labels));
        let template_meta = spec.template.metadata.expect("template metadata");
        assert_eq!(template_meta.labels.as_ref(), Some(&labels));

        let pod = spec.template.spec.expect("pod spec");
        assert_eq!(pod.containers.len(), 1);
        assert_eq!(pod.containers[0].image.as_deref(), Some("nginx:1.0"));
        assert!(pod.image_pull_secrets.is_none());
    }

    #[test]
    fn pull_secrets_are_propagated_verbatim() {
        let resource = warm_image_with_secrets("img-a", "nginx:1.0", "1", &["creds-a", "creds-b"]);
        let version = content_version(&resource.spec).expect("hash spec");

        let ds = build_daemon_set(&resource, "img-a", &version, &test_owner_ref());

        let pod = ds
            .spec
            .and_then(|spec| spec.template.spec)
            .expect("pod spec");
        let secrets = pod.image_pull_secrets.expect("pull secrets");
        let names: Vec<_> = secrets.iter().map(|s| Some(s.name.as_str())).collect();
        assert_eq!(names, vec![Some("creds-a"), Some("creds-b")]);
    }

    #[test]
    fn builder_output_is_repeatable() {
        let resource = warm_image("img-a", "nginx:1.0", "1");
        let version = content_version(&resource.spec).expect("hash spec");
        let owner = test_owner_ref();

        let first = build_daemon_set(&resource, "img-a", &version, &owner);
        let second = build_daemon_set(&resource, "img-a", &version, &owner);
        assert_eq!(
            serde_json::to_value(&first).expect("serialize first"),
            serde_json::to_value(&second).expect("serialize second"),
        );
    }
}
