//! Reconciliation logic for WarmImage resources.
//!
//! Converges generated DaemonSets onto declared intent: after a successful
//! pass exactly one workload exists per live WarmImage, named and labeled by
//! its current content version, and stale generations are gone.

use crate::error::ControllerError;
use crate::identity;
use crate::workload;
use cluster_client::{ClusterClientTrait, ClusterError, Selector};
use crds::WarmImage;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reconciles WarmImage resources against live DaemonSets.
pub struct Reconciler<C> {
    client: Arc<C>,
    owner_ref: OwnerReference,
}

impl<C: ClusterClientTrait> Reconciler<C> {
    /// Creates a new reconciler instance.
    pub fn new(client: Arc<C>, owner_ref: OwnerReference) -> Self {
        Self { client, owner_ref }
    }

    fn resource_name(resource: &WarmImage) -> Result<&str, ControllerError> {
        resource.metadata.name.as_deref().ok_or_else(|| {
            ControllerError::InvalidResource("WarmImage missing metadata.name".to_string())
        })
    }

    /// Reconciles an added or modified WarmImage.
    ///
    /// Creates the DaemonSet for the resource's current content version,
    /// then sweeps away workloads carrying any other version. A name
    /// collision on create means the current generation already exists and
    /// counts as success, so replayed events are no-ops. Creation happens
    /// before deletion: the sweep only ever targets strictly older versions.
    pub async fn reconcile(&self, resource: &WarmImage) -> Result<(), ControllerError> {
        let name = Self::resource_name(resource)?;
        let version = identity::content_version(&resource.spec)?;

        info!("Reconciling WarmImage {} at version {}", name, version);

        let daemon_set = workload::build_daemon_set(resource, name, &version, &self.owner_ref);
        match self.client.create_daemon_set(&daemon_set).await {
            Ok(created) => {
                info!(
                    "Warming up {} with {}",
                    resource.spec.image,
                    created.metadata.name.as_deref().unwrap_or("<unnamed>")
                );
            }
            Err(ClusterError::AlreadyExists(_)) => {
                debug!("DaemonSet for {} version {} already exists", name, version);
            }
            Err(err) => return Err(err.into()),
        }

        self.delete_matching(&identity::other_version_selector(name, &version))
            .await
    }

    /// Tears down every generated workload for a deleted WarmImage.
    pub async fn teardown(&self, resource: &WarmImage) -> Result<(), ControllerError> {
        let name = Self::resource_name(resource)?;
        info!("Tearing down WarmImage {}", name);
        self.delete_matching(&identity::any_version_selector(name))
            .await
    }

    /// Deletes every DaemonSet matching the selector.
    ///
    /// Deletion is best-effort per item: a failed delete is logged and the
    /// sweep moves on to the remaining matches.
    async fn delete_matching(&self, selector: &Selector) -> Result<(), ControllerError> {
        let matches = self.client.list_daemon_sets(selector).await?;
        for daemon_set in matches {
            let Some(name) = daemon_set.metadata.name.as_deref() else {
                warn!("Skipping unnamed DaemonSet matching {}", selector);
                continue;
            };
            match self.client.delete_daemon_set(name).await {
                Ok(()) => info!("Deleted DaemonSet {}", name),
                Err(err) => warn!("Failed to delete DaemonSet {}: {}", name, err),
            }
        }
        Ok(())
    }
}
