//! Kubernetes-backed cluster client
//!
//! Thin, typed wrapper over `kube::Api` for the objects the controller
//! reads and writes. Status-code handling lives here and nowhere else.

use crate::cluster_trait::{ClusterClientTrait, WarmImageStream};
use crate::error::ClusterError;
use crate::selector::Selector;
use crds::WarmImage;
use futures::{StreamExt, TryStreamExt};
use k8s_openapi::Resource;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams, PostParams, WatchParams};
use tracing::debug;

/// Grace period for DaemonSet deletion, in seconds
const DELETE_GRACE_PERIOD_SECONDS: u32 = 5;

/// Kubernetes API client scoped to the controller's operating namespace
pub struct ClusterClient {
    namespace: String,
    daemon_sets: Api<DaemonSet>,
    deployments: Api<Deployment>,
    warm_images: Api<WarmImage>,
}

impl ClusterClient {
    /// Creates a client operating in the given namespace
    ///
    /// DaemonSets and the owning Deployment are namespaced; WarmImage
    /// resources are watched cluster-wide.
    #[must_use]
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            daemon_sets: Api::namespaced(client.clone(), &namespace),
            deployments: Api::namespaced(client.clone(), &namespace),
            warm_images: Api::all(client),
            namespace,
        }
    }
}

/// Lifts conflict, not-found, and expired-cursor responses into typed variants
fn map_kube_error(err: kube::Error) -> ClusterError {
    match err {
        kube::Error::Api(response) if response.code == 409 => {
            ClusterError::AlreadyExists(response.message)
        }
        kube::Error::Api(response) if response.code == 410 => {
            ClusterError::CursorExpired(response.message)
        }
        kube::Error::Api(response) if response.code == 404 => {
            ClusterError::NotFound(response.message)
        }
        other => ClusterError::Kube(other),
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for ClusterClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn owner_reference(&self, deployment: &str) -> Result<OwnerReference, ClusterError> {
        let owner = self
            .deployments
            .get(deployment)
            .await
            .map_err(map_kube_error)?;
        let uid = owner.metadata.uid.ok_or_else(|| {
            ClusterError::InvalidObject(format!("Deployment {deployment} has no uid"))
        })?;
        Ok(OwnerReference {
            api_version: Deployment::API_VERSION.to_string(),
            kind: Deployment::KIND.to_string(),
            name: deployment.to_string(),
            uid,
            controller: Some(true),
            block_owner_deletion: Some(true),
        })
    }

    async fn create_daemon_set(&self, daemon_set: &DaemonSet) -> Result<DaemonSet, ClusterError> {
        debug!(
            "Creating DaemonSet {}/{}",
            self.namespace,
            daemon_set.metadata.name.as_deref().unwrap_or("<unnamed>")
        );
        self.daemon_sets
            .create(&PostParams::default(), daemon_set)
            .await
            .map_err(map_kube_error)
    }

    async fn list_daemon_sets(&self, selector: &Selector) -> Result<Vec<DaemonSet>, ClusterError> {
        let params = ListParams::default().labels(&selector.to_string());
        let list = self
            .daemon_sets
            .list(&params)
            .await
            .map_err(map_kube_error)?;
        Ok(list.items)
    }

    async fn delete_daemon_set(&self, name: &str) -> Result<(), ClusterError> {
        debug!("Deleting DaemonSet {}/{}", self.namespace, name);
        let params = DeleteParams::foreground().grace_period(DELETE_GRACE_PERIOD_SECONDS);
        self.daemon_sets
            .delete(name, &params)
            .await
            .map(|_| ())
            .map_err(map_kube_error)
    }

    async fn watch_warm_images(&self, cursor: &str) -> Result<WarmImageStream, ClusterError> {
        debug!("Opening WarmImage watch at cursor {cursor:?}");
        let stream = self
            .warm_images
            .watch(&WatchParams::default(), cursor)
            .await
            .map_err(map_kube_error)?;
        Ok(stream.map_err(map_kube_error).boxed())
    }
}
