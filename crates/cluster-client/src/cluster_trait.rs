//! ClusterClient trait for mocking
//!
//! This trait abstracts the Kubernetes API surface the controller touches,
//! so reconciler and watcher tests can run against an in-memory mock.

use crate::error::ClusterError;
use crate::selector::Selector;
use crds::WarmImage;
use futures::stream::BoxStream;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::WatchEvent;

/// A resumable stream of WarmImage change events
pub type WarmImageStream = BoxStream<'static, Result<WatchEvent<WarmImage>, ClusterError>>;

/// Trait for Kubernetes API operations used by the warm-image controller
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    /// The namespace generated workloads are created in
    fn namespace(&self) -> &str;

    /// Reads the named Deployment and builds the controlling owner reference
    /// attached to every generated workload
    async fn owner_reference(&self, deployment: &str) -> Result<OwnerReference, ClusterError>;

    /// Creates a DaemonSet in the operating namespace
    async fn create_daemon_set(&self, daemon_set: &DaemonSet) -> Result<DaemonSet, ClusterError>;

    /// Lists DaemonSets in the operating namespace matching the selector
    async fn list_daemon_sets(&self, selector: &Selector) -> Result<Vec<DaemonSet>, ClusterError>;

    /// Deletes a DaemonSet by name with foreground propagation and a short
    /// grace period, so node-level teardown is orderly
    async fn delete_daemon_set(&self, name: &str) -> Result<(), ClusterError>;

    /// Opens a cluster-wide watch on WarmImage resources, resuming from
    /// `cursor` (empty string subscribes fresh per platform semantics)
    async fn watch_warm_images(&self, cursor: &str) -> Result<WarmImageStream, ClusterError>;
}
