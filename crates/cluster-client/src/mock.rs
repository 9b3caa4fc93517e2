//! Mock cluster client for unit testing
//!
//! In-memory implementation of `ClusterClientTrait` that stores DaemonSets
//! in a map, replays scripted watch subscriptions, and records the calls it
//! sees so tests can assert on them. No running cluster required.

// Test-support code; a poisoned lock here is a test bug.
#![allow(clippy::unwrap_used)]

use crate::cluster_trait::{ClusterClientTrait, WarmImageStream};
use crate::error::ClusterError;
use crate::selector::Selector;
use crds::WarmImage;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::WatchEvent;
use kube::core::ErrorResponse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted events for one watch subscription attempt
pub type WatchScript = Vec<Result<WatchEvent<WarmImage>, ClusterError>>;

/// Mock cluster client for testing
#[derive(Clone, Default)]
pub struct MockClusterClient {
    namespace: String,
    owner_uid: String,
    // In-memory storage for generated workloads
    daemon_sets: Arc<Mutex<HashMap<String, DaemonSet>>>,
    // One entry per subscription attempt; popped front on each watch call
    watch_scripts: Arc<Mutex<VecDeque<WatchScript>>>,
    // Call records for assertions
    watch_cursors: Arc<Mutex<Vec<String>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    // Failure injection
    create_failure: Arc<Mutex<Option<ClusterError>>>,
    failing_deletes: Arc<Mutex<HashSet<String>>>,
}

impl MockClusterClient {
    /// Creates a new mock client operating in `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            owner_uid: "6a9c6cdd-0000-4000-8000-000000000000".to_string(),
            ..Self::default()
        }
    }

    /// Seeds a DaemonSet into the mock store (for test setup)
    pub fn add_daemon_set(&self, daemon_set: DaemonSet) {
        let name = daemon_set
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| "<unnamed>".to_string());
        self.daemon_sets.lock().unwrap().insert(name, daemon_set);
    }

    /// Names of DaemonSets currently in the store, sorted
    pub fn daemon_set_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.daemon_sets.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Queues a scripted watch subscription (for test setup)
    pub fn push_watch_script(&self, script: WatchScript) {
        self.watch_scripts.lock().unwrap().push_back(script);
    }

    /// Cursors passed to `watch_warm_images`, in call order
    pub fn watch_cursors(&self) -> Vec<String> {
        self.watch_cursors.lock().unwrap().clone()
    }

    /// Names passed to `delete_daemon_set`, in call order, including
    /// deletions that were injected to fail
    pub fn deleted_names(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Makes the next create call fail with `err`
    pub fn fail_next_create(&self, err: ClusterError) {
        *self.create_failure.lock().unwrap() = Some(err);
    }

    /// Makes every delete of `name` fail with a server error
    pub fn fail_deletes_of(&self, name: impl Into<String>) {
        self.failing_deletes.lock().unwrap().insert(name.into());
    }

    /// Builds a typed API error (for failure-injection scripts)
    pub fn api_error(code: u16, message: impl Into<String>) -> ClusterError {
        ClusterError::Kube(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.into(),
            reason: String::new(),
            code,
        }))
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn owner_reference(&self, deployment: &str) -> Result<OwnerReference, ClusterError> {
        Ok(OwnerReference {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            name: deployment.to_string(),
            uid: self.owner_uid.clone(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        })
    }

    async fn create_daemon_set(&self, daemon_set: &DaemonSet) -> Result<DaemonSet, ClusterError> {
        if let Some(err) = self.create_failure.lock().unwrap().take() {
            return Err(err);
        }
        let name = daemon_set
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClusterError::InvalidObject("DaemonSet has no name".to_string()))?;
        let mut store = self.daemon_sets.lock().unwrap();
        if store.contains_key(&name) {
            return Err(ClusterError::AlreadyExists(name));
        }
        store.insert(name, daemon_set.clone());
        Ok(daemon_set.clone())
    }

    async fn list_daemon_sets(&self, selector: &Selector) -> Result<Vec<DaemonSet>, ClusterError> {
        let store = self.daemon_sets.lock().unwrap();
        let mut items: Vec<DaemonSet> = store
            .values()
            .filter(|ds| {
                ds.metadata
                    .labels
                    .as_ref()
                    .is_some_and(|labels| selector.matches(labels))
            })
            .cloned()
            .collect();
        items.sort_by_key(|ds| ds.metadata.name.clone());
        Ok(items)
    }

    async fn delete_daemon_set(&self, name: &str) -> Result<(), ClusterError> {
        self.deleted.lock().unwrap().push(name.to_string());
        if self.failing_deletes.lock().unwrap().contains(name) {
            return Err(Self::api_error(500, format!("delete of {name} failed")));
        }
        match self.daemon_sets.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(ClusterError::NotFound(name.to_string())),
        }
    }

    async fn watch_warm_images(&self, cursor: &str) -> Result<WarmImageStream, ClusterError> {
        self.watch_cursors.lock().unwrap().push(cursor.to_string());
        let script = self
            .watch_scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(futures::stream::iter(script).boxed())
    }
}
