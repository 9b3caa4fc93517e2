//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the cluster
//! client, reconciler, and watcher together for the WarmImage Controller.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use cluster_client::{ClusterClient, ClusterClientTrait};
use kube::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for WarmImage management.
pub struct Controller {
    watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    ///
    /// Resolving the owner reference is a startup dependency: every
    /// generated workload carries it, so failure here is fatal rather than
    /// something to limp along without.
    pub async fn new(namespace: String, owner_name: String) -> Result<Self, ControllerError> {
        info!("Initializing WarmImage Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default()
            .await
            .map_err(|e| ControllerError::Cluster(e.into()))?;

        let client = Arc::new(ClusterClient::new(kube_client, namespace.clone()));

        // Generated workloads are owned by our own Deployment so they are
        // garbage-collected with the controller
        let owner_ref = client.owner_reference(&owner_name).await?;
        info!(
            "Generated workloads will be owned by Deployment {}/{}",
            namespace, owner_name
        );

        let reconciler = Arc::new(Reconciler::new(client.clone(), owner_ref));
        let watcher_instance = Watcher::new(client, reconciler);

        // Start the watcher in a background task
        let watcher = tokio::spawn(async move { watcher_instance.run().await });

        Ok(Self { watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("WarmImage Controller running");

        self.watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("WarmImage watcher panicked: {e}")))?
    }
}
