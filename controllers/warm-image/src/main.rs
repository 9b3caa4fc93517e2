//! WarmImage Controller
//!
//! Keeps declared images pre-pulled on every node.
//!
//! This controller watches `WarmImage` CRDs and materializes each one as a
//! DaemonSet pinned to the resource's content version, so every node keeps
//! the declared image resident and stale generations are torn down.

mod backoff;
mod controller;
mod error;
mod identity;
mod reconciler;
mod watcher;
mod workload;

#[cfg(test)]
mod test_utils;

use crate::error::ControllerError;
use controller::Controller;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting WarmImage Controller");

    // Load configuration from environment variables
    let namespace = env::var("MY_NAMESPACE").map_err(|_| {
        ControllerError::InvalidConfig("MY_NAMESPACE environment variable is required".to_string())
    })?;
    let owner_name = env::var("OWNER_NAME").map_err(|_| {
        ControllerError::InvalidConfig("OWNER_NAME environment variable is required".to_string())
    })?;

    info!("Configuration:");
    info!("  Namespace: {}", namespace);
    info!("  Owner Deployment: {}", owner_name);

    // Initialize and run controller
    let controller = Controller::new(namespace, owner_name).await?;
    controller.run().await?;

    Ok(())
}
