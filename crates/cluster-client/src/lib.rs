//! Kubernetes API facade for the warm-image controller
//!
//! Wraps the handful of Kubernetes operations the controller needs: creating,
//! listing, and deleting DaemonSets by label selector, resolving the owning
//! Deployment, and watching WarmImage resources with a resume cursor.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterClient, ClusterClientTrait, Selector};
//!
//! # async fn example() -> Result<(), cluster_client::ClusterError> {
//! let kube = kube::Client::try_default().await?;
//! let client = ClusterClient::new(kube, "warm-image-system");
//!
//! // Find every generated workload for a resource name
//! let selector = Selector::new().matching("name", "img-a");
//! let sets = client.list_daemon_sets(&selector).await?;
//! # let _ = sets;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cluster_trait;
pub mod error;
pub mod selector;

pub mod mock;

pub use client::ClusterClient;
pub use cluster_trait::{ClusterClientTrait, WarmImageStream};
pub use error::ClusterError;
pub use selector::{LabelPredicate, Selector};

pub use mock::MockClusterClient;
