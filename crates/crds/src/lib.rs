//! WarmImage CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the warm-image controller.

pub mod warm_image;

pub use warm_image::*;
