//! Kindling - single-node Kubernetes control planes for integration tests
//!
//! Kindling turns one privileged container into a usable Kubernetes cluster:
//! it waits for the container to come up, runs `kubeadm init` inside it,
//! applies a default CNI, removes the control-plane scheduling taint, and
//! hands back a [`kube::Client`] wired to the externally mapped API server
//! port.
//!
//! The container runtime itself is not part of this crate. Whatever starts
//! and stops the container (testcontainers, a CI harness, hand-rolled Docker
//! plumbing) implements the [`container::NodeContainer`] trait and forwards
//! its log stream to [`node::KindNode::observe_log`]; the first observed log
//! line triggers the bootstrap sequence exactly once, on a background task.
//!
//! # Modules
//!
//! - [`node`] - the control-plane node orchestrator ([`KindNode`])
//! - [`bootstrap`] - the one-shot bootstrap sequencer and address resolver
//! - [`container`] - the managed-container collaborator boundary
//! - [`exec`] - in-container command execution with captured output
//! - [`kubeconfig`] - admin kubeconfig extraction and server-address patching
//! - [`readiness`] - the cluster readiness gate (node Ready polling)
//! - [`wait`] - bounded-time readiness polling primitive
//! - [`config`] - node configuration and timeouts
//! - [`fixtures`] - namespace/pod helpers for tests running against the cluster
//! - [`error`] - error types
//!
//! # Example
//!
//! ```ignore
//! use kindling::{KindNode, NodeConfig};
//!
//! let node = KindNode::new(my_container, NodeConfig::default());
//! node.on_container_start();
//! // runtime wiring: deliver each container log line to the node
//! //   node.observe_log(line);
//! let client = node.wait_ready().await?;
//! ```
#![deny(missing_docs)]

pub mod bootstrap;
pub mod config;
pub mod container;
pub mod error;
pub mod exec;
pub mod fixtures;
pub mod kubeconfig;
pub mod node;
pub mod readiness;
pub mod wait;

pub use config::NodeConfig;
pub use container::{ExecOutput, NodeContainer};
pub use error::Error;
pub use node::{KindNode, NodePhase};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Port the API server listens on inside the node container
pub const API_SERVER_PORT: u16 = 6443;

/// In-container path of the rendered cluster-init descriptor
pub const KUBEADM_CONFIG_PATH: &str = "/kind/kubeadm.conf";

/// In-container path of the default CNI manifest
pub const DEFAULT_CNI_PATH: &str = "/kind/default-cni.conf";

/// In-container path of the admin kubeconfig generated by `kubeadm init`
pub const ADMIN_KUBECONFIG_PATH: &str = "/etc/kubernetes/admin.conf";
