//! Control-plane node orchestration
//!
//! [`KindNode`] owns the bootstrap lifecycle of the single control-plane
//! container. The container itself belongs to the runtime collaborator; this
//! type tracks what has happened to it and drives the one-shot bootstrap
//! sequence from the container's log stream.
//!
//! All shared state is atomics and write-once cells. The bootstrap task is
//! the only writer of the trigger flag, the resolved address, and the
//! sequencer phase, so no locking is needed anywhere.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use kube::Client;
use tracing::{error, info};

use crate::bootstrap::{self, BootstrapPhase};
use crate::config::NodeConfig;
use crate::container::NodeContainer;
use crate::{kubeconfig, readiness, Error, Result};

/// Lifecycle states of the managed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodePhase {
    /// Constructed, container not reported started
    NotStarted = 0,
    /// Container runtime reported the container is starting
    Starting = 1,
    /// First log output observed, bootstrap in progress
    Initializing = 2,
    /// A cluster node reported Ready; the client is available
    Ready = 3,
    /// Container runtime reported the container stopped
    Stopped = 4,
    /// Bootstrap failed; the node will never become ready
    Failed = 5,
}

impl NodePhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Starting,
            2 => Self::Initializing,
            3 => Self::Ready,
            4 => Self::Stopped,
            5 => Self::Failed,
            _ => Self::NotStarted,
        }
    }
}

/// Shared mutable state of a node, written by the bootstrap task and read by
/// everyone else.
pub(crate) struct NodeState {
    triggered: AtomicBool,
    node_phase: AtomicU8,
    bootstrap_phase: AtomicU8,
    address: OnceLock<IpAddr>,
}

impl NodeState {
    fn new() -> Self {
        Self {
            triggered: AtomicBool::new(false),
            node_phase: AtomicU8::new(NodePhase::NotStarted as u8),
            bootstrap_phase: AtomicU8::new(BootstrapPhase::Idle as u8),
            address: OnceLock::new(),
        }
    }

    /// Claim the bootstrap trigger. Returns true exactly once per node, no
    /// matter how many log events race here.
    fn trigger(&self) -> bool {
        self.triggered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set_bootstrap_phase(&self, phase: BootstrapPhase) {
        self.bootstrap_phase.store(phase as u8, Ordering::Release);
    }

    fn bootstrap_phase(&self) -> BootstrapPhase {
        BootstrapPhase::from_u8(self.bootstrap_phase.load(Ordering::Acquire))
    }

    fn set_node_phase(&self, phase: NodePhase) {
        self.node_phase.store(phase as u8, Ordering::Release);
    }

    fn node_phase(&self) -> NodePhase {
        NodePhase::from_u8(self.node_phase.load(Ordering::Acquire))
    }

    /// Record the resolved address. The first recorded value sticks for the
    /// lifetime of the node; the effective address is returned.
    pub(crate) fn record_address(&self, address: IpAddr) -> IpAddr {
        *self.address.get_or_init(|| address)
    }

    fn address(&self) -> Option<IpAddr> {
        self.address.get().copied()
    }
}

/// A single-node Kubernetes control plane hosted in a managed container.
///
/// Wire the runtime collaborator to the node like this: call
/// [`on_container_start`](Self::on_container_start) when the container is
/// being started, deliver every container log line to
/// [`observe_log`](Self::observe_log), and once the runtime reports the
/// container as started, call [`wait_ready`](Self::wait_ready) to obtain a
/// cluster client backed by a Ready node.
pub struct KindNode<C: NodeContainer> {
    container: Arc<C>,
    config: NodeConfig,
    state: Arc<NodeState>,
    client: OnceLock<Client>,
}

impl<C: NodeContainer> KindNode<C> {
    /// Create a node orchestrator for an already-created container.
    pub fn new(container: C, config: NodeConfig) -> Self {
        Self {
            container: Arc::new(container),
            config,
            state: Arc::new(NodeState::new()),
            client: OnceLock::new(),
        }
    }

    /// The container collaborator backing this node.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// The node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> NodePhase {
        self.state.node_phase()
    }

    /// Current bootstrap sequencer phase.
    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        self.state.bootstrap_phase()
    }

    /// The node's resolved bridge address, once the sequencer has found it.
    pub fn address(&self) -> Option<IpAddr> {
        self.state.address()
    }

    /// The cluster client, once [`wait_ready`](Self::wait_ready) succeeded.
    pub fn client(&self) -> Option<Client> {
        self.client.get().cloned()
    }

    /// Collaborator notification: the container is being started.
    pub fn on_container_start(&self) {
        let _ = self.state.node_phase.compare_exchange(
            NodePhase::NotStarted as u8,
            NodePhase::Starting as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Collaborator notification: the container has stopped.
    pub fn on_container_stop(&self) {
        self.state.set_node_phase(NodePhase::Stopped);
    }

    /// Deliver one line of container log output.
    ///
    /// The first delivery triggers the bootstrap sequence on a background
    /// task; every later delivery (or a concurrent racing one) is a no-op.
    /// The line content is not inspected - log output flowing at all is the
    /// signal that the in-container init system is alive.
    ///
    /// Bootstrap failures are logged by the supervising task and never
    /// propagate to the log-forwarding caller; a failed bootstrap surfaces
    /// as [`wait_ready`](Self::wait_ready) timing out.
    pub fn observe_log(&self, _line: &str) {
        if !self.state.trigger() {
            return;
        }

        self.state.set_bootstrap_phase(BootstrapPhase::Triggered);
        self.state.set_node_phase(NodePhase::Initializing);
        info!("first log output observed, scheduling control plane bootstrap");

        let container = Arc::clone(&self.container);
        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        tokio::spawn(async move {
            if let Err(err) = bootstrap::run(&*container, &state, &config).await {
                state.set_bootstrap_phase(BootstrapPhase::Failed);
                state.set_node_phase(NodePhase::Failed);
                error!(error = %err, "failed to initialize node");
            }
        });
    }

    /// Block until the cluster is usable and return a client for it.
    ///
    /// Must be called after the container runtime reports the container as
    /// started; a client is never constructed for a node that was not
    /// observed to start. Builds the client from the extracted and patched
    /// admin kubeconfig, then polls until a cluster node reports Ready. The
    /// bootstrap task runs concurrently; this gate converging is the only
    /// success signal it has.
    pub async fn wait_ready(&self) -> Result<Client> {
        if let Some(client) = self.client.get() {
            return Ok(client.clone());
        }
        if self.phase() == NodePhase::NotStarted {
            return Err(Error::container(
                "cluster client requested before container start",
            ));
        }

        let client = kubeconfig::build_client(&*self.container, &self.config).await?;
        let node_name = readiness::wait_for_ready_node(
            &client,
            self.config.ready_timeout,
            self.config.poll_interval,
        )
        .await?;
        info!(node = %node_name, "node ready");

        self.state.set_node_phase(NodePhase::Ready);
        Ok(self.client.get_or_init(|| client).clone())
    }
}
