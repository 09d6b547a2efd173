//! Node configuration
//!
//! Timeouts default to values that hold up on loaded CI machines: address
//! assignment is quick, full control-plane convergence is not.

use std::time::Duration;

/// Configuration for a single-node control plane.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Kubernetes node name of the control-plane container (its hostname);
    /// the taint-removal step targets this name
    pub node_name: String,

    /// Delay between the bootstrap trigger and the first container
    /// interaction, giving the in-container init system time to stabilize
    pub settle_delay: Duration,

    /// Deadline for the container's bridge-network address to be assigned
    pub address_timeout: Duration,

    /// Deadline for a cluster node to report a Ready condition
    pub ready_timeout: Duration,

    /// Interval between readiness poll attempts
    pub poll_interval: Duration,

    /// Connect timeout for the cluster client
    pub connect_timeout: Duration,

    /// Read timeout for the cluster client
    pub read_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: "kindling-control-plane".to_string(),
            settle_delay: Duration::from_secs(5),
            address_timeout: Duration::from_secs(60),
            ready_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(250),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
        }
    }
}

impl NodeConfig {
    /// Set the node name
    pub fn with_node_name(mut self, name: impl Into<String>) -> Self {
        self.node_name = name.into();
        self
    }

    /// Set the pre-bootstrap settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the address-resolution deadline
    pub fn with_address_timeout(mut self, timeout: Duration) -> Self {
        self.address_timeout = timeout;
        self
    }

    /// Set the cluster-readiness deadline
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Set the interval between poll attempts
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
