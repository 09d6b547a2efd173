//! One-shot control-plane bootstrap
//!
//! The sequence that turns a freshly started node container into a working
//! single-node cluster: resolve the container's bridge address, render and
//! upload the cluster-init descriptor and the default CNI manifest, run
//! `kubeadm init`, apply the CNI, and remove the control-plane scheduling
//! taint. Each step is fatal on failure; there are no retries. The sequencer
//! is fire-and-forget - its only externally observable success signal is the
//! cluster readiness gate converging.

use std::net::IpAddr;

use tracing::info;

use crate::config::NodeConfig;
use crate::container::{ExecOutput, NodeContainer};
use crate::exec::run_in_node;
use crate::node::NodeState;
use crate::wait::wait_until;
use crate::{Result, ADMIN_KUBECONFIG_PATH, DEFAULT_CNI_PATH, KUBEADM_CONFIG_PATH};

/// Substitution token in the cluster-init descriptor template, replaced with
/// the node's resolved bridge address
pub const NODE_IP_TOKEN: &str = "${NODE_IP}";

/// Cluster-init descriptor template, parameterized by [`NODE_IP_TOKEN`].
/// Owned by the kubeadm tooling in the node image; treated as opaque here.
const KUBEADM_TEMPLATE: &str = include_str!("../templates/kubeadm.conf");

/// Static default CNI manifest applied after cluster init
const DEFAULT_CNI_MANIFEST: &str = include_str!("../templates/default-cni.yaml");

/// States of the bootstrap sequencer.
///
/// `Idle -> Triggered` fires at most once per node, on the first observed
/// log event; the remaining transitions run in order on the background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootstrapPhase {
    /// No trigger observed yet
    Idle = 0,
    /// First log event observed, background task scheduled
    Triggered = 1,
    /// Waiting for the container's bridge address
    AddressResolving = 2,
    /// Uploading the rendered descriptor and CNI manifest
    ConfigUploading = 3,
    /// `kubeadm init` running inside the node
    ClusterInitRunning = 4,
    /// Applying the default CNI manifest
    NetworkApplying = 5,
    /// Removing the control-plane scheduling taint
    TaintRemoving = 6,
    /// Bootstrap completed
    Done = 7,
    /// A step failed; the node will never become ready
    Failed = 8,
}

impl BootstrapPhase {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Triggered,
            2 => Self::AddressResolving,
            3 => Self::ConfigUploading,
            4 => Self::ClusterInitRunning,
            5 => Self::NetworkApplying,
            6 => Self::TaintRemoving,
            7 => Self::Done,
            8 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Render the cluster-init descriptor for the given node address.
pub(crate) fn render_bootstrap_config(template: &str, node_ip: &str) -> String {
    template.replace(NODE_IP_TOKEN, node_ip)
}

/// Resolve the node's address on its bridge-style primary network.
///
/// The address may not be assigned immediately after container start, so
/// this polls [`NodeContainer::bridge_address`] until the network reports an
/// address or the deadline expires. Inspection failures propagate
/// immediately; only "network not attached yet" is retried.
pub async fn resolve_node_address<C>(
    node: &C,
    timeout: std::time::Duration,
    poll_interval: std::time::Duration,
) -> Result<IpAddr>
where
    C: NodeContainer + ?Sized,
{
    wait_until(
        timeout,
        poll_interval,
        "Failed to determine container IP address",
        || node.bridge_address(),
    )
    .await
}

/// Run kubectl inside the node against the generated admin kubeconfig.
async fn kubectl<C>(node: &C, subcommand: &str, args: &[&str]) -> Result<ExecOutput>
where
    C: NodeContainer + ?Sized,
{
    let mut full_args = vec!["--kubeconfig", ADMIN_KUBECONFIG_PATH];
    full_args.extend_from_slice(args);
    run_in_node(node, "kubectl", subcommand, &full_args).await
}

/// Execute the bootstrap sequence against a triggered node.
///
/// Called exactly once per node, from the supervised background task spawned
/// by [`crate::KindNode::observe_log`]. Advances the phase machine as it
/// goes; the caller records `Failed` if this returns an error.
pub(crate) async fn run<C>(node: &C, state: &NodeState, config: &NodeConfig) -> Result<()>
where
    C: NodeContainer + ?Sized,
{
    // Let the in-container init system come up before we touch the
    // filesystem or spawn processes in there.
    tokio::time::sleep(config.settle_delay).await;

    state.set_bootstrap_phase(BootstrapPhase::AddressResolving);
    let address =
        resolve_node_address(node, config.address_timeout, config.poll_interval).await?;
    let address = state.record_address(address);
    info!(%address, "resolved node address");

    state.set_bootstrap_phase(BootstrapPhase::ConfigUploading);
    let descriptor = render_bootstrap_config(KUBEADM_TEMPLATE, &address.to_string());
    info!(path = KUBEADM_CONFIG_PATH, "writing cluster-init descriptor");
    node.upload(KUBEADM_CONFIG_PATH, descriptor.as_bytes()).await?;
    node.upload(DEFAULT_CNI_PATH, DEFAULT_CNI_MANIFEST.as_bytes())
        .await?;

    state.set_bootstrap_phase(BootstrapPhase::ClusterInitRunning);
    let config_flag = format!("--config={KUBEADM_CONFIG_PATH}");
    // Preflight errors are expected in a container, in particular for swap
    // being enabled on the host.
    run_in_node(
        node,
        "kubeadm",
        "init",
        &["--ignore-preflight-errors=all", config_flag.as_str(), "--v=6"],
    )
    .await?;

    state.set_bootstrap_phase(BootstrapPhase::NetworkApplying);
    kubectl(node, "apply", &["-f", DEFAULT_CNI_PATH]).await?;

    state.set_bootstrap_phase(BootstrapPhase::TaintRemoving);
    kubectl(
        node,
        "taint",
        &[
            "node",
            config.node_name.as_str(),
            "node-role.kubernetes.io/master:NoSchedule-",
        ],
    )
    .await?;

    state.set_bootstrap_phase(BootstrapPhase::Done);
    info!("control plane bootstrap complete");
    Ok(())
}
