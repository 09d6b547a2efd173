//! Cluster readiness gate
//!
//! Bootstrap runs on a background task and never reports back directly; the
//! only trustworthy signal that the cluster is usable is the cluster itself.
//! The gate polls node listings until some node carries a Ready condition
//! with status True.

use std::time::Duration;

use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::{info, trace};

use crate::wait::wait_until;
use crate::Result;

/// The "Ready" condition type on nodes
pub const CONDITION_READY: &str = "Ready";

/// The "True" status value for conditions
pub const STATUS_TRUE: &str = "True";

/// Whether the node's condition list contains `{type: Ready, status: True}`.
fn is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == CONDITION_READY && c.status == STATUS_TRUE)
        })
        .unwrap_or(false)
}

/// Name of the first ready node in the listing, if any.
pub(crate) fn first_ready_node(nodes: &[Node]) -> Option<String> {
    nodes
        .iter()
        .find(|node| is_ready(node))
        .and_then(|node| node.metadata.name.clone())
}

/// Poll node listings until a node reports Ready; returns its name.
///
/// Listing failures count as "not ready yet" rather than aborting the wait:
/// while bootstrap is still converging the API server may not even accept
/// connections, and the gate races the sequencer by design. A bootstrap that
/// never converges therefore surfaces here as a timeout.
pub async fn wait_for_ready_node(
    client: &Client,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String> {
    let nodes: Api<Node> = Api::all(client.clone());
    info!("waiting for a node to become ready");

    wait_until(timeout, poll_interval, "No node became ready", || {
        let nodes = nodes.clone();
        async move {
            match nodes.list(&ListParams::default()).await {
                Ok(list) => Ok(first_ready_node(&list.items)),
                Err(err) => {
                    trace!(error = %err, "node listing unavailable, still waiting");
                    Ok(None)
                }
            }
        }
    })
    .await
}
