//! Admin kubeconfig extraction and patching
//!
//! `kubeadm init` writes an admin kubeconfig whose server endpoint is the
//! container's internal address. From outside the container only the mapped
//! host port is reachable, so the server field of the first cluster entry is
//! rewritten before a client is built from the document. The document itself
//! is owned by the Kubernetes tooling and treated as opaque beyond that one
//! field.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::config::NodeConfig;
use crate::container::NodeContainer;
use crate::{Error, Result, ADMIN_KUBECONFIG_PATH, API_SERVER_PORT};

/// Rewrite the first cluster entry's server endpoint to `server_url`.
///
/// Pure transformation of the kubeconfig text, separately testable. The
/// output is a deterministic re-serialization, so patching an already
/// patched document with the same URL yields a byte-identical result.
pub fn patch_server_address(kubeconfig: &str, server_url: &str) -> Result<String> {
    let mut doc: Value = serde_yaml::from_str(kubeconfig)
        .map_err(|e| Error::invalid_kubeconfig(format!("failed to parse document: {e}")))?;

    let clusters = doc
        .get_mut("clusters")
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| Error::invalid_kubeconfig("missing clusters list"))?;

    let first = clusters
        .first_mut()
        .ok_or_else(|| Error::invalid_kubeconfig("clusters list is empty"))?;

    let cluster = first
        .get_mut("cluster")
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| Error::invalid_kubeconfig("cluster entry has no cluster mapping"))?;

    cluster.insert(
        Value::String("server".to_string()),
        Value::String(server_url.to_string()),
    );

    serde_yaml::to_string(&doc)
        .map_err(|e| Error::invalid_kubeconfig(format!("failed to serialize document: {e}")))
}

/// Build a cluster client for the node's externally reachable endpoint.
///
/// Copies the admin kubeconfig out of the container, rewrites its server
/// endpoint to `https://<host>:<mapped API port>`, and constructs a client
/// from the patched document. A missing or unreadable credentials file is a
/// fatal [`Error::CredentialExtraction`]; a structurally unusable document
/// is a fatal [`Error::InvalidKubeconfig`]. Neither is retried.
pub async fn build_client<C>(node: &C, config: &NodeConfig) -> Result<Client>
where
    C: NodeContainer + ?Sized,
{
    let raw = node
        .download(ADMIN_KUBECONFIG_PATH)
        .await
        .map_err(|e| Error::credential_extraction(format!("{ADMIN_KUBECONFIG_PATH}: {e}")))?;

    let api_port = node.mapped_port(API_SERVER_PORT).await?;
    let server_url = format!("https://{}:{}", node.host(), api_port);
    debug!(server = %server_url, "patching admin kubeconfig server endpoint");

    let patched = patch_server_address(&raw, &server_url)?;

    let kubeconfig: Kubeconfig = serde_yaml::from_str(&patched)
        .map_err(|e| Error::invalid_kubeconfig(format!("failed to load document: {e}")))?;

    let mut client_config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| Error::invalid_kubeconfig(format!("unusable credentials: {e}")))?;
    client_config.connect_timeout = Some(config.connect_timeout);
    client_config.read_timeout = Some(config.read_timeout);

    let client = Client::try_from(client_config)?;
    info!(server = %server_url, "built cluster client");
    Ok(client)
}
