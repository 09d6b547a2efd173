//! Stories about the cluster readiness gate: the caller-facing side of the
//! bootstrap, and the only place bootstrap failure becomes observable.

use std::net::IpAddr;

use async_trait::async_trait;
use kindling::{Error, ExecOutput, KindNode, NodeContainer, Result};

use super::fake::FakeNode;
use super::{fast_config, init_test_env};

/// Story: no client before the node was observed to start
#[tokio::test]
async fn story_wait_ready_rejects_unstarted_node() {
    init_test_env();
    let node = KindNode::new(FakeNode::new(), fast_config());

    let err = match node.wait_ready().await {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    match err {
        Error::Container { message } => {
            assert!(message.contains("before container start"));
        }
        other => panic!("expected Container error, got {other}"),
    }
    assert!(node.client().is_none());
}

/// Story: a bootstrap that never converges surfaces as a gate timeout
///
/// Cluster init fails inside the container, so no API server ever comes up
/// behind the mapped port. The sequencer swallows its own failure; the
/// caller sees exactly one thing: the readiness gate timing out.
#[tokio::test]
async fn story_failed_bootstrap_surfaces_as_gate_timeout() {
    init_test_env();
    let node = KindNode::new(FakeNode::new().with_exit_code("kubeadm", 1), fast_config());

    node.on_container_start();
    node.observe_log("first line");

    let err = match node.wait_ready().await {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    assert!(err.is_timeout());
    assert!(err.to_string().contains("No node became ready"));
    assert!(node.client().is_none());
}

/// Story: a missing admin kubeconfig is a credential extraction failure
#[tokio::test]
async fn story_missing_admin_kubeconfig_is_credential_extraction() {
    init_test_env();
    let node = KindNode::new(FakeNode::new().without_admin_kubeconfig(), fast_config());

    node.on_container_start();

    let err = match node.wait_ready().await {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    match err {
        Error::CredentialExtraction { message } => {
            assert!(message.contains("/etc/kubernetes/admin.conf"));
        }
        other => panic!("expected CredentialExtraction error, got {other}"),
    }
}

/// Story: an unmapped API server port is a collaborator error
#[tokio::test]
async fn story_unmapped_api_port_is_a_container_error() {
    init_test_env();
    let err = match kindling::kubeconfig::build_client(&UnmappedNode(FakeNode::new()), &fast_config())
        .await
    {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    assert!(matches!(err, Error::Container { .. }));
}

/// Fake whose runtime never exposed the API server port.
struct UnmappedNode(FakeNode);

#[async_trait]
impl NodeContainer for UnmappedNode {
    async fn exec(&self, command: &[String]) -> Result<ExecOutput> {
        self.0.exec(command).await
    }
    async fn upload(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.0.upload(path, contents).await
    }
    async fn download(&self, path: &str) -> Result<String> {
        self.0.download(path).await
    }
    async fn bridge_address(&self) -> Result<Option<IpAddr>> {
        self.0.bridge_address().await
    }
    async fn mapped_port(&self, container_port: u16) -> Result<u16> {
        Err(Error::container(format!(
            "port {container_port} is not mapped"
        )))
    }
    fn host(&self) -> String {
        self.0.host()
    }
}
