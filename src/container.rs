//! Managed-container collaborator boundary
//!
//! The crate does not start, stop, or configure containers. Whatever runtime
//! manages the control-plane container implements [`NodeContainer`] and the
//! orchestrator drives the bootstrap through it. All methods address the one
//! already-created container backing a [`crate::KindNode`].

use std::net::IpAddr;

use async_trait::async_trait;

use crate::Result;

/// Captured result of a command executed inside the node container.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit code reported by the container runtime
    pub exit_code: i64,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ExecOutput {
    /// Whether the command exited with status code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Operations the orchestrator needs from the container runtime.
///
/// Implementations report their own failures (daemon unreachable, container
/// gone, copy failed) as [`crate::Error::Container`]; the orchestrator adds
/// domain meaning on top (a missing admin kubeconfig becomes a credential
/// extraction failure, a non-zero exit code becomes a command failure).
#[async_trait]
pub trait NodeContainer: Send + Sync + 'static {
    /// Run a command inside the running container and capture its output.
    ///
    /// `command` is the full argument vector, binary first. The container
    /// must be in a running state.
    async fn exec(&self, command: &[String]) -> Result<ExecOutput>;

    /// Write `contents` to `path` inside the container's filesystem.
    async fn upload(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Read the file at `path` from the container's filesystem as UTF-8 text.
    async fn download(&self, path: &str) -> Result<String>;

    /// The container's address on its bridge-style primary network.
    ///
    /// Returns `Ok(None)` while the network is not yet attached; the address
    /// resolver polls until it appears. Inspection failures are errors, not
    /// absence.
    async fn bridge_address(&self) -> Result<Option<IpAddr>>;

    /// The host port mapped to `container_port`.
    async fn mapped_port(&self, container_port: u16) -> Result<u16>;

    /// The externally reachable host address for mapped ports.
    fn host(&self) -> String;
}
