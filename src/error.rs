//! Error types for the node harness
//!
//! Errors are structured with fields to aid debugging in test logs. Command
//! failures carry the captured output streams; timeouts carry the message of
//! the poll that expired.

use std::time::Duration;

use thiserror::Error;

use crate::container::ExecOutput;

/// Main error type for kindling operations
#[derive(Debug, Error)]
pub enum Error {
    /// A command executed inside the node exited with a non-zero status
    #[error("{binary} {subcommand} exited with status code {exit_code}")]
    CommandFailed {
        /// Binary that was invoked (e.g. "kubeadm")
        binary: String,
        /// First argument, identifying the operation (e.g. "init")
        subcommand: String,
        /// Exit code reported by the container runtime
        exit_code: i64,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// A bounded poll never observed success
    #[error("{message} (timed out after {timeout:?})")]
    ReadinessTimeout {
        /// Description of the condition that was being waited for
        message: String,
        /// The deadline that expired
        timeout: Duration,
    },

    /// The admin kubeconfig could not be read out of the node
    #[error("failed to extract kubeconfig from node: {message}")]
    CredentialExtraction {
        /// Description of what failed
        message: String,
    },

    /// The admin kubeconfig was read but its structure is not usable
    #[error("invalid kubeconfig: {message}")]
    InvalidKubeconfig {
        /// Description of what's malformed
        message: String,
    },

    /// The container runtime collaborator reported a failure
    #[error("container runtime error: {message}")]
    Container {
        /// Description of what failed
        message: String,
    },

    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },
}

impl Error {
    /// Create a command failure from the captured output of a failed command
    pub fn command_failed(
        binary: impl Into<String>,
        subcommand: impl Into<String>,
        output: ExecOutput,
    ) -> Self {
        Self::CommandFailed {
            binary: binary.into(),
            subcommand: subcommand.into(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }

    /// Create a readiness timeout error
    pub fn readiness_timeout(message: impl Into<String>, timeout: Duration) -> Self {
        Self::ReadinessTimeout {
            message: message.into(),
            timeout,
        }
    }

    /// Create a credential extraction error
    pub fn credential_extraction(message: impl Into<String>) -> Self {
        Self::CredentialExtraction {
            message: message.into(),
        }
    }

    /// Create an invalid kubeconfig error
    pub fn invalid_kubeconfig(message: impl Into<String>) -> Self {
        Self::InvalidKubeconfig {
            message: message.into(),
        }
    }

    /// Create a container runtime error
    pub fn container(message: impl Into<String>) -> Self {
        Self::Container {
            message: message.into(),
        }
    }

    /// Check whether this error is a readiness timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ReadinessTimeout { .. })
    }
}
