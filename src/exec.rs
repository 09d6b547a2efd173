//! In-container command execution
//!
//! Thin layer over [`NodeContainer::exec`] that classifies success by exit
//! code and keeps the captured streams available for the test log. Retry
//! policy belongs to callers; this layer runs a command once.

use tracing::{debug, error, info};

use crate::container::{ExecOutput, NodeContainer};
use crate::{Error, Result};

/// Prefix every line of `text` with `prefix`, for stream logging.
pub(crate) fn indent(prefix: &str, text: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run `binary subcommand args...` inside the node.
///
/// On exit code 0 the captured streams are logged at debug level and returned
/// uninterpreted. On a non-zero exit code both streams are logged at error
/// level and the call fails with [`Error::CommandFailed`]; callers treat this
/// as fatal to the current bootstrap step.
pub async fn run_in_node<C>(
    node: &C,
    binary: &str,
    subcommand: &str,
    args: &[&str],
) -> Result<ExecOutput>
where
    C: NodeContainer + ?Sized,
{
    info!(%binary, %subcommand, "running command in node");

    let mut command = Vec::with_capacity(args.len() + 2);
    command.push(binary.to_string());
    command.push(subcommand.to_string());
    command.extend(args.iter().map(|arg| arg.to_string()));

    let output = node.exec(&command).await?;

    if output.success() {
        info!(
            %binary,
            %subcommand,
            exit_code = output.exit_code,
            "command exited cleanly"
        );
        debug!("{}", indent("STDOUT: ", &output.stdout));
        debug!("{}", indent("STDERR: ", &output.stderr));
        Ok(output)
    } else {
        error!("{}", indent("STDOUT: ", &output.stdout));
        error!("{}", indent("STDERR: ", &output.stderr));
        Err(Error::command_failed(binary, subcommand, output))
    }
}
