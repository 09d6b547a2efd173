//! Shared setup for the orchestrator integration tests.

mod readiness_gate;
mod trigger;

use std::sync::Once;
use std::time::Duration;

use kindling::bootstrap::BootstrapPhase;
use kindling::{KindNode, NodeConfig, NodeContainer};

static INIT: Once = Once::new();

/// Install the tracing subscriber and rustls crypto provider once per run.
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// A config with timeouts scaled down for fake-backed tests.
pub fn fast_config() -> NodeConfig {
    NodeConfig::default()
        .with_settle_delay(Duration::from_millis(5))
        .with_poll_interval(Duration::from_millis(5))
        .with_address_timeout(Duration::from_millis(250))
        .with_ready_timeout(Duration::from_millis(250))
}

/// Poll the sequencer until it reaches `want`, panicking after `timeout`.
pub async fn wait_for_bootstrap_phase<C: NodeContainer>(
    node: &KindNode<C>,
    want: BootstrapPhase,
    timeout: Duration,
) {
    let deadline = tokio::time::Instant::now() + timeout;
    while node.bootstrap_phase() != want {
        if tokio::time::Instant::now() > deadline {
            panic!(
                "timed out waiting for bootstrap phase {:?}, still at {:?}",
                want,
                node.bootstrap_phase()
            );
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
