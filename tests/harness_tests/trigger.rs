//! Stories about the log-event trigger: unordered, repeated, and concurrent
//! log output must start the bootstrap sequence exactly once.

use std::sync::Arc;
use std::time::Duration;

use kindling::bootstrap::BootstrapPhase;
use kindling::{KindNode, NodePhase};

use super::fake::FakeNode;
use super::{fast_config, init_test_env, wait_for_bootstrap_phase};

const PHASE_TIMEOUT: Duration = Duration::from_secs(5);

/// Story: a chatty log stream still boots the cluster once
#[tokio::test]
async fn story_repeated_log_events_trigger_once() {
    init_test_env();
    let node = KindNode::new(FakeNode::new(), fast_config());

    for i in 0..100 {
        node.observe_log(&format!("log line {i}"));
    }
    wait_for_bootstrap_phase(&node, BootstrapPhase::Done, PHASE_TIMEOUT).await;

    assert_eq!(node.container().command_count("kubeadm", "init"), 1);
}

/// Story: log events racing from several tasks still trigger once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn story_concurrent_log_events_trigger_once() {
    init_test_env();
    let node = Arc::new(KindNode::new(FakeNode::new(), fast_config()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let node = Arc::clone(&node);
        handles.push(tokio::spawn(async move {
            node.observe_log(&format!("racing line {i}"));
        }));
    }
    for handle in handles {
        handle.await.expect("log task panicked");
    }

    wait_for_bootstrap_phase(&node, BootstrapPhase::Done, PHASE_TIMEOUT).await;
    assert_eq!(node.container().command_count("kubeadm", "init"), 1);
}

/// Story: lifecycle notifications move the node through its phases
#[tokio::test]
async fn story_lifecycle_phase_transitions() {
    init_test_env();
    let node = KindNode::new(FakeNode::new(), fast_config());
    assert_eq!(node.phase(), NodePhase::NotStarted);
    assert_eq!(node.bootstrap_phase(), BootstrapPhase::Idle);

    node.on_container_start();
    assert_eq!(node.phase(), NodePhase::Starting);

    node.observe_log("first line");
    assert_eq!(node.phase(), NodePhase::Initializing);

    wait_for_bootstrap_phase(&node, BootstrapPhase::Done, PHASE_TIMEOUT).await;

    node.on_container_stop();
    assert_eq!(node.phase(), NodePhase::Stopped);
}

/// A start notification arriving after the trigger does not regress the
/// lifecycle phase.
#[tokio::test]
async fn test_late_start_notification_does_not_regress_phase() {
    init_test_env();
    let node = KindNode::new(FakeNode::new(), fast_config());

    node.observe_log("first line");
    assert_eq!(node.phase(), NodePhase::Initializing);

    node.on_container_start();
    assert_eq!(node.phase(), NodePhase::Initializing);

    wait_for_bootstrap_phase(&node, BootstrapPhase::Done, PHASE_TIMEOUT).await;
}
