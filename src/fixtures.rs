//! Fixtures for tests running against a provisioned cluster
//!
//! Small helpers for the things nearly every cluster-backed test does:
//! create a throwaway namespace, run a canned pod in it, and probe an
//! HTTP endpoint exposed through a mapped port.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, ContainerPort, Namespace, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use kube::Client;
use rand::Rng;
use uuid::Uuid;

use crate::{Error, Result};

/// Generate a unique identifier usable as a Kubernetes object name.
///
/// Object names must start with a lowercase letter, so this prefixes a
/// random letter to a dashless UUID.
pub fn random_identifier() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    let index = rand::thread_rng().gen_range(0..ALPHABET.len());
    format!("{}{}", ALPHABET[index] as char, Uuid::new_v4().simple())
}

/// Create a uniquely named namespace and return its name.
pub async fn create_namespace(client: &Client) -> Result<String> {
    let name = random_identifier();
    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            ..Default::default()
        },
        ..Default::default()
    };

    let namespaces: Api<Namespace> = Api::all(client.clone());
    namespaces
        .create(&PostParams::default(), &namespace)
        .await?;
    Ok(name)
}

/// A minimal nginx pod labeled `app=nginx`, exposing container port 80.
pub fn simple_pod(name: &str, namespace: &str) -> Pod {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), "nginx".to_string());

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "test".to_string(),
                image: Some("nginx".to_string()),
                ports: Some(vec![ContainerPort {
                    container_port: 80,
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create a uniquely named [`simple_pod`] in `namespace`.
pub async fn create_simple_pod(client: &Client, namespace: &str) -> Result<Pod> {
    let pod = simple_pod(&random_identifier(), namespace);
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    Ok(pods.create(&PostParams::default(), &pod).await?)
}

/// Whether the pod currently reports phase `Running`.
pub async fn is_running(client: &Client, pod: &Pod) -> Result<bool> {
    let namespace = pod.metadata.namespace.as_deref().unwrap_or("default");
    let name = pod
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| Error::container("pod has no name"))?;

    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let current = pods.get(name).await?;
    Ok(current.status.and_then(|status| status.phase).as_deref() == Some("Running"))
}

/// Probe `url` and report whether it answered with a success status.
///
/// Connection failures count as "not up yet", which makes this directly
/// usable as a [`crate::wait::wait_until`] check against a mapped NodePort.
pub async fn http_ok(url: &str) -> bool {
    match reqwest::get(url).await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
