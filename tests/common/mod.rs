// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use clusterzone::controller::Controller;
use clusterzone::naming::ManagedZones;
use clusterzone::sync_client::ZoneSyncClient;
use clusterzone::update::HttpUpdateClient;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::runtime::reflector::{self, Store};
use kube::runtime::watcher;
use serde_json::{json, Value};
use std::net::Ipv4Addr;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestController = Controller<HttpUpdateClient, Store<Service>>;

/// Build a Service from its JSON manifest fields.
pub fn service(name: &str, namespace: &str, spec: Value) -> Service {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1",
        },
        "spec": spec,
    }))
    .expect("valid Service manifest")
}

/// Build an Endpoints object from its JSON subsets.
pub fn endpoints(name: &str, namespace: &str, subsets: Value) -> Endpoints {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Endpoints",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1",
        },
        "subsets": subsets,
    }))
    .expect("valid Endpoints manifest")
}

/// Start a DNS update server stub that accepts every call.
pub async fn start_update_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

/// A Service cache pre-populated with `services`.
pub fn service_store(services: &[Service]) -> Store<Service> {
    let (reader, mut writer) = reflector::store::<Service>();
    for svc in services {
        writer.apply_watcher_event(&watcher::Event::Apply(svc.clone()));
    }
    reader
}

/// A controller for `cluster.local.` (services 10.0.0.0/16, pods 10.1.0.0/16).
pub fn controller(server: &MockServer, services: &[Service]) -> TestController {
    let zones = ManagedZones::new("cluster.local", "10.0.0.0/16", "10.1.0.0/16")
        .expect("valid zone layout");
    let updater = HttpUpdateClient::new(&server.uri(), Duration::from_secs(2))
        .expect("HTTP client builds");
    Controller::new(
        ZoneSyncClient::new(updater, zones, Ipv4Addr::new(10, 0, 0, 10)),
        service_store(services),
    )
}

/// (path, JSON body) of every request the stub received, in order.
pub async fn received(server: &MockServer) -> Vec<(String, Value)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
            (request.url.path().to_string(), body)
        })
        .collect()
}
