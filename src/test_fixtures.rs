// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders and fakes shared by the unit tests.

use crate::controller::ServiceLookup;
use crate::dns_errors::UpdateError;
use crate::naming::ManagedZones;
use crate::update::{DynamicUpdate, WireRRset, WireRRsetKey};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Service, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

pub const UPDATE_ENDPOINT: &str = "127.0.0.1:5555";

pub fn zones() -> ManagedZones {
    ManagedZones::new("cluster.local.", "10.0.0.0/16", "10.1.0.0/16").unwrap()
}

pub fn nameserver() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 10)
}

fn metadata(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        resource_version: Some("1".to_string()),
        ..Default::default()
    }
}

pub fn service(
    name: &str,
    namespace: &str,
    type_: &str,
    cluster_ip: Option<&str>,
    external_name: Option<&str>,
) -> Service {
    Service {
        metadata: metadata(name, namespace),
        spec: Some(ServiceSpec {
            type_: Some(type_.to_string()),
            cluster_ip: cluster_ip.map(str::to_string),
            external_name: external_name.map(str::to_string),
            ..Default::default()
        }),
        status: None,
    }
}

pub fn normal_service(name: &str, namespace: &str, cluster_ip: &str) -> Service {
    service(name, namespace, "ClusterIP", Some(cluster_ip), None)
}

pub fn headless_service(name: &str, namespace: &str) -> Service {
    service(name, namespace, "ClusterIP", Some("None"), None)
}

pub fn external_service(name: &str, namespace: &str, external: &str) -> Service {
    service(name, namespace, "ExternalName", None, Some(external))
}

pub fn address(ip: &str, hostname: Option<&str>) -> EndpointAddress {
    EndpointAddress {
        ip: ip.to_string(),
        hostname: hostname.map(str::to_string),
        ..Default::default()
    }
}

pub fn port(name: &str, number: i32, protocol: &str) -> EndpointPort {
    EndpointPort {
        name: (!name.is_empty()).then(|| name.to_string()),
        port: number,
        protocol: Some(protocol.to_string()),
        ..Default::default()
    }
}

pub fn subset(addresses: Vec<EndpointAddress>, ports: Vec<EndpointPort>) -> EndpointSubset {
    EndpointSubset {
        addresses: Some(addresses),
        ports: Some(ports),
        ..Default::default()
    }
}

pub fn endpoints(name: &str, namespace: &str, subsets: Vec<EndpointSubset>) -> Endpoints {
    Endpoints {
        metadata: metadata(name, namespace),
        subsets: (!subsets.is_empty()).then_some(subsets),
    }
}

/// Service cache backed by a plain map.
#[derive(Default)]
pub struct MapLookup {
    services: HashMap<(String, String), Arc<Service>>,
}

impl MapLookup {
    pub fn with(services: Vec<Service>) -> Self {
        let services = services
            .into_iter()
            .map(|svc| {
                let key = (
                    svc.metadata.name.clone().unwrap_or_default(),
                    svc.metadata.namespace.clone().unwrap_or_default(),
                );
                (key, Arc::new(svc))
            })
            .collect();
        Self { services }
    }
}

impl ServiceLookup for MapLookup {
    fn get_service(&self, name: &str, namespace: &str) -> Option<Arc<Service>> {
        self.services
            .get(&(name.to_string(), namespace.to_string()))
            .cloned()
    }
}

/// A call received by [`RecordingUpdater`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCall {
    AddZone { zone: String, content: String },
    DeleteZones(Vec<String>),
    AddRRsets { zone: String, rrsets: Vec<WireRRset> },
    DeleteRRsets { zone: String, rrsets: Vec<WireRRsetKey> },
}

/// In-memory [`DynamicUpdate`] that records every call.
///
/// Calls whose operation name is listed in `failing` are recorded and then
/// answered with a rejection.
#[derive(Default)]
pub struct RecordingUpdater {
    pub calls: Mutex<Vec<UpdateCall>>,
    pub failing: Mutex<Vec<&'static str>>,
}

impl RecordingUpdater {
    pub fn failing_on(operations: &[&'static str]) -> Self {
        Self {
            calls: Mutex::default(),
            failing: Mutex::new(operations.to_vec()),
        }
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn record(&self, operation: &'static str, call: UpdateCall) -> Result<(), UpdateError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(UpdateError::Rejected {
                endpoint: UPDATE_ENDPOINT.to_string(),
                operation,
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DynamicUpdate for RecordingUpdater {
    fn endpoint(&self) -> &str {
        UPDATE_ENDPOINT
    }

    async fn add_zone(&self, zone: &str, zone_content: &str) -> Result<(), UpdateError> {
        self.record(
            "AddZone",
            UpdateCall::AddZone {
                zone: zone.to_string(),
                content: zone_content.to_string(),
            },
        )
    }

    async fn delete_zones(&self, zones: &[String]) -> Result<(), UpdateError> {
        self.record("DeleteZone", UpdateCall::DeleteZones(zones.to_vec()))
    }

    async fn add_rrsets(&self, zone: &str, rrsets: &[WireRRset]) -> Result<(), UpdateError> {
        self.record(
            "AddRRset",
            UpdateCall::AddRRsets {
                zone: zone.to_string(),
                rrsets: rrsets.to_vec(),
            },
        )
    }

    async fn delete_rrsets(&self, zone: &str, rrsets: &[WireRRsetKey]) -> Result<(), UpdateError> {
        self.record(
            "DeleteRRset",
            UpdateCall::DeleteRRsets {
                zone: zone.to_string(),
                rrsets: rrsets.to_vec(),
            },
        )
    }
}
