// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service classification and Endpoints change detection.
//!
//! A Service is rendered differently depending on its variant:
//!
//! - **Normal** services get an A record for their cluster IP plus a PTR
//! - **Headless** services resolve to the addresses of their pods
//! - **`ExternalName`** services become a CNAME to the external name
//!
//! Endpoints comparison is positional: subsets, addresses and ports are compared
//! index by index, so a reordering counts as a change.

use crate::constants::{CLUSTER_IP_NONE, DEFAULT_PORT_PROTOCOL, SERVICE_TYPE_EXTERNAL_NAME};
use k8s_openapi::api::core::v1::{
    EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Service,
};

/// Variant of a Service as far as DNS is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Has a virtual cluster IP
    Normal,
    /// `clusterIP: None`, resolves straight to pod addresses
    Headless,
    /// Alias for a name outside the cluster
    ExternalName,
}

impl ServiceKind {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Normal => "normal",
            ServiceKind::Headless => "headless",
            ServiceKind::ExternalName => "external-name",
        }
    }
}

fn service_type(svc: &Service) -> Option<&str> {
    svc.spec.as_ref().and_then(|spec| spec.type_.as_deref())
}

/// `spec.clusterIP` of a Service, empty when unset.
#[must_use]
pub fn cluster_ip(svc: &Service) -> &str {
    svc.spec
        .as_ref()
        .and_then(|spec| spec.cluster_ip.as_deref())
        .unwrap_or_default()
}

/// `spec.externalName` of a Service, empty when unset.
#[must_use]
pub fn external_name(svc: &Service) -> &str {
    svc.spec
        .as_ref()
        .and_then(|spec| spec.external_name.as_deref())
        .unwrap_or_default()
}

/// Classify a Service.
///
/// Returns `None` for services that match no variant, for example an
/// `ExternalName` service without an external name or a service whose cluster IP
/// has not been allocated yet. Such services are inert and produce no records.
#[must_use]
pub fn classify_service(svc: &Service) -> Option<ServiceKind> {
    let is_external_type = service_type(svc) == Some(SERVICE_TYPE_EXTERNAL_NAME);

    if is_external_type {
        return (!external_name(svc).is_empty()).then_some(ServiceKind::ExternalName);
    }

    match cluster_ip(svc) {
        "" => None,
        CLUSTER_IP_NONE => Some(ServiceKind::Headless),
        _ => Some(ServiceKind::Normal),
    }
}

/// True when the Service is headless.
#[must_use]
pub fn is_headless(svc: &Service) -> bool {
    classify_service(svc) == Some(ServiceKind::Headless)
}

/// Subsets of an Endpoints object, empty when unset.
#[must_use]
pub fn subsets(endpoints: &Endpoints) -> &[EndpointSubset] {
    endpoints.subsets.as_deref().unwrap_or_default()
}

/// Ready addresses of a subset, empty when unset.
#[must_use]
pub fn subset_addresses(subset: &EndpointSubset) -> &[EndpointAddress] {
    subset.addresses.as_deref().unwrap_or_default()
}

/// Ports of a subset, empty when unset.
#[must_use]
pub fn subset_ports(subset: &EndpointSubset) -> &[EndpointPort] {
    subset.ports.as_deref().unwrap_or_default()
}

/// Protocol of an endpoint port, `TCP` when unset.
#[must_use]
pub fn port_protocol(port: &EndpointPort) -> &str {
    port.protocol.as_deref().unwrap_or(DEFAULT_PORT_PROTOCOL)
}

/// Compare two Endpoints snapshots for record-relevant equality.
///
/// Only the fields that feed record synthesis are compared: address IP and
/// hostname, port name, number and protocol. The comparison is positional.
#[must_use]
pub fn endpoints_unchanged(old: &Endpoints, new: &Endpoints) -> bool {
    let (old_subsets, new_subsets) = (subsets(old), subsets(new));
    old_subsets.len() == new_subsets.len()
        && old_subsets
            .iter()
            .zip(new_subsets)
            .all(|(a, b)| subset_unchanged(a, b))
}

fn subset_unchanged(a: &EndpointSubset, b: &EndpointSubset) -> bool {
    let (a_addrs, b_addrs) = (subset_addresses(a), subset_addresses(b));
    let (a_ports, b_ports) = (subset_ports(a), subset_ports(b));

    if a_addrs.len() != b_addrs.len() || a_ports.len() != b_ports.len() {
        return false;
    }

    let addresses_match = a_addrs
        .iter()
        .zip(b_addrs)
        .all(|(x, y)| x.ip == y.ip && hostname(x) == hostname(y));

    let ports_match = a_ports.iter().zip(b_ports).all(|(x, y)| {
        x.name.as_deref().unwrap_or_default() == y.name.as_deref().unwrap_or_default()
            && x.port == y.port
            && port_protocol(x) == port_protocol(y)
    });

    addresses_match && ports_match
}

fn hostname(address: &EndpointAddress) -> &str {
    address.hostname.as_deref().unwrap_or_default()
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod classify_tests;
