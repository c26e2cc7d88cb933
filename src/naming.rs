// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS name and zone derivation.
//!
//! Every record clusterzone writes lives in one of three managed zones:
//!
//! - the **service zone**, the forward cluster domain (e.g. `cluster.local.`)
//! - the **service reverse zone**, derived from the Service IP CIDR
//! - the **pod reverse zone**, derived from the Pod IP CIDR
//!
//! The functions here map Kubernetes identities and IPv4 addresses onto
//! absolute names inside those zones. They are pure and never touch the network.
//!
//! # Example
//!
//! ```rust
//! use clusterzone::naming::{reverse_zone_name, ManagedZones};
//!
//! let zone = reverse_zone_name("10.244.0.0/16").unwrap();
//! assert_eq!(zone.to_string(), "244.10.in-addr.arpa.");
//!
//! let zones = ManagedZones::new("cluster.local", "10.96.0.0/12", "10.244.0.0/16");
//! assert!(zones.is_err()); // /12 cannot be expressed as a reverse zone
//! ```

use crate::constants::{REVERSE_BASE_ZONE, SERVICE_LABEL};
use crate::dns_errors::{ConfigError, NameError};
use hickory_proto::rr::Name;
use ipnetwork::Ipv4Network;
use k8s_openapi::api::core::v1::EndpointAddress;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// One of the three zones owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    /// Forward zone holding A, SRV and CNAME records
    Service,
    /// Reverse zone holding PTR records for Service cluster IPs
    ServiceReverse,
    /// Reverse zone holding PTR records for Pod IPs
    PodReverse,
}

impl ZoneKind {
    /// All managed zones, in bootstrap order.
    pub const ALL: [ZoneKind; 3] = [
        ZoneKind::Service,
        ZoneKind::ServiceReverse,
        ZoneKind::PodReverse,
    ];

    /// Stable lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Service => "service",
            ZoneKind::ServiceReverse => "service-reverse",
            ZoneKind::PodReverse => "pod-reverse",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the reverse zone origin for an IPv4 CIDR range.
///
/// Only octet-aligned prefixes are supported. The leading octets of the address
/// are taken as written and emitted most-significant octet last:
/// `10.0.0.0/16` becomes `0.10.in-addr.arpa.`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidCidr`] if the value does not parse and
/// [`ConfigError::UnsupportedMask`] for any prefix other than 8, 16 or 24.
pub fn reverse_zone_name(cidr: &str) -> Result<Name, ConfigError> {
    let network = Ipv4Network::from_str(cidr.trim()).map_err(|e| ConfigError::InvalidCidr {
        cidr: cidr.to_string(),
        reason: e.to_string(),
    })?;

    let significant = match network.prefix() {
        8 => 1,
        16 => 2,
        24 => 3,
        prefix => {
            return Err(ConfigError::UnsupportedMask {
                cidr: cidr.to_string(),
                prefix,
            })
        }
    };

    let octets = network.ip().octets();
    let mut labels: Vec<String> = octets[..significant]
        .iter()
        .rev()
        .map(u8::to_string)
        .collect();
    labels.push(REVERSE_BASE_ZONE.to_string());

    absolute_name(&labels.join(".")).map_err(|e| ConfigError::InvalidCidr {
        cidr: cidr.to_string(),
        reason: e.to_string(),
    })
}

/// Derive the PTR owner name of an IPv4 address (`d.c.b.a.in-addr.arpa.`).
///
/// # Errors
///
/// Returns [`NameError::InvalidIpv4`] unless the input is a dotted-quad address.
pub fn reverse_ip_name(ip: &str) -> Result<Name, NameError> {
    let addr = Ipv4Addr::from_str(ip).map_err(|_| NameError::InvalidIpv4(ip.to_string()))?;
    let [a, b, c, d] = addr.octets();
    absolute_name(&format!("{d}.{c}.{b}.{a}.{REVERSE_BASE_ZONE}"))
}

/// Parse a name and force it to be absolute.
///
/// # Errors
///
/// Returns [`NameError::InvalidName`] if the text is not a valid DNS name.
pub fn absolute_name(text: &str) -> Result<Name, NameError> {
    let mut name = Name::from_ascii(text).map_err(|e| NameError::InvalidName {
        name: text.to_string(),
        reason: e.to_string(),
    })?;
    name.set_fqdn(true);
    Ok(name)
}

/// Origins of the three managed zones, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedZones {
    service: Name,
    service_reverse: Name,
    pod_reverse: Name,
}

impl ManagedZones {
    /// Build the zone layout from the configured cluster domain and CIDR ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the domain is not a valid name or either CIDR
    /// cannot be turned into a reverse zone.
    pub fn new(
        cluster_domain: &str,
        service_cidr: &str,
        pod_cidr: &str,
    ) -> Result<Self, ConfigError> {
        let trimmed = cluster_domain.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Err(ConfigError::InvalidDomain {
                domain: cluster_domain.to_string(),
                reason: "cluster domain must not be empty".to_string(),
            });
        }
        let service = absolute_name(trimmed).map_err(|e| ConfigError::InvalidDomain {
            domain: cluster_domain.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            service,
            service_reverse: reverse_zone_name(service_cidr)?,
            pod_reverse: reverse_zone_name(pod_cidr)?,
        })
    }

    /// Origin of the given zone.
    #[must_use]
    pub fn origin(&self, zone: ZoneKind) -> &Name {
        match zone {
            ZoneKind::Service => &self.service,
            ZoneKind::ServiceReverse => &self.service_reverse,
            ZoneKind::PodReverse => &self.pod_reverse,
        }
    }

    /// `<service>.<namespace>.svc.<service-zone>`
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidName`] if the labels do not form a valid name.
    pub fn service_name(&self, service: &str, namespace: &str) -> Result<Name, NameError> {
        self.in_service_zone(&[service, namespace, SERVICE_LABEL])
    }

    /// Name of one endpoint address of a service.
    ///
    /// The pod's `hostname` is used when set; otherwise the IP with its dots
    /// replaced by hyphens (`10.1.2.3` becomes `10-1-2-3`).
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidName`] if the labels do not form a valid name.
    pub fn pod_address_name(
        &self,
        address: &EndpointAddress,
        service: &str,
        namespace: &str,
    ) -> Result<Name, NameError> {
        let pod = match address.hostname.as_deref() {
            Some(hostname) if !hostname.is_empty() => hostname.to_string(),
            _ => address.ip.replacen('.', "-", 3),
        };
        self.in_service_zone(&[&pod, service, namespace, SERVICE_LABEL])
    }

    /// `_<port>._<protocol>.<service>.<namespace>.svc.<service-zone>`
    ///
    /// The protocol label is lowercased (`_tcp`, `_udp`, `_sctp`).
    ///
    /// # Errors
    ///
    /// Returns [`NameError::InvalidName`] if the labels do not form a valid name.
    pub fn port_srv_name(
        &self,
        port: &str,
        protocol: &str,
        service: &str,
        namespace: &str,
    ) -> Result<Name, NameError> {
        let port_label = format!("_{port}");
        let protocol_label = format!("_{}", protocol.to_ascii_lowercase());
        self.in_service_zone(&[
            &port_label,
            &protocol_label,
            service,
            namespace,
            SERVICE_LABEL,
        ])
    }

    fn in_service_zone(&self, labels: &[&str]) -> Result<Name, NameError> {
        let local = labels.join(".");
        let relative = Name::from_ascii(&local).map_err(|e| NameError::InvalidName {
            name: local.clone(),
            reason: e.to_string(),
        })?;
        relative
            .append_domain(&self.service)
            .map_err(|e| NameError::InvalidName {
                name: format!("{local}.{}", self.service),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod naming_tests;
