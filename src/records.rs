// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record synthesis.
//!
//! Computes the RRsets that represent a Service and its Endpoints. Everything in
//! this module is a pure function of the snapshot it is given: no network calls,
//! no state carried between events.
//!
//! Inputs that cannot be turned into a record (an unparsable IP, a hostname that is
//! not a valid label, an external name that is not a DNS name) cause that single
//! record or rdata entry to be skipped. The rest of the batch is still produced.
//!
//! # Pod records
//!
//! For every address of an Endpoints object the pod name is derived from its
//! hostname, or from its IP when no hostname is set. Addresses that map to the same
//! pod name are merged into one A RRset with one rdata entry per address. Each
//! address also gets a PTR in the pod reverse zone; addresses sharing an IP share
//! one PTR RRset listing every distinct pod name. Each named port gets an SRV RRset
//! whose targets depend on the service variant:
//!
//! - headless: one entry per distinct pod name
//! - anything else: a single entry targeting the service name

use crate::classify::{
    cluster_ip, external_name, is_headless, port_protocol, subset_addresses, subset_ports,
    subsets,
};
use crate::constants::{DEFAULT_RECORD_TTL_SECS, DEFAULT_SRV_PRIORITY, DEFAULT_SRV_WEIGHT};
use crate::naming::{absolute_name, reverse_ip_name, ManagedZones, ZoneKind};
use hickory_proto::rr::rdata::{A, CNAME, PTR, SRV};
use hickory_proto::rr::{Name, RData, RecordType};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::ResourceExt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::{debug, warn};

/// A resource-record set: one owner name and type with one or more rdata values.
///
/// The class is always IN. Unlike a zone's view of an RRset, duplicate rdata
/// entries are kept: the number of entries mirrors the number of addresses that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct RRset {
    /// Absolute owner name
    pub name: Name,
    /// Record type of every entry
    pub rr_type: RecordType,
    /// Time to live in seconds
    pub ttl: u32,
    /// Record data, in synthesis order
    pub rdatas: Vec<RData>,
}

impl RRset {
    /// Create an RRset with the default TTL.
    #[must_use]
    pub fn new(name: Name, rr_type: RecordType, rdatas: Vec<RData>) -> Self {
        Self {
            name,
            rr_type,
            ttl: DEFAULT_RECORD_TTL_SECS,
            rdatas,
        }
    }
}

/// A record of a Normal service: A in the service zone and PTR in the service
/// reverse zone. Either half is absent when its input does not parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRecords {
    /// `<svc>.<ns>.svc.<zone>` → cluster IP
    pub a: Option<RRset>,
    /// reverse(cluster IP) → service name
    pub ptr: Option<RRset>,
}

/// Records derived from one Endpoints snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodRecords {
    /// Merged A RRsets, one per pod name (service zone)
    pub a: Vec<RRset>,
    /// One PTR per distinct address IP (pod reverse zone)
    pub ptr: Vec<RRset>,
    /// One SRV per named port (service zone)
    pub srv: Vec<RRset>,
}

impl PodRecords {
    /// Total number of RRsets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.a.len() + self.ptr.len() + self.srv.len()
    }

    /// True when nothing was synthesized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RRsets paired with their zone, in apply order (A, PTR, SRV).
    #[must_use]
    pub fn into_zone_rrsets(self) -> Vec<(ZoneKind, RRset)> {
        self.a
            .into_iter()
            .map(|rrset| (ZoneKind::Service, rrset))
            .chain(self.ptr.into_iter().map(|rrset| (ZoneKind::PodReverse, rrset)))
            .chain(self.srv.into_iter().map(|rrset| (ZoneKind::Service, rrset)))
            .collect()
    }
}

/// Forward name of a Service.
fn service_owner(zones: &ManagedZones, svc: &Service) -> Option<Name> {
    let (name, namespace) = (svc.name_any(), svc.namespace().unwrap_or_default());
    zones
        .service_name(&name, &namespace)
        .inspect_err(|e| {
            warn!(
                service = %name,
                namespace = %namespace,
                error = %e,
                "Skipping records for service with invalid name"
            );
        })
        .ok()
}

fn parse_ipv4(ip: &str) -> Option<Ipv4Addr> {
    Ipv4Addr::from_str(ip)
        .inspect_err(|_| debug!(ip = %ip, "Skipping record for invalid IPv4 address"))
        .ok()
}

fn ptr_rrset(ip: &str, target: &Name) -> Option<RRset> {
    let owner = reverse_ip_name(ip)
        .inspect_err(|e| debug!(error = %e, "Skipping PTR record"))
        .ok()?;
    Some(RRset::new(
        owner,
        RecordType::PTR,
        vec![RData::PTR(PTR(target.clone()))],
    ))
}

/// A and PTR records of a Normal service.
#[must_use]
pub fn service_records(zones: &ManagedZones, svc: &Service) -> ServiceRecords {
    let Some(owner) = service_owner(zones, svc) else {
        return ServiceRecords::default();
    };
    let ip = cluster_ip(svc);

    ServiceRecords {
        a: parse_ipv4(ip)
            .map(|addr| RRset::new(owner.clone(), RecordType::A, vec![RData::A(A(addr))])),
        ptr: ptr_rrset(ip, &owner),
    }
}

/// CNAME record of an `ExternalName` service.
///
/// Returns `None` when the external name is not a valid DNS name.
#[must_use]
pub fn external_name_record(zones: &ManagedZones, svc: &Service) -> Option<RRset> {
    let owner = service_owner(zones, svc)?;
    let target = absolute_name(external_name(svc))
        .inspect_err(|e| {
            warn!(
                service = %svc.name_any(),
                error = %e,
                "Skipping CNAME for service with invalid external name"
            );
        })
        .ok()?;
    Some(RRset::new(
        owner,
        RecordType::CNAME,
        vec![RData::CNAME(CNAME(target))],
    ))
}

/// A record of a headless service pointing at every ready pod address.
///
/// Returns `None` when the Endpoints object carries no usable address.
#[must_use]
pub fn headless_aggregate_record(
    zones: &ManagedZones,
    svc: &Service,
    endpoints: &Endpoints,
) -> Option<RRset> {
    let rdatas: Vec<RData> = subsets(endpoints)
        .iter()
        .flat_map(subset_addresses)
        .filter(|addr| !addr.ip.is_empty())
        .filter_map(|addr| parse_ipv4(&addr.ip))
        .map(|ip| RData::A(A(ip)))
        .collect();

    if rdatas.is_empty() {
        return None;
    }
    let owner = service_owner(zones, svc)?;
    Some(RRset::new(owner, RecordType::A, rdatas))
}

/// Append `rdata` to the RRset owned by `name`, creating it on first use.
fn merge_into(rrsets: &mut Vec<RRset>, name: &Name, rr_type: RecordType, rdata: RData) {
    match rrsets.iter_mut().find(|rrset| &rrset.name == name) {
        Some(rrset) => rrset.rdatas.push(rdata),
        None => rrsets.push(RRset::new(name.clone(), rr_type, vec![rdata])),
    }
}

/// Fold the entries of `rrset` into the RRset with the same owner, skipping
/// entries already present.
fn merge_unique(rrsets: &mut Vec<RRset>, rrset: RRset) {
    match rrsets.iter_mut().find(|existing| existing.name == rrset.name) {
        Some(existing) => {
            for rdata in rrset.rdatas {
                if !existing.rdatas.contains(&rdata) {
                    existing.rdatas.push(rdata);
                }
            }
        }
        None => rrsets.push(rrset),
    }
}

/// Pod A, PTR and SRV records of an Endpoints object.
///
/// `svc` is the Service the Endpoints belong to; its variant selects SRV targets.
#[must_use]
pub fn pod_records(zones: &ManagedZones, svc: &Service, endpoints: &Endpoints) -> PodRecords {
    let (ep_name, namespace) = (
        endpoints.name_any(),
        endpoints.namespace().unwrap_or_default(),
    );
    let headless = is_headless(svc);
    let mut records = PodRecords::default();

    for subset in subsets(endpoints) {
        let mut pod_names: Vec<Name> = Vec::new();

        for addr in subset_addresses(subset) {
            let Some(ip) = parse_ipv4(&addr.ip) else {
                continue;
            };
            let pod_name = match zones.pod_address_name(addr, &ep_name, &namespace) {
                Ok(name) => name,
                Err(e) => {
                    warn!(
                        endpoints = %ep_name,
                        namespace = %namespace,
                        error = %e,
                        "Skipping pod address with invalid name"
                    );
                    continue;
                }
            };

            merge_into(&mut records.a, &pod_name, RecordType::A, RData::A(A(ip)));
            if let Some(ptr) = ptr_rrset(&addr.ip, &pod_name) {
                merge_unique(&mut records.ptr, ptr);
            }
            if !pod_names.contains(&pod_name) {
                pod_names.push(pod_name);
            }
        }

        let targets = if headless {
            pod_names
        } else {
            match service_owner(zones, svc) {
                Some(owner) => vec![owner],
                None => continue,
            }
        };

        for port in subset_ports(subset) {
            let Some(port_name) = port.name.as_deref().filter(|name| !name.is_empty()) else {
                continue;
            };
            let Ok(number) = u16::try_from(port.port) else {
                debug!(port = port.port, "Skipping SRV record for out-of-range port");
                continue;
            };
            let owner = match zones.port_srv_name(
                port_name,
                port_protocol(port),
                &ep_name,
                &namespace,
            ) {
                Ok(name) => name,
                Err(e) => {
                    warn!(port = %port_name, error = %e, "Skipping SRV record with invalid name");
                    continue;
                }
            };

            for target in &targets {
                let rdata = RData::SRV(SRV::new(
                    DEFAULT_SRV_PRIORITY,
                    DEFAULT_SRV_WEIGHT,
                    number,
                    target.clone(),
                ));
                merge_unique(
                    &mut records.srv,
                    RRset::new(owner.clone(), RecordType::SRV, vec![rdata]),
                );
            }
        }
    }

    records
}

/// Keys of every RRset that [`pod_records`] may have written for a snapshot.
///
/// Used to delete pod records when only the old snapshot is known. The Service
/// is not needed: owner names depend on the Endpoints identity alone.
#[must_use]
pub fn pod_record_keys(
    zones: &ManagedZones,
    endpoints: &Endpoints,
) -> Vec<(ZoneKind, Name, RecordType)> {
    let (ep_name, namespace) = (
        endpoints.name_any(),
        endpoints.namespace().unwrap_or_default(),
    );
    let mut keys: Vec<(ZoneKind, Name, RecordType)> = Vec::new();
    let mut push = |key: (ZoneKind, Name, RecordType)| {
        if !keys.contains(&key) {
            keys.push(key);
        }
    };

    for subset in subsets(endpoints) {
        for addr in subset_addresses(subset) {
            if let Ok(name) = zones.pod_address_name(addr, &ep_name, &namespace) {
                push((ZoneKind::Service, name, RecordType::A));
            }
            if let Ok(reverse) = reverse_ip_name(&addr.ip) {
                push((ZoneKind::PodReverse, reverse, RecordType::PTR));
            }
        }
        for port in subset_ports(subset) {
            let Some(port_name) = port.name.as_deref().filter(|name| !name.is_empty()) else {
                continue;
            };
            if let Ok(name) =
                zones.port_srv_name(port_name, port_protocol(port), &ep_name, &namespace)
            {
                push((ZoneKind::Service, name, RecordType::SRV));
            }
        }
    }

    keys
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
