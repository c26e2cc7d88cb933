// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # clusterzone - Kubernetes Service DNS for a remote DNS server
//!
//! clusterzone watches Services and Endpoints and keeps three zones on a remote
//! DNS server in sync with them:
//!
//! - the cluster domain (`cluster.local.`), holding service, pod and SRV names
//! - the reverse zone of the Service IP range
//! - the reverse zone of the Pod IP range
//!
//! The zones are wiped and recreated at startup, after which every watch event is
//! translated into RRset replace and delete calls against the server's dynamic
//! update API.
//!
//! ## Modules
//!
//! - [`naming`] - DNS names and zone origins for cluster identities
//! - [`classify`] - Service variants and Endpoints change detection
//! - [`records`] - RRset synthesis for Services and Endpoints
//! - [`controller`] - Event to zone change planning
//! - [`sync_client`] - Zone bootstrap and RRset operations
//! - [`update`] - Dynamic update protocol and HTTP transport
//! - [`watch`] - Kubernetes watch streams and the Service cache
//!
//! ## Example
//!
//! ```rust
//! use clusterzone::naming::ManagedZones;
//! use clusterzone::records::service_records;
//! use k8s_openapi::api::core::v1::{Service, ServiceSpec};
//! use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
//!
//! let zones = ManagedZones::new("cluster.local", "10.0.0.0/16", "10.1.0.0/16").unwrap();
//! let svc = Service {
//!     metadata: ObjectMeta {
//!         name: Some("web".to_string()),
//!         namespace: Some("default".to_string()),
//!         ..Default::default()
//!     },
//!     spec: Some(ServiceSpec {
//!         cluster_ip: Some("10.0.0.5".to_string()),
//!         ..Default::default()
//!     }),
//!     status: None,
//! };
//!
//! let records = service_records(&zones, &svc);
//! assert_eq!(records.a.unwrap().name.to_string(), "web.default.svc.cluster.local.");
//! assert_eq!(records.ptr.unwrap().name.to_string(), "5.0.0.10.in-addr.arpa.");
//! ```

pub mod classify;
pub mod config;
pub mod constants;
pub mod controller;
pub mod dns_errors;
pub mod metrics;
pub mod naming;
pub mod records;
pub mod sync_client;
pub mod update;
pub mod watch;
pub mod zone_template;

#[cfg(test)]
mod test_fixtures;
