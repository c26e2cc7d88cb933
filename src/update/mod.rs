// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamic update protocol for the remote DNS server.
//!
//! The server stores the zone contents; clusterzone only ever sends mutations:
//!
//! - `AddZone`: create a zone from master-file text
//! - `DeleteZone`: drop one or more zones (missing zones are ignored)
//! - `AddRRset`: add records to an existing zone
//! - `DeleteRRset`: remove records by (name, type)
//!
//! [`DynamicUpdate`] abstracts the transport so the sync client can be exercised
//! against an in-memory recorder. [`HttpUpdateClient`] is the production
//! implementation and speaks JSON over HTTP.
//!
//! # Example
//!
//! ```rust,no_run
//! use clusterzone::update::{DynamicUpdate, HttpUpdateClient};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = HttpUpdateClient::new("127.0.0.1:5555", Duration::from_secs(10))?;
//! client.delete_zones(&["cluster.local.".to_string()]).await?;
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod protocol;

pub use http::HttpUpdateClient;
pub use protocol::{
    AddRRsetRequest, AddZoneRequest, DeleteRRsetRequest, DeleteZoneRequest, WireRRset,
    WireRRsetKey, WireRecordType,
};

use crate::dns_errors::UpdateError;
use async_trait::async_trait;

/// Mutations accepted by the remote DNS server.
///
/// Zone names are absolute (`cluster.local.`). No call is retried by the
/// implementation; callers decide what a failure means.
#[async_trait]
pub trait DynamicUpdate: Send + Sync {
    /// Address of the update server, for logs and error context.
    fn endpoint(&self) -> &str;

    /// Create `zone` with the given master-file content.
    async fn add_zone(&self, zone: &str, zone_content: &str) -> Result<(), UpdateError>;

    /// Delete every listed zone. Zones that do not exist are not an error.
    async fn delete_zones(&self, zones: &[String]) -> Result<(), UpdateError>;

    /// Add `rrsets` to `zone`.
    async fn add_rrsets(&self, zone: &str, rrsets: &[WireRRset]) -> Result<(), UpdateError>;

    /// Delete the RRsets identified by `rrsets` from `zone`.
    async fn delete_rrsets(&self, zone: &str, rrsets: &[WireRRsetKey])
        -> Result<(), UpdateError>;
}
