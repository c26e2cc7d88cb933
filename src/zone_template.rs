// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Initial content of the managed zones.
//!
//! Each zone is created at startup with an SOA, an NS pointing at
//! `ns.dns.<origin>` and a glue A record for that nameserver. The forward service
//! zone additionally carries a TXT record advertising the record schema version
//! so resolvers and tooling can tell which naming layout is in use.

use crate::constants::{
    DNS_SCHEMA_VERSION, HOSTMASTER_LABEL, NAMESERVER_LABEL, SCHEMA_VERSION_LABEL,
    SOA_EXPIRE_SECS, SOA_MINIMUM_SECS, SOA_REFRESH_SECS, SOA_RETRY_SECS, SOA_SERIAL,
};
use crate::naming::ZoneKind;
use hickory_proto::rr::Name;
use std::fmt::Write;
use std::net::Ipv4Addr;

/// Parameters of a zone template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTemplate<'a> {
    /// Which managed zone is rendered
    pub kind: ZoneKind,
    /// Absolute zone origin
    pub origin: &'a Name,
    /// TTL of every bootstrap record
    pub ttl: u32,
    /// Address of the DNS server that serves the cluster zones
    pub nameserver: Ipv4Addr,
}

impl ZoneTemplate<'_> {
    /// Render the zone as master-file text, one record per line.
    #[must_use]
    pub fn render(&self) -> String {
        let origin = self.origin.to_string();
        let ttl = self.ttl;
        let ns = format!("{NAMESERVER_LABEL}.{origin}");
        let mut zone = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(
            zone,
            "{origin} {ttl} IN SOA {ns} {HOSTMASTER_LABEL}.{origin} {SOA_SERIAL} {SOA_REFRESH_SECS} {SOA_RETRY_SECS} {SOA_EXPIRE_SECS} {SOA_MINIMUM_SECS}"
        );
        let _ = writeln!(zone, "{origin} {ttl} IN NS {ns}");
        let _ = writeln!(zone, "{ns} {ttl} IN A {}", self.nameserver);
        if self.kind == ZoneKind::Service {
            let _ = writeln!(
                zone,
                "{SCHEMA_VERSION_LABEL}.{origin} {ttl} IN TXT {DNS_SCHEMA_VERSION}"
            );
        }
        zone
    }
}

#[cfg(test)]
#[path = "zone_template_tests.rs"]
mod zone_template_tests;
