// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types of the dynamic update protocol.
//!
//! Every request body is JSON. Names are absolute (trailing dot) and rdata is
//! carried in presentation format, e.g. `10 100 80 web.ns1.svc.cluster.local.`
//! for an SRV record.

use crate::records::RRset;
use hickory_proto::rr::{Name, RecordType};
use serde::{Deserialize, Serialize};

/// Record types the update server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireRecordType {
    A,
    Aaaa,
    Ns,
    Soa,
    Cname,
    Txt,
    Srv,
    Ptr,
}

impl From<RecordType> for WireRecordType {
    /// # Panics
    ///
    /// Panics on any record type outside the supported set. Synthesis only ever
    /// produces A, PTR, SRV and CNAME, so reaching the panic is a programming error.
    fn from(rr_type: RecordType) -> Self {
        match rr_type {
            RecordType::A => Self::A,
            RecordType::AAAA => Self::Aaaa,
            RecordType::NS => Self::Ns,
            RecordType::SOA => Self::Soa,
            RecordType::CNAME => Self::Cname,
            RecordType::TXT => Self::Txt,
            RecordType::SRV => Self::Srv,
            RecordType::PTR => Self::Ptr,
            other => panic!("record type {other} cannot be sent to the DNS update server"),
        }
    }
}

/// An RRset as sent in `AddRRset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRRset {
    /// Absolute owner name
    pub name: String,
    #[serde(rename = "type")]
    pub rr_type: WireRecordType,
    pub ttl: u32,
    /// Presentation-format rdata, one entry per record
    pub rdatas: Vec<String>,
}

impl From<&RRset> for WireRRset {
    fn from(rrset: &RRset) -> Self {
        Self {
            name: rrset.name.to_string(),
            rr_type: rrset.rr_type.into(),
            ttl: rrset.ttl,
            rdatas: rrset.rdatas.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Identity of an RRset as sent in `DeleteRRset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRRsetKey {
    pub name: String,
    #[serde(rename = "type")]
    pub rr_type: WireRecordType,
}

impl WireRRsetKey {
    #[must_use]
    pub fn new(name: &Name, rr_type: RecordType) -> Self {
        Self {
            name: name.to_string(),
            rr_type: rr_type.into(),
        }
    }
}

/// Body of `AddZone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddZoneRequest {
    pub zone: String,
    /// Master-file text of the initial zone content
    pub zone_content: String,
}

/// Body of `DeleteZone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteZoneRequest {
    pub zones: Vec<String>,
}

/// Body of `AddRRset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRRsetRequest {
    pub zone: String,
    pub rrsets: Vec<WireRRset>,
}

/// Body of `DeleteRRset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRRsetRequest {
    pub zone: String,
    pub rrsets: Vec<WireRRsetKey>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
