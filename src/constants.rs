// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the clusterzone controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Record Constants
// ============================================================================

/// TTL applied to every synthesized record and to the bootstrap zones (5 seconds)
///
/// Kept short because cluster membership changes quickly and resolvers must not
/// hold on to addresses of pods that are gone.
pub const DEFAULT_RECORD_TTL_SECS: u32 = 5;

/// Priority carried by every synthesized SRV record
pub const DEFAULT_SRV_PRIORITY: u16 = 10;

/// Weight carried by every synthesized SRV record
pub const DEFAULT_SRV_WEIGHT: u16 = 100;

/// Schema version advertised in the service zone's `dns-version` TXT record
pub const DNS_SCHEMA_VERSION: &str = "1.0.1";

/// Parent zone of every reverse (PTR) zone
pub const REVERSE_BASE_ZONE: &str = "in-addr.arpa";

// ============================================================================
// Kubernetes Constants
// ============================================================================

/// `clusterIP` sentinel marking a headless Service
pub const CLUSTER_IP_NONE: &str = "None";

/// Service `spec.type` value for `ExternalName` services
pub const SERVICE_TYPE_EXTERNAL_NAME: &str = "ExternalName";

/// Protocol assumed for an endpoint port that does not declare one
pub const DEFAULT_PORT_PROTOCOL: &str = "TCP";

/// Label inserted between namespace and cluster domain in service names
pub const SERVICE_LABEL: &str = "svc";

// ============================================================================
// Zone Bootstrap Constants
// ============================================================================

/// SOA serial written into every bootstrap zone
pub const SOA_SERIAL: u32 = 1_981_616;

/// SOA refresh interval (30 minutes)
pub const SOA_REFRESH_SECS: u32 = 1800;

/// SOA retry interval (15 minutes)
pub const SOA_RETRY_SECS: u32 = 900;

/// SOA expire time (7 days)
pub const SOA_EXPIRE_SECS: u32 = 604_800;

/// SOA minimum / negative TTL (1 day)
pub const SOA_MINIMUM_SECS: u32 = 86400;

/// Label prefix of the nameserver host inside each managed zone (`ns.dns.<origin>`)
pub const NAMESERVER_LABEL: &str = "ns.dns";

/// Label prefix of the administrative mailbox (`hostmaster.<origin>`)
pub const HOSTMASTER_LABEL: &str = "hostmaster";

/// Owner label of the schema version TXT record (`dns-version.<origin>`)
pub const SCHEMA_VERSION_LABEL: &str = "dns-version";

// ============================================================================
// Update Server Constants
// ============================================================================

/// Default address of the DNS update server
pub const DEFAULT_UPDATE_SERVER: &str = "127.0.0.1:5555";

/// Default request timeout for calls to the DNS update server (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fixed interval between startup bootstrap attempts (1 second)
pub const BOOTSTRAP_RETRY_INTERVAL_SECS: u64 = 1;

/// Base path of the DNS update HTTP API
pub const UPDATE_API_BASE_PATH: &str = "/api/v1";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 2;
