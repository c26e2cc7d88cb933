// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every flag can also be given through the environment variable named in its
//! help text. Validation happens once at startup; any error is fatal.

use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPDATE_SERVER};
use crate::dns_errors::ConfigError;
use crate::naming::ManagedZones;
use clap::{Parser, ValueEnum};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Keeps DNS zones synchronized with Kubernetes Services and Endpoints.
#[derive(Parser, Debug, Clone)]
#[command(name = "clusterzone", version, about, long_about = None)]
pub struct Cli {
    /// Address of the DNS update server (host:port or URL)
    #[arg(long, env = "DNS_UPDATE_SERVER", default_value = DEFAULT_UPDATE_SERVER)]
    pub dns_update_server: String,

    /// Forward zone that holds service and pod names (e.g. cluster.local)
    #[arg(long, env = "CLUSTER_DOMAIN")]
    pub cluster_domain: String,

    /// Service IP range; its prefix must be /8, /16 or /24
    #[arg(long, env = "SERVICE_IP_RANGE")]
    pub service_ip_range: String,

    /// Pod IP range; its prefix must be /8, /16 or /24
    #[arg(long, env = "POD_IP_RANGE")]
    pub pod_ip_range: String,

    /// IPv4 address advertised as the nameserver of every managed zone
    #[arg(long, env = "DNS_SERVER")]
    pub dns_server: String,

    /// Timeout for connecting to and each request against the update server
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Validated settings the sync loop runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub update_server: String,
    pub zones: ManagedZones,
    pub nameserver: Ipv4Addr,
    pub request_timeout: Duration,
}

impl Cli {
    /// Check the configuration and derive the zone layout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an invalid cluster domain, an unparsable or
    /// unsupported CIDR range, or a nameserver that is not an IPv4 address.
    pub fn validate(&self) -> Result<SyncConfig, ConfigError> {
        let zones = ManagedZones::new(
            &self.cluster_domain,
            &self.service_ip_range,
            &self.pod_ip_range,
        )?;
        let nameserver = Ipv4Addr::from_str(self.dns_server.trim()).map_err(|_| {
            ConfigError::InvalidNameserver {
                address: self.dns_server.clone(),
            }
        })?;

        Ok(SyncConfig {
            update_server: self.dns_update_server.clone(),
            zones,
            nameserver,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
