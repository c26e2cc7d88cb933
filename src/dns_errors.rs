// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for clusterzone.
//!
//! This module provides specialized error types for:
//! - Startup configuration (cluster domain, CIDR ranges, nameserver address)
//! - DNS name derivation from Kubernetes identities and IP addresses
//! - Calls against the remote DNS update server
//!
//! Configuration errors are fatal. Name errors only cause the affected record to be
//! skipped. Update errors are logged and dropped by the controller.

use thiserror::Error;

/// Errors detected while validating the startup configuration.
///
/// Every variant is fatal: the process must not start synchronizing with an
/// invalid zone layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The value could not be parsed as an IPv4 CIDR range.
    #[error("Invalid IPv4 CIDR '{cidr}': {reason}")]
    InvalidCidr {
        /// The raw CIDR string
        cidr: String,
        /// Parser error message
        reason: String,
    },

    /// Reverse zones can only be derived on octet boundaries.
    #[error("Unsupported prefix length /{prefix} in '{cidr}': only 8, 16 and 24 bit network masks are supported")]
    UnsupportedMask {
        /// The raw CIDR string
        cidr: String,
        /// The prefix length that was given
        prefix: u8,
    },

    /// The cluster domain is not a valid DNS name.
    #[error("Invalid cluster domain '{domain}': {reason}")]
    InvalidDomain {
        /// The configured domain
        domain: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The advertised nameserver address is not an IPv4 address.
    #[error("Invalid nameserver address '{address}': expected an IPv4 address")]
    InvalidNameserver {
        /// The configured address
        address: String,
    },
}

/// Errors raised while deriving a DNS name from a Kubernetes identity or IP address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The value is not a dotted-quad IPv4 address.
    #[error("IPv4 address '{0}' isn't valid")]
    InvalidIpv4(String),

    /// The assembled name violates DNS label rules (length, empty labels, ...).
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The name that failed to parse
        name: String,
        /// Parser error message
        reason: String,
    },
}

/// Errors returned by the remote DNS update server or its transport.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// The request never reached the server (refused, unreachable, timed out).
    #[error("Connection to DNS update server {endpoint} failed: {reason}")]
    Connection {
        /// The update server address
        endpoint: String,
        /// Transport error message
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("DNS update server {endpoint} rejected {operation} (HTTP {status}): {body}")]
    Rejected {
        /// The update server address
        endpoint: String,
        /// Protocol operation (e.g. `AddRRset`)
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body returned by the server
        body: String,
    },
}

impl UpdateError {
    /// Returns true if retrying the same call later may succeed.
    ///
    /// Bootstrap retries either way and logs permanent failures at error level.
    /// Steady-state mutations are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
        }
    }

    /// Short label used for metrics and structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
