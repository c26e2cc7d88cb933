// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Applies zone changes against the remote DNS server.
//!
//! The client owns the zone layout and translates [`ZoneChange`]s into calls of the
//! dynamic update protocol:
//!
//! - **Replace**: `DeleteRRset(name, type)` followed by `AddRRset`. The two calls
//!   are not atomic; if the delete fails the add is not attempted.
//! - **Delete**: `DeleteRRset(name, type)`. Deleting a missing RRset succeeds.
//!
//! No call is retried. The only retry loop is [`ZoneSyncClient::bootstrap_until_ready`],
//! which recreates the managed zones at startup.

use crate::constants::DEFAULT_RECORD_TTL_SECS;
use crate::dns_errors::UpdateError;
use crate::metrics::{record_bootstrap_attempt, record_rrset_operation};
use crate::naming::{ManagedZones, ZoneKind};
use crate::records::RRset;
use crate::update::{DynamicUpdate, WireRRset, WireRRsetKey};
use crate::zone_template::ZoneTemplate;
use hickory_proto::rr::{Name, RecordType};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One remote mutation planned by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneChange {
    /// Replace every record at (name, type) with the given RRset
    Replace { zone: ZoneKind, rrset: RRset },
    /// Remove every record at (name, type)
    Delete {
        zone: ZoneKind,
        name: Name,
        rr_type: RecordType,
    },
}

impl ZoneChange {
    /// Deletion of the RRset with the same identity as `rrset`.
    #[must_use]
    pub fn delete_of(zone: ZoneKind, rrset: &RRset) -> Self {
        Self::Delete {
            zone,
            name: rrset.name.clone(),
            rr_type: rrset.rr_type,
        }
    }

    #[must_use]
    pub fn zone(&self) -> ZoneKind {
        match self {
            Self::Replace { zone, .. } | Self::Delete { zone, .. } => *zone,
        }
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            Self::Replace { rrset, .. } => &rrset.name,
            Self::Delete { name, .. } => name,
        }
    }

    #[must_use]
    pub fn rr_type(&self) -> RecordType {
        match self {
            Self::Replace { rrset, .. } => rrset.rr_type,
            Self::Delete { rr_type, .. } => *rr_type,
        }
    }

    /// `replace` or `delete`, for logs and metrics.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Client for the three managed zones on the remote DNS server.
pub struct ZoneSyncClient<U> {
    updater: U,
    zones: ManagedZones,
    nameserver: Ipv4Addr,
    ttl: u32,
}

impl<U: DynamicUpdate> ZoneSyncClient<U> {
    /// Create a client; nothing is sent until [`bootstrap`](Self::bootstrap).
    pub fn new(updater: U, zones: ManagedZones, nameserver: Ipv4Addr) -> Self {
        Self {
            updater,
            zones,
            nameserver,
            ttl: DEFAULT_RECORD_TTL_SECS,
        }
    }

    #[must_use]
    pub fn zones(&self) -> &ManagedZones {
        &self.zones
    }

    #[must_use]
    pub fn updater(&self) -> &U {
        &self.updater
    }

    fn zone_name(&self, zone: ZoneKind) -> String {
        self.zones.origin(zone).to_string()
    }

    /// Wipe and recreate the managed zones.
    ///
    /// All three zones are deleted in one call, then each is recreated from its
    /// template in service, service-reverse, pod-reverse order.
    ///
    /// # Errors
    ///
    /// Returns the first [`UpdateError`]; the remaining calls are not attempted.
    pub async fn bootstrap(&self) -> Result<(), UpdateError> {
        let names: Vec<String> = ZoneKind::ALL.iter().map(|z| self.zone_name(*z)).collect();
        self.updater.delete_zones(&names).await?;

        for kind in ZoneKind::ALL {
            let content = ZoneTemplate {
                kind,
                origin: self.zones.origin(kind),
                ttl: self.ttl,
                nameserver: self.nameserver,
            }
            .render();
            self.updater.add_zone(&self.zone_name(kind), &content).await?;
            debug!(zone = %self.zone_name(kind), kind = %kind, "Created managed zone");
        }
        Ok(())
    }

    /// Run [`bootstrap`](Self::bootstrap) every `interval` until it succeeds.
    pub async fn bootstrap_until_ready(&self, interval: Duration) {
        loop {
            match self.bootstrap().await {
                Ok(()) => {
                    record_bootstrap_attempt("success");
                    info!(
                        server = %self.updater.endpoint(),
                        service_zone = %self.zones.origin(ZoneKind::Service),
                        service_reverse_zone = %self.zones.origin(ZoneKind::ServiceReverse),
                        pod_reverse_zone = %self.zones.origin(ZoneKind::PodReverse),
                        "Managed zones bootstrapped"
                    );
                    return;
                }
                Err(e) => {
                    let outcome = bootstrap_outcome(&e);
                    record_bootstrap_attempt(outcome);
                    if e.is_transient() {
                        warn!(
                            server = %self.updater.endpoint(),
                            error = %e,
                            retry_after = ?interval,
                            "DNS update server not ready, will retry bootstrap"
                        );
                    } else {
                        error!(
                            server = %self.updater.endpoint(),
                            error = %e,
                            retry_after = ?interval,
                            "DNS update server rejected bootstrap, will retry"
                        );
                    }
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    /// Delete the RRset at (`rrset.name`, `rrset.rr_type`) then add `rrset`.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever call failed. A failed delete skips the add.
    pub async fn replace_rrset(&self, zone: ZoneKind, rrset: &RRset) -> Result<(), UpdateError> {
        let zone_name = self.zone_name(zone);
        self.updater
            .delete_rrsets(&zone_name, &[WireRRsetKey::new(&rrset.name, rrset.rr_type)])
            .await?;
        self.updater
            .add_rrsets(&zone_name, &[WireRRset::from(rrset)])
            .await
    }

    /// Delete the RRset at (`name`, `rr_type`).
    ///
    /// # Errors
    ///
    /// Returns the [`UpdateError`] of the delete call.
    pub async fn delete_rrset(
        &self,
        zone: ZoneKind,
        name: &Name,
        rr_type: RecordType,
    ) -> Result<(), UpdateError> {
        self.updater
            .delete_rrsets(&self.zone_name(zone), &[WireRRsetKey::new(name, rr_type)])
            .await
    }

    /// Apply one planned change and record its outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`UpdateError`] of the failed call.
    pub async fn apply(&self, change: &ZoneChange) -> Result<(), UpdateError> {
        let result = match change {
            ZoneChange::Replace { zone, rrset } => self.replace_rrset(*zone, rrset).await,
            ZoneChange::Delete {
                zone,
                name,
                rr_type,
            } => self.delete_rrset(*zone, name, *rr_type).await,
        };

        let outcome = match &result {
            Ok(()) => "success",
            Err(e) => e.kind(),
        };
        record_rrset_operation(change.operation(), outcome);
        result
    }
}

/// Metrics outcome label of a failed bootstrap attempt.
fn bootstrap_outcome(error: &UpdateError) -> &'static str {
    if error.is_transient() {
        "transient"
    } else {
        "permanent"
    }
}

#[cfg(test)]
#[path = "sync_client_tests.rs"]
mod sync_client_tests;
