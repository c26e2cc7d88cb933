// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of Service and Endpoints events into zone changes.
//!
//! Each watch event is turned into an ordered list of [`ZoneChange`]s by
//! [`Controller::plan`], a pure function of the event and the cached Service.
//! [`Controller::handle`] then applies the plan one change at a time.
//!
//! # Event handling
//!
//! | Event | Condition | Changes |
//! |---|---|---|
//! | Service create | Normal | replace A and PTR |
//! | Service create | `ExternalName` | replace CNAME |
//! | Service update | old Normal, cluster IP changed | delete old A and PTR, replace new ones |
//! | Service update | new `ExternalName`, external name changed | replace CNAME |
//! | Service delete | any variant | delete what the variant created |
//! | Endpoints create | Service cached | replace pod records (+ aggregate A if headless) |
//! | Endpoints update | record-relevant change | aggregate A if headless, delete old pod records, replace new ones |
//! | Endpoints delete | - | delete pod records of the deleted snapshot |
//!
//! Failed changes are logged and dropped. The remote zones are rebuilt from
//! scratch on every restart, which is the recovery path for anything lost here.

use crate::classify::{
    classify_service, cluster_ip, endpoints_unchanged, external_name, is_headless, subsets,
    ServiceKind,
};
use crate::metrics::record_event;
use crate::naming::ZoneKind;
use crate::records::{
    external_name_record, headless_aggregate_record, pod_record_keys, pod_records,
    service_records, ServiceRecords,
};
use crate::sync_client::{ZoneChange, ZoneSyncClient};
use crate::update::DynamicUpdate;
use futures::{Stream, StreamExt};
use hickory_proto::rr::RecordType;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::runtime::reflector::{ObjectRef, Store};
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Point lookup of cached Services by identity.
pub trait ServiceLookup: Send + Sync {
    /// The Service `namespace/name`, if cached.
    fn get_service(&self, name: &str, namespace: &str) -> Option<Arc<Service>>;
}

impl ServiceLookup for Store<Service> {
    fn get_service(&self, name: &str, namespace: &str) -> Option<Arc<Service>> {
        self.get(&ObjectRef::new(name).within(namespace))
    }
}

/// A change to one watched object.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent<K> {
    Create(K),
    Update { old: K, new: K },
    Delete(K),
}

impl<K> ResourceEvent<K> {
    /// `create`, `update` or `delete`.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// An event for one of the two watched resource kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Service(ResourceEvent<Service>),
    Endpoints(ResourceEvent<Endpoints>),
}

impl WatchEvent {
    /// Kind of the object the event is about.
    #[must_use]
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Service(_) => "Service",
            Self::Endpoints(_) => "Endpoints",
        }
    }

    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Service(event) => event.action(),
            Self::Endpoints(event) => event.action(),
        }
    }

    /// `namespace/name` of the object, for logs.
    #[must_use]
    pub fn object_key(&self) -> String {
        fn key<K: ResourceExt>(event: &ResourceEvent<K>) -> String {
            let obj = match event {
                ResourceEvent::Create(obj)
                | ResourceEvent::Delete(obj)
                | ResourceEvent::Update { new: obj, .. } => obj,
            };
            format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
        }
        match self {
            Self::Service(event) => key(event),
            Self::Endpoints(event) => key(event),
        }
    }
}

fn replace_service_records(records: ServiceRecords, changes: &mut Vec<ZoneChange>) {
    if let Some(rrset) = records.a {
        changes.push(ZoneChange::Replace {
            zone: ZoneKind::Service,
            rrset,
        });
    }
    if let Some(rrset) = records.ptr {
        changes.push(ZoneChange::Replace {
            zone: ZoneKind::ServiceReverse,
            rrset,
        });
    }
}

fn delete_service_records(records: &ServiceRecords, changes: &mut Vec<ZoneChange>) {
    if let Some(rrset) = &records.a {
        changes.push(ZoneChange::delete_of(ZoneKind::Service, rrset));
    }
    if let Some(rrset) = &records.ptr {
        changes.push(ZoneChange::delete_of(ZoneKind::ServiceReverse, rrset));
    }
}

/// Drives zone changes from watch events.
pub struct Controller<U, L> {
    client: ZoneSyncClient<U>,
    services: L,
}

impl<U: DynamicUpdate, L: ServiceLookup> Controller<U, L> {
    pub fn new(client: ZoneSyncClient<U>, services: L) -> Self {
        Self { client, services }
    }

    #[must_use]
    pub fn client(&self) -> &ZoneSyncClient<U> {
        &self.client
    }

    /// Compute the zone changes implied by `event`, in apply order.
    #[must_use]
    pub fn plan(&self, event: &WatchEvent) -> Vec<ZoneChange> {
        match event {
            WatchEvent::Service(ResourceEvent::Create(svc)) => self.plan_service_create(svc),
            WatchEvent::Service(ResourceEvent::Update { old, new }) => {
                self.plan_service_update(old, new)
            }
            WatchEvent::Service(ResourceEvent::Delete(svc)) => self.plan_service_delete(svc),
            WatchEvent::Endpoints(ResourceEvent::Create(ep)) => self.plan_endpoints_create(ep),
            WatchEvent::Endpoints(ResourceEvent::Update { old, new }) => {
                self.plan_endpoints_update(old, new)
            }
            WatchEvent::Endpoints(ResourceEvent::Delete(ep)) => self.plan_pod_deletion(ep),
        }
    }

    /// Plan and apply one event. Failed changes are logged and dropped.
    pub async fn handle(&self, event: WatchEvent) {
        let start = Instant::now();
        let changes = self.plan(&event);
        info!(
            resource = event.resource(),
            action = event.action(),
            object = %event.object_key(),
            changes = changes.len(),
            "Handling watch event"
        );

        for change in &changes {
            if let Err(e) = self.client.apply(change).await {
                error!(
                    server = %self.client.updater().endpoint(),
                    zone = %self.client.zones().origin(change.zone()),
                    name = %change.name(),
                    rr_type = %change.rr_type(),
                    operation = change.operation(),
                    error = %e,
                    "Failed to apply zone change"
                );
            }
        }

        record_event(event.resource(), event.action(), start.elapsed());
    }

    /// Handle events one at a time until the stream ends.
    pub async fn run<S>(&self, events: S)
    where
        S: Stream<Item = WatchEvent>,
    {
        let mut events = std::pin::pin!(events);
        while let Some(event) = events.next().await {
            self.handle(event).await;
        }
        info!("Event stream ended");
    }

    // ===== Services =====

    fn plan_service_create(&self, svc: &Service) -> Vec<ZoneChange> {
        let zones = self.client.zones();
        let mut changes = Vec::new();
        match classify_service(svc) {
            Some(ServiceKind::Normal) => {
                replace_service_records(service_records(zones, svc), &mut changes);
            }
            Some(ServiceKind::ExternalName) => {
                changes.extend(external_name_record(zones, svc).map(|rrset| {
                    ZoneChange::Replace {
                        zone: ZoneKind::Service,
                        rrset,
                    }
                }));
            }
            // Headless records follow the Endpoints
            Some(ServiceKind::Headless) | None => {}
        }
        changes
    }

    fn plan_service_update(&self, old: &Service, new: &Service) -> Vec<ZoneChange> {
        let zones = self.client.zones();
        let (old_kind, new_kind) = (classify_service(old), classify_service(new));
        let ip_changed = cluster_ip(old) != cluster_ip(new);
        let mut changes = Vec::new();

        if old_kind == Some(ServiceKind::Normal) && ip_changed {
            delete_service_records(&service_records(zones, old), &mut changes);
        }
        if old_kind == Some(ServiceKind::ExternalName) && new_kind != old_kind {
            changes.extend(self.delete_service_rrset(old, RecordType::CNAME));
        }

        match new_kind {
            Some(ServiceKind::Normal) if old_kind != new_kind || ip_changed => {
                replace_service_records(service_records(zones, new), &mut changes);
            }
            Some(ServiceKind::ExternalName)
                if old_kind != new_kind || external_name(old) != external_name(new) =>
            {
                changes.extend(external_name_record(zones, new).map(|rrset| {
                    ZoneChange::Replace {
                        zone: ZoneKind::Service,
                        rrset,
                    }
                }));
            }
            _ => {}
        }
        changes
    }

    fn plan_service_delete(&self, svc: &Service) -> Vec<ZoneChange> {
        let zones = self.client.zones();
        let mut changes = Vec::new();
        let rr_type = match classify_service(svc) {
            Some(ServiceKind::Normal) => {
                delete_service_records(&service_records(zones, svc), &mut changes);
                return changes;
            }
            Some(ServiceKind::Headless) => RecordType::A,
            Some(ServiceKind::ExternalName) => RecordType::CNAME,
            None => return changes,
        };
        changes.extend(self.delete_service_rrset(svc, rr_type));
        changes
    }

    /// Deletion of the RRset of `rr_type` at the service's own name.
    fn delete_service_rrset(&self, svc: &Service, rr_type: RecordType) -> Option<ZoneChange> {
        let name = self
            .client
            .zones()
            .service_name(&svc.name_any(), &svc.namespace().unwrap_or_default())
            .ok()?;
        Some(ZoneChange::Delete {
            zone: ZoneKind::Service,
            name,
            rr_type,
        })
    }

    // ===== Endpoints =====

    fn lookup_service(&self, endpoints: &Endpoints) -> Option<Arc<Service>> {
        let (name, namespace) = (
            endpoints.name_any(),
            endpoints.namespace().unwrap_or_default(),
        );
        let svc = self.services.get_service(&name, &namespace);
        if svc.is_none() {
            debug!(
                name = %name,
                namespace = %namespace,
                "No cached service for endpoints, ignoring"
            );
        }
        svc
    }

    fn plan_endpoints_create(&self, endpoints: &Endpoints) -> Vec<ZoneChange> {
        let Some(svc) = self.lookup_service(endpoints) else {
            return Vec::new();
        };
        let zones = self.client.zones();

        let mut changes: Vec<ZoneChange> = pod_records(zones, &svc, endpoints)
            .into_zone_rrsets()
            .into_iter()
            .map(|(zone, rrset)| ZoneChange::Replace { zone, rrset })
            .collect();
        if is_headless(&svc) {
            changes.extend(headless_aggregate_record(zones, &svc, endpoints).map(|rrset| {
                ZoneChange::Replace {
                    zone: ZoneKind::Service,
                    rrset,
                }
            }));
        }
        changes
    }

    fn plan_endpoints_update(&self, old: &Endpoints, new: &Endpoints) -> Vec<ZoneChange> {
        if subsets(old).is_empty() && subsets(new).is_empty() {
            return Vec::new();
        }
        if endpoints_unchanged(old, new) {
            return Vec::new();
        }
        let Some(svc) = self.lookup_service(old) else {
            return Vec::new();
        };
        let zones = self.client.zones();
        let mut changes = Vec::new();

        if is_headless(&svc) {
            match headless_aggregate_record(zones, &svc, new) {
                Some(rrset) => changes.push(ZoneChange::Replace {
                    zone: ZoneKind::Service,
                    rrset,
                }),
                None => changes.extend(self.delete_service_rrset(&svc, RecordType::A)),
            }
        }

        changes.extend(self.plan_pod_deletion(old));
        changes.extend(
            pod_records(zones, &svc, new)
                .into_zone_rrsets()
                .into_iter()
                .map(|(zone, rrset)| ZoneChange::Replace { zone, rrset }),
        );
        changes
    }

    fn plan_pod_deletion(&self, endpoints: &Endpoints) -> Vec<ZoneChange> {
        pod_record_keys(self.client.zones(), endpoints)
            .into_iter()
            .map(|(zone, name, rr_type)| ZoneChange::Delete {
                zone,
                name,
                rr_type,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
