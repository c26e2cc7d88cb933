// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes watch streams turned into typed resource events.
//!
//! The kube watcher reports the current state of objects (`Apply`, `Delete`) and
//! periodic re-lists (`Init` .. `InitDone`). [`EventTranslator`] keeps the last
//! seen version of every object so it can tell creates from updates, drop
//! updates that changed nothing, and synthesize deletes for objects that vanished
//! while the watch was down.

use crate::controller::{ResourceEvent, WatchEvent};
use futures::{Future, Stream, StreamExt};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use tracing::{debug, warn};

fn object_key<K: ResourceExt>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

/// Converts watcher events for one resource kind into [`ResourceEvent`]s.
#[derive(Debug)]
pub struct EventTranslator<K> {
    known: HashMap<String, K>,
    relisted: Option<HashSet<String>>,
}

impl<K> Default for EventTranslator<K> {
    fn default() -> Self {
        Self {
            known: HashMap::new(),
            relisted: None,
        }
    }
}

impl<K: Resource + Clone> EventTranslator<K> {
    /// Number of objects currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Translate one watcher event; zero or more resource events come out.
    pub fn translate(&mut self, event: watcher::Event<K>) -> Vec<ResourceEvent<K>> {
        match event {
            watcher::Event::Init => {
                self.relisted = Some(HashSet::new());
                Vec::new()
            }
            watcher::Event::InitApply(obj) => {
                if let Some(seen) = self.relisted.as_mut() {
                    seen.insert(object_key(&obj));
                }
                self.apply(obj).into_iter().collect()
            }
            watcher::Event::Apply(obj) => self.apply(obj).into_iter().collect(),
            watcher::Event::Delete(obj) => {
                self.known.remove(&object_key(&obj));
                vec![ResourceEvent::Delete(obj)]
            }
            watcher::Event::InitDone => self.finish_relist(),
        }
    }

    fn apply(&mut self, obj: K) -> Option<ResourceEvent<K>> {
        let key = object_key(&obj);
        match self.known.insert(key, obj.clone()) {
            None => Some(ResourceEvent::Create(obj)),
            Some(old) => {
                let version = obj.meta().resource_version.as_ref();
                if version.is_some() && old.meta().resource_version.as_ref() == version {
                    None
                } else {
                    Some(ResourceEvent::Update { old, new: obj })
                }
            }
        }
    }

    /// Objects known before a re-list but missing from it were deleted meanwhile.
    fn finish_relist(&mut self) -> Vec<ResourceEvent<K>> {
        let Some(seen) = self.relisted.take() else {
            return Vec::new();
        };
        let gone: Vec<String> = self
            .known
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();

        gone.into_iter()
            .filter_map(|key| self.known.remove(&key))
            .map(ResourceEvent::Delete)
            .collect()
    }
}

/// Typed events of every object of kind `K` in the cluster.
///
/// Watch errors are logged; the watcher backs off and resumes on its own.
pub fn resource_events<K>(api: Api<K>) -> impl Stream<Item = ResourceEvent<K>> + Send
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    K::DynamicType: Default,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    let mut translator = EventTranslator::<K>::default();

    watcher(api, watcher::Config::default())
        .default_backoff()
        .map(move |result| match result {
            Ok(event) => translator.translate(event),
            Err(e) => {
                warn!(kind = %kind, error = %e, "Watch stream error, backing off");
                Vec::new()
            }
        })
        .flat_map(futures::stream::iter)
}

/// Service events from every namespace.
pub fn service_events(client: Client) -> impl Stream<Item = WatchEvent> + Send {
    resource_events(Api::<Service>::all(client)).map(WatchEvent::Service)
}

/// Endpoints events from every namespace.
pub fn endpoints_events(client: Client) -> impl Stream<Item = WatchEvent> + Send {
    resource_events(Api::<Endpoints>::all(client)).map(WatchEvent::Endpoints)
}

/// Service and Endpoints events merged into one stream.
pub fn cluster_events(client: Client) -> impl Stream<Item = WatchEvent> + Send {
    futures::stream::select(service_events(client.clone()), endpoints_events(client))
}

/// A Service cache and the future that keeps it current.
///
/// The future never completes on its own; spawn it and await
/// [`Store::wait_until_ready`] before reading from the store.
pub fn service_reflector(client: Client) -> (Store<Service>, impl Future<Output = ()> + Send) {
    let (reader, writer) = reflector::store::<Service>();
    let driver = watcher(Api::<Service>::all(client), watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .for_each(|result| {
            match result {
                Ok(watcher::Event::InitDone) => debug!("Service cache synchronized"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Service cache watch error, backing off"),
            }
            futures::future::ready(())
        });
    (reader, driver)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod watch_tests;
