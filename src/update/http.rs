// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP/JSON transport for the dynamic update protocol.

use super::protocol::{
    AddRRsetRequest, AddZoneRequest, DeleteRRsetRequest, DeleteZoneRequest, WireRRset,
    WireRRsetKey,
};
use super::DynamicUpdate;
use crate::constants::UPDATE_API_BASE_PATH;
use crate::dns_errors::UpdateError;
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

/// Build the API base URL from a server address.
///
/// Converts `dns-update:5555` to `http://dns-update:5555`. Addresses that already
/// carry a scheme are kept, minus any trailing slash.
#[must_use]
pub fn build_api_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", server.trim_end_matches('/'))
    }
}

/// [`DynamicUpdate`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUpdateClient {
    client: HttpClient,
    server: String,
    base_url: String,
}

impl HttpUpdateClient {
    /// Create a client for `server`; `timeout` bounds connect and each request.
    ///
    /// No connection is made here. The first call reaches the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(server: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = HttpClient::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            server: server.to_string(),
            base_url: build_api_url(server),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{UPDATE_API_BASE_PATH}{path}", self.base_url)
    }

    /// POST a JSON body and map the outcome onto [`UpdateError`].
    ///
    /// Statuses listed in `accept` are treated like a success.
    async fn post<T: Serialize + std::fmt::Debug>(
        &self,
        operation: &'static str,
        path: &str,
        body: &T,
        accept: &[StatusCode],
    ) -> Result<(), UpdateError> {
        let url = self.url(path);
        debug!(operation, url = %url, body = ?body, "Sending DNS update request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| UpdateError::Connection {
                endpoint: self.server.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() || accept.contains(&status) {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(
            operation,
            url = %url,
            status = %status,
            error = %body,
            "DNS update request failed"
        );
        Err(UpdateError::Rejected {
            endpoint: self.server.clone(),
            operation,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DynamicUpdate for HttpUpdateClient {
    fn endpoint(&self) -> &str {
        &self.server
    }

    async fn add_zone(&self, zone: &str, zone_content: &str) -> Result<(), UpdateError> {
        let request = AddZoneRequest {
            zone: zone.to_string(),
            zone_content: zone_content.to_string(),
        };
        self.post("AddZone", "/zones", &request, &[]).await
    }

    async fn delete_zones(&self, zones: &[String]) -> Result<(), UpdateError> {
        let request = DeleteZoneRequest {
            zones: zones.to_vec(),
        };
        self.post("DeleteZone", "/zones/delete", &request, &[StatusCode::NOT_FOUND])
            .await
    }

    async fn add_rrsets(&self, zone: &str, rrsets: &[WireRRset]) -> Result<(), UpdateError> {
        let request = AddRRsetRequest {
            zone: zone.to_string(),
            rrsets: rrsets.to_vec(),
        };
        self.post("AddRRset", "/rrsets", &request, &[]).await
    }

    async fn delete_rrsets(
        &self,
        zone: &str,
        rrsets: &[WireRRsetKey],
    ) -> Result<(), UpdateError> {
        let request = DeleteRRsetRequest {
            zone: zone.to_string(),
            rrsets: rrsets.to_vec(),
        };
        self.post(
            "DeleteRRset",
            "/rrsets/delete",
            &request,
            &[StatusCode::NOT_FOUND],
        )
        .await
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
