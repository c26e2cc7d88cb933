// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `http.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::update::WireRecordType;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpUpdateClient {
        HttpUpdateClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    // =====================================================
    // URL building
    // =====================================================

    #[test]
    fn test_build_api_url_without_scheme() {
        assert_eq!(build_api_url("127.0.0.1:5555"), "http://127.0.0.1:5555");
        assert_eq!(
            build_api_url("dns-update.kube-system.svc:5555"),
            "http://dns-update.kube-system.svc:5555"
        );
    }

    #[test]
    fn test_build_api_url_keeps_scheme_and_trims_slash() {
        assert_eq!(build_api_url("https://dns.example.com/"), "https://dns.example.com");
        assert_eq!(build_api_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_reports_configured_server() {
        let client = HttpUpdateClient::new("127.0.0.1:5555", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "127.0.0.1:5555");
    }

    // =====================================================
    // Request shapes
    // =====================================================

    #[tokio::test]
    async fn test_add_zone_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/zones"))
            .and(body_json(json!({
                "zone": "cluster.local.",
                "zoneContent": "cluster.local. 5 IN NS ns.dns.cluster.local.\n",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_zone("cluster.local.", "cluster.local. 5 IN NS ns.dns.cluster.local.\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_zones_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/zones/delete"))
            .and(body_json(json!({
                "zones": ["cluster.local.", "0.10.in-addr.arpa.", "1.10.in-addr.arpa."],
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let zones = vec![
            "cluster.local.".to_string(),
            "0.10.in-addr.arpa.".to_string(),
            "1.10.in-addr.arpa.".to_string(),
        ];
        client_for(&server).delete_zones(&zones).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_zone_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/zones/delete"))
            .respond_with(ResponseTemplate::new(404).set_body_string("zone not found"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .delete_zones(&["cluster.local.".to_string()])
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_add_rrsets_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rrsets"))
            .and(body_json(json!({
                "zone": "cluster.local.",
                "rrsets": [{
                    "name": "web.default.svc.cluster.local.",
                    "type": "A",
                    "ttl": 5,
                    "rdatas": ["10.0.0.5"],
                }],
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let rrset = WireRRset {
            name: "web.default.svc.cluster.local.".to_string(),
            rr_type: WireRecordType::A,
            ttl: 5,
            rdatas: vec!["10.0.0.5".to_string()],
        };
        client_for(&server)
            .add_rrsets("cluster.local.", &[rrset])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_rrsets_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rrsets/delete"))
            .and(body_json(json!({
                "zone": "0.10.in-addr.arpa.",
                "rrsets": [{"name": "5.0.0.10.in-addr.arpa.", "type": "PTR"}],
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let key = WireRRsetKey {
            name: "5.0.0.10.in-addr.arpa.".to_string(),
            rr_type: WireRecordType::Ptr,
        };
        client_for(&server)
            .delete_rrsets("0.10.in-addr.arpa.", &[key])
            .await
            .unwrap();
    }

    // =====================================================
    // Failures
    // =====================================================

    #[tokio::test]
    async fn test_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rrsets"))
            .respond_with(ResponseTemplate::new(500).set_body_string("zone is not loaded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .add_rrsets("cluster.local.", &[])
            .await
            .unwrap_err();

        match &err {
            UpdateError::Rejected {
                operation,
                status,
                body,
                ..
            } => {
                assert_eq!(*operation, "AddRRset");
                assert_eq!(*status, 500);
                assert_eq!(body, "zone is not loaded");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_client_error_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/zones"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad zone content"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .add_zone("cluster.local.", "garbage")
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(err.kind(), "rejected");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 9 (discard) on loopback is not expected to accept connections
        let client = HttpUpdateClient::new("127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = client
            .delete_zones(&["cluster.local.".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "connection");
        assert!(err.is_transient());
    }
}
