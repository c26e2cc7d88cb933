// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `protocol.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use hickory_proto::rr::rdata::{A, PTR, SRV};
    use hickory_proto::rr::RData;
    use serde_json::json;

    fn name(text: &str) -> Name {
        Name::from_ascii(text).unwrap()
    }

    #[test]
    fn test_record_type_serializes_uppercase() {
        assert_eq!(serde_json::to_value(WireRecordType::Srv).unwrap(), json!("SRV"));
        assert_eq!(serde_json::to_value(WireRecordType::Aaaa).unwrap(), json!("AAAA"));
        assert_eq!(serde_json::to_value(WireRecordType::Cname).unwrap(), json!("CNAME"));
    }

    #[test]
    fn test_record_type_from_supported_types() {
        assert_eq!(WireRecordType::from(RecordType::A), WireRecordType::A);
        assert_eq!(WireRecordType::from(RecordType::PTR), WireRecordType::Ptr);
        assert_eq!(WireRecordType::from(RecordType::SRV), WireRecordType::Srv);
        assert_eq!(WireRecordType::from(RecordType::CNAME), WireRecordType::Cname);
        assert_eq!(WireRecordType::from(RecordType::SOA), WireRecordType::Soa);
    }

    #[test]
    #[should_panic(expected = "cannot be sent to the DNS update server")]
    fn test_record_type_outside_supported_set_panics() {
        let _ = WireRecordType::from(RecordType::MX);
    }

    #[test]
    fn test_wire_rrset_from_a_rrset() {
        let rrset = RRset::new(
            name("web.default.svc.cluster.local."),
            RecordType::A,
            vec![
                RData::A(A("10.0.0.5".parse().unwrap())),
                RData::A(A("10.0.0.5".parse().unwrap())),
            ],
        );

        let wire = WireRRset::from(&rrset);
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({
                "name": "web.default.svc.cluster.local.",
                "type": "A",
                "ttl": 5,
                "rdatas": ["10.0.0.5", "10.0.0.5"],
            })
        );
    }

    #[test]
    fn test_wire_rrset_presentation_format() {
        let srv = RRset::new(
            name("_http._tcp.web.ns1.svc.cluster.local."),
            RecordType::SRV,
            vec![RData::SRV(SRV::new(
                10,
                100,
                80,
                name("10-1-2-3.web.ns1.svc.cluster.local."),
            ))],
        );
        assert_eq!(
            WireRRset::from(&srv).rdatas,
            vec!["10 100 80 10-1-2-3.web.ns1.svc.cluster.local.".to_string()]
        );

        let ptr = RRset::new(
            name("3.2.1.10.in-addr.arpa."),
            RecordType::PTR,
            vec![RData::PTR(PTR(name("10-1-2-3.web.ns1.svc.cluster.local.")))],
        );
        assert_eq!(
            WireRRset::from(&ptr).rdatas,
            vec!["10-1-2-3.web.ns1.svc.cluster.local.".to_string()]
        );
    }

    #[test]
    fn test_request_bodies() {
        let add_zone = AddZoneRequest {
            zone: "cluster.local.".to_string(),
            zone_content: "cluster.local. 5 IN NS ns.dns.cluster.local.".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&add_zone).unwrap(),
            json!({
                "zone": "cluster.local.",
                "zoneContent": "cluster.local. 5 IN NS ns.dns.cluster.local.",
            })
        );

        let delete = DeleteRRsetRequest {
            zone: "cluster.local.".to_string(),
            rrsets: vec![WireRRsetKey::new(
                &name("web.default.svc.cluster.local."),
                RecordType::A,
            )],
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({
                "zone": "cluster.local.",
                "rrsets": [{"name": "web.default.svc.cluster.local.", "type": "A"}],
            })
        );
    }
}
