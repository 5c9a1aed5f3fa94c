//! Direct strategy fed by encoded `system.peers` results

mod common;

#[cfg(test)]
mod direct_resolution {
    use super::common::init_tracing;
    use cql_topology::protocol::{
        decode_rows_result, encode_rows_result, encode_value, ColumnSpec, DataType,
        ProtocolVersion, RowsMetadata, RowsResult,
    };
    use cql_topology::{DirectEndpointFactory, EndpointFactory, Error, RowSet, Value};

    /// Encode a peers result the way a node would send it, then decode it
    fn peers_payload(version: ProtocolVersion, rows: &[(&str, &str)]) -> RowSet {
        let inet = |s: &str| encode_value(&Value::Inet(s.parse().unwrap()), version).unwrap();
        let result = RowsResult {
            metadata: RowsMetadata {
                column_count: 3,
                columns: vec![
                    ColumnSpec::new("system", "peers", "peer", DataType::Inet),
                    ColumnSpec::new("system", "peers", "data_center", DataType::Varchar),
                    ColumnSpec::new("system", "peers", "rpc_address", DataType::Inet),
                ],
                ..Default::default()
            },
            rows: rows
                .iter()
                .map(|(peer, rpc)| {
                    vec![
                        inet(peer),
                        encode_value(&Value::Text("dc1".into()), version).unwrap(),
                        inet(rpc),
                    ]
                })
                .collect(),
        };
        let body = encode_rows_result(&result).unwrap();
        RowSet::new(decode_rows_result(&body, version).unwrap(), version).unwrap()
    }

    #[tokio::test]
    async fn test_peers_to_endpoints() {
        init_tracing();
        let factory = DirectEndpointFactory::resolve_default(&["10.0.0.1"])
            .await
            .unwrap();
        assert_eq!(factory.contact_points().len(), 1);
        assert_eq!(factory.contact_points()[0].addr(), "10.0.0.1:9042");

        let rows = peers_payload(
            ProtocolVersion::V4,
            &[("10.0.0.5", "0.0.0.0"), ("10.0.0.7", "10.0.0.9")],
        );
        let endpoints: Vec<String> = rows
            .rows()
            .map(|row| factory.create(&row).unwrap().addr().to_string())
            .collect();
        assert_eq!(endpoints, vec!["10.0.0.5:9042", "10.0.0.9:9042"]);
    }

    #[tokio::test]
    async fn test_by_name_and_by_position_agree_after_wire_decode() {
        for version in [
            ProtocolVersion::V3,
            ProtocolVersion::V4,
            ProtocolVersion::V5,
        ] {
            let rows = peers_payload(version, &[("10.0.0.5", "10.0.0.9")]);
            let row = rows.row(0);
            for (i, column) in rows.columns().iter().enumerate() {
                assert_eq!(
                    row.by_name(&column.name).unwrap(),
                    row.by_position(i).unwrap()
                );
            }
            assert!(matches!(
                row.by_name("host_id"),
                Err(Error::ColumnNotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_custom_default_port() {
        let factory = DirectEndpointFactory::resolve(&["10.0.0.1", "10.0.0.2:19042"], 9142)
            .await
            .unwrap();
        let addrs: Vec<&str> = factory.contact_points().iter().map(|e| e.addr()).collect();
        assert_eq!(addrs, vec!["10.0.0.1:9142", "10.0.0.2:19042"]);

        let rows = peers_payload(ProtocolVersion::V4, &[("10.0.0.5", "10.0.0.6")]);
        assert_eq!(factory.create(&rows.row(0)).unwrap().addr(), "10.0.0.6:9142");
    }
}
