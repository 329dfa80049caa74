use super::*;

const TRI: &str = r#"{"uvs":[[0,0],[1,0],[0.5,1]],"indices":[[0,1,2]]}"#;

#[test]
fn parses_matching_topology() {
    let t = parse_topology(TRI.as_bytes(), 3).unwrap();
    assert_eq!(t.vertex_count(), 3);
    assert_eq!(t.indices().len(), 1);
}

#[test]
fn rejects_vertex_count_mismatch() {
    let err = parse_topology(TRI.as_bytes(), 478).unwrap_err();
    assert!(err.to_string().contains("478 landmarks"));
}

#[test]
fn rejects_bad_json_and_bad_indices() {
    assert!(parse_topology(b"{", 3).is_err());
    let bad = r#"{"uvs":[[0,0],[1,0],[0.5,1]],"indices":[[0,1,7]]}"#;
    assert!(parse_topology(bad.as_bytes(), 3).is_err());
}
