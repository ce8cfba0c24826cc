// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const SAMPLE_YARD: &str = r#"
[resource.IntersectionA]
capacity = 1

[resource.IntersectionB]
capacity = 2

[client.Train1]
itinerary = ["IntersectionA", "IntersectionB"]

[client.Train2]
itinerary = ["IntersectionB", "IntersectionA"]
"#;

#[test]
fn parse_sample_yard() {
    let yard = parse_yard(SAMPLE_YARD).unwrap();

    assert_eq!(yard.resources.len(), 2);
    assert_eq!(yard.get_resource("IntersectionB").unwrap().capacity, 2);
    assert_eq!(
        yard.get_client("Train2").unwrap().itinerary,
        vec!["IntersectionB", "IntersectionA"]
    );
    yard.validate().unwrap();
}

#[test]
fn empty_document_parses_but_does_not_validate() {
    let yard = parse_yard("").unwrap();
    assert!(matches!(yard.validate(), Err(ParseError::Empty("resource"))));
}

#[test]
fn missing_capacity_is_reported() {
    let err = parse_yard("[resource.A]\n").unwrap_err();
    assert!(matches!(err, ParseError::MissingField(f) if f == "resource.A.capacity"));
}

#[test]
fn negative_capacity_is_rejected() {
    let err = parse_yard("[resource.A]\ncapacity = -1\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidCapacity { resource } if resource == "A"));
}

#[test]
fn non_string_itinerary_entry_is_rejected() {
    let err = parse_yard("[client.T]\nitinerary = [\"A\", 3]\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidFormat(_)));
}

#[test]
fn missing_itinerary_is_reported() {
    let err = parse_yard("[client.T]\n").unwrap_err();
    assert!(matches!(err, ParseError::MissingField(f) if f == "client.T.itinerary"));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert!(matches!(parse_yard("[resource"), Err(ParseError::Toml(_))));
}

#[test]
fn load_yard_validates() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[resource.A]\ncapacity = 1\n[client.T]\nitinerary = [\"A\", \"B\"]"
    )
    .unwrap();

    let err = load_yard(file.path()).unwrap_err();
    assert!(
        matches!(&err, ParseError::UnknownResource { client, resource } if client == "T" && resource == "B"),
        "{}",
        err
    );
}

#[test]
fn load_legacy_reads_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let intersections = dir.path().join("intersections.txt");
    let trains = dir.path().join("trains.txt");
    std::fs::write(&intersections, "IntersectionA:1\nIntersectionB:2\n").unwrap();
    std::fs::write(&trains, "Train1:IntersectionA,IntersectionB\n").unwrap();

    let yard = load_legacy(&intersections, &trains).unwrap();

    assert_eq!(yard.resources.len(), 2);
    assert_eq!(yard.clients[0].id, "Train1");
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_yard(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
}
