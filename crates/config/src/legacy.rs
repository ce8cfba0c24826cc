// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Legacy line formats
//!
//! `intersections.txt`: one `Name:capacity` per line.
//! `trains.txt`: one `Train:ResA,ResB,...` per line.
//! All whitespace inside a line is ignored; blank lines are skipped.

use crate::yard::{ClientDef, ResourceDef};
use crate::ParseError;

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn split_line(line_no: usize, line: &str) -> Result<(String, String), ParseError> {
    let (name, rest) = line.split_once(':').ok_or_else(|| ParseError::Line {
        line: line_no,
        message: "expected `name:value`".to_string(),
    })?;
    let name = strip_whitespace(name);
    if name.is_empty() {
        return Err(ParseError::Line {
            line: line_no,
            message: "empty name".to_string(),
        });
    }
    Ok((name, strip_whitespace(rest)))
}

/// Parse `intersections.txt` content
pub fn parse_intersections(content: &str) -> Result<Vec<ResourceDef>, ParseError> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, capacity) = split_line(idx + 1, line)?;
        let capacity = capacity.parse::<u32>().map_err(|e| ParseError::Line {
            line: idx + 1,
            message: format!("invalid capacity for {}: {}", name, e),
        })?;
        out.push(ResourceDef { name, capacity });
    }
    Ok(out)
}

/// Parse `trains.txt` content
pub fn parse_trains(content: &str) -> Result<Vec<ClientDef>, ParseError> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, route) = split_line(idx + 1, line)?;
        let itinerary = route
            .split(',')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        out.push(ClientDef { id, itinerary });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_intersections_with_whitespace() {
        let defs = parse_intersections("IntersectionA: 1\n\n  IntersectionB :3\r\n").unwrap();
        assert_eq!(
            defs,
            vec![
                ResourceDef {
                    name: "IntersectionA".to_string(),
                    capacity: 1
                },
                ResourceDef {
                    name: "IntersectionB".to_string(),
                    capacity: 3
                },
            ]
        );
    }

    #[test]
    fn bad_capacity_reports_line() {
        let err = parse_intersections("A:1\nB:lots\n").unwrap_err();
        assert!(matches!(err, ParseError::Line { line: 2, .. }), "{}", err);
    }

    #[test]
    fn missing_colon_is_an_error() {
        assert!(parse_intersections("IntersectionA 1").is_err());
        assert!(parse_trains("Train1 A,B").is_err());
    }

    #[test]
    fn parses_train_routes() {
        let defs = parse_trains("Train1: IntersectionA, IntersectionB\nTrain2:IntersectionB\n").unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id, "Train1");
        assert_eq!(defs[0].itinerary, vec!["IntersectionA", "IntersectionB"]);
        assert_eq!(defs[1].itinerary, vec!["IntersectionB"]);
    }

    #[test]
    fn empty_route_is_allowed() {
        let defs = parse_trains("Train1:\n").unwrap();
        assert!(defs[0].itinerary.is_empty());
    }
}
