use shrike_doc::{DocNode, ITEM_TAG};

use crate::errors::{Diagnostics, WitnessError};
use crate::sequence::{Location, Segment, Waypoint, WaypointKind};

/// Build the segment list from a parsed YAML witness document.
///
/// Returns the segments and the raw specification string found under
/// `metadata.task.specification`.
pub fn load_sequence_witness(
    root: &DocNode,
    diags: &mut Diagnostics,
) -> Result<(Vec<Segment>, String), WitnessError> {
    let entries: Vec<_> = root.children(ITEM_TAG).collect();
    if entries.len() != 1 {
        return Err(WitnessError::EntryListShape {
            count: entries.len(),
        });
    }
    let entry = entries[0];

    let entry_type = entry.attr("entry_type").unwrap_or("");
    if entry_type != "violation_sequence" {
        return Err(WitnessError::WrongEntryType {
            found: entry_type.to_string(),
        });
    }

    let content = entry.child("content").ok_or_else(|| WitnessError::MissingElement {
        element: "content".into(),
    })?;
    let segment_nodes: Vec<_> = content.children(ITEM_TAG).collect();
    if segment_nodes.is_empty() {
        return Err(WitnessError::NoSegments);
    }

    let mut segments = Vec::with_capacity(segment_nodes.len());
    let segment_count = segment_nodes.len();
    for (i, wrapper) in segment_nodes.iter().enumerate() {
        let segment_node = wrapper.child("segment").ok_or_else(|| WitnessError::MissingElement {
            element: "segment".into(),
        })?;
        let last_segment = i == segment_count - 1;
        segments.push(read_segment(segment_node, last_segment, diags)?);
    }

    if segments
        .last()
        .map(|s| s.follow.kind != WaypointKind::Target)
        .unwrap_or(true)
    {
        return Err(WitnessError::MissingTarget);
    }

    let specification = entry
        .child("metadata")
        .and_then(|m| m.child("task"))
        .and_then(|t| t.child("specification"))
        .map(|s| s.text().to_string())
        .ok_or(WitnessError::MissingSpecification)?;

    Ok((segments, specification))
}

fn read_segment(
    segment_node: &DocNode,
    last_segment: bool,
    diags: &mut Diagnostics,
) -> Result<Segment, WitnessError> {
    let waypoint_nodes: Vec<_> = segment_node.children(ITEM_TAG).collect();
    if waypoint_nodes.is_empty() {
        return Err(WitnessError::MissingElement {
            element: "waypoint".into(),
        });
    }

    let mut avoid = Vec::new();
    let mut follow = None;
    let count = waypoint_nodes.len();

    for (j, wrapper) in waypoint_nodes.iter().enumerate() {
        let wp_node = wrapper.child("waypoint").ok_or_else(|| WitnessError::MissingElement {
            element: "waypoint".into(),
        })?;
        let last_waypoint = j == count - 1;
        let kind = read_kind(wp_node)?;

        if kind == WaypointKind::Target {
            if !(last_segment && last_waypoint) {
                return Err(WitnessError::MisplacedTarget);
            }
            let mut waypoint = Waypoint::new(kind, read_target_location(wp_node, diags)?);
            waypoint.loc2 = read_secondary_location(wp_node, diags)?;
            follow = Some(waypoint);
            break;
        }

        let mut waypoint = Waypoint::new(kind, read_location(wp_node)?);
        if let Some(constraint) = wp_node.child("constraint").and_then(|c| c.attr("value")) {
            waypoint.constraint = constraint.to_string();
        }

        let action = wp_node.attr("action").unwrap_or("");
        if last_waypoint || action == "follow" {
            if !last_waypoint || action != "follow" {
                return Err(WitnessError::FollowNotLast);
            }
            follow = Some(waypoint);
            break;
        }
        avoid.push(waypoint);
    }

    let follow = follow.ok_or(WitnessError::FollowNotLast)?;
    Ok(Segment { avoid, follow })
}

fn read_kind(wp_node: &DocNode) -> Result<WaypointKind, WitnessError> {
    let value = wp_node.attr("type").unwrap_or("");
    match value {
        "assumption" => Ok(WaypointKind::Assume),
        "branching" => Ok(WaypointKind::Branch),
        "function_return" => Ok(WaypointKind::Return),
        "function_enter" => Ok(WaypointKind::Enter),
        "target" => Ok(WaypointKind::Target),
        other => Err(WitnessError::UnknownWaypointType {
            value: other.to_string(),
        }),
    }
}

fn read_location(wp_node: &DocNode) -> Result<Location, WitnessError> {
    let loc_node = wp_node.child("location").ok_or_else(|| WitnessError::MissingElement {
        element: "location".into(),
    })?;
    let file = loc_node
        .attr("file_name")
        .ok_or_else(|| WitnessError::MissingLocationField {
            field: "file_name".into(),
        })?
        .to_string();
    let line = loc_node
        .attr("line")
        .ok_or_else(|| WitnessError::MissingLocationField {
            field: "line".into(),
        })?;
    Ok(Location {
        file,
        line: parse_line(line)?,
        column: parse_optional(loc_node.attr("column"))?,
        identifier: loc_node.attr("identifier").unwrap_or("").to_string(),
    })
}

/// A target's primary location tolerates a missing line (warning only); the
/// match then degrades to the secondary location or nothing.
fn read_target_location(
    wp_node: &DocNode,
    diags: &mut Diagnostics,
) -> Result<Location, WitnessError> {
    let Some(loc_node) = wp_node.child("location") else {
        diags.warn(
            "shrike::witness::target_location",
            "can't get target location, the result may not be accurate",
        );
        return Ok(Location::default());
    };
    let line = match loc_node.attr("line") {
        Some(line) => parse_line(line)?,
        None => {
            diags.warn(
                "shrike::witness::target_location",
                "can't get target location, the result may not be accurate",
            );
            0
        }
    };
    Ok(Location {
        file: loc_node.attr("file_name").unwrap_or("").to_string(),
        line,
        column: parse_optional(loc_node.attr("column"))?,
        identifier: loc_node.attr("identifier").unwrap_or("").to_string(),
    })
}

fn read_secondary_location(
    wp_node: &DocNode,
    diags: &mut Diagnostics,
) -> Result<Option<Location>, WitnessError> {
    let Some(loc_node) = wp_node.child("location2") else {
        return Ok(None);
    };
    let Some(line) = loc_node.attr("line") else {
        diags.warn(
            "shrike::witness::target_location",
            "target end location has no line, treating target as a point",
        );
        return Ok(None);
    };
    Ok(Some(Location {
        file: loc_node.attr("file_name").unwrap_or("").to_string(),
        line: parse_line(line)?,
        column: parse_optional(loc_node.attr("column"))?,
        identifier: String::new(),
    }))
}

fn parse_line(value: &str) -> Result<u64, WitnessError> {
    value.trim().parse().map_err(|_| WitnessError::InvalidInteger {
        literal: value.to_string(),
    })
}

fn parse_optional(value: Option<&str>) -> Result<u64, WitnessError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_line(v),
        _ => Ok(0),
    }
}
