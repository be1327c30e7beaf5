//! Semantic classification of CAD layer names. The import collaborator
//! hands over raw layers; this module decides which geometry feeds which
//! part of the floor plan. Pure string-to-enum mapping, no file parsing.

use crate::{Bounds, Entrance, FloorPlan, ForbiddenZone, Line};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Walls,
    Obstacles,
    Forbidden,
    Exits,
    Corridors,
    Boxes,
    Unknown,
}

struct LayerPatterns {
    walls: Regex,
    obstacles: Regex,
    forbidden: Regex,
    exits: Regex,
    corridors: Regex,
    boxes: Regex,
}

fn patterns() -> &'static LayerPatterns {
    static PATTERNS: OnceLock<LayerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LayerPatterns {
        walls: Regex::new(r"(?i)\b(mur|wall|cloison)\b").unwrap(),
        obstacles: Regex::new(
            r"(?i)\b(poteau|column|colonne|stair|escalier|radiateur|radiator)\b",
        )
        .unwrap(),
        forbidden: Regex::new(r"(?i)\b(forbidden|zone[_ ]*interdite|restricted)\b").unwrap(),
        exits: Regex::new(r"(?i)\b(issue|exit|sortie)\b").unwrap(),
        corridors: Regex::new(r"(?i)\b(couloir|circulation|chemin)\b").unwrap(),
        boxes: Regex::new(r"(?i)\b(box|lot|unit)\b").unwrap(),
    })
}

/// Maps a layer name to its semantic category. Unknown or empty names land
/// in `Unknown` so callers can route them to a neutral display layer.
pub fn classify(layer_name: &str) -> LayerCategory {
    if layer_name.is_empty() {
        return LayerCategory::Unknown;
    }
    let patterns = patterns();
    if patterns.walls.is_match(layer_name) {
        LayerCategory::Walls
    } else if patterns.obstacles.is_match(layer_name) {
        LayerCategory::Obstacles
    } else if patterns.forbidden.is_match(layer_name) {
        LayerCategory::Forbidden
    } else if patterns.exits.is_match(layer_name) {
        LayerCategory::Exits
    } else if patterns.corridors.is_match(layer_name) {
        LayerCategory::Corridors
    } else if patterns.boxes.is_match(layer_name) {
        LayerCategory::Boxes
    } else {
        LayerCategory::Unknown
    }
}

/// Builds a floor plan from a raw layer dump: wall layers become wall
/// segments, exit layers become entrances, obstacle and forbidden layers
/// become forbidden boxes around their geometry. Corridor, box and unknown
/// layers carry no placement constraints and are ignored here.
pub fn assemble_floor_plan(bounds: Bounds, layers: &[(String, Vec<Line>)]) -> FloorPlan {
    let mut plan = FloorPlan::empty(bounds);

    for (name, lines) in layers {
        match classify(name) {
            LayerCategory::Walls => plan.walls.extend(lines.iter().cloned()),
            LayerCategory::Exits => {
                plan.entrances.extend(lines.iter().map(|line| Entrance {
                    start: line.start,
                    end: line.end,
                }));
            }
            LayerCategory::Forbidden | LayerCategory::Obstacles => {
                let points: Vec<_> = lines
                    .iter()
                    .flat_map(|line| [line.start, line.end])
                    .collect();
                if let Some(zone_bounds) = Bounds::of_points(&points) {
                    plan.forbidden_zones
                        .push(ForbiddenZone::from_bounds(zone_bounds));
                }
            }
            LayerCategory::Corridors | LayerCategory::Boxes | LayerCategory::Unknown => {}
        }
    }

    plan
}
