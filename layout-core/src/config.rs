//! Configuration surface for the pipeline. Every knob has a default so a
//! caller can deserialize `{}` and get a working setup.

use crate::corridor_generator::CorridorStrategy;
use serde::{Deserialize, Serialize};

/// Occupancy-grid and zone-detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell size in metres.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Cells within this radius of a rasterized wall are blocked.
    #[serde(default = "default_wall_buffer")]
    pub wall_buffer: f64,
    /// Expansion applied around forbidden-zone boxes.
    #[serde(default = "default_forbidden_buffer")]
    pub forbidden_buffer: f64,
    /// Clearance kept free in front of entrances.
    #[serde(default = "default_entrance_clearance")]
    pub entrance_clearance: f64,
    /// Connected components below this area are dropped.
    #[serde(default = "default_min_zone_area")]
    pub min_zone_area: f64,
}

fn default_resolution() -> f64 {
    0.5
}

fn default_wall_buffer() -> f64 {
    0.3
}

fn default_forbidden_buffer() -> f64 {
    2.0
}

fn default_entrance_clearance() -> f64 {
    3.0
}

fn default_min_zone_area() -> f64 {
    20.0
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            resolution: default_resolution(),
            wall_buffer: default_wall_buffer(),
            forbidden_buffer: default_forbidden_buffer(),
            entrance_clearance: default_entrance_clearance(),
            min_zone_area: default_min_zone_area(),
        }
    }
}

/// Row-scan placement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// Inset from zone edges before the first unit.
    #[serde(default = "default_wall_margin")]
    pub wall_margin: f64,
    /// Spacing reserved between placed units and between rows.
    #[serde(default = "default_corridor_width")]
    pub corridor_width: f64,
    /// Entrance boxes expanded by this much reject candidate units.
    #[serde(default = "default_placement_entrance_clearance")]
    pub entrance_clearance: f64,
    /// Horizontal nudge after a rejected candidate.
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,
    /// Consecutive rejections allowed per zone before giving up.
    #[serde(default = "default_max_attempts_zone")]
    pub max_attempts_zone: u32,
    /// Attempt budget when placing over the full floor bounds.
    #[serde(default = "default_max_attempts_full")]
    pub max_attempts_full: u32,
    /// Per-template deviation tolerance, percent of target.
    #[serde(default = "default_tolerance_percent")]
    pub tolerance_percent: f64,
    /// Seed for the placement RNG; the same seed replays the same layout.
    #[serde(default)]
    pub seed: u64,
}

fn default_wall_margin() -> f64 {
    0.5
}

fn default_corridor_width() -> f64 {
    1.2
}

fn default_placement_entrance_clearance() -> f64 {
    1.5
}

fn default_nudge_step() -> f64 {
    0.5
}

fn default_max_attempts_zone() -> u32 {
    500
}

fn default_max_attempts_full() -> u32 {
    1000
}

fn default_tolerance_percent() -> f64 {
    10.0
}

impl Default for PlacerConfig {
    fn default() -> Self {
        PlacerConfig {
            wall_margin: default_wall_margin(),
            corridor_width: default_corridor_width(),
            entrance_clearance: default_placement_entrance_clearance(),
            nudge_step: default_nudge_step(),
            max_attempts_zone: default_max_attempts_zone(),
            max_attempts_full: default_max_attempts_full(),
            tolerance_percent: default_tolerance_percent(),
            seed: 0,
        }
    }
}

/// Corridor synthesis parameters shared by all strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorridorConfig {
    #[serde(default)]
    pub strategy: CorridorStrategy,
    #[serde(default = "default_corridor_width")]
    pub corridor_width: f64,
    #[serde(default = "default_wall_margin")]
    pub margin: f64,
    /// Units whose y (or x) coordinates round to the same bucket share a row
    /// (or column).
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance: f64,
    /// Corridors shorter than this are discarded.
    #[serde(default = "default_min_corridor_length")]
    pub min_length: f64,
    /// Extra clearance required before a perimeter corridor is emitted.
    #[serde(default = "default_perimeter_clearance")]
    pub perimeter_clearance: f64,
    #[serde(default = "default_spine_width")]
    pub spine_width: f64,
    #[serde(default = "default_rib_width")]
    pub rib_width: f64,
    /// Maximum spacing between rib stations along the spine.
    #[serde(default = "default_max_rib_spacing")]
    pub max_rib_spacing: f64,
    /// Ribs stop this far short of the floor boundary.
    #[serde(default = "default_wall_buffer")]
    pub wall_buffer: f64,
    /// Bounded retries when nudging the spine off collisions.
    #[serde(default = "default_max_spine_nudges")]
    pub max_spine_nudges: u32,
}

fn default_row_tolerance() -> f64 {
    2.0
}

fn default_min_corridor_length() -> f64 {
    2.0
}

fn default_perimeter_clearance() -> f64 {
    0.5
}

fn default_spine_width() -> f64 {
    2.0
}

fn default_rib_width() -> f64 {
    1.2
}

fn default_max_rib_spacing() -> f64 {
    8.0
}

fn default_max_spine_nudges() -> u32 {
    10
}

impl Default for CorridorConfig {
    fn default() -> Self {
        CorridorConfig {
            strategy: CorridorStrategy::default(),
            corridor_width: default_corridor_width(),
            margin: default_wall_margin(),
            row_tolerance: default_row_tolerance(),
            min_length: default_min_corridor_length(),
            perimeter_clearance: default_perimeter_clearance(),
            spine_width: default_spine_width(),
            rib_width: default_rib_width(),
            max_rib_spacing: default_max_rib_spacing(),
            wall_buffer: default_wall_buffer(),
            max_spine_nudges: default_max_spine_nudges(),
        }
    }
}

/// Thresholds for the compliance checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRules {
    #[serde(default = "default_main_corridor_width")]
    pub main_corridor_width: f64,
    #[serde(default = "default_secondary_corridor_width")]
    pub secondary_corridor_width: f64,
    /// Bounding boxes within this distance count as connected corridors.
    #[serde(default = "default_adjacency_tolerance")]
    pub adjacency_tolerance: f64,
    /// Every unit center should be this close to a corridor polyline.
    #[serde(default = "default_exit_access_distance")]
    pub exit_access_distance: f64,
    #[serde(default = "default_fire_door_clearance")]
    pub fire_door_clearance: f64,
    #[serde(default = "default_max_exit_distance")]
    pub max_exit_distance: f64,
    #[serde(default = "default_min_unit_dimension")]
    pub min_unit_dimension: f64,
    #[serde(default = "default_min_unit_area")]
    pub min_unit_area: f64,
}

fn default_main_corridor_width() -> f64 {
    1.5
}

fn default_secondary_corridor_width() -> f64 {
    1.2
}

fn default_adjacency_tolerance() -> f64 {
    0.5
}

fn default_exit_access_distance() -> f64 {
    5.0
}

fn default_fire_door_clearance() -> f64 {
    1.5
}

fn default_max_exit_distance() -> f64 {
    30.0
}

fn default_min_unit_dimension() -> f64 {
    0.5
}

fn default_min_unit_area() -> f64 {
    0.5
}

impl Default for ComplianceRules {
    fn default() -> Self {
        ComplianceRules {
            main_corridor_width: default_main_corridor_width(),
            secondary_corridor_width: default_secondary_corridor_width(),
            adjacency_tolerance: default_adjacency_tolerance(),
            exit_access_distance: default_exit_access_distance(),
            fire_door_clearance: default_fire_door_clearance(),
            max_exit_distance: default_max_exit_distance(),
            min_unit_dimension: default_min_unit_dimension(),
            min_unit_area: default_min_unit_area(),
        }
    }
}

/// Everything in one place for callers that drive the whole pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub placer: PlacerConfig,
    #[serde(default)]
    pub corridors: CorridorConfig,
    #[serde(default)]
    pub rules: ComplianceRules,
}
