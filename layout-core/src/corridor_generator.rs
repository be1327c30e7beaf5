//! Corridor network synthesis. Three interchangeable strategies share one
//! output contract: flat rectangles with explicit corner polygons, never
//! overlapping a placed unit.

use crate::config::CorridorConfig;
use crate::geometry;
use crate::ilot_placer::Ilot;
use crate::{Bounds, FloorPlan, Point, Rect};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorKind {
    Horizontal,
    Vertical,
    Spine,
    Rib,
    Perimeter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorStrategy {
    /// Corridors in the gaps between adjacent units of a row or column.
    #[default]
    RowGap,
    /// Row/column corridors plus perimeter corridors along clear floor edges.
    Advanced,
    /// One primary spine with perpendicular ribs.
    SpineAndRib,
}

/// Rectangular circulation path. The polygon holds the four corners for
/// downstream rendering; adjacent segments are never merged into polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: String,
    pub kind: CorridorKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub polygon: Vec<Point>,
    pub area: f64,
}

impl Corridor {
    fn from_rect(id: String, kind: CorridorKind, rect: Rect) -> Self {
        Corridor {
            id,
            kind,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            polygon: rect.corners().to_vec(),
            area: rect.area(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Walkable width: the narrow side when both extents are present,
    /// otherwise derived from the first two corner points.
    pub fn effective_width(&self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            return self.width.min(self.height);
        }
        if self.polygon.len() >= 2 {
            return self.polygon[0].distance_to(&self.polygon[1]);
        }
        0.0
    }

    /// Corridor length along its long axis.
    pub fn length(&self) -> f64 {
        self.width.max(self.height)
    }
}

pub struct CorridorGenerator {
    config: CorridorConfig,
}

impl CorridorGenerator {
    pub fn new(config: CorridorConfig) -> Self {
        CorridorGenerator { config }
    }

    pub fn with_defaults() -> Self {
        CorridorGenerator::new(CorridorConfig::default())
    }

    /// Synthesizes the corridor network for the configured strategy.
    pub fn generate(&self, ilots: &[Ilot], plan: &FloorPlan) -> Vec<Corridor> {
        let mut rects: Vec<(CorridorKind, Rect)> = Vec::new();

        match self.config.strategy {
            CorridorStrategy::RowGap => {
                self.row_gap_rects(ilots, &mut rects);
            }
            CorridorStrategy::Advanced => {
                self.row_gap_rects(ilots, &mut rects);
                self.perimeter_rects(ilots, &plan.bounds, &mut rects);
            }
            CorridorStrategy::SpineAndRib => {
                self.spine_and_rib_rects(ilots, plan, &mut rects);
            }
        }

        let corridors: Vec<Corridor> = rects
            .into_iter()
            .filter(|(_, rect)| {
                // The contract: a corridor never overlaps a placed unit.
                !ilots.iter().any(|ilot| ilot.rect().overlaps(rect))
            })
            .enumerate()
            .map(|(i, (kind, rect))| {
                Corridor::from_rect(format!("corridor_{:02}", i), kind, rect)
            })
            .collect();

        debug!(
            "generated {} corridors ({:?} strategy)",
            corridors.len(),
            self.config.strategy
        );
        corridors
    }

    /// Gap corridors between adjacent units in each row, and transposed for
    /// each column.
    fn row_gap_rects(&self, ilots: &[Ilot], out: &mut Vec<(CorridorKind, Rect)>) {
        let clear = self.config.margin + self.config.corridor_width;

        // Rows: bucket by y, scan left to right, vertical corridors in gaps
        for bucket in group_by(ilots, self.config.row_tolerance, |i| i.y) {
            let mut row = bucket;
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
            for pair in row.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let gap = b.x - (a.x + a.width);
                if gap <= clear {
                    continue;
                }
                let min_y = a.y.min(b.y);
                let max_y = (a.y + a.height).max(b.y + b.height);
                let rect = Rect::new(
                    b.x - self.config.margin - self.config.corridor_width,
                    min_y,
                    self.config.corridor_width,
                    max_y - min_y,
                );
                if rect.height >= self.config.min_length {
                    out.push((CorridorKind::Vertical, rect));
                }
            }
        }

        // Columns: the same logic transposed
        for bucket in group_by(ilots, self.config.row_tolerance, |i| i.x) {
            let mut column = bucket;
            column.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));
            for pair in column.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let gap = b.y - (a.y + a.height);
                if gap <= clear {
                    continue;
                }
                let min_x = a.x.min(b.x);
                let max_x = (a.x + a.width).max(b.x + b.width);
                let rect = Rect::new(
                    min_x,
                    b.y - self.config.margin - self.config.corridor_width,
                    max_x - min_x,
                    self.config.corridor_width,
                );
                if rect.width >= self.config.min_length {
                    out.push((CorridorKind::Horizontal, rect));
                }
            }
        }
    }

    /// Perimeter corridors along floor edges that no unit encroaches on.
    fn perimeter_rects(
        &self,
        ilots: &[Ilot],
        bounds: &Bounds,
        out: &mut Vec<(CorridorKind, Rect)>,
    ) {
        let margin = self.config.margin;
        let width = self.config.corridor_width;
        let clear = margin + width + self.config.perimeter_clearance;

        let edge_clear = |band: Bounds| !ilots.iter().any(|i| i.rect().bounds().overlaps(&band));

        let long = bounds.height() - 2.0 * margin;
        let span = bounds.width() - 2.0 * margin;
        if long >= self.config.min_length {
            // Left edge
            if edge_clear(Bounds::new(
                bounds.min_x,
                bounds.min_y,
                bounds.min_x + clear,
                bounds.max_y,
            )) {
                out.push((
                    CorridorKind::Perimeter,
                    Rect::new(bounds.min_x + margin, bounds.min_y + margin, width, long),
                ));
            }
            // Right edge
            if edge_clear(Bounds::new(
                bounds.max_x - clear,
                bounds.min_y,
                bounds.max_x,
                bounds.max_y,
            )) {
                out.push((
                    CorridorKind::Perimeter,
                    Rect::new(
                        bounds.max_x - margin - width,
                        bounds.min_y + margin,
                        width,
                        long,
                    ),
                ));
            }
        }
        if span >= self.config.min_length {
            // Top edge
            if edge_clear(Bounds::new(
                bounds.min_x,
                bounds.min_y,
                bounds.max_x,
                bounds.min_y + clear,
            )) {
                out.push((
                    CorridorKind::Perimeter,
                    Rect::new(bounds.min_x + margin, bounds.min_y + margin, span, width),
                ));
            }
            // Bottom edge
            if edge_clear(Bounds::new(
                bounds.min_x,
                bounds.max_y - clear,
                bounds.max_x,
                bounds.max_y,
            )) {
                out.push((
                    CorridorKind::Perimeter,
                    Rect::new(
                        bounds.min_x + margin,
                        bounds.max_y - margin - width,
                        span,
                        width,
                    ),
                ));
            }
        }
    }

    /// One primary spine (between the first two entrances when available,
    /// otherwise centered on the longer floor axis) with perpendicular ribs
    /// at evenly spaced stations.
    fn spine_and_rib_rects(
        &self,
        ilots: &[Ilot],
        plan: &FloorPlan,
        out: &mut Vec<(CorridorKind, Rect)>,
    ) {
        let bounds = &plan.bounds;
        let buffer = self.config.wall_buffer;

        let (horizontal, cross_pos) = if plan.entrances.len() >= 2 {
            let a = plan.entrances[0].center();
            let b = plan.entrances[1].center();
            // The spine is axis-aligned along the dominant direction between
            // the two entrances.
            if (b.x - a.x).abs() >= (b.y - a.y).abs() {
                (true, (a.y + b.y) / 2.0)
            } else {
                (false, (a.x + b.x) / 2.0)
            }
        } else if bounds.width() >= bounds.height() {
            (true, bounds.center().y)
        } else {
            (false, bounds.center().x)
        };

        let spine = if horizontal {
            Rect::new(
                bounds.min_x + buffer,
                cross_pos - self.config.spine_width / 2.0,
                bounds.width() - 2.0 * buffer,
                self.config.spine_width,
            )
        } else {
            Rect::new(
                cross_pos - self.config.spine_width / 2.0,
                bounds.min_y + buffer,
                self.config.spine_width,
                bounds.height() - 2.0 * buffer,
            )
        };

        let Some(spine) = self.nudge_spine(spine, horizontal, ilots, plan) else {
            warn!("no collision-free spine position found, skipping corridor network");
            return;
        };
        out.push((CorridorKind::Spine, spine));

        let spine_length = if horizontal { spine.width } else { spine.height };
        let stations = (spine_length / self.config.max_rib_spacing).floor() as usize + 1;

        for i in 0..stations {
            let t = (i as f64 + 0.5) / stations as f64;
            if horizontal {
                let station_x = spine.x + spine_length * t - self.config.rib_width / 2.0;
                let up = Rect::new(
                    station_x,
                    bounds.min_y + buffer,
                    self.config.rib_width,
                    spine.y - (bounds.min_y + buffer),
                );
                let down = Rect::new(
                    station_x,
                    spine.y + spine.height,
                    self.config.rib_width,
                    (bounds.max_y - buffer) - (spine.y + spine.height),
                );
                self.push_rib(up, ilots, plan, out);
                self.push_rib(down, ilots, plan, out);
            } else {
                let station_y = spine.y + spine_length * t - self.config.rib_width / 2.0;
                let left = Rect::new(
                    bounds.min_x + buffer,
                    station_y,
                    spine.x - (bounds.min_x + buffer),
                    self.config.rib_width,
                );
                let right = Rect::new(
                    spine.x + spine.width,
                    station_y,
                    (bounds.max_x - buffer) - (spine.x + spine.width),
                    self.config.rib_width,
                );
                self.push_rib(left, ilots, plan, out);
                self.push_rib(right, ilots, plan, out);
            }
        }
    }

    /// Shifts the spine off walls and units with bounded 1 m alternating
    /// steps. Returns None when every candidate position collides.
    fn nudge_spine(
        &self,
        spine: Rect,
        horizontal: bool,
        ilots: &[Ilot],
        plan: &FloorPlan,
    ) -> Option<Rect> {
        let collides = |rect: &Rect| {
            plan.walls
                .iter()
                .any(|wall| geometry::segment_intersects_rect(wall, rect))
                || ilots.iter().any(|ilot| ilot.rect().overlaps(rect))
        };

        if !collides(&spine) {
            return Some(spine);
        }

        for attempt in 1..=self.config.max_spine_nudges {
            let step = 1.0 * attempt.div_ceil(2) as f64;
            let offset = if attempt % 2 == 1 { step } else { -step };
            let candidate = if horizontal {
                Rect::new(spine.x, spine.y + offset, spine.width, spine.height)
            } else {
                Rect::new(spine.x + offset, spine.y, spine.width, spine.height)
            };
            if !collides(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Keeps a rib only when it is long enough and stays clear of forbidden
    /// zones and placed units.
    fn push_rib(
        &self,
        rib: Rect,
        ilots: &[Ilot],
        plan: &FloorPlan,
        out: &mut Vec<(CorridorKind, Rect)>,
    ) {
        if rib.width <= 0.0 || rib.height <= 0.0 {
            return;
        }
        if rib.width.max(rib.height) < self.config.min_length {
            return;
        }
        let rib_bounds = rib.bounds();
        let hits_forbidden = plan.forbidden_zones.iter().any(|zone| {
            zone.effective_bounds()
                .map(|b| b.overlaps(&rib_bounds))
                .unwrap_or(false)
        });
        if hits_forbidden {
            return;
        }
        if ilots.iter().any(|ilot| ilot.rect().overlaps(&rib)) {
            return;
        }
        out.push((CorridorKind::Rib, rib));
    }
}

/// Buckets items by a coordinate rounded to the tolerance. Buckets come back
/// ordered by coordinate so output ids are stable.
fn group_by<'a, F>(ilots: &'a [Ilot], tolerance: f64, coord: F) -> Vec<Vec<&'a Ilot>>
where
    F: Fn(&Ilot) -> f64,
{
    let tolerance = tolerance.max(f64::EPSILON);
    let mut buckets: HashMap<OrderedFloat<f64>, Vec<&Ilot>> = HashMap::new();
    for ilot in ilots {
        let key = OrderedFloat((coord(ilot) / tolerance).round());
        buckets.entry(key).or_default().push(ilot);
    }
    let mut keys: Vec<OrderedFloat<f64>> = buckets.keys().copied().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| buckets.remove(&k).unwrap_or_default())
        .collect()
}
