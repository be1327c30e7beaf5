//! Catalog-driven constrained placement of storage units. Row-scan greedy
//! packing over each detected zone (or the full floor bounds when no zones
//! exist), with per-template fulfillment accounting folded into a deviation
//! report at the end of the run.

use crate::config::PlacerConfig;
use crate::geometry;
use crate::unit_catalog::{UnitCatalog, UnitTemplate};
use crate::unit_mix::SizeSpec;
use crate::zone_detector::Zone;
use crate::{Bounds, FloorPlan, Point, Rect};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cap on stored termination reasons; later reasons are dropped, the report
/// stays readable.
const MAX_REASONS: usize = 20;

/// A placed storage unit. Once placed it never overlaps another unit, a
/// forbidden zone or an entrance clearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ilot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub row: u32,
}

impl Ilot {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

/// Per-template counters accumulated while placing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Fulfillment {
    pub target: u32,
    pub placed: u32,
    pub area_target: f64,
    pub area_placed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MixStatus {
    Fulfilled,
    Shortfall,
}

/// Requested-vs-achieved comparison for one size category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationEntry {
    pub category: String,
    pub target: u32,
    pub placed: u32,
    pub deviation: i64,
    pub deviation_percent: f64,
    pub within_tolerance: bool,
    pub status: MixStatus,
    pub area_target: f64,
    pub area_placed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationSummary {
    pub total_target: u32,
    pub total_placed: u32,
    /// `total_placed / total_target`, in percent.
    pub overall_compliance: f64,
}

/// Structured output of a placement run, consumed by reporting collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationReport {
    pub summary: DeviationSummary,
    pub deviations: Vec<DeviationEntry>,
    pub reasons: Vec<String>,
    pub space_exhausted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementResult {
    pub ilots: Vec<Ilot>,
    pub report: DeviationReport,
}

/// Resolved per-template slot, in catalog order.
struct TargetSlot {
    template: UnitTemplate,
    target: u32,
    tolerance_percent: f64,
    weight: f64,
    fulfillment: Fulfillment,
}

enum Mode {
    Priority,
    Weighted,
}

pub struct IlotPlacer {
    catalog: UnitCatalog,
    config: PlacerConfig,
}

impl IlotPlacer {
    pub fn new(catalog: UnitCatalog, config: PlacerConfig) -> Self {
        IlotPlacer { catalog, config }
    }

    pub fn with_defaults() -> Self {
        IlotPlacer::new(UnitCatalog::default(), PlacerConfig::default())
    }

    /// Places units in the given zones, or over the full floor bounds when
    /// the zone list is empty. Infeasible targets never fail: placement
    /// degrades to partial fulfillment and the report says why.
    pub fn generate(
        &self,
        zones: &[Zone],
        plan: &FloorPlan,
        size_spec: &SizeSpec,
        target_count: u32,
    ) -> PlacementResult {
        let (mut slots, mode) = self.resolve_targets(size_spec, target_count);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut ilots: Vec<Ilot> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();
        let mut exhausted_anywhere = false;

        if zones.is_empty() {
            debug!("no zones available, placing over full floor bounds");
            let exhausted = self.place_in_area(
                plan.bounds,
                None,
                plan,
                &mut slots,
                &mode,
                target_count,
                self.config.max_attempts_full,
                &mut rng,
                &mut ilots,
                &mut reasons,
            );
            exhausted_anywhere |= exhausted;
        } else {
            for zone in zones {
                if run_complete(&slots, &mode, target_count, ilots.len() as u32) {
                    break;
                }
                if zone.bounds.is_degenerate() || !zone.bounds.is_finite() {
                    push_reason(
                        &mut reasons,
                        format!("{}: malformed bounds, zone skipped", zone.id),
                    );
                    continue;
                }
                let exhausted = self.place_in_area(
                    zone.bounds,
                    Some(zone),
                    plan,
                    &mut slots,
                    &mode,
                    target_count,
                    self.config.max_attempts_zone,
                    &mut rng,
                    &mut ilots,
                    &mut reasons,
                );
                exhausted_anywhere |= exhausted;
            }
        }

        let report = build_report(&slots, &mode, target_count, &ilots, reasons, exhausted_anywhere);
        info!(
            "placed {} ilots, overall compliance {:.1}%",
            ilots.len(),
            report.summary.overall_compliance
        );
        PlacementResult { ilots, report }
    }

    /// Resolves the polymorphic size spec once, up front, into catalog-order
    /// slots. Priority mode carries explicit targets; distribution mode
    /// derives soft targets from the weights for reporting.
    fn resolve_targets(&self, spec: &SizeSpec, target_count: u32) -> (Vec<TargetSlot>, Mode) {
        match spec {
            SizeSpec::Mix(mix) => {
                let slots = self
                    .catalog
                    .templates
                    .iter()
                    .map(|template| {
                        let entry = mix.entries.iter().find(|e| e.template_id == template.id);
                        let target = entry
                            .map(|e| match (e.target_count, e.target_area) {
                                (Some(count), _) => count,
                                (None, Some(area)) => {
                                    (area / template.mean_area()).ceil() as u32
                                }
                                (None, None) => 0,
                            })
                            .unwrap_or(0);
                        let area_target = entry
                            .and_then(|e| e.target_area)
                            .unwrap_or(target as f64 * template.mean_area());
                        TargetSlot {
                            template: template.clone(),
                            target,
                            tolerance_percent: entry
                                .and_then(|e| e.tolerance)
                                .unwrap_or(self.config.tolerance_percent),
                            weight: 0.0,
                            fulfillment: Fulfillment {
                                target,
                                area_target,
                                ..Fulfillment::default()
                            },
                        }
                    })
                    .collect();
                (slots, Mode::Priority)
            }
            SizeSpec::Distribution { weights } => {
                let total_weight: f64 = weights.iter().map(|w| w.weight.max(0.0)).sum();
                let slots = self
                    .catalog
                    .templates
                    .iter()
                    .map(|template| {
                        let weight = weights
                            .iter()
                            .find(|w| w.template_id == template.id)
                            .map(|w| w.weight.max(0.0))
                            .unwrap_or(0.0);
                        let share = if total_weight > 0.0 {
                            weight / total_weight
                        } else {
                            0.0
                        };
                        let target = (share * target_count as f64).round() as u32;
                        TargetSlot {
                            template: template.clone(),
                            target,
                            tolerance_percent: self.config.tolerance_percent,
                            weight,
                            fulfillment: Fulfillment {
                                target,
                                area_target: target as f64 * template.mean_area(),
                                ..Fulfillment::default()
                            },
                        }
                    })
                    .collect();
                (slots, Mode::Weighted)
            }
        }
    }

    /// Row-scan over one area. Returns true when the area was exhausted
    /// (boundary reached or attempt budget burned) before targets were met.
    #[allow(clippy::too_many_arguments)]
    fn place_in_area(
        &self,
        bounds: Bounds,
        zone: Option<&Zone>,
        plan: &FloorPlan,
        slots: &mut [TargetSlot],
        mode: &Mode,
        target_count: u32,
        max_attempts: u32,
        rng: &mut ChaCha8Rng,
        ilots: &mut Vec<Ilot>,
        reasons: &mut Vec<String>,
    ) -> bool {
        let margin = self.config.wall_margin;
        let corridor = self.config.corridor_width;
        let area_label = zone.map(|z| z.id.as_str()).unwrap_or("full_bounds");

        if bounds.width() <= 2.0 * margin || bounds.height() <= 2.0 * margin {
            push_reason(
                reasons,
                format!("{}: area smaller than wall margins", area_label),
            );
            return true;
        }

        let mut placed_rects: Vec<Rect> = Vec::new();
        let mut x = bounds.min_x + margin;
        let mut y = bounds.min_y + margin;
        let mut row_max_height = 0.0f64;
        let mut row_index: u32 = 0;
        let mut attempts: u32 = 0;
        let placed_at_entry = ilots.len() as u32;

        loop {
            if run_complete(slots, mode, target_count, ilots.len() as u32) {
                return false;
            }

            let Some(slot_index) = select_template(slots, mode, rng) else {
                // Nothing left to draw from (all weights zero)
                push_reason(reasons, format!("{}: no selectable template", area_label));
                return false;
            };
            let dims = {
                let dims_list = &slots[slot_index].template.dimensions;
                dims_list[rng.gen_range(0..dims_list.len())]
            };

            // Horizontal overflow wraps to a new row without consuming an
            // attempt. A candidate still too wide at the row start counts as
            // a rejection so the attempt budget bounds the loop.
            if x + dims.width > bounds.max_x - margin {
                x = bounds.min_x + margin;
                y += row_max_height + corridor;
                row_max_height = 0.0;
                row_index += 1;
                if x + dims.width > bounds.max_x - margin {
                    attempts += 1;
                    if attempts >= max_attempts {
                        push_reason(
                            reasons,
                            format!("{}: no template fits the row width", area_label),
                        );
                        return true;
                    }
                    continue;
                }
            }

            if y + dims.depth > bounds.max_y - margin {
                push_reason(
                    reasons,
                    format!(
                        "{}: space exhausted after {} ilots",
                        area_label,
                        ilots.len() as u32 - placed_at_entry
                    ),
                );
                return true;
            }

            let candidate = Rect::new(x, y, dims.width, dims.depth);
            if let Some(why) = self.rejection(&candidate, zone, plan, &placed_rects) {
                x += self.config.nudge_step;
                attempts += 1;
                if attempts >= max_attempts {
                    push_reason(
                        reasons,
                        format!(
                            "{}: gave up after {} consecutive rejections (last: {})",
                            area_label, max_attempts, why
                        ),
                    );
                    return true;
                }
                continue;
            }

            let slot = &mut slots[slot_index];
            slot.fulfillment.placed += 1;
            slot.fulfillment.area_placed += candidate.area();
            ilots.push(Ilot {
                id: format!("ilot_{:03}", ilots.len()),
                x: candidate.x,
                y: candidate.y,
                width: candidate.width,
                height: candidate.height,
                area: candidate.area(),
                category: slot.template.id.clone(),
                zone_id: zone.map(|z| z.id.clone()),
                row: row_index,
            });
            placed_rects.push(candidate);
            row_max_height = row_max_height.max(dims.depth);
            x += dims.width + corridor;
            attempts = 0;
        }
    }

    /// Returns why a candidate must be skipped, or None when it can be
    /// placed.
    fn rejection(
        &self,
        candidate: &Rect,
        zone: Option<&Zone>,
        plan: &FloorPlan,
        placed: &[Rect],
    ) -> Option<&'static str> {
        if let Some(zone) = zone {
            if zone.polygon.len() >= 3
                && !geometry::point_in_polygon(&candidate.center(), &zone.polygon)
            {
                return Some("outside zone polygon");
            }
        }

        let candidate_bounds = candidate.bounds();
        for forbidden in &plan.forbidden_zones {
            if let Some(bounds) = forbidden.effective_bounds() {
                if candidate_bounds.overlaps(&bounds) {
                    return Some("forbidden zone");
                }
            }
        }

        for entrance in &plan.entrances {
            let clearance = entrance.bounds().expanded(self.config.entrance_clearance);
            if candidate_bounds.overlaps(&clearance) {
                return Some("entrance clearance");
            }
        }

        if placed.iter().any(|r| r.overlaps(candidate)) {
            return Some("overlaps placed unit");
        }

        None
    }
}

/// True when this run has nothing left to place.
fn run_complete(slots: &[TargetSlot], mode: &Mode, target_count: u32, placed: u32) -> bool {
    match mode {
        Mode::Priority => slots.iter().all(|s| s.fulfillment.placed >= s.target),
        Mode::Weighted => placed >= target_count,
    }
}

/// Priority mode picks the first template with an unmet target, in catalog
/// order; weighted mode draws from the distribution.
fn select_template(slots: &[TargetSlot], mode: &Mode, rng: &mut ChaCha8Rng) -> Option<usize> {
    match mode {
        Mode::Priority => slots
            .iter()
            .position(|s| s.fulfillment.placed < s.target),
        Mode::Weighted => {
            let total: f64 = slots.iter().map(|s| s.weight).sum();
            if total <= 0.0 {
                return None;
            }
            let mut draw = rng.gen::<f64>() * total;
            for (i, slot) in slots.iter().enumerate() {
                draw -= slot.weight;
                if draw <= 0.0 {
                    return Some(i);
                }
            }
            Some(slots.len() - 1)
        }
    }
}

fn push_reason(reasons: &mut Vec<String>, reason: String) {
    if reasons.len() < MAX_REASONS {
        reasons.push(reason);
    }
}

fn build_report(
    slots: &[TargetSlot],
    mode: &Mode,
    target_count: u32,
    ilots: &[Ilot],
    reasons: Vec<String>,
    exhausted_anywhere: bool,
) -> DeviationReport {
    let mut deviations = Vec::new();
    let mut total_target: u32 = 0;
    let mut total_placed: u32 = 0;

    for slot in slots {
        total_target += slot.target;
        total_placed += slot.fulfillment.placed;
        if slot.target == 0 {
            continue;
        }
        let deviation = slot.fulfillment.placed as i64 - slot.target as i64;
        let deviation_percent = deviation as f64 / slot.target as f64 * 100.0;
        deviations.push(DeviationEntry {
            category: slot.template.id.clone(),
            target: slot.target,
            placed: slot.fulfillment.placed,
            deviation,
            deviation_percent,
            within_tolerance: deviation_percent.abs() <= slot.tolerance_percent,
            status: if deviation >= 0 {
                MixStatus::Fulfilled
            } else {
                MixStatus::Shortfall
            },
            area_target: slot.fulfillment.area_target,
            area_placed: slot.fulfillment.area_placed,
        });
    }

    let overall_compliance = if total_target > 0 {
        total_placed as f64 / total_target as f64 * 100.0
    } else {
        100.0
    };

    let unmet = match mode {
        Mode::Priority => total_placed < total_target,
        Mode::Weighted => (ilots.len() as u32) < target_count,
    };

    DeviationReport {
        summary: DeviationSummary {
            total_target,
            total_placed,
            overall_compliance,
        },
        deviations,
        reasons,
        space_exhausted: exhausted_anywhere && unmet,
    }
}
