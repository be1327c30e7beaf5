//! Rule-based validation of a finished layout. Checks run in a fixed order
//! and append violations; nothing here throws, and checking the same
//! solution twice yields the same report.

use crate::config::ComplianceRules;
use crate::corridor_generator::{Corridor, CorridorKind};
use crate::geometry;
use crate::ilot_placer::Ilot;
use crate::{ForbiddenZone, Point};
use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CorridorWidth,
    DeadEnd,
    ExitAccess,
    ForbiddenZone,
    FireDoorClearance,
    ExitDistance,
    BoxConstraint,
}

impl ViolationKind {
    fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::CorridorWidth => "corridor_width",
            ViolationKind::DeadEnd => "dead_end",
            ViolationKind::ExitAccess => "exit_access",
            ViolationKind::ForbiddenZone => "forbidden_zone",
            ViolationKind::FireDoorClearance => "fire_door_clearance",
            ViolationKind::ExitDistance => "exit_distance",
            ViolationKind::BoxConstraint => "box_constraint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub message: String,
    /// Id of the unit or corridor the violation refers to.
    pub element: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub by_kind: BTreeMap<String, usize>,
    pub errors: usize,
    pub warnings: usize,
}

/// Produced fresh for every `check` call; never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub summary: ComplianceSummary,
}

/// A completed layout plus the life-safety context it is judged against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub ilots: Vec<Ilot>,
    pub corridors: Vec<Corridor>,
    #[serde(default)]
    pub exits: Vec<Point>,
    #[serde(default)]
    pub fire_doors: Vec<Point>,
    #[serde(default)]
    pub forbidden_zones: Vec<ForbiddenZone>,
}

pub struct ComplianceChecker {
    rules: ComplianceRules,
}

impl ComplianceChecker {
    pub fn new(rules: ComplianceRules) -> Self {
        ComplianceChecker { rules }
    }

    pub fn with_defaults() -> Self {
        ComplianceChecker::new(ComplianceRules::default())
    }

    pub fn check(&self, solution: &Solution) -> ComplianceReport {
        let mut violations = Vec::new();

        self.check_circulation(solution, &mut violations);
        self.check_exit_access(solution, &mut violations);
        self.check_forbidden_zones(solution, &mut violations);
        self.check_fire_door_clearance(solution, &mut violations);
        self.check_exit_distance(solution, &mut violations);
        self.check_box_constraints(solution, &mut violations);

        let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut errors = 0;
        let mut warnings = 0;
        for violation in &violations {
            *by_kind
                .entry(violation.kind.as_str().to_string())
                .or_insert(0) += 1;
            match violation.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
        }

        let report = ComplianceReport {
            passed: violations.is_empty(),
            violations,
            summary: ComplianceSummary {
                by_kind,
                errors,
                warnings,
            },
        };
        info!(
            "compliance check: passed={} errors={} warnings={}",
            report.passed, report.summary.errors, report.summary.warnings
        );
        report
    }

    /// Corridor widths against the main/secondary minimums, then dead-end
    /// candidates via the corridor adjacency graph.
    fn check_circulation(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        for corridor in &solution.corridors {
            let minimum = match corridor.kind {
                CorridorKind::Spine | CorridorKind::Perimeter => self.rules.main_corridor_width,
                _ => self.rules.secondary_corridor_width,
            };
            let effective = corridor.effective_width();
            if effective < minimum {
                violations.push(Violation {
                    kind: ViolationKind::CorridorWidth,
                    severity: Severity::Error,
                    message: format!(
                        "corridor width {:.2} m below required {:.2} m",
                        effective, minimum
                    ),
                    element: corridor.id.clone(),
                });
            }
        }

        if solution.corridors.len() < 3 {
            return;
        }

        let mut graph: UnGraph<usize, ()> = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..solution.corridors.len())
            .map(|i| graph.add_node(i))
            .collect();
        for i in 0..solution.corridors.len() {
            for j in (i + 1)..solution.corridors.len() {
                let a = solution.corridors[i]
                    .rect()
                    .bounds()
                    .expanded(self.rules.adjacency_tolerance);
                let b = solution.corridors[j].rect().bounds();
                if a.overlaps(&b) {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        for (i, node) in nodes.iter().enumerate() {
            if graph.neighbors(*node).count() <= 1 {
                violations.push(Violation {
                    kind: ViolationKind::DeadEnd,
                    severity: Severity::Warning,
                    message: "corridor connects to at most one other corridor, possible dead end"
                        .to_string(),
                    element: solution.corridors[i].id.clone(),
                });
            }
        }
    }

    /// Every unit should sit close to the corridor network. Skipped when no
    /// exits are defined for the floor.
    fn check_exit_access(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        if solution.exits.is_empty() || solution.corridors.is_empty() {
            return;
        }
        for ilot in &solution.ilots {
            let center = ilot.center();
            let nearest = solution
                .corridors
                .iter()
                .map(|c| geometry::point_to_polyline_distance(&center, &c.polygon))
                .fold(f64::INFINITY, f64::min);
            if nearest > self.rules.exit_access_distance {
                violations.push(Violation {
                    kind: ViolationKind::ExitAccess,
                    severity: Severity::Warning,
                    message: format!(
                        "unit is {:.1} m from the nearest corridor (limit {:.1} m)",
                        nearest, self.rules.exit_access_distance
                    ),
                    element: ilot.id.clone(),
                });
            }
        }
    }

    fn check_forbidden_zones(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        for ilot in &solution.ilots {
            let rect = ilot.rect();
            let mut probes = rect.corners().to_vec();
            probes.push(rect.center());

            for zone in &solution.forbidden_zones {
                let hit = if zone.polygon.len() >= 3 {
                    probes
                        .iter()
                        .any(|p| geometry::point_in_polygon(p, &zone.polygon))
                } else if let Some(bounds) = zone.effective_bounds() {
                    probes.iter().any(|p| bounds.contains_point(p))
                } else {
                    false
                };
                if hit {
                    violations.push(Violation {
                        kind: ViolationKind::ForbiddenZone,
                        severity: Severity::Error,
                        message: "unit intersects a forbidden zone".to_string(),
                        element: ilot.id.clone(),
                    });
                    break;
                }
            }
        }
    }

    fn check_fire_door_clearance(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        for ilot in &solution.ilots {
            let center = ilot.center();
            for door in &solution.fire_doors {
                let distance = center.distance_to(door);
                if distance < self.rules.fire_door_clearance {
                    violations.push(Violation {
                        kind: ViolationKind::FireDoorClearance,
                        severity: Severity::Error,
                        message: format!(
                            "unit center {:.1} m from a fire door (clearance {:.1} m)",
                            distance, self.rules.fire_door_clearance
                        ),
                        element: ilot.id.clone(),
                    });
                    break;
                }
            }
        }
    }

    fn check_exit_distance(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        if solution.exits.is_empty() {
            return;
        }
        for ilot in &solution.ilots {
            let center = ilot.center();
            let nearest = solution
                .exits
                .iter()
                .map(|e| center.distance_to(e))
                .fold(f64::INFINITY, f64::min);
            if nearest > self.rules.max_exit_distance {
                violations.push(Violation {
                    kind: ViolationKind::ExitDistance,
                    severity: Severity::Warning,
                    message: format!(
                        "unit is {:.1} m from the nearest exit (limit {:.1} m)",
                        nearest, self.rules.max_exit_distance
                    ),
                    element: ilot.id.clone(),
                });
            }
        }
    }

    fn check_box_constraints(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        for ilot in &solution.ilots {
            if ilot.width < self.rules.min_unit_dimension
                || ilot.height < self.rules.min_unit_dimension
                || ilot.area < self.rules.min_unit_area
            {
                violations.push(Violation {
                    kind: ViolationKind::BoxConstraint,
                    severity: Severity::Error,
                    message: format!(
                        "unit {:.2} x {:.2} m below the minimum footprint",
                        ilot.width, ilot.height
                    ),
                    element: ilot.id.clone(),
                });
            }
        }
    }
}
