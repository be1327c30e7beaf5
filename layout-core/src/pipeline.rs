//! End-to-end pipeline: plan analysis, zone detection, unit placement,
//! corridor synthesis, compliance check. Each stage is also usable on its
//! own; this wrapper just wires them in order and bundles the outputs.

use crate::compliance::{ComplianceChecker, ComplianceReport, Solution};
use crate::config::LayoutConfig;
use crate::corridor_generator::{Corridor, CorridorGenerator};
use crate::ilot_placer::{DeviationReport, Ilot, IlotPlacer};
use crate::plan_analysis::{analyze, FloorPlanMetrics};
use crate::unit_catalog::UnitCatalog;
use crate::unit_mix::SizeSpec;
use crate::zone_detector::{detect_zones, Zone};
use crate::{FloorPlan, LayoutError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything one pipeline run produces, ready for export collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSolution {
    pub metrics: FloorPlanMetrics,
    pub zones: Vec<Zone>,
    pub ilots: Vec<Ilot>,
    pub corridors: Vec<Corridor>,
    pub deviation_report: DeviationReport,
    pub compliance_report: ComplianceReport,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    catalog: UnitCatalog,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, catalog: UnitCatalog) -> Self {
        LayoutEngine { config, catalog }
    }

    pub fn with_defaults() -> Self {
        LayoutEngine::new(LayoutConfig::default(), UnitCatalog::default())
    }

    /// Runs the full pipeline. The only error surfaces are invalid bounds
    /// and a mix referencing templates the catalog does not have; shortfalls
    /// and rule violations come back inside the reports.
    pub fn run(
        &self,
        plan: &FloorPlan,
        size_spec: &SizeSpec,
        target_count: u32,
    ) -> Result<LayoutSolution, LayoutError> {
        if let SizeSpec::Mix(mix) = size_spec {
            mix.validate(&self.catalog)?;
        }

        let metrics = analyze(plan);
        let zones = detect_zones(plan, &self.config.grid)?;

        let placer = IlotPlacer::new(self.catalog.clone(), self.config.placer.clone());
        let placement = placer.generate(&zones, plan, size_spec, target_count);

        let corridors =
            CorridorGenerator::new(self.config.corridors.clone()).generate(&placement.ilots, plan);

        let solution = Solution {
            ilots: placement.ilots,
            corridors,
            exits: plan.entrances.iter().map(|e| e.center()).collect(),
            fire_doors: Vec::new(),
            forbidden_zones: plan.forbidden_zones.clone(),
        };
        let compliance_report =
            ComplianceChecker::new(self.config.rules.clone()).check(&solution);

        info!(
            "pipeline complete: {} zones, {} ilots, {} corridors, compliance passed={}",
            zones.len(),
            solution.ilots.len(),
            solution.corridors.len(),
            compliance_report.passed
        );

        Ok(LayoutSolution {
            metrics,
            zones,
            ilots: solution.ilots,
            corridors: solution.corridors,
            deviation_report: placement.report,
            compliance_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_mix::{MixEntry, UnitMix};
    use crate::Bounds;

    #[test]
    fn test_unknown_template_fails_fast() {
        let engine = LayoutEngine::with_defaults();
        let plan = FloorPlan::empty(Bounds::new(0.0, 0.0, 20.0, 20.0));
        let spec = SizeSpec::Mix(UnitMix {
            entries: vec![MixEntry {
                template_id: "NOPE".to_string(),
                target_count: Some(2),
                target_area: None,
                tolerance: None,
            }],
        });
        assert!(matches!(
            engine.run(&plan, &spec, 2),
            Err(LayoutError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_run_produces_all_outputs() {
        let engine = LayoutEngine::with_defaults();
        let plan = FloorPlan::empty(Bounds::new(0.0, 0.0, 40.0, 40.0));
        let spec = SizeSpec::Mix(UnitMix {
            entries: vec![MixEntry {
                template_id: "M".to_string(),
                target_count: Some(6),
                target_area: None,
                tolerance: None,
            }],
        });
        let solution = engine.run(&plan, &spec, 6).unwrap();

        assert_eq!(solution.zones.len(), 1);
        assert_eq!(solution.ilots.len(), 6);
        assert_eq!(solution.deviation_report.summary.total_placed, 6);
        assert_eq!(solution.metrics.total_floor_area, 1600.0);
    }
}
