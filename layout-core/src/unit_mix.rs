//! Size specifications driving placement: either a weighted distribution
//! over size categories or an explicit per-type unit mix with target counts
//! or areas. The variant is resolved once at the placer's entry point.

use crate::unit_catalog::UnitCatalog;
use crate::LayoutError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One row of an explicit unit mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixEntry {
    /// Catalog template id (S/M/L/XL or custom).
    #[serde(rename = "type")]
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_area: Option<f64>,
    /// Deviation tolerance in percent, overriding the placer default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

/// Explicit per-type targets, used for fulfillment accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMix {
    pub entries: Vec<MixEntry>,
}

impl UnitMix {
    /// Validates entries against a catalog: every referenced template must
    /// exist and carry at least one positive target.
    pub fn validate(&self, catalog: &UnitCatalog) -> Result<(), LayoutError> {
        for entry in &self.entries {
            if catalog.template(&entry.template_id).is_none() {
                return Err(LayoutError::UnknownTemplate(entry.template_id.clone()));
            }
            let has_count = entry.target_count.map(|c| c > 0).unwrap_or(false);
            let has_area = entry.target_area.map(|a| a > 0.0).unwrap_or(false);
            if !has_count && !has_area {
                return Err(LayoutError::UnitMix(format!(
                    "entry '{}' needs a positive target_count or target_area",
                    entry.template_id
                )));
            }
        }
        Ok(())
    }

    /// Reads a mix from CSV with columns
    /// `type,target_count,target_area,tolerance` (count, area and tolerance
    /// cells may be empty).
    pub fn from_csv_reader<R: Read>(
        reader: R,
        catalog: &UnitCatalog,
    ) -> Result<UnitMix, LayoutError> {
        #[derive(Debug, Deserialize)]
        struct CsvRow {
            #[serde(rename = "type")]
            template_id: String,
            #[serde(default)]
            target_count: Option<u32>,
            #[serde(default)]
            target_area: Option<f64>,
            #[serde(default)]
            tolerance: Option<f64>,
        }

        let mut entries = Vec::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for row in csv_reader.deserialize() {
            let row: CsvRow = row?;
            entries.push(MixEntry {
                template_id: row.template_id,
                target_count: row.target_count,
                target_area: row.target_area,
                tolerance: row.tolerance,
            });
        }

        let mix = UnitMix { entries };
        mix.validate(catalog)?;
        Ok(mix)
    }
}

/// Weight for one size category in legacy distribution mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub template_id: String,
    pub weight: f64,
}

/// Polymorphic size specification, resolved once when placement starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizeSpec {
    /// Weighted random draw over categories (legacy mode).
    Distribution { weights: Vec<CategoryWeight> },
    /// Explicit per-type targets (priority mode).
    Mix(UnitMix),
}

impl SizeSpec {
    /// Even weights over the whole catalog.
    pub fn uniform(catalog: &UnitCatalog) -> SizeSpec {
        SizeSpec::Distribution {
            weights: catalog
                .templates
                .iter()
                .map(|t| CategoryWeight {
                    template_id: t.id.clone(),
                    weight: 1.0,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_round_trip() {
        let catalog = UnitCatalog::default();
        let csv = "type,target_count,target_area,tolerance\n\
                   S,10,,\n\
                   M,5,,15.0\n\
                   XL,,40.0,\n";
        let mix = UnitMix::from_csv_reader(csv.as_bytes(), &catalog).unwrap();

        assert_eq!(mix.entries.len(), 3);
        assert_eq!(mix.entries[0].target_count, Some(10));
        assert_eq!(mix.entries[1].tolerance, Some(15.0));
        assert_eq!(mix.entries[2].target_area, Some(40.0));
        assert_eq!(mix.entries[2].target_count, None);
    }

    #[test]
    fn test_csv_unknown_template_rejected() {
        let catalog = UnitCatalog::default();
        let csv = "type,target_count,target_area,tolerance\nXXL,3,,\n";
        let result = UnitMix::from_csv_reader(csv.as_bytes(), &catalog);
        assert!(matches!(result, Err(LayoutError::UnknownTemplate(_))));
    }

    #[test]
    fn test_mix_without_targets_rejected() {
        let catalog = UnitCatalog::default();
        let mix = UnitMix {
            entries: vec![MixEntry {
                template_id: "S".to_string(),
                target_count: None,
                target_area: None,
                tolerance: None,
            }],
        };
        assert!(matches!(
            mix.validate(&catalog),
            Err(LayoutError::UnitMix(_))
        ));
    }

    #[test]
    fn test_size_spec_json_tagging() {
        let spec: SizeSpec = serde_json::from_str(
            r#"{"mode": "mix", "entries": [{"type": "S", "target_count": 4}]}"#,
        )
        .unwrap();
        assert!(matches!(spec, SizeSpec::Mix(_)));

        let spec: SizeSpec = serde_json::from_str(
            r#"{"mode": "distribution", "weights": [{"template_id": "M", "weight": 0.4}]}"#,
        )
        .unwrap();
        assert!(matches!(spec, SizeSpec::Distribution { .. }));
    }
}
