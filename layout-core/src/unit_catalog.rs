//! Static registry of storage-unit size templates. Catalog data is never
//! mutated at runtime; callers either take the built-in default or inject
//! their own catalog with the same shape.

use serde::{Deserialize, Serialize};

/// One width x depth candidate for a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitDimensions {
    pub width: f64,
    pub depth: f64,
}

impl UnitDimensions {
    pub fn new(width: f64, depth: f64) -> Self {
        UnitDimensions { width, depth }
    }

    pub fn area(&self) -> f64 {
        self.width * self.depth
    }
}

/// Size-class template: area band, candidate footprints, door width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: String,
    pub min_area: f64,
    pub max_area: f64,
    pub dimensions: Vec<UnitDimensions>,
    pub door_width: f64,
}

impl UnitTemplate {
    pub fn mean_area(&self) -> f64 {
        (self.min_area + self.max_area) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCatalog {
    pub templates: Vec<UnitTemplate>,
}

impl UnitCatalog {
    pub fn template(&self, id: &str) -> Option<&UnitTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for UnitCatalog {
    /// Four size classes covering the 0-20 m2 storage range.
    fn default() -> Self {
        UnitCatalog {
            templates: vec![
                UnitTemplate {
                    id: "S".to_string(),
                    min_area: 0.0,
                    max_area: 2.0,
                    dimensions: vec![
                        UnitDimensions::new(1.0, 1.0),
                        UnitDimensions::new(1.0, 1.5),
                        UnitDimensions::new(1.0, 2.0),
                    ],
                    door_width: 0.9,
                },
                UnitTemplate {
                    id: "M".to_string(),
                    min_area: 2.0,
                    max_area: 5.0,
                    dimensions: vec![
                        UnitDimensions::new(1.5, 2.0),
                        UnitDimensions::new(2.0, 2.0),
                        UnitDimensions::new(1.5, 3.0),
                        UnitDimensions::new(2.0, 2.5),
                    ],
                    door_width: 0.9,
                },
                UnitTemplate {
                    id: "L".to_string(),
                    min_area: 5.0,
                    max_area: 10.0,
                    dimensions: vec![
                        UnitDimensions::new(2.0, 3.0),
                        UnitDimensions::new(2.5, 3.0),
                        UnitDimensions::new(2.0, 4.0),
                        UnitDimensions::new(2.5, 4.0),
                    ],
                    door_width: 1.2,
                },
                UnitTemplate {
                    id: "XL".to_string(),
                    min_area: 10.0,
                    max_area: 20.0,
                    dimensions: vec![
                        UnitDimensions::new(3.0, 4.0),
                        UnitDimensions::new(3.0, 5.0),
                        UnitDimensions::new(4.0, 4.0),
                        UnitDimensions::new(4.0, 5.0),
                    ],
                    door_width: 1.2,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_bands() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.len(), 4);
        let ids: Vec<&str> = catalog.templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["S", "M", "L", "XL"]);

        // Bands tile 0-20 m2 without gaps
        for pair in catalog.templates.windows(2) {
            assert_eq!(pair[0].max_area, pair[1].min_area);
        }
    }

    #[test]
    fn test_candidate_dimensions_fit_band() {
        let catalog = UnitCatalog::default();
        for template in &catalog.templates {
            for dims in &template.dimensions {
                let area = dims.area();
                assert!(
                    area >= template.min_area && area <= template.max_area,
                    "{}: {}x{} = {} m2 outside band",
                    template.id,
                    dims.width,
                    dims.depth,
                    area
                );
            }
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = UnitCatalog::default();
        assert!(catalog.template("L").is_some());
        assert!(catalog.template("XXL").is_none());
    }
}
