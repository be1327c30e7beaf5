//! First-pass metrics over an imported floor plan, computed before any
//! placement work so reports can show how much space was there to begin
//! with.

use crate::FloorPlan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanMetrics {
    pub total_floor_area: f64,
    pub room_area: f64,
    pub available_space: f64,
    pub room_count: usize,
    /// Share of the floor covered by rooms, 0 when the floor has no extent.
    pub space_efficiency: f64,
}

/// Computes floor metrics. Rooms without usable geometry are skipped;
/// everything else degrades to zero rather than failing.
pub fn analyze(plan: &FloorPlan) -> FloorPlanMetrics {
    let total_floor_area = plan.bounds.area().max(0.0);

    let mut room_area = 0.0;
    let mut room_count = 0;
    for room in &plan.rooms {
        let area = room.effective_area();
        if area <= 0.0 {
            continue;
        }
        room_area += area;
        room_count += 1;
    }

    FloorPlanMetrics {
        total_floor_area,
        room_area,
        available_space: total_floor_area - room_area,
        room_count,
        space_efficiency: if total_floor_area > 0.0 {
            room_area / total_floor_area
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, Point, Room};

    #[test]
    fn test_metrics_for_empty_plan() {
        let plan = FloorPlan::empty(Bounds::new(0.0, 0.0, 60.0, 40.0));
        let metrics = analyze(&plan);
        assert_eq!(metrics.total_floor_area, 2400.0);
        assert_eq!(metrics.room_count, 0);
        assert_eq!(metrics.available_space, 2400.0);
        assert_eq!(metrics.space_efficiency, 0.0);
    }

    #[test]
    fn test_metrics_with_rooms() {
        let mut plan = FloorPlan::empty(Bounds::new(0.0, 0.0, 20.0, 20.0));
        plan.rooms.push(Room {
            id: "R01".to_string(),
            polygon: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            area: None,
            bounds: None,
        });
        plan.rooms.push(Room {
            id: "R02".to_string(),
            polygon: Vec::new(),
            area: Some(50.0),
            bounds: None,
        });
        // No geometry at all: skipped
        plan.rooms.push(Room {
            id: "R03".to_string(),
            polygon: Vec::new(),
            area: None,
            bounds: None,
        });

        let metrics = analyze(&plan);
        assert_eq!(metrics.room_count, 2);
        assert!((metrics.room_area - 150.0).abs() < 1e-9);
        assert!((metrics.available_space - 250.0).abs() < 1e-9);
        assert!((metrics.space_efficiency - 0.375).abs() < 1e-9);
    }
}
