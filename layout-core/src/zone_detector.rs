//! Usable-zone detection: rasterize the floor plan into an occupancy grid,
//! then extract connected open regions large enough to place units in.

use crate::config::GridConfig;
use crate::occupancy_grid::{CellState, OccupancyGrid};
use crate::{Bounds, FloorPlan, LayoutError, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Open, placeable region of the floor plan. The polygon is the region's
/// bounding rectangle; the raw cell list is retained for placement
/// heuristics that need finer-grained occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub polygon: Vec<Point>,
    pub bounds: Bounds,
    pub area: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<(usize, usize)>,
}

/// Detects usable zones in a floor plan.
///
/// Missing geometry collections are treated as empty; degenerate bounds
/// yield an empty result so the placer can fall back to full-bounds
/// placement. Only non-finite bounds are rejected outright.
pub fn detect_zones(plan: &FloorPlan, config: &GridConfig) -> Result<Vec<Zone>, LayoutError> {
    if !plan.bounds.is_finite() {
        return Err(LayoutError::InvalidBounds(format!(
            "non-finite bounds {:?}",
            plan.bounds
        )));
    }
    if plan.bounds.is_degenerate() {
        debug!("degenerate floor bounds, no zones detected");
        return Ok(Vec::new());
    }

    let mut grid = OccupancyGrid::new(&plan.bounds, config.resolution);

    for wall in &plan.walls {
        if !wall.start.is_finite() || !wall.end.is_finite() {
            debug!("skipping wall with non-finite endpoint");
            continue;
        }
        grid.mark_wall(wall, config.wall_buffer);
    }

    for zone in &plan.forbidden_zones {
        match zone.effective_bounds() {
            Some(bounds) => grid.mark_box(&bounds, config.forbidden_buffer, CellState::Forbidden),
            None => debug!("skipping forbidden zone without geometry"),
        }
    }

    for entrance in &plan.entrances {
        grid.mark_box(
            &entrance.bounds(),
            config.entrance_clearance,
            CellState::EntranceClearance,
        );
    }

    let zones = extract_zones(&grid, config.min_zone_area);
    info!(
        "detected {} zones covering {:.1} m2",
        zones.len(),
        zones.iter().map(|z| z.area).sum::<f64>()
    );
    Ok(zones)
}

/// Connected-component extraction over open cells, 4-connected, iterative
/// stack-based so grid size never threatens the call stack.
fn extract_zones(grid: &OccupancyGrid, min_area: f64) -> Vec<Zone> {
    let mut visited = vec![false; grid.cols * grid.rows];
    let mut components: Vec<Vec<(usize, usize)>> = Vec::new();

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let idx = row * grid.cols + col;
            if visited[idx] || grid.get(col, row) != CellState::Open {
                continue;
            }
            let component = flood_fill(grid, col, row, &mut visited);
            let area = component.len() as f64 * grid.cell_area();
            if area >= min_area {
                components.push(component);
            }
        }
    }

    // Largest first; the stable sort keeps discovery order on ties
    components.sort_by(|a, b| b.len().cmp(&a.len()));

    components
        .into_iter()
        .enumerate()
        .map(|(i, cells)| zone_from_cells(grid, i, cells))
        .collect()
}

fn flood_fill(
    grid: &OccupancyGrid,
    start_col: usize,
    start_row: usize,
    visited: &mut [bool],
) -> Vec<(usize, usize)> {
    let mut stack = vec![(start_col, start_row)];
    let mut cells = Vec::new();
    visited[start_row * grid.cols + start_col] = true;

    while let Some((col, row)) = stack.pop() {
        cells.push((col, row));

        let neighbors = [
            (col as i64 - 1, row as i64),
            (col as i64 + 1, row as i64),
            (col as i64, row as i64 - 1),
            (col as i64, row as i64 + 1),
        ];
        for (ncol, nrow) in neighbors {
            if ncol < 0 || nrow < 0 || ncol >= grid.cols as i64 || nrow >= grid.rows as i64 {
                continue;
            }
            let (ncol, nrow) = (ncol as usize, nrow as usize);
            let nidx = nrow * grid.cols + ncol;
            if !visited[nidx] && grid.get(ncol, nrow) == CellState::Open {
                visited[nidx] = true;
                stack.push((ncol, nrow));
            }
        }
    }

    cells
}

fn zone_from_cells(grid: &OccupancyGrid, index: usize, cells: Vec<(usize, usize)>) -> Zone {
    let mut min_col = usize::MAX;
    let mut min_row = usize::MAX;
    let mut max_col = 0usize;
    let mut max_row = 0usize;
    for (col, row) in &cells {
        min_col = min_col.min(*col);
        min_row = min_row.min(*row);
        max_col = max_col.max(*col);
        max_row = max_row.max(*row);
    }

    let bounds = Bounds::new(
        grid.origin.x + min_col as f64 * grid.resolution,
        grid.origin.y + min_row as f64 * grid.resolution,
        grid.origin.x + (max_col + 1) as f64 * grid.resolution,
        grid.origin.y + (max_row + 1) as f64 * grid.resolution,
    );

    Zone {
        id: format!("zone_{:02}", index),
        polygon: vec![
            Point::new(bounds.min_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.max_y),
            Point::new(bounds.min_x, bounds.max_y),
        ],
        bounds,
        area: cells.len() as f64 * grid.cell_area(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entrance, ForbiddenZone, Line};

    fn empty_plan(width: f64, height: f64) -> FloorPlan {
        FloorPlan::empty(Bounds::new(0.0, 0.0, width, height))
    }

    #[test]
    fn test_empty_floor_is_one_zone() {
        let plan = empty_plan(10.0, 10.0);
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();

        assert_eq!(zones.len(), 1);
        assert!((zones[0].area - 100.0).abs() < 1e-9);
        assert_eq!(zones[0].cells.len(), 400);
        assert_eq!(zones[0].bounds, Bounds::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_dividing_wall_splits_zones() {
        let mut plan = empty_plan(40.0, 40.0);
        plan.walls.push(Line::new(
            Point::new(20.0, 0.0),
            Point::new(20.0, 40.0),
        ));
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();

        assert_eq!(zones.len(), 2);
        // Sorted by area descending
        assert!(zones[0].area >= zones[1].area);
        assert!(zones[0].id.starts_with("zone_"));
    }

    #[test]
    fn test_degenerate_bounds_yield_no_zones() {
        let plan = FloorPlan::empty(Bounds::new(5.0, 5.0, 5.0, 10.0));
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();
        assert!(zones.is_empty());
    }

    #[test]
    fn test_non_finite_bounds_are_rejected() {
        let plan = FloorPlan::empty(Bounds::new(0.0, 0.0, f64::NAN, 10.0));
        assert!(detect_zones(&plan, &GridConfig::default()).is_err());
    }

    #[test]
    fn test_forbidden_zone_carves_out_area() {
        let mut plan = empty_plan(30.0, 30.0);
        plan.forbidden_zones.push(ForbiddenZone::from_bounds(Bounds::new(
            10.0, 10.0, 20.0, 20.0,
        )));
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();

        let total: f64 = zones.iter().map(|z| z.area).sum();
        // 10x10 box expanded by the 2 m buffer removes at least 14x14
        assert!(total <= 900.0 - 196.0 + 1e-9);
    }

    #[test]
    fn test_entrance_clearance_is_blocked() {
        let mut plan = empty_plan(20.0, 20.0);
        plan.entrances.push(Entrance {
            start: Point::new(0.0, 9.0),
            end: Point::new(0.0, 11.0),
        });
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();

        let total: f64 = zones.iter().map(|z| z.area).sum();
        assert!(total < 400.0);
    }

    #[test]
    fn test_min_area_threshold_is_monotonic() {
        let mut plan = empty_plan(40.0, 40.0);
        plan.walls.push(Line::new(
            Point::new(6.0, 0.0),
            Point::new(6.0, 40.0),
        ));
        plan.walls.push(Line::new(
            Point::new(0.0, 6.0),
            Point::new(40.0, 6.0),
        ));

        let mut previous = 0usize;
        for min_zone_area in [200.0, 50.0, 20.0, 5.0] {
            let config = GridConfig {
                min_zone_area,
                ..GridConfig::default()
            };
            let count = detect_zones(&plan, &config).unwrap().len();
            assert!(
                count >= previous,
                "zone count decreased when threshold shrank"
            );
            previous = count;
        }
    }

    #[test]
    fn test_missing_optional_inputs_default_to_empty() {
        let plan: FloorPlan = serde_json::from_str(
            r#"{"bounds": {"min_x": 0.0, "min_y": 0.0, "max_x": 10.0, "max_y": 10.0}}"#,
        )
        .unwrap();
        let zones = detect_zones(&plan, &GridConfig::default()).unwrap();
        assert_eq!(zones.len(), 1);
    }
}
