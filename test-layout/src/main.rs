// Generates sample layouts end-to-end and saves them for downstream viewers
use anyhow::Context;
use layout_core::config::{CorridorConfig, LayoutConfig, PlacerConfig};
use layout_core::corridor_generator::CorridorStrategy;
use layout_core::unit_mix::{MixEntry, UnitMix};
use layout_core::{
    analyze, Bounds, Entrance, FloorPlan, ForbiddenZone, LayoutEngine, Line, Point, SizeSpec,
};
use std::fs;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("🏗️  Storage Layout Test Suite");
    println!("==============================\n");

    fs::create_dir_all("data").context("creating data directory")?;

    println!("📋 Case 1: Small depot, explicit unit mix");
    let depot = create_small_depot();
    run_case("small_depot", &depot, depot_mix(), 18, CorridorStrategy::RowGap)?;

    println!("\n📋 Case 2: Two-bay warehouse, weighted distribution");
    let warehouse = create_two_bay_warehouse();
    run_case(
        "two_bay_warehouse",
        &warehouse,
        warehouse_distribution(),
        40,
        CorridorStrategy::Advanced,
    )?;

    println!("\n📋 Case 3: Open hall, spine and ribs");
    let hall = create_open_hall();
    run_case("open_hall", &hall, depot_mix(), 18, CorridorStrategy::SpineAndRib)?;

    println!("\n✅ All cases generated under data/");
    Ok(())
}

fn run_case(
    name: &str,
    plan: &FloorPlan,
    spec: SizeSpec,
    target: u32,
    strategy: CorridorStrategy,
) -> anyhow::Result<()> {
    let metrics = analyze(plan);
    println!(
        "   📐 Floor: {:.0} m2 total, {} rooms",
        metrics.total_floor_area, metrics.room_count
    );

    let config = LayoutConfig {
        placer: PlacerConfig {
            seed: 42,
            ..PlacerConfig::default()
        },
        corridors: CorridorConfig {
            strategy,
            ..CorridorConfig::default()
        },
        ..LayoutConfig::default()
    };
    let engine = LayoutEngine::new(config, Default::default());
    let solution = engine
        .run(plan, &spec, target)
        .with_context(|| format!("running layout for {}", name))?;

    println!(
        "   🏢 Placed {} ilots ({:.1}% of target), {} corridors",
        solution.ilots.len(),
        solution.deviation_report.summary.overall_compliance,
        solution.corridors.len()
    );
    println!(
        "   🛡️  Compliance: passed={} ({} errors, {} warnings)",
        solution.compliance_report.passed,
        solution.compliance_report.summary.errors,
        solution.compliance_report.summary.warnings
    );

    let filename = format!("data/{}_solution.json", name);
    fs::write(&filename, serde_json::to_string_pretty(&solution)?)?;
    println!("   💾 Saved: {}", filename);
    Ok(())
}

fn depot_mix() -> SizeSpec {
    SizeSpec::Mix(UnitMix {
        entries: vec![
            MixEntry {
                template_id: "S".to_string(),
                target_count: Some(10),
                target_area: None,
                tolerance: None,
            },
            MixEntry {
                template_id: "M".to_string(),
                target_count: Some(6),
                target_area: None,
                tolerance: None,
            },
            MixEntry {
                template_id: "L".to_string(),
                target_count: Some(2),
                target_area: None,
                tolerance: None,
            },
        ],
    })
}

fn warehouse_distribution() -> SizeSpec {
    serde_json::from_str(
        r#"{
            "mode": "distribution",
            "weights": [
                {"template_id": "S", "weight": 0.30},
                {"template_id": "M", "weight": 0.40},
                {"template_id": "L", "weight": 0.25},
                {"template_id": "XL", "weight": 0.05}
            ]
        }"#,
    )
    .expect("static spec parses")
}

/// 25 x 18 m depot with a single entrance and a plant room in one corner.
fn create_small_depot() -> FloorPlan {
    let bounds = Bounds::new(0.0, 0.0, 25.0, 18.0);
    let mut plan = FloorPlan::empty(bounds);
    plan.walls = perimeter_walls(&bounds);
    plan.forbidden_zones = vec![ForbiddenZone::from_bounds(Bounds::new(
        21.0, 14.0, 25.0, 18.0,
    ))];
    plan.entrances = vec![Entrance {
        start: Point::new(0.0, 8.0),
        end: Point::new(0.0, 10.0),
    }];
    plan
}

/// 60 x 40 m warehouse split into two bays by a partition with a doorway.
fn create_two_bay_warehouse() -> FloorPlan {
    let bounds = Bounds::new(0.0, 0.0, 60.0, 40.0);
    let mut plan = FloorPlan::empty(bounds);
    plan.walls = perimeter_walls(&bounds);
    plan.walls.push(Line::new(Point::new(30.0, 0.0), Point::new(30.0, 16.0)));
    plan.walls.push(Line::new(Point::new(30.0, 24.0), Point::new(30.0, 40.0)));
    plan.forbidden_zones = vec![ForbiddenZone::from_bounds(Bounds::new(
        50.0, 0.0, 56.0, 6.0,
    ))];
    plan.entrances = vec![
        Entrance {
            start: Point::new(0.0, 18.0),
            end: Point::new(0.0, 22.0),
        },
        Entrance {
            start: Point::new(60.0, 18.0),
            end: Point::new(60.0, 22.0),
        },
    ];
    plan
}

/// 50 x 30 m hall with opposing entrances and no internal structure.
fn create_open_hall() -> FloorPlan {
    let bounds = Bounds::new(0.0, 0.0, 50.0, 30.0);
    let mut plan = FloorPlan::empty(bounds);
    plan.walls = perimeter_walls(&bounds);
    plan.entrances = vec![
        Entrance {
            start: Point::new(0.0, 13.0),
            end: Point::new(0.0, 17.0),
        },
        Entrance {
            start: Point::new(50.0, 13.0),
            end: Point::new(50.0, 17.0),
        },
    ];
    plan
}

fn perimeter_walls(bounds: &Bounds) -> Vec<Line> {
    vec![
        Line::new(
            Point::new(bounds.min_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.min_y),
        ),
        Line::new(
            Point::new(bounds.max_x, bounds.min_y),
            Point::new(bounds.max_x, bounds.max_y),
        ),
        Line::new(
            Point::new(bounds.max_x, bounds.max_y),
            Point::new(bounds.min_x, bounds.max_y),
        ),
        Line::new(
            Point::new(bounds.min_x, bounds.max_y),
            Point::new(bounds.min_x, bounds.min_y),
        ),
    ]
}
