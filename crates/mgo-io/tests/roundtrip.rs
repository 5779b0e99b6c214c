use mgo_algo::OptimizerConfig;
use mgo_core::{MgoError, Point};
use mgo_io::{load_scenario, write_geojson, ExportOptions, Scenario};
use std::fs;
use tempfile::TempDir;

const VILLAGE: &str = r#"{
    "generator": { "x": 0.0, "y": 0.0 },
    "buildings": [
        { "x": 25.0, "y": 0.0, "area_m2": 80.0, "id": "clinic" },
        { "x": 50.0, "y": 5.0, "area_m2": 60.0, "id": "school" },
        { "x": 0.0, "y": 30.0, "area_m2": 45.0 },
        { "x": -10.0, "y": -10.0, "area_m2": 6.0, "id": "shed" },
        { "x": 900.0, "y": 900.0, "area_m2": 40.0, "id": "farm" }
    ],
    "max_reach_m": 500.0,
    "min_area_m2": 10.0,
    "economics": {
        "demand_kwh_per_person_month": 10.0,
        "tariff_per_kwh": 1.0,
        "gen_cost_per_kw": 100.0,
        "wire_cost_per_m": 1.0,
        "connection_cost": 10.0,
        "target_coverage": -1
    }
}"#;

#[test]
fn scenario_file_plans_and_exports() {
    let dir = TempDir::new().unwrap();
    let scenario_path = dir.path().join("village.json");
    fs::write(&scenario_path, VILLAGE).unwrap();

    let scenario = load_scenario(&scenario_path).unwrap();
    assert_eq!(scenario.buildings.len(), 5);
    assert_eq!(scenario.economics.target_coverage, None);
    assert_eq!(scenario.economics.years, 20);

    let planned = scenario.plan(&OptimizerConfig::default()).unwrap();
    let stats = &planned.import.diagnostics.stats;
    assert_eq!(stats.filtered_buildings, 1);
    assert_eq!(stats.segments, 4);
    assert_eq!(
        planned.import.labels,
        vec![
            None,
            Some("clinic".to_string()),
            Some("school".to_string()),
            None,
            Some("farm".to_string()),
        ]
    );

    // The farm lies beyond reach; everything else pays its way.
    assert_eq!(planned.run.report.connected, 3);
    assert!(!planned.import.network.nodes[4].connected);

    let out = dir.path().join("village.geojson");
    let options = ExportOptions::default().with_labels(planned.import.labels.clone());
    write_geojson(&out, &planned.import.network, &options).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let features = json["features"].as_array().unwrap();
    let lines = features
        .iter()
        .filter(|f| f["geometry"]["type"] == "LineString")
        .count();
    let points: Vec<_> = features
        .iter()
        .filter(|f| f["geometry"]["type"] == "Point")
        .collect();
    assert_eq!(lines, 3);
    assert_eq!(points.len(), 3);
    assert!(points.iter().any(|p| p["properties"]["id"] == "clinic"));
    assert!(points.iter().all(|p| p["properties"]["id"] != "farm"));
}

#[test]
fn unwritable_export_path_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let network = Scenario::new(Point::new(0.0, 0.0), 100.0)
        .prepare()
        .unwrap()
        .network;
    let path = dir.path().join("missing-dir").join("out.geojson");
    let err = write_geojson(&path, &network, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err.downcast_ref::<MgoError>(), Some(MgoError::Io(_))));
}

#[test]
fn scenario_round_trips_through_json() {
    let scenario = Scenario::new(Point::new(5.0, 5.0), 250.0)
        .with_building(15.0, 5.0, 30.0)
        .with_min_area(2.0);
    let text = serde_json::to_string(&scenario).unwrap();
    let parsed: Scenario = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, scenario);
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_scenario(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
    assert!(matches!(err.downcast_ref::<MgoError>(), Some(MgoError::Io(_))));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "generator": { "x": 0.0 } "#).unwrap();
    let err = load_scenario(&path).unwrap_err();
    assert!(err.to_string().contains("parsing scenario file"));
    assert!(matches!(err.downcast_ref::<MgoError>(), Some(MgoError::Parse(_))));
}

#[test]
fn cyclic_segments_surface_structure_error() {
    let scenario = Scenario::new(Point::new(0.0, 0.0), 1_000.0)
        .with_building(10.0, 0.0, 20.0)
        .with_building(0.0, 10.0, 20.0)
        .with_segments(vec![
            mgo_core::Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            mgo_core::Segment::new(Point::new(10.0, 0.0), Point::new(0.0, 10.0)),
            mgo_core::Segment::new(Point::new(0.0, 10.0), Point::new(0.0, 0.0)),
        ]);

    let err = scenario.prepare().unwrap_err();
    let engine = err.downcast_ref::<MgoError>().unwrap();
    assert!(engine.is_structural());
}
