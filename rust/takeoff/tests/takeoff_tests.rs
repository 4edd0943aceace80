// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end take-off scenarios: drawn segments in, property totals out.

use approx::assert_relative_eq;
use roof_lite_geometry::{
    extract_faces, segments_from_ring, Coordinate, CoordinateFrame, FaceExtractorConfig,
    LineSegment,
};
use roof_lite_takeoff::units::{sq_feet_to_sq_meters, SQ_FEET_PER_SQ_METER};
use roof_lite_takeoff::{
    AggregatorConfig, Error, FoldKind, PitchRatio, StructureAggregator,
};

fn planar_aggregator() -> StructureAggregator {
    StructureAggregator::new(AggregatorConfig {
        frame: CoordinateFrame::Planar,
        ..Default::default()
    })
    .unwrap()
}

/// Axis-aligned square of `sq_ft` plan area, offset along x.
fn square_of_sq_ft(sq_ft: f64, x0: f64) -> Vec<Coordinate> {
    let side = sq_feet_to_sq_meters(sq_ft).sqrt();
    vec![
        Coordinate::new(x0, 0.0),
        Coordinate::new(x0 + side, 0.0),
        Coordinate::new(x0 + side, side),
        Coordinate::new(x0, side),
    ]
}

#[test]
fn excluded_structure_drops_out_of_totals() {
    let mut agg = planar_aggregator();
    agg.add_or_replace_structure("A", square_of_sq_ft(800.0, 0.0), PitchRatio::FLAT, 1.0)
        .unwrap();
    agg.add_or_replace_structure("B", square_of_sq_ft(200.0, 100.0), PitchRatio::FLAT, 1.0)
        .unwrap();

    let both = agg.totals(None);
    assert_relative_eq!(both.plan_area_sq_ft, 1000.0, epsilon = 1e-6);

    agg.set_inclusion("B", false).unwrap();
    let totals = agg.totals(None);
    assert_relative_eq!(totals.plan_area_sq_ft, 800.0, epsilon = 1e-6);
    assert_relative_eq!(totals.plan_squares, 8.0, epsilon = 1e-8);
    assert_eq!(totals.included_structures, 1);
    assert_eq!(totals.excluded_structures, 1);
    assert!(totals.surface_area_sq_ft < both.surface_area_sq_ft);

    // Geometry survives exclusion
    assert_relative_eq!(agg.get("B").unwrap().plan_area_sq_ft, 200.0, epsilon = 1e-6);
}

#[test]
fn totals_equal_sum_of_included_structures() {
    let mut agg = planar_aggregator();
    let pitches = ["4/12", "6/12", "9/12", "12/12"];
    for (i, pitch) in pitches.iter().enumerate() {
        let label = agg.next_label();
        let ring = square_of_sq_ft(150.0 * (i + 1) as f64, 200.0 * i as f64);
        agg.add_or_replace_structure(&label, ring, pitch.parse().unwrap(), 0.9)
            .unwrap();
    }
    agg.set_inclusion("C", false).unwrap();

    let totals = agg.totals(None);
    let included: Vec<_> = agg.structures().filter(|s| s.included).collect();
    let plan: f64 = included.iter().map(|s| s.plan_area_sq_ft).sum();
    let surface: f64 = included.iter().map(|s| s.surface_area_sq_ft).sum();
    let perimeter: f64 = included.iter().map(|s| s.perimeter_ft()).sum();

    assert_relative_eq!(totals.plan_area_sq_ft, plan, epsilon = 1e-9);
    assert_relative_eq!(totals.surface_area_sq_ft, surface, epsilon = 1e-9);
    assert_relative_eq!(totals.perimeter_ft, perimeter, epsilon = 1e-9);
    assert_relative_eq!(totals.surface_squares, surface / 100.0, epsilon = 1e-9);
    assert_eq!(totals.structures.len(), 4);
}

#[test]
fn thousand_square_feet_at_six_twelve() {
    let mut agg = planar_aggregator();
    agg.add_or_replace_structure(
        "A",
        square_of_sq_ft(1000.0, 0.0),
        PitchRatio::per_12(6.0).unwrap(),
        1.0,
    )
    .unwrap();

    let totals = agg.totals(None);
    assert_relative_eq!(totals.surface_area_sq_ft, 1118.034, epsilon = 1e-3);
    assert_relative_eq!(totals.surface_squares, 11.18034, epsilon = 1e-5);
}

#[test]
fn extracted_faces_become_structures() {
    // Hip roof: 20 x 10 outline, ridge from (5,5) to (15,5), four hips
    let p = |x: f64, y: f64| Coordinate::new(x, y);
    let lines = [
        (p(0.0, 0.0), p(20.0, 0.0)),
        (p(20.0, 0.0), p(20.0, 10.0)),
        (p(20.0, 10.0), p(0.0, 10.0)),
        (p(0.0, 10.0), p(0.0, 0.0)),
        (p(5.0, 5.0), p(15.0, 5.0)),
        (p(0.0, 0.0), p(5.0, 5.0)),
        (p(0.0, 10.0), p(5.0, 5.0)),
        (p(20.0, 0.0), p(15.0, 5.0)),
        (p(20.0, 10.0), p(15.0, 5.0)),
    ];
    let segments: Vec<LineSegment> = lines
        .iter()
        .enumerate()
        .map(|(i, (a, b))| LineSegment::straight(format!("s{}", i), *a, *b))
        .collect();

    let faces = extract_faces(&segments, &FaceExtractorConfig::planar());
    assert_eq!(faces.len(), 4);

    let mut agg = planar_aggregator();
    let pitch = PitchRatio::per_12(6.0).unwrap();
    for face in &faces {
        let label = agg.next_label();
        agg.accept_polygon(&label, face, pitch, 0.95).unwrap();
    }
    agg.add_ridge_line(vec![p(5.0, 5.0), p(15.0, 5.0)], Some("ridge".into()), FoldKind::Ridge)
        .unwrap();

    let labels: Vec<_> = agg.structures().map(|s| s.label.clone()).collect();
    assert_eq!(labels, ["A", "B", "C", "D"]);
    assert_relative_eq!(agg.get("A").unwrap().area_sq_m, 75.0, epsilon = 1e-9);

    let totals = agg.totals(None);
    assert_relative_eq!(totals.plan_area_sq_ft, 200.0 * SQ_FEET_PER_SQ_METER, epsilon = 1e-6);
    assert_relative_eq!(
        totals.surface_area_sq_ft,
        totals.plan_area_sq_ft * pitch.multiplier(),
        epsilon = 1e-6
    );
    assert!(totals.linear_ft.ridge > 0.0);
}

#[test]
fn snapshot_survives_json_roundtrip() {
    let mut agg = planar_aggregator();
    let ring = square_of_sq_ft(500.0, 0.0);
    let faces = extract_faces(
        &segments_from_ring(&ring, "edge"),
        &FaceExtractorConfig::planar(),
    );
    agg.accept_polygon("A", &faces[0], PitchRatio::per_12(8.0).unwrap(), 0.7)
        .unwrap();

    let restored = StructureAggregator::from_json(&agg.to_json().unwrap()).unwrap();
    assert_eq!(restored.totals(None), agg.totals(None));
}

#[test]
fn geodesic_structure_matches_local_area() {
    // ~12 m square near 40°N
    let lat0: f64 = 40.0;
    let dlat = 12.0 / 111_195.08;
    let dlon = dlat / lat0.to_radians().cos();
    let ring = vec![
        Coordinate::new(-75.0, lat0),
        Coordinate::new(-75.0 + dlon, lat0),
        Coordinate::new(-75.0 + dlon, lat0 + dlat),
        Coordinate::new(-75.0, lat0 + dlat),
    ];

    let mut agg = StructureAggregator::default();
    agg.add_or_replace_structure("A", ring, PitchRatio::FLAT, 1.0).unwrap();
    let a = agg.get("A").unwrap();
    assert_relative_eq!(a.area_sq_m, 144.0, max_relative = 5e-3);
    assert_relative_eq!(a.perimeter_m, 48.0, max_relative = 5e-3);
}

#[test]
fn invalid_input_is_rejected_with_typed_errors() {
    let mut agg = planar_aggregator();
    let ring = square_of_sq_ft(100.0, 0.0);

    assert!(matches!(
        agg.add_or_replace_structure("  ", ring.clone(), PitchRatio::FLAT, 1.0),
        Err(Error::EmptyLabel)
    ));
    assert!(matches!(
        agg.add_or_replace_structure("A", ring, PitchRatio::FLAT, -0.1),
        Err(Error::InvalidConfidence(_))
    ));
    assert!(matches!("13/0".parse::<PitchRatio>(), Err(Error::InvalidPitch(..))));
    assert_eq!(agg.structure_count(), 0);
}
