// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One property: input file format, processing, and report.

use anyhow::{Context, Result};
use roof_lite_geometry::{extract_faces, Coordinate, CoordinateFrame, DetectedPolygon, LineSegment};
use roof_lite_takeoff::{FoldKind, PitchRatio, PropertyMeasurementTotals, StructureAggregator};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Property input file
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub property_id: String,
    pub segments: Vec<LineSegment>,
    #[serde(default)]
    pub ridge_lines: Vec<RidgeLineInput>,
    /// Pitch for every detected structure; flat when absent
    #[serde(default)]
    pub pitch: Option<PitchRatio>,
    /// Overrides the configured frame
    #[serde(default)]
    pub frame: Option<CoordinateFrame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RidgeLineInput {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FoldKind,
    pub points: Vec<Coordinate>,
}

/// Detected face, as accepted into the take-off
#[derive(Debug, Clone, Serialize)]
pub struct FaceReport {
    pub label: String,
    pub area_sq_m: f64,
    pub perimeter_m: f64,
    pub centroid: Coordinate,
    pub ring: Vec<Coordinate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyReport {
    pub property_id: String,
    pub frame: CoordinateFrame,
    pub segment_count: usize,
    pub faces: Vec<FaceReport>,
    pub totals: PropertyMeasurementTotals,
}

pub fn load(path: &std::path::Path) -> Result<PropertyInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid property file '{}'", path.display()))
}

/// Extract faces, accept each as a structure in descending-area order, and
/// total the property.
pub fn process(
    input: &PropertyInput,
    config: &Config,
    pitch_override: Option<PitchRatio>,
) -> Result<PropertyReport> {
    let frame = input.frame.unwrap_or(config.frame);
    let faces = extract_faces(&input.segments, &config.face_config(frame));
    tracing::info!(
        property = %input.property_id,
        segments = input.segments.len(),
        faces = faces.len(),
        "extracted faces"
    );

    let mut aggregator = StructureAggregator::new(config.aggregator_config(frame))
        .context("invalid classifier settings")?;
    let pitch = input.pitch.unwrap_or_default();

    let mut reports = Vec::with_capacity(faces.len());
    for face in &faces {
        let label = aggregator.next_label();
        aggregator
            .accept_polygon(&label, face, pitch, 1.0)
            .with_context(|| format!("{}: face {} rejected", input.property_id, label))?;
        reports.push(face_report(label, face));
    }

    for (i, ridge) in input.ridge_lines.iter().enumerate() {
        aggregator
            .add_ridge_line(ridge.points.clone(), ridge.label.clone(), ridge.kind)
            .with_context(|| format!("{}: ridge line #{} is invalid", input.property_id, i))?;
    }

    Ok(PropertyReport {
        property_id: input.property_id.clone(),
        frame,
        segment_count: input.segments.len(),
        faces: reports,
        totals: aggregator.totals(pitch_override),
    })
}

fn face_report(label: String, face: &DetectedPolygon) -> FaceReport {
    FaceReport {
        label,
        area_sq_m: face.area,
        perimeter_m: face.perimeter,
        centroid: face.centroid,
        ring: face.ring.clone(),
    }
}
