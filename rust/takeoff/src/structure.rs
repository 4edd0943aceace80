// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof structure and ridge line records.
//!
//! Records are plain data: the storage layer loads and saves them as-is.
//! Every derived measurement is recomputed when a record is built, so a
//! record is always consistent with its own geometry.

use roof_lite_geometry::{
    classify_boundary, distinct_vertex_count, open_ring, Coordinate, ClassifiedEdge,
    EdgeClass, EdgeClassTotals, Error as GeometryError,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::AggregatorConfig;
use crate::error::{Error, Result};
use crate::pitch::{self, PitchRatio};
use crate::units::{meters_to_feet, sq_meters_to_sq_feet};

/// One labelled roof structure (A, B, ...) on a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoofStructure {
    pub label: String,
    /// Outline ring, implicit closure
    pub ring: Vec<Coordinate>,
    /// Geodesic plan area in square meters
    pub area_sq_m: f64,
    /// Geodesic perimeter in meters
    pub perimeter_m: f64,
    pub plan_area_sq_ft: f64,
    pub pitch: PitchRatio,
    pub surface_area_sq_ft: f64,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Excluded structures stay queryable but drop out of totals
    pub included: bool,
    /// Classified outline edges
    pub edges: Vec<ClassifiedEdge>,
}

impl RoofStructure {
    /// Validate inputs and compute every derived measurement.
    pub fn measure(
        label: &str,
        ring: Vec<Coordinate>,
        pitch: PitchRatio,
        confidence: f64,
        included: bool,
        config: &AggregatorConfig,
    ) -> Result<Self> {
        let label = validate_label(label)?;
        validate_confidence(confidence)?;

        let ring = open_ring(ring);
        for c in &ring {
            c.validate(config.frame)?;
        }
        let distinct = distinct_vertex_count(&ring);
        if distinct < 3 {
            return Err(GeometryError::DegenerateRing(distinct).into());
        }

        let area_sq_m = config.frame.area(&ring);
        let plan_area_sq_ft = sq_meters_to_sq_feet(area_sq_m);
        let surface_area_sq_ft = pitch::surface_area(plan_area_sq_ft, pitch)?;

        Ok(Self {
            label,
            perimeter_m: config.frame.perimeter(&ring),
            edges: classify_boundary(&ring, config.frame, &config.classifier),
            ring,
            area_sq_m,
            plan_area_sq_ft,
            pitch,
            surface_area_sq_ft,
            confidence,
            included,
        })
    }

    /// Change the pitch and re-derive surface area.
    pub(crate) fn set_pitch(&mut self, pitch: PitchRatio) -> Result<()> {
        self.surface_area_sq_ft = pitch::surface_area(self.plan_area_sq_ft, pitch)?;
        self.pitch = pitch;
        Ok(())
    }

    pub fn perimeter_ft(&self) -> f64 {
        meters_to_feet(self.perimeter_m)
    }

    pub fn plan_squares(&self) -> f64 {
        pitch::plan_squares(self.plan_area_sq_ft)
    }

    pub fn surface_squares(&self) -> f64 {
        pitch::surface_squares(self.surface_area_sq_ft)
    }

    /// Outline edge lengths per class, in feet.
    pub fn edge_totals_ft(&self) -> EdgeClassTotals {
        let meters: EdgeClassTotals = self.edges.iter().collect();
        meters.scaled(meters_to_feet(1.0))
    }
}

/// Interior fold drawn as a ridge line
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoldKind {
    #[default]
    Ridge,
    Hip,
    Valley,
}

impl FoldKind {
    pub fn edge_class(&self) -> EdgeClass {
        match self {
            FoldKind::Ridge => EdgeClass::Ridge,
            FoldKind::Hip => EdgeClass::Hip,
            FoldKind::Valley => EdgeClass::Valley,
        }
    }
}

impl std::str::FromStr for FoldKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ridge" => Ok(FoldKind::Ridge),
            "hip" => Ok(FoldKind::Hip),
            "valley" => Ok(FoldKind::Valley),
            other => Err(format!("unknown fold kind '{}'", other)),
        }
    }
}

/// Independent line string for a ridge, hip or valley
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RidgeLine {
    pub label: Option<String>,
    pub points: Vec<Coordinate>,
    #[serde(default)]
    pub kind: FoldKind,
    /// Geodesic length in meters
    pub length_m: f64,
    pub included: bool,
}

impl RidgeLine {
    pub fn measure(
        points: Vec<Coordinate>,
        label: Option<String>,
        kind: FoldKind,
        included: bool,
        config: &AggregatorConfig,
    ) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                id: label.clone().unwrap_or_else(|| "ridge line".into()),
                count: points.len(),
            }
            .into());
        }
        for c in &points {
            c.validate(config.frame)?;
        }

        Ok(Self {
            length_m: config.frame.polyline_length(&points),
            label,
            points,
            kind,
            included,
        })
    }

    pub fn length_ft(&self) -> f64 {
        meters_to_feet(self.length_m)
    }
}

fn validate_label(label: &str) -> Result<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

fn validate_confidence(confidence: f64) -> Result<()> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(Error::InvalidConfidence(confidence))
    }
}
