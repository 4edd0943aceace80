// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary edge classification for roof outlines.
//!
//! Edges are labelled by comparing their bearing to the outline's dominant
//! axis (the building's long direction):
//! - near-parallel to the axis → eave
//! - near-perpendicular → rake
//! - anything in between, including the exact 45° tie → wall
//!
//! This is a heuristic, not a geometric proof. On irregular hip and valley
//! roofs it cannot tell a hip from a rake. Interior folds (ridge, hip,
//! valley) are never inferred here; they arrive separately as ridge lines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{ring_edges, Coordinate, CoordinateFrame};

/// Linear-footage class of a roof edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    Eave,
    Rake,
    Ridge,
    Hip,
    Valley,
    Wall,
    StepFlashing,
}

impl EdgeClass {
    pub const ALL: [EdgeClass; 7] = [
        EdgeClass::Eave,
        EdgeClass::Rake,
        EdgeClass::Ridge,
        EdgeClass::Hip,
        EdgeClass::Valley,
        EdgeClass::Wall,
        EdgeClass::StepFlashing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeClass::Eave => "eave",
            EdgeClass::Rake => "rake",
            EdgeClass::Ridge => "ridge",
            EdgeClass::Hip => "hip",
            EdgeClass::Valley => "valley",
            EdgeClass::Wall => "wall",
            EdgeClass::StepFlashing => "step_flashing",
        }
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds for the bearing heuristic, in degrees off the dominant axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Edges within this offset of the axis are eaves. Default: 30°
    pub eave_max_offset_deg: f64,
    /// Edges at least this far off the axis are rakes. Default: 60°
    pub rake_min_offset_deg: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            eave_max_offset_deg: 30.0,
            rake_min_offset_deg: 60.0,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        let eave = self.eave_max_offset_deg;
        let rake = self.rake_min_offset_deg;
        if !(eave.is_finite() && rake.is_finite()) || eave < 0.0 || rake > 90.0 || eave > rake {
            return Err(Error::InvalidClassifier(format!(
                "expected 0 <= eave ({}) <= rake ({}) <= 90",
                eave, rake
            )));
        }
        Ok(())
    }

    fn class_for_offset(&self, offset_deg: f64) -> EdgeClass {
        // Both bands are inclusive; the eave band wins if they ever meet
        if offset_deg <= self.eave_max_offset_deg {
            EdgeClass::Eave
        } else if offset_deg >= self.rake_min_offset_deg {
            EdgeClass::Rake
        } else {
            EdgeClass::Wall
        }
    }
}

/// One classified boundary edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedEdge {
    pub start: Coordinate,
    pub end: Coordinate,
    pub class: EdgeClass,
    /// Edge length in meters
    pub length: f64,
    /// Compass bearing in degrees
    pub bearing_deg: f64,
}

/// Per-class length sums
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgeClassTotals {
    pub eave: f64,
    pub rake: f64,
    pub ridge: f64,
    pub hip: f64,
    pub valley: f64,
    pub wall: f64,
    pub step_flashing: f64,
}

impl EdgeClassTotals {
    pub fn add(&mut self, class: EdgeClass, length: f64) {
        *self.slot_mut(class) += length;
    }

    pub fn get(&self, class: EdgeClass) -> f64 {
        match class {
            EdgeClass::Eave => self.eave,
            EdgeClass::Rake => self.rake,
            EdgeClass::Ridge => self.ridge,
            EdgeClass::Hip => self.hip,
            EdgeClass::Valley => self.valley,
            EdgeClass::Wall => self.wall,
            EdgeClass::StepFlashing => self.step_flashing,
        }
    }

    pub fn total(&self) -> f64 {
        EdgeClass::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Same totals multiplied by `factor` (unit conversion).
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = Self::default();
        for class in EdgeClass::ALL {
            out.add(class, self.get(class) * factor);
        }
        out
    }

    fn slot_mut(&mut self, class: EdgeClass) -> &mut f64 {
        match class {
            EdgeClass::Eave => &mut self.eave,
            EdgeClass::Rake => &mut self.rake,
            EdgeClass::Ridge => &mut self.ridge,
            EdgeClass::Hip => &mut self.hip,
            EdgeClass::Valley => &mut self.valley,
            EdgeClass::Wall => &mut self.wall,
            EdgeClass::StepFlashing => &mut self.step_flashing,
        }
    }
}

impl<'a> FromIterator<&'a ClassifiedEdge> for EdgeClassTotals {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedEdge>>(iter: I) -> Self {
        let mut totals = Self::default();
        for edge in iter {
            totals.add(edge.class, edge.length);
        }
        totals
    }
}

/// Dominant orientation of a ring in compass degrees, within [0, 180).
///
/// Length-weighted mean of the edge bearings on the doubled-angle circle, so
/// opposite directions reinforce instead of cancelling. Falls back to the
/// longest edge when the weighted mean is undefined (e.g. a perfect square).
pub fn dominant_axis_degrees(ring: &[Coordinate], frame: CoordinateFrame) -> Option<f64> {
    let edges = ring_edges(ring);
    if edges.is_empty() {
        return None;
    }

    let mut sum_cos = 0.0;
    let mut sum_sin = 0.0;
    let mut longest: Option<(f64, f64)> = None;

    for (a, b) in &edges {
        let length = frame.segment_length(a, b);
        if length <= 0.0 {
            continue;
        }
        let doubled = (2.0 * frame.bearing_degrees(a, b)).to_radians();
        sum_cos += length * doubled.cos();
        sum_sin += length * doubled.sin();
        if longest.map_or(true, |(best, _)| length > best) {
            longest = Some((length, frame.bearing_degrees(a, b)));
        }
    }

    let (max_len, longest_bearing) = longest?;
    let resultant = sum_cos.hypot(sum_sin);
    let axis = if resultant > max_len * 1e-9 {
        sum_sin.atan2(sum_cos).to_degrees() / 2.0
    } else {
        longest_bearing
    };
    Some(axis.rem_euclid(180.0))
}

/// Angle between a bearing and an axis, folded into [0, 90].
pub fn axis_offset_degrees(bearing_deg: f64, axis_deg: f64) -> f64 {
    let d = (bearing_deg - axis_deg).rem_euclid(180.0);
    if d > 90.0 {
        180.0 - d
    } else {
        d
    }
}

/// Classify every edge of a closed outer boundary.
pub fn classify_boundary(
    ring: &[Coordinate],
    frame: CoordinateFrame,
    config: &ClassifierConfig,
) -> Vec<ClassifiedEdge> {
    let Some(axis) = dominant_axis_degrees(ring, frame) else {
        return Vec::new();
    };

    ring_edges(ring)
        .into_iter()
        .map(|(start, end)| {
            let length = frame.segment_length(&start, &end);
            let bearing_deg = frame.bearing_degrees(&start, &end);
            let class = if length > 0.0 {
                config.class_for_offset(axis_offset_degrees(bearing_deg, axis))
            } else {
                EdgeClass::Wall
            };
            ClassifiedEdge {
                start,
                end,
                class,
                length,
                bearing_deg,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_rectangle_long_sides_are_eaves() {
        let ring = vec![c(0.0, 0.0), c(20.0, 0.0), c(20.0, 10.0), c(0.0, 10.0)];
        let edges = classify_boundary(&ring, CoordinateFrame::Planar, &ClassifierConfig::default());

        let classes: Vec<EdgeClass> = edges.iter().map(|e| e.class).collect();
        assert_eq!(
            classes,
            vec![EdgeClass::Eave, EdgeClass::Rake, EdgeClass::Eave, EdgeClass::Rake]
        );

        let totals: EdgeClassTotals = edges.iter().collect();
        assert_relative_eq!(totals.eave, 40.0);
        assert_relative_eq!(totals.rake, 20.0);
        assert_relative_eq!(totals.total(), 60.0);
    }

    #[test]
    fn test_rotated_rectangle_axis() {
        // 20 x 10 rectangle rotated 30 degrees
        let (s, co) = 30f64.to_radians().sin_cos();
        let rot = |x: f64, y: f64| c(x * co - y * s, x * s + y * co);
        let ring = vec![rot(0.0, 0.0), rot(20.0, 0.0), rot(20.0, 10.0), rot(0.0, 10.0)];

        let axis = dominant_axis_degrees(&ring, CoordinateFrame::Planar).unwrap();
        // Long side points 30 degrees counter-clockwise of east: compass 60
        assert_relative_eq!(axis, 60.0, epsilon = 1e-9);

        let edges = classify_boundary(&ring, CoordinateFrame::Planar, &ClassifierConfig::default());
        assert_eq!(edges[0].class, EdgeClass::Eave);
        assert_eq!(edges[1].class, EdgeClass::Rake);
    }

    #[test]
    fn test_diagonal_edges_default_to_wall() {
        // Gable-ish outline with a 45 degree corner cut
        let ring = vec![c(0.0, 0.0), c(20.0, 0.0), c(20.0, 6.0), c(16.0, 10.0), c(0.0, 10.0)];
        let edges = classify_boundary(&ring, CoordinateFrame::Planar, &ClassifierConfig::default());
        assert_eq!(edges[2].class, EdgeClass::Wall);
        assert_relative_eq!(edges[2].length, 32f64.sqrt());
    }

    #[test]
    fn test_square_falls_back_to_longest_edge() {
        let ring = vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 10.0)];
        let axis = dominant_axis_degrees(&ring, CoordinateFrame::Planar).unwrap();
        assert_relative_eq!(axis, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_axis_offset_folding() {
        assert_relative_eq!(axis_offset_degrees(0.0, 90.0), 90.0);
        assert_relative_eq!(axis_offset_degrees(270.0, 90.0), 0.0);
        assert_relative_eq!(axis_offset_degrees(100.0, 10.0), 90.0);
        assert_relative_eq!(axis_offset_degrees(350.0, 10.0), 20.0);
    }

    #[test]
    fn test_degenerate_input() {
        let config = ClassifierConfig::default();
        assert!(classify_boundary(&[], CoordinateFrame::Planar, &config).is_empty());
        let point = vec![c(1.0, 1.0), c(1.0, 1.0), c(1.0, 1.0)];
        assert!(classify_boundary(&point, CoordinateFrame::Planar, &config).is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(ClassifierConfig::default().validate().is_ok());
        let bad = ClassifierConfig {
            eave_max_offset_deg: 70.0,
            rake_min_offset_deg: 20.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_edge_class_serializes_snake_case() {
        let json = serde_json::to_string(&EdgeClass::StepFlashing).unwrap();
        assert_eq!(json, "\"step_flashing\"");
        assert_eq!(EdgeClass::StepFlashing.to_string(), "step_flashing");
    }
}
