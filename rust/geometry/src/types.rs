// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by the measurement pipeline

use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of decimal places kept when deriving a [`VertexKey`].
pub const VERTEX_KEY_PRECISION: i32 = 8;

/// A (longitude, latitude) pair in decimal degrees.
///
/// In the [`CoordinateFrame::Planar`] frame the same pair is read as local
/// (x, y) meters instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Canonical rounded key used for point equality.
    pub fn key(&self) -> VertexKey {
        VertexKey::from_coordinate(self)
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.lon, self.lat)
    }

    /// Check that the coordinate is usable in `frame`.
    pub fn validate(&self, frame: CoordinateFrame) -> Result<()> {
        let in_range = match frame {
            CoordinateFrame::Wgs84 => {
                (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
            }
            CoordinateFrame::Planar => true,
        };
        if self.is_finite() && in_range {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate {
                lon: self.lon,
                lat: self.lat,
            })
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// How coordinates are interpreted when measuring.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateFrame {
    /// Longitude/latitude degrees on a spherical earth.
    #[default]
    Wgs84,
    /// Local Cartesian meters (x east, y north).
    Planar,
}

impl std::str::FromStr for CoordinateFrame {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgs84" | "geodesic" | "lonlat" => Ok(CoordinateFrame::Wgs84),
            "planar" | "local" | "meters" => Ok(CoordinateFrame::Planar),
            other => Err(format!("unknown coordinate frame '{}'", other)),
        }
    }
}

/// Canonical string form of a coordinate rounded to 8 decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexKey(String);

impl VertexKey {
    pub fn from_coordinate(c: &Coordinate) -> Self {
        VertexKey(format!("{},{}", round_component(c.lon), round_component(c.lat)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn round_component(value: f64) -> String {
    let precision = VERTEX_KEY_PRECISION as usize;
    let formatted = format!("{:.*}", precision, value);
    // -0.00000000 and 0.00000000 are the same point
    match formatted.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => formatted,
    }
}

/// One drawn stroke: a straight edge or a polyline.
///
/// Only the two endpoints take part in face extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSegment {
    pub id: String,
    pub points: Vec<Coordinate>,
}

impl LineSegment {
    /// Create a segment, rejecting strokes with fewer than two points.
    pub fn new(id: impl Into<String>, points: Vec<Coordinate>) -> Result<Self> {
        let id = id.into();
        if points.len() < 2 {
            return Err(Error::TooFewPoints {
                id,
                count: points.len(),
            });
        }
        Ok(Self { id, points })
    }

    /// Straight two-point segment.
    pub fn straight(id: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            id: id.into(),
            points: vec![start, end],
        }
    }

    /// First and last point, if the stroke has at least two.
    pub fn endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        if self.points.len() < 2 {
            return None;
        }
        Some((self.points[0], self.points[self.points.len() - 1]))
    }
}

/// A closed face found by the extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedPolygon {
    /// Ring vertices; closure is implicit (first point is not repeated at the
    /// end). A face touching itself at one vertex lists that vertex twice.
    pub ring: Vec<Coordinate>,
    /// Planar area in square meters
    pub area: f64,
    /// Perimeter in meters
    pub perimeter: f64,
    pub centroid: Coordinate,
    /// Vertex keys of `ring`, in ring order
    pub vertex_keys: Vec<VertexKey>,
}

impl DetectedPolygon {
    /// Number of distinct vertices on the ring.
    pub fn distinct_vertex_count(&self) -> usize {
        distinct_vertex_count(&self.ring)
    }

    /// Order-independent signature of the ring's vertices.
    pub fn signature(&self) -> String {
        ring_signature(&self.vertex_keys)
    }
}

/// Number of distinct vertex keys on a ring.
pub fn distinct_vertex_count(ring: &[Coordinate]) -> usize {
    let mut keys: Vec<VertexKey> = ring.iter().map(Coordinate::key).collect();
    keys.sort();
    keys.dedup();
    keys.len()
}

pub(crate) fn ring_signature(keys: &[VertexKey]) -> String {
    let mut sorted: Vec<&str> = keys.iter().map(VertexKey::as_str).collect();
    sorted.sort_unstable();
    sorted.join("|")
}

/// Build the closing-edge-inclusive edge list of a ring.
pub fn ring_edges(ring: &[Coordinate]) -> Vec<(Coordinate, Coordinate)> {
    let n = ring.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n).map(|i| (ring[i], ring[(i + 1) % n])).collect()
}

/// Drop a repeated closing vertex (`first == last`) if present.
pub fn open_ring(mut ring: Vec<Coordinate>) -> Vec<Coordinate> {
    if ring.len() > 1 && ring[0].key() == ring[ring.len() - 1].key() {
        ring.pop();
    }
    ring
}
