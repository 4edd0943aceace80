// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof-Lite Geometry
//!
//! Measurement primitives for roof take-offs drawn over aerial imagery:
//! 1. Geodesic area, perimeter and edge length over lon/lat rings
//! 2. Planar face extraction from an unordered set of drawn segments
//! 3. Eave/rake classification of a roof outline's boundary edges
//!
//! # Usage
//!
//! ```rust
//! use roof_lite_geometry::{extract_faces, Coordinate, FaceExtractorConfig, LineSegment};
//!
//! let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
//! let segments: Vec<LineSegment> = (0..4)
//!     .map(|i| {
//!         let a = Coordinate::from(corners[i]);
//!         let b = Coordinate::from(corners[(i + 1) % 4]);
//!         LineSegment::straight(format!("s{}", i), a, b)
//!     })
//!     .collect();
//!
//! let faces = extract_faces(&segments, &FaceExtractorConfig::planar());
//! assert_eq!(faces.len(), 1);
//! assert!((faces[0].area - 100.0).abs() < 1e-9);
//! ```

pub mod classify;
pub mod error;
pub mod faces;
pub mod geodesic;
pub mod types;

pub use classify::{
    classify_boundary, dominant_axis_degrees, ClassifiedEdge, ClassifierConfig, EdgeClass,
    EdgeClassTotals,
};
pub use error::{Error, Result};
pub use faces::{extract_faces, extract_faces_batch, segments_from_ring, FaceExtractorConfig};
pub use geodesic::EARTH_RADIUS_M;
pub use types::{
    distinct_vertex_count, open_ring, ring_edges, Coordinate, CoordinateFrame, DetectedPolygon,
    LineSegment, VertexKey,
};
