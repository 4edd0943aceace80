// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spherical-earth measurement over longitude/latitude rings.
//!
//! Areas are computed in an equirectangular projection centred on the ring's
//! mean coordinate. Over property-sized extents (tens to a few hundred
//! meters) the distortion is far below survey tolerance. Lengths use the
//! haversine great-circle distance.
//!
//! Every function tolerates short input: rings with fewer than 3 vertices
//! measure zero instead of failing.

use nalgebra::{Point2, Vector2};

use crate::types::{ring_edges, Coordinate, CoordinateFrame};

/// IUGG mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Local tangent-plane projection around an origin coordinate.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Coordinate,
    meters_per_deg_lon: f64,
    meters_per_deg_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: Coordinate) -> Self {
        let meters_per_deg_lat = EARTH_RADIUS_M.to_radians();
        Self {
            origin,
            meters_per_deg_lon: meters_per_deg_lat * origin.lat.to_radians().cos(),
            meters_per_deg_lat,
        }
    }

    /// Projection centred on the vertex mean of `points`.
    pub fn centred_on(points: &[Coordinate]) -> Self {
        Self::new(vertex_mean(points))
    }

    #[inline]
    pub fn to_local(&self, c: &Coordinate) -> Point2<f64> {
        Point2::new(
            (c.lon - self.origin.lon) * self.meters_per_deg_lon,
            (c.lat - self.origin.lat) * self.meters_per_deg_lat,
        )
    }

    #[inline]
    pub fn to_coordinate(&self, p: &Point2<f64>) -> Coordinate {
        let lon = if self.meters_per_deg_lon.abs() < f64::EPSILON {
            self.origin.lon
        } else {
            self.origin.lon + p.x / self.meters_per_deg_lon
        };
        Coordinate::new(lon, self.origin.lat + p.y / self.meters_per_deg_lat)
    }
}

/// Great-circle distance between two coordinates in meters.
pub fn segment_length(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Ring perimeter in meters, closing edge included.
pub fn perimeter(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    ring_edges(ring)
        .iter()
        .map(|(a, b)| segment_length(a, b))
        .sum()
}

/// Length of an open path in meters.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| segment_length(&w[0], &w[1])).sum()
}

/// Signed ring area in square meters; positive when counter-clockwise.
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let projection = LocalProjection::centred_on(ring);
    let local: Vec<Point2<f64>> = ring.iter().map(|c| projection.to_local(c)).collect();
    shoelace(&local).0
}

/// Unsigned ring area in square meters.
pub fn area(ring: &[Coordinate]) -> f64 {
    signed_area(ring).abs()
}

/// Area centroid of a ring, falling back to the vertex mean when the ring
/// encloses no area.
pub fn centroid(ring: &[Coordinate]) -> Coordinate {
    if ring.is_empty() {
        return Coordinate::new(0.0, 0.0);
    }
    let projection = LocalProjection::centred_on(ring);
    let local: Vec<Point2<f64>> = ring.iter().map(|c| projection.to_local(c)).collect();
    match shoelace(&local).1 {
        Some(p) => projection.to_coordinate(&p),
        None => vertex_mean(ring),
    }
}

/// Compass bearing from `a` to `b` in degrees (0 = north, clockwise).
pub fn bearing_degrees(a: &Coordinate, b: &Coordinate) -> f64 {
    let projection = LocalProjection::new(*a);
    compass_bearing(&(projection.to_local(b) - projection.to_local(a)))
}

/// Planar (Cartesian meter) counterparts of the geodesic functions.
pub mod planar {
    use super::*;

    pub fn segment_length(a: &Coordinate, b: &Coordinate) -> f64 {
        (b.to_nalgebra() - a.to_nalgebra()).norm()
    }

    pub fn perimeter(ring: &[Coordinate]) -> f64 {
        if ring.len() < 3 {
            return 0.0;
        }
        ring_edges(ring)
            .iter()
            .map(|(a, b)| segment_length(a, b))
            .sum()
    }

    pub fn polyline_length(points: &[Coordinate]) -> f64 {
        points.windows(2).map(|w| segment_length(&w[0], &w[1])).sum()
    }

    pub fn signed_area(ring: &[Coordinate]) -> f64 {
        if ring.len() < 3 {
            return 0.0;
        }
        // Shift to the first vertex to keep the cross products small
        let origin = ring[0].to_nalgebra();
        let local: Vec<Point2<f64>> = ring
            .iter()
            .map(|c| Point2::from(c.to_nalgebra() - origin))
            .collect();
        shoelace(&local).0
    }

    pub fn area(ring: &[Coordinate]) -> f64 {
        signed_area(ring).abs()
    }

    pub fn centroid(ring: &[Coordinate]) -> Coordinate {
        if ring.is_empty() {
            return Coordinate::new(0.0, 0.0);
        }
        let origin = ring[0].to_nalgebra();
        let local: Vec<Point2<f64>> = ring
            .iter()
            .map(|c| Point2::from(c.to_nalgebra() - origin))
            .collect();
        match shoelace(&local).1 {
            Some(p) => Coordinate::new(p.x + origin.x, p.y + origin.y),
            None => vertex_mean(ring),
        }
    }

    pub fn bearing_degrees(a: &Coordinate, b: &Coordinate) -> f64 {
        compass_bearing(&(b.to_nalgebra() - a.to_nalgebra()))
    }
}

impl CoordinateFrame {
    pub fn segment_length(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        match self {
            CoordinateFrame::Wgs84 => segment_length(a, b),
            CoordinateFrame::Planar => planar::segment_length(a, b),
        }
    }

    pub fn perimeter(&self, ring: &[Coordinate]) -> f64 {
        match self {
            CoordinateFrame::Wgs84 => perimeter(ring),
            CoordinateFrame::Planar => planar::perimeter(ring),
        }
    }

    pub fn polyline_length(&self, points: &[Coordinate]) -> f64 {
        match self {
            CoordinateFrame::Wgs84 => polyline_length(points),
            CoordinateFrame::Planar => planar::polyline_length(points),
        }
    }

    pub fn signed_area(&self, ring: &[Coordinate]) -> f64 {
        match self {
            CoordinateFrame::Wgs84 => signed_area(ring),
            CoordinateFrame::Planar => planar::signed_area(ring),
        }
    }

    pub fn area(&self, ring: &[Coordinate]) -> f64 {
        self.signed_area(ring).abs()
    }

    pub fn centroid(&self, ring: &[Coordinate]) -> Coordinate {
        match self {
            CoordinateFrame::Wgs84 => centroid(ring),
            CoordinateFrame::Planar => planar::centroid(ring),
        }
    }

    pub fn bearing_degrees(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        match self {
            CoordinateFrame::Wgs84 => bearing_degrees(a, b),
            CoordinateFrame::Planar => planar::bearing_degrees(a, b),
        }
    }
}

/// Shoelace sum over a closed ring: (signed area, area centroid).
fn shoelace(points: &[Point2<f64>]) -> (f64, Option<Point2<f64>>) {
    let n = points.len();
    if n < 3 {
        return (0.0, None);
    }

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        twice_area += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }

    let signed = twice_area / 2.0;
    if signed.abs() < 1e-12 {
        return (signed, None);
    }
    (signed, Some(Point2::new(cx / (6.0 * signed), cy / (6.0 * signed))))
}

fn compass_bearing(d: &Vector2<f64>) -> f64 {
    let bearing = d.x.atan2(d.y).to_degrees();
    if bearing < 0.0 {
        bearing + 360.0
    } else {
        bearing
    }
}

fn vertex_mean(points: &[Coordinate]) -> Coordinate {
    if points.is_empty() {
        return Coordinate::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    let lon = points.iter().map(|c| c.lon).sum::<f64>() / n;
    let lat = points.iter().map(|c| c.lat).sum::<f64>() / n;
    Coordinate::new(lon, lat)
}
