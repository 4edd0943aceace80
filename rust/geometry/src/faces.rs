// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar face extraction from unordered line segments.
//!
//! Segments are turned into a half-edge graph stored as an arena: vertices
//! are indexed by their rounded [`VertexKey`], directed edges are plain
//! `(from, to)` index pairs, so no cyclic object graph is ever built.
//! Dangling chains are pruned before tracing.
//!
//! Faces are traced with the tightest-clockwise-turn rule. At every vertex
//! the walk leaves along the outgoing edge with the smallest positive
//! clockwise offset from the direction it arrived from. Bounded faces come
//! out counter-clockwise; the boundary of the unbounded exterior region comes
//! out clockwise and is dropped.

use std::f64::consts::{PI, TAU};

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{
    distinct_vertex_count, ring_signature, Coordinate, CoordinateFrame, DetectedPolygon,
    LineSegment, VertexKey,
};

/// Configuration for face extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceExtractorConfig {
    /// How segment coordinates are measured
    pub frame: CoordinateFrame,
    /// Faces smaller than this (square meters) are numerical noise. Default: 1.0
    pub min_area: f64,
    /// Hop limit for a single face trace. Default: number of usable segments.
    ///
    /// A face whose boundary runs along a bridge segment twice (an envelope
    /// joined to an inner dormer by one line) needs more hops than there are
    /// segments and is dropped under the default. `2 * segments` never cuts
    /// off a real face.
    pub max_hops: Option<usize>,
}

impl Default for FaceExtractorConfig {
    fn default() -> Self {
        Self {
            frame: CoordinateFrame::Wgs84,
            min_area: 1.0,
            max_hops: None,
        }
    }
}

impl FaceExtractorConfig {
    /// Defaults for coordinates already in local meters.
    pub fn planar() -> Self {
        Self {
            frame: CoordinateFrame::Planar,
            ..Self::default()
        }
    }
}

/// One traversable direction of a segment
#[derive(Debug, Clone)]
struct HalfEdge {
    from: usize,
    to: usize,
    /// Direction of travel, radians in (-PI, PI]
    angle: f64,
}

/// Arena-backed half-edge graph
#[derive(Debug, Default)]
struct PlanarGraph {
    keys: Vec<VertexKey>,
    coords: Vec<Coordinate>,
    index: FxHashMap<VertexKey, usize>,
    /// Segments touching each vertex
    degree: Vec<usize>,
    edges: Vec<HalfEdge>,
    /// Outgoing half-edges per vertex, sorted by angle
    outgoing: Vec<SmallVec<[usize; 4]>>,
    /// False for half-edges pruned as dangling
    live: Vec<bool>,
    segment_count: usize,
}

impl PlanarGraph {
    fn build(segments: &[LineSegment], frame: CoordinateFrame) -> Self {
        let mut graph = Self::default();

        for segment in segments {
            let Some((start, end)) = segment.endpoints() else {
                tracing::debug!(segment = %segment.id, points = segment.points.len(), "Skipping segment with too few points");
                continue;
            };
            if !start.is_finite() || !end.is_finite() {
                tracing::debug!(segment = %segment.id, "Skipping segment with non-finite coordinates");
                continue;
            }

            let a = graph.vertex(start);
            let b = graph.vertex(end);
            if a == b {
                tracing::debug!(segment = %segment.id, "Skipping zero-length segment");
                continue;
            }

            graph.degree[a] += 1;
            graph.degree[b] += 1;
            graph.push_edge(a, b, frame);
            graph.push_edge(b, a, frame);
            graph.segment_count += 1;
        }

        // Stable sort: exact angle ties keep input segment order
        let edges = &graph.edges;
        for out in graph.outgoing.iter_mut() {
            out.sort_by(|&x, &y| edges[x].angle.total_cmp(&edges[y].angle));
        }

        graph.prune_dangling();
        graph
    }

    /// Repeatedly remove segments ending at a vertex with no other live
    /// segment. Such chains can never lie on a face boundary.
    fn prune_dangling(&mut self) {
        let mut live_degree = self.degree.clone();
        let mut queue: Vec<usize> = (0..live_degree.len()).filter(|&v| live_degree[v] == 1).collect();
        let mut pruned = 0usize;

        while let Some(v) = queue.pop() {
            if live_degree[v] != 1 {
                continue;
            }
            let Some(&out) = self.outgoing[v].iter().find(|&&e| self.live[e]) else {
                continue;
            };
            let to = self.edges[out].to;
            let back = out ^ 1;
            self.live[out] = false;
            self.live[back] = false;
            self.outgoing[v].retain(|e| *e != out);
            self.outgoing[to].retain(|e| *e != back);
            live_degree[v] -= 1;
            live_degree[to] -= 1;
            pruned += 1;
            if live_degree[to] == 1 {
                queue.push(to);
            }
        }

        if pruned > 0 {
            tracing::debug!(pruned, "Pruned dangling segments");
        }
    }

    fn vertex(&mut self, c: Coordinate) -> usize {
        let key = c.key();
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.keys.len();
        self.index.insert(key.clone(), idx);
        self.keys.push(key);
        self.coords.push(c);
        self.degree.push(0);
        self.outgoing.push(SmallVec::new());
        idx
    }

    fn push_edge(&mut self, from: usize, to: usize, frame: CoordinateFrame) {
        let angle = travel_angle(&self.coords[from], &self.coords[to], frame);
        let id = self.edges.len();
        self.edges.push(HalfEdge { from, to, angle });
        self.live.push(true);
        self.outgoing[from].push(id);
    }

    /// Continuation of `incoming` at its destination vertex.
    ///
    /// Picks the outgoing edge with the smallest positive clockwise offset
    /// from the reverse of the incoming direction, never the edge straight
    /// back to the vertex just left.
    fn next_edge(&self, incoming: usize) -> Option<usize> {
        let arrived = &self.edges[incoming];
        let reverse = arrived.angle + PI;

        let mut best: Option<(usize, f64)> = None;
        for &candidate in &self.outgoing[arrived.to] {
            let edge = &self.edges[candidate];
            if edge.to == arrived.from {
                continue;
            }
            let mut offset = (reverse - edge.angle).rem_euclid(TAU);
            if offset <= f64::EPSILON {
                // Collinear with the way back: a full turn, not zero
                offset = TAU;
            }
            if best.map_or(true, |(_, best_offset)| offset < best_offset) {
                best = Some((candidate, offset));
            }
        }
        best.map(|(edge, _)| edge)
    }

    /// Walk one face boundary from `start`. Returns the vertex indices
    /// passed through when the walk comes back to `start` within
    /// `max_hops`. A face touching itself at a vertex lists it twice.
    fn trace(&self, start: usize, max_hops: usize, visited: &mut [bool]) -> Option<Vec<usize>> {
        let mut ring = vec![self.edges[start].from];
        let mut current = start;

        for _ in 0..max_hops {
            visited[current] = true;
            let next = self.next_edge(current)?;
            if next == start {
                return Some(ring);
            }
            ring.push(self.edges[next].from);
            current = next;
        }

        tracing::trace!(start, max_hops, "Face trace exceeded hop bound");
        None
    }
}

/// Angle of travel from `a` to `b` in a locally isotropic frame.
///
/// Longitude is scaled at the mean latitude of both endpoints, so the two
/// directions of a segment are exact reverses.
fn travel_angle(a: &Coordinate, b: &Coordinate, frame: CoordinateFrame) -> f64 {
    let dy = b.lat - a.lat;
    let dx = match frame {
        CoordinateFrame::Wgs84 => (b.lon - a.lon) * (0.5 * (a.lat + b.lat)).to_radians().cos(),
        CoordinateFrame::Planar => b.lon - a.lon,
    };
    dy.atan2(dx)
}

/// Extract the closed faces bounded by `segments`.
///
/// Returns every bounded face (outer envelopes and interior faces such as
/// dormers alike) sorted by descending area. Degenerate candidates are
/// dropped, never reported as errors:
/// - traces that dead-end or exceed the hop bound
/// - boundaries with fewer than 3 distinct vertices
/// - boundaries touching a vertex of degree < 2
/// - faces below `config.min_area`
///
/// Fewer than 3 segments cannot bound anything and yield an empty result.
pub fn extract_faces(segments: &[LineSegment], config: &FaceExtractorConfig) -> Vec<DetectedPolygon> {
    if segments.len() < 3 {
        return Vec::new();
    }

    let frame = config.frame;
    let graph = PlanarGraph::build(segments, frame);
    if graph.segment_count < 3 {
        return Vec::new();
    }

    let max_hops = config.max_hops.unwrap_or(graph.segment_count);
    let mut visited = vec![false; graph.edges.len()];
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut faces = Vec::new();
    let mut open_traces = 0usize;

    for start in 0..graph.edges.len() {
        if visited[start] || !graph.live[start] {
            continue;
        }
        let Some(ring_idx) = graph.trace(start, max_hops, &mut visited) else {
            open_traces += 1;
            continue;
        };

        let keys: Vec<VertexKey> = ring_idx.iter().map(|&v| graph.keys[v].clone()).collect();
        let ring: Vec<Coordinate> = ring_idx.iter().map(|&v| graph.coords[v]).collect();

        if distinct_vertex_count(&ring) < 3 {
            continue;
        }
        if let Some(&stub) = ring_idx.iter().find(|&&v| graph.degree[v] < 2) {
            tracing::debug!(vertex = %graph.keys[stub], "Discarding face with dangling vertex");
            continue;
        }

        let signed = frame.signed_area(&ring);
        if signed <= 0.0 {
            // Clockwise: the exterior side of a boundary
            continue;
        }

        if !seen.insert(ring_signature(&keys)) {
            continue;
        }

        if signed < config.min_area {
            tracing::debug!(area = signed, min_area = config.min_area, "Discarding noise face");
            continue;
        }

        faces.push(DetectedPolygon {
            perimeter: frame.perimeter(&ring),
            centroid: frame.centroid(&ring),
            area: signed,
            ring,
            vertex_keys: keys,
        });
    }

    faces.sort_by(|a, b| b.area.total_cmp(&a.area));

    tracing::debug!(
        segments = segments.len(),
        usable_segments = graph.segment_count,
        vertices = graph.keys.len(),
        open_traces,
        faces = faces.len(),
        "Face extraction complete"
    );

    faces
}

/// Run [`extract_faces`] over independent properties in parallel.
///
/// Output order matches input order.
pub fn extract_faces_batch(
    properties: &[Vec<LineSegment>],
    config: &FaceExtractorConfig,
) -> Vec<Vec<DetectedPolygon>> {
    properties
        .par_iter()
        .map(|segments| extract_faces(segments, config))
        .collect()
}

/// Closed loop of straight segments along `ring`, one per edge.
pub fn segments_from_ring(ring: &[Coordinate], id_prefix: &str) -> Vec<LineSegment> {
    crate::types::ring_edges(ring)
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| LineSegment::straight(format!("{}-{}", id_prefix, i), a, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(id: &str, a: (f64, f64), b: (f64, f64)) -> LineSegment {
        LineSegment::straight(id, a.into(), b.into())
    }

    fn square() -> Vec<LineSegment> {
        vec![
            seg("bottom", (0.0, 0.0), (10.0, 0.0)),
            seg("right", (10.0, 0.0), (10.0, 10.0)),
            seg("top", (10.0, 10.0), (0.0, 10.0)),
            seg("left", (0.0, 10.0), (0.0, 0.0)),
        ]
    }

    #[test]
    fn test_graph_degree_counts_segments() {
        let mut segments = square();
        segments.push(seg("stub", (10.0, 10.0), (15.0, 15.0)));
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);

        assert_eq!(graph.segment_count, 5);
        assert_eq!(graph.edges.len(), 10);
        let corner = graph.index[&Coordinate::new(10.0, 10.0).key()];
        let tip = graph.index[&Coordinate::new(15.0, 15.0).key()];
        assert_eq!(graph.degree[corner], 3);
        assert_eq!(graph.degree[tip], 1);
    }

    #[test]
    fn test_outgoing_sorted_by_angle() {
        let segments = vec![
            seg("n", (0.0, 0.0), (0.0, 1.0)),
            seg("e", (0.0, 0.0), (1.0, 0.0)),
            seg("w", (0.0, 0.0), (-1.0, 0.0)),
        ];
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);
        let origin = graph.index[&Coordinate::new(0.0, 0.0).key()];
        let angles: Vec<f64> = graph.outgoing[origin]
            .iter()
            .map(|&e| graph.edges[e].angle)
            .collect();
        assert!(angles.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_next_edge_takes_tightest_clockwise_turn() {
        // Square plus a diagonal from (0,0) to (10,10)
        let mut segments = square();
        segments.push(seg("diag", (0.0, 0.0), (10.0, 10.0)));
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);

        // Arriving at (10,10) from (10,0): the diagonal is the tighter turn
        let incoming = graph
            .edges
            .iter()
            .position(|e| {
                graph.coords[e.from] == Coordinate::new(10.0, 0.0)
                    && graph.coords[e.to] == Coordinate::new(10.0, 10.0)
            })
            .unwrap();
        let next = graph.next_edge(incoming).unwrap();
        assert_eq!(graph.coords[graph.edges[next].to], Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_dangling_chain_is_pruned() {
        let mut segments = square();
        segments.push(seg("stub1", (10.0, 10.0), (6.0, 6.0)));
        segments.push(seg("stub2", (6.0, 6.0), (4.0, 7.0)));
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);

        assert_eq!(graph.live.iter().filter(|l| !**l).count(), 4);
        let corner = graph.index[&Coordinate::new(10.0, 10.0).key()];
        assert_eq!(graph.outgoing[corner].len(), 2);

        let faces = extract_faces(&segments, &FaceExtractorConfig::planar());
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].area, 100.0);
    }

    #[test]
    fn test_travel_angles_of_a_segment_are_reverses() {
        let a = Coordinate::new(0.0, 10.0);
        let b = Coordinate::new(1.0, 60.0);
        let forward = travel_angle(&a, &b, CoordinateFrame::Wgs84);
        let backward = travel_angle(&b, &a, CoordinateFrame::Wgs84);
        assert_relative_eq!((forward - backward).rem_euclid(TAU), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_trace_closes_on_start_edge_not_start_vertex() {
        // Triangle (0,0),(4,0),(0,4) touching the square's corner (0,0)
        let mut segments = square();
        segments.push(seg("t1", (0.0, 0.0), (4.0, 1.0)));
        segments.push(seg("t2", (4.0, 1.0), (1.0, 4.0)));
        segments.push(seg("t3", (1.0, 4.0), (0.0, 0.0)));
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);
        let start = graph
            .edges
            .iter()
            .position(|e| {
                graph.coords[e.from] == Coordinate::new(0.0, 0.0)
                    && graph.coords[e.to] == Coordinate::new(10.0, 0.0)
            })
            .unwrap();

        let mut visited = vec![false; graph.edges.len()];
        let ring = graph.trace(start, 2 * graph.segment_count, &mut visited).unwrap();
        let origin = graph.index[&Coordinate::new(0.0, 0.0).key()];
        assert_eq!(ring.len(), 7);
        assert_eq!(ring.iter().filter(|&&v| v == origin).count(), 2);
    }

    #[test]
    fn test_dead_end_has_no_continuation() {
        let segments = vec![seg("a", (0.0, 0.0), (1.0, 0.0))];
        let graph = PlanarGraph::build(&segments, CoordinateFrame::Planar);
        assert!(graph.next_edge(0).is_none());
    }

    #[test]
    fn test_square_yields_single_face() {
        let faces = extract_faces(&square(), &FaceExtractorConfig::planar());
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].area, 100.0);
        assert_relative_eq!(faces[0].perimeter, 40.0);
        assert_relative_eq!(faces[0].centroid.lon, 5.0);
        assert_relative_eq!(faces[0].centroid.lat, 5.0);
    }

    #[test]
    fn test_too_few_segments() {
        let segments = vec![
            seg("a", (0.0, 0.0), (10.0, 0.0)),
            seg("b", (10.0, 0.0), (0.0, 10.0)),
        ];
        assert!(extract_faces(&segments, &FaceExtractorConfig::planar()).is_empty());
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let mut segments = square();
        segments.push(LineSegment {
            id: "lonely".into(),
            points: vec![Coordinate::new(3.0, 3.0)],
        });
        segments.push(seg("nan", (f64::NAN, 0.0), (1.0, 1.0)));
        segments.push(seg("dot", (5.0, 5.0), (5.0, 5.0)));
        let faces = extract_faces(&segments, &FaceExtractorConfig::planar());
        assert_eq!(faces.len(), 1);
    }

    #[test]
    fn test_hop_bound_rejects_long_faces() {
        let config = FaceExtractorConfig {
            max_hops: Some(3),
            ..FaceExtractorConfig::planar()
        };
        assert!(extract_faces(&square(), &config).is_empty());
    }

    #[test]
    fn test_min_area_filter() {
        let tiny = vec![
            seg("a", (0.0, 0.0), (0.5, 0.0)),
            seg("b", (0.5, 0.0), (0.5, 0.5)),
            seg("c", (0.5, 0.5), (0.0, 0.0)),
        ];
        assert!(extract_faces(&tiny, &FaceExtractorConfig::planar()).is_empty());

        let lenient = FaceExtractorConfig {
            min_area: 0.1,
            ..FaceExtractorConfig::planar()
        };
        assert_eq!(extract_faces(&tiny, &lenient).len(), 1);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut segments = square();
        segments.push(seg("diag", (0.0, 0.0), (10.0, 10.0)));
        let config = FaceExtractorConfig::planar();
        let first = extract_faces(&segments, &config);
        let second = extract_faces(&segments, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_preserves_order() {
        let small: Vec<LineSegment> = segments_from_ring(
            &[
                Coordinate::new(0.0, 0.0),
                Coordinate::new(4.0, 0.0),
                Coordinate::new(4.0, 4.0),
            ],
            "t",
        );
        let batches = vec![square(), Vec::new(), small];
        let results = extract_faces_batch(&batches, &FaceExtractorConfig::planar());
        assert_eq!(results.len(), 3);
        assert_relative_eq!(results[0][0].area, 100.0);
        assert!(results[1].is_empty());
        assert_relative_eq!(results[2][0].area, 8.0);
    }
}
