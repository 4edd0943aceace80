// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use roof_lite_geometry::{ClassifierConfig, CoordinateFrame, FaceExtractorConfig};
use roof_lite_takeoff::AggregatorConfig;

/// Measurement and runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default frame for inputs that do not name one.
    pub frame: CoordinateFrame,
    /// Faces below this area (square meters) are dropped.
    pub min_face_area: f64,
    /// Hop limit per face trace; `None` uses the segment count.
    pub max_hops: Option<usize>,
    /// Eave band upper bound, degrees off the dominant axis.
    pub eave_max_offset_deg: f64,
    /// Rake band lower bound, degrees off the dominant axis.
    pub rake_min_offset_deg: f64,
    /// Number of worker threads for parallel processing.
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let classifier = ClassifierConfig::default();
        Self {
            frame: var("ROOF_FRAME")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            min_face_area: var("ROOF_MIN_FACE_AREA")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            max_hops: var("ROOF_MAX_HOPS").and_then(|v| v.parse().ok()),
            eave_max_offset_deg: var("ROOF_EAVE_MAX_OFFSET_DEG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(classifier.eave_max_offset_deg),
            rake_min_offset_deg: var("ROOF_RAKE_MIN_OFFSET_DEG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(classifier.rake_min_offset_deg),
            worker_threads: var("WORKER_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }

    pub fn face_config(&self, frame: CoordinateFrame) -> FaceExtractorConfig {
        FaceExtractorConfig {
            frame,
            min_area: self.min_face_area,
            max_hops: self.max_hops,
        }
    }

    pub fn aggregator_config(&self, frame: CoordinateFrame) -> AggregatorConfig {
        AggregatorConfig {
            frame,
            classifier: ClassifierConfig {
                eave_max_offset_deg: self.eave_max_offset_deg,
                rake_min_offset_deg: self.rake_min_offset_deg,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.frame, CoordinateFrame::Wgs84);
        assert_eq!(config.min_face_area, 1.0);
        assert_eq!(config.max_hops, None);
        assert_eq!(config.eave_max_offset_deg, 30.0);
        assert_eq!(config.rake_min_offset_deg, 60.0);
        assert!(config.worker_threads >= 1);
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = Config::from_lookup(|key| match key {
            "ROOF_FRAME" => Some("planar".into()),
            "ROOF_MIN_FACE_AREA" => Some("0.25".into()),
            "ROOF_MAX_HOPS" => Some("64".into()),
            "ROOF_EAVE_MAX_OFFSET_DEG" => Some("not a number".into()),
            "WORKER_THREADS" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.frame, CoordinateFrame::Planar);
        assert_eq!(config.min_face_area, 0.25);
        assert_eq!(config.max_hops, Some(64));
        assert_eq!(config.eave_max_offset_deg, 30.0);
        assert!(config.worker_threads >= 1);

        let faces = config.face_config(CoordinateFrame::Planar);
        assert_eq!(faces.max_hops, Some(64));
    }
}
