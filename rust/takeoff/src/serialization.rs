// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain records for an external storage layer.
//!
//! Snapshots hold only what a user drew or chose: rings, points, pitch,
//! confidence, inclusion flags. Derived measurements are recomputed on load,
//! so a snapshot edited by hand can never carry stale areas.

use roof_lite_geometry::Coordinate;
use serde::{Deserialize, Serialize};

use crate::aggregator::{AggregatorConfig, StructureAggregator};
use crate::error::{Error, Result};
use crate::pitch::PitchRatio;
use crate::structure::{FoldKind, RidgeLine, RoofStructure};

/// Serializable state of one property.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertySnapshot {
    #[serde(default)]
    pub config: AggregatorConfig,
    #[serde(default)]
    pub structures: Vec<StructureRecord>,
    #[serde(default)]
    pub ridge_lines: Vec<RidgeLineRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructureRecord {
    pub label: String,
    pub ring: Vec<Coordinate>,
    #[serde(default)]
    pub pitch: PitchRatio,
    pub confidence: f64,
    #[serde(default = "included_by_default")]
    pub included: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RidgeLineRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FoldKind,
    pub points: Vec<Coordinate>,
    #[serde(default = "included_by_default")]
    pub included: bool,
}

fn included_by_default() -> bool {
    true
}

impl StructureAggregator {
    /// Serialize the aggregator to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot()).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Rebuild an aggregator from JSON, re-validating every record.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: PropertySnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    pub fn to_snapshot(&self) -> PropertySnapshot {
        PropertySnapshot {
            config: self.config,
            structures: self
                .structures()
                .map(|s| StructureRecord {
                    label: s.label.clone(),
                    ring: s.ring.clone(),
                    pitch: s.pitch,
                    confidence: s.confidence,
                    included: s.included,
                })
                .collect(),
            ridge_lines: self
                .ridge_lines()
                .map(|(_, r)| RidgeLineRecord {
                    label: r.label.clone(),
                    kind: r.kind,
                    points: r.points.clone(),
                    included: r.included,
                })
                .collect(),
        }
    }

    /// Rebuild from a snapshot. Any invalid record fails the whole load.
    pub fn from_snapshot(snapshot: &PropertySnapshot) -> Result<Self> {
        let mut aggregator = Self::new(snapshot.config)?;

        for record in &snapshot.structures {
            let structure = RoofStructure::measure(
                &record.label,
                record.ring.clone(),
                record.pitch,
                record.confidence,
                record.included,
                &aggregator.config,
            )?;
            aggregator.upsert(structure);
        }

        for record in &snapshot.ridge_lines {
            let ridge = RidgeLine::measure(
                record.points.clone(),
                record.label.clone(),
                record.kind,
                record.included,
                &aggregator.config,
            )?;
            aggregator.insert_ridge_line(ridge);
        }

        tracing::debug!(
            structures = aggregator.structure_count(),
            ridge_lines = aggregator.ridge_line_count(),
            "loaded property snapshot"
        );
        Ok(aggregator)
    }
}
