// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-property structure aggregation.
//!
//! The [`StructureAggregator`] owns every roof structure and ridge line drawn
//! for one property. Records live in slot maps with stable keys; a separate
//! order list keeps the sequence in which structures were first added and a
//! label index resolves the user-facing names (A, B, C, ...).
//!
//! # Example
//!
//! ```
//! use roof_lite_geometry::{Coordinate, CoordinateFrame};
//! use roof_lite_takeoff::{AggregatorConfig, PitchRatio, StructureAggregator};
//!
//! let config = AggregatorConfig { frame: CoordinateFrame::Planar, ..Default::default() };
//! let mut agg = StructureAggregator::new(config).unwrap();
//! let ring = vec![
//!     Coordinate::new(0.0, 0.0),
//!     Coordinate::new(10.0, 0.0),
//!     Coordinate::new(10.0, 10.0),
//!     Coordinate::new(0.0, 10.0),
//! ];
//! agg.add_or_replace_structure("A", ring, PitchRatio::FLAT, 1.0).unwrap();
//!
//! let totals = agg.totals(None);
//! assert_eq!(totals.included_structures, 1);
//! ```

use roof_lite_geometry::{ClassifierConfig, Coordinate, CoordinateFrame, DetectedPolygon};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::{RidgeLineKey, StructureKey};
use crate::pitch::PitchRatio;
use crate::structure::{FoldKind, RidgeLine, RoofStructure};

/// Measurement settings shared by every record of one property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregatorConfig {
    pub frame: CoordinateFrame,
    pub classifier: ClassifierConfig,
}

/// Structures and ridge lines for one property.
#[derive(Debug, Clone)]
pub struct StructureAggregator {
    pub(crate) config: AggregatorConfig,
    pub(crate) structures: SlotMap<StructureKey, RoofStructure>,
    pub(crate) structure_order: Vec<StructureKey>,
    pub(crate) labels: FxHashMap<String, StructureKey>,
    pub(crate) ridge_lines: SlotMap<RidgeLineKey, RidgeLine>,
    pub(crate) ridge_order: Vec<RidgeLineKey>,
}

impl Default for StructureAggregator {
    fn default() -> Self {
        Self::empty(AggregatorConfig::default())
    }
}

impl StructureAggregator {
    /// Create an empty aggregator. Fails if the classifier bands are invalid.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.classifier.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: AggregatorConfig) -> Self {
        Self {
            config,
            structures: SlotMap::with_key(),
            structure_order: Vec::new(),
            labels: FxHashMap::default(),
            ridge_lines: SlotMap::with_key(),
            ridge_order: Vec::new(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    // ---- Structures ----

    /// Insert a structure, or replace the one with the same label.
    ///
    /// A replacement keeps its position in the order and its inclusion flag.
    /// Nothing changes if validation fails.
    pub fn add_or_replace_structure(
        &mut self,
        label: &str,
        ring: Vec<Coordinate>,
        pitch: PitchRatio,
        confidence: f64,
    ) -> Result<StructureKey> {
        let included = self.get(label).map_or(true, |s| s.included);
        let structure = RoofStructure::measure(label, ring, pitch, confidence, included, &self.config)?;
        Ok(self.upsert(structure))
    }

    /// Accept a detected face as a structure.
    pub fn accept_polygon(
        &mut self,
        label: &str,
        polygon: &DetectedPolygon,
        pitch: PitchRatio,
        confidence: f64,
    ) -> Result<StructureKey> {
        self.add_or_replace_structure(label, polygon.ring.clone(), pitch, confidence)
    }

    /// Store an already-measured record under its own label.
    pub(crate) fn upsert(&mut self, structure: RoofStructure) -> StructureKey {
        if let Some(&key) = self.labels.get(&structure.label) {
            if let Some(slot) = self.structures.get_mut(key) {
                tracing::debug!(label = %structure.label, "replacing structure");
                *slot = structure;
                return key;
            }
        }

        tracing::debug!(
            label = %structure.label,
            area_sq_m = structure.area_sq_m,
            "adding structure"
        );
        let label = structure.label.clone();
        let key = self.structures.insert(structure);
        self.structure_order.push(key);
        self.labels.insert(label, key);
        key
    }

    /// Include or exclude a structure from totals. Geometry is kept.
    pub fn set_inclusion(&mut self, label: &str, included: bool) -> Result<()> {
        self.get_mut(label)?.included = included;
        Ok(())
    }

    /// Change a structure's pitch and re-measure its surface area.
    pub fn set_pitch(&mut self, label: &str, pitch: PitchRatio) -> Result<()> {
        self.get_mut(label)?.set_pitch(pitch)
    }

    /// Delete a structure outright.
    pub fn remove_structure(&mut self, label: &str) -> Result<RoofStructure> {
        let label = label.trim();
        let key = self
            .labels
            .remove(label)
            .ok_or_else(|| Error::StructureNotFound(label.to_string()))?;
        self.structure_order.retain(|k| *k != key);
        tracing::debug!(label, "removed structure");
        self.structures
            .remove(key)
            .ok_or_else(|| Error::StructureNotFound(label.to_string()))
    }

    pub fn get(&self, label: &str) -> Option<&RoofStructure> {
        self.labels
            .get(label.trim())
            .and_then(|key| self.structures.get(*key))
    }

    pub fn structure(&self, key: StructureKey) -> Option<&RoofStructure> {
        self.structures.get(key)
    }

    fn get_mut(&mut self, label: &str) -> Result<&mut RoofStructure> {
        let label = label.trim();
        self.labels
            .get(label)
            .and_then(|key| self.structures.get_mut(*key))
            .ok_or_else(|| Error::StructureNotFound(label.to_string()))
    }

    /// Structures in insertion order.
    pub fn structures(&self) -> impl Iterator<Item = &RoofStructure> + '_ {
        self.structure_order
            .iter()
            .filter_map(move |key| self.structures.get(*key))
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    /// First unused label in the sequence A..Z, AA, AB, ...
    pub fn next_label(&self) -> String {
        (0..)
            .map(label_for_index)
            .find(|label| !self.labels.contains_key(label))
            .unwrap_or_default()
    }

    // ---- Ridge lines ----

    pub fn add_ridge_line(
        &mut self,
        points: Vec<Coordinate>,
        label: Option<String>,
        kind: FoldKind,
    ) -> Result<RidgeLineKey> {
        let ridge = RidgeLine::measure(points, label, kind, true, &self.config)?;
        Ok(self.insert_ridge_line(ridge))
    }

    pub(crate) fn insert_ridge_line(&mut self, ridge: RidgeLine) -> RidgeLineKey {
        tracing::debug!(kind = ?ridge.kind, length_m = ridge.length_m, "adding ridge line");
        let key = self.ridge_lines.insert(ridge);
        self.ridge_order.push(key);
        key
    }

    pub fn set_ridge_line_inclusion(&mut self, key: RidgeLineKey, included: bool) -> Result<()> {
        self.ridge_lines
            .get_mut(key)
            .ok_or(Error::RidgeLineNotFound(key))?
            .included = included;
        Ok(())
    }

    pub fn remove_ridge_line(&mut self, key: RidgeLineKey) -> Result<RidgeLine> {
        let ridge = self
            .ridge_lines
            .remove(key)
            .ok_or(Error::RidgeLineNotFound(key))?;
        self.ridge_order.retain(|k| *k != key);
        Ok(ridge)
    }

    pub fn ridge_line(&self, key: RidgeLineKey) -> Option<&RidgeLine> {
        self.ridge_lines.get(key)
    }

    /// Ridge lines in insertion order, with their keys.
    pub fn ridge_lines(&self) -> impl Iterator<Item = (RidgeLineKey, &RidgeLine)> + '_ {
        self.ridge_order
            .iter()
            .filter_map(move |key| self.ridge_lines.get(*key).map(|r| (*key, r)))
    }

    pub fn ridge_line_count(&self) -> usize {
        self.ridge_lines.len()
    }
}

/// Spreadsheet-style label: 0 → A, 25 → Z, 26 → AA.
fn label_for_index(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|b| *b as char).collect()
}
