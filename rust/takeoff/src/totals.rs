// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-level take-off totals.

use roof_lite_geometry::EdgeClassTotals;
use serde::{Deserialize, Serialize};

use crate::aggregator::StructureAggregator;
use crate::pitch::{self, PitchRatio};
use crate::units::meters_to_feet;

/// Per-structure line in a totals report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructureSummary {
    pub label: String,
    pub included: bool,
    /// Pitch the surface area was computed with (override or own)
    pub pitch: PitchRatio,
    pub plan_area_sq_ft: f64,
    pub surface_area_sq_ft: f64,
    pub perimeter_ft: f64,
}

/// Aggregate measurements over the included structures of a property.
///
/// All areas are square feet, all lengths feet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyMeasurementTotals {
    pub included_structures: usize,
    pub excluded_structures: usize,
    pub plan_area_sq_ft: f64,
    pub surface_area_sq_ft: f64,
    pub plan_squares: f64,
    pub surface_squares: f64,
    pub perimeter_ft: f64,
    /// Classified outline edges plus included ridge lines, per class
    pub linear_ft: EdgeClassTotals,
    /// Included ridge line length regardless of kind
    pub ridge_line_ft: f64,
    pub pitch_override: Option<PitchRatio>,
    /// Every structure, included or not, in insertion order
    pub structures: Vec<StructureSummary>,
}

impl StructureAggregator {
    /// Sum the included structures and ridge lines.
    ///
    /// With `pitch_override` every structure uses that pitch instead of its
    /// own. Never fails: stored records were validated when measured.
    pub fn totals(&self, pitch_override: Option<PitchRatio>) -> PropertyMeasurementTotals {
        let mut totals = PropertyMeasurementTotals {
            pitch_override,
            ..Default::default()
        };
        let mut edges_m = EdgeClassTotals::default();

        for structure in self.structures() {
            let pitch = pitch_override.unwrap_or(structure.pitch);
            let surface = match pitch_override {
                Some(p) => pitch::apply_pitch(structure.plan_area_sq_ft, p),
                None => structure.surface_area_sq_ft,
            };

            totals.structures.push(StructureSummary {
                label: structure.label.clone(),
                included: structure.included,
                pitch,
                plan_area_sq_ft: structure.plan_area_sq_ft,
                surface_area_sq_ft: surface,
                perimeter_ft: structure.perimeter_ft(),
            });

            if !structure.included {
                totals.excluded_structures += 1;
                continue;
            }
            totals.included_structures += 1;
            totals.plan_area_sq_ft += structure.plan_area_sq_ft;
            totals.surface_area_sq_ft += surface;
            totals.perimeter_ft += structure.perimeter_ft();
            for edge in &structure.edges {
                edges_m.add(edge.class, edge.length);
            }
        }

        let mut ridge_m = 0.0;
        for (_, ridge) in self.ridge_lines().filter(|(_, r)| r.included) {
            edges_m.add(ridge.kind.edge_class(), ridge.length_m);
            ridge_m += ridge.length_m;
        }

        totals.linear_ft = edges_m.scaled(meters_to_feet(1.0));
        totals.ridge_line_ft = meters_to_feet(ridge_m);
        totals.plan_squares = pitch::plan_squares(totals.plan_area_sq_ft);
        totals.surface_squares = pitch::surface_squares(totals.surface_area_sq_ft);

        tracing::debug!(
            included = totals.included_structures,
            excluded = totals.excluded_structures,
            plan_sq_ft = totals.plan_area_sq_ft,
            surface_sq_ft = totals.surface_area_sq_ft,
            "computed property totals"
        );
        totals
    }
}
