// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof-Lite Take-off
//!
//! Turns measured roof outlines into the quantities an estimate is built on:
//! pitch-adjusted surface area, squares, and linear feet per edge class,
//! summed over the structures a user chose to include.
//!
//! # Usage
//!
//! ```rust
//! use roof_lite_takeoff::{surface_area, PitchRatio};
//!
//! let pitch: PitchRatio = "6/12".parse().unwrap();
//! let surface = surface_area(1000.0, pitch).unwrap();
//! assert!((surface - 1118.034).abs() < 1e-3);
//! ```

pub mod aggregator;
pub mod error;
pub mod keys;
pub mod pitch;
pub mod serialization;
pub mod structure;
pub mod totals;
pub mod units;

pub use aggregator::{AggregatorConfig, StructureAggregator};
pub use error::{Error, Result};
pub use keys::{RidgeLineKey, StructureKey};
pub use pitch::{plan_squares, surface_area, surface_squares, PitchRatio, MAX_RISE_PER_12};
pub use serialization::{PropertySnapshot, RidgeLineRecord, StructureRecord};
pub use structure::{FoldKind, RidgeLine, RoofStructure};
pub use totals::{PropertyMeasurementTotals, StructureSummary};
