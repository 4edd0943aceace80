// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metric to imperial conversion for take-off quantities.

/// Feet in one meter (exact, international foot)
pub const FEET_PER_METER: f64 = 1.0 / 0.3048;

/// Square feet in one square meter
pub const SQ_FEET_PER_SQ_METER: f64 = FEET_PER_METER * FEET_PER_METER;

/// Square feet in one roofing square
pub const SQ_FEET_PER_SQUARE: f64 = 100.0;

#[inline]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

#[inline]
pub fn sq_meters_to_sq_feet(sq_meters: f64) -> f64 {
    sq_meters * SQ_FEET_PER_SQ_METER
}

#[inline]
pub fn sq_feet_to_sq_meters(sq_feet: f64) -> f64 {
    sq_feet / SQ_FEET_PER_SQ_METER
}
