// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pitch-adjusted surface area.
//!
//! Plan area is the top-down projection of a facet. A facet sloped at pitch
//! `rise/run` has a true surface area larger by `1 / cos(atan(rise / run))`.
//! Roofing material is billed in squares of 100 ft² of surface area.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::SQ_FEET_PER_SQUARE;

/// Steepest pitch accepted, as rise per 12 units of run
pub const MAX_RISE_PER_12: f64 = 24.0;

/// Roof slope as rise over run, e.g. 6-in-12
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchRatio {
    rise: f64,
    run: f64,
}

impl PitchRatio {
    /// Flat roof, 0/12
    pub const FLAT: PitchRatio = PitchRatio { rise: 0.0, run: 12.0 };

    pub fn new(rise: f64, run: f64) -> Result<Self> {
        let label = || format!("{}/{}", rise, run);
        if !rise.is_finite() || !run.is_finite() {
            return Err(Error::InvalidPitch(label(), "rise and run must be finite"));
        }
        if rise < 0.0 {
            return Err(Error::InvalidPitch(label(), "rise must not be negative"));
        }
        if run <= 0.0 {
            return Err(Error::InvalidPitch(label(), "run must be positive"));
        }
        if rise / run * 12.0 > MAX_RISE_PER_12 {
            return Err(Error::InvalidPitch(label(), "steeper than 24/12"));
        }
        Ok(Self { rise, run })
    }

    /// `rise` inches per 12 inches of run.
    pub fn per_12(rise: f64) -> Result<Self> {
        Self::new(rise, 12.0)
    }

    pub fn rise(&self) -> f64 {
        self.rise
    }

    pub fn run(&self) -> f64 {
        self.run
    }

    #[inline]
    pub fn slope(&self) -> f64 {
        self.rise / self.run
    }

    /// Surface-to-plan area factor, `1 / cos(atan(rise / run))`.
    #[inline]
    pub fn multiplier(&self) -> f64 {
        1.0 / self.slope().atan().cos()
    }

    pub fn angle_degrees(&self) -> f64 {
        self.slope().atan().to_degrees()
    }

    pub fn is_flat(&self) -> bool {
        self.rise == 0.0
    }
}

impl Default for PitchRatio {
    fn default() -> Self {
        Self::FLAT
    }
}

impl fmt::Display for PitchRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rise, self.run)
    }
}

impl FromStr for PitchRatio {
    type Err = Error;

    /// Accepts `"6/12"`, `"6:12"`, `"6 / 12"` or a bare rise `"6"` (per 12).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidPitch(s.to_string(), reason);
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty pitch"));
        }

        let (rise, run) = match trimmed.split_once(|c: char| c == '/' || c == ':') {
            Some((rise, run)) => (rise.trim(), run.trim()),
            None => (trimmed, "12"),
        };
        let rise: f64 = rise.parse().map_err(|_| invalid("rise is not a number"))?;
        let run: f64 = run.parse().map_err(|_| invalid("run is not a number"))?;

        PitchRatio::new(rise, run).map_err(|e| match e {
            Error::InvalidPitch(_, reason) => invalid(reason),
            other => other,
        })
    }
}

impl TryFrom<String> for PitchRatio {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PitchRatio> for String {
    fn from(p: PitchRatio) -> Self {
        p.to_string()
    }
}

/// True surface area for a facet with the given plan area.
///
/// Negative or non-finite plan areas are rejected, never clamped.
pub fn surface_area(plan_area_sqft: f64, pitch: PitchRatio) -> Result<f64> {
    validate_area(plan_area_sqft)?;
    Ok(apply_pitch(plan_area_sqft, pitch))
}

/// `surface_area` for an area already known to be valid.
pub(crate) fn apply_pitch(plan_area_sqft: f64, pitch: PitchRatio) -> f64 {
    if pitch.is_flat() {
        return plan_area_sqft;
    }
    plan_area_sqft * pitch.multiplier()
}

/// Plan area expressed in roofing squares.
#[inline]
pub fn plan_squares(plan_area_sqft: f64) -> f64 {
    plan_area_sqft / SQ_FEET_PER_SQUARE
}

/// Surface area expressed in roofing squares.
#[inline]
pub fn surface_squares(surface_area_sqft: f64) -> f64 {
    surface_area_sqft / SQ_FEET_PER_SQUARE
}

pub(crate) fn validate_area(area: f64) -> Result<()> {
    if area.is_finite() && area >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArea(area))
    }
}
