// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for take-off operations.

use crate::keys::RidgeLineKey;

/// Result type alias for take-off operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised for structurally invalid input.
///
/// Degenerate geometry found during extraction is never an error; only
/// input a caller could have validated ends up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid geometry (bad coordinates, too few points).
    #[error(transparent)]
    Geometry(#[from] roof_lite_geometry::Error),

    /// Pitch ratio could not be parsed or is out of range.
    #[error("invalid pitch '{0}': {1}")]
    InvalidPitch(String, &'static str),

    /// Area was negative or not a finite number.
    #[error("invalid area: {0}")]
    InvalidArea(f64),

    /// Confidence must lie in [0, 1].
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    /// Structure labels must be non-empty.
    #[error("structure label must not be empty")]
    EmptyLabel,

    /// No structure with this label exists.
    #[error("structure not found: {0}")]
    StructureNotFound(String),

    /// Ridge line key not found in the arena.
    #[error("ridge line not found: {0:?}")]
    RidgeLineNotFound(RidgeLineKey),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
