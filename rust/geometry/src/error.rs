// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating measurement geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid coordinate: ({lon}, {lat})")]
    InvalidCoordinate { lon: f64, lat: f64 },

    #[error("Line segment '{id}' has {count} point(s), at least 2 are required")]
    TooFewPoints { id: String, count: usize },

    #[error("Ring has {0} distinct vertices, at least 3 are required")]
    DegenerateRing(usize),

    #[error("Invalid classifier configuration: {0}")]
    InvalidClassifier(String),
}
