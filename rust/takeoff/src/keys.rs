// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena keys for take-off records.
//!
//! Keys come from `slotmap::SlotMap` and stay valid (or detectably stale)
//! after other records are removed.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a roof structure.
    pub struct StructureKey;

    /// Key for a ridge line.
    pub struct RidgeLineKey;
}
