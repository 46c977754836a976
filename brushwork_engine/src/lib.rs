// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// Planes, rays, bounding boxes and the kernel's tolerance constants
pub mod math;

/// The brush boundary representation and its edit operations
pub mod brush;

#[cfg(test)]
mod brush_tests;
