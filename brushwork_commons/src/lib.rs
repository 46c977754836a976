// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Math helpers shared across the workspace
pub mod math;

/// Collection and iterator utilities
pub mod utils;
