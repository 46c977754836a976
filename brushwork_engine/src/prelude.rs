// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub use anyhow::{anyhow, bail, Context, Result};

pub use glam::Vec3;

pub use itertools::Itertools;
pub use std::collections::{BTreeMap, HashMap, HashSet};

pub use crate::brush;
pub use crate::brush::*;

pub use brushwork_commons::math::*;
pub use brushwork_commons::utils::*;
