// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Add, Mul, Sub};

use float_ord::FloatOrd;

/// A `glam::Vec3` wrapper that is `Ord` and `Hash`, so vertex positions can
/// key maps and sets. Ordering is lexicographic over the three coordinates,
/// which makes position-keyed iteration (snap targets, correction sweeps)
/// deterministic regardless of arena order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vec3Ord([FloatOrd<f32>; 3]);

pub trait ToOrd<T>
where
    T: Eq + PartialEq + Ord + PartialOrd + std::hash::Hash + Copy,
{
    fn to_ord(&self) -> T;
}

impl ToOrd<Vec3Ord> for glam::Vec3 {
    fn to_ord(&self) -> Vec3Ord {
        Vec3Ord([FloatOrd(self.x), FloatOrd(self.y), FloatOrd(self.z)])
    }
}

pub trait ToVec<T> {
    fn to_vec(&self) -> T;
}

impl ToVec<glam::Vec3> for Vec3Ord {
    fn to_vec(&self) -> glam::Vec3 {
        glam::Vec3::new(self.0[0].0, self.0[1].0, self.0[2].0)
    }
}

/// Interpolates between `start` and `end`. `t` is not clamped; movers pass
/// fractions in `(0, 1]` by construction.
pub fn lerp<T>(start: T, end: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    start + (end - start) * t
}

#[test]
pub fn test_ordered_positions() {
    use glam::Vec3;

    let mut positions = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 5.0, 5.0),
        Vec3::new(1.0, -2.0, 3.0),
    ]
    .map(|p| p.to_ord());
    positions.sort();

    assert_eq!(positions[0].to_vec(), Vec3::new(-1.0, 5.0, 5.0));
    assert_eq!(positions[1].to_vec(), Vec3::new(1.0, -2.0, 3.0));
    assert_eq!(positions[2].to_vec(), Vec3::new(1.0, 0.0, 0.0));

    assert_eq!(lerp(Vec3::ZERO, Vec3::new(0.0, 0.0, 64.0), 0.25).z, 16.0);
}
