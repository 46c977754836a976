// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use itertools::Itertools;
use smallvec::SmallVec;

pub type SVec<T> = SmallVec<[T; 4]>;
pub type SVecN<T, const N: usize> = SmallVec<[T; N]>;

pub trait IteratorUtils: Iterator {
    fn collect_svec(self) -> SVec<Self::Item>
    where
        Self: Sized,
    {
        self.collect()
    }
}

impl<T: ?Sized> IteratorUtils for T where T: Iterator {}

/// Rotates the given iterator by shifting all elements `shift` positions
/// forward. Any elements that would be out of bounds are instead put at the
/// beginning.
///
/// This method requires passing the `len` as a separate parameter. This is
/// often known beforehand or can be found by calling .size_hint() for an
/// ExactSizeIterator.
pub fn rotate_iter<T>(
    it: impl Iterator<Item = T> + Clone,
    shift: usize,
    len: usize,
) -> impl Iterator<Item = T> {
    it.cycle().dropping(shift).take(len)
}

pub trait SliceUtils<T> {
    /// Same as .iter().copied(), but doesn't trigger rustfmt line breaks
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>>;
}

impl<T: Copy> SliceUtils<T> for [T] {
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>> {
        self.iter().copied()
    }
}

/// Cyclic successor of index `i` in a ring of length `len`.
pub fn succ(i: usize, len: usize) -> usize {
    succ_n(i, len, 1)
}

/// Cyclic successor of `i`, `steps` positions forward.
pub fn succ_n(i: usize, len: usize, steps: usize) -> usize {
    (i + steps) % len
}

/// Cyclic predecessor of index `i` in a ring of length `len`.
pub fn pred(i: usize, len: usize) -> usize {
    pred_n(i, len, 1)
}

/// Cyclic predecessor of `i`, `steps` positions backward.
pub fn pred_n(i: usize, len: usize, steps: usize) -> usize {
    (i + len - steps % len) % len
}

#[test]
pub fn test_ring_indices() {
    assert_eq!(succ(3, 4), 0);
    assert_eq!(succ_n(3, 4, 2), 1);
    assert_eq!(pred(0, 4), 3);
    assert_eq!(pred_n(1, 4, 2), 3);
    assert_eq!(pred_n(1, 4, 5), 0);

    assert_eq!(
        rotate_iter([1, 2, 3, 4].into_iter(), 2, 4).collect_vec(),
        &[3, 4, 1, 2]
    );
}
