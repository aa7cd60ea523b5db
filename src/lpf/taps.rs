// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Samples straddling an edge, gathered into lane arrays.

use crate::util::{CastFromPrimitive, Pixel};

/// Most samples read across one edge, by the 14-tap filter.
pub const MAX_TAPS: usize = 14;

/// The `2 * radius` samples across an edge for `L` lines, widened to `i32`.
///
/// Storage is tap-major: `tap(0)` is the farthest `p` sample and
/// `tap(2 * radius - 1)` the farthest `q` sample, each holding one value
/// per line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Taps<const L: usize> {
  radius: usize,
  x: [[i32; L]; MAX_TAPS],
}

impl<const L: usize> Taps<L> {
  /// An all-zero block covering `radius` samples per side.
  ///
  /// # Panics
  ///
  /// - If `radius` is zero or more than `MAX_TAPS / 2`.
  pub(crate) fn new(radius: usize) -> Self {
    assert!(radius > 0 && 2 * radius <= MAX_TAPS);
    Taps { radius, x: [[0; L]; MAX_TAPS] }
  }

  /// Builds a block from per-line sample vectors, `p` samples first.
  /// Entries past `2 * radius` are ignored.
  #[cfg(test)]
  pub(crate) fn from_lines(
    lines: &[[i32; MAX_TAPS]; L], radius: usize,
  ) -> Self {
    let mut taps = Self::new(radius);
    for (lane, line) in lines.iter().enumerate() {
      for (j, tap) in taps.x[..2 * radius].iter_mut().enumerate() {
        tap[lane] = line[j];
      }
    }
    taps
  }

  /// Gathers `radius` samples on each side of the edge whose first `q0`
  /// sample is `src[offset]`.
  ///
  /// Successive taps are `tap_step` apart, successive lines `line_step`.
  pub fn load<T: Pixel>(
    src: &[T], offset: usize, tap_step: usize, line_step: usize,
    radius: usize,
  ) -> Self {
    let mut taps = Self::new(radius);
    let start = offset - radius * tap_step;
    for (j, tap) in taps.x[..2 * radius].iter_mut().enumerate() {
      let base = start + j * tap_step;
      for (lane, v) in tap.iter_mut().enumerate() {
        *v = i32::cast_from(src[base + lane * line_step]);
      }
    }
    taps
  }

  /// Writes back the `reach` samples nearest to the edge on each side.
  ///
  /// The layout arguments match [`Taps::load`].
  pub fn store<T: Pixel>(
    &self, dst: &mut [T], offset: usize, tap_step: usize, line_step: usize,
    reach: usize,
  ) {
    debug_assert!(reach <= self.radius);
    let start = offset - reach * tap_step;
    let first = self.radius - reach;
    for (j, tap) in self.x[first..self.radius + reach].iter().enumerate() {
      let base = start + j * tap_step;
      for (lane, &v) in tap.iter().enumerate() {
        dst[base + lane * line_step] = T::cast_from(v);
      }
    }
  }

  /// Samples read on each side of the edge.
  #[inline(always)]
  pub const fn radius(&self) -> usize {
    self.radius
  }

  /// The `j`-th tap counted from the farthest `p` sample.
  #[inline(always)]
  pub fn tap(&self, j: usize) -> &[i32; L] {
    &self.x[j]
  }

  #[inline(always)]
  pub(crate) fn tap_mut(&mut self, j: usize) -> &mut [i32; L] {
    &mut self.x[j]
  }

  /// `p[k]`, the `k`-th sample before the edge.
  #[inline(always)]
  pub fn p(&self, k: usize) -> &[i32; L] {
    &self.x[self.radius - 1 - k]
  }

  /// `q[k]`, the `k`-th sample after the edge.
  #[inline(always)]
  pub fn q(&self, k: usize) -> &[i32; L] {
    &self.x[self.radius + k]
  }

  #[inline(always)]
  pub(crate) fn p_mut(&mut self, k: usize) -> &mut [i32; L] {
    &mut self.x[self.radius - 1 - k]
  }

  #[inline(always)]
  pub(crate) fn q_mut(&mut self, k: usize) -> &mut [i32; L] {
    &mut self.x[self.radius + k]
  }

  /// The samples of one line, `p` samples first.
  #[cfg(test)]
  pub(crate) fn line(&self, lane: usize) -> [i32; MAX_TAPS] {
    let mut line = [0; MAX_TAPS];
    for (v, tap) in line.iter_mut().zip(&self.x[..2 * self.radius]) {
      *v = tap[lane];
    }
    line
  }
}
