// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Edge filter kernels.
//!
//! Every entry point takes a sample buffer, the index of the first `q0`
//! sample of the edge and the row stride. `p` samples sit at negative
//! multiples of the tap step from there: `stride` for a horizontal edge,
//! `1` for a vertical one. A single call filters [`LINES_PER_EDGE`] lines,
//! a dual call twice as many, each half with its own [`FilterParams`].
//!
//! None of the kernels validate their input. The buffer must hold
//! [`FilterSize::radius`] samples on both sides of the edge for every line
//! and `bit_depth` must be 8, 10 or 12; a short buffer panics on indexing,
//! an unsupported bit depth produces unspecified output.

pub mod filter;
pub mod mask;
pub mod taps;
pub mod transpose;

use crate::util::{Aligned, Pixel};

use self::filter::apply_filters;
use self::mask::{compute_masks, LaneThresholds};
use self::taps::{Taps, MAX_TAPS};
use self::transpose::transpose;

use std::convert::TryFrom;
use thiserror::Error;

/// Number of lines filtered by a single (non-dual) call.
pub const LINES_PER_EDGE: usize = 4;

/// Width of the scratch block vertical edges are transposed into.
const SCRATCH_STRIDE: usize = 16;

/// Per-edge filter strength, as raw 8-bit magnitudes.
///
/// The values are rescaled to the sample range internally, so the same
/// bytes are passed regardless of bit depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterParams {
  /// Limit on `2 * |p0 - q0| + |p1 - q1| / 2` across the edge.
  pub blimit: u8,
  /// Limit on the step between neighbouring samples on either side.
  pub limit: u8,
  /// High edge variance threshold.
  pub thresh: u8,
}

impl FilterParams {
  /// Bundles the three strength bytes.
  pub const fn new(blimit: u8, limit: u8, thresh: u8) -> Self {
    FilterParams { blimit, limit, thresh }
  }
}

/// Filter width class, named after the number of taps it reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterSize {
  /// Narrow filter, `p1..q1`. Chroma and luma.
  Size4 = 4,
  /// `p2..q2`, writes `p1..q1`. Chroma only.
  Size6 = 6,
  /// `p3..q3`, writes `p2..q2`. Luma only.
  Size8 = 8,
  /// `p6..q6`, writes `p5..q5`. Luma only.
  Size14 = 14,
}

impl FilterSize {
  /// All sizes, narrowest first.
  pub const ALL: [FilterSize; 4] = [
    FilterSize::Size4,
    FilterSize::Size6,
    FilterSize::Size8,
    FilterSize::Size14,
  ];

  /// Number of samples read across the edge.
  pub const fn taps(self) -> usize {
    self as usize
  }

  /// Number of samples read on each side of the edge.
  pub const fn radius(self) -> usize {
    match self {
      FilterSize::Size4 => 2,
      FilterSize::Size6 => 3,
      FilterSize::Size8 => 4,
      FilterSize::Size14 => 7,
    }
  }

  /// Number of samples that may be modified on each side of the edge.
  pub const fn reach(self) -> usize {
    match self {
      FilterSize::Size4 | FilterSize::Size6 => 2,
      FilterSize::Size8 => 3,
      FilterSize::Size14 => 6,
    }
  }
}

/// Error returned when converting an unsupported tap count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid filter size {0} (expected 4, 6, 8 or 14)")]
pub struct InvalidFilterSize(pub usize);

impl TryFrom<usize> for FilterSize {
  type Error = InvalidFilterSize;

  fn try_from(taps: usize) -> Result<Self, Self::Error> {
    match taps {
      4 => Ok(FilterSize::Size4),
      6 => Ok(FilterSize::Size6),
      8 => Ok(FilterSize::Size8),
      14 => Ok(FilterSize::Size14),
      _ => Err(InvalidFilterSize(taps)),
    }
  }
}

/// Direction of the edge itself.
///
/// A horizontal edge separates a block from the one above it and is
/// filtered along columns; a vertical edge separates a block from its left
/// neighbour and is filtered along rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
  /// Edge between vertically adjacent blocks.
  Horizontal,
  /// Edge between horizontally adjacent blocks.
  Vertical,
}

/// Filters a horizontal edge over the four columns starting at `offset`.
pub fn lpf_horizontal<T: Pixel>(
  dst: &mut [T], offset: usize, stride: usize, size: FilterSize,
  params: FilterParams, bit_depth: usize,
) {
  let thr = LaneThresholds::<LINES_PER_EDGE>::new::<T>(&[params], bit_depth);
  filter_lanes(dst, offset, stride, 1, size, &thr, bit_depth);
}

/// Filters two horizontally adjacent horizontal edges in one pass.
///
/// Columns `offset..offset + 4` use `params[0]`, the next four `params[1]`.
/// The result is identical to two [`lpf_horizontal`] calls.
pub fn lpf_horizontal_dual<T: Pixel>(
  dst: &mut [T], offset: usize, stride: usize, size: FilterSize,
  params: [FilterParams; 2], bit_depth: usize,
) {
  let thr =
    LaneThresholds::<{ 2 * LINES_PER_EDGE }>::new::<T>(&params, bit_depth);
  filter_lanes(dst, offset, stride, 1, size, &thr, bit_depth);
}

/// Filters a vertical edge over the four rows starting at `offset`.
pub fn lpf_vertical<T: Pixel>(
  dst: &mut [T], offset: usize, stride: usize, size: FilterSize,
  params: FilterParams, bit_depth: usize,
) {
  let thr = LaneThresholds::<LINES_PER_EDGE>::new::<T>(&[params], bit_depth);
  filter_transposed(dst, offset, stride, size, &thr, bit_depth);
}

/// Filters two vertically adjacent vertical edges in one pass.
///
/// Rows starting at `offset` use `params[0]` for four rows, then
/// `params[1]`. The result is identical to two [`lpf_vertical`] calls.
pub fn lpf_vertical_dual<T: Pixel>(
  dst: &mut [T], offset: usize, stride: usize, size: FilterSize,
  params: [FilterParams; 2], bit_depth: usize,
) {
  let thr =
    LaneThresholds::<{ 2 * LINES_PER_EDGE }>::new::<T>(&params, bit_depth);
  filter_transposed(dst, offset, stride, size, &thr, bit_depth);
}

/// Filters a single edge of either orientation.
pub fn lpf_edge<T: Pixel>(
  dst: &mut [T], offset: usize, stride: usize, orientation: Orientation,
  size: FilterSize, params: FilterParams, bit_depth: usize,
) {
  match orientation {
    Orientation::Horizontal => {
      lpf_horizontal(dst, offset, stride, size, params, bit_depth)
    }
    Orientation::Vertical => {
      lpf_vertical(dst, offset, stride, size, params, bit_depth)
    }
  }
}

/// Runs the full filter over `L` lines laid out with `tap_step` between
/// consecutive taps and `line_step` between consecutive lines.
///
/// Returns whether any line passed the filter mask; when none does the
/// buffer is left untouched.
pub(crate) fn filter_lanes<T: Pixel, const L: usize>(
  dst: &mut [T], offset: usize, tap_step: usize, line_step: usize,
  size: FilterSize, thr: &LaneThresholds<L>, bit_depth: usize,
) -> bool {
  let taps = Taps::<L>::load(dst, offset, tap_step, line_step, size.radius());
  let masks = compute_masks(&taps, size, thr);
  if !masks.any() {
    return false;
  }
  let out = apply_filters(&taps, &masks, size, bit_depth);
  out.store(dst, offset, tap_step, line_step, size.reach());
  true
}

// Vertical edges go through a transposed copy so they share the horizontal
// kernel: each line becomes a column of the scratch block.
fn filter_transposed<T: Pixel, const L: usize>(
  dst: &mut [T], offset: usize, stride: usize, size: FilterSize,
  thr: &LaneThresholds<L>, bit_depth: usize,
) {
  let radius = size.radius();
  let width = 2 * radius;
  let start = offset - radius;
  let mut scratch: Aligned<[T; SCRATCH_STRIDE * MAX_TAPS]> =
    Aligned::new([T::zero(); SCRATCH_STRIDE * MAX_TAPS]);

  transpose(&dst[start..], stride, L, width, &mut scratch[..], SCRATCH_STRIDE);
  let filtered = filter_lanes(
    &mut scratch[..],
    radius * SCRATCH_STRIDE,
    SCRATCH_STRIDE,
    1,
    size,
    thr,
    bit_depth,
  );
  if filtered {
    let dst = &mut dst[start..];
    transpose(&scratch[..], SCRATCH_STRIDE, width, L, dst, stride);
  }
}
