// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Per-line filter decisions.
//!
//! A line is filtered at all only if [`filter_mask`] holds. Within filtered
//! lines, [`hev_mask`] picks the sharp-edge variant of the narrow filter,
//! [`flat_mask`] enables the 6/8-tap average and [`flat2_mask`] the 14-tap
//! one. Equality with a threshold always passes.

use super::taps::Taps;
use super::{FilterParams, FilterSize, LINES_PER_EDGE};
use crate::util::{lane_max, Pixel};

use std::array;
use std::cmp;
use std::ops::RangeInclusive;

/// Thresholds for `L` lines, scaled to the sample range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneThresholds<const L: usize> {
  /// `blimit << (bit_depth - 8)` per line.
  pub blimit: [i32; L],
  /// `limit << (bit_depth - 8)` per line.
  pub limit: [i32; L],
  /// `thresh << (bit_depth - 8)` per line.
  pub thresh: [i32; L],
  /// Largest deviation from `p0`/`q0` still considered flat.
  pub flat: i32,
  /// Saturation point of the `blimit` sum, that of the sample storage.
  pub lane_max: i32,
}

impl<const L: usize> LaneThresholds<L> {
  /// Scales `params` for storage `T` at `bit_depth`. Line `i` takes its
  /// values from `params[i / LINES_PER_EDGE]`.
  ///
  /// # Panics
  ///
  /// - If `params` has fewer than `L / LINES_PER_EDGE` entries.
  pub fn new<T: Pixel>(params: &[FilterParams], bit_depth: usize) -> Self {
    let shift = bit_depth.saturating_sub(8);
    let group = |lane: usize| params[lane / LINES_PER_EDGE];
    LaneThresholds {
      blimit: array::from_fn(|lane| i32::from(group(lane).blimit) << shift),
      limit: array::from_fn(|lane| i32::from(group(lane).limit) << shift),
      thresh: array::from_fn(|lane| i32::from(group(lane).thresh) << shift),
      flat: 1 << shift,
      lane_max: lane_max::<T>(),
    }
  }
}

/// Decision masks for `L` lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Masks<const L: usize> {
  /// The line is filtered at all.
  pub mask: [bool; L],
  /// High edge variance: the narrow filter leaves `p1`/`q1` alone.
  pub hev: [bool; L],
  /// Use the 6/8-tap average.
  pub flat: [bool; L],
  /// Use the 14-tap average.
  pub flat2: [bool; L],
}

impl<const L: usize> Masks<L> {
  /// Whether any line gets filtered.
  pub fn any(&self) -> bool {
    self.mask.iter().any(|&m| m)
  }
}

#[inline(always)]
fn diff(a: i32, b: i32) -> i32 {
  (a - b).abs()
}

/// `max(|p1 - p0|, |q1 - q0|) > thresh` per line.
pub fn hev_mask<const L: usize>(
  taps: &Taps<L>, thresh: &[i32; L],
) -> [bool; L] {
  let (p1, p0, q0, q1) = (taps.p(1), taps.p(0), taps.q(0), taps.q(1));
  array::from_fn(|i| {
    cmp::max(diff(p1[i], p0[i]), diff(q1[i], q0[i])) > thresh[i]
  })
}

/// The line is filtered when neither the cross-edge step exceeds `blimit`
/// nor any step on either side exceeds `limit`.
///
/// The cross-edge term `2 * |p0 - q0| + |p1 - q1| / 2` saturates at
/// [`LaneThresholds::lane_max`] before the comparison.
pub fn filter_mask<const L: usize>(
  taps: &Taps<L>, size: FilterSize, thr: &LaneThresholds<L>,
) -> [bool; L] {
  let n = match size {
    FilterSize::Size4 => 1,
    FilterSize::Size6 => 2,
    FilterSize::Size8 | FilterSize::Size14 => 3,
  };
  array::from_fn(|i| {
    let (p1, p0) = (taps.p(1)[i], taps.p(0)[i]);
    let (q0, q1) = (taps.q(0)[i], taps.q(1)[i]);
    let edge = cmp::min(diff(p0, q0) * 2 + diff(p1, q1) / 2, thr.lane_max);
    let step = (1..=n)
      .map(|k| {
        cmp::max(
          diff(taps.p(k)[i], taps.p(k - 1)[i]),
          diff(taps.q(k)[i], taps.q(k - 1)[i]),
        )
      })
      .fold(0, cmp::max);
    edge <= thr.blimit[i] && step <= thr.limit[i]
  })
}

fn deviation<const L: usize>(
  taps: &Taps<L>, lane: usize, ks: RangeInclusive<usize>,
) -> i32 {
  let (p0, q0) = (taps.p(0)[lane], taps.q(0)[lane]);
  ks.map(|k| cmp::max(diff(taps.p(k)[lane], p0), diff(taps.q(k)[lane], q0)))
    .fold(0, cmp::max)
}

/// Lines that pass `mask` and whose `p1..p2` (6-tap) or `p1..p3` (8/14-tap)
/// stay within `flat` of `p0`, and likewise on the `q` side.
/// Never set for the 4-tap filter.
pub fn flat_mask<const L: usize>(
  taps: &Taps<L>, size: FilterSize, flat: i32, mask: &[bool; L],
) -> [bool; L] {
  let m = match size {
    FilterSize::Size4 => return [false; L],
    FilterSize::Size6 => 2,
    FilterSize::Size8 | FilterSize::Size14 => 3,
  };
  array::from_fn(|i| mask[i] && deviation(taps, i, 1..=m) <= flat)
}

/// Lines that are already `flat` and whose `p4..p6`, `q4..q6` also stay
/// within `flat` of `p0`/`q0`. Needs a radius 7 block.
pub fn flat2_mask<const L: usize>(
  taps: &Taps<L>, flat: i32, flat_lines: &[bool; L],
) -> [bool; L] {
  debug_assert_eq!(taps.radius(), FilterSize::Size14.radius());
  array::from_fn(|i| flat_lines[i] && deviation(taps, i, 4..=6) <= flat)
}

/// All four masks for one block of lines.
pub fn compute_masks<const L: usize>(
  taps: &Taps<L>, size: FilterSize, thr: &LaneThresholds<L>,
) -> Masks<L> {
  let mask = filter_mask(taps, size, thr);
  let hev = hev_mask(taps, &thr.thresh);
  let flat = flat_mask(taps, size, thr.flat, &mask);
  let flat2 = if size == FilterSize::Size14 {
    flat2_mask(taps, thr.flat, &flat)
  } else {
    [false; L]
  };
  Masks { mask, hev, flat, flat2 }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::lpf::taps::MAX_TAPS;
  use pretty_assertions::assert_eq;

  // One line repeated over four lanes, `p` samples first.
  fn taps(line: &[i32]) -> Taps<4> {
    let mut l = [0; MAX_TAPS];
    l[..line.len()].copy_from_slice(line);
    Taps::from_lines(&[l; 4], line.len() / 2)
  }

  fn thresholds(blimit: u8, limit: u8, thresh: u8) -> LaneThresholds<4> {
    LaneThresholds::new::<u8>(&[FilterParams::new(blimit, limit, thresh)], 8)
  }

  #[test]
  fn worked_example_is_masked_off() {
    // 2 * 10 + 50 / 2 = 45 > 10
    let t = taps(&[100, 120, 130, 150]);
    let m = compute_masks(&t, FilterSize::Size4, &thresholds(10, 20, 3));
    assert!(!m.any());
    assert_eq!(m.hev, [true; 4]);
  }

  #[test]
  fn blimit_boundary() {
    // 2 * 4 + 4 / 2 = 10
    let t = taps(&[98, 100, 104, 102]);
    assert_eq!(
      filter_mask(&t, FilterSize::Size4, &thresholds(10, 10, 0)),
      [true; 4]
    );
    assert_eq!(
      filter_mask(&t, FilterSize::Size4, &thresholds(9, 10, 0)),
      [false; 4]
    );
  }

  #[test]
  fn limit_boundary() {
    // Largest inner step is |p2 - p1| = 5.
    let t = taps(&[95, 100, 101, 101, 102, 103]);
    assert_eq!(
      filter_mask(&t, FilterSize::Size6, &thresholds(255, 5, 0)),
      [true; 4]
    );
    assert_eq!(
      filter_mask(&t, FilterSize::Size6, &thresholds(255, 4, 0)),
      [false; 4]
    );
    // The 4-tap filter never looks at p2.
    let t = taps(&[100, 101, 101, 102]);
    assert_eq!(
      filter_mask(&t, FilterSize::Size4, &thresholds(255, 1, 0)),
      [true; 4]
    );
  }

  #[test]
  fn hev_boundary() {
    let t = taps(&[103, 100, 100, 100]);
    assert_eq!(hev_mask(&t, &[3; 4]), [false; 4]);
    assert_eq!(hev_mask(&t, &[2; 4]), [true; 4]);
  }

  #[test]
  fn blimit_term_saturates_at_lane_max() {
    // 2 * 255 + 255 / 2 saturates to 255, which does not exceed 255.
    let t = taps(&[0, 0, 255, 255]);
    let thr = thresholds(255, 255, 0);
    assert_eq!(filter_mask(&t, FilterSize::Size4, &thr), [true; 4]);
    let thr16 =
      LaneThresholds::<4>::new::<u16>(&[FilterParams::new(255, 255, 0)], 8);
    assert_eq!(filter_mask(&t, FilterSize::Size4, &thr16), [false; 4]);
  }

  #[test]
  fn flat_includes_p1_for_six_taps() {
    let thr = thresholds(255, 255, 0);
    let mask = [true; 4];
    let t = taps(&[100, 100, 100, 100, 100, 100]);
    assert_eq!(flat_mask(&t, FilterSize::Size6, thr.flat, &mask), [true; 4]);
    let t = taps(&[100, 102, 100, 100, 100, 100]);
    assert_eq!(flat_mask(&t, FilterSize::Size6, thr.flat, &mask), [false; 4]);
    let t = taps(&[101, 101, 100, 100, 101, 101]);
    assert_eq!(flat_mask(&t, FilterSize::Size6, thr.flat, &mask), [true; 4]);
    assert_eq!(flat_mask(&t, FilterSize::Size4, thr.flat, &mask), [false; 4]);
  }

  #[test]
  fn flat_threshold_scales_with_bit_depth() {
    let thr = LaneThresholds::<4>::new::<u16>(&[FilterParams::default()], 12);
    assert_eq!(thr.flat, 16);
    let t = taps(&[800, 800, 816, 800, 800, 800, 800, 784]);
    assert_eq!(
      flat_mask(&t, FilterSize::Size8, thr.flat, &[true; 4]),
      [true; 4]
    );
    let t = taps(&[800, 800, 817, 800, 800, 800, 800, 784]);
    assert_eq!(
      flat_mask(&t, FilterSize::Size8, thr.flat, &[true; 4]),
      [false; 4]
    );
  }

  #[test]
  fn flat2_requires_flat() {
    let t = taps(&[50; 14]);
    let flat = [true, false, true, false];
    assert_eq!(flat2_mask(&t, 1, &flat), flat);
    let mut far = [50; 14];
    far[0] = 52;
    assert_eq!(flat2_mask(&taps(&far), 1, &[true; 4]), [false; 4]);
  }

  #[test]
  fn dual_lanes_use_own_params() {
    let thr = LaneThresholds::<8>::new::<u8>(
      &[FilterParams::new(1, 2, 3), FilterParams::new(4, 5, 6)],
      10,
    );
    assert_eq!(thr.blimit, [4, 4, 4, 4, 16, 16, 16, 16]);
    assert_eq!(thr.limit[3], 8);
    assert_eq!(thr.thresh[4], 24);
    assert_eq!(thr.flat, 4);
  }
}
