// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Edge filters over lane blocks.

use super::mask::Masks;
use super::taps::Taps;
use super::FilterSize;
use crate::util::clamp;

use arrayvec::ArrayVec;
use std::array;

/// Most samples written by one filter, `op5..oq5`.
pub const MAX_OUTPUTS: usize = 12;

/// Filtered samples for each output position, nearest `p` sample last on
/// the `p` side: `[op(n-1), .., op0, oq0, .., oq(n-1)]`.
pub type FilterOutput<const L: usize> = ArrayVec<[i32; L], MAX_OUTPUTS>;

// A weighted box average evaluated as a running sum. `first` weights the
// window for the outermost output; each step then drops two taps and adds
// two. Indices are relative to the window, which starts `radius` samples
// before the edge.
struct BoxFilter {
  radius: usize,
  reach: usize,
  shift: u32,
  first: &'static [i32],
  steps: &'static [[usize; 4]],
}

const FILTER6: BoxFilter = BoxFilter {
  radius: 3,
  reach: 2,
  shift: 3,
  first: &[3, 2, 2, 1],
  steps: &[[0, 0, 3, 4], [0, 1, 4, 5], [1, 2, 5, 5]],
};

const FILTER8: BoxFilter = BoxFilter {
  radius: 4,
  reach: 3,
  shift: 3,
  first: &[3, 2, 1, 1, 1],
  steps: &[
    [0, 1, 2, 5],
    [0, 2, 3, 6],
    [0, 3, 4, 7],
    [1, 4, 5, 7],
    [2, 5, 6, 7],
  ],
};

const FILTER14: BoxFilter = BoxFilter {
  radius: 7,
  reach: 6,
  shift: 4,
  first: &[7, 2, 2, 1, 1, 1, 1, 1],
  steps: &[
    [0, 0, 3, 8],
    [0, 1, 4, 9],
    [0, 2, 5, 10],
    [0, 3, 6, 11],
    [0, 4, 7, 12],
    [0, 5, 8, 13],
    [1, 6, 9, 13],
    [2, 7, 10, 13],
    [3, 8, 11, 13],
    [4, 9, 12, 13],
    [5, 10, 13, 13],
  ],
};

impl BoxFilter {
  fn run<const L: usize>(&self, taps: &Taps<L>) -> FilterOutput<L> {
    debug_assert!(taps.radius() >= self.radius);
    let base = taps.radius() - self.radius;
    let x = |j: usize| taps.tap(base + j);
    let shift = self.shift;

    let mut sum = [1 << (shift - 1); L];
    for (j, &w) in self.first.iter().enumerate() {
      for (s, &v) in sum.iter_mut().zip(x(j)) {
        *s += w * v;
      }
    }

    let mut out = FilterOutput::new();
    out.push(sum.map(|s| s >> shift));
    for &[s0, s1, a0, a1] in self.steps {
      for i in 0..L {
        sum[i] += x(a0)[i] + x(a1)[i] - x(s0)[i] - x(s1)[i];
      }
      out.push(sum.map(|s| s >> shift));
    }
    debug_assert_eq!(out.len(), 2 * self.reach);
    out
  }

  // Replaces the selected lines of `dst` with this filter's average of
  // `src`.
  fn blend<const L: usize>(
    &self, dst: &mut Taps<L>, src: &Taps<L>, select: &[bool; L],
  ) {
    if !select.iter().any(|&s| s) {
      return;
    }
    let first = dst.radius() - self.reach;
    for (j, avg) in self.run(src).iter().enumerate() {
      let tap = dst.tap_mut(first + j);
      for i in 0..L {
        if select[i] {
          tap[i] = avg[i];
        }
      }
    }
  }
}

/// The narrow filter, adjusting at most `p1..q1`.
///
/// Returns `[op1, op0, oq0, oq1]`. Lines outside `masks.mask` come back
/// unchanged, lines in `masks.hev` keep their `p1` and `q1`.
pub fn filter4<const L: usize>(
  taps: &Taps<L>, masks: &Masks<L>, bit_depth: usize,
) -> [[i32; L]; 4] {
  let bias = 1 << (bit_depth - 1);
  let sclamp = |v: i32| clamp(v, -bias, bias - 1);

  let mut out = [[0; L]; 4];
  for i in 0..L {
    let ps1 = taps.p(1)[i] - bias;
    let ps0 = taps.p(0)[i] - bias;
    let qs0 = taps.q(0)[i] - bias;
    let qs1 = taps.q(1)[i] - bias;

    let f = if masks.hev[i] { sclamp(ps1 - qs1) } else { 0 };
    let f = if masks.mask[i] { sclamp(f + 3 * (qs0 - ps0)) } else { 0 };
    let filter1 = sclamp(f + 4) >> 3;
    let filter2 = sclamp(f + 3) >> 3;
    out[1][i] = sclamp(ps0 + filter2) + bias;
    out[2][i] = sclamp(qs0 - filter1) + bias;

    let side = if masks.hev[i] { 0 } else { (filter1 + 1) >> 1 };
    out[0][i] = sclamp(ps1 + side) + bias;
    out[3][i] = sclamp(qs1 - side) + bias;
  }
  out
}

/// `[op1, op0, oq0, oq1]` from the 6-tap average over `p2..q2`.
pub fn filter6<const L: usize>(taps: &Taps<L>) -> FilterOutput<L> {
  FILTER6.run(taps)
}

/// `[op2, .., oq2]` from the 8-tap average over `p3..q3`.
pub fn filter8<const L: usize>(taps: &Taps<L>) -> FilterOutput<L> {
  FILTER8.run(taps)
}

/// `[op5, .., oq5]` from the 14-tap average over `p6..q6`.
pub fn filter14<const L: usize>(taps: &Taps<L>) -> FilterOutput<L> {
  FILTER14.run(taps)
}

/// Filters a block of lines with the given decisions.
///
/// Every sample ends up with the result of the finest filter its line
/// qualifies for: the 14-tap average under `flat2`, the 6/8-tap average
/// under `flat`, otherwise the narrow filter.
pub fn apply_filters<const L: usize>(
  taps: &Taps<L>, masks: &Masks<L>, size: FilterSize, bit_depth: usize,
) -> Taps<L> {
  let mut out = *taps;
  let [op1, op0, oq0, oq1] = filter4(taps, masks, bit_depth);
  *out.p_mut(1) = op1;
  *out.p_mut(0) = op0;
  *out.q_mut(0) = oq0;
  *out.q_mut(1) = oq1;

  let flat: [bool; L] = array::from_fn(|i| masks.mask[i] && masks.flat[i]);
  match size {
    FilterSize::Size4 => {}
    FilterSize::Size6 => FILTER6.blend(&mut out, taps, &flat),
    FilterSize::Size8 => FILTER8.blend(&mut out, taps, &flat),
    FilterSize::Size14 => {
      let flat2: [bool; L] = array::from_fn(|i| flat[i] && masks.flat2[i]);
      FILTER8.blend(&mut out, taps, &flat);
      FILTER14.blend(&mut out, taps, &flat2);
    }
  }
  out
}
