// Copyright (c) 2017-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

mod align;

pub use self::align::*;
pub use v_frame::math::clamp;
pub use v_frame::pixel::*;

use num_traits::Bounded;

/// Largest value an unsigned lane of the pixel's storage width can hold.
///
/// Sums that the vectorized kernels accumulate with unsigned saturating
/// adds stop here.
#[inline(always)]
pub fn lane_max<T: Pixel>() -> i32 {
  i32::cast_from(<T as Bounded>::max_value())
}
