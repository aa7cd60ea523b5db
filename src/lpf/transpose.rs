// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Block transposition for vertical edges.

/// Copies the `rows x cols` block at the start of `src` into `dst`
/// transposed, so that `dst[c * dst_stride + r] = src[r * src_stride + c]`.
///
/// # Panics
///
/// - If either buffer is too short for the block at its stride.
pub fn transpose<T: Copy>(
  src: &[T], src_stride: usize, rows: usize, cols: usize, dst: &mut [T],
  dst_stride: usize,
) {
  for (r, row) in src.chunks(src_stride).take(rows).enumerate() {
    for (c, &v) in row[..cols].iter().enumerate() {
      dst[c * dst_stride + r] = v;
    }
  }
}
