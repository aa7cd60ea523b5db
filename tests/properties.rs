// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use av1_deblock::prelude::*;
use quickcheck::quickcheck;

const BIT_DEPTHS: [usize; 3] = [8, 10, 12];

fn pick_size(i: u8) -> FilterSize {
  FilterSize::ALL[usize::from(i) % FilterSize::ALL.len()]
}

fn pick_bit_depth(i: u8) -> usize {
  BIT_DEPTHS[usize::from(i) % BIT_DEPTHS.len()]
}

// Rows of `width` samples, filled by cycling `seed` and masked to the
// bit depth.
fn block(seed: &[u16], width: usize, rows: usize, bd: usize) -> Vec<u16> {
  let max = (1u16 << bd) - 1;
  if seed.is_empty() {
    return vec![0; width * rows];
  }
  seed.iter().cycle().take(width * rows).map(|&v| v & max).collect()
}

quickcheck! {
  fn samples_stay_in_range(
    seed: Vec<u16>, blimit: u8, limit: u8, thresh: u8, size: u8, bd: u8
  ) -> bool {
    let (size, bd) = (pick_size(size), pick_bit_depth(bd));
    let r = size.radius();
    let params = [
      FilterParams::new(blimit, limit, thresh),
      FilterParams::new(thresh, blimit, limit),
    ];
    let mut buf = block(&seed, 2 * r, 8, bd);
    let before = buf.clone();
    lpf_vertical_dual(&mut buf, r, 2 * r, size, params, bd);

    // Samples beyond the reach of the filter are never written.
    let (lo, hi) = (r - size.reach(), r + size.reach());
    buf.iter().all(|&v| v < (1 << bd))
      && buf.chunks(2 * r).zip(before.chunks(2 * r)).all(|(a, b)| {
        a[..lo] == b[..lo] && a[hi..] == b[hi..]
      })
  }

  fn constant_block_is_fixed_point(
    v: u16, blimit: u8, limit: u8, thresh: u8, size: u8, bd: u8
  ) -> bool {
    let (size, bd) = (pick_size(size), pick_bit_depth(bd));
    let r = size.radius();
    let params = FilterParams::new(blimit, limit, thresh);
    let mut buf = block(&[v], 4, 2 * r, bd);
    let before = buf.clone();
    lpf_horizontal(&mut buf, r * 4, 4, size, params, bd);
    buf == before
  }

  fn dual_matches_two_singles(
    seed: Vec<u16>, a: (u8, u8, u8), b: (u8, u8, u8), size: u8, bd: u8
  ) -> bool {
    let (size, bd) = (pick_size(size), pick_bit_depth(bd));
    let r = size.radius();
    let params =
      [FilterParams::new(a.0, a.1, a.2), FilterParams::new(b.0, b.1, b.2)];
    let mut dual = block(&seed, 8, 2 * r, bd);
    let mut single = dual.clone();
    lpf_horizontal_dual(&mut dual, r * 8, 8, size, params, bd);
    lpf_horizontal(&mut single, r * 8, 8, size, params[0], bd);
    lpf_horizontal(&mut single, r * 8 + 4, 8, size, params[1], bd);
    dual == single
  }

  fn orientations_agree(
    seed: Vec<u16>, blimit: u8, limit: u8, thresh: u8, size: u8, bd: u8
  ) -> bool {
    let (size, bd) = (pick_size(size), pick_bit_depth(bd));
    let r = size.radius();
    let params = FilterParams::new(blimit, limit, thresh);
    // 4 rows of 2r columns against its transpose, 2r rows of 4 columns.
    let mut rows = block(&seed, 2 * r, 4, bd);
    let mut cols: Vec<u16> =
      (0..2 * r * 4).map(|i| rows[(i % 4) * 2 * r + i / 4]).collect();
    lpf_edge(&mut rows, r, 2 * r, Orientation::Vertical, size, params, bd);
    lpf_edge(&mut cols, r * 4, 4, Orientation::Horizontal, size, params, bd);
    (0..2 * r * 4).all(|i| cols[i] == rows[(i % 4) * 2 * r + i / 4])
  }

  fn plane_apply_matches_kernel(seed: Vec<u8>, blimit: u8, limit: u8) -> bool {
    let ctx: DeblockContext<u8> = match DeblockConfig::new(8).new_context() {
      Ok(ctx) => ctx,
      Err(_) => return false,
    };
    let mut plane = Plane::<u8>::new(16, 16, 0, 0, 0, 0);
    let stride = plane.cfg.stride;
    if !seed.is_empty() {
      let data = plane.data_origin_mut();
      for (i, &v) in seed.iter().cycle().take(16 * 16).enumerate() {
        data[(i / 16) * stride + i % 16] = v;
      }
    }
    let mut expected = plane.clone();
    let params = FilterParams::new(blimit, limit, 0);
    let edges = [
      Edge::vertical(8, 0, FilterSize::Size14, params),
      Edge::vertical(8, 4, FilterSize::Size14, params),
      Edge::horizontal(8, 8, FilterSize::Size6, params),
    ];
    if ctx.apply(&mut plane, &edges).is_err() {
      return false;
    }
    let data = expected.data_origin_mut();
    lpf_vertical_dual(data, 8, stride, FilterSize::Size14, [params; 2], 8);
    lpf_horizontal(data, 8 * stride + 8, stride, FilterSize::Size6, params, 8);
    plane.data_origin() == expected.data_origin()
  }
}

#[test]
fn context_and_errors() -> Result<(), Box<dyn std::error::Error>> {
  assert_eq!(
    DeblockConfig::new(9).new_context::<u16>().err(),
    Some(InvalidConfig::InvalidBitDepth(9))
  );

  let ctx: DeblockContext<u16> = DeblockConfig::new(12).new_context()?;
  let mut plane = Plane::<u16>::new(64, 64, 0, 0, 16, 16);
  let params = FilterParams::new(255, 255, 255);
  let bad = [Edge::horizontal(6, 8, FilterSize::Size4, params)];
  assert_eq!(
    ctx.apply(&mut plane, &bad),
    Err(EdgeError::Misaligned { x: 6, y: 8 })
  );

  let edges: Vec<Edge> = (1..16)
    .flat_map(|i| {
      (0..16).map(move |j| {
        Edge::vertical(4 * i, 4 * j, FilterSize::Size4, params)
      })
    })
    .collect();
  let summary = ctx.apply(&mut plane, &edges)?;
  assert_eq!(summary.vertical, CallCount { single: 0, dual: 15 * 8 });
  assert_eq!(summary.horizontal, CallCount::default());
  Ok(())
}
