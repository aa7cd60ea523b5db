// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! AV1 in-loop deblocking filter.
//!
//! The [`lpf`] module holds the pixel kernels: the 4, 6, 8 and 14 tap edge
//! filters for horizontal and vertical edges, single (four lines) or dual
//! (eight lines), over `u8` or `u16` samples at 8, 10 or 12 bits.
//! The kernels trust their caller: which edges get filtered, and with which
//! `blimit`/`limit`/`thresh`, is decided elsewhere.
//!
//! [`deblock`] applies a list of such edges to a whole
//! [`Plane`](v_frame::plane::Plane), batching neighbours into dual calls and
//! running the vertical pass on a thread pool.
//!
//! # Examples
//!
//! ```
//! use av1_deblock::prelude::*;
//!
//! // 8 rows of 4 columns, horizontal edge between rows 3 and 4.
//! let mut rows = vec![0u8; 4 * 8];
//! for (i, row) in rows.chunks_mut(4).enumerate() {
//!   row.fill(if i < 4 { 60 } else { 64 });
//! }
//! let params = FilterParams::new(40, 10, 2);
//! lpf_horizontal(&mut rows, 4 * 4, 4, FilterSize::Size8, params, 8);
//! assert_eq!(&rows[3 * 4..5 * 4], &[62, 62, 62, 62, 63, 63, 63, 63]);
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate log;

pub mod config;
pub mod deblock;
pub mod lpf;

mod util;

pub use crate::config::{DeblockConfig, InvalidConfig};
pub use crate::deblock::{
  check_edge, CallCount, DeblockContext, Edge, EdgeError, PassSummary,
};

/// Commonly used types and functions.
pub mod prelude {
  pub use crate::config::*;
  pub use crate::deblock::*;
  pub use crate::lpf::{
    lpf_edge, lpf_horizontal, lpf_horizontal_dual, lpf_vertical,
    lpf_vertical_dual, FilterParams, FilterSize, InvalidFilterSize,
    Orientation,
  };
  pub use v_frame::pixel::Pixel;
  pub use v_frame::plane::Plane;
}
