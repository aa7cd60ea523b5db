// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Deblocking whole planes from a list of edges.
//!
//! [`DeblockContext::apply`] filters every vertical edge of the list, then
//! every horizontal one, each orientation in list order. The output is the
//! same as calling [`lpf_edge`] once per edge in that order, but edges
//! covering the two halves of an 8-line band at the same position and size
//! are merged into one dual call, and vertical edges are filtered in
//! parallel 8-row bands.
//!
//! [`lpf_edge`]: crate::lpf::lpf_edge

use crate::lpf::{
  lpf_edge, lpf_horizontal_dual, lpf_vertical_dual, FilterParams,
  FilterSize, Orientation, LINES_PER_EDGE,
};
use crate::util::Pixel;

use itertools::{EitherOrBoth, Itertools};
use thiserror::Error;
use v_frame::plane::{Plane, PlaneConfig};

#[cfg(feature = "threading")]
use rayon::prelude::*;
#[cfg(feature = "threading")]
use rayon::ThreadPool;
#[cfg(feature = "threading")]
use std::sync::Arc;

use std::marker::PhantomData;
use std::ops::Add;

/// Lines covered by one band, the span of a dual call.
const BAND: usize = 2 * LINES_PER_EDGE;

/// One edge of a plane, covering four lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
  /// Column of the first `q0` sample.
  pub x: usize,
  /// Row of the first `q0` sample.
  pub y: usize,
  /// Direction of the edge.
  pub orientation: Orientation,
  /// Filter to run across it.
  pub size: FilterSize,
  /// Filter strength.
  pub params: FilterParams,
}

impl Edge {
  /// The vertical edge left of `(x, y)..(x, y + 4)`.
  pub const fn vertical(
    x: usize, y: usize, size: FilterSize, params: FilterParams,
  ) -> Self {
    Edge { x, y, orientation: Orientation::Vertical, size, params }
  }

  /// The horizontal edge above `(x, y)..(x + 4, y)`.
  pub const fn horizontal(
    x: usize, y: usize, size: FilterSize, params: FilterParams,
  ) -> Self {
    Edge { x, y, orientation: Orientation::Horizontal, size, params }
  }

  // Position of the first line.
  const fn along(&self) -> usize {
    match self.orientation {
      Orientation::Vertical => self.y,
      Orientation::Horizontal => self.x,
    }
  }

  // Position of the edge on each line.
  const fn across(&self) -> usize {
    match self.orientation {
      Orientation::Vertical => self.x,
      Orientation::Horizontal => self.y,
    }
  }
}

/// Reasons an edge cannot be applied to a plane.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum EdgeError {
  /// The first line is not on the 4-sample grid.
  #[error("edge at ({x}, {y}) is not aligned to 4 lines")]
  Misaligned {
    /// Column of the edge.
    x: usize,
    /// Row of the edge.
    y: usize,
  },
  /// Some tap or line falls outside the visible plane.
  #[error("{size:?} edge at ({x}, {y}) reaches outside the plane")]
  OutOfBounds {
    /// Column of the edge.
    x: usize,
    /// Row of the edge.
    y: usize,
    /// Filter of the edge.
    size: FilterSize,
  },
}

/// Checks that `edge` can be filtered within a plane of geometry `cfg`.
///
/// # Errors
///
/// - Returns `EdgeError::Misaligned` if the edge does not start on a
///   multiple of four lines.
/// - Returns `EdgeError::OutOfBounds` if the edge lines or the filter taps
///   on either side leave the visible area.
pub fn check_edge(cfg: &PlaneConfig, edge: &Edge) -> Result<(), EdgeError> {
  let (x, y) = (edge.x, edge.y);
  let (lines, taps) = match edge.orientation {
    Orientation::Vertical => (cfg.height, cfg.width),
    Orientation::Horizontal => (cfg.width, cfg.height),
  };
  if edge.along() % LINES_PER_EDGE != 0 {
    return Err(EdgeError::Misaligned { x, y });
  }
  let radius = edge.size.radius();
  if edge.across() < radius
    || edge.across() + radius > taps
    || edge.along() + LINES_PER_EDGE > lines
  {
    return Err(EdgeError::OutOfBounds { x, y, size: edge.size });
  }
  Ok(())
}

/// Number of kernel calls made by one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCount {
  /// Calls filtering four lines.
  pub single: usize,
  /// Calls filtering eight lines.
  pub dual: usize,
}

impl CallCount {
  /// Number of edges filtered.
  pub const fn edges(&self) -> usize {
    self.single + 2 * self.dual
  }
}

impl Add for CallCount {
  type Output = CallCount;

  fn add(self, rhs: CallCount) -> CallCount {
    CallCount { single: self.single + rhs.single, dual: self.dual + rhs.dual }
  }
}

/// Kernel calls made by [`DeblockContext::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
  /// Vertical edges, filtered first.
  pub vertical: CallCount,
  /// Horizontal edges.
  pub horizontal: CallCount,
}

/// Applies edge lists to planes of one pixel type and bit depth.
///
/// Created by [`DeblockConfig::new_context`].
///
/// [`DeblockConfig::new_context`]: crate::config::DeblockConfig::new_context
#[derive(Debug)]
pub struct DeblockContext<T: Pixel> {
  pub(crate) bit_depth: usize,
  #[cfg(feature = "threading")]
  pub(crate) pool: Option<Arc<ThreadPool>>,
  pub(crate) _pixel: PhantomData<T>,
}

enum Batch<'a> {
  Single(&'a Edge),
  Dual(&'a Edge, &'a Edge),
}

// Pairs the edges of one band. Edges on the first four lines are matched
// in order with those on the last four; a match at the same position and
// size becomes a dual call. The order within each half is kept, and the
// halves touch disjoint lines.
fn pair_band<'a>(edges: &[&'a Edge]) -> Vec<Batch<'a>> {
  let (first, second): (Vec<&Edge>, Vec<&Edge>) =
    edges.iter().copied().partition(|e| e.along() % BAND == 0);
  let mut batches = Vec::with_capacity(edges.len());
  for pair in first.into_iter().zip_longest(second) {
    match pair {
      EitherOrBoth::Both(a, b)
        if a.across() == b.across() && a.size == b.size =>
      {
        batches.push(Batch::Dual(a, b));
      }
      EitherOrBoth::Both(a, b) => {
        batches.push(Batch::Single(a));
        batches.push(Batch::Single(b));
      }
      EitherOrBoth::Left(e) | EitherOrBoth::Right(e) => {
        batches.push(Batch::Single(e));
      }
    }
  }
  batches
}

// Buckets the edges of one orientation by band, keeping list order.
fn band_edges(
  edges: &[Edge], orientation: Orientation, lines: usize,
) -> Vec<Vec<&Edge>> {
  let mut bands = vec![Vec::new(); (lines + BAND - 1) / BAND];
  for edge in edges.iter().filter(|e| e.orientation == orientation) {
    bands[edge.along() / BAND].push(edge);
  }
  bands
}

// Filters the edges of one band. `data` starts `origin` samples past the
// plane origin.
fn filter_band<T: Pixel>(
  data: &mut [T], origin: usize, stride: usize, edges: &[&Edge],
  bit_depth: usize,
) -> CallCount {
  let mut count = CallCount::default();
  for batch in pair_band(edges) {
    match batch {
      Batch::Single(e) => {
        let offset = e.y * stride + e.x - origin;
        lpf_edge(
          data,
          offset,
          stride,
          e.orientation,
          e.size,
          e.params,
          bit_depth,
        );
        count.single += 1;
      }
      Batch::Dual(a, b) => {
        let offset = a.y * stride + a.x - origin;
        let params = [a.params, b.params];
        match a.orientation {
          Orientation::Vertical => {
            lpf_vertical_dual(data, offset, stride, a.size, params, bit_depth)
          }
          Orientation::Horizontal => {
            lpf_horizontal_dual(data, offset, stride, a.size, params, bit_depth)
          }
        }
        count.dual += 1;
      }
    }
  }
  if let Some(e) = edges.first() {
    trace!("{:?} band {}: {:?}", e.orientation, e.along() / BAND, count);
  }
  count
}

cfg_if::cfg_if! {
  if #[cfg(feature = "threading")] {
    impl<T: Pixel> DeblockContext<T> {
      fn vertical_pass(
        &self, data: &mut [T], stride: usize, bands: &[Vec<&Edge>],
      ) -> CallCount {
        let bit_depth = self.bit_depth;
        let mut run = || {
          data
            .par_chunks_mut(BAND * stride)
            .zip(bands.par_iter())
            .enumerate()
            .map(|(i, (band, edges))| {
              filter_band(band, i * BAND * stride, stride, edges, bit_depth)
            })
            .reduce(CallCount::default, |a, b| a + b)
        };
        match self.pool {
          Some(ref pool) => pool.install(run),
          None => run(),
        }
      }
    }
  } else {
    impl<T: Pixel> DeblockContext<T> {
      fn vertical_pass(
        &self, data: &mut [T], stride: usize, bands: &[Vec<&Edge>],
      ) -> CallCount {
        data
          .chunks_mut(BAND * stride)
          .zip(bands)
          .enumerate()
          .map(|(i, (band, edges))| {
            filter_band(band, i * BAND * stride, stride, edges, self.bit_depth)
          })
          .fold(CallCount::default(), |a, b| a + b)
      }
    }
  }
}

impl<T: Pixel> DeblockContext<T> {
  /// The bit depth samples are filtered at.
  pub const fn bit_depth(&self) -> usize {
    self.bit_depth
  }

  // Horizontal edges run down columns, which do not split into disjoint
  // slices of a row-major plane.
  fn horizontal_pass(
    &self, data: &mut [T], stride: usize, bands: &[Vec<&Edge>],
  ) -> CallCount {
    let mut count = CallCount::default();
    for edges in bands {
      count = count + filter_band(data, 0, stride, edges, self.bit_depth);
    }
    count
  }

  /// Filters `edges` on `plane`, vertical edges first.
  ///
  /// Coordinates are relative to the visible origin of the plane.
  ///
  /// # Errors
  ///
  /// Returns the first `EdgeError` reported by [`check_edge`] for any edge
  /// of the list, in which case `plane` is left untouched.
  ///
  /// # Examples
  ///
  /// ```
  /// use av1_deblock::prelude::*;
  ///
  /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
  /// let ctx: DeblockContext<u8> = DeblockConfig::new(8).new_context()?;
  /// let mut plane = Plane::<u8>::new(16, 16, 0, 0, 0, 0);
  /// let params = FilterParams::new(60, 20, 4);
  /// let edges = [
  ///   Edge::vertical(8, 0, FilterSize::Size8, params),
  ///   Edge::vertical(8, 4, FilterSize::Size8, params),
  ///   Edge::horizontal(0, 8, FilterSize::Size4, params),
  /// ];
  /// let summary = ctx.apply(&mut plane, &edges)?;
  /// assert_eq!(summary.vertical.dual, 1);
  /// assert_eq!(summary.horizontal.single, 1);
  /// # Ok(())
  /// # }
  /// ```
  pub fn apply(
    &self, plane: &mut Plane<T>, edges: &[Edge],
  ) -> Result<PassSummary, EdgeError> {
    for edge in edges {
      check_edge(&plane.cfg, edge)?;
    }

    let (width, height, stride) =
      (plane.cfg.width, plane.cfg.height, plane.cfg.stride);
    let vertical = band_edges(edges, Orientation::Vertical, height);
    let horizontal = band_edges(edges, Orientation::Horizontal, width);

    let data = plane.data_origin_mut();
    let summary = PassSummary {
      vertical: self.vertical_pass(data, stride, &vertical),
      horizontal: self.horizontal_pass(data, stride, &horizontal),
    };
    debug!("deblocked {}x{} plane: {:?}", width, height, summary);

    Ok(summary)
  }
}
