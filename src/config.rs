// Copyright (c) 2018-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Executor configuration.

use thiserror::Error;

#[cfg(feature = "threading")]
use rayon::{ThreadPool, ThreadPoolBuilder};
#[cfg(feature = "threading")]
use std::sync::Arc;

use crate::deblock::DeblockContext;
use crate::util::Pixel;

use std::marker::PhantomData;
use std::mem;

/// Enumeration of possible invalid configuration errors.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidConfig {
  /// The bit depth is not supported.
  #[error("invalid bit depth {0} (expected 8, 10 or 12)")]
  InvalidBitDepth(usize),
  /// The pixel type cannot hold samples of the configured bit depth.
  #[error("bit depth {bit_depth} does not fit in a {pixel_bits}-bit pixel")]
  PixelTooNarrow {
    /// Configured bit depth.
    bit_depth: usize,
    /// Width of the pixel type.
    pixel_bits: usize,
  },
  /// The worker pool could not be created.
  #[error("cannot build the thread pool: {0}")]
  ThreadPool(String),
}

/// Contains the deblocking executor configuration.
#[derive(Clone, Debug)]
pub struct DeblockConfig {
  /// Sample bit depth of the planes to filter.
  pub(crate) bit_depth: usize,
  /// The number of threads in the threadpool.
  #[cfg_attr(not(feature = "threading"), allow(dead_code))]
  pub(crate) threads: usize,
  /// Shared thread pool
  #[cfg(feature = "threading")]
  pub(crate) pool: Option<Arc<ThreadPool>>,
}

impl Default for DeblockConfig {
  fn default() -> Self {
    DeblockConfig::new(8)
  }
}

impl DeblockConfig {
  /// Create a configuration for planes of the given bit depth
  pub const fn new(bit_depth: usize) -> Self {
    DeblockConfig {
      bit_depth,
      threads: 0,
      #[cfg(feature = "threading")]
      pool: None,
    }
  }

  /// Set the number of workers in the threadpool
  ///
  /// The vertical edges of a plane are filtered in parallel bands of
  /// eight rows. If it is left unset, the global threadpool provided by
  /// Rayon is used instead. Without the `threading` feature the setting
  /// is ignored and every pass runs on the calling thread.
  pub const fn with_threads(mut self, threads: usize) -> Self {
    self.threads = threads;
    self
  }

  /// Use the provided threadpool
  ///
  /// It takes priority over `with_threads()`
  #[cfg(feature = "threading")]
  pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
    self.pool = Some(pool);
    self
  }

  /// The configured bit depth.
  pub const fn bit_depth(&self) -> usize {
    self.bit_depth
  }

  /// Validates the configuration for pixels of type `T`.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidConfig::InvalidBitDepth` for anything other than 8,
  ///   10 or 12 bits.
  /// - Returns `InvalidConfig::PixelTooNarrow` if `T` cannot hold a sample
  ///   of that depth.
  pub fn validate<T: Pixel>(&self) -> Result<(), InvalidConfig> {
    use InvalidConfig::*;

    if !matches!(self.bit_depth, 8 | 10 | 12) {
      return Err(InvalidBitDepth(self.bit_depth));
    }
    let pixel_bits = 8 * mem::size_of::<T>();
    if pixel_bits < self.bit_depth {
      return Err(PixelTooNarrow { bit_depth: self.bit_depth, pixel_bits });
    }

    Ok(())
  }

  /// Create a new threadpool with this configuration if set,
  /// or return `None` if global threadpool should be used instead.
  #[cfg(feature = "threading")]
  pub(crate) fn new_thread_pool(
    &self,
  ) -> Result<Option<Arc<ThreadPool>>, InvalidConfig> {
    if let Some(ref p) = self.pool {
      Ok(Some(p.clone()))
    } else if self.threads != 0 {
      let pool = ThreadPoolBuilder::new()
        .num_threads(self.threads)
        .build()
        .map_err(|e| InvalidConfig::ThreadPool(e.to_string()))?;
      Ok(Some(Arc::new(pool)))
    } else {
      Ok(None)
    }
  }

  /// Creates a [`DeblockContext`] with this configuration.
  ///
  /// # Errors
  ///
  /// Returns `InvalidConfig` if the config is invalid or the requested
  /// threadpool cannot be built.
  ///
  /// # Examples
  ///
  /// ```
  /// use av1_deblock::prelude::*;
  ///
  /// # fn main() -> Result<(), InvalidConfig> {
  /// let cfg = DeblockConfig::new(10).with_threads(2);
  /// let ctx: DeblockContext<u16> = cfg.new_context()?;
  /// assert_eq!(ctx.bit_depth(), 10);
  /// assert!(cfg.new_context::<u8>().is_err());
  /// # Ok(())
  /// # }
  /// ```
  pub fn new_context<T: Pixel>(
    &self,
  ) -> Result<DeblockContext<T>, InvalidConfig> {
    self.validate::<T>()?;

    #[cfg(feature = "threading")]
    let pool = self.new_thread_pool()?;
    #[cfg(feature = "threading")]
    let threads = pool
      .as_ref()
      .map_or_else(rayon::current_num_threads, |p| p.current_num_threads());
    #[cfg(not(feature = "threading"))]
    let threads = 1;

    debug!(
      "deblock context: {}-bit in u{}, {} threads",
      self.bit_depth,
      8 * mem::size_of::<T>(),
      threads
    );

    Ok(DeblockContext {
      bit_depth: self.bit_depth,
      #[cfg(feature = "threading")]
      pool,
      _pixel: PhantomData,
    })
  }
}
