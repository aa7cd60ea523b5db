// Copyright (c) 2017-2024, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::ops::{Deref, DerefMut};

#[repr(align(64))]
pub struct Align64;

// A 64 byte aligned piece of data, used for transpose scratch blocks.
// # Examples
// ```
// let mut x: Aligned<[u16; 16 * 16]> = Aligned::new([0; 16 * 16]);
// assert!(x.data.as_ptr() as usize % 64 == 0);
// ```
pub struct Aligned<T> {
  _alignment: [Align64; 0],
  pub data: T,
}

impl<T> Aligned<T> {
  pub const fn new(data: T) -> Self {
    Aligned { _alignment: [], data }
  }
}

impl<T> Deref for Aligned<T> {
  type Target = T;
  fn deref(&self) -> &T {
    &self.data
  }
}

impl<T> DerefMut for Aligned<T> {
  fn deref_mut(&mut self) -> &mut T {
    &mut self.data
  }
}
