// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel-level building blocks shared by the enhancement strategies.

pub mod clahe;
pub mod color;
pub mod convolve;
pub mod denoise;
pub mod tone;

pub use clahe::Clahe;
pub use convolve::{Border, Kernel3};
pub use denoise::NlMeans;
pub use tone::GammaLut;

/// Map an out-of-range index back into `0..len` by mirroring around the
/// edge pixels without repeating them (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}
