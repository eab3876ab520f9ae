// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — raster buffers, decode/encode, and resampling.

pub mod codec;
pub mod raster;
pub mod resample;

pub use raster::{ChannelLayout, RasterImage};
pub use resample::Resampler;
