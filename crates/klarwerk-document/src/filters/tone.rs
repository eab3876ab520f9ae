// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tone curves: gamma lookup tables, percentile stretching and
// factor-based enhancement (contrast, sharpness) relative to a base image.

use image::{GrayImage, Pixel, Rgb, RgbImage};

use super::convolve::{Border, Kernel3};

/// A 256-entry lookup table `out = trunc(255 · (in / 255)^exponent)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaLut([u8; 256]);

impl GammaLut {
    pub fn power(exponent: f32) -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let normalized = i as f64 / 255.0;
            *entry = (normalized.powf(f64::from(exponent)) * 255.0).clamp(0.0, 255.0) as u8;
        }
        Self(table)
    }

    /// Gamma correction: brightens for `gamma > 1`, darkens below 1.
    pub fn correction(gamma: f32) -> Self {
        Self::power(1.0 / gamma)
    }

    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.0[value as usize]
    }

    pub fn apply_rgb(&self, image: &RgbImage) -> RgbImage {
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            pixel.apply(|v| self.map(v));
        }
        out
    }

    pub fn apply_gray(&self, plane: &GrayImage) -> GrayImage {
        let mut out = plane.clone();
        for pixel in out.pixels_mut() {
            pixel.0[0] = self.map(pixel.0[0]);
        }
        out
    }
}

// -- Percentiles --------------------------------------------------------------

/// Linear-interpolated percentile (`0.0..=100.0`) of a 256-bin histogram,
/// matching the usual "linear" definition over the sorted samples.
pub fn percentile(hist: &[u64; 256], q: f64) -> f64 {
    let n: u64 = hist.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let rank = q.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as u64;
    let frac = rank - lower as f64;

    let value_at = |k: u64| -> f64 {
        let mut seen = 0u64;
        for (value, &count) in hist.iter().enumerate() {
            seen += count;
            if seen > k {
                return value as f64;
            }
        }
        255.0
    };

    let lo = value_at(lower);
    if frac == 0.0 {
        return lo;
    }
    let hi = value_at((lower + 1).min(n - 1));
    lo + frac * (hi - lo)
}

fn channel_histograms(image: &RgbImage) -> [[u64; 256]; 3] {
    let mut hists = [[0u64; 256]; 3];
    for pixel in image.pixels() {
        for (hist, &v) in hists.iter_mut().zip(pixel.0.iter()) {
            hist[v as usize] += 1;
        }
    }
    hists
}

/// Outcome of stretching one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelStretch {
    /// Low and high percentiles, normalised to `[0, 1]`.
    Stretched { low: f64, high: f64 },
    /// Range too narrow; channel copied unchanged.
    Skipped,
}

/// Per-channel percentile stretch in normalised `[0, 1]` space.
///
/// A channel whose `high − low` spread is not greater than `min_spread` is
/// left bit-exact. Stretched values are clamped to `[0, 1]` and truncated
/// back to 8 bits.
pub fn percentile_stretch(
    image: &RgbImage,
    low_q: f64,
    high_q: f64,
    min_spread: f64,
) -> (RgbImage, [ChannelStretch; 3]) {
    let hists = channel_histograms(image);
    let plan = hists.map(|hist| {
        let low = percentile(&hist, low_q) / 255.0;
        let high = percentile(&hist, high_q) / 255.0;
        if high - low > min_spread {
            ChannelStretch::Stretched { low, high }
        } else {
            ChannelStretch::Skipped
        }
    });

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for (v, stretch) in pixel.0.iter_mut().zip(plan.iter()) {
            if let ChannelStretch::Stretched { low, high } = *stretch {
                let normalized = f64::from(*v) / 255.0;
                let t = ((normalized - low) / (high - low)).clamp(0.0, 1.0);
                *v = (t * 255.0) as u8;
            }
        }
    }
    (out, plan)
}

// -- Factor enhancement -------------------------------------------------------

/// `base + factor · (value − base)`, clamped and truncated to u8.
#[inline]
fn extrapolate(base: u8, value: u8, factor: f32) -> u8 {
    let t = f32::from(base) + factor * (f32::from(value) - f32::from(base));
    if t <= 0.0 {
        0
    } else if t >= 255.0 {
        255
    } else {
        t as u8
    }
}

/// Perceptual luma in 16-bit fixed point (0.299 R + 0.587 G + 0.114 B).
#[inline]
pub fn luma(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0.map(u32::from);
    ((r * 19_595 + g * 38_470 + b * 7_471 + 0x8000) >> 16) as u8
}

/// Scale contrast around the image's mean luma.
pub fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return image.clone();
    }
    let sum: u64 = image.pixels().map(|p| u64::from(luma(*p))).sum();
    let mean = (sum as f64 / count as f64 + 0.5) as u8;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.apply(|v| extrapolate(mean, v, factor));
    }
    out
}

/// Edge-preserving smoothing kernel used as the sharpness baseline.
const SMOOTH: Kernel3 =
    Kernel3::with_divisor([1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0], 13.0);

/// Push the image away from a lightly smoothed copy of itself.
pub fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = SMOOTH.apply(image, Border::Keep);
    let mut out = image.clone();
    for (dst, base) in out.pixels_mut().zip(smoothed.pixels()) {
        for (d, b) in dst.0.iter_mut().zip(base.0) {
            *d = extrapolate(b, *d, factor);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_identity_and_endpoints() {
        let identity = GammaLut::power(1.0);
        assert!((0..=255u8).all(|v| identity.map(v) == v));

        let lut = GammaLut::correction(0.95);
        assert_eq!(lut.map(0), 0);
        assert_eq!(lut.map(255), 255);
        // Exponent above 1 darkens mid-tones.
        assert!(lut.map(128) < 128);
    }

    #[test]
    fn gamma_entries_truncate() {
        // 255 · (64/255)^(1/0.95) = 59.51
        let correction = GammaLut::correction(0.95);
        assert_eq!(correction.map(64), 59);
        assert_eq!(correction.map(128), 123);

        // 255 · (100/255)^0.9 = 109.81, 255 · (200/255)^0.9 = 204.92
        let luma = GammaLut::power(0.9);
        assert_eq!(luma.map(100), 109);
        assert_eq!(luma.map(128), 137);
        assert_eq!(luma.map(200), 204);
    }

    #[test]
    fn gamma_round_trip_within_quantization() {
        let forward = GammaLut::correction(0.95);
        let back = GammaLut::correction(1.0 / 0.95);
        for v in 0..=255u8 {
            let restored = back.map(forward.map(v));
            // Each truncating pass can lose up to one level.
            assert!(restored.abs_diff(v) <= 2, "{v} -> {restored}");
        }
    }

    #[test]
    fn percentile_matches_linear_interpolation() {
        // Samples 0, 10, 20, 30, 40.
        let mut hist = [0u64; 256];
        for v in [0usize, 10, 20, 30, 40] {
            hist[v] = 1;
        }
        assert_eq!(percentile(&hist, 0.0), 0.0);
        assert_eq!(percentile(&hist, 100.0), 40.0);
        assert_eq!(percentile(&hist, 50.0), 20.0);
        // rank = 0.1 * 4 = 0.4 → 0 + 0.4·10
        assert!((percentile(&hist, 10.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn narrow_channels_are_left_exact() {
        let image = RgbImage::from_fn(10, 10, |x, _| Rgb([100 + (x % 3) as u8, 5, (x * 25) as u8]));
        let (out, plan) = percentile_stretch(&image, 2.0, 98.0, 0.1);
        assert_eq!(plan[0], ChannelStretch::Skipped);
        assert_eq!(plan[1], ChannelStretch::Skipped);
        assert!(matches!(plan[2], ChannelStretch::Stretched { .. }));
        for (a, b) in image.pixels().zip(out.pixels()) {
            assert_eq!(a.0[0], b.0[0]);
            assert_eq!(a.0[1], b.0[1]);
        }
    }

    #[test]
    fn stretch_spans_full_range() {
        let image = RgbImage::from_fn(100, 1, |x, _| {
            let v = 50 + x as u8;
            Rgb([v, v, v])
        });
        let (out, _) = percentile_stretch(&image, 2.0, 98.0, 0.1);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(99, 0).0[0], 255);
    }

    #[test]
    fn contrast_is_identity_at_one_and_spreads_above() {
        let image = RgbImage::from_fn(4, 1, |x, _| {
            let v = 100 + 20 * x as u8;
            Rgb([v, v, v])
        });
        assert_eq!(adjust_contrast(&image, 1.0), image);

        let out = adjust_contrast(&image, 1.2);
        assert!(out.get_pixel(0, 0).0[0] < 100);
        assert!(out.get_pixel(3, 0).0[0] > 160);
    }

    #[test]
    fn sharpness_leaves_flat_images() {
        let flat = RgbImage::from_pixel(5, 5, Rgb([64, 128, 192]));
        assert_eq!(adjust_sharpness(&flat, 1.3), flat);
    }

    #[test]
    fn luma_of_gray_is_gray() {
        for v in [0u8, 1, 77, 128, 254, 255] {
            assert_eq!(luma(Rgb([v, v, v])), v);
        }
    }
}
