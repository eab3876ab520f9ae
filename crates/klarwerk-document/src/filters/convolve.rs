// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// 3×3 convolution, weighted blending and Gaussian unsharp blending.

use image::{ImageBuffer, Pixel, Rgb, Rgb32FImage, RgbImage};
use imageproc::filter::gaussian_blur_f32;

use super::reflect_101;

/// How pixels outside the image are sourced for a 3×3 kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Mirror without repeating the edge pixel.
    Reflect101,
    /// Leave the outermost ring of pixels untouched.
    Keep,
}

/// A 3×3 kernel, row-major, with an optional divisor applied to the sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3 {
    pub weights: [f32; 9],
    pub divisor: f32,
}

impl Kernel3 {
    pub const fn new(weights: [f32; 9]) -> Self {
        Self {
            weights,
            divisor: 1.0,
        }
    }

    pub const fn with_divisor(weights: [f32; 9], divisor: f32) -> Self {
        Self { weights, divisor }
    }

    /// Cross-shaped sharpen: `centre` in the middle, `-edge` at the four
    /// direct neighbours.
    pub const fn cross_sharpen(centre: f32, edge: f32) -> Self {
        Self::new([0.0, -edge, 0.0, -edge, centre, -edge, 0.0, -edge, 0.0])
    }

    /// Apply to every channel. Results are rounded and saturated to u8.
    pub fn apply(&self, image: &RgbImage, border: Border) -> RgbImage {
        let (width, height) = image.dimensions();
        let keep_edges = border == Border::Keep && width >= 3 && height >= 3;

        RgbImage::from_fn(width, height, |x, y| {
            if keep_edges && (x == 0 || y == 0 || x == width - 1 || y == height - 1) {
                return *image.get_pixel(x, y);
            }
            let mut sum = [0f32; 3];
            for ky in 0..3i64 {
                let sy = reflect_101(i64::from(y) + ky - 1, height);
                for kx in 0..3i64 {
                    let sx = reflect_101(i64::from(x) + kx - 1, width);
                    let w = self.weights[(ky * 3 + kx) as usize];
                    if w == 0.0 {
                        continue;
                    }
                    let px = image.get_pixel(sx, sy).0;
                    for (acc, v) in sum.iter_mut().zip(px) {
                        *acc += w * f32::from(v);
                    }
                }
            }
            Rgb(sum.map(|v| saturate(v / self.divisor)))
        })
    }
}

#[inline]
pub(crate) fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// `a·wa + b·wb`, rounded and saturated per channel.
pub fn weighted_blend<P>(
    a: &ImageBuffer<P, Vec<u8>>,
    wa: f32,
    b: &ImageBuffer<P, Vec<u8>>,
    wb: f32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        for (d, s) in dst.channels_mut().iter_mut().zip(src.channels()) {
            *d = saturate(f32::from(*d) * wa + f32::from(*s) * wb);
        }
    }
    out
}

/// Gaussian blur kept in float so the blend below sees unquantised values.
fn blur(image: &RgbImage, sigma: f32) -> Rgb32FImage {
    let float = Rgb32FImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb(image.get_pixel(x, y).0.map(f32::from))
    });
    gaussian_blur_f32(&float, sigma)
}

/// Sharpen by pushing away from a Gaussian blur:
/// `(1 + amount)·img − amount·blur(img, sigma)`.
pub fn unsharp_blend(image: &RgbImage, sigma: f32, amount: f32) -> RgbImage {
    let blurred = blur(image, sigma);
    let mut out = image.clone();
    for (dst, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for (d, s) in dst.0.iter_mut().zip(soft.0) {
            *d = saturate(f32::from(*d) * (1.0 + amount) - s * amount);
        }
    }
    out
}

/// Thresholded unsharp mask: channels whose difference from the blur is at
/// least `threshold` move by `percent`% of that difference; the rest are
/// left exactly as they were.
pub fn unsharp_mask(image: &RgbImage, sigma: f32, percent: i32, threshold: i32) -> RgbImage {
    let blurred = blur(image, sigma);
    let mut out = image.clone();
    for (dst, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for (d, s) in dst.0.iter_mut().zip(soft.0) {
            let diff = i32::from(*d) - i32::from(saturate(s));
            if diff.abs() >= threshold {
                *d = (i32::from(*d) + diff * percent / 100).clamp(0, 255) as u8;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(v: u8) -> RgbImage {
        RgbImage::from_pixel(6, 5, Rgb([v, v, v]))
    }

    #[test]
    fn normalised_kernels_keep_flat_regions() {
        let flat = uniform(90);
        let sharpen = Kernel3::cross_sharpen(1.4, 0.1);
        assert_eq!(sharpen.apply(&flat, Border::Reflect101), flat);

        let smooth = Kernel3::with_divisor([1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0], 13.0);
        assert_eq!(smooth.apply(&flat, Border::Keep), flat);
    }

    #[test]
    fn sharpen_raises_a_bright_dot() {
        let mut img = uniform(100);
        img.put_pixel(3, 2, Rgb([150, 150, 150]));
        let out = Kernel3::cross_sharpen(1.4, 0.1).apply(&img, Border::Reflect101);
        // 1.4·150 − 0.4·100 = 170
        assert_eq!(out.get_pixel(3, 2).0, [170, 170, 170]);
        // Direct neighbours dip: 1.4·100 − 0.1·150 − 0.3·100 = 95
        assert_eq!(out.get_pixel(2, 2).0, [95, 95, 95]);
    }

    #[test]
    fn keep_border_leaves_edge_ring() {
        let img = RgbImage::from_fn(5, 5, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 7]));
        let out = Kernel3::new([0.0; 9]).apply(&img, Border::Keep);
        assert_eq!(out.get_pixel(0, 3), img.get_pixel(0, 3));
        assert_eq!(out.get_pixel(2, 2).0, [0, 0, 0]);
    }

    #[test]
    fn blend_saturates() {
        let out = weighted_blend(&uniform(200), 1.3, &uniform(10), -0.3);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
        let out = weighted_blend(&uniform(10), 1.3, &uniform(200), -0.3);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn blend_works_on_gray_planes() {
        let a = image::GrayImage::from_pixel(2, 2, image::Luma([200]));
        let b = image::GrayImage::from_pixel(2, 2, image::Luma([100]));
        let out = weighted_blend(&a, 0.6, &b, 0.4);
        assert_eq!(out.get_pixel(1, 1).0, [160]);
    }

    #[test]
    fn unsharp_variants_leave_flat_images_alone() {
        let flat = uniform(123);
        assert_eq!(unsharp_blend(&flat, 1.0, 0.3), flat);
        assert_eq!(unsharp_mask(&flat, 0.5, 50, 1), flat);
    }
}
