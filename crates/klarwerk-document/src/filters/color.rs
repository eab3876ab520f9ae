// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour-space conversions used to separate brightness from colour.
//
// All conversions are 8-bit in, 8-bit out, with the usual scaled encodings:
// CIELAB stores L*·255/100 and a*/b* offset by 128; YUV offsets U/V by 128.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// An image split into one brightness plane and two colour planes.
pub struct SplitPlanes {
    /// L* (CIELAB) or Y (YUV).
    pub lightness: GrayImage,
    /// a* or U.
    pub chroma_a: GrayImage,
    /// b* or V.
    pub chroma_b: GrayImage,
}

impl SplitPlanes {
    fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            lightness: GrayImage::new(width, height),
            chroma_a: GrayImage::new(width, height),
            chroma_b: GrayImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.lightness.dimensions()
    }

    fn merge(&self, convert: impl Fn([u8; 3]) -> [u8; 3]) -> RgbImage {
        let (width, height) = self.dimensions();
        RgbImage::from_fn(width, height, |x, y| {
            Rgb(convert([
                self.lightness.get_pixel(x, y).0[0],
                self.chroma_a.get_pixel(x, y).0[0],
                self.chroma_b.get_pixel(x, y).0[0],
            ]))
        })
    }

    fn split(rgb: &RgbImage, convert: impl Fn([u8; 3]) -> [u8; 3]) -> Self {
        let (width, height) = rgb.dimensions();
        let mut planes = Self::with_dimensions(width, height);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [p0, p1, p2] = convert(pixel.0);
            planes.lightness.put_pixel(x, y, Luma([p0]));
            planes.chroma_a.put_pixel(x, y, Luma([p1]));
            planes.chroma_b.put_pixel(x, y, Luma([p2]));
        }
        planes
    }
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// -- CIELAB -------------------------------------------------------------------

// D65 reference white.
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;
const LAB_EPSILON: f32 = 0.008_856;
const LAB_KAPPA: f32 = 903.3;

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > LAB_EPSILON {
        cube
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

/// sRGB → 8-bit scaled CIELAB.
pub fn rgb_to_lab(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| srgb_to_linear(c as f32 / 255.0));

    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / WHITE_X;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / WHITE_Z;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > LAB_EPSILON {
        116.0 * fy - 16.0
    } else {
        LAB_KAPPA * y
    };

    [
        to_u8(l * 255.0 / 100.0),
        to_u8(500.0 * (fx - fy) + 128.0),
        to_u8(200.0 * (fy - fz) + 128.0),
    ]
}

/// 8-bit scaled CIELAB → sRGB.
pub fn lab_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let l = lab[0] as f32 * 100.0 / 255.0;
    let a = lab[1] as f32 - 128.0;
    let b = lab[2] as f32 - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let y = if l > LAB_KAPPA * LAB_EPSILON {
        fy * fy * fy
    } else {
        l / LAB_KAPPA
    };
    let x = lab_f_inv(fx) * WHITE_X;
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_991 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;

    [r, g, bl].map(|c| to_u8(linear_to_srgb(c) * 255.0))
}

/// Split an RGB image into L*, a*, b* planes.
pub fn split_lab(rgb: &RgbImage) -> SplitPlanes {
    SplitPlanes::split(rgb, rgb_to_lab)
}

/// Recombine L*, a*, b* planes into RGB.
pub fn merge_lab(planes: &SplitPlanes) -> RgbImage {
    planes.merge(lab_to_rgb)
}

// -- YUV ----------------------------------------------------------------------

/// RGB → YUV (BT.601 weights, U/V offset by 128).
pub fn rgb_to_yuv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    [
        to_u8(y),
        to_u8(0.492 * (b - y) + 128.0),
        to_u8(0.877 * (r - y) + 128.0),
    ]
}

/// YUV → RGB.
pub fn yuv_to_rgb(yuv: [u8; 3]) -> [u8; 3] {
    let y = yuv[0] as f32;
    let u = yuv[1] as f32 - 128.0;
    let v = yuv[2] as f32 - 128.0;
    [
        to_u8(y + 1.140 * v),
        to_u8(y - 0.395 * u - 0.581 * v),
        to_u8(y + 2.032 * u),
    ]
}

pub fn split_yuv(rgb: &RgbImage) -> SplitPlanes {
    SplitPlanes::split(rgb, rgb_to_yuv)
}

pub fn merge_yuv(planes: &SplitPlanes) -> RgbImage {
    planes.merge(yuv_to_rgb)
}

// -- HSV ----------------------------------------------------------------------

/// RGB → (hue in degrees [0, 360), saturation [0, 1], value [0, 1]).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> (f32, f32, f32) {
    let [r, g, b] = rgb.map(|c| c as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}

pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let c = value * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    [r, g, b].map(|channel| to_u8((channel + m) * 255.0))
}

/// Multiply every pixel's HSV saturation by `factor`, clamped to 1.
pub fn scale_saturation(rgb: &RgbImage, factor: f32) -> RgbImage {
    let mut out = rgb.clone();
    for pixel in out.pixels_mut() {
        let (h, s, v) = rgb_to_hsv(pixel.0);
        pixel.0 = hsv_to_rgb(h, (s * factor).min(1.0), v);
    }
    out
}
