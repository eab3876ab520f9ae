// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalisation on a single 8-bit plane.

use image::{GrayImage, Luma};

use super::reflect_101;

const BINS: usize = 256;

/// CLAHE parameters: histogram clip limit and tile grid (columns × rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clahe {
    pub clip_limit: f32,
    pub grid_cols: u32,
    pub grid_rows: u32,
}

impl Clahe {
    pub fn new(clip_limit: f32, grid_cols: u32, grid_rows: u32) -> Self {
        Self {
            clip_limit,
            grid_cols: grid_cols.max(1),
            grid_rows: grid_rows.max(1),
        }
    }

    /// Equalise `plane`, returning a new plane of the same size.
    ///
    /// Tiles are `ceil(width / cols)` × `ceil(height / rows)`; tiles that
    /// overhang the image read mirrored pixels. Each output pixel is a
    /// bilinear blend of the four nearest tile mappings.
    pub fn apply(&self, plane: &GrayImage) -> GrayImage {
        let (width, height) = plane.dimensions();
        if width == 0 || height == 0 {
            return plane.clone();
        }

        let tile_w = width.div_ceil(self.grid_cols);
        let tile_h = height.div_ceil(self.grid_rows);
        let area = tile_w as usize * tile_h as usize;

        let clip = if self.clip_limit > 0.0 {
            Some(((self.clip_limit * area as f32 / BINS as f32) as u32).max(1))
        } else {
            None
        };

        let mut luts = Vec::with_capacity((self.grid_cols * self.grid_rows) as usize);
        for ty in 0..self.grid_rows {
            for tx in 0..self.grid_cols {
                let mut hist = tile_histogram(plane, tx * tile_w, ty * tile_h, tile_w, tile_h);
                if let Some(limit) = clip {
                    clip_histogram(&mut hist, limit);
                }
                luts.push(cumulative_lut(&hist, area));
            }
        }
        let lut_at = |tx: u32, ty: u32| &luts[(ty * self.grid_cols + tx) as usize];

        let last_col = self.grid_cols as i64 - 1;
        let last_row = self.grid_rows as i64 - 1;

        GrayImage::from_fn(width, height, |x, y| {
            let (tx1, tx2, xa) = neighbours(x, tile_w, last_col);
            let (ty1, ty2, ya) = neighbours(y, tile_h, last_row);
            let v = plane.get_pixel(x, y).0[0] as usize;

            let top = lut_at(tx1, ty1)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[v] as f32 * xa;
            let bottom = lut_at(tx1, ty2)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[v] as f32 * xa;
            let value = top * (1.0 - ya) + bottom * ya;

            Luma([value.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Left/right (or top/bottom) tile indices and the blend weight of the second.
fn neighbours(pos: u32, tile: u32, last: i64) -> (u32, u32, f32) {
    let f = pos as f32 / tile as f32 - 0.5;
    let lo = f.floor() as i64;
    let weight = f - lo as f32;
    let first = lo.clamp(0, last) as u32;
    let second = (lo + 1).clamp(0, last) as u32;
    (first, second, weight)
}

fn tile_histogram(plane: &GrayImage, x0: u32, y0: u32, w: u32, h: u32) -> [u32; BINS] {
    let (width, height) = plane.dimensions();
    let mut hist = [0u32; BINS];
    for y in y0..y0 + h {
        let sy = reflect_101(i64::from(y), height);
        for x in x0..x0 + w {
            let sx = reflect_101(i64::from(x), width);
            hist[plane.get_pixel(sx, sy).0[0] as usize] += 1;
        }
    }
    hist
}

/// Cap every bin at `limit` and spread the excess evenly, leftovers stepped
/// across the range.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        for bin in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *bin += 1;
            residual -= 1;
        }
    }
}

fn cumulative_lut(hist: &[u32; BINS], area: usize) -> [u8; BINS] {
    let scale = (BINS - 1) as f32 / area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (entry, count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, lo: u8, hi: u8) -> GrayImage {
        let span = (hi - lo) as u32;
        GrayImage::from_fn(width, height, |x, _| {
            Luma([lo + (x * span / (width - 1).max(1)) as u8])
        })
    }

    fn range(plane: &GrayImage) -> (u8, u8) {
        let min = plane.pixels().map(|p| p.0[0]).min().unwrap_or(0);
        let max = plane.pixels().map(|p| p.0[0]).max().unwrap_or(0);
        (min, max)
    }

    #[test]
    fn keeps_dimensions() {
        let plane = gradient(37, 23, 10, 200);
        let out = Clahe::new(1.5, 12, 12).apply(&plane);
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn widens_low_contrast_range() {
        let plane = gradient(64, 64, 100, 140);
        let out = Clahe::new(4.0, 2, 2).apply(&plane);
        let (lo, hi) = range(&out);
        assert!(hi - lo > 40, "range after equalisation: {lo}..{hi}");
    }

    #[test]
    fn single_tile_mapping_is_monotonic() {
        let plane = gradient(50, 4, 0, 255);
        let out = Clahe::new(2.0, 1, 1).apply(&plane);
        for y in 0..4 {
            for x in 1..50 {
                assert!(out.get_pixel(x, y).0[0] >= out.get_pixel(x - 1, y).0[0]);
            }
        }
    }

    #[test]
    fn grid_larger_than_image_still_works() {
        let plane = gradient(5, 3, 0, 200);
        let out = Clahe::new(1.0, 16, 16).apply(&plane);
        assert_eq!(out.dimensions(), (5, 3));
    }

    #[test]
    fn clipping_conserves_mass() {
        let mut hist = [0u32; BINS];
        hist[10] = 1000;
        hist[200] = 24;
        clip_histogram(&mut hist, 40);
        assert_eq!(hist.iter().sum::<u32>(), 1024);
        assert!(hist.iter().all(|&b| b <= 40 + 4));
    }
}
