// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-local-means denoising over a set of aligned 8-bit planes.
//
// Patch distances are summed across all planes so the planes are filtered
// jointly (a colour pixel moves as a unit). For each search offset the
// squared-difference image is integrated once, which makes every patch
// distance an O(1) box lookup.

use image::{GrayImage, Luma};
use tracing::debug;

use super::reflect_101;

/// Weights below this are treated as zero.
const WEIGHT_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlMeans {
    /// Filter strength. Larger values smooth more and keep less detail.
    pub h: f32,
    /// Half-size of the comparison patch (2 gives a 5×5 patch).
    pub template_radius: u32,
    /// Half-size of the search window (7 gives 15×15).
    pub search_radius: u32,
}

impl Default for NlMeans {
    fn default() -> Self {
        Self {
            h: 3.0,
            template_radius: 2,
            search_radius: 7,
        }
    }
}

/// Mirror-padded copy of one plane, stored row-major as `i32`.
struct Padded {
    width: usize,
    data: Vec<i32>,
}

impl Padded {
    fn new(plane: &GrayImage, pad: u32) -> Self {
        let (w, h) = plane.dimensions();
        let pw = (w + 2 * pad) as usize;
        let ph = (h + 2 * pad) as usize;
        let mut data = Vec::with_capacity(pw * ph);
        for py in 0..ph {
            let sy = reflect_101(py as i64 - i64::from(pad), h);
            for px in 0..pw {
                let sx = reflect_101(px as i64 - i64::from(pad), w);
                data.push(i32::from(plane.get_pixel(sx, sy).0[0]));
            }
        }
        Self { width: pw, data }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x]
    }
}

impl NlMeans {
    /// Denoise `planes` jointly. All planes must share dimensions; an empty
    /// slice or mismatched planes are returned unchanged.
    pub fn apply(&self, planes: &[GrayImage]) -> Vec<GrayImage> {
        let Some(first) = planes.first() else {
            return Vec::new();
        };
        let (width, height) = first.dimensions();
        if width == 0 || height == 0 || planes.iter().any(|p| p.dimensions() != (width, height)) {
            return planes.to_vec();
        }

        let t = self.template_radius;
        let s = self.search_radius;
        let pad = s + t;
        let padded: Vec<Padded> = planes.iter().map(|p| Padded::new(p, pad)).collect();

        let (w, h) = (width as usize, height as usize);
        let (t_us, s_us) = (t as usize, s as usize);
        let span = 2 * t_us + 1;
        // Region of per-pixel squared differences covering every patch.
        let rw = w + 2 * t_us;
        let rh = h + 2 * t_us;

        let samples = (span * span * planes.len()) as f64;
        let weights = WeightTable::new(self.h, samples);

        let mut acc = vec![0f64; w * h * planes.len()];
        let mut total = vec![0f64; w * h];
        let mut integral = vec![0u64; (rw + 1) * (rh + 1)];

        for dy in -(s as i64)..=(s as i64) {
            for dx in -(s as i64)..=(s as i64) {
                // Integral image of the squared difference between the
                // region and the region shifted by (dx, dy).
                for ry in 0..rh {
                    let mut row_sum = 0u64;
                    let py = s_us + ry;
                    let qy = (py as i64 + dy) as usize;
                    for rx in 0..rw {
                        let px = s_us + rx;
                        let qx = (px as i64 + dx) as usize;
                        let mut d = 0u64;
                        for plane in &padded {
                            let diff = plane.at(px, py) - plane.at(qx, qy);
                            d += (diff * diff) as u64;
                        }
                        row_sum += d;
                        integral[(ry + 1) * (rw + 1) + rx + 1] =
                            integral[ry * (rw + 1) + rx + 1] + row_sum;
                    }
                }

                for y in 0..h {
                    for x in 0..w {
                        let i = |yy: usize, xx: usize| integral[yy * (rw + 1) + xx];
                        let ssd = i(y + span, x + span) + i(y, x) - i(y, x + span) - i(y + span, x);
                        let weight = weights.lookup(ssd);
                        if weight == 0.0 {
                            continue;
                        }
                        let px = pad as usize + x;
                        let py = pad as usize + y;
                        let qx = (px as i64 + dx) as usize;
                        let qy = (py as i64 + dy) as usize;
                        let idx = y * w + x;
                        total[idx] += weight;
                        for (c, plane) in padded.iter().enumerate() {
                            acc[c * w * h + idx] += weight * f64::from(plane.at(qx, qy));
                        }
                    }
                }
            }
        }

        debug!(width, height, planes = planes.len(), h = self.h, "nl-means denoise");

        (0..planes.len())
            .map(|c| {
                GrayImage::from_fn(width, height, |x, y| {
                    let idx = y as usize * w + x as usize;
                    // The zero offset always contributes weight 1.
                    let value = acc[c * w * h + idx] / total[idx];
                    Luma([value.round().clamp(0.0, 255.0) as u8])
                })
            })
            .collect()
    }
}

/// `exp(-mean_ssd / h²)` tabulated by integer mean distance.
struct WeightTable {
    samples: f64,
    table: Vec<f64>,
}

impl WeightTable {
    fn new(h: f32, samples: f64) -> Self {
        let h2 = f64::from(h) * f64::from(h);
        let mut table = Vec::new();
        if h2 > 0.0 {
            loop {
                let w = (-(table.len() as f64) / h2).exp();
                if w < WEIGHT_FLOOR {
                    break;
                }
                table.push(w);
            }
        } else {
            table.push(1.0);
        }
        Self { samples, table }
    }

    #[inline]
    fn lookup(&self, ssd: u64) -> f64 {
        let mean = (ssd as f64 / self.samples) as usize;
        self.table.get(mean).copied().unwrap_or(0.0)
    }
}
