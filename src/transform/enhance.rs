//! Contrast enhancement on 8-bit single-channel images.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    /// Histogram bins are clipped at `clip_limit * tile_area / 256`.
    /// Zero or negative disables clipping.
    pub clip_limit: f32,
    /// Number of tiles along x and y.
    pub grid: (u32, u32),
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 4.0,
            grid: (8, 8),
        }
    }
}

/// Global histogram equalization.
///
/// The lowest occupied level maps to 0 and the highest to 255; levels in
/// between follow the cumulative histogram. A constant image is returned
/// unchanged.
pub fn equalize_histogram(src: &GrayImage) -> GrayImage {
    let hist = imageproc::stats::histogram(src).channels[0];
    let total: u32 = hist.iter().sum();

    let Some(first) = hist.iter().position(|&count| count > 0) else {
        return src.clone();
    };
    if hist[first] == total {
        return src.clone();
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut lut = [0u8; BINS];
    let mut cdf = 0u32;
    for bin in first + 1..BINS {
        cdf += hist[bin];
        lut[bin] = (cdf as f32 * scale).round().min(255.0) as u8;
    }

    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        Luma([lut[src.get_pixel(x, y)[0] as usize]])
    })
}

/// Contrast-limited adaptive histogram equalization, as OpenCV computes it.
///
/// Unless both sides divide evenly into the grid, the image is extended
/// (bottom and right, reflect-101) by `tiles - side % tiles` on each axis.
/// Every tile of the extended image gets its own clipped equalization
/// table, and each source pixel is bilinearly blended from the tables of
/// the four nearest tile centers.
pub fn clahe(src: &GrayImage, params: ClaheParams) -> GrayImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }

    let (tiles_x, tiles_y) = (params.grid.0.max(1), params.grid.1.max(1));
    let (ext_width, ext_height) = extended_size(width, height, tiles_x, tiles_y);
    let tile_w = ext_width / tiles_x;
    let tile_h = ext_height / tiles_y;

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            luts.push(tile_lut(
                src,
                (tx * tile_w, (tx + 1) * tile_w),
                (ty * tile_h, (ty + 1) * tile_h),
                params.clip_limit,
            ));
        }
    }
    let lut_at = |tx: usize, ty: usize| &luts[ty * tiles_x as usize + tx];

    let x_neighbours: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| neighbours(x, tile_w, tiles_x))
        .collect();

    GrayImage::from_fn(width, height, |x, y| {
        let (ty1, ty2, ya) = neighbours(y, tile_h, tiles_y);
        let (tx1, tx2, xa) = x_neighbours[x as usize];
        let v = src.get_pixel(x, y)[0] as usize;

        let top = (1.0 - xa) * lut_at(tx1, ty1)[v] as f32 + xa * lut_at(tx2, ty1)[v] as f32;
        let bottom = (1.0 - xa) * lut_at(tx1, ty2)[v] as f32 + xa * lut_at(tx2, ty2)[v] as f32;
        let blended = (1.0 - ya) * top + ya * bottom;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Size of the image the tile tables are computed on.
///
/// Both axes are padded as soon as either one does not divide evenly, so an
/// evenly dividing axis still grows by a whole tile.
fn extended_size(width: u32, height: u32, tiles_x: u32, tiles_y: u32) -> (u32, u32) {
    if width % tiles_x == 0 && height % tiles_y == 0 {
        (width, height)
    } else {
        (
            width + tiles_x - width % tiles_x,
            height + tiles_y - height % tiles_y,
        )
    }
}

/// Mirrors `pos` back into `0..len` without repeating the edge sample.
fn reflect101(pos: u32, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let pos = pos % period;
    if pos < len {
        pos
    } else {
        period - pos
    }
}

/// The two tiles whose centers surround `pos`, and the blend weight of the second.
fn neighbours(pos: u32, tile_len: u32, tiles: u32) -> (usize, usize, f32) {
    let f = pos as f32 / tile_len as f32 - 0.5;
    let lower = f.floor();
    let weight = f - lower;

    let last = tiles as i64 - 1;
    let first = (lower as i64).clamp(0, last) as usize;
    let second = (lower as i64 + 1).clamp(0, last) as usize;
    (first, second, weight)
}

fn tile_lut(src: &GrayImage, xs: (u32, u32), ys: (u32, u32), clip_limit: f32) -> [u8; BINS] {
    let (width, height) = src.dimensions();
    let mut hist = [0u32; BINS];
    for y in ys.0..ys.1 {
        for x in xs.0..xs.1 {
            let sample = src.get_pixel(reflect101(x, width), reflect101(y, height))[0];
            hist[sample as usize] += 1;
        }
    }

    let area = (xs.1 - xs.0) * (ys.1 - ys.0);
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        clip_histogram(&mut hist, limit);
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cdf = 0u32;
    for (bin, count) in hist.iter().enumerate() {
        cdf += count;
        lut[bin] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Clips every bin at `limit` and spreads the excess evenly over all bins.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let batch = excess / BINS as u32;
    let residual = (excess % BINS as u32) as usize;
    for count in hist.iter_mut() {
        *count += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        for idx in (0..BINS).step_by(step).take(residual) {
            hist[idx] += 1;
        }
    }
}
