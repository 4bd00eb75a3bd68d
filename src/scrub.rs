//! Full-grid scrub passes: isolated checkerboard speckles and bottom-band
//! watermark text.
//!
//! Both passes combine a color test with a local density-of-transparency
//! test: a matching pixel is only erased when its surrounding window is
//! mostly empty, so genuinely gray subject regions (surrounded by opaque
//! subject pixels) are left alone. Candidates are collected first and cleared
//! afterwards; cascades are handled by the engine's fixed-point loop.

use image::RgbaImage;

use crate::classify;
use crate::config::CleanupConfig;
use crate::flood::apply_mask;

/// Window statistics around a pixel, center excluded, clipped to bounds.
struct Window {
    transparent: u32,
    colorful: u32,
    total: u32,
}

fn window_stats(img: &RgbaImage, x: u32, y: u32, radius: i32, cfg: &CleanupConfig) -> Window {
    let mut stats = Window {
        transparent: 0,
        colorful: 0,
        total: 0,
    };
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = i64::from(x) + i64::from(dx);
            let ny = i64::from(y) + i64::from(dy);
            if nx < 0 || ny < 0 || nx >= i64::from(img.width()) || ny >= i64::from(img.height()) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let npx = *img.get_pixel(nx as u32, ny as u32);
            stats.total += 1;
            if npx.0[3] == 0 {
                stats.transparent += 1;
            } else if classify::is_colorful(npx, cfg) {
                stats.colorful += 1;
            }
        }
    }
    stats
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        count as f32 / total as f32
    }
}

/// Erase checkerboard-tone pixels whose surrounding window is mostly
/// transparent. Cleans remnants the exterior fill could not reach.
/// Returns the number of pixels removed.
pub fn scrub_isolated_speckles(img: &mut RgbaImage, cfg: &CleanupConfig) -> usize {
    let (w, h) = (img.width(), img.height());
    let mut mask = vec![false; (w as usize) * (h as usize)];

    for y in 0..h {
        for x in 0..w {
            let px = *img.get_pixel(x, y);
            if px.0[3] == 0 || classify::checker_tone(px, cfg).is_none() {
                continue;
            }
            let stats = window_stats(img, x, y, cfg.speckle_window_radius, cfg);
            if ratio(stats.transparent, stats.total) > cfg.speckle_transparent_ratio {
                mask[(y as usize) * (w as usize) + (x as usize)] = true;
            }
        }
    }

    apply_mask(img, &mask)
}

/// Erase watermark text in the bottom band: uniform mid-gray pixels whose
/// window is mostly transparent and nearly free of saturated subject colors.
/// Outline pixels are exempt. Returns the number of pixels removed.
pub fn scrub_watermark_text(img: &mut RgbaImage, cfg: &CleanupConfig) -> usize {
    let (w, h) = (img.width(), img.height());
    let mut mask = vec![false; (w as usize) * (h as usize)];
    let band_top = h.saturating_sub(cfg.text_band_height);

    for y in band_top..h {
        for x in 0..w {
            let px = *img.get_pixel(x, y);
            if px.0[3] == 0 || classify::is_outline(px, cfg) || !classify::is_text_tone(px, cfg)
            {
                continue;
            }
            let stats = window_stats(img, x, y, cfg.text_window_radius, cfg);
            if ratio(stats.transparent, stats.total) > cfg.text_transparent_ratio
                && ratio(stats.colorful, stats.total) < cfg.text_colorful_ratio
            {
                mask[(y as usize) * (w as usize) + (x as usize)] = true;
            }
        }
    }

    apply_mask(img, &mask)
}
