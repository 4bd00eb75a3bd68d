//! Edge-seeded exterior flood fill.
//!
//! Breadth-first traversal from the four image borders that collects the
//! background pixels reachable without crossing an outline pixel. Transparent
//! pixels are pass-through, outline pixels are impermeable walls, and
//! anything else either matches the background predicate (removed, traversal
//! continues) or halts the traversal on the spot, so the fill can never leak
//! into the subject interior.

use std::collections::VecDeque;

use image::RgbaImage;

use crate::classify;
use crate::config::{CleanupConfig, FillRule};

/// Compute the removal mask for the exterior fill without mutating the
/// image. The mask is `width * height` booleans in row-major order; `true`
/// marks a pixel to be cleared.
#[must_use]
pub fn exterior_removal_mask(img: &RgbaImage, cfg: &CleanupConfig) -> Vec<bool> {
    let (w, h) = (img.width(), img.height());
    let len = (w as usize) * (h as usize);
    let mut visited = vec![false; len];
    let mut remove = vec![false; len];
    if len == 0 {
        return remove;
    }

    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + (x as usize);

    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();
    for x in 0..w {
        queue.push_back((x, 0));
        queue.push_back((x, h - 1));
    }
    for y in 0..h {
        queue.push_back((0, y));
        queue.push_back((w - 1, y));
    }

    while let Some((x, y)) = queue.pop_front() {
        if visited[idx(x, y)] {
            continue;
        }
        visited[idx(x, y)] = true;

        let px = *img.get_pixel(x, y);

        let expand = if px.0[3] == 0 {
            // Transparent: pass through without marking.
            true
        } else if classify::is_outline(px, cfg) {
            // Outline: wall. Never removed, never crossed.
            false
        } else {
            let removable = match cfg.fill_rule {
                FillRule::MatchBackground => match classify::checker_tone(px, cfg) {
                    Some(tone) => classify::confirms_checkerboard(img, x, y, tone, cfg),
                    None => classify::is_background_solid(px, cfg),
                },
                FillRule::ClearToOutline => true,
            };
            if removable {
                remove[idx(x, y)] = true;
            }
            removable
        };

        if expand {
            for &(dx, dy) in cfg.fill_connectivity.offsets() {
                let nx = i64::from(x) + i64::from(dx);
                let ny = i64::from(y) + i64::from(dy);
                if nx < 0 || ny < 0 || nx >= i64::from(w) || ny >= i64::from(h) {
                    continue;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let (nx, ny) = (nx as u32, ny as u32);
                if !visited[idx(nx, ny)] {
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    remove
}

/// Run the exterior fill and clear the marked pixels to `(0,0,0,0)`.
/// Returns the number of pixels removed.
pub fn remove_exterior(img: &mut RgbaImage, cfg: &CleanupConfig) -> usize {
    let mask = exterior_removal_mask(img, cfg);
    apply_mask(img, &mask)
}

/// Clear every masked pixel; returns how many were cleared.
pub(crate) fn apply_mask(img: &mut RgbaImage, mask: &[bool]) -> usize {
    let mut removed = 0;
    for (i, px) in img.pixels_mut().enumerate() {
        if mask[i] {
            *px = image::Rgba([0, 0, 0, 0]);
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const CHECKER_LIGHT: Rgba<u8> = Rgba([250, 250, 250, 255]);
    const CHECKER_DARK: Rgba<u8> = Rgba([205, 205, 205, 255]);
    const OUTLINE: Rgba<u8> = Rgba([30, 30, 30, 255]);
    const BODY: Rgba<u8> = Rgba([255, 120, 60, 255]);

    fn checkerboard(w: u32, h: u32, tile: u32) -> RgbaImage {
        let mut img = RgbaImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let px = if ((x / tile) + (y / tile)) % 2 == 0 {
                    CHECKER_LIGHT
                } else {
                    CHECKER_DARK
                };
                img.put_pixel(x, y, px);
            }
        }
        img
    }

    #[test]
    fn clears_a_full_checkerboard_canvas() {
        let mut img = checkerboard(32, 32, 4);
        let removed = remove_exterior(&mut img, &CleanupConfig::default());
        assert_eq!(removed, 32 * 32);
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn halts_at_a_closed_outline_ring() {
        // Checkerboard everywhere, with a closed outline rectangle whose
        // interior is also checkerboard-toned. The interior must survive.
        let mut img = checkerboard(20, 20, 2);
        for x in 5..15 {
            img.put_pixel(x, 5, OUTLINE);
            img.put_pixel(x, 14, OUTLINE);
        }
        for y in 5..15 {
            img.put_pixel(5, y, OUTLINE);
            img.put_pixel(14, y, OUTLINE);
        }

        let mask = exterior_removal_mask(&img, &CleanupConfig::default());
        for y in 6..14 {
            for x in 6..14 {
                assert!(
                    !mask[(y * 20 + x) as usize],
                    "interior pixel ({x},{y}) leaked into the removal set"
                );
            }
        }

        let removed = remove_exterior(&mut img, &CleanupConfig::default());
        assert!(removed > 0);
        // Ring and interior intact.
        assert_eq!(*img.get_pixel(5, 5), OUTLINE);
        assert!(img.get_pixel(7, 7).0[3] > 0);
    }

    #[test]
    fn halts_at_subject_pixels_without_removing_them() {
        let mut img = checkerboard(16, 16, 4);
        for y in 4..12 {
            for x in 4..12 {
                img.put_pixel(x, y, BODY);
            }
        }
        let removed = remove_exterior(&mut img, &CleanupConfig::default());
        assert_eq!(removed, 16 * 16 - 8 * 8);
        for y in 4..12 {
            for x in 4..12 {
                assert_eq!(*img.get_pixel(x, y), BODY);
            }
        }
    }

    #[test]
    fn solid_subject_canvas_loses_nothing() {
        let mut img = RgbaImage::from_pixel(24, 24, BODY);
        assert_eq!(remove_exterior(&mut img, &CleanupConfig::default()), 0);
    }

    #[test]
    fn transparent_border_is_pass_through_not_removed() {
        // Subject with a 2px transparent border: traversal crosses the
        // border, halts at the subject, removes nothing.
        let mut img = RgbaImage::new(20, 20);
        for y in 2..18 {
            for x in 2..18 {
                img.put_pixel(x, y, BODY);
            }
        }
        let before = img.clone();
        assert_eq!(remove_exterior(&mut img, &CleanupConfig::default()), 0);
        assert_eq!(img, before);
    }

    #[test]
    fn clear_to_outline_strips_light_body_colors_outside_the_ring() {
        // A white-fur-like tone outside the outline ring that the background
        // predicate would also match, plus one saturated stray pixel that it
        // would not: ClearToOutline removes both.
        let mut img = RgbaImage::from_pixel(12, 12, Rgba([248, 248, 248, 255]));
        img.put_pixel(1, 1, BODY);
        for x in 4..8 {
            img.put_pixel(x, 4, OUTLINE);
            img.put_pixel(x, 7, OUTLINE);
        }
        for y in 4..8 {
            img.put_pixel(4, y, OUTLINE);
            img.put_pixel(7, y, OUTLINE);
        }

        let cfg = CleanupConfig::white_subject();
        // Everything except the 4x4 outlined block (ring plus interior) goes.
        let removed = remove_exterior(&mut img, &cfg);
        assert_eq!(removed, 12 * 12 - 4 * 4);
        assert_eq!(img.get_pixel(1, 1).0[3], 0);
        // Ring and the 2x2 interior survive.
        assert_eq!(*img.get_pixel(4, 4), OUTLINE);
        assert!(img.get_pixel(5, 5).0[3] > 0);
    }

    #[test]
    fn strict_gate_protects_a_solid_light_region() {
        // Flat field in the light band with no alternation: with the strict
        // preset nothing matches, so nothing is removed.
        let mut img = RgbaImage::from_pixel(10, 10, CHECKER_LIGHT);
        let removed = remove_exterior(&mut img, &CleanupConfig::strict_checker());
        assert_eq!(removed, 0);
    }

    #[test]
    fn strict_gate_still_clears_a_true_checkerboard() {
        let mut img = checkerboard(16, 16, 1);
        let removed = remove_exterior(&mut img, &CleanupConfig::strict_checker());
        assert_eq!(removed, 16 * 16);
    }

    #[test]
    fn empty_image_is_a_no_op() {
        let mut img = RgbaImage::new(0, 0);
        assert_eq!(remove_exterior(&mut img, &CleanupConfig::default()), 0);
    }
}
