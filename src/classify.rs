//! Pixel color classification.
//!
//! Pure predicates mapping an RGBA value to the categories the cleanup passes
//! act on: outline pixels (traversal barriers), the two alternating
//! checkerboard tones, solid light background fill, and uniform-gray
//! watermark text. Anything else is foreground.
//!
//! Background and checkerboard classification requires full opacity so that
//! antialiased sprite edges (partial alpha) are never treated as background.

use image::{Rgba, RgbaImage};

use crate::config::CleanupConfig;

/// One of the two alternating checkerboard tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerTone {
    /// The near-white tile tone.
    Light,
    /// The light-gray tile tone.
    Dark,
}

impl CheckerTone {
    /// The other tone of the alternating pattern.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Category assigned to a pixel by color alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    /// Fully transparent.
    Transparent,
    /// Dark silhouette-boundary pixel; acts as a flood-fill wall.
    Outline,
    /// Near-white checkerboard tile tone.
    CheckerLight,
    /// Light-gray checkerboard tile tone.
    CheckerDark,
    /// Uniform light background fill outside the checkerboard bands.
    BackgroundSolid,
    /// Mid-brightness uniform gray, the color of watermark text.
    TextTone,
    /// None of the above; part of the subject.
    Foreground,
}

/// Largest pairwise channel difference.
fn channel_spread(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    max - min
}

/// Whether the pixel is a dark outline pixel.
#[must_use]
pub fn is_outline(px: Rgba<u8>, cfg: &CleanupConfig) -> bool {
    let [r, g, b, a] = px.0;
    a > 0 && r < cfg.outline_max_rg && g < cfg.outline_max_rg && b < cfg.outline_max_b
}

/// The checkerboard tone of the pixel, if it matches either band.
#[must_use]
pub fn checker_tone(px: Rgba<u8>, cfg: &CleanupConfig) -> Option<CheckerTone> {
    let [r, g, b, a] = px.0;
    if a != 255 {
        return None;
    }
    if r >= cfg.checker_light_min && g >= cfg.checker_light_min && b >= cfg.checker_light_min {
        return Some(CheckerTone::Light);
    }
    let in_band = |v: u8| (cfg.checker_dark_min..=cfg.checker_dark_max).contains(&v);
    if in_band(r) && in_band(g) && in_band(b) && channel_spread(r, g, b) <= cfg.checker_uniformity {
        return Some(CheckerTone::Dark);
    }
    None
}

/// Whether the pixel is uniform light background fill.
#[must_use]
pub fn is_background_solid(px: Rgba<u8>, cfg: &CleanupConfig) -> bool {
    let [r, g, b, a] = px.0;
    a == 255
        && r >= cfg.solid_background_min
        && g >= cfg.solid_background_min
        && b >= cfg.solid_background_min
        && channel_spread(r, g, b) <= cfg.solid_uniformity
}

/// Whether the pixel matches the exterior-fill background predicate
/// (either checkerboard tone, or solid light fill).
#[must_use]
pub fn is_background(px: Rgba<u8>, cfg: &CleanupConfig) -> bool {
    checker_tone(px, cfg).is_some() || is_background_solid(px, cfg)
}

/// Whether the pixel has the color of watermark text: a uniform gray in the
/// mid-brightness band. Context (surrounding transparency) is checked by the
/// text pass, not here.
#[must_use]
pub fn is_text_tone(px: Rgba<u8>, cfg: &CleanupConfig) -> bool {
    let [r, g, b, a] = px.0;
    let in_band =
        |v: u8| (cfg.text_brightness_min..=cfg.text_brightness_max).contains(&v);
    a > 0
        && in_band(r)
        && in_band(g)
        && in_band(b)
        && channel_spread(r, g, b) <= cfg.text_uniformity
}

/// Whether the pixel is saturated enough to count as subject color in the
/// text pass's neighborhood test.
#[must_use]
pub fn is_colorful(px: Rgba<u8>, cfg: &CleanupConfig) -> bool {
    let [r, g, b, a] = px.0;
    a > 0 && channel_spread(r, g, b) > cfg.colorful_channel_delta
}

/// Classify a pixel by color alone.
#[must_use]
pub fn classify(px: Rgba<u8>, cfg: &CleanupConfig) -> PixelClass {
    if px.0[3] == 0 {
        return PixelClass::Transparent;
    }
    if is_outline(px, cfg) {
        return PixelClass::Outline;
    }
    match checker_tone(px, cfg) {
        Some(CheckerTone::Light) => return PixelClass::CheckerLight,
        Some(CheckerTone::Dark) => return PixelClass::CheckerDark,
        None => {}
    }
    if is_background_solid(px, cfg) {
        return PixelClass::BackgroundSolid;
    }
    if is_text_tone(px, cfg) {
        return PixelClass::TextTone;
    }
    PixelClass::Foreground
}

/// Local checkerboard confirmation: true when at least
/// `cfg.checker_confirm_neighbors` opaque orthogonal neighbors carry the
/// opposite tone. With the gate unset, every candidate passes.
///
/// True checkerboards alternate tile-by-tile, so a pixel on a tile boundary
/// always has opposite-tone neighbors; a solid light subject region does not.
#[must_use]
pub fn confirms_checkerboard(
    img: &RgbaImage,
    x: u32,
    y: u32,
    tone: CheckerTone,
    cfg: &CleanupConfig,
) -> bool {
    let Some(required) = cfg.checker_confirm_neighbors else {
        return true;
    };

    let opposite = tone.opposite();
    let mut found = 0u8;
    for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
        let nx = i64::from(x) + i64::from(dx);
        let ny = i64::from(y) + i64::from(dy);
        if nx < 0 || ny < 0 || nx >= i64::from(img.width()) || ny >= i64::from(img.height()) {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let npx = *img.get_pixel(nx as u32, ny as u32);
        if npx.0[3] > 0 && checker_tone(npx, cfg) == Some(opposite) {
            found += 1;
            if found >= required {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CleanupConfig {
        CleanupConfig::default()
    }

    #[test]
    fn outline_requires_dark_channels_and_nonzero_alpha() {
        assert!(is_outline(Rgba([30, 30, 30, 255]), &cfg()));
        assert!(is_outline(Rgba([70, 60, 95, 200]), &cfg()));
        assert!(!is_outline(Rgba([30, 30, 30, 0]), &cfg()));
        assert!(!is_outline(Rgba([90, 30, 30, 255]), &cfg()));
        assert!(!is_outline(Rgba([30, 30, 110, 255]), &cfg()));
    }

    #[test]
    fn checker_tones_match_their_bands() {
        assert_eq!(
            checker_tone(Rgba([250, 250, 250, 255]), &cfg()),
            Some(CheckerTone::Light)
        );
        assert_eq!(
            checker_tone(Rgba([205, 205, 205, 255]), &cfg()),
            Some(CheckerTone::Dark)
        );
        // Partial alpha is never background.
        assert_eq!(checker_tone(Rgba([250, 250, 250, 128]), &cfg()), None);
        // Non-uniform gray is not a checkerboard tone.
        assert_eq!(checker_tone(Rgba([195, 215, 230, 255]), &cfg()), None);
        // Saturated subject color.
        assert_eq!(checker_tone(Rgba([255, 100, 100, 255]), &cfg()), None);
    }

    #[test]
    fn solid_background_is_uniform_and_light() {
        assert!(is_background_solid(Rgba([190, 195, 200, 255]), &cfg()));
        assert!(!is_background_solid(Rgba([190, 195, 200, 254]), &cfg()));
        assert!(!is_background_solid(Rgba([150, 150, 150, 255]), &cfg()));
        assert!(!is_background_solid(Rgba([255, 180, 200, 255]), &cfg()));
    }

    #[test]
    fn text_tone_is_mid_gray_of_any_alpha() {
        assert!(is_text_tone(Rgba([120, 120, 120, 255]), &cfg()));
        assert!(is_text_tone(Rgba([100, 108, 95, 90]), &cfg()));
        assert!(!is_text_tone(Rgba([30, 30, 30, 255]), &cfg()));
        assert!(!is_text_tone(Rgba([220, 220, 220, 255]), &cfg()));
        assert!(!is_text_tone(Rgba([120, 160, 120, 255]), &cfg()));
        assert!(!is_text_tone(Rgba([120, 120, 120, 0]), &cfg()));
    }

    #[test]
    fn classify_prefers_outline_over_text_tone() {
        // A (70,70,70) pixel sits in both the outline and text bands with
        // the default thresholds; outline wins so the barrier is never eaten.
        assert_eq!(classify(Rgba([70, 70, 70, 255]), &cfg()), PixelClass::Outline);
    }

    #[test]
    fn classify_fallback_is_foreground() {
        assert_eq!(
            classify(Rgba([255, 100, 60, 255]), &cfg()),
            PixelClass::Foreground
        );
        assert_eq!(classify(Rgba([0, 0, 0, 0]), &cfg()), PixelClass::Transparent);
    }

    #[test]
    fn confirmation_passes_on_a_one_pixel_checkerboard() {
        let config = CleanupConfig::strict_checker();

        let mut img = RgbaImage::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                let px = if (x + y) % 2 == 0 {
                    Rgba([250, 250, 250, 255])
                } else {
                    Rgba([205, 205, 205, 255])
                };
                img.put_pixel(x, y, px);
            }
        }

        assert!(confirms_checkerboard(&img, 2, 2, CheckerTone::Light, &config));
        assert!(confirms_checkerboard(&img, 1, 2, CheckerTone::Dark, &config));
    }

    #[test]
    fn confirmation_rejects_a_flat_tone_field() {
        let config = CleanupConfig::strict_checker();
        let mut img = RgbaImage::new(5, 5);
        for px in img.pixels_mut() {
            *px = Rgba([250, 250, 250, 255]);
        }
        assert!(!confirms_checkerboard(&img, 2, 2, CheckerTone::Light, &config));
    }

    #[test]
    fn confirmation_always_passes_when_gate_is_off() {
        let config = CleanupConfig::default();
        let img = RgbaImage::new(3, 3);
        assert!(confirms_checkerboard(&img, 1, 1, CheckerTone::Light, &config));
    }
}
