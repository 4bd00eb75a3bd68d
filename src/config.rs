//! Cleanup pipeline configuration.
//!
//! Every threshold the passes consult lives here under a name, so pipeline
//! variants are configuration choices instead of code forks. The defaults
//! reproduce the most common variant; [`CleanupConfig::strict_checker`] and
//! [`CleanupConfig::white_subject`] reproduce the stricter and the
//! light-toned-subject variants.

/// Pixel adjacency used by a grid traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Orthogonal neighbors only.
    Four,
    /// Orthogonal plus diagonal neighbors.
    Eight,
}

impl Connectivity {
    /// Neighbor offsets for this adjacency.
    #[must_use]
    pub fn offsets(self) -> &'static [(i32, i32)] {
        const FOUR: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(i32, i32); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (-1, 1),
            (1, -1),
            (1, 1),
        ];
        match self {
            Self::Four => &FOUR,
            Self::Eight => &EIGHT,
        }
    }
}

/// What the exterior flood fill does when it reaches an opaque pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    /// Remove and traverse only pixels matching the background predicate;
    /// halt at every other opaque pixel.
    MatchBackground,
    /// Remove and traverse every opaque pixel that is not an outline pixel.
    /// For subjects whose body shares tones with the background, where only
    /// the drawn outline separates inside from outside.
    ClearToOutline,
}

/// Which corner of the canvas a badge region is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

/// A corner region scanned for badge components.
///
/// Components discovered inside the region are erased when their bounding box
/// never extends past `max_extent_x` / `max_extent_y` fractions of the canvas
/// (measured from the anchored corner).
#[derive(Debug, Clone, Copy)]
pub struct BadgeRegion {
    /// Anchored corner.
    pub corner: Corner,
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
    /// Maximum horizontal extent of a badge, as a fraction of canvas width.
    pub max_extent_x: f32,
    /// Maximum vertical extent of a badge, as a fraction of canvas height.
    pub max_extent_y: f32,
}

/// Named thresholds for every cleanup pass.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Upper bound (exclusive) on red and green for an outline pixel.
    pub outline_max_rg: u8,
    /// Upper bound (exclusive) on blue for an outline pixel.
    pub outline_max_b: u8,

    /// Minimum channel value for the light checkerboard tone.
    pub checker_light_min: u8,
    /// Lower bound of the dark checkerboard tone band.
    pub checker_dark_min: u8,
    /// Upper bound of the dark checkerboard tone band.
    pub checker_dark_max: u8,
    /// Maximum spread between channels for a checkerboard tone.
    pub checker_uniformity: u8,
    /// When set, a checkerboard candidate additionally needs this many opaque
    /// orthogonal neighbors of the opposite tone.
    pub checker_confirm_neighbors: Option<u8>,

    /// Minimum channel value for the solid light background fill.
    pub solid_background_min: u8,
    /// Maximum spread between channels for the solid background fill.
    pub solid_uniformity: u8,

    /// Lower bound of the watermark-text brightness band.
    pub text_brightness_min: u8,
    /// Upper bound of the watermark-text brightness band.
    pub text_brightness_max: u8,
    /// Maximum spread between channels for watermark text.
    pub text_uniformity: u8,
    /// Window radius for the text transparency/colorfulness context test.
    pub text_window_radius: i32,
    /// Minimum fraction of transparent window pixels for text removal.
    pub text_transparent_ratio: f32,
    /// Maximum fraction of colorful window pixels for text removal.
    pub text_colorful_ratio: f32,
    /// Minimum channel difference for a pixel to count as colorful.
    pub colorful_channel_delta: u8,
    /// Height of the bottom band scanned for watermark text, in pixels.
    pub text_band_height: u32,

    /// Window radius for the isolated-speckle scrub.
    pub speckle_window_radius: i32,
    /// Minimum fraction of transparent window pixels for speckle removal.
    pub speckle_transparent_ratio: f32,

    /// Components smaller than this fraction of the main component are
    /// removal candidates.
    pub min_component_ratio: f32,
    /// A small component is erased only when its mean vertical position lies
    /// below this fraction of the image height.
    pub bottom_region_fraction: f32,
    /// Corner regions scanned for badge components.
    pub badge_regions: Vec<BadgeRegion>,

    /// Adjacency used by the exterior flood fill.
    pub fill_connectivity: Connectivity,
    /// Adjacency used by component extraction.
    pub component_connectivity: Connectivity,
    /// Halt policy of the exterior flood fill.
    pub fill_rule: FillRule,

    /// Cap on full-pipeline iterations while converging to a fixed point.
    pub max_passes: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            outline_max_rg: 80,
            outline_max_b: 100,
            checker_light_min: 240,
            checker_dark_min: 195,
            checker_dark_max: 235,
            checker_uniformity: 10,
            checker_confirm_neighbors: None,
            solid_background_min: 180,
            solid_uniformity: 20,
            text_brightness_min: 40,
            text_brightness_max: 180,
            text_uniformity: 15,
            text_window_radius: 4,
            text_transparent_ratio: 0.4,
            text_colorful_ratio: 0.1,
            colorful_channel_delta: 20,
            text_band_height: 100,
            speckle_window_radius: 3,
            speckle_transparent_ratio: 0.4,
            min_component_ratio: 0.01,
            bottom_region_fraction: 0.7,
            badge_regions: vec![BadgeRegion {
                corner: Corner::TopLeft,
                width: 200,
                height: 120,
                max_extent_x: 0.5,
                max_extent_y: 0.4,
            }],
            fill_connectivity: Connectivity::Four,
            component_connectivity: Connectivity::Eight,
            fill_rule: FillRule::MatchBackground,
            max_passes: 3,
        }
    }
}

impl CleanupConfig {
    /// Variant requiring opposite-tone neighbors before a checkerboard pixel
    /// is removed. Protects solid light subject regions that happen to fall
    /// inside the generic tone bands.
    #[must_use]
    pub fn strict_checker() -> Self {
        Self {
            checker_confirm_neighbors: Some(2),
            ..Self::default()
        }
    }

    /// Variant for white or very light subjects: the fill clears everything
    /// outside the drawn outline and uses diagonal adjacency so it slips
    /// through single-pixel gaps in the background.
    #[must_use]
    pub fn white_subject() -> Self {
        Self {
            checker_dark_min: 170,
            fill_connectivity: Connectivity::Eight,
            fill_rule: FillRule::ClearToOutline,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_offset_counts() {
        assert_eq!(Connectivity::Four.offsets().len(), 4);
        assert_eq!(Connectivity::Eight.offsets().len(), 8);
    }

    #[test]
    fn default_config_is_the_lenient_variant() {
        let cfg = CleanupConfig::default();
        assert!(cfg.checker_confirm_neighbors.is_none());
        assert_eq!(cfg.fill_rule, FillRule::MatchBackground);
        assert_eq!(cfg.fill_connectivity, Connectivity::Four);
        assert_eq!(cfg.component_connectivity, Connectivity::Eight);
    }

    #[test]
    fn presets_flip_the_expected_policies() {
        assert_eq!(
            CleanupConfig::strict_checker().checker_confirm_neighbors,
            Some(2)
        );

        let white = CleanupConfig::white_subject();
        assert_eq!(white.fill_rule, FillRule::ClearToOutline);
        assert_eq!(white.fill_connectivity, Connectivity::Eight);
        assert!(white.checker_dark_min < CleanupConfig::default().checker_dark_min);
    }
}
