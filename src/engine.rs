//! Core sprite cleanup engine.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::components;
use crate::config::CleanupConfig;
use crate::error::Result;
use crate::flood;
use crate::scrub;

/// Options controlling cleanup processing behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Run the corner badge removal pass.
    pub remove_badges: bool,
    /// Run the stray small-component removal pass.
    pub remove_stray: bool,
    /// Run the bottom-band watermark text pass.
    pub remove_text: bool,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            remove_badges: true,
            remove_stray: true,
            remove_text: true,
            verbose: false,
            quiet: false,
        }
    }
}

/// Removed-pixel counts per pass, accumulated over pipeline iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupReport {
    /// Pixels removed by the edge-seeded exterior fill.
    pub background: usize,
    /// Pixels removed by the isolated-speckle scrub.
    pub speckles: usize,
    /// Pixels removed as corner badges.
    pub badges: usize,
    /// Pixels removed as stray small components.
    pub stray: usize,
    /// Pixels removed as watermark text.
    pub text: usize,
    /// Pipeline iterations executed before reaching a fixed point (or cap).
    pub iterations: u32,
}

impl CleanupReport {
    /// Total pixels removed across all passes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.background + self.speckles + self.badges + self.stray + self.text
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (nothing to remove, left untouched).
    pub skipped: bool,
    /// Total pixels removed.
    pub removed: usize,
    /// Human-readable status message.
    pub message: String,
}

/// The cleanup engine holding the threshold configuration.
///
/// Create once and reuse across images. Each call to [`CleanupEngine::clean`]
/// runs the pass sequence (exterior fill, speckle scrub, badge removal,
/// stray-component removal, text scrub) repeatedly until an iteration
/// removes zero pixels, capped at the configured maximum.
#[derive(Debug, Clone, Default)]
pub struct CleanupEngine {
    config: CleanupConfig,
}

impl CleanupEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: CleanupConfig) -> Self {
        Self { config }
    }

    /// The engine's threshold configuration.
    #[must_use]
    pub fn config(&self) -> &CleanupConfig {
        &self.config
    }

    /// Run the cleanup pipeline on an image in place.
    ///
    /// Passes are stateless with respect to each other; the whole sequence
    /// repeats until a full iteration removes nothing, so a cleaned image is
    /// a fixed point of this function.
    pub fn clean(&self, image: &mut RgbaImage, opts: &ProcessOptions) -> CleanupReport {
        let cfg = &self.config;
        let mut report = CleanupReport::default();

        for _ in 0..cfg.max_passes.max(1) {
            let mut this_round = 0usize;

            let n = flood::remove_exterior(image, cfg);
            report.background += n;
            this_round += n;

            let n = scrub::scrub_isolated_speckles(image, cfg);
            report.speckles += n;
            this_round += n;

            if opts.remove_badges {
                let n = components::remove_badge_components(image, cfg);
                report.badges += n;
                this_round += n;
            }

            if opts.remove_stray {
                let n = components::remove_stray_components(image, cfg);
                report.stray += n;
                this_round += n;
            }

            if opts.remove_text {
                let n = scrub::scrub_watermark_text(image, cfg);
                report.text += n;
                this_round += n;
            }

            report.iterations += 1;
            if this_round == 0 {
                break;
            }
        }

        report
    }

    /// Process a single image file: load, clean, save.
    ///
    /// Returns a [`ProcessResult`] indicating success, skip, or failure; all
    /// failures are captured in the result rather than returned as errors.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path, opts: &ProcessOptions) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            skipped: false,
            removed: 0,
            message: String::new(),
        };

        let dyn_img = match image::open(input) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let mut rgba = dyn_img.to_rgba8();
        let report = self.clean(&mut rgba, opts);
        result.removed = report.total();

        // Nothing removed and nowhere new to write: leave the file alone.
        if report.total() == 0 && input == output {
            result.success = true;
            result.skipped = true;
            result.message = "Already clean, no pixels removed".to_string();
            return result;
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match save_png(&rgba, output) {
            Ok(()) => {
                result.success = true;
                result.message = format!(
                    "Removed {} pixels (background {}, speckles {}, badges {}, stray {}, text {}) in {} {}",
                    report.total(),
                    report.background,
                    report.speckles,
                    report.badges,
                    report.stray,
                    report.text,
                    report.iterations,
                    if report.iterations == 1 { "pass" } else { "passes" },
                );
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// With `output_dir` set, cleaned copies are written there under the same
    /// file names (as PNG); without it, files are rewritten in place. Uses
    /// parallel iteration when the `cli` feature is enabled (via rayon).
    ///
    /// # Panics
    ///
    /// Panics if any directory entry has no filename (should not happen for
    /// regular files).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_supported_image(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    removed: 0,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        if let Some(dir) = output_dir {
            if !dir.exists() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    return vec![ProcessResult {
                        path: dir.to_path_buf(),
                        success: false,
                        skipped: false,
                        removed: 0,
                        message: format!("Failed to create output directory: {e}"),
                    }];
                }
            }
        }

        let job = |input_path: PathBuf| {
            let output_path = match output_dir {
                Some(dir) => {
                    let filename = input_path.file_name().unwrap();
                    dir.join(filename).with_extension("png")
                }
                None => input_path.clone(),
            };
            self.process_file(&input_path, &output_path, opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(|entry| job(entry.path())).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(|entry| job(entry.path())).collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image as PNG, the only alpha-preserving format the cleanup
/// pipeline writes.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"sprite.jpg"` becomes `"sprite_cleaned.png"`. The extension is
/// always `.png` since the cleaned image needs an alpha channel.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_cleaned.png"))
}
