//! Generate pixel-art game sprites and clean them up.
//!
//! AI image generators hand back sprites on a fake-transparency checkerboard,
//! with watermark text near the bottom edge and the occasional badge or stray
//! fragment. This crate removes all of that, leaving a clean subject on a
//! genuinely transparent background:
//!
//! 1. an edge-seeded flood fill erases the checkerboard/background region
//!    without ever crossing the subject's dark outline,
//! 2. a speckle scrub picks off isolated checkerboard remnants,
//! 3. connected-component passes drop corner badges and small fragments
//!    disconnected from the main subject,
//! 4. a bottom-band scan erases uniform-gray watermark text.
//!
//! # Quick Start
//!
//! ```no_run
//! use sprite_cleanup::{CleanupEngine, ProcessOptions};
//!
//! let engine = CleanupEngine::default();
//! let mut img = image::open("sprite.png").unwrap().to_rgba8();
//! let report = engine.clean(&mut img, &ProcessOptions::default());
//! println!("removed {} pixels in {} passes", report.total(), report.iterations);
//! img.save("sprite_cleaned.png").unwrap();
//! ```
//!
//! # Thresholds
//!
//! Every color band and ratio the passes consult is a named field on
//! [`CleanupConfig`], so the stricter checkerboard gate or the white-subject
//! fill variant are configuration presets rather than separate tools.
//!
//! # Generation
//!
//! With the `generate` feature, [`generate::GenerationClient`] calls an
//! external text-to-image API (OpenAI or Gemini Imagen request shapes),
//! writes the returned bytes to disk, and can run the cleanup engine on each
//! fresh sprite.

#![deny(missing_docs)]

pub mod classify;
pub mod components;
pub mod config;
mod engine;
pub mod error;
pub mod flood;
#[cfg(feature = "generate")]
pub mod generate;
pub mod scrub;

pub use config::{BadgeRegion, CleanupConfig, Connectivity, Corner, FillRule};
pub use engine::{
    default_output_path, is_supported_image, save_png, CleanupEngine, CleanupReport,
    ProcessOptions, ProcessResult,
};
pub use error::{Error, Result};
