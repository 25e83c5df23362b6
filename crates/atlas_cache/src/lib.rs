//! Incremental texture atlas builds for a base game and its mods.
//!
//! Rendering many small images from one combined texture avoids a texture
//! switch per image. This crate keeps those combined atlases up to date:
//!
//! - **Incremental rebuilds**: An atlas is repacked only when a source image is
//!   newer than its description file, or when the atlas is missing
//! - **Mod support**: Every mod with an `Images` directory gets its own atlas
//!   inside the mod directory
//! - **Pluggable packing**: The [`Packer`] trait is injected; [`ShelfPacker`]
//!   is the bundled implementation
//! - **Atomic output**: [`ShelfPacker`] replaces an atlas all-or-nothing
//!
//! # Example
//!
//! ```no_run
//! use atlas_cache::{AtlasBuilder, PackSettings, ShelfPacker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = AtlasBuilder::new("../Images", "mods", Box::new(ShelfPacker::new()))
//!     .with_settings(PackSettings::default())
//!     .with_progress(|progress| {
//!         println!("Stage: {:?}, Target: {}/{}",
//!             progress.stage, progress.current, progress.total);
//!     });
//!
//! let report = builder.build()?;
//! println!("Built {} atlases, skipped {}",
//!     report.targets_built.len(), report.targets_skipped.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod packer;
pub mod scanner;
pub mod settings;
pub mod staleness;
pub mod target;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use builder::{run, AtlasBuilder, BuildProgress, BuildReport, BuildStage};
pub use error::{Error, Result};
pub use packer::{PackOutput, Packer, ShelfPacker};
pub use scanner::{scan, scan_images, ExtensionFilter, SourceFile};
pub use settings::{FilterMode, PackSettings, TextureFilter};
pub use staleness::{check_staleness, is_stale, Staleness};
pub use target::{AtlasOutput, BuildTarget};
