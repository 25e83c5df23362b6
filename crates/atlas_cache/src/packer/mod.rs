//! The packing capability invoked for stale targets.
//!
//! The [`AtlasBuilder`](crate::AtlasBuilder) never renders pixels itself. It hands
//! each stale target to a [`Packer`], which is injected so the build pass can be
//! exercised with a fake that only records calls. [`ShelfPacker`] is the
//! implementation shipped with this crate.
//!
//! # Atomicity
//!
//! A packer must leave a target either with a complete, mutually consistent
//! description and image set, or with the previous pair untouched. The build
//! pass relies on this but cannot check it.

mod description;
mod shelf;
mod staging;

pub use shelf::ShelfPacker;

use crate::error::Result;
use crate::settings::PackSettings;
use camino::{Utf8Path, Utf8PathBuf};

/// Artifacts written by a successful [`Packer::pack`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOutput {
    /// `<output_dir>/<atlas_name>.atlas`. `None` if there was nothing to pack.
    pub description_path: Option<Utf8PathBuf>,
    /// Image pages in description order; the first is `<atlas_name>.png`.
    pub page_paths: Vec<Utf8PathBuf>,
    /// Number of regions listed in the description.
    pub regions: usize,
}

/// Produces an atlas from a directory of images.
///
/// # Implementing
///
/// Implementations must be [`Send`] so the builder can be moved across threads.
/// Methods take `&mut self` so stateful packers (and test doubles) need no
/// interior mutability.
pub trait Packer: Send {
    /// Pack every image under `source_dir` into `<output_dir>/<atlas_name>.atlas`
    /// plus one or more `.png` pages.
    ///
    /// Failures are not retried by the caller.
    fn pack(
        &mut self,
        settings: &PackSettings,
        source_dir: &Utf8Path,
        output_dir: &Utf8Path,
        atlas_name: &str,
    ) -> Result<PackOutput>;
}
