//! Build targets and the artifacts they produce.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// Base name shared by every atlas this crate builds.
pub const DEFAULT_ATLAS_NAME: &str = "game";

/// Extension of the atlas description file.
pub const DESCRIPTION_EXTENSION: &str = "atlas";

/// Extension of the atlas image pages.
pub const IMAGE_EXTENSION: &str = "png";

/// Label used for the base game target in logs and reports.
pub const BASE_TARGET_LABEL: &str = "base";

/// One packing job: a source image directory and where its atlas goes.
///
/// Targets are created by the [`AtlasBuilder`](crate::AtlasBuilder) for the base
/// asset directory and for every qualifying mod. They are never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    label: String,
    source_dir: Utf8PathBuf,
    output_dir: Utf8PathBuf,
    atlas_name: String,
}

impl BuildTarget {
    /// Create a target.
    ///
    /// # Arguments
    ///
    /// * `label` - Human-readable name (`"base"` or the mod directory name)
    /// * `source_dir` - Directory holding the source images
    /// * `output_dir` - Directory that receives `<atlas_name>.atlas` and `<atlas_name>.png`
    /// * `atlas_name` - Base file name of the artifacts
    pub fn new(
        label: impl Into<String>,
        source_dir: impl Into<Utf8PathBuf>,
        output_dir: impl Into<Utf8PathBuf>,
        atlas_name: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            atlas_name: atlas_name.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source_dir(&self) -> &Utf8Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn atlas_name(&self) -> &str {
        &self.atlas_name
    }

    /// `<output_dir>/<atlas_name>.atlas`
    pub fn description_path(&self) -> Utf8PathBuf {
        description_path(&self.output_dir, &self.atlas_name)
    }

    /// `<output_dir>/<atlas_name>.png`, the first image page.
    pub fn image_path(&self) -> Utf8PathBuf {
        page_path(&self.output_dir, &self.atlas_name, 0)
    }

    /// The existing artifact pair, if both files are present.
    ///
    /// Returns `Ok(None)` when either file is missing. The returned
    /// [`AtlasOutput::modified`] is the description file's modification time.
    pub fn existing_output(&self) -> std::io::Result<Option<AtlasOutput>> {
        let description_path = self.description_path();
        let image_path = self.image_path();

        if !description_path.is_file() || !image_path.is_file() {
            return Ok(None);
        }

        let modified = std::fs::metadata(&description_path)?.modified()?;
        Ok(Some(AtlasOutput {
            description_path,
            image_path,
            modified,
        }))
    }
}

/// An atlas artifact pair already on disk.
///
/// Never modified in place; a new [`Packer`](crate::Packer) run supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasOutput {
    pub description_path: Utf8PathBuf,
    pub image_path: Utf8PathBuf,
    /// Watermark: sources modified after this make the atlas stale.
    pub modified: SystemTime,
}

pub(crate) fn description_path(output_dir: &Utf8Path, atlas_name: &str) -> Utf8PathBuf {
    output_dir.join(format!("{atlas_name}.{DESCRIPTION_EXTENSION}"))
}

/// Page file path for a zero-based page index: `game.png`, `game2.png`, `game3.png`, ...
pub(crate) fn page_path(output_dir: &Utf8Path, atlas_name: &str, index: usize) -> Utf8PathBuf {
    output_dir.join(page_file_name(atlas_name, index))
}

pub(crate) fn page_file_name(atlas_name: &str, index: usize) -> String {
    if index == 0 {
        format!("{atlas_name}.{IMAGE_EXTENSION}")
    } else {
        format!("{atlas_name}{}.{IMAGE_EXTENSION}", index + 1)
    }
}
