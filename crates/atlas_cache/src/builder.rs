//! Build pass orchestration.
//!
//! The [`AtlasBuilder`] runs one incremental pass over every atlas target:
//!
//! 1. Validate the [`PackSettings`] once, before touching any target.
//! 2. Discover targets. The base target comes first and exists only if the base
//!    image directory does (a packaged install ships prebuilt atlases and has
//!    none). Each non-hidden child of the mods root with an `Images` directory
//!    becomes a target writing into the mod's own directory, in file-name order.
//! 3. For each target ask the staleness oracle. Stale targets are handed to the
//!    [`Packer`]; fresh ones cost nothing beyond the scan.
//! 4. Log the total wall-clock time of the pass.
//!
//! A packer failure aborts the pass. Directories that are missing or unreadable
//! while discovering targets only skip the affected target.

use crate::error::{Error, Result};
use crate::packer::Packer;
use crate::scanner::ExtensionFilter;
use crate::settings::PackSettings;
use crate::staleness::{check_staleness, Staleness};
use crate::target::{BuildTarget, BASE_TARGET_LABEL, DEFAULT_ATLAS_NAME};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Name of the image directory inside each mod.
pub const MOD_IMAGES_DIR: &str = "Images";

/// Progress information emitted during a build pass.
///
/// `current`/`total` count targets and are only meaningful during
/// [`Checking`](BuildStage::Checking) and [`Packing`](BuildStage::Packing).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProgress {
    pub stage: BuildStage,
    /// Label of the target being checked or packed.
    pub current_target: Option<String>,
    /// 1-based index of the current target.
    pub current: u32,
    pub total: u32,
}

/// Stages of a build pass.
///
/// Emitted in order: `Discovering` -> (`Checking` -> `Packing`?)* -> `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStage {
    Discovering,
    Checking,
    Packing,
    Complete,
}

/// Summary returned after a build pass completes.
#[derive(Debug)]
pub struct BuildReport {
    /// Targets that were packed during this pass.
    pub targets_built: Vec<BuildTarget>,
    /// Targets whose existing atlas was still fresh.
    pub targets_skipped: Vec<BuildTarget>,
    /// Stale targets the packer found no images for; nothing was written.
    pub targets_empty: Vec<BuildTarget>,
    /// Wall-clock time for the entire pass.
    pub build_time: Duration,
}

type ProgressCallback = Arc<dyn Fn(BuildProgress) + Send + Sync>;

/// Runs incremental atlas builds for the base game and its mods.
///
/// Create a builder with [`new`](Self::new), configure it with the `with_*`
/// methods, then call [`build`](Self::build). The builder holds no state between
/// passes beyond its configuration; every pass re-reads the disk.
pub struct AtlasBuilder {
    base_source_dir: Utf8PathBuf,
    base_output_dir: Utf8PathBuf,
    mods_root: Utf8PathBuf,
    atlas_name: String,
    settings: PackSettings,
    extensions: ExtensionFilter,
    force: bool,
    packer: Box<dyn Packer>,
    progress_callback: Option<ProgressCallback>,
}

impl AtlasBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `base_source_dir` - Base game image directory (conventionally `../Images`).
    ///   May be absent.
    /// * `mods_root` - Directory whose children are mods. May be absent.
    /// * `packer` - Packing capability invoked for stale targets.
    pub fn new(
        base_source_dir: impl Into<Utf8PathBuf>,
        mods_root: impl Into<Utf8PathBuf>,
        packer: Box<dyn Packer>,
    ) -> Self {
        Self {
            base_source_dir: base_source_dir.into(),
            base_output_dir: Utf8PathBuf::from("."),
            mods_root: mods_root.into(),
            atlas_name: DEFAULT_ATLAS_NAME.to_string(),
            settings: PackSettings::default(),
            extensions: ExtensionFilter::default(),
            force: false,
            packer,
            progress_callback: None,
        }
    }

    pub fn with_settings(mut self, settings: PackSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Extensions whose modification counts for staleness.
    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    /// Where the base atlas is written (default: the working directory).
    pub fn with_base_output_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_output_dir = dir.into();
        self
    }

    pub fn with_atlas_name(mut self, name: impl Into<String>) -> Self {
        self.atlas_name = name.into();
        self
    }

    /// Pack every target regardless of staleness.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Register a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(BuildProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn settings(&self) -> &PackSettings {
        &self.settings
    }

    /// Discover targets without checking or packing them.
    ///
    /// The base target, if present, is always first. Mod targets follow in
    /// file-name order.
    pub fn collect_targets(&self) -> Vec<BuildTarget> {
        let mut targets = Vec::new();

        if self.base_source_dir.is_dir() {
            targets.push(BuildTarget::new(
                BASE_TARGET_LABEL,
                self.base_source_dir.clone(),
                self.base_output_dir.clone(),
                self.atlas_name.clone(),
            ));
        } else {
            tracing::debug!(
                "Base image directory {} not found, skipping base atlas",
                self.base_source_dir
            );
        }

        targets.extend(discover_mod_targets(&self.mods_root, &self.atlas_name));
        targets
    }

    /// Report each target's staleness without packing anything.
    pub fn status(&self) -> Result<Vec<(BuildTarget, Staleness)>> {
        self.collect_targets()
            .into_iter()
            .map(|target| {
                let staleness = check_staleness(&target, &self.extensions)?;
                Ok((target, staleness))
            })
            .collect()
    }

    /// Run one pass, packing only stale targets (or all, if [`force`](Self::force)d).
    pub fn build(&mut self) -> Result<BuildReport> {
        let start_time = Instant::now();
        self.settings.validate()?;

        self.emit_progress(BuildProgress {
            stage: BuildStage::Discovering,
            current_target: None,
            current: 0,
            total: 0,
        });

        let targets = self.collect_targets();
        let total = targets.len() as u32;
        tracing::info!("Checking {} atlas target(s)", total);

        let mut targets_built = Vec::new();
        let mut targets_skipped = Vec::new();
        let mut targets_empty = Vec::new();

        for (idx, target) in targets.into_iter().enumerate() {
            let current = (idx + 1) as u32;
            self.emit_progress(BuildProgress {
                stage: BuildStage::Checking,
                current_target: Some(target.label().to_string()),
                current,
                total,
            });

            if self.force {
                tracing::info!("Atlas '{}': forced rebuild", target.label());
            } else {
                match check_staleness(&target, &self.extensions)? {
                    Staleness::Fresh => {
                        tracing::debug!("Atlas '{}' is up to date", target.label());
                        targets_skipped.push(target);
                        continue;
                    }
                    Staleness::MissingOutput => {
                        tracing::info!("Atlas '{}': no existing output", target.label());
                    }
                    Staleness::Outdated { newest } => {
                        tracing::info!("Atlas '{}': {} changed", target.label(), newest);
                    }
                }
            }

            self.emit_progress(BuildProgress {
                stage: BuildStage::Packing,
                current_target: Some(target.label().to_string()),
                current,
                total,
            });

            let output = self
                .packer
                .pack(
                    &self.settings,
                    target.source_dir(),
                    target.output_dir(),
                    target.atlas_name(),
                )
                .map_err(|e| Error::Packing {
                    target: target.label().to_string(),
                    source: Box::new(e),
                })?;

            if output.description_path.is_none() {
                tracing::info!(
                    "Atlas '{}': no images in {}, nothing written",
                    target.label(),
                    target.source_dir()
                );
                targets_empty.push(target);
            } else {
                targets_built.push(target);
            }
        }

        let build_time = start_time.elapsed();
        tracing::info!("Packing textures - {}ms", build_time.as_millis());

        self.emit_progress(BuildProgress {
            stage: BuildStage::Complete,
            current_target: None,
            current: total,
            total,
        });

        Ok(BuildReport {
            targets_built,
            targets_skipped,
            targets_empty,
            build_time,
        })
    }

    /// Pack every target, ignoring existing atlases.
    pub fn rebuild_all(&mut self) -> Result<BuildReport> {
        let force = std::mem::replace(&mut self.force, true);
        let result = self.build();
        self.force = force;
        result
    }

    fn emit_progress(&self, progress: BuildProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

/// Run one build pass with default target layout and return its elapsed time.
///
/// The base atlas is written to the working directory; mod atlases go into
/// each mod's directory.
pub fn run(
    mods_root: &Utf8Path,
    base_source_dir: &Utf8Path,
    settings: &PackSettings,
    packer: Box<dyn Packer>,
) -> Result<Duration> {
    let report = AtlasBuilder::new(base_source_dir, mods_root, packer)
        .with_settings(settings.clone())
        .build()?;
    Ok(report.build_time)
}

/// Targets for every qualifying child of `mods_root`, sorted by file name.
fn discover_mod_targets(mods_root: &Utf8Path, atlas_name: &str) -> Vec<BuildTarget> {
    if !mods_root.is_dir() {
        tracing::debug!("Mods directory {} not found, skipping mods", mods_root);
        return Vec::new();
    }

    let entries = match std::fs::read_dir(mods_root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read mods directory {}: {}", mods_root, e);
            return Vec::new();
        }
    };

    let mut mod_dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", mods_root, e);
                continue;
            }
        };

        let path = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Skipping non UTF-8 path {}", path.display());
                continue;
            }
        };

        // Follows links so a symlinked mod directory counts as a mod.
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path, e);
                continue;
            }
        };

        if !metadata.is_dir() {
            continue;
        }

        if is_hidden(&path, &metadata) {
            tracing::debug!("Skipping hidden mod directory {}", path);
            continue;
        }

        if !path.join(MOD_IMAGES_DIR).is_dir() {
            tracing::debug!("Mod {} has no {} directory", path, MOD_IMAGES_DIR);
            continue;
        }

        mod_dirs.push(path);
    }

    mod_dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    mod_dirs
        .into_iter()
        .map(|mod_dir| {
            let label = mod_dir.file_name().unwrap_or(mod_dir.as_str()).to_string();
            BuildTarget::new(
                label,
                mod_dir.join(MOD_IMAGES_DIR),
                mod_dir.clone(),
                atlas_name,
            )
        })
        .collect()
}

/// Dot-prefixed names are hidden everywhere; Windows also honours the hidden attribute.
fn is_hidden(path: &Utf8Path, metadata: &std::fs::Metadata) -> bool {
    if path.file_name().is_some_and(|name| name.starts_with('.')) {
        return true;
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        if metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0 {
            return true;
        }
    }
    #[cfg(not(windows))]
    let _ = metadata;

    false
}
