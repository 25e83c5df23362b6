mod build;
mod config;
mod status;

pub use build::{build_atlases, BuildAtlasesArgs};
pub use config::{init_config, show_config, InitConfigArgs};
pub use status::status_atlases;

use crate::utils::config::AppConfig;
use atlas_cache::{AtlasBuilder, ShelfPacker};
use camino::Utf8PathBuf;

/// Directory arguments shared by `build` and `status`.
#[derive(Debug, Clone)]
pub struct TargetDirs {
    pub mods_dir: Utf8PathBuf,
    pub base_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
}

fn create_builder(dirs: &TargetDirs, cfg: &AppConfig) -> AtlasBuilder {
    let packer = ShelfPacker::new().with_extensions(cfg.extensions.clone());

    AtlasBuilder::new(dirs.base_dir.clone(), dirs.mods_dir.clone(), Box::new(packer))
        .with_base_output_dir(dirs.output_dir.clone())
        .with_settings(cfg.settings.clone())
        .with_extensions(cfg.extensions.clone())
}
