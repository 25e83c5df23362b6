use super::{create_builder, TargetDirs};
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config;
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

#[derive(Debug)]
pub struct BuildAtlasesArgs {
    pub dirs: TargetDirs,
    pub config_path: Option<Utf8PathBuf>,
    pub force: bool,
}

pub fn build_atlases(args: BuildAtlasesArgs) -> Result<()> {
    let (cfg, cfg_path) = config::load_effective_config(args.config_path.as_deref())?;
    cfg.validate()?;

    if let Some(path) = &cfg_path {
        tracing::info!("Using settings from {}", path);
    }

    println_pad!(
        "{} {} {}",
        "🧩 Packing textures:".bright_blue().bold(),
        args.dirs.base_dir.as_str().bright_cyan().bold(),
        format!("+ mods in {}", args.dirs.mods_dir).dimmed()
    );

    let mut builder = create_builder(&args.dirs, &cfg).force(args.force);
    let report = builder.build().map_err(CliError::from)?;

    for target in &report.targets_built {
        println_pad!(
            "   {} {} {}",
            "•".bright_green(),
            target.label().bright_white().bold(),
            format!("-> {}", target.description_path()).dimmed()
        );
    }
    for target in &report.targets_skipped {
        println_pad!(
            "   {} {} {}",
            "•".bright_black(),
            target.label().white(),
            "(up to date)".dimmed()
        );
    }

    for target in &report.targets_empty {
        println_pad!(
            "   {} {} {}",
            "•".bright_yellow(),
            target.label().white(),
            format!("(no images in {})", target.source_dir()).dimmed()
        );
    }

    if report.targets_built.is_empty()
        && report.targets_skipped.is_empty()
        && report.targets_empty.is_empty()
    {
        println_pad!(
            "{}",
            "⚠️  No atlas targets found (no base Images directory, no mods with Images)"
                .bright_yellow()
        );
    }

    println_pad!(
        "{} {}",
        "✅ Packing textures -".bright_green().bold(),
        format!("{}ms", report.build_time.as_millis())
            .bright_white()
            .bold()
    );

    Ok(())
}
