use super::{create_builder, TargetDirs};
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config;
use atlas_cache::Staleness;
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

pub fn status_atlases(dirs: TargetDirs, config_path: Option<Utf8PathBuf>) -> Result<()> {
    let (cfg, _) = config::load_effective_config(config_path.as_deref())?;
    cfg.validate()?;

    let builder = create_builder(&dirs, &cfg);
    let status = builder.status().map_err(CliError::from)?;

    if status.is_empty() {
        println_pad!("{}", "No atlas targets found.".bright_yellow());
        return Ok(());
    }

    let mut stale = 0;
    for (target, staleness) in &status {
        let verdict = match staleness {
            Staleness::Fresh => "up to date".bright_green().to_string(),
            Staleness::MissingOutput => "missing".bright_red().to_string(),
            Staleness::Outdated { newest } => {
                format!("{} ({})", "outdated".bright_yellow(), newest)
            }
        };
        if staleness.is_stale() {
            stale += 1;
        }

        println_pad!(
            "{} {} {}",
            format!("{}:", target.label()).bright_white(),
            verdict,
            format!("[{}]", target.source_dir()).dimmed()
        );
    }

    println!();
    println_pad!(
        "{} of {} atlas(es) need packing",
        stale.to_string().bright_white().bold(),
        status.len()
    );

    Ok(())
}
