use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{self, AppConfig, CONFIG_FILE_NAME};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

#[derive(Debug)]
pub struct InitConfigArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub overwrite: bool,
}

pub fn show_config(config_path: Option<Utf8PathBuf>) -> Result<()> {
    let (cfg, source) = config::load_effective_config(config_path.as_deref())?;
    let settings = &cfg.settings;

    println!();
    match source {
        Some(path) => println_pad!("{} {}", "config_file:".bright_white(), path),
        None => println_pad!(
            "{} {}",
            "config_file:".bright_white(),
            "(none, using defaults)".bright_yellow()
        ),
    }

    let extensions = cfg.extensions.iter().collect::<Vec<_>>().join(", ");
    println_pad!("{} {}", "extensions:".bright_white(), extensions);
    println_pad!(
        "{} {}x{}",
        "max_size:".bright_white(),
        settings.max_width,
        settings.max_height
    );
    println_pad!(
        "{} {}",
        "combine_subdirectories:".bright_white(),
        settings.combine_subdirectories
    );
    println_pad!("{} {}", "power_of_two:".bright_white(), settings.power_of_two);
    println_pad!("{} {}", "fast:".bright_white(), settings.fast);
    println_pad!("{} {}", "padding:".bright_white(), settings.padding);
    println_pad!(
        "{} {},{}",
        "filter:".bright_white(),
        settings.filter_mode.min,
        settings.filter_mode.mag
    );

    if let Err(e) = cfg.validate() {
        println_pad!("{} {}", "✗".bright_red(), e);
    }
    println!();

    Ok(())
}

pub fn init_config(args: InitConfigArgs) -> Result<()> {
    let path = args
        .config_path
        .unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() && !args.overwrite {
        return Err(CliError::config_exists(path).into());
    }

    config::save_config(&AppConfig::default(), &path).into_diagnostic()?;

    println_pad!(
        "{}\n{} {}",
        "✅ Default settings written!".bright_green().bold(),
        "📍 Path:".bright_green(),
        path.as_str().bright_white().bold()
    );

    Ok(())
}
