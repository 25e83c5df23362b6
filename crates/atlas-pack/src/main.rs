use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    build_atlases, init_config, show_config, status_atlases, BuildAtlasesArgs, InitConfigArgs,
    TargetDirs,
};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log every target decision and skipped entry
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
pub struct DirArgs {
    /// The directory whose subdirectories are mods
    #[arg(short, long, default_value = "mods")]
    mods_dir: Utf8PathBuf,

    /// The base game image directory
    #[arg(short, long, default_value = "../Images")]
    base_dir: Utf8PathBuf,

    /// The directory the base atlas is written to
    #[arg(short, long, default_value = ".")]
    output_dir: Utf8PathBuf,

    /// The path to the settings file
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,
}

impl DirArgs {
    fn split(self) -> (TargetDirs, Option<Utf8PathBuf>) {
        (
            TargetDirs {
                mods_dir: self.mods_dir,
                base_dir: self.base_dir,
                output_dir: self.output_dir,
            },
            self.config,
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Repack every atlas whose source images changed
    Build {
        #[command(flatten)]
        dirs: DirArgs,

        /// Repack every atlas, even if it is up to date
        #[arg(short, long)]
        force: bool,
    },
    /// Show which atlases are up to date without packing
    Status {
        #[command(flatten)]
        dirs: DirArgs,
    },
    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show {
        /// The path to the settings file
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,
    },
    /// Write the default settings file
    Init {
        /// Where to write the settings file
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,

        /// Replace an existing settings file
        #[arg(long)]
        overwrite: bool,
    },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "atlas_pack=debug,atlas_cache=debug"
    } else {
        "atlas_pack=warn,atlas_cache=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    match args.command {
        Commands::Build { dirs, force } => {
            let (dirs, config_path) = dirs.split();
            build_atlases(BuildAtlasesArgs {
                dirs,
                config_path,
                force,
            })
        }
        Commands::Status { dirs } => {
            let (dirs, config_path) = dirs.split();
            status_atlases(dirs, config_path)
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show { config } => show_config(config),
            ConfigCommands::Init { config, overwrite } => init_config(InitConfigArgs {
                config_path: config,
                overwrite,
            }),
        },
    }
}
