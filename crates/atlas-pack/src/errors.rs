use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Run `atlas-pack config init` to write a default atlas-pack.toml, or omit --config to use defaults")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error in {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check atlas-pack.toml for syntax errors and unknown texture filter names")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(config::already_exists),
        help("Pass --overwrite to replace it with the defaults")
    )]
    ConfigExists { path: Utf8PathBuf },

    #[error("Invalid pack settings")]
    #[diagnostic(
        code(settings::invalid),
        help("Page sizes must be non-zero, and powers of two when power_of_two is set")
    )]
    InvalidSettings {
        #[source]
        source: atlas_cache::Error,
    },

    #[error("Atlas build failed")]
    #[diagnostic(
        code(build::failed),
        help("Fix or remove the offending image; the previous atlas was left in place")
    )]
    BuildFailed {
        #[source]
        source: atlas_cache::Error,
    },

    #[error("No qualifying extensions configured")]
    #[diagnostic(
        code(config::no_extensions),
        help("List at least one image extension, e.g. extensions = [\"png\", \"jpg\", \"jpeg\"]")
    )]
    NoExtensions,
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn config_parse_error(path: Utf8PathBuf, source: toml::de::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn config_exists(path: Utf8PathBuf) -> Self {
        Self::ConfigExists { path }
    }
}

impl From<atlas_cache::Error> for CliError {
    fn from(source: atlas_cache::Error) -> Self {
        match source {
            atlas_cache::Error::InvalidSettings(_) => Self::InvalidSettings { source },
            source => Self::BuildFailed { source },
        }
    }
}
