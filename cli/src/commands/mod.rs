pub mod defaults;
pub mod key;
pub mod show;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use settings::{
    DEFAULT_ENV_PREFIX, DefaultsLoader, FileDefaults, Overrides, SettingsRegistry,
    load_overrides_from_file, merge_layers, overrides_from_env,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dateconf",
    author,
    version,
    about = "dateconf - inspect date-parser settings",
    long_about = "Shows the default date-parser settings, resolves settings with overrides \
                  applied, and computes the cache key a set of overrides maps to."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List the defaults document")]
    Defaults(defaults::DefaultsArgs),

    #[command(about = "Resolve settings with overrides applied")]
    Show(show::ShowArgs),

    #[command(about = "Compute the cache key for a set of overrides")]
    Key(key::KeyArgs)
}

/// Where defaults come from.
#[derive(Args, Clone, Default)]
pub struct DefaultsSourceArgs {
    #[arg(
        long = "defaults",
        value_name = "FILE",
        help = "Defaults document to use instead of the bundled one (.yaml, .yml, .toml)"
    )]
    pub defaults_file: Option<PathBuf>
}

impl DefaultsSourceArgs {
    pub fn registry(&self) -> Result<SettingsRegistry> {
        match &self.defaults_file {
            Some(path) => {
                let loader = DefaultsLoader::new(FileDefaults::new(path)?);
                SettingsRegistry::from_loader(&loader)
                    .with_context(|| format!("Failed to load defaults from {}", path.display()))
            }
            None => SettingsRegistry::bundled().context("Failed to load bundled defaults")
        }
    }
}

/// Override layers, lowest precedence first: file, environment, `--set`.
#[derive(Args, Clone, Default)]
pub struct OverrideArgs {
    #[arg(
        long = "set",
        short = 's',
        value_name = "NAME=VALUE",
        help = "Override one option (repeatable), e.g. --set PREFER_DATES_FROM=past"
    )]
    pub assignments: Vec<String>,

    #[arg(
        long = "overrides",
        value_name = "FILE",
        help = "Overrides document (.yaml, .yml, .toml)"
    )]
    pub overrides_file: Option<PathBuf>,

    #[arg(long, help = "Read overrides from environment variables")]
    pub env: bool,

    #[arg(
        long,
        default_value = DEFAULT_ENV_PREFIX,
        help = "Prefix of override environment variables"
    )]
    pub env_prefix: String
}

impl OverrideArgs {
    pub fn collect(&self) -> Result<Overrides> {
        let file = match &self.overrides_file {
            Some(path) => load_overrides_from_file(path)?,
            None => Overrides::new()
        };
        let env = if self.env {
            overrides_from_env(&self.env_prefix)
        } else {
            Overrides::new()
        };
        let cli = Overrides::from_assignments(&self.assignments)?;

        Ok(merge_layers([("file", &file), ("env", &env), ("cli", &cli)]))
    }
}
