use anyhow::Result;
use clap::Args;

use super::DefaultsSourceArgs;
use crate::output;

#[derive(Args)]
pub struct DefaultsArgs {
    #[command(flatten)]
    pub source: DefaultsSourceArgs,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(args: DefaultsArgs) -> Result<()> {
    let registry = args.source.registry()?;
    let defaults = registry.defaults();

    if args.json {
        println!("{}", serde_json::to_string_pretty(defaults.as_map())?);
        return Ok(());
    }

    if defaults.is_empty() {
        output::warn("Defaults document declares no settings; built-in fallbacks apply");
        return Ok(());
    }

    output::header("Settings Defaults");
    println!();
    for (name, value) in defaults.iter() {
        println!("{}", output::option_line(name, value));
    }
    println!();
    output::hint("Use 'dateconf show --set NAME=VALUE' to resolve settings with overrides.");

    Ok(())
}
