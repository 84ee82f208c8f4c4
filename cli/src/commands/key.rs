use anyhow::Result;
use clap::Args;
use settings::{DEFAULT_KEY, get_key};

use super::{DefaultsSourceArgs, OverrideArgs};

#[derive(Args)]
pub struct KeyArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(flatten)]
    pub source: DefaultsSourceArgs,

    #[arg(long, help = "Also check that the overrides resolve against the defaults")]
    pub check: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(args: KeyArgs) -> Result<()> {
    let overrides = args.overrides.collect()?;

    if args.check {
        let registry = args.source.registry()?;
        registry.resolve(overrides.clone())?;
    }

    let key = get_key(&overrides);

    if args.json {
        let output = serde_json::json!({
            "key": key,
            "default": key == DEFAULT_KEY,
            "overrides": overrides,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{key}");
    Ok(())
}
