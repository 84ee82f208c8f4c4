use anyhow::Result;
use clap::Args;
use colored::Colorize;
use settings::{SettingValue, SettingsArg, get_key};
use std::collections::{BTreeMap, BTreeSet};

use super::{DefaultsSourceArgs, OverrideArgs};
use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: DefaultsSourceArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(args: ShowArgs) -> Result<()> {
    let registry = args.source.registry()?;
    let overrides = args.overrides.collect()?;
    let key = get_key(&overrides);

    let arg = if overrides.is_empty() {
        SettingsArg::Absent
    } else {
        SettingsArg::Overrides(overrides)
    };
    let settings = registry.resolve(arg)?;
    let values = settings.to_mapping()?;
    tracing::debug!("Resolved settings for key {}", key);

    if args.json {
        let output = serde_json::json!({
            "key": key,
            "is_default": settings.is_default(),
            "settings": values,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let baseline = registry.default_settings().to_mapping()?;
    let changed = changed_options(&baseline, &values);

    output::header("Resolved Settings");
    println!();
    for (name, value) in &values {
        let line = output::option_line(name, value);
        if changed.contains(name.as_str()) {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
    println!();
    output::field("key", &key);
    output::field("default", &settings.is_default().to_string());

    Ok(())
}

/// Options whose resolved value differs from the default settings.
///
/// Compared against the fully built default settings, so options the
/// defaults document leaves out are judged by their built-in fallback.
fn changed_options<'a>(
    baseline: &BTreeMap<String, SettingValue>,
    values: &'a BTreeMap<String, SettingValue>
) -> BTreeSet<&'a str> {
    values
        .iter()
        .filter(|(name, value)| baseline.get(name.as_str()) != Some(*value))
        .map(|(name, _)| name.as_str())
        .collect()
}
