//! `glslang-recipe validate` command

use std::path::Path;

use anyhow::{bail, Result};

use super::Recipe;
use crate::cli::ValidateArgs;
use glslang_recipe::ops::OutputFormat;
use glslang_recipe::OptionKey;

pub fn execute(args: ValidateArgs, home: Option<&Path>) -> Result<()> {
    let recipe = Recipe::load(&args.recipe, home)?;
    let config = recipe.validate()?;

    match args.format {
        OutputFormat::Text => {
            println!(
                "Configuration valid for {} ({}, {})",
                recipe.platform.os, recipe.platform.compiler, recipe.platform.build_type
            );
            for key in OptionKey::ALL {
                match config.get(key) {
                    Some(value) => println!("  {:<18} = {}", key.as_str(), value),
                    None => println!("  {:<18}   (removed)", key.as_str()),
                }
            }
            if !config.requirements().is_empty() {
                println!("Requires: {}", config.requirements().join(", "));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Toml => bail!("`validate` supports `text` and `json` output"),
    }

    Ok(())
}
