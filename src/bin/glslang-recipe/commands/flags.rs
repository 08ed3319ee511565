//! `glslang-recipe flags` command

use std::path::Path;

use anyhow::Result;

use super::Recipe;
use crate::cli::FlagsArgs;
use glslang_recipe::builder::CMakeParams;
use glslang_recipe::ops::OutputFormat;

pub fn execute(args: FlagsArgs, home: Option<&Path>) -> Result<()> {
    let recipe = Recipe::load(&args.recipe, home)?;
    let config = recipe.validate()?;
    let params = CMakeParams::from_config(&config);

    match args.format {
        OutputFormat::Text => {
            for arg in params.to_args() {
                println!("{}", arg);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&params)?),
        OutputFormat::Toml => print!("{}", toml::to_string_pretty(&params)?),
    }

    Ok(())
}
