//! `glslang-recipe describe` command

use std::path::Path;

use anyhow::Result;

use super::Recipe;
use crate::cli::DescribeArgs;
use glslang_recipe::ops::{describe, PackageInfo};

pub fn execute(args: DescribeArgs, home: Option<&Path>) -> Result<()> {
    let recipe = Recipe::load(&args.recipe, home)?;
    let config = recipe.validate()?;

    let info = PackageInfo {
        version: args
            .rev
            .unwrap_or_else(|| recipe.config.revision().to_string()),
        package_dir: recipe.package_dir(args.package_dir)?,
    };
    let description = describe(&config, &recipe.platform, &info)?;

    print!("{}", description.render(args.format)?);
    Ok(())
}
