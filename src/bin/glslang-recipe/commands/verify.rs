//! `glslang-recipe verify` command

use std::path::Path;

use anyhow::{bail, Result};

use super::Recipe;
use crate::cli::VerifyArgs;
use glslang_recipe::ops::{describe, format_report, verify_package, PackageInfo};
use glslang_recipe::util::diagnostic::suggestions;
use glslang_recipe::util::shell::Status;
use glslang_recipe::util::Shell;

pub fn execute(args: VerifyArgs, home: Option<&Path>, shell: &Shell) -> Result<()> {
    let recipe = Recipe::load(&args.recipe, home)?;
    let config = recipe.validate()?;

    let package_dir = recipe.package_dir(args.package_dir)?;
    let info = PackageInfo {
        version: recipe.config.revision().to_string(),
        package_dir: package_dir.clone(),
    };
    let description = describe(&config, &recipe.platform, &info)?;

    let report = verify_package(&description, &package_dir);
    print!("{}", format_report(&report, shell.is_verbose()));

    if !report.passed() {
        bail!(
            "{} of {} libraries missing from {}\n\
             help: {}",
            report.missing.len(),
            report.found.len() + report.missing.len(),
            package_dir.display(),
            suggestions::MISSING_LIBRARIES
        );
    }

    shell.status(
        Status::Verified,
        format!("{} libraries in {}", report.found.len(), package_dir.display()),
    );
    Ok(())
}
