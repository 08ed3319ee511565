//! `glslang-recipe build` command

use std::path::Path;

use anyhow::Result;

use super::Recipe;
use crate::cli::BuildArgs;
use glslang_recipe::ops::{build, BuildOptions};
use glslang_recipe::util::shell::Status;
use glslang_recipe::util::Shell;

pub fn execute(args: BuildArgs, home: Option<&Path>, shell: &Shell) -> Result<()> {
    let recipe = Recipe::load(&args.recipe, home)?;

    let mut config = recipe.config.clone();
    if let Some(rev) = args.rev {
        config.source.rev = Some(rev);
    }

    let work_dir = recipe.work_dir(args.work_dir)?;
    let opts = BuildOptions {
        options: recipe.options,
        platform: recipe.platform.clone(),
        source: config.source_spec()?,
        patches: config.patches(),
        work_dir,
        generator: args.generator.or_else(|| config.build.generator.clone()),
        jobs: args.jobs.or(config.build.jobs),
        verbosity: shell.verbosity(),
    };

    let result = build(&opts)?;

    shell.status(
        Status::Finished,
        format!(
            "glslang {} ({}) in {:.2}s",
            opts.source.rev,
            opts.platform.build_type,
            result.outcome.elapsed.as_secs_f64()
        ),
    );
    print!("{}", result.description.render(args.format)?);
    Ok(())
}
