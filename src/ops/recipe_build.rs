//! Implementation of `glslang-recipe build`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::{BuildDriver, BuildOutcome, BuildSteps, CMakeSteps, DriverOptions};
use crate::core::config::validate;
use crate::core::options::RawOptions;
use crate::core::platform::PlatformFacts;
use crate::ops::publish::{describe, PackageDescription, PackageInfo};
use crate::sources::{Patch, SourceSpec};
use crate::util::shell::Verbosity;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub options: RawOptions,
    pub platform: PlatformFacts,
    pub source: SourceSpec,
    pub patches: Vec<Patch>,
    pub work_dir: PathBuf,
    /// CMake generator
    pub generator: Option<String>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    pub verbosity: Verbosity,
}

impl BuildOptions {
    fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            work_dir: self.work_dir.clone(),
            source: self.source.clone(),
            patches: self.patches.clone(),
            build_type: self.platform.build_type,
            generator: self.generator.clone(),
            jobs: self.jobs,
        }
    }
}

/// A finished build and the description of what it installed.
#[derive(Debug)]
pub struct BuildResult {
    pub outcome: BuildOutcome,
    pub description: PackageDescription,
}

/// Validate, build and describe glslang.
pub fn build(opts: &BuildOptions) -> Result<BuildResult> {
    let mut steps = CMakeSteps::new(opts.driver_options());
    build_with(opts, &mut steps)
}

/// Like [`build`], with the external steps supplied by the caller.
pub fn build_with<S: BuildSteps>(opts: &BuildOptions, steps: &mut S) -> Result<BuildResult> {
    // Everything that can reject the configuration runs before any I/O.
    let config = validate(&opts.options, &opts.platform)?;
    let package_dir = opts.driver_options().package_dir();
    let info = PackageInfo {
        version: opts.source.rev.clone(),
        package_dir: std::path::absolute(&package_dir)
            .with_context(|| format!("failed to resolve {}", package_dir.display()))?,
    };
    let description = describe(&config, &opts.platform, &info)?;

    tracing::info!(
        "Building glslang {} for {} ({})",
        opts.source.rev,
        opts.platform.os,
        opts.platform.build_type
    );
    let outcome = BuildDriver::new(&config)
        .verbosity(opts.verbosity)
        .run(steps)?;

    Ok(BuildResult {
        outcome,
        description,
    })
}
