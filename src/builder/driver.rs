//! Build driver: runs fetch, patch, configure, build, install and package
//! in order, stopping at the first failure.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::cmake::CMakeBuilder;
use crate::builder::params::CMakeParams;
use crate::core::config::NormalizedConfig;
use crate::core::error::{BuildStep, RecipeError};
use crate::core::platform::BuildType;
use crate::sources::{apply_patches, fetch_archive, Patch, SourceSpec};
use crate::util::fs::{copy_matching, ensure_dir, remove_dir_all_if_exists};
use crate::util::shell::{Status, Verbosity};

/// Files copied into `<package>/licenses`.
const LICENSE_FILES: &[&str] = &["LICENSE.txt"];

/// Tool-generated directories removed from the installed package.
const GENERATED_DIRS: &[&str] = &["lib/cmake", "lib/pkgconfig"];

/// The external actions behind each build step.
pub trait BuildSteps {
    /// Fetch the source tree and return its location.
    fn fetch(&mut self) -> Result<PathBuf>;

    fn patch(&mut self, source_dir: &Path) -> Result<()>;

    fn configure(&mut self, source_dir: &Path, params: &CMakeParams) -> Result<()>;

    fn build(&mut self) -> Result<()>;

    fn install(&mut self) -> Result<()>;

    /// Finalize the installed tree (licenses, generated files).
    fn package(&mut self, source_dir: &Path) -> Result<()>;
}

/// Result of a completed build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub source_dir: PathBuf,
    pub elapsed: Duration,
}

/// Sequences the build steps for one validated configuration.
pub struct BuildDriver {
    params: CMakeParams,
    verbosity: Verbosity,
}

impl BuildDriver {
    pub fn new(config: &NormalizedConfig) -> Self {
        BuildDriver {
            params: CMakeParams::from_config(config),
            verbosity: Verbosity::Normal,
        }
    }

    /// Spinners are only drawn at normal verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn params(&self) -> &CMakeParams {
        &self.params
    }

    /// Run every step in order. The first failing step aborts the run.
    pub fn run<S: BuildSteps>(&self, steps: &mut S) -> Result<BuildOutcome, RecipeError> {
        let start = Instant::now();

        let source_dir = self.step(BuildStep::Fetch, || steps.fetch())?;
        self.step(BuildStep::Patch, || steps.patch(&source_dir))?;
        self.step(BuildStep::Configure, || {
            steps.configure(&source_dir, &self.params)
        })?;
        self.step(BuildStep::Build, || steps.build())?;
        self.step(BuildStep::Install, || steps.install())?;
        self.step(BuildStep::Package, || steps.package(&source_dir))?;

        Ok(BuildOutcome {
            source_dir,
            elapsed: start.elapsed(),
        })
    }

    fn step<T>(&self, step: BuildStep, f: impl FnOnce() -> Result<T>) -> Result<T, RecipeError> {
        tracing::debug!("running {} step", step);
        let pb = self.spinner(step);

        let result = f();

        if let Some(pb) = pb {
            match &result {
                Ok(_) => pb.finish_and_clear(),
                Err(_) => pb.abandon_with_message(format!("{} failed", step)),
            }
        }

        result.map_err(|e| RecipeError::BuildStepFailed {
            step,
            message: format!("{:#}", e),
        })
    }

    fn spinner(&self, step: BuildStep) -> Option<ProgressBar> {
        if !self.verbosity.shows_progress() {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{}...", Status::for_step(step).as_str()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Settings for [`CMakeSteps`].
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Root of `source/`, `build/` and `package/`
    pub work_dir: PathBuf,
    pub source: SourceSpec,
    pub patches: Vec<Patch>,
    pub build_type: BuildType,
    pub generator: Option<String>,
    pub jobs: Option<usize>,
}

impl DriverOptions {
    pub fn source_dir(&self) -> PathBuf {
        self.work_dir.join("source")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.work_dir.join("build")
    }

    pub fn package_dir(&self) -> PathBuf {
        self.work_dir.join("package")
    }
}

/// Build steps backed by the network, `git` and `cmake`.
pub struct CMakeSteps {
    options: DriverOptions,
    cmake: Option<CMakeBuilder>,
}

impl CMakeSteps {
    pub fn new(options: DriverOptions) -> Self {
        CMakeSteps {
            options,
            cmake: None,
        }
    }

    pub fn package_dir(&self) -> PathBuf {
        self.options.package_dir()
    }

    fn cmake(&self) -> Result<&CMakeBuilder> {
        self.cmake
            .as_ref()
            .context("CMake has not been configured")
    }
}

impl BuildSteps for CMakeSteps {
    fn fetch(&mut self) -> Result<PathBuf> {
        fetch_archive(&self.options.source, &self.options.source_dir())
    }

    fn patch(&mut self, source_dir: &Path) -> Result<()> {
        apply_patches(&self.options.patches, source_dir)
    }

    fn configure(&mut self, source_dir: &Path, params: &CMakeParams) -> Result<()> {
        let cmake = CMakeBuilder::new(
            source_dir.to_path_buf(),
            self.options.build_dir(),
            self.options.package_dir(),
        )?
        .build_type(self.options.build_type)
        .generator(self.options.generator.clone())
        .jobs(self.options.jobs);

        cmake.configure(params)?;
        self.cmake = Some(cmake);
        Ok(())
    }

    fn build(&mut self) -> Result<()> {
        self.cmake()?.compile()
    }

    fn install(&mut self) -> Result<()> {
        self.cmake()?.install()
    }

    fn package(&mut self, source_dir: &Path) -> Result<()> {
        finalize_package(source_dir, &self.options.package_dir())
    }
}

/// Copy license files into the package and drop tool-generated metadata.
pub fn finalize_package(source_dir: &Path, package_dir: &Path) -> Result<()> {
    ensure_dir(package_dir)?;

    let licenses = copy_matching(source_dir, LICENSE_FILES, &package_dir.join("licenses"))?;
    if licenses.is_empty() {
        tracing::warn!("no license file found in {}", source_dir.display());
    }

    for dir in GENERATED_DIRS {
        remove_dir_all_if_exists(&package_dir.join(dir))?;
    }
    Ok(())
}
