//! Command implementations

pub mod build;
pub mod completions;
pub mod describe;
pub mod flags;
pub mod options;
pub mod validate;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::RecipeArgs;
use glslang_recipe::util::config::{global_config_path, load_config, project_config_path};
use glslang_recipe::util::RecipeConfig;
use glslang_recipe::{validate, NormalizedConfig, PlatformFacts, RawOptions};

/// Configuration, options and platform for one invocation.
pub struct Recipe {
    pub config: RecipeConfig,
    pub options: RawOptions,
    pub platform: PlatformFacts,
}

impl Recipe {
    /// Load config files and apply command-line overrides.
    ///
    /// Precedence: command line, then project config, then global config,
    /// then host detection.
    pub fn load(args: &RecipeArgs, home: Option<&Path>) -> Result<Self> {
        let project = match args.config {
            Some(ref path) => path.clone(),
            None => project_config_path(
                &std::env::current_dir().context("failed to get current directory")?,
            ),
        };
        let global = match home {
            Some(dir) => Some(dir.join("config.toml")),
            None => global_config_path(),
        };

        let config = load_config(global.as_deref(), &project);

        let mut options = config.raw_options()?;
        for spec in &args.options {
            options.apply_override(spec)?;
        }

        let mut platform = config.platform.clone();
        platform.merge(args.platform.to_config());
        let platform = platform.facts()?;

        tracing::debug!(
            "platform: {} {} ({}), cppstd {}",
            platform.os,
            platform.compiler,
            platform.build_type,
            platform
                .cppstd
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unset".to_string())
        );

        Ok(Recipe {
            config,
            options,
            platform,
        })
    }

    pub fn validate(&self) -> Result<NormalizedConfig> {
        Ok(validate(&self.options, &self.platform)?)
    }

    /// Work directory from the command line or the config, made absolute
    /// against the current directory.
    pub fn work_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        absolute(&explicit.unwrap_or_else(|| self.config.work_dir()))
    }

    /// Package directory from the command line or `<work dir>/package`.
    pub fn package_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(dir) => absolute(&dir),
            None => Ok(self.work_dir(None)?.join("package")),
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to resolve {}", path.display()))
}
