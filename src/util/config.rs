//! Recipe configuration files.
//!
//! Two locations are read:
//! - Global: `~/.glslang-recipe/config.toml` - user-wide defaults
//! - Project: `recipe.toml` in the working directory
//!
//! Project config takes precedence over global config. Command-line
//! arguments take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::RecipeError;
use crate::core::options::{OptionKey, RawOptions};
use crate::core::platform::{BuildType, CompilerIdentity, Os, PlatformFacts};
use crate::core::CppStandard;
use crate::sources::{Patch, SourceSpec, DEFAULT_REVISION};

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "recipe.toml";

/// Working directory used when none is configured.
pub const DEFAULT_WORK_DIR: &str = "build-glslang";

/// Recipe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Source archive settings
    pub source: SourceConfig,

    /// Patches applied after fetching, in order
    pub patches: Vec<PatchConfig>,

    /// Option defaults, keyed by option name
    pub options: BTreeMap<String, bool>,

    /// Target platform overrides
    pub platform: PlatformConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Where the glslang source comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Archive URL; `{rev}` is replaced by the revision
    pub url: Option<String>,

    /// Tag or commit to build
    pub rev: Option<String>,

    /// Expected archive SHA256
    pub sha256: Option<String>,
}

/// A patch file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Path to the patch, relative to the config file
    pub file: PathBuf,

    #[serde(default)]
    pub sha256: Option<String>,
}

/// Platform settings. Unset values are detected from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub compiler_version: Option<String>,
    pub cppstd: Option<String>,
    pub build_type: Option<String>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel jobs (None = let CMake decide)
    pub jobs: Option<usize>,

    /// CMake generator
    pub generator: Option<String>,

    /// Directory holding source, build and package trees
    pub work_dir: Option<PathBuf>,
}

impl RecipeConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: RecipeConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        // Paths in a config file are relative to that file.
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for patch in &mut self.patches {
            if patch.file.is_relative() {
                patch.file = base.join(&patch.file);
            }
        }
        if let Some(ref mut work_dir) = self.build.work_dir {
            if work_dir.is_relative() {
                *work_dir = base.join(&*work_dir);
            }
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: RecipeConfig) {
        // Source settings
        if other.source.url.is_some() {
            self.source.url = other.source.url;
        }
        if other.source.rev.is_some() {
            self.source.rev = other.source.rev;
        }
        if other.source.sha256.is_some() {
            self.source.sha256 = other.source.sha256;
        }

        // A patch set only makes sense as a whole
        if !other.patches.is_empty() {
            self.patches = other.patches;
        }

        self.options.extend(other.options);
        self.platform.merge(other.platform);

        // Build settings
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.work_dir.is_some() {
            self.build.work_dir = other.build.work_dir;
        }
    }

    /// Option values with the configured defaults applied.
    pub fn raw_options(&self) -> Result<RawOptions, RecipeError> {
        let mut options = RawOptions::default();
        for (name, &value) in &self.options {
            let key: OptionKey = name.parse()?;
            options.set(key, value);
        }
        Ok(options)
    }

    /// Revision to build.
    pub fn revision(&self) -> &str {
        self.source.rev.as_deref().unwrap_or(DEFAULT_REVISION)
    }

    /// Source archive to fetch.
    pub fn source_spec(&self) -> Result<SourceSpec> {
        let rev = self.revision();
        let mut spec = match self.source.url {
            Some(ref template) => SourceSpec::from_template(template, rev, None)?,
            None => SourceSpec::github(rev)?,
        };
        spec.sha256 = self.source.sha256.clone();
        Ok(spec)
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.patches
            .iter()
            .map(|p| Patch {
                path: p.file.clone(),
                sha256: p.sha256.clone(),
            })
            .collect()
    }

    pub fn work_dir(&self) -> PathBuf {
        self.build
            .work_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR))
    }
}

impl PlatformConfig {
    /// Merge another platform config into this one (other takes precedence).
    pub fn merge(&mut self, other: PlatformConfig) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.compiler_version.is_some() {
            self.compiler_version = other.compiler_version;
        }
        if other.cppstd.is_some() {
            self.cppstd = other.cppstd;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
    }

    /// Platform facts, detecting anything left unset from the host.
    pub fn facts(&self) -> Result<PlatformFacts> {
        let os = match self.os {
            Some(ref os) => os.parse::<Os>()?,
            None => Os::host(),
        };

        let build_type = match self.build_type {
            Some(ref bt) => bt.parse::<BuildType>()?,
            None => BuildType::default(),
        };

        let mut compiler = match self.compiler {
            Some(ref family) => CompilerIdentity::new(family, "unknown"),
            None => CompilerIdentity::detect(),
        };
        if let Some(ref version) = self.compiler_version {
            compiler.version = version.clone();
        }

        let mut facts = PlatformFacts::new(os, compiler, build_type);
        if let Some(ref cppstd) = self.cppstd {
            facts = facts.with_cppstd(cppstd.parse::<CppStandard>()?);
        }
        Ok(facts)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (recipe.toml)
/// 2. Global config (~/.glslang-recipe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> RecipeConfig {
    let mut config = RecipeConfig::default();

    // Load global config first
    if let Some(global_path) = global_path {
        config.merge(RecipeConfig::load_or_default(global_path));
    }

    // Project config overrides global
    config.merge(RecipeConfig::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.glslang-recipe).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".glslang-recipe"))
}

/// Get the global config path (~/.glslang-recipe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (recipe.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
