//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use glslang_recipe::ops::OutputFormat;
use glslang_recipe::util::config::PlatformConfig;

/// glslang-recipe - build and describe the Khronos glslang package
#[derive(Parser)]
#[command(name = "glslang-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Directory holding the global config.toml
    #[arg(long, global = true, env = "GLSLANG_RECIPE_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the build options and their defaults
    Options,

    /// Validate an option combination for a platform
    Validate(ValidateArgs),

    /// Show the CMake definitions for a configuration
    Flags(FlagsArgs),

    /// Describe the components of the package
    Describe(DescribeArgs),

    /// Fetch, patch, build and install glslang
    Build(BuildArgs),

    /// Check that an installed package has every published library
    Verify(VerifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options and platform shared by every recipe command.
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    /// Override an option (e.g. `-o shared=true`)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Project config file (defaults to ./recipe.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlatformArgs {
    /// Target operating system (Linux, FreeBSD, Macos, Windows, Android, iOS)
    #[arg(long)]
    pub os: Option<String>,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// C++ standard the compiler targets (e.g. 17, gnu14)
    #[arg(long)]
    pub cppstd: Option<String>,

    /// Build variant (Debug, Release, RelWithDebInfo, MinSizeRel)
    #[arg(long)]
    pub build_type: Option<String>,
}

impl PlatformArgs {
    pub fn to_config(&self) -> PlatformConfig {
        PlatformConfig {
            os: self.os.clone(),
            compiler: self.compiler.clone(),
            compiler_version: self.compiler_version.clone(),
            cppstd: self.cppstd.clone(),
            build_type: self.build_type.clone(),
        }
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format (text, json, toml)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format (text, json, toml)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Installed package directory (defaults to <work-dir>/package)
    #[arg(long, value_name = "DIR")]
    pub package_dir: Option<PathBuf>,

    /// Source revision being described
    #[arg(long)]
    pub rev: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Source revision to build
    #[arg(long)]
    pub rev: Option<String>,

    /// Directory for the source, build and package trees
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// CMake generator (e.g. Ninja)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Output format of the package description
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Installed package directory (defaults to <work-dir>/package)
    #[arg(long, value_name = "DIR")]
    pub package_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
