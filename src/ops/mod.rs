//! High-level operations.
//!
//! This module contains the implementation of the recipe commands.

pub mod publish;
pub mod recipe_build;
pub mod verify;

pub use publish::{
    describe, library_files, ComponentDescription, OutputFormat, PackageDescription, PackageInfo,
};
pub use recipe_build::{build, build_with, BuildOptions, BuildResult};
pub use verify::{format_report, verify_package, MissingLibrary, VerifyReport};
