//! glslang-recipe - build recipe and package description for Khronos glslang
//!
//! This crate validates glslang build options against a target platform,
//! drives the CMake build of a pinned glslang source, and describes the
//! installed libraries as a graph of components.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

pub use core::{
    validate, BuildStep, ComponentGraph, ComponentId, NormalizedConfig, OptionKey, PlatformFacts,
    RawOptions, RecipeError,
};
pub use ops::{describe, PackageDescription};
