//! Core data model: options, platform facts, validation and the
//! component graph.

pub mod component;
pub mod config;
pub mod error;
pub mod graph;
pub mod language;
pub mod options;
pub mod platform;

pub use component::{Component, ComponentId, Define, ExternalRef, Requirement};
pub use config::{validate, NormalizedConfig};
pub use error::{BuildStep, RecipeError};
pub use graph::ComponentGraph;
pub use language::CppStandard;
pub use options::{OptionKey, RawOptions};
pub use platform::{BuildType, CompilerIdentity, Os, PlatformFacts};
