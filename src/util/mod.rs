//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;
pub mod shell;

pub use config::RecipeConfig;
pub use diagnostic::Diagnostic;
pub use shell::Shell;
