//! Recipe error types and diagnostics.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::language::CppStandard;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A step of the build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    Fetch,
    Patch,
    Configure,
    Build,
    Install,
    Package,
}

impl BuildStep {
    /// All steps in execution order.
    pub const SEQUENCE: [BuildStep; 6] = [
        BuildStep::Fetch,
        BuildStep::Patch,
        BuildStep::Configure,
        BuildStep::Build,
        BuildStep::Install,
        BuildStep::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStep::Fetch => "fetch",
            BuildStep::Patch => "patch",
            BuildStep::Configure => "configure",
            BuildStep::Build => "build",
            BuildStep::Install => "install",
            BuildStep::Package => "package",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while validating, resolving or building the recipe.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// Known-broken option and platform combination.
    #[error("unsupported configuration for {os}: {reason}")]
    #[diagnostic(code(glslang_recipe::validate::unsupported_configuration))]
    UnsupportedConfiguration { os: String, reason: String },

    /// The compiler's C++ standard is below the floor glslang needs.
    #[error("compiler `{compiler}` targets {found}, but {required} or newer is required")]
    #[diagnostic(code(glslang_recipe::validate::unsupported_compiler))]
    UnsupportedCompiler {
        compiler: String,
        required: CppStandard,
        found: CppStandard,
    },

    /// An external tool failed; `message` carries its output verbatim.
    #[error("{step} step failed: {message}")]
    #[diagnostic(code(glslang_recipe::build::step_failed))]
    BuildStepFailed { step: BuildStep, message: String },

    /// The component tables produced an inconsistent graph.
    #[error("component graph invariant violated: {0}")]
    #[diagnostic(code(glslang_recipe::graph::invariant_violation))]
    InvariantViolation(String),

    #[error("unknown option `{0}`")]
    #[diagnostic(code(glslang_recipe::options::unknown))]
    UnknownOption(String),

    #[error("invalid value `{value}` for option `{option}`")]
    #[diagnostic(code(glslang_recipe::options::invalid_value))]
    InvalidOptionValue { option: String, value: String },
}

impl RecipeError {
    /// Whether the error was raised before any build work could start.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RecipeError::UnsupportedConfiguration { .. } | RecipeError::UnsupportedCompiler { .. }
        )
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RecipeError::UnsupportedConfiguration { os, reason } => {
                Diagnostic::error(format!("unsupported configuration for {}", os))
                    .with_context(reason.clone())
                    .with_suggestion("Build a static library instead: `-o shared=false`")
            }

            RecipeError::UnsupportedCompiler {
                compiler,
                required,
                found,
            } => Diagnostic::error(format!("compiler `{}` is too old for glslang", compiler))
                .with_context(format!("configured standard: {}", found))
                .with_context(format!("minimum standard: {}", required))
                .with_suggestion(format!(
                    "Raise the C++ standard: `--cppstd {}`",
                    required.as_number()
                )),

            RecipeError::BuildStepFailed { step, message } => {
                let mut diag = Diagnostic::error(format!("{} step failed", step));
                for line in message.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.to_string());
                }
                match step {
                    BuildStep::Fetch => diag.with_suggestion(suggestions::FETCH_FAILED),
                    BuildStep::Patch => diag.with_suggestion(suggestions::PATCH_FAILED),
                    _ => diag.with_suggestion(suggestions::BUILD_FAILED),
                }
            }

            RecipeError::InvariantViolation(detail) => {
                Diagnostic::error("internal error: inconsistent component graph")
                    .with_context(detail.clone())
                    .with_suggestion("This is a bug in glslang-recipe, please report it")
            }

            RecipeError::UnknownOption(name) => {
                Diagnostic::error(format!("unknown option `{}`", name))
                    .with_suggestion(suggestions::LIST_OPTIONS)
            }

            RecipeError::InvalidOptionValue { option, value } => Diagnostic::error(format!(
                "invalid value `{}` for option `{}`",
                value, option
            ))
            .with_context("boolean options accept true/false, on/off, yes/no or 1/0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_configuration_diagnostic() {
        let err = RecipeError::UnsupportedConfiguration {
            os: "Windows".to_string(),
            reason: "shared builds are broken".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("unsupported configuration for Windows"));
        assert!(output.contains("shared builds are broken"));
        assert!(output.contains("shared=false"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_build_step_failed_keeps_tool_output() {
        let err = RecipeError::BuildStepFailed {
            step: BuildStep::Configure,
            message: "CMake Error at CMakeLists.txt:12\n\nmissing python3".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "configure step failed: CMake Error at CMakeLists.txt:12\n\nmissing python3"
        );
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("CMakeLists.txt:12"));
        assert!(output.contains("missing python3"));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_unsupported_compiler_message() {
        let err = RecipeError::UnsupportedCompiler {
            compiler: "gcc-4.8".to_string(),
            required: CppStandard::Cpp11,
            found: CppStandard::Cpp98,
        };

        assert_eq!(
            err.to_string(),
            "compiler `gcc-4.8` targets C++98, but C++11 or newer is required"
        );
        assert!(err.to_diagnostic().format(false).contains("--cppstd 11"));
    }
}
