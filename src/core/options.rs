//! The recipe's build options.
//!
//! The option set is fixed. Every option is a boolean with a default;
//! callers override defaults with `key=value` strings (`shared=true`,
//! `glslang:hlsl=False`) before handing the values to the validator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::RecipeError;

/// The kind of value an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    Choice(&'static [&'static str]),
}

impl OptionKind {
    /// Values accepted for this option, in display form.
    pub fn allowed_values(&self) -> &'static [&'static str] {
        match self {
            OptionKind::Boolean => &["True", "False"],
            OptionKind::Choice(values) => values,
        }
    }
}

/// Identifier of a recipe option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    /// Build shared instead of static libraries.
    #[serde(rename = "shared")]
    Shared,
    /// Compile static libraries as position-independent code.
    #[serde(rename = "fPIC")]
    Fpic,
    /// Build and install the command-line tools.
    #[serde(rename = "build_executables")]
    BuildExecutables,
    /// Build the SPIR-V remapper library.
    #[serde(rename = "spv_remapper")]
    SpvRemapper,
    /// Enable the HLSL front-end.
    #[serde(rename = "hlsl")]
    Hlsl,
    /// Link the SPIRV-Tools optimizer.
    #[serde(rename = "enable_optimizer")]
    EnableOptimizer,
}

impl OptionKey {
    /// All options, in declaration order.
    pub const ALL: [OptionKey; 6] = [
        OptionKey::Shared,
        OptionKey::Fpic,
        OptionKey::BuildExecutables,
        OptionKey::SpvRemapper,
        OptionKey::Hlsl,
        OptionKey::EnableOptimizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Shared => "shared",
            OptionKey::Fpic => "fPIC",
            OptionKey::BuildExecutables => "build_executables",
            OptionKey::SpvRemapper => "spv_remapper",
            OptionKey::Hlsl => "hlsl",
            OptionKey::EnableOptimizer => "enable_optimizer",
        }
    }

    pub fn kind(&self) -> OptionKind {
        OptionKind::Boolean
    }

    pub fn default_value(&self) -> bool {
        match self {
            OptionKey::Shared => false,
            OptionKey::Fpic
            | OptionKey::BuildExecutables
            | OptionKey::SpvRemapper
            | OptionKey::Hlsl
            | OptionKey::EnableOptimizer => true,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OptionKey::Shared => "Build shared libraries instead of static ones",
            OptionKey::Fpic => "Compile static libraries as position-independent code",
            OptionKey::BuildExecutables => "Build the glslangValidator and spirv-remap tools",
            OptionKey::SpvRemapper => "Build the SPVRemapper library",
            OptionKey::Hlsl => "Enable the HLSL front-end",
            OptionKey::EnableOptimizer => "Enable SPIR-V optimization through SPIRV-Tools",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "shared" => Ok(OptionKey::Shared),
            "fpic" => Ok(OptionKey::Fpic),
            "build_executables" => Ok(OptionKey::BuildExecutables),
            "spv_remapper" => Ok(OptionKey::SpvRemapper),
            "hlsl" => Ok(OptionKey::Hlsl),
            "enable_optimizer" => Ok(OptionKey::EnableOptimizer),
            _ => Err(RecipeError::UnknownOption(s.trim().to_string())),
        }
    }
}

/// Parse a boolean option value.
pub fn parse_bool(option: OptionKey, value: &str) -> Result<bool, RecipeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(RecipeError::InvalidOptionValue {
            option: option.to_string(),
            value: value.trim().to_string(),
        }),
    }
}

/// Option values as supplied by the caller, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOptions {
    pub shared: bool,
    #[serde(rename = "fPIC")]
    pub fpic: bool,
    pub build_executables: bool,
    pub spv_remapper: bool,
    pub hlsl: bool,
    pub enable_optimizer: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        RawOptions {
            shared: OptionKey::Shared.default_value(),
            fpic: OptionKey::Fpic.default_value(),
            build_executables: OptionKey::BuildExecutables.default_value(),
            spv_remapper: OptionKey::SpvRemapper.default_value(),
            hlsl: OptionKey::Hlsl.default_value(),
            enable_optimizer: OptionKey::EnableOptimizer.default_value(),
        }
    }
}

impl RawOptions {
    pub fn get(&self, key: OptionKey) -> bool {
        match key {
            OptionKey::Shared => self.shared,
            OptionKey::Fpic => self.fpic,
            OptionKey::BuildExecutables => self.build_executables,
            OptionKey::SpvRemapper => self.spv_remapper,
            OptionKey::Hlsl => self.hlsl,
            OptionKey::EnableOptimizer => self.enable_optimizer,
        }
    }

    pub fn set(&mut self, key: OptionKey, value: bool) {
        let slot = match key {
            OptionKey::Shared => &mut self.shared,
            OptionKey::Fpic => &mut self.fpic,
            OptionKey::BuildExecutables => &mut self.build_executables,
            OptionKey::SpvRemapper => &mut self.spv_remapper,
            OptionKey::Hlsl => &mut self.hlsl,
            OptionKey::EnableOptimizer => &mut self.enable_optimizer,
        };
        *slot = value;
    }

    /// Builder-style variant of [`RawOptions::set`].
    pub fn with(mut self, key: OptionKey, value: bool) -> Self {
        self.set(key, value);
        self
    }

    /// Apply a `key=value` override. A `glslang:` package prefix is accepted.
    pub fn apply_override(&mut self, spec: &str) -> Result<(), RecipeError> {
        let (key, value) = spec.split_once('=').ok_or_else(|| {
            RecipeError::InvalidOptionValue {
                option: spec.trim().to_string(),
                value: String::new(),
            }
        })?;
        let key = key.trim();
        let key = key.strip_prefix("glslang:").unwrap_or(key);

        let key: OptionKey = key.parse()?;
        let value = parse_bool(key, value)?;
        self.set(key, value);
        Ok(())
    }

    /// Iterate over every option and its value.
    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, bool)> + '_ {
        OptionKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RawOptions::default();
        assert!(!opts.shared);
        assert!(opts.fpic);
        assert!(opts.build_executables);
        assert!(opts.spv_remapper);
        assert!(opts.hlsl);
        assert!(opts.enable_optimizer);
    }

    #[test]
    fn test_parse_option_key() {
        assert_eq!("fPIC".parse::<OptionKey>().unwrap(), OptionKey::Fpic);
        assert_eq!("fpic".parse::<OptionKey>().unwrap(), OptionKey::Fpic);
        assert_eq!(
            "build-executables".parse::<OptionKey>().unwrap(),
            OptionKey::BuildExecutables
        );
        assert!(matches!(
            "with_tests".parse::<OptionKey>(),
            Err(RecipeError::UnknownOption(name)) if name == "with_tests"
        ));
    }

    #[test]
    fn test_apply_override() {
        let mut opts = RawOptions::default();
        opts.apply_override("shared=True").unwrap();
        opts.apply_override("glslang:hlsl=off").unwrap();
        opts.apply_override(" enable_optimizer = 0 ").unwrap();

        assert!(opts.shared);
        assert!(!opts.hlsl);
        assert!(!opts.enable_optimizer);
    }

    #[test]
    fn test_apply_override_rejects_bad_input() {
        let mut opts = RawOptions::default();
        assert!(matches!(
            opts.apply_override("shared=maybe"),
            Err(RecipeError::InvalidOptionValue { .. })
        ));
        assert!(opts.apply_override("shared").is_err());
        assert!(matches!(
            opts.apply_override("vulkan=true"),
            Err(RecipeError::UnknownOption(_))
        ));
        assert_eq!(opts, RawOptions::default());
    }

    #[test]
    fn test_every_option_is_boolean_with_listed_values() {
        for key in OptionKey::ALL {
            assert_eq!(key.kind().allowed_values(), &["True", "False"]);
            assert_eq!(key.as_str().parse::<OptionKey>().unwrap(), key);
        }
    }
}
