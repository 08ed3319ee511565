//! CMake cache definitions for a validated configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::config::NormalizedConfig;

/// Value of a CMake cache definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CMakeValue {
    Bool(bool),
    String(String),
}

impl fmt::Display for CMakeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CMakeValue::Bool(true) => f.write_str("ON"),
            CMakeValue::Bool(false) => f.write_str("OFF"),
            CMakeValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CMakeValue {
    fn from(value: bool) -> Self {
        CMakeValue::Bool(value)
    }
}

impl From<&str> for CMakeValue {
    fn from(value: &str) -> Self {
        CMakeValue::String(value.to_string())
    }
}

/// Ordered set of `-D` definitions handed to `cmake`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CMakeParams {
    defs: BTreeMap<String, CMakeValue>,
}

impl CMakeParams {
    /// Map a configuration to glslang's CMake options.
    pub fn from_config(config: &NormalizedConfig) -> Self {
        let mut params = CMakeParams::default();

        params.set("BUILD_SHARED_LIBS", config.shared());
        if let Some(fpic) = config.fpic() {
            params.set("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
        }

        params.set("BUILD_EXTERNAL", false);
        params.set("SKIP_GLSLANG_INSTALL", false);
        params.set("ENABLE_GLSLANG_BINARIES", config.build_executables());
        params.set("ENABLE_SPVREMAPPER", config.spv_remapper());
        params.set("ENABLE_HLSL", config.hlsl());
        params.set("ENABLE_OPT", config.enable_optimizer());
        if config.enable_optimizer() {
            params.set("ALLOW_EXTERNAL_SPIRV_TOOLS", true);
        }

        params.set("ENABLE_RTTI", false);
        params.set("ENABLE_GLSLANG_JS", false);
        params.set("ENABLE_GLSLANG_WEBMIN", false);
        params.set("ENABLE_GLSLANG_WEBMIN_DEVEL", false);
        params.set("ENABLE_PCH", true);
        params.set("USE_CCACHE", false);
        params.set("ENABLE_CTEST", false);

        params
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<CMakeValue>) {
        self.defs.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&CMakeValue> {
        self.defs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CMakeValue)> {
        self.defs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// `-DNAME=VALUE` arguments, sorted by name.
    pub fn to_args(&self) -> Vec<String> {
        self.defs
            .iter()
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }
}
