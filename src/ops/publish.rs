//! Package description: what consumers of the installed glslang package
//! link against.
//!
//! The description is derived from the [`ComponentGraph`] alone, so it can
//! be produced without running a build.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::component::{Component, ComponentId};
use crate::core::config::NormalizedConfig;
use crate::core::error::RecipeError;
use crate::core::graph::ComponentGraph;
use crate::core::platform::{Os, PlatformFacts};
use crate::sources::UPSTREAM_URL;

pub const PACKAGE_NAME: &str = "glslang";
pub const PACKAGE_LICENSE: &str = "BSD-3-Clause";
pub const PACKAGE_DESCRIPTION: &str =
    "Khronos reference front-end for GLSL and ESSL, and sample SPIR-V generator";

/// Output format for package descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Toml,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid output format '{0}', valid values: text, json, toml")]
pub struct OutputFormatParseError(pub String);

/// Where and what was (or would be) installed.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub version: String,
    pub package_dir: PathBuf,
}

/// Consumer-facing description of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescription {
    pub id: String,
    /// CMake `find_package` target name
    pub find_name: String,
    /// pkg-config module name
    pub pkg_config_name: String,
    pub libs: Vec<String>,
    /// Library files expected on disk
    pub lib_files: Vec<String>,
    pub requires: Vec<String>,
    pub defines: Vec<String>,
    pub system_libs: Vec<String>,
}

/// Description of the whole package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescription {
    pub name: String,
    pub version: String,
    pub license: String,
    pub url: String,
    pub description: String,
    pub os: String,
    pub build_type: String,
    pub shared: bool,
    /// External packages required by the build
    pub requirements: Vec<String>,
    /// Directory to add to `PATH` for the glslang tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<String>,
    /// All libraries, dependents first
    pub link_order: Vec<String>,
    pub components: Vec<ComponentDescription>,
}

/// Build the component graph for `config` and describe it.
pub fn describe(
    config: &NormalizedConfig,
    platform: &PlatformFacts,
    info: &PackageInfo,
) -> Result<PackageDescription, RecipeError> {
    let graph = ComponentGraph::build(config, platform)?;
    Ok(PackageDescription::from_graph(&graph, config, platform, info))
}

impl PackageDescription {
    pub fn from_graph(
        graph: &ComponentGraph,
        config: &NormalizedConfig,
        platform: &PlatformFacts,
        info: &PackageInfo,
    ) -> Self {
        let components = graph
            .components()
            .map(|c| describe_component(c, platform.os, config.shared()))
            .collect();

        let executable_path = config
            .build_executables()
            .then(|| info.package_dir.join("bin").display().to_string());

        PackageDescription {
            name: PACKAGE_NAME.to_string(),
            version: info.version.clone(),
            license: PACKAGE_LICENSE.to_string(),
            url: UPSTREAM_URL.to_string(),
            description: PACKAGE_DESCRIPTION.to_string(),
            os: platform.os.to_string(),
            build_type: platform.build_type.to_string(),
            shared: config.shared(),
            requirements: config.requirements().to_vec(),
            executable_path,
            link_order: graph.link_order().into_iter().map(String::from).collect(),
            components,
        }
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentDescription> {
        self.components.iter().find(|c| c.id == id.as_str())
    }

    /// Render in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("failed to serialize description as JSON")
            }
            OutputFormat::Toml => {
                toml::to_string_pretty(self).context("failed to serialize description as TOML")
            }
        }
    }
}

fn describe_component(component: &Component, os: Os, shared: bool) -> ComponentDescription {
    let id = component.id();
    ComponentDescription {
        id: id.as_str().to_string(),
        find_name: format!("{}::{}", PACKAGE_NAME, id.library_name()),
        pkg_config_name: format!("{}-{}", PACKAGE_NAME, id.as_str()),
        libs: component.libs().to_vec(),
        lib_files: component
            .libs()
            .iter()
            .flat_map(|lib| library_files(lib, os, shared))
            .collect(),
        requires: component.requires().map(|r| r.to_string()).collect(),
        defines: component.defines().map(|d| d.render()).collect(),
        system_libs: component.system_libs().map(String::from).collect(),
    }
}

/// Files a library produces on `os`. Shared Windows builds also ship the
/// import library.
///
/// [`describe`] only sees configurations accepted by validation, which
/// rejects shared builds on Windows and macOS; those arms serve direct
/// callers naming files of an arbitrary build.
pub fn library_files(name: &str, os: Os, shared: bool) -> Vec<String> {
    match (os, shared) {
        (Os::Windows, false) => vec![format!("{}.lib", name)],
        (Os::Windows, true) => vec![format!("{}.lib", name), format!("{}.dll", name)],
        (os, false) if os.is_apple() => vec![format!("lib{}.a", name)],
        (os, true) if os.is_apple() => vec![format!("lib{}.dylib", name)],
        (_, false) => vec![format!("lib{}.a", name)],
        (_, true) => vec![format!("lib{}.so", name)],
    }
}

impl fmt::Display for PackageDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} ({})", self.name, self.version, self.license)?;
        writeln!(f, "  {}", self.url)?;
        writeln!(
            f,
            "  {} {}, {}",
            self.os,
            self.build_type,
            if self.shared { "shared" } else { "static" }
        )?;
        if !self.requirements.is_empty() {
            writeln!(f, "  requires: {}", self.requirements.join(", "))?;
        }
        if let Some(ref path) = self.executable_path {
            writeln!(f, "  executables: {}", path)?;
        }

        writeln!(f)?;
        writeln!(f, "Components:")?;
        for c in &self.components {
            writeln!(f, "  {} ({}, {})", c.id, c.find_name, c.pkg_config_name)?;
            writeln!(f, "      libs: {}", c.libs.join(", "))?;
            writeln!(f, "      files: {}", c.lib_files.join(", "))?;
            if !c.requires.is_empty() {
                writeln!(f, "      requires: {}", c.requires.join(", "))?;
            }
            if !c.defines.is_empty() {
                writeln!(f, "      defines: {}", c.defines.join(", "))?;
            }
            if !c.system_libs.is_empty() {
                writeln!(f, "      system libs: {}", c.system_libs.join(", "))?;
            }
        }

        writeln!(f)?;
        write!(f, "Link order: {}", self.link_order.join(" "))?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::validate;
    use crate::core::options::{OptionKey, RawOptions};
    use crate::core::platform::{BuildType, CompilerIdentity};

    fn describe_for(opts: RawOptions, os: Os, build_type: BuildType) -> PackageDescription {
        let platform = PlatformFacts::new(os, CompilerIdentity::new("gcc", "12"), build_type);
        let config = validate(&opts, &platform).unwrap();
        let info = PackageInfo {
            version: "11.7.0".to_string(),
            package_dir: PathBuf::from("/pkg"),
        };
        describe(&config, &platform, &info).unwrap()
    }

    #[test]
    fn test_linux_debug_description() {
        let desc = describe_for(RawOptions::default(), Os::Linux, BuildType::Debug);

        assert_eq!(desc.components.len(), 8);
        let ids: Vec<&str> = desc.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "core",
                "generic-codegen",
                "hlsl",
                "machine-independent",
                "ogl-compiler",
                "os-dependent",
                "spirv",
                "spv-remapper"
            ]
        );

        let core = desc.component(ComponentId::Core).unwrap();
        assert_eq!(core.find_name, "glslang::glslang");
        assert_eq!(core.pkg_config_name, "glslang-core");
        assert_eq!(core.libs, vec!["glslang"]);
        assert_eq!(core.lib_files, vec!["libglslang.a"]);
        assert_eq!(core.defines, vec!["ENABLE_HLSL"]);
        assert_eq!(core.system_libs, vec!["m", "pthread"]);
        assert_eq!(
            core.requires,
            vec!["hlsl", "machine-independent", "ogl-compiler", "os-dependent"]
        );

        let spirv = desc.component(ComponentId::Spirv).unwrap();
        assert_eq!(spirv.requires, vec!["core", "spirv-tools::spirv-tools-opt"]);
        assert_eq!(spirv.defines, vec!["ENABLE_OPT"]);

        assert_eq!(desc.requirements, vec!["spirv-tools"]);
        assert_eq!(desc.executable_path.as_deref(), Some("/pkg/bin"));
    }

    #[test]
    fn test_windows_debug_decorates_files() {
        let desc = describe_for(RawOptions::default(), Os::Windows, BuildType::Debug);
        let spirv = desc.component(ComponentId::Spirv).unwrap();
        assert_eq!(spirv.libs, vec!["SPIRVd"]);
        assert_eq!(spirv.lib_files, vec!["SPIRVd.lib"]);
        assert!(desc.link_order.iter().all(|lib| lib.ends_with('d')));
    }

    #[test]
    fn test_validated_windows_package_is_static() {
        let desc = describe_for(RawOptions::default(), Os::Windows, BuildType::Release);
        assert!(!desc.shared);
        for component in &desc.components {
            assert!(component.lib_files.iter().all(|f| f.ends_with(".lib")));
        }
    }

    #[test]
    fn test_no_executable_path_without_executables() {
        let opts = RawOptions::default().with(OptionKey::BuildExecutables, false);
        let desc = describe_for(opts, Os::Linux, BuildType::Release);
        assert!(desc.executable_path.is_none());
    }

    #[test]
    fn test_link_order_puts_dependents_first() {
        let desc = describe_for(RawOptions::default(), Os::Linux, BuildType::Release);
        let pos = |lib: &str| desc.link_order.iter().position(|l| l == lib).unwrap();
        assert!(pos("SPIRV") < pos("glslang"));
        assert!(pos("glslang") < pos("MachineIndependent"));
        assert!(pos("MachineIndependent") < pos("OSDependent"));
        assert_eq!(desc.link_order.len(), 8);
    }

    #[test]
    fn test_library_files() {
        assert_eq!(library_files("SPIRV", Os::Linux, true), vec!["libSPIRV.so"]);
        assert_eq!(library_files("SPIRV", Os::Ios, true), vec!["libSPIRV.dylib"]);
        assert_eq!(library_files("SPIRV", Os::Macos, false), vec!["libSPIRV.a"]);
        assert_eq!(
            library_files("SPIRV", Os::Windows, true),
            vec!["SPIRV.lib", "SPIRV.dll"]
        );
    }

    #[test]
    fn test_render_formats() {
        let desc = describe_for(RawOptions::default(), Os::Linux, BuildType::Release);

        let text = desc.render(OutputFormat::Text).unwrap();
        assert!(text.starts_with("glslang 11.7.0 (BSD-3-Clause)"));
        assert!(text.contains("  spirv (glslang::SPIRV, glslang-spirv)"));
        assert!(text.contains("defines: ENABLE_OPT"));

        let json: serde_json::Value =
            serde_json::from_str(&desc.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["components"][0]["id"], "core");
        assert_eq!(json["executable_path"], "/pkg/bin");

        let toml_out = desc.render(OutputFormat::Toml).unwrap();
        let parsed: toml::Value = toml::from_str(&toml_out).unwrap();
        assert_eq!(parsed["name"].as_str(), Some("glslang"));
        assert_eq!(
            parsed["components"].as_array().map(|c| c.len()),
            Some(8)
        );
    }

    #[test]
    fn test_toml_skips_missing_executable_path() {
        let opts = RawOptions::default().with(OptionKey::BuildExecutables, false);
        let desc = describe_for(opts, Os::Linux, BuildType::Release);
        let toml_out = desc.render(OutputFormat::Toml).unwrap();
        assert!(!toml_out.contains("executable_path"));
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
