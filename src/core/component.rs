//! Publishable components and the fixed table they are built from.
//!
//! Each glslang library is a component with its own link requirements.
//! Which components exist, and which optional edges and defines they
//! carry, is declared once in [`TEMPLATES`] and [`CONDITIONAL_EDGES`].
//! A [`Component`] is built from its template in one pass and never
//! modified afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::core::config::{NormalizedConfig, OPTIMIZER_PACKAGE};
use crate::core::platform::PlatformFacts;

/// Suffix appended to library names for Windows debug builds.
pub const DEBUG_SUFFIX: char = 'd';

/// Identifier of a glslang component.
///
/// Variants are declared in lexical order of their identifiers so the
/// derived `Ord` matches string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentId {
    Core,
    GenericCodegen,
    Hlsl,
    MachineIndependent,
    OglCompiler,
    OsDependent,
    Spirv,
    SpvRemapper,
}

impl ComponentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentId::Core => "core",
            ComponentId::GenericCodegen => "generic-codegen",
            ComponentId::Hlsl => "hlsl",
            ComponentId::MachineIndependent => "machine-independent",
            ComponentId::OglCompiler => "ogl-compiler",
            ComponentId::OsDependent => "os-dependent",
            ComponentId::Spirv => "spirv",
            ComponentId::SpvRemapper => "spv-remapper",
        }
    }

    /// Library name as produced by the glslang build, undecorated.
    pub fn library_name(&self) -> &'static str {
        match self {
            ComponentId::Core => "glslang",
            ComponentId::GenericCodegen => "GenericCodeGen",
            ComponentId::Hlsl => "HLSL",
            ComponentId::MachineIndependent => "MachineIndependent",
            ComponentId::OglCompiler => "OGLCompiler",
            ComponentId::OsDependent => "OSDependent",
            ComponentId::Spirv => "SPIRV",
            ComponentId::SpvRemapper => "SPVRemapper",
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component of another package, referenced but not modeled here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExternalRef {
    pub package: String,
    pub component: String,
}

impl ExternalRef {
    pub fn new(package: impl Into<String>, component: impl Into<String>) -> Self {
        ExternalRef {
            package: package.into(),
            component: component.into(),
        }
    }

    /// The SPIRV-Tools optimizer library.
    pub fn optimizer() -> Self {
        ExternalRef::new(OPTIMIZER_PACKAGE, "spirv-tools-opt")
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.package, self.component)
    }
}

/// Target of a requirement edge.
///
/// Internal components order before external references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Requirement {
    Component(ComponentId),
    External(ExternalRef),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Component(id) => write!(f, "{}", id),
            Requirement::External(ext) => write!(f, "{}", ext),
        }
    }
}

/// A preprocessor define exported to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Define {
    /// Simple flag: -DFOO
    Flag(String),
    /// Key-value: -DFOO=bar
    KeyValue { name: String, value: String },
}

impl Define {
    pub fn flag(name: impl Into<String>) -> Self {
        Define::Flag(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Define::Flag(n) => n,
            Define::KeyValue { name, .. } => name,
        }
    }

    /// `NAME` or `NAME=value`.
    pub fn render(&self) -> String {
        match self {
            Define::Flag(name) => name.clone(),
            Define::KeyValue { name, value } => format!("{}={}", name, value),
        }
    }
}

/// Condition under which a component or edge is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    Hlsl,
    SpvRemapper,
    Optimizer,
}

impl Condition {
    pub fn holds(&self, config: &NormalizedConfig) -> bool {
        match self {
            Condition::Always => true,
            Condition::Hlsl => config.hlsl(),
            Condition::SpvRemapper => config.spv_remapper(),
            Condition::Optimizer => config.enable_optimizer(),
        }
    }
}

/// Static description of a component.
#[derive(Debug, Clone, Copy)]
pub struct ComponentTemplate {
    pub id: ComponentId,
    pub requires: &'static [ComponentId],
    /// System libraries needed on Linux and FreeBSD
    pub linux_system_libs: &'static [&'static str],
    pub when: Condition,
}

/// Where a conditional edge points.
#[derive(Debug, Clone, Copy)]
pub enum EdgeTarget {
    Component(ComponentId),
    Optimizer,
}

/// An edge, plus the define announcing it, added only when `when` holds.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalEdge {
    pub from: ComponentId,
    pub to: EdgeTarget,
    pub define: &'static str,
    pub when: Condition,
}

pub const TEMPLATES: &[ComponentTemplate] = &[
    ComponentTemplate {
        id: ComponentId::OsDependent,
        requires: &[],
        linux_system_libs: &["pthread"],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::OglCompiler,
        requires: &[],
        linux_system_libs: &[],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::GenericCodegen,
        requires: &[],
        linux_system_libs: &[],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::MachineIndependent,
        requires: &[
            ComponentId::OglCompiler,
            ComponentId::OsDependent,
            ComponentId::GenericCodegen,
        ],
        linux_system_libs: &[],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::Core,
        requires: &[
            ComponentId::OglCompiler,
            ComponentId::OsDependent,
            ComponentId::MachineIndependent,
        ],
        linux_system_libs: &["m", "pthread"],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::Spirv,
        requires: &[ComponentId::Core],
        linux_system_libs: &[],
        when: Condition::Always,
    },
    ComponentTemplate {
        id: ComponentId::Hlsl,
        requires: &[],
        linux_system_libs: &[],
        when: Condition::Hlsl,
    },
    ComponentTemplate {
        id: ComponentId::SpvRemapper,
        requires: &[],
        linux_system_libs: &[],
        when: Condition::SpvRemapper,
    },
];

pub const CONDITIONAL_EDGES: &[ConditionalEdge] = &[
    ConditionalEdge {
        from: ComponentId::Core,
        to: EdgeTarget::Component(ComponentId::Hlsl),
        define: "ENABLE_HLSL",
        when: Condition::Hlsl,
    },
    ConditionalEdge {
        from: ComponentId::Spirv,
        to: EdgeTarget::Optimizer,
        define: "ENABLE_OPT",
        when: Condition::Optimizer,
    },
];

/// Library name of `id` as built for the platform.
///
/// Windows debug builds append [`DEBUG_SUFFIX`] to the canonical name;
/// every other platform keeps it. The input is always the canonical name,
/// so the result does not depend on how often it is computed.
pub fn decorated_library(id: ComponentId, platform: &PlatformFacts) -> String {
    let name = id.library_name();
    if platform.is_windows_debug() {
        format!("{}{}", name, DEBUG_SUFFIX)
    } else {
        name.to_string()
    }
}

/// A unit of publishable build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub(crate) id: ComponentId,
    /// Decorated library names
    pub(crate) libs: Vec<String>,
    pub(crate) defines: BTreeSet<Define>,
    pub(crate) system_libs: BTreeSet<String>,
    pub(crate) requires: BTreeSet<Requirement>,
}

impl Component {
    /// Build a component from its template and every conditional edge
    /// leaving it.
    pub fn from_template(
        template: &ComponentTemplate,
        config: &NormalizedConfig,
        platform: &PlatformFacts,
    ) -> Self {
        let mut requires: BTreeSet<Requirement> = template
            .requires
            .iter()
            .map(|&id| Requirement::Component(id))
            .collect();
        let mut defines = BTreeSet::new();

        for edge in CONDITIONAL_EDGES
            .iter()
            .filter(|e| e.from == template.id && e.when.holds(config))
        {
            requires.insert(match edge.to {
                EdgeTarget::Component(id) => Requirement::Component(id),
                EdgeTarget::Optimizer => Requirement::External(ExternalRef::optimizer()),
            });
            defines.insert(Define::flag(edge.define));
        }

        let system_libs = if platform.os.is_linux_family() {
            template
                .linux_system_libs
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            BTreeSet::new()
        };

        Component {
            id: template.id,
            libs: vec![decorated_library(template.id, platform)],
            defines,
            system_libs,
            requires,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    pub fn defines(&self) -> impl Iterator<Item = &Define> {
        self.defines.iter()
    }

    pub fn has_define(&self, name: &str) -> bool {
        self.defines.iter().any(|d| d.name() == name)
    }

    pub fn system_libs(&self) -> impl Iterator<Item = &str> {
        self.system_libs.iter().map(|s| s.as_str())
    }

    pub fn requires(&self) -> impl Iterator<Item = &Requirement> {
        self.requires.iter()
    }

    /// Internal components this one requires directly.
    pub fn required_components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.requires.iter().filter_map(|r| match r {
            Requirement::Component(id) => Some(*id),
            Requirement::External(_) => None,
        })
    }

    pub fn external_requirements(&self) -> impl Iterator<Item = &ExternalRef> {
        self.requires.iter().filter_map(|r| match r {
            Requirement::External(ext) => Some(ext),
            Requirement::Component(_) => None,
        })
    }
}

/// Templates indexed by identifier.
pub fn template_index() -> BTreeMap<ComponentId, &'static ComponentTemplate> {
    TEMPLATES.iter().map(|t| (t.id, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::validate;
    use crate::core::options::{OptionKey, RawOptions};
    use crate::core::platform::{BuildType, CompilerIdentity, Os};

    fn facts(os: Os, build_type: BuildType) -> PlatformFacts {
        PlatformFacts::new(os, CompilerIdentity::new("gcc", "12"), build_type)
    }

    #[test]
    fn test_identifier_order_is_lexical() {
        let ids: Vec<ComponentId> = template_index().keys().copied().collect();
        let mut names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        let in_order = names.clone();
        names.sort();
        assert_eq!(names, in_order);
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn test_decoration_only_on_windows_debug() {
        let win_debug = facts(Os::Windows, BuildType::Debug);
        assert_eq!(decorated_library(ComponentId::Spirv, &win_debug), "SPIRVd");
        assert_eq!(
            decorated_library(ComponentId::Spirv, &facts(Os::Windows, BuildType::Release)),
            "SPIRV"
        );
        assert_eq!(
            decorated_library(ComponentId::Spirv, &facts(Os::Linux, BuildType::Debug)),
            "SPIRV"
        );
    }

    #[test]
    fn test_decoration_applies_to_every_library() {
        let win_debug = facts(Os::Windows, BuildType::Debug);
        for template in TEMPLATES {
            let name = template.id.library_name();
            let decorated = decorated_library(template.id, &win_debug);
            assert_eq!(decorated, format!("{}d", name));
            // Computing it again starts from the canonical name.
            assert_eq!(decorated_library(template.id, &win_debug), decorated);
        }
    }

    #[test]
    fn test_system_libs_only_on_linux_family() {
        let config = validate(&RawOptions::default(), &facts(Os::Linux, BuildType::Release))
            .unwrap();
        let index = template_index();

        let linux = Component::from_template(
            index[&ComponentId::Core],
            &config,
            &facts(Os::FreeBsd, BuildType::Release),
        );
        assert_eq!(linux.system_libs().collect::<Vec<_>>(), vec!["m", "pthread"]);

        let mac = Component::from_template(
            index[&ComponentId::Core],
            &config,
            &facts(Os::Macos, BuildType::Release),
        );
        assert_eq!(mac.system_libs().count(), 0);
    }

    #[test]
    fn test_conditional_edge_adds_define() {
        let platform = facts(Os::Linux, BuildType::Release);
        let index = template_index();

        let on = validate(&RawOptions::default(), &platform).unwrap();
        let spirv = Component::from_template(index[&ComponentId::Spirv], &on, &platform);
        assert!(spirv.has_define("ENABLE_OPT"));
        assert_eq!(
            spirv.external_requirements().collect::<Vec<_>>(),
            vec![&ExternalRef::optimizer()]
        );

        let opts = RawOptions::default().with(OptionKey::EnableOptimizer, false);
        let off = validate(&opts, &platform).unwrap();
        let spirv = Component::from_template(index[&ComponentId::Spirv], &off, &platform);
        assert!(!spirv.has_define("ENABLE_OPT"));
        assert_eq!(spirv.external_requirements().count(), 0);
    }

    #[test]
    fn test_requirement_display() {
        assert_eq!(Requirement::Component(ComponentId::Core).to_string(), "core");
        assert_eq!(
            Requirement::External(ExternalRef::optimizer()).to_string(),
            "spirv-tools::spirv-tools-opt"
        );
        assert!(
            Requirement::Component(ComponentId::SpvRemapper)
                < Requirement::External(ExternalRef::optimizer())
        );
    }
}
