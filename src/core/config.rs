//! Configuration validation.
//!
//! [`validate`] is the only way to obtain a [`NormalizedConfig`]: it drops
//! options that are meaningless for the platform, rejects combinations
//! that are known to be broken and derives the external packages the build
//! needs. It performs no I/O.

use serde::Serialize;

use crate::core::error::RecipeError;
use crate::core::language::CppStandard;
use crate::core::options::{OptionKey, RawOptions};
use crate::core::platform::{Os, PlatformFacts};

/// Oldest C++ standard glslang compiles with.
pub const MIN_CPP_STANDARD: CppStandard = CppStandard::Cpp11;

/// Systems where shared glslang builds are known to be broken.
pub const SHARED_BROKEN_ON: [Os; 2] = [Os::Windows, Os::Macos];

/// External package providing the SPIR-V optimizer.
pub const OPTIMIZER_PACKAGE: &str = "spirv-tools";

/// Validated, platform-adjusted options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedConfig {
    shared: bool,
    /// `None` when the option was removed for this configuration
    #[serde(rename = "fPIC")]
    fpic: Option<bool>,
    build_executables: bool,
    spv_remapper: bool,
    hlsl: bool,
    enable_optimizer: bool,
    requirements: Vec<String>,
}

impl NormalizedConfig {
    pub fn shared(&self) -> bool {
        self.shared
    }

    pub fn fpic(&self) -> Option<bool> {
        self.fpic
    }

    pub fn build_executables(&self) -> bool {
        self.build_executables
    }

    pub fn spv_remapper(&self) -> bool {
        self.spv_remapper
    }

    pub fn hlsl(&self) -> bool {
        self.hlsl
    }

    pub fn enable_optimizer(&self) -> bool {
        self.enable_optimizer
    }

    /// External packages the build depends on.
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    /// Value of an option, `None` if it was removed.
    pub fn get(&self, key: OptionKey) -> Option<bool> {
        match key {
            OptionKey::Shared => Some(self.shared),
            OptionKey::Fpic => self.fpic,
            OptionKey::BuildExecutables => Some(self.build_executables),
            OptionKey::SpvRemapper => Some(self.spv_remapper),
            OptionKey::Hlsl => Some(self.hlsl),
            OptionKey::EnableOptimizer => Some(self.enable_optimizer),
        }
    }
}

/// Validate raw options against the platform.
///
/// Rules are applied in a fixed order so the reported error is
/// deterministic when several would apply.
pub fn validate(
    options: &RawOptions,
    platform: &PlatformFacts,
) -> Result<NormalizedConfig, RecipeError> {
    let mut fpic = Some(options.fpic);

    if !platform.os.supports_fpic() {
        tracing::debug!("dropping option fPIC: not supported on {}", platform.os);
        fpic = None;
    }

    if options.shared && fpic.is_some() {
        tracing::debug!("dropping option fPIC: implied by shared=True");
        fpic = None;
    }

    if options.shared && SHARED_BROKEN_ON.contains(&platform.os) {
        return Err(RecipeError::UnsupportedConfiguration {
            os: platform.os.to_string(),
            reason: "shared glslang builds are broken on Windows and Macos".to_string(),
        });
    }

    if let Some(found) = platform.cppstd {
        if found < MIN_CPP_STANDARD {
            return Err(RecipeError::UnsupportedCompiler {
                compiler: platform.compiler.to_string(),
                required: MIN_CPP_STANDARD,
                found,
            });
        }
    }

    let mut requirements = Vec::new();
    if options.enable_optimizer {
        requirements.push(OPTIMIZER_PACKAGE.to_string());
    }

    Ok(NormalizedConfig {
        shared: options.shared,
        fpic,
        build_executables: options.build_executables,
        spv_remapper: options.spv_remapper,
        hlsl: options.hlsl,
        enable_optimizer: options.enable_optimizer,
        requirements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{BuildType, CompilerIdentity};

    fn platform(os: Os) -> PlatformFacts {
        PlatformFacts::new(os, CompilerIdentity::new("gcc", "12"), BuildType::Release)
    }

    const ALL_OS: [Os; 6] = [
        Os::Linux,
        Os::FreeBsd,
        Os::Macos,
        Os::Windows,
        Os::Android,
        Os::Ios,
    ];

    #[test]
    fn test_fpic_dropped_on_windows_for_any_input() {
        for fpic in [true, false] {
            let opts = RawOptions::default().with(OptionKey::Fpic, fpic);
            let config = validate(&opts, &platform(Os::Windows)).unwrap();
            assert_eq!(config.fpic(), None);
            assert_eq!(config.get(OptionKey::Fpic), None);
        }
    }

    #[test]
    fn test_fpic_dropped_when_shared() {
        let opts = RawOptions::default().with(OptionKey::Shared, true);
        let config = validate(&opts, &platform(Os::Linux)).unwrap();
        assert!(config.shared());
        assert_eq!(config.fpic(), None);
    }

    #[test]
    fn test_fpic_kept_for_static_builds() {
        let opts = RawOptions::default().with(OptionKey::Fpic, false);
        let config = validate(&opts, &platform(Os::Linux)).unwrap();
        assert_eq!(config.fpic(), Some(false));
    }

    #[test]
    fn test_shared_rejected_on_broken_platforms() {
        for os in SHARED_BROKEN_ON {
            let shared = RawOptions::default().with(OptionKey::Shared, true);
            assert!(matches!(
                validate(&shared, &platform(os)),
                Err(RecipeError::UnsupportedConfiguration { .. })
            ));

            let static_build = RawOptions::default();
            assert!(validate(&static_build, &platform(os)).is_ok());
        }
    }

    #[test]
    fn test_shared_accepted_elsewhere() {
        let shared = RawOptions::default().with(OptionKey::Shared, true);
        for os in ALL_OS.iter().filter(|os| !SHARED_BROKEN_ON.contains(os)) {
            assert!(validate(&shared, &platform(*os)).is_ok(), "{}", os);
        }
    }

    #[test]
    fn test_old_cppstd_rejected_for_every_option_combination() {
        let facts = platform(Os::Linux).with_cppstd(CppStandard::Cpp98);
        for bits in 0u8..64 {
            let mut opts = RawOptions::default();
            for (i, key) in OptionKey::ALL.iter().enumerate() {
                opts.set(*key, bits & (1 << i) != 0);
            }
            assert!(matches!(
                validate(&opts, &facts),
                Err(RecipeError::UnsupportedCompiler { found: CppStandard::Cpp98, .. })
            ));
        }
    }

    #[test]
    fn test_cppstd_floor_is_inclusive() {
        let facts = platform(Os::Linux).with_cppstd(CppStandard::Cpp11);
        assert!(validate(&RawOptions::default(), &facts).is_ok());
    }

    #[test]
    fn test_broken_platform_reported_before_compiler() {
        let facts = platform(Os::Windows).with_cppstd(CppStandard::Cpp98);
        let opts = RawOptions::default().with(OptionKey::Shared, true);
        assert!(matches!(
            validate(&opts, &facts),
            Err(RecipeError::UnsupportedConfiguration { .. })
        ));
    }

    #[test]
    fn test_optimizer_requirement() {
        let with = validate(&RawOptions::default(), &platform(Os::Linux)).unwrap();
        assert_eq!(with.requirements(), &["spirv-tools".to_string()]);

        let opts = RawOptions::default().with(OptionKey::EnableOptimizer, false);
        let without = validate(&opts, &platform(Os::Linux)).unwrap();
        assert!(without.requirements().is_empty());
    }
}
