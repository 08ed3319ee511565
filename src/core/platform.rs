//! Platform facts supplied by the invoking environment.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::core::language::CppStandard;
use crate::util::process::find_cxx_compiler;

/// Error returned when a platform setting cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("invalid {setting} '{value}', valid values: {expected}")]
pub struct PlatformParseError {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Os {
    Linux,
    FreeBsd,
    Macos,
    Windows,
    Android,
    Ios,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::FreeBsd => "FreeBSD",
            Os::Macos => "Macos",
            Os::Windows => "Windows",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }

    /// Linux-like systems that need libm/libpthread linked explicitly.
    pub fn is_linux_family(&self) -> bool {
        matches!(self, Os::Linux | Os::FreeBsd)
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }

    pub fn is_apple(&self) -> bool {
        matches!(self, Os::Macos | Os::Ios)
    }

    /// Whether `fPIC` is a meaningful option on this system.
    pub fn supports_fpic(&self) -> bool {
        !self.is_windows()
    }

    /// The operating system this process runs on.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Linux,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "freebsd" => Ok(Os::FreeBsd),
            "macos" | "darwin" | "osx" => Ok(Os::Macos),
            "windows" | "win32" => Ok(Os::Windows),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            _ => Err(PlatformParseError {
                setting: "operating system",
                value: s.to_string(),
                expected: "Linux, FreeBSD, Macos, Windows, Android, iOS",
            }),
        }
    }
}

/// CMake build variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildType::Debug)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(PlatformParseError {
                setting: "build type",
                value: s.to_string(),
                expected: "Debug, Release, RelWithDebInfo, MinSizeRel",
            }),
        }
    }
}

/// Compiler identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerIdentity {
    /// Compiler family (gcc, clang, apple-clang, msvc)
    pub family: String,
    /// Compiler version
    pub version: String,
}

impl CompilerIdentity {
    pub fn new(family: &str, version: &str) -> Self {
        CompilerIdentity {
            family: family.to_string(),
            version: version.to_string(),
        }
    }

    /// Guess the host C++ compiler from `CXX` and `PATH`.
    pub fn detect() -> Self {
        let family = find_cxx_compiler()
            .and_then(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(compiler_family)
            })
            .unwrap_or("unknown");

        CompilerIdentity::new(family, "unknown")
    }
}

fn compiler_family(executable: &str) -> &'static str {
    let name = executable.to_ascii_lowercase();
    if name == "cl" {
        "msvc"
    } else if name.contains("clang") {
        if cfg!(target_os = "macos") {
            "apple-clang"
        } else {
            "clang"
        }
    } else if name.contains("g++") || name.contains("gcc") || name == "c++" {
        "gcc"
    } else {
        "unknown"
    }
}

impl fmt::Display for CompilerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family, self.version)
    }
}

/// Facts about the target platform. Read-only to the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformFacts {
    pub os: Os,
    pub compiler: CompilerIdentity,
    /// C++ standard the compiler is configured for, when declared
    pub cppstd: Option<CppStandard>,
    pub build_type: BuildType,
}

impl PlatformFacts {
    pub fn new(os: Os, compiler: CompilerIdentity, build_type: BuildType) -> Self {
        PlatformFacts {
            os,
            compiler,
            cppstd: None,
            build_type,
        }
    }

    /// Facts for the host, release build, no declared standard.
    pub fn host() -> Self {
        PlatformFacts::new(Os::host(), CompilerIdentity::detect(), BuildType::Release)
    }

    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    pub fn with_cppstd(mut self, cppstd: CppStandard) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerIdentity) -> Self {
        self.compiler = compiler;
        self
    }

    /// Debug builds on Windows get decorated library names.
    pub fn is_windows_debug(&self) -> bool {
        self.os.is_windows() && self.build_type.is_debug()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_os() {
        assert_eq!("linux".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!("Darwin".parse::<Os>().unwrap(), Os::Macos);
        assert_eq!("FreeBSD".parse::<Os>().unwrap(), Os::FreeBsd);
        let err = "plan9".parse::<Os>().unwrap_err();
        assert!(err.to_string().contains("plan9"));
    }

    #[test]
    fn test_os_families() {
        assert!(Os::Linux.is_linux_family());
        assert!(Os::FreeBsd.is_linux_family());
        assert!(!Os::Macos.is_linux_family());
        assert!(!Os::Windows.supports_fpic());
        assert!(Os::Android.supports_fpic());
    }

    #[test]
    fn test_parse_build_type() {
        assert_eq!("debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert_eq!(
            "RelWithDebInfo".parse::<BuildType>().unwrap(),
            BuildType::RelWithDebInfo
        );
        assert!(!BuildType::RelWithDebInfo.is_debug());
        assert!("fast".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_windows_debug() {
        let facts = PlatformFacts::new(
            Os::Windows,
            CompilerIdentity::new("msvc", "193"),
            BuildType::Debug,
        );
        assert!(facts.is_windows_debug());
        assert!(!facts.clone().with_build_type(BuildType::Release).is_windows_debug());
        assert!(!facts.with_os(Os::Linux).is_windows_debug());
    }

    #[test]
    fn test_compiler_family() {
        assert_eq!(compiler_family("g++"), "gcc");
        assert_eq!(compiler_family("cl"), "msvc");
        assert_eq!(compiler_family("x86_64-linux-gnu-g++-12"), "gcc");
    }
}
