//! Installed-package verification.
//!
//! Checks that every library file the package description promises is
//! present under `<package>/lib` (or `<package>/bin` for Windows DLLs).

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::ops::publish::PackageDescription;

/// Directories searched for installed libraries.
const LIBRARY_DIRS: &[&str] = &["lib", "bin"];

/// A published library file that is not installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingLibrary {
    pub component: String,
    pub file: String,
}

/// Result of verifying an installed package.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub package_dir: PathBuf,
    /// Expected files that were found, with their location
    pub found: Vec<PathBuf>,
    pub missing: Vec<MissingLibrary>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare the installed tree against `description`.
pub fn verify_package(description: &PackageDescription, package_dir: &Path) -> VerifyReport {
    let installed = installed_files(package_dir);
    tracing::debug!(
        "found {} file(s) under {}",
        installed.len(),
        package_dir.display()
    );

    let mut found = Vec::new();
    let mut missing = Vec::new();

    for component in &description.components {
        for file in &component.lib_files {
            match installed.get(file.as_str()) {
                Some(path) => found.push(path.clone()),
                None => missing.push(MissingLibrary {
                    component: component.id.clone(),
                    file: file.clone(),
                }),
            }
        }
    }

    VerifyReport {
        package_dir: package_dir.to_path_buf(),
        found,
        missing,
    }
}

/// File name to path for every file under the library directories.
fn installed_files(package_dir: &Path) -> BTreeMap<String, PathBuf> {
    let mut files = BTreeMap::new();

    for dir in LIBRARY_DIRS {
        let root = package_dir.join(dir);
        if !root.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files
                    .entry(name.to_string())
                    .or_insert_with(|| entry.path().to_path_buf());
            }
        }
    }

    files
}

/// Format a verification report for display.
pub fn format_report(report: &VerifyReport, verbose: bool) -> String {
    let mut output = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut output, report, verbose);
    output
}

fn write_report(out: &mut String, report: &VerifyReport, verbose: bool) -> fmt::Result {
    writeln!(out, "Verify: {}", report.package_dir.display())?;

    if verbose {
        for path in &report.found {
            writeln!(out, "  [OK] {}", path.display())?;
        }
    }
    for m in &report.missing {
        writeln!(out, "  [MISSING] {} ({})", m.file, m.component)?;
    }

    let status = if report.passed() { "PASSED" } else { "FAILED" };
    writeln!(
        out,
        "Result: {} ({}/{} libraries found)",
        status,
        report.found.len(),
        report.found.len() + report.missing.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::validate;
    use crate::core::options::{OptionKey, RawOptions};
    use crate::core::platform::{BuildType, CompilerIdentity, Os, PlatformFacts};
    use crate::ops::publish::{describe, PackageInfo};
    use tempfile::TempDir;

    fn description(package_dir: &Path) -> PackageDescription {
        let platform =
            PlatformFacts::new(Os::Linux, CompilerIdentity::new("gcc", "12"), BuildType::Release);
        let opts = RawOptions::default()
            .with(OptionKey::Hlsl, false)
            .with(OptionKey::SpvRemapper, false);
        let config = validate(&opts, &platform).unwrap();
        let info = PackageInfo {
            version: "11.7.0".to_string(),
            package_dir: package_dir.to_path_buf(),
        };
        describe(&config, &platform, &info).unwrap()
    }

    #[test]
    fn test_complete_package_passes() {
        let tmp = TempDir::new().unwrap();
        let desc = description(tmp.path());
        let lib = tmp.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        for file in desc.components.iter().flat_map(|c| &c.lib_files) {
            std::fs::write(lib.join(file), "").unwrap();
        }

        let report = verify_package(&desc, tmp.path());
        assert!(report.passed(), "{:?}", report.missing);
        assert_eq!(report.found.len(), 6);
    }

    #[test]
    fn test_reports_missing_libraries() {
        let tmp = TempDir::new().unwrap();
        let desc = description(tmp.path());
        let lib = tmp.path().join("lib").join("nested");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libglslang.a"), "").unwrap();

        let report = verify_package(&desc, tmp.path());
        assert!(!report.passed());
        assert_eq!(report.found, vec![lib.join("libglslang.a")]);
        assert!(report.missing.contains(&MissingLibrary {
            component: "spirv".to_string(),
            file: "libSPIRV.a".to_string(),
        }));

        let text = format_report(&report, false);
        assert!(text.contains("[MISSING] libSPIRV.a (spirv)"));
        assert!(text.contains("Result: FAILED (1/6 libraries found)"));
    }

    #[test]
    fn test_empty_package_dir() {
        let tmp = TempDir::new().unwrap();
        let desc = description(tmp.path());
        let report = verify_package(&desc, &tmp.path().join("nope"));
        assert_eq!(report.missing.len(), 6);
        assert!(report.found.is_empty());
    }
}
