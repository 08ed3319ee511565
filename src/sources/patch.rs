//! Patch application.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::fs::{read_to_string, write_string};
use crate::util::hash::{sha256_file, verify_sha256};
use crate::util::process::{find_git, ProcessBuilder};

/// A patch file applied on top of the fetched source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub path: PathBuf,
    /// SHA256 of the patch file, if pinned
    pub sha256: Option<String>,
}

impl Patch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Patch {
            path: path.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Check the patch exists and matches its pinned hash.
    pub fn verify(&self) -> Result<()> {
        if !self.path.is_file() {
            bail!("patch file not found: {}", self.path.display());
        }
        if let Some(ref expected) = self.sha256 {
            let actual = sha256_file(&self.path)?;
            verify_sha256(&self.path.display().to_string(), &actual, expected)?;
        }
        Ok(())
    }
}

/// File in the source tree listing the SHA256 of each applied patch, in
/// application order.
pub(crate) const APPLIED_MARKER: &str = ".glslang-recipe-patches";

/// Apply patches in order. Every patch is verified before the first one
/// touches the source tree.
///
/// Patches already recorded in the source tree are skipped, so a reused
/// tree is brought up to date instead of patched twice. A tree whose record
/// is not a prefix of `patches` was patched differently and is rejected.
pub fn apply_patches(patches: &[Patch], source_dir: &Path) -> Result<()> {
    let mut hashes = Vec::with_capacity(patches.len());
    for patch in patches {
        patch.verify()?;
        hashes.push(sha256_file(&patch.path)?);
    }

    let applied = read_applied(source_dir)?;
    if !hashes.starts_with(&applied) {
        bail!(
            "source tree {} carries patches that are not configured; \
             remove it to fetch a clean copy",
            source_dir.display()
        );
    }

    let pending = &patches[applied.len()..];
    if pending.is_empty() {
        tracing::debug!("no patches to apply");
        return Ok(());
    }
    if !applied.is_empty() {
        tracing::info!("{} patch(es) already applied", applied.len());
    }

    let git = find_git().context("git is required to apply patches but was not found in PATH")?;
    let mut record = applied;
    for (patch, hash) in pending.iter().zip(&hashes[record.len()..]) {
        apply_single_patch(&git, &patch.path, source_dir)?;
        record.push(hash.clone());
        write_applied(source_dir, &record)?;
    }
    Ok(())
}

fn read_applied(source_dir: &Path) -> Result<Vec<String>> {
    let marker = source_dir.join(APPLIED_MARKER);
    if !marker.exists() {
        return Ok(Vec::new());
    }
    Ok(read_to_string(&marker)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn write_applied(source_dir: &Path, hashes: &[String]) -> Result<()> {
    let mut contents = hashes.join("\n");
    contents.push('\n');
    write_string(&source_dir.join(APPLIED_MARKER), &contents)
}

fn apply_single_patch(git: &Path, patch_path: &Path, source_dir: &Path) -> Result<()> {
    tracing::info!("Applying patch: {}", patch_path.display());

    // `git apply` works outside a repository, which is the case for
    // sources unpacked from an archive.
    ProcessBuilder::new(git)
        .args(["apply", "--check"])
        .arg(patch_path)
        .cwd(source_dir)
        .exec_and_check()
        .with_context(|| format!("patch '{}' does not apply cleanly", patch_path.display()))?;

    ProcessBuilder::new(git)
        .arg("apply")
        .arg(patch_path)
        .cwd(source_dir)
        .exec_and_check()
        .with_context(|| format!("failed to apply patch '{}'", patch_path.display()))?;

    Ok(())
}
