//! Download and unpack the source archive.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::sources::SourceSpec;
use crate::util::fs::{ensure_dir, read_to_string, remove_dir_all_if_exists, write_string};
use crate::util::hash::{sha256_bytes, verify_sha256};

/// File recording which revision a source directory holds.
pub(crate) const REVISION_MARKER: &str = ".glslang-recipe-rev";

/// Fetch `spec` into `dest`, reusing an existing checkout of the same
/// revision. Returns the source directory.
pub fn fetch_archive(spec: &SourceSpec, dest: &Path) -> Result<PathBuf> {
    let marker = dest.join(REVISION_MARKER);
    if marker.exists() && read_to_string(&marker)?.trim() == spec.rev {
        tracing::info!("Reusing source for {} in {}", spec.rev, dest.display());
        return Ok(dest.to_path_buf());
    }

    tracing::info!("Fetching {}", spec.url);
    let bytes = download(spec)?;

    // Unpack next to the destination, then swap it in, so an interrupted
    // extraction never leaves a half-populated source tree behind.
    let parent = dest
        .parent()
        .with_context(|| format!("invalid source directory: {}", dest.display()))?;
    ensure_dir(parent)?;
    let staging = tempfile::Builder::new()
        .prefix(".glslang-src-")
        .tempdir_in(parent)
        .context("failed to create staging directory")?;

    extract_tarball(&bytes, staging.path(), Some(&spec.strip_prefix()))
        .with_context(|| format!("failed to extract {}", spec.url))?;
    write_string(&staging.path().join(REVISION_MARKER), &spec.rev)?;

    remove_dir_all_if_exists(dest)?;
    let staged = staging.keep();
    std::fs::rename(&staged, dest).with_context(|| {
        format!("failed to move {} to {}", staged.display(), dest.display())
    })?;

    tracing::info!("Extracted {} to {}", spec.rev, dest.display());
    Ok(dest.to_path_buf())
}

fn download(spec: &SourceSpec) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(spec.url.clone())
        .with_context(|| format!("failed to download {}", spec.url))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", spec.url, response.status());
    }

    let bytes = response
        .bytes()
        .context("failed to read archive response body")?
        .to_vec();

    let actual = sha256_bytes(&bytes);
    match spec.sha256 {
        Some(ref expected) => {
            verify_sha256(spec.url.as_str(), &actual, expected)?;
            tracing::debug!("archive hash verified: {}", &actual[..16]);
        }
        None => tracing::debug!("archive sha256 (unpinned): {}", actual),
    }

    Ok(bytes)
}

/// Extract a gzipped tarball into `dest`.
///
/// When `strip_prefix` is given, the leading directory of that name is
/// removed from every entry. Entries that would land outside `dest` are
/// rejected.
pub fn extract_tarball(data: &[u8], dest: &Path, strip_prefix: Option<&str>) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    ensure_dir(dest)?;

    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let path = entry.path().context("failed to read entry path")?.into_owned();

        let relative = match strip_prefix {
            Some(prefix) => match path.strip_prefix(prefix.trim_end_matches('/')) {
                Ok(rest) => rest.to_path_buf(),
                Err(_) => path.clone(),
            },
            None => path.clone(),
        };

        if relative.as_os_str().is_empty() {
            continue;
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!("tarball entry escapes destination directory: {}", path.display());
        }

        let output_path = dest.join(&relative);
        if let Some(parent) = output_path.parent() {
            ensure_dir(parent)?;
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            ensure_dir(&output_path)?;
        } else if entry_type.is_file() || entry_type.is_symlink() || entry_type.is_hard_link() {
            entry
                .unpack(&output_path)
                .with_context(|| format!("failed to extract {}", output_path.display()))?;
        } else {
            tracing::debug!("skipping {:?} entry: {}", entry_type, path.display());
        }
    }

    Ok(())
}
