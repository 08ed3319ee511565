//! Source acquisition: the pinned glslang archive and its patches.

pub mod archive;
pub mod patch;

use url::Url;

pub use archive::{extract_tarball, fetch_archive};
pub use patch::{apply_patches, Patch};

/// Upstream repository of the packaged library.
pub const UPSTREAM_URL: &str = "https://github.com/KhronosGroup/glslang";

/// Source revision used when none is configured.
pub const DEFAULT_REVISION: &str = "11.7.0";

/// A pinned source archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Archive download URL
    pub url: Url,
    /// Tag or commit the archive was cut from
    pub rev: String,
    /// Expected SHA256 of the archive, if pinned
    pub sha256: Option<String>,
}

impl SourceSpec {
    /// GitHub archive of `rev` from the upstream repository.
    pub fn github(rev: &str) -> anyhow::Result<Self> {
        Self::from_template(&format!("{}/archive/{{rev}}.tar.gz", UPSTREAM_URL), rev, None)
    }

    /// Build a spec from a URL template containing `{rev}`.
    pub fn from_template(template: &str, rev: &str, sha256: Option<String>) -> anyhow::Result<Self> {
        let raw = template.replace("{rev}", rev);
        let url = Url::parse(&raw).map_err(|e| anyhow::anyhow!("invalid source url `{}`: {}", raw, e))?;
        Ok(SourceSpec {
            url,
            rev: rev.to_string(),
            sha256,
        })
    }

    /// Top-level directory inside GitHub archives.
    pub fn strip_prefix(&self) -> String {
        format!("glslang-{}", self.rev.trim_start_matches('v'))
    }
}
