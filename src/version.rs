//! Version and build information
//!
//! Build-time details embedded by `build.rs`, plus the artifact schema this
//! binary reads.

use std::fmt;

use serde::Serialize;

use crate::artifacts::SCHEMA_VERSION;
use crate::features::FEATURE_NAMES;

/// Build information embedded at compile time
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    #[serde(skip)]
    git_dirty_str: &'static str,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
    pub host: &'static str,
    /// Artifact schema version accepted at load time
    pub artifact_schema: u32,
    /// Number of features every artifact must be fitted on
    pub feature_count: usize,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("FINMENTOR_GIT_HASH"),
            git_branch: env!("FINMENTOR_GIT_BRANCH"),
            git_dirty_str: env!("FINMENTOR_GIT_DIRTY"),
            build_timestamp: env!("FINMENTOR_BUILD_TIMESTAMP"),
            target: env!("FINMENTOR_TARGET"),
            profile: env!("FINMENTOR_PROFILE"),
            rustc_version: env!("FINMENTOR_RUSTC_VERSION"),
            host: env!("FINMENTOR_HOST"),
            artifact_schema: SCHEMA_VERSION,
            feature_count: FEATURE_NAMES.len(),
        }
    }

    pub fn git_dirty(&self) -> bool {
        self.git_dirty_str == "true"
    }

    /// e.g. "0.1.0-abc1234" or "0.1.0-abc1234-dirty"
    pub fn full_version(&self) -> String {
        if self.git_dirty() {
            format!("{}-{}-dirty", self.version, self.git_hash)
        } else {
            format!("{}-{}", self.version, self.git_hash)
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Version:    {}", self.version)?;
        writeln!(f, "  Git Hash:   {}{}", self.git_hash, if self.git_dirty() { " (dirty)" } else { "" })?;
        writeln!(f, "  Git Branch: {}", self.git_branch)?;
        writeln!(f, "  Built:      {}", self.build_timestamp)?;
        writeln!(f, "  Profile:    {}", self.profile)?;
        writeln!(f, "  Target:     {} (host {})", self.target, self.host)?;
        writeln!(f, "  Compiler:   {}", self.rustc_version)?;
        writeln!(f)?;
        writeln!(f, "Artifacts:")?;
        writeln!(f, "  Schema:     v{}", self.artifact_schema)?;
        writeln!(f, "  Features:   {}", self.feature_count)?;
        Ok(())
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version_format() {
        let info = build_info();
        let full = info.full_version();
        assert!(full.starts_with(info.version));
        assert!(full.contains(info.git_hash));
    }

    #[test]
    fn test_display_includes_artifact_schema() {
        let display = build_info().to_string();
        assert!(display.contains("Git Hash:"));
        assert!(display.contains("Schema:     v1"));
        assert!(display.contains("Features:   10"));
    }

    #[test]
    fn test_json() {
        let json = serde_json::to_value(build_info()).unwrap();
        assert_eq!(json["name"], "finmentor-engine");
        assert_eq!(json["artifact_schema"], 1);
        assert!(json.get("git_dirty_str").is_none());
    }
}
