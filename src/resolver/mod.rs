//! Package resolvers: turn an installed project into [`PackageDescriptor`]s.
//!
//! Only npm layouts are supported ([`node`]); the engine itself is agnostic of
//! where descriptors come from.

use std::path::Path;

use anyhow::Result;

use crate::models::PackageDescriptor;

pub mod node;

pub trait Resolver {
    fn resolve(&self, path: &Path) -> Result<Vec<PackageDescriptor>>;
}

/// Per-package metadata failures. The affected package is left out of the
/// manifest; resolution of the others continues.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to read package metadata {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed package metadata {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("package {package} has no valid `version`")]
    MissingVersion { package: String },
}

/// Plain file names at the root of a package directory, sorted.
///
/// An unreadable directory yields an empty listing, which later leaves the
/// package without a license file.
pub fn list_root_files(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "package directory not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_root_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        std::fs::create_dir(dir.path().join("LICENSES")).unwrap();

        assert_eq!(list_root_files(dir.path()), vec!["LICENSE", "package.json"]);
    }

    #[test]
    fn test_list_root_files_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_root_files(&dir.path().join("absent")).is_empty());
    }
}
