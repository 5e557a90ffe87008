use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of a package inside one build: `(name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageKey {
    pub name: String,
    pub version: String,
}

impl PackageKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A resolved package as handed over by the resolver.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    /// Install directory; license files are read relative to it.
    pub root_dir: PathBuf,
    /// `root_dir` relative to the project root with `/` separators, e.g.
    /// `node_modules/@scope/name`. Recorded in the manifest instead of the
    /// absolute path.
    pub install_path: String,
    /// Plain file names found in `root_dir`.
    pub root_listing: Vec<String>,
    pub declared_license: Option<String>,
    pub dependencies: Vec<PackageKey>,
}

impl PackageDescriptor {
    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.version)
    }
}

/// License metadata for one embedded package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    pub is_copyleft: bool,
    pub is_transitive_copyleft: bool,
}

impl PackageRecord {
    pub fn category(&self) -> LicenseCategory {
        if self.is_copyleft {
            LicenseCategory::Copyleft
        } else if self.is_transitive_copyleft {
            LicenseCategory::TransitiveCopyleft
        } else {
            LicenseCategory::Permissive
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub packages: Vec<PackageRecord>,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Grouping used by the notices document and the terminal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LicenseCategory {
    Copyleft,
    TransitiveCopyleft,
    Permissive,
}

impl LicenseCategory {
    pub const ALL: [LicenseCategory; 3] = [
        LicenseCategory::Copyleft,
        LicenseCategory::TransitiveCopyleft,
        LicenseCategory::Permissive,
    ];
}

impl std::fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseCategory::Copyleft => write!(f, "Copyleft"),
            LicenseCategory::TransitiveCopyleft => write!(f, "Transitive copyleft"),
            LicenseCategory::Permissive => write!(f, "Permissive"),
        }
    }
}

/// Risk level of a single license identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Proprietary,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A user-visible message produced by the engine for the host to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}
