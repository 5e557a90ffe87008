use std::collections::HashSet;

use anyhow::Result;

use crate::models::{Manifest, PackageRecord};

/// Assemble the manifest: drop repeated `(name, version)` pairs (first one
/// wins) and order by name, then version.
///
/// `String`'s `Ord` is a byte comparison, so the order does not depend on locale.
pub fn build_manifest(records: impl IntoIterator<Item = PackageRecord>) -> Manifest {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut packages: Vec<PackageRecord> = records
        .into_iter()
        .filter(|r| seen.insert((r.name.clone(), r.version.clone())))
        .collect();

    packages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));

    Manifest { packages }
}

/// Serialize the manifest as pretty-printed JSON with a trailing newline.
pub fn to_json(manifest: &Manifest) -> Result<String> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, version: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: version.to_string(),
            license_id: Some("MIT".to_string()),
            license_file_path: None,
            license_text: None,
            copyright: None,
            is_copyleft: false,
            is_transitive_copyleft: false,
        }
    }

    #[test]
    fn test_sorted_by_name_then_version() {
        let manifest = build_manifest(vec![
            record("lodash", "4.17.21"),
            record("@scope/pkg", "1.0.0"),
            record("Zebra", "1.0.0"),
            record("lodash", "3.10.1"),
        ]);
        let order: Vec<_> = manifest
            .packages
            .iter()
            .map(|r| format!("{}@{}", r.name, r.version))
            .collect();
        assert_eq!(
            order,
            vec!["@scope/pkg@1.0.0", "Zebra@1.0.0", "lodash@3.10.1", "lodash@4.17.21"]
        );
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let mut first = record("react", "18.2.0");
        first.copyright = Some("Copyright (c) Meta Platforms, Inc.".to_string());
        let manifest = build_manifest(vec![first.clone(), record("react", "18.2.0")]);
        assert_eq!(manifest.packages, vec![first]);
    }

    #[test]
    fn test_json_shape() {
        let manifest = build_manifest(vec![record("a", "1.0.0")]);
        let json = to_json(&manifest).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let pkg = &value["packages"][0];
        assert_eq!(pkg["licenseId"], "MIT");
        assert_eq!(pkg["isCopyleft"], false);
        assert_eq!(pkg["isTransitiveCopyleft"], false);
        assert!(pkg.get("copyright").is_none());
        assert!(pkg.get("licenseFilePath").is_none());
    }

    #[test]
    fn test_input_order_does_not_change_output() {
        let a = to_json(&build_manifest(vec![record("b", "1.0.0"), record("a", "1.0.0")])).unwrap();
        let b = to_json(&build_manifest(vec![record("a", "1.0.0"), record("b", "1.0.0")])).unwrap();
        assert_eq!(a, b);
    }
}
