use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::{list_root_files, ResolveError};
use crate::models::{PackageDescriptor, PackageKey};

/// Edge sources read from each package entry / manifest.
const DEPENDENCY_FIELDS: [&str; 3] = ["dependencies", "optionalDependencies", "peerDependencies"];

pub struct NodeResolver {
    include_dev: bool,
}

impl NodeResolver {
    pub fn new(include_dev: bool) -> Self {
        Self { include_dev }
    }
}

impl super::Resolver for NodeResolver {
    fn resolve(&self, path: &Path) -> Result<Vec<PackageDescriptor>> {
        // package-lock.json v2/v3 (the `packages` map) is authoritative
        let lock = path.join("package-lock.json");
        if lock.exists() {
            match read_lockfile(&lock) {
                Ok(json) => {
                    if let Some(packages) = json.get("packages").and_then(Value::as_object) {
                        return Ok(parse_lock_packages(packages, path, self.include_dev));
                    }
                    tracing::warn!(
                        lockfile = %lock.display(),
                        "lockfile has no `packages` map (lockfileVersion 1?), falling back to node_modules"
                    );
                }
                Err(e) => tracing::warn!(
                    lockfile = %lock.display(),
                    error = %e,
                    "unusable lockfile, falling back to node_modules"
                ),
            }
        }

        let node_modules = path.join("node_modules");
        if node_modules.is_dir() {
            return Ok(walk_node_modules(&node_modules));
        }

        Ok(Vec::new())
    }
}

fn read_lockfile(lock: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(lock)
        .with_context(|| format!("Failed to read {}", lock.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", lock.display()))
}

/// Installed third-party entries live under a `node_modules/` segment; other
/// keys (`packages/my-lib`) are the project's own workspace sources.
fn is_installed_path(pkg_path: &str) -> bool {
    pkg_path.starts_with("node_modules/") || pkg_path.contains("/node_modules/")
}

/// Build descriptors from the `packages` map of a v2/v3 lockfile.
fn parse_lock_packages(
    packages: &Map<String, Value>,
    project_root: &Path,
    include_dev: bool,
) -> Vec<PackageDescriptor> {
    let mut descriptors = Vec::new();

    for (pkg_path, info) in packages {
        // Root entry and workspace sources are first-party; links point at them
        if !is_installed_path(pkg_path) || flag(info, "link") {
            continue;
        }
        if !include_dev && flag(info, "dev") {
            continue;
        }
        // Platform-specific optionals (`@esbuild/darwin-arm64` on Linux) are
        // listed but never installed
        if flag(info, "optional") && !project_root.join(pkg_path).is_dir() {
            tracing::debug!(entry = %pkg_path, "optional package not installed");
            continue;
        }

        match lock_entry(pkg_path, info, packages, project_root) {
            Ok(desc) => descriptors.push(desc),
            Err(e) => tracing::warn!(entry = %pkg_path, error = %e, "skipping package"),
        }
    }

    descriptors
}

fn lock_entry(
    pkg_path: &str,
    info: &Value,
    packages: &Map<String, Value>,
    project_root: &Path,
) -> Result<PackageDescriptor, ResolveError> {
    let name = entry_name(pkg_path, info);
    let version = entry_version(info).ok_or_else(|| ResolveError::MissingVersion {
        package: name.clone(),
    })?;

    let root_dir = project_root.join(pkg_path);

    // License may be present in the lock entry; otherwise ask the installed manifest
    let declared_license = license_field(info).or_else(|| {
        read_package_json(&root_dir.join("package.json"))
            .ok()
            .and_then(|manifest| license_field(&manifest))
    });

    let dependencies = dependency_names(info)
        .filter_map(|dep| {
            let installed = resolve_installed(packages, pkg_path, dep)?;
            let dep_info = &packages[&installed];
            Some(PackageKey::new(
                entry_name(&installed, dep_info),
                entry_version(dep_info)?,
            ))
        })
        .collect();

    Ok(PackageDescriptor {
        name,
        version,
        root_listing: list_root_files(&root_dir),
        root_dir,
        install_path: pkg_path.to_string(),
        declared_license,
        dependencies,
    })
}

/// Package name from the lock path: `node_modules/a/node_modules/@s/b` → `@s/b`.
/// An explicit `name` field (aliased installs) wins.
fn entry_name(pkg_path: &str, info: &Value) -> String {
    if let Some(name) = info.get("name").and_then(Value::as_str) {
        return name.to_string();
    }
    match pkg_path.rfind("node_modules/") {
        Some(idx) => pkg_path[idx + "node_modules/".len()..].to_string(),
        None => pkg_path.to_string(),
    }
}

fn entry_version(info: &Value) -> Option<String> {
    info.get("version")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn flag(info: &Value, key: &str) -> bool {
    info.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn dependency_names(info: &Value) -> impl Iterator<Item = &str> {
    DEPENDENCY_FIELDS
        .into_iter()
        .filter_map(move |field| info.get(field).and_then(Value::as_object))
        .flat_map(|deps| deps.keys().map(String::as_str))
}

/// Node's lookup rule over lock paths: try `<from>/node_modules/<dep>`, then
/// the same under each enclosing package, ending at the project root.
fn resolve_installed(packages: &Map<String, Value>, from: &str, dep: &str) -> Option<String> {
    let mut base = from.to_string();
    loop {
        let candidate = if base.is_empty() {
            format!("node_modules/{dep}")
        } else {
            format!("{base}/node_modules/{dep}")
        };
        if packages.contains_key(&candidate) {
            return Some(candidate);
        }
        if base.is_empty() {
            return None;
        }
        base = match base.rfind("node_modules/") {
            Some(idx) => base[..idx].trim_end_matches('/').to_string(),
            None => String::new(),
        };
    }
}

/// Declared license from package metadata: `license` as a string or
/// `{ "type": ... }`, or the legacy `licenses` array.
fn license_field(manifest: &Value) -> Option<String> {
    let typed = |v: &Value| -> Option<String> {
        v.as_str()
            .or_else(|| v.get("type").and_then(Value::as_str))
            .map(str::to_string)
    };

    if let Some(license) = manifest.get("license").and_then(typed) {
        return Some(license);
    }

    let licenses: Vec<String> = manifest
        .get("licenses")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(typed)
        .collect();

    match licenses.len() {
        0 => None,
        1 => licenses.into_iter().next(),
        _ => Some(format!("({})", licenses.join(" OR "))),
    }
}

fn read_package_json(path: &Path) -> Result<Value, ResolveError> {
    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ResolveError::Json {
        path: path.display().to_string(),
        source,
    })
}

struct InstalledPackage {
    dir: PathBuf,
    manifest: Value,
    key: PackageKey,
}

/// Resolve packages by walking `node_modules` when no usable lockfile exists.
fn walk_node_modules(node_modules: &Path) -> Vec<PackageDescriptor> {
    let project_root = node_modules.parent().unwrap_or(node_modules);
    let mut installed = Vec::new();
    collect_installed(node_modules, &mut installed);

    let by_dir: HashMap<&Path, &PackageKey> = installed
        .iter()
        .map(|pkg| (pkg.dir.as_path(), &pkg.key))
        .collect();

    installed
        .iter()
        .map(|pkg| {
            let dependencies = dependency_names(&pkg.manifest)
                .filter_map(|dep| {
                    pkg.dir.ancestors().find_map(|ancestor| {
                        let candidate = ancestor.join("node_modules").join(dep);
                        by_dir.get(candidate.as_path()).map(|key| (*key).clone())
                    })
                })
                .collect();

            PackageDescriptor {
                name: pkg.key.name.clone(),
                version: pkg.key.version.clone(),
                root_dir: pkg.dir.clone(),
                install_path: relative_path(project_root, &pkg.dir),
                root_listing: list_root_files(&pkg.dir),
                declared_license: license_field(&pkg.manifest),
                dependencies,
            }
        })
        .collect()
}

fn relative_path(base: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(base).unwrap_or(dir);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn collect_installed(node_modules: &Path, out: &mut Vec<InstalledPackage>) {
    let entries = match std::fs::read_dir(node_modules) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %node_modules.display(), error = %e, "failed to read node_modules");
            return;
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let Some(file_name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // .bin, .cache, ...
        if file_name.starts_with('.') {
            continue;
        }
        if file_name.starts_with('@') {
            // scope directory: packages live one level down
            collect_installed(&dir, out);
            continue;
        }

        match installed_package(&dir) {
            Ok(pkg) => out.push(pkg),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "skipping package"),
        }

        let nested = dir.join("node_modules");
        if nested.is_dir() {
            collect_installed(&nested, out);
        }
    }
}

fn installed_package(dir: &Path) -> Result<InstalledPackage, ResolveError> {
    let manifest = read_package_json(&dir.join("package.json"))?;
    let name = manifest
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| dir.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .unwrap_or_default();
    let version = entry_version(&manifest).ok_or_else(|| ResolveError::MissingVersion {
        package: name.clone(),
    })?;

    Ok(InstalledPackage {
        dir: dir.to_path_buf(),
        key: PackageKey::new(name, version),
        manifest,
    })
}
