use std::collections::{HashMap, VecDeque};

use crate::license::spdx::{classify_spdx_id, normalize};
use crate::models::{LicenseRisk, PackageDescriptor, PackageKey};

/// Classify a declared license string (SPDX id or expression) into a risk level.
///
/// - `OR` (and the `/` shorthand) takes the most permissive branch
/// - `AND` takes the most restrictive branch
/// - `WITH` exception clauses are dropped
/// - "proprietary" / "commercial" / `UNLICENSED` mark closed licenses
pub fn classify(license: &str) -> LicenseRisk {
    let trimmed = license.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        return LicenseRisk::Unknown;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("proprietary") || lower.contains("commercial") || lower == "unlicensed" {
        return LicenseRisk::Proprietary;
    }

    let expr = canonical_operators(
        &normalize(trimmed)
            .replace('/', " OR ")
            .replace(['(', ')'], " "),
    );

    if expr.contains(" OR ") {
        return most_permissive(expr.split(" OR ").map(classify_and));
    }

    classify_and(&expr)
}

/// Upper-case `or` / `and` / `with` tokens and collapse whitespace, so the
/// splits below see ` OR `, ` AND `, ` WITH ` whatever the input casing.
fn canonical_operators(expr: &str) -> String {
    expr.split_whitespace()
        .map(|token| match token.to_ascii_uppercase().as_str() {
            "OR" => "OR",
            "AND" => "AND",
            "WITH" => "WITH",
            _ => token,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn classify_and(expr: &str) -> LicenseRisk {
    if expr.contains(" AND ") {
        most_restrictive(expr.split(" AND ").map(classify_single))
    } else {
        classify_single(expr)
    }
}

fn classify_single(id: &str) -> LicenseRisk {
    let base = id.split(" WITH ").next().unwrap_or(id);
    classify_spdx_id(&normalize(base))
}

fn permissiveness(risk: &LicenseRisk) -> u8 {
    match risk {
        LicenseRisk::Permissive => 0,
        LicenseRisk::WeakCopyleft => 1,
        LicenseRisk::StrongCopyleft => 2,
        LicenseRisk::Proprietary => 3,
        LicenseRisk::Unknown => 4,
    }
}

fn most_permissive(risks: impl Iterator<Item = LicenseRisk>) -> LicenseRisk {
    risks
        .min_by_key(permissiveness)
        .unwrap_or(LicenseRisk::Unknown)
}

/// Unknown ranks below everything known: one recognized branch decides.
fn most_restrictive(risks: impl Iterator<Item = LicenseRisk>) -> LicenseRisk {
    risks
        .filter(|r| *r != LicenseRisk::Unknown)
        .max_by_key(permissiveness)
        .unwrap_or(LicenseRisk::Unknown)
}

/// Decide whether a declared license puts the package itself under copyleft terms.
///
/// Licenses that cannot be shown to be non-copyleft (missing, unrecognized,
/// proprietary) follow `treat_unknown_as_copyleft`.
pub fn is_copyleft(license: Option<&str>, treat_unknown_as_copyleft: bool) -> bool {
    match license.map(classify).unwrap_or(LicenseRisk::Unknown) {
        LicenseRisk::WeakCopyleft | LicenseRisk::StrongCopyleft => true,
        LicenseRisk::Permissive => false,
        LicenseRisk::Proprietary | LicenseRisk::Unknown => treat_unknown_as_copyleft,
    }
}

/// Copyleft flags computed for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_copyleft: bool,
    pub is_transitive_copyleft: bool,
}

/// Dependency graph over the resolved packages, stored as an arena indexed by
/// position with a `(name, version)` lookup table.
pub struct DependencyGraph {
    index: HashMap<PackageKey, usize>,
    copyleft: Vec<bool>,
    /// `dependents[i]` lists the nodes that have an edge to `i`.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph. Descriptors sharing a key are merged; edges to
    /// packages outside the set are ignored.
    pub fn build(descriptors: &[PackageDescriptor], treat_unknown_as_copyleft: bool) -> Self {
        let mut index = HashMap::new();
        let mut copyleft = Vec::new();

        for desc in descriptors {
            index.entry(desc.key()).or_insert_with(|| {
                copyleft.push(is_copyleft(
                    desc.declared_license.as_deref(),
                    treat_unknown_as_copyleft,
                ));
                copyleft.len() - 1
            });
        }

        let mut dependents = vec![Vec::new(); copyleft.len()];
        for desc in descriptors {
            let from = index[&desc.key()];
            for dep in &desc.dependencies {
                if let Some(&to) = index.get(dep) {
                    if !dependents[to].contains(&from) {
                        dependents[to].push(from);
                    }
                }
            }
        }

        Self {
            index,
            copyleft,
            dependents,
        }
    }

    /// Classify every node.
    ///
    /// Walks reverse edges breadth-first from each copyleft package, so every
    /// node is settled at most once and cycles end at the visited check. A node
    /// is marked when it reaches a copyleft package through at least one edge.
    pub fn classify(&self) -> HashMap<PackageKey, Classification> {
        let mut reaches_copyleft = vec![false; self.copyleft.len()];
        let mut queue: VecDeque<usize> = self
            .copyleft
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| i)
            .collect();

        while let Some(node) = queue.pop_front() {
            for &dependent in &self.dependents[node] {
                if !reaches_copyleft[dependent] {
                    reaches_copyleft[dependent] = true;
                    queue.push_back(dependent);
                }
            }
        }

        self.index
            .iter()
            .map(|(key, &i)| {
                let is_copyleft = self.copyleft[i];
                (
                    key.clone(),
                    Classification {
                        is_copyleft,
                        is_transitive_copyleft: !is_copyleft && reaches_copyleft[i],
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn desc(name: &str, license: Option<&str>, deps: &[&str]) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            root_dir: PathBuf::from(format!("node_modules/{name}")),
            install_path: format!("node_modules/{name}"),
            root_listing: Vec::new(),
            declared_license: license.map(str::to_string),
            dependencies: deps.iter().map(|d| PackageKey::new(*d, "1.0.0")).collect(),
        }
    }

    fn flags(result: &HashMap<PackageKey, Classification>, name: &str) -> (bool, bool) {
        let c = result[&PackageKey::new(name, "1.0.0")];
        (c.is_copyleft, c.is_transitive_copyleft)
    }

    #[test]
    fn test_or_expression() {
        assert_eq!(classify("MIT OR GPL-3.0"), LicenseRisk::Permissive);
        assert_eq!(classify("(MIT OR Apache-2.0)"), LicenseRisk::Permissive);
        assert_eq!(classify("GPL-3.0/LGPL-3.0"), LicenseRisk::WeakCopyleft);
    }

    #[test]
    fn test_and_expression() {
        assert_eq!(classify("MIT AND AGPL-3.0-only"), LicenseRisk::StrongCopyleft);
        assert_eq!(classify("MIT AND CUSTOM"), LicenseRisk::Permissive);
    }

    #[test]
    fn test_lowercase_operators() {
        assert_eq!(classify("MIT or Apache-2.0"), LicenseRisk::Permissive);
        assert_eq!(classify("MIT Or GPL-3.0"), LicenseRisk::Permissive);
        assert_eq!(classify("ISC and AGPL-3.0"), LicenseRisk::StrongCopyleft);
        assert_eq!(
            classify("GPL-2.0 with Classpath-exception-2.0"),
            LicenseRisk::StrongCopyleft
        );
        assert!(!is_copyleft(Some("MIT or Apache-2.0"), true));
    }

    #[test]
    fn test_with_exception() {
        assert_eq!(
            classify("GPL-2.0 WITH Classpath-exception-2.0"),
            LicenseRisk::StrongCopyleft
        );
    }

    #[test]
    fn test_closed_and_unknown() {
        assert_eq!(classify("UNLICENSED"), LicenseRisk::Proprietary);
        assert_eq!(classify("Commercial"), LicenseRisk::Proprietary);
        assert_eq!(classify(""), LicenseRisk::Unknown);
        assert_eq!(classify("SEE LICENSE IN EULA"), LicenseRisk::Unknown);
    }

    #[test]
    fn test_is_copyleft_policy() {
        assert!(is_copyleft(Some("AGPL-3.0"), false));
        assert!(is_copyleft(Some("MPL-2.0"), false));
        assert!(!is_copyleft(Some("MIT"), true));
        assert!(is_copyleft(None, true));
        assert!(!is_copyleft(None, false));
        assert!(is_copyleft(Some("WEIRD-1.0"), true));
    }

    #[test]
    fn test_direct_agpl_dependency() {
        let graph = DependencyGraph::build(
            &[
                desc("fake-package-apache-with-copyleft-dep", Some("Apache-2.0"), &["fake-package-agpl-license"]),
                desc("fake-package-agpl-license", Some("AGPL-3.0"), &[]),
            ],
            true,
        );
        let result = graph.classify();
        assert_eq!(flags(&result, "fake-package-apache-with-copyleft-dep"), (false, true));
        assert_eq!(flags(&result, "fake-package-agpl-license"), (true, false));
    }

    #[test]
    fn test_deep_transitive_chain() {
        let graph = DependencyGraph::build(
            &[
                desc("a", Some("MIT"), &["b"]),
                desc("b", Some("ISC"), &["c"]),
                desc("c", Some("BSD-3-Clause"), &["d"]),
                desc("d", Some("GPL-3.0"), &[]),
                desc("e", Some("MIT"), &[]),
            ],
            true,
        );
        let result = graph.classify();
        assert_eq!(flags(&result, "a"), (false, true));
        assert_eq!(flags(&result, "c"), (false, true));
        assert_eq!(flags(&result, "e"), (false, false));
    }

    #[test]
    fn test_cycle_terminates_and_propagates() {
        let graph = DependencyGraph::build(
            &[
                desc("a", Some("MIT"), &["b"]),
                desc("b", Some("MIT"), &["a", "x"]),
                desc("x", Some("AGPL-3.0"), &[]),
                desc("p", Some("MIT"), &["q"]),
                desc("q", Some("MIT"), &["p"]),
            ],
            true,
        );
        let result = graph.classify();
        assert_eq!(flags(&result, "a"), (false, true));
        assert_eq!(flags(&result, "b"), (false, true));
        assert_eq!(flags(&result, "p"), (false, false));
        assert_eq!(flags(&result, "q"), (false, false));
    }

    #[test]
    fn test_copyleft_package_is_never_transitive() {
        let graph = DependencyGraph::build(
            &[
                desc("g", Some("GPL-2.0"), &["h"]),
                desc("h", Some("LGPL-2.1"), &["g"]),
            ],
            true,
        );
        let result = graph.classify();
        assert_eq!(flags(&result, "g"), (true, false));
        assert_eq!(flags(&result, "h"), (true, false));
    }

    #[test]
    fn test_edges_outside_the_set_are_ignored() {
        let graph = DependencyGraph::build(&[desc("a", Some("MIT"), &["missing"])], true);
        assert_eq!(flags(&graph.classify(), "a"), (false, false));
    }

    #[test]
    fn test_unknown_dependency_follows_policy() {
        let pkgs = [desc("a", Some("MIT"), &["b"]), desc("b", None, &[])];
        let strict = DependencyGraph::build(&pkgs, true).classify();
        let lenient = DependencyGraph::build(&pkgs, false).classify();
        assert_eq!(flags(&strict, "a"), (false, true));
        assert_eq!(flags(&lenient, "a"), (false, false));
    }
}
