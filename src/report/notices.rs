use std::fmt::Write;

use crate::models::{Diagnostic, LicenseCategory, Manifest, PackageRecord};

pub const NOTICES_FILE_NAME: &str = "THIRD-PARTY-NOTICES.html";

/// Prefix carried by every diagnostic this tool emits.
pub const DIAGNOSTIC_TAG: &str = "[embedded-dependencies-webpack-plugin]";

/// Render the third-party notices document.
///
/// An empty manifest produces no document; a single warning is pushed onto
/// `diagnostics` instead.
pub fn render(manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    if manifest.is_empty() {
        diagnostics.push(Diagnostic::warning(format!(
            "{DIAGNOSTIC_TAG} No third party dependencies were found. Skipping license file generation."
        )));
        return None;
    }

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Third-Party Notices</title>\n");
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em}pre{white-space:pre-wrap;\
         background:#f6f8fa;padding:1em}.copyright{font-style:italic}</style>\n",
    );
    html.push_str("</head>\n<body>\n<h1>Third-Party Notices</h1>\n");

    for category in LicenseCategory::ALL {
        let group: Vec<&PackageRecord> = manifest
            .packages
            .iter()
            .filter(|r| r.category() == category)
            .collect();
        if group.is_empty() {
            continue;
        }

        // Writing to a String cannot fail
        let _ = writeln!(html, "<section>\n<h2>{} ({})</h2>", category, group.len());
        for record in group {
            render_entry(&mut html, record);
        }
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    Some(html)
}

fn render_entry(html: &mut String, record: &PackageRecord) {
    let _ = writeln!(
        html,
        "<article>\n<h3>{} {}</h3>",
        escape(&record.name),
        escape(&record.version)
    );
    if let Some(license) = &record.license_id {
        let _ = writeln!(html, "<p class=\"license\">License: {}</p>", escape(license));
    }
    if let Some(copyright) = &record.copyright {
        let _ = writeln!(html, "<p class=\"copyright\">{}</p>", escape(copyright));
    }
    if let Some(text) = &record.license_text {
        let _ = writeln!(html, "<pre>{}</pre>", escape(text));
    }
    html.push_str("</article>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn record(name: &str, copyleft: bool, transitive: bool) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            license_id: Some("MIT".to_string()),
            license_file_path: Some(format!("node_modules/{name}/LICENSE")),
            license_text: Some("Copyright (C) 2007 Free Software Foundation, Inc. <https://fsf.org/>".to_string()),
            copyright: Some("Copyright (C) 2007 Free Software Foundation, Inc. <https://fsf.org/>".to_string()),
            is_copyleft: copyleft,
            is_transitive_copyleft: transitive,
        }
    }

    #[test]
    fn test_empty_manifest_warns_once() {
        let mut diagnostics = Vec::new();
        let doc = render(&Manifest::default(), &mut diagnostics);

        assert!(doc.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("[embedded-dependencies-webpack-plugin]"));
        assert!(diagnostics[0].message.contains("No third party dependencies were found"));
    }

    #[test]
    fn test_groups_in_category_order() {
        let manifest = Manifest {
            packages: vec![
                record("permissive-pkg", false, false),
                record("agpl-pkg", true, false),
                record("apache-pkg", false, true),
            ],
        };
        let mut diagnostics = Vec::new();
        let doc = render(&manifest, &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty());
        let copyleft = doc.find("<h2>Copyleft (1)</h2>").unwrap();
        let transitive = doc.find("<h2>Transitive copyleft (1)</h2>").unwrap();
        let permissive = doc.find("<h2>Permissive (1)</h2>").unwrap();
        assert!(copyleft < transitive && transitive < permissive);
        assert!(doc.find("agpl-pkg").unwrap() < doc.find("apache-pkg").unwrap());
    }

    #[test]
    fn test_escapes_license_text() {
        let manifest = Manifest {
            packages: vec![record("gpl", true, false)],
        };
        let doc = render(&manifest, &mut Vec::new()).unwrap();
        assert!(doc.contains("Inc. &lt;https://fsf.org/&gt;"));
        assert!(!doc.contains("<https://fsf.org/>"));
        assert!(!doc.contains("<h2>Permissive"));
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let mut bare = record("bare", false, false);
        bare.copyright = None;
        bare.license_text = None;
        let doc = render(&Manifest { packages: vec![bare] }, &mut Vec::new()).unwrap();
        assert!(doc.contains("<h3>bare 1.0.0</h3>"));
        assert!(!doc.contains("<pre>"));
        assert!(!doc.contains("class=\"copyright\""));
    }
}
