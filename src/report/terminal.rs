use std::collections::HashMap;
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{LicenseCategory, Manifest, PackageRecord};

/// Render a colored terminal summary of the manifest.
pub fn render(manifest: &Manifest, path: &Path, written: &[&Path], verbose: bool, quiet: bool) {
    let records = &manifest.packages;
    let count = |category: LicenseCategory| records.iter().filter(|r| r.category() == category).count();
    let copyleft = count(LicenseCategory::Copyleft);
    let transitive = count(LicenseCategory::TransitiveCopyleft);
    let permissive = count(LicenseCategory::Permissive);
    let without_copyright = records.iter().filter(|r| r.copyright.is_none()).count();

    if quiet {
        println!(
            "Total: {}  Permissive: {}  Transitive: {}  Copyleft: {}",
            records.len(),
            permissive.to_string().green(),
            transitive.to_string().yellow(),
            copyleft.to_string().red(),
        );
        return;
    }

    println!(
        "\n {} v{}",
        "embedded-deps".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", path.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Embedded packages  : {}", records.len()));
    println!(
        " │  {:<48} │",
        format!("{}  Permissive      : {:>4}  {}", "✓".green(), permissive, top_licenses(records, LicenseCategory::Permissive))
    );
    println!(
        " │  {:<48} │",
        format!("{}  Transitive      : {:>4}", "⚠".yellow(), transitive)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Copyleft        : {:>4}  {}", "✗".red(), copyleft, top_licenses(records, LicenseCategory::Copyleft))
    );
    println!(
        " │  {:<48} │",
        format!("   No copyright    : {:>4}", without_copyright)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if copyleft > 0 {
        println!(" {} Copyleft packages:\n", "[COPYLEFT]".red().bold());
        render_table(records, LicenseCategory::Copyleft);
        println!();
    }

    if transitive > 0 {
        println!(" {} Packages depending on copyleft code:\n", "[TRANSITIVE]".yellow().bold());
        render_table(records, LicenseCategory::TransitiveCopyleft);
        println!();
    }

    if verbose && permissive > 0 {
        println!(" {} Permissive packages:\n", "[PERMISSIVE]".green().bold());
        render_table(records, LicenseCategory::Permissive);
        println!();
    }

    for file in written {
        println!(" {} {}", "wrote".cyan(), file.display());
    }
}

fn render_table(records: &[PackageRecord], category: LicenseCategory) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("License file").add_attribute(Attribute::Bold),
            Cell::new("Copyright").add_attribute(Attribute::Bold),
        ]);

    let color = match category {
        LicenseCategory::Copyleft => Color::Red,
        LicenseCategory::TransitiveCopyleft => Color::Yellow,
        LicenseCategory::Permissive => Color::Green,
    };

    for record in records.iter().filter(|r| r.category() == category) {
        let license_file = record
            .license_file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("-");

        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.version),
            Cell::new(record.license_id.as_deref().unwrap_or("unknown")).fg(color),
            Cell::new(license_file),
            Cell::new(record.copyright.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}

/// The three most frequent declared licenses within a category, e.g. `[MIT (12), ISC (3)]`.
fn top_licenses(records: &[PackageRecord], category: LicenseCategory) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.category() == category) {
        let license = record.license_id.as_deref().unwrap_or("unknown");
        *counts.entry(license).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(license, n)| format!("{} ({})", license, n))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
