use crate::models::LicenseRisk;

const PERMISSIVE: &[&str] = &[
    "MIT",
    "MIT-0",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "BSD-4-Clause",
    "0BSD",
    "ISC",
    "Unlicense",
    "Zlib",
    "CC0-1.0",
    "CC-BY-3.0",
    "CC-BY-4.0",
    "WTFPL",
    "PSF-2.0",
    "Python-2.0",
    "BlueOak-1.0.0",
    "Artistic-2.0",
];

const WEAK_COPYLEFT: &[&str] = &[
    "LGPL-2.0",
    "LGPL-2.1",
    "LGPL-3.0",
    "MPL-1.1",
    "MPL-2.0",
    "EPL-1.0",
    "EPL-2.0",
    "EUPL-1.2",
    "CDDL-1.0",
    "CDDL-1.1",
    "APSL-2.0",
    "OSL-3.0",
    "CC-BY-SA-3.0",
    "CC-BY-SA-4.0",
];

const STRONG_COPYLEFT: &[&str] = &[
    "GPL-2.0",
    "GPL-3.0",
    "AGPL-1.0",
    "AGPL-3.0",
    "EUPL-1.1",
    "SSPL-1.0",
];

/// Common non-SPDX spellings found in package metadata.
const ALIASES: &[(&str, &str)] = &[
    ("Apache 2.0", "Apache-2.0"),
    ("Apache License 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("MIT License", "MIT"),
    ("The MIT License", "MIT"),
    ("BSD", "BSD-3-Clause"),
    ("BSD License", "BSD-3-Clause"),
    ("New BSD", "BSD-3-Clause"),
    ("Simplified BSD", "BSD-2-Clause"),
    ("ISC License", "ISC"),
    ("Public Domain", "CC0-1.0"),
    ("GPLv2", "GPL-2.0"),
    ("GPL v2", "GPL-2.0"),
    ("GPLv3", "GPL-3.0"),
    ("GPL v3", "GPL-3.0"),
    ("GNU GPL v3", "GPL-3.0"),
    ("LGPLv2.1", "LGPL-2.1"),
    ("LGPLv3", "LGPL-3.0"),
    ("MPL 2.0", "MPL-2.0"),
    ("AGPLv3", "AGPL-3.0"),
    ("AGPL v3", "AGPL-3.0"),
    ("GNU AGPL v3", "AGPL-3.0"),
];

/// Map a single canonical SPDX identifier to its risk level.
///
/// `-only` / `-or-later` suffixes and the deprecated `+` suffix do not change
/// the family, so they are stripped before lookup.
pub fn classify_spdx_id(id: &str) -> LicenseRisk {
    let id = id.trim();
    let base = id
        .strip_suffix("-only")
        .or_else(|| id.strip_suffix("-or-later"))
        .or_else(|| id.strip_suffix('+'))
        .unwrap_or(id);

    if PERMISSIVE.contains(&base) {
        LicenseRisk::Permissive
    } else if WEAK_COPYLEFT.contains(&base) {
        LicenseRisk::WeakCopyleft
    } else if STRONG_COPYLEFT.contains(&base) {
        LicenseRisk::StrongCopyleft
    } else {
        LicenseRisk::Unknown
    }
}

/// Rewrite a known alias to its SPDX identifier; anything else is returned trimmed.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, spdx)| spdx.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
