//! Engine entry point: descriptors in, manifest / notices / diagnostics out.
//!
//! Each package goes through locate → read → extract independently; the
//! classifier runs once over the whole dependency graph; the manifest is
//! assembled at the end by a single writer.

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::future::{join_all, BoxFuture};
use indicatif::ProgressBar;

use crate::config::Config;
use crate::license::classifier::DependencyGraph;
use crate::license::copyright::extract_copyright;
use crate::license::locator::select_license_file;
use crate::manifest::{build_manifest, to_json};
use crate::models::{Diagnostic, Manifest, PackageDescriptor, PackageRecord};
use crate::report::notices;

/// Number of license files read concurrently.
pub const READ_BATCH_SIZE: usize = 32;

/// Source of license file contents.
pub trait LicenseReader: Sync {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, std::io::Result<String>>;
}

/// Reads license files from disk on the tokio runtime.
///
/// Only I/O failures are errors; non-UTF-8 contents are decoded by
/// [`decode_license_text`].
pub struct FsReader;

impl LicenseReader for FsReader {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, std::io::Result<String>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(path).await?;
            Ok(decode_license_text(bytes))
        })
    }
}

/// UTF-8 when valid, otherwise Latin-1, the usual encoding of older license
/// files (`\xa9` is `©`). Every byte sequence decodes.
pub fn decode_license_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect())
}

/// Everything one run hands back to the host.
#[derive(Debug)]
pub struct BuildOutput {
    pub manifest: Manifest,
    /// Serialized manifest, to be written as `Config::output_file_name`.
    pub manifest_json: String,
    /// `THIRD-PARTY-NOTICES.html` contents, when requested and non-empty.
    pub notices: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

struct LocatedLicense {
    /// Project-relative path recorded in the manifest.
    recorded_path: String,
    text: String,
}

/// Run the engine over resolved packages.
pub async fn run<R: LicenseReader>(
    descriptors: &[PackageDescriptor],
    reader: &R,
    config: &Config,
    progress: Option<&ProgressBar>,
) -> Result<BuildOutput> {
    let located = read_licenses(descriptors, reader, progress).await;
    let classes = DependencyGraph::build(descriptors, config.treat_unknown_as_copyleft).classify();

    let records = descriptors.iter().zip(located).map(|(desc, license)| {
        let class = classes.get(&desc.key()).copied().unwrap_or_default();
        let (license_file_path, license_text) = match license {
            Some(LocatedLicense { recorded_path, text }) => (Some(recorded_path), Some(text)),
            None => (None, None),
        };
        PackageRecord {
            name: desc.name.clone(),
            version: desc.version.clone(),
            license_id: desc.declared_license.clone(),
            copyright: license_text.as_deref().and_then(extract_copyright),
            license_file_path,
            license_text,
            is_copyleft: class.is_copyleft,
            is_transitive_copyleft: class.is_transitive_copyleft,
        }
    });

    let manifest = build_manifest(records);
    let manifest_json = to_json(&manifest)?;

    let mut diagnostics = Vec::new();
    let notices = if config.generate_license_file {
        notices::render(&manifest, &mut diagnostics)
    } else {
        None
    };

    tracing::debug!(
        packages = manifest.packages.len(),
        notices = notices.is_some(),
        "manifest built"
    );

    Ok(BuildOutput {
        manifest,
        manifest_json,
        notices,
        diagnostics,
    })
}

/// Locate and read each package's license file, `READ_BATCH_SIZE` at a time.
///
/// Returns one entry per descriptor, in order. A failed read keeps neither
/// path nor text for that package.
async fn read_licenses<R: LicenseReader>(
    descriptors: &[PackageDescriptor],
    reader: &R,
    progress: Option<&ProgressBar>,
) -> Vec<Option<LocatedLicense>> {
    let paths: Vec<Option<(PathBuf, String)>> = descriptors
        .iter()
        .map(|desc| {
            select_license_file(&desc.root_listing)
                .map(|file| (desc.root_dir.join(file), recorded_path(&desc.install_path, file)))
        })
        .collect();

    let mut located = Vec::with_capacity(paths.len());
    for (batch, descs) in paths.chunks(READ_BATCH_SIZE).zip(descriptors.chunks(READ_BATCH_SIZE)) {
        let reads = batch.iter().map(|path| async move {
            match path {
                Some((path, recorded)) => Some((path, recorded, reader.read(path).await)),
                None => None,
            }
        });

        for (result, desc) in join_all(reads).await.into_iter().zip(descs) {
            located.push(match result {
                Some((_, recorded, Ok(text))) => Some(LocatedLicense {
                    recorded_path: recorded.clone(),
                    text,
                }),
                Some((path, _, Err(e))) => {
                    tracing::warn!(
                        package = %desc.key(),
                        path = %path.display(),
                        error = %e,
                        "license file unreadable"
                    );
                    None
                }
                None => {
                    tracing::debug!(package = %desc.key(), "no license file");
                    None
                }
            });
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    located
}

fn recorded_path(install_path: &str, file: &str) -> String {
    if install_path.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", install_path.trim_end_matches('/'), file)
    }
}
