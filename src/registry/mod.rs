//! Registry lookups for packages whose installed metadata declares no license.
//!
//! Lookups are best-effort: network failures and missing versions leave the
//! declared license unset, which the classifier then treats as unknown.

use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use crate::models::PackageDescriptor;

pub mod npm;

const BATCH_SIZE: usize = 75;

/// Fill in `declared_license` from the npm registry where it is missing.
pub async fn enrich_declared_licenses(descriptors: &mut [PackageDescriptor], quiet: bool) -> Result<()> {
    let mut missing: Vec<&mut PackageDescriptor> = descriptors
        .iter_mut()
        .filter(|d| d.declared_license.is_none())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let pb = if !quiet {
        let pb = ProgressBar::new(missing.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} registry [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for batch in missing.chunks_mut(BATCH_SIZE) {
        let lookups = batch
            .iter()
            .map(|d| npm::fetch_license(&client, npm::REGISTRY_URL, &d.name, &d.version));
        let results = join_all(lookups).await;

        for (desc, result) in batch.iter_mut().zip(results) {
            match result {
                Ok(Some(license)) => desc.declared_license = Some(license),
                Ok(None) => {}
                Err(e) => tracing::warn!(package = %desc.key(), error = %e, "registry lookup failed"),
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(())
}
