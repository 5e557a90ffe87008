//! License file location, copyright extraction and copyleft classification.
//!
//! - [`locator`] — picks the license file out of a package root listing.
//! - [`copyright`] — pulls the first copyright line out of license text.
//! - [`spdx`] — maps SPDX identifiers (and common aliases) to a risk level.
//! - [`classifier`] — declared-license classification plus the dependency
//!   graph pass that flags transitive copyleft exposure.

pub mod classifier;
pub mod copyright;
pub mod locator;
pub mod spdx;
