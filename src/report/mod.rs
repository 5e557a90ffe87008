//! Renderers for the finished manifest.
//!
//! - [`notices`] — the `THIRD-PARTY-NOTICES.html` document, grouped by license category.
//! - [`terminal`] — colored summary box and tables; respects `--verbose` / `--quiet`.

pub mod notices;
pub mod terminal;
