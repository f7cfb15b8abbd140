//! Validation tooling for i18n documentation repositories.
//!
//! The library behind the `i18n-check` and `zanata-stats` binaries. It
//! implements the four correctness gates a translation repository runs
//! before a release (documentation build, style rules, catalog format,
//! roster syntax) and a small REST client for pulling contributor
//! statistics from a Zanata translation platform.

pub mod catalog;
pub mod config;
pub mod docs;
pub mod error;
pub mod retry;
pub mod roster;
pub mod runner;
pub mod stats;
pub mod style;
pub mod zanata;
