//! Test doubles for the resolver and synchronizer
//!
//! - [`InMemoryProvider`]: fixed version, requirement and reference data
//! - [`MockMirror`]: counts clones and fetches, with optional latency and failures

pub mod mirror;
pub mod provider;

pub use mirror::MockMirror;
pub use provider::InMemoryProvider;

use crate::cartfile::{Dependency, VersionSpecifier, parse_semantic};

/// `github "<owner>/<name>"` dependency for fixtures
pub fn github(repository: &str) -> Dependency {
    Dependency::github(repository)
}

/// Shorthand specifiers: `"~> 1.0"`, `">= 2"`, `"== 3.1.4"`, `"any"`, or a branch name
pub fn spec(text: &str) -> VersionSpecifier {
    let text = text.trim();
    let operator = text.get(..2).unwrap_or_default();
    let version = text.get(2..).map(str::trim).and_then(parse_semantic);

    match (operator, version) {
        ("~>", Some(version)) => VersionSpecifier::CompatibleWith(version),
        (">=", Some(version)) => VersionSpecifier::AtLeast(version),
        ("==", Some(version)) => VersionSpecifier::Exactly(version),
        _ if text == "any" => VersionSpecifier::Any,
        _ => VersionSpecifier::GitReference(text.to_string()),
    }
}
