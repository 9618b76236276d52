//! Pinned versions and version specifiers
//!
//! A [`PinnedVersion`] is whatever a dependency is resolved to: usually a
//! semantic version tag, sometimes an opaque branch/commit string. A
//! [`VersionSpecifier`] is the constraint a manifest places on it.

use semver::Version;
use std::fmt;

/// Parse a tag leniently: optional leading `v`, missing minor/patch default to 0
pub fn parse_semantic(text: &str) -> Option<Version> {
    let trimmed = text
        .strip_prefix('v')
        .or_else(|| text.strip_prefix('V'))
        .unwrap_or(text);

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let (core, suffix) = match trimmed.find(['-', '+']) {
        Some(index) => trimmed.split_at(index),
        None => (trimmed, ""),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }

    Version::parse(&format!("{padded}{suffix}")).ok()
}

/// A concrete version a dependency is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinnedVersion {
    /// Tag, branch or commit exactly as written
    commitish: String,
    /// Parsed semantic version, if the commitish is a version tag
    semantic: Option<Version>,
}

impl PinnedVersion {
    pub fn new(commitish: impl Into<String>) -> Self {
        let commitish = commitish.into();
        let semantic = parse_semantic(&commitish);
        Self {
            commitish,
            semantic,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.commitish
    }

    /// The semantic version, or `None` for opaque refs and commits
    pub fn semantic(&self) -> Option<&Version> {
        self.semantic.as_ref()
    }

    pub fn is_semantic(&self) -> bool {
        self.semantic.is_some()
    }
}

impl fmt::Display for PinnedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.commitish)
    }
}

impl From<&str> for PinnedVersion {
    fn from(commitish: &str) -> Self {
        Self::new(commitish)
    }
}

/// Sort versions newest first; opaque versions go last, ties keep their order
pub fn sort_descending(versions: &mut [PinnedVersion]) {
    versions.sort_by(|a, b| b.semantic().cmp(&a.semantic()));
}

/// Constraint on the versions a dependency may resolve to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpecifier {
    Any,
    Exactly(Version),
    AtLeast(Version),
    /// Same major (or same minor while major is 0) and not older
    CompatibleWith(Version),
    /// Branch, tag or commit named literally
    GitReference(String),
}

impl VersionSpecifier {
    /// Check a pinned version against this specifier.
    ///
    /// Opaque pins cannot be ordered against tags and are accepted by every
    /// specifier; whether a commit matches a named reference is decided by
    /// the resolver, which knows where the reference points.
    pub fn is_satisfied_by(&self, pinned: &PinnedVersion) -> bool {
        match pinned.semantic() {
            Some(version) => self.is_satisfied_by_version(version),
            None => true,
        }
    }

    pub fn is_satisfied_by_version(&self, version: &Version) -> bool {
        match self {
            VersionSpecifier::Any => version.pre.is_empty(),
            VersionSpecifier::GitReference(_) => true,
            VersionSpecifier::Exactly(required) => version == required,
            VersionSpecifier::AtLeast(required) => {
                prerelease_allowed(version, required) && version >= required
            }
            VersionSpecifier::CompatibleWith(required) => {
                prerelease_allowed(version, required)
                    && version >= required
                    && same_series(version, required)
            }
        }
    }

    /// Tightest specifier satisfied exactly by versions satisfying both, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        use VersionSpecifier::*;

        match (self, other) {
            (Any, other) | (other, Any) => Some(other.clone()),
            (GitReference(a), GitReference(b)) => (a == b).then(|| self.clone()),
            (GitReference(_), _) => Some(self.clone()),
            (_, GitReference(_)) => Some(other.clone()),
            (Exactly(version), spec) | (spec, Exactly(version)) => spec
                .is_satisfied_by_version(version)
                .then(|| Exactly(version.clone())),
            (AtLeast(a), AtLeast(b)) => Some(AtLeast(a.max(b).clone())),
            (AtLeast(floor), CompatibleWith(base)) | (CompatibleWith(base), AtLeast(floor)) => {
                if floor <= base {
                    Some(CompatibleWith(base.clone()))
                } else if same_series(floor, base) {
                    Some(CompatibleWith(floor.clone()))
                } else {
                    None
                }
            }
            (CompatibleWith(a), CompatibleWith(b)) => {
                let (lower, higher) = if a <= b { (a, b) } else { (b, a) };
                same_series(higher, lower).then(|| CompatibleWith(higher.clone()))
            }
        }
    }
}

/// Fold every specifier into one, `None` when they cannot all hold
pub fn intersect_all<'a>(
    specifiers: impl IntoIterator<Item = &'a VersionSpecifier>,
) -> Option<VersionSpecifier> {
    specifiers
        .into_iter()
        .try_fold(VersionSpecifier::Any, |acc, spec| acc.intersection(spec))
}

fn prerelease_allowed(version: &Version, required: &Version) -> bool {
    version.pre.is_empty()
        || (version.major, version.minor, version.patch)
            == (required.major, required.minor, required.patch)
}

fn same_series(version: &Version, base: &Version) -> bool {
    if base.major == 0 {
        version.major == 0 && version.minor == base.minor
    } else {
        version.major == base.major
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Any => f.write_str("any"),
            VersionSpecifier::Exactly(v) => write!(f, "== {v}"),
            VersionSpecifier::AtLeast(v) => write!(f, ">= {v}"),
            VersionSpecifier::CompatibleWith(v) => write!(f, "~> {v}"),
            VersionSpecifier::GitReference(r) => write!(f, "\"{r}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("version.test.rs");
}
