//! Dependency identity
//!
//! Equality, hashing and ordering all go through the normalized identity, so
//! `github "Owner/Repo"`, `git "https://github.com/owner/repo.git"` and
//! `git "git@github.com:owner/repo"` are the same dependency.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Host used for hosted-repo shorthand (`owner/name`)
pub const DEFAULT_HOSTED_SERVER: &str = "github.com";

/// Where a dependency comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// Hosted repository, `owner/name` or a full server URL
    GitHub,
    /// Arbitrary git URL or local path
    Git,
    /// URL of a binary-project JSON definition
    Binary,
}

impl DependencyKind {
    /// Keyword used for this kind in manifests
    pub fn keyword(&self) -> &'static str {
        match self {
            DependencyKind::GitHub => "github",
            DependencyKind::Git => "git",
            DependencyKind::Binary => "binary",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "github" => Some(DependencyKind::GitHub),
            "git" => Some(DependencyKind::Git),
            "binary" => Some(DependencyKind::Binary),
            _ => None,
        }
    }
}

/// An addressable external source
#[derive(Debug, Clone)]
pub struct Dependency {
    kind: DependencyKind,
    /// Address as written in the manifest
    address: String,
    /// Normalized address used for identity
    identity: String,
    name: String,
}

impl Dependency {
    pub fn new(kind: DependencyKind, address: impl Into<String>) -> Self {
        let address = address.into().trim().to_string();
        let identity = match kind {
            DependencyKind::GitHub if !address.contains("://") => {
                format!("{}/{}", DEFAULT_HOSTED_SERVER, strip_git_suffix(&address))
                    .to_lowercase()
            }
            DependencyKind::GitHub | DependencyKind::Git => normalize_git_url(&address),
            DependencyKind::Binary => address.trim_end_matches('/').to_lowercase(),
        };
        let name = display_name(kind, &address);

        Self {
            kind,
            address,
            identity,
            name,
        }
    }

    pub fn github(address: impl Into<String>) -> Self {
        Self::new(DependencyKind::GitHub, address)
    }

    pub fn git(address: impl Into<String>) -> Self {
        Self::new(DependencyKind::Git, address)
    }

    pub fn binary(address: impl Into<String>) -> Self {
        Self::new(DependencyKind::Binary, address)
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_binary(&self) -> bool {
        self.kind == DependencyKind::Binary
    }

    /// URL to clone from, `None` for binary dependencies
    pub fn clone_url(&self) -> Option<String> {
        match self.kind {
            DependencyKind::GitHub if !self.address.contains("://") => Some(format!(
                "https://{}/{}.git",
                DEFAULT_HOSTED_SERVER,
                strip_git_suffix(&self.address)
            )),
            DependencyKind::GitHub | DependencyKind::Git => Some(self.address.clone()),
            DependencyKind::Binary => None,
        }
    }
}

/// Reduce a git URL to `host/path`: no scheme, user info, `.git` or trailing slash
pub fn normalize_git_url(url: &str) -> String {
    let mut rest = url.trim();
    let has_scheme = match rest.find("://") {
        Some(index) => {
            rest = &rest[index + 3..];
            true
        }
        None => false,
    };

    let path_start = rest.find('/').unwrap_or(rest.len());
    if let Some(at) = rest[..path_start].find('@') {
        rest = &rest[at + 1..];
    }

    let mut normalized = rest.to_string();
    if !has_scheme {
        // scp-style `host:owner/repo`
        let path_start = normalized.find('/').unwrap_or(normalized.len());
        if let Some(colon) = normalized[..path_start].find(':') {
            normalized.replace_range(colon..colon + 1, "/");
        }
    }

    strip_git_suffix(normalized.trim_end_matches('/')).to_lowercase()
}

fn strip_git_suffix(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.strip_suffix(".git").unwrap_or(path)
}

fn display_name(kind: DependencyKind, address: &str) -> String {
    let trimmed = strip_git_suffix(address);
    let last = trimmed
        .rsplit(['/', ':'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(trimmed);

    match kind {
        DependencyKind::Binary => last.strip_suffix(".json").unwrap_or(last).to_string(),
        _ => last.to_string(),
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Ord for Dependency {
    /// Case-insensitive name order, identity breaks ties
    fn cmp(&self, other: &Self) -> Ordering {
        if self.identity == other.identity {
            return Ordering::Equal;
        }
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.identity.cmp(&other.identity))
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    include!("dependency.test.rs");
}
