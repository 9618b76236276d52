//! Binary-project definitions
//!
//! A binary dependency points at a JSON object mapping version strings to
//! archive URLs:
//!
//! ```json
//! { "1.0": "https://example.com/1.0/Framework.zip?alt=https://mirror.example/1.0/Framework.zip" }
//! ```
//!
//! Each `alt` query parameter is an alternative download location. It is
//! lifted out of the primary URL and listed after it.

use super::version::{PinnedVersion, parse_semantic, sort_descending};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum BinaryProjectError {
    #[error("Invalid binary project JSON: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid version key '{key}' in binary project")]
    InvalidVersionKey { key: String },

    #[error("Invalid URL in binary project: {url}")]
    InvalidUrl { url: String },

    #[error("Binary project URLs must use https or file: {url}")]
    NonHttpsScheme { url: String },
}

/// Versions a binary dependency offers, each with its download URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryProject {
    /// Primary URL first, then `alt` locations in order
    pub versions: HashMap<PinnedVersion, Vec<Url>>,
}

impl BinaryProject {
    pub fn from_json(json: &str) -> Result<Self, BinaryProjectError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut versions = HashMap::with_capacity(raw.len());

        for (key, value) in raw {
            if parse_semantic(&key).is_none() {
                return Err(BinaryProjectError::InvalidVersionKey { key });
            }
            versions.insert(PinnedVersion::new(key), download_urls(&value)?);
        }

        Ok(Self { versions })
    }

    /// Offered versions, newest first
    pub fn pinned_versions(&self) -> Vec<PinnedVersion> {
        let mut pinned: Vec<PinnedVersion> = self.versions.keys().cloned().collect();
        pinned.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        sort_descending(&mut pinned);
        pinned
    }

    pub fn urls_for(&self, version: &PinnedVersion) -> Option<&[Url]> {
        self.versions.get(version).map(Vec::as_slice)
    }
}

fn download_urls(value: &str) -> Result<Vec<Url>, BinaryProjectError> {
    let mut primary = parse_download_url(value)?;

    let mut alternatives = Vec::new();
    let mut remaining = Vec::new();
    for (name, pair_value) in primary.query_pairs() {
        if name == "alt" {
            alternatives.push(pair_value.into_owned());
        } else {
            remaining.push((name.into_owned(), pair_value.into_owned()));
        }
    }

    if !alternatives.is_empty() {
        if remaining.is_empty() {
            primary.set_query(None);
        } else {
            primary
                .query_pairs_mut()
                .clear()
                .extend_pairs(remaining.iter());
        }
    }

    let mut urls = vec![primary];
    for alternative in &alternatives {
        urls.push(parse_download_url(alternative)?);
    }
    Ok(urls)
}

/// Errors carry `text` as written, not the normalized URL
fn parse_download_url(text: &str) -> Result<Url, BinaryProjectError> {
    let url = Url::parse(text).map_err(|_| BinaryProjectError::InvalidUrl {
        url: text.to_string(),
    })?;
    if !matches!(url.scheme(), "https" | "file") {
        return Err(BinaryProjectError::NonHttpsScheme {
            url: text.to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    include!("binary_project.test.rs");
}
