//! Cartfile and Cartfile.resolved line formats
//!
//! ```text
//! # comment
//! github "ReactiveX/RxSwift" ~> 4.1
//! git "https://example.com/Networking.git" "develop"
//! binary "https://example.com/Framework.json" >= 1.0
//! ```

use super::ManifestError;
use super::dependency::{Dependency, DependencyKind};
use super::version::{PinnedVersion, VersionSpecifier, parse_semantic};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::trace;

/// One declared dependency, with the manifest it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartfileEntry {
    pub dependency: Dependency,
    pub specifier: VersionSpecifier,
    /// Manifest location, e.g. `Cartfile` or `Cartfile.private`
    pub source: String,
}

/// Ordered dependency declarations from one or more manifests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cartfile {
    pub entries: Vec<CartfileEntry>,
}

impl Cartfile {
    /// Parse manifest text; `source` names the manifest in entries and errors
    pub fn parse(source: &str, text: &str) -> Result<Self, ManifestError> {
        let mut entries = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let tokens = tokenize(line).map_err(|reason| ManifestError::Parse {
                file: source.to_string(),
                line: index + 1,
                reason,
            })?;
            if tokens.is_empty() {
                continue;
            }

            let (dependency, specifier) =
                parse_entry(&tokens).map_err(|reason| ManifestError::Parse {
                    file: source.to_string(),
                    line: index + 1,
                    reason,
                })?;
            trace!(dependency = %dependency, specifier = %specifier, "Parsed Cartfile entry");

            entries.push(CartfileEntry {
                dependency,
                specifier,
                source: source.to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Read and parse a manifest, naming it by its file name
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("Cartfile");
        Self::parse(source, &text)
    }

    /// Root specifier declared for a dependency
    pub fn specifier_for(&self, dependency: &Dependency) -> Option<&VersionSpecifier> {
        self.entries
            .iter()
            .find(|entry| entry.dependency == *dependency)
            .map(|entry| &entry.specifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pinned version per dependency, ordered by dependency name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCartfile {
    pins: BTreeMap<Dependency, PinnedVersion>,
}

impl ResolvedCartfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a dependency, replacing any existing pin for the same identity
    pub fn insert(&mut self, dependency: Dependency, version: PinnedVersion) {
        self.pins.remove(&dependency);
        self.pins.insert(dependency, version);
    }

    pub fn get(&self, dependency: &Dependency) -> Option<&PinnedVersion> {
        self.pins.get(dependency)
    }

    pub fn get_by_name(&self, name: &str) -> Option<(&Dependency, &PinnedVersion)> {
        self.pins
            .iter()
            .find(|(dependency, _)| dependency.name().eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dependency, &PinnedVersion)> {
        self.pins.iter()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.pins.keys()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        text.parse()
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ManifestError> {
        std::fs::write(path, self.to_string()).map_err(|e| ManifestError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl FromStr for ResolvedCartfile {
    type Err = ManifestError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut resolved = Self::new();

        for (index, line) in text.lines().enumerate() {
            let parse_error = |reason: String| ManifestError::Parse {
                file: "Cartfile.resolved".to_string(),
                line: index + 1,
                reason,
            };

            let tokens = tokenize(line).map_err(parse_error)?;
            match tokens.as_slice() {
                [] => continue,
                [Token::Word(origin), Token::Quoted(address), Token::Quoted(pin)] => {
                    let dependency = parse_dependency(origin, address).map_err(parse_error)?;
                    resolved.insert(dependency, PinnedVersion::new(pin.as_str()));
                }
                _ => {
                    return Err(parse_error(
                        "expected <origin> \"<identity>\" \"<version>\"".to_string(),
                    ));
                }
            }
        }

        Ok(resolved)
    }
}

impl fmt::Display for ResolvedCartfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dependency, version) in &self.pins {
            writeln!(
                f,
                "{} \"{}\" \"{}\"",
                dependency.kind().keyword(),
                dependency.address(),
                version
            )?;
        }
        Ok(())
    }
}

impl FromIterator<(Dependency, PinnedVersion)> for ResolvedCartfile {
    fn from_iter<I: IntoIterator<Item = (Dependency, PinnedVersion)>>(iter: I) -> Self {
        let mut resolved = Self::new();
        for (dependency, version) in iter {
            resolved.insert(dependency, version);
        }
        resolved
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
}

/// Split a line into bare words and quoted strings, dropping `#` comments
fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            break;
        } else if c == '"' {
            chars.next();
            let mut quoted = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(other) => quoted.push(other),
                    None => return Err("unterminated quoted string".to_string()),
                }
            }
            tokens.push(Token::Quoted(quoted));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' || c == '#' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn parse_dependency(origin: &str, address: &str) -> Result<Dependency, String> {
    let kind = DependencyKind::from_keyword(origin)
        .ok_or_else(|| format!("unknown dependency origin '{origin}'"))?;
    if address.is_empty() {
        return Err("empty dependency address".to_string());
    }
    Ok(Dependency::new(kind, address))
}

fn parse_entry(tokens: &[Token]) -> Result<(Dependency, VersionSpecifier), String> {
    let (origin, address, rest) = match tokens {
        [Token::Word(origin), Token::Quoted(address), rest @ ..] => (origin, address, rest),
        _ => return Err("expected <origin> \"<identity>\"".to_string()),
    };
    let dependency = parse_dependency(origin, address)?;

    let specifier = match rest {
        [] => VersionSpecifier::Any,
        [Token::Quoted(reference)] => VersionSpecifier::GitReference(reference.clone()),
        [Token::Word(operator), Token::Word(version)] => {
            let parsed = parse_semantic(version)
                .ok_or_else(|| format!("invalid version '{version}'"))?;
            match operator.as_str() {
                "==" => VersionSpecifier::Exactly(parsed),
                ">=" => VersionSpecifier::AtLeast(parsed),
                "~>" => VersionSpecifier::CompatibleWith(parsed),
                other => return Err(format!("unknown version operator '{other}'")),
            }
        }
        _ => return Err("malformed version constraint".to_string()),
    };

    Ok((dependency, specifier))
}

#[cfg(test)]
mod tests {
    include!("manifest.test.rs");
}
