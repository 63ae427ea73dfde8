use crate::{Error, Result};

use std::fmt;

/// Dot-separated address of a property through a chain of nested or related
/// objects, e.g. `contact.department.name`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath {
    parts: Vec<String>,
}

impl PropertyPath {
    /// Parse a dot-separated path. Each segment must be an identifier.
    pub fn parse(src: &str) -> Result<Self> {
        if !Self::is_path(src) {
            return Err(Error::query(format!("invalid property path `{src}`")));
        }

        Ok(Self {
            parts: src.split('.').map(String::from).collect(),
        })
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `src` reads as a property path.
    pub fn is_path(src: &str) -> bool {
        !src.is_empty()
            && src.split('.').all(|segment| {
                let mut chars = segment.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Every path segment but the last.
    pub fn parents(&self) -> &[String] {
        &self.parts[..self.parts.len().saturating_sub(1)]
    }

    /// The path of the owning object, if any.
    pub fn parent(&self) -> Option<PropertyPath> {
        (self.parts.len() > 1).then(|| Self {
            parts: self.parents().to_vec(),
        })
    }

    /// The path without its first segment.
    pub fn tail(&self) -> Option<PropertyPath> {
        (self.parts.len() > 1).then(|| Self {
            parts: self.parts[1..].to_vec(),
        })
    }

    pub fn child(&self, name: &str) -> PropertyPath {
        let mut parts = self.parts.clone();
        parts.push(name.to_string());
        Self { parts }
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    pub fn is_prefix_of(&self, other: &PropertyPath) -> bool {
        self.parts.len() < other.parts.len() && other.parts.starts_with(&self.parts)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_split() {
        let path = PropertyPath::parse("child.parent.name").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.first(), Some("child"));
        assert_eq!(path.last(), Some("name"));
        assert_eq!(path.parents(), ["child", "parent"]);
        assert_eq!(path.tail().unwrap().to_string(), "parent.name");
    }

    #[test]
    fn empty_path_has_no_ends() {
        let path = PropertyPath::from_parts(Vec::<String>::new());
        assert!(path.is_empty());
        assert_eq!(path.first(), None);
        assert_eq!(path.last(), None);
        assert!(path.tail().is_none());
    }

    #[test]
    fn reject_non_paths() {
        assert!(!PropertyPath::is_path("COUNT(id)"));
        assert!(!PropertyPath::is_path("a..b"));
        assert!(!PropertyPath::is_path("1abc"));
        assert!(PropertyPath::parse("").is_err());
    }

    #[test]
    fn prefix() {
        let a = PropertyPath::parse("department").unwrap();
        let b = PropertyPath::parse("department.name").unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
        assert!(!a.is_prefix_of(&a));
    }
}
