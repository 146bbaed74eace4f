//! # Credential Paths
//!
//! A [`CredentialPath`] names a location inside a credential's claim tree. It
//! comes in two flavours: a JSON-Pointer-shaped sequence of segments (used by
//! SD-JWT and SD-CWT claim trees, and by the W3C VC `credentialSubject`
//! boundary), and an N-Quad index (used by a separate, non-JSON redaction
//! pipeline for RDF-based credentials that this crate treats as an opaque
//! leaf path).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An immutable path into a credential's claim tree.
///
/// Equality and ordering are total: every two paths compare as `Less`,
/// `Equal`, or `Greater`. JSON-Pointer paths always sort before N-Quad paths;
/// within JSON-Pointer, segments are compared pairwise as Unicode code
/// points, with the shorter of two equal-prefix paths sorting first.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialPath {
    /// A finite, ordered sequence of unescaped string segments.
    JsonPointer(Vec<String>),

    /// An index into an N-Quad based credential's statement list.
    NQuad(u64),
}

impl CredentialPath {
    /// The empty JSON-Pointer path, denoting the root of a claim tree.
    #[must_use]
    pub const fn root() -> Self {
        Self::JsonPointer(Vec::new())
    }

    /// Parses an RFC 6901 JSON-Pointer string into a [`CredentialPath`].
    ///
    /// An empty string denotes [`Self::root`]. A non-empty pointer must start
    /// with `/`; `~0` and `~1` are unescaped to `~` and `/` respectively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPointer`] if `pointer` is non-empty and does
    /// not start with `/`, or contains an unpaired `~` escape.
    pub fn parse(pointer: &str) -> Result<Self> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        if !pointer.starts_with('/') {
            return Err(Error::MalformedPointer(pointer.to_string()));
        }
        let mut segments = Vec::new();
        for raw in pointer[1..].split('/') {
            segments.push(unescape(raw)?);
        }
        Ok(Self::JsonPointer(segments))
    }

    /// Wraps an N-Quad statement index.
    #[must_use]
    pub const fn nquad(index: u64) -> Self {
        Self::NQuad(index)
    }

    /// Returns `true` if this path is the JSON-Pointer root (empty segment
    /// list). N-Quad paths are never the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::JsonPointer(segments) if segments.is_empty())
    }

    /// The number of segments: the segment count for JSON-Pointer, always 1
    /// for N-Quad.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::JsonPointer(segments) => segments.len(),
            Self::NQuad(_) => 1,
        }
    }

    /// Returns the JSON-Pointer segments, or `None` for an N-Quad path.
    #[must_use]
    pub fn segments(&self) -> Option<&[String]> {
        match self {
            Self::JsonPointer(segments) => Some(segments),
            Self::NQuad(_) => None,
        }
    }

    /// Returns a new path extended with a property segment.
    ///
    /// # Errors
    ///
    /// Append is only valid on the JSON-Pointer variant; fails with
    /// [`Error::NotAJsonPath`] when called on an N-Quad path.
    pub fn append(&self, segment: impl Into<String>) -> Result<Self> {
        match self {
            Self::JsonPointer(segments) => {
                let mut next = segments.clone();
                next.push(segment.into());
                Ok(Self::JsonPointer(next))
            }
            Self::NQuad(_) => Err(Error::NotAJsonPath),
        }
    }

    /// Returns a new path extended with an array index segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAJsonPath`] if called on an N-Quad path.
    pub fn append_index(&self, index: usize) -> Result<Self> {
        self.append(index.to_string())
    }

    /// The parent of this path, or `None` at the root and for N-Quad paths.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::JsonPointer(segments) if segments.is_empty() => None,
            Self::JsonPointer(segments) => {
                Some(Self::JsonPointer(segments[..segments.len() - 1].to_vec()))
            }
            Self::NQuad(_) => None,
        }
    }

    /// The last segment of this path (the "leaf name"), or `None` at the
    /// root and for N-Quad paths.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        match self {
            Self::JsonPointer(segments) => segments.last().map(String::as_str),
            Self::NQuad(_) => None,
        }
    }

    /// Returns the ancestors of this path, nearest-root-first, excluding
    /// `self`.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        match self {
            Self::JsonPointer(segments) => (0..segments.len())
                .map(|i| Self::JsonPointer(segments[..i].to_vec()))
                .collect(),
            Self::NQuad(_) => Vec::new(),
        }
    }

    /// Returns `self` and its ancestors, root-first.
    #[must_use]
    pub fn self_and_ancestors(&self) -> Vec<Self> {
        let mut chain = self.ancestors();
        chain.push(self.clone());
        chain
    }

    /// Returns `true` if `self` is a strict ancestor of `other`: `other`'s
    /// segments extend `self`'s segments. A path is never its own ancestor,
    /// and N-Quad paths have no ancestors or descendants.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::JsonPointer(mine), Self::JsonPointer(theirs)) => {
                mine.len() < theirs.len() && theirs[..mine.len()] == mine[..]
            }
            _ => false,
        }
    }

    /// Renders the canonical string form: RFC 6901 pointer syntax for
    /// JSON-Pointer paths (the empty string at root), or `/_nquad:{index}`
    /// for N-Quad paths.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::JsonPointer(segments) => {
                segments.iter().map(|s| format!("/{}", escape(s))).collect()
            }
            Self::NQuad(index) => format!("/_nquad:{index}"),
        }
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> Result<String> {
    if !segment.contains('~') {
        return Ok(segment.to_string());
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(Error::MalformedPointer(format!(
                    "unpaired '~' escape in segment `{segment}`"
                )));
            }
        }
    }
    Ok(out)
}

impl fmt::Display for CredentialPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl std::str::FromStr for CredentialPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Ord for CredentialPath {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::JsonPointer(mine), Self::JsonPointer(theirs)) => {
                mine.cmp(theirs).then_with(|| mine.len().cmp(&theirs.len()))
            }
            (Self::JsonPointer(_), Self::NQuad(_)) => Ordering::Less,
            (Self::NQuad(_), Self::JsonPointer(_)) => Ordering::Greater,
            (Self::NQuad(a), Self::NQuad(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for CredentialPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root() {
        assert_eq!(CredentialPath::parse("").unwrap(), CredentialPath::root());
        assert!(CredentialPath::root().is_root());
    }

    #[test]
    fn round_trip_string() {
        for pointer in ["/credentialSubject/degree", "/a~0b/c~1d", "/l1/l2/l3/secret"] {
            let path = CredentialPath::parse(pointer).unwrap();
            assert_eq!(path.to_canonical_string(), pointer);
        }
    }

    #[test]
    fn nquad_canonical_form() {
        let path = CredentialPath::nquad(3);
        assert_eq!(path.to_canonical_string(), "/_nquad:3");
        assert!(!path.is_root());
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn malformed_pointer_rejected() {
        assert!(matches!(
            CredentialPath::parse("no-leading-slash"),
            Err(Error::MalformedPointer(_))
        ));
        assert!(matches!(CredentialPath::parse("/a~"), Err(Error::MalformedPointer(_))));
    }

    #[test]
    fn append_valid_on_json_pointer_only() {
        let path = CredentialPath::parse("/credentialSubject").unwrap();
        let extended = path.append("degree").unwrap();
        assert_eq!(extended.to_canonical_string(), "/credentialSubject/degree");

        let nquad = CredentialPath::nquad(0);
        assert!(matches!(nquad.append("x"), Err(Error::NotAJsonPath)));
        assert!(matches!(nquad.append_index(0), Err(Error::NotAJsonPath)));
    }

    #[test]
    fn parent_and_ancestors() {
        let path = CredentialPath::parse("/l1/l2/l3/secret").unwrap();
        assert_eq!(path.parent().unwrap().to_canonical_string(), "/l1/l2/l3");
        let ancestors = path.ancestors();
        let rendered: Vec<_> = ancestors.iter().map(CredentialPath::to_canonical_string).collect();
        assert_eq!(rendered, vec!["", "/l1", "/l1/l2", "/l1/l2/l3"]);

        assert!(CredentialPath::root().parent().is_none());
        assert!(CredentialPath::nquad(1).parent().is_none());
    }

    #[test]
    fn ancestor_boundary_is_exact() {
        // P9: `/foo` must not match `/foobar`.
        let foo = CredentialPath::parse("/foo").unwrap();
        let foobar = CredentialPath::parse("/foobar").unwrap();
        assert!(!foo.is_ancestor_of(&foobar));

        let nested = CredentialPath::parse("/foo/bar").unwrap();
        assert!(foo.is_ancestor_of(&nested));
        assert!(!foo.is_ancestor_of(&foo));
    }

    #[test]
    fn total_order_places_json_pointer_before_nquad() {
        let pointer = CredentialPath::parse("/zzzz").unwrap();
        let nquad = CredentialPath::nquad(0);
        assert!(pointer < nquad);
    }

    #[test]
    fn ties_broken_by_length() {
        let short = CredentialPath::parse("/a").unwrap();
        let long = CredentialPath::parse("/a/b").unwrap();
        assert!(short < long);
    }
}
