//! Link classification utilities.

use crate::utils::path::route::{is_absolute, is_rooted};

/// Syntactic classification of links found while rendering a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with URL scheme (https://, mailto:, etc.) or `//host`.
    External(&'a str),
    /// Pure fragment/anchor link (#section). Value is anchor without `#`.
    Fragment(&'a str),
    /// Query-only link (?v=2), kept relative to the current document.
    Query(&'a str),
    /// Site-root-relative path (/api/index.html).
    SiteRoot(&'a str),
    /// Document-relative path (./image.png, ../other.html).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_absolute(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if let Some(anchor) = link.strip_prefix("./#") {
            // ./#fragment points at the current document too
            Self::Fragment(anchor)
        } else if link.starts_with('?') {
            Self::Query(link)
        } else if is_rooted(link) {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }

    /// Whether the link leaves the documentation site.
    #[inline]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Whether resolving the link needs the current document's scope.
    #[inline]
    pub const fn needs_scope(&self) -> bool {
        matches!(self, Self::SiteRoot(_) | Self::FileRelative(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_external() {
        assert!(matches!(
            LinkKind::parse("https://example.com"),
            LinkKind::External("https://example.com")
        ));
        assert!(matches!(
            LinkKind::parse("mailto:user@example.com"),
            LinkKind::External(_)
        ));
        assert!(matches!(
            LinkKind::parse("//cdn.example.com/lib.js"),
            LinkKind::External(_)
        ));
    }

    #[test]
    fn test_parse_fragment() {
        assert!(matches!(LinkKind::parse("#section"), LinkKind::Fragment("section")));
        assert!(matches!(LinkKind::parse("#"), LinkKind::Fragment("")));
        assert!(matches!(LinkKind::parse("./#remarks"), LinkKind::Fragment("remarks")));
    }

    #[test]
    fn test_parse_query() {
        assert!(matches!(LinkKind::parse("?v=2"), LinkKind::Query("?v=2")));
    }

    #[test]
    fn test_parse_site_root() {
        assert!(matches!(
            LinkKind::parse("/api/index.html"),
            LinkKind::SiteRoot("/api/index.html")
        ));
        assert!(matches!(LinkKind::parse("/about#team"), LinkKind::SiteRoot(_)));
    }

    #[test]
    fn test_parse_file_relative() {
        assert!(matches!(
            LinkKind::parse("./image.png"),
            LinkKind::FileRelative("./image.png")
        ));
        assert!(matches!(LinkKind::parse("../other.html"), LinkKind::FileRelative(_)));
        assert!(matches!(LinkKind::parse("Baz.html#Qux"), LinkKind::FileRelative(_)));
    }

    #[test]
    fn test_needs_scope() {
        assert!(LinkKind::parse("a.html").needs_scope());
        assert!(LinkKind::parse("/a.html").needs_scope());
        assert!(!LinkKind::parse("#a").needs_scope());
        assert!(!LinkKind::parse("https://a.org").needs_scope());
        assert!(LinkKind::parse("https://a.org").is_external());
    }
}
