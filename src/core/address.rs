//! Resource address value type.

use std::fmt;

use serde::Serialize;

use crate::utils::path::route::{split_path_fragment, split_path_suffix};

/// Where an entity lives on the site.
///
/// Invariants:
/// - `relative_url` is never empty; it may carry a query and/or fragment
/// - both fields are relative to the site root (no leading `/`)
/// - `relative_file_path` is `None` when no output file backs the address
///   (e.g. a topic pinned to an external URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceAddress {
    relative_url: String,
    relative_file_path: Option<String>,
}

impl ResourceAddress {
    /// Create an address, rejecting an empty URL.
    pub fn try_new(relative_url: impl Into<String>, relative_file_path: Option<String>) -> Option<Self> {
        let relative_url = relative_url.into();
        (!relative_url.is_empty()).then_some(Self {
            relative_url,
            relative_file_path,
        })
    }

    /// Site-relative URL (may include query and fragment).
    #[inline]
    pub fn relative_url(&self) -> &str {
        &self.relative_url
    }

    /// Site-relative output file path, if the address is backed by a file.
    #[inline]
    pub fn relative_file_path(&self) -> Option<&str> {
        self.relative_file_path.as_deref()
    }

    /// URL without query and fragment.
    pub fn url_path(&self) -> &str {
        split_path_suffix(&self.relative_url).0
    }

    /// Fragment without `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        match split_path_fragment(&self.relative_url) {
            (_, "") => None,
            (_, fragment) => Some(fragment),
        }
    }

    /// The output file, when the address denotes a whole page.
    ///
    /// Entities folded into another page (`Baz.html#Qux`) share their host's
    /// file but are not standalone.
    pub fn standalone_file(&self) -> Option<&str> {
        match self.fragment() {
            Some(_) => None,
            None => self.relative_file_path(),
        }
    }

    /// Consume into `(url, file)`.
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.relative_url, self.relative_file_path)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relative_file_path {
            Some(file) => write!(f, "{} ({})", self.relative_url, file),
            None => write!(f, "{}", self.relative_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_empty_url() {
        assert!(ResourceAddress::try_new("", None).is_none());
        assert!(ResourceAddress::try_new("", Some("a.html".into())).is_none());
        assert!(ResourceAddress::try_new("a.html", None).is_some());
    }

    #[test]
    fn test_fragment_and_standalone_file() {
        let folded =
            ResourceAddress::try_new("Foo.Bar/Baz.html#Qux", Some("Foo.Bar/Baz.html".into()))
                .unwrap();
        assert_eq!(folded.fragment(), Some("Qux"));
        assert_eq!(folded.url_path(), "Foo.Bar/Baz.html");
        assert_eq!(folded.relative_file_path(), Some("Foo.Bar/Baz.html"));
        assert_eq!(folded.standalone_file(), None);

        let page = ResourceAddress::try_new("Foo.Bar/Baz", Some("Foo.Bar/Baz.html".into())).unwrap();
        assert_eq!(page.fragment(), None);
        assert_eq!(page.standalone_file(), Some("Foo.Bar/Baz.html"));
    }

    #[test]
    fn test_display() {
        let addr = ResourceAddress::try_new("a/b.html", Some("a/b.html".into())).unwrap();
        assert_eq!(addr.to_string(), "a/b.html (a/b.html)");
        let addr = ResourceAddress::try_new("https://x.org/", None).unwrap();
        assert_eq!(addr.to_string(), "https://x.org/");
    }

    #[test]
    fn test_serialize() {
        let addr = ResourceAddress::try_new("a.html#x", Some("a.html".into())).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, r##"{"relative_url":"a.html#x","relative_file_path":"a.html"}"##);
    }
}
