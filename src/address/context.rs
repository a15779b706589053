//! Rendering scopes: the "current document" a URL is adjusted for.
//!
//! A [`DocumentUrlContext`] turns a site-relative URL into the link that
//! works from one document. Two realizations exist, chosen by [`LinkMode`]:
//!
//! ```text
//! Relative (document in Other/):   Foo.Bar/Baz.html#Qux -> ../Foo.Bar/Baz.html#Qux
//! Absolute (base https://h/api/):  Foo.Bar/Baz.html#Qux -> https://h/api/Foo.Bar/Baz.html#Qux
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use url::Url;

use super::AddressError;
use crate::model::ScopeModel;
use crate::utils::path::route::{
    combine, is_absolute_or_rooted, is_query_or_fragment_only, normalize_path_segments,
    split_path_suffix,
};

/// How scopes turn site-relative URLs into links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// `../` navigation from the current document's directory.
    #[default]
    Relative,
    /// Fixed base URL (always ends with `/`).
    Absolute(Url),
}

/// Pre-split directory of a scope, shared by every scope in that directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMetadata {
    /// Normalized directory, `""` for the root or `a/b/`.
    directory: String,
    segments: Vec<Box<str>>,
    /// `../` repeated once per segment.
    root_prefix: String,
}

impl DirectoryMetadata {
    /// Parse a site-relative directory (`a/b`, `a\b\`, `./a/../b`).
    pub fn parse(directory: &str) -> Result<Self, AddressError> {
        let directory = directory.trim();
        if is_absolute_or_rooted(directory) {
            return Err(AddressError::AbsoluteDirectory(directory.to_string()));
        }
        let segments = normalize_path_segments(directory.split(['/', '\\']), false)
            .unwrap_or_default();
        if segments.first() == Some(&"..") {
            return Err(AddressError::AboveRoot(directory.to_string()));
        }

        let mut normalized = String::with_capacity(directory.len() + 1);
        for segment in &segments {
            normalized.push_str(segment);
            normalized.push('/');
        }
        Ok(Self {
            directory: normalized,
            root_prefix: "../".repeat(segments.len()),
            segments: segments.iter().map(|&s| Box::from(s)).collect(),
        })
    }

    /// The site root.
    pub fn root() -> Self {
        Self {
            directory: String::new(),
            segments: Vec::new(),
            root_prefix: String::new(),
        }
    }

    #[inline]
    pub fn directory(&self) -> &str {
        &self.directory
    }

    #[inline]
    pub fn segments(&self) -> &[Box<str>] {
        &self.segments
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }
}

/// Case-insensitive segment comparison, Unicode-aware.
fn same_segment(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || (!(a.is_ascii() && b.is_ascii()) && a.to_lowercase() == b.to_lowercase())
}

/// The active "current document" of a rendering flow.
#[derive(Debug)]
pub struct DocumentUrlContext {
    directory: Arc<DirectoryMetadata>,
    model: Option<ScopeModel>,
    mode: Arc<LinkMode>,
}

impl DocumentUrlContext {
    pub(crate) fn new(
        directory: Arc<DirectoryMetadata>,
        model: Option<ScopeModel>,
        mode: Arc<LinkMode>,
    ) -> Self {
        Self {
            directory,
            model,
            mode,
        }
    }

    /// Directory of the document being rendered (`""` or `a/b/`).
    #[inline]
    pub fn directory(&self) -> &str {
        self.directory.directory()
    }

    #[inline]
    pub fn metadata(&self) -> &DirectoryMetadata {
        &self.directory
    }

    /// Entity the document belongs to, if any.
    #[inline]
    pub fn model(&self) -> Option<&ScopeModel> {
        self.model.as_ref()
    }

    #[inline]
    pub fn mode(&self) -> &LinkMode {
        &self.mode
    }

    /// The shared root scope (no directory, no model).
    pub fn is_root(&self) -> bool {
        self.directory.depth() == 0 && self.model.is_none()
    }

    /// Link to the site root from this document (`./`, `../../`, or the base URL).
    pub fn root_url(&self) -> &str {
        match &*self.mode {
            LinkMode::Absolute(base) => base.as_str(),
            LinkMode::Relative if self.directory.depth() == 0 => "./",
            LinkMode::Relative => self.directory.root_prefix(),
        }
    }

    /// Adjust a site-relative URL for this document.
    ///
    /// Empty, absolute, rooted and query/fragment-only URLs are returned
    /// unchanged. Fails if the URL navigates above the site root.
    pub fn resolve_url<'u>(&self, site_relative: &'u str) -> Result<Cow<'u, str>, AddressError> {
        if site_relative.is_empty()
            || is_absolute_or_rooted(site_relative)
            || is_query_or_fragment_only(site_relative)
        {
            return Ok(Cow::Borrowed(site_relative));
        }
        match &*self.mode {
            LinkMode::Absolute(base) => {
                let (path, _) = split_path_suffix(site_relative);
                if escapes_root(path) {
                    return Err(AddressError::AboveRoot(site_relative.to_string()));
                }
                combine(base.as_str(), site_relative).map(Cow::Owned)
            }
            LinkMode::Relative => self.relative_to(site_relative).map(Cow::Owned),
        }
    }

    /// Shortest `../` path from this directory to `site_relative`.
    ///
    /// Directory segments are compared case-insensitively.
    fn relative_to(&self, site_relative: &str) -> Result<String, AddressError> {
        let (path, suffix) = split_path_suffix(site_relative);
        let (target_dir, file) = match path.rfind(['/', '\\']) {
            Some(i) => path.split_at(i + 1),
            None => ("", path),
        };
        let (target_dir, file) = match file {
            "." | ".." => (path, ""),
            _ => (target_dir, file),
        };

        let target = normalize_path_segments(target_dir.split(['/', '\\']), false)
            .unwrap_or_default();
        if target.first() == Some(&"..") {
            return Err(AddressError::AboveRoot(site_relative.to_string()));
        }

        let source = self.directory.segments();
        let common = source
            .iter()
            .zip(target.iter())
            .take_while(|(a, b)| same_segment(a, b))
            .count();

        let mut out = String::with_capacity(site_relative.len() + 3 * source.len());
        if common == 0 {
            out.push_str(self.directory.root_prefix());
        } else {
            for _ in common..source.len() {
                out.push_str("../");
            }
        }
        for segment in &target[common..] {
            out.push_str(segment);
            out.push('/');
        }
        out.push_str(file);
        if out.is_empty() {
            out.push_str("./");
        }
        out.push_str(suffix);
        Ok(out)
    }
}

/// Validate an absolute http(s) base URL.
///
/// A missing trailing `/` is added; query and fragment are dropped.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, AddressError> {
    let invalid = || AddressError::InvalidBaseUrl(base_url.to_string());
    let mut url = Url::parse(base_url.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Whether a relative path climbs above its starting directory.
fn escapes_root(path: &str) -> bool {
    normalize_path_segments(path.split(['/', '\\']), false)
        .is_some_and(|segments| segments.first() == Some(&".."))
}

impl fmt::Display for DocumentUrlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directory = match self.directory() {
            "" => "(root)",
            dir => dir,
        };
        match &self.model {
            Some(model) => write!(f, "{directory} [{model}]"),
            None => f.write_str(directory),
        }
    }
}
