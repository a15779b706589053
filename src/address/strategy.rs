//! Addressing strategies: where each entity lives on the site.
//!
//! A strategy maps namespaces, code elements and topics to a
//! [`ResourceAddress`]. The set of page layouts is closed
//! ([`AddressingScheme`]); the strategy adds the per-site knobs (file
//! extension, extension-less URLs, page granularity).
//!
//! | Scheme         | Type page            | Topics                          | Escaping |
//! |----------------|----------------------|---------------------------------|----------|
//! | `Hierarchical` | `Foo.Bar/Baz.html`   | directories + `index` landing   | `_`      |
//! | `Flat`         | `Foo.Bar.Baz.html`   | one file per topic id           | `-`      |
//! | `Wiki`         | `Foo.Bar.Baz.md`     | one file per topic title        | `%XX`    |

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{AddressError, Granularity};
use crate::core::ResourceAddress;
use crate::model::{CodeElement, Namespace, TopicNode};
use crate::utils::path::route::{combine, is_absolute, strip_leading_slash, try_normalize_path};
use crate::utils::path::slug::{Escape, ascii_slug, collapse_whitespace};

/// File stem of directory landing pages.
pub const INDEX_NAME: &str = "index";

/// Path segment used for the global namespace.
const GLOBAL_NAMESPACE: &str = "global";

/// Page layout convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingScheme {
    /// One directory per namespace, topic hierarchy as directories (DocFx-like).
    #[default]
    Hierarchical,
    /// Every page at the site root, names qualified with dots.
    Flat,
    /// Wiki pages: flat, percent-encoded names, topic titles as page names.
    Wiki,
}

impl AddressingScheme {
    /// Escaping policy for path segments and anchors.
    pub const fn escape(self) -> Escape {
        match self {
            Self::Hierarchical => Escape::Underscore,
            Self::Flat => Escape::Dash,
            Self::Wiki => Escape::Percent,
        }
    }

    /// Extension used when none is configured.
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Wiki => ".md",
            Self::Hierarchical | Self::Flat => ".html",
        }
    }

    /// Whether topic hierarchies become directories.
    const fn nests_topics(self) -> bool {
        matches!(self, Self::Hierarchical)
    }

    /// Whether pinned topic paths override the computed path.
    const fn honors_pinned(self) -> bool {
        !matches!(self, Self::Wiki)
    }

    /// Separator between a page and the pages it contains.
    const fn separator(self) -> char {
        match self {
            Self::Hierarchical => '/',
            Self::Flat | Self::Wiki => '.',
        }
    }
}

/// A page location before the file extension is applied.
#[derive(Debug, Default)]
struct PageStem {
    /// Site-relative path without extension (`Foo.Bar/Baz`).
    stem: String,
    /// Directory landing page: extension-less URLs collapse to the directory.
    index: bool,
}

/// Maps documentation entities to site addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressingStrategy {
    scheme: AddressingScheme,
    file_extension: String,
    omit_extension_in_urls: bool,
    granularity: Granularity,
}

impl Default for AddressingStrategy {
    fn default() -> Self {
        Self::new(AddressingScheme::default())
    }
}

impl AddressingStrategy {
    /// Strategy with the scheme's default extension and granularity.
    pub fn new(scheme: AddressingScheme) -> Self {
        Self {
            scheme,
            file_extension: scheme.default_extension().to_string(),
            omit_extension_in_urls: false,
            granularity: Granularity::default(),
        }
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Result<Self, AddressError> {
        self.set_file_extension(extension)?;
        Ok(self)
    }

    /// Set the output file extension (`.html`). Must start with a dot.
    pub fn set_file_extension(&mut self, extension: impl Into<String>) -> Result<(), AddressError> {
        let extension = extension.into();
        validate_extension(&extension)?;
        self.file_extension = extension;
        Ok(())
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Drop the file extension from URLs (`Foo.Bar/Baz` instead of `Foo.Bar/Baz.html`).
    pub fn with_omitted_extension(mut self, omit: bool) -> Self {
        self.omit_extension_in_urls = omit;
        self
    }

    #[inline]
    pub const fn scheme(&self) -> AddressingScheme {
        self.scheme
    }

    #[inline]
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    #[inline]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[inline]
    pub const fn omits_extension_in_urls(&self) -> bool {
        self.omit_extension_in_urls
    }

    #[inline]
    fn escape(&self) -> Escape {
        self.scheme.escape()
    }

    /// Whether an element can have an address of its own.
    ///
    /// Inherited and compiler-generated elements have none; enum values
    /// resolve to their enum type instead.
    pub fn is_addressable(&self, element: &CodeElement) -> bool {
        element.is_direct_declaration()
            && !element.is_compiler_generated()
            && !element.is_enum_value()
            && element
                .declaring_type()
                .is_none_or(|outer| self.is_addressable(outer))
    }

    // ========================================================================
    // Namespaces and code elements
    // ========================================================================

    pub fn try_resolve_namespace_address(&self, namespace: &Namespace) -> Option<ResourceAddress> {
        if !self.granularity.contains(Granularity::NAMESPACE) {
            return None;
        }
        self.page_address(&self.namespace_page(namespace), None)
    }

    /// Address of a type or member.
    pub fn try_resolve_member_address(&self, element: &CodeElement) -> Option<ResourceAddress> {
        if element.is_enum_value() {
            return self.try_resolve_member_address(element.declaring_type()?);
        }
        if !self.is_addressable(element) {
            return None;
        }
        if element.is_type() {
            return self.type_address(element);
        }

        let ty = element.declaring_type()?;
        let member_id = element.member_id();
        if self.granularity.contains(Granularity::MEMBER) {
            let type_page = self.type_page(ty);
            let page = PageStem {
                stem: format!(
                    "{}{}{}",
                    type_page.stem,
                    self.scheme.separator(),
                    self.member_page_name(&member_id)
                ),
                index: false,
            };
            return self.page_address(&page, None);
        }

        if self.granularity.contains(Granularity::TYPE) {
            let anchor = self.escape().anchor(&member_id);
            self.page_address(&self.type_page(ty), Some(&*anchor))
        } else if self.granularity.contains(Granularity::NAMESPACE) {
            let qualified = format!("{}.{}", ty.type_name(), member_id);
            let anchor = self.escape().anchor(&qualified);
            self.page_address(&self.namespace_page(ty.namespace()), Some(&*anchor))
        } else {
            None
        }
    }

    /// Page name of a member with a page of its own.
    fn member_page_name<'a>(&self, member_id: &'a str) -> Cow<'a, str> {
        match self.escape() {
            Escape::Percent => Escape::Percent.segment(member_id),
            escape => escape.anchor(member_id),
        }
    }

    fn type_address(&self, ty: &CodeElement) -> Option<ResourceAddress> {
        if self.granularity.contains(Granularity::TYPE) {
            self.page_address(&self.type_page(ty), None)
        } else if self.granularity.contains(Granularity::NAMESPACE) {
            let anchor = self.escape().anchor(&ty.type_name()).into_owned();
            self.page_address(&self.namespace_page(ty.namespace()), Some(&*anchor))
        } else {
            None
        }
    }

    fn namespace_segment<'a>(&self, namespace: &'a Namespace) -> Cow<'a, str> {
        if namespace.is_global() {
            Cow::Borrowed(GLOBAL_NAMESPACE)
        } else {
            self.escape().segment(namespace.name())
        }
    }

    fn namespace_page(&self, namespace: &Namespace) -> PageStem {
        let segment = self.namespace_segment(namespace);
        match self.scheme {
            AddressingScheme::Hierarchical => PageStem {
                stem: format!("{segment}/{INDEX_NAME}"),
                index: true,
            },
            AddressingScheme::Flat | AddressingScheme::Wiki => PageStem {
                stem: segment.into_owned(),
                index: false,
            },
        }
    }

    fn type_page(&self, ty: &CodeElement) -> PageStem {
        let type_name = ty.type_name();
        let name = self.escape().segment(&type_name);
        let stem = match self.scheme {
            AddressingScheme::Hierarchical => {
                format!("{}/{}", self.namespace_segment(ty.namespace()), name)
            }
            _ if ty.namespace().is_global() => name.into_owned(),
            AddressingScheme::Flat | AddressingScheme::Wiki => {
                format!("{}.{}", self.namespace_segment(ty.namespace()), name)
            }
        };
        PageStem { stem, index: false }
    }

    // ========================================================================
    // Topics
    // ========================================================================

    pub fn try_resolve_topic_address(&self, topic: TopicNode<'_>) -> Option<ResourceAddress> {
        if self.scheme.nests_topics() {
            self.nested_topic_address(topic)
        } else {
            self.flat_topic_address(topic)
        }
    }

    /// Walk up the parent links, one directory per ancestor.
    ///
    /// A pinned ancestor replaces everything above it. A topic with children
    /// becomes the `index` page of its own directory.
    fn nested_topic_address(&self, topic: TopicNode<'_>) -> Option<ResourceAddress> {
        let index = topic.has_children();
        let mut segments = Vec::new();
        if index {
            segments.push(Cow::Borrowed(INDEX_NAME));
        }

        let mut pinned = None;
        let mut current = Some(topic);
        while let Some(node) = current {
            if let Some(path) = node.pinned_path().filter(|_| self.scheme.honors_pinned()) {
                pinned = Some(path);
                break;
            }
            segments.push(self.topic_segment(node)?);
            current = node.parent();
        }
        segments.reverse();

        let page = PageStem {
            stem: segments.join("/"),
            index,
        };
        match pinned {
            Some(path) => self.pinned_address(path, page),
            None => self.page_address(&page, None),
        }
    }

    fn flat_topic_address(&self, topic: TopicNode<'_>) -> Option<ResourceAddress> {
        if let Some(path) = topic.pinned_path().filter(|_| self.scheme.honors_pinned()) {
            return self.pinned_address(path, PageStem::default());
        }
        let page = PageStem {
            stem: self.topic_segment(topic)?.into_owned(),
            index: false,
        };
        self.page_address(&page, None)
    }

    fn topic_segment<'a>(&self, topic: TopicNode<'a>) -> Option<Cow<'a, str>> {
        let segment = match self.scheme {
            AddressingScheme::Hierarchical => self.escape().segment(topic.id().trim()),
            AddressingScheme::Flat => Cow::Owned(self.escape().segment(&ascii_slug(topic.id(), '-')).into_owned()),
            AddressingScheme::Wiki => {
                let name = if topic.title().trim().is_empty() {
                    topic.id()
                } else {
                    topic.title()
                };
                Cow::Owned(self.escape().segment(&collapse_whitespace(name, '-')).into_owned())
            }
        };
        (!matches!(segment.as_ref(), "" | "." | "..")).then_some(segment)
    }

    /// Address under a pinned path; `rest` is what lies below the pinned topic.
    fn pinned_address(&self, pinned: &str, rest: PageStem) -> Option<ResourceAddress> {
        let pinned = pinned.trim();
        if is_absolute(pinned) {
            // Pinned to another site: link there, nothing to write
            let url = if rest.stem.is_empty() {
                pinned.to_string()
            } else {
                combine(pinned, &self.page_url(&rest)).ok()?
            };
            return ResourceAddress::try_new(url, None);
        }

        let base = strip_leading_slash(pinned);
        let base = base.strip_suffix(self.file_extension.as_str()).unwrap_or(base);
        let page = if rest.stem.is_empty() {
            match base.strip_suffix('/') {
                Some(dir) => PageStem {
                    stem: format!("{dir}/{INDEX_NAME}"),
                    index: true,
                },
                None => PageStem {
                    stem: base.to_string(),
                    index: false,
                },
            }
        } else {
            PageStem {
                stem: format!("{}/{}", base.trim_end_matches('/'), rest.stem),
                index: rest.index,
            }
        };

        let stem = try_normalize_path(&page.stem)?;
        if stem.starts_with("..") {
            return None;
        }
        self.page_address(
            &PageStem {
                stem,
                index: page.index,
            },
            None,
        )
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// URL of a page, encoded for the scheme. Files keep the raw stem.
    fn page_url(&self, page: &PageStem) -> String {
        let url = if !self.omit_extension_in_urls {
            format!("{}{}", page.stem, self.file_extension)
        } else if page.index {
            page.stem
                .strip_suffix(INDEX_NAME)
                .unwrap_or(&page.stem)
                .to_string()
        } else {
            page.stem.clone()
        };
        if url.is_empty() {
            "./".to_string()
        } else {
            self.escape().url_path(&url).into_owned()
        }
    }

    fn page_address(&self, page: &PageStem, fragment: Option<&str>) -> Option<ResourceAddress> {
        if page.stem.is_empty() || page.stem.ends_with('/') {
            return None;
        }
        let file = format!("{}{}", page.stem, self.file_extension);
        let mut url = self.page_url(page);
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        ResourceAddress::try_new(url, Some(file))
    }
}

/// An extension starts with `.` and names at least one path-safe character.
fn validate_extension(extension: &str) -> Result<(), AddressError> {
    let valid = extension.len() > 1
        && extension.starts_with('.')
        && !extension.ends_with('.')
        && !extension
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#'));
    if valid {
        Ok(())
    } else {
        Err(AddressError::InvalidExtension(extension.to_string()))
    }
}
