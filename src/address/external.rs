//! External resolvers: references that live on another site.
//!
//! A resolver claims a set of namespaces (by pattern) and builds absolute
//! URLs for them. The provider asks resolvers in order; the first one that
//! claims a namespace owns every lookup in it.
//!
//! | Resolver           | Target                         | Example                                        |
//! |--------------------|--------------------------------|------------------------------------------------|
//! | [`TemplateResolver`] | vendor reference docs        | `https://learn.microsoft.com/dotnet/api/{id}`  |
//! | [`SiteResolver`]     | another site with a known layout | `https://other.example.com/api/`           |
//! | [`SearchResolver`]   | search engine query          | `https://search.example.com/?q={query}`        |

use std::fmt;

use dashmap::DashMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use url::Url;

use super::AddressError;
use super::context::parse_base_url;
use super::strategy::AddressingStrategy;
use crate::model::{CodeElement, ElementKind, Namespace};
use crate::utils::path::route::combine;

/// Placeholder for the vendor id in [`TemplateResolver`] URLs.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Placeholder for the search terms in [`SearchResolver`] URLs.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Query components keep unreserved characters only.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Resolves references that are documented elsewhere.
pub trait ExternalResolver: Send + Sync + fmt::Debug {
    /// Whether this resolver owns `namespace`.
    fn claims(&self, namespace: &Namespace) -> bool;

    /// Absolute URL of a namespace page.
    fn try_get_namespace_url(&self, namespace: &Namespace) -> Option<String>;

    /// Absolute URL of a type or member.
    fn try_get_member_url(&self, member: &CodeElement) -> Option<String>;
}

// ============================================================================
// Namespace patterns
// ============================================================================

/// Set of namespace patterns.
///
/// - `System.IO` matches exactly that namespace
/// - `System.*` matches `System` and every namespace below it
/// - `*` matches everything, the global namespace included
#[derive(Debug, Clone)]
pub struct NamespacePatterns {
    patterns: Vec<String>,
    regex: Option<Regex>,
}

impl NamespacePatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .collect();
        if patterns.is_empty() {
            return Ok(Self {
                patterns,
                regex: None,
            });
        }

        let alternatives = patterns
            .iter()
            .map(|p| Self::compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        let source = format!("^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&source).map_err(|_| AddressError::InvalidPattern(source))?;
        Ok(Self {
            patterns,
            regex: Some(regex),
        })
    }

    fn compile(pattern: &str) -> Result<String, AddressError> {
        let invalid = || AddressError::InvalidPattern(pattern.to_string());
        if pattern == "*" {
            return Ok(".*".to_string());
        }
        let (prefix, descendants) = match pattern.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (pattern, false),
        };
        if prefix.is_empty()
            || prefix.contains('*')
            || prefix.starts_with('.')
            || prefix.ends_with('.')
            || prefix.contains(char::is_whitespace)
        {
            return Err(invalid());
        }
        let escaped = regex::escape(prefix);
        Ok(if descendants {
            format!(r"{escaped}(?:\..+)?")
        } else {
            escaped
        })
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(namespace))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

// ============================================================================
// URL cache
// ============================================================================

/// Memoized lookups, keyed by documentation id.
///
/// Racing writers compute the same value; the last insert wins.
#[derive(Debug, Default)]
struct UrlCache {
    urls: DashMap<String, Option<String>>,
}

impl UrlCache {
    fn get_or_insert_with(&self, key: String, compute: impl FnOnce() -> Option<String>) -> Option<String> {
        if let Some(hit) = self.urls.get(&key) {
            return hit.value().clone();
        }
        let url = compute();
        self.urls.insert(key, url.clone());
        url
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Dotted display name of an element without parameters.
///
/// Enum values name their enum type; constructors are `-ctor` and explicit
/// interface implementations join with `-` (`Baz.System-IDisposable-Dispose`).
fn member_name(member: &CodeElement) -> String {
    let mut name = member.full_type_name();
    if member.is_type() || member.is_enum_value() {
        return name;
    }
    name.push('.');
    match member.kind() {
        ElementKind::Constructor => name.push_str("-ctor"),
        _ if member.is_explicit_interface_impl() => name.push_str(&member.name().replace('.', "-")),
        _ => name.push_str(member.name()),
    }
    name
}

// ============================================================================
// Template resolver
// ============================================================================

/// Vendor documentation addressed by a lowercase id (`system.string.join`).
#[derive(Debug)]
pub struct TemplateResolver {
    patterns: NamespacePatterns,
    template: String,
    cache: UrlCache,
}

impl TemplateResolver {
    /// `template` must contain [`ID_PLACEHOLDER`].
    pub fn new(patterns: NamespacePatterns, template: impl Into<String>) -> Result<Self, AddressError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(AddressError::InvalidTemplate(template, ID_PLACEHOLDER));
        }
        Ok(Self {
            patterns,
            template,
            cache: UrlCache::default(),
        })
    }

    fn expand(&self, name: &str) -> String {
        let id = name.replace('`', "-").to_lowercase();
        self.template.replace(ID_PLACEHOLDER, &id)
    }
}

impl ExternalResolver for TemplateResolver {
    fn claims(&self, namespace: &Namespace) -> bool {
        self.patterns.matches(namespace.name())
    }

    fn try_get_namespace_url(&self, namespace: &Namespace) -> Option<String> {
        if namespace.is_global() {
            return None;
        }
        self.cache
            .get_or_insert_with(namespace.signature(), || Some(self.expand(namespace.name())))
    }

    fn try_get_member_url(&self, member: &CodeElement) -> Option<String> {
        self.cache
            .get_or_insert_with(member.signature(), || Some(self.expand(&member_name(member))))
    }
}

// ============================================================================
// Site resolver
// ============================================================================

/// Another documentation site with a known addressing strategy.
#[derive(Debug)]
pub struct SiteResolver {
    patterns: NamespacePatterns,
    base: Url,
    strategy: AddressingStrategy,
    cache: UrlCache,
}

impl SiteResolver {
    pub fn new(
        patterns: NamespacePatterns,
        base_url: &str,
        strategy: AddressingStrategy,
    ) -> Result<Self, AddressError> {
        Ok(Self {
            patterns,
            base: parse_base_url(base_url)?,
            strategy,
            cache: UrlCache::default(),
        })
    }

    fn absolute(&self, relative_url: &str) -> Option<String> {
        combine(self.base.as_str(), relative_url).ok()
    }
}

impl ExternalResolver for SiteResolver {
    fn claims(&self, namespace: &Namespace) -> bool {
        self.patterns.matches(namespace.name())
    }

    fn try_get_namespace_url(&self, namespace: &Namespace) -> Option<String> {
        self.cache.get_or_insert_with(namespace.signature(), || {
            let address = self.strategy.try_resolve_namespace_address(namespace)?;
            self.absolute(address.relative_url())
        })
    }

    fn try_get_member_url(&self, member: &CodeElement) -> Option<String> {
        self.cache.get_or_insert_with(member.signature(), || {
            let address = self.strategy.try_resolve_member_address(member)?;
            self.absolute(address.relative_url())
        })
    }
}

// ============================================================================
// Search resolver
// ============================================================================

/// Falls back to a search engine query for the full name.
#[derive(Debug)]
pub struct SearchResolver {
    patterns: NamespacePatterns,
    template: String,
}

impl SearchResolver {
    /// `template` must contain [`QUERY_PLACEHOLDER`].
    pub fn new(patterns: NamespacePatterns, template: impl Into<String>) -> Result<Self, AddressError> {
        let template = template.into();
        if !template.contains(QUERY_PLACEHOLDER) {
            return Err(AddressError::InvalidTemplate(template, QUERY_PLACEHOLDER));
        }
        Ok(Self { patterns, template })
    }

    fn expand(&self, terms: &str) -> String {
        let query = utf8_percent_encode(terms, QUERY).to_string();
        self.template.replace(QUERY_PLACEHOLDER, &query)
    }
}

impl ExternalResolver for SearchResolver {
    fn claims(&self, namespace: &Namespace) -> bool {
        self.patterns.matches(namespace.name())
    }

    fn try_get_namespace_url(&self, namespace: &Namespace) -> Option<String> {
        (!namespace.is_global()).then(|| self.expand(namespace.name()))
    }

    fn try_get_member_url(&self, member: &CodeElement) -> Option<String> {
        Some(self.expand(&member_name(member)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::address::strategy::AddressingScheme;
    use crate::model::{ElementFlags, TypeKind};

    fn patterns(list: &[&str]) -> NamespacePatterns {
        NamespacePatterns::new(list).unwrap()
    }

    fn string_type() -> Arc<CodeElement> {
        Arc::new(CodeElement::new_type("System", "String", TypeKind::Class))
    }

    #[test]
    fn test_patterns() {
        let p = patterns(&["System.*", "Newtonsoft.Json"]);
        assert!(p.matches("System"));
        assert!(p.matches("System.Collections.Generic"));
        assert!(!p.matches("SystemX"));
        assert!(!p.matches("MySystem.IO"));
        assert!(p.matches("Newtonsoft.Json"));
        assert!(!p.matches("Newtonsoft.Json.Linq"));
        assert!(!p.matches(""));

        let all = patterns(&["*"]);
        assert!(all.matches("Anything.At.All"));
        assert!(all.matches(""));

        assert!(!NamespacePatterns::new(Vec::<String>::new()).unwrap().matches("System"));
    }

    #[test]
    fn test_patterns_escape_regex_syntax() {
        let p = patterns(&["A+B"]);
        assert!(p.matches("A+B"));
        assert!(!p.matches("AAB"));
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in ["", "Sys*", "*.IO", "System.", ".System", "A B"] {
            assert_eq!(
                NamespacePatterns::new([bad]).unwrap_err(),
                AddressError::InvalidPattern(bad.to_string()),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_template_resolver() {
        let resolver = TemplateResolver::new(
            patterns(&["System.*"]),
            "https://learn.microsoft.com/dotnet/api/{id}",
        )
        .unwrap();
        let string = string_type();
        assert!(resolver.claims(string.namespace()));

        let join = CodeElement::member(&string, ElementKind::Method, "Join")
            .with_parameters("System.String,System.String[]");
        assert_eq!(
            resolver.try_get_member_url(&join).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.string.join")
        );
        assert_eq!(
            resolver.try_get_member_url(&string).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.string")
        );

        let list = CodeElement::new_type("System.Collections.Generic", "List`1", TypeKind::Class);
        assert_eq!(
            resolver.try_get_member_url(&list).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.collections.generic.list-1")
        );

        let ctor = CodeElement::member(&string, ElementKind::Constructor, ".ctor");
        assert_eq!(
            resolver.try_get_member_url(&ctor).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.string.-ctor")
        );

        assert_eq!(
            resolver.try_get_namespace_url(&Namespace::new("System.IO")).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.io")
        );
    }

    #[test]
    fn test_template_requires_placeholder() {
        let err = TemplateResolver::new(patterns(&["*"]), "https://example.com/").unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidTemplate("https://example.com/".into(), ID_PLACEHOLDER)
        );
    }

    #[test]
    fn test_template_cache() {
        let resolver = TemplateResolver::new(patterns(&["*"]), "https://x.com/{id}").unwrap();
        let string = string_type();
        let first = resolver.try_get_member_url(&string);
        let second = resolver.try_get_member_url(&string);
        assert_eq!(first, second);
        assert_eq!(resolver.cache.len(), 1);
    }

    #[test]
    fn test_explicit_interface_and_enum_names() {
        let string = string_type();
        let dispose = CodeElement::member(&string, ElementKind::Method, "System.IDisposable.Dispose")
            .with_flags(ElementFlags::EXPLICIT_INTERFACE_IMPL);
        assert_eq!(member_name(&dispose), "System.String.System-IDisposable-Dispose");

        let kind = Arc::new(CodeElement::new_type("System", "StringComparison", TypeKind::Enum));
        let ordinal = CodeElement::member(&kind, ElementKind::Field, "Ordinal");
        assert_eq!(member_name(&ordinal), "System.StringComparison");
    }

    #[test]
    fn test_site_resolver() {
        let strategy = AddressingStrategy::new(AddressingScheme::Flat);
        let resolver = SiteResolver::new(
            patterns(&["Contoso.*"]),
            "https://contoso.example.com/api",
            strategy,
        )
        .unwrap();
        let widget = Arc::new(CodeElement::new_type("Contoso.Ui", "Widget", TypeKind::Class));
        assert!(resolver.claims(widget.namespace()));
        assert!(!resolver.claims(&Namespace::new("System")));

        assert_eq!(
            resolver.try_get_member_url(&widget).as_deref(),
            Some("https://contoso.example.com/api/Contoso.Ui.Widget.html")
        );
        let render = CodeElement::member(&widget, ElementKind::Method, "Render");
        assert_eq!(
            resolver.try_get_member_url(&render).as_deref(),
            Some("https://contoso.example.com/api/Contoso.Ui.Widget.html#Render")
        );
        assert_eq!(
            resolver.try_get_namespace_url(widget.namespace()).as_deref(),
            Some("https://contoso.example.com/api/Contoso.Ui.html")
        );

        assert!(SiteResolver::new(patterns(&["*"]), "not a url", AddressingStrategy::default()).is_err());
    }

    #[test]
    fn test_search_resolver() {
        let resolver = SearchResolver::new(patterns(&["*"]), "https://search.example.com/?q={query}").unwrap();
        let string = string_type();
        let format = CodeElement::member(&string, ElementKind::Method, "Format");
        assert_eq!(
            resolver.try_get_member_url(&format).as_deref(),
            Some("https://search.example.com/?q=System.String.Format")
        );
        let list = CodeElement::new_type("System.Collections.Generic", "List`1", TypeKind::Class);
        assert_eq!(
            resolver.try_get_member_url(&list).as_deref(),
            Some("https://search.example.com/?q=System.Collections.Generic.List%601")
        );
        assert_eq!(resolver.try_get_namespace_url(&Namespace::global()), None);
        assert!(SearchResolver::new(patterns(&["*"]), "https://search.example.com/").is_err());
    }
}
