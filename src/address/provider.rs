//! The addressing facade used by renderers.
//!
//! Combines the site's [`AddressingStrategy`], the scope manager and the
//! ordered external resolvers:
//!
//! ```text
//! try_get_member_url(M:System.String.Join)
//!     -> external resolver claims `System`  -> https://learn.microsoft.com/...
//! try_get_member_url(M:Foo.Bar.Baz.Qux)
//!     -> strategy: Foo.Bar/Baz.html#Qux
//!     -> active scope (Other/): ../Foo.Bar/Baz.html#Qux
//! ```

use std::sync::Arc;

use super::AddressError;
use super::context::DocumentUrlContext;
use super::external::ExternalResolver;
use super::manager::{DocumentUrlContextManager, ScopeHandle};
use super::strategy::AddressingStrategy;
use crate::core::{LinkKind, ResourceAddress};
use crate::model::{CodeElement, Namespace, ScopeModel, TopicNode};
use crate::utils::path::route::combine;

#[derive(Debug)]
pub struct DocumentAddressProvider {
    strategy: AddressingStrategy,
    contexts: DocumentUrlContextManager,
    resolvers: Vec<Box<dyn ExternalResolver>>,
}

impl DocumentAddressProvider {
    pub fn new(strategy: AddressingStrategy, contexts: DocumentUrlContextManager) -> Self {
        Self {
            strategy,
            contexts,
            resolvers: Vec::new(),
        }
    }

    /// Append an external resolver. Earlier resolvers win.
    pub fn with_resolver(mut self, resolver: impl ExternalResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn push_resolver(&mut self, resolver: Box<dyn ExternalResolver>) {
        self.resolvers.push(resolver);
    }

    #[inline]
    pub fn strategy(&self) -> &AddressingStrategy {
        &self.strategy
    }

    #[inline]
    pub fn contexts(&self) -> &DocumentUrlContextManager {
        &self.contexts
    }

    pub fn resolvers(&self) -> &[Box<dyn ExternalResolver>] {
        &self.resolvers
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Enter a document. See [`DocumentUrlContextManager::begin_scope`].
    pub fn begin_scope(
        &self,
        directory: &str,
        model: Option<ScopeModel>,
    ) -> Result<ScopeHandle<'_>, AddressError> {
        self.contexts.begin_scope(directory, model)
    }

    #[inline]
    pub fn active_scope(&self) -> Arc<DocumentUrlContext> {
        self.contexts.active_scope()
    }

    // ========================================================================
    // Site addresses (strategy only)
    // ========================================================================

    #[inline]
    pub fn try_resolve_namespace_address(&self, namespace: &Namespace) -> Option<ResourceAddress> {
        self.strategy.try_resolve_namespace_address(namespace)
    }

    #[inline]
    pub fn try_resolve_member_address(&self, member: &CodeElement) -> Option<ResourceAddress> {
        self.strategy.try_resolve_member_address(member)
    }

    #[inline]
    pub fn try_resolve_topic_address(&self, topic: TopicNode<'_>) -> Option<ResourceAddress> {
        self.strategy.try_resolve_topic_address(topic)
    }

    // ========================================================================
    // Links for the active document
    // ========================================================================

    fn external_for(&self, namespace: &Namespace) -> Option<&dyn ExternalResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.claims(namespace))
            .map(|resolver| resolver.as_ref())
    }

    pub fn try_get_namespace_url(&self, namespace: &Namespace) -> Option<String> {
        if let Some(resolver) = self.external_for(namespace) {
            let url = resolver.try_get_namespace_url(namespace);
            debug!("external"; "{} -> {}", namespace.signature(), url.as_deref().unwrap_or("(none)"));
            return url;
        }
        let Some(address) = self.strategy.try_resolve_namespace_address(namespace) else {
            debug!("resolve"; "no address for {}", namespace.signature());
            return None;
        };
        self.adjust_url(address.relative_url()).ok()
    }

    pub fn try_get_member_url(&self, member: &CodeElement) -> Option<String> {
        if let Some(resolver) = self.external_for(member.namespace()) {
            let url = resolver.try_get_member_url(member);
            debug!("external"; "{} -> {}", member, url.as_deref().unwrap_or("(none)"));
            return url;
        }
        let Some(address) = self.strategy.try_resolve_member_address(member) else {
            debug!("resolve"; "no address for {}", member);
            return None;
        };
        self.adjust_url(address.relative_url()).ok()
    }

    pub fn try_get_topic_url(&self, topic: TopicNode<'_>) -> Option<String> {
        let Some(address) = self.strategy.try_resolve_topic_address(topic) else {
            debug!("resolve"; "no address for topic `{}`", topic.id());
            return None;
        };
        self.adjust_url(address.relative_url()).ok()
    }

    /// Output file of a namespace page.
    pub fn try_get_namespace_file(&self, namespace: &Namespace) -> Option<String> {
        let address = self.strategy.try_resolve_namespace_address(namespace)?;
        address.standalone_file().map(str::to_string)
    }

    /// Output file of a type or member page. Members folded into their
    /// type's page have none.
    pub fn try_get_member_file(&self, member: &CodeElement) -> Option<String> {
        let address = self.strategy.try_resolve_member_address(member)?;
        address.standalone_file().map(str::to_string)
    }

    pub fn try_get_topic_file(&self, topic: TopicNode<'_>) -> Option<String> {
        let address = self.strategy.try_resolve_topic_address(topic)?;
        address.into_parts().1
    }

    /// Adjust a site-relative URL for the active document.
    pub fn adjust_url(&self, site_relative: &str) -> Result<String, AddressError> {
        let scope = self.active_scope();
        scope
            .resolve_url(site_relative)
            .map(|url| url.into_owned())
            .inspect_err(|err| debug!("resolve"; "cannot adjust `{}` from {}: {}", site_relative, scope, err))
    }

    /// Adjust a raw link written in the active document.
    ///
    /// External, fragment and query links are kept. `/rooted` links are
    /// site-relative; other paths are relative to the document's directory.
    /// Links escaping the site root resolve to `None`.
    pub fn resolve_link(&self, link: &str) -> Option<String> {
        let link = link.trim();
        let scope = self.active_scope();
        let site_relative = match LinkKind::parse(link) {
            LinkKind::External(_) | LinkKind::Fragment(_) | LinkKind::Query(_) => {
                return Some(link.to_string());
            }
            LinkKind::SiteRoot(path) => path.trim_start_matches(['/', '\\']).to_string(),
            LinkKind::FileRelative(path) => {
                let combined = combine(scope.directory(), path).ok()?;
                if combined == ".." || combined.starts_with("../") {
                    debug!("resolve"; "`{}` escapes the site root from {}", link, scope);
                    return None;
                }
                combined
            }
        };

        if site_relative.is_empty() {
            return Some(scope.root_url().to_string());
        }
        if site_relative.starts_with(['?', '#']) {
            // Site root with a query or fragment (`/?v=1`)
            return Some(format!("{}{}", scope.root_url(), site_relative));
        }
        scope.resolve_url(&site_relative).ok().map(|url| url.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::address::{AddressingScheme, Granularity};
    use crate::model::{ElementKind, TopicTree, TypeKind};

    fn provider() -> DocumentAddressProvider {
        DocumentAddressProvider::new(
            AddressingStrategy::new(AddressingScheme::Hierarchical),
            DocumentUrlContextManager::relative(),
        )
    }

    fn baz() -> Arc<CodeElement> {
        Arc::new(CodeElement::new_type("Foo.Bar", "Baz", TypeKind::Class))
    }

    #[test]
    fn test_member_url_follows_scope() {
        let provider = provider();
        let qux = CodeElement::member(&baz(), ElementKind::Method, "Qux");
        assert_eq!(provider.try_get_member_url(&qux).as_deref(), Some("Foo.Bar/Baz.html#Qux"));

        let _scope = provider.begin_scope("Other/", None).unwrap();
        assert_eq!(
            provider.try_get_member_url(&qux).as_deref(),
            Some("../Foo.Bar/Baz.html#Qux")
        );
    }

    #[test]
    fn test_file_lookups() {
        let provider = provider();
        let baz = baz();
        let qux = CodeElement::member(&baz, ElementKind::Method, "Qux");
        assert_eq!(provider.try_get_member_file(&baz).as_deref(), Some("Foo.Bar/Baz.html"));
        assert_eq!(provider.try_get_member_file(&qux), None);
        assert_eq!(
            provider.try_get_namespace_file(baz.namespace()).as_deref(),
            Some("Foo.Bar/index.html")
        );

        let per_member = DocumentAddressProvider::new(
            AddressingStrategy::default().with_granularity(Granularity::all()),
            DocumentUrlContextManager::relative(),
        );
        assert_eq!(
            per_member.try_get_member_file(&qux).as_deref(),
            Some("Foo.Bar/Baz/Qux.html")
        );
    }

    #[test]
    fn test_topic_lookups() {
        let provider = provider();
        let mut tree = TopicTree::new();
        let guide = tree.add_root("guide", "Guide");
        let intro = tree.add_child(guide, "intro", "Introduction").unwrap();

        let _scope = provider.begin_scope("guide", None).unwrap();
        let intro = tree.get(intro).unwrap();
        assert_eq!(provider.try_get_topic_url(intro).as_deref(), Some("intro.html"));
        assert_eq!(provider.try_get_topic_file(intro).as_deref(), Some("guide/intro.html"));
        assert_eq!(
            provider.try_get_topic_url(tree.get(guide).unwrap()).as_deref(),
            Some("index.html")
        );
    }

    #[test]
    fn test_resolve_link() {
        let provider = provider();
        let _scope = provider.begin_scope("a/b", None).unwrap();

        assert_eq!(provider.resolve_link("https://x.com/y").as_deref(), Some("https://x.com/y"));
        assert_eq!(provider.resolve_link("#top").as_deref(), Some("#top"));
        assert_eq!(provider.resolve_link("?v=2").as_deref(), Some("?v=2"));
        assert_eq!(provider.resolve_link("/a/c.html").as_deref(), Some("../c.html"));
        assert_eq!(provider.resolve_link("/").as_deref(), Some("../../"));
        assert_eq!(provider.resolve_link("img/x.png").as_deref(), Some("img/x.png"));
        assert_eq!(provider.resolve_link("../x.png").as_deref(), Some("../x.png"));
        assert_eq!(provider.resolve_link("../../../x.png"), None);
        assert_eq!(provider.resolve_link("/?v=1").as_deref(), Some("../../?v=1"));
    }

    #[test]
    fn test_resolve_link_from_root() {
        let provider = provider();
        assert_eq!(provider.resolve_link("/").as_deref(), Some("./"));
        assert_eq!(provider.resolve_link("./").as_deref(), Some("./"));
        assert_eq!(provider.resolve_link("../x.png"), None);
        assert_eq!(provider.resolve_link(".."), None);
        assert_eq!(provider.resolve_link("..notes.png").as_deref(), Some("..notes.png"));
        assert_eq!(provider.resolve_link("..drafts/a.md").as_deref(), Some("..drafts/a.md"));
    }

    #[test]
    fn test_adjust_url() {
        let provider = provider();
        let _scope = provider.begin_scope("x", None).unwrap();
        assert_eq!(provider.adjust_url("css/site.css").unwrap(), "../css/site.css");
        assert!(provider.adjust_url("../../etc").is_err());
    }
}
