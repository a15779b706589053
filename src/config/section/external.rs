//! `[[external]]` section configuration.
//!
//! Namespaces documented on other sites. Entries are tried in order and the
//! first one claiming a namespace produces its links.
//!
//! # Example
//!
//! ```toml
//! [[external]]
//! kind = "template"                                # template | site | search
//! namespaces = ["System.*", "Microsoft.*"]
//! url = "https://learn.microsoft.com/dotnet/api/{id}"
//!
//! [[external]]
//! kind = "site"
//! namespaces = ["Contoso"]
//! url = "https://contoso.example.com/api/"
//! addressing = { scheme = "flat" }                 # Layout of the other site
//!
//! [[external]]
//! kind = "search"
//! namespaces = ["*"]
//! url = "https://www.google.com/search?q={query}"
//! ```

use serde::{Deserialize, Serialize};

use super::AddressingConfig;
use crate::address::{
    AddressError, ExternalResolver, NamespacePatterns, SearchResolver, SiteResolver,
    TemplateResolver,
};
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// `url` is a template with an `{id}` placeholder.
    Template,
    /// `url` is the root of a site laid out per `addressing`.
    Site,
    /// `url` is a search template with a `{query}` placeholder.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalConfig {
    pub kind: ResolverKind,
    /// Claimed namespaces: exact names, `Prefix.*`, or `*`.
    pub namespaces: Vec<String>,
    pub url: String,
    /// Only read for `kind = "site"`.
    #[serde(default)]
    pub addressing: AddressingConfig,
}

impl ExternalConfig {
    const FIELD: FieldPath = FieldPath::new("external");

    pub fn build(&self) -> Result<Box<dyn ExternalResolver>, AddressError> {
        let patterns = NamespacePatterns::new(&self.namespaces)?;
        Ok(match self.kind {
            ResolverKind::Template => Box::new(TemplateResolver::new(patterns, self.url.as_str())?),
            ResolverKind::Search => Box::new(SearchResolver::new(patterns, self.url.as_str())?),
            ResolverKind::Site => Box::new(SiteResolver::new(
                patterns,
                &self.url,
                self.addressing.build_strategy()?,
            )?),
        })
    }

    /// Validate entry `index` (zero-based) of `[[external]]`.
    pub fn validate(&self, index: usize, diag: &mut ConfigDiagnostics) {
        let entry = index + 1;
        if self.namespaces.is_empty() {
            diag.error_with_hint(
                Self::FIELD,
                format!("entry {entry} claims no namespaces"),
                "add `namespaces = [\"*\"]` to claim everything",
            );
            return;
        }
        if let Err(err) = self.build() {
            diag.error(Self::FIELD, format!("entry {entry}: {err}"));
        }
        if self.kind != ResolverKind::Site && self.addressing != AddressingConfig::default() {
            diag.warn(Self::FIELD, format!("entry {entry}: `addressing` only applies to kind = \"site\""));
        }
    }
}
