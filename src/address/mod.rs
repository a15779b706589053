//! Addressing engine: where documentation entities live and how documents
//! link to them.
//!
//! # Relationship with [`LinkKind`](crate::core::LinkKind)
//!
//! - [`LinkKind`](crate::core::LinkKind): **Syntactic** classification of raw links
//! - [`DocumentAddressProvider`]: **Semantic** resolution (needs the strategy and active scope)
//!
//! # Architecture
//!
//! ```text
//! CodeElement / Namespace / Topic
//!         |
//!         v
//! AddressingStrategy        ->  ResourceAddress { Foo.Bar/Baz.html#Qux, Foo.Bar/Baz.html }
//!         |
//!         v
//! active DocumentUrlContext ->  ../Foo.Bar/Baz.html#Qux      (document in Other/)
//! ```
//!
//! # Module Structure
//!
//! | Module        | Purpose                                             |
//! |---------------|-----------------------------------------------------|
//! | `strategy`    | Page layout schemes and per-site addressing knobs   |
//! | `granularity` | Which entity kinds get their own page               |
//! | `context`     | A rendering scope and its URL adjustment            |
//! | `manager`     | Per-flow scope stacks and RAII scope handles        |
//! | `external`    | Resolvers for entities documented on other sites    |
//! | `provider`    | Facade combining the above                          |
//! | `mapper`      | Legacy path to URL redirects                        |
//!
//! # Usage
//!
//! ```ignore
//! let provider = DocumentAddressProvider::new(strategy, DocumentUrlContextManager::relative());
//!
//! let _scope = provider.begin_scope("Other/", None)?;
//! let href = provider.try_get_member_url(&member); // ../Foo.Bar/Baz.html#Qux
//! ```

mod context;
mod error;
mod external;
mod granularity;
mod manager;
mod mapper;
mod provider;
mod strategy;

#[cfg(test)]
mod tests;

pub use context::{DirectoryMetadata, DocumentUrlContext, LinkMode};
pub use error::AddressError;
pub use external::{
    ExternalResolver, ID_PLACEHOLDER, NamespacePatterns, QUERY_PLACEHOLDER, SearchResolver,
    SiteResolver, TemplateResolver,
};
pub use granularity::Granularity;
pub use manager::{DocumentUrlContextManager, ScopeHandle};
pub use mapper::PathToUrlMapper;
pub use provider::DocumentAddressProvider;
pub use strategy::{AddressingScheme, AddressingStrategy, INDEX_NAME};
