//! docaddr - addressing and URL resolution for generated API documentation.
//!
//! Decides where namespaces, types, members and conceptual topics live in a
//! generated site, and rewrites links so they are correct from whichever
//! document is being rendered.
//!
//! # Module Structure
//!
//! | Module    | Purpose                                                |
//! |-----------|--------------------------------------------------------|
//! | `address` | Strategies, scope stacks, provider facade, resolvers   |
//! | `config`  | `docaddr.toml` loading and validation                  |
//! | `core`    | `ResourceAddress`, `LinkKind`                          |
//! | `model`   | Code elements and the topic tree                       |
//! | `utils`   | URL path algebra and segment escaping                  |
//! | `logger`  | `log!` / `debug!` macros                               |
//!
//! # Example
//!
//! ```ignore
//! let config = SiteConfig::from_str(include_str!("docaddr.toml"))?;
//! let provider = config.build_provider()?;
//!
//! let _scope = provider.begin_scope("Other/", None)?;
//! provider.try_get_member_url(&member); // ../Foo.Bar/Baz.html#Qux
//! ```

#[macro_use]
pub mod logger;

pub mod address;
pub mod config;
pub mod core;
pub mod model;
pub mod utils;

pub use address::{
    AddressError, AddressingScheme, AddressingStrategy, DocumentAddressProvider,
    DocumentUrlContext, DocumentUrlContextManager, Granularity, PathToUrlMapper, ScopeHandle,
};
pub use config::SiteConfig;
pub use crate::core::{LinkKind, ResourceAddress};
