//! Configuration section definitions.
//!
//! Each module corresponds to a section in `docaddr.toml`:
//!
//! | Module       | TOML Section     | Purpose                              |
//! |--------------|------------------|--------------------------------------|
//! | `addressing` | `[addressing]`   | Page layout scheme and granularity   |
//! | `links`      | `[links]`        | Relative or absolute links           |
//! | `external`   | `[[external]]`   | Namespaces documented elsewhere      |
//!
//! Redirects (`[redirects]`) are a plain table and live on
//! [`SiteConfig`](super::SiteConfig).

mod addressing;
mod external;
mod links;

pub use addressing::AddressingConfig;
pub use external::{ExternalConfig, ResolverKind};
pub use links::{LinkStyle, LinksConfig};
