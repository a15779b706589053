//! Core types - pure abstractions shared across the codebase.

mod address;
mod link;

pub use address::ResourceAddress;
pub use link::LinkKind;
