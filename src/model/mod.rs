//! Documentation model contracts.
//!
//! | Module    | Purpose                                        |
//! |-----------|------------------------------------------------|
//! | `element` | Namespaces, types and members (API metadata)   |
//! | `topic`   | Conceptual topic hierarchy                     |
//!
//! Both are produced elsewhere (metadata reader, topic loader) and are
//! read-only here.

mod element;
mod topic;

use std::sync::Arc;

pub use element::{CodeElement, ElementFlags, ElementKind, Namespace, TypeKind};
pub use topic::{TopicId, TopicNode, TopicTree};

/// The entity a rendering scope belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeModel {
    Namespace(Namespace),
    Member(Arc<CodeElement>),
    Topic(TopicId),
    /// A standalone file (stylesheet, image) given by its site-relative path.
    Asset(String),
}

impl std::fmt::Display for ScopeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespace(ns) => write!(f, "{}", ns.signature()),
            Self::Member(member) => write!(f, "{member}"),
            Self::Topic(key) => write!(f, "topic {key:?}"),
            Self::Asset(path) => write!(f, "asset {path}"),
        }
    }
}
