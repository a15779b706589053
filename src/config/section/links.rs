//! `[links]` section configuration.
//!
//! How generated links are written.
//!
//! # Example
//!
//! ```toml
//! [links]
//! mode = "absolute"                        # relative | absolute
//! base_url = "https://docs.example.com/v2" # Required for absolute links
//! ```

use serde::{Deserialize, Serialize};

use crate::address::{AddressError, DocumentUrlContextManager};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Link style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Relative to the linking document (`../Foo.Bar/Baz.html`).
    #[default]
    Relative,
    /// Prefixed with `base_url`.
    Absolute,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub mode: LinkStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl LinksConfig {
    const BASE_URL: FieldPath = FieldPath::new("links.base_url");

    /// Scope manager for this link style.
    pub fn build_contexts(&self) -> Result<DocumentUrlContextManager, AddressError> {
        match self.mode {
            LinkStyle::Relative => Ok(DocumentUrlContextManager::relative()),
            LinkStyle::Absolute => {
                DocumentUrlContextManager::absolute(self.base_url.as_deref().unwrap_or_default())
            }
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match (self.mode, &self.base_url) {
            (LinkStyle::Absolute, None) => diag.error_with_hint(
                Self::BASE_URL,
                "required when mode = \"absolute\"",
                "for example \"https://docs.example.com/\"",
            ),
            (LinkStyle::Absolute, Some(_)) => {
                if let Err(err) = self.build_contexts() {
                    diag.error(Self::BASE_URL, err.to_string());
                }
            }
            (LinkStyle::Relative, Some(_)) => {
                diag.warn(Self::BASE_URL, "ignored unless mode = \"absolute\"");
            }
            (LinkStyle::Relative, None) => {}
        }
    }
}
