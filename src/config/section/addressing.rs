//! `[addressing]` section configuration.
//!
//! Page layout of the generated site.
//!
//! # Example
//!
//! ```toml
//! [addressing]
//! scheme = "hierarchical"             # hierarchical | flat | wiki
//! extension = ".html"                 # Defaults to the scheme's extension
//! omit_extension = false              # Drop the extension from generated URLs
//! granularity = ["namespace", "type"] # Entity kinds with a page of their own
//! ```

use serde::{Deserialize, Serialize};

use crate::address::{AddressError, AddressingScheme, AddressingStrategy, Granularity};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Addressing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressingConfig {
    pub scheme: AddressingScheme,

    /// Output file extension. `None` uses the scheme's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    pub omit_extension: bool,

    /// Level names: `namespace`, `type`, `member`.
    pub granularity: Vec<String>,
}

impl Default for AddressingConfig {
    fn default() -> Self {
        Self {
            scheme: AddressingScheme::default(),
            extension: None,
            omit_extension: false,
            granularity: vec!["namespace".into(), "type".into()],
        }
    }
}

impl AddressingConfig {
    const EXTENSION: FieldPath = FieldPath::new("addressing.extension");
    const GRANULARITY: FieldPath = FieldPath::new("addressing.granularity");

    /// Combined granularity flags. Unknown names are skipped.
    pub fn granularity(&self) -> Granularity {
        self.granularity
            .iter()
            .filter_map(|name| Granularity::from_level(name))
            .fold(Granularity::empty(), |acc, level| acc | level)
    }

    pub fn build_strategy(&self) -> Result<AddressingStrategy, AddressError> {
        let mut strategy = AddressingStrategy::new(self.scheme)
            .with_granularity(self.granularity())
            .with_omitted_extension(self.omit_extension);
        if let Some(extension) = &self.extension {
            strategy.set_file_extension(extension.as_str())?;
        }
        Ok(strategy)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(extension) = &self.extension
            && let Err(err) = AddressingStrategy::new(self.scheme).with_file_extension(extension.as_str())
        {
            diag.error_with_hint(Self::EXTENSION, err.to_string(), "for example \".html\"");
        }

        for name in &self.granularity {
            if Granularity::from_level(name).is_none() {
                diag.error_with_hint(
                    Self::GRANULARITY,
                    format!("unknown level `{name}`"),
                    "expected `namespace`, `type` or `member`",
                );
            }
        }
        if self.granularity.is_empty() {
            diag.warn(Self::GRANULARITY, "empty, only topics get pages");
        }
    }
}
