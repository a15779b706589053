//! Site configuration management for `docaddr.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── addressing # [addressing]
//! │   ├── links      # [links]
//! │   └── external   # [[external]]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                         |
//! |------------------|-------------------------------------------------|
//! | `[addressing]`   | Layout scheme, extension, granularity           |
//! | `[links]`        | Relative or absolute links, base url            |
//! | `[[external]]`   | Ordered resolvers for foreign namespaces        |
//! | `[redirects]`    | Legacy paths mapped to their new URLs           |

pub mod section;
pub mod types;
mod util;

pub use util::find_config_file;

pub use section::{
    AddressingConfig, ExternalConfig, LinkStyle, LinksConfig, ResolverKind,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::address::{AddressingStrategy, DocumentAddressProvider, PathToUrlMapper};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing docaddr.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub addressing: AddressingConfig,

    #[serde(default)]
    pub links: LinksConfig,

    /// Tried in order; the first claiming resolver wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<ExternalConfig>,

    /// Old path -> new URL.
    #[serde(default)]
    pub redirects: BTreeMap<String, String>,
}

impl SiteConfig {
    const REDIRECTS: FieldPath = FieldPath::new("redirects");

    /// Search upward from cwd for `config_name`, load and validate it.
    ///
    /// A missing file yields the default configuration.
    pub fn load(config_name: &Path) -> Result<Self, ConfigError> {
        let Some(path) = find_config_file(config_name) else {
            debug!("config"; "`{}` not found, using defaults", config_name.display());
            return Ok(Self::default());
        };
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate every section.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.addressing.validate(&mut diag);
        self.links.validate(&mut diag);
        for (index, external) in self.external.iter().enumerate() {
            external.validate(index, &mut diag);
        }
        self.validate_redirects(&mut diag);

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    fn validate_redirects(&self, diag: &mut ConfigDiagnostics) {
        let mut seen = FxHashSet::default();
        for (path, url) in &self.redirects {
            let key = path.trim().to_lowercase();
            if key.is_empty() {
                diag.error(Self::REDIRECTS, "empty source path");
            } else if !seen.insert(key) {
                diag.error_with_hint(
                    Self::REDIRECTS,
                    format!("`{path}` is mapped twice"),
                    "source paths are case-insensitive",
                );
            }
            if url.trim().is_empty() {
                diag.error(Self::REDIRECTS, format!("`{path}` maps to an empty url"));
            }
        }
    }

    // ========================================================================
    // engine construction
    // ========================================================================

    pub fn build_strategy(&self) -> Result<AddressingStrategy, ConfigError> {
        Ok(self.addressing.build_strategy()?)
    }

    /// Provider with this site's strategy, link style and external resolvers.
    pub fn build_provider(&self) -> Result<DocumentAddressProvider, ConfigError> {
        let mut provider =
            DocumentAddressProvider::new(self.build_strategy()?, self.links.build_contexts()?);
        for external in &self.external {
            provider.push_resolver(external.build()?);
        }
        debug!(
            "config";
            "{:?} addressing, {} external resolvers",
            provider.strategy().scheme(),
            provider.resolvers().len()
        );
        Ok(provider)
    }

    pub fn build_mapper(&self) -> Result<PathToUrlMapper, ConfigError> {
        let mapper = PathToUrlMapper::new();
        for (path, url) in &self.redirects {
            mapper.add(path, url.as_str())?;
        }
        Ok(mapper)
    }
}

/// Parse a test config, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AddressError, AddressingScheme};
    use crate::model::{CodeElement, ElementKind, TypeKind};
    use std::sync::Arc;

    const FULL: &str = r#"
[addressing]
scheme = "flat"
granularity = ["namespace", "type", "member"]

[links]
mode = "absolute"
base_url = "https://docs.example.com/"

[[external]]
kind = "template"
namespaces = ["System.*"]
url = "https://learn.microsoft.com/dotnet/api/{id}"

[redirects]
"docs/old-page" = "guide/new-page.html"
"#;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[addressing\nscheme = \"flat\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let result = SiteConfig::from_str("[addressing]\nscheme = \"tree\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.addressing.scheme, AddressingScheme::Hierarchical);
        assert_eq!(config.links.mode, LinkStyle::Relative);
        assert!(config.external.is_empty());
        assert!(config.redirects.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[addressing]\nscheme = \"wiki\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.addressing.scheme, AddressingScheme::Wiki);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = SiteConfig::parse_with_ignored(FULL).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_build_provider() {
        let config = test_parse_config(FULL);
        config.validate().unwrap();
        let provider = config.build_provider().unwrap();

        let baz = Arc::new(CodeElement::new_type("Foo.Bar", "Baz", TypeKind::Class));
        let qux = CodeElement::member(&baz, ElementKind::Method, "Qux");
        assert_eq!(
            provider.try_get_member_url(&qux).as_deref(),
            Some("https://docs.example.com/Foo.Bar.Baz.Qux.html")
        );

        let string = CodeElement::new_type("System", "String", TypeKind::Class);
        assert_eq!(
            provider.try_get_member_url(&string).as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.string")
        );
    }

    #[test]
    fn test_build_mapper() {
        let config = test_parse_config(FULL);
        let mapper = config.build_mapper().unwrap();
        assert_eq!(mapper.len(), 1);
        assert_eq!(
            mapper.try_get_url("Docs/Old-Page.html").as_deref(),
            Some("guide/new-page.html")
        );
    }

    #[test]
    fn test_redirects_case_collision() {
        let config = test_parse_config(
            r#"
[redirects]
"a/B" = "x.html"
"a/b" = "y.html"
"#,
        );
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 1);
        assert!(matches!(
            config.build_mapper(),
            Err(ConfigError::Address(AddressError::DuplicateMapping(_)))
        ));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            r#"
[addressing]
extension = "html"

[links]
mode = "absolute"

[[external]]
kind = "search"
namespaces = ["Contoso"]
url = "https://search.example.com/"
"#,
        );
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docaddr.toml");
        fs::write(&path, "[addressing]\nscheme = \"wiki\"\n").unwrap();

        let config = SiteConfig::from_path(&path).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.build_strategy().unwrap().file_extension(), ".md");

        let missing = SiteConfig::from_path(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }
}
