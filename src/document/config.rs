//! Document configuration loaded from TOML.

use super::{DocumentMode, Version};
use crate::error::{FoliaError, FoliaResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable forcing text consistency checks on or off.
pub const TEXT_CHECK_ENV: &str = "FOLIA_TEXT_CHECK";

/// Options for reading and writing documents.
///
/// ```
/// use layered_folia::{DocumentConfig, DocumentMode};
///
/// let config = DocumentConfig::from_toml_str("permissive = true\ncheck_text = false").unwrap();
/// let mode = config.mode_for(&"2.5.0".parse().unwrap());
/// assert!(mode.contains(DocumentMode::PERMISSIVE));
/// assert!(!mode.contains(DocumentMode::CHECK_TEXT));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Log and drop unsupported attributes.
    pub permissive: bool,
    /// Leave generator and datetimes out of the output.
    pub strip: bool,
    /// Canonical ordering of declarations and children on output.
    pub canonical: bool,
    /// Force text checking on or off; `None` follows the environment and
    /// the document version.
    pub check_text: Option<bool>,
    /// Repair inconsistent text instead of failing.
    pub fix_text: bool,
    /// Declare unknown sets on first use even for current documents.
    pub autodeclare: bool,
    /// Write attributes that equal their declared defaults.
    pub explicit: bool,
}

impl DocumentConfig {
    pub fn from_toml_str(input: &str) -> FoliaResult<DocumentConfig> {
        toml::from_str(input).map_err(|err| FoliaError::value(format!("invalid document config: {}", err)))
    }

    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> FoliaResult<DocumentConfig> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> FoliaResult<String> {
        toml::to_string(self).map_err(|err| FoliaError::value(format!("cannot write document config: {}", err)))
    }

    /// Mode flags for a document of `version`.
    ///
    /// Text checking defaults to on from version 1.5; autodeclare is always
    /// on for legacy (pre-2.0) documents.
    pub fn mode_for(&self, version: &Version) -> DocumentMode {
        self.mode_with_override(version, text_check_override())
    }

    fn mode_with_override(&self, version: &Version, text_check: Option<bool>) -> DocumentMode {
        let mut mode = DocumentMode::empty();
        mode.set(DocumentMode::PERMISSIVE, self.permissive);
        mode.set(DocumentMode::STRIP, self.strip);
        mode.set(DocumentMode::CANONICAL, self.canonical);
        mode.set(DocumentMode::FIX_TEXT, self.fix_text);
        mode.set(DocumentMode::EXPLICIT, self.explicit);
        mode.set(
            DocumentMode::AUTODECLARE,
            self.autodeclare || version.is_legacy(),
        );
        let check_text = self
            .check_text
            .or(text_check)
            .unwrap_or(*version >= Version::new(1, 5, 0));
        mode.set(DocumentMode::CHECK_TEXT, check_text);
        mode
    }
}

/// Value of [`TEXT_CHECK_ENV`], if set to a recognised boolean.
pub fn text_check_override() -> Option<bool> {
    boolean_from_env(TEXT_CHECK_ENV)
}

fn boolean_from_env(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" => Some(true),
        "0" | "no" | "false" => Some(false),
        other => {
            log::warn!("ignoring {}={}: expected yes/no", name, other);
            None
        }
    }
}
