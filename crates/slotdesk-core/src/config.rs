//! Slot Desk configuration
//!
//! Loaded from a TOML file, then overridden from `SLOTDESK_*` environment
//! variables. Every field has a default.

use crate::error::SlotError;
use crate::presets::SlotPresets;
use crate::session::SLOT_LIMIT_PAGE_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `api_base_url`
pub const ENV_API_BASE_URL: &str = "SLOTDESK_API_BASE_URL";
/// Environment variable overriding `page_id`
pub const ENV_PAGE_ID: &str = "SLOTDESK_PAGE_ID";
/// Environment variable overriding `request_timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "SLOTDESK_TIMEOUT_SECS";

/// Slot Desk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotDeskConfig {
    /// Base URL of the admissions service, without the `/api` prefix
    pub api_base_url: String,
    /// Page id checked by the access gate
    pub page_id: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Preset max-slots options
    pub presets: SlotPresets,
}

impl SlotDeskConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With service base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With page id
    #[inline]
    #[must_use]
    pub fn with_page_id(mut self, page_id: u32) -> Self {
        self.page_id = page_id;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - `SlotError::Config` on malformed TOML or invalid values
    pub fn from_toml_str(text: &str) -> Result<Self, SlotError> {
        let config: Self =
            toml::from_str(text).map_err(|e| SlotError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `SlotError::Config` if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, SlotError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SlotError::Config(format!("cannot read {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Apply overrides from a variable lookup
    ///
    /// # Errors
    /// - `SlotError::Config` if an override is not a valid value
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, SlotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_PAGE_ID) {
            self.page_id = raw
                .trim()
                .parse()
                .map_err(|_| SlotError::Config(format!("{ENV_PAGE_ID} is not a number: {raw:?}")))?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                SlotError::Config(format!("{ENV_TIMEOUT_SECS} is not a number: {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    /// - `SlotError::Config` if an override is not a valid value
    pub fn apply_env(self) -> Result<Self, SlotError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Check values are usable
    ///
    /// # Errors
    /// - `SlotError::Config` naming the first invalid field
    pub fn validate(&self) -> Result<(), SlotError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SlotError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(SlotError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if !self.presets.is_valid() {
            return Err(SlotError::Config(format!(
                "invalid preset range {:?}",
                self.presets
            )));
        }
        Ok(())
    }
}

impl Default for SlotDeskConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            page_id: SLOT_LIMIT_PAGE_ID,
            request_timeout_secs: 15,
            presets: SlotPresets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SlotDeskConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_id, 110);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = SlotDeskConfig::from_toml_str(
            r#"
            api_base_url = "https://admissions.example.edu"

            [presets]
            step = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://admissions.example.edu");
        assert_eq!(config.page_id, 110);
        assert_eq!(config.presets, SlotPresets::new(10, 500, 5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SlotDeskConfig::from_toml_str("api_base_url = \"ftp://x\"").is_err());
        assert!(SlotDeskConfig::from_toml_str("request_timeout_secs = 0").is_err());
        assert!(SlotDeskConfig::from_toml_str("page_id = \"abc\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_BASE_URL, "http://10.0.0.5:5000"),
            (ENV_PAGE_ID, "111"),
        ]
        .into_iter()
        .collect();

        let config = SlotDeskConfig::new()
            .apply_overrides(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "http://10.0.0.5:5000");
        assert_eq!(config.page_id, 111);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn bad_override_is_reported() {
        let err = SlotDeskConfig::new()
            .apply_overrides(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 30").unwrap();

        let config = SlotDeskConfig::load(file.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 30);

        let missing = SlotDeskConfig::load(Path::new("/nonexistent/slotdesk.toml"));
        assert!(matches!(missing, Err(SlotError::Config(_))));
    }
}
