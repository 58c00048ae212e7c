use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TempoError;
use crate::types::RenderMode;

/// Top-level configuration loaded from `.tempo.toml`.
///
/// Supports layered resolution: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use tempo_core::TempoConfig;
///
/// let config = TempoConfig::default();
/// assert_eq!(config.diagnostics.histogram_bins, 20);
/// assert_eq!(config.input.delimiter, ',');
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempoConfig {
    /// CSV reading options.
    #[serde(default)]
    pub input: InputConfig,
    /// Diagnostic computation options.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Plot presentation options.
    #[serde(default)]
    pub render: RenderConfig,
}

impl TempoConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Io`] if the file cannot be read,
    /// [`TempoError::Toml`] if the content is not valid TOML, or
    /// [`TempoError::Config`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, TempoError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo_core::TempoConfig;
    ///
    /// let toml = r#"
    /// [diagnostics]
    /// histogram_bins = 10
    /// "#;
    /// let config = TempoConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.diagnostics.histogram_bins, 10);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, TempoError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), TempoError> {
        if self.diagnostics.histogram_bins == 0 {
            return Err(TempoError::Config(
                "diagnostics.histogram_bins must be at least 1".into(),
            ));
        }
        if !self.input.delimiter.is_ascii() {
            return Err(TempoError::Config(format!(
                "input.delimiter must be a single ASCII character, got {:?}",
                self.input.delimiter
            )));
        }
        Ok(())
    }
}

/// CSV reading options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter (default: `,`).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Trim whitespace around every cell (default: true).
    #[serde(default = "default_trim")]
    pub trim: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_trim() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            trim: default_trim(),
        }
    }
}

/// Diagnostic computation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Number of equal-width bins in the residual histogram (default: 20).
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_histogram_bins() -> usize {
    20
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
        }
    }
}

/// Plot presentation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Backend selection (default: `auto`).
    #[serde(default)]
    pub mode: RenderMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = TempoConfig::default();
        assert_eq!(config.input.delimiter, ',');
        assert!(config.input.trim);
        assert_eq!(config.diagnostics.histogram_bins, 20);
        assert_eq!(config.render.mode, RenderMode::Auto);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[input]
delimiter = ";"
trim = false

[diagnostics]
histogram_bins = 8

[render]
mode = "text"
"#;
        let config = TempoConfig::from_toml(toml).unwrap();
        assert_eq!(config.input.delimiter, ';');
        assert!(!config.input.trim);
        assert_eq!(config.diagnostics.histogram_bins, 8);
        assert_eq!(config.render.mode, RenderMode::Text);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = TempoConfig::from_toml("").unwrap();
        assert_eq!(config.diagnostics.histogram_bins, 20);
        assert_eq!(config.render.mode, RenderMode::Auto);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = TempoConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(TempoError::Toml(_))));
    }

    #[test]
    fn zero_bins_rejected() {
        let result = TempoConfig::from_toml("[diagnostics]\nhistogram_bins = 0\n");
        assert!(matches!(result, Err(TempoError::Config(_))));
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        let result = TempoConfig::from_toml("[input]\ndelimiter = \"§\"\n");
        assert!(matches!(result, Err(TempoError::Config(_))));
    }

    #[test]
    fn unknown_render_mode_rejected() {
        let result = TempoConfig::from_toml("[render]\nmode = \"svg\"\n");
        assert!(result.is_err());
    }
}
