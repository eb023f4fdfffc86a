//! Engine configuration via `docket.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Values are validated when loaded: a prefix, width, date format or policy
//! that cannot be used fails at load time, not at the first composition.

use docket_core::{DocumentType, RenderLimits, MAX_NESTING_DEPTH};
use docket_numbering::{NumberFormat, RetryConfig, DEFAULT_MIN_WIDTH};
use docket_render::{DateFormat, RenderOptions, UnsafeMarkupPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::composer::DEFAULT_DRAFT_LABEL;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docket.toml";

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("config file '{path}': {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Could not produce TOML
    #[error("failed to serialize config: {0}")]
    Serialize(String),

    /// Parsed, but a value is unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result alias for configuration
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// `[numbering]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingConfig {
    /// Minimum digits after the prefix
    pub min_width: usize,
    /// Prefix overrides keyed by document type name (`purchase_order = "PO"`)
    pub prefixes: BTreeMap<String, String>,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            prefixes: BTreeMap::new(),
        }
    }
}

/// `[render]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// strftime format for date values
    pub date_format: String,
    /// `"strip"` or `"reject"`
    pub unsafe_markup: UnsafeMarkupPolicy,
    /// Template size and structure limits
    pub limits: RenderLimits,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::ISO.to_string(),
            unsafe_markup: UnsafeMarkupPolicy::default(),
            limits: RenderLimits::default(),
        }
    }
}

/// `[compose]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Stand-in for `document.number` when previewing an unnumbered draft
    pub draft_label: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            draft_label: DEFAULT_DRAFT_LABEL.to_string(),
        }
    }
}

/// Engine configuration loaded from `docket.toml`
///
/// # Example
///
/// ```toml
/// [numbering]
/// min_width = 4
///
/// [numbering.prefixes]
/// purchase_order = "PUR"
///
/// [render]
/// unsafe_markup = "reject"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocketConfig {
    /// Number formatting
    pub numbering: NumberingConfig,
    /// Rendering
    pub render: RenderConfig,
    /// Composition
    pub compose: ComposeConfig,
    /// Allocation retry on counter conflict
    pub retry: RetryConfig,
}

impl DocketConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Docket configuration

[numbering]
# Minimum digits after the prefix; larger sequences grow past it (PO-1000)
min_width = 3

# Prefix per document type. Prefixes must be unique, ASCII letters and digits.
# [numbering.prefixes]
# invoice = "INV"
# quote = "QUO"
# order_form = "OF"
# purchase_order = "PO"

[render]
# strftime format for date placeholders
date_format = "%Y-%m-%d"

# Script-capable markup in templates:
#   "strip"  = remove it and keep rendering (default)
#   "reject" = fail the render
unsafe_markup = "strip"

# [render.limits]
# max_template_bytes = 1048576
# max_placeholders = 10000
# max_nesting_depth = 64

[compose]
# Shown in place of the number when previewing an unnumbered draft
draft_label = "DRAFT"

[retry]
# Compare-and-swap retries when another writer allocates concurrently
max_retries = 16
base_delay_ms = 1
max_delay_ms = 50
"#
    }

    /// Parse and validate config text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: DocketConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// unusable value.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse(reason) => ConfigError::Parse(format!("'{}': {}", path.display(), reason)),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every value by building what it configures
    pub fn validate(&self) -> ConfigResult<()> {
        self.number_format()?;
        self.render_options()?;
        let depth = self.render.limits.max_nesting_depth;
        if depth == 0 || depth > MAX_NESTING_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "render.limits.max_nesting_depth ({}) must be between 1 and {}",
                depth, MAX_NESTING_DEPTH
            )));
        }
        if self.compose.draft_label.trim().is_empty() {
            return Err(ConfigError::Invalid("compose.draft_label is empty".into()));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "retry.max_delay_ms ({}) is below retry.base_delay_ms ({})",
                self.retry.max_delay_ms, self.retry.base_delay_ms
            )));
        }
        Ok(())
    }

    /// Number format with configured width and prefixes
    pub fn number_format(&self) -> ConfigResult<NumberFormat> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::Invalid(format!("numbering: {}", e));

        let mut format = NumberFormat::with_min_width(self.numbering.min_width).map_err(|e| invalid(&e))?;
        for (name, prefix) in &self.numbering.prefixes {
            let document_type = DocumentType::from_str(name).map_err(|e| invalid(&e))?;
            format = format
                .with_prefix(document_type, prefix.as_str())
                .map_err(|e| invalid(&e))?;
        }
        Ok(format)
    }

    /// Render options with configured date format, policy and limits
    pub fn render_options(&self) -> ConfigResult<RenderOptions> {
        let date_format = DateFormat::new(self.render.date_format.as_str())
            .map_err(|e| ConfigError::Invalid(format!("render: {}", e)))?;
        Ok(RenderOptions::default()
            .with_date_format(date_format)
            .with_policy(self.render.unsafe_markup)
            .with_limits(self.render.limits))
    }

    /// Retry policy for allocation
    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }
}
