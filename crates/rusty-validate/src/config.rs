// File: src/config.rs
// Purpose: Configuration parsing from rusty-validate.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that change how annotations are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    /// How text length is measured by `len`, `min` and `max`
    #[serde(default)]
    pub length_unit: LengthUnit,

    /// What to do with annotations naming a rule other than len/in/min/max
    #[serde(default)]
    pub unknown_rules: UnknownRulePolicy,
}

/// Unit for text length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Unicode scalar values
    #[default]
    Chars,
    /// UTF-8 bytes
    Bytes,
}

impl LengthUnit {
    pub fn measure(self, s: &str) -> usize {
        match self {
            LengthUnit::Chars => s.chars().count(),
            LengthUnit::Bytes => s.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRulePolicy {
    /// Report an invalid-annotation-syntax violation
    #[default]
    Reject,
    /// Skip the field and log a warning
    Ignore,
}

/// Logging configuration, used by [`crate::logging::init`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Include the event target (module path) in output
    #[serde(default = "default_false")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "warn".to_string()
}

fn default_false() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            with_target: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./rusty-validate.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rusty-validate.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(content).context("Invalid rusty-validate configuration")
    }
}
