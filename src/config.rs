use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub render: RenderOptions,
    pub export: ExportConfig,
    pub preview: PreviewConfig,
}

/// Token producer settings, passed explicitly into every render call.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderOptions {
    /// GitHub-flavored extensions: tables, task lists, strikethrough,
    /// footnotes, math and front matter
    pub gfm: bool,
    /// Soft line breaks become hard breaks
    pub breaks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "Document".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    pub container_class: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            container_class: "word-preview".to_string(),
        }
    }
}

impl PreviewConfig {
    /// The container class is spliced into stylesheet selectors, so it must
    /// be a plain identifier.
    fn validate(&self) -> Result<()> {
        if is_css_identifier(&self.container_class) {
            Ok(())
        } else {
            Err(Error::ContainerClass(self.container_class.clone()))
        }
    }
}

fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = match chars.next() {
        Some('-') => chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '-'),
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    };
    starts_well
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Config {
    /// The defaults compiled in from `default_config.toml`.
    pub fn compiled_default() -> Self {
        // build.rs has already validated the embedded file
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.preview.validate()?;
        Ok(config)
    }

    /// Read a config file, failing if it is missing or malformed.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => config,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => Self::compiled_default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::compiled_default()
            }
        }
    }
}
