//! Patcher configuration.
//!
//! Defaults can be overridden from a TOML file:
//!
//! ```toml
//! input = "sod.gb"
//! output = "sod.mod.gb"
//! patches_dir = "patches"
//! force = false
//! ```
//!
//! Every key is optional. Command-line flags are applied on top with
//! [`PatcherConfigBuilder`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "gbpatch.toml";

/// Configuration for a patching run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatcherConfig {
    /// ROM to read from
    pub input: PathBuf,
    /// ROM to write to
    pub output: PathBuf,
    /// Directory scanned for `.ips` files
    pub patches_dir: PathBuf,
    /// Apply even when the conflict check does not come back clear
    pub force: bool,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sod.gb"),
            output: PathBuf::from("sod.mod.gb"),
            patches_dir: PathBuf::from("patches"),
            force: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    patches_dir: Option<PathBuf>,
    force: Option<bool>,
}

impl PatcherConfig {
    /// Create a new configuration builder
    pub fn builder() -> PatcherConfigBuilder {
        PatcherConfigBuilder::default()
    }

    /// Load a TOML config file, filling missing keys with defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::builder().file(path)?.build())
    }

    /// Parse TOML content, filling missing keys with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self::builder().toml(content)?.build())
    }
}

/// Builder for PatcherConfig
#[derive(Debug, Clone, Default)]
pub struct PatcherConfigBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    patches_dir: Option<PathBuf>,
    force: Option<bool>,
}

impl PatcherConfigBuilder {
    /// Merge values from a TOML file. Values already set on the builder win.
    pub fn file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("Loaded config from {}", path.display());
        self.toml(&content)
    }

    /// Merge values from TOML content. Values already set on the builder win.
    pub fn toml(mut self, content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        self.input = self.input.or(file.input);
        self.output = self.output.or(file.output);
        self.patches_dir = self.patches_dir.or(file.patches_dir);
        self.force = self.force.or(file.force);
        Ok(self)
    }

    /// Set the input ROM path
    pub fn input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the output ROM path
    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set the patches directory
    pub fn patches_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.patches_dir = Some(path.into());
        self
    }

    /// Apply patches even when conflicts are detected
    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    /// Build the configuration
    pub fn build(self) -> PatcherConfig {
        let default = PatcherConfig::default();
        PatcherConfig {
            input: self.input.unwrap_or(default.input),
            output: self.output.unwrap_or(default.output),
            patches_dir: self.patches_dir.unwrap_or(default.patches_dir),
            force: self.force.unwrap_or(default.force),
        }
    }
}
