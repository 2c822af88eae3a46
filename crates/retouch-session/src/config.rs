//! Editor configuration.
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid config:
//!
//! ```yaml
//! history:
//!   capacity: 50
//!   max_bytes: 268435456
//! noise_seed: 42
//! presets:
//!   - name: faded
//!     label: Faded
//!     params: { contrast: 80, saturation: 60 }
//! looks:
//!   - name: noir
//!     label: Noir
//!     steps: [grayscale, { contrast: 140 }]
//! ```
//!
//! User presets override built-ins with the same name; looks are registered
//! as filters after the built-ins.

use std::path::Path;

use retouch_ops::catalog::{FilterCatalog, Look};
use retouch_ops::pipeline::DEFAULT_NOISE_SEED;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::history::HistoryLimits;
use crate::preset::{Preset, PresetBook};
use crate::{SessionError, SessionResult};

/// A filter defined as a chain of tone steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookDefinition {
    /// Catalog name.
    pub name: String,
    /// Display label; empty means "use the name".
    #[serde(default)]
    pub label: String,
    /// Per-pixel steps in order.
    #[serde(default)]
    pub steps: Look,
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history limits.
    pub history: HistoryLimits,
    /// Seed for the noise stage.
    pub noise_seed: u64,
    /// Extra or overriding presets.
    pub presets: Vec<Preset>,
    /// Extra filters.
    pub looks: Vec<LookDefinition>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryLimits::default(),
            noise_seed: DEFAULT_NOISE_SEED,
            presets: Vec::new(),
            looks: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SessionError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "loading editor config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> SessionResult<Self> {
        // serde_yaml rejects an empty document as a struct
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> SessionResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks values serde can't.
    pub fn validate(&self) -> SessionResult<()> {
        if self.history.capacity == 0 {
            return Err(SessionError::InvalidConfig("history.capacity must be at least 1".into()));
        }
        if let Some(p) = self.presets.iter().find(|p| p.name.trim().is_empty()) {
            return Err(SessionError::InvalidConfig(format!(
                "preset with empty name (label {:?})",
                p.label
            )));
        }
        if self.looks.iter().any(|l| l.name.trim().is_empty()) {
            return Err(SessionError::InvalidConfig("look with empty name".into()));
        }
        Ok(())
    }

    /// Built-in presets with this config's presets applied on top.
    pub fn preset_book(&self) -> PresetBook {
        let mut book = PresetBook::with_builtins();
        for preset in &self.presets {
            book.insert(preset.clone());
        }
        book
    }

    /// Built-in filters plus this config's looks.
    pub fn filter_catalog(&self) -> FilterCatalog {
        let mut catalog = FilterCatalog::with_builtins();
        for look in &self.looks {
            let label = if look.label.is_empty() { &look.name } else { &look.label };
            catalog.register(look.name.clone(), label.clone(), look.steps.clone());
        }
        catalog
    }
}
