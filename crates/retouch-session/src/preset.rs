//! Named adjustment presets.
//!
//! A preset is configuration data: a name plus a fixed
//! [`AdjustmentParams`] record. Applying one is the same as running the
//! pipeline with its params.

use retouch_ops::params::AdjustmentParams;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{SessionError, SessionResult};

/// A named [`AdjustmentParams`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Lookup key.
    pub name: String,
    /// Display label; empty means "use the name".
    #[serde(default)]
    pub label: String,
    /// Adjustments; omitted fields are neutral.
    #[serde(default)]
    pub params: AdjustmentParams,
}

impl Preset {
    /// Creates a preset.
    pub fn new(name: impl Into<String>, label: impl Into<String>, params: AdjustmentParams) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            params,
        }
    }

    /// Label, falling back to the name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { &self.name } else { &self.label }
    }
}

/// Ordered set of presets keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetBook {
    presets: Vec<Preset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl PresetBook {
    /// Empty book.
    pub fn empty() -> Self {
        Self { presets: Vec::new() }
    }

    /// Book holding the built-in presets.
    pub fn with_builtins() -> Self {
        let base = AdjustmentParams::default;
        let presets = vec![
            Preset::new("vintage", "Vintage", AdjustmentParams {
                brightness: 105.0,
                contrast: 90.0,
                saturation: 70.0,
                temperature: 30.0,
                vignette: 30.0,
                noise: 8.0,
                ..base()
            }),
            Preset::new("dramatic", "Dramatic", AdjustmentParams {
                brightness: 95.0,
                contrast: 150.0,
                saturation: 120.0,
                sharpen: 20.0,
                vignette: 40.0,
                ..base()
            }),
            Preset::new("cinematic", "Cinematic", AdjustmentParams {
                contrast: 120.0,
                saturation: 85.0,
                temperature: -15.0,
                vignette: 25.0,
                ..base()
            }),
            Preset::new("warm", "Warm", AdjustmentParams {
                saturation: 110.0,
                temperature: 40.0,
                ..base()
            }),
            Preset::new("cool", "Cool", AdjustmentParams {
                saturation: 95.0,
                temperature: -40.0,
                ..base()
            }),
            Preset::new("bright", "Bright", AdjustmentParams {
                brightness: 120.0,
                contrast: 105.0,
                exposure: 20.0,
                ..base()
            }),
        ];
        Self { presets }
    }

    /// Adds a preset, replacing one with the same name in place.
    pub fn insert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(slot) => {
                debug!(name = %preset.name, "preset overridden");
                *slot = preset;
            }
            None => self.presets.push(preset),
        }
    }

    /// Looks up a preset.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownPreset`] if `name` isn't registered.
    pub fn get(&self, name: &str) -> SessionResult<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SessionError::UnknownPreset(name.to_string()))
    }

    /// `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.presets.iter().any(|p| p.name == name)
    }

    /// Names in order.
    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    /// Presets in order.
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let book = PresetBook::with_builtins();
        assert_eq!(book.names(), vec!["vintage", "dramatic", "cinematic", "warm", "cool", "bright"]);
        assert_eq!(book.get("warm").unwrap().params.temperature, 40.0);
        // Every built-in changes something and stays within range
        for p in book.iter() {
            assert!(!p.params.is_neutral(), "{}", p.name);
            assert_eq!(p.params.sanitized(), p.params, "{}", p.name);
        }
    }

    #[test]
    fn test_unknown() {
        let book = PresetBook::with_builtins();
        assert!(matches!(book.get("sunset"), Err(SessionError::UnknownPreset(n)) if n == "sunset"));
    }

    #[test]
    fn test_override_in_place() {
        let mut book = PresetBook::with_builtins();
        book.insert(Preset::new("warm", "", AdjustmentParams::default()));
        assert_eq!(book.len(), 6);
        assert_eq!(book.names()[3], "warm");
        assert_eq!(book.get("warm").unwrap().display_label(), "warm");
        book.insert(Preset::new("faded", "Faded", AdjustmentParams::default()));
        assert!(book.contains("faded"));
        assert_eq!(book.len(), 7);
    }
}
