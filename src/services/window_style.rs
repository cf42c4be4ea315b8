//! Window styling read from the settings store.
//!
//! The front-end paints its main window from two keys:
//! `Window.BackgroundColor` (hex) and `Window.Opacity` (integer percent).

use serde::{Deserialize, Serialize};

use crate::repositories::settings_repository::{SettingsRepository, SettingsRepositoryTrait};
use crate::types::errors::SettingsError;
use crate::types::settings::keys;
use crate::types::tag::is_valid_hex_color;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#1e1e1e";
pub const DEFAULT_OPACITY_PERCENT: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStyle {
    pub background_color: String,
    pub opacity_percent: u8,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            opacity_percent: DEFAULT_OPACITY_PERCENT,
        }
    }
}

impl WindowStyle {
    /// Reads the style, falling back to defaults for missing or malformed values.
    pub fn load(settings: &SettingsRepository) -> Result<Self, SettingsError> {
        let background_color = settings
            .get(keys::WINDOW_BACKGROUND_COLOR)?
            .map(|c| c.trim().to_string())
            .filter(|c| is_valid_hex_color(c))
            .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());

        let opacity_percent = settings
            .get_int(keys::WINDOW_OPACITY)?
            .map(|p| p.clamp(0, 100) as u8)
            .unwrap_or(DEFAULT_OPACITY_PERCENT);

        Ok(Self {
            background_color,
            opacity_percent,
        })
    }

    pub fn save(&self, settings: &mut SettingsRepository) -> Result<(), SettingsError> {
        settings.set(keys::WINDOW_BACKGROUND_COLOR, &self.background_color, None)?;
        settings.set_int(keys::WINDOW_OPACITY, i64::from(self.opacity_percent.min(100)))
    }

    /// Opacity as a fraction between 0.0 and 1.0.
    pub fn opacity(&self) -> f64 {
        f64::from(self.opacity_percent.min(100)) / 100.0
    }
}
