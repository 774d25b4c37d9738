//! Core types and enums for configuration.

use serde::{Deserialize, Serialize};

// --- CONSTANTS ---
pub const DEFAULT_DEBOUNCE_MS: u32 = 30;
pub const DEFAULT_OFFSET_PX: f64 = 8.0;
pub const DEFAULT_MARGIN_PX: f64 = 8.0;
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 4.0;
pub const DEFAULT_OVERLAY_SIZE_PX: f64 = 36.0;
pub const DEFAULT_MAX_QUERY_CHARS: usize = 2000;

// --- DISPLAY MODE ENUM ---
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One button per enabled provider.
    #[default]
    Buttons,
    /// A single trigger that expands a menu of enabled providers.
    Picker,
}

impl DisplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buttons" => Some(DisplayMode::Buttons),
            "picker" => Some(DisplayMode::Picker),
            _ => None,
        }
    }
}

// --- THEME MODE ENUM ---
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Dark,
    Light,
}

impl ThemeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Some(ThemeMode::System),
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }
}

// --- Default Function Helpers ---
pub fn default_display_mode() -> DisplayMode {
    DisplayMode::Buttons
}
pub fn default_theme_mode() -> ThemeMode {
    ThemeMode::System
}
