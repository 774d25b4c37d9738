//! Settings and tuning struct definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{default_display_mode, default_theme_mode, DisplayMode, ThemeMode};
use crate::providers::ProviderId;

/// The provider enablement set, as consumed by the overlay.
///
/// Owned by the options page; the content script only ever reads it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Every known provider exactly once, in button order.
    pub provider_order: Vec<ProviderId>,
    pub enabled: HashMap<ProviderId, bool>,
    #[serde(default = "default_display_mode")]
    pub display_mode: DisplayMode,
    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,
}

impl Settings {
    pub fn is_enabled(&self, provider: ProviderId) -> bool {
        self.enabled.get(&provider).copied().unwrap_or(true)
    }

    /// Enabled providers in their configured order.
    pub fn enabled_in_order(&self) -> Vec<ProviderId> {
        self.provider_order
            .iter()
            .copied()
            .filter(|p| self.is_enabled(*p))
            .collect()
    }
}

/// Settings exactly as found in storage, before normalization.
///
/// Every field is optional and loosely typed so that an outdated or
/// hand-edited entry still yields something usable.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub provider_order: Option<Vec<String>>,
    #[serde(default)]
    pub enabled: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub display_mode: Option<String>,
    #[serde(default)]
    pub theme_mode: Option<String>,
}

/// Fixed constants for timing and layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    /// Delay between the input event and reading the selection.
    pub debounce_ms: u32,
    /// Gap between the selection anchor and the overlay.
    pub offset: f64,
    /// Minimum distance kept from every viewport edge.
    pub margin: f64,
    /// Document scroll distance that dismisses the overlay.
    pub scroll_threshold: f64,
    /// Used when the overlay measures as zero-sized.
    pub fallback_overlay_size: f64,
    pub max_query_chars: usize,
}
