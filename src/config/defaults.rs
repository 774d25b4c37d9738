//! Default implementations for settings and tuning.

use super::config_struct::{Settings, Tuning};
use super::types::{
    default_display_mode, default_theme_mode, DEFAULT_DEBOUNCE_MS, DEFAULT_MARGIN_PX,
    DEFAULT_MAX_QUERY_CHARS, DEFAULT_OFFSET_PX, DEFAULT_OVERLAY_SIZE_PX,
    DEFAULT_SCROLL_THRESHOLD_PX,
};
use crate::providers::ProviderId;

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_order: ProviderId::ALL.to_vec(),
            enabled: ProviderId::ALL.iter().map(|p| (*p, true)).collect(),
            display_mode: default_display_mode(),
            theme_mode: default_theme_mode(),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            offset: DEFAULT_OFFSET_PX,
            margin: DEFAULT_MARGIN_PX,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD_PX,
            fallback_overlay_size: DEFAULT_OVERLAY_SIZE_PX,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
        }
    }
}
