//! Settings decoding: storage payloads in, normalized settings out.

use std::collections::HashMap;

use super::config_struct::{Settings, StoredSettings};
use super::types::{default_display_mode, default_theme_mode, DisplayMode, ThemeMode};
use crate::error::HostError;
use crate::providers::ProviderId;

// ============================================================================
// SETTINGS LOADING
// ============================================================================

/// Decode a stored settings entry. `null` (nothing stored yet) yields
/// the defaults; anything structurally wrong is a storage error.
pub fn decode_settings(value: serde_json::Value) -> Result<Settings, HostError> {
    if value.is_null() {
        return Ok(Settings::default());
    }
    serde_json::from_value::<StoredSettings>(value)
        .map(normalize_settings)
        .map_err(|err| HostError::Storage(err.to_string()))
}

/// Decode settings from a JSON document, falling back to defaults on any
/// structural error.
pub fn load_settings_json(data: &str) -> Settings {
    let value = match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "stored settings are not JSON, using defaults");
            return Settings::default();
        }
    };
    load_settings_value(value)
}

/// Decode settings from an already-parsed JSON value.
pub fn load_settings_value(value: serde_json::Value) -> Settings {
    decode_settings(value).unwrap_or_else(|err| {
        tracing::warn!(%err, "using default settings");
        Settings::default()
    })
}

/// Turn whatever was stored into a complete, consistent settings value.
pub fn normalize_settings(stored: StoredSettings) -> Settings {
    // -------------------------------------------------------------------------
    // 1. ORDER: known ids once each, then any provider the entry predates
    // -------------------------------------------------------------------------
    let mut provider_order: Vec<ProviderId> = Vec::with_capacity(ProviderId::ALL.len());
    for key in stored.provider_order.unwrap_or_default() {
        match ProviderId::from_key(&key) {
            Some(id) if !provider_order.contains(&id) => provider_order.push(id),
            Some(_) => {}
            None => tracing::debug!(key = %key, "ignoring unknown provider in order"),
        }
    }
    for id in ProviderId::ALL {
        if !provider_order.contains(&id) {
            provider_order.push(id);
        }
    }

    // -------------------------------------------------------------------------
    // 2. ENABLEMENT: missing entries default to enabled
    // -------------------------------------------------------------------------
    let stored_enabled = stored.enabled.unwrap_or_default();
    let mut enabled: HashMap<ProviderId, bool> = ProviderId::ALL.iter().map(|p| (*p, true)).collect();
    for (key, on) in stored_enabled {
        if let Some(id) = ProviderId::from_key(&key) {
            enabled.insert(id, on);
        }
    }

    // -------------------------------------------------------------------------
    // 3. MODES
    // -------------------------------------------------------------------------
    let display_mode = stored
        .display_mode
        .as_deref()
        .and_then(DisplayMode::parse)
        .unwrap_or_else(default_display_mode);
    let theme_mode = stored
        .theme_mode
        .as_deref()
        .and_then(ThemeMode::parse)
        .unwrap_or_else(default_theme_mode);

    Settings {
        provider_order,
        enabled,
        display_mode,
        theme_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_storage_yields_defaults() {
        assert_eq!(load_settings_json("{}"), Settings::default());
        assert_eq!(load_settings_value(serde_json::Value::Null), Settings::default());
    }

    #[test]
    fn malformed_storage_yields_defaults() {
        assert_eq!(load_settings_json("[1, 2"), Settings::default());
        assert_eq!(
            load_settings_json(r#"{"providerOrder": "google"}"#),
            Settings::default()
        );
    }

    #[test]
    fn malformed_entry_is_a_storage_error() {
        let err = decode_settings(serde_json::json!({"enabled": ["google"]})).unwrap_err();
        assert!(matches!(err, HostError::Storage(_)), "{err:?}");
        assert_eq!(decode_settings(serde_json::Value::Null), Ok(Settings::default()));
    }

    #[test]
    fn order_is_deduplicated_and_completed() {
        let settings = load_settings_json(
            r#"{"providerOrder": ["claude", "bing", "claude", "google"]}"#,
        );
        assert_eq!(
            settings.provider_order,
            vec![ProviderId::Claude, ProviderId::Google, ProviderId::ChatGpt]
        );
    }

    #[test]
    fn enabled_providers_follow_configured_order() {
        let settings = load_settings_json(
            r#"{
                "providerOrder": ["chatgpt", "claude", "google"],
                "enabled": {"claude": false, "unknown": true},
                "displayMode": "picker",
                "themeMode": "Dark"
            }"#,
        );
        assert_eq!(
            settings.enabled_in_order(),
            vec![ProviderId::ChatGpt, ProviderId::Google]
        );
        assert_eq!(settings.display_mode, DisplayMode::Picker);
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
    }

    #[test]
    fn unknown_modes_fall_back() {
        let settings = load_settings_json(r#"{"displayMode": "carousel", "themeMode": 3}"#);
        // a non-string mode is a type error for the whole entry
        assert_eq!(settings, Settings::default());

        let settings = load_settings_json(r#"{"displayMode": "carousel"}"#);
        assert_eq!(settings.display_mode, DisplayMode::Buttons);
    }
}
