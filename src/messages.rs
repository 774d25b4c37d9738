//! Runtime messages exchanged with the privileged relay and the options page.

use serde::{Deserialize, Serialize};

use crate::config::{decode_settings, normalize_settings, Settings, StoredSettings};
use crate::error::HostError;

/// Key under which the options page keeps the settings in extension
/// local storage.
pub const SETTINGS_STORAGE_KEY: &str = "settings";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuntimeMessage {
    /// Content script asks the relay to open `url` in a new tab.
    OpenTab { url: String },
    /// Settings were edited. `settings` is absent when the sender expects
    /// the receiver to re-read storage.
    SettingsChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        settings: Option<StoredSettings>,
    },
}

impl RuntimeMessage {
    pub fn open_tab(url: impl Into<String>) -> Self {
        Self::OpenTab { url: url.into() }
    }
}

/// Reply to [`RuntimeMessage::OpenTab`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OpenTabAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpenTabAck {
    pub fn into_result(self) -> Result<(), String> {
        if self.ok {
            Ok(())
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "relay refused the request".to_string()))
        }
    }
}

/// Decode whatever came back from `sendMessage`. A missing or malformed
/// reply is a failure.
pub fn decode_ack(reply: serde_json::Value) -> Result<(), String> {
    if reply.is_null() {
        return Err("no acknowledgment from relay".to_string());
    }
    serde_json::from_value::<OpenTabAck>(reply)
        .map_err(|err| format!("undecodable acknowledgment: {err}"))?
        .into_result()
}

/// What an incoming message means for the content script.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    Settings(Settings),
    /// Settings changed but were not included: read storage again.
    ReloadSettings,
    Ignored,
}

pub fn decode_inbound(message: serde_json::Value) -> Inbound {
    match serde_json::from_value::<RuntimeMessage>(message) {
        Ok(RuntimeMessage::SettingsChanged {
            settings: Some(stored),
        }) => Inbound::Settings(normalize_settings(stored)),
        Ok(RuntimeMessage::SettingsChanged { settings: None }) => Inbound::ReloadSettings,
        Ok(RuntimeMessage::OpenTab { .. }) | Err(_) => Inbound::Ignored,
    }
}

/// Settings from a `storage.local.get` result object. A missing entry
/// yields the defaults.
pub fn settings_from_storage(items: serde_json::Value) -> Result<Settings, HostError> {
    match items {
        serde_json::Value::Object(mut map) => {
            decode_settings(map.remove(SETTINGS_STORAGE_KEY).unwrap_or_default())
        }
        serde_json::Value::Null => Ok(Settings::default()),
        other => Err(HostError::Storage(format!("unexpected storage result: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::DisplayMode;
    use crate::providers::ProviderId;

    #[test]
    fn open_tab_uses_tagged_wire_shape() {
        let value = serde_json::to_value(RuntimeMessage::open_tab("https://claude.ai/new?q=x")).unwrap();
        assert_eq!(value, json!({"type": "openTab", "url": "https://claude.ai/new?q=x"}));
    }

    #[test]
    fn settings_change_without_payload_requests_reload() {
        assert_eq!(
            decode_inbound(json!({"type": "settingsChanged"})),
            Inbound::ReloadSettings
        );
    }

    #[test]
    fn settings_change_with_payload_is_normalized() {
        let inbound = decode_inbound(json!({
            "type": "settingsChanged",
            "settings": {"providerOrder": ["claude"], "displayMode": "picker"}
        }));
        let Inbound::Settings(settings) = inbound else {
            panic!("expected settings, got {inbound:?}");
        };
        assert_eq!(
            settings.provider_order,
            vec![ProviderId::Claude, ProviderId::Google, ProviderId::ChatGpt]
        );
        assert_eq!(settings.display_mode, DisplayMode::Picker);
    }

    #[test]
    fn settings_change_carries_the_stored_entry() {
        let message: RuntimeMessage = serde_json::from_value(json!({
            "type": "settingsChanged",
            "settings": {"providerOrder": ["google"], "themeMode": "dark"}
        }))
        .unwrap();
        let expected = RuntimeMessage::SettingsChanged {
            settings: Some(StoredSettings {
                provider_order: Some(vec!["google".to_string()]),
                theme_mode: Some("dark".to_string()),
                ..StoredSettings::default()
            }),
        };
        assert_eq!(message, expected);
        assert_ne!(
            message,
            RuntimeMessage::SettingsChanged { settings: None }
        );
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        assert_eq!(decode_inbound(json!({"type": "ping"})), Inbound::Ignored);
        assert_eq!(decode_inbound(json!("hello")), Inbound::Ignored);
        assert_eq!(
            decode_inbound(json!({"type": "openTab", "url": "https://example.com"})),
            Inbound::Ignored
        );
    }

    #[test]
    fn ack_decoding() {
        assert_eq!(decode_ack(json!({"ok": true})), Ok(()));
        assert_eq!(
            decode_ack(json!({"ok": false, "error": "tabs permission missing"})),
            Err("tabs permission missing".to_string())
        );
        assert!(decode_ack(serde_json::Value::Null).is_err());
        assert!(decode_ack(json!("yes")).is_err());
        assert!(decode_ack(json!({})).is_err());
    }

    #[test]
    fn storage_without_entry_yields_defaults() {
        assert_eq!(settings_from_storage(json!({})), Ok(Settings::default()));
        assert_eq!(settings_from_storage(json!(null)), Ok(Settings::default()));
    }

    #[test]
    fn unreadable_storage_is_reported() {
        assert!(matches!(
            settings_from_storage(json!({"settings": {"providerOrder": 7}})),
            Err(HostError::Storage(_))
        ));
        assert!(matches!(
            settings_from_storage(json!([])),
            Err(HostError::Storage(_))
        ));
    }

    #[test]
    fn storage_entry_is_read() {
        let settings = settings_from_storage(json!({
            "settings": {"enabled": {"google": false}}
        }))
        .unwrap();
        assert_eq!(
            settings.enabled_in_order(),
            vec![ProviderId::ChatGpt, ProviderId::Claude]
        );
    }
}
