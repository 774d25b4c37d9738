//! Page input as seen by the session.

use super::host::{Task, TaskHandle};
use super::html::{ACTION_LAUNCH, ACTION_TOGGLE_PICKER};
use crate::config::Settings;
use crate::providers::ProviderId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Something the user did inside the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayAction {
    Launch(ProviderId),
    TogglePicker,
}

impl OverlayAction {
    /// Decodes the `data-action` / `data-provider` pair of a clicked element.
    pub fn from_attrs(action: &str, provider: Option<&str>) -> Option<Self> {
        match action {
            ACTION_LAUNCH => provider.and_then(ProviderId::from_key).map(OverlayAction::Launch),
            ACTION_TOGGLE_PICKER => Some(OverlayAction::TogglePicker),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    PointerUp {
        inside_overlay: bool,
    },
    KeyUp {
        key: Key,
        inside_overlay: bool,
    },
    KeyDown {
        key: Key,
    },
    PointerDown {
        inside_overlay: bool,
    },
    /// Capture-phase scroll. `document` is false for nested scrollers.
    Scroll {
        inside_overlay: bool,
        document: bool,
    },
    SelectionChanged,
    TaskDue {
        handle: TaskHandle,
        task: Task,
    },
    Action(OverlayAction),
    SettingsChanged(Settings),
    TabRequestSettled {
        url: String,
        outcome: Result<(), String>,
    },
    PageHide,
    PageShow {
        persisted: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_attributes_decode() {
        assert_eq!(
            OverlayAction::from_attrs("launch", Some("chatgpt")),
            Some(OverlayAction::Launch(ProviderId::ChatGpt))
        );
        assert_eq!(
            OverlayAction::from_attrs("toggle-picker", None),
            Some(OverlayAction::TogglePicker)
        );
        assert_eq!(OverlayAction::from_attrs("launch", None), None);
        assert_eq!(OverlayAction::from_attrs("launch", Some("bing")), None);
        assert_eq!(OverlayAction::from_attrs("drag", Some("google")), None);
    }

    #[test]
    fn escape_key_names() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("Shift"), Key::Other);
    }
}
