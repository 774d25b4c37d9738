//! Provider registry: the fixed set of destinations a selection can be sent to.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "chatgpt")]
    ChatGpt,
    #[serde(rename = "claude")]
    Claude,
}

impl ProviderId {
    /// Registry order, also the default button order.
    pub const ALL: [ProviderId; 3] = [ProviderId::Google, ProviderId::ChatGpt, ProviderId::Claude];

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "google" => Some(ProviderId::Google),
            "chatgpt" => Some(ProviderId::ChatGpt),
            "claude" => Some(ProviderId::Claude),
            _ => None,
        }
    }

    /// Stable identifier used in storage and in `data-provider` attributes.
    pub fn key(&self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::ChatGpt => "chatgpt",
            ProviderId::Claude => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::Google => "Google",
            ProviderId::ChatGpt => "ChatGPT",
            ProviderId::Claude => "Claude",
        }
    }

    /// Shown when the icon asset cannot be resolved.
    pub fn glyph(&self) -> char {
        self.label().chars().next().unwrap_or('?')
    }

    /// Path of the bundled icon, relative to the extension root.
    pub fn icon_path(&self) -> &'static str {
        match self {
            ProviderId::Google => "icons/google.svg",
            ProviderId::ChatGpt => "icons/chatgpt.svg",
            ProviderId::Claude => "icons/claude.svg",
        }
    }

    /// Builds the deep link for `text`. The text is percent-encoded as a
    /// query component; nothing else about it is interpreted.
    pub fn deep_link(&self, text: &str) -> String {
        let q = urlencoding::encode(text);
        match self {
            ProviderId::Google => format!("https://www.google.com/search?q={q}"),
            ProviderId::ChatGpt => format!("https://chatgpt.com/?q={q}&input={q}"),
            ProviderId::Claude => format!("https://claude.ai/new?q={q}"),
        }
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting one.
pub fn cap_query(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_param(link: &str, name: &str) -> Option<String> {
        url::Url::parse(link)
            .ok()?
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn chatgpt_link_carries_text_in_both_params() {
        assert_eq!(
            ProviderId::ChatGpt.deep_link("hello world"),
            "https://chatgpt.com/?q=hello%20world&input=hello%20world"
        );
    }

    #[test]
    fn reserved_characters_survive_the_round_trip() {
        let text = "a&b=c #1 / ünïcode? 100%";
        for provider in ProviderId::ALL {
            let link = provider.deep_link(text);
            assert!(!link.contains(' '), "{link}");
            assert_eq!(query_param(&link, "q").as_deref(), Some(text));
        }
    }

    #[test]
    fn keys_parse_back() {
        for provider in ProviderId::ALL {
            assert_eq!(ProviderId::from_key(provider.key()), Some(provider));
        }
        assert_eq!(ProviderId::from_key(" ChatGPT "), Some(ProviderId::ChatGpt));
        assert_eq!(ProviderId::from_key("bing"), None);
    }

    #[test]
    fn query_cap_respects_char_boundaries() {
        assert_eq!(cap_query("héllo", 2), "hé");
        assert_eq!(cap_query("short", 100), "short");
        assert_eq!(cap_query("", 3), "");
    }
}
