// Overlay HTML - stylesheet and markup rendered inside the isolated root

use crate::config::ThemeMode;
use crate::providers::ProviderId;

pub const PHASE_ATTR: &str = "data-phase";
pub const PHASE_MEASURING: &str = "measuring";
pub const PHASE_SHOWN: &str = "shown";
pub const PHASE_ENTERED: &str = "entered";

pub const ACTION_ATTR: &str = "data-action";
pub const PROVIDER_ATTR: &str = "data-provider";
pub const ACTION_LAUNCH: &str = "launch";
pub const ACTION_TOGGLE_PICKER: &str = "toggle-picker";

/// Class of the element `mount_hidden` measures and `place` moves.
pub const SURFACE_CLASS: &str = "affordance";
/// Class of the container the surface is mounted into.
pub const STAGE_CLASS: &str = "stage";

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonView {
    pub provider: ProviderId,
    pub icon_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayView {
    Buttons(Vec<ButtonView>),
    Picker { expanded: bool, items: Vec<ButtonView> },
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn icon_html(button: &ButtonView) -> String {
    match &button.icon_url {
        Some(url) => format!(
            r#"<img class="icon" src="{}" alt="" draggable="false">"#,
            escape_html(url)
        ),
        None => format!(
            r#"<span class="glyph" aria-hidden="true">{}</span>"#,
            escape_html(&button.provider.glyph().to_string())
        ),
    }
}

fn provider_button_html(button: &ButtonView, class: &str, with_label: bool) -> String {
    let label = escape_html(button.provider.label());
    let text = if with_label {
        format!(r#"<span class="label">{label}</span>"#)
    } else {
        String::new()
    };
    format!(
        r#"<button type="button" class="{class}" {ACTION_ATTR}="{ACTION_LAUNCH}" {PROVIDER_ATTR}="{key}" title="Ask {label}" aria-label="Ask {label}">{icon}{text}</button>"#,
        key = button.provider.key(),
        icon = icon_html(button),
    )
}

/// Markup for one overlay. The root starts in the measuring phase so it
/// can be laid out without being seen.
pub fn generate_overlay_html(view: &OverlayView) -> String {
    let layout = match view {
        OverlayView::Buttons(_) => "row",
        OverlayView::Picker { .. } => "column",
    };
    let body = match view {
        OverlayView::Buttons(buttons) => buttons
            .iter()
            .map(|b| provider_button_html(b, "provider", false))
            .collect::<Vec<_>>()
            .join(""),
        OverlayView::Picker { expanded, items } => {
            let menu = if *expanded {
                let entries = items
                    .iter()
                    .map(|b| provider_button_html(b, "menu-item", true))
                    .collect::<Vec<_>>()
                    .join("");
                format!(r#"<div class="menu" role="menu">{entries}</div>"#)
            } else {
                String::new()
            };
            format!(
                r#"<button type="button" class="trigger" {ACTION_ATTR}="{ACTION_TOGGLE_PICKER}" aria-haspopup="menu" aria-expanded="{expanded}" title="Ask about selection" aria-label="Ask about selection"><span class="glyph" aria-hidden="true">?</span></button>{menu}"#
            )
        }
    };
    format!(
        r#"<div class="{SURFACE_CLASS} {layout}" role="toolbar" aria-label="Ask about selection" {PHASE_ATTR}="{PHASE_MEASURING}">{body}</div>"#
    )
}

fn light_tokens() -> &'static str {
    r#"
    --sa-bg: rgba(255, 255, 255, 0.96);
    --sa-fg: #1f1f24;
    --sa-border: rgba(0, 0, 0, 0.12);
    --sa-hover: rgba(0, 0, 0, 0.06);
    --sa-shadow: 0 4px 14px rgba(0, 0, 0, 0.18);
"#
}

fn dark_tokens() -> &'static str {
    r#"
    --sa-bg: rgba(28, 28, 36, 0.94);
    --sa-fg: #eeeeee;
    --sa-border: rgba(255, 255, 255, 0.14);
    --sa-hover: rgba(255, 255, 255, 0.1);
    --sa-shadow: 0 4px 14px rgba(0, 0, 0, 0.45);
"#
}

/// Stylesheet for the isolated root. Every token lives on `:host`, nothing
/// is declared on the page.
pub fn generate_css(theme: ThemeMode) -> String {
    let palette = match theme {
        ThemeMode::Light => format!(":host {{{}}}", light_tokens()),
        ThemeMode::Dark => format!(":host {{{}}}", dark_tokens()),
        ThemeMode::System => format!(
            ":host {{{}}}\n@media (prefers-color-scheme: dark) {{\n:host {{{}}}\n}}",
            light_tokens(),
            dark_tokens()
        ),
    };

    format!(
        r#":host {{
    all: initial;
    --sa-space: 4px;
    --sa-radius: 10px;
    --sa-button: 28px;
    --sa-font-size: 13px;
}}
{palette}
* {{ margin: 0; padding: 0; box-sizing: border-box; }}

.{STAGE_CLASS} {{
    position: fixed;
    top: 0;
    left: 0;
    width: 0;
    height: 0;
}}

.{SURFACE_CLASS} {{
    position: fixed;
    top: 0;
    left: 0;
    display: flex;
    flex-direction: column;
    gap: var(--sa-space);
    padding: var(--sa-space);
    border-radius: var(--sa-radius);
    border: 1px solid var(--sa-border);
    background: var(--sa-bg);
    color: var(--sa-fg);
    box-shadow: var(--sa-shadow);
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    font-size: var(--sa-font-size);
    line-height: 1.2;
    pointer-events: auto;
    user-select: none;
    opacity: 0;
    transform: translateY(4px) scale(0.98);
    transition: opacity 0.12s ease-out, transform 0.12s cubic-bezier(0.25, 1, 0.5, 1);
}}

.{SURFACE_CLASS}.row {{
    flex-direction: row;
}}

.{SURFACE_CLASS}[{PHASE_ATTR}="{PHASE_MEASURING}"] {{
    visibility: hidden;
    transform: none;
    transition: none;
}}

.{SURFACE_CLASS}[{PHASE_ATTR}="{PHASE_ENTERED}"] {{
    opacity: 1;
    transform: none;
}}

button {{
    display: flex;
    align-items: center;
    justify-content: center;
    gap: 6px;
    min-width: var(--sa-button);
    height: var(--sa-button);
    padding: 0 6px;
    border: none;
    border-radius: calc(var(--sa-radius) - var(--sa-space));
    background: transparent;
    color: inherit;
    font: inherit;
    cursor: pointer;
}}

button:hover, button:focus-visible {{
    background: var(--sa-hover);
    outline: none;
}}

button:active {{
    transform: scale(0.96);
}}

.icon {{
    width: 18px;
    height: 18px;
    display: block;
}}

.glyph {{
    font-weight: 600;
    width: 18px;
    text-align: center;
}}

.menu {{
    display: flex;
    flex-direction: column;
    gap: 2px;
}}

.menu-item {{
    justify-content: flex-start;
    white-space: nowrap;
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons(providers: &[ProviderId]) -> Vec<ButtonView> {
        providers
            .iter()
            .map(|p| ButtonView {
                provider: *p,
                icon_url: None,
            })
            .collect()
    }

    fn provider_order(html: &str) -> Vec<&str> {
        html.split(&format!(r#"{PROVIDER_ATTR}=""#))
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect()
    }

    #[test]
    fn buttons_render_in_given_order() {
        let html = generate_overlay_html(&OverlayView::Buttons(buttons(&[
            ProviderId::Claude,
            ProviderId::Google,
        ])));
        assert_eq!(provider_order(&html), vec!["claude", "google"]);
        assert!(html.contains(r#"data-phase="measuring""#));
    }

    #[test]
    fn collapsed_picker_lists_nothing() {
        let items = buttons(&ProviderId::ALL);
        let html = generate_overlay_html(&OverlayView::Picker {
            expanded: false,
            items: items.clone(),
        });
        assert!(provider_order(&html).is_empty());
        assert!(html.contains(r#"aria-expanded="false""#));

        let html = generate_overlay_html(&OverlayView::Picker { expanded: true, items });
        assert_eq!(provider_order(&html), vec!["google", "chatgpt", "claude"]);
        assert!(html.contains(ACTION_TOGGLE_PICKER));
    }

    #[test]
    fn icon_url_is_escaped_and_glyph_is_fallback() {
        let html = generate_overlay_html(&OverlayView::Buttons(vec![
            ButtonView {
                provider: ProviderId::Google,
                icon_url: Some(r#"chrome-extension://id/icons/google.svg?"x"#.into()),
            },
            ButtonView {
                provider: ProviderId::ChatGpt,
                icon_url: None,
            },
        ]));
        assert!(html.contains("google.svg?&quot;x"));
        assert!(html.contains(r#"<span class="glyph" aria-hidden="true">C</span>"#));
    }

    #[test]
    fn measuring_phase_lays_out_at_final_size() {
        let css = generate_css(ThemeMode::System);
        let selector = format!(r#"[{PHASE_ATTR}="{PHASE_MEASURING}"] {{"#);
        let start = css.find(&selector).expect("measuring rule present");
        let rule = &css[start..start + css[start..].find('}').expect("rule closed")];
        assert!(rule.contains("visibility: hidden"));
        assert!(rule.contains("transform: none"));
    }

    #[test]
    fn system_theme_declares_both_palettes_on_host_only() {
        let css = generate_css(ThemeMode::System);
        assert!(css.contains("prefers-color-scheme: dark"));
        assert!(!css.contains("html {") && !css.contains("body {"));

        let css = generate_css(ThemeMode::Dark);
        assert!(!css.contains("prefers-color-scheme"));
        assert!(css.contains("rgba(28, 28, 36, 0.94)"));
    }
}
