//! Overlay lifecycle: build, measure, place, reveal, and tear down the one
//! overlay tree.

use super::geometry::{Point, Size};
use super::host::{Host, OverlayDom, Task, TabRelay, TaskHandle};
use super::html::{generate_overlay_html, ButtonView, OverlayView};
use super::isolation::IsolationBoundary;
use super::placement::{resolve_placement, PlacementCandidate, PlacementRequest, SampledOverlapScorer};
use super::text_selection::SelectionSnapshot;
use crate::config::{DisplayMode, Settings, Tuning};
use crate::error::HostError;
use crate::providers::{cap_query, ProviderId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayState {
    Absent,
    /// Attached invisibly for measurement.
    Rendering,
    /// Positioned and revealed.
    Visible,
}

#[derive(Debug)]
struct ActiveOverlay {
    snapshot: SelectionSnapshot,
    picker_expanded: bool,
    placement: PlacementCandidate,
    scroll_origin: Point,
    transition: Option<TaskHandle>,
}

/// Builds the view for the enabled providers, or `None` when there is
/// nothing to offer.
pub fn build_view<D: OverlayDom + ?Sized>(
    settings: &Settings,
    dom: &D,
    picker_expanded: bool,
) -> Option<OverlayView> {
    let providers = settings.enabled_in_order();
    if providers.is_empty() {
        return None;
    }
    let buttons: Vec<ButtonView> = providers
        .into_iter()
        .map(|provider| ButtonView {
            provider,
            icon_url: dom.asset_url(provider.icon_path()),
        })
        .collect();
    Some(match settings.display_mode {
        DisplayMode::Buttons => OverlayView::Buttons(buttons),
        DisplayMode::Picker => OverlayView::Picker {
            expanded: picker_expanded,
            items: buttons,
        },
    })
}

/// Owner of the overlay tree. Every path that removes the overlay goes
/// through [`OverlayManager::hide`].
#[derive(Debug)]
pub struct OverlayManager {
    tuning: Tuning,
    state: OverlayState,
    active: Option<ActiveOverlay>,
}

impl OverlayManager {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            state: OverlayState::Absent,
            active: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_present(&self) -> bool {
        self.state != OverlayState::Absent
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.active.as_ref().map(|a| &a.snapshot)
    }

    pub fn placement(&self) -> Option<PlacementCandidate> {
        self.active.as_ref().map(|a| a.placement)
    }

    /// Show an overlay for `snapshot`, replacing any existing one without
    /// waiting for animations.
    pub fn show<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        boundary: &mut IsolationBoundary,
        settings: &Settings,
        snapshot: SelectionSnapshot,
    ) -> Result<(), HostError> {
        self.hide(host);
        self.render(host, boundary, settings, snapshot, false)
    }

    fn render<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        boundary: &mut IsolationBoundary,
        settings: &Settings,
        snapshot: SelectionSnapshot,
        picker_expanded: bool,
    ) -> Result<(), HostError> {
        let Some(view) = build_view(settings, host, picker_expanded) else {
            tracing::debug!("no providers enabled, overlay not rendered");
            return Ok(());
        };
        boundary.install(host, settings.theme_mode)?;

        self.state = OverlayState::Rendering;
        let measured = match host.mount_hidden(&generate_overlay_html(&view)) {
            Ok(size) => size,
            Err(err) => {
                self.hide(host);
                return Err(err);
            }
        };

        let fallback = self.tuning.fallback_overlay_size;
        let request = PlacementRequest {
            anchor: snapshot.reference_rect(),
            overlay: measured.or_min(Size::new(fallback, fallback)),
            viewport: host.viewport(),
            offset: self.tuning.offset,
            margin: self.tuning.margin,
        };
        let placement = resolve_placement(&request, &mut SampledOverlapScorer::new(&mut *host));
        tracing::debug!(side = ?placement.side, overlap = placement.overlap, "overlay placed");

        host.place(placement.position());
        host.reveal();
        let transition = host.next_frame(Task::StartTransition);

        self.state = OverlayState::Visible;
        self.active = Some(ActiveOverlay {
            snapshot,
            picker_expanded,
            placement,
            scroll_origin: host.scroll_position(),
            transition: Some(transition),
        });
        Ok(())
    }

    /// Remove the overlay tree. Safe to call in any state; returns whether
    /// anything was removed.
    pub fn hide<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.state == OverlayState::Absent {
            return false;
        }
        if let Some(handle) = self.active.take().and_then(|a| a.transition) {
            host.cancel(handle);
        }
        host.unmount();
        self.state = OverlayState::Absent;
        true
    }

    /// Next-frame callback: starts the enter transition if `handle` is the
    /// one scheduled for the current overlay.
    pub fn on_frame<H: Host + ?Sized>(&mut self, host: &mut H, handle: TaskHandle) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.transition != Some(handle) {
            return false;
        }
        active.transition = None;
        host.start_transition();
        true
    }

    /// Re-render the current overlay with new settings (button set, order,
    /// mode). Hidden when nothing is enabled any more.
    pub fn refresh<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        boundary: &mut IsolationBoundary,
        settings: &Settings,
    ) -> Result<(), HostError> {
        let Some(snapshot) = self.snapshot().cloned() else {
            return Ok(());
        };
        self.hide(host);
        self.render(host, boundary, settings, snapshot, false)
    }

    pub fn toggle_picker<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        boundary: &mut IsolationBoundary,
        settings: &Settings,
    ) -> Result<(), HostError> {
        if settings.display_mode != DisplayMode::Picker {
            return Ok(());
        }
        let Some(active) = self.active.as_ref() else {
            return Ok(());
        };
        let snapshot = active.snapshot.clone();
        let expanded = !active.picker_expanded;
        self.hide(host);
        self.render(host, boundary, settings, snapshot, expanded)
    }

    /// Send the snapshot to `provider` and hide, without waiting for the
    /// relay. Returns the URL requested, if an overlay was showing.
    pub fn launch<H: Host + ?Sized>(&mut self, host: &mut H, provider: ProviderId) -> Option<String> {
        let text = self.snapshot()?.text.clone();
        let url = provider.deep_link(cap_query(&text, self.tuning.max_query_chars));
        tracing::debug!(provider = provider.key(), chars = text.chars().count(), "launching provider");
        host.request_open(&url);
        self.hide(host);
        Some(url)
    }

    /// Whether the document has scrolled far enough from where the overlay
    /// was shown to dismiss it.
    pub fn scrolled_past_threshold(&self, current: Point) -> bool {
        let Some(active) = self.active.as_ref() else {
            return false;
        };
        let dx = (current.x - active.scroll_origin.x).abs();
        let dy = (current.y - active.scroll_origin.y).abs();
        dx.max(dy) > self.tuning.scroll_threshold
    }
}

/// Completion of a relay request: fall back to opening from the page.
pub fn settle_open_request<R: TabRelay + ?Sized>(relay: &mut R, url: &str, outcome: Result<(), String>) {
    let Err(reason) = outcome else {
        return;
    };
    tracing::warn!(%reason, "relay could not open tab, opening directly");
    if let Err(err) = relay.open_direct(url) {
        tracing::error!(%err, "direct open failed");
    }
}
