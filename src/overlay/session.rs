//! Page session: the single owned instance that routes page events to the
//! watcher, the lifecycle manager and the isolation boundary.

use super::events::{Key, OverlayAction, PageEvent};
use super::host::{Host, Task, TaskHandle};
use super::isolation::IsolationBoundary;
use super::lifecycle::{settle_open_request, OverlayManager, OverlayState};
use super::text_selection::{evaluate_selection, SelectionSnapshot, SelectionVerdict, SelectionWatcher};
use crate::config::{Settings, Tuning};

pub struct PageSession<H: Host> {
    host: H,
    settings: Settings,
    tuning: Tuning,
    watcher: SelectionWatcher,
    overlay: OverlayManager,
    boundary: IsolationBoundary,
    /// A press that started inside the overlay has not been released yet.
    pressing_overlay: bool,
}

impl<H: Host> PageSession<H> {
    pub fn new(host: H, settings: Settings, tuning: Tuning) -> Self {
        Self {
            host,
            settings,
            tuning,
            watcher: SelectionWatcher::new(tuning.debounce_ms),
            overlay: OverlayManager::new(tuning),
            boundary: IsolationBoundary::new(),
            pressing_overlay: false,
        }
    }

    /// Insert the isolation anchor, sweeping anything left by a previous
    /// lifecycle.
    pub fn start(&mut self) {
        if let Err(err) = self.boundary.install(&mut self.host, self.settings.theme_mode) {
            tracing::warn!(%err, "could not install overlay anchor");
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn overlay(&self) -> &OverlayManager {
        &self.overlay
    }

    pub fn handle(&mut self, event: PageEvent) {
        match event {
            PageEvent::PointerUp { inside_overlay } => {
                self.pressing_overlay = false;
                if !inside_overlay {
                    self.watcher.schedule(&mut self.host);
                }
            }
            PageEvent::KeyUp { key, inside_overlay } => {
                if key != Key::Escape && !inside_overlay {
                    self.watcher.schedule(&mut self.host);
                }
            }
            PageEvent::KeyDown { key: Key::Escape } => self.hide(),
            PageEvent::KeyDown { key: Key::Other } => {}
            PageEvent::PointerDown { inside_overlay } => {
                self.pressing_overlay = inside_overlay && self.overlay.is_present();
                if !inside_overlay {
                    self.hide();
                }
            }
            PageEvent::Scroll {
                inside_overlay,
                document,
            } => self.on_scroll(inside_overlay, document),
            PageEvent::SelectionChanged => self.on_selection_changed(),
            PageEvent::TaskDue { handle, task } => self.on_task(handle, task),
            PageEvent::Action(action) => self.on_action(action),
            PageEvent::SettingsChanged(settings) => self.apply_settings(settings),
            PageEvent::TabRequestSettled { url, outcome } => {
                settle_open_request(&mut self.host, &url, outcome)
            }
            PageEvent::PageHide => self.hide(),
            PageEvent::PageShow { persisted } => {
                if persisted {
                    self.reinitialize();
                }
            }
        }
    }

    /// The one teardown path: cancels any pending evaluation and removes the
    /// overlay. Idempotent.
    pub fn hide(&mut self) {
        self.watcher.cancel(&mut self.host);
        self.pressing_overlay = false;
        if self.overlay.hide(&mut self.host) {
            tracing::debug!("overlay hidden");
        }
    }

    fn show(&mut self, snapshot: SelectionSnapshot) {
        let result = self
            .overlay
            .show(&mut self.host, &mut self.boundary, &self.settings, snapshot);
        if let Err(err) = result {
            tracing::warn!(%err, "overlay could not be shown");
            self.hide();
        }
    }

    fn on_task(&mut self, handle: TaskHandle, task: Task) {
        match task {
            Task::EvaluateSelection => {
                if !self.watcher.take_due(handle) {
                    return;
                }
                match evaluate_selection(&mut self.host) {
                    SelectionVerdict::Show(snapshot) => self.show(snapshot),
                    SelectionVerdict::Hide(reason) => {
                        tracing::trace!(?reason, "selection not actionable");
                        self.hide();
                    }
                }
            }
            Task::StartTransition => {
                self.overlay.on_frame(&mut self.host, handle);
            }
        }
    }

    fn on_scroll(&mut self, inside_overlay: bool, document: bool) {
        if inside_overlay || !self.overlay.is_present() {
            return;
        }
        if !document || self.overlay.scrolled_past_threshold(self.host.scroll_position()) {
            self.hide();
        }
    }

    fn on_selection_changed(&mut self) {
        // pressing a button may collapse the page selection before the click lands
        if !self.overlay.is_present() || self.pressing_overlay {
            return;
        }
        if let SelectionVerdict::Hide(reason) = evaluate_selection(&mut self.host) {
            tracing::trace!(?reason, "selection cleared under overlay");
            self.hide();
        }
    }

    fn on_action(&mut self, action: OverlayAction) {
        match action {
            OverlayAction::Launch(provider) => {
                self.watcher.cancel(&mut self.host);
                if self.overlay.launch(&mut self.host, provider).is_none() {
                    tracing::debug!("launch without a visible overlay ignored");
                }
            }
            OverlayAction::TogglePicker => {
                let result = self
                    .overlay
                    .toggle_picker(&mut self.host, &mut self.boundary, &self.settings);
                if let Err(err) = result {
                    tracing::warn!(%err, "picker could not be toggled");
                    self.hide();
                }
            }
        }
    }

    fn apply_settings(&mut self, settings: Settings) {
        let theme_changed = self.boundary.theme() != Some(settings.theme_mode);
        self.settings = settings;
        if theme_changed && self.boundary.is_installed() {
            let snapshot = self.overlay.snapshot().cloned();
            self.overlay.hide(&mut self.host);
            self.boundary.teardown(&mut self.host);
            self.start();
            if let Some(snapshot) = snapshot {
                self.show(snapshot);
            }
            return;
        }
        let result = self
            .overlay
            .refresh(&mut self.host, &mut self.boundary, &self.settings);
        if let Err(err) = result {
            tracing::warn!(%err, "overlay could not be refreshed");
            self.hide();
        }
    }

    /// Back/forward cache restore: throw away everything from before the
    /// page was frozen and start over.
    fn reinitialize(&mut self) {
        tracing::debug!("page restored from cache, reinitializing");
        self.hide();
        self.boundary.teardown(&mut self.host);
        self.watcher = SelectionWatcher::new(self.tuning.debounce_ms);
        self.overlay = OverlayManager::new(self.tuning);
        self.boundary = IsolationBoundary::new();
        self.start();
    }
}
