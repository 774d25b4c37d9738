//! Isolation boundary: the one anchor element and its encapsulated root.

use super::host::OverlayDom;
use super::html::generate_css;
use crate::config::ThemeMode;
use crate::error::HostError;

/// Attribute carried by every anchor this extension inserts. Used to find
/// leftovers from an earlier lifecycle.
pub const ANCHOR_MARKER: &str = "data-selection-ask-root";

#[derive(Debug, Default)]
pub struct IsolationBoundary {
    installed: Option<ThemeMode>,
}

impl IsolationBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    pub fn theme(&self) -> Option<ThemeMode> {
        self.installed
    }

    /// Ensure exactly one anchor exists, styled for `theme`. Stale anchors
    /// are swept before a new one is created.
    pub fn install<D: OverlayDom + ?Sized>(
        &mut self,
        dom: &mut D,
        theme: ThemeMode,
    ) -> Result<(), HostError> {
        match self.installed {
            Some(current) if current == theme => return Ok(()),
            Some(_) => self.teardown(dom),
            None => {}
        }
        let stale = dom.remove_stale_anchors(ANCHOR_MARKER);
        if stale > 0 {
            tracing::debug!(stale, "removed stale overlay anchors");
        }
        dom.install_anchor(ANCHOR_MARKER, &generate_css(theme))?;
        self.installed = Some(theme);
        Ok(())
    }

    pub fn teardown<D: OverlayDom + ?Sized>(&mut self, dom: &mut D) {
        if self.installed.take().is_some() {
            dom.remove_anchor();
        }
    }
}
