//! Selection watcher: turns input events into show/hide decisions.

use super::geometry::Rect;
use super::host::{EditableFlag, NodeTraits, RawSelection, Scheduler, SelectionSource, Task, TaskHandle};

// --- SNAPSHOT ---

/// The selection as it was at one evaluation. Never updated in place; the
/// next evaluation produces a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSnapshot {
    /// Trimmed selected text.
    pub text: String,
    pub focus_rect: Option<Rect>,
    pub bounding_rect: Rect,
}

impl SelectionSnapshot {
    /// The rect the overlay is placed against: the focus point when it has
    /// any extent, otherwise the whole selection.
    pub fn reference_rect(&self) -> Rect {
        match self.focus_rect {
            Some(rect) if !rect.is_degenerate() => rect,
            _ => self.bounding_rect,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HideReason {
    NoSelection,
    Collapsed,
    Blank,
    Editable,
    Unreadable,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectionVerdict {
    Show(SelectionSnapshot),
    Hide(HideReason),
}

// --- EVALUATION ---

/// Whether the anchor sits in something the user is typing into.
///
/// Text controls anywhere up the chain count. For `contenteditable` the
/// nearest element that sets the attribute decides, so an explicit `false`
/// island inside an editor is not editable.
pub fn is_editable_origin(chain: &[NodeTraits]) -> bool {
    if chain.iter().any(|n| n.tag == "input" || n.tag == "textarea") {
        return true;
    }
    for node in chain {
        match node.editable {
            EditableFlag::On | EditableFlag::PlaintextOnly => return true,
            EditableFlag::Off => return false,
            EditableFlag::Inherit => {}
        }
    }
    false
}

pub fn snapshot_from(raw: RawSelection) -> SelectionVerdict {
    if raw.collapsed {
        return SelectionVerdict::Hide(HideReason::Collapsed);
    }
    let text = raw.text.trim();
    if text.is_empty() {
        return SelectionVerdict::Hide(HideReason::Blank);
    }
    if is_editable_origin(&raw.anchor_chain) {
        return SelectionVerdict::Hide(HideReason::Editable);
    }
    SelectionVerdict::Show(SelectionSnapshot {
        text: text.to_string(),
        focus_rect: raw.focus_rect,
        bounding_rect: raw.bounding_rect,
    })
}

/// Read the live selection once and decide what to do with it.
pub fn evaluate_selection<S: SelectionSource + ?Sized>(source: &mut S) -> SelectionVerdict {
    match source.read_selection() {
        Ok(Some(raw)) => snapshot_from(raw),
        Ok(None) => SelectionVerdict::Hide(HideReason::NoSelection),
        Err(err) => {
            tracing::debug!(%err, "selection read failed");
            SelectionVerdict::Hide(HideReason::Unreadable)
        }
    }
}

// --- DEBOUNCE ---

/// Owns the single pending evaluation. Scheduling a new one cancels the
/// previous, so the latest input event always wins.
#[derive(Debug)]
pub struct SelectionWatcher {
    debounce_ms: u32,
    pending: Option<TaskHandle>,
}

impl SelectionWatcher {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            pending: None,
        }
    }

    pub fn schedule<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(prev) = self.pending.take() {
            scheduler.cancel(prev);
        }
        self.pending = Some(scheduler.schedule(Task::EvaluateSelection, self.debounce_ms));
    }

    pub fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(prev) = self.pending.take() {
            scheduler.cancel(prev);
        }
    }

    /// Claims a fired task. Returns false for anything but the current one.
    pub fn take_due(&mut self, handle: TaskHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
