//! Seams between the overlay core and the page it runs in.
//!
//! The core never touches browser objects. Everything it needs from the
//! page goes through the traits below; the browser binding implements them
//! with `web-sys`, the tests with an in-memory fake.

use super::geometry::{Point, Rect, Size, Viewport};
use crate::error::HostError;

// --- SELECTION ---

/// The `contenteditable` attribute as written on one element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditableFlag {
    /// Absent or invalid: inherits from the parent.
    #[default]
    Inherit,
    On,
    PlaintextOnly,
    Off,
}

impl EditableFlag {
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            None => EditableFlag::Inherit,
            Some(v) => match v.as_str() {
                "" | "true" => EditableFlag::On,
                "plaintext-only" => EditableFlag::PlaintextOnly,
                "false" => EditableFlag::Off,
                _ => EditableFlag::Inherit,
            },
        }
    }
}

/// What the core needs to know about one element on the anchor's ancestry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeTraits {
    /// Lowercase tag name.
    pub tag: String,
    pub editable: EditableFlag,
}

impl NodeTraits {
    pub fn new(tag: &str, editable: EditableFlag) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            editable,
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::new(tag, EditableFlag::Inherit)
    }
}

/// One read of the live selection, owned and detached from the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSelection {
    pub text: String,
    pub collapsed: bool,
    /// Elements from the anchor node's nearest element up to the root.
    pub anchor_chain: Vec<NodeTraits>,
    /// Rect of the collapsed range at the focus point, when measurable.
    pub focus_rect: Option<Rect>,
    pub bounding_rect: Rect,
}

pub trait SelectionSource {
    /// `Ok(None)` when the page has no selection range at all.
    fn read_selection(&mut self) -> Result<Option<RawSelection>, HostError>;
}

// --- OCCLUSION ---

/// Identity of a page element within one placement pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementKey(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Positioning {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Positioning {
    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "absolute" => Positioning::Absolute,
            "fixed" => Positioning::Fixed,
            "sticky" | "-webkit-sticky" => Positioning::Sticky,
            "relative" => Positioning::Relative,
            _ => Positioning::Static,
        }
    }

    /// Out-of-flow schemes that can float over the overlay's spot.
    pub fn is_layered(&self) -> bool {
        matches!(
            self,
            Positioning::Absolute | Positioning::Fixed | Positioning::Sticky
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayRelation {
    Unrelated,
    /// The element is the overlay's anchor itself.
    Overlay,
    /// The element is an ancestor of the anchor (html, body, ...).
    ContainsOverlay,
    /// The element lives inside the overlay's tree.
    InsideOverlay,
}

/// One element stacked at a sampled point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub key: ElementKey,
    pub rect: Rect,
    pub positioning: Positioning,
    pub visible: bool,
    pub relation: OverlayRelation,
}

impl Hit {
    pub fn occludes(&self) -> bool {
        self.visible && self.positioning.is_layered() && self.relation == OverlayRelation::Unrelated
    }
}

pub trait OcclusionProbe {
    /// Elements under `point`, topmost first.
    fn hits_at(&mut self, point: Point) -> Vec<Hit>;
}

// --- DOM ---

pub trait OverlayDom {
    /// Remove every anchor carrying `marker`, returning how many were found.
    fn remove_stale_anchors(&mut self, marker: &str) -> usize;

    /// Insert the fixed, zero-size anchor and its encapsulated root holding
    /// `stylesheet`.
    fn install_anchor(&mut self, marker: &str, stylesheet: &str) -> Result<(), HostError>;

    fn remove_anchor(&mut self);

    /// Attach `markup` invisibly inside the isolated root and measure it.
    /// This is the one forced layout of a show.
    fn mount_hidden(&mut self, markup: &str) -> Result<Size, HostError>;

    fn place(&mut self, position: Point);

    /// Drop the invisibility flag.
    fn reveal(&mut self);

    /// Start the enter transition.
    fn start_transition(&mut self);

    /// Remove the overlay tree, leaving the anchor in place.
    fn unmount(&mut self);

    fn viewport(&self) -> Viewport;

    fn scroll_position(&self) -> Point;

    /// Resolve a bundled asset to a URL the page can load.
    fn asset_url(&self, path: &str) -> Option<String>;
}

// --- SCHEDULING ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    EvaluateSelection,
    StartTransition,
}

pub trait Scheduler {
    fn schedule(&mut self, task: Task, delay_ms: u32) -> TaskHandle;

    fn next_frame(&mut self, task: Task) -> TaskHandle;

    /// Cancelling an already fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TaskHandle);
}

// --- TAB RELAY ---

pub trait TabRelay {
    /// Ask the privileged relay to open `url`. The outcome arrives later as
    /// a `TabRequestSettled` page event.
    fn request_open(&mut self, url: &str);

    /// Open `url` from the page itself.
    fn open_direct(&mut self, url: &str) -> Result<(), HostError>;
}

/// Everything the page session needs from its environment.
pub trait Host: SelectionSource + OcclusionProbe + OverlayDom + Scheduler + TabRelay {}

impl<T> Host for T where T: SelectionSource + OcclusionProbe + OverlayDom + Scheduler + TabRelay {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contenteditable_attribute_values() {
        assert_eq!(EditableFlag::from_attribute(None), EditableFlag::Inherit);
        assert_eq!(EditableFlag::from_attribute(Some("")), EditableFlag::On);
        assert_eq!(EditableFlag::from_attribute(Some("TRUE")), EditableFlag::On);
        assert_eq!(
            EditableFlag::from_attribute(Some("plaintext-only")),
            EditableFlag::PlaintextOnly
        );
        assert_eq!(EditableFlag::from_attribute(Some("false")), EditableFlag::Off);
        assert_eq!(EditableFlag::from_attribute(Some("maybe")), EditableFlag::Inherit);
    }

    #[test]
    fn only_visible_layered_strangers_occlude() {
        let hit = Hit {
            key: ElementKey(1),
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            positioning: Positioning::Fixed,
            visible: true,
            relation: OverlayRelation::Unrelated,
        };
        assert!(hit.occludes());
        assert!(!Hit { visible: false, ..hit }.occludes());
        assert!(!Hit { positioning: Positioning::Static, ..hit }.occludes());
        assert!(!Hit { relation: OverlayRelation::ContainsOverlay, ..hit }.occludes());
        assert!(!Hit { relation: OverlayRelation::Overlay, ..hit }.occludes());
    }
}
