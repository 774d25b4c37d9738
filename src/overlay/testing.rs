//! In-memory page used by the scenario tests.

use super::geometry::{Point, Rect, Size, Viewport};
use super::host::{
    Hit, NodeTraits, OcclusionProbe, OverlayDom, RawSelection, Scheduler, SelectionSource, TabRelay,
    Task, TaskHandle,
};
use super::html::{PHASE_ENTERED, PHASE_MEASURING, PHASE_SHOWN};
use crate::error::HostError;

/// One anchor element in the fake document.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FakeAnchor {
    pub id: u32,
    pub marker: String,
}

#[derive(Debug)]
pub(crate) struct FakeHost {
    pub selection: Result<Option<RawSelection>, HostError>,
    /// Every anchor currently in the document, ours included.
    pub anchors: Vec<FakeAnchor>,
    /// Id of the anchor the session installed, while it is attached.
    pub own_anchor: Option<u32>,
    next_anchor_id: u32,
    /// Anchors removed by the stale sweep.
    pub swept: Vec<u32>,
    /// Anchors removed through `remove_anchor`.
    pub detached: Vec<u32>,
    pub stylesheet: Option<String>,
    pub mounted: Option<String>,
    pub phase: Option<&'static str>,
    pub position: Option<Point>,
    pub measured: Size,
    pub mounts: usize,
    /// Mounts that happened while another tree was still attached.
    pub stacked_mounts: usize,
    pub viewport: Viewport,
    pub scroll: Point,
    pub occluders: Vec<Hit>,
    pub pending: Vec<(TaskHandle, Task)>,
    pub cancelled: Vec<TaskHandle>,
    next_handle: u64,
    pub open_requests: Vec<String>,
    pub direct_opens: Vec<String>,
    pub direct_open_fails: bool,
    pub assets: bool,
    pub fail_mount: bool,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            selection: Ok(None),
            anchors: Vec::new(),
            own_anchor: None,
            next_anchor_id: 0,
            swept: Vec::new(),
            detached: Vec::new(),
            stylesheet: None,
            mounted: None,
            phase: None,
            position: None,
            measured: Size::new(96.0, 36.0),
            mounts: 0,
            stacked_mounts: 0,
            viewport: Viewport::new(1280.0, 720.0),
            scroll: Point::default(),
            occluders: Vec::new(),
            pending: Vec::new(),
            cancelled: Vec::new(),
            next_handle: 0,
            open_requests: Vec::new(),
            direct_opens: Vec::new(),
            direct_open_fails: false,
            assets: false,
            fail_mount: false,
        }
    }
}

impl FakeHost {
    /// A plain-paragraph selection whose focus point sits at `focus`.
    pub fn select(&mut self, text: &str, focus: Rect) {
        self.selection = Ok(Some(RawSelection {
            text: text.to_string(),
            collapsed: false,
            anchor_chain: vec![
                NodeTraits::element("p"),
                NodeTraits::element("body"),
                NodeTraits::element("html"),
            ],
            focus_rect: Some(focus),
            bounding_rect: Rect::new(focus.left - 80.0, focus.top, 80.0, focus.height),
        }));
    }

    pub fn select_in(&mut self, text: &str, chain: Vec<NodeTraits>) {
        self.selection = Ok(Some(RawSelection {
            text: text.to_string(),
            collapsed: false,
            anchor_chain: chain,
            focus_rect: Some(Rect::new(400.0, 300.0, 0.0, 18.0)),
            bounding_rect: Rect::new(320.0, 300.0, 80.0, 18.0),
        }));
    }

    /// Puts an anchor into the document that the session did not create,
    /// as left behind by an earlier lifecycle.
    pub fn plant_anchor(&mut self, marker: &str) -> u32 {
        self.next_anchor_id += 1;
        let id = self.next_anchor_id;
        self.anchors.push(FakeAnchor {
            id,
            marker: marker.to_string(),
        });
        id
    }

    pub fn anchor_ids(&self) -> Vec<u32> {
        self.anchors.iter().map(|a| a.id).collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection = Ok(None);
    }

    /// Drains the pending tasks of `kind`, oldest first.
    pub fn take_pending(&mut self, kind: Task) -> Vec<TaskHandle> {
        let (due, rest): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|(_, t)| *t == kind);
        self.pending = rest;
        due.into_iter().map(|(h, _)| h).collect()
    }

    pub fn overlay_rect(&self) -> Option<Rect> {
        self.position
            .filter(|_| self.mounted.is_some())
            .map(|p| Rect::from_origin_size(p, self.measured))
    }

    fn issue(&mut self, task: Task) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.pending.push((handle, task));
        handle
    }
}

impl SelectionSource for FakeHost {
    fn read_selection(&mut self) -> Result<Option<RawSelection>, HostError> {
        self.selection.clone()
    }
}

impl OcclusionProbe for FakeHost {
    fn hits_at(&mut self, point: Point) -> Vec<Hit> {
        self.occluders
            .iter()
            .filter(|h| h.rect.contains(point))
            .copied()
            .collect()
    }
}

impl OverlayDom for FakeHost {
    fn remove_stale_anchors(&mut self, marker: &str) -> usize {
        let own = self.own_anchor;
        let (stale, kept): (Vec<_>, Vec<_>) = self
            .anchors
            .drain(..)
            .partition(|a| a.marker == marker && Some(a.id) != own);
        self.anchors = kept;
        self.swept.extend(stale.iter().map(|a| a.id));
        stale.len()
    }

    fn install_anchor(&mut self, marker: &str, stylesheet: &str) -> Result<(), HostError> {
        let id = self.plant_anchor(marker);
        self.own_anchor = Some(id);
        self.stylesheet = Some(stylesheet.to_string());
        Ok(())
    }

    fn remove_anchor(&mut self) {
        if let Some(id) = self.own_anchor.take() {
            self.anchors.retain(|a| a.id != id);
            self.detached.push(id);
        }
        self.mounted = None;
        self.stylesheet = None;
    }

    fn mount_hidden(&mut self, markup: &str) -> Result<Size, HostError> {
        if self.fail_mount {
            return Err(HostError::Dom("appendChild failed".into()));
        }
        if self.own_anchor.is_none() {
            return Err(HostError::Dom("no anchor".into()));
        }
        if self.mounted.is_some() {
            self.stacked_mounts += 1;
        }
        self.mounts += 1;
        self.mounted = Some(markup.to_string());
        self.phase = Some(PHASE_MEASURING);
        self.position = None;
        Ok(self.measured)
    }

    fn place(&mut self, position: Point) {
        self.position = Some(position);
    }

    fn reveal(&mut self) {
        self.phase = Some(PHASE_SHOWN);
    }

    fn start_transition(&mut self) {
        self.phase = Some(PHASE_ENTERED);
    }

    fn unmount(&mut self) {
        self.mounted = None;
        self.phase = None;
        self.position = None;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_position(&self) -> Point {
        self.scroll
    }

    fn asset_url(&self, path: &str) -> Option<String> {
        self.assets.then(|| format!("chrome-extension://test/{path}"))
    }
}

impl Scheduler for FakeHost {
    fn schedule(&mut self, task: Task, _delay_ms: u32) -> TaskHandle {
        self.issue(task)
    }

    fn next_frame(&mut self, task: Task) -> TaskHandle {
        self.issue(task)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.pending.retain(|(h, _)| *h != handle);
        self.cancelled.push(handle);
    }
}

impl TabRelay for FakeHost {
    fn request_open(&mut self, url: &str) {
        self.open_requests.push(url.to_string());
    }

    fn open_direct(&mut self, url: &str) -> Result<(), HostError> {
        if self.direct_open_fails {
            return Err(HostError::Relay("popup blocked".into()));
        }
        self.direct_opens.push(url.to_string());
        Ok(())
    }
}
