//! `Host` implementation over the live page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DomRect, Element, Event, HtmlElement, Node, ShadowRoot, ShadowRootInit, ShadowRootMode, Window};

use super::{dispatch, extension};
use crate::error::HostError;
use crate::messages::{decode_ack, RuntimeMessage};
use crate::overlay::events::{OverlayAction, PageEvent};
use crate::overlay::geometry::{Point, Rect, Size, Viewport};
use crate::overlay::host::{
    EditableFlag, ElementKey, Hit, NodeTraits, OcclusionProbe, OverlayDom, OverlayRelation, Positioning,
    RawSelection, Scheduler, SelectionSource, TabRelay, Task, TaskHandle,
};
use crate::overlay::html::{
    ACTION_ATTR, PHASE_ATTR, PHASE_ENTERED, PHASE_SHOWN, PROVIDER_ATTR, STAGE_CLASS,
};

const ANCHOR_STYLE: &str = "all:initial;position:fixed;top:0;left:0;width:0;height:0;\
pointer-events:none;z-index:2147483647";

fn dom_err(context: &str, value: JsValue) -> HostError {
    HostError::Dom(format!("{context}: {value:?}"))
}

fn to_rect(r: &DomRect) -> Rect {
    Rect::new(r.x(), r.y(), r.width(), r.height())
}

// --- ANCHOR ---

struct Anchor {
    element: Element,
    stage: Element,
    _listeners: [EventListener; 3],
}

impl Anchor {
    fn install(document: &Document, marker: &str, stylesheet: &str) -> Result<Self, HostError> {
        let element = document
            .create_element("div")
            .map_err(|e| dom_err("create anchor", e))?;
        element
            .set_attribute(marker, "")
            .and_then(|_| element.set_attribute("style", ANCHOR_STYLE))
            .map_err(|e| dom_err("configure anchor", e))?;

        let shadow = element
            .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Closed))
            .map_err(|e| dom_err("attach shadow", e))?;
        shadow.set_inner_html(&format!(
            r#"<style>{stylesheet}</style><div class="{STAGE_CLASS}"></div>"#
        ));
        let stage = shadow
            .query_selector(&format!(".{STAGE_CLASS}"))
            .map_err(|e| dom_err("find stage", e))?
            .ok_or_else(|| HostError::Dom("stage missing after install".into()))?;

        let root = document
            .document_element()
            .ok_or_else(|| HostError::Dom("document has no root element".into()))?;
        root.append_child(&element)
            .map_err(|e| dom_err("append anchor", e))?;

        let listeners = Self::listen(&shadow);
        Ok(Self {
            element,
            stage,
            _listeners: listeners,
        })
    }

    fn listen(shadow: &ShadowRoot) -> [EventListener; 3] {
        let click = EventListener::new(shadow, "click", |event: &Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(button)) = target.closest(&format!("[{ACTION_ATTR}]")) else {
                return;
            };
            let action = button.get_attribute(ACTION_ATTR).unwrap_or_default();
            let provider = button.get_attribute(PROVIDER_ATTR);
            if let Some(action) = OverlayAction::from_attrs(&action, provider.as_deref()) {
                event.stop_propagation();
                dispatch(PageEvent::Action(action));
            }
        });
        // Keeps the page selection alive while a button is pressed. The
        // selection moves on mousedown's default action, so both are cancelled.
        let [pointerdown, mousedown] = ["pointerdown", "mousedown"].map(|name| {
            EventListener::new_with_options(
                shadow,
                name,
                gloo::events::EventListenerOptions::enable_prevent_default(),
                |event: &Event| event.prevent_default(),
            )
        });
        [click, pointerdown, mousedown]
    }
}

// --- SCHEDULED TASKS ---

enum Pending {
    Timer { _timeout: Timeout },
    Frame { _frame: AnimationFrame },
}

/// Tasks waiting on the event loop. Dropping an entry cancels it.
#[derive(Default)]
struct TaskTable {
    next: u64,
    pending: HashMap<TaskHandle, Pending>,
    fired: Rc<RefCell<Vec<TaskHandle>>>,
}

impl TaskTable {
    fn issue(&mut self) -> TaskHandle {
        // entries cannot be dropped from inside their own callback
        for handle in self.fired.borrow_mut().drain(..) {
            self.pending.remove(&handle);
        }
        self.next += 1;
        TaskHandle(self.next)
    }

    fn fire(fired: &Rc<RefCell<Vec<TaskHandle>>>, handle: TaskHandle, task: Task) -> impl FnOnce() {
        let fired = Rc::clone(fired);
        move || {
            fired.borrow_mut().push(handle);
            dispatch(PageEvent::TaskDue { handle, task });
        }
    }
}

// --- HOST ---

pub struct WebHost {
    window: Window,
    document: Document,
    anchor: Option<Anchor>,
    mounted: Option<HtmlElement>,
    tasks: TaskTable,
    /// Elements seen by the probe since the last mount, indexed by key.
    seen: Vec<Element>,
}

impl WebHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            anchor: None,
            mounted: None,
            tasks: TaskTable::default(),
            seen: Vec::new(),
        }
    }

    fn intern(&mut self, element: &Element) -> ElementKey {
        let node: &Node = element;
        let index = match self.seen.iter().position(|e| e.is_same_node(Some(node))) {
            Some(i) => i,
            None => {
                self.seen.push(element.clone());
                self.seen.len() - 1
            }
        };
        ElementKey(index as u32)
    }

    fn relation(&self, element: &Element) -> OverlayRelation {
        let Some(anchor) = self.anchor.as_ref().map(|a| &a.element) else {
            return OverlayRelation::Unrelated;
        };
        let anchor_node: &Node = anchor;
        let node: &Node = element;
        if anchor.is_same_node(Some(node)) {
            OverlayRelation::Overlay
        } else if element.contains(Some(anchor_node)) {
            OverlayRelation::ContainsOverlay
        } else if anchor.contains(Some(node)) {
            OverlayRelation::InsideOverlay
        } else {
            OverlayRelation::Unrelated
        }
    }

    fn hit_for(&mut self, element: &Element) -> Hit {
        let (positioning, visible) = match self.window.get_computed_style(element) {
            Ok(Some(style)) => {
                let prop = |name: &str| style.get_property_value(name).unwrap_or_default();
                let opacity = prop("opacity").trim().parse::<f64>().unwrap_or(1.0);
                (
                    Positioning::from_css(&prop("position")),
                    prop("display") != "none" && prop("visibility") != "hidden" && opacity > 0.0,
                )
            }
            _ => (Positioning::Static, true),
        };
        Hit {
            key: self.intern(element),
            rect: to_rect(&element.get_bounding_client_rect()),
            positioning,
            visible,
            relation: self.relation(element),
        }
    }

    /// Ancestry of the selection's anchor node. A focused text field goes
    /// first: selections inside it report the field's container as anchor.
    fn anchor_chain(&self, start: Option<Node>) -> Vec<NodeTraits> {
        let mut chain = Vec::new();
        if let Some(active) = self.document.active_element() {
            let tag = active.tag_name().to_ascii_lowercase();
            if tag == "input" || tag == "textarea" {
                chain.push(NodeTraits::element(&tag));
            }
        }
        let mut current = start.and_then(|node| match node.dyn_into::<Element>() {
            Ok(element) => Some(element),
            Err(node) => node.parent_element(),
        });
        while let Some(element) = current {
            let flag = EditableFlag::from_attribute(element.get_attribute("contenteditable").as_deref());
            chain.push(NodeTraits::new(&element.tag_name(), flag));
            current = element.parent_element();
        }
        chain
    }

    fn focus_rect(&self, selection: &web_sys::Selection) -> Option<Rect> {
        let node = selection.focus_node()?;
        let range = self.document.create_range().ok()?;
        range.set_start(&node, selection.focus_offset()).ok()?;
        range.collapse_with_to_start(true);
        let rect = range.get_client_rects()?.get(0)?;
        Some(to_rect(&rect))
    }
}

impl SelectionSource for WebHost {
    fn read_selection(&mut self) -> Result<Option<RawSelection>, HostError> {
        let selection = self
            .window
            .get_selection()
            .map_err(|e| HostError::SelectionUnavailable(format!("{e:?}")))?
            .ok_or_else(|| HostError::SelectionUnavailable("getSelection returned null".into()))?;
        if selection.range_count() == 0 {
            return Ok(None);
        }
        let range = selection
            .get_range_at(0)
            .map_err(|e| HostError::SelectionUnavailable(format!("{e:?}")))?;
        Ok(Some(RawSelection {
            text: String::from(selection.to_string()),
            collapsed: selection.is_collapsed(),
            anchor_chain: self.anchor_chain(selection.anchor_node()),
            focus_rect: self.focus_rect(&selection),
            bounding_rect: to_rect(&range.get_bounding_client_rect()),
        }))
    }
}

impl OcclusionProbe for WebHost {
    fn hits_at(&mut self, point: Point) -> Vec<Hit> {
        let stack = self.document.elements_from_point(point.x as f32, point.y as f32);
        stack
            .iter()
            .filter_map(|value| value.dyn_into::<Element>().ok())
            .map(|element| self.hit_for(&element))
            .collect()
    }
}

impl OverlayDom for WebHost {
    fn remove_stale_anchors(&mut self, marker: &str) -> usize {
        let Ok(found) = self.document.query_selector_all(&format!("[{marker}]")) else {
            return 0;
        };
        let own = self.anchor.as_ref().map(|a| a.element.clone());
        let mut removed = 0;
        for i in 0..found.length() {
            let Some(element) = found.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let node: &Node = &element;
            if own.as_ref().is_some_and(|o| o.is_same_node(Some(node))) {
                continue;
            }
            element.remove();
            removed += 1;
        }
        removed
    }

    fn install_anchor(&mut self, marker: &str, stylesheet: &str) -> Result<(), HostError> {
        self.remove_anchor();
        self.anchor = Some(Anchor::install(&self.document, marker, stylesheet)?);
        Ok(())
    }

    fn remove_anchor(&mut self) {
        self.mounted = None;
        if let Some(anchor) = self.anchor.take() {
            anchor.element.remove();
        }
    }

    fn mount_hidden(&mut self, markup: &str) -> Result<Size, HostError> {
        let anchor = self
            .anchor
            .as_ref()
            .ok_or_else(|| HostError::Dom("no anchor installed".into()))?;
        anchor.stage.set_inner_html(markup);
        let root = anchor
            .stage
            .first_element_child()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| HostError::Dom("overlay markup produced no element".into()))?;
        let rect = root.get_bounding_client_rect();
        self.mounted = Some(root);
        self.seen.clear();
        Ok(Size::new(rect.width(), rect.height()))
    }

    fn place(&mut self, position: Point) {
        let Some(root) = self.mounted.as_ref() else {
            return;
        };
        let style = root.style();
        let _ = style.set_property("left", &format!("{}px", position.x.round()));
        let _ = style.set_property("top", &format!("{}px", position.y.round()));
    }

    fn reveal(&mut self) {
        if let Some(root) = self.mounted.as_ref() {
            let _ = root.set_attribute(PHASE_ATTR, PHASE_SHOWN);
        }
    }

    fn start_transition(&mut self) {
        if let Some(root) = self.mounted.as_ref() {
            let _ = root.set_attribute(PHASE_ATTR, PHASE_ENTERED);
        }
    }

    fn unmount(&mut self) {
        self.mounted = None;
        if let Some(anchor) = self.anchor.as_ref() {
            anchor.stage.set_inner_html("");
        }
    }

    fn viewport(&self) -> Viewport {
        match self.document.document_element() {
            Some(root) => Viewport::new(root.client_width() as f64, root.client_height() as f64),
            None => Viewport::default(),
        }
    }

    fn scroll_position(&self) -> Point {
        Point::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn asset_url(&self, path: &str) -> Option<String> {
        extension::asset_url(path)
    }
}

impl Scheduler for WebHost {
    fn schedule(&mut self, task: Task, delay_ms: u32) -> TaskHandle {
        let handle = self.tasks.issue();
        let callback = TaskTable::fire(&self.tasks.fired, handle, task);
        let timeout = Timeout::new(delay_ms, callback);
        self.tasks
            .pending
            .insert(handle, Pending::Timer { _timeout: timeout });
        handle
    }

    fn next_frame(&mut self, task: Task) -> TaskHandle {
        let handle = self.tasks.issue();
        let callback = TaskTable::fire(&self.tasks.fired, handle, task);
        let frame = request_animation_frame(move |_| callback());
        self.tasks
            .pending
            .insert(handle, Pending::Frame { _frame: frame });
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.tasks.pending.remove(&handle);
    }
}

impl TabRelay for WebHost {
    fn request_open(&mut self, url: &str) {
        let url = url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match extension::send_message(&RuntimeMessage::open_tab(url.clone())).await {
                Ok(reply) => decode_ack(reply),
                Err(err) => Err(format!("{err:#}")),
            };
            dispatch(PageEvent::TabRequestSettled { url, outcome });
        });
    }

    fn open_direct(&mut self, url: &str) -> Result<(), HostError> {
        self.window
            .open_with_url_and_target_and_features(url, "_blank", "noopener,noreferrer")
            .map(|_| ())
            .map_err(|e| HostError::Relay(format!("window.open: {e:?}")))
    }
}
