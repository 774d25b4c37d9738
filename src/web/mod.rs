//! Browser entry point: boots the page session and feeds it DOM events.

mod extension;
mod host;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use anyhow::{Context, Result};
use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, KeyboardEvent, PageTransitionEvent, Window};

use self::host::WebHost;
use crate::config::{Settings, Tuning};
use crate::logging;
use crate::messages::{decode_inbound, Inbound};
use crate::overlay::events::{Key, PageEvent};
use crate::overlay::isolation::ANCHOR_MARKER;
use crate::overlay::session::PageSession;

thread_local! {
    static SESSION: RefCell<Option<PageSession<WebHost>>> = const { RefCell::new(None) };
    static QUEUE: RefCell<VecDeque<PageEvent>> = const { RefCell::new(VecDeque::new()) };
    static DRAINING: Cell<bool> = const { Cell::new(false) };
    static LISTENERS: RefCell<Vec<EventListener>> = const { RefCell::new(Vec::new()) };
    static ON_MESSAGE: RefCell<Option<Closure<dyn FnMut(JsValue) -> JsValue>>> = const { RefCell::new(None) };
}

/// Hand an event to the session. Events raised while the session is busy
/// (host callbacks firing synchronously) are queued and run afterwards in
/// arrival order.
pub(crate) fn dispatch(event: PageEvent) {
    QUEUE.with(|q| q.borrow_mut().push_back(event));
    if DRAINING.with(|d| d.replace(true)) {
        return;
    }
    while let Some(event) = QUEUE.with(|q| q.borrow_mut().pop_front()) {
        SESSION.with(|slot| {
            if let Some(session) = slot.borrow_mut().as_mut() {
                session.handle(event);
            }
        });
    }
    DRAINING.with(|d| d.set(false));
}

#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
    if let Err(err) = boot() {
        tracing::error!("selection-ask failed to start: {err:#}");
    }
}

fn boot() -> Result<()> {
    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let mut session = PageSession::new(
        WebHost::new(window.clone(), document.clone()),
        Settings::default(),
        Tuning::default(),
    );
    session.start();
    SESSION.with(|slot| *slot.borrow_mut() = Some(session));

    let listeners = page_listeners(&window, &document);
    LISTENERS.with(|l| *l.borrow_mut() = listeners);

    match listen_for_messages() {
        Ok(()) => wasm_bindgen_futures::spawn_local(reload_settings()),
        Err(err) => tracing::warn!("running without extension context: {err:#}"),
    }
    tracing::debug!("selection-ask ready");
    Ok(())
}

async fn reload_settings() {
    match extension::load_settings().await {
        Ok(settings) => dispatch(PageEvent::SettingsChanged(settings)),
        Err(err) => tracing::warn!(%err, "could not read settings, keeping defaults"),
    }
}

fn listen_for_messages() -> Result<()> {
    let closure = Closure::<dyn FnMut(JsValue) -> JsValue>::new(|message: JsValue| {
        let decoded = serde_wasm_bindgen::from_value::<serde_json::Value>(message)
            .map(decode_inbound)
            .unwrap_or(Inbound::Ignored);
        match decoded {
            Inbound::Settings(settings) => dispatch(PageEvent::SettingsChanged(settings)),
            Inbound::ReloadSettings => wasm_bindgen_futures::spawn_local(reload_settings()),
            Inbound::Ignored => {}
        }
        JsValue::UNDEFINED
    });
    extension::add_message_listener(closure.as_ref().unchecked_ref())?;
    ON_MESSAGE.with(|slot| *slot.borrow_mut() = Some(closure));
    Ok(())
}

// --- DOM EVENTS ---

fn inside_overlay(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(&format!("[{ANCHOR_MARKER}]")).ok().flatten())
        .is_some()
}

fn key_of(event: &Event) -> Key {
    event
        .dyn_ref::<KeyboardEvent>()
        .map(|e| Key::from_dom(&e.key()))
        .unwrap_or(Key::Other)
}

fn is_document_scroll(event: &Event) -> bool {
    let Some(target) = event.target() else {
        return true;
    };
    if target.dyn_ref::<Document>().is_some() {
        return true;
    }
    target
        .dyn_ref::<Element>()
        .and_then(|el| el.owner_document())
        .and_then(|doc| doc.scrolling_element())
        .is_some_and(|scroller| {
            let node: &web_sys::Node = &scroller;
            target
                .dyn_ref::<web_sys::Node>()
                .is_some_and(|t| t.is_same_node(Some(node)))
        })
}

fn capture() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: true,
    }
}

fn page_listeners(window: &Window, document: &Document) -> Vec<EventListener> {
    vec![
        EventListener::new(document, "pointerup", |event| {
            dispatch(PageEvent::PointerUp {
                inside_overlay: inside_overlay(event),
            })
        }),
        EventListener::new(document, "keyup", |event| {
            dispatch(PageEvent::KeyUp {
                key: key_of(event),
                inside_overlay: inside_overlay(event),
            })
        }),
        EventListener::new_with_options(document, "keydown", capture(), |event| {
            dispatch(PageEvent::KeyDown { key: key_of(event) })
        }),
        EventListener::new_with_options(document, "pointerdown", capture(), |event| {
            dispatch(PageEvent::PointerDown {
                inside_overlay: inside_overlay(event),
            })
        }),
        EventListener::new_with_options(document, "scroll", capture(), |event| {
            dispatch(PageEvent::Scroll {
                inside_overlay: inside_overlay(event),
                document: is_document_scroll(event),
            })
        }),
        EventListener::new(document, "selectionchange", |_| {
            dispatch(PageEvent::SelectionChanged)
        }),
        EventListener::new(window, "pagehide", |_| dispatch(PageEvent::PageHide)),
        EventListener::new(window, "pageshow", |event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            dispatch(PageEvent::PageShow { persisted })
        }),
    ]
}
