//! Thin access to the WebExtension APIs (`browser.*` or `chrome.*`).
//!
//! Everything is resolved through `Reflect` so the script degrades to
//! page-only behavior when the extension context is gone (e.g. after the
//! extension was reloaded underneath a live tab).

use anyhow::{anyhow, Context, Result};
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::config::Settings;
use crate::error::HostError;
use crate::messages::{settings_from_storage, RuntimeMessage};

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn js_error(value: JsValue) -> anyhow::Error {
    match value.as_string() {
        Some(text) => anyhow!(text),
        None => match get(&value, "message").and_then(|m| m.as_string()) {
            Some(message) => anyhow!(message),
            None => anyhow!("{value:?}"),
        },
    }
}

/// The extension namespace object. Firefox exposes `browser`, Chromium
/// `chrome`; both only count when they carry a live `runtime.id`.
pub fn api() -> Option<JsValue> {
    let global = js_sys::global();
    ["browser", "chrome"].into_iter().find_map(|name| {
        let ns = get(&global, name)?;
        let runtime = get(&ns, "runtime")?;
        get(&runtime, "id")?;
        Some(ns)
    })
}

fn method(target: &JsValue, name: &str) -> Result<Function> {
    get(target, name)
        .and_then(|f| f.dyn_into::<Function>().ok())
        .with_context(|| format!("{name} is not available"))
}

fn runtime() -> Result<JsValue> {
    let api = api().context("extension context unavailable")?;
    get(&api, "runtime").context("runtime namespace missing")
}

async fn await_promise(value: JsValue) -> Result<JsValue> {
    let promise = value
        .dyn_into::<Promise>()
        .map_err(|_| anyhow!("extension call did not return a promise"))?;
    JsFuture::from(promise).await.map_err(js_error)
}

fn to_json(value: JsValue) -> Result<serde_json::Value> {
    serde_wasm_bindgen::from_value(value).map_err(|err| anyhow!("undecodable value: {err}"))
}

/// `runtime.getURL(path)`.
pub fn asset_url(path: &str) -> Option<String> {
    let runtime = runtime().ok()?;
    let get_url = method(&runtime, "getURL").ok()?;
    get_url
        .call1(&runtime, &JsValue::from_str(path))
        .ok()?
        .as_string()
}

/// `runtime.sendMessage(message)`, resolving to the reply as JSON.
pub async fn send_message(message: &RuntimeMessage) -> Result<serde_json::Value> {
    let runtime = runtime()?;
    let send = method(&runtime, "sendMessage")?;
    let payload = message
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| anyhow!("message encoding failed: {err}"))?;
    let reply = await_promise(send.call1(&runtime, &payload).map_err(js_error)?).await?;
    to_json(reply)
}

async fn read_storage() -> Result<serde_json::Value> {
    let api = api().context("extension context unavailable")?;
    let local = get(&api, "storage")
        .and_then(|storage| get(&storage, "local"))
        .context("storage.local missing")?;
    let read = method(&local, "get")?;
    let items = await_promise(read.call1(&local, &JsValue::NULL).map_err(js_error)?).await?;
    to_json(items)
}

/// Read the whole of `storage.local` and pull the settings out of it.
pub async fn load_settings() -> Result<Settings, HostError> {
    let items = read_storage()
        .await
        .map_err(|err| HostError::Storage(format!("{err:#}")))?;
    settings_from_storage(items)
}

/// Register `listener` with `runtime.onMessage`.
pub fn add_message_listener(listener: &Function) -> Result<()> {
    let on_message = get(&runtime()?, "onMessage").context("runtime.onMessage missing")?;
    method(&on_message, "addListener")?
        .call1(&on_message, listener)
        .map_err(js_error)?;
    Ok(())
}
