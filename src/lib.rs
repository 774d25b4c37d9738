//! Selection Ask: turns a text selection on any page into a small floating
//! launcher that sends the text to a search or assistant provider.

pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod overlay;
pub mod providers;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{Settings, Tuning};
pub use error::HostError;
pub use overlay::{PageEvent, PageSession};
pub use providers::ProviderId;
