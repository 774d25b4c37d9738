pub mod events; // Page input routed into the session
pub mod geometry;
pub mod host; // Traits the page environment implements
pub mod html; // Isolated stylesheet + overlay markup
pub mod isolation;
pub mod lifecycle;
pub mod placement; // Candidate generation and overlap scoring
pub mod session;
pub mod text_selection; // Selection snapshot + debounce

#[cfg(test)]
pub(crate) mod testing;

pub use events::{Key, OverlayAction, PageEvent};
pub use geometry::{Point, Rect, Size, Viewport};
pub use host::{Host, Task, TaskHandle};
pub use lifecycle::{OverlayManager, OverlayState};
pub use session::PageSession;
pub use text_selection::{SelectionSnapshot, SelectionVerdict};
