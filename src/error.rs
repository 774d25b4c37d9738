use thiserror::Error;

/// Failures reported by the page host.
///
/// None of these ever reach the page: the session turns every one of them
/// into a dismissal plus a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The selection API is missing or threw while being read.
    #[error("selection unavailable: {0}")]
    SelectionUnavailable(String),
    /// Creating, measuring or removing overlay nodes failed.
    #[error("dom operation failed: {0}")]
    Dom(String),
    /// Neither the relay nor the direct fallback could open the tab.
    #[error("tab open failed: {0}")]
    Relay(String),
    /// Extension storage could not be read or decoded.
    #[error("settings storage failed: {0}")]
    Storage(String),
}
