//! Single-flight client for a remote text classifier.
//!
//! [`ClassificationController`] owns at most one in-flight request. Each call
//! to `classify` aborts the previous request before sending a new one, and
//! completions that no longer match the pending request are dropped, so the
//! display only ever shows the answer to the latest input.
//!
//! The controller is environment-free: text input, display and transport are
//! traits. The `http` feature adds a `reqwest` transport and tokio-driven
//! sessions on top.

mod config;
mod controller;
mod display;
mod error;
mod response;
mod transport;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod session;

pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_ENDPOINT, epoch_millis};
pub use controller::{ClassificationController, ControllerStats, Disposition, PendingRequest};
pub use display::{
    DisplayState, DisplaySurface, FAILURE_PREFIX, LABEL_PREFIX, LOADING_TEXT, TerminalDisplay,
    TextSource,
};
pub use error::ClassifyError;
pub use response::{ClassificationResult, RawResponse, ResponseFormat};
pub use transport::{ClassifyRequest, Completion, RequestId, Transport};

#[cfg(feature = "http")]
pub use http::HttpTransport;
#[cfg(feature = "http")]
pub use session::{LineInput, run_interactive, run_once};
