use crate::{ClassifyError, RawResponse};
use std::fmt;

/// Identifies one issued request for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A POST to the classifier: `target` is the path plus the cache-busting query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyRequest {
    pub target: String,
    pub body: String,
}

impl ClassifyRequest {
    pub fn new(endpoint: &str, time: u64, body: impl Into<String>) -> Self {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        Self {
            target: format!("{endpoint}{separator}time={time}"),
            body: body.into(),
        }
    }
}

/// Final outcome of one request, handed back to the controller by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Result<RawResponse, ClassifyError>,
}

impl Completion {
    pub fn ok(id: RequestId, response: RawResponse) -> Self {
        Self {
            id,
            outcome: Ok(response),
        }
    }

    pub fn failed(id: RequestId, error: ClassifyError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }
}

/// Starts and aborts classification requests.
///
/// `send` must not block: completion is reported later, out of band, as a
/// [`Completion`] carrying the same id. `abort` is best-effort and a
/// completion for an aborted request may still show up.
pub trait Transport {
    type Handle;

    fn send(&mut self, id: RequestId, request: ClassifyRequest) -> Self::Handle;

    fn abort(&mut self, handle: Self::Handle);
}
