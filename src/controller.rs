use crate::config::epoch_millis;
use crate::{
    ClassifyError, ClassifyRequest, ClientConfig, Completion, DisplayState, DisplaySurface,
    RequestId, TextSource, Transport,
};
use tracing::{debug, info, warn};

/// The one request the controller is waiting on.
#[derive(Debug)]
pub struct PendingRequest<H> {
    pub id: RequestId,
    pub handle: H,
    pub sent_at: u64,
}

/// What `on_complete` did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Rendered(DisplayState),
    /// Belonged to a request that is no longer current.
    Stale,
    /// The current request reported an abort; nothing was rendered.
    Aborted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub issued: u64,
    pub superseded: u64,
    pub cancelled: u64,
    pub rendered: u64,
    pub ignored: u64,
}

/// Single-flight classification controller.
///
/// Every [`classify`](Self::classify) aborts whatever request is still in the
/// slot before sending a new one, and [`on_complete`](Self::on_complete) only
/// renders completions whose id matches the slot. Together these keep the
/// display from ever showing the answer to a superseded request, whatever
/// order the transport delivers completions in.
pub struct ClassificationController<T: Transport, I, D> {
    transport: T,
    input: I,
    display: D,
    config: ClientConfig,
    clock: fn() -> u64,
    next_id: u64,
    pending: Option<PendingRequest<T::Handle>>,
    state: DisplayState,
    stats: ControllerStats,
}

impl<T, I, D> ClassificationController<T, I, D>
where
    T: Transport,
    I: TextSource,
    D: DisplaySurface,
{
    pub fn new(transport: T, input: I, display: D, config: ClientConfig) -> Self {
        Self {
            transport,
            input,
            display,
            config,
            clock: epoch_millis,
            next_id: 0,
            pending: None,
            state: DisplayState::Hidden,
            stats: ControllerStats::default(),
        }
    }

    /// Replaces the timestamp source used for the `time=` query parameter.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn classify(&mut self) -> RequestId {
        let text = self.input.read();
        let next_state = if self.config.show_loading {
            DisplayState::Loading
        } else {
            DisplayState::Hidden
        };
        self.render(next_state);

        if let Some(previous) = self.pending.take() {
            debug!(id = %previous.id, "superseding pending classification");
            self.transport.abort(previous.handle);
            self.stats.superseded += 1;
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        let sent_at = (self.clock)();
        let request = ClassifyRequest::new(&self.config.endpoint, sent_at, text);
        debug!(%id, target = %request.target, bytes = request.body.len(), "sending classification");
        let handle = self.transport.send(id, request);
        self.pending = Some(PendingRequest {
            id,
            handle,
            sent_at,
        });
        self.stats.issued += 1;
        id
    }

    pub fn on_complete(&mut self, completion: Completion) -> Disposition {
        let current = self.pending.as_ref().map(|pending| pending.id);
        if current != Some(completion.id) {
            debug!(id = %completion.id, current = ?current, "ignoring stale completion");
            self.stats.ignored += 1;
            return Disposition::Stale;
        }
        let Some(pending) = self.pending.take() else {
            return Disposition::Stale;
        };
        let elapsed_ms = (self.clock)().saturating_sub(pending.sent_at);

        let next_state = match completion.outcome {
            Err(ClassifyError::Aborted) => {
                debug!(id = %pending.id, "current request reported abort");
                return Disposition::Aborted;
            }
            Err(err) => {
                warn!(id = %pending.id, error = %err, detail = err.detail(), elapsed_ms, "classification request failed");
                DisplayState::Failed(err)
            }
            Ok(response) if !response.is_success() => {
                warn!(id = %pending.id, status = response.status, elapsed_ms, "classifier returned an error status");
                DisplayState::Failed(ClassifyError::Status(response.status))
            }
            Ok(response) => match self.config.format.parse(&response) {
                Ok(result) => {
                    info!(id = %pending.id, label = %result.label, elapsed_ms, "classified");
                    DisplayState::Classified(result.label)
                }
                Err(err) => {
                    warn!(id = %pending.id, detail = err.detail(), elapsed_ms, "unparseable classification response");
                    DisplayState::Failed(err)
                }
            },
        };

        self.render(next_state.clone());
        self.stats.rendered += 1;
        Disposition::Rendered(next_state)
    }

    /// Aborts the pending request, if any, without touching the display.
    pub fn cancel(&mut self) -> Option<RequestId> {
        let pending = self.pending.take()?;
        debug!(id = %pending.id, "cancelling pending classification");
        self.transport.abort(pending.handle);
        self.stats.cancelled += 1;
        Some(pending.id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn render(&mut self, state: DisplayState) {
        state.apply(&mut self.display);
        self.state = state;
    }
}
