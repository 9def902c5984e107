use crate::{
    ClassificationController, ClassifyError, ClientConfig, ControllerStats, DisplayState,
    DisplaySurface, HttpTransport, TextSource,
};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The most recently entered line; each new line is one "classify" trigger.
#[derive(Debug, Default, Clone)]
pub struct LineInput {
    line: String,
}

impl LineInput {
    pub fn replace(&mut self, line: impl Into<String>) {
        self.line = line.into();
    }
}

impl TextSource for LineInput {
    fn read(&self) -> String {
        self.line.clone()
    }
}

/// Classifies one piece of text and waits for the answer.
pub async fn run_once<D: DisplaySurface>(
    config: ClientConfig,
    text: String,
    display: D,
) -> Result<DisplayState, ClassifyError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = HttpTransport::new(&config, tx)?;
    let mut controller = ClassificationController::new(transport, text, display, config);
    controller.classify();
    while let Some(completion) = rx.recv().await {
        controller.on_complete(completion);
        if !controller.is_pending() {
            break;
        }
    }
    Ok(controller.state().clone())
}

/// Reads lines from `reader` and classifies each one as it arrives.
///
/// A line entered while a request is still in flight supersedes it. At end of
/// input the session waits for the last request; when `shutdown` resolves the
/// pending request is cancelled and the session ends immediately.
pub async fn run_interactive<R, D, S>(
    config: ClientConfig,
    reader: R,
    display: D,
    shutdown: S,
) -> Result<ControllerStats, ClassifyError>
where
    R: AsyncBufRead + Unpin,
    D: DisplaySurface,
    S: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let transport = HttpTransport::new(&config, tx)?;
    let mut controller =
        ClassificationController::new(transport, LineInput::default(), display, config);
    let mut lines = reader.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    controller.input_mut().replace(line);
                    controller.classify();
                }
                None => {
                    debug!("input closed");
                    input_open = false;
                    if !controller.is_pending() {
                        break;
                    }
                }
            },
            Some(completion) = rx.recv() => {
                controller.on_complete(completion);
                if !input_open && !controller.is_pending() {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                controller.cancel();
                break;
            }
        }
    }

    let stats = controller.stats();
    info!(
        issued = stats.issued,
        superseded = stats.superseded,
        rendered = stats.rendered,
        ignored = stats.ignored,
        "session finished"
    );
    Ok(stats)
}
