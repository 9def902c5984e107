use crate::{
    ClassifyError, ClassifyRequest, ClientConfig, Completion, RawResponse, RequestId, Transport,
};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::debug;

/// `reqwest` transport. Each request runs in its own tokio task and reports
/// back through `completions`; aborting cancels the task.
///
/// A request aborted before the runtime first polls its task is never sent,
/// so a burst of superseded requests usually puts only the last one on the
/// wire. Must be used from inside a tokio runtime.
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    completions: UnboundedSender<Completion>,
}

impl HttpTransport {
    pub fn new(
        config: &ClientConfig,
        completions: UnboundedSender<Completion>,
    ) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ClassifyError::Client(err.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
            completions,
        })
    }
}

impl Transport for HttpTransport {
    type Handle = AbortHandle;

    fn send(&mut self, id: RequestId, request: ClassifyRequest) -> AbortHandle {
        let url = self.config.url_for(&request.target);
        let pending = self.client.post(url).body(request.body).send();
        let completions = self.completions.clone();
        let task = tokio::spawn(async move {
            let outcome = match pending.await {
                Ok(response) => read_response(response).await,
                Err(err) => Err(ClassifyError::from(err)),
            };
            if completions.send(Completion { id, outcome }).is_err() {
                debug!(%id, "completion dropped, controller is gone");
            }
        });
        task.abort_handle()
    }

    fn abort(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}

async fn read_response(response: reqwest::Response) -> Result<RawResponse, ClassifyError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;
    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tower::ServiceExt;

    async fn transport() -> (
        HttpTransport,
        mpsc::UnboundedReceiver<Completion>,
        stub::StubState,
    ) {
        let state = stub::StubState::default();
        let base_url = stub::spawn(state.clone()).await;
        let config = ClientConfig {
            base_url,
            ..ClientConfig::default()
        };
        let (tx, rx) = mpsc::unbounded_channel();
        (HttpTransport::new(&config, tx).unwrap(), rx, state)
    }

    #[tokio::test]
    async fn stub_echoes_lang() {
        let response = stub::router(stub::StubState::default())
            .oneshot(
                Request::post("/classify?time=1")
                    .body(Body::from("Hello world"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["lang"], "Hello world");
    }

    #[tokio::test]
    async fn posts_body_with_timestamp() {
        let (mut transport, mut rx, state) = transport().await;
        let request = ClassifyRequest::new("/classify", 1234, "Hello world");
        transport.send(RequestId(1), request);

        let completion = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.id, RequestId(1));
        let response = completion.outcome.unwrap();
        assert_eq!(response.status, 200);
        assert!(
            response
                .content_type
                .as_deref()
                .unwrap()
                .starts_with("application/json")
        );
        assert_eq!(response.body, r#"{"lang":"Hello world"}"#);
        assert_eq!(
            state.seen.lock().unwrap().clone(),
            vec![stub::Seen {
                time: Some(1234),
                body: "Hello world".into()
            }]
        );
    }

    #[tokio::test]
    async fn error_status_is_delivered_as_response() {
        let (mut transport, mut rx, _state) = transport().await;
        transport.send(RequestId(7), ClassifyRequest::new("/classify", 1, "boom"));
        let completion = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.outcome.unwrap().status, 500);
    }

    #[tokio::test]
    async fn aborted_request_never_completes() {
        let (mut transport, mut rx, _state) = transport().await;
        let slow = transport.send(RequestId(1), ClassifyRequest::new("/classify", 1, "slow:en"));
        transport.abort(slow);
        transport.send(RequestId(2), ClassifyRequest::new("/classify", 2, "fr"));

        let completion = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.id, RequestId(2));
        assert!(
            timeout(Duration::from_millis(800), rx.recv()).await.is_err(),
            "aborted request must not report a completion"
        );
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let state = stub::StubState::default();
        let config = ClientConfig {
            base_url: stub::spawn(state.clone()).await,
            timeout: Duration::from_millis(100),
            ..ClientConfig::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = HttpTransport::new(&config, tx).unwrap();
        transport.send(RequestId(4), ClassifyRequest::new("/classify", 1, "slow:en"));
        let completion = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.id, RequestId(4));
        assert_eq!(completion.outcome, Err(ClassifyError::Timeout));
        assert_eq!(
            ClassifyError::Timeout.to_string(),
            "request timed out"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let config = ClientConfig {
            base_url: format!("http://{addr}"),
            ..ClientConfig::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = HttpTransport::new(&config, tx).unwrap();
        transport.send(RequestId(3), ClassifyRequest::new("/classify", 1, "hi"));
        let completion = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            completion.outcome,
            Err(ClassifyError::Transport(_))
        ));
    }
}
