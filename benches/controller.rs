use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use whichlang_rs::{
    ClassificationController, ClassifyRequest, ClientConfig, Completion, DisplaySurface,
    RawResponse, RequestId, Transport,
};

struct NullTransport;

impl Transport for NullTransport {
    type Handle = RequestId;

    fn send(&mut self, id: RequestId, request: ClassifyRequest) -> RequestId {
        black_box(request);
        id
    }

    fn abort(&mut self, handle: RequestId) {
        black_box(handle);
    }
}

struct NullDisplay;

impl DisplaySurface for NullDisplay {
    fn set_visible(&mut self, visible: bool) {
        black_box(visible);
    }

    fn set_text(&mut self, text: &str) {
        black_box(text);
    }
}

fn controller() -> ClassificationController<NullTransport, String, NullDisplay> {
    ClassificationController::new(
        NullTransport,
        "The quick brown fox jumps over the lazy dog".to_string(),
        NullDisplay,
        ClientConfig::default(),
    )
    .with_clock(|| 1_700_000_000_000)
}

fn bench_round_trip(c: &mut Criterion) {
    let mut controller = controller();
    let response = RawResponse::new(200, r#"{"lang":"en"}"#);
    c.bench_function("controller::classify_then_complete", |b| {
        b.iter(|| {
            let id = controller.classify();
            black_box(controller.on_complete(Completion::ok(id, response.clone())));
        });
    });
}

fn bench_supersede_burst(c: &mut Criterion) {
    let response = RawResponse::new(200, r#"{"lang":"en"}"#);
    for &burst in &[2usize, 8, 32] {
        c.bench_with_input(BenchmarkId::new("supersede_burst", burst), &burst, |b, &burst| {
            let mut controller = controller();
            b.iter(|| {
                let mut last = None;
                for _ in 0..burst {
                    last = Some(controller.classify());
                }
                if let Some(id) = last {
                    black_box(controller.on_complete(Completion::ok(id, response.clone())));
                }
            });
        });
    }
}

criterion_group!(benches, bench_round_trip, bench_supersede_burst);
criterion_main!(benches);
