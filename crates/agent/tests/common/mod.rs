#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;

use airwatch_agent::error::{IngestError, IngestErrorKind};
use airwatch_agent::ingest::{AppliedSnapshot, Ingestor};
use airwatch_agent::render::RenderAdapter;
use airwatch_agent::scheduler::PollScheduler;
use airwatch_agent::source::HttpSource;
use airwatch_core::clock::{Clock, SystemClock};
use airwatch_core::metric::MetricKind;
use airwatch_core::severity::Classification;
use airwatch_core::thresholds::ThresholdSet;
use airwatch_core::window::{Sample, WindowStore, DEFAULT_RETENTION};

/// Reference payload from a healthy sensor.
pub const HEALTHY: &str =
    r#"{"temp":22.1,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5}"#;

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// What the renderer was told, in order.
#[derive(Debug, Clone)]
pub enum Rendered {
    Applied {
        classifications: BTreeMap<MetricKind, Classification>,
        windows: BTreeMap<MetricKind, Vec<Sample>>,
    },
    Failed {
        kind: IngestErrorKind,
        windows: BTreeMap<MetricKind, Vec<Sample>>,
    },
}

/// Render adapter that records every callback and optionally cancels the
/// scheduler once enough have arrived.
#[derive(Default)]
pub struct RecordingRenderer {
    pub events: Mutex<Vec<Rendered>>,
    stop: Option<(usize, CancellationToken)>,
}

impl RecordingRenderer {
    pub fn stopping_after(count: usize, cancel: CancellationToken) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            stop: Some((count, cancel)),
        }
    }

    pub fn events(&self) -> Vec<Rendered> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: Rendered) {
        let mut events = self.events.lock().unwrap();
        events.push(event);
        if let Some((count, cancel)) = &self.stop {
            if events.len() >= *count {
                cancel.cancel();
            }
        }
    }
}

impl RenderAdapter for RecordingRenderer {
    fn on_snapshot_applied(
        &self,
        applied: &AppliedSnapshot,
        windows: &BTreeMap<MetricKind, Vec<Sample>>,
    ) {
        self.record(Rendered::Applied {
            classifications: applied.classifications.clone(),
            windows: windows.clone(),
        });
    }

    fn on_ingest_error(&self, error: &IngestError, windows: &BTreeMap<MetricKind, Vec<Sample>>) {
        self.record(Rendered::Failed {
            kind: error.kind(),
            windows: windows.clone(),
        });
    }
}

/// Scheduler wired to a real HTTP source at `url`.
pub fn http_scheduler(
    url: &str,
    interval: Duration,
    renderer: Arc<RecordingRenderer>,
) -> PollScheduler<HttpSource, Arc<RecordingRenderer>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = HttpSource::new(url, interval).expect("http client");
    let ingestor = Ingestor::new(
        source,
        Arc::new(ThresholdSet::builtin()),
        Arc::clone(&clock),
        interval,
    );
    let store = WindowStore::with_all_kinds(DEFAULT_RETENTION, clock);
    PollScheduler::new(ingestor, store, renderer, interval)
}
