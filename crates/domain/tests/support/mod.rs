#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assessment_domain::flow::FlowPorts;
use assessment_domain::ports::BoxFuture;
use assessment_domain::ports::camera::{CameraDevice, CameraError, VideoStream};
use assessment_domain::ports::identity::StaticIdentity;
use assessment_domain::ports::navigation::{Destination, Navigator};
use assessment_domain::ports::notify::{Notifier, Severity};
use assessment_domain::ports::store::{KeyValueStore, StoreError};
use assessment_domain::store::InMemoryStore;
use serde_json::{Value, json};
use tokio::sync::Notify;

/// Wraps the in-memory store, records every call, and fails on demand.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    reads: Mutex<Vec<String>>,
    writes: Mutex<Vec<BTreeMap<String, Value>>>,
    fail_reads_under: Mutex<Option<String>>,
    fail_writes: Mutex<bool>,
    write_hold: Mutex<Option<Arc<Notify>>>,
}

impl RecordingStore {
    pub fn with_root(root: Value) -> Self {
        Self {
            inner: InMemoryStore::with_root(root),
            ..Self::default()
        }
    }

    pub fn fail_reads_under(&self, prefix: &str) {
        *self.fail_reads_under.lock().unwrap() = Some(prefix.to_string());
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Parks every write until the returned handle is notified.
    pub fn hold_writes(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        *self.write_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<BTreeMap<String, Value>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn snapshot(&self) -> Value {
        self.inner.snapshot()
    }
}

impl KeyValueStore for RecordingStore {
    fn read(&self, path: &str) -> BoxFuture<'_, Result<Option<Value>, StoreError>> {
        let path = path.to_string();
        Box::pin(async move {
            self.reads.lock().unwrap().push(path.clone());
            let failing = self.fail_reads_under.lock().unwrap().clone();
            if let Some(prefix) = failing {
                if path.starts_with(&prefix) {
                    return Err(StoreError::PermissionDenied(format!(
                        "read of {path} rejected by rules"
                    )));
                }
            }
            self.inner.read(&path).await
        })
    }

    fn atomic_write(
        &self,
        updates: &BTreeMap<String, Value>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let updates = updates.clone();
        Box::pin(async move {
            self.writes.lock().unwrap().push(updates.clone());
            let hold = self.write_hold.lock().unwrap().clone();
            if let Some(hold) = hold {
                hold.notified().await;
            }
            if *self.fail_writes.lock().unwrap() {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inner.atomic_write(&updates).await
        })
    }
}

pub struct FakeStream {
    id: String,
    stops: Arc<AtomicUsize>,
}

impl VideoStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_all_tracks(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub enum CameraMode {
    Grant,
    Deny,
    /// Grants only after `FakeCamera::open_gate` is called.
    GrantWhenOpened,
    /// Denies only after `FakeCamera::open_gate` is called.
    DenyWhenOpened,
}

pub struct FakeCamera {
    mode: CameraMode,
    stops: Arc<AtomicUsize>,
    requests: AtomicUsize,
    gate: Notify,
}

impl FakeCamera {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            stops: Arc::new(AtomicUsize::new(0)),
            requests: AtomicUsize::new(0),
            gate: Notify::new(),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn open_gate(&self) {
        self.gate.notify_one();
    }
}

impl CameraDevice for FakeCamera {
    fn request_video_stream(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, CameraError>> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                CameraMode::Deny => Err(CameraError::Denied("permission dismissed".into())),
                CameraMode::Grant => Ok(self.stream()),
                CameraMode::GrantWhenOpened => {
                    self.gate.notified().await;
                    Ok(self.stream())
                }
                CameraMode::DenyWhenOpened => {
                    self.gate.notified().await;
                    Err(CameraError::Denied("device unplugged".into()))
                }
            }
        })
    }
}

impl FakeCamera {
    fn stream(&self) -> Box<dyn VideoStream> {
        Box::new(FakeStream {
            id: "cam-0".to_string(),
            stops: self.stops.clone(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    destinations: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn destinations(&self) -> Vec<Destination> {
        self.destinations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        self.destinations.lock().unwrap().push(destination);
    }
}

pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub camera: Arc<FakeCamera>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub ports: FlowPorts,
}

impl Harness {
    pub fn new(root: Value, user_id: Option<&str>, camera: CameraMode) -> Self {
        let store = Arc::new(RecordingStore::with_root(root));
        let camera = Arc::new(FakeCamera::new(camera));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let ports = FlowPorts {
            store: store.clone(),
            camera: camera.clone(),
            identity: Arc::new(StaticIdentity::new(user_id.map(str::to_string))),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
        };
        Self {
            store,
            camera,
            notifier,
            navigator,
            ports,
        }
    }
}

/// User `u1` selected `selected`, attempted `attempted`; `math` has three
/// free-text questions and `art` has an empty bank.
pub fn seeded_root(selected: &[&str], attempted: &[&str]) -> Value {
    let attempted = attempted
        .iter()
        .map(|domain| ((*domain).to_string(), Value::Bool(true)))
        .collect::<serde_json::Map<_, _>>();
    json!({
        "users": {
            "u1": {
                "selectedDomains": selected,
                "quizzesAttempted": attempted,
            }
        },
        "questionnaires": {
            "math": {
                "questions": [
                    { "text": "2 + 2?", "type": "text" },
                    { "text": "3 + 4?", "type": "text" },
                    { "text": "4 + 5?", "type": "text" },
                ]
            },
            "art": { "questions": [] },
        },
    })
}
