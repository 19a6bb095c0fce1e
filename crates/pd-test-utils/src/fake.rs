//! In-memory [`ResourceApi`] with scripted failures and call recording.

use async_trait::async_trait;
use pd_client::{Error, ResourceApi, Result};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Remote operation, for scripting and call inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// One recorded call. `target` is the resource ID, when the call had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub target: Option<String>,
}

/// A scripted failure: an HTTP status served `remaining` times (or forever).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    status: u16,
    message: String,
    retry_after: Option<Duration>,
    remaining: Option<usize>,
}

impl Failure {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            message: format!("scripted HTTP {}", status),
            retry_after: None,
            remaining: Some(1),
        }
    }

    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }

    pub fn always(mut self) -> Self {
        self.remaining = None;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn retry_after(mut self, hint: Duration) -> Self {
        self.retry_after = Some(hint);
        self
    }

    fn to_error(&self) -> Error {
        let err = Error::api(self.status, self.message.clone());
        match self.retry_after {
            Some(hint) => err.with_retry_after(hint),
            None => err,
        }
    }
}

/// How a fake stores one resource family.
pub trait FakeRecord: Send + Sync + 'static {
    type Key: Send + Sync;
    type Resource: Clone + Send + Sync;
    type Payload: Send + Sync;
    type Filter: Send + Sync;

    fn key_id(key: &Self::Key) -> &str;

    fn id(resource: &Self::Resource) -> &str;

    fn set_id(resource: &mut Self::Resource, id: &str);

    /// The resource the server would store for `payload` under `id`,
    /// including any computed fields.
    fn materialize(id: &str, payload: &Self::Payload) -> Self::Resource;

    fn matches(filter: &Self::Filter, resource: &Self::Resource) -> bool;
}

/// Scriptable in-memory remote for one resource family.
///
/// Records are kept in ID order, so listings are deterministic.
pub struct FakeApi<R: FakeRecord> {
    records: Mutex<BTreeMap<String, R::Resource>>,
    script: Mutex<HashMap<Op, VecDeque<Failure>>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU32,
    latency: Duration,
}

impl<R: FakeRecord> Default for FakeApi<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: FakeRecord> FakeApi<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
            latency: Duration::ZERO,
        }
    }

    /// Every call sleeps this long (on the tokio clock) before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a failure for `op`. Queued failures are served in order before
    /// the fake answers normally again.
    pub fn script(&self, op: Op, failure: Failure) {
        self.script
            .lock()
            .expect("fake script lock poisoned")
            .entry(op)
            .or_default()
            .push_back(failure);
    }

    /// Store a resource as if it already existed remotely. An empty ID is
    /// replaced with a generated one, which is returned.
    pub fn insert(&self, mut resource: R::Resource) -> String {
        let id = match R::id(&resource) {
            "" => self.generate_id(),
            existing => existing.to_string(),
        };
        R::set_id(&mut resource, &id);
        self.records
            .lock()
            .expect("fake records lock poisoned")
            .insert(id.clone(), resource);
        id
    }

    /// Delete out of band, bypassing the call log.
    pub fn remove(&self, id: &str) -> Option<R::Resource> {
        self.records
            .lock()
            .expect("fake records lock poisoned")
            .remove(id)
    }

    pub fn record(&self, id: &str) -> Option<R::Resource> {
        self.records
            .lock()
            .expect("fake records lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("fake records lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("fake calls lock poisoned").clone()
    }

    pub fn calls_for(&self, op: Op) -> usize {
        self.calls
            .lock()
            .expect("fake calls lock poisoned")
            .iter()
            .filter(|call| call.op == op)
            .count()
    }

    fn generate_id(&self) -> String {
        format!("P{:06}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Record the call, wait out the latency, and serve a scripted failure if one is queued.
    async fn enter(&self, op: Op, target: Option<&str>) -> Result<()> {
        self.calls
            .lock()
            .expect("fake calls lock poisoned")
            .push(Call {
                op,
                target: target.map(str::to_string),
            });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut script = self.script.lock().expect("fake script lock poisoned");
        let Some(queue) = script.get_mut(&op) else {
            return Ok(());
        };
        let Some(failure) = queue.front_mut() else {
            return Ok(());
        };

        let err = failure.to_error();
        match failure.remaining.as_mut() {
            None => {}
            Some(remaining) if *remaining > 1 => *remaining -= 1,
            Some(_) => {
                queue.pop_front();
            }
        }
        Err(err)
    }

    fn not_found(id: &str) -> Error {
        Error::api(404, format!("Not Found: {}", id))
    }
}

#[async_trait]
impl<R: FakeRecord> ResourceApi for FakeApi<R> {
    type Key = R::Key;
    type Resource = R::Resource;
    type Payload = R::Payload;
    type Filter = R::Filter;

    async fn list(&self, filter: &R::Filter) -> Result<Vec<R::Resource>> {
        self.enter(Op::List, None).await?;
        let records = self.records.lock().expect("fake records lock poisoned");
        Ok(records
            .values()
            .filter(|resource| R::matches(filter, resource))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &R::Key) -> Result<R::Resource> {
        let id = R::key_id(key);
        self.enter(Op::Get, Some(id)).await?;
        self.record(id).ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, payload: &R::Payload) -> Result<R::Resource> {
        self.enter(Op::Create, None).await?;
        let id = self.generate_id();
        let resource = R::materialize(&id, payload);
        self.records
            .lock()
            .expect("fake records lock poisoned")
            .insert(id, resource.clone());
        Ok(resource)
    }

    async fn update(&self, key: &R::Key, payload: &R::Payload) -> Result<R::Resource> {
        let id = R::key_id(key);
        self.enter(Op::Update, Some(id)).await?;
        let mut records = self.records.lock().expect("fake records lock poisoned");
        if !records.contains_key(id) {
            return Err(Self::not_found(id));
        }
        let resource = R::materialize(id, payload);
        records.insert(id.to_string(), resource.clone());
        Ok(resource)
    }

    async fn delete(&self, key: &R::Key) -> Result<()> {
        let id = R::key_id(key);
        self.enter(Op::Delete, Some(id)).await?;
        self.records
            .lock()
            .expect("fake records lock poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
