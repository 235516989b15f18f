//! In-memory fake of the prescription service for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, Semaphore};

use crate::token::AuthToken;

use super::{
    CreatePrescription, PageMeta, RemoteApi, RemoteError, RemoteItem, RemotePage, RemoteRef,
    RemoteResult,
};

/// One-shot barrier that parks the next remote call until released.
///
/// Lets a test hold a sync cycle inside a network call while it asserts what
/// happens to concurrent work.
pub struct CallGate {
    entered: Notify,
    release: Semaphore,
}

impl CallGate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    /// Wait until a remote call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked call continue.
    pub fn release(&self) {
        self.release.add_permits(1);
    }
}

/// Scripted stand-in for the remote service.
///
/// Behaves like a tiny live server: created items get sequential ids and show
/// up in subsequent listings, updates and deletes mutate the held items, and
/// the listing paginates. Individual calls can be made to fail by queueing
/// errors beforehand.
#[derive(Clone)]
pub struct MockRemote {
    inner: Arc<MockState>,
}

struct MockState {
    items: Mutex<Vec<RemoteItem>>,
    next_id: AtomicI64,
    page_size: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    list_calls: AtomicUsize,
    fail_create: Mutex<VecDeque<RemoteError>>,
    fail_update: Mutex<VecDeque<RemoteError>>,
    fail_delete: Mutex<VecDeque<RemoteError>>,
    fail_list: Mutex<VecDeque<RemoteError>>,
    gate: Mutex<Option<Arc<CallGate>>>,
    tokens: Mutex<Vec<String>>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockState {
                items: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                page_size: AtomicUsize::new(10),
                create_calls: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                list_calls: AtomicUsize::new(0),
                fail_create: Mutex::new(VecDeque::new()),
                fail_update: Mutex::new(VecDeque::new()),
                fail_delete: Mutex::new(VecDeque::new()),
                fail_list: Mutex::new(VecDeque::new()),
                gate: Mutex::new(None),
                tokens: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Seed a prescription as if it already existed on the server.
    pub fn seed(
        &self,
        id: impl Into<String>,
        patient_id: i64,
        doctor_id: i64,
        date: &str,
        content: &str,
        created_at: &str,
    ) {
        self.push_item(RemoteItem {
            id: id.into(),
            patient: Some(RemoteRef { id: patient_id }),
            doctor: Some(RemoteRef { id: doctor_id }),
            date: Some(date.to_string()),
            content: Some(content.to_string()),
            created_at: Some(created_at.to_string()),
        });
    }

    pub fn push_item(&self, item: RemoteItem) {
        self.inner.items.lock().unwrap().push(item);
    }

    /// Snapshot of everything the server currently holds.
    #[must_use]
    pub fn items(&self) -> Vec<RemoteItem> {
        self.inner.items.lock().unwrap().clone()
    }

    #[must_use]
    pub fn content_of(&self, id: &str) -> Option<String> {
        self.inner
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.content.clone())
    }

    /// The id the next created prescription will receive.
    pub fn set_next_id(&self, next_id: i64) {
        self.inner.next_id.store(next_id, Ordering::SeqCst);
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.inner.page_size.store(page_size.max(1), Ordering::SeqCst);
    }

    pub fn fail_next_create(&self, error: RemoteError) {
        self.inner.fail_create.lock().unwrap().push_back(error);
    }

    pub fn fail_next_update(&self, error: RemoteError) {
        self.inner.fail_update.lock().unwrap().push_back(error);
    }

    pub fn fail_next_delete(&self, error: RemoteError) {
        self.inner.fail_delete.lock().unwrap().push_back(error);
    }

    pub fn fail_next_list(&self, error: RemoteError) {
        self.inner.fail_list.lock().unwrap().push_back(error);
    }

    /// Park the next remote call until the returned gate is released.
    pub fn install_gate(&self) -> Arc<CallGate> {
        let gate = CallGate::new();
        *self.inner.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.inner.create_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.inner.update_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.inner.delete_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(Ordering::SeqCst)
    }

    /// Bearer tokens observed across all calls, in order.
    #[must_use]
    pub fn seen_tokens(&self) -> Vec<String> {
        self.inner.tokens.lock().unwrap().clone()
    }

    async fn enter(&self, token: &AuthToken) {
        self.inner
            .tokens
            .lock()
            .unwrap()
            .push(token.as_str().to_string());

        let gate = self.inner.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            drop(gate.release.acquire().await);
        }
    }

    fn scripted(&self, queue: &Mutex<VecDeque<RemoteError>>) -> Option<RemoteError> {
        queue.lock().unwrap().pop_front()
    }
}

#[async_trait::async_trait]
impl RemoteApi for MockRemote {
    async fn create(
        &self,
        token: &AuthToken,
        payload: &CreatePrescription,
    ) -> RemoteResult<String> {
        self.inner.create_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await;

        if let Some(error) = self.scripted(&self.inner.fail_create) {
            return Err(error);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.push_item(RemoteItem {
            id: id.clone(),
            patient: Some(RemoteRef {
                id: payload.patient_id,
            }),
            doctor: Some(RemoteRef {
                id: payload.doctor_id,
            }),
            date: Some(payload.date.clone()),
            content: Some(payload.content.clone()),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        });
        Ok(id)
    }

    async fn update(&self, token: &AuthToken, remote_id: &str, content: &str) -> RemoteResult<()> {
        self.inner.update_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await;

        if let Some(error) = self.scripted(&self.inner.fail_update) {
            return Err(error);
        }

        let mut items = self.inner.items.lock().unwrap();
        match items.iter_mut().find(|item| item.id == remote_id) {
            Some(item) => {
                item.content = Some(content.to_string());
                Ok(())
            }
            None => Err(RemoteError::Api(format!(
                "Prescription {remote_id} not found (404)"
            ))),
        }
    }

    async fn delete(&self, token: &AuthToken, remote_id: &str) -> RemoteResult<()> {
        self.inner.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await;

        if let Some(error) = self.scripted(&self.inner.fail_delete) {
            return Err(error);
        }

        let mut items = self.inner.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.id != remote_id);
        if items.len() == before {
            return Err(RemoteError::Api(format!(
                "Prescription {remote_id} not found (404)"
            )));
        }
        Ok(())
    }

    async fn list(
        &self,
        token: &AuthToken,
        patient_id: Option<i64>,
        doctor_id: Option<i64>,
        page: u32,
    ) -> RemoteResult<RemotePage> {
        self.inner.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await;

        if let Some(error) = self.scripted(&self.inner.fail_list) {
            return Err(error);
        }

        let filtered: Vec<RemoteItem> = self
            .inner
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| {
                patient_id.map_or(true, |wanted| {
                    item.patient.map(|patient| patient.id) == Some(wanted)
                }) && doctor_id.map_or(true, |wanted| {
                    item.doctor.map(|doctor| doctor.id) == Some(wanted)
                })
            })
            .cloned()
            .collect();

        let page_size = self.inner.page_size.load(Ordering::SeqCst);
        let last_page = filtered.len().div_ceil(page_size).max(1);
        let start = usize::try_from(page.max(1) - 1)
            .unwrap_or(0)
            .saturating_mul(page_size);
        let data: Vec<RemoteItem> = filtered.into_iter().skip(start).take(page_size).collect();

        Ok(RemotePage {
            data,
            meta: Some(PageMeta {
                last_page: Some(u32::try_from(last_page).unwrap_or(u32::MAX)),
                current_page: Some(page),
                total: None,
            }),
        })
    }
}
