//! Observable in-memory state of one resource kind.

use tokio::sync::watch;

use crate::records::{Record, RecordId};

/// Lifecycle of the most recent operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Which synchronizer operation is in flight or last finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    FetchOne,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SliceEvent<R> {
    Started(Operation),
    Fetched(Vec<R>),
    Created(R),
    Loaded(R),
    Updated(R),
    Deleted(RecordId),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliceState<R> {
    pub data: Vec<R>,
    pub status: SyncStatus,
    pub error: Option<String>,
    pub operation: Option<Operation>,
}

impl<R> Default for SliceState<R> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            status: SyncStatus::Idle,
            error: None,
            operation: None,
        }
    }
}

impl<R: Record> SliceState<R> {
    /// Apply one event. `Failed` never touches `data`.
    pub fn apply(&mut self, event: SliceEvent<R>) {
        match event {
            SliceEvent::Started(operation) => {
                self.status = SyncStatus::Loading;
                self.error = None;
                self.operation = Some(operation);
                return;
            }
            SliceEvent::Fetched(records) => self.data = records,
            SliceEvent::Created(record) => self.data.push(record),
            SliceEvent::Loaded(record) => {
                match self.data.iter_mut().find(|item| item.id() == record.id()) {
                    Some(existing) => *existing = record,
                    None => self.data.push(record),
                }
            }
            SliceEvent::Updated(record) => {
                if let Some(existing) = self.data.iter_mut().find(|item| item.id() == record.id()) {
                    *existing = record;
                }
            }
            SliceEvent::Deleted(id) => self.data.retain(|item| item.id() != &id),
            SliceEvent::Failed(message) => {
                self.status = SyncStatus::Failed;
                self.error = Some(message);
                return;
            }
        }
        self.status = SyncStatus::Succeeded;
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.data.iter().find(|item| item.id() == id)
    }
}

/// Shared, observable holder of a [`SliceState`].
///
/// Only synchronizers dispatch events; readers take snapshots or subscribe.
#[derive(Clone, Debug)]
pub struct Slice<R> {
    state: watch::Sender<SliceState<R>>,
}

impl<R: Record> Slice<R> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> SliceState<R> {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.state.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<SliceState<R>> {
        self.state.subscribe()
    }

    pub(crate) fn dispatch(&self, event: SliceEvent<R>) {
        self.state.send_modify(|state| state.apply(event));
    }
}

impl<R: Record> Default for Slice<R> {
    fn default() -> Self {
        Self::new()
    }
}
