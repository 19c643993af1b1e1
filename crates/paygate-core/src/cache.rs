//! Query Cache
//!
//! Explicit cache for remote reads, keyed by logical resource. Writes
//! invalidate rather than merge: the entry is marked stale and the next read
//! goes back to the backend.
//!
//! Every fetch holds a [`FetchTicket`]. Invalidating, clearing or starting a
//! newer fetch for the same key bumps the key's generation, and a completion
//! carrying an older generation is dropped. This is how superseded requests
//! (e.g. one still in flight when the user logs out) are abandoned without
//! being aborted.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Logical resource names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUserProfile,
    PaymentsConfigured,
}

impl QueryKey {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CurrentUserProfile => "currentUserProfile",
            Self::PaymentsConfigured => "stripeConfigured",
        }
    }
}

/// Outcome of the most recent fetch for a key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Fetched,
    Errored,
}

/// Point-in-time view of one entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,

    /// At least one fetch has settled (successfully or not)
    pub fetched: bool,

    /// Invalidated since the value was stored
    pub stale: bool,

    pub value: Option<T>,
}

impl<T> QuerySnapshot<T> {
    /// First load in progress: nothing settled yet
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && !self.fetched
    }
}

/// Proof that a fetch was started at a given generation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub const fn key(&self) -> QueryKey {
        self.key
    }
}

#[derive(Default)]
struct Entry {
    status: QueryStatus,
    fetched: bool,
    stale: bool,
    value: Option<Box<dyn Any + Send + Sync>>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<QueryKey, u64>,
}

impl Inner {
    fn bump(&mut self, key: QueryKey) -> u64 {
        let generation = self.generations.entry(key).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generations.get(&ticket.key).copied().unwrap_or(0) == ticket.generation
    }
}

/// Shared cache for remote reads
#[derive(Default)]
pub struct QueryCache {
    inner: Mutex<Inner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of `key`; a value of another type reads as absent
    pub fn snapshot<T>(&self, key: QueryKey) -> QuerySnapshot<T>
    where
        T: Any + Clone + Send + Sync,
    {
        let inner = self.lock();
        inner.entries.get(&key).map_or(
            QuerySnapshot {
                status: QueryStatus::Idle,
                fetched: false,
                stale: false,
                value: None,
            },
            |entry| QuerySnapshot {
                status: entry.status,
                fetched: entry.fetched,
                stale: entry.stale,
                value: entry
                    .value
                    .as_ref()
                    .and_then(|v| v.downcast_ref::<T>())
                    .cloned(),
            },
        )
    }

    /// Cached value, stale or not
    pub fn get<T>(&self, key: QueryKey) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        self.snapshot(key).value
    }

    /// Whether a read should go to the backend
    pub fn needs_fetch(&self, key: QueryKey) -> bool {
        let inner = self.lock();
        inner.entries.get(&key).is_none_or(|entry| {
            entry.stale || matches!(entry.status, QueryStatus::Idle | QueryStatus::Errored)
        })
    }

    /// Mark `key` as loading and supersede any fetch already in flight
    pub fn begin(&self, key: QueryKey) -> FetchTicket {
        let mut inner = self.lock();
        let generation = inner.bump(key);
        inner.entries.entry(key).or_default().status = QueryStatus::Loading;
        tracing::debug!(key = key.name(), generation, "fetch started");
        FetchTicket { key, generation }
    }

    /// Store a fetched value; returns `false` if the ticket was superseded
    pub fn complete<T>(&self, ticket: FetchTicket, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        let mut inner = self.lock();
        if !inner.is_current(ticket) {
            tracing::debug!(key = ticket.key.name(), "discarding superseded fetch");
            return false;
        }

        let entry = inner.entries.entry(ticket.key).or_default();
        entry.status = QueryStatus::Fetched;
        entry.fetched = true;
        entry.stale = false;
        entry.value = Some(Box::new(value));
        true
    }

    /// Record a failed fetch; the value is dropped so readers see "unknown"
    pub fn fail(&self, ticket: FetchTicket) -> bool {
        let mut inner = self.lock();
        if !inner.is_current(ticket) {
            tracing::debug!(key = ticket.key.name(), "discarding superseded failure");
            return false;
        }

        let entry = inner.entries.entry(ticket.key).or_default();
        entry.status = QueryStatus::Errored;
        entry.fetched = true;
        entry.stale = false;
        entry.value = None;
        true
    }

    /// Mark `key` stale after a write and abandon in-flight reads
    pub fn invalidate(&self, key: QueryKey) {
        let mut inner = self.lock();
        inner.bump(key);
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.stale = true;
            if entry.status == QueryStatus::Loading {
                entry.status = QueryStatus::Idle;
            }
        }
        tracing::debug!(key = key.name(), "invalidated");
    }

    /// Drop every entry (e.g. on logout)
    pub fn clear(&self) {
        let mut inner = self.lock();
        let keys: Vec<QueryKey> = inner.generations.keys().copied().collect();
        for key in keys {
            inner.bump(key);
        }
        inner.entries.clear();
        tracing::debug!("query cache cleared");
    }
}
