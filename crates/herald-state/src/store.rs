//! Notification queue store
//!
//! Holds the displayed notifications and the FIFO of notifications waiting for
//! a slot. The store is plain data with no locking of its own; the controller
//! wraps it in a mutex so every transition below is atomic.
//!
//! A record lives in exactly one of `current` or `pending`, or has been handed
//! back to the caller as [`Retired`]. Promotion out of `pending` happens inside
//! the same call that frees the slot.

use herald_core::{
    ControllerError, DisplayMode, NotificationCallbacks, NotificationId, NotificationRecord,
};
use std::collections::VecDeque;
use std::fmt;

/// A record and its callbacks after leaving the store
pub struct Retired {
    /// The retired record
    pub record: NotificationRecord,
    /// Callbacks not yet fired
    pub callbacks: NotificationCallbacks,
}

impl Retired {
    /// Id of the retired record
    pub fn id(&self) -> NotificationId {
        self.record.id()
    }
}

impl fmt::Debug for Retired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retired")
            .field("id", &self.record.id())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Outcome of submitting a record
#[derive(Debug)]
pub enum DisplayDecision {
    /// Record went straight into a free slot
    Displayed,
    /// All slots busy; record waits in the queue
    Queued,
    /// All slots busy in stacked mode; the oldest displayed record was evicted
    DisplayedWithEviction(Retired),
}

impl DisplayDecision {
    /// Check if the submitted record is now displayed
    pub fn is_displayed(&self) -> bool {
        !matches!(self, DisplayDecision::Queued)
    }

    /// Id of the evicted record, if any
    pub fn evicted_id(&self) -> Option<NotificationId> {
        match self {
            DisplayDecision::DisplayedWithEviction(retired) => Some(retired.id()),
            _ => None,
        }
    }
}

/// Outcome of retiring a displayed record
#[derive(Debug)]
pub enum RetireResult {
    /// Id is not displayed (unknown, still queued, or already retired)
    NotFound,
    /// Record retired and nothing was waiting
    Idle(Retired),
    /// Record retired and the head of the queue took its slot
    Promoted {
        /// The retired record
        retired: Retired,
        /// The newly displayed record
        next: NotificationRecord,
    },
}

impl RetireResult {
    /// Check if anything was retired
    pub fn is_found(&self) -> bool {
        !matches!(self, RetireResult::NotFound)
    }

    /// The record promoted into the freed slot, if any
    pub fn promoted(&self) -> Option<&NotificationRecord> {
        match self {
            RetireResult::Promoted { next, .. } => Some(next),
            _ => None,
        }
    }
}

struct Entry {
    record: NotificationRecord,
    callbacks: NotificationCallbacks,
}

impl Entry {
    fn into_retired(self) -> Retired {
        Retired { record: self.record, callbacks: self.callbacks }
    }
}

/// Displayed slots plus FIFO overflow queue
pub struct QueueStore {
    mode: DisplayMode,
    /// Displayed records, oldest first
    current: VecDeque<Entry>,
    /// Waiting records, oldest first
    pending: VecDeque<Entry>,
}

impl QueueStore {
    /// Create an empty store
    ///
    /// Fails if the display mode has no slots.
    pub fn new(mode: DisplayMode) -> Result<Self, ControllerError> {
        mode.validate()?;
        Ok(Self { mode, current: VecDeque::new(), pending: VecDeque::new() })
    }

    /// Display mode the store was created with
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    fn has_capacity(&self) -> bool {
        self.current.len() < self.mode.capacity()
    }

    /// Display the record if a slot is free, otherwise queue or evict
    pub fn enqueue_or_display(
        &mut self,
        record: NotificationRecord,
        callbacks: NotificationCallbacks,
    ) -> DisplayDecision {
        let entry = Entry { record, callbacks };

        if self.has_capacity() {
            self.current.push_back(entry);
            return DisplayDecision::Displayed;
        }

        if !self.mode.evicts_on_overflow() {
            self.pending.push_back(entry);
            return DisplayDecision::Queued;
        }

        let evicted = self.current.pop_front();
        self.current.push_back(entry);
        match evicted {
            Some(evicted) => DisplayDecision::DisplayedWithEviction(evicted.into_retired()),
            None => DisplayDecision::Displayed,
        }
    }

    /// Remove a displayed record and promote the next queued one
    ///
    /// Unknown ids are a no-op returning [`RetireResult::NotFound`]; this is
    /// what makes a late timer racing a manual dismiss harmless.
    pub fn retire_current(&mut self, id: NotificationId) -> RetireResult {
        let Some(pos) = self.current.iter().position(|e| e.record.id() == id) else {
            return RetireResult::NotFound;
        };

        let retired = match self.current.remove(pos) {
            Some(entry) => entry.into_retired(),
            None => return RetireResult::NotFound,
        };

        match self.promote() {
            Some(next) => RetireResult::Promoted { retired, next },
            None => RetireResult::Idle(retired),
        }
    }

    fn promote(&mut self) -> Option<NotificationRecord> {
        if !self.has_capacity() {
            return None;
        }
        let entry = self.pending.pop_front()?;
        let record = entry.record.clone();
        self.current.push_back(entry);
        Some(record)
    }

    /// Snapshot of displayed records, oldest first
    pub fn peek_current(&self) -> Vec<NotificationRecord> {
        self.current.iter().map(|e| e.record.clone()).collect()
    }

    /// Snapshot of queued records, oldest first
    pub fn pending(&self) -> Vec<NotificationRecord> {
        self.pending.iter().map(|e| e.record.clone()).collect()
    }

    /// Get a displayed record by id
    pub fn get_current(&self, id: NotificationId) -> Option<&NotificationRecord> {
        self.current.iter().map(|e| &e.record).find(|r| r.id() == id)
    }

    /// Check if a record is displayed
    pub fn is_current(&self, id: NotificationId) -> bool {
        self.get_current(id).is_some()
    }

    /// Check if a record is queued
    pub fn is_pending(&self, id: NotificationId) -> bool {
        self.pending.iter().any(|e| e.record.id() == id)
    }

    /// Number of displayed records
    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    /// Number of queued records
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is displayed or queued
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.pending.is_empty()
    }

    /// Remove everything without promoting
    ///
    /// Returns `(displayed, queued)`, each oldest first.
    pub fn drain(&mut self) -> (Vec<Retired>, Vec<Retired>) {
        let current = self.current.drain(..).map(Entry::into_retired).collect();
        let pending = self.pending.drain(..).map(Entry::into_retired).collect();
        (current, pending)
    }
}

impl fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueStore")
            .field("mode", &self.mode)
            .field("current", &self.current.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
