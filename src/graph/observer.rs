//! Observer protocol: typed change events delivered synchronously.
//!
//! Every successful structural mutation constructs one [`DataEvent`] and
//! delivers it to every registered observer before the mutating call returns.
//! Delivery order matches mutation application order; there is no batching or
//! coalescing. A cascading removal emits one `Removed` event per object it
//! actually deletes, in deletion order.
//!
//! Observers are held as `Arc<parking_lot::Mutex<_>>` slots so callers keep a
//! handle for inspection and the structure stays `Send + Sync` for the
//! frozen-structure/parallel-content contract.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::graph::id::ObjectId;
use crate::graph::structure::DataStructure;

/// Discriminant of a [`DataEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MsgType {
    Added,
    Removed,
    Renamed,
    Reparented,
}

/// One structural change, reported after it has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataEvent {
    /// An object was created and registered.
    Added {
        id: ObjectId,
        name: String,
        parent: Option<ObjectId>,
    },
    /// An object was deleted.
    Removed { id: ObjectId, name: String },
    /// An object's name changed.
    Renamed {
        id: ObjectId,
        previous: String,
        current: String,
    },
    /// A parent edge was added (`attached`) or cut (`!attached`).
    Reparented {
        child: ObjectId,
        parent: ObjectId,
        attached: bool,
    },
}

impl DataEvent {
    /// Message discriminant.
    pub fn msg_type(&self) -> MsgType {
        match self {
            DataEvent::Added { .. } => MsgType::Added,
            DataEvent::Removed { .. } => MsgType::Removed,
            DataEvent::Renamed { .. } => MsgType::Renamed,
            DataEvent::Reparented { .. } => MsgType::Reparented,
        }
    }

    /// Id of the object the event is about.
    pub fn target(&self) -> ObjectId {
        match *self {
            DataEvent::Added { id, .. } => id,
            DataEvent::Removed { id, .. } => id,
            DataEvent::Renamed { id, .. } => id,
            DataEvent::Reparented { child, .. } => child,
        }
    }
}

/// Receiver of structural change events.
pub trait DataStructureObserver: Send {
    /// Called synchronously for every applied mutation, in application order.
    fn on_notify(&mut self, structure: &DataStructure, event: &DataEvent);
}

/// Shared observer slot as stored in the registry.
pub type SharedObserver = Arc<Mutex<dyn DataStructureObserver>>;

/// Registered observers of one structure.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: Vec<SharedObserver>,
}

impl ObserverRegistry {
    pub(crate) fn register(&mut self, observer: SharedObserver) {
        self.observers.push(observer);
    }

    pub(crate) fn unregister(&mut self, observer: &SharedObserver) {
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Snapshot of the current slots; taken before delivery so an observer
    /// may (un)register from inside `on_notify` without skewing iteration.
    pub(crate) fn snapshot(&self) -> Vec<SharedObserver> {
        self.observers.clone()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("len", &self.observers.len())
            .finish()
    }
}

/// Convenience observer recording every event; used by tests and tooling.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Vec<DataEvent>,
}

impl DataStructureObserver for RecordingObserver {
    fn on_notify(&mut self, _structure: &DataStructure, event: &DataEvent) {
        self.events.push(event.clone());
    }
}
