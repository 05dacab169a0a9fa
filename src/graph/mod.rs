//! The ownership graph: arena, objects, paths, observers, and actions.
//!
//! A [`structure::DataStructure`] exclusively owns every
//! [`object::DataObject`] by [`id::ObjectId`]; all other code holds ids, name
//! paths, or transiently borrowed references. Parent/child edges form a DAG
//! (multi-parent is allowed, cycles are rejected), and every structural
//! mutation is reported to registered observers.

pub mod actions;
pub mod id;
pub mod object;
pub mod observer;
pub mod path;
pub mod structure;

pub use actions::{Action, OutputActions};
pub use id::ObjectId;
pub use object::{AttributeMatrix, ChildTable, DataObject, Group, ObjectPayload, ScalarValue};
pub use observer::{DataEvent, DataStructureObserver, MsgType, RecordingObserver, SharedObserver};
pub use path::{DataPath, LinkedPath};
pub use structure::DataStructure;
