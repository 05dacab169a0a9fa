//! # data-grove
//!
//! data-grove is the typed, graph-structured hierarchical data store at the
//! core of plugin-based scientific data-processing pipelines (materials
//! science, imaging). It provides the in-memory model that pipeline filters
//! read and mutate: groups, shape-constrained attribute matrices, typed
//! tuple-shaped arrays, and staged node geometries, all owned by a single
//! [`DataStructure`](graph::structure::DataStructure) arena and addressed by
//! opaque id or by name path.
//!
//! ## Features
//! - Multi-parent (DAG) ownership with cascading removal: a shared object
//!   survives as long as any live path to a root remains
//! - `DataPath` (name-chain, re-resolved per use) and `LinkedPath`
//!   (id-chain, rename-stable) addressing
//! - Typed `DataStore<T>` access behind a type-erased `AnyStore`, with
//!   overlap-preserving resize and full-tuple copies
//! - Deep copy into a parallel id space with a remap pass over every stored
//!   reference
//! - Synchronous typed observer events (added/removed/renamed/reparented)
//!   delivered in mutation order
//! - Two-phase `Action` lists: dry-run against a copy, then commit
//!
//! ## Concurrency
//! Structural mutation is single-owner by design and not internally
//! synchronized; the structure is `Send + Sync` so a frozen graph can be
//! read from content-parallel workers between mutations.

pub mod data;
pub mod debug_invariants;
pub mod error;
pub mod geometry;
pub mod graph;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::{AnyStore, DType, DataStore, NeighborList, Scalar};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::error::DataGroveError;
    pub use crate::geometry::{BoundingBox, CellKind, ElementClass, Geometry, Topology};
    pub use crate::graph::{
        Action, DataEvent, DataPath, DataStructure, DataStructureObserver, LinkedPath, MsgType,
        ObjectId, ObjectPayload, OutputActions, ScalarValue, SharedObserver,
    };
}
