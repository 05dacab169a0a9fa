//! `DataGroveError`: unified error type for data-grove public APIs.
//!
//! Every fallible operation in the crate reports through this enum so callers
//! (pipeline filters, action runners) can aggregate failures into user-facing
//! error lists without catching panics.

use thiserror::Error;

use crate::data::DType;
use crate::graph::id::ObjectId;

/// Unified error type for data-grove operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataGroveError {
    /// Attempted to construct an `ObjectId` with the reserved zero value.
    #[error("ObjectId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidObjectId,
    /// An id did not resolve to a live object in this structure.
    #[error("no object with id `{0}` in this structure")]
    UnknownObject(ObjectId),
    /// A path segment failed to resolve by name.
    #[error("path `{path}` does not resolve: segment `{segment}` not found")]
    UnresolvedPath { path: String, segment: String },
    /// An empty path was supplied where a target object is required.
    #[error("empty path does not address an object")]
    EmptyPath,
    /// A sibling with the requested name already exists under the parent.
    #[error("name `{name}` already exists under `{parent}`")]
    NameCollision { parent: String, name: String },
    /// Object names may not be empty or contain the path separator.
    #[error("invalid object name `{0}`")]
    InvalidName(String),
    /// The requested parent cannot hold children.
    #[error("object `{0}` is not a container")]
    NotAContainer(ObjectId),
    /// Reparenting would close a cycle; the ownership graph must stay a DAG.
    #[error("operation would create a cycle (ownership graph must be a DAG)")]
    CycleDetected,
    /// The edge `parent -> child` does not exist.
    #[error("object `{child}` is not a child of `{parent}`")]
    NotAChild { parent: ObjectId, child: ObjectId },
    /// An array's tuple count does not match its attribute matrix's shape.
    #[error("tuple count mismatch: attribute matrix expects {expected}, array has {found}")]
    TupleCountMismatch { expected: usize, found: usize },
    /// Cross-array tuple validation found disagreeing counts.
    #[error("arrays disagree on tuple count: {0}")]
    InconsistentTupleCounts(String),
    /// A typed lookup found an array of a different element type.
    #[error("element type mismatch: expected {expected:?}, found {found:?}")]
    UnexpectedElementType { expected: DType, found: DType },
    /// The object at the path exists but is not of the requested kind.
    #[error("object at `{path}` is not {expected}")]
    UnexpectedObjectKind {
        path: String,
        expected: &'static str,
    },
    /// Bounds-checked store access outside `[0, len)`.
    #[error("index {index} out of bounds for store of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// Tuple-granular access outside `[0, tuple_count)`.
    #[error("tuple index {tuple} out of bounds for store with {tuple_count} tuples")]
    TupleOutOfBounds { tuple: usize, tuple_count: usize },
    /// A slice argument does not match the store's component count.
    #[error("slice length {found} does not match component count {expected}")]
    ComponentCountMismatch { expected: usize, found: usize },
    /// Geometry operation issued before the required list was assigned.
    #[error("geometry `{0}` has no {1} list assigned")]
    MissingGeometryList(ObjectId, &'static str),
    /// Geometry-level misuse (wrong level, malformed shared list, ...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A preflighted action failed validation; nothing was committed.
    #[error("action preflight failed: {0}")]
    ActionPreflight(String),
}
