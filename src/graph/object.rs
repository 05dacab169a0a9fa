//! `DataObject`: one node of the ownership graph.
//!
//! Every object carries an id, a name (unique among siblings), the set of its
//! parent ids, and a payload. Payloads are a sum type rather than a class
//! hierarchy: containers (`Group`, `AttributeMatrix`, `Geometry`) embed a
//! [`ChildTable`] — an insertion-ordered child list with a name index — while
//! arrays, neighbor lists, and scalars are leaves.
//!
//! # Invariants
//! - A `ChildTable`'s `order` and `by_name` agree exactly (same ids, no
//!   duplicates).
//! - `parents` is empty iff the object sits in the structure's root table.
//!
//! These are checked after mutations in debug builds and when the
//! `check-invariants` feature is enabled.

use std::collections::{BTreeSet, HashMap};

use crate::data::neighbor_list::NeighborList;
use crate::data::AnyStore;
use crate::debug_invariants::DebugInvariants;
use crate::error::DataGroveError;
use crate::geometry::Geometry;
use crate::graph::id::ObjectId;
use crate::grove_debug_assert_ok;

/// Old-id to new-id mapping built during a deep copy.
///
/// Every payload that stores ids implements a remap hook taking this table;
/// the copy pass visits each object exactly once per structural reference it
/// holds.
#[derive(Debug, Default)]
pub struct IdRemap {
    mapping: HashMap<ObjectId, ObjectId>,
}

impl IdRemap {
    pub(crate) fn insert(&mut self, old: ObjectId, new: ObjectId) {
        self.mapping.insert(old, new);
    }

    /// Translate an old id. Ids absent from the mapping are returned
    /// unchanged; live references always have an entry.
    #[inline]
    pub fn map(&self, id: ObjectId) -> ObjectId {
        self.mapping.get(&id).copied().unwrap_or(id)
    }

    /// Translate an optional reference.
    #[inline]
    pub fn map_opt(&self, id: Option<ObjectId>) -> Option<ObjectId> {
        id.map(|i| self.map(i))
    }
}

/// Insertion-ordered mapping of child names to child ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildTable {
    by_name: HashMap<String, ObjectId>,
    order: Vec<ObjectId>,
}

impl ChildTable {
    /// Register a child under `name`.
    ///
    /// # Errors
    /// [`DataGroveError::NameCollision`] when a sibling already uses the name
    /// (`parent` only labels the error message).
    pub fn insert(
        &mut self,
        parent: &str,
        name: &str,
        id: ObjectId,
    ) -> Result<(), DataGroveError> {
        if self.by_name.contains_key(name) {
            return Err(DataGroveError::NameCollision {
                parent: parent.to_owned(),
                name: name.to_owned(),
            });
        }
        self.by_name.insert(name.to_owned(), id);
        self.order.push(id);
        grove_debug_assert_ok!(self.validate_invariants(), "ChildTable invalid");
        Ok(())
    }

    /// Register a child whose name was already validated against this table.
    pub(crate) fn insert_unchecked(&mut self, name: &str, id: ObjectId) {
        debug_assert!(!self.by_name.contains_key(name));
        self.by_name.insert(name.to_owned(), id);
        self.order.push(id);
    }

    /// Drop the child registered under `name`. No-op if absent.
    pub fn remove(&mut self, name: &str) {
        if let Some(id) = self.by_name.remove(name) {
            self.order.retain(|&c| c != id);
        }
        grove_debug_assert_ok!(self.validate_invariants(), "ChildTable invalid");
    }

    /// Re-key a child after a rename. The id keeps its position in the
    /// iteration order.
    pub fn rename(&mut self, old: &str, new: &str) {
        if let Some(id) = self.by_name.remove(old) {
            self.by_name.insert(new.to_owned(), id);
        }
        grove_debug_assert_ok!(self.validate_invariants(), "ChildTable invalid");
    }

    /// Child id registered under `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    /// Whether any child uses `name`.
    #[inline]
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Whether `id` is registered.
    #[inline]
    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.order.contains(&id)
    }

    /// Number of children.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Child ids in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.order.iter().copied()
    }

    pub(crate) fn remap_ids(&mut self, remap: &IdRemap) {
        for id in &mut self.order {
            *id = remap.map(*id);
        }
        for id in self.by_name.values_mut() {
            *id = remap.map(*id);
        }
    }
}

impl DebugInvariants for ChildTable {
    fn debug_assert_invariants(&self) {
        grove_debug_assert_ok!(self.validate_invariants(), "ChildTable invalid");
    }

    fn validate_invariants(&self) -> Result<(), DataGroveError> {
        let set: BTreeSet<_> = self.order.iter().copied().collect();
        if set.len() != self.order.len() {
            return Err(DataGroveError::InvalidName(
                "duplicate child id in order".into(),
            ));
        }
        if self.by_name.len() != self.order.len() {
            return Err(DataGroveError::InvalidName(
                "name index and order disagree".into(),
            ));
        }
        if let Some((name, _)) = self.by_name.iter().find(|(_, id)| !set.contains(id)) {
            return Err(DataGroveError::InvalidName(format!(
                "name `{name}` indexes an id missing from order"
            )));
        }
        Ok(())
    }
}

/// Container without a tuple-shape constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub(crate) children: ChildTable,
}

/// Container whose child arrays must all share one tuple count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMatrix {
    pub(crate) children: ChildTable,
    pub(crate) tuple_shape: Vec<usize>,
}

impl AttributeMatrix {
    pub fn new(tuple_shape: Vec<usize>) -> Self {
        Self {
            children: ChildTable::default(),
            tuple_shape,
        }
    }

    /// The tuple shape every child array must match.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.tuple_shape
    }

    /// Product of the tuple dimensions.
    #[inline]
    pub fn num_tuples(&self) -> usize {
        self.tuple_shape.iter().product()
    }
}

/// A single named value; used for pipeline-level bookkeeping data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ScalarValue {
    I64(i64),
    U64(u64),
    F64(f64),
    Text(String),
}

/// What a [`DataObject`] holds.
#[derive(Clone, Debug)]
pub enum ObjectPayload {
    Group(Group),
    AttributeMatrix(AttributeMatrix),
    Array(AnyStore),
    NeighborList(NeighborList),
    Geometry(Geometry),
    Scalar(ScalarValue),
}

impl ObjectPayload {
    /// Human-readable kind label for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectPayload::Group(_) => "a group",
            ObjectPayload::AttributeMatrix(_) => "an attribute matrix",
            ObjectPayload::Array(_) => "an array",
            ObjectPayload::NeighborList(_) => "a neighbor list",
            ObjectPayload::Geometry(_) => "a geometry",
            ObjectPayload::Scalar(_) => "a scalar",
        }
    }

    /// Child table, when this payload can hold children.
    pub fn children(&self) -> Option<&ChildTable> {
        match self {
            ObjectPayload::Group(g) => Some(&g.children),
            ObjectPayload::AttributeMatrix(m) => Some(&m.children),
            ObjectPayload::Geometry(g) => Some(g.children()),
            _ => None,
        }
    }

    /// Mutable child table.
    pub fn children_mut(&mut self) -> Option<&mut ChildTable> {
        match self {
            ObjectPayload::Group(g) => Some(&mut g.children),
            ObjectPayload::AttributeMatrix(m) => Some(&mut m.children),
            ObjectPayload::Geometry(g) => Some(g.children_mut()),
            _ => None,
        }
    }

    /// Tuple count for shape-checked payloads (arrays and neighbor lists).
    pub fn num_tuples(&self) -> Option<usize> {
        match self {
            ObjectPayload::Array(store) => Some(store.tuple_count()),
            ObjectPayload::NeighborList(nl) => Some(nl.num_lists()),
            _ => None,
        }
    }

    /// Rewrite every stored id through the copy-time mapping.
    pub(crate) fn remap_ids(&mut self, remap: &IdRemap) {
        match self {
            ObjectPayload::Group(g) => g.children.remap_ids(remap),
            ObjectPayload::AttributeMatrix(m) => m.children.remap_ids(remap),
            ObjectPayload::Geometry(g) => g.remap_ids(remap),
            ObjectPayload::Array(_)
            | ObjectPayload::NeighborList(_)
            | ObjectPayload::Scalar(_) => {}
        }
    }
}

/// One node of the ownership graph: id, sibling-unique name, parent edge set,
/// and payload. Structural fields are mutated only by the owning
/// [`DataStructure`](crate::graph::structure::DataStructure).
#[derive(Clone, Debug)]
pub struct DataObject {
    id: ObjectId,
    name: String,
    parents: BTreeSet<ObjectId>,
    payload: ObjectPayload,
}

impl DataObject {
    pub(crate) fn new(id: ObjectId, name: String, payload: ObjectPayload) -> Self {
        Self {
            id,
            name,
            parents: BTreeSet::new(),
            payload,
        }
    }

    /// Unique id; immutable once assigned.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of all parents. Empty only for root-level objects.
    #[inline]
    pub fn parents(&self) -> &BTreeSet<ObjectId> {
        &self.parents
    }

    /// Payload access.
    #[inline]
    pub fn payload(&self) -> &ObjectPayload {
        &self.payload
    }

    /// Mutable payload access.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut ObjectPayload {
        &mut self.payload
    }

    /// Whether this object can hold children.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.payload.children().is_some()
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn parents_mut(&mut self) -> &mut BTreeSet<ObjectId> {
        &mut self.parents
    }

    pub(crate) fn remap_ids(&mut self, remap: &IdRemap) {
        self.parents = self.parents.iter().map(|&p| remap.map(p)).collect();
        self.payload.remap_ids(remap);
    }
}
