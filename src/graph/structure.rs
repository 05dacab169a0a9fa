//! `DataStructure`: the graph and lifecycle authority.
//!
//! One structure exclusively owns every [`DataObject`] it creates, keyed by
//! [`ObjectId`] in a single arena map. Parent/child edges are stored on both
//! sides — each object carries its parent-id set, each container carries an
//! insertion-ordered child table — and the relation must stay a DAG:
//! reparenting runs an explicit reachability check and rejects cycles.
//!
//! Structural mutation is not internally synchronized. The intended regime is
//! a single logical owner thread mutating structure while content-parallel
//! readers only ever run against a frozen graph; the type is `Send + Sync`
//! so frozen read-only access can be shared across workers.
//!
//! # Failure semantics
//! Mutations validate before they touch anything: either the whole operation
//! succeeds and all invariants hold afterward, or nothing changes and an
//! error is returned.

use std::collections::{HashMap, VecDeque};

use itertools::Itertools;

use crate::data::neighbor_list::NeighborList;
use crate::data::{AnyStore, DType, DataStore, Scalar};
use crate::debug_invariants::DebugInvariants;
use crate::error::DataGroveError;
use crate::geometry::Geometry;
use crate::graph::id::ObjectId;
use crate::graph::object::{
    AttributeMatrix, ChildTable, DataObject, Group, IdRemap, ObjectPayload, ScalarValue,
};
use crate::graph::observer::{DataEvent, ObserverRegistry, SharedObserver};
use crate::graph::path::{validate_name, DataPath, LinkedPath};
use crate::grove_debug_assert_ok;

/// Root container of the hierarchy; exclusive owner of all its objects.
#[derive(Debug, Default)]
pub struct DataStructure {
    objects: HashMap<ObjectId, DataObject>,
    roots: ChildTable,
    next_id: u64,
    observers: ObserverRegistry,
}

impl DataStructure {
    /// An empty structure with a fresh id counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the structure owns no objects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether `id` is live in this structure.
    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Top-level object ids in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.roots.iter()
    }

    /// All live ids in ascending id order.
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<_> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// O(1) lookup by id.
    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&DataObject> {
        self.objects.get(&id)
    }

    /// O(1) mutable lookup by id.
    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DataObject> {
        self.objects.get_mut(&id)
    }

    fn object_ref(&self, id: ObjectId) -> Result<&DataObject, DataGroveError> {
        self.objects.get(&id).ok_or(DataGroveError::UnknownObject(id))
    }

    /// Resolve a name path; O(depth) chain traversal from the root table.
    pub fn resolve(&self, path: &DataPath) -> Option<&DataObject> {
        self.id_of(path).ok().and_then(|id| self.get(id))
    }

    /// Id addressed by `path`.
    ///
    /// # Errors
    /// [`DataGroveError::EmptyPath`] for the empty path,
    /// [`DataGroveError::UnresolvedPath`] naming the first missing segment.
    pub fn id_of(&self, path: &DataPath) -> Result<ObjectId, DataGroveError> {
        let mut segments = path.segments().iter();
        let first = segments.next().ok_or(DataGroveError::EmptyPath)?;
        let unresolved = |segment: &str| DataGroveError::UnresolvedPath {
            path: path.to_string(),
            segment: segment.to_owned(),
        };
        let mut current = self.roots.get(first).ok_or_else(|| unresolved(first))?;
        for segment in segments {
            let children = self
                .get(current)
                .and_then(|obj| obj.payload().children())
                .ok_or_else(|| unresolved(segment))?;
            current = children.get(segment).ok_or_else(|| unresolved(segment))?;
        }
        Ok(current)
    }

    /// Capture the id chain of a resolved path.
    pub fn linked_path(&self, path: &DataPath) -> Result<LinkedPath, DataGroveError> {
        let mut ids = Vec::with_capacity(path.len());
        let mut segments = path.segments().iter();
        let first = segments.next().ok_or(DataGroveError::EmptyPath)?;
        let unresolved = |segment: &str| DataGroveError::UnresolvedPath {
            path: path.to_string(),
            segment: segment.to_owned(),
        };
        let mut current = self.roots.get(first).ok_or_else(|| unresolved(first))?;
        ids.push(current);
        for segment in segments {
            let children = self
                .get(current)
                .and_then(|obj| obj.payload().children())
                .ok_or_else(|| unresolved(segment))?;
            current = children.get(segment).ok_or_else(|| unresolved(segment))?;
            ids.push(current);
        }
        Ok(LinkedPath::from_ids(ids))
    }

    /// Typed store lookup; `None` when the path does not resolve to an array
    /// of element type `T`.
    pub fn data_as<T: Scalar>(&self, path: &DataPath) -> Option<&DataStore<T>> {
        match self.resolve(path)?.payload() {
            ObjectPayload::Array(any) => any.typed::<T>(),
            _ => None,
        }
    }

    /// Mutable typed store lookup.
    pub fn data_as_mut<T: Scalar>(&mut self, path: &DataPath) -> Option<&mut DataStore<T>> {
        let id = self.id_of(path).ok()?;
        match self.get_mut(id)?.payload_mut() {
            ObjectPayload::Array(any) => any.typed_mut::<T>(),
            _ => None,
        }
    }

    /// Typed store lookup that reports why it failed.
    ///
    /// # Errors
    /// Path resolution errors, [`DataGroveError::UnexpectedObjectKind`] when
    /// the target is not an array, or
    /// [`DataGroveError::UnexpectedElementType`] on a type mismatch.
    pub fn data_ref_as<T: Scalar>(
        &self,
        path: &DataPath,
    ) -> Result<&DataStore<T>, DataGroveError> {
        match self.object_ref(self.id_of(path)?)?.payload() {
            ObjectPayload::Array(any) => any.typed_ref::<T>(),
            _ => Err(DataGroveError::UnexpectedObjectKind {
                path: path.to_string(),
                expected: "an array",
            }),
        }
    }

    /// Mutable variant of [`data_ref_as`](Self::data_ref_as).
    pub fn data_ref_as_mut<T: Scalar>(
        &mut self,
        path: &DataPath,
    ) -> Result<&mut DataStore<T>, DataGroveError> {
        let id = self.id_of(path)?;
        let obj = self
            .objects
            .get_mut(&id)
            .ok_or(DataGroveError::UnknownObject(id))?;
        match obj.payload_mut() {
            ObjectPayload::Array(any) => {
                let found = any.dtype();
                any.typed_mut::<T>()
                    .ok_or(DataGroveError::UnexpectedElementType {
                        expected: T::DTYPE,
                        found,
                    })
            }
            _ => Err(DataGroveError::UnexpectedObjectKind {
                path: path.to_string(),
                expected: "an array",
            }),
        }
    }

    /// Type-erased store at `path`.
    pub fn any_store(&self, path: &DataPath) -> Result<&AnyStore, DataGroveError> {
        match self.object_ref(self.id_of(path)?)?.payload() {
            ObjectPayload::Array(any) => Ok(any),
            _ => Err(DataGroveError::UnexpectedObjectKind {
                path: path.to_string(),
                expected: "an array",
            }),
        }
    }

    /// Neighbor list at `path`.
    pub fn neighbor_list(&self, path: &DataPath) -> Result<&NeighborList, DataGroveError> {
        match self.object_ref(self.id_of(path)?)?.payload() {
            ObjectPayload::NeighborList(nl) => Ok(nl),
            _ => Err(DataGroveError::UnexpectedObjectKind {
                path: path.to_string(),
                expected: "a neighbor list",
            }),
        }
    }

    /// Geometry payload for `id`.
    pub fn geometry_ref(&self, id: ObjectId) -> Result<&Geometry, DataGroveError> {
        match self.object_ref(id)?.payload() {
            ObjectPayload::Geometry(g) => Ok(g),
            payload => Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {id} ({})", payload.kind()),
                expected: "a geometry",
            }),
        }
    }

    pub(crate) fn geometry_mut(&mut self, id: ObjectId) -> Result<&mut Geometry, DataGroveError> {
        match self
            .objects
            .get_mut(&id)
            .ok_or(DataGroveError::UnknownObject(id))?
            .payload_mut()
        {
            ObjectPayload::Geometry(g) => Ok(g),
            payload => Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {id} ({})", payload.kind()),
                expected: "a geometry",
            }),
        }
    }

    /// Check that every path resolves to tuple-shaped data and that all
    /// tuple counts agree; the standard filter precondition.
    pub fn validate_number_of_tuples(&self, paths: &[DataPath]) -> Result<(), DataGroveError> {
        let mut counts = Vec::with_capacity(paths.len());
        for path in paths {
            let obj = self.object_ref(self.id_of(path)?)?;
            let n = obj.payload().num_tuples().ok_or_else(|| {
                DataGroveError::UnexpectedObjectKind {
                    path: path.to_string(),
                    expected: "tuple-shaped data",
                }
            })?;
            counts.push((path, n));
        }
        if counts.iter().map(|(_, n)| n).all_equal() {
            Ok(())
        } else {
            let detail = counts
                .iter()
                .map(|(path, n)| format!("{path}={n}"))
                .join(", ");
            Err(DataGroveError::InconsistentTupleCounts(detail))
        }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a [`Group`] under `parent` (or at the root table).
    pub fn create_group(
        &mut self,
        name: &str,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(name, parent, ObjectPayload::Group(Group::default()))
    }

    /// Create an [`AttributeMatrix`] with the given tuple shape.
    pub fn create_attribute_matrix(
        &mut self,
        name: &str,
        tuple_shape: Vec<usize>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(
            name,
            parent,
            ObjectPayload::AttributeMatrix(AttributeMatrix::new(tuple_shape)),
        )
    }

    /// Create an array wrapping an existing typed store.
    pub fn create_array<T: Scalar>(
        &mut self,
        name: &str,
        store: DataStore<T>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(name, parent, ObjectPayload::Array(store.into()))
    }

    /// Create a zero-filled array of `dtype` with the given shapes.
    pub fn create_array_of(
        &mut self,
        name: &str,
        dtype: DType,
        tuple_shape: Vec<usize>,
        component_shape: Vec<usize>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(
            name,
            parent,
            ObjectPayload::Array(AnyStore::new(dtype, tuple_shape, component_shape)),
        )
    }

    /// Create a neighbor-list object.
    pub fn create_neighbor_list(
        &mut self,
        name: &str,
        lists: NeighborList,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(name, parent, ObjectPayload::NeighborList(lists))
    }

    /// Create a scalar object.
    pub fn create_scalar(
        &mut self,
        name: &str,
        value: ScalarValue,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(name, parent, ObjectPayload::Scalar(value))
    }

    /// Create a geometry object.
    pub fn create_geometry(
        &mut self,
        name: &str,
        geometry: Geometry,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, DataGroveError> {
        self.register(name, parent, ObjectPayload::Geometry(geometry))
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        // next_id starts at 0 and is pre-incremented, so the value is nonzero
        ObjectId::try_new(self.next_id).unwrap_or_else(|_| unreachable!())
    }

    /// Validate, then allocate an id and register the object. The validation
    /// happens entirely up front so a failure leaves the structure untouched.
    fn register(
        &mut self,
        name: &str,
        parent: Option<ObjectId>,
        payload: ObjectPayload,
    ) -> Result<ObjectId, DataGroveError> {
        validate_name(name)?;
        match parent {
            None => {
                if self.roots.contains_name(name) {
                    return Err(DataGroveError::NameCollision {
                        parent: "/".to_owned(),
                        name: name.to_owned(),
                    });
                }
            }
            Some(pid) => {
                let pobj = self.object_ref(pid)?;
                let children = pobj
                    .payload()
                    .children()
                    .ok_or(DataGroveError::NotAContainer(pid))?;
                if children.contains_name(name) {
                    return Err(DataGroveError::NameCollision {
                        parent: pobj.name().to_owned(),
                        name: name.to_owned(),
                    });
                }
                self.check_matrix_shape(pobj, &payload, name)?;
            }
        }

        let id = self.allocate_id();
        let mut object = DataObject::new(id, name.to_owned(), payload);
        if let Some(pid) = parent {
            object.parents_mut().insert(pid);
        }
        self.objects.insert(id, object);
        match parent {
            None => self.roots.insert_unchecked(name, id),
            Some(pid) => {
                if let Some(children) = self
                    .objects
                    .get_mut(&pid)
                    .and_then(|p| p.payload_mut().children_mut())
                {
                    children.insert_unchecked(name, id);
                }
            }
        }
        log::debug!("added `{name}` (id {id}) under {parent:?}");
        self.emit(DataEvent::Added {
            id,
            name: name.to_owned(),
            parent,
        });
        self.debug_assert_invariants();
        Ok(id)
    }

    /// A child entering an attribute matrix must be tuple-shaped and match
    /// the matrix's tuple count.
    fn check_matrix_shape(
        &self,
        parent: &DataObject,
        payload: &ObjectPayload,
        name: &str,
    ) -> Result<(), DataGroveError> {
        if let ObjectPayload::AttributeMatrix(matrix) = parent.payload() {
            let found = payload
                .num_tuples()
                .ok_or(DataGroveError::UnexpectedObjectKind {
                    path: name.to_owned(),
                    expected: "tuple-shaped data (attribute matrix child)",
                })?;
            if found != matrix.num_tuples() {
                return Err(DataGroveError::TupleCountMismatch {
                    expected: matrix.num_tuples(),
                    found,
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Rename `id`.
    ///
    /// Fails when the new name collides with a sibling under any currently
    /// live parent (or in the root table). Renaming to the current name is a
    /// no-op and emits nothing.
    pub fn rename(&mut self, id: ObjectId, new_name: &str) -> Result<(), DataGroveError> {
        validate_name(new_name)?;
        let obj = self.object_ref(id)?;
        let previous = obj.name().to_owned();
        if previous == new_name {
            return Ok(());
        }
        let parents: Vec<ObjectId> = obj.parents().iter().copied().collect();
        if parents.is_empty() {
            if self.roots.contains_name(new_name) {
                return Err(DataGroveError::NameCollision {
                    parent: "/".to_owned(),
                    name: new_name.to_owned(),
                });
            }
        }
        for &pid in &parents {
            let pobj = self.object_ref(pid)?;
            if pobj
                .payload()
                .children()
                .is_some_and(|c| c.contains_name(new_name))
            {
                return Err(DataGroveError::NameCollision {
                    parent: pobj.name().to_owned(),
                    name: new_name.to_owned(),
                });
            }
        }

        if parents.is_empty() {
            self.roots.rename(&previous, new_name);
        }
        for &pid in &parents {
            if let Some(children) = self
                .objects
                .get_mut(&pid)
                .and_then(|p| p.payload_mut().children_mut())
            {
                children.rename(&previous, new_name);
            }
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.set_name(new_name.to_owned());
        }
        log::debug!("renamed id {id}: `{previous}` -> `{new_name}`");
        self.emit(DataEvent::Renamed {
            id,
            previous,
            current: new_name.to_owned(),
        });
        self.debug_assert_invariants();
        Ok(())
    }

    /// Add a further parent edge `parent -> child`; this is what turns the
    /// tree into a DAG. Adding an edge that already exists is a no-op.
    ///
    /// # Errors
    /// Unknown ids, [`DataGroveError::NotAContainer`], sibling name
    /// collisions, attribute-matrix shape mismatches, and
    /// [`DataGroveError::CycleDetected`] when `parent` is reachable from
    /// `child` through child edges.
    pub fn set_additional_parent(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
    ) -> Result<(), DataGroveError> {
        let child_obj = self.object_ref(child)?;
        let child_name = child_obj.name().to_owned();
        let was_root = child_obj.parents().is_empty();
        let pobj = self.object_ref(parent)?;
        let children = pobj
            .payload()
            .children()
            .ok_or(DataGroveError::NotAContainer(parent))?;
        if children.contains_id(child) {
            return Ok(());
        }
        if children.contains_name(&child_name) {
            return Err(DataGroveError::NameCollision {
                parent: pobj.name().to_owned(),
                name: child_name,
            });
        }
        self.check_matrix_shape(pobj, child_obj.payload(), &child_name)?;
        if child == parent || self.reachable_from(child, parent) {
            return Err(DataGroveError::CycleDetected);
        }

        if was_root {
            self.roots.remove(&child_name);
        }
        if let Some(children) = self
            .objects
            .get_mut(&parent)
            .and_then(|p| p.payload_mut().children_mut())
        {
            children.insert_unchecked(&child_name, child);
        }
        if let Some(obj) = self.objects.get_mut(&child) {
            obj.parents_mut().insert(parent);
        }
        log::debug!("attached id {child} under id {parent}");
        self.emit(DataEvent::Reparented {
            child,
            parent,
            attached: true,
        });
        self.debug_assert_invariants();
        Ok(())
    }

    /// Cut the edge `parent -> child`. If that was the child's last parent
    /// the removal cascade runs (the child is no longer reachable).
    pub fn remove_parent(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
    ) -> Result<(), DataGroveError> {
        let child_obj = self.object_ref(child)?;
        if !child_obj.parents().contains(&parent) {
            return Err(DataGroveError::NotAChild { parent, child });
        }
        let child_name = child_obj.name().to_owned();
        self.object_ref(parent)?;

        if let Some(children) = self
            .objects
            .get_mut(&parent)
            .and_then(|p| p.payload_mut().children_mut())
        {
            children.remove(&child_name);
        }
        let orphaned = match self.objects.get_mut(&child) {
            Some(obj) => {
                obj.parents_mut().remove(&parent);
                obj.parents().is_empty()
            }
            None => false,
        };
        log::debug!("detached id {child} from id {parent}");
        self.emit(DataEvent::Reparented {
            child,
            parent,
            attached: false,
        });
        if orphaned && !self.roots.contains_id(child) {
            self.cascade_remove(child);
        }
        self.debug_assert_invariants();
        Ok(())
    }

    /// Cascading removal of `id`.
    ///
    /// The target is detached from every parent and deleted; each descendant
    /// loses its edge to the just-deleted parent and is itself deleted only
    /// once its parent set drains empty (a descendant still reachable
    /// through another live path survives).
    pub fn remove_data(&mut self, id: ObjectId) -> Result<(), DataGroveError> {
        let obj = self.object_ref(id)?;
        let name = obj.name().to_owned();
        let parents: Vec<ObjectId> = obj.parents().iter().copied().collect();
        for pid in parents {
            if let Some(children) = self
                .objects
                .get_mut(&pid)
                .and_then(|p| p.payload_mut().children_mut())
            {
                children.remove(&name);
            }
        }
        if self.roots.contains_id(id) {
            self.roots.remove(&name);
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.parents_mut().clear();
        }
        log::debug!("removing `{name}` (id {id}) and its unreachable closure");
        self.cascade_remove(id);
        self.debug_assert_invariants();
        Ok(())
    }

    /// Worklist deletion over the child closure. `start` must already be
    /// detached from all parents and the root table.
    fn cascade_remove(&mut self, start: ObjectId) {
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let Some(removed) = self.objects.remove(&current) else {
                continue;
            };
            log::trace!("cascade: deleting `{}` (id {current})", removed.name());
            if let Some(children) = removed.payload().children() {
                for child in children.iter() {
                    if let Some(cobj) = self.objects.get_mut(&child) {
                        cobj.parents_mut().remove(&current);
                        if cobj.parents().is_empty() && !self.roots.contains_id(child) {
                            queue.push_back(child);
                        }
                    }
                }
            }
            self.emit(DataEvent::Removed {
                id: current,
                name: removed.name().to_owned(),
            });
        }
    }

    /// Whether `to` is reachable from `from` through child edges.
    fn reachable_from(&self, from: ObjectId, to: ObjectId) -> bool {
        let mut queue = VecDeque::from([from]);
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(children) = self.get(current).and_then(|o| o.payload().children()) {
                queue.extend(children.iter());
            }
        }
        false
    }

    /// Replace an attribute matrix's tuple shape, resizing every child to
    /// the implied tuple count (overlap preserved, growth zero-filled).
    pub fn set_attribute_matrix_shape(
        &mut self,
        id: ObjectId,
        tuple_shape: Vec<usize>,
    ) -> Result<(), DataGroveError> {
        let children: Vec<ObjectId> = match self.object_ref(id)?.payload() {
            ObjectPayload::AttributeMatrix(m) => m.children.iter().collect(),
            payload => {
                return Err(DataGroveError::UnexpectedObjectKind {
                    path: format!("id {id} ({})", payload.kind()),
                    expected: "an attribute matrix",
                });
            }
        };
        let n: usize = tuple_shape.iter().product();
        for child in children {
            match self.objects.get_mut(&child).map(|c| c.payload_mut()) {
                Some(ObjectPayload::Array(any)) => any.resize_tuples(n),
                Some(ObjectPayload::NeighborList(nl)) => nl.resize_lists(n),
                _ => {}
            }
        }
        if let Some(ObjectPayload::AttributeMatrix(m)) =
            self.objects.get_mut(&id).map(|o| o.payload_mut())
        {
            m.tuple_shape = tuple_shape;
        }
        self.debug_assert_invariants();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deep copy
    // ------------------------------------------------------------------

    /// Full deep copy into a parallel id space.
    ///
    /// Pass 1 clones every object under a fresh monotonic counter, recording
    /// an old-id to new-id table; pass 2 runs each object's remap hook over
    /// its parent set, child tables, and geometry references. Observers are
    /// not carried over.
    pub fn deep_copy(&self) -> DataStructure {
        let mut copy = DataStructure::new();
        // fresh ids from past the source's counter, so the two id spaces
        // never overlap and stale ids cannot resolve against the copy
        copy.next_id = self.next_id;
        let mut remap = IdRemap::default();
        for old_id in self.ids() {
            let new_id = copy.allocate_id();
            remap.insert(old_id, new_id);
            // ids() only yields live keys
            if let Some(obj) = self.objects.get(&old_id) {
                let mut cloned = obj.clone();
                cloned.set_id(new_id);
                copy.objects.insert(new_id, cloned);
            }
        }
        for obj in copy.objects.values_mut() {
            obj.remap_ids(&remap);
        }
        copy.roots = self.roots.clone();
        copy.roots.remap_ids(&remap);
        log::debug!("deep-copied structure: {} objects", copy.len());
        copy.debug_assert_invariants();
        copy
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer; it receives every subsequent mutation event
    /// synchronously, in application order.
    pub fn register_observer(&mut self, observer: SharedObserver) {
        self.observers.register(observer);
    }

    /// Remove a previously registered observer (matched by pointer).
    pub fn unregister_observer(&mut self, observer: &SharedObserver) {
        self.observers.unregister(observer);
    }

    fn emit(&self, event: DataEvent) {
        if self.observers.is_empty() {
            return;
        }
        for observer in self.observers.snapshot() {
            observer.lock().on_notify(self, &event);
        }
    }
}

impl DebugInvariants for DataStructure {
    fn debug_assert_invariants(&self) {
        grove_debug_assert_ok!(self.validate_invariants(), "DataStructure invalid");
    }

    /// Full consistency sweep: root table agreement, parent/child edge
    /// mirrors, per-parent name indexes, and acyclicity (Kahn over child
    /// edges).
    fn validate_invariants(&self) -> Result<(), DataGroveError> {
        // root table: ids live, names agree, parent sets empty
        for root in self.roots.iter() {
            let obj = self.object_ref(root)?;
            if !obj.parents().is_empty() {
                return Err(DataGroveError::InvalidName(format!(
                    "root `{}` has parents",
                    obj.name()
                )));
            }
            if self.roots.get(obj.name()) != Some(root) {
                return Err(DataGroveError::InvalidName(format!(
                    "root table name for `{}` disagrees",
                    obj.name()
                )));
            }
        }
        // edge mirrors, both directions
        for (id, obj) in &self.objects {
            for &pid in obj.parents() {
                let parent = self.object_ref(pid)?;
                let holds = parent
                    .payload()
                    .children()
                    .is_some_and(|c| c.get(obj.name()) == Some(*id));
                if !holds {
                    return Err(DataGroveError::NotAChild {
                        parent: pid,
                        child: *id,
                    });
                }
            }
            if obj.parents().is_empty() && !self.roots.contains_id(*id) {
                return Err(DataGroveError::InvalidName(format!(
                    "object `{}` is unreachable (no parents, not a root)",
                    obj.name()
                )));
            }
            if let Some(children) = obj.payload().children() {
                children.validate_invariants()?;
                for child in children.iter() {
                    let cobj = self.object_ref(child)?;
                    if !cobj.parents().contains(id) {
                        return Err(DataGroveError::NotAChild {
                            parent: *id,
                            child,
                        });
                    }
                }
            }
        }
        // acyclicity: Kahn's algorithm over child edges
        let mut in_deg: HashMap<ObjectId, usize> =
            self.objects.keys().map(|&id| (id, 0)).collect();
        for obj in self.objects.values() {
            if let Some(children) = obj.payload().children() {
                for child in children.iter() {
                    if let Some(d) = in_deg.get_mut(&child) {
                        *d += 1;
                    }
                }
            }
        }
        let mut stack: Vec<ObjectId> = in_deg
            .iter()
            .filter_map(|(&id, &d)| (d == 0).then_some(id))
            .collect();
        let mut visited = 0usize;
        while let Some(id) = stack.pop() {
            visited += 1;
            if let Some(children) = self.get(id).and_then(|o| o.payload().children()) {
                for child in children.iter() {
                    if let Some(d) = in_deg.get_mut(&child) {
                        *d -= 1;
                        if *d == 0 {
                            stack.push(child);
                        }
                    }
                }
            }
        }
        if visited != self.objects.len() {
            return Err(DataGroveError::CycleDetected);
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("a", None).unwrap();
        let b = ds.create_group("b", None).unwrap();
        let c = ds.create_group("c", Some(a)).unwrap();
        assert!(a < b && b < c);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn root_name_collision_rejected() {
        let mut ds = DataStructure::new();
        ds.create_group("dup", None).unwrap();
        let err = ds.create_group("dup", None).unwrap_err();
        assert!(matches!(err, DataGroveError::NameCollision { .. }));
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn arrays_are_leaves() {
        let mut ds = DataStructure::new();
        let arr = ds
            .create_array_of("arr", DType::F32, vec![4], vec![1], None)
            .unwrap();
        assert_eq!(
            ds.create_group("child", Some(arr)).unwrap_err(),
            DataGroveError::NotAContainer(arr)
        );
    }

    #[test]
    fn attribute_matrix_enforces_tuple_count() {
        let mut ds = DataStructure::new();
        let am = ds
            .create_attribute_matrix("cells", vec![2, 3], None)
            .unwrap();
        // 6 tuples match
        ds.create_array_of("ok", DType::I32, vec![6], vec![1], Some(am))
            .unwrap();
        let err = ds
            .create_array_of("bad", DType::I32, vec![5], vec![1], Some(am))
            .unwrap_err();
        assert_eq!(
            err,
            DataGroveError::TupleCountMismatch {
                expected: 6,
                found: 5
            }
        );
        // groups are not tuple-shaped, so they may not enter a matrix
        assert!(matches!(
            ds.create_group("g", Some(am)).unwrap_err(),
            DataGroveError::UnexpectedObjectKind { .. }
        ));
    }

    #[test]
    fn path_resolution_walks_name_chain() {
        let mut ds = DataStructure::new();
        let foo = ds.create_group("Foo", None).unwrap();
        let bar = ds.create_group("Bar", Some(foo)).unwrap();
        let path: DataPath = "Foo/Bar".parse().unwrap();
        assert_eq!(ds.id_of(&path).unwrap(), bar);
        assert!(ds.resolve(&"Foo/Missing".parse().unwrap()).is_none());
        assert!(matches!(
            ds.id_of(&DataPath::root()),
            Err(DataGroveError::EmptyPath)
        ));
    }

    #[test]
    fn rename_updates_all_name_indexes() {
        let mut ds = DataStructure::new();
        let foo = ds.create_group("Foo", None).unwrap();
        let bar = ds.create_group("Bar", Some(foo)).unwrap();
        ds.rename(bar, "Baz").unwrap();
        assert_eq!(ds.id_of(&"Foo/Baz".parse().unwrap()).unwrap(), bar);
        assert!(ds.id_of(&"Foo/Bar".parse().unwrap()).is_err());
        // collision under the same parent
        let _qux = ds.create_group("Qux", Some(foo)).unwrap();
        assert!(matches!(
            ds.rename(bar, "Qux").unwrap_err(),
            DataGroveError::NameCollision { .. }
        ));
        // renaming to the current name is a quiet no-op
        ds.rename(bar, "Baz").unwrap();
    }

    #[test]
    fn cycle_rejected_on_reparent() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("a", None).unwrap();
        let b = ds.create_group("b", Some(a)).unwrap();
        let c = ds.create_group("c", Some(b)).unwrap();
        assert_eq!(
            ds.set_additional_parent(a, c).unwrap_err(),
            DataGroveError::CycleDetected
        );
        assert_eq!(
            ds.set_additional_parent(a, a).unwrap_err(),
            DataGroveError::CycleDetected
        );
        ds.validate_invariants().unwrap();
    }

    #[test]
    fn multi_parent_removal_spares_shared_descendants() {
        // A -> B -> C, A -> D, D -> C: removing B keeps C alive via D
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        let b = ds.create_group("B", Some(a)).unwrap();
        let c = ds.create_group("C", Some(b)).unwrap();
        let d = ds.create_group("D", Some(a)).unwrap();
        ds.set_additional_parent(c, d).unwrap();

        ds.remove_data(b).unwrap();
        assert!(!ds.contains(b));
        assert!(ds.contains(c));
        assert_eq!(ds.get(c).unwrap().parents().len(), 1);

        ds.remove_data(a).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn remove_parent_cascades_on_last_edge() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        let b = ds.create_group("B", Some(a)).unwrap();
        let c = ds.create_group("C", Some(b)).unwrap();
        assert_eq!(
            ds.remove_parent(c, a).unwrap_err(),
            DataGroveError::NotAChild { parent: a, child: c }
        );
        ds.remove_parent(b, a).unwrap();
        assert!(!ds.contains(b));
        assert!(!ds.contains(c));
        assert!(ds.contains(a));
    }

    #[test]
    fn reparenting_a_root_removes_it_from_the_root_table() {
        let mut ds = DataStructure::new();
        let a = ds.create_group("A", None).unwrap();
        let b = ds.create_group("B", None).unwrap();
        ds.set_additional_parent(b, a).unwrap();
        assert_eq!(ds.roots().collect::<Vec<_>>(), vec![a]);
        assert_eq!(ds.id_of(&"A/B".parse().unwrap()).unwrap(), b);
        ds.validate_invariants().unwrap();
    }

    #[test]
    fn typed_lookup_and_mismatch() {
        let mut ds = DataStructure::new();
        let g = ds.create_group("g", None).unwrap();
        ds.create_array("x", DataStore::<f32>::new(vec![3], vec![1]), Some(g))
            .unwrap();
        let path: DataPath = "g/x".parse().unwrap();
        assert!(ds.data_as::<f32>(&path).is_some());
        assert!(ds.data_as::<i32>(&path).is_none());
        assert_eq!(
            ds.data_ref_as::<i32>(&path).unwrap_err(),
            DataGroveError::UnexpectedElementType {
                expected: DType::I32,
                found: DType::F32
            }
        );
        let gpath: DataPath = "g".parse().unwrap();
        assert!(matches!(
            ds.data_ref_as::<f32>(&gpath).unwrap_err(),
            DataGroveError::UnexpectedObjectKind { .. }
        ));
    }

    #[test]
    fn validate_number_of_tuples_reports_disagreement() {
        let mut ds = DataStructure::new();
        ds.create_array_of("a", DType::F32, vec![4], vec![1], None)
            .unwrap();
        ds.create_array_of("b", DType::I16, vec![4], vec![3], None)
            .unwrap();
        ds.create_array_of("c", DType::U8, vec![5], vec![1], None)
            .unwrap();
        let a: DataPath = "a".parse().unwrap();
        let b: DataPath = "b".parse().unwrap();
        let c: DataPath = "c".parse().unwrap();
        ds.validate_number_of_tuples(&[a.clone(), b.clone()]).unwrap();
        assert!(matches!(
            ds.validate_number_of_tuples(&[a, b, c]).unwrap_err(),
            DataGroveError::InconsistentTupleCounts(_)
        ));
    }

    #[test]
    fn scalars_are_plain_leaves() {
        let mut ds = DataStructure::new();
        let g = ds.create_group("g", None).unwrap();
        let s = ds
            .create_scalar("origin", ScalarValue::F64(0.25), Some(g))
            .unwrap();
        match ds.get(s).unwrap().payload() {
            ObjectPayload::Scalar(ScalarValue::F64(v)) => assert_eq!(*v, 0.25),
            other => panic!("unexpected payload {}", other.kind()),
        }
        assert!(!ds.get(s).unwrap().is_container());
    }

    #[test]
    fn set_matrix_shape_resizes_children() {
        let mut ds = DataStructure::new();
        let am = ds.create_attribute_matrix("m", vec![3], None).unwrap();
        ds.create_array_of("a", DType::F64, vec![3], vec![2], Some(am))
            .unwrap();
        ds.set_attribute_matrix_shape(am, vec![5]).unwrap();
        let store = ds.data_ref_as::<f64>(&"m/a".parse().unwrap()).unwrap();
        assert_eq!(store.tuple_count(), 5);
    }
}
