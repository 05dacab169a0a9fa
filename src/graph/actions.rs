//! Two-phase structural mutation: preflight, then commit.
//!
//! Filters never mutate a structure directly during validation; they collect
//! [`Action`] values describing intended changes. An [`OutputActions`] list
//! is dry-run against a deep copy first — later actions see the effects of
//! earlier ones — and only a fully successful preflight is committed to the
//! real structure. A failed preflight blocks the commit and leaves the
//! structure untouched.

use crate::data::DType;
use crate::error::DataGroveError;
use crate::geometry::ops::{attach_vertices, SHARED_VERTEX_LIST, VERTEX_COMPONENTS};
use crate::geometry::Geometry;
use crate::graph::id::ObjectId;
use crate::graph::path::DataPath;
use crate::graph::structure::DataStructure;

/// One intended structural mutation, addressed by path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Create a group at `path`.
    CreateGroup { path: DataPath },
    /// Create an attribute matrix at `path` with the given tuple shape.
    CreateAttributeMatrix {
        path: DataPath,
        tuple_shape: Vec<usize>,
    },
    /// Create a zero-filled array at `path`.
    CreateArray {
        path: DataPath,
        dtype: DType,
        tuple_shape: Vec<usize>,
        component_shape: Vec<usize>,
    },
    /// Create a vertex geometry at `path` with a zeroed shared vertex list
    /// of `vertex_count` vertices.
    CreateVertexGeometry {
        path: DataPath,
        vertex_count: usize,
    },
    /// Remove the object at `path` and its unreachable closure.
    DeleteData { path: DataPath },
}

/// Target's parent id, or `None` for a root-level target.
fn parent_of(
    structure: &DataStructure,
    path: &DataPath,
) -> Result<Option<ObjectId>, DataGroveError> {
    let parent = path.parent().ok_or(DataGroveError::EmptyPath)?;
    if parent.is_empty() {
        Ok(None)
    } else {
        Ok(Some(structure.id_of(&parent)?))
    }
}

impl Action {
    /// Apply this action to `structure`.
    pub fn apply(&self, structure: &mut DataStructure) -> Result<(), DataGroveError> {
        match self {
            Action::CreateGroup { path } => {
                let parent = parent_of(structure, path)?;
                let name = path.name().ok_or(DataGroveError::EmptyPath)?;
                structure.create_group(name, parent)?;
                Ok(())
            }
            Action::CreateAttributeMatrix { path, tuple_shape } => {
                let parent = parent_of(structure, path)?;
                let name = path.name().ok_or(DataGroveError::EmptyPath)?;
                structure.create_attribute_matrix(name, tuple_shape.clone(), parent)?;
                Ok(())
            }
            Action::CreateArray {
                path,
                dtype,
                tuple_shape,
                component_shape,
            } => {
                let parent = parent_of(structure, path)?;
                let name = path.name().ok_or(DataGroveError::EmptyPath)?;
                structure.create_array_of(
                    name,
                    *dtype,
                    tuple_shape.clone(),
                    component_shape.clone(),
                    parent,
                )?;
                Ok(())
            }
            Action::CreateVertexGeometry { path, vertex_count } => {
                let parent = parent_of(structure, path)?;
                let name = path.name().ok_or(DataGroveError::EmptyPath)?;
                let geom = structure.create_geometry(name, Geometry::vertex(), parent)?;
                let verts = structure.create_array_of(
                    SHARED_VERTEX_LIST,
                    DType::F32,
                    vec![*vertex_count],
                    vec![VERTEX_COMPONENTS],
                    Some(geom),
                )?;
                attach_vertices(structure, geom, verts)
            }
            Action::DeleteData { path } => {
                let id = structure.id_of(path)?;
                structure.remove_data(id)
            }
        }
    }
}

/// An ordered list of actions applied as one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputActions {
    actions: Vec<Action>,
}

impl OutputActions {
    /// An empty action list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Number of collected actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The collected actions, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Dry-run the whole list against a deep copy of `structure`.
    ///
    /// Returns the simulated structure on success so callers can inspect the
    /// would-be result.
    ///
    /// # Errors
    /// [`DataGroveError::ActionPreflight`] wrapping the failing action's
    /// index and underlying error; `structure` itself is never touched.
    pub fn preflight(
        &self,
        structure: &DataStructure,
    ) -> Result<DataStructure, DataGroveError> {
        let mut simulated = structure.deep_copy();
        for (index, action) in self.actions.iter().enumerate() {
            action.apply(&mut simulated).map_err(|e| {
                DataGroveError::ActionPreflight(format!("action {index}: {e}"))
            })?;
        }
        Ok(simulated)
    }

    /// Preflight, then commit to the real structure.
    ///
    /// Nothing is applied unless the entire list preflights cleanly.
    pub fn apply(&self, structure: &mut DataStructure) -> Result<(), DataGroveError> {
        self.preflight(structure)?;
        for action in &self.actions {
            action.apply(structure)?;
        }
        Ok(())
    }
}

impl FromIterator<Action> for OutputActions {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}
