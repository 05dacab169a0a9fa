//! Staged construction and element addressing for geometries.
//!
//! Shared lists are ordinary arrays owned by the structure; these functions
//! validate a list before wiring its id into the geometry payload, and
//! provide the fixed-stride element/point addressing
//! (`offset = element * vertices_per_element`).
//!
//! Out-of-range element reads return `None` and out-of-range writes are
//! silently skipped rather than erroring; filter code relies on that
//! tolerance when growing lists incrementally. Note that resizing a shared
//! list does not resize the matching per-element attribute matrix; keeping
//! the two in sync is the caller's burden.

use crate::data::DataStore;
use crate::error::DataGroveError;
use crate::geometry::ElementClass;
use crate::graph::id::ObjectId;
use crate::graph::object::ObjectPayload;
use crate::graph::structure::DataStructure;

/// Conventional name of the shared vertex list under a geometry.
pub const SHARED_VERTEX_LIST: &str = "SharedVertexList";

/// Components per vertex coordinate tuple.
pub const VERTEX_COMPONENTS: usize = 3;

/// Wire `array` in as the geometry's shared vertex list.
///
/// # Errors
/// The array must exist, be `f32`, and carry 3 components per tuple;
/// otherwise [`DataGroveError::InvalidGeometry`] or
/// [`DataGroveError::UnexpectedElementType`].
pub fn attach_vertices(
    structure: &mut DataStructure,
    geom: ObjectId,
    array: ObjectId,
) -> Result<(), DataGroveError> {
    let obj = structure
        .get(array)
        .ok_or(DataGroveError::UnknownObject(array))?;
    let store = match obj.payload() {
        ObjectPayload::Array(any) => any,
        payload => {
            return Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {array} ({})", payload.kind()),
                expected: "an array",
            });
        }
    };
    store.typed_ref::<f32>()?;
    if store.component_count() != VERTEX_COMPONENTS {
        return Err(DataGroveError::InvalidGeometry(format!(
            "vertex list must carry {VERTEX_COMPONENTS} components, found {}",
            store.component_count()
        )));
    }
    structure.geometry_mut(geom)?.vertices = Some(array);
    Ok(())
}

/// Wire `matrix` in as the per-vertex attribute matrix.
pub fn attach_vertex_attributes(
    structure: &mut DataStructure,
    geom: ObjectId,
    matrix: ObjectId,
) -> Result<(), DataGroveError> {
    let expected = num_vertices(structure, geom)?;
    let found = match structure
        .get(matrix)
        .ok_or(DataGroveError::UnknownObject(matrix))?
        .payload()
    {
        ObjectPayload::AttributeMatrix(m) => m.num_tuples(),
        payload => {
            return Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {matrix} ({})", payload.kind()),
                expected: "an attribute matrix",
            });
        }
    };
    if found != expected {
        return Err(DataGroveError::TupleCountMismatch { expected, found });
    }
    structure.geometry_mut(geom)?.vertex_attributes = Some(matrix);
    Ok(())
}

/// Wire `array` in as the shared index list for one element level.
///
/// The array must be `u64` with exactly `kind.num_vertices()` components per
/// tuple, and the geometry's dimensionality must have that level at all.
pub fn attach_elements(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
    array: ObjectId,
) -> Result<(), DataGroveError> {
    let kind = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.kind())
        .ok_or_else(|| {
            DataGroveError::InvalidGeometry(format!(
                "geometry has no {} level",
                class.label()
            ))
        })?;
    let obj = structure
        .get(array)
        .ok_or(DataGroveError::UnknownObject(array))?;
    let store = match obj.payload() {
        ObjectPayload::Array(any) => any,
        payload => {
            return Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {array} ({})", payload.kind()),
                expected: "an array",
            });
        }
    };
    store.typed_ref::<u64>()?;
    if store.component_count() != kind.num_vertices() {
        return Err(DataGroveError::InvalidGeometry(format!(
            "{} list must carry {} components per element, found {}",
            class.label(),
            kind.num_vertices(),
            store.component_count()
        )));
    }
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.list = Some(array);
    }
    Ok(())
}

/// Wire `matrix` in as the per-element attribute matrix of one level.
pub fn attach_element_attributes(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
    matrix: ObjectId,
) -> Result<(), DataGroveError> {
    let expected = num_elements(structure, geom, class)?;
    let found = match structure
        .get(matrix)
        .ok_or(DataGroveError::UnknownObject(matrix))?
        .payload()
    {
        ObjectPayload::AttributeMatrix(m) => m.num_tuples(),
        payload => {
            return Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {matrix} ({})", payload.kind()),
                expected: "an attribute matrix",
            });
        }
    };
    if found != expected {
        return Err(DataGroveError::TupleCountMismatch { expected, found });
    }
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.attributes = Some(matrix);
    }
    Ok(())
}

/// The shared vertex list as a typed store.
pub(crate) fn vertex_store<'a>(
    structure: &'a DataStructure,
    geom: ObjectId,
) -> Result<&'a DataStore<f32>, DataGroveError> {
    let id = structure
        .geometry_ref(geom)?
        .vertices()
        .ok_or(DataGroveError::MissingGeometryList(geom, "vertex"))?;
    match structure
        .get(id)
        .ok_or(DataGroveError::UnknownObject(id))?
        .payload()
    {
        ObjectPayload::Array(any) => any.typed_ref::<f32>(),
        payload => Err(DataGroveError::UnexpectedObjectKind {
            path: format!("id {id} ({})", payload.kind()),
            expected: "an array",
        }),
    }
}

/// The shared index list of one element level as a typed store.
pub(crate) fn element_store<'a>(
    structure: &'a DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<&'a DataStore<u64>, DataGroveError> {
    let id = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.list())
        .ok_or(DataGroveError::MissingGeometryList(geom, class.label()))?;
    match structure
        .get(id)
        .ok_or(DataGroveError::UnknownObject(id))?
        .payload()
    {
        ObjectPayload::Array(any) => any.typed_ref::<u64>(),
        payload => Err(DataGroveError::UnexpectedObjectKind {
            path: format!("id {id} ({})", payload.kind()),
            expected: "an array",
        }),
    }
}

/// Number of vertices; valid once the vertex list is assigned.
pub fn num_vertices(
    structure: &DataStructure,
    geom: ObjectId,
) -> Result<usize, DataGroveError> {
    Ok(vertex_store(structure, geom)?.tuple_count())
}

/// Number of elements at `class`; valid once that list is assigned.
pub fn num_elements(
    structure: &DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<usize, DataGroveError> {
    Ok(element_store(structure, geom, class)?.tuple_count())
}

/// Vertex ids of one element; `Ok(None)` when `element` is out of range.
pub fn element_point_ids(
    structure: &DataStructure,
    geom: ObjectId,
    class: ElementClass,
    element: usize,
) -> Result<Option<Vec<u64>>, DataGroveError> {
    let store = element_store(structure, geom, class)?;
    Ok(store.tuple(element).ok().map(<[u64]>::to_vec))
}

/// Overwrite the vertex ids of one element.
///
/// A write whose computed offset range exceeds the list's current size is
/// silently skipped. `ids` must still match the element stride.
pub fn set_element_point_ids(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
    element: usize,
    ids: &[u64],
) -> Result<(), DataGroveError> {
    let list_id = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.list())
        .ok_or(DataGroveError::MissingGeometryList(geom, class.label()))?;
    let obj = structure
        .get_mut(list_id)
        .ok_or(DataGroveError::UnknownObject(list_id))?;
    let store = match obj.payload_mut() {
        ObjectPayload::Array(any) => {
            let found = any.dtype();
            any.typed_mut::<u64>()
                .ok_or(DataGroveError::UnexpectedElementType {
                    expected: crate::data::DType::U64,
                    found,
                })?
        }
        payload => {
            return Err(DataGroveError::UnexpectedObjectKind {
                path: format!("id {list_id} ({})", payload.kind()),
                expected: "an array",
            });
        }
    };
    if ids.len() != store.component_count() {
        return Err(DataGroveError::ComponentCountMismatch {
            expected: store.component_count(),
            found: ids.len(),
        });
    }
    match store.set_tuple(element, ids) {
        Ok(()) => Ok(()),
        // out-of-range writes are tolerated by contract
        Err(DataGroveError::TupleOutOfBounds { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
