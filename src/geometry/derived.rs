//! Derived geometry caches: centroids, vertex containment, element neighbors.
//!
//! Each `find_*` function computes its cache from the shared lists, registers
//! the result as a child of the geometry, records the id on the element
//! level, and replaces any previous cache of the same kind. Caches are never
//! recomputed behind the caller's back after a topology change; the contract
//! is delete-then-recompute via the matching `delete_*` function.

use crate::data::{DataStore, NeighborList};
use crate::error::DataGroveError;
use crate::geometry::ops::{element_store, vertex_store};
use crate::geometry::ElementClass;
use crate::graph::id::ObjectId;
use crate::graph::structure::DataStructure;

const fn centroids_name(class: ElementClass) -> &'static str {
    match class {
        ElementClass::Edge => "Edge Centroids",
        ElementClass::Face => "Face Centroids",
        ElementClass::Cell => "Cell Centroids",
    }
}

const fn containing_name(class: ElementClass) -> &'static str {
    match class {
        ElementClass::Edge => "Edges Containing Vert",
        ElementClass::Face => "Faces Containing Vert",
        ElementClass::Cell => "Cells Containing Vert",
    }
}

const fn neighbors_name(class: ElementClass) -> &'static str {
    match class {
        ElementClass::Edge => "Edge Neighbors",
        ElementClass::Face => "Face Neighbors",
        ElementClass::Cell => "Cell Neighbors",
    }
}

fn drop_cache(
    structure: &mut DataStructure,
    cache: Option<ObjectId>,
) -> Result<(), DataGroveError> {
    if let Some(id) = cache {
        if structure.contains(id) {
            structure.remove_data(id)?;
        }
    }
    Ok(())
}

/// Compute per-element centroids (mean of the element's vertex coordinates)
/// and register them as an `f32` array child of the geometry.
///
/// Replaces a previously computed centroid cache for the same level.
pub fn find_centroids(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<ObjectId, DataGroveError> {
    let centroids = {
        let verts = vertex_store(structure, geom)?;
        let elements = element_store(structure, geom, class)?;
        let num_vertices = verts.tuple_count();
        let mut data = Vec::with_capacity(elements.tuple_count() * 3);
        for element in elements.tuples() {
            let mut sum = [0.0f32; 3];
            for &v in element {
                let v = v as usize;
                if v >= num_vertices {
                    return Err(DataGroveError::InvalidGeometry(format!(
                        "{} list references vertex {v} of {num_vertices}",
                        class.label()
                    )));
                }
                for axis in 0..3 {
                    sum[axis] += verts.component(v, axis);
                }
            }
            let count = element.len().max(1) as f32;
            data.extend(sum.into_iter().map(|s| s / count));
        }
        DataStore::<f32>::from_vec(vec![data.len() / 3], vec![3], data)?
    };

    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.centroids());
    drop_cache(structure, previous)?;
    let id = structure.create_array(centroids_name(class), centroids, Some(geom))?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.centroids = Some(id);
    }
    log::debug!("computed {} for geometry {geom}", centroids_name(class));
    Ok(id)
}

/// Delete the centroid cache for `class`, if present.
pub fn delete_centroids(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<(), DataGroveError> {
    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.centroids());
    drop_cache(structure, previous)?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.centroids = None;
    }
    Ok(())
}

fn build_containing_lists(
    structure: &DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<Vec<Vec<u64>>, DataGroveError> {
    let verts = vertex_store(structure, geom)?;
    let elements = element_store(structure, geom, class)?;
    let num_vertices = verts.tuple_count();
    let mut lists: Vec<Vec<u64>> = vec![Vec::new(); num_vertices];
    for (element_id, element) in elements.tuples().enumerate() {
        for &v in element {
            let v = v as usize;
            if v >= num_vertices {
                return Err(DataGroveError::InvalidGeometry(format!(
                    "{} list references vertex {v} of {num_vertices}",
                    class.label()
                )));
            }
            lists[v].push(element_id as u64);
        }
    }
    Ok(lists)
}

/// Compute, per vertex, the list of elements containing it, and register it
/// as a neighbor-list child of the geometry.
pub fn find_containing_verts(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<ObjectId, DataGroveError> {
    let lists = build_containing_lists(structure, geom, class)?;
    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.containing_verts());
    drop_cache(structure, previous)?;
    let id = structure.create_neighbor_list(
        containing_name(class),
        NeighborList::from_lists(lists),
        Some(geom),
    )?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.containing_verts = Some(id);
    }
    log::debug!("computed {} for geometry {geom}", containing_name(class));
    Ok(id)
}

/// Delete the vertex-containment cache for `class`, if present.
pub fn delete_containing_verts(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<(), DataGroveError> {
    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.containing_verts());
    drop_cache(structure, previous)?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.containing_verts = None;
    }
    Ok(())
}

/// Compute, per element, the sorted list of distinct elements sharing at
/// least one vertex with it, and register it as a neighbor-list child.
///
/// Builds the vertex-containment relation transiently; the persistent
/// containment cache is neither required nor updated.
pub fn find_neighbors(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<ObjectId, DataGroveError> {
    let neighbor_lists = {
        let containing = build_containing_lists(structure, geom, class)?;
        let elements = element_store(structure, geom, class)?;
        let mut lists: Vec<Vec<u64>> = Vec::with_capacity(elements.tuple_count());
        for (element_id, element) in elements.tuples().enumerate() {
            let mut neighbors: Vec<u64> = element
                .iter()
                .flat_map(|&v| containing[v as usize].iter().copied())
                .filter(|&other| other != element_id as u64)
                .collect();
            neighbors.sort_unstable();
            neighbors.dedup();
            lists.push(neighbors);
        }
        lists
    };

    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.neighbors());
    drop_cache(structure, previous)?;
    let id = structure.create_neighbor_list(
        neighbors_name(class),
        NeighborList::from_lists(neighbor_lists),
        Some(geom),
    )?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.neighbors = Some(id);
    }
    log::debug!("computed {} for geometry {geom}", neighbors_name(class));
    Ok(id)
}

/// Delete the element-neighbor cache for `class`, if present.
pub fn delete_neighbors(
    structure: &mut DataStructure,
    geom: ObjectId,
    class: ElementClass,
) -> Result<(), DataGroveError> {
    let previous = structure
        .geometry_ref(geom)?
        .element_level(class)
        .and_then(|level| level.neighbors());
    drop_cache(structure, previous)?;
    if let Some(level) = structure.geometry_mut(geom)?.element_level_mut(class) {
        level.neighbors = None;
    }
    Ok(())
}
