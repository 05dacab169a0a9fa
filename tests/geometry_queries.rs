use data_grove::geometry::bounds::{bounding_box, is_xy_plane, is_plane};
use data_grove::geometry::derived::{
    delete_neighbors, find_centroids, find_containing_verts, find_neighbors,
};
use data_grove::geometry::ops::{
    attach_elements, attach_vertices, element_point_ids, num_elements, num_vertices,
    set_element_point_ids, SHARED_VERTEX_LIST,
};
use data_grove::prelude::*;

/// Unit cube corners with a single hexahedral cell.
fn unit_cube(ds: &mut DataStructure) -> ObjectId {
    let geom = ds
        .create_geometry("Cube", Geometry::volume(CellKind::Hexahedron), None)
        .unwrap();
    let mut coords = Vec::with_capacity(8 * 3);
    for z in [0.0f32, 1.0] {
        for y in [0.0f32, 1.0] {
            for x in [0.0f32, 1.0] {
                coords.extend([x, y, z]);
            }
        }
    }
    let verts = ds
        .create_array(
            SHARED_VERTEX_LIST,
            DataStore::<f32>::from_vec(vec![8], vec![3], coords).unwrap(),
            Some(geom),
        )
        .unwrap();
    let cells = ds
        .create_array(
            "SharedCellList",
            DataStore::<u64>::from_vec(vec![1], vec![8], (0..8).collect()).unwrap(),
            Some(geom),
        )
        .unwrap();
    attach_vertices(ds, geom, verts).unwrap();
    attach_elements(ds, geom, ElementClass::Cell, cells).unwrap();
    geom
}

#[test]
fn staged_lifecycle_counts_and_bounds() {
    let mut ds = DataStructure::new();
    let geom = unit_cube(&mut ds);
    assert_eq!(num_vertices(&ds, geom).unwrap(), 8);
    assert_eq!(num_elements(&ds, geom, ElementClass::Cell).unwrap(), 1);

    let bb = bounding_box(&ds, geom).unwrap();
    assert!(bb.is_valid());
    assert_eq!(bb.min, [0.0; 3]);
    assert_eq!(bb.max, [1.0; 3]);
    assert!(!is_xy_plane(&ds, geom).unwrap());
    for axis in 0..3 {
        assert!(!is_plane(&ds, geom, axis).unwrap());
    }
}

#[test]
fn cell_centroid_of_unit_cube_is_center() {
    let mut ds = DataStructure::new();
    let geom = unit_cube(&mut ds);
    find_centroids(&mut ds, geom, ElementClass::Cell).unwrap();
    let store = ds
        .data_ref_as::<f32>(&"Cube/Cell Centroids".parse().unwrap())
        .unwrap();
    assert_eq!(store.tuple(0).unwrap(), &[0.5, 0.5, 0.5]);
}

#[test]
fn caches_are_not_recomputed_implicitly() {
    let mut ds = DataStructure::new();
    let geom = unit_cube(&mut ds);
    find_centroids(&mut ds, geom, ElementClass::Cell).unwrap();

    // move a vertex; the cached centroid goes stale by design
    ds.data_ref_as_mut::<f32>(&"Cube/SharedVertexList".parse().unwrap())
        .unwrap()
        .set_component(0, 0, -9.0);
    let store = ds
        .data_ref_as::<f32>(&"Cube/Cell Centroids".parse().unwrap())
        .unwrap();
    assert_eq!(store.tuple(0).unwrap(), &[0.5, 0.5, 0.5]);

    // explicit recompute picks the move up
    find_centroids(&mut ds, geom, ElementClass::Cell).unwrap();
    let store = ds
        .data_ref_as::<f32>(&"Cube/Cell Centroids".parse().unwrap())
        .unwrap();
    assert_eq!(store.tuple(0).unwrap(), &[-0.625, 0.5, 0.5]);
}

#[test]
fn containment_and_neighbors_on_an_edge_chain() {
    // three segments in a chain: 0-1, 1-2, 2-3
    let mut ds = DataStructure::new();
    let geom = ds
        .create_geometry("Chain", Geometry::edge(), None)
        .unwrap();
    let verts = ds
        .create_array(
            SHARED_VERTEX_LIST,
            DataStore::<f32>::from_vec(
                vec![4],
                vec![3],
                vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0],
            )
            .unwrap(),
            Some(geom),
        )
        .unwrap();
    let edges = ds
        .create_array(
            "SharedEdgeList",
            DataStore::<u64>::from_vec(vec![3], vec![2], vec![0, 1, 1, 2, 2, 3]).unwrap(),
            Some(geom),
        )
        .unwrap();
    attach_vertices(&mut ds, geom, verts).unwrap();
    attach_elements(&mut ds, geom, ElementClass::Edge, edges).unwrap();

    find_containing_verts(&mut ds, geom, ElementClass::Edge).unwrap();
    let containing = ds
        .neighbor_list(&"Chain/Edges Containing Vert".parse().unwrap())
        .unwrap();
    assert_eq!(containing.list(1), Some(&[0, 1][..]));
    assert_eq!(containing.list(3), Some(&[2][..]));

    let nb_id = find_neighbors(&mut ds, geom, ElementClass::Edge).unwrap();
    let neighbors = ds
        .neighbor_list(&"Chain/Edge Neighbors".parse().unwrap())
        .unwrap();
    assert_eq!(neighbors.list(0), Some(&[1][..]));
    assert_eq!(neighbors.list(1), Some(&[0, 2][..]));
    assert_eq!(neighbors.list(2), Some(&[1][..]));

    delete_neighbors(&mut ds, geom, ElementClass::Edge).unwrap();
    assert!(!ds.contains(nb_id));

    // the chain is a line on the x axis: planar in y and z, not x
    assert!(!is_plane(&ds, geom, 0).unwrap());
    assert!(is_plane(&ds, geom, 1).unwrap());
    assert!(is_plane(&ds, geom, 2).unwrap());

    // edge/point addressing follows the 2-vertex stride
    assert_eq!(
        element_point_ids(&ds, geom, ElementClass::Edge, 2).unwrap(),
        Some(vec![2, 3])
    );
    set_element_point_ids(&mut ds, geom, ElementClass::Edge, 2, &[3, 2]).unwrap();
    assert_eq!(
        element_point_ids(&ds, geom, ElementClass::Edge, 2).unwrap(),
        Some(vec![3, 2])
    );
}

#[test]
fn shared_list_resize_does_not_touch_attribute_matrices() {
    let mut ds = DataStructure::new();
    let geom = unit_cube(&mut ds);
    let am = ds
        .create_attribute_matrix("VertexData", vec![8], Some(geom))
        .unwrap();
    data_grove::geometry::ops::attach_vertex_attributes(&mut ds, geom, am).unwrap();

    // growing the vertex list leaves the matrix at its old shape; keeping
    // the two in sync is the caller's burden
    ds.data_ref_as_mut::<f32>(&"Cube/SharedVertexList".parse().unwrap())
        .unwrap()
        .resize_tuples(10);
    assert_eq!(num_vertices(&ds, geom).unwrap(), 10);
    let am_obj = ds.resolve(&"Cube/VertexData".parse().unwrap()).unwrap();
    match am_obj.payload() {
        ObjectPayload::AttributeMatrix(m) => assert_eq!(m.num_tuples(), 8),
        _ => unreachable!(),
    }
}

#[test]
fn removing_a_geometry_removes_its_lists_and_caches() {
    let mut ds = DataStructure::new();
    let geom = unit_cube(&mut ds);
    let centroids = find_centroids(&mut ds, geom, ElementClass::Cell).unwrap();
    let verts = ds
        .id_of(&"Cube/SharedVertexList".parse().unwrap())
        .unwrap();
    ds.remove_data(geom).unwrap();
    assert!(!ds.contains(geom));
    assert!(!ds.contains(centroids));
    assert!(!ds.contains(verts));
    assert!(ds.is_empty());
}
