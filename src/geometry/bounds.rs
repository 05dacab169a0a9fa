//! Axis-aligned bounds and planarity queries over the shared vertex list.

use itertools::Itertools;

use crate::error::DataGroveError;
use crate::geometry::ops::vertex_store;
use crate::graph::id::ObjectId;
use crate::graph::structure::DataStructure;

/// Axis-aligned bounding box over `f32` coordinates.
///
/// The default value is the intentionally-degenerate sentinel (`min > max`
/// on every axis); [`is_valid`](Self::is_valid) distinguishes it from a real
/// box.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    /// The degenerate sentinel box.
    pub const fn invalid() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
        }
    }

    /// Whether the box describes a real (possibly zero-extent) region.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|axis| self.min[axis] <= self.max[axis])
    }

    /// Grow the box to include `point`.
    pub fn grow(&mut self, point: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Extent along each axis; negative for the sentinel.
    pub fn extents(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Bounding box of a geometry's vertices: one linear scan tracking running
/// min/max per axis.
///
/// Degrades to the invalid sentinel when the vertex list is unassigned,
/// empty, or not `f32`; the only hard error is an unknown geometry id.
pub fn bounding_box(
    structure: &DataStructure,
    geom: ObjectId,
) -> Result<BoundingBox, DataGroveError> {
    structure.geometry_ref(geom)?;
    let store = match vertex_store(structure, geom) {
        Ok(store) => store,
        Err(DataGroveError::MissingGeometryList(..))
        | Err(DataGroveError::UnexpectedElementType { .. }) => {
            return Ok(BoundingBox::invalid());
        }
        Err(e) => return Err(e),
    };
    let mut bounds = BoundingBox::invalid();
    for tuple in store.tuples() {
        bounds.grow([tuple[0], tuple[1], tuple[2]]);
    }
    Ok(bounds)
}

/// Whether every vertex shares one coordinate along `axis` (0 = x, 1 = y,
/// 2 = z). An empty vertex set is not planar.
///
/// # Errors
/// [`DataGroveError::InvalidGeometry`] for a bad axis,
/// [`DataGroveError::MissingGeometryList`] before vertices are assigned, and
/// [`DataGroveError::UnexpectedElementType`] when the vertex store is not
/// `f32`.
pub fn is_plane(
    structure: &DataStructure,
    geom: ObjectId,
    axis: usize,
) -> Result<bool, DataGroveError> {
    if axis > 2 {
        return Err(DataGroveError::InvalidGeometry(format!(
            "axis index {axis} out of range (expected 0..3)"
        )));
    }
    let store = vertex_store(structure, geom)?;
    if store.tuple_count() == 0 {
        return Ok(false);
    }
    // compare bit patterns so the all-equal scan has a total equality
    Ok(store.tuples().map(|t| t[axis].to_bits()).all_equal())
}

/// Planar in x (all vertices share one x coordinate): the y-z plane test.
pub fn is_yz_plane(structure: &DataStructure, geom: ObjectId) -> Result<bool, DataGroveError> {
    is_plane(structure, geom, 0)
}

/// Planar in y: the x-z plane test.
pub fn is_xz_plane(structure: &DataStructure, geom: ObjectId) -> Result<bool, DataGroveError> {
    is_plane(structure, geom, 1)
}

/// Planar in z: the x-y plane test.
pub fn is_xy_plane(structure: &DataStructure, geom: ObjectId) -> Result<bool, DataGroveError> {
    is_plane(structure, geom, 2)
}

/// Spatial dimensionality implied by the vertex cloud: the number of axes
/// along which the geometry is not planar.
pub fn effective_dimension(
    structure: &DataStructure,
    geom: ObjectId,
) -> Result<usize, DataGroveError> {
    let mut dims = 3;
    for axis in 0..3 {
        if is_plane(structure, geom, axis)? {
            dims -= 1;
        }
    }
    Ok(dims)
}
