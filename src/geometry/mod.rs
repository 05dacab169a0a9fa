//! Node-geometry payloads: staged mesh topology over shared lists.
//!
//! A geometry references its coordinate and connectivity data by id: the
//! shared vertex list is an ordinary `f32` array (3 components per vertex)
//! owned by the structure, and each element level (edges, faces, cells)
//! references a `u64` index list plus optional per-element attribute
//! matrices and derived caches. Construction is staged: a geometry starts
//! unbuilt, gains a vertex list, then element lists, and finally (on demand)
//! derived caches. Caches are deleted explicitly and never kept implicitly
//! stale.
//!
//! Dimensionality is a tagged [`Topology`] level rather than an inheritance
//! chain; shared behavior (bounding box, planarity, element addressing)
//! lives in free functions over the structure and a geometry id.

pub mod bounds;
pub mod derived;
pub mod ops;

pub use bounds::BoundingBox;

use crate::graph::id::ObjectId;
use crate::graph::object::{ChildTable, IdRemap};

/// Element shape of one topology level; fixes the per-element vertex stride.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CellKind {
    Segment,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl CellKind {
    /// Vertices per element of this kind.
    pub const fn num_vertices(self) -> usize {
        match self {
            CellKind::Segment => 2,
            CellKind::Triangle => 3,
            CellKind::Quadrilateral => 4,
            CellKind::Tetrahedron => 4,
            CellKind::Hexahedron => 8,
        }
    }

    /// Topological dimension of the element.
    pub const fn dimension(self) -> usize {
        match self {
            CellKind::Segment => 1,
            CellKind::Triangle | CellKind::Quadrilateral => 2,
            CellKind::Tetrahedron | CellKind::Hexahedron => 3,
        }
    }
}

/// Which element level of a geometry an operation addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementClass {
    Edge,
    Face,
    Cell,
}

impl ElementClass {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            ElementClass::Edge => "edge",
            ElementClass::Face => "face",
            ElementClass::Cell => "cell",
        }
    }
}

/// Per-level element state: the shared index list, the per-element attribute
/// matrix, and the explicitly managed derived caches. All references are ids
/// into the owning structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementLevel {
    pub(crate) kind: Option<CellKind>,
    pub(crate) list: Option<ObjectId>,
    pub(crate) attributes: Option<ObjectId>,
    pub(crate) centroids: Option<ObjectId>,
    pub(crate) neighbors: Option<ObjectId>,
    pub(crate) containing_verts: Option<ObjectId>,
}

impl ElementLevel {
    fn with_kind(kind: CellKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Element shape, once assigned.
    #[inline]
    pub fn kind(&self) -> Option<CellKind> {
        self.kind
    }

    /// Id of the shared index list.
    #[inline]
    pub fn list(&self) -> Option<ObjectId> {
        self.list
    }

    /// Id of the per-element attribute matrix.
    #[inline]
    pub fn attributes(&self) -> Option<ObjectId> {
        self.attributes
    }

    /// Id of the centroid cache array, when computed.
    #[inline]
    pub fn centroids(&self) -> Option<ObjectId> {
        self.centroids
    }

    /// Id of the element-neighbor cache, when computed.
    #[inline]
    pub fn neighbors(&self) -> Option<ObjectId> {
        self.neighbors
    }

    /// Id of the elements-containing-vertex cache, when computed.
    #[inline]
    pub fn containing_verts(&self) -> Option<ObjectId> {
        self.containing_verts
    }

    fn remap_ids(&mut self, remap: &IdRemap) {
        self.list = remap.map_opt(self.list);
        self.attributes = remap.map_opt(self.attributes);
        self.centroids = remap.map_opt(self.centroids);
        self.neighbors = remap.map_opt(self.neighbors);
        self.containing_verts = remap.map_opt(self.containing_verts);
    }
}

/// Dimensionality level of a geometry, holding only the element levels that
/// exist at that level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    /// Vertices only.
    Vertex,
    /// Vertices plus edges.
    Edge { edges: ElementLevel },
    /// Vertices, optional edges, and faces.
    Face {
        edges: ElementLevel,
        faces: ElementLevel,
    },
    /// Vertices, optional edges and faces, and polyhedral cells.
    Volume {
        edges: ElementLevel,
        faces: ElementLevel,
        cells: ElementLevel,
    },
}

/// Geometry payload: shared-list references plus a tagged topology level.
///
/// The geometry is itself a container; its shared lists, attribute matrices,
/// and caches conventionally live underneath it as ordinary children.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub(crate) children: ChildTable,
    pub(crate) vertices: Option<ObjectId>,
    pub(crate) vertex_attributes: Option<ObjectId>,
    pub(crate) topology: Topology,
}

impl Geometry {
    /// A 0-dimensional (vertex cloud) geometry.
    pub fn vertex() -> Self {
        Self {
            children: ChildTable::default(),
            vertices: None,
            vertex_attributes: None,
            topology: Topology::Vertex,
        }
    }

    /// A 1-dimensional geometry (segments between vertices).
    pub fn edge() -> Self {
        Self {
            topology: Topology::Edge {
                edges: ElementLevel::with_kind(CellKind::Segment),
            },
            ..Self::vertex()
        }
    }

    /// A 2-dimensional geometry of `kind` faces (triangles or quads).
    pub fn face(kind: CellKind) -> Self {
        debug_assert_eq!(kind.dimension(), 2);
        Self {
            topology: Topology::Face {
                edges: ElementLevel::with_kind(CellKind::Segment),
                faces: ElementLevel::with_kind(kind),
            },
            ..Self::vertex()
        }
    }

    /// A 3-dimensional geometry of `kind` cells (tets or hexes).
    pub fn volume(kind: CellKind) -> Self {
        debug_assert_eq!(kind.dimension(), 3);
        Self {
            topology: Topology::Volume {
                edges: ElementLevel::with_kind(CellKind::Segment),
                faces: ElementLevel::with_kind(match kind {
                    CellKind::Hexahedron => CellKind::Quadrilateral,
                    _ => CellKind::Triangle,
                }),
                cells: ElementLevel::with_kind(kind),
            },
            ..Self::vertex()
        }
    }

    /// Children owned under this geometry (shared lists, matrices, caches).
    #[inline]
    pub fn children(&self) -> &ChildTable {
        &self.children
    }

    #[inline]
    pub(crate) fn children_mut(&mut self) -> &mut ChildTable {
        &mut self.children
    }

    /// Id of the shared vertex list, once assigned.
    #[inline]
    pub fn vertices(&self) -> Option<ObjectId> {
        self.vertices
    }

    /// Id of the per-vertex attribute matrix, once assigned.
    #[inline]
    pub fn vertex_attributes(&self) -> Option<ObjectId> {
        self.vertex_attributes
    }

    /// The topology level tag.
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The element level for `class`, when this geometry's dimensionality
    /// has one.
    pub fn element_level(&self, class: ElementClass) -> Option<&ElementLevel> {
        match (&self.topology, class) {
            (Topology::Edge { edges }, ElementClass::Edge) => Some(edges),
            (Topology::Face { edges, .. }, ElementClass::Edge) => Some(edges),
            (Topology::Face { faces, .. }, ElementClass::Face) => Some(faces),
            (Topology::Volume { edges, .. }, ElementClass::Edge) => Some(edges),
            (Topology::Volume { faces, .. }, ElementClass::Face) => Some(faces),
            (Topology::Volume { cells, .. }, ElementClass::Cell) => Some(cells),
            _ => None,
        }
    }

    pub(crate) fn element_level_mut(&mut self, class: ElementClass) -> Option<&mut ElementLevel> {
        match (&mut self.topology, class) {
            (Topology::Edge { edges }, ElementClass::Edge) => Some(edges),
            (Topology::Face { edges, .. }, ElementClass::Edge) => Some(edges),
            (Topology::Face { faces, .. }, ElementClass::Face) => Some(faces),
            (Topology::Volume { edges, .. }, ElementClass::Edge) => Some(edges),
            (Topology::Volume { faces, .. }, ElementClass::Face) => Some(faces),
            (Topology::Volume { cells, .. }, ElementClass::Cell) => Some(cells),
            _ => None,
        }
    }

    /// Highest element class present at this geometry's level.
    pub fn highest_class(&self) -> Option<ElementClass> {
        match self.topology {
            Topology::Vertex => None,
            Topology::Edge { .. } => Some(ElementClass::Edge),
            Topology::Face { .. } => Some(ElementClass::Face),
            Topology::Volume { .. } => Some(ElementClass::Cell),
        }
    }

    pub(crate) fn remap_ids(&mut self, remap: &IdRemap) {
        self.children.remap_ids(remap);
        self.vertices = remap.map_opt(self.vertices);
        self.vertex_attributes = remap.map_opt(self.vertex_attributes);
        match &mut self.topology {
            Topology::Vertex => {}
            Topology::Edge { edges } => edges.remap_ids(remap),
            Topology::Face { edges, faces } => {
                edges.remap_ids(remap);
                faces.remap_ids(remap);
            }
            Topology::Volume {
                edges,
                faces,
                cells,
            } => {
                edges.remap_ids(remap);
                faces.remap_ids(remap);
                cells.remap_ids(remap);
            }
        }
    }
}
