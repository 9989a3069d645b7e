//! Faces: polygons with an arbitrary number of corners and auxiliary lines.

use smallvec::SmallVec;


/// One corner of a face: a vertex index plus the sub-indices that select the
/// UV and normal of that vertex used by this corner.
///
/// The vertex index refers to [`MeshData::vertices`][crate::MeshData::vertices]
/// by position. It is not updated when vertices are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Corner {
    pub vertex: u32,
    pub uv: u32,
    pub normal: u32,
}

impl Corner {
    pub fn new(vertex: u32, uv: u32, normal: u32) -> Self {
        Self { vertex, uv, normal }
    }

    /// A corner using the first UV and first normal of `vertex`.
    pub fn at(vertex: u32) -> Self {
        Self::new(vertex, 0, 0)
    }
}

/// Corner storage of polygons. Triangles and quads are stored inline.
pub type CornerList = SmallVec<[Corner; 4]>;


/// A surface polygon with at least three corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    corners: CornerList,
    pub material: u32,
}

impl Polygon {
    /// Creates a polygon from the given corners.
    ///
    /// # Panics
    ///
    /// Panics if there are fewer than three corners. Use [`Face::new`] if the
    /// corner count is not known up front.
    pub fn new(corners: impl IntoIterator<Item = Corner>, material: u32) -> Self {
        let corners: CornerList = corners.into_iter().collect();
        assert!(
            corners.len() >= 3,
            "polygon needs at least 3 corners, {} given",
            corners.len(),
        );

        Self { corners, material }
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    /// Mutable access to the corners. The number of corners cannot be changed
    /// through this.
    pub fn corners_mut(&mut self) -> &mut [Corner] {
        &mut self.corners
    }
}

/// A guide line between two vertices. It is not a surface: it's never
/// triangulated and does not count as a polygon edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxLine {
    pub corners: [Corner; 2],
    pub material: u32,
}


/// A face of a [`MeshData`][crate::MeshData].
///
/// Faces with two corners are lines, faces with three or more corners are
/// polygons. Corner lists with fewer than two corners cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Face {
    Polygon(Polygon),
    Line(AuxLine),
}

impl Face {
    /// Creates a line or polygon depending on the number of corners. Returns
    /// `None` for fewer than two corners.
    pub fn new(corners: impl IntoIterator<Item = Corner>, material: u32) -> Option<Self> {
        let corners: CornerList = corners.into_iter().collect();
        match corners.len() {
            0 | 1 => None,
            2 => Some(Face::Line(AuxLine {
                corners: [corners[0], corners[1]],
                material,
            })),
            _ => Some(Face::Polygon(Polygon { corners, material })),
        }
    }

    /// Like [`Face::new`], but all corners use UV and normal sub-index 0.
    pub fn from_vertices(vertices: &[u32], material: u32) -> Option<Self> {
        Self::new(vertices.iter().map(|&v| Corner::at(v)), material)
    }

    pub fn triangle(vertices: [u32; 3], material: u32) -> Self {
        Face::Polygon(Polygon::new(vertices.iter().map(|&v| Corner::at(v)), material))
    }

    pub fn quad(vertices: [u32; 4], material: u32) -> Self {
        Face::Polygon(Polygon::new(vertices.iter().map(|&v| Corner::at(v)), material))
    }

    pub fn line(vertices: [u32; 2], material: u32) -> Self {
        Face::Line(AuxLine {
            corners: [Corner::at(vertices[0]), Corner::at(vertices[1])],
            material,
        })
    }

    pub fn corners(&self) -> &[Corner] {
        match self {
            Face::Polygon(p) => p.corners(),
            Face::Line(l) => &l.corners,
        }
    }

    pub fn corners_mut(&mut self) -> &mut [Corner] {
        match self {
            Face::Polygon(p) => p.corners_mut(),
            Face::Line(l) => &mut l.corners,
        }
    }

    pub fn material(&self) -> u32 {
        match self {
            Face::Polygon(p) => p.material,
            Face::Line(l) => l.material,
        }
    }

    /// Sets the material index.
    ///
    /// Material indices are dense submesh numbers, not IDs: the render mesh
    /// and [`MeshData::triangle_count_by_material`][crate::MeshData::triangle_count_by_material]
    /// allocate one entry per index up to the largest one used. Keep them
    /// small.
    pub fn set_material(&mut self, material: u32) {
        match self {
            Face::Polygon(p) => p.material = material,
            Face::Line(l) => l.material = material,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.corners().len()
    }

    pub fn is_triangle(&self) -> bool {
        self.vertex_count() == 3
    }

    pub fn is_quad(&self) -> bool {
        self.vertex_count() == 4
    }

    /// Returns `true` if this is a polygon, i.e. a real surface element.
    pub fn is_valid(&self) -> bool {
        match self {
            Face::Polygon(_) => true,
            Face::Line(_) => false,
        }
    }

    pub fn is_line(&self) -> bool {
        !self.is_valid()
    }

    pub fn vertex_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.corners().iter().map(|c| c.vertex)
    }

    pub fn uv_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.corners().iter().map(|c| c.uv)
    }

    pub fn normal_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.corners().iter().map(|c| c.normal)
    }

    /// Number of triangles this face is split into: `n - 2` for polygons, 0
    /// for lines.
    pub fn triangle_count(&self) -> usize {
        match self {
            Face::Polygon(p) => p.corners.len() - 2,
            Face::Line(_) => 0,
        }
    }

    /// Iterates over the triangles of a fan triangulation around the first
    /// corner: `(c0, c1, c2), (c0, c2, c3), ...`. Lines yield nothing.
    ///
    /// The order is fixed, so triangulating the same face twice always gives
    /// the same triangles with the same winding.
    pub fn triangles(&self) -> impl Iterator<Item = [Corner; 3]> + '_ {
        let corners = self.corners();
        let end = if self.is_valid() { corners.len() - 1 } else { 1 };
        (1..end).map(move |i| [corners[0], corners[i], corners[i + 1]])
    }

    /// Vertex indices of the fan triangulation as a flat triangle list.
    pub fn to_triangle_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(3 * self.triangle_count());
        for [a, b, c] in self.triangles() {
            out.extend_from_slice(&[a.vertex, b.vertex, c.vertex]);
        }
        out
    }

    /// Splits this face into triangle faces with the same material. Each
    /// triangle keeps the UV and normal sub-indices of its corners.
    pub fn triangulate(&self) -> Vec<Face> {
        let material = self.material();
        self.triangles()
            .map(|tri| Face::Polygon(Polygon::new(tri.iter().copied(), material)))
            .collect()
    }

    /// Reverses the corner order and with that the winding of the face.
    pub fn flip(&mut self) {
        self.corners_mut().reverse();
    }

    /// Iterates over the edges as pairs of vertex indices in corner order.
    /// Polygons yield one edge per corner (the last one wraps around to the
    /// first corner), lines yield their single segment.
    pub fn edges(&self) -> impl Iterator<Item = [u32; 2]> + '_ {
        let corners = self.corners();
        let n = corners.len();
        let count = if self.is_valid() { n } else { 1 };
        (0..count).map(move |i| [corners[i].vertex, corners[(i + 1) % n].vertex])
    }
}

impl From<Polygon> for Face {
    fn from(src: Polygon) -> Self {
        Face::Polygon(src)
    }
}

impl From<AuxLine> for Face {
    fn from(src: AuxLine) -> Self {
        Face::Line(src)
    }
}
