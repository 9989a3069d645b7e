//! Face normals and normal recomputation for [`MeshData`].

use cgmath::{prelude::*, Point3, Vector3};
use num_traits::Zero;

use crate::{
    config::Tolerances,
    face::{Corner, Face},
    mesh::MeshData,
    vertex::Vertex,
};


/// The normal used whenever no proper normal can be computed: the up vector
/// `(0, 1, 0)`.
pub const FALLBACK_NORMAL: Vector3<f32> = Vector3 { x: 0.0, y: 1.0, z: 0.0 };

/// Normal of the triangle `a b c` (counter clockwise winding), or
/// [`FALLBACK_NORMAL`] if the cross product is shorter than `degenerate`.
pub fn triangle_normal(
    a: Point3<f32>,
    b: Point3<f32>,
    c: Point3<f32>,
    degenerate: f32,
) -> Vector3<f32> {
    let cross = (b - a).cross(c - a);
    let len = cross.magnitude();
    if len < degenerate || !len.is_finite() {
        FALLBACK_NORMAL
    } else {
        cross / len
    }
}

/// Normal of a polygon, computed from its first three corners.
fn polygon_normal(vertices: &[Vertex], corners: &[Corner], degenerate: f32) -> Vector3<f32> {
    let pos = |i: usize| vertices[corners[i].vertex as usize].position;
    triangle_normal(pos(0), pos(1), pos(2), degenerate)
}

impl MeshData {
    /// Returns the normal of the given face, or `None` if it's a line.
    ///
    /// Only the first three corners are used. For non-planar polygons, this
    /// is just an approximation.
    ///
    /// # Panics
    ///
    /// Panics if `face` or one of its vertex indices is out of range.
    pub fn face_normal(&self, face: u32, tolerances: &Tolerances) -> Option<Vector3<f32>> {
        match &self.faces()[face as usize] {
            Face::Polygon(p) => {
                Some(polygon_normal(self.vertices(), p.corners(), tolerances.degenerate))
            }
            Face::Line(_) => None,
        }
    }

    /// Recomputes normals for flat shading.
    ///
    /// All existing vertex normals are removed. Then, each polygon gets its
    /// face normal, which is added to the normals of all its vertices (reusing
    /// an equal normal if the vertex already has one) and referenced by all
    /// its corners. Lines keep their (now possibly dangling) normal
    /// sub-indices; reading them falls back as usual.
    ///
    /// # Panics
    ///
    /// Panics if a face references a vertex that does not exist.
    pub fn recalculate_normals(&mut self, tolerances: &Tolerances) {
        let (vertices, faces) = self.parts_mut();

        for v in vertices.iter_mut() {
            v.normals.clear();
        }

        for face in faces.iter_mut() {
            let polygon = match face {
                Face::Polygon(p) => p,
                Face::Line(_) => continue,
            };

            let normal = polygon_normal(vertices, polygon.corners(), tolerances.degenerate);
            for corner in polygon.corners_mut() {
                corner.normal = vertices[corner.vertex as usize]
                    .get_or_add_normal(normal, tolerances.normal);
            }
        }
    }

    /// Recomputes normals for smooth shading.
    ///
    /// Every vertex ends up with exactly one normal: the normalized sum of the
    /// face normals of all polygons using it (each corner counts once, there
    /// is no angle or area weighting). Vertices not used by any polygon end
    /// up without normals. All corners of all faces use normal sub-index 0
    /// afterwards.
    ///
    /// # Panics
    ///
    /// Panics if a face references a vertex that does not exist.
    pub fn recalculate_smooth_normals(&mut self, tolerances: &Tolerances) {
        let (vertices, faces) = self.parts_mut();

        let mut sums: Vec<Option<Vector3<f32>>> = vec![None; vertices.len()];
        for face in faces.iter() {
            if let Face::Polygon(p) = face {
                let normal = polygon_normal(vertices, p.corners(), tolerances.degenerate);
                for corner in p.corners() {
                    let sum = sums[corner.vertex as usize].get_or_insert_with(Vector3::zero);
                    *sum += normal;
                }
            }
        }

        for (vertex, sum) in vertices.iter_mut().zip(sums) {
            vertex.normals.clear();
            if let Some(sum) = sum {
                let len = sum.magnitude();
                let normal = if len < tolerances.degenerate || !len.is_finite() {
                    FALLBACK_NORMAL
                } else {
                    sum / len
                };
                vertex.normals.push(normal);
            }
        }

        for face in faces.iter_mut() {
            for corner in face.corners_mut() {
                corner.normal = 0;
            }
        }
    }
}
