//! The flat, renderer-facing representation of a mesh.

use cgmath::{prelude::*, Point3, Vector2, Vector3};
use num_traits::Zero;

use crate::{
    bounding::BoundingBox,
    config::Tolerances,
    normals::{triangle_normal, FALLBACK_NORMAL},
};


/// A triangle mesh in the form renderers and file formats want it: parallel
/// per-vertex attribute arrays plus one triangle list per submesh.
///
/// Submesh `i` contains the triangles of material `i`. Submeshes are numbered
/// densely from 0 to `submeshes.len() - 1`; a material without triangles has
/// an empty list instead of being left out.
///
/// `uvs` and `normals` are expected to have the same length as `positions`.
/// When importing, shorter arrays are tolerated and missing entries treated
/// as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMesh {
    pub positions: Vec<Point3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub submeshes: Vec<Vec<u32>>,
    pub bounds: BoundingBox,
}

impl RenderMesh {
    /// Creates an empty render mesh without any submesh.
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            submeshes: Vec::new(),
            bounds: BoundingBox::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Number of complete triangles over all submeshes.
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.len() / 3).sum()
    }

    /// Iterates over all complete triangles of all submeshes.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.submeshes.iter()
            .flat_map(|s| s.chunks_exact(3))
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Replaces all normals by normals computed from the triangles.
    ///
    /// Each vertex gets the normalized sum of the normals of all triangles
    /// using it. For vertices used by a single triangle, that's simply the
    /// triangle's normal. Degenerate triangles contribute the fallback normal
    /// and vertices without any triangle get the fallback normal, so the
    /// result never contains zero vectors.
    ///
    /// # Panics
    ///
    /// Panics if a triangle references a vertex outside of `positions`.
    pub fn recalculate_normals(&mut self, tolerances: &Tolerances) {
        let mut sums = vec![Vector3::zero(); self.positions.len()];
        for [a, b, c] in self.triangles() {
            let normal = triangle_normal(
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
                tolerances.degenerate,
            );

            sums[a as usize] += normal;
            sums[b as usize] += normal;
            sums[c as usize] += normal;
        }

        self.normals = sums.into_iter()
            .map(|sum: Vector3<f32>| {
                let len = sum.magnitude();
                if len < tolerances.degenerate || !len.is_finite() {
                    FALLBACK_NORMAL
                } else {
                    sum / len
                }
            })
            .collect();
    }

    /// Recomputes `bounds` from `positions`.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = BoundingBox::around(self.positions.iter().copied());
    }
}

impl Default for RenderMesh {
    fn default() -> Self {
        Self::new()
    }
}
