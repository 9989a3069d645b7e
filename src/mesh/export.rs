use log::debug;
use num_traits::Zero;

use crate::{
    config::Tolerances,
    render::RenderMesh,
};
use super::MeshData;


impl MeshData {
    /// Builds the flat render representation of this mesh.
    ///
    /// Every polygon is fan triangulated and every triangle corner becomes
    /// one output vertex with the corner's position, UV and normal. Vertices
    /// are not shared between corners in the output. Out of range UV and
    /// normal sub-indices fall back to the vertex's first entry and then to
    /// zero. Lines produce no triangles.
    ///
    /// Triangles are sorted into one submesh per material index. The output
    /// always has [`MeshData::submesh_count`] submeshes, so the materials of
    /// lines count as well; materials without triangles get an empty list.
    ///
    /// If no corner had a normal (all emitted normals are zero), flat normals
    /// are computed instead. The bounds are always recomputed.
    ///
    /// # Panics
    ///
    /// Panics if a face references a vertex that does not exist or if the
    /// output would have more than `u32::MAX` vertices.
    pub fn to_render_mesh(&self, tolerances: &Tolerances) -> RenderMesh {
        let mut out = RenderMesh::new();
        let corner_count = 3 * self.triangle_count();
        assert!(
            corner_count <= u32::max_value() as usize,
            "render mesh of '{}' would have {} vertices, which exceeds the u32 index range",
            self.name,
            corner_count,
        );

        out.submeshes.resize_with(self.submesh_count(), Vec::new);
        out.positions.reserve(corner_count);
        out.uvs.reserve(corner_count);
        out.normals.reserve(corner_count);

        for face in self.faces() {
            let material = face.material() as usize;
            for triangle in face.triangles() {
                for corner in &triangle {
                    let vertex = self.vertex(corner.vertex);

                    let idx = out.positions.len() as u32;
                    out.positions.push(vertex.position);
                    out.uvs.push(vertex.uv(corner.uv));
                    out.normals.push(vertex.normal(corner.normal));
                    out.submeshes[material].push(idx);
                }
            }
        }

        if out.normals.iter().all(|n| n.is_zero()) {
            out.recalculate_normals(tolerances);
        }
        out.recalculate_bounds();

        debug!(
            "built render mesh for '{}': {} vertices, {} triangles, {} submeshes",
            self.name,
            out.vertex_count(),
            out.triangle_count(),
            out.submesh_count(),
        );

        out
    }
}
