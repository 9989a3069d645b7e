use cgmath::{prelude::*, Point3};
use fxhash::FxHashMap;
use log::{debug, warn};
use num_traits::ToPrimitive;
use smallvec::SmallVec;

use crate::{
    config::Tolerances,
    error::ImportError,
    face::{Corner, Face, Polygon},
    render::RenderMesh,
    vertex::Vertex,
};
use super::MeshData;


/// Finds vertices by position.
///
/// Positions are rounded to a fixed number of decimals to obtain a hash key.
/// Vertices in the same cell and in all cells that can hold a point within
/// the tolerance are then compared by exact distance. Positions which cannot
/// be rounded to an integer key (non-finite or huge coordinates) are never
/// merged.
struct PositionMap {
    cells: FxHashMap<[i64; 3], SmallVec<[u32; 1]>>,
    scale: f64,
    tolerance: f32,

    /// How many neighboring cells per axis and direction need to be searched.
    reach: i64,
}

impl PositionMap {
    fn new(tolerances: &Tolerances) -> Self {
        let scale = tolerances.quantization_scale();
        let reach = (f64::from(tolerances.position) * scale)
            .ceil()
            .to_i64()
            .unwrap_or(1)
            .max(1);

        Self {
            cells: FxHashMap::default(),
            scale,
            tolerance: tolerances.position,
            reach,
        }
    }

    fn key(&self, p: Point3<f32>) -> Option<[i64; 3]> {
        let q = |s: f32| (f64::from(s) * self.scale).round().to_i64();
        Some([q(p.x)?, q(p.y)?, q(p.z)?])
    }

    /// Returns the first vertex closer than the tolerance to `position`,
    /// searching the cell `key` and its neighbors.
    fn find(&self, key: [i64; 3], position: Point3<f32>, vertices: &[Vertex]) -> Option<u32> {
        let r = self.reach;
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    let neighbor = match (
                        key[0].checked_add(dx),
                        key[1].checked_add(dy),
                        key[2].checked_add(dz),
                    ) {
                        (Some(x), Some(y), Some(z)) => [x, y, z],
                        _ => continue,
                    };

                    let found = self.cells.get(&neighbor)
                        .into_iter()
                        .flatten()
                        .copied()
                        .find(|&i| {
                            (vertices[i as usize].position - position).magnitude() < self.tolerance
                        });
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }

        None
    }

    /// Returns the index of a vertex at `position`, adding one to `vertices`
    /// if there is none yet.
    fn find_or_insert(&mut self, position: Point3<f32>, vertices: &mut Vec<Vertex>) -> u32 {
        let key = self.key(position);
        if let Some(existing) = key.and_then(|key| self.find(key, position, vertices)) {
            return existing;
        }

        let idx = vertices.len() as u32;
        vertices.push(Vertex::new(position));
        if let Some(key) = key {
            self.cells.entry(key).or_default().push(idx);
        }
        idx
    }
}

fn check_vertex_count(source: &RenderMesh) -> Result<(), ImportError> {
    if source.positions.len() > u32::max_value() as usize {
        return Err(ImportError::TooManyVertices(source.positions.len()));
    }
    Ok(())
}

/// Adds one triangle face per index triple of each submesh. `corners` maps
/// source vertex indices to the corners they were turned into.
fn add_source_faces(
    mesh: &mut MeshData,
    source: &RenderMesh,
    corners: &[Corner],
) -> Result<(), ImportError> {
    let (_, faces) = mesh.parts_mut();

    for (submesh, indices) in source.submeshes.iter().enumerate() {
        if indices.len() % 3 != 0 {
            warn!(
                "submesh {} has {} indices, which is not a multiple of 3; ignoring the last {}",
                submesh,
                indices.len(),
                indices.len() % 3,
            );
        }

        for triangle in indices.chunks_exact(3) {
            let mut face_corners = [Corner::default(); 3];
            for (out, &index) in face_corners.iter_mut().zip(triangle) {
                *out = *corners.get(index as usize).ok_or(ImportError::IndexOutOfRange {
                    submesh,
                    index,
                    vertex_count: corners.len(),
                })?;
            }

            faces.push(Face::Polygon(Polygon::new(face_corners.iter().copied(), submesh as u32)));
        }
    }

    Ok(())
}

impl MeshData {
    /// Builds a mesh from a render mesh, merging vertices with (almost) equal
    /// positions.
    ///
    /// Each source vertex closer than [`Tolerances::position`] to an already
    /// created vertex is merged into it; otherwise it creates a new vertex. The UVs and normals of the source vertices
    /// are collected on the shared vertex, so UV seams and hard edges are
    /// kept as different sub-indices instead of being lost. Each source
    /// triangle becomes one triangle face whose material is the index of its
    /// submesh.
    ///
    /// Fails if a triangle references a vertex that does not exist. Trailing
    /// indices that do not form a full triangle are ignored.
    pub fn from_render_mesh_merged(
        name: impl Into<String>,
        source: &RenderMesh,
        tolerances: &Tolerances,
    ) -> Result<Self, ImportError> {
        check_vertex_count(source)?;

        let mut mesh = MeshData::new(name);
        let mut map = PositionMap::new(tolerances);
        let mut corners = Vec::with_capacity(source.positions.len());

        {
            let (vertices, _) = mesh.parts_mut();
            for (i, &position) in source.positions.iter().enumerate() {
                let vertex_idx = map.find_or_insert(position, vertices);
                let vertex = &mut vertices[vertex_idx as usize];

                let uv = source.uvs.get(i)
                    .map(|&uv| vertex.get_or_add_uv(uv, tolerances.uv))
                    .unwrap_or(0);
                let normal = source.normals.get(i)
                    .map(|&n| vertex.get_or_add_normal(n, tolerances.normal))
                    .unwrap_or(0);

                corners.push(Corner::new(vertex_idx, uv, normal));
            }
        }

        add_source_faces(&mut mesh, source, &corners)?;

        debug!(
            "imported '{}' (merged): {} source vertices -> {} vertices, {} faces",
            mesh.name,
            source.positions.len(),
            mesh.vertex_count(),
            mesh.face_count(),
        );

        Ok(mesh)
    }

    /// Builds a mesh from a render mesh without merging anything: every source
    /// vertex becomes one vertex with at most one UV and one normal.
    ///
    /// Fails under the same conditions as
    /// [`MeshData::from_render_mesh_merged`].
    pub fn from_render_mesh_direct(
        name: impl Into<String>,
        source: &RenderMesh,
    ) -> Result<Self, ImportError> {
        check_vertex_count(source)?;

        let mut mesh = MeshData::new(name);
        {
            let (vertices, _) = mesh.parts_mut();
            vertices.reserve(source.positions.len());
            for (i, &position) in source.positions.iter().enumerate() {
                let mut vertex = Vertex::new(position);
                if let Some(&uv) = source.uvs.get(i) {
                    vertex.add_uv(uv);
                }
                if let Some(&normal) = source.normals.get(i) {
                    vertex.add_normal(normal);
                }
                vertices.push(vertex);
            }
        }

        let corners: Vec<_> = (0..source.positions.len() as u32).map(Corner::at).collect();
        add_source_faces(&mut mesh, source, &corners)?;

        debug!(
            "imported '{}' (direct): {} vertices, {} faces",
            mesh.name,
            mesh.vertex_count(),
            mesh.face_count(),
        );

        Ok(mesh)
    }
}
