//! The editable mesh type [`MeshData`].

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Point3, Vector2, Vector3};
use derive_more::Display;

use crate::{
    bounding::BoundingBox,
    error::IntegrityError,
    face::Face,
    vertex::Vertex,
};

mod export;
mod import;

#[cfg(test)]
mod tests;


static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies one [`MeshData`] instance for the lifetime of the process.
///
/// Every newly created mesh, including clones, gets a new ID. Together with
/// [`MeshData::revision`], this lets derived data (like
/// [`EdgeExtractionCache`][crate::EdgeExtractionCache]) tell whether it's
/// still up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "M{}", _0)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}


/// An indexed polygon mesh with per-corner attributes and material indices.
///
/// The mesh owns a list of [`Vertex`]es and a list of [`Face`]s. Faces refer
/// to vertices by their position in the vertex list. These references are not
/// tracked: removing a vertex shifts all following vertices, and updating the
/// faces accordingly is the caller's job. Operations that follow a dangling
/// vertex index panic. [`MeshData::check_integrity`] can be used to verify
/// the references after an edit.
///
/// Every method that can change the mesh (including the `*_mut` accessors)
/// increments [`MeshData::revision`].
#[derive(Debug)]
pub struct MeshData {
    pub name: String,
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    id: MeshId,
    revision: u64,
}

impl MeshData {
    /// Creates an empty mesh with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            id: MeshId::next(),
            revision: 0,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    /// A counter that is incremented on every (potential) modification.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Mutable access to both element lists at once. Counts as modification.
    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<Vertex>, &mut Vec<Face>) {
        self.bump();
        (&mut self.vertices, &mut self.faces)
    }


    // ----- Element access ----------------------------------------------------

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn vertex(&self, index: u32) -> &Vertex {
        &self.vertices[index as usize]
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn face(&self, index: u32) -> &Face {
        &self.faces[index as usize]
    }

    /// Mutable access to the vertex list. Faces are not updated when vertices
    /// are inserted or removed through this.
    pub fn vertices_mut(&mut self) -> &mut Vec<Vertex> {
        self.bump();
        &mut self.vertices
    }

    pub fn faces_mut(&mut self) -> &mut Vec<Face> {
        self.bump();
        &mut self.faces
    }

    pub fn vertex_mut(&mut self, index: u32) -> &mut Vertex {
        self.bump();
        &mut self.vertices[index as usize]
    }

    pub fn face_mut(&mut self, index: u32) -> &mut Face {
        self.bump();
        &mut self.faces[index as usize]
    }


    // ----- Counts ------------------------------------------------------------

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces, including lines.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles the polygons are split into when rendering.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.triangle_count()).sum()
    }

    /// The largest material index of all faces (lines included) plus one, or
    /// 1 if there are no faces. This is the number of submeshes of
    /// [`MeshData::to_render_mesh`].
    pub fn submesh_count(&self) -> usize {
        self.faces.iter()
            .map(|f| f.material() as usize + 1)
            .max()
            .unwrap_or(1)
    }


    // ----- Construction ------------------------------------------------------

    /// Adds a vertex without UVs and normals and returns its index.
    pub fn add_vertex(&mut self, position: Point3<f32>) -> u32 {
        self.push_vertex(Vertex::new(position))
    }

    /// Adds a vertex with one UV and one normal and returns its index.
    pub fn add_vertex_with(
        &mut self,
        position: Point3<f32>,
        uv: Vector2<f32>,
        normal: Vector3<f32>,
    ) -> u32 {
        self.push_vertex(Vertex::new(position).with_uv(uv).with_normal(normal))
    }

    /// Adds the given vertex and returns its index.
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        self.bump();
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    /// Adds the given face and returns its index. Vertex indices are not
    /// checked.
    ///
    /// The face's material index should be small: every index up to the
    /// largest used one gets a submesh (see [`MeshData::submesh_count`]).
    pub fn add_face(&mut self, face: Face) -> u32 {
        self.bump();
        self.faces.push(face);
        (self.faces.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32, material: u32) -> u32 {
        self.add_face(Face::triangle([v0, v1, v2], material))
    }

    pub fn add_quad(&mut self, vertices: [u32; 4], material: u32) -> u32 {
        self.add_face(Face::quad(vertices, material))
    }

    /// Adds an auxiliary line between two vertices.
    pub fn add_line(&mut self, v0: u32, v1: u32, material: u32) -> u32 {
        self.add_face(Face::line([v0, v1], material))
    }


    // ----- Removal -----------------------------------------------------------

    /// Removes and returns the face with the given index. Following faces move
    /// down by one.
    pub fn remove_face(&mut self, index: u32) -> Face {
        self.bump();
        self.faces.remove(index as usize)
    }

    /// Removes and returns the vertex with the given index.
    ///
    /// Faces are *not* updated: faces referencing this vertex or any vertex
    /// after it are invalid afterwards unless the caller renumbers them.
    pub fn remove_vertex(&mut self, index: u32) -> Vertex {
        self.bump();
        self.vertices.remove(index as usize)
    }

    /// Removes all vertices and faces. The name is kept.
    pub fn clear(&mut self) {
        self.bump();
        self.vertices.clear();
        self.faces.clear();
    }


    // ----- Face edits --------------------------------------------------------

    pub fn set_material(&mut self, face: u32, material: u32) {
        self.face_mut(face).set_material(material);
    }

    /// Changes the material of all faces using `from` to `to`. Returns the
    /// number of changed faces.
    pub fn replace_material(&mut self, from: u32, to: u32) -> usize {
        self.bump();
        let mut count = 0;
        for face in self.faces.iter_mut().filter(|f| f.material() == from) {
            face.set_material(to);
            count += 1;
        }
        count
    }

    /// Flips the winding of all faces.
    pub fn flip_faces(&mut self) {
        self.bump();
        for face in &mut self.faces {
            face.flip();
        }
    }


    // ----- Material queries --------------------------------------------------

    /// All material indices used by at least one face, sorted and without
    /// duplicates.
    pub fn used_materials(&self) -> Vec<u32> {
        let mut out: Vec<_> = self.faces.iter().map(|f| f.material()).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn uses_material(&self, material: u32) -> bool {
        self.faces.iter().any(|f| f.material() == material)
    }

    /// Indices of all faces (including lines) with the given material.
    pub fn faces_with_material(&self, material: u32) -> impl Iterator<Item = u32> + '_ {
        self.faces.iter()
            .enumerate()
            .filter(move |(_, f)| f.material() == material)
            .map(|(i, _)| i as u32)
    }

    /// Number of triangles per material, indexed by material. The result
    /// always has [`MeshData::submesh_count`] entries.
    pub fn triangle_count_by_material(&self) -> Vec<usize> {
        let mut out = vec![0; self.submesh_count()];
        for face in &self.faces {
            out[face.material() as usize] += face.triangle_count();
        }
        out
    }


    // ----- Geometry ----------------------------------------------------------

    /// The bounding box of all vertex positions, including vertices not used
    /// by any face. Invalid for meshes without vertices.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::around(self.vertices.iter().map(|v| v.position))
    }

    /// Checks that every face only references existing vertices. Returns the
    /// first violation found.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(vertex) = face.vertex_indices().find(|&v| v as usize >= self.vertices.len()) {
                return Err(IntegrityError {
                    face: face_idx,
                    vertex,
                    vertex_count: self.vertices.len(),
                });
            }
        }

        Ok(())
    }
}

impl Clone for MeshData {
    /// Deep copies all vertices and faces. The clone gets a new [`MeshId`].
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            id: MeshId::next(),
            revision: self.revision,
        }
    }
}

impl Default for MeshData {
    fn default() -> Self {
        Self::new("")
    }
}
