//! Mesh vertices with their own pools of UVs and normals.

use cgmath::{prelude::*, Point3, Vector2, Vector3};
use num_traits::Zero;
use smallvec::SmallVec;


/// A vertex of a [`MeshData`][crate::MeshData].
///
/// Besides the position, each vertex stores a small list of UV coordinates
/// and a small list of normals. Face corners select one entry of each list by
/// its index (the "sub-index"). That way, one vertex can have different UVs
/// on both sides of a UV seam and different normals on both sides of a hard
/// edge, while still being one shared vertex for editing purposes.
///
/// Both lists may be empty. Reading an attribute via [`Vertex::uv`] or
/// [`Vertex::normal`] never fails: out of range sub-indices fall back to the
/// first entry, and to zero if there are no entries at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub uvs: SmallVec<[Vector2<f32>; 2]>,
    pub normals: SmallVec<[Vector3<f32>; 2]>,
}

impl Vertex {
    /// Creates a vertex at the given position without any UVs or normals.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            uvs: SmallVec::new(),
            normals: SmallVec::new(),
        }
    }

    /// Builder-style: appends the given UV and returns `self`.
    pub fn with_uv(mut self, uv: Vector2<f32>) -> Self {
        self.uvs.push(uv);
        self
    }

    /// Builder-style: appends the given normal and returns `self`.
    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normals.push(normal);
        self
    }

    /// Appends a UV unconditionally and returns its sub-index.
    pub fn add_uv(&mut self, uv: Vector2<f32>) -> u32 {
        self.uvs.push(uv);
        (self.uvs.len() - 1) as u32
    }

    /// Appends a normal unconditionally and returns its sub-index.
    pub fn add_normal(&mut self, normal: Vector3<f32>) -> u32 {
        self.normals.push(normal);
        (self.normals.len() - 1) as u32
    }

    /// Returns the sub-index of the first UV closer than `tolerance` to `uv`.
    pub fn find_uv(&self, uv: Vector2<f32>, tolerance: f32) -> Option<u32> {
        self.uvs.iter()
            .position(|&existing| (existing - uv).magnitude() < tolerance)
            .map(|i| i as u32)
    }

    /// Returns the sub-index of the first normal closer than `tolerance` to
    /// `normal`.
    pub fn find_normal(&self, normal: Vector3<f32>, tolerance: f32) -> Option<u32> {
        self.normals.iter()
            .position(|&existing| (existing - normal).magnitude() < tolerance)
            .map(|i| i as u32)
    }

    /// Returns the sub-index of an existing UV within `tolerance` of `uv`, or
    /// appends `uv` if there is none.
    pub fn get_or_add_uv(&mut self, uv: Vector2<f32>, tolerance: f32) -> u32 {
        match self.find_uv(uv, tolerance) {
            Some(idx) => idx,
            None => self.add_uv(uv),
        }
    }

    /// Returns the sub-index of an existing normal within `tolerance` of
    /// `normal`, or appends `normal` if there is none.
    pub fn get_or_add_normal(&mut self, normal: Vector3<f32>, tolerance: f32) -> u32 {
        match self.find_normal(normal, tolerance) {
            Some(idx) => idx,
            None => self.add_normal(normal),
        }
    }

    /// Returns the UV with the given sub-index, falling back to the first UV
    /// and then to zero.
    pub fn uv(&self, sub_index: u32) -> Vector2<f32> {
        self.uvs.get(sub_index as usize)
            .or_else(|| self.uvs.first())
            .copied()
            .unwrap_or_else(Vector2::zero)
    }

    /// Returns the normal with the given sub-index, falling back to the first
    /// normal and then to zero.
    pub fn normal(&self, sub_index: u32) -> Vector3<f32> {
        self.normals.get(sub_index as usize)
            .or_else(|| self.normals.first())
            .copied()
            .unwrap_or_else(Vector3::zero)
    }
}
