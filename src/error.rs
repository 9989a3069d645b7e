//! Errors reported by checked operations.
//!
//! Most operations of this crate don't fail: missing attributes fall back to
//! defaults and degenerate geometry gets a fallback normal. Only input that
//! cannot be interpreted at all is reported.

use failure::Fail;


/// Errors that can happen when building a [`MeshData`][crate::MeshData] from
/// a [`RenderMesh`][crate::RenderMesh].
#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[fail(
        display = "index {} in submesh {} is out of range (source has {} vertices)",
        index, submesh, vertex_count
    )]
    IndexOutOfRange {
        submesh: usize,
        index: u32,
        vertex_count: usize,
    },

    #[fail(display = "source has {} vertices, which exceeds the u32 index range", _0)]
    TooManyVertices(usize),
}

/// A face references a vertex that does not exist.
#[derive(Debug, Fail, Clone, Copy, PartialEq, Eq)]
#[fail(
    display = "face {} references vertex {}, but the mesh only has {} vertices",
    face, vertex, vertex_count
)]
pub struct IntegrityError {
    pub face: usize,
    pub vertex: u32,
    pub vertex_count: usize,
}
