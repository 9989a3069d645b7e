//! Indexed polygon meshes for editing and rendering.
//!
//! The central type is [`MeshData`]: a list of [`Vertex`]es and a list of
//! [`Face`]s that refer to vertices by index. Each vertex can carry several
//! UVs and normals, and each face corner selects one of them, so UV seams and
//! hard edges don't require duplicating vertices. Faces are either polygons
//! (three or more corners) or auxiliary lines (two corners) that are only
//! drawn as overlays.
//!
//! From there, this crate provides:
//!
//! - conversion into a flat, triangulated [`RenderMesh`] with one submesh per
//!   material, and back (with or without merging vertices),
//! - flat and smooth normal computation,
//! - bounding boxes and material queries,
//! - [`EdgeExtractionCache`], which derives GPU friendly edge data for
//!   wireframe rendering and rebuilds it only when the mesh changed.
//!
//! All floating point comparisons use the thresholds in [`Tolerances`].
//!
//! ```
//! use polymesh::{MeshData, Tolerances, cgmath::Point3};
//!
//! let mut mesh = MeshData::new("quad");
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
//! let d = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.add_quad([a, b, c, d], 0);
//!
//! let render = mesh.to_render_mesh(&Tolerances::default());
//! assert_eq!(render.triangle_count(), 2);
//! assert_eq!(render.vertex_count(), 6);
//! ```

pub mod bounding;
pub mod config;
pub mod edges;
pub mod error;
pub mod face;
mod mesh;
pub mod normals;
pub mod render;
pub mod vertex;

pub use cgmath;

pub use self::{
    bounding::BoundingBox,
    config::Tolerances,
    edges::{EdgeExtractionCache, EdgeRecord, LineType},
    error::{ImportError, IntegrityError},
    face::{AuxLine, Corner, CornerList, Face, Polygon},
    mesh::{MeshData, MeshId},
    normals::FALLBACK_NORMAL,
    render::RenderMesh,
    vertex::Vertex,
};
