//! Edge and line extraction for wireframe and overlay rendering.
//!
//! Drawing a wireframe every frame requires the edges of the mesh in a form
//! the GPU can consume. [`EdgeExtractionCache`] derives that data from a
//! [`MeshData`] and only rebuilds it when the mesh has changed.

use std::{
    io::{self, Write},
    mem,
};

use byteorder::{ByteOrder, LittleEndian};
use derive_more::Display;
use fxhash::FxHashSet;
use log::{debug, trace};
use static_assertions::{assert_eq_size, const_assert_eq};

use crate::{
    face::Face,
    mesh::{MeshData, MeshId},
};


/// The kind of line an [`EdgeRecord`] represents.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LineType {
    #[display(fmt = "polygon edge")]
    PolygonEdge = 0,
    #[display(fmt = "auxiliary line")]
    AuxLine = 1,
}

impl LineType {
    /// Interprets the raw `line_type` field of an [`EdgeRecord`].
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(LineType::PolygonEdge),
            1 => Some(LineType::AuxLine),
            _ => None,
        }
    }
}

/// One edge of one face, laid out for direct upload into a GPU structured
/// buffer: four `u32` without padding, in exactly this order.
///
/// Polygon edges are stored once per face they belong to, so that shaders
/// can cull them based on the owning face.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EdgeRecord {
    pub v1: u32,
    pub v2: u32,
    pub face: u32,
    pub line_type: u32,
}

assert_eq_size!(EdgeRecord, [u32; 4]);
const_assert_eq!(mem::align_of::<EdgeRecord>(), mem::align_of::<u32>());

impl EdgeRecord {
    pub fn new(v1: u32, v2: u32, face: u32, line_type: LineType) -> Self {
        Self {
            v1,
            v2,
            face,
            line_type: line_type as u32,
        }
    }

    /// Returns the line type, or `None` if the raw field holds an unknown
    /// value.
    pub fn line_type(&self) -> Option<LineType> {
        LineType::from_raw(self.line_type)
    }

    /// Encodes this record as it is laid out in the GPU buffer: the four
    /// fields as little endian `u32`, in declaration order.
    pub fn to_bytes(&self) -> [u8; EDGE_RECORD_SIZE] {
        let mut buf = [0; EDGE_RECORD_SIZE];
        LittleEndian::write_u32(&mut buf[00..04], self.v1);
        LittleEndian::write_u32(&mut buf[04..08], self.v2);
        LittleEndian::write_u32(&mut buf[08..12], self.face);
        LittleEndian::write_u32(&mut buf[12..16], self.line_type);
        buf
    }
}

/// The byte size of one [`EdgeRecord`] in the GPU buffer.
pub const EDGE_RECORD_SIZE: usize = mem::size_of::<EdgeRecord>();

fn undirected(a: u32, b: u32) -> [u32; 2] {
    if a <= b { [a, b] } else { [b, a] }
}


/// Edge and line data derived from a [`MeshData`].
///
/// After [`update`][Self::update], the cache holds:
///
/// - [`edges`][Self::edges]: one [`EdgeRecord`] per edge of every polygon and
///   one per auxiliary line, in face order.
/// - [`unique_edges`][Self::unique_edges]: every undirected polygon edge
///   exactly once as `[min, max]`, in order of first occurrence.
/// - [`aux_lines`][Self::aux_lines]: every auxiliary line exactly once as
///   `[min, max]`, in order of first occurrence.
///
/// The cache remembers the [`MeshId`] and [`MeshData::revision`] it was
/// built from and skips rebuilding as long as both are unchanged.
#[derive(Debug, Clone, Default)]
pub struct EdgeExtractionCache {
    source: Option<(MeshId, u64)>,
    edges: Vec<EdgeRecord>,
    unique_edges: Vec<[u32; 2]>,
    aux_lines: Vec<[u32; 2]>,
    seen_edges: FxHashSet<[u32; 2]>,
    seen_lines: FxHashSet<[u32; 2]>,
}

impl EdgeExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the cache up to date with `mesh`. Returns `true` if the data
    /// was rebuilt.
    ///
    /// Nothing is done if `force` is `false`, the cache was last built from
    /// the same mesh at the same revision and it is not empty. Otherwise all
    /// data is extracted again.
    ///
    /// # Panics
    ///
    /// Panics if the mesh has more than `u32::MAX` faces, as face indices
    /// are stored as `u32` in the [`EdgeRecord`]s.
    pub fn update(&mut self, mesh: &MeshData, force: bool) -> bool {
        let key = (mesh.id(), mesh.revision());
        if !force && self.source == Some(key) && !self.is_empty() {
            trace!("edge cache for {} (revision {}) is up to date", key.0, key.1);
            return false;
        }

        assert!(
            mesh.face_count() <= u32::max_value() as usize,
            "mesh '{}' has {} faces, which exceeds the u32 index range",
            mesh.name,
            mesh.face_count(),
        );

        self.clear_outputs();
        for (face_idx, face) in mesh.faces().iter().enumerate() {
            let face_idx = face_idx as u32;
            match face {
                Face::Line(line) => {
                    let [a, b] = [line.corners[0].vertex, line.corners[1].vertex];
                    self.edges.push(EdgeRecord::new(a, b, face_idx, LineType::AuxLine));

                    let key = undirected(a, b);
                    if self.seen_lines.insert(key) {
                        self.aux_lines.push(key);
                    }
                }
                Face::Polygon(_) => {
                    for [a, b] in face.edges() {
                        self.edges.push(EdgeRecord::new(a, b, face_idx, LineType::PolygonEdge));

                        let key = undirected(a, b);
                        if self.seen_edges.insert(key) {
                            self.unique_edges.push(key);
                        }
                    }
                }
            }
        }

        self.source = Some(key);
        debug!(
            "rebuilt edge cache for '{}' ({}): {} records, {} unique edges, {} aux lines",
            mesh.name,
            key.0,
            self.edges.len(),
            self.unique_edges.len(),
            self.aux_lines.len(),
        );

        true
    }

    /// Forgets which mesh the data was built from, so that the next
    /// [`update`][Self::update] rebuilds. The data itself is kept.
    pub fn invalidate(&mut self) {
        self.source = None;
    }

    /// Removes all data and forgets the source mesh.
    pub fn clear(&mut self) {
        self.invalidate();
        self.clear_outputs();
    }

    fn clear_outputs(&mut self) {
        self.edges.clear();
        self.unique_edges.clear();
        self.aux_lines.clear();
        self.seen_edges.clear();
        self.seen_lines.clear();
    }

    /// Returns `true` if there is no edge data (e.g. before the first update
    /// or for a mesh without faces).
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn unique_edges(&self) -> &[[u32; 2]] {
        &self.unique_edges
    }

    pub fn aux_lines(&self) -> &[[u32; 2]] {
        &self.aux_lines
    }

    /// Writes all [`EdgeRecord`]s as a GPU buffer: four little endian `u32`
    /// per record, without any header.
    pub fn write_edge_buffer(&self, mut w: impl Write) -> io::Result<()> {
        for record in &self.edges {
            w.write_all(&record.to_bytes())?;
        }

        Ok(())
    }

    /// Like [`write_edge_buffer`][Self::write_edge_buffer], but returns the
    /// bytes.
    pub fn edge_buffer_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.edges.len() * EDGE_RECORD_SIZE);
        for record in &self.edges {
            out.extend_from_slice(&record.to_bytes());
        }
        out
    }
}
