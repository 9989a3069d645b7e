use cgmath::{Point3, Vector2, Vector3};
use num_traits::Zero;

use crate::{
    config::Tolerances,
    error::{ImportError, IntegrityError},
    face::{Corner, Face},
    normals::FALLBACK_NORMAL,
    render::RenderMesh,
};
use super::MeshData;


fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
    Point3::new(x, y, z)
}

fn uv(u: f32, v: f32) -> Vector2<f32> {
    Vector2::new(u, v)
}

/// A unit square in the XY plane as a single quad with UVs and +z normals.
fn square() -> MeshData {
    let mut mesh = MeshData::new("square");
    let n = Vector3::unit_z();
    let a = mesh.add_vertex_with(p(0.0, 0.0, 0.0), uv(0.0, 0.0), n);
    let b = mesh.add_vertex_with(p(1.0, 0.0, 0.0), uv(1.0, 0.0), n);
    let c = mesh.add_vertex_with(p(1.0, 1.0, 0.0), uv(1.0, 1.0), n);
    let d = mesh.add_vertex_with(p(0.0, 1.0, 0.0), uv(0.0, 1.0), n);
    mesh.add_quad([a, b, c, d], 0);
    mesh
}


// ===========================================================================
// ===== Construction and queries
// ===========================================================================

#[test]
fn empty() {
    let mesh = MeshData::new("empty");
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.face_count(), 0);
    assert_eq!(mesh.triangle_count(), 0);
    assert_eq!(mesh.submesh_count(), 1);
    assert!(mesh.used_materials().is_empty());
    assert!(!mesh.bounds().is_valid());
}

#[test]
fn counts() {
    let mut mesh = square();
    let e = mesh.add_vertex(p(2.0, 0.0, 0.0));
    mesh.add_triangle(1, e, 2, 0);
    mesh.add_line(0, e, 0);
    mesh.add_face(Face::from_vertices(&[0, 1, e, 2, 3], 0).unwrap());

    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.triangle_count(), 2 + 1 + 0 + 3);
    assert_eq!(
        mesh.triangle_count(),
        mesh.faces().iter().map(|f| f.triangulate().len()).sum::<usize>(),
    );
}

#[test]
fn add_returns_indices() {
    let mut mesh = MeshData::new("m");
    assert_eq!(mesh.add_vertex(p(0.0, 0.0, 0.0)), 0);
    assert_eq!(mesh.add_vertex(p(1.0, 0.0, 0.0)), 1);
    assert_eq!(mesh.add_vertex(p(0.0, 1.0, 0.0)), 2);
    assert_eq!(mesh.add_triangle(0, 1, 2, 0), 0);
    assert_eq!(mesh.add_line(0, 1, 0), 1);
}

#[test]
fn material_queries() {
    let mut mesh = square();
    mesh.add_triangle(0, 1, 2, 2);
    mesh.add_line(0, 2, 5);

    assert_eq!(mesh.submesh_count(), 6);
    assert_eq!(mesh.used_materials(), [0, 2, 5]);
    assert!(mesh.uses_material(2));
    assert!(!mesh.uses_material(1));
    assert_eq!(mesh.faces_with_material(2).collect::<Vec<_>>(), [1]);
    assert_eq!(mesh.triangle_count_by_material(), [2, 0, 1, 0, 0, 0]);

    assert_eq!(mesh.replace_material(2, 0), 1);
    assert_eq!(mesh.used_materials(), [0, 5]);

    mesh.set_material(2, 1);
    assert_eq!(mesh.submesh_count(), 2);
}

#[test]
fn remove_does_not_renumber() {
    let mut mesh = square();
    let removed = mesh.remove_vertex(0);

    assert_eq!(removed.position, p(0.0, 0.0, 0.0));
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.face(0).vertex_indices().collect::<Vec<_>>(), [0, 1, 2, 3]);
    assert_eq!(mesh.check_integrity(), Err(IntegrityError {
        face: 0,
        vertex: 3,
        vertex_count: 3,
    }));

    mesh.remove_face(0);
    assert_eq!(mesh.check_integrity(), Ok(()));
}

#[test]
fn flip_all_faces() {
    let mut mesh = square();
    mesh.flip_faces();
    assert_eq!(mesh.face(0).vertex_indices().collect::<Vec<_>>(), [3, 2, 1, 0]);
}

#[test]
fn bounds() {
    let mut mesh = square();
    mesh.add_vertex(p(-1.0, 0.5, 2.0));

    let bb = mesh.bounds();
    assert_eq!(bb.min(), p(-1.0, 0.0, 0.0));
    assert_eq!(bb.max(), p(1.0, 1.0, 2.0));
}

#[test]
fn revision_and_identity() {
    let mut mesh = square();
    let rev = mesh.revision();

    let _ = mesh.vertices();
    let _ = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(mesh.revision(), rev);

    mesh.vertex_mut(0).position.x = 0.5;
    assert!(mesh.revision() > rev);

    let rev = mesh.revision();
    mesh.recalculate_normals(&Tolerances::default());
    assert!(mesh.revision() > rev);

    let copy = mesh.clone();
    assert_ne!(copy.id(), mesh.id());
    assert_eq!(copy.vertices(), mesh.vertices());
    assert_eq!(copy.faces(), mesh.faces());
}


// ===========================================================================
// ===== Render mesh
// ===========================================================================

#[test]
fn render_square() {
    let mesh = square();
    let out = mesh.to_render_mesh(&Tolerances::default());

    assert_eq!(out.vertex_count(), 6);
    assert_eq!(out.submeshes, [vec![0u32, 1, 2, 3, 4, 5]]);
    assert_eq!(out.positions, [
        p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0),
        p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0),
    ]);
    assert_eq!(out.uvs[4], uv(1.0, 1.0));
    assert!(out.normals.iter().all(|&n| n == Vector3::unit_z()));
    assert_eq!(out.bounds.min(), p(0.0, 0.0, 0.0));
    assert_eq!(out.bounds.max(), p(1.0, 1.0, 0.0));
}

#[test]
fn render_positions_are_exact() {
    let mut mesh = MeshData::new("odd");
    let coords = [0.1f32, 1.0 / 3.0, -7.77e-7, 12345.678, -0.0];
    for (i, &x) in coords.iter().enumerate() {
        mesh.add_vertex(p(x, coords[(i + 1) % 5], coords[(i + 2) % 5]));
    }
    mesh.add_face(Face::from_vertices(&[4, 2, 0, 1, 3], 0).unwrap());

    let out = mesh.to_render_mesh(&Tolerances::default());
    let expected: Vec<_> = mesh.face(0)
        .to_triangle_indices()
        .into_iter()
        .map(|v| mesh.vertex(v).position)
        .collect();
    assert_eq!(out.positions, expected);
}

#[test]
fn render_submeshes_are_dense() {
    let mut mesh = square();
    mesh.add_triangle(0, 1, 2, 2);

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(out.submesh_count(), 3);
    assert_eq!(out.submeshes[0].len(), 6);
    assert!(out.submeshes[1].is_empty());
    assert_eq!(out.submeshes[2], [6, 7, 8]);
}

#[test]
fn render_lines_only_add_submeshes() {
    let mut mesh = square();
    mesh.add_line(0, 2, 4);

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(out.vertex_count(), 6);
    assert_eq!(out.submesh_count(), 5);
    assert_eq!(out.submesh_count(), mesh.submesh_count());
    assert_eq!(out.submeshes[0].len(), 6);
    assert!(out.submeshes[1..].iter().all(|s| s.is_empty()));
}

#[test]
fn render_submesh_count_matches_mesh() {
    let mut mesh = MeshData::new("tri and line");
    mesh.add_vertex(p(0.0, 0.0, 0.0));
    mesh.add_vertex(p(1.0, 0.0, 0.0));
    mesh.add_vertex(p(0.0, 1.0, 0.0));
    mesh.add_triangle(0, 1, 2, 0);
    mesh.add_line(0, 2, 2);

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(mesh.submesh_count(), 3);
    assert_eq!(mesh.triangle_count_by_material(), [1, 0, 0]);
    assert_eq!(out.submesh_count(), 3);
    assert_eq!(out.submeshes, [vec![0u32, 1, 2], vec![], vec![]]);
}

#[test]
fn render_without_faces_has_one_submesh() {
    let mut mesh = MeshData::new("points");
    mesh.add_vertex(p(1.0, 2.0, 3.0));

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(out.submeshes, [Vec::<u32>::new()]);
    assert_eq!(out.vertex_count(), 0);
}

#[test]
fn render_attribute_fallback() {
    let mut mesh = MeshData::new("fallback");
    let a = mesh.add_vertex_with(p(0.0, 0.0, 0.0), uv(0.5, 0.5), Vector3::unit_x());
    let b = mesh.add_vertex(p(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(p(0.0, 1.0, 0.0));
    mesh.add_face(Face::new(vec![
        Corner::new(a, 7, 7),
        Corner::new(b, 0, 0),
        Corner::new(c, 3, 1),
    ], 0).unwrap());

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(out.uvs, [uv(0.5, 0.5), Vector2::zero(), Vector2::zero()]);

    // Some normals exist, so the emitted ones are kept even though two of
    // them are zero.
    assert_eq!(out.normals, [Vector3::unit_x(), Vector3::zero(), Vector3::zero()]);
}

#[test]
fn render_computes_missing_normals() {
    let mut mesh = MeshData::new("no normals");
    let a = mesh.add_vertex(p(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(p(0.0, 0.0, 1.0));
    let c = mesh.add_vertex(p(1.0, 0.0, 0.0));
    let d = mesh.add_vertex(p(5.0, 0.0, 0.0));
    mesh.add_triangle(a, b, c, 0);
    mesh.add_triangle(a, c, d, 1);

    let out = mesh.to_render_mesh(&Tolerances::default());
    assert_eq!(out.normals.len(), 6);
    assert!(out.normals[..3].iter().all(|&n| n == Vector3::unit_y()));
    assert!(out.normals[3..].iter().all(|&n| n == FALLBACK_NORMAL));
    assert!(out.normals.iter().all(|n| !n.is_zero()));
}


// ===========================================================================
// ===== Import
// ===========================================================================

/// Two quads (as four triangles) sharing the edge x = 1. The right quad has
/// its own UV island, so the shared edge is a UV seam.
fn seam_source() -> RenderMesh {
    let mut src = RenderMesh::new();
    src.positions = vec![
        p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0),
        p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(1.0, 1.0, 0.0),
    ];
    src.uvs = vec![
        uv(0.0, 0.0), uv(0.5, 0.0), uv(0.5, 1.0), uv(0.0, 1.0),
        uv(0.6, 0.0), uv(1.0, 0.0), uv(1.0, 1.0), uv(0.6, 1.0),
    ];
    src.normals = vec![Vector3::unit_z(); 8];
    src.submeshes = vec![vec![0, 1, 2, 0, 2, 3], vec![4, 5, 6, 4, 6, 7]];
    src
}

#[test]
fn import_merged_keeps_seams() {
    let mesh = MeshData::from_render_mesh_merged("seam", &seam_source(), &Tolerances::default())
        .unwrap();

    assert_eq!(mesh.name, "seam");
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.used_materials(), [0, 1]);

    // Seam vertices have two UVs but only one normal.
    assert_eq!(mesh.vertex(1).uvs.as_slice(), [uv(0.5, 0.0), uv(0.6, 0.0)]);
    assert_eq!(mesh.vertex(1).normals.len(), 1);
    assert_eq!(mesh.vertex(0).uvs.len(), 1);

    // The right quad's first triangle uses the second UV of the seam vertex.
    assert_eq!(mesh.face(2).corners(), [
        Corner::new(1, 1, 0),
        Corner::new(4, 0, 0),
        Corner::new(5, 0, 0),
    ]);

    // Converting back reproduces the attributes of every corner.
    let out = mesh.to_render_mesh(&Tolerances::default());
    let src = seam_source();
    let expected_uvs: Vec<_> = src.triangles()
        .flat_map(|[a, b, c]| vec![src.uvs[a as usize], src.uvs[b as usize], src.uvs[c as usize]])
        .collect();
    assert_eq!(out.uvs, expected_uvs);
    assert_eq!(out.submesh_count(), 2);
}

#[test]
fn import_merged_hard_edge() {
    let mut src = RenderMesh::new();
    src.positions = vec![
        p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0),
        p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0),
    ];
    src.normals = vec![
        Vector3::unit_z(), Vector3::unit_z(), Vector3::unit_z(),
        Vector3::unit_x(), Vector3::unit_x(), Vector3::unit_x(),
    ];
    src.submeshes = vec![vec![0, 1, 2, 3, 4, 5]];

    let mesh = MeshData::from_render_mesh_merged("hard", &src, &Tolerances::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.vertex(0).normals.as_slice(), [Vector3::unit_z(), Vector3::unit_x()]);
    assert!(mesh.vertex(0).uvs.is_empty());
    assert_eq!(mesh.face(1).corners()[0], Corner::new(0, 0, 1));
}

#[test]
fn import_merged_within_tolerance() {
    let mut src = RenderMesh::new();
    src.positions = vec![
        p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0),
        p(1.000_001, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0),
    ];
    src.submeshes = vec![vec![0, 1, 2, 3, 5, 4]];

    let mesh = MeshData::from_render_mesh_merged("tol", &src, &Tolerances::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face(1).vertex_indices().collect::<Vec<_>>(), [1, 3, 2]);
}

#[test]
fn import_merged_across_rounding_boundary() {
    // 12345.49 and 12345.51 round to different keys.
    let mut src = RenderMesh::new();
    src.positions = vec![p(0.123_454_9, 0.0, 0.0), p(0.123_455_1, 0.0, 0.0)];

    let mesh = MeshData::from_render_mesh_merged("boundary", &src, &Tolerances::default())
        .unwrap();
    assert_eq!(mesh.vertex_count(), 1);
    assert_eq!(mesh.vertex(0).position, p(0.123_454_9, 0.0, 0.0));

    // Neighbors in all directions, but still far apart points stay separate.
    src.positions = vec![
        p(0.123_454_9, -0.000_004_9, 2.0),
        p(0.123_455_1, -0.000_005_1, 2.0),
        p(0.123_475_1, -0.000_005_1, 2.0),
    ];
    let mesh = MeshData::from_render_mesh_merged("boundary", &src, &Tolerances::default())
        .unwrap();
    assert_eq!(mesh.vertex_count(), 2);
}

#[test]
fn import_merged_with_coarse_cells() {
    let tolerances = Tolerances {
        position: 0.05,
        position_decimals: 2,
        ..Tolerances::default()
    };
    let mut src = RenderMesh::new();
    src.positions = vec![p(0.0, 0.0, 0.0), p(0.04, 0.0, 0.0), p(0.2, 0.0, 0.0)];

    let mesh = MeshData::from_render_mesh_merged("coarse", &src, &tolerances).unwrap();
    assert_eq!(mesh.vertex_count(), 2);
}

#[test]
fn import_direct_keeps_every_corner() {
    let src = seam_source();
    let mesh = MeshData::from_render_mesh_direct("direct", &src).unwrap();

    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 4);
    for (v, &pos) in mesh.vertices().iter().zip(&src.positions) {
        assert_eq!(v.position, pos);
        assert_eq!(v.uvs.len(), 1);
        assert_eq!(v.normals.len(), 1);
    }
    assert_eq!(mesh.face(3).vertex_indices().collect::<Vec<_>>(), [4, 6, 7]);
    assert_eq!(mesh.face(3).material(), 1);
}

#[test]
fn import_missing_attributes() {
    let mut src = RenderMesh::new();
    src.positions = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
    src.uvs = vec![uv(0.1, 0.1)];
    src.submeshes = vec![vec![0, 1, 2]];

    let mesh = MeshData::from_render_mesh_direct("partial", &src).unwrap();
    assert_eq!(mesh.vertex(0).uvs.len(), 1);
    assert!(mesh.vertex(1).uvs.is_empty());
    assert!(mesh.vertex(2).normals.is_empty());
}

#[test]
fn import_ignores_incomplete_triangles() {
    let mut src = seam_source();
    src.submeshes[0].push(1);
    src.submeshes[0].push(2);

    let mesh = MeshData::from_render_mesh_merged("trailing", &src, &Tolerances::default())
        .unwrap();
    assert_eq!(mesh.face_count(), 4);
}

#[test]
fn import_index_out_of_range() {
    let mut src = seam_source();
    src.submeshes[1][4] = 8;

    let expected = ImportError::IndexOutOfRange {
        submesh: 1,
        index: 8,
        vertex_count: 8,
    };
    assert_eq!(
        MeshData::from_render_mesh_merged("bad", &src, &Tolerances::default()).unwrap_err(),
        expected,
    );
    assert_eq!(MeshData::from_render_mesh_direct("bad", &src).unwrap_err(), expected);
}

#[test]
fn import_non_finite_positions_are_not_merged() {
    let mut src = RenderMesh::new();
    src.positions = vec![p(std::f32::NAN, 0.0, 0.0), p(std::f32::NAN, 0.0, 0.0)];

    let mesh = MeshData::from_render_mesh_merged("nan", &src, &Tolerances::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 2);
    assert_eq!(mesh.face_count(), 0);
}
