//! Tolerances used when comparing floating point mesh data.

/// All thresholds used to decide whether two positions, UVs or normals are
/// "the same", plus the threshold below which a face normal is considered
/// degenerate.
///
/// These values are only used by operations that merge or deduplicate data
/// (importing in merge mode, `get_or_add_*` on vertices, normal
/// recomputation). Everything else works on exact values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Maximum distance between two positions that are merged into one
    /// vertex. *Default*: `1e-5`.
    pub position: f32,

    /// Number of decimal places positions are rounded to before hashing
    /// them. Candidates in the same and in neighboring rounding cells are
    /// then compared with `position`. This only affects speed, not which
    /// positions are merged, but a cell size much smaller than `position`
    /// means many cells are searched. *Default*: 5.
    pub position_decimals: i32,

    /// Maximum distance between two UVs that are considered equal.
    /// *Default*: `1e-4`.
    pub uv: f32,

    /// Maximum distance between two normals that are considered equal.
    /// *Default*: `1e-3`.
    pub normal: f32,

    /// If the length of the (unnormalized) cross product of a face is below
    /// this value, the face is degenerate and gets the fallback normal.
    /// *Default*: `1e-8`.
    pub degenerate: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            position: 1e-5,
            position_decimals: 5,
            uv: 1e-4,
            normal: 1e-3,
            degenerate: 1e-8,
        }
    }
}

impl Tolerances {
    /// The factor a coordinate is multiplied with before rounding it to get
    /// its hash key.
    pub(crate) fn quantization_scale(&self) -> f64 {
        10f64.powi(self.position_decimals)
    }
}
