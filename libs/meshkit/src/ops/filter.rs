//! # Triangle Range Filter
//!
//! Selects whole triangles by where their vertex indices fall relative to
//! an inclusive index range. Triangles are never split.

use serde::{Deserialize, Serialize};

/// Which triangles [`find_triangles`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangleSearch {
    /// All three indices inside the range.
    All,
    /// At least one index inside the range.
    Any,
    /// No index inside the range.
    None,
}

impl TriangleSearch {
    fn accepts(self, inside: usize) -> bool {
        match self {
            Self::All => inside == 3,
            Self::Any => inside > 0,
            Self::None => inside == 0,
        }
    }
}

/// Returns the triangles (as a flat index list) matching `search` against
/// the inclusive range `[lo, hi]`.
///
/// A trailing group of fewer than three indices is ignored. `lo > hi` is an
/// empty range.
///
/// # Example
///
/// ```rust
/// use meshkit::ops::filter::{find_triangles, TriangleSearch};
///
/// let tris = [0, 1, 2, 2, 3, 4, 5, 6, 7];
/// assert_eq!(find_triangles(&tris, 0, 3, TriangleSearch::All), vec![0, 1, 2]);
/// assert_eq!(find_triangles(&tris, 0, 3, TriangleSearch::Any), vec![0, 1, 2, 2, 3, 4]);
/// assert_eq!(find_triangles(&tris, 0, 3, TriangleSearch::None), vec![5, 6, 7]);
/// ```
pub fn find_triangles(triangles: &[u32], lo: u32, hi: u32, search: TriangleSearch) -> Vec<u32> {
    let in_range = |i: u32| lo <= i && i <= hi;
    triangles
        .chunks_exact(3)
        .filter(|tri| search.accepts(tri.iter().filter(|&&i| in_range(i)).count()))
        .flatten()
        .copied()
        .collect()
}
