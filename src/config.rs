/// Which rule wins when a leaf's `alpha` lands exactly on `leaf_threshold`.
///
/// Either R1a or R1b is theoretically admissible at the boundary; this is a
/// tie-break, not a correctness requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Take R1a (leaf assignment) on exact ties. Default.
    PreferLeaf,
    /// Take R1b (tree assignment) on exact ties.
    PreferTree,
}

/// Tunables for the rounding algorithm, passed explicitly rather than kept
/// as global state.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    /// Equality tolerance for the 0/1 clamp and edge-constraint checks.
    pub eps: f64,
    /// Edges with weight above this are "big". Fixed by the algorithm at 0.5.
    pub big_threshold: f64,
    /// R1 leaf/tree split point. Fixed by the algorithm at 0.75.
    pub leaf_threshold: f64,
    /// Guaranteed approximation ratio. Fixed by the algorithm at 1.75.
    pub approx_ratio: f64,
    /// Relative convergence tolerance for the outer binary search.
    pub binary_search_tol: f64,
    pub leaf_tie_break: TieBreak,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            eps: 1e-9,
            big_threshold: 0.5,
            leaf_threshold: 0.75,
            approx_ratio: 1.75,
            binary_search_tol: 1e-6,
            leaf_tie_break: TieBreak::PreferLeaf,
        }
    }
}
