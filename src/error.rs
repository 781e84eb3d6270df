use std::fmt;

/// Error surface for the graph-balancing core.
///
/// `Infeasible` is not really an error from the caller's point of view: the
/// decision/optimization layers turn it into `Ok(None)` rather than
/// bubbling it up. Everything else is a genuine failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphBalancingError {
    /// Raised by the `Graph` constructor: a self-loop, an out-of-range
    /// endpoint, or a negative weight/dedicated load.
    InvalidInput(String),
    /// LP3 has no feasible solution at the requested target.
    Infeasible,
    /// The LP backend returned something other than a solution or a clean
    /// infeasibility proof (timeout, numerical breakdown, missing backend).
    SolverError(String),
    /// Rotate or Round observed a state that LP3 feasibility should make
    /// impossible. Always a bug in this crate or in the LP output, never a
    /// user-facing condition.
    InvariantViolation(String),
}

impl fmt::Display for GraphBalancingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphBalancingError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            GraphBalancingError::Infeasible => write!(f, "LP3 is infeasible at the given target"),
            GraphBalancingError::SolverError(msg) => write!(f, "LP solver error: {msg}"),
            GraphBalancingError::InvariantViolation(msg) => {
                write!(f, "invariant violation: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphBalancingError {}

pub type Result<T> = std::result::Result<T, GraphBalancingError>;
