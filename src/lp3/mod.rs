//! The LP3 relaxation: formulation as plain data, plus the solve entry
//! point. `Round`/`balance` only ever see [`solve_lp3`]; the concrete
//! solver backends live in [`adapter`] and are never named outside it.

pub mod adapter;

use std::collections::HashMap;

use crate::config::RoundConfig;
use crate::error::{GraphBalancingError, Result};
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;

/// A single LP3 variable: the fraction of `edge` assigned to `vertex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lp3Var {
    pub edge: usize,
    pub vertex: usize,
}

/// One constraint of the LP3 system, kept as data so `adapter` can translate
/// it into whatever shape a concrete backend wants without the rest of the
/// core caring how.
#[derive(Clone, Debug)]
pub enum Lp3Constraint {
    /// `x_eu + x_ev == 1`
    EdgeSum { edge: usize, u: usize, v: usize },
    /// `q_v + sum_e x_ev * p_e <= 1`
    Load {
        vertex: usize,
        terms: Vec<(Lp3Var, f64)>,
        dedicated_load: f64,
    },
    /// `sum_{e in E_B incident to v} x_ev <= 1`
    Star { vertex: usize, vars: Vec<Lp3Var> },
}

/// The LP3 formulation for a graph already scaled so the target makespan is
/// 1 (see `Graph::scaled`).
#[derive(Clone, Debug)]
pub struct Lp3Problem {
    pub variables: Vec<Lp3Var>,
    pub constraints: Vec<Lp3Constraint>,
}

/// Builds the LP3 constraint system for `graph`, which the caller is
/// expected to have already scaled by the target makespan.
pub fn build_problem(graph: &Graph, config: &RoundConfig) -> Lp3Problem {
    let mut variables = Vec::with_capacity(graph.num_edges() * 2);
    let mut constraints = Vec::with_capacity(graph.num_edges() + 2 * graph.num_vertices());

    for edge in graph.edges() {
        variables.push(Lp3Var {
            edge: edge.id,
            vertex: edge.u,
        });
        variables.push(Lp3Var {
            edge: edge.id,
            vertex: edge.v,
        });
        constraints.push(Lp3Constraint::EdgeSum {
            edge: edge.id,
            u: edge.u,
            v: edge.v,
        });
    }

    for v in 0..graph.num_vertices() {
        let terms = graph
            .incident_edges(v)
            .iter()
            .map(|&e| (Lp3Var { edge: e, vertex: v }, graph.edge(e).weight))
            .collect();
        constraints.push(Lp3Constraint::Load {
            vertex: v,
            terms,
            dedicated_load: graph.vertex(v).dedicated_load,
        });

        let star_vars: Vec<Lp3Var> = graph
            .incident_edges(v)
            .iter()
            .copied()
            .filter(|&e| graph.edge(e).weight > config.big_threshold)
            .map(|e| Lp3Var { edge: e, vertex: v })
            .collect();
        if !star_vars.is_empty() {
            constraints.push(Lp3Constraint::Star {
                vertex: v,
                vars: star_vars,
            });
        }
    }

    Lp3Problem {
        variables,
        constraints,
    }
}

/// What a backend reports when it does not return a usable solution.
#[derive(Debug, Clone)]
pub enum Lp3Outcome {
    Infeasible,
    Error(String),
}

/// A pluggable LP3 solver. Implemented only by the `good_lp`-backed types in
/// [`adapter`]; `Round` and `balance` never depend on this trait directly,
/// only on [`solve_lp3`].
pub trait Lp3Backend {
    fn name(&self) -> &'static str;
    fn solve(&self, problem: &Lp3Problem) -> std::result::Result<HashMap<(usize, usize), f64>, Lp3Outcome>;
}

/// Solves LP3 for `graph` at the given `target` makespan (scaling weights
/// and dedicated loads by `1 / target` first), trying backends from
/// [`adapter::backend_priority_list`] in order. The first backend to return
/// a solution wins; a definitive `Infeasible` answer is returned
/// immediately (retrying another backend cannot turn a true infeasibility
/// into a feasibility), while a backend-level error falls through to the
/// next backend in the list.
///
/// Returns the scaled graph alongside the assignment: `Round` reads its
/// big-edge/leaf thresholds against the same weights LP3 solved on, so
/// callers must keep solving and rounding on the same graph rather than
/// switching back to the original one in between.
pub fn solve_lp3(graph: &Graph, target: f64, config: &RoundConfig) -> Result<(Graph, FractionalAssignment)> {
    let scaled = graph.scaled(target);
    let problem = build_problem(&scaled, config);

    let mut last_error: Option<String> = None;
    for backend in adapter::backend_priority_list() {
        match backend.solve(&problem) {
            Ok(raw) => {
                let assignment = FractionalAssignment::from_lp_values(&scaled, config, &raw)?;
                return Ok((scaled, assignment));
            }
            Err(Lp3Outcome::Infeasible) => return Err(GraphBalancingError::Infeasible),
            Err(Lp3Outcome::Error(msg)) => {
                last_error = Some(format!("{}: {msg}", backend.name()));
            }
        }
    }

    Err(GraphBalancingError::SolverError(
        last_error.unwrap_or_else(|| "no LP3 backend is available".into()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_problem_emits_edge_load_and_star_constraints() {
        let g = Graph::new(
            vec!["0".into(), "1".into()],
            vec![0.0, 0.0],
            vec![(0, 1, 0.6)],
        )
        .unwrap();
        let config = RoundConfig::default();
        let problem = build_problem(&g, &config);
        assert_eq!(problem.variables.len(), 2);
        let edge_sums = problem
            .constraints
            .iter()
            .filter(|c| matches!(c, Lp3Constraint::EdgeSum { .. }))
            .count();
        let stars = problem
            .constraints
            .iter()
            .filter(|c| matches!(c, Lp3Constraint::Star { .. }))
            .count();
        assert_eq!(edge_sums, 1);
        // Both endpoints see the big edge in their star constraint.
        assert_eq!(stars, 2);
    }
}
