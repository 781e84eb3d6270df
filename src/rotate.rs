use log::debug;

use crate::config::RoundConfig;
use crate::error::{GraphBalancingError, Result};
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;

/// One step of a directed cycle through the fractional support: travel edge
/// `edge` from `tail` to `head`. Parallel edges make "the edge between
/// these two vertices" ambiguous, so the tail is carried explicitly rather
/// than just a vertex sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleStep {
    pub edge: usize,
    pub tail: usize,
    pub head: usize,
}

/// Applies the Rotate primitive to `x` along the directed cycle `cycle`.
/// Shifts `delta = min_i x_{e_i,tail_i} * weight(e_i)` worth of fractional
/// weight around the cycle, preserving every edge constraint and each
/// vertex's fractional load, and driving at least one edge to integral.
pub fn rotate(
    graph: &Graph,
    config: &RoundConfig,
    x: &mut FractionalAssignment,
    cycle: &[CycleStep],
) -> Result<()> {
    if cycle.len() < 2 {
        return Err(GraphBalancingError::InvariantViolation(format!(
            "cycle must have at least 2 edges, got {}",
            cycle.len()
        )));
    }
    for (i, step) in cycle.iter().enumerate() {
        let next = cycle[(i + 1) % cycle.len()];
        if step.head != next.tail {
            return Err(GraphBalancingError::InvariantViolation(format!(
                "cycle is not well-formed: edge {} heads to {} but edge {} tails from {}",
                step.edge, step.head, next.edge, next.tail
            )));
        }
        let edge = graph.edge(step.edge);
        if !edge.has_endpoint(step.tail) || !edge.has_endpoint(step.head) || step.tail == step.head
        {
            return Err(GraphBalancingError::InvariantViolation(format!(
                "cycle step references edge {} inconsistently with tail={}, head={}",
                step.edge, step.tail, step.head
            )));
        }
        if x.is_integral(config, step.edge) {
            return Err(GraphBalancingError::InvariantViolation(format!(
                "edge {} in the cycle is not in the fractional support",
                step.edge
            )));
        }
    }

    let delta = cycle
        .iter()
        .map(|step| x.get(graph, step.edge, step.tail) * graph.edge(step.edge).weight)
        .fold(f64::INFINITY, f64::min);

    if !(delta > 0.0) {
        return Err(GraphBalancingError::InvariantViolation(format!(
            "rotate computed a non-positive delta ({delta}); cycle edges are not all fractional at their tail"
        )));
    }

    for step in cycle {
        let weight = graph.edge(step.edge).weight;
        let shift = delta / weight;
        let tail_value = x.get(graph, step.edge, step.tail) - shift;
        let head_value = x.get(graph, step.edge, step.head) + shift;
        if tail_value < -1e-9 || head_value < -1e-9 {
            return Err(GraphBalancingError::InvariantViolation(format!(
                "rotate produced a negative value on edge {} (tail={tail_value}, head={head_value})",
                step.edge
            )));
        }
        x.set(graph, step.edge, step.tail, tail_value.max(0.0));
    }

    debug!("rotated cycle of {} edges by delta={delta}", cycle.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(weight: f64) -> Graph {
        Graph::new(
            vec!["0".into(), "1".into(), "2".into()],
            vec![0.0, 0.0, 0.0],
            vec![(0, 1, weight), (1, 2, weight), (2, 0, weight)],
        )
        .unwrap()
    }

    #[test]
    fn rotate_drives_one_edge_to_zero_and_preserves_fractional_load() {
        let g = triangle(0.6);
        let config = RoundConfig::default();
        let mut x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5]);
        let cycle = vec![
            CycleStep {
                edge: 0,
                tail: 0,
                head: 1,
            },
            CycleStep {
                edge: 1,
                tail: 1,
                head: 2,
            },
            CycleStep {
                edge: 2,
                tail: 2,
                head: 0,
            },
        ];

        let fractional_load = |x: &FractionalAssignment, v: usize| -> f64 {
            g.incident_edges(v)
                .iter()
                .map(|&e| x.get(&g, e, v) * g.edge(e).weight)
                .sum()
        };
        let before: Vec<f64> = (0..3).map(|v| fractional_load(&x, v)).collect();

        rotate(&g, &config, &mut x, &cycle).unwrap();

        assert!((0..3).any(|e| x.is_integral(&config, e)));

        for v in 0..3 {
            assert!(
                (before[v] - fractional_load(&x, v)).abs() < 1e-9,
                "vertex {v} fractional load changed"
            );
        }
    }

    #[test]
    fn rotate_rejects_malformed_cycle() {
        let g = triangle(0.6);
        let config = RoundConfig::default();
        let mut x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5]);
        let cycle = vec![
            CycleStep {
                edge: 0,
                tail: 0,
                head: 1,
            },
            CycleStep {
                edge: 1,
                tail: 2,
                head: 0,
            },
        ];
        let err = rotate(&g, &config, &mut x, &cycle).unwrap_err();
        assert!(matches!(err, GraphBalancingError::InvariantViolation(_)));
    }
}
