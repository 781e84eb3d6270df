use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::config::{RoundConfig, TieBreak};
use crate::cycle_finder;
use crate::error::{GraphBalancingError, Result};
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;
use crate::orientation::Orientation;
use crate::rotate::rotate;

/// Runs the leaf/tree/rotate state machine until `x` is fully integral,
/// producing the induced `Orientation`.
///
/// Terminates in at most `|E| + 1` macro-steps since every rule strictly
/// shrinks the fractional support; exceeding that bound means the LP3 input
/// violated the structural invariant the algorithm relies on, which is a
/// fatal `InvariantViolation` rather than a silent failure to converge.
pub fn round(graph: &Graph, config: &RoundConfig, mut x: FractionalAssignment) -> Result<Orientation> {
    let mut orientation = Orientation::empty(graph);
    sync_orientation(graph, config, &x, &mut orientation)?;

    let max_steps = graph.num_edges() + 1;
    for step in 0..max_steps {
        if x.support_edges(graph, config).is_empty() {
            debug!("round converged after {step} macro-steps");
            return Ok(orientation);
        }

        match find_leaf(graph, config, &x) {
            Some((v, e)) => {
                let u = graph.other_endpoint(e, v);
                let alpha = x.get(graph, e, u) * graph.edge(e).weight;
                let take_leaf_assignment = if (alpha - config.leaf_threshold).abs() < config.eps {
                    config.leaf_tie_break == TieBreak::PreferLeaf
                } else {
                    alpha <= config.leaf_threshold
                };
                if take_leaf_assignment {
                    debug!("R1a: orienting leaf edge {e} towards {v} (alpha={alpha})");
                    x.set(graph, e, v, 1.0);
                } else {
                    debug!("R1b: tree-assigning the big component rooted at leaf {v} (alpha={alpha})");
                    tree_assign(graph, config, &mut x, v, e)?;
                }
            }
            None => {
                let cycle = cycle_finder::find_cycle(graph, config, &x).ok_or_else(|| {
                    GraphBalancingError::InvariantViolation(
                        "no leaf in the fractional support and the cycle finder found no cycle"
                            .into(),
                    )
                })?;
                debug!("R2: rotating a {}-edge cycle", cycle.len());
                rotate(graph, config, &mut x, &cycle)?;
            }
        }

        sync_orientation(graph, config, &x, &mut orientation)?;
    }

    Err(GraphBalancingError::InvariantViolation(format!(
        "round did not terminate within {max_steps} macro-steps"
    )))
}

/// The lowest-id vertex with exactly one incident fractional edge, if any,
/// together with that edge. Scanning by ascending id keeps `Round`
/// deterministic.
fn find_leaf(graph: &Graph, config: &RoundConfig, x: &FractionalAssignment) -> Option<(usize, usize)> {
    for v in 0..graph.num_vertices() {
        let incident = x.incident_fractional(graph, config, v);
        if incident.len() == 1 {
            return Some((v, incident[0]));
        }
    }
    None
}

/// R1b: BFS outward from leaf `v` over the big-support component
/// containing `leaf_edge`, orienting every discovered edge from parent to
/// child. `alpha > leaf_threshold` forces `leaf_edge` to be big (a small
/// edge has `alpha <= weight <= big_threshold < leaf_threshold`), so the
/// component is well-defined.
fn tree_assign(
    graph: &Graph,
    config: &RoundConfig,
    x: &mut FractionalAssignment,
    v: usize,
    leaf_edge: usize,
) -> Result<()> {
    if graph.edge(leaf_edge).weight <= config.big_threshold {
        return Err(GraphBalancingError::InvariantViolation(format!(
            "R1b was entered for edge {leaf_edge}, but it is not a big edge"
        )));
    }

    let mut visited = HashSet::new();
    visited.insert(v);
    let mut queue = VecDeque::new();
    queue.push_back(v);

    while let Some(parent) = queue.pop_front() {
        let mut children: Vec<(usize, usize)> = x
            .incident_fractional(graph, config, parent)
            .into_iter()
            .filter(|&e| graph.edge(e).weight > config.big_threshold)
            .map(|e| (graph.other_endpoint(e, parent), e))
            .filter(|(child, _)| !visited.contains(child))
            .collect();
        children.sort_by_key(|&(child, edge)| (child, edge));

        for (child, edge) in children {
            if !visited.insert(child) {
                continue;
            }
            x.set(graph, edge, child, 1.0);
            queue.push_back(child);
        }
    }

    if x.is_integral(config, leaf_edge) {
        Ok(())
    } else {
        Err(GraphBalancingError::InvariantViolation(format!(
            "tree assignment from leaf {v} never reached its own leaf edge {leaf_edge}"
        )))
    }
}

/// Picks up any edge that became integral (via `R1a`, `R1b`, or a `rotate`)
/// and records it in `orientation`, so the orientation stays in sync with
/// `x` after every macro-step without the branches above having to do it
/// themselves.
fn sync_orientation(
    graph: &Graph,
    config: &RoundConfig,
    x: &FractionalAssignment,
    orientation: &mut Orientation,
) -> Result<()> {
    for edge in graph.edges() {
        if orientation.get(edge.id).is_some() {
            continue;
        }
        if x.is_integral(config, edge.id) {
            let winner = if x.get(graph, edge.id, edge.low()) > 0.5 {
                edge.low()
            } else {
                edge.high()
            };
            orientation.set(graph, edge.id, winner)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path5() -> Graph {
        Graph::new(
            (0..5).map(|i| i.to_string()).collect(),
            vec![0.0; 5],
            vec![(0, 1, 0.4), (1, 2, 0.4), (2, 3, 0.4), (3, 4, 0.4)],
        )
        .unwrap()
    }

    #[test]
    fn round_trip_on_already_integral_input() {
        let g = path5();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![1.0, 0.0, 1.0, 0.0]);
        let orientation = round(&g, &config, x).unwrap();
        assert!(orientation.is_total());
        assert_eq!(orientation.get(0), Some(0));
        assert_eq!(orientation.get(1), Some(2));
        assert_eq!(orientation.get(2), Some(2));
        assert_eq!(orientation.get(3), Some(4));
    }

    #[test]
    fn path_uses_only_leaf_assignments() {
        // Every vertex load <= 0.8, purely via R1a.
        let g = path5();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5, 0.5]);
        let orientation = round(&g, &config, x).unwrap();
        assert!(orientation.is_total());
        for v in 0..5 {
            assert!(orientation.load(&g, v) <= 0.8 + 1e-9);
        }
    }

    #[test]
    fn triangle_uses_rotation_then_leaf_steps() {
        // Triangle, all edges big, all split 1/2-1/2.
        let g = Graph::new(
            vec!["0".into(), "1".into(), "2".into()],
            vec![0.0, 0.0, 0.0],
            vec![(0, 1, 0.6), (1, 2, 0.6), (2, 0, 0.6)],
        )
        .unwrap();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5]);
        let orientation = round(&g, &config, x).unwrap();
        assert!(orientation.is_total());
        assert!(orientation.makespan(&g) <= 1.2 + 1e-9);
    }
}
