use std::collections::HashMap;

use log::debug;

use crate::config::RoundConfig;
use crate::fractional::FractionalAssignment;
use crate::graph::Graph;
use crate::rotate::CycleStep;

/// Finds a directed cycle in the fractional support `G_x`. For each edge
/// used, the tail is the vertex the walk is leaving, matching `rotate`'s
/// convention.
///
/// Starts from the lowest-id vertex with a fractional edge and extends a
/// walk, preferring big edges at each step (ties broken by smallest edge
/// id), until a vertex repeats.
pub fn find_cycle(
    graph: &Graph,
    config: &RoundConfig,
    x: &FractionalAssignment,
) -> Option<Vec<CycleStep>> {
    let start = (0..graph.num_vertices())
        .find(|&v| !x.incident_fractional(graph, config, v).is_empty())?;

    let mut path = vec![start];
    let mut position = HashMap::new();
    position.insert(start, 0usize);
    let mut edges_used = Vec::new();
    let mut last_edge: Option<usize> = None;
    let mut cur = start;

    loop {
        let mut candidates: Vec<usize> = x
            .incident_fractional(graph, config, cur)
            .into_iter()
            .filter(|&e| Some(e) != last_edge)
            .collect();
        if candidates.is_empty() {
            debug!("cycle finder stuck at vertex {cur}: no onward fractional edge");
            return None;
        }
        // Big edges first, then smallest edge id as the deterministic tie-break.
        candidates.sort_by_key(|&e| (graph.edge(e).weight <= config.big_threshold, e));
        let chosen = candidates[0];
        let next = graph.other_endpoint(chosen, cur);
        edges_used.push(chosen);

        if let Some(&idx) = position.get(&next) {
            let cycle_vertices = &path[idx..];
            let cycle_edges = &edges_used[idx..];
            let mut steps = Vec::with_capacity(cycle_edges.len());
            for (i, &e) in cycle_edges.iter().enumerate() {
                let tail = cycle_vertices[i];
                let head = cycle_vertices.get(i + 1).copied().unwrap_or(next);
                steps.push(CycleStep {
                    edge: e,
                    tail,
                    head,
                });
            }
            debug!("cycle finder found a cycle of {} edges", steps.len());
            return Some(steps);
        }

        position.insert(next, path.len());
        path.push(next);
        last_edge = Some(chosen);
        cur = next;

        if path.len() > graph.num_edges() + 1 {
            // The LP3 structural invariant guarantees this cannot happen;
            // bail out rather than loop forever if it somehow does.
            debug!("cycle finder exceeded |E_x| steps without closing a cycle");
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractional::FractionalAssignment;

    #[test]
    fn finds_triangle_cycle() {
        let g = Graph::new(
            vec!["0".into(), "1".into(), "2".into()],
            vec![0.0, 0.0, 0.0],
            vec![(0, 1, 0.6), (1, 2, 0.6), (2, 0, 0.6)],
        )
        .unwrap();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5]);
        let cycle = find_cycle(&g, &config, &x).unwrap();
        assert_eq!(cycle.len(), 3);
        for i in 0..cycle.len() {
            let next = cycle[(i + 1) % cycle.len()];
            assert_eq!(cycle[i].head, next.tail);
        }
    }

    #[test]
    fn prefers_big_edges() {
        // 0-1 small, 1-2 small, 2-0 big, plus a big chord 0-1 so the walk
        // from 0 has a choice at the first step.
        let g = Graph::new(
            vec!["0".into(), "1".into(), "2".into()],
            vec![0.0, 0.0, 0.0],
            vec![
                (0, 1, 0.3),  // edge 0, small
                (0, 1, 0.55), // edge 1, big
                (1, 2, 0.3),  // edge 2, small
                (2, 0, 0.3),  // edge 3, small
            ],
        )
        .unwrap();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![0.5, 0.5, 0.5, 0.5]);
        let cycle = find_cycle(&g, &config, &x).unwrap();
        assert_eq!(cycle[0].edge, 1, "should prefer the big edge out of vertex 0");
    }

    #[test]
    fn returns_none_without_any_fractional_edge() {
        let g = Graph::new(
            vec!["0".into(), "1".into()],
            vec![0.0, 0.0],
            vec![(0, 1, 0.5)],
        )
        .unwrap();
        let config = RoundConfig::default();
        let x = FractionalAssignment::from_low_values(vec![1.0]);
        assert!(find_cycle(&g, &config, &x).is_none());
    }
}
