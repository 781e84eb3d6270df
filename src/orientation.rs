use crate::error::{GraphBalancingError, Result};
use crate::graph::Graph;

/// A (possibly partial) map from edge id to the endpoint it is oriented
/// towards. `Round` builds one of these incrementally; `lp_balance` only
/// ever hands a total one back to its caller.
#[derive(Clone, Debug)]
pub struct Orientation {
    assigned: Vec<Option<usize>>,
}

impl Orientation {
    pub fn empty(graph: &Graph) -> Self {
        Orientation {
            assigned: vec![None; graph.num_edges()],
        }
    }

    /// Orients edge `e` towards `v`. Fails if `v` is not an endpoint of `e`.
    pub fn set(&mut self, graph: &Graph, e: usize, v: usize) -> Result<()> {
        let edge = graph.edge(e);
        if !edge.has_endpoint(v) {
            return Err(GraphBalancingError::InvariantViolation(format!(
                "cannot orient edge {e} towards {v}: not one of its endpoints ({}, {})",
                edge.u, edge.v
            )));
        }
        self.assigned[e] = Some(v);
        Ok(())
    }

    pub fn get(&self, e: usize) -> Option<usize> {
        self.assigned[e]
    }

    pub fn is_total(&self) -> bool {
        self.assigned.iter().all(|a| a.is_some())
    }

    /// Load at `v`: its dedicated load plus the weight of every edge
    /// currently oriented into it. Edges not yet decided contribute
    /// nothing; a caller that needs the fractional contribution too adds
    /// it separately.
    pub fn load(&self, graph: &Graph, v: usize) -> f64 {
        let mut total = graph.vertex(v).dedicated_load;
        for &e in graph.incident_edges(v) {
            if self.assigned[e] == Some(v) {
                total += graph.edge(e).weight;
            }
        }
        total
    }

    /// Maximum load over all vertices. Meaningful once `is_total()` holds.
    pub fn makespan(&self, graph: &Graph) -> f64 {
        (0..graph.num_vertices())
            .map(|v| self.load(graph, v))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::new(
            vec!["0".into(), "1".into(), "2".into()],
            vec![0.0, 0.0, 0.0],
            vec![(0, 1, 0.6), (1, 2, 0.6), (2, 0, 0.6)],
        )
        .unwrap()
    }

    #[test]
    fn set_rejects_non_endpoint() {
        let g = triangle();
        let mut o = Orientation::empty(&g);
        let err = o.set(&g, 0, 2).unwrap_err();
        assert!(matches!(err, GraphBalancingError::InvariantViolation(_)));
    }

    #[test]
    fn makespan_sums_incoming_edges() {
        let g = triangle();
        let mut o = Orientation::empty(&g);
        o.set(&g, 0, 1).unwrap();
        o.set(&g, 1, 2).unwrap();
        o.set(&g, 2, 2).unwrap();
        assert!(o.is_total());
        assert_eq!(o.load(&g, 2), 1.2);
        assert_eq!(o.makespan(&g), 1.2);
    }
}
