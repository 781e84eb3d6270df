use log::debug;

use crate::error::{GraphBalancingError, Result};

/// A vertex: a stable name plus its dedicated load `q_v`.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: usize,
    pub name: String,
    pub dedicated_load: f64,
}

/// An edge, identified by index rather than by its endpoint pair. Parallel
/// edges between the same two vertices are legal and distinct.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: usize,
    pub u: usize,
    pub v: usize,
    pub weight: f64,
}

impl Edge {
    pub fn endpoints(&self) -> (usize, usize) {
        (self.u, self.v)
    }

    pub fn has_endpoint(&self, v: usize) -> bool {
        self.u == v || self.v == v
    }

    /// The endpoint with the smaller id. Used by `FractionalAssignment` to
    /// pick a canonical storage side for each edge.
    pub fn low(&self) -> usize {
        self.u.min(self.v)
    }

    pub fn high(&self) -> usize {
        self.u.max(self.v)
    }
}

/// An immutable weighted multigraph with per-vertex dedicated loads.
///
/// Built once by `Graph::new` (or by `graph_parser`) and shared by reference
/// for the rest of the algorithm; nothing after construction mutates it.
#[derive(Clone, Debug)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    incidence: Vec<Vec<usize>>,
}

impl Graph {
    /// Builds a graph from vertex names/loads and `(u, v, weight)` edge
    /// triples, where `u`/`v` are indices into `names`/`loads`.
    ///
    /// Rejects self-loops, out-of-range endpoints, negative weights, and
    /// negative dedicated loads as `InvalidInput`.
    pub fn new(
        names: Vec<String>,
        loads: Vec<f64>,
        raw_edges: Vec<(usize, usize, f64)>,
    ) -> Result<Self> {
        if names.len() != loads.len() {
            return Err(GraphBalancingError::InvalidInput(
                "the number of vertex names and dedicated loads must match".into(),
            ));
        }
        let n = names.len();
        let mut vertices = Vec::with_capacity(n);
        for (id, (name, dedicated_load)) in names.into_iter().zip(loads).enumerate() {
            if dedicated_load < 0.0 || !dedicated_load.is_finite() {
                return Err(GraphBalancingError::InvalidInput(format!(
                    "dedicated load of vertex '{name}' must be finite and non-negative, got {dedicated_load}"
                )));
            }
            vertices.push(Vertex {
                id,
                name,
                dedicated_load,
            });
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        let mut incidence: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (id, (u, v, weight)) in raw_edges.into_iter().enumerate() {
            if u >= n || v >= n {
                return Err(GraphBalancingError::InvalidInput(format!(
                    "edge {id} references endpoint outside of the vertex set (u={u}, v={v}, n={n})"
                )));
            }
            if u == v {
                return Err(GraphBalancingError::InvalidInput(format!(
                    "edge {id} is a self-loop at vertex {u}; self-loops are not supported"
                )));
            }
            if weight <= 0.0 || !weight.is_finite() {
                return Err(GraphBalancingError::InvalidInput(format!(
                    "edge {id} weight must be finite and positive, got {weight}"
                )));
            }
            edges.push(Edge { id, u, v, weight });
            incidence[u].push(id);
            incidence[v].push(id);
        }

        let g = Graph {
            vertices,
            edges,
            incidence,
        };
        debug!(
            "built graph with {} vertices and {} edges",
            g.vertices.len(),
            g.edges.len()
        );
        Ok(g)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, v: usize) -> &Vertex {
        &self.vertices[v]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge(&self, e: usize) -> &Edge {
        &self.edges[e]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge ids incident to `v`, in insertion order.
    pub fn incident_edges(&self, v: usize) -> &[usize] {
        &self.incidence[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.incidence[v].len()
    }

    /// The endpoint of `e` other than `v`. Panics if `v` is not an endpoint
    /// of `e`; that is a caller error, not a data condition.
    pub fn other_endpoint(&self, e: usize, v: usize) -> usize {
        let edge = self.edge(e);
        if edge.u == v {
            edge.v
        } else if edge.v == v {
            edge.u
        } else {
            panic!("vertex {v} is not an endpoint of edge {e}");
        }
    }

    /// Scales every edge weight and dedicated load by `1.0 / target`,
    /// the transform LP3 is solved under for a given target makespan.
    pub fn scaled(&self, target: f64) -> Graph {
        Graph {
            vertices: self
                .vertices
                .iter()
                .map(|v| Vertex {
                    id: v.id,
                    name: v.name.clone(),
                    dedicated_load: v.dedicated_load / target,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| Edge {
                    id: e.id,
                    u: e.u,
                    v: e.v,
                    weight: e.weight / target,
                })
                .collect(),
            incidence: self.incidence.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_loop() {
        let err = Graph::new(
            vec!["a".into(), "b".into()],
            vec![0.0, 0.0],
            vec![(0, 0, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, GraphBalancingError::InvalidInput(_)));
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let err = Graph::new(vec!["a".into()], vec![0.0], vec![(0, 1, 1.0)]).unwrap_err();
        assert!(matches!(err, GraphBalancingError::InvalidInput(_)));
    }

    #[test]
    fn rejects_negative_weight() {
        let err = Graph::new(
            vec!["a".into(), "b".into()],
            vec![0.0, 0.0],
            vec![(0, 1, -1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, GraphBalancingError::InvalidInput(_)));
    }

    #[test]
    fn incidence_is_populated_for_both_endpoints() {
        let g = Graph::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![0.0, 0.0, 0.0],
            vec![(0, 1, 0.5), (1, 2, 0.4)],
        )
        .unwrap();
        assert_eq!(g.incident_edges(1), &[0, 1]);
        assert_eq!(g.other_endpoint(0, 1), 0);
        assert_eq!(g.other_endpoint(1, 1), 2);
    }
}
