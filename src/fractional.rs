use std::collections::HashMap;

use crate::config::RoundConfig;
use crate::error::{GraphBalancingError, Result};
use crate::graph::Graph;
use crate::orientation::Orientation;

/// The fractional LP3 assignment `x`, one `f64` per edge.
///
/// Only the value at the lower-indexed endpoint is stored; the other side
/// is always `1.0 - stored`, so the edge constraint `x_eu + x_ev = 1` holds
/// by construction instead of needing to be reverified after every
/// mutation.
#[derive(Clone, Debug)]
pub struct FractionalAssignment {
    x_low: Vec<f64>,
}

impl FractionalAssignment {
    /// Builds an assignment directly from already-clamped-and-normalized
    /// per-edge values at the low endpoint. Used internally and by tests
    /// that want to set up a support graph by hand.
    pub fn from_low_values(x_low: Vec<f64>) -> Self {
        FractionalAssignment { x_low }
    }

    /// Builds an assignment from raw LP solver output, one value per
    /// `(edge, endpoint)` pair. Numerical policy: clamp each value into
    /// `[0, 1]`, then rescale the pair to sum to exactly 1. A pair whose raw
    /// sum is off by more than `1e-6` is a structural violation, not noise,
    /// and is rejected.
    pub fn from_lp_values(
        graph: &Graph,
        config: &RoundConfig,
        raw: &HashMap<(usize, usize), f64>,
    ) -> Result<Self> {
        let mut x_low = Vec::with_capacity(graph.num_edges());
        for edge in graph.edges() {
            let low = edge.low();
            let high = edge.high();
            let raw_low = *raw.get(&(edge.id, low)).ok_or_else(|| {
                GraphBalancingError::InvariantViolation(format!(
                    "LP solution is missing variable x_{}_{}",
                    edge.id, low
                ))
            })?;
            let raw_high = *raw.get(&(edge.id, high)).ok_or_else(|| {
                GraphBalancingError::InvariantViolation(format!(
                    "LP solution is missing variable x_{}_{}",
                    edge.id, high
                ))
            })?;
            let clamped_low = raw_low.clamp(0.0, 1.0);
            let clamped_high = raw_high.clamp(0.0, 1.0);
            let sum = clamped_low + clamped_high;
            if (sum - 1.0).abs() > 1e-6 {
                return Err(GraphBalancingError::InvariantViolation(format!(
                    "edge {} constraint violated after clamping: x_low={clamped_low}, x_high={clamped_high}, sum={sum}",
                    edge.id
                )));
            }
            let mut normalized = clamped_low / sum;
            if normalized < config.eps {
                normalized = 0.0;
            } else if normalized > 1.0 - config.eps {
                normalized = 1.0;
            }
            x_low.push(normalized);
        }
        Ok(FractionalAssignment { x_low })
    }

    /// `x_ev`, the fraction of edge `e` currently assigned to `v`.
    pub fn get(&self, graph: &Graph, e: usize, v: usize) -> f64 {
        let edge = graph.edge(e);
        if v == edge.low() {
            self.x_low[e]
        } else {
            debug_assert_eq!(v, edge.high());
            1.0 - self.x_low[e]
        }
    }

    /// Sets `x_ev := value` (clamped into `[0, 1]`); the companion
    /// `x_e,other` becomes `1.0 - value` automatically.
    pub fn set(&mut self, graph: &Graph, e: usize, v: usize, value: f64) {
        let edge = graph.edge(e);
        let clamped = value.clamp(0.0, 1.0);
        self.x_low[e] = if v == edge.low() {
            clamped
        } else {
            debug_assert_eq!(v, edge.high());
            1.0 - clamped
        };
    }

    /// Whether edge `e` is fully decided (one side is 0, the other 1).
    pub fn is_integral(&self, config: &RoundConfig, e: usize) -> bool {
        self.x_low[e] < config.eps || self.x_low[e] > 1.0 - config.eps
    }

    /// `E_x`: edges strictly split between both endpoints.
    pub fn support_edges(&self, graph: &Graph, config: &RoundConfig) -> Vec<usize> {
        (0..graph.num_edges())
            .filter(|&e| !self.is_integral(config, e))
            .collect()
    }

    /// `E_x ∩ E_B`: fractional edges whose weight exceeds `big_threshold`.
    pub fn big_support_edges(&self, graph: &Graph, config: &RoundConfig) -> Vec<usize> {
        self.support_edges(graph, config)
            .into_iter()
            .filter(|&e| graph.edge(e).weight > config.big_threshold)
            .collect()
    }

    /// Fractional edges incident to `v`, i.e. `v`'s neighbors in `G_x`.
    pub fn incident_fractional(&self, graph: &Graph, config: &RoundConfig, v: usize) -> Vec<usize> {
        graph
            .incident_edges(v)
            .iter()
            .copied()
            .filter(|&e| !self.is_integral(config, e))
            .collect()
    }

    /// Converts a fully integral assignment into an `Orientation`. Returns
    /// `None` if any edge is still fractional.
    pub fn to_orientation(&self, graph: &Graph, config: &RoundConfig) -> Option<Orientation> {
        let mut orientation = Orientation::empty(graph);
        for edge in graph.edges() {
            if !self.is_integral(config, edge.id) {
                return None;
            }
            let winner = if self.x_low[edge.id] > 0.5 {
                edge.low()
            } else {
                edge.high()
            };
            orientation.set(graph, edge.id, winner).ok()?;
        }
        Some(orientation)
    }
}
