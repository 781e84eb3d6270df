use csv::ReaderBuilder;
use itertools::Itertools;
use serde_derive::Deserialize;

use crate::graph::Graph;

#[derive(Debug, PartialEq, Deserialize)]
struct NodeRecord {
    name: String,
    weight: f64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct EdgeRecord {
    from: String,
    to: String,
    weight: f64,
}

/// Builds a `Graph` from CSV text, trying the node-record shape
/// (`name,weight`, dedicated loads, no edges) first and the edge-record
/// shape (`from,to,weight`) second. On a double failure both underlying
/// `csv::Error`s are returned so a caller can tell which branch broke.
pub fn deserialize_string_to_graph(data: &str) -> Result<Graph, (csv::Error, csv::Error)> {
    let node_attempt = deserialize_to_nodes(data).map(nodes_to_graph);
    if let Ok(graph) = node_attempt {
        return graph_or_propagate(graph);
    }

    let edge_attempt = deserialize_to_edges(data).map(edges_to_graph);
    match edge_attempt {
        Ok(graph) => graph_or_propagate(graph),
        Err(edge_err) => Err((node_attempt.unwrap_err(), edge_err)),
    }
}

/// Both branches above can still fail at the `Graph::new` validation step
/// (negative weight, self-loop); surface that as a malformed-edges CSV error
/// on the edge side, since there is no third row shape left to retry.
fn graph_or_propagate(result: crate::error::Result<Graph>) -> Result<Graph, (csv::Error, csv::Error)> {
    result.map_err(|e| {
        let msg = e.to_string();
        (
            csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, msg.clone())),
            csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, msg)),
        )
    })
}

fn deserialize_to_nodes(data: &str) -> Result<Vec<NodeRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(data.as_bytes());
    rdr.deserialize().collect()
}

fn deserialize_to_edges(data: &str) -> Result<Vec<EdgeRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(data.as_bytes());
    rdr.deserialize().collect()
}

fn nodes_to_graph(nodes: Vec<NodeRecord>) -> crate::error::Result<Graph> {
    let names = nodes.iter().map(|n| n.name.clone()).collect_vec();
    let loads = nodes.iter().map(|n| n.weight).collect_vec();
    Graph::new(names, loads, Vec::new())
}

fn edges_to_graph(edges: Vec<EdgeRecord>) -> crate::error::Result<Graph> {
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut names: Vec<String> = Vec::new();
    let mut vertex_id = |name: &str| -> usize {
        *index.entry(name.to_string()).or_insert_with_key(|k| {
            names.push(k.clone());
            names.len() - 1
        })
    };

    let raw_edges = edges
        .iter()
        .map(|e| (vertex_id(&e.from), vertex_id(&e.to), e.weight))
        .collect_vec();
    drop(vertex_id);
    let loads = vec![0.0; names.len()];
    Graph::new(names, loads, raw_edges)
}
