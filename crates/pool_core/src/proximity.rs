use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

/// One row of the precomputed area distance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEdge {
    pub area1: String,
    pub area2: String,
    pub distance_km: f64,
}

/// Bidirectional adjacency over named areas, built once from the
/// precomputed edge table and read-only afterwards.
///
/// `connected` answers "near enough to match". An unloaded or empty graph
/// is permissive (every pair counts as connected), so matching degrades
/// to exact route comparison instead of failing closed.
#[derive(Debug, Default)]
pub struct LocationGraph {
    graph: HashMap<String, Vec<(String, f64)>>,
    initialized: bool,
}

impl LocationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: &[LocationEdge]) -> Self {
        let mut graph = Self::new();
        graph.load_edges(edges);
        graph
    }

    /// One-time batch load. Every source edge is inserted in both
    /// directions.
    pub fn load_edges(&mut self, edges: &[LocationEdge]) {
        self.graph.clear();
        for edge in edges {
            self.graph
                .entry(edge.area1.clone())
                .or_default()
                .push((edge.area2.clone(), edge.distance_km));
            self.graph
                .entry(edge.area2.clone())
                .or_default()
                .push((edge.area1.clone(), edge.distance_km));
        }
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn location_count(&self) -> usize {
        self.graph.len()
    }

    /// True when the two areas are the same name, the graph carries no
    /// edges, or an edge links them.
    pub fn connected(&self, a: &str, b: &str) -> bool {
        if !self.initialized || self.graph.is_empty() || a == b {
            return true;
        }
        self.graph
            .get(a)
            .is_some_and(|neighbors| neighbors.iter().any(|(name, _)| name == b))
    }
}

/// Reads an `area1,area2,distance_km` table, as emitted by the graph
/// builder tool.
pub fn read_edges_csv<R: io::Read>(reader: R) -> Result<Vec<LocationEdge>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: &str, b: &str, km: f64) -> LocationEdge {
        LocationEdge {
            area1: a.to_string(),
            area2: b.to_string(),
            distance_km: km,
        }
    }

    #[test]
    fn edges_are_bidirectional() {
        let graph = LocationGraph::from_edges(&[edge("Gulshan", "Johar", 3.2)]);
        assert!(graph.connected("Gulshan", "Johar"));
        assert!(graph.connected("Johar", "Gulshan"));
    }

    #[test]
    fn same_area_is_always_connected() {
        let graph = LocationGraph::from_edges(&[edge("Gulshan", "Johar", 3.2)]);
        assert!(graph.connected("Saddar", "Saddar"));
    }

    #[test]
    fn unlinked_areas_are_not_connected() {
        let graph = LocationGraph::from_edges(&[
            edge("Gulshan", "Johar", 3.2),
            edge("Saddar", "Clifton", 2.1),
        ]);
        assert!(!graph.connected("Gulshan", "Saddar"));
        assert!(!graph.connected("Johar", "Clifton"));
    }

    #[test]
    fn unknown_area_is_not_connected() {
        let graph = LocationGraph::from_edges(&[edge("Gulshan", "Johar", 3.2)]);
        assert!(!graph.connected("Nowhere", "Gulshan"));
    }

    #[test]
    fn unloaded_graph_is_permissive() {
        let graph = LocationGraph::new();
        assert!(graph.connected("Gulshan", "Saddar"));
    }

    #[test]
    fn empty_edge_list_is_permissive() {
        let graph = LocationGraph::from_edges(&[]);
        assert!(graph.connected("Gulshan", "Saddar"));
    }

    #[test]
    fn reads_edge_table_from_csv() {
        let data = "area1,area2,distance_km\nGulshan,Johar,3.2\nSaddar,Clifton,2.1\n";
        let edges = read_edges_csv(data.as_bytes()).expect("csv edges");
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], edge("Gulshan", "Johar", 3.2));

        let graph = LocationGraph::from_edges(&edges);
        assert_eq!(graph.location_count(), 4);
        assert!(graph.connected("Clifton", "Saddar"));
    }
}
