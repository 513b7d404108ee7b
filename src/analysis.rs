use crate::ir::{Group, InteractionGraph, Relation};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const TOP_CONNECTED: usize = 5;
const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedNode {
    pub id: String,
    pub degree: usize,
}

/// Summary statistics for one interaction graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub density: f64,
    pub avg_degree: f64,
    pub inhibiting_interactions: usize,
    pub boosting_interactions: usize,
    pub most_connected: Vec<ConnectedNode>,
    /// Member count per group, in declaration order.
    pub groups: IndexMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl AnalysisReport {
    /// Records where the figure was written, for the printed summary.
    pub fn with_output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }
}

pub fn analyze(graph: &InteractionGraph, groups: &[Group]) -> AnalysisReport {
    let n = graph.node_count();
    let m = graph.edge_count();
    let density = if n < 2 {
        0.0
    } else {
        m as f64 / (n as f64 * (n as f64 - 1.0))
    };

    let degrees: Vec<ConnectedNode> = graph
        .node_ids()
        .map(|id| ConnectedNode {
            id: id.to_string(),
            degree: graph.degree(id),
        })
        .collect();
    let avg_degree = if n == 0 {
        0.0
    } else {
        degrees.iter().map(|node| node.degree).sum::<usize>() as f64 / n as f64
    };

    let mut most_connected = degrees;
    // Stable, so ties keep node order.
    most_connected.sort_by(|a, b| b.degree.cmp(&a.degree));
    most_connected.truncate(TOP_CONNECTED);

    let inhibiting_interactions = graph
        .edges()
        .filter(|(_, _, data)| data.relation == Relation::Inhibits)
        .count();

    AnalysisReport {
        total_nodes: n,
        total_edges: m,
        density,
        avg_degree,
        inhibiting_interactions,
        boosting_interactions: m - inhibiting_interactions,
        most_connected,
        groups: groups
            .iter()
            .map(|group| (group.name.clone(), group.members.len()))
            .collect(),
        output: None,
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "MICRONUTRIENT NETWORK ANALYSIS COMPLETE")?;
        writeln!(f, "{rule}")?;
        if let Some(path) = &self.output {
            writeln!(f, "Output saved to: {}", path.display())?;
        }
        writeln!(f, "Total micronutrients analyzed: {}", self.total_nodes)?;
        writeln!(f, "Total interactions mapped: {}", self.total_edges)?;
        writeln!(f, "Inhibiting interactions: {}", self.inhibiting_interactions)?;
        writeln!(f, "Enhancing interactions: {}", self.boosting_interactions)?;
        writeln!(f, "Network density: {:.3}", self.density)?;
        writeln!(f, "Average degree: {:.2}", self.avg_degree)?;
        if !self.groups.is_empty() {
            writeln!(f)?;
            writeln!(f, "Functional groups:")?;
            for (name, count) in &self.groups {
                writeln!(f, "  \u{2022} {name}: {count} nutrients")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Most connected micronutrients:")?;
        for node in &self.most_connected {
            writeln!(f, "  \u{2022} {}: {} connections", node.id, node.degree)?;
        }
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build_graph};
    use crate::dataset::Dataset;
    use crate::ir::EdgeData;

    #[test]
    fn enhanced_counts() {
        let dataset = Dataset::enhanced();
        let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
        let report = analyze(&graph, &dataset.groups);
        assert_eq!(report.total_nodes, 20);
        assert_eq!(report.total_edges, 24);
        assert_eq!(
            report.inhibiting_interactions + report.boosting_interactions,
            report.total_edges
        );
        assert!((report.density - 24.0 / 380.0).abs() < 1e-12);
        assert!((report.avg_degree - 2.4).abs() < 1e-12);
        assert_eq!(report.most_connected.len(), 5);
        assert_eq!(report.most_connected[0].id, "Calcium (Ca)");
        assert_eq!(report.most_connected[0].degree, 9);
        assert_eq!(report.most_connected[1].id, "Iron (Fe)");
        assert_eq!(report.inhibiting_interactions, 17);
        assert_eq!(report.groups.len(), 5);
        assert_eq!(report.groups.values().sum::<usize>(), 20);
    }

    #[test]
    fn ties_keep_node_order() {
        let mut graph = InteractionGraph::new();
        graph.add_edge("A", "B", EdgeData::new(Relation::Boosts, None));
        graph.add_edge("C", "D", EdgeData::new(Relation::Inhibits, None));
        let report = analyze(&graph, &[]);
        let ids: Vec<&str> = report.most_connected.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(report.inhibiting_interactions, 1);
        assert_eq!(report.boosting_interactions, 1);
    }

    #[test]
    fn empty_and_single_node_graphs() {
        let report = analyze(&InteractionGraph::new(), &[]);
        assert_eq!(report.density, 0.0);
        assert_eq!(report.avg_degree, 0.0);
        assert!(report.most_connected.is_empty());

        let mut single = InteractionGraph::new();
        single.add_node("A", None);
        let report = analyze(&single, &[]);
        assert_eq!(report.density, 0.0);
        assert_eq!(report.avg_degree, 0.0);
    }

    #[test]
    fn summary_banner() {
        let dataset = Dataset::enhanced();
        let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
        let text = analyze(&graph, &dataset.groups)
            .with_output(Path::new("images/out.png"))
            .to_string();
        assert!(text.contains("MICRONUTRIENT NETWORK ANALYSIS COMPLETE"));
        assert!(text.contains("Output saved to: images/out.png"));
        assert!(text.contains("  \u{2022} Iron (Fe): 8 connections"));
        assert!(text.starts_with(&"=".repeat(60)));
    }

    #[test]
    fn serializes_without_output_path() {
        let report = analyze(&InteractionGraph::new(), &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_nodes"], 0);
        assert!(json.get("output").is_none());
    }
}
