use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Boosts,
    Inhibits,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boosts => "boosts",
            Self::Inhibits => "inhibits",
        }
    }

    /// Glyph drawn at the edge midpoint.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Boosts => "+",
            Self::Inhibits => "\u{2212}",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    High,
    #[default]
    Medium,
    Low,
}

/// Line width and opacity an edge is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub width: f32,
    pub alpha: f32,
}

impl Strength {
    pub const ALL: [Strength; 3] = [Strength::High, Strength::Medium, Strength::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn weight(self) -> EdgeWeight {
        match self {
            Self::High => EdgeWeight {
                width: 2.5,
                alpha: 0.9,
            },
            Self::Medium => EdgeWeight {
                width: 1.8,
                alpha: 0.7,
            },
            Self::Low => EdgeWeight {
                width: 1.2,
                alpha: 0.5,
            },
        }
    }

    /// Undeclared strength counts as medium.
    pub fn resolve(declared: Option<Strength>) -> Strength {
        declared.unwrap_or_default()
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One literal edge declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: String,
    pub target: String,
    pub relation: Relation,
    pub strength: Option<Strength>,
}

impl Interaction {
    pub fn new(source: &str, target: &str, relation: Relation) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation,
            strength: None,
        }
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = Some(strength);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

impl Group {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub relation: Relation,
    /// Strength as declared; `None` for plain datasets.
    pub strength: Option<Strength>,
    pub weight: EdgeWeight,
}

impl EdgeData {
    pub fn new(relation: Relation, strength: Option<Strength>) -> Self {
        Self {
            relation,
            strength,
            weight: Strength::resolve(strength).weight(),
        }
    }
}

/// Directed graph holding at most one edge per ordered pair.
///
/// Nodes and edges iterate in insertion order. Re-adding an edge replaces its
/// attributes but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    nodes: IndexMap<String, NodeData>,
    edges: IndexMap<(String, String), EdgeData>,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str, group: Option<&str>) {
        let entry = self.nodes.entry(id.to_string()).or_default();
        if entry.group.is_none() {
            entry.group = group.map(str::to_string);
        }
    }

    /// Inserts `source -> target`, creating missing endpoints. Returns the
    /// attributes that were replaced, if the pair already existed.
    pub fn add_edge(&mut self, source: &str, target: &str, data: EdgeData) -> Option<EdgeData> {
        self.add_node(source, None);
        self.add_node(target, None);
        self.edges
            .insert((source.to_string(), target.to_string()), data)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeData)> {
        self.nodes.iter().map(|(id, data)| (id.as_str(), data))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|data| data.group.as_deref())
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeData)> {
        self.edges
            .iter()
            .map(|((from, to), data)| (from.as_str(), to.as_str(), data))
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeData> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.edges.keys().filter(|(from, _)| from == id).count()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.edges.keys().filter(|(_, to)| to == id).count()
    }

    /// In-degree plus out-degree; a self-loop counts twice.
    pub fn degree(&self, id: &str) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_table_is_fixed() {
        assert_eq!(Strength::High.weight(), EdgeWeight { width: 2.5, alpha: 0.9 });
        assert_eq!(Strength::Medium.weight(), EdgeWeight { width: 1.8, alpha: 0.7 });
        assert_eq!(Strength::Low.weight(), EdgeWeight { width: 1.2, alpha: 0.5 });
        assert_eq!(Strength::resolve(None), Strength::Medium);
        assert_eq!(EdgeData::new(Relation::Boosts, None).weight, Strength::Medium.weight());
    }

    #[test]
    fn edge_insert_creates_missing_nodes() {
        let mut graph = InteractionGraph::new();
        graph.add_node("Iron (Fe)", Some("Blood"));
        graph.add_edge("Zinc (Zn)", "Iron (Fe)", EdgeData::new(Relation::Inhibits, None));
        assert!(graph.contains_node("Zinc (Zn)"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.group_of("Iron (Fe)"), Some("Blood"));
        assert_eq!(graph.group_of("Zinc (Zn)"), None);
    }

    #[test]
    fn duplicate_pair_keeps_position_and_last_attributes() {
        let mut graph = InteractionGraph::new();
        graph.add_edge("A", "B", EdgeData::new(Relation::Boosts, None));
        graph.add_edge("B", "C", EdgeData::new(Relation::Boosts, None));
        let previous = graph.add_edge("A", "B", EdgeData::new(Relation::Inhibits, Some(Strength::High)));
        assert_eq!(previous.map(|d| d.relation), Some(Relation::Boosts));
        assert_eq!(graph.edge_count(), 2);
        let (from, to, data) = graph.edges().next().unwrap();
        assert_eq!((from, to), ("A", "B"));
        assert_eq!(data.relation, Relation::Inhibits);
        assert_eq!(data.weight.width, 2.5);
    }

    #[test]
    fn degrees_count_both_directions() {
        let mut graph = InteractionGraph::new();
        graph.add_edge("A", "B", EdgeData::new(Relation::Boosts, None));
        graph.add_edge("B", "A", EdgeData::new(Relation::Inhibits, None));
        graph.add_edge("C", "A", EdgeData::new(Relation::Inhibits, None));
        assert_eq!(graph.in_degree("A"), 2);
        assert_eq!(graph.out_degree("A"), 1);
        assert_eq!(graph.degree("A"), 3);
        assert_eq!(graph.degree("C"), 1);
    }

    #[test]
    fn relation_names_and_glyphs() {
        assert_eq!(Relation::Boosts.to_string(), "boosts");
        assert_eq!(Relation::Inhibits.to_string(), "inhibits");
        assert_eq!(Relation::Boosts.glyph(), "+");
        assert_eq!(Relation::Inhibits.glyph(), "\u{2212}");
    }
}
