use crate::dataset::Dataset;
use crate::error::BuildError;
use crate::ir::{EdgeData, InteractionGraph};

/// What to do when two declarations share the same ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateEdges {
    /// Later declarations replace earlier attributes.
    #[default]
    Overwrite,
    Reject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub duplicates: DuplicateEdges,
}

pub fn build_graph(dataset: &Dataset, options: &BuildOptions) -> Result<InteractionGraph, BuildError> {
    let mut graph = InteractionGraph::new();

    for (id, group) in dataset.nutrients() {
        graph.add_node(id, group);
    }

    for interaction in &dataset.interactions {
        for endpoint in [&interaction.source, &interaction.target] {
            if !graph.contains_node(endpoint) {
                tracing::debug!(node = %endpoint, "interaction references undeclared nutrient");
            }
        }
        if options.duplicates == DuplicateEdges::Reject
            && graph.edge(&interaction.source, &interaction.target).is_some()
        {
            return Err(BuildError::DuplicateInteraction {
                source_id: interaction.source.clone(),
                target_id: interaction.target.clone(),
            });
        }
        let data = EdgeData::new(interaction.relation, interaction.strength);
        if let Some(previous) = graph.add_edge(&interaction.source, &interaction.target, data) {
            tracing::warn!(
                from = %interaction.source,
                to = %interaction.target,
                replaced = %previous.relation,
                "duplicate interaction overwrote earlier declaration"
            );
        }
    }

    tracing::info!(
        "Graph created with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
