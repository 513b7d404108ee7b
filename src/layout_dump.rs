use crate::config::{LayoutAlgorithm, LayoutConfig};
use crate::dataset::Variant;
use crate::ir::{InteractionGraph, Relation, Strength};
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub variant: Variant,
    pub algorithm: LayoutAlgorithm,
    pub seed: u64,
    pub jitter: Option<f64>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub group: Option<String>,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub relation: Relation,
    pub strength: Option<Strength>,
    pub width: f32,
    pub alpha: f32,
}

impl LayoutDump {
    pub fn from_layout(
        variant: Variant,
        graph: &InteractionGraph,
        layout: &Layout,
        config: &LayoutConfig,
    ) -> Self {
        let nodes = layout
            .iter()
            .map(|(id, point)| NodeDump {
                id: id.to_string(),
                group: graph.group_of(id).map(str::to_string),
                x: point.x,
                y: point.y,
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(from, to, data)| EdgeDump {
                from: from.to_string(),
                to: to.to_string(),
                relation: data.relation,
                strength: data.strength,
                width: data.weight.width,
                alpha: data.weight.alpha,
            })
            .collect();

        LayoutDump {
            variant,
            algorithm: config.algorithm,
            seed: config.seed,
            jitter: config.jitter,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    tracing::debug!(path = %path.display(), "layout dump written");
    Ok(())
}
