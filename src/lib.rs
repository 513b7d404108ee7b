pub mod analysis;
pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod diagnosis;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

use crate::builder::{BuildOptions, build_graph};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::BuildError;
use crate::ir::InteractionGraph;
use crate::layout::{Layout, compute_layout};
use crate::render::{Scene, render_svg};

/// A drawn network together with the graph and positions behind it.
#[derive(Debug, Clone)]
pub struct Figure {
    pub graph: InteractionGraph,
    pub layout: Layout,
    pub svg: String,
}

/// Builds the graph for `dataset`, lays it out and draws it.
pub fn build_figure(dataset: &Dataset, config: &Config) -> Result<Figure, BuildError> {
    let graph = build_graph(dataset, &BuildOptions::default())?;
    let layout = compute_layout(&graph, &config.layout);
    let svg = render_svg(&Scene::new(dataset, &graph, &layout, config));
    Ok(Figure { graph, layout, svg })
}
