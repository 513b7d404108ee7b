use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ir::Group;

const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const ENHANCED_PALETTE: [&str; 5] = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub title_color: String,
    pub text_color: String,
    pub background: String,
    pub default_node_color: String,
    pub node_stroke: String,
    pub label_box_fill: String,
    pub label_box_stroke: String,
    pub default_edge_color: String,
    pub boosts_color: String,
    pub inhibits_color: String,
    pub strength_legend_color: String,
    pub legend_background: String,
    pub legend_border: String,
    pub group_palette: Vec<String>,
}

impl Theme {
    /// Single node color and black edges.
    pub fn plain() -> Self {
        Self {
            font_family: "DejaVu Sans, Arial, Helvetica, sans-serif".to_string(),
            title_color: "#000000".to_string(),
            text_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            default_node_color: TAB10[0].to_string(),
            node_stroke: "none".to_string(),
            label_box_fill: "#FFFFFF".to_string(),
            label_box_stroke: "#808080".to_string(),
            default_edge_color: "#000000".to_string(),
            boosts_color: "#000000".to_string(),
            inhibits_color: "#000000".to_string(),
            strength_legend_color: "#808080".to_string(),
            legend_background: "#FFFFFF".to_string(),
            legend_border: "#D0D0D0".to_string(),
            group_palette: vec![TAB10[0].to_string()],
        }
    }

    /// Ten-color categorical palette for grouped nodes.
    pub fn tab10() -> Self {
        Self {
            group_palette: TAB10.iter().map(|c| c.to_string()).collect(),
            ..Self::plain()
        }
    }

    pub fn enhanced() -> Self {
        Self {
            title_color: "#2C3E50".to_string(),
            node_stroke: "#FFFFFF".to_string(),
            boosts_color: "#27AE60".to_string(),
            inhibits_color: "#E74C3C".to_string(),
            group_palette: ENHANCED_PALETTE.iter().map(|c| c.to_string()).collect(),
            ..Self::plain()
        }
    }

    fn palette_color(&self, index: usize) -> &str {
        if self.group_palette.is_empty() {
            return self.default_node_color.as_str();
        }
        self.group_palette[index % self.group_palette.len()].as_str()
    }
}

/// Palette colors assigned to groups in declaration order, wrapping around.
pub fn group_colors(groups: &[Group], theme: &Theme) -> IndexMap<String, String> {
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| (group.name.clone(), theme.palette_color(idx).to_string()))
        .collect()
}

/// One color per node: the owning group's color, or the theme default for
/// ungrouped nodes.
pub fn node_colors<'a>(
    nodes: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    groups: &[Group],
    theme: &Theme,
) -> IndexMap<String, String> {
    let by_group = group_colors(groups, theme);
    nodes
        .into_iter()
        .map(|(id, group)| {
            let color = group
                .and_then(|name| by_group.get(name))
                .cloned()
                .unwrap_or_else(|| theme.default_node_color.clone());
            (id.to_string(), color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build_graph};
    use crate::dataset::Dataset;

    #[test]
    fn group_colors_follow_palette_order() {
        let dataset = Dataset::enhanced();
        let colors = group_colors(&dataset.groups, &Theme::enhanced());
        let values: Vec<&str> = colors.values().map(String::as_str).collect();
        assert_eq!(values, ENHANCED_PALETTE.to_vec());
    }

    #[test]
    fn palette_wraps() {
        let groups: Vec<Group> = (0..7).map(|i| Group::new(&format!("g{i}"), &[])).collect();
        let colors = group_colors(&groups, &Theme::enhanced());
        assert_eq!(colors["g5"], ENHANCED_PALETTE[0]);
        assert_eq!(colors["g6"], ENHANCED_PALETTE[1]);
    }

    #[test]
    fn every_node_gets_its_group_color() {
        for (dataset, theme) in [
            (Dataset::coloured(), Theme::tab10()),
            (Dataset::enhanced(), Theme::enhanced()),
        ] {
            let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
            let groups = group_colors(&dataset.groups, &theme);
            let colors = node_colors(
                graph.nodes().map(|(id, data)| (id, data.group.as_deref())),
                &dataset.groups,
                &theme,
            );
            assert_eq!(colors.len(), graph.node_count());
            for group in &dataset.groups {
                for member in &group.members {
                    assert_eq!(colors[member.as_str()], groups[group.name.as_str()]);
                }
            }
        }
    }

    #[test]
    fn ungrouped_nodes_use_default_color() {
        let theme = Theme::plain();
        let colors = node_colors([("A", None), ("B", Some("missing"))], &[], &theme);
        assert_eq!(colors["A"], theme.default_node_color);
        assert_eq!(colors["B"], theme.default_node_color);
    }
}
