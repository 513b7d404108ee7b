use crate::dataset::Variant;
use crate::layout::SpringParams;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    Spring,
    Circular,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub algorithm: LayoutAlgorithm,
    /// Optimal node distance for the spring layout.
    pub k: Option<f64>,
    pub iterations: usize,
    pub seed: u64,
    pub scale: f64,
    pub threshold: f64,
    /// Standard deviation of the post-layout jitter, if any.
    pub jitter: Option<f64>,
    pub jitter_seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::Spring,
            k: Some(0.8),
            iterations: 50,
            seed: DEFAULT_SEED,
            scale: 1.0,
            threshold: 1e-4,
            jitter: None,
            jitter_seed: DEFAULT_SEED,
        }
    }
}

impl LayoutConfig {
    pub fn spring_params(&self) -> SpringParams {
        SpringParams {
            k: self.k,
            iterations: self.iterations,
            seed: self.seed,
            scale: self.scale,
            threshold: self.threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Figure geometry. Lengths are in points (1/72 in) unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Square figure edge, in inches.
    pub figure_size: f32,
    pub dpi: f32,
    /// Node marker area in square points.
    pub node_size: f32,
    pub node_alpha: f32,
    pub node_stroke_width: f32,
    pub label_font_size: f32,
    pub label_bold: bool,
    pub label_boxes: bool,
    pub glyph_font_size: f32,
    pub glyph_badges: bool,
    pub title_font_size: f32,
    pub legend_font_size: f32,
    /// arc3 curvature applied to every edge.
    pub curvature: f32,
    pub arrow_size: f32,
    /// Edge width when the dataset carries no strength.
    pub plain_edge_width: f32,
    /// Glyph offset from the edge midpoint, as a fraction of edge length.
    pub glyph_offset: f32,
    /// Symmetric axis limit in layout units; autoscaled when unset.
    pub axis_limit: Option<f32>,
    /// Padding around the tight bounding box, in inches.
    pub pad_inches: f32,
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figure_size: 12.0,
            dpi: 300.0,
            node_size: 500.0,
            node_alpha: 1.0,
            node_stroke_width: 0.0,
            label_font_size: 8.0,
            label_bold: false,
            label_boxes: false,
            glyph_font_size: 10.0,
            glyph_badges: false,
            title_font_size: 14.0,
            legend_font_size: 9.0,
            curvature: 0.1,
            arrow_size: 12.0,
            plain_edge_width: 1.2,
            glyph_offset: 0.05,
            axis_limit: None,
            pad_inches: 0.1,
            format: OutputFormat::Png,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_variant(Variant::Enhanced)
    }
}

impl Config {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Reduced | Variant::Elements => Self {
                theme: Theme::plain(),
                layout: LayoutConfig::default(),
                render: RenderConfig::default(),
            },
            Variant::Coloured => Self {
                theme: Theme::tab10(),
                layout: LayoutConfig::default(),
                render: RenderConfig {
                    figure_size: 14.0,
                    node_size: 600.0,
                    label_font_size: 8.5,
                    glyph_font_size: 11.0,
                    curvature: 0.15,
                    plain_edge_width: 1.3,
                    ..RenderConfig::default()
                },
            },
            Variant::Enhanced => Self {
                theme: Theme::enhanced(),
                layout: LayoutConfig {
                    k: Some(1.2),
                    iterations: 100,
                    jitter: Some(0.02),
                    ..LayoutConfig::default()
                },
                render: RenderConfig {
                    figure_size: 16.0,
                    node_size: 800.0,
                    node_alpha: 0.9,
                    node_stroke_width: 2.0,
                    label_font_size: 9.0,
                    label_bold: true,
                    label_boxes: true,
                    glyph_font_size: 12.0,
                    glyph_badges: true,
                    title_font_size: 16.0,
                    legend_font_size: 10.0,
                    curvature: 0.2,
                    arrow_size: 15.0,
                    axis_limit: Some(1.3),
                    ..RenderConfig::default()
                },
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    title_color: Option<String>,
    text_color: Option<String>,
    background: Option<String>,
    default_node_color: Option<String>,
    node_stroke: Option<String>,
    label_box_fill: Option<String>,
    label_box_stroke: Option<String>,
    default_edge_color: Option<String>,
    boosts_color: Option<String>,
    inhibits_color: Option<String>,
    legend_background: Option<String>,
    legend_border: Option<String>,
    group_palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    algorithm: Option<LayoutAlgorithm>,
    k: Option<f64>,
    iterations: Option<usize>,
    seed: Option<u64>,
    scale: Option<f64>,
    threshold: Option<f64>,
    jitter: Option<f64>,
    jitter_seed: Option<u64>,
    no_jitter: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    figure_size: Option<f32>,
    dpi: Option<f32>,
    node_size: Option<f32>,
    node_alpha: Option<f32>,
    label_font_size: Option<f32>,
    title_font_size: Option<f32>,
    legend_font_size: Option<f32>,
    curvature: Option<f32>,
    glyph_offset: Option<f32>,
    axis_limit: Option<f32>,
    pad_inches: Option<f32>,
    format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

/// Preset for `variant`, overridden by any keys present in the JSON5 file at
/// `path`.
pub fn load_config(path: Option<&Path>, variant: Variant) -> anyhow::Result<Config> {
    let config = Config::for_variant(variant);
    let Some(path) = path else {
        return Ok(config);
    };
    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config overrides");
    Ok(apply_overrides(config, parsed))
}

fn apply_overrides(mut config: Config, parsed: ConfigFile) -> Config {
    match parsed.theme.as_deref() {
        Some("plain") | Some("default") => config.theme = Theme::plain(),
        Some("tab10") => config.theme = Theme::tab10(),
        Some("enhanced") => config.theme = Theme::enhanced(),
        Some(other) => tracing::warn!(theme = other, "unknown theme preset, keeping default"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.title_color {
            theme.title_color = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.default_node_color {
            theme.default_node_color = v;
        }
        if let Some(v) = vars.node_stroke {
            theme.node_stroke = v;
        }
        if let Some(v) = vars.label_box_fill {
            theme.label_box_fill = v;
        }
        if let Some(v) = vars.label_box_stroke {
            theme.label_box_stroke = v;
        }
        if let Some(v) = vars.default_edge_color {
            theme.default_edge_color = v;
        }
        if let Some(v) = vars.boosts_color {
            theme.boosts_color = v;
        }
        if let Some(v) = vars.inhibits_color {
            theme.inhibits_color = v;
        }
        if let Some(v) = vars.legend_background {
            theme.legend_background = v;
        }
        if let Some(v) = vars.legend_border {
            theme.legend_border = v;
        }
        if let Some(v) = vars.group_palette
            && !v.is_empty()
        {
            theme.group_palette = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let cfg = &mut config.layout;
        if let Some(v) = layout.algorithm {
            cfg.algorithm = v;
        }
        if let Some(v) = layout.k {
            cfg.k = Some(v);
        }
        if let Some(v) = layout.iterations {
            cfg.iterations = v;
        }
        if let Some(v) = layout.seed {
            cfg.seed = v;
        }
        if let Some(v) = layout.scale {
            cfg.scale = v;
        }
        if let Some(v) = layout.threshold {
            cfg.threshold = v;
        }
        if let Some(v) = layout.jitter {
            cfg.jitter = Some(v);
        }
        if let Some(v) = layout.jitter_seed {
            cfg.jitter_seed = v;
        }
        if layout.no_jitter == Some(true) {
            cfg.jitter = None;
        }
    }

    if let Some(render) = parsed.render {
        let cfg = &mut config.render;
        if let Some(v) = render.figure_size {
            cfg.figure_size = v;
        }
        if let Some(v) = render.dpi {
            cfg.dpi = v;
        }
        if let Some(v) = render.node_size {
            cfg.node_size = v;
        }
        if let Some(v) = render.node_alpha {
            cfg.node_alpha = v;
        }
        if let Some(v) = render.label_font_size {
            cfg.label_font_size = v;
        }
        if let Some(v) = render.title_font_size {
            cfg.title_font_size = v;
        }
        if let Some(v) = render.legend_font_size {
            cfg.legend_font_size = v;
        }
        if let Some(v) = render.curvature {
            cfg.curvature = v;
        }
        if let Some(v) = render.glyph_offset {
            cfg.glyph_offset = v;
        }
        match render.axis_limit {
            Some(v) if v.is_finite() && v > 0.0 => cfg.axis_limit = Some(v),
            Some(v) => tracing::warn!(axis_limit = v, "axis limit must be positive, keeping default"),
            None => {}
        }
        if let Some(v) = render.pad_inches {
            cfg.pad_inches = v;
        }
        if let Some(v) = render.format {
            cfg.format = v;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_presets() {
        let enhanced = Config::for_variant(Variant::Enhanced);
        assert_eq!(enhanced.layout.k, Some(1.2));
        assert_eq!(enhanced.layout.iterations, 100);
        assert_eq!(enhanced.layout.seed, 42);
        assert_eq!(enhanced.layout.jitter, Some(0.02));
        assert_eq!(enhanced.layout.jitter_seed, 42);
        assert_eq!(enhanced.render.dpi, 300.0);
        assert_eq!(enhanced.render.curvature, 0.2);

        let elements = Config::for_variant(Variant::Elements);
        assert_eq!(elements.layout.k, Some(0.8));
        assert_eq!(elements.layout.jitter, None);
        assert_eq!(elements.render.dpi, 300.0);
    }

    #[test]
    fn json5_overrides_apply_on_top_of_preset() {
        let input = r##"{
            // comments and trailing commas are fine
            theme: "tab10",
            themeVariables: { inhibitsColor: "#AA0000", groupPalette: [] },
            layout: { iterations: 10, noJitter: true },
            render: { dpi: 150, format: "svg", },
        }"##;
        let parsed: ConfigFile = json5::from_str(input).unwrap();
        let config = apply_overrides(Config::for_variant(Variant::Enhanced), parsed);
        assert_eq!(config.theme.inhibits_color, "#AA0000");
        assert_eq!(config.theme.group_palette.len(), 10);
        assert_eq!(config.layout.iterations, 10);
        assert_eq!(config.layout.jitter, None);
        assert_eq!(config.layout.k, Some(1.2));
        assert_eq!(config.render.dpi, 150.0);
        assert_eq!(config.render.format, OutputFormat::Svg);
    }

    #[test]
    fn non_positive_axis_limit_is_ignored() {
        for limit in ["0", "-1.5"] {
            let input = format!("{{ render: {{ axisLimit: {limit} }} }}");
            let parsed: ConfigFile = json5::from_str(&input).unwrap();
            let config = apply_overrides(Config::for_variant(Variant::Enhanced), parsed);
            assert_eq!(config.render.axis_limit, Some(1.3));
        }
        let parsed: ConfigFile = json5::from_str("{ render: { axisLimit: 2 } }").unwrap();
        let config = apply_overrides(Config::for_variant(Variant::Enhanced), parsed);
        assert_eq!(config.render.axis_limit, Some(2.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/nutnet.json5")), Variant::Enhanced);
        assert!(err.is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a/b.svg")), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_path(Path::new("a/b")), None);
    }
}
