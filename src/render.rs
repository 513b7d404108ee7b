use crate::config::{Config, OutputFormat, RenderConfig};
use crate::dataset::{Dataset, Richness};
use crate::error::RenderError;
use crate::ir::{EdgeData, InteractionGraph, Relation, Strength};
use crate::layout::{Bounds, Layout, Point};
use crate::text_metrics::measure_text_width;
use crate::theme::{Theme, group_colors, node_colors};
use indexmap::IndexMap;
use std::path::Path;

const POINTS_PER_INCH: f32 = 72.0;
/// Gap between the figure edge and the axes box, as a fraction of the figure.
const AXES_INSET: f32 = 0.04;
const AUTOSCALE_MARGIN: f32 = 0.1;
const LINE_HEIGHT: f32 = 1.2;
/// Dash and gap lengths per unit of line width.
const DASH_PATTERN: (f32, f32) = (3.7, 1.6);
const HEAD_RATIO: f32 = 0.4;

/// How one edge is stroked. Depends only on relation and strength.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStroke {
    pub dashed: bool,
    pub color: String,
    pub width: f32,
    pub alpha: f32,
}

impl EdgeStroke {
    pub fn for_edge(edge: &EdgeData, richness: Richness, theme: &Theme, plain_width: f32) -> Self {
        let dashed = edge.relation == Relation::Inhibits;
        match richness {
            Richness::Weighted => Self {
                dashed,
                color: relation_color(edge.relation, theme).to_string(),
                width: edge.weight.width,
                alpha: edge.weight.alpha,
            },
            Richness::Plain => Self {
                dashed,
                color: theme.default_edge_color.clone(),
                width: plain_width,
                alpha: 1.0,
            },
        }
    }

    fn line(color: &str, width: f32, alpha: f32, dashed: bool) -> Self {
        Self {
            dashed,
            color: color.to_string(),
            width,
            alpha,
        }
    }

    fn dash_attr(&self) -> String {
        if self.dashed {
            format!(
                " stroke-dasharray=\"{:.2} {:.2}\"",
                DASH_PATTERN.0 * self.width,
                DASH_PATTERN.1 * self.width
            )
        } else {
            String::new()
        }
    }
}

fn relation_color(relation: Relation, theme: &Theme) -> &str {
    match relation {
        Relation::Boosts => &theme.boosts_color,
        Relation::Inhibits => &theme.inhibits_color,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendAnchor {
    UpperLeft,
    UpperRight,
    LowerLeft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendMarker {
    Patch { color: String },
    Line(EdgeStroke),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub marker: LegendMarker,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: Option<String>,
    pub anchor: LegendAnchor,
    pub entries: Vec<LegendEntry>,
}

/// Legend boxes for a dataset, in drawing order.
pub fn legends_for(dataset: &Dataset, theme: &Theme) -> Vec<Legend> {
    let groups: Vec<LegendEntry> = group_colors(&dataset.groups, theme)
        .into_iter()
        .map(|(name, color)| LegendEntry {
            marker: LegendMarker::Patch { color },
            label: name,
        })
        .collect();

    let plain_relations = |width: f32| {
        vec![
            LegendEntry {
                marker: LegendMarker::Line(EdgeStroke::line(
                    &theme.default_edge_color,
                    width,
                    1.0,
                    false,
                )),
                label: format!("Boosts ({})", Relation::Boosts.glyph()),
            },
            LegendEntry {
                marker: LegendMarker::Line(EdgeStroke::line(
                    &theme.default_edge_color,
                    width,
                    1.0,
                    true,
                )),
                label: format!("Inhibits ({})", Relation::Inhibits.glyph()),
            },
        ]
    };

    match dataset.richness() {
        Richness::Weighted => {
            let types = vec![
                LegendEntry {
                    marker: LegendMarker::Line(EdgeStroke::line(&theme.boosts_color, 2.5, 1.0, false)),
                    label: format!("Enhances Absorption ({})", Relation::Boosts.glyph()),
                },
                LegendEntry {
                    marker: LegendMarker::Line(EdgeStroke::line(&theme.inhibits_color, 2.5, 1.0, true)),
                    label: format!("Inhibits Absorption ({})", Relation::Inhibits.glyph()),
                },
            ];
            let strengths = Strength::ALL
                .iter()
                .map(|strength| {
                    let (width, label) = match strength {
                        Strength::High => (3.0, "High Impact"),
                        Strength::Medium => (2.0, "Medium Impact"),
                        Strength::Low => (1.5, "Low Impact"),
                    };
                    LegendEntry {
                        marker: LegendMarker::Line(EdgeStroke::line(
                            &theme.strength_legend_color,
                            width,
                            strength.weight().alpha,
                            false,
                        )),
                        label: label.to_string(),
                    }
                })
                .collect();
            vec![
                Legend {
                    title: Some("Functional Groups".to_string()),
                    anchor: LegendAnchor::UpperLeft,
                    entries: groups,
                },
                Legend {
                    title: Some("Interaction Types".to_string()),
                    anchor: LegendAnchor::UpperRight,
                    entries: types,
                },
                Legend {
                    title: Some("Interaction Strength".to_string()),
                    anchor: LegendAnchor::LowerLeft,
                    entries: strengths,
                },
            ]
        }
        Richness::Plain if !groups.is_empty() => {
            let mut entries = groups;
            entries.extend(plain_relations(1.5));
            vec![Legend {
                title: None,
                anchor: LegendAnchor::UpperLeft,
                entries,
            }]
        }
        Richness::Plain => vec![Legend {
            title: None,
            anchor: LegendAnchor::UpperLeft,
            entries: plain_relations(1.2),
        }],
    }
}

/// Everything one figure is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub dataset: &'a Dataset,
    pub graph: &'a InteractionGraph,
    pub layout: &'a Layout,
    pub config: &'a Config,
}

impl<'a> Scene<'a> {
    pub fn new(
        dataset: &'a Dataset,
        graph: &'a InteractionGraph,
        layout: &'a Layout,
        config: &'a Config,
    ) -> Self {
        Self {
            dataset,
            graph,
            layout,
            config,
        }
    }

    /// Node marker radius in points. Matches a marker of area `node_size`.
    fn node_radius(&self) -> f32 {
        self.config.render.node_size.max(0.0).sqrt() / 2.0
    }
}

/// Maps layout coordinates onto the axes box, y pointing up.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    x_range: (f32, f32),
    y_range: (f32, f32),
}

impl Frame {
    fn new(scene: &Scene) -> Self {
        let render = &scene.config.render;
        let figure = render.figure_size * POINTS_PER_INCH;
        let inset = figure * AXES_INSET;
        let title_block = match scene.dataset.title.lines().count() {
            0 => 0.0,
            lines => lines as f32 * render.title_font_size * LINE_HEIGHT + render.title_font_size,
        };
        let (x_range, y_range) = match render.axis_limit {
            Some(limit) => ((-limit, limit), (-limit, limit)),
            None => autoscale(scene.layout),
        };
        Self {
            left: inset,
            top: inset + title_block,
            width: (figure - 2.0 * inset).max(1.0),
            height: (figure - 2.0 * inset - title_block).max(1.0),
            x_range,
            y_range,
        }
    }

    fn project(&self, point: Point) -> (f32, f32) {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        (
            self.left + (point.x - x0) / (x1 - x0) * self.width,
            self.top + (y1 - point.y) / (y1 - y0) * self.height,
        )
    }
}

fn autoscale(layout: &Layout) -> ((f32, f32), (f32, f32)) {
    let Some(bounds) = layout.bounds() else {
        return ((-1.0, 1.0), (-1.0, 1.0));
    };
    let margin = |span: f32| {
        if span > f32::EPSILON {
            span * AUTOSCALE_MARGIN
        } else {
            1.0
        }
    };
    let mx = margin(bounds.width());
    let my = margin(bounds.height());
    (
        (bounds.min_x - mx, bounds.max_x + mx),
        (bounds.min_y - my, bounds.max_y + my),
    )
}

/// SVG body plus the running extent of everything drawn into it.
#[derive(Default)]
struct Canvas {
    body: String,
    extent: Option<Bounds>,
}

impl Canvas {
    fn include(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) {
        self.extent = Some(match self.extent {
            Some(b) => Bounds {
                min_x: b.min_x.min(min_x),
                min_y: b.min_y.min(min_y),
                max_x: b.max_x.max(max_x),
                max_y: b.max_y.max(max_y),
            },
            None => Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            },
        });
    }

    fn include_circle(&mut self, (x, y): (f32, f32), r: f32) {
        self.include(x - r, y - r, x + r, y + r);
    }

    fn push(&mut self, element: &str) {
        self.body.push_str(element);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
}

struct TextStyle<'a> {
    size: f32,
    bold: bool,
    color: &'a str,
    anchor: Anchor,
}

fn draw_text(canvas: &mut Canvas, (x, y): (f32, f32), text: &str, style: &TextStyle, family: &str) {
    let width = measure_text_width(text, style.size, family, style.bold);
    let left = match style.anchor {
        Anchor::Start => x,
        Anchor::Middle => x - width / 2.0,
    };
    let half = style.size * LINE_HEIGHT / 2.0;
    canvas.include(left, y - half, left + width, y + half);
    canvas.push(&format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">{}</text>",
        match style.anchor {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        },
        escape_xml(family),
        style.size,
        if style.bold { "bold" } else { "normal" },
        style.color,
        escape_xml(text)
    ));
}

/// Quadratic connection between two node centers in figure space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcCurve {
    start: (f32, f32),
    control: (f32, f32),
    end: (f32, f32),
}

impl ArcCurve {
    /// arc3 geometry: the control point sits `rad` chord lengths off the
    /// midpoint, to the right of travel in y-up coordinates. Both ends are
    /// pulled back by `shrink` along the curve tangent.
    fn new(from: (f32, f32), to: (f32, f32), rad: f32, shrink: f32) -> Option<Self> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let chord = dx.hypot(dy);
        if chord <= f32::EPSILON {
            return None;
        }
        let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
        // Figure y grows downward, which flips the sign of the y-up offset.
        let control = (mid.0 - rad * dy, mid.1 + rad * dx);
        let shrink = if chord > 2.0 * shrink { shrink } else { 0.0 };
        Some(Self {
            start: pull_toward(from, control, shrink),
            control,
            end: pull_toward(to, control, shrink),
        })
    }

    fn path_data(&self) -> String {
        format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.start.0, self.start.1, self.control.0, self.control.1, self.end.0, self.end.1
        )
    }

    fn extent(&self) -> Bounds {
        let (min_x, max_x) = quad_range(self.start.0, self.control.0, self.end.0);
        let (min_y, max_y) = quad_range(self.start.1, self.control.1, self.end.1);
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

fn pull_toward(point: (f32, f32), toward: (f32, f32), distance: f32) -> (f32, f32) {
    let dx = toward.0 - point.0;
    let dy = toward.1 - point.1;
    let length = dx.hypot(dy);
    if length <= distance || length <= f32::EPSILON {
        return point;
    }
    (point.0 + dx / length * distance, point.1 + dy / length * distance)
}

/// Range of one coordinate of a quadratic Bezier over `t` in [0, 1].
fn quad_range(p0: f32, c: f32, p2: f32) -> (f32, f32) {
    let mut lo = p0.min(p2);
    let mut hi = p0.max(p2);
    let denom = p0 - 2.0 * c + p2;
    if denom.abs() > f32::EPSILON {
        let t = (p0 - c) / denom;
        if t > 0.0 && t < 1.0 {
            let v = (1.0 - t) * (1.0 - t) * p0 + 2.0 * (1.0 - t) * t * c + t * t * p2;
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

/// Glyph position in layout space: the edge midpoint pushed perpendicular to
/// the edge by `offset` times its length.
fn glyph_anchor(from: Point, to: Point, offset: f32) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    Point::new(
        (from.x + to.x) / 2.0 - dy * offset,
        (from.y + to.y) / 2.0 + dx * offset,
    )
}

pub fn render_svg(scene: &Scene) -> String {
    let config = scene.config;
    let theme = &config.theme;
    let render = &config.render;
    let richness = scene.dataset.richness();
    let frame = Frame::new(scene);
    let radius = scene.node_radius();
    let mut canvas = Canvas::default();

    let strokes: Vec<(&str, &str, &EdgeData, EdgeStroke)> = scene
        .graph
        .edges()
        .map(|(from, to, data)| {
            let stroke = EdgeStroke::for_edge(data, richness, theme, render.plain_edge_width);
            (from, to, data, stroke)
        })
        .collect();

    let mut markers: IndexMap<String, String> = IndexMap::new();
    for (_, _, _, stroke) in &strokes {
        if !markers.contains_key(&stroke.color) {
            let id = format!("arrow-{}", markers.len());
            markers.insert(stroke.color.clone(), id);
        }
    }
    let head = render.arrow_size * HEAD_RATIO;

    for (from, to, data, stroke) in &strokes {
        let (Some(a), Some(b)) = (scene.layout.get(from), scene.layout.get(to)) else {
            tracing::debug!(from = *from, to = *to, "edge endpoint has no position, skipping");
            continue;
        };
        let Some(curve) = ArcCurve::new(frame.project(a), frame.project(b), render.curvature, radius)
        else {
            continue;
        };
        let extent = curve.extent();
        canvas.include(extent.min_x, extent.min_y, extent.max_x, extent.max_y);
        canvas.include_circle(curve.end, head);
        let marker = markers
            .get(&stroke.color)
            .map(|id| format!(" marker-end=\"url(#{id})\""))
            .unwrap_or_default();
        canvas.push(&format!(
            "<g class=\"edge\" data-source=\"{}\" data-target=\"{}\" data-relation=\"{}\" opacity=\"{}\"><path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{}{}/></g>",
            escape_xml(from),
            escape_xml(to),
            data.relation,
            stroke.alpha,
            curve.path_data(),
            stroke.color,
            stroke.width,
            stroke.dash_attr(),
            marker
        ));
    }

    let colors = node_colors(
        scene.graph.nodes().map(|(id, data)| (id, data.group.as_deref())),
        &scene.dataset.groups,
        theme,
    );
    let stroke_width = render.node_stroke_width;
    for (id, point) in scene.layout.iter() {
        let center = frame.project(point);
        let fill = colors
            .get(id)
            .map(String::as_str)
            .unwrap_or(theme.default_node_color.as_str());
        canvas.include_circle(center, radius + stroke_width / 2.0);
        let outline = if stroke_width > 0.0 {
            format!(" stroke=\"{}\" stroke-width=\"{stroke_width}\"", theme.node_stroke)
        } else {
            String::new()
        };
        canvas.push(&format!(
            "<circle class=\"node\" data-id=\"{}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\"{}/>",
            escape_xml(id),
            center.0,
            center.1,
            radius,
            fill,
            render.node_alpha,
            outline
        ));
    }

    for (from, to, data, _) in &strokes {
        let (Some(a), Some(b)) = (scene.layout.get(from), scene.layout.get(to)) else {
            continue;
        };
        let at = frame.project(glyph_anchor(a, b, render.glyph_offset));
        let color = match richness {
            Richness::Weighted => relation_color(data.relation, theme),
            Richness::Plain => theme.text_color.as_str(),
        };
        if render.glyph_badges {
            let r = render.glyph_font_size * 0.7;
            canvas.include_circle(at, r + 0.5);
            canvas.push(&format!(
                "<circle class=\"glyph-badge\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{r:.2}\" fill=\"#FFFFFF\" fill-opacity=\"0.9\" stroke=\"{color}\" stroke-width=\"1\"/>",
                at.0, at.1
            ));
        }
        let style = TextStyle {
            size: render.glyph_font_size,
            bold: render.glyph_badges,
            color,
            anchor: Anchor::Middle,
        };
        draw_text(&mut canvas, at, data.relation.glyph(), &style, &theme.font_family);
    }

    for (id, point) in scene.layout.iter() {
        let center = frame.project(point);
        let size = render.label_font_size;
        if render.label_boxes {
            let width = measure_text_width(id, size, &theme.font_family, render.label_bold);
            let pad = size * 0.3;
            let x = center.0 - width / 2.0 - pad;
            let y = center.1 - size * LINE_HEIGHT / 2.0 - pad;
            let w = width + 2.0 * pad;
            let h = size * LINE_HEIGHT + 2.0 * pad;
            canvas.include(x, y, x + w, y + h);
            canvas.push(&format!(
                "<rect class=\"label-box\" x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{pad:.2}\" ry=\"{pad:.2}\" fill=\"{}\" fill-opacity=\"0.8\" stroke=\"{}\" stroke-width=\"0.5\"/>",
                theme.label_box_fill, theme.label_box_stroke
            ));
        }
        let style = TextStyle {
            size,
            bold: render.label_bold,
            color: &theme.text_color,
            anchor: Anchor::Middle,
        };
        draw_text(&mut canvas, center, id, &style, &theme.font_family);
    }

    for legend in legends_for(scene.dataset, theme) {
        draw_legend(&mut canvas, &frame, &legend, theme, render);
    }

    draw_title(&mut canvas, &frame, &scene.dataset.title, theme, render);

    finish(canvas, &markers, head, theme, render)
}

fn draw_legend(canvas: &mut Canvas, frame: &Frame, legend: &Legend, theme: &Theme, render: &RenderConfig) {
    if legend.entries.is_empty() {
        return;
    }
    let font = render.legend_font_size;
    let title_font = font + 1.0;
    let family = theme.font_family.as_str();
    let pad = font * 0.4;
    let row = font * 1.4;
    let handle = font * 2.0;
    let gap = font * 0.8;

    let label_width = legend
        .entries
        .iter()
        .map(|entry| measure_text_width(&entry.label, font, family, false))
        .fold(0.0, f32::max);
    let title_width = legend
        .title
        .as_deref()
        .map(|title| measure_text_width(title, title_font, family, false))
        .unwrap_or(0.0);
    let title_height = if legend.title.is_some() { title_font * 1.4 } else { 0.0 };
    let width = (pad + handle + gap + label_width).max(title_width) + pad;
    let height = pad * 2.0 + title_height + row * legend.entries.len() as f32;

    let border = font * 0.5;
    let x = match legend.anchor {
        LegendAnchor::UpperLeft | LegendAnchor::LowerLeft => frame.left + border,
        LegendAnchor::UpperRight => frame.left + frame.width - border - width,
    };
    let y = match legend.anchor {
        LegendAnchor::UpperLeft | LegendAnchor::UpperRight => frame.top + border,
        LegendAnchor::LowerLeft => frame.top + frame.height - border - height,
    };

    canvas.include(x, y, x + width, y + height);
    canvas.push(&format!(
        "<g class=\"legend\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"{pad:.2}\" ry=\"{pad:.2}\" fill=\"{}\" fill-opacity=\"0.95\" stroke=\"{}\" stroke-width=\"0.8\"/>",
        theme.legend_background, theme.legend_border
    ));

    let mut cursor = y + pad;
    if let Some(title) = &legend.title {
        let style = TextStyle {
            size: title_font,
            bold: false,
            color: &theme.text_color,
            anchor: Anchor::Middle,
        };
        draw_text(canvas, (x + width / 2.0, cursor + title_height / 2.0), title, &style, family);
        cursor += title_height;
    }

    for entry in &legend.entries {
        let mid = cursor + row / 2.0;
        let hx = x + pad;
        match &entry.marker {
            LegendMarker::Patch { color } => {
                let h = font * 0.7;
                canvas.push(&format!(
                    "<rect x=\"{hx:.2}\" y=\"{:.2}\" width=\"{handle:.2}\" height=\"{h:.2}\" fill=\"{color}\"/>",
                    mid - h / 2.0
                ));
            }
            LegendMarker::Line(stroke) => {
                canvas.push(&format!(
                    "<line x1=\"{hx:.2}\" y1=\"{mid:.2}\" x2=\"{:.2}\" y2=\"{mid:.2}\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"{}/>",
                    hx + handle,
                    stroke.color,
                    stroke.width,
                    stroke.alpha,
                    stroke.dash_attr()
                ));
            }
        }
        let style = TextStyle {
            size: font,
            bold: false,
            color: &theme.text_color,
            anchor: Anchor::Start,
        };
        draw_text(canvas, (hx + handle + gap, mid), &entry.label, &style, family);
        cursor += row;
    }
    canvas.push("</g>");
}

fn draw_title(canvas: &mut Canvas, frame: &Frame, title: &str, theme: &Theme, render: &RenderConfig) {
    let lines: Vec<&str> = title.lines().collect();
    let size = render.title_font_size;
    let line_height = size * LINE_HEIGHT;
    let bottom = frame.top - size;
    let x = frame.left + frame.width / 2.0;
    let style = TextStyle {
        size,
        bold: render.label_bold,
        color: &theme.title_color,
        anchor: Anchor::Middle,
    };
    for (idx, line) in lines.iter().enumerate() {
        let y = bottom - (lines.len() - idx) as f32 * line_height + line_height / 2.0;
        draw_text(canvas, (x, y), line, &style, &theme.font_family);
    }
}

/// Wraps the body in an `<svg>` whose viewBox is the drawn extent plus
/// `pad_inches`.
fn finish(
    canvas: Canvas,
    markers: &IndexMap<String, String>,
    head: f32,
    theme: &Theme,
    render: &RenderConfig,
) -> String {
    let figure = render.figure_size * POINTS_PER_INCH;
    let extent = canvas.extent.unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: figure,
        max_y: figure,
    });
    let pad = render.pad_inches * POINTS_PER_INCH;
    let x = extent.min_x - pad;
    let y = extent.min_y - pad;
    let width = extent.width() + 2.0 * pad;
    let height = extent.height() + 2.0 * pad;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{x:.2} {y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        theme.background
    ));
    if !markers.is_empty() {
        svg.push_str("<defs>");
        for (color, id) in markers {
            svg.push_str(&format!(
                "<marker id=\"{id}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerUnits=\"userSpaceOnUse\" markerWidth=\"{head:.2}\" markerHeight=\"{head:.2}\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
            ));
        }
        svg.push_str("</defs>");
    }
    svg.push_str(&canvas.body);
    svg.push_str("</svg>");
    svg
}

/// Writes `svg` to `path` in `render.format`, creating parent directories.
pub fn write_output(svg: &str, path: &Path, render: &RenderConfig) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match render.format {
        OutputFormat::Svg => std::fs::write(path, svg).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?,
        OutputFormat::Png => write_png(svg, path, render)?,
    }
    tracing::info!(path = %path.display(), format = ?render.format, "figure saved");
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, path: &Path, render: &RenderConfig) -> Result<(), RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render.dpi / POINTS_PER_INCH;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(RenderError::Raster { width, height })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    let data = pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    std::fs::write(path, data).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _path: &Path, _render: &RenderConfig) -> Result<(), RenderError> {
    Err(RenderError::PngUnsupported)
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build_graph};
    use crate::dataset::Variant;
    use crate::layout::compute_layout;

    fn render_variant(variant: Variant) -> String {
        let dataset = Dataset::for_variant(variant);
        let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
        let config = Config::for_variant(variant);
        let layout = compute_layout(&graph, &config.layout);
        render_svg(&Scene::new(&dataset, &graph, &layout, &config))
    }

    #[test]
    fn stroke_depends_on_relation_and_strength() {
        let theme = Theme::enhanced();
        let strong = EdgeData::new(Relation::Inhibits, Some(Strength::High));
        let stroke = EdgeStroke::for_edge(&strong, Richness::Weighted, &theme, 1.2);
        assert!(stroke.dashed);
        assert_eq!(stroke.color, "#E74C3C");
        assert_eq!(stroke.width, 2.5);
        assert_eq!(stroke.alpha, 0.9);

        let weak = EdgeData::new(Relation::Boosts, Some(Strength::Low));
        let stroke = EdgeStroke::for_edge(&weak, Richness::Weighted, &theme, 1.2);
        assert!(!stroke.dashed);
        assert_eq!(stroke.color, "#27AE60");
        assert_eq!(stroke.width, 1.2);
        assert_eq!(stroke.alpha, 0.5);

        let plain = EdgeData::new(Relation::Inhibits, None);
        let stroke = EdgeStroke::for_edge(&plain, Richness::Plain, &Theme::plain(), 1.3);
        assert!(stroke.dashed);
        assert_eq!(stroke.color, "#000000");
        assert_eq!(stroke.width, 1.3);
        assert_eq!(stroke.alpha, 1.0);
    }

    #[test]
    fn missing_strength_renders_as_medium() {
        let theme = Theme::enhanced();
        let undeclared = EdgeData::new(Relation::Boosts, None);
        let stroke = EdgeStroke::for_edge(&undeclared, Richness::Weighted, &theme, 1.2);
        assert_eq!(stroke.width, 1.8);
        assert_eq!(stroke.alpha, 0.7);
    }

    #[test]
    fn positive_rad_bows_toward_lower_data_y() {
        // Travelling along +x, the control point lands below the chord in
        // data space, which is larger y on screen.
        let curve = ArcCurve::new((0.0, 0.0), (100.0, 0.0), 0.2, 0.0).unwrap();
        assert_eq!(curve.control, (50.0, 20.0));
        assert_eq!(curve.start, (0.0, 0.0));
        assert_eq!(curve.end, (100.0, 0.0));
    }

    #[test]
    fn arc_is_trimmed_by_node_radius() {
        let curve = ArcCurve::new((0.0, 0.0), (100.0, 0.0), 0.0, 10.0).unwrap();
        assert!((curve.start.0 - 10.0).abs() < 1e-4);
        assert!((curve.end.0 - 90.0).abs() < 1e-4);
        assert!(ArcCurve::new((5.0, 5.0), (5.0, 5.0), 0.2, 10.0).is_none());
    }

    #[test]
    fn curve_extent_covers_the_bulge() {
        let curve = ArcCurve::new((0.0, 0.0), (100.0, 0.0), 0.2, 0.0).unwrap();
        let extent = curve.extent();
        assert!((extent.max_y - 10.0).abs() < 1e-3);
        assert_eq!(extent.min_y, 0.0);
    }

    #[test]
    fn glyph_offset_scales_with_length() {
        let at = glyph_anchor(Point::new(0.0, 0.0), Point::new(2.0, 0.0), 0.05);
        assert!((at.x - 1.0).abs() < 1e-6);
        assert!((at.y - 0.1).abs() < 1e-6);
        let same = glyph_anchor(Point::new(0.3, 0.3), Point::new(0.3, 0.3), 0.05);
        assert_eq!(same, Point::new(0.3, 0.3));
    }

    #[test]
    fn enhanced_has_three_legends() {
        let legends = legends_for(&Dataset::enhanced(), &Theme::enhanced());
        let anchors: Vec<LegendAnchor> = legends.iter().map(|l| l.anchor).collect();
        assert_eq!(
            anchors,
            vec![LegendAnchor::UpperLeft, LegendAnchor::UpperRight, LegendAnchor::LowerLeft]
        );
        assert_eq!(legends[0].entries.len(), 5);
        assert_eq!(legends[1].entries[1].label, "Inhibits Absorption (\u{2212})");
        assert_eq!(legends[2].entries[0].label, "High Impact");
    }

    #[test]
    fn plain_legends() {
        let coloured = legends_for(&Dataset::coloured(), &Theme::tab10());
        assert_eq!(coloured.len(), 1);
        assert_eq!(coloured[0].entries.len(), 7);

        let elements = legends_for(&Dataset::elements(), &Theme::plain());
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].anchor, LegendAnchor::UpperLeft);
        assert_eq!(elements[0].entries[0].label, "Boosts (+)");
    }

    #[test]
    fn svg_contains_every_node_and_edge() {
        for variant in Variant::ALL {
            let svg = render_variant(variant);
            let dataset = Dataset::for_variant(variant);
            let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
            assert!(svg.starts_with("<svg"));
            assert!(svg.ends_with("</svg>"));
            assert_eq!(svg.matches("class=\"node\"").count(), graph.node_count());
            assert_eq!(svg.matches("class=\"edge\"").count(), graph.edge_count());
        }
    }

    #[test]
    fn inhibiting_edges_are_dashed() {
        let svg = render_variant(Variant::Enhanced);
        for edge in svg.split("<g class=\"edge\"").skip(1) {
            let edge = &edge[..edge.find("</g>").unwrap()];
            let dashed = edge.contains("stroke-dasharray");
            assert_eq!(dashed, edge.contains("data-relation=\"inhibits\""), "{edge}");
        }
    }

    #[test]
    fn enhanced_title_spans_two_lines() {
        let svg = render_variant(Variant::Enhanced);
        assert!(svg.contains(">Micronutrient Interaction Network</text>"));
        assert!(svg.contains(">(Grouped by Biological Function)</text>"));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml("A & <B>"), "A &amp; &lt;B&gt;");
    }

    #[test]
    fn write_svg_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/figure.svg");
        let render = RenderConfig {
            format: OutputFormat::Svg,
            ..RenderConfig::default()
        };
        write_output("<svg xmlns=\"http://www.w3.org/2000/svg\"/>", &path, &render).unwrap();
        assert!(path.exists());
    }
}
