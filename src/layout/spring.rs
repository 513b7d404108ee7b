use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ir::InteractionGraph;

use super::{Layout, Point};

const MIN_DISTANCE: f64 = 0.01;
/// Stand-in length for near-zero displacements.
const SMALL_STEP_LENGTH: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct SpringParams {
    /// Optimal node distance; `1/sqrt(n)` when unset.
    pub k: Option<f64>,
    pub iterations: usize,
    pub seed: u64,
    pub scale: f64,
    pub threshold: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            k: None,
            iterations: 50,
            seed: 42,
            scale: 1.0,
            threshold: 1e-4,
        }
    }
}

/// Fruchterman-Reingold force-directed placement.
///
/// Starts from seeded uniform positions in the unit square and cools the step
/// size linearly. Edges with a declared strength pull with their line width;
/// plain edges pull with weight 1. The result is centered on the origin with
/// its largest coordinate scaled to `params.scale`.
pub(super) fn spring_layout(graph: &InteractionGraph, params: &SpringParams) -> Layout {
    let ids: Vec<&str> = graph.node_ids().collect();
    let n = ids.len();
    if n == 0 {
        return Layout::new();
    }
    if n == 1 {
        let mut layout = Layout::new();
        layout.insert(ids[0], Point::default());
        return layout;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.r#gen::<f64>(), rng.r#gen::<f64>()]).collect();
    let adjacency = adjacency_matrix(graph, n);
    let k = params.k.unwrap_or_else(|| (1.0 / n as f64).sqrt());

    let span_x = span(pos.iter().map(|p| p[0]));
    let span_y = span(pos.iter().map(|p| p[1]));
    let mut t = span_x.max(span_y) * 0.1;
    let dt = t / (params.iterations as f64 + 1.0);

    let mut displacement = vec![[0.0f64; 2]; n];
    for iteration in 0..params.iterations {
        for (i, disp) in displacement.iter_mut().enumerate() {
            *disp = [0.0, 0.0];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / (distance * distance) - adjacency[i * n + j] * distance / k;
                disp[0] += dx * force;
                disp[1] += dy * force;
            }
        }

        let mut moved = 0.0f64;
        for (point, disp) in pos.iter_mut().zip(&displacement) {
            let length = step_length(*disp);
            let step_x = disp[0] * t / length;
            let step_y = disp[1] * t / length;
            point[0] += step_x;
            point[1] += step_y;
            moved += step_x * step_x + step_y * step_y;
        }
        t -= dt;

        if moved.sqrt() / (n as f64) < params.threshold {
            tracing::debug!(iteration, "spring layout converged");
            break;
        }
    }

    let mut layout = Layout::new();
    for (id, point) in ids.iter().zip(rescale(pos, params.scale)) {
        layout.insert(id, Point::new(point[0] as f32, point[1] as f32));
    }
    layout
}

/// Evenly spaced positions on a circle, in node order.
/// Norm of a displacement, replaced by a fixed length below `MIN_DISTANCE`.
fn step_length(disp: [f64; 2]) -> f64 {
    let length = (disp[0] * disp[0] + disp[1] * disp[1]).sqrt();
    if length < MIN_DISTANCE { SMALL_STEP_LENGTH } else { length }
}

pub(super) fn circular_layout(graph: &InteractionGraph, scale: f64) -> Layout {
    let ids: Vec<&str> = graph.node_ids().collect();
    let n = ids.len();
    let mut layout = Layout::new();
    if n == 1 {
        layout.insert(ids[0], Point::default());
        return layout;
    }
    let pos: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let theta = i as f64 / n as f64 * std::f64::consts::TAU;
            [theta.cos(), theta.sin()]
        })
        .collect();
    for (id, point) in ids.iter().zip(rescale(pos, scale)) {
        layout.insert(id, Point::new(point[0] as f32, point[1] as f32));
    }
    layout
}

/// Row-major directed adjacency, `a[i * n + j]` for the edge `i -> j`.
fn adjacency_matrix(graph: &InteractionGraph, n: usize) -> Vec<f64> {
    let mut adjacency = vec![0.0f64; n * n];
    for (from, to, data) in graph.edges() {
        let (Some(i), Some(j)) = (graph.node_index(from), graph.node_index(to)) else {
            continue;
        };
        let weight = match data.strength {
            Some(_) => data.weight.width as f64,
            None => 1.0,
        };
        adjacency[i * n + j] = weight;
    }
    adjacency
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}

fn rescale(mut pos: Vec<[f64; 2]>, scale: f64) -> Vec<[f64; 2]> {
    let n = pos.len().max(1) as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;
    let mut limit = 0.0f64;
    for point in pos.iter_mut() {
        point[0] -= mean_x;
        point[1] -= mean_y;
        limit = limit.max(point[0].abs()).max(point[1].abs());
    }
    if limit > 0.0 {
        for point in pos.iter_mut() {
            point[0] *= scale / limit;
            point[1] *= scale / limit;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EdgeData, Relation};

    fn triangle() -> InteractionGraph {
        let mut graph = InteractionGraph::new();
        graph.add_edge("A", "B", EdgeData::new(Relation::Boosts, None));
        graph.add_edge("B", "C", EdgeData::new(Relation::Inhibits, None));
        graph.add_edge("C", "A", EdgeData::new(Relation::Inhibits, None));
        graph
    }

    #[test]
    fn rescaled_into_unit_box() {
        let layout = spring_layout(&triangle(), &SpringParams::default());
        let max = layout
            .iter()
            .map(|(_, p)| p.x.abs().max(p.y.abs()))
            .fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-5);
        let (sx, sy) = layout
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (_, p)| (sx + p.x, sy + p.y));
        assert!(sx.abs() < 1e-4 && sy.abs() < 1e-4);
    }

    #[test]
    fn seed_changes_the_result() {
        let a = spring_layout(&triangle(), &SpringParams::default());
        let b = spring_layout(
            &triangle(),
            &SpringParams {
                seed: 7,
                ..SpringParams::default()
            },
        );
        assert_ne!(a, b);
    }

    #[test]
    fn degenerate_graphs() {
        assert!(spring_layout(&InteractionGraph::new(), &SpringParams::default()).is_empty());
        let mut single = InteractionGraph::new();
        single.add_node("A", None);
        let layout = spring_layout(&single, &SpringParams::default());
        assert_eq!(layout.get("A"), Some(Point::default()));
    }

    #[test]
    fn circle_positions_are_on_the_unit_circle() {
        let layout = circular_layout(&triangle(), 1.0);
        assert_eq!(layout.len(), 3);
        let first = layout.get("A").unwrap();
        assert!((first.x - 1.0).abs() < 1e-5 && first.y.abs() < 1e-5);
        for (_, p) in layout.iter() {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn tiny_displacements_use_the_fixed_step_length() {
        assert_eq!(step_length([0.0, 0.0]), SMALL_STEP_LENGTH);
        assert_eq!(step_length([0.003, 0.004]), SMALL_STEP_LENGTH);
        assert!((step_length([0.03, 0.04]) - 0.05).abs() < 1e-12);
    }
}
