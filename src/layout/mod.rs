mod spring;
pub(crate) mod types;
pub use spring::SpringParams;
pub use types::*;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::config::{LayoutAlgorithm, LayoutConfig};
use crate::ir::InteractionGraph;

pub fn compute_layout(graph: &InteractionGraph, config: &LayoutConfig) -> Layout {
    let mut layout = match config.algorithm {
        LayoutAlgorithm::Spring => spring::spring_layout(graph, &config.spring_params()),
        LayoutAlgorithm::Circular => spring::circular_layout(graph, config.scale),
    };

    if let Some(sigma) = config.jitter {
        perturb(&mut layout, sigma, config.jitter_seed);
    }

    tracing::debug!(
        algorithm = ?config.algorithm,
        nodes = layout.len(),
        "layout computed"
    );
    layout
}

/// Adds independent `N(0, sigma)` noise to every coordinate, x then y, in
/// node order. Runs after the layout has converged.
pub fn perturb(layout: &mut Layout, sigma: f64, seed: u64) {
    if !(sigma.is_finite() && sigma >= 0.0) {
        tracing::warn!(sigma, "skipping layout jitter: sigma must be finite and non-negative");
        return;
    }
    let normal = match Normal::new(0.0, sigma) {
        Ok(normal) => normal,
        Err(err) => {
            tracing::warn!(sigma, %err, "skipping layout jitter");
            return;
        }
    };
    let mut rng = StdRng::seed_from_u64(seed);
    for point in layout.points_mut() {
        point.x += normal.sample(&mut rng) as f32;
        point.y += normal.sample(&mut rng) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build_graph};
    use crate::config::Config;
    use crate::dataset::{Dataset, Variant};

    #[test]
    fn identical_input_gives_identical_layout() {
        for variant in Variant::ALL {
            let dataset = Dataset::for_variant(variant);
            let graph = build_graph(&dataset, &BuildOptions::default()).unwrap();
            let config = Config::for_variant(variant);
            let first = compute_layout(&graph, &config.layout);
            let second = compute_layout(&graph, &config.layout);
            assert_eq!(first, second, "{variant:?}");
            assert_eq!(first.len(), graph.node_count());
            for id in graph.node_ids() {
                let point = first.get(id).unwrap();
                assert!(point.x.is_finite() && point.y.is_finite());
            }
        }
    }

    #[test]
    fn jitter_is_seeded_and_small() {
        let graph = build_graph(&Dataset::enhanced(), &BuildOptions::default()).unwrap();
        let mut config = Config::for_variant(Variant::Enhanced).layout;
        config.jitter = None;
        let base = compute_layout(&graph, &config);

        let mut a = base.clone();
        let mut b = base.clone();
        perturb(&mut a, 0.02, 42);
        perturb(&mut b, 0.02, 42);
        assert_eq!(a, b);
        assert_ne!(a, base);
        for (id, point) in a.iter() {
            let origin = base.get(id).unwrap();
            assert!((point.x - origin.x).abs() < 0.2);
            assert!((point.y - origin.y).abs() < 0.2);
        }
    }

    #[test]
    fn invalid_sigma_leaves_layout_untouched() {
        let mut layout = Layout::new();
        layout.insert("A", Point::new(0.5, -0.5));
        let before = layout.clone();
        perturb(&mut layout, -1.0, 42);
        assert_eq!(layout, before);
        perturb(&mut layout, f64::NAN, 42);
        assert_eq!(layout, before);

        let graph = build_graph(&Dataset::reduced(), &BuildOptions::default()).unwrap();
        let mut config = Config::for_variant(Variant::Reduced).layout;
        let plain = compute_layout(&graph, &config);
        config.jitter = Some(-0.5);
        assert_eq!(compute_layout(&graph, &config), plain);
    }
}
