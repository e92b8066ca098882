//! Composite scoring for topic clusters.
//!
//! Every function here is pure: the same cluster, velocity and weights always
//! produce the same score.

use airadar_core::SourceType;

use crate::types::{ScoringWeights, TopicCluster};

const MAX_COMPONENT: f64 = 100.0;

/// Points per distinct source; five sources saturate the component.
const POINTS_PER_SOURCE: f64 = 20.0;

/// `min(100, sources × 20)`.
#[must_use]
pub fn cross_source_component(source_count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let raw = source_count as f64 * POINTS_PER_SOURCE;
    raw.min(MAX_COMPONENT)
}

/// Caps velocity at 100. Negative velocity passes through unchanged.
#[must_use]
pub fn velocity_component(max_velocity: f64) -> f64 {
    max_velocity.min(MAX_COMPONENT)
}

/// Piecewise compression of a mean raw score onto `[0, 100]`.
///
/// | mean          | component         |
/// |---------------|-------------------|
/// | ≤ 0           | 0                 |
/// | (0, 10]       | 0 → 20 linearly   |
/// | (10, 100]     | 20 → 60 linearly  |
/// | (100, 1000]   | 60 → 100 linearly |
/// | > 1000        | 100               |
#[must_use]
pub fn absolute_component(mean_score: f64) -> f64 {
    if mean_score <= 0.0 {
        0.0
    } else if mean_score > 1000.0 {
        MAX_COMPONENT
    } else if mean_score > 100.0 {
        60.0 + (mean_score - 100.0) / 900.0 * 40.0
    } else if mean_score > 10.0 {
        20.0 + (mean_score - 10.0) / 90.0 * 40.0
    } else {
        mean_score / 10.0 * 20.0
    }
}

/// Weighted sum of the cross-source, velocity and absolute components.
///
/// `max_velocity` is the highest per-item velocity in the cluster. Weights are
/// applied as given, without renormalization.
#[must_use]
pub fn composite_score(
    cluster: &TopicCluster,
    max_velocity: f64,
    weights: &ScoringWeights,
) -> f64 {
    cross_source_component(cluster.source_count()) * weights.cross_source
        + velocity_component(max_velocity) * weights.velocity
        + absolute_component(cluster.mean_score()) * weights.absolute
}

/// Scale a source-native score onto `0..=100` using a per-source ceiling.
///
/// Sources without a known ceiling always normalize to `0`.
#[must_use]
pub fn normalize_source_score(score: i64, source: SourceType) -> f64 {
    let ceiling = match source {
        SourceType::HackerNews => 500.0,
        SourceType::Reddit => 1000.0,
        SourceType::GitHub => 100.0,
        SourceType::YouTube => 10_000.0,
        SourceType::ArXiv | SourceType::Twitter | SourceType::Rss => return 0.0,
    };
    #[allow(clippy::cast_precision_loss)]
    let ratio = score as f64 / ceiling * 100.0;
    ratio.min(MAX_COMPONENT)
}
