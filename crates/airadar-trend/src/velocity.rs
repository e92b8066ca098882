use airadar_core::ScoreSnapshot;

/// Elapsed time below which two readings are treated as simultaneous.
const MIN_ELAPSED_HOURS: f64 = 0.1;

/// Score change per hour between the earliest and latest snapshot.
///
/// Returns `0.0` with fewer than two snapshots or when they are less than six
/// minutes apart. Declining scores give a negative result; clamping is left to
/// the scorer.
#[must_use]
pub fn velocity(snapshots: &[ScoreSnapshot]) -> f64 {
    if snapshots.len() < 2 {
        return 0.0;
    }
    let (Some(first), Some(last)) = (
        snapshots.iter().min_by_key(|s| s.checked_at),
        snapshots.iter().max_by_key(|s| s.checked_at),
    ) else {
        return 0.0;
    };

    #[allow(clippy::cast_precision_loss)]
    let hours = (last.checked_at - first.checked_at).num_milliseconds() as f64 / 3_600_000.0;
    if hours < MIN_ELAPSED_HOURS {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let delta = (last.score - first.score) as f64;
    delta / hours
}
