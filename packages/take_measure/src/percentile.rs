//! Nearest-rank percentile selection.

/// Selects the element at the nearest rank for `percentile` (in `0.0..=1.0`) from an
/// ascending-sorted slice.
///
/// The index is `round((n - 1) * percentile)`, clamped to the bounds of the slice. No
/// interpolation takes place: the result is always one of the samples. Ties between equal
/// samples are resolved by position in the slice, which is deterministic for a stable sort.
///
/// Returns `None` for an empty slice.
pub(crate) fn nearest_rank<T: Copy>(sorted: &[T], percentile: f64) -> Option<T> {
    let last_index = sorted.len().checked_sub(1)?;

    sorted.get(nearest_rank_index(last_index, percentile)).copied()
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "sample counts are far below 2^52 and the result is clamped to the valid range"
)]
fn nearest_rank_index(last_index: usize, percentile: f64) -> usize {
    let rank = (last_index as f64 * percentile).round();

    if rank.is_nan() || rank <= 0.0 {
        0
    } else if rank >= last_index as f64 {
        last_index
    } else {
        rank as usize
    }
}
