//! Raw sample cleanup.
//!
//! Recordings start and end with the vehicle standing still, which produces
//! a cloud of near-duplicate samples around the first and last positions.
//! Those are dropped here, and time is re-based so every path starts at 0.

use log::{debug, warn};

use crate::Sample;
use crate::geo_utils::euclidean_distance;

/// Normalize a raw sample sequence into a path.
///
/// - Non-finite samples are dropped, as are samples whose timestamps break
///   the longest time-ordered run of the recording.
/// - The first and last samples are always kept; time is re-based so the
///   first sample is at 0.
/// - Interior samples closer than `threshold` to the first or the last
///   sample are dropped as idle jitter.
///
/// Running it again on its own output changes nothing.
///
/// # Example
/// ```
/// use routesync::{Sample, preprocess};
///
/// let raw = vec![
///     Sample::new(0.0, 0.0, 5_000.0),
///     Sample::new(1.0, 1.0, 6_000.0),   // idle at the start
///     Sample::new(50.0, 0.0, 7_000.0),
///     Sample::new(100.0, 0.0, 8_000.0),
/// ];
/// let path = preprocess(&raw, 15.0);
/// assert_eq!(path.len(), 3);
/// assert_eq!(path[0].time, 0.0);
/// assert_eq!(path[2].time, 3_000.0);
/// ```
pub fn preprocess(samples: &[Sample], threshold: f64) -> Vec<Sample> {
    let samples = sanitize(samples);

    let (first, last) = match samples.as_slice() {
        [] => return Vec::new(),
        [only] => return vec![Sample { time: 0.0, ..*only }],
        [first, .., last] => (*first, *last),
    };

    let mut path = Vec::with_capacity(samples.len());
    path.push(Sample { time: 0.0, ..first });

    let interior = &samples[1..samples.len() - 1];
    for s in interior {
        let p = s.point();
        if euclidean_distance(p, first.point()) < threshold
            || euclidean_distance(p, last.point()) < threshold
        {
            continue;
        }
        path.push(Sample {
            time: s.time - first.time,
            ..*s
        });
    }

    path.push(Sample {
        time: last.time - first.time,
        ..last
    });

    debug!(
        "[Preprocess] {} samples -> {} (dropped {} idle)",
        samples.len(),
        path.len(),
        samples.len() - path.len()
    );

    path
}

/// Preprocess a raw recording, then shift it by the route's time offset.
///
/// The offset is applied after trimming and never influences which samples
/// are kept.
pub fn prepare_path(samples: &[Sample], threshold: f64, offset_ms: f64) -> Vec<Sample> {
    let mut path = preprocess(samples, threshold);
    apply_time_offset(&mut path, offset_ms);
    path
}

/// Shift every sample time by a constant offset in milliseconds.
pub fn apply_time_offset(path: &mut [Sample], offset_ms: f64) {
    if offset_ms == 0.0 {
        return;
    }
    for s in path.iter_mut() {
        s.time += offset_ms;
    }
}

/// Drop non-finite samples, then keep the longest run of samples whose
/// times never go backwards.
///
/// A single sample with a bogus timestamp is dropped on its own instead of
/// taking every later sample with it.
fn sanitize(samples: &[Sample]) -> Vec<Sample> {
    let finite: Vec<Sample> = samples.iter().filter(|s| s.is_valid()).copied().collect();
    let invalid = samples.len() - finite.len();

    // Longest non-decreasing subsequence by time, O(n log n)
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; finite.len()];
    for (i, s) in finite.iter().enumerate() {
        let pos = tails.partition_point(|&j| finite[j].time <= s.time);
        prev[i] = pos.checked_sub(1).map(|p| tails[p]);
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut kept = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        kept.push(finite[i]);
        cursor = prev[i];
    }
    kept.reverse();

    let regressed = finite.len() - kept.len();
    if invalid > 0 || regressed > 0 {
        warn!(
            "[Preprocess] Dropped {} non-finite and {} out-of-order samples",
            invalid, regressed
        );
    }

    kept
}
