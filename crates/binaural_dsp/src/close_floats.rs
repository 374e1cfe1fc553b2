//! Test assertions for floats which should match to within a threshold.
//!
//! Thresholds are absolute.  Samples here live in roughly `-1.0..=1.0`, where that is what we want.

#[track_caller]
pub(crate) fn close_floats64(actual: f64, expected: f64, threshold: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < threshold,
        "Got {}, expected {}: off by {}, allowed {}",
        actual,
        expected,
        diff,
        threshold
    );
}

/// Widens to f64 first, so the difference itself doesn't round.
#[track_caller]
pub(crate) fn close_floats32(actual: f32, expected: f32, threshold: f32) {
    close_floats64(actual as f64, expected as f64, threshold as f64);
}

/// [close_floats32] on every pair of samples.  The lengths must match.
#[track_caller]
pub(crate) fn close_slices32(actual: &[f32], expected: &[f32], threshold: f32) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Lengths differ: {:?} vs {:?}",
        actual,
        expected
    );

    let worst = actual
        .iter()
        .zip(expected.iter())
        .map(|(a, e)| (*a as f64 - *e as f64).abs())
        .enumerate()
        .max_by(|x, y| x.1.total_cmp(&y.1));

    if let Some((index, diff)) = worst {
        assert!(
            diff < threshold as f64,
            "Index {} is off by {}, allowed {}\nGot:      {:?}\nExpected: {:?}",
            index,
            diff,
            threshold,
            actual,
            expected
        );
    }
}
