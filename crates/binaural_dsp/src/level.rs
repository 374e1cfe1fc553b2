//! Distance attenuation and clip protection.

/// The amplitude multiplier for a source at `distance`, relative to one at `reference_distance`: `(reference /
/// distance)^2`.
///
/// Both distances must be positive; that is validated where they come in, not here.
pub fn inverse_square_gain(reference_distance: f64, distance: f64) -> f64 {
    let ratio = reference_distance / distance;
    ratio * ratio
}

pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// The largest absolute sample value in `samples`, or 0 for an empty slice.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// If the peak of `samples` is over 1.0, scale everything down so that it is exactly 1.0.
///
/// Returns the peak that was found if scaling happened.  This has no memory: it looks at one block and nothing else,
/// and a block which is already in range (including an all-zero block) is left alone.  Applying it twice is the same as
/// applying it once.
pub fn normalize_peak(samples: &mut [f32]) -> Option<f32> {
    let peak = peak(samples);
    if peak <= 1.0 {
        return None;
    }

    // Divide rather than multiplying by the reciprocal: `peak / peak` is exactly 1 and nothing else can round above it.
    for s in samples.iter_mut() {
        *s /= peak;
    }

    Some(peak)
}

pub fn gain_to_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}
