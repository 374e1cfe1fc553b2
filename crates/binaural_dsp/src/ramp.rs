//! The crossfade ramp.
use std::f64::consts::PI;
use std::num::NonZeroUsize;

/// Weight of the incoming signal `position` samples into a crossfade lasting `duration` samples.
///
/// This is a raised cosine (half a Hann window): `0.5 * (1 - cos(pi * position / duration))`.  It is 0 at the start, 1
/// at `duration`, monotonic in between, and has zero slope at both ends so that neither edge of the fade is audible.
/// Positions past the end clamp to 1.
pub fn raised_cosine(position: usize, duration: NonZeroUsize) -> f32 {
    let duration = duration.get();
    if position >= duration {
        return 1.0;
    }

    let phase = PI * position as f64 / duration as f64;
    (0.5 * (1.0 - phase.cos())) as f32
}
