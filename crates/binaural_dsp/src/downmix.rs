//! Collapsing multichannel input to mono.
use crate::ChannelFormat;

/// Average the channels of each interleaved frame in `input`, writing one sample per frame to `output`.
///
/// Samples which are absent do not count toward the average.  A sample is absent if it is NaN, or if it would be past
/// the end of `input` in a trailing partial frame.  A frame with no samples at all becomes 0.
///
/// Returns the number of frames written, which is `format.frames_in(input.len())`.
///
/// # Panics
///
/// Panics if `output` is shorter than the number of frames in `input`.
pub fn downmix_to_mono(input: &[f32], format: &ChannelFormat, output: &mut [f32]) -> usize {
    let channels = format.get_channel_count().get();
    let frames = format.frames_in(input.len());
    assert!(
        output.len() >= frames,
        "Output has room for {} frames, but input has {}",
        output.len(),
        frames
    );

    if format.is_mono() {
        for (o, i) in output.iter_mut().zip(input.iter()) {
            *o = if i.is_nan() { 0.0 } else { *i };
        }
        return frames;
    }

    for (o, frame) in output.iter_mut().zip(input.chunks(channels)) {
        let mut sum = 0.0f32;
        let mut present = 0u32;
        for s in frame.iter().filter(|s| !s.is_nan()) {
            sum += *s;
            present += 1;
        }

        *o = if present == 0 {
            0.0
        } else {
            sum / present as f32
        };
    }

    frames
}
