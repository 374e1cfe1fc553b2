//! Signal-level building blocks for binaural rendering.
//!
//! Nothing in here knows about HRTFs.  These are the pieces that run on the audio thread: a streaming FIR filter, the
//! crossfade ramp, channel downmixing and level handling.
mod channel_format;
#[cfg(test)]
mod close_floats;
pub mod downmix;
pub mod level;
pub mod ramp;
mod streaming_fir;

pub use channel_format::*;
pub use streaming_fir::*;
