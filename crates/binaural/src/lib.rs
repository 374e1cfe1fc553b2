//! Binaural rendering of a single source over headphones.
//!
//! A [BinauralRenderer] takes a mono stream and a direction and distance for it, and produces stereo which sounds like
//! it comes from there.  The direction is applied with head-related impulse responses from a [MeasurementSet], blended
//! between the nearest measurements; the distance is an inverse-square gain.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use binaural::{BinauralRenderer, MeasurementSet, RendererConfig};
//!
//! # fn main() -> binaural::Result<()> {
//! let set = Arc::new(MeasurementSet::load("hrtf.json")?);
//! let mut renderer = BinauralRenderer::new(set, RendererConfig::default())?;
//!
//! // From any thread:
//! let params = renderer.parameters();
//! params.set_azimuth(30.0);
//! params.set_distance(2.0)?;
//!
//! // From the audio thread:
//! let input = [0.0f32; 256];
//! let mut output = [0.0f32; 512];
//! renderer.process_mono(&input, &mut output)?;
//! # Ok(())
//! # }
//! ```
#[macro_use]
mod logging;

mod change_detector;
mod config;
mod crossfade;
mod error;
pub mod interpolation;
mod is_audio_thread;
mod parameters;
mod renderer;

pub use binaural_datasets::{Direction, Ear, LoadError, Measurement, MeasurementSet};
pub use binaural_dsp::ChannelFormat;
pub use config::*;
pub use crossfade::CrossfadeState;
pub use error::*;
pub use interpolation::{
    DirectionalInterpolator, FilterPair, InverseDistanceWeighting, NearestNeighbor,
    NeighborWeighting,
};
pub use parameters::*;
pub use renderer::*;
