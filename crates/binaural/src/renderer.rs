use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use binaural_datasets::{Direction, MeasurementSet};
use binaural_dsp::downmix::downmix_to_mono;
use binaural_dsp::level::{apply_gain, gain_to_db, inverse_square_gain, normalize_peak};
use binaural_dsp::ChannelFormat;

use crate::change_detector::ChangeDetector;
use crate::crossfade::{CrossfadeController, CrossfadeState};
use crate::interpolation::{
    DirectionalInterpolator, FilterPair, InverseDistanceWeighting, NeighborWeighting,
};
use crate::parameters::{ParameterHandle, RenderParameters};
use crate::{ConfigurationError, RendererConfig, Result};

/// Places a mono source around a listener on headphones.
///
/// Construction does everything which can fail or allocate: the config is validated and the filters for the initial
/// direction (straight ahead, at the reference distance) are built.  After that, the `process_*` methods may be called
/// from an audio callback.  They never block, and they never allocate.
///
/// Parameters are changed through a [ParameterHandle] from any thread.  Every block starts by reading one snapshot of
/// them, so a block is rendered entirely with one set of values.  A new direction builds new filters and crossfades to
/// them over [RendererConfig::crossfade_frames]; a new distance just changes the gain.
///
/// The output is always interleaved stereo at the measurement set's sample rate.  Matching the host's rate to it is the
/// host's job.
pub struct BinauralRenderer<W = InverseDistanceWeighting> {
    set: Arc<MeasurementSet>,
    config: RendererConfig,

    parameters: ParameterHandle,

    /// Used when the snapshot can't be read without waiting.
    last_parameters: RenderParameters,

    interpolator: DirectionalInterpolator<W>,
    detector: ChangeDetector,
    controller: CrossfadeController,

    /// Where the next filter is interpolated.  Holds buffers handed back by the controller, so that a direction change
    /// doesn't allocate.
    pending: FilterPair,

    mono: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl BinauralRenderer {
    /// Build a renderer using inverse-distance weighting of [RendererConfig::neighbor_count] measurements.
    pub fn new(set: Arc<MeasurementSet>, config: RendererConfig) -> Result<Self> {
        config.validate()?;
        let neighbors =
            NonZeroUsize::new(config.neighbor_count).ok_or(ConfigurationError::ZeroNeighbors)?;
        let weighting =
            InverseDistanceWeighting::new(neighbors, config.exact_match_tolerance_degrees);
        Self::with_weighting(set, config, weighting)
    }

    /// Load a measurement set from disk, then build a renderer from it.
    pub fn from_path(path: impl AsRef<Path>, config: RendererConfig) -> Result<Self> {
        config.validate()?;
        let set = MeasurementSet::load(path)?;
        Self::new(Arc::new(set), config)
    }
}

impl<W: NeighborWeighting> BinauralRenderer<W> {
    /// Build a renderer which interpolates with a custom [NeighborWeighting].
    ///
    /// [RendererConfig::exact_match_tolerance_degrees] is up to the weighting.  Room for
    /// [RendererConfig::neighbor_count] neighbors is reserved up front; a weighting which selects more than that
    /// allocates on the audio thread.
    pub fn with_weighting(
        set: Arc<MeasurementSet>,
        config: RendererConfig,
        weighting: W,
    ) -> Result<Self> {
        config.validate()?;
        let duration =
            NonZeroUsize::new(config.crossfade_frames).ok_or(ConfigurationError::ZeroCrossfade)?;

        crate::logging::ensure_log_thread();

        let initial = RenderParameters::at_reference(config.reference_distance);
        let parameters = ParameterHandle::new(initial);

        let mut interpolator = DirectionalInterpolator::new(weighting);
        interpolator.reserve_neighbors(config.neighbor_count);
        let pair = interpolator.interpolate(&set, initial.direction())?;
        let pending = pair.clone();
        let controller = CrossfadeController::new(pair, duration, config.max_block_frames);

        log::info!(
            "Binaural renderer ready: {} measurements at {} Hz, {} frame crossfade, blocks of up to {} frames",
            set.len(),
            set.sample_rate(),
            duration,
            config.max_block_frames
        );

        let max_block = config.max_block_frames;
        Ok(BinauralRenderer {
            set,
            config,
            parameters,
            last_parameters: initial,
            interpolator,
            detector: ChangeDetector::new(initial.direction()),
            controller,
            pending,
            mono: vec![0.0; max_block],
            left: vec![0.0; max_block],
            right: vec![0.0; max_block],
        })
    }

    /// A handle for changing this renderer's parameters from other threads.
    pub fn parameters(&self) -> ParameterHandle {
        self.parameters.clone()
    }

    pub fn crossfade_state(&self) -> CrossfadeState {
        self.controller.state()
    }

    /// The direction the current filters were built for.
    pub fn active_direction(&self) -> Direction {
        self.detector.active()
    }

    pub fn sample_rate(&self) -> u32 {
        self.set.sample_rate()
    }

    pub fn measurement_set(&self) -> &Arc<MeasurementSet> {
        &self.set
    }

    /// The config this renderer was built with.
    ///
    /// [RendererConfig::reference_distance] here is the initial value only.  Once it has been changed through
    /// [ParameterHandle::set_reference_distance], read it from [ParameterHandle::snapshot] instead.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Start over as if just constructed, but at the current parameters.
    ///
    /// Filters are rebuilt for the current direction, any crossfade is abandoned, and all filter history is cleared.
    /// If the current direction can't be interpolated, the renderer is left as it was.  Not for audio threads.
    pub fn reset(&mut self) -> Result<()> {
        let params = self.parameters.snapshot();
        let direction = params.direction();
        self.interpolator
            .interpolate_into(&self.set, direction, &mut self.pending)?;

        let pair = std::mem::take(&mut self.pending);
        self.pending = self.controller.reset(pair);
        self.detector.commit(direction);
        self.last_parameters = params;

        log::info!("Binaural renderer reset at {}", direction);
        Ok(())
    }

    /// Render a block of mono input to interleaved stereo.
    ///
    /// If the direction changed and could not be interpolated, the block is still rendered in full using the previous
    /// filters, and the error is returned.
    ///
    /// # Panics
    ///
    /// Panics if `input` is longer than [RendererConfig::max_block_frames] or `output` is not exactly twice as long as
    /// `input`.
    pub fn process_mono(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let frames = input.len();
        self.check_block(frames, output);
        self.mono[..frames].copy_from_slice(input);
        self.render(frames, output)
    }

    /// Render a block of interleaved input with any number of channels, which are averaged down to mono first.
    ///
    /// A trailing partial frame counts as a frame whose missing samples are absent.  Otherwise this is
    /// [BinauralRenderer::process_mono].
    ///
    /// # Panics
    ///
    /// Panics if there are more than [RendererConfig::max_block_frames] frames or `output` is not exactly two samples
    /// per frame.
    pub fn process_interleaved(
        &mut self,
        input: &[f32],
        format: &ChannelFormat,
        output: &mut [f32],
    ) -> Result<()> {
        let frames = format.frames_in(input.len());
        self.check_block(frames, output);
        downmix_to_mono(input, format, &mut self.mono[..frames]);
        self.render(frames, output)
    }

    fn check_block(&self, frames: usize, output: &[f32]) {
        assert!(
            frames <= self.config.max_block_frames,
            "Block of {} frames is larger than the configured maximum of {}",
            frames,
            self.config.max_block_frames
        );
        assert_eq!(
            output.len(),
            frames * 2,
            "Output must hold one interleaved stereo frame per input frame"
        );
    }

    fn read_parameters(&mut self) -> RenderParameters {
        if let Some(p) = self.parameters.try_snapshot() {
            self.last_parameters = p;
        }
        self.last_parameters
    }

    /// Start a crossfade if the direction changed.
    fn update_filters(&mut self, requested: Direction) -> Result<()> {
        let Some(direction) = self.detector.check(requested) else {
            return Ok(());
        };

        if let Err(e) = self
            .interpolator
            .interpolate_into(&self.set, direction, &mut self.pending)
        {
            rt_error!("Keeping the previous filters: {}", e);
            return Err(e.into());
        }

        let pair = std::mem::take(&mut self.pending);
        self.pending = self.controller.begin_transition(pair);
        self.detector.commit(direction);
        Ok(())
    }

    /// Render `self.mono[..frames]` into `output`.
    fn render(&mut self, frames: usize, output: &mut [f32]) -> Result<()> {
        crate::is_audio_thread::mark_audio_thread();

        let params = self.read_parameters();
        let filters = self.update_filters(params.direction());

        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        self.controller.process(&self.mono[..frames], left, right);

        for ((frame, l), r) in output.chunks_exact_mut(2).zip(left.iter()).zip(right.iter()) {
            frame[0] = *l;
            frame[1] = *r;
        }

        let gain = inverse_square_gain(params.reference_distance, params.distance);
        apply_gain(output, gain as f32);

        if let Some(peak) = normalize_peak(output) {
            rt_trace!(
                "Block peaked at {:.2} dB and was normalized",
                gain_to_db(peak as f64)
            );
        }

        filters
    }
}

impl<W: std::fmt::Debug> std::fmt::Debug for BinauralRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinauralRenderer")
            .field("config", &self.config)
            .field("parameters", &self.last_parameters)
            .field("interpolator", &self.interpolator)
            .field("state", &self.controller.state())
            .finish_non_exhaustive()
    }
}
