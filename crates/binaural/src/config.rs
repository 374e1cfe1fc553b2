use crate::ConfigurationError;

pub const DEFAULT_CROSSFADE_FRAMES: usize = 1024;
pub const DEFAULT_REFERENCE_DISTANCE: f64 = 1.0;
pub const DEFAULT_NEIGHBOR_COUNT: usize = 3;
pub const DEFAULT_MAX_BLOCK_FRAMES: usize = 1024;
pub const DEFAULT_EXACT_MATCH_TOLERANCE_DEGREES: f64 = 0.01;

/// Settings for a [crate::BinauralRenderer].
///
/// Use [RendererConfigBuilder] to override some of the defaults:
///
/// ```
/// let config = binaural::RendererConfigBuilder::default()
///     .crossfade_frames(512)
///     .max_block_frames(256)
///     .build()
///     .unwrap();
/// assert_eq!(config.crossfade_frames, 512);
/// assert_eq!(config.neighbor_count, binaural::DEFAULT_NEIGHBOR_COUNT);
/// ```
///
/// Nothing is checked until the config reaches a renderer, which calls [RendererConfig::validate].
#[derive(Clone, Debug, PartialEq, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct RendererConfig {
    /// How many frames a change of direction takes to fade in.
    #[builder(default = "DEFAULT_CROSSFADE_FRAMES")]
    pub crossfade_frames: usize,

    /// The distance at which the source plays at unity gain.  Also the initial source distance.
    #[builder(default = "DEFAULT_REFERENCE_DISTANCE")]
    pub reference_distance: f64,

    /// How many measurements contribute to an interpolated filter.
    #[builder(default = "DEFAULT_NEIGHBOR_COUNT")]
    pub neighbor_count: usize,

    /// The largest block a single processing call may be given.  Buffers are sized for this up front.
    #[builder(default = "DEFAULT_MAX_BLOCK_FRAMES")]
    pub max_block_frames: usize,

    /// Requests this close (in degrees) to a measurement use that measurement as-is.
    #[builder(default = "DEFAULT_EXACT_MATCH_TOLERANCE_DEGREES")]
    pub exact_match_tolerance_degrees: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            crossfade_frames: DEFAULT_CROSSFADE_FRAMES,
            reference_distance: DEFAULT_REFERENCE_DISTANCE,
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            max_block_frames: DEFAULT_MAX_BLOCK_FRAMES,
            exact_match_tolerance_degrees: DEFAULT_EXACT_MATCH_TOLERANCE_DEGREES,
        }
    }
}

pub(crate) fn validate_distance(distance: f64) -> Result<(), ConfigurationError> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidDistance(distance))
    }
}

pub(crate) fn validate_reference_distance(distance: f64) -> Result<(), ConfigurationError> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidReferenceDistance(distance))
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.crossfade_frames == 0 {
            return Err(ConfigurationError::ZeroCrossfade);
        }

        validate_reference_distance(self.reference_distance)?;

        if self.neighbor_count == 0 {
            return Err(ConfigurationError::ZeroNeighbors);
        }

        if self.max_block_frames == 0 {
            return Err(ConfigurationError::ZeroBlockSize);
        }

        let tol = self.exact_match_tolerance_degrees;
        if !tol.is_finite() || tol < 0.0 {
            return Err(ConfigurationError::InvalidTolerance(tol));
        }

        Ok(())
    }
}
