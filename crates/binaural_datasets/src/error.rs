use std::path::PathBuf;

/// Which ear an impulse response belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Ear {
    #[display(fmt = "left")]
    Left,
    #[display(fmt = "right")]
    Right,
}

/// Reasons a measurement set could not be loaded.
///
/// All of these are fatal: a renderer cannot be built without a valid set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unable to open measurement set {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to parse measurement set: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("The measurement set contains no measurements")]
    Empty,

    #[error("The sample rate must be greater than 0")]
    InvalidSampleRate,

    #[error("Measurement {index}: the {ear} impulse response is empty")]
    EmptyImpulse { index: usize, ear: Ear },

    #[error("Measurement {index}: the {ear} impulse response has length {found}, but the set uses {expected}")]
    InconsistentLength {
        index: usize,
        ear: Ear,
        expected: usize,
        found: usize,
    },

    #[error("Measurement {index} has elevation {elevation}, but must be between -90 and 90")]
    ElevationOutOfRange { index: usize, elevation: f64 },

    #[error("Measurement {index} has azimuth {azimuth}, which is not in -360.0..=360.0")]
    AzimuthOutOfRange { index: usize, azimuth: f64 },
}
