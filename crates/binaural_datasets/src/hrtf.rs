use crate::{Direction, Ear, LoadError};

/// One measured direction: a pair of head-related impulse responses.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Where the source was, with azimuth proceeding counter-clockwise.
    pub direction: Direction,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

/// An HRTF measurement set.
///
/// Once built this is immutable; it is normally put behind an `Arc` and shared with anything that interpolates from it.
/// Every impulse response in the set has the same length and sample rate, which is checked on construction.
#[derive(Debug)]
pub struct MeasurementSet {
    sample_rate: u32,
    ir_length: usize,
    measurements: Vec<Measurement>,
}

fn check_impulse(index: usize, ear: Ear, impulse: &[f32], expected: usize) -> Result<(), LoadError> {
    if impulse.is_empty() {
        return Err(LoadError::EmptyImpulse { index, ear });
    }

    if impulse.len() != expected {
        return Err(LoadError::InconsistentLength {
            index,
            ear,
            expected,
            found: impulse.len(),
        });
    }

    Ok(())
}

fn validate(sample_rate: u32, measurements: &[Measurement]) -> Result<usize, LoadError> {
    if sample_rate == 0 {
        return Err(LoadError::InvalidSampleRate);
    }

    let first = measurements.first().ok_or(LoadError::Empty)?;
    let expected_len = first.left.len();
    if expected_len == 0 {
        return Err(LoadError::EmptyImpulse {
            index: 0,
            ear: Ear::Left,
        });
    }

    for (index, m) in measurements.iter().enumerate() {
        let elevation = m.direction.elevation;
        if !(-90.0..=90.0).contains(&elevation) {
            return Err(LoadError::ElevationOutOfRange { index, elevation });
        }

        let azimuth = m.direction.azimuth;
        if !(-360.0..=360.0).contains(&azimuth) {
            return Err(LoadError::AzimuthOutOfRange { index, azimuth });
        }

        check_impulse(index, Ear::Left, &m.left, expected_len)?;
        check_impulse(index, Ear::Right, &m.right, expected_len)?;
    }

    Ok(expected_len)
}

impl MeasurementSet {
    /// Build a set from already-decoded measurements, validating it.
    pub fn new(sample_rate: u32, measurements: Vec<Measurement>) -> Result<MeasurementSet, LoadError> {
        let ir_length = validate(sample_rate, &measurements)?;
        Ok(MeasurementSet {
            sample_rate,
            ir_length,
            measurements,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The length of every impulse response in this set.
    pub fn ir_length(&self) -> usize {
        self.ir_length
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Always false for a successfully constructed set, but present for completeness.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements[..]
    }

    pub fn get(&self, index: usize) -> Option<&Measurement> {
        self.measurements.get(index)
    }
}
