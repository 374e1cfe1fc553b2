//! Loading measurement sets from disk.
//!
//! The on-disk format is a JSON document:
//!
//! ```json
//! {
//!     "sample_rate": 44100,
//!     "measurements": [
//!         { "azimuth": 0.0, "elevation": 0.0, "left": [1.0, 0.0], "right": [1.0, 0.0] }
//!     ]
//! }
//! ```
//!
//! Azimuths are counter-clockwise in degrees, as in the datasets in the literature.
use std::io::Read;
use std::path::Path;

use crate::{Direction, LoadError, Measurement, MeasurementSet};

#[derive(serde::Deserialize)]
struct MeasurementSetFile {
    sample_rate: u32,
    measurements: Vec<MeasurementRecord>,
}

#[derive(serde::Deserialize)]
struct MeasurementRecord {
    azimuth: f64,
    elevation: f64,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl From<MeasurementRecord> for Measurement {
    fn from(value: MeasurementRecord) -> Self {
        Measurement {
            direction: Direction::new(value.azimuth, value.elevation),
            left: value.left,
            right: value.right,
        }
    }
}

impl MeasurementSet {
    /// Decode and validate a measurement set from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<MeasurementSet, LoadError> {
        let file: MeasurementSetFile = serde_json::from_reader(std::io::BufReader::new(reader))?;
        let measurements = file.measurements.into_iter().map(Into::into).collect();
        MeasurementSet::new(file.sample_rate, measurements)
    }

    /// Load a measurement set from a file.
    ///
    /// This performs blocking I/O and must happen before any audio is processed.
    pub fn load(path: impl AsRef<Path>) -> Result<MeasurementSet, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::from_reader(file)?;
        log::info!(
            "Loaded {} HRTF measurements of length {} at {} Hz from {}",
            set.len(),
            set.ir_length(),
            set.sample_rate(),
            path.display()
        );
        Ok(set)
    }
}
