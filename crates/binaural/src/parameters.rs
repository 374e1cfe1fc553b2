//! The values a host changes while audio is running.
//!
//! Any number of control threads may write through a [ParameterHandle].  The renderer reads one consistent snapshot at
//! the top of every block and uses it for the whole block.
use std::sync::Arc;

use audio_synchronization::SnapshotCell;
use binaural_datasets::Direction;

use crate::config::{validate_distance, validate_reference_distance};
use crate::ConfigurationError;

const AZIMUTH: usize = 0;
const ELEVATION: usize = 1;
const DISTANCE: usize = 2;
const REFERENCE_DISTANCE: usize = 3;
const SLOTS: usize = 4;

/// Where the source is, as of one block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderParameters {
    /// Degrees, clockwise from straight ahead, in `-180..=180`.
    pub azimuth: f64,

    /// Degrees above the horizon, in `-90..=90`.
    pub elevation: f64,

    pub distance: f64,
    pub reference_distance: f64,
}

impl RenderParameters {
    /// The source at the reference distance, straight ahead.
    pub fn at_reference(reference_distance: f64) -> Self {
        RenderParameters {
            azimuth: 0.0,
            elevation: 0.0,
            distance: reference_distance,
            reference_distance,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::new(self.azimuth, self.elevation)
    }

    fn from_slots(slots: [f64; SLOTS]) -> Self {
        RenderParameters {
            azimuth: slots[AZIMUTH],
            elevation: slots[ELEVATION],
            distance: slots[DISTANCE],
            reference_distance: slots[REFERENCE_DISTANCE],
        }
    }

    fn to_slots(self) -> [f64; SLOTS] {
        let mut slots = [0.0; SLOTS];
        slots[AZIMUTH] = self.azimuth;
        slots[ELEVATION] = self.elevation;
        slots[DISTANCE] = self.distance;
        slots[REFERENCE_DISTANCE] = self.reference_distance;
        slots
    }
}

/// Sets the parameters of a renderer from any thread.
///
/// Cheap to clone; all clones control the same renderer.  Angles are not range checked here: the host is expected to
/// clamp them, and an out-of-range direction is reported by the renderer when it tries to use it.  Distances are
/// checked, since a bad one would silently produce garbage gain.
#[derive(Clone, Debug)]
pub struct ParameterHandle {
    cell: Arc<SnapshotCell<SLOTS>>,
}

impl ParameterHandle {
    pub(crate) fn new(initial: RenderParameters) -> Self {
        ParameterHandle {
            cell: Arc::new(SnapshotCell::new(initial.to_slots())),
        }
    }

    pub fn set_azimuth(&self, azimuth: f64) {
        self.cell.store(AZIMUTH, azimuth);
    }

    pub fn set_elevation(&self, elevation: f64) {
        self.cell.store(ELEVATION, elevation);
    }

    /// Set both angles at once, so that the renderer never sees the new azimuth with the old elevation.
    pub fn set_direction(&self, direction: Direction) {
        self.cell.update(|slots| {
            slots[AZIMUTH] = direction.azimuth;
            slots[ELEVATION] = direction.elevation;
        });
    }

    /// Takes effect at the next block, without smoothing.
    pub fn set_distance(&self, distance: f64) -> Result<(), ConfigurationError> {
        validate_distance(distance)?;
        self.cell.store(DISTANCE, distance);
        Ok(())
    }

    pub fn set_reference_distance(&self, reference_distance: f64) -> Result<(), ConfigurationError> {
        validate_reference_distance(reference_distance)?;
        self.cell.store(REFERENCE_DISTANCE, reference_distance);
        Ok(())
    }

    /// Read the current values.  May briefly yield if writers are busy, so not for audio threads.
    pub fn snapshot(&self) -> RenderParameters {
        RenderParameters::from_slots(self.cell.read())
    }

    /// Read the current values without ever blocking, or `None` if a writer got in the way.
    pub(crate) fn try_snapshot(&self) -> Option<RenderParameters> {
        self.cell.try_read().map(RenderParameters::from_slots)
    }
}
