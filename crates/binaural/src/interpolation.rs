//! Turning an arbitrary direction into a pair of impulse responses.
//!
//! Measurement sets are sparse and irregular, so most requests fall between measurements.  A [NeighborWeighting]
//! decides which measurements contribute and how much; the [DirectionalInterpolator] validates the request, maps it
//! into the measurement set's azimuth convention, and sums the chosen responses sample by sample.
//!
//! The weighting is a strategy so that it can be swapped out.  [InverseDistanceWeighting] is the default.
use std::num::NonZeroUsize;

use binaural_datasets::{Direction, MeasurementSet};
use smallvec::SmallVec;

use crate::InterpolationError;

/// Measurement indices paired with how much each contributes.
///
/// Weights need not sum to 1; the interpolator normalizes them.
pub type Neighbors = SmallVec<[(usize, f64); 8]>;

/// A strategy for choosing the measurements which make up a filter.
pub trait NeighborWeighting: Send + 'static {
    /// Fill `out` (which arrives empty) with the neighbors of `lookup`.
    ///
    /// `lookup` is already in the measurement set's azimuth convention.  `set` is never empty.  Leaving `out` empty or
    /// giving every neighbor a weight of 0 is a bug in the implementation and panics in the interpolator.
    fn weights(&mut self, set: &MeasurementSet, lookup: Direction, out: &mut Neighbors);
}

/// Use the single closest measurement.
#[derive(Clone, Debug, Default)]
pub struct NearestNeighbor;

impl NeighborWeighting for NearestNeighbor {
    fn weights(&mut self, set: &MeasurementSet, lookup: Direction, out: &mut Neighbors) {
        let nearest = set
            .measurements()
            .iter()
            .map(|m| lookup.angular_distance(m.direction))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((index, _)) = nearest {
            out.push((index, 1.0));
        }
    }
}

/// Blend the `k` closest measurements, each weighted by the inverse of its great-circle distance.
///
/// If the closest measurement is within the tolerance, it is used alone.  This is both the exact-match case and a guard
/// against dividing by (nearly) zero.
#[derive(Clone, Debug)]
pub struct InverseDistanceWeighting {
    neighbors: NonZeroUsize,
    tolerance_degrees: f64,

    /// `(distance, index)` for every measurement.  Kept to avoid allocating per lookup.
    distances: Vec<(f64, usize)>,
}

impl InverseDistanceWeighting {
    pub fn new(neighbors: NonZeroUsize, tolerance_degrees: f64) -> Self {
        InverseDistanceWeighting {
            neighbors,
            tolerance_degrees,
            distances: Vec::new(),
        }
    }
}

impl NeighborWeighting for InverseDistanceWeighting {
    fn weights(&mut self, set: &MeasurementSet, lookup: Direction, out: &mut Neighbors) {
        self.distances.clear();
        self.distances.extend(
            set.measurements()
                .iter()
                .enumerate()
                .map(|(i, m)| (lookup.angular_distance(m.direction), i)),
        );

        let k = self.neighbors.get().min(self.distances.len());
        if k == 0 {
            return;
        }

        let by_distance = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if k < self.distances.len() {
            self.distances.select_nth_unstable_by(k - 1, by_distance);
        }
        let nearest = &mut self.distances[..k];
        nearest.sort_unstable_by(by_distance);

        let (closest_distance, closest_index) = nearest[0];
        if closest_distance <= self.tolerance_degrees {
            out.push((closest_index, 1.0));
            return;
        }

        out.extend(nearest.iter().map(|(d, i)| (*i, 1.0 / *d)));
    }
}

/// Two impulse responses, one per ear, plus the direction they were made for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterPair {
    pub left: Vec<f32>,
    pub right: Vec<f32>,

    /// The direction which was requested, in the user's (clockwise) convention.
    pub direction_used: Direction,
}

/// Maps user-facing directions to filters.
///
/// User-facing azimuths increase clockwise, while measurement sets increase counter-clockwise; the azimuth is negated
/// before anything is looked up.
#[derive(Debug)]
pub struct DirectionalInterpolator<W = InverseDistanceWeighting> {
    weighting: W,
    neighbors: Neighbors,
}

fn check_direction(requested: Direction) -> Result<(), InterpolationError> {
    let az_ok = (-180.0..=180.0).contains(&requested.azimuth);
    let el_ok = (-90.0..=90.0).contains(&requested.elevation);
    if az_ok && el_ok {
        Ok(())
    } else {
        Err(InterpolationError::DirectionOutOfRange {
            direction: requested,
        })
    }
}

impl<W: NeighborWeighting> DirectionalInterpolator<W> {
    pub fn new(weighting: W) -> Self {
        DirectionalInterpolator {
            weighting,
            neighbors: Neighbors::new(),
        }
    }

    /// Make room for `neighbors` selections, so that a weighting which picks that many never allocates a lookup.
    pub fn reserve_neighbors(&mut self, neighbors: usize) {
        self.neighbors.reserve(neighbors.saturating_sub(self.neighbors.len()));
    }

    pub fn weighting(&self) -> &W {
        &self.weighting
    }

    /// Build a new filter pair for `requested`.
    pub fn interpolate(
        &mut self,
        set: &MeasurementSet,
        requested: Direction,
    ) -> Result<FilterPair, InterpolationError> {
        let mut pair = FilterPair::default();
        self.interpolate_into(set, requested, &mut pair)?;
        Ok(pair)
    }

    /// Like [DirectionalInterpolator::interpolate], but write into an existing pair, reusing its buffers.
    ///
    /// Once `dest` has held a filter from this set, this does not allocate.  On error `dest` is left as it was.
    pub fn interpolate_into(
        &mut self,
        set: &MeasurementSet,
        requested: Direction,
        dest: &mut FilterPair,
    ) -> Result<(), InterpolationError> {
        if set.is_empty() {
            return Err(InterpolationError::EmptySet);
        }
        check_direction(requested)?;

        let lookup = requested.mirrored();
        self.neighbors.clear();
        self.weighting.weights(set, lookup, &mut self.neighbors);
        assert!(
            !self.neighbors.is_empty(),
            "The neighbor weighting selected nothing"
        );

        let len = set.ir_length();
        dest.direction_used = requested;

        if let [(index, _)] = self.neighbors[..] {
            let m = &set.measurements()[index];
            dest.left.clear();
            dest.left.extend_from_slice(&m.left);
            dest.right.clear();
            dest.right.extend_from_slice(&m.right);
            return Ok(());
        }

        let total: f64 = self.neighbors.iter().map(|(_, w)| *w).sum();
        assert!(total > 0.0, "Neighbor weights must not all be zero");

        dest.left.clear();
        dest.left.resize(len, 0.0);
        dest.right.clear();
        dest.right.resize(len, 0.0);

        for (index, weight) in self.neighbors.iter().copied() {
            let m = &set.measurements()[index];
            let w = (weight / total) as f32;
            for (d, s) in dest.left.iter_mut().zip(m.left.iter()) {
                *d += w * s;
            }
            for (d, s) in dest.right.iter_mut().zip(m.right.iter()) {
                *d += w * s;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use binaural_datasets::Measurement;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn two_point_set() -> MeasurementSet {
        MeasurementSet::new(
            44100,
            vec![
                Measurement {
                    direction: Direction::new(0.0, 0.0),
                    left: vec![1.0, 0.0, 0.0],
                    right: vec![1.0, 0.0, 0.0],
                },
                Measurement {
                    direction: Direction::new(90.0, 0.0),
                    left: vec![0.0, 1.0, 0.0],
                    right: vec![1.0, 0.0, 0.0],
                },
            ],
        )
        .unwrap()
    }

    /// A ring of measurements every 30 degrees on the horizon plus one at each pole, with distinct responses.
    fn ring_set() -> MeasurementSet {
        let mut measurements = vec![];
        for i in 0..12 {
            let az = i as f64 * 30.0;
            measurements.push(Measurement {
                direction: Direction::new(az, 0.0),
                left: vec![i as f32, 1.0, -(i as f32)],
                right: vec![0.5, i as f32 * 0.1, 0.0],
            });
        }
        for el in [-90.0, 90.0] {
            measurements.push(Measurement {
                direction: Direction::new(0.0, el),
                left: vec![el as f32, 0.0, 0.0],
                right: vec![0.0, el as f32, 0.0],
            });
        }
        MeasurementSet::new(44100, measurements).unwrap()
    }

    /// Equidistant neighbors are only equidistant up to rounding in the trigonometry.
    fn assert_close(got: &[f32], expected: &[f32]) {
        assert_eq!(got.len(), expected.len());
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-6, "{:?} vs {:?}", got, expected);
        }
    }

    fn idw(k: usize) -> DirectionalInterpolator {
        DirectionalInterpolator::new(InverseDistanceWeighting::new(
            NonZeroUsize::new(k).unwrap(),
            0.01,
        ))
    }

    #[test]
    fn test_equidistant_neighbors_average() {
        // Clockwise -45 is counter-clockwise 45, halfway between the two measurements.
        let pair = idw(2)
            .interpolate(&two_point_set(), Direction::new(-45.0, 0.0))
            .unwrap();
        assert_close(&pair.left, &[0.5, 0.5, 0.0]);
        assert_close(&pair.right, &[1.0, 0.0, 0.0]);
        assert_eq!(pair.direction_used, Direction::new(-45.0, 0.0));
    }

    #[test]
    fn test_unequal_neighbors_are_between() {
        // Clockwise 45 is counter-clockwise -45: 45 degrees from the first measurement and 135 from the second.
        let pair = idw(2)
            .interpolate(&two_point_set(), Direction::new(45.0, 0.0))
            .unwrap();
        assert!((pair.left[0] - 0.75).abs() < 1e-6, "{:?}", pair.left);
        assert!((pair.left[1] - 0.25).abs() < 1e-6, "{:?}", pair.left);
        assert_eq!(pair.left[2], 0.0);
        assert!(pair.left[0] > 0.0 && pair.left[0] < 1.0);
        assert!(pair.left[1] > 0.0 && pair.left[1] < 1.0);
    }

    #[test]
    fn test_azimuth_is_negated() {
        // Clockwise -90 is the counter-clockwise 90 measurement.
        let set = two_point_set();
        let pair = idw(2).interpolate(&set, Direction::new(-90.0, 0.0)).unwrap();
        assert_eq!(pair.left, set.measurements()[1].left);

        // And clockwise 90 is not.
        let pair = idw(2).interpolate(&set, Direction::new(90.0, 0.0)).unwrap();
        assert_ne!(pair.left, set.measurements()[1].left);
    }

    #[test]
    fn test_exact_matches_are_untouched() {
        let set = ring_set();
        let mut interp = idw(4);
        for m in set.measurements() {
            let mut requested = m.direction.mirrored();
            // Stored azimuths go up to 330, but requests are limited to -180..=180.
            if requested.azimuth < -180.0 {
                requested.azimuth += 360.0;
            }
            let pair = interp.interpolate(&set, requested).unwrap();
            assert_eq!(pair.left, m.left);
            assert_eq!(pair.right, m.right);
        }
    }

    #[test]
    fn test_within_tolerance_is_an_exact_match() {
        let set = two_point_set();
        let pair = idw(2)
            .interpolate(&set, Direction::new(-90.005, 0.0))
            .unwrap();
        assert_eq!(pair.left, set.measurements()[1].left);
    }

    #[test]
    fn test_many_neighbors_stay_in_reserved_space() {
        let set = ring_set();
        let mut interp = idw(12);
        interp.reserve_neighbors(12);
        assert!(interp.neighbors.capacity() >= 12);
        let cap = interp.neighbors.capacity();

        interp.interpolate(&set, Direction::new(17.0, 3.0)).unwrap();
        assert_eq!(interp.neighbors.len(), 12);
        assert_eq!(interp.neighbors.capacity(), cap);
    }

    #[test]
    fn test_nearest_neighbor() {
        let set = ring_set();
        let mut interp = DirectionalInterpolator::new(NearestNeighbor);
        // Counter-clockwise 40 is closest to 30.
        let pair = interp.interpolate(&set, Direction::new(-40.0, 0.0)).unwrap();
        assert_eq!(pair.left, set.measurements()[1].left);
    }

    #[test]
    fn test_out_of_range() {
        let set = two_point_set();
        for bad in [
            Direction::new(181.0, 0.0),
            Direction::new(0.0, -91.0),
            Direction::new(f64::NAN, 0.0),
        ] {
            let err = idw(2).interpolate(&set, bad).unwrap_err();
            assert!(matches!(err, InterpolationError::DirectionOutOfRange { .. }));
        }
    }

    #[test]
    fn test_interpolate_into_reuses_and_leaves_dest_on_error() {
        let set = ring_set();
        let mut interp = idw(3);
        let mut pair = interp.interpolate(&set, Direction::new(10.0, 5.0)).unwrap();
        let before = pair.clone();

        assert!(interp
            .interpolate_into(&set, Direction::new(500.0, 0.0), &mut pair)
            .is_err());
        assert_eq!(pair, before);

        let cap = pair.left.capacity();
        interp
            .interpolate_into(&set, Direction::new(-100.0, 20.0), &mut pair)
            .unwrap();
        assert_eq!(pair.left.capacity(), cap);
        assert_eq!(pair.direction_used, Direction::new(-100.0, 20.0));
    }

    proptest! {
        #[test]
        fn filters_have_the_set_length(
            az in -180.0f64..=180.0,
            el in -90.0f64..=90.0,
            k in 1usize..6,
        ) {
            let set = ring_set();
            let pair = idw(k).interpolate(&set, Direction::new(az, el)).unwrap();
            prop_assert_eq!(pair.left.len(), set.ir_length());
            prop_assert_eq!(pair.right.len(), set.ir_length());
        }

        #[test]
        fn interpolated_samples_stay_within_neighbors(az in -180.0f64..=180.0, el in -90.0f64..=90.0) {
            // A convex combination can't leave the range spanned by the measurements.
            let set = ring_set();
            let pair = idw(3).interpolate(&set, Direction::new(az, el)).unwrap();
            for (i, s) in pair.left.iter().enumerate() {
                let lo = set.measurements().iter().map(|m| m.left[i]).fold(f32::INFINITY, f32::min);
                let hi = set.measurements().iter().map(|m| m.left[i]).fold(f32::NEG_INFINITY, f32::max);
                prop_assert!(*s >= lo - 1e-3 && *s <= hi + 1e-3, "{} not in {}..={}", s, lo, hi);
            }
        }
    }
}
