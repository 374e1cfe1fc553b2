/// A direction on the unit sphere around the listener, in degrees.
///
/// Elevation is -90 for straight down and 90 for straight up.  The sense of azimuth depends on who is asking: measurement
/// sets store azimuths counter-clockwise, while user-facing parameters are clockwise.  This type does not care, but
/// comparisons between two directions are only meaningful if both use the same convention.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Direction {
    pub azimuth: f64,
    pub elevation: f64,
}

impl Direction {
    pub const fn new(azimuth: f64, elevation: f64) -> Direction {
        Direction { azimuth, elevation }
    }

    /// The same direction with the sense of azimuth flipped.
    pub fn mirrored(self) -> Direction {
        Direction {
            azimuth: -self.azimuth,
            elevation: self.elevation,
        }
    }

    /// Cartesian coordinates on the unit sphere: x forward, y toward positive azimuth, z up.
    pub fn to_unit_vector(self) -> [f64; 3] {
        let az = self.azimuth.to_radians();
        let el = self.elevation.to_radians();
        [el.cos() * az.cos(), el.cos() * az.sin(), el.sin()]
    }

    /// Great-circle distance to `other`, in degrees in `0.0..=180.0`.
    pub fn angular_distance(self, other: Direction) -> f64 {
        let a = self.to_unit_vector();
        let b = other.to_unit_vector();

        let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        let cross = [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ];
        let cross_len = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();

        // atan2 rather than acos: acos loses almost all precision for nearly identical directions, which is exactly
        // where exact-match checks happen.
        cross_len.atan2(dot).to_degrees()
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(az {}°, el {}°)", self.azimuth, self.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[track_caller]
    fn close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }

    #[test]
    fn test_distances_on_the_horizon() {
        close(Direction::new(0.0, 0.0).angular_distance(Direction::new(90.0, 0.0)), 90.0);
        close(Direction::new(45.0, 0.0).angular_distance(Direction::new(0.0, 0.0)), 45.0);
        close(Direction::new(-45.0, 0.0).angular_distance(Direction::new(90.0, 0.0)), 135.0);
        close(Direction::new(170.0, 0.0).angular_distance(Direction::new(-170.0, 0.0)), 20.0);
    }

    #[test]
    fn test_wraparound_is_the_same_point() {
        close(Direction::new(0.0, 0.0).angular_distance(Direction::new(360.0, 0.0)), 0.0);
        close(Direction::new(-90.0, 10.0).angular_distance(Direction::new(270.0, 10.0)), 0.0);
    }

    #[test]
    fn test_poles_ignore_azimuth() {
        close(Direction::new(0.0, 90.0).angular_distance(Direction::new(123.0, 90.0)), 0.0);
        close(Direction::new(0.0, 90.0).angular_distance(Direction::new(0.0, -90.0)), 180.0);
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_and_bounded(
            az1 in -180.0f64..=180.0,
            el1 in -90.0f64..=90.0,
            az2 in -180.0f64..=180.0,
            el2 in -90.0f64..=90.0,
        ) {
            let a = Direction::new(az1, el1);
            let b = Direction::new(az2, el2);
            let ab = a.angular_distance(b);
            prop_assert!((ab - b.angular_distance(a)).abs() < 1e-9);
            prop_assert!((0.0..=180.0).contains(&ab));
        }
    }
}
