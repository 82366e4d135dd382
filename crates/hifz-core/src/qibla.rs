//! Qibla direction: initial great-circle bearing toward the Kaaba and the
//! rotation to apply to an indicator given a live device heading.
//!
//! Heading convention throughout: 0° is the device's forward axis pointing
//! north, increasing clockwise. Sensors that report a counter-clockwise
//! "alpha" must go through [`compass_heading_from_alpha`] first.

use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::validation::Validator;

/// A point on the WGS-84 ellipsoid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The Kaaba in Mecca.
pub const KAABA: GeoPoint = GeoPoint {
    latitude: 21.4225,
    longitude: 39.8262,
};

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        Validator::validate_latitude(self.latitude)?;
        Validator::validate_longitude(self.longitude)?;
        Ok(())
    }
}

/// Compass bearing in degrees, always in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bearing(f64);

impl Bearing {
    pub fn from_degrees(degrees: f64) -> Self {
        Bearing(normalize_degrees(degrees))
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }
}

/// Map any finite angle into `[0, 360)`.
///
/// Input must be finite; callers filter sensor noise before it gets here.
pub fn normalize_degrees(degrees: f64) -> f64 {
    debug_assert!(degrees.is_finite(), "non-finite angle {}", degrees);
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Initial great-circle bearing from `observer` to the Kaaba.
///
/// An observer standing on the Kaaba itself has no defined direction; this
/// returns 0 by convention.
pub fn compute_qibla_bearing(observer: GeoPoint) -> Result<Bearing, CoreError> {
    observer.validate()?;
    Ok(initial_bearing(observer, KAABA))
}

fn initial_bearing(from: GeoPoint, to: GeoPoint) -> Bearing {
    if from == to {
        return Bearing(0.0);
    }

    let d_lon = (to.longitude - from.longitude).to_radians();
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();

    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();

    Bearing::from_degrees(y.atan2(x).to_degrees())
}

/// Rotation to apply to a direction indicator so it points at `bearing`
/// while the device faces `device_heading`. Both in degrees, clockwise from north.
pub fn compute_relative_heading(bearing: f64, device_heading: f64) -> f64 {
    normalize_degrees(bearing - normalize_degrees(device_heading))
}

/// Convert a counter-clockwise-from-north sensor "alpha" into a clockwise compass heading.
pub fn compass_heading_from_alpha(alpha: f64) -> f64 {
    normalize_degrees(360.0 - alpha)
}

/// Keeps the last-known device heading for a fixed Qibla bearing.
#[derive(Debug, Clone)]
pub struct HeadingTracker {
    bearing: Bearing,
    last_heading: Option<f64>,
}

impl HeadingTracker {
    pub fn new(bearing: Bearing) -> Self {
        Self {
            bearing,
            last_heading: None,
        }
    }

    pub fn bearing(&self) -> Bearing {
        self.bearing
    }

    pub fn last_heading(&self) -> Option<f64> {
        self.last_heading
    }

    /// Record a clockwise heading reading and return the new relative rotation.
    /// Non-finite readings are ignored and the previous rotation is kept.
    pub fn update(&mut self, device_heading: f64) -> Option<f64> {
        if device_heading.is_finite() {
            self.last_heading = Some(normalize_degrees(device_heading));
        }
        self.relative()
    }

    /// Relative rotation for the last-known heading, if any reading arrived yet.
    pub fn relative(&self) -> Option<f64> {
        self.last_heading
            .map(|heading| compute_relative_heading(self.bearing.degrees(), heading))
    }
}

/// Turn a stream of clockwise heading readings into a stream of relative rotations.
pub fn relative_heading_stream<S>(bearing: Bearing, headings: S) -> impl Stream<Item = f64>
where
    S: Stream<Item = f64>,
{
    let mut tracker = HeadingTracker::new(bearing);
    headings.filter_map(move |heading| {
        let relative = if heading.is_finite() {
            tracker.update(heading)
        } else {
            None
        };
        futures_util::future::ready(relative)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_new_york_bearing() {
        let nyc = GeoPoint::new(40.7128, -74.0060).unwrap();
        let bearing = compute_qibla_bearing(nyc).unwrap().degrees();
        assert!(approx(bearing, 58.48, 0.1), "got {}", bearing);
    }

    #[test]
    fn test_known_cities() {
        // London faces roughly south-east, Jakarta west-north-west.
        let london = compute_qibla_bearing(GeoPoint::new(51.5074, -0.1278).unwrap())
            .unwrap()
            .degrees();
        assert!(approx(london, 118.99, 0.2), "london {}", london);

        let jakarta = compute_qibla_bearing(GeoPoint::new(-6.2088, 106.8456).unwrap())
            .unwrap()
            .degrees();
        assert!(approx(jakarta, 295.15, 0.2), "jakarta {}", jakarta);
    }

    #[test]
    fn test_due_north_of_kaaba_faces_south() {
        let north = GeoPoint::new(40.0, KAABA.longitude).unwrap();
        let bearing = compute_qibla_bearing(north).unwrap().degrees();
        assert!(approx(bearing, 180.0, 1e-9), "got {}", bearing);
    }

    #[test]
    fn test_observer_at_kaaba_is_zero() {
        assert_eq!(compute_qibla_bearing(KAABA).unwrap().degrees(), 0.0);
    }

    #[test]
    fn test_invalid_coordinates_are_not_clamped() {
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(CoreError::invalid_latitude(91.0))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(CoreError::invalid_longitude(-180.5))
        );

        let sneaky = GeoPoint {
            latitude: 0.0,
            longitude: 200.0,
        };
        assert!(matches!(
            compute_qibla_bearing(sneaky),
            Err(CoreError::InvalidCoordinate { field: "longitude", .. })
        ));
    }

    #[test]
    fn test_relative_heading() {
        assert_eq!(compute_relative_heading(90.0, 45.0), 45.0);
        assert_eq!(compute_relative_heading(10.0, 350.0), 20.0);
        assert_eq!(compute_relative_heading(10.0, 10.0), 0.0);
        assert_eq!(compute_relative_heading(10.0, -350.0), 0.0);
        assert_eq!(compute_relative_heading(350.0, 10.0), 340.0);
    }

    #[test]
    fn test_compass_heading_from_alpha() {
        assert_eq!(compass_heading_from_alpha(0.0), 0.0);
        assert_eq!(compass_heading_from_alpha(90.0), 270.0);
        assert_eq!(compass_heading_from_alpha(270.0), 90.0);
        assert_eq!(compass_heading_from_alpha(360.0), 0.0);
    }

    #[test]
    fn test_normalize_edges() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-finite angle")]
    fn test_normalize_rejects_nan() {
        normalize_degrees(f64::NAN);
    }

    #[test]
    fn test_tracker_keeps_last_heading() {
        let mut tracker = HeadingTracker::new(Bearing::from_degrees(58.5));
        assert_eq!(tracker.relative(), None);

        assert_eq!(tracker.update(0.0), Some(58.5));
        assert_eq!(tracker.update(60.0), Some(358.5));
        assert_eq!(tracker.update(f64::NAN), Some(358.5));
        assert_eq!(tracker.last_heading(), Some(60.0));
    }

    #[tokio::test]
    async fn test_relative_heading_stream() {
        let headings = futures_util::stream::iter(vec![45.0, f64::NAN, 350.0, 370.0]);
        let out: Vec<f64> = relative_heading_stream(Bearing::from_degrees(90.0), headings)
            .collect()
            .await;
        assert_eq!(out, vec![45.0, 100.0, 80.0]);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(d in -1.0e6f64..1.0e6) {
            let once = normalize_degrees(d);
            prop_assert!((0.0..360.0).contains(&once));
            prop_assert_eq!(normalize_degrees(once), once);
        }

        #[test]
        fn prop_bearing_in_range(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let point = GeoPoint::new(lat, lon).unwrap();
            let bearing = compute_qibla_bearing(point).unwrap().degrees();
            prop_assert!((0.0..360.0).contains(&bearing));
        }
    }
}
