use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, matching the sphere most web map widgets measure on.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn offset(&self, d_lat: f64, d_lon: f64) -> Self {
        Self::new(self.lat + d_lat, self.lon + d_lon)
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Linear interpolation in coordinate space. `t` is clamped to [0, 1] so the
    /// result never lands past `other`.
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        let t = t.clamp(0.0, 1.0);
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Ordered waypoints plus the total path distance reported by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub coordinates: Vec<Coordinate>,
    pub distance_m: f64,
}

impl Route {
    pub fn new(coordinates: Vec<Coordinate>, distance_m: f64) -> Self {
        Self {
            coordinates,
            distance_m,
        }
    }

    /// Builds a route whose distance is the sum of its haversine legs.
    pub fn from_waypoints(coordinates: Vec<Coordinate>) -> Self {
        let distance_m = coordinates
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();
        Self {
            coordinates,
            distance_m,
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.coordinates.len().saturating_sub(1)
    }

    /// Index of the first waypoint that is not a finite, in-range coordinate.
    pub fn first_invalid_waypoint(&self) -> Option<usize> {
        self.coordinates.iter().position(|c| !c.is_valid())
    }

    /// Every waypoint is a real coordinate and the distance is a finite, non-negative number.
    pub fn has_valid_geometry(&self) -> bool {
        self.first_invalid_waypoint().is_none() && self.distance_m.is_finite() && self.distance_m >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundredth_of_a_degree_on_the_equator() {
        let d = Coordinate::new(0.0, 0.0).distance_to(&Coordinate::new(0.0, 0.01));
        assert!((d - 1111.95).abs() < 0.1, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Coordinate::new(52.52, 13.405);
        let b = Coordinate::new(48.8566, 2.3522);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn lerp_clamps_past_the_target() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 2.0);
        assert_eq!(a.lerp(&b, 0.5), Coordinate::new(0.5, 1.0));
        assert_eq!(a.lerp(&b, 3.0), b);
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(45.0, 7.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn geometry_check_flags_bad_waypoints_and_distance() {
        let good = Route::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01)], 1112.0);
        assert!(good.has_valid_geometry());

        let mut overflowing = good.clone();
        overflowing.coordinates[1] = Coordinate::new(0.0, 1e308);
        assert_eq!(overflowing.first_invalid_waypoint(), Some(1));
        assert!(!overflowing.has_valid_geometry());

        let mut unmeasured = good.clone();
        unmeasured.distance_m = f64::INFINITY;
        assert!(!unmeasured.has_valid_geometry());
    }

    #[test]
    fn waypoint_route_sums_legs() {
        let route = Route::from_waypoints(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.01),
            Coordinate::new(0.0, 0.02),
        ]);
        assert_eq!(route.last_index(), 2);
        assert!((route.distance_m - 2223.9).abs() < 0.2);
    }
}
