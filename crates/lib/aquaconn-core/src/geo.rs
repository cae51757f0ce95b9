use serde::Deserialize;

/// Semi-major axis of the WGS84 ellipsoid in meters.
pub const WGS84_A: f64 = 6_378_137.0;
/// Flattening of the WGS84 ellipsoid.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Mean earth radius (IUGG) in meters, used by the spherical fallback.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

const VINCENTY_TOLERANCE: f64 = 1e-12;
const VINCENTY_MAX_ITERATIONS: usize = 200;

/// A longitude/latitude pair in decimal degrees.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Geodesic distance in meters on the WGS84 ellipsoid.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        geodesic_distance(self, other)
    }
}

/// Wraps a longitude (or longitude difference) into [-180, 180], keeping +180 as is.
pub fn wrap_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Great-circle distance in meters on a sphere of mean earth radius.
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_finite() || !to.is_finite() {
        return f64::NAN;
    }
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = wrap_longitude(to.lon - from.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Distance in meters along the WGS84 geodesic, solved with Vincenty's inverse formulae.
///
/// The longitude difference is wrapped before solving, so points on either side of the
/// antimeridian come out close together. Nearly antipodal points where the iteration does
/// not converge fall back to [`haversine_distance`]. Non-finite input gives NaN.
pub fn geodesic_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    if !from.is_finite() || !to.is_finite() {
        return f64::NAN;
    }

    let b = WGS84_A * (1.0 - WGS84_F);
    let l = wrap_longitude(to.lon - from.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * from.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return 0.0;
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos_sq_alpha == 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - b * b) / (b * b);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return b * big_a * (sigma - delta_sigma);
        }
    }
    haversine_distance(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(359.0), -1.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = GeoPoint::new(8.4, 63.7);
        assert_eq!(geodesic_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_non_finite_is_nan() {
        let p = GeoPoint::new(8.4, 63.7);
        let masked = GeoPoint::new(f64::NAN, 63.7);
        assert!(geodesic_distance(&p, &masked).is_nan());
        assert!(haversine_distance(&masked, &p).is_nan());
    }
}
