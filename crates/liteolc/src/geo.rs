//! Distance arithmetic between decimal-degree coordinates.

pub const EQUATORIAL_RADIUS_METERS: f64 = 6_378_137.0;
pub const POLAR_RADIUS_METERS: f64 = 6_356_752.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
  pub lat: f64,
  pub lng: f64,
}

/// Radius of the reference ellipsoid blended between the equatorial and
/// polar radii for the given latitude.
pub fn earth_radius_meters(lat: f64) -> f64 {
  let a = EQUATORIAL_RADIUS_METERS;
  let b = POLAR_RADIUS_METERS;

  let numerator = (a * a * lat.cos()).powi(2) + (b * b * lat.sin()).powi(2);
  let denominator = (b * lat.cos()).powi(2) + (b * lat.sin()).powi(2);
  return (numerator / denominator).sqrt();
}

/// Haversine great-circle distance in whole meters, using the earth radius
/// at the first point's latitude.
pub fn distance_meters(l: &LatLng, r: &LatLng) -> i64 {
  let d_lat = (l.lat - r.lat).to_radians();
  let d_lng = (l.lng - r.lng).to_radians();

  let a = (d_lat / 2.0).sin().powi(2)
    + l.lat.to_radians().cos() * r.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
  let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

  return (earth_radius_meters(l.lat) * c) as i64;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_distance() {
    let p = LatLng {
      lat: 46.2027364,
      lng: 5.2294019,
    };
    assert_eq!(0, distance_meters(&p, &p));
  }

  #[test]
  fn test_reference_distances() {
    let bordeaux = LatLng {
      lat: 44.9555555,
      lng: -0.6912071,
    };
    let bourg = LatLng {
      lat: 46.2027364,
      lng: 5.2294019,
    };
    assert_eq!(481019, distance_meters(&bordeaux, &bourg));

    // Centers of the 9G7VPFJP+MX and 9G7VPFJQ+J2 cells.
    let l = LatLng {
      lat: 55.7316875,
      lng: 37.4874375,
    };
    let r = LatLng {
      lat: 55.7315625,
      lng: 37.4875625,
    };
    assert_eq!(15, distance_meters(&l, &r));
  }
}
