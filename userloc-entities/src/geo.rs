use std::fmt;

use thiserror::Error;

const LAT_DEG_MAX: f64 = 90.0;
const LAT_DEG_MIN: f64 = -90.0;
const LNG_DEG_MAX: f64 = 180.0;
const LNG_DEG_MIN: f64 = -180.0;

#[derive(Debug, Error, PartialEq)]
pub enum CoordError {
    #[error("Invalid latitude degrees: {0}")]
    Latitude(f64),
    #[error("Invalid longitude degrees: {0}")]
    Longitude(f64),
}

/// A geographical location on a (flat) map in decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPoint {
    lat: f64,
    lng: f64,
}

impl MapPoint {
    pub fn from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(lat: LAT, lng: LNG) -> Self {
        let res = Self {
            lat: lat.into(),
            lng: lng.into(),
        };
        debug_assert!(res.is_valid());
        res
    }

    pub fn try_from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(
        lat: LAT,
        lng: LNG,
    ) -> Result<Self, CoordError> {
        let (lat, lng) = (lat.into(), lng.into());
        if !(LAT_DEG_MIN..=LAT_DEG_MAX).contains(&lat) {
            return Err(CoordError::Latitude(lat));
        }
        if !(LNG_DEG_MIN..=LNG_DEG_MAX).contains(&lng) {
            return Err(CoordError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    pub const fn lat(self) -> f64 {
        self.lat
    }

    pub const fn lng(self) -> f64 {
        self.lng
    }

    pub fn to_lat_lng_deg(self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    pub fn is_valid(self) -> bool {
        (LAT_DEG_MIN..=LAT_DEG_MAX).contains(&self.lat)
            && (LNG_DEG_MIN..=LNG_DEG_MAX).contains(&self.lng)
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn to_meters(self) -> f64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapBbox {
    sw: MapPoint,
    ne: MapPoint,
}

impl MapBbox {
    pub const fn new(sw: MapPoint, ne: MapPoint) -> Self {
        Self { sw, ne }
    }

    /// A box that extends `pad_deg` degrees into every direction of `center`.
    ///
    /// The latitude is clamped at the poles and the longitude
    /// wraps around the antimeridian.
    pub fn padded_around(center: MapPoint, pad_deg: f64) -> Self {
        debug_assert!(pad_deg >= 0.0);
        let sw_lat = (center.lat() - pad_deg).max(LAT_DEG_MIN);
        let ne_lat = (center.lat() + pad_deg).min(LAT_DEG_MAX);
        let mut sw_lng = center.lng() - pad_deg;
        if sw_lng < LNG_DEG_MIN {
            // wrap around
            sw_lng += LNG_DEG_MAX - LNG_DEG_MIN;
        }
        let mut ne_lng = center.lng() + pad_deg;
        if ne_lng > LNG_DEG_MAX {
            // wrap around
            ne_lng -= LNG_DEG_MAX - LNG_DEG_MIN;
        }
        Self::new(
            MapPoint::from_lat_lng_deg(sw_lat, sw_lng),
            MapPoint::from_lat_lng_deg(ne_lat, ne_lng),
        )
    }

    pub const fn south_west(&self) -> MapPoint {
        self.sw
    }

    pub const fn north_east(&self) -> MapPoint {
        self.ne
    }

    pub fn is_valid(&self) -> bool {
        self.sw.is_valid() && self.ne.is_valid() && self.sw.lat() <= self.ne.lat()
    }

    pub fn contains_point(&self, pt: MapPoint) -> bool {
        debug_assert!(self.is_valid());
        if pt.lat() < self.sw.lat() || pt.lat() > self.ne.lat() {
            return false;
        }
        if self.sw.lng() <= self.ne.lng() {
            // regular (inclusive)
            pt.lng() >= self.sw.lng() && pt.lng() <= self.ne.lng()
        } else {
            // inverse (exclusive)
            !(pt.lng() > self.ne.lng() && pt.lng() < self.sw.lng())
        }
    }
}

impl fmt::Display for MapBbox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.sw, self.ne)
    }
}
