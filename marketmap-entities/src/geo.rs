use itertools::Itertools;
use std::{fmt, num::ParseFloatError, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct LatCoord(f64);

impl LatCoord {
    const DEG_MAX: f64 = 90.0;
    const DEG_MIN: f64 = -90.0;

    /// The caller guarantees that `deg` is within the valid range.
    pub const fn from_deg_unchecked(deg: f64) -> Self {
        Self(deg)
    }

    pub const fn to_deg(self) -> f64 {
        self.0
    }

    pub fn try_from_deg<T: Into<f64>>(deg: T) -> Option<Self> {
        let deg = deg.into();
        if (Self::DEG_MIN..=Self::DEG_MAX).contains(&deg) {
            Some(Self(deg))
        } else {
            None
        }
    }
}

impl fmt::Display for LatCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_deg())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct LngCoord(f64);

impl LngCoord {
    const DEG_MAX: f64 = 180.0;
    const DEG_MIN: f64 = -180.0;

    /// The caller guarantees that `deg` is within the valid range.
    pub const fn from_deg_unchecked(deg: f64) -> Self {
        Self(deg)
    }

    pub const fn to_deg(self) -> f64 {
        self.0
    }

    pub fn try_from_deg<T: Into<f64>>(deg: T) -> Option<Self> {
        let deg = deg.into();
        if (Self::DEG_MIN..=Self::DEG_MAX).contains(&deg) {
            Some(Self(deg))
        } else {
            None
        }
    }
}

impl fmt::Display for LngCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_deg())
    }
}

/// A geographical position in degrees.
///
/// Coordinates are kept as they were delivered by the geocoder.
/// Formatting uses the shortest representation that parses back
/// to the identical value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPoint {
    lat: LatCoord,
    lng: LngCoord,
}

#[derive(Debug, Error, PartialEq)]
pub enum MapPointParseError {
    #[error("Invalid latitude '{0}': {1}")]
    Latitude(String, ParseFloatError),
    #[error("Invalid longitude '{0}': {1}")]
    Longitude(String, ParseFloatError),
    #[error("Latitude degrees out of range: {0}")]
    LatitudeRange(f64),
    #[error("Longitude degrees out of range: {0}")]
    LongitudeRange(f64),
    #[error("Failed to parse map point: {0}")]
    Format(String),
}

impl MapPoint {
    pub const fn new(lat: LatCoord, lng: LngCoord) -> Self {
        Self { lat, lng }
    }

    pub const fn lat(self) -> LatCoord {
        self.lat
    }

    pub const fn lng(self) -> LngCoord {
        self.lng
    }

    pub const fn to_lat_lng_deg(self) -> (f64, f64) {
        (self.lat.to_deg(), self.lng.to_deg())
    }

    pub fn try_from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(
        lat: LAT,
        lng: LNG,
    ) -> Option<Self> {
        match (LatCoord::try_from_deg(lat), LngCoord::try_from_deg(lng)) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    pub fn parse_lat_lng_deg(
        lat_deg_str: &str,
        lng_deg_str: &str,
    ) -> Result<Self, MapPointParseError> {
        let lat_deg_str = lat_deg_str.trim();
        let lng_deg_str = lng_deg_str.trim();
        let lat_deg = lat_deg_str
            .parse::<f64>()
            .map_err(|err| MapPointParseError::Latitude(lat_deg_str.to_string(), err))?;
        let lng_deg = lng_deg_str
            .parse::<f64>()
            .map_err(|err| MapPointParseError::Longitude(lng_deg_str.to_string(), err))?;
        let lat = LatCoord::try_from_deg(lat_deg).ok_or(MapPointParseError::LatitudeRange(lat_deg))?;
        let lng =
            LngCoord::try_from_deg(lng_deg).ok_or(MapPointParseError::LongitudeRange(lng_deg))?;
        Ok(Self::new(lat, lng))
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for MapPoint {
    type Err = MapPointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((lat_deg_str, lng_deg_str)) = s.split(',').collect_tuple() {
            MapPoint::parse_lat_lng_deg(lat_deg_str, lng_deg_str)
        } else {
            Err(MapPointParseError::Format(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_coordinates_out_of_range() {
        assert!(MapPoint::try_from_lat_lng_deg(90.0, 180.0).is_some());
        assert!(MapPoint::try_from_lat_lng_deg(-90.0, -180.0).is_some());
        assert!(MapPoint::try_from_lat_lng_deg(90.1, 0.0).is_none());
        assert!(MapPoint::try_from_lat_lng_deg(0.0, -180.1).is_none());
        assert!(MapPoint::try_from_lat_lng_deg(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn display_and_parse_exactly() {
        let pos = MapPoint::try_from_lat_lng_deg(39.801055, -89.643604).unwrap();
        assert_eq!(pos.to_string(), "39.801055,-89.643604");
        assert_eq!(pos.to_string().parse::<MapPoint>().unwrap(), pos);
        let (lat, lng) = pos.to_lat_lng_deg();
        assert_eq!(lat.to_string().parse::<f64>().unwrap(), lat);
        assert_eq!(lng.to_string().parse::<f64>().unwrap(), lng);
    }

    #[test]
    fn parse_invalid_map_points() {
        assert!(matches!(
            "abc,1".parse::<MapPoint>(),
            Err(MapPointParseError::Latitude(..))
        ));
        assert!(matches!(
            "1,".parse::<MapPoint>(),
            Err(MapPointParseError::Longitude(..))
        ));
        assert_eq!(
            "91,1".parse::<MapPoint>(),
            Err(MapPointParseError::LatitudeRange(91.0))
        );
        assert!(matches!(
            "1,2,3".parse::<MapPoint>(),
            Err(MapPointParseError::Format(_))
        ));
    }
}
