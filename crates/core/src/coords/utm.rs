//! UTM zone selection and transverse Mercator projection on WGS84
//!
//! Zone numbers follow the standard 6° bands, including the Norway (32V)
//! and Svalbard (31X, 33X, 35X, 37X) exceptions. Projection formulas are the
//! USGS series expansions (Snyder, *Map Projections: A Working Manual*,
//! eqs. 8-9 to 8-25), accurate to well under a millimetre inside a zone.

use crate::error::{CaseError, CaseResult};
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis (m)
const WGS84_A: f64 = 6378137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257223563;
/// UTM central meridian scale factor
const K0: f64 = 0.9996;
/// UTM false easting (m)
const FALSE_EASTING: f64 = 500000.0;
/// UTM false northing for the southern hemisphere (m)
const FALSE_NORTHING_SOUTH: f64 = 10000000.0;
/// Latitudes at or above this value are assigned to the northern hemisphere
const NORTH_THRESHOLD: f64 = -1e-6;

/// Geographic position in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Check that the position is finite and inside the valid degree ranges
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] naming the offending value.
    pub fn validate(&self) -> CaseResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(CaseError::coordinate(format!(
                "Latitude <{}> out of bounds",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(CaseError::coordinate(format!(
                "Longitude <{}> out of bounds",
                self.lon
            )));
        }
        Ok(())
    }

    /// OpenStreetMap link centred on this position
    pub fn osm_link(&self) -> String {
        format!(
            "http://www.openstreetmap.org/?mlat={}&mlon={}&zoom=12",
            self.lat, self.lon
        )
    }
}

/// A UTM zone: number in 1..=60 and hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UtmZoneData")]
pub struct UtmZone {
    number: u8,
    north: bool,
}

#[derive(Deserialize)]
struct UtmZoneData {
    number: u8,
    north: bool,
}

impl TryFrom<UtmZoneData> for UtmZone {
    type Error = CaseError;

    fn try_from(data: UtmZoneData) -> CaseResult<Self> {
        Self::new(data.number, data.north)
    }
}

impl UtmZone {
    /// Build a zone from its number and hemisphere
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if `number` is outside 1..=60.
    pub fn new(number: u8, north: bool) -> CaseResult<Self> {
        if !(1..=60).contains(&number) {
            return Err(CaseError::coordinate(format!(
                "UTM zone number <{number}> out of range 1..=60"
            )));
        }
        Ok(Self { number, north })
    }

    /// Derive the zone containing a geographic position
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] for non-finite or out-of-range input.
    pub fn from_lonlat(position: LonLat) -> CaseResult<Self> {
        position.validate()?;
        let LonLat { lon, lat } = position;
        Ok(Self {
            number: zone_number(lon, lat),
            north: lat >= NORTH_THRESHOLD,
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    /// EPSG code of the WGS84 / UTM frame for this zone
    pub fn epsg(&self) -> u32 {
        let base = if self.north { 32600 } else { 32700 };
        base + u32::from(self.number)
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }

    /// Project a geographic position into this zone
    ///
    /// Positions outside the zone are projected anyway (extended
    /// transverse Mercator); accuracy degrades far from the central meridian.
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] for non-finite or out-of-range input.
    pub fn forward(&self, position: LonLat) -> CaseResult<(f64, f64)> {
        position.validate()?;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);

        let phi = position.lat.to_radians();
        let dlambda = (position.lon - self.central_meridian()).to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * dlambda;
        let m = meridian_arc(phi, e2);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let easting = K0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
            + FALSE_EASTING;
        let mut northing = K0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
        if !self.north {
            northing += FALSE_NORTHING_SOUTH;
        }
        Ok((easting, northing))
    }

    /// Unproject a position of this zone back to geographic coordinates
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] for non-finite input.
    pub fn inverse(&self, easting: f64, northing: f64) -> CaseResult<LonLat> {
        if !easting.is_finite() || !northing.is_finite() {
            return Err(CaseError::coordinate(format!(
                "Projected point <{easting}, {northing}> is not finite"
            )));
        }
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let y = if self.north {
            northing
        } else {
            northing - FALSE_NORTHING_SOUTH
        };
        let m = y / K0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let sqrt_1_e2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = WGS84_A / denom.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / denom.powf(1.5);
        let d = (easting - FALSE_EASTING) / (n1 * K0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);
        let dlambda = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

        Ok(LonLat {
            lon: self.central_meridian() + dlambda.to_degrees(),
            lat: phi.to_degrees(),
        })
    }
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hemisphere = if self.north { 'N' } else { 'S' };
        write!(f, "WGS 84 / UTM zone {}{hemisphere}", self.number)
    }
}

/// Zone number for an already validated position
fn zone_number(lon: f64, lat: f64) -> u8 {
    // Norway
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }
    // Svalbard
    if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
        if lon < 9.0 {
            return 31;
        } else if lon < 21.0 {
            return 33;
        } else if lon < 33.0 {
            return 35;
        } else if lon < 42.0 {
            return 37;
        }
    }
    // lon = 180 belongs to the last zone, not to a 61st
    let number = ((lon + 180.0) / 6.0).floor() as u8 + 1;
    number.min(60)
}

/// Distance along the meridian from the equator to latitude `phi` (radians)
fn meridian_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}
