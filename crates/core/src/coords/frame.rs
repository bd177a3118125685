//! Coordinate reference frames understood by the reconciler

use super::utm::{LonLat, UtmZone};
use crate::error::{CaseError, CaseResult};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// EPSG code of WGS84 geographic coordinates
pub const EPSG_WGS84: u32 = 4326;

/// A coordinate reference frame: WGS84 lon/lat or one WGS84 / UTM zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateFrame {
    /// WGS84 longitude/latitude in degrees (x = lon, y = lat)
    Geographic,
    /// WGS84 / UTM easting/northing in metres
    Utm(UtmZone),
}

impl CoordinateFrame {
    pub fn epsg(&self) -> u32 {
        match self {
            CoordinateFrame::Geographic => EPSG_WGS84,
            CoordinateFrame::Utm(zone) => zone.epsg(),
        }
    }

    /// Human readable frame name, e.g. `WGS 84 / UTM zone 32N`
    pub fn description(&self) -> String {
        match self {
            CoordinateFrame::Geographic => "WGS 84".to_string(),
            CoordinateFrame::Utm(zone) => zone.to_string(),
        }
    }

    /// Convert a point of this frame to WGS84 lon/lat
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if the point is degenerate.
    pub fn unproject(&self, point: Point2<f64>) -> CaseResult<LonLat> {
        match self {
            CoordinateFrame::Geographic => {
                let position = LonLat::new(point.x, point.y);
                position.validate()?;
                Ok(position)
            }
            CoordinateFrame::Utm(zone) => {
                let position = zone.inverse(point.x, point.y)?;
                position.validate()?;
                Ok(position)
            }
        }
    }

    /// Convert WGS84 lon/lat into a point of this frame
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if the position is degenerate.
    pub fn project(&self, position: LonLat) -> CaseResult<Point2<f64>> {
        match self {
            CoordinateFrame::Geographic => {
                position.validate()?;
                Ok(Point2::new(position.lon, position.lat))
            }
            CoordinateFrame::Utm(zone) => {
                let (e, n) = zone.forward(position)?;
                Ok(Point2::new(e, n))
            }
        }
    }

    /// Transform a point from this frame into `target`
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if the point is degenerate in either frame.
    pub fn transform(
        &self,
        point: Point2<f64>,
        target: &CoordinateFrame,
    ) -> CaseResult<Point2<f64>> {
        if self == target {
            return Ok(point);
        }
        target.project(self.unproject(point)?)
    }
}

impl std::fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for CoordinateFrame {
    type Err = CaseError;

    /// Parse `EPSG:4326`, `EPSG:326zz` or `EPSG:327zz` (case-insensitive prefix)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map_or(trimmed, |_| &trimmed[5..]);
        let code: u32 = code.parse().map_err(|_| {
            CaseError::coordinate(format!("Unrecognised coordinate frame <{s}>"))
        })?;

        match code {
            EPSG_WGS84 => Ok(CoordinateFrame::Geographic),
            32601..=32660 => Ok(CoordinateFrame::Utm(UtmZone::new((code - 32600) as u8, true)?)),
            32701..=32760 => Ok(CoordinateFrame::Utm(UtmZone::new(
                (code - 32700) as u8,
                false,
            )?)),
            _ => Err(CaseError::coordinate(format!(
                "Unsupported coordinate frame <EPSG:{code}>, \
                 expected EPSG:4326 or a WGS 84 / UTM zone"
            ))),
        }
    }
}
