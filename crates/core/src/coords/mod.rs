//! Coordinate reconciliation between the project frame, WGS84 and UTM
//!
//! The user picks a domain origin, an optional fire origin and an extent in
//! whatever frame their project uses. [`reconcile`] brings all of them into
//! the UTM zone that contains the domain origin, and grows the extent to a
//! whole number of sampling cells.

pub mod extent;
pub mod frame;
pub mod utm;

pub use extent::{AlignedExtent, Extent};
pub use frame::{CoordinateFrame, EPSG_WGS84};
pub use utm::{LonLat, UtmZone};

use crate::error::CaseResult;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// User inputs, all expressed in the project frame
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    /// Frame of `extent`, `origin` and `fire_origin`
    pub project_frame: CoordinateFrame,
    /// Requested terrain extent
    pub extent: Extent,
    /// Domain origin; the extent centre when absent
    pub origin: Option<Point2<f64>>,
    /// Ignition point; the domain origin when absent
    pub fire_origin: Option<Point2<f64>>,
    /// Sampling grid spacing in metres
    pub spacing: f64,
}

/// A physical point known in both WGS84 and the working UTM frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginPair {
    pub wgs84: LonLat,
    pub utm: Point2<f64>,
}

/// Reconciled georeference of a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Georeference {
    /// Working UTM zone
    pub zone: UtmZone,
    /// Domain origin; every exported coordinate is relative to `origin.utm`
    pub origin: OriginPair,
    /// Ignition point
    pub fire_origin: OriginPair,
    /// Terrain extent in the working frame, grown to whole sampling cells
    pub extent: AlignedExtent,
}

impl Georeference {
    pub fn frame(&self) -> CoordinateFrame {
        CoordinateFrame::Utm(self.zone)
    }

    /// Fire origin relative to the domain origin
    pub fn fire_offset(&self) -> Point2<f64> {
        Point2::new(
            self.fire_origin.utm.x - self.origin.utm.x,
            self.fire_origin.utm.y - self.origin.utm.y,
        )
    }
}

/// Bring origins and extent of a request into the local UTM frame
///
/// # Errors
/// Returns [`crate::CaseError::Coordinate`] if the origin has no valid UTM
/// zone, any point cannot be transformed, or the spacing is not positive.
pub fn reconcile(request: &ReconcileRequest, extent_epsilon: f64) -> CaseResult<Georeference> {
    let project = request.project_frame;
    let origin = request.origin.unwrap_or_else(|| request.extent.center());

    let wgs84_origin = project.unproject(origin)?;
    let zone = UtmZone::from_lonlat(wgs84_origin)?;
    let utm = CoordinateFrame::Utm(zone);
    let utm_origin = utm.project(wgs84_origin)?;
    info!(
        "Selected {} ({}) for origin {:.7}, {:.7}",
        zone,
        utm,
        wgs84_origin.lon,
        wgs84_origin.lat
    );

    let fire_origin = match request.fire_origin {
        Some(point) => {
            let wgs84 = project.unproject(point)?;
            OriginPair {
                wgs84,
                utm: utm.project(wgs84)?,
            }
        }
        None => OriginPair {
            wgs84: wgs84_origin,
            utm: utm_origin,
        },
    };

    let utm_extent = request.extent.transform(&project, &utm)?;
    let aligned = utm_extent.aligned(request.spacing, extent_epsilon)?;
    debug!(
        "Extent <{}> aligned to <{}> ({}x{} cells of {} m)",
        utm_extent, aligned.extent, aligned.cols, aligned.rows, aligned.spacing
    );

    Ok(Georeference {
        zone,
        origin: OriginPair {
            wgs84: wgs84_origin,
            utm: utm_origin,
        },
        fire_origin,
        extent: aligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geographic_request() -> ReconcileRequest {
        ReconcileRequest {
            project_frame: CoordinateFrame::Geographic,
            extent: Extent::new(9.0, 45.0, 9.02, 45.02).unwrap(),
            origin: None,
            fire_origin: Some(Point2::new(9.012, 45.011)),
            spacing: 30.0,
        }
    }

    #[test]
    fn test_reconcile_from_geographic() {
        let georef = reconcile(&geographic_request(), 1e-6).unwrap();

        assert_eq!(georef.zone.number(), 32);
        assert!(georef.zone.is_north());
        assert_relative_eq!(georef.origin.wgs84.lon, 9.01, epsilon = 1e-12);
        assert_relative_eq!(georef.origin.wgs84.lat, 45.01, epsilon = 1e-12);

        // Origin pair describes the same physical point
        let back = georef.frame().unproject(georef.origin.utm).unwrap();
        assert_relative_eq!(back.lon, georef.origin.wgs84.lon, epsilon = 1e-7);
        assert_relative_eq!(back.lat, georef.origin.wgs84.lat, epsilon = 1e-7);

        // Origin lies inside the extent
        let extent = georef.extent.extent;
        assert!(georef.origin.utm.x > extent.xmin && georef.origin.utm.x < extent.xmax);
        assert!(georef.origin.utm.y > extent.ymin && georef.origin.utm.y < extent.ymax);
    }

    #[test]
    fn test_fire_offset() {
        let georef = reconcile(&geographic_request(), 1e-6).unwrap();
        let offset = georef.fire_offset();
        // 0.002° east and 0.001° north of the origin at 45°N
        assert!(offset.x > 150.0 && offset.x < 165.0);
        assert!(offset.y > 105.0 && offset.y < 118.0);
    }

    #[test]
    fn test_reconcile_from_utm_same_zone_is_exact() {
        let zone = UtmZone::new(10, true).unwrap();
        let request = ReconcileRequest {
            project_frame: CoordinateFrame::Utm(zone),
            extent: Extent::new(550000.0, 4180000.0, 551000.0, 4181500.0).unwrap(),
            origin: Some(Point2::new(550500.0, 4180750.0)),
            fire_origin: None,
            spacing: 20.0,
        };
        let georef = reconcile(&request, 1e-6).unwrap();

        assert_eq!(georef.zone, zone);
        assert_relative_eq!(georef.origin.utm.x, 550500.0, epsilon = 1e-4);
        assert_relative_eq!(georef.origin.utm.y, 4180750.0, epsilon = 1e-4);
        assert_eq!(georef.extent.cols, 50);
        assert_eq!(georef.extent.rows, 75);
        assert_eq!(georef.fire_origin, georef.origin);
        assert_eq!(georef.fire_offset(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_reconcile_rejects_degenerate_origin() {
        let mut request = geographic_request();
        request.origin = Some(Point2::new(9.0, 95.0));
        assert!(reconcile(&request, 1e-6).is_err());

        let mut request = geographic_request();
        request.spacing = 0.0;
        assert!(reconcile(&request, 1e-6).is_err());
    }
}
