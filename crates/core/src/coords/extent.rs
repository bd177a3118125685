//! Axis-aligned extents and their alignment to a sampling grid

use super::frame::CoordinateFrame;
use crate::error::{CaseError, CaseResult};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Samples per extent edge when transforming between frames
const EDGE_SAMPLES: usize = 21;

/// Axis-aligned rectangle in some coordinate frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Create an extent, normalising swapped bounds
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if any bound is not finite.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> CaseResult<Self> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(CaseError::coordinate(format!(
                "Extent <{x0}, {y0}, {x1}, {y1}> is not finite"
            )));
        }
        Ok(Self {
            xmin: x0.min(x1),
            ymin: y0.min(y1),
            xmax: x0.max(x1),
            ymax: y0.max(y1),
        })
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// Bounds relative to `origin` as `[xmin, xmax, ymin, ymax]`
    pub fn relative_to(&self, origin: Point2<f64>) -> [f64; 4] {
        [
            self.xmin - origin.x,
            self.xmax - origin.x,
            self.ymin - origin.y,
            self.ymax - origin.y,
        ]
    }

    /// Bounding box of this extent once transformed into another frame
    ///
    /// The boundary is densified before transforming so curved edges in the
    /// target frame are still enclosed.
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if any boundary point cannot be transformed.
    pub fn transform(&self, from: &CoordinateFrame, to: &CoordinateFrame) -> CaseResult<Self> {
        if from == to {
            return Ok(*self);
        }

        let mut xmin = f64::MAX;
        let mut ymin = f64::MAX;
        let mut xmax = f64::MIN;
        let mut ymax = f64::MIN;

        let steps = EDGE_SAMPLES - 1;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = self.xmin + t * self.width();
            let y = self.ymin + t * self.height();
            for point in [
                Point2::new(x, self.ymin),
                Point2::new(x, self.ymax),
                Point2::new(self.xmin, y),
                Point2::new(self.xmax, y),
            ] {
                let p = from.transform(point, to)?;
                xmin = xmin.min(p.x);
                ymin = ymin.min(p.y);
                xmax = xmax.max(p.x);
                ymax = ymax.max(p.y);
            }
        }

        Extent::new(xmin, ymin, xmax, ymax)
    }

    /// Grow the extent from its lower-left corner so width and height are
    /// whole multiples of `spacing`
    ///
    /// A small `epsilon` (in units of `spacing`) is added to each dimension so
    /// the last row and column of samples fall strictly inside the extent.
    ///
    /// # Errors
    /// Returns [`CaseError::Coordinate`] if `spacing` is not a positive finite number.
    pub fn aligned(&self, spacing: f64, epsilon: f64) -> CaseResult<AlignedExtent> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(CaseError::coordinate(format!(
                "Sampling spacing <{spacing}> must be a positive number"
            )));
        }
        let cols = ((self.width() / spacing).ceil() as usize).max(1);
        let rows = ((self.height() / spacing).ceil() as usize).max(1);

        let extent = Extent {
            xmin: self.xmin,
            ymin: self.ymin,
            xmax: self.xmin + (cols as f64 + epsilon) * spacing,
            ymax: self.ymin + (rows as f64 + epsilon) * spacing,
        };
        Ok(AlignedExtent {
            extent,
            spacing,
            cols,
            rows,
        })
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1},{:.1} : {:.1},{:.1}",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

impl FromStr for Extent {
    type Err = CaseError;

    /// Parse `xmin,ymin,xmax,ymax`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CaseError::coordinate(format!("Invalid extent <{s}>: {e}")))?;
        match values.as_slice() {
            [x0, y0, x1, y1] => Extent::new(*x0, *y0, *x1, *y1),
            _ => Err(CaseError::coordinate(format!(
                "Invalid extent <{s}>: expected xmin,ymin,xmax,ymax"
            ))),
        }
    }
}

/// Extent grown to a whole number of sampling cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedExtent {
    pub extent: Extent,
    pub spacing: f64,
    /// Whole cells along x
    pub cols: usize,
    /// Whole cells along y
    pub rows: usize,
}
