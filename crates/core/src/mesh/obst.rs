//! Terrain as a staircase of `&OBST` blocks
//!
//! Each sample becomes a box centred on it, one sampling step wide and
//! rising from the domain floor to the sample elevation. Boxes overlap their
//! neighbours by [`OVERLAP`] so FDS sees a closed surface. A sample grid
//! rotated against the axes leaves diamond-shaped holes between diagonal
//! neighbours; one extra box per cell fills them.

use super::{SampleGrid, Vec3};
use crate::error::{CaseError, CaseResult};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overlap between neighbouring blocks (m)
pub const OVERLAP: f64 = 1e-6;

/// Axis skew below which the grid counts as aligned (m)
const ALIGNED_TOLERANCE: f64 = 1e-6;

/// One terrain block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstBlock {
    /// Bounds relative to the origin: `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub xb: [f64; 6],
    /// Land-use code of the sample the block stands for
    pub code: i32,
}

impl ObstBlock {
    pub fn top(&self) -> f64 {
        self.xb[5]
    }
}

/// Lowest and highest sample elevation
pub fn sample_z_range(grid: &SampleGrid) -> (f64, f64) {
    let mut range = (f64::INFINITY, f64::NEG_INFINITY);
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let z = grid.point(row, col).z;
            range = (range.0.min(z), range.1.max(z));
        }
    }
    range
}

/// Build the blocks of `grid`, relative to `origin`, standing on `floor`
///
/// # Errors
/// Returns [`CaseError::Encoding`] if the grid steps have no extent along x
/// or y, or a sample lies below `floor`.
pub fn obst_blocks(
    grid: &SampleGrid,
    origin: Point2<f64>,
    floor: f64,
) -> CaseResult<Vec<ObstBlock>> {
    let local = |row: usize, col: usize| {
        let p = grid.point(row, col);
        Vec3::new(p.x - origin.x, p.y - origin.y, p.z)
    };
    let step_col = local(0, 1) - local(0, 0);
    let step_row = local(1, 0) - local(0, 0);
    let dx = step_col.x.abs() / 2.0;
    let dy = step_row.y.abs() / 2.0;
    let usable = |half: f64| half.is_finite() && half > OVERLAP;
    if !(usable(dx) && usable(dy)) {
        return Err(CaseError::encoding(format!(
            "Sample grid steps ({:.3}, {:.3}) too small for OBST terrain",
            2.0 * dx,
            2.0 * dy
        )));
    }

    let (rows, cols) = (grid.rows(), grid.cols());
    let mut blocks = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let p = local(row, col);
            if p.z < floor {
                return Err(CaseError::encoding(format!(
                    "Sample ({row}, {col}) at z = {:.3} lies below the domain floor {floor:.3}",
                    p.z
                )));
            }
            blocks.push(ObstBlock {
                xb: [
                    p.x - dx - OVERLAP,
                    p.x + dx + OVERLAP,
                    p.y - dy - OVERLAP,
                    p.y + dy + OVERLAP,
                    floor,
                    p.z,
                ],
                code: grid.code(row, col),
            });
        }
    }

    let rotated = step_col.y.abs() > ALIGNED_TOLERANCE || step_row.x.abs() > ALIGNED_TOLERANCE;
    if rotated {
        for row in 0..rows - 1 {
            for col in 0..cols - 1 {
                let p = local(row, col);
                let q = local(row + 1, col + 1);
                let (x0, x1) = ordered(p.x + dx, q.x - dx);
                let (y0, y1) = ordered(p.y + dy, q.y - dy);
                blocks.push(ObstBlock {
                    xb: [x0 - OVERLAP, x1 + OVERLAP, y0 - OVERLAP, y1 + OVERLAP, floor, p.z],
                    code: grid.code(row, col),
                });
            }
        }
    }
    debug!(
        "{} OBST blocks from {rows}x{cols} samples (rotated grid: {rotated})",
        blocks.len()
    );
    Ok(blocks)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
