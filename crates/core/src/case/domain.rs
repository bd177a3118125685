//! Computational domain split into identical meshes
//!
//! The domain is cut into `nx` × `ny` equal meshes, with `nx / ny` close to
//! the domain aspect ratio and `nx * ny` at most the requested count. A
//! single mesh is written as a plain `&MESH`; more are written as one
//! `&MESH` replicated by a `&MULT` record.

use super::generator::join_fixed;
use serde::{Deserialize, Serialize};

/// Id of the `&MULT` record replicating the mesh
pub const MULT_ID: &str = "Meshes";

/// Identical meshes covering the domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshGrid {
    /// Meshes along x and y
    pub counts: [u32; 2],
    /// Bounds of the south-west mesh, relative to the origin
    pub xb: [f64; 6],
    /// Cells of each mesh along x, y, z
    pub ijk: [u32; 3],
}

impl MeshGrid {
    /// Split `domain` into at most `nmesh` meshes
    ///
    /// Cell counts come from `cell_size` when it is set, otherwise every
    /// mesh gets `cells`.
    pub fn new(domain: [f64; 6], nmesh: u32, cell_size: Option<f64>, cells: [u32; 3]) -> Self {
        let counts = split(domain, nmesh);
        let [nx, ny] = counts.map(f64::from);
        let xb = [
            domain[0],
            domain[0] + (domain[1] - domain[0]) / nx,
            domain[2],
            domain[2] + (domain[3] - domain[2]) / ny,
            domain[4],
            domain[5],
        ];
        let ijk = match cell_size {
            Some(size) => {
                let count = |lo: f64, hi: f64| ((hi - lo) / size).ceil().max(1.0) as u32;
                [count(xb[0], xb[1]), count(xb[2], xb[3]), count(xb[4], xb[5])]
            }
            None => cells,
        };
        Self { counts, xb, ijk }
    }

    /// Number of meshes
    pub fn len(&self) -> u32 {
        self.counts[0] * self.counts[1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `&MESH` record, preceded by its `&MULT` when there is more than one mesh
    pub fn to_fds(&self) -> String {
        let [i, j, k] = self.ijk;
        let xb = join_fixed(&self.xb);
        if self.len() == 1 {
            return format!("&MESH IJK={i},{j},{k}, XB={xb} /");
        }

        let [nx, ny] = self.counts;
        let size = [
            self.xb[1] - self.xb[0],
            self.xb[3] - self.xb[2],
            self.xb[5] - self.xb[4],
        ];
        let cells = u64::from(i) * u64::from(j) * u64::from(k);
        [
            format!(
                "! {nx} x {ny} meshes of {:.0}m x {:.0}m x {:.0}m size and {cells} cells each",
                size[0], size[1], size[2]
            ),
            format!(
                "&MULT ID='{MULT_ID}', DX={:.3}, I_LOWER=0, I_UPPER={}, \
                 DY={:.3}, J_LOWER=0, J_UPPER={} /",
                size[0],
                nx - 1,
                size[1],
                ny - 1
            ),
            format!("&MESH IJK={i},{j},{k}, MULT_ID='{MULT_ID}', XB={xb} /"),
        ]
        .join("\n")
    }
}

/// Meshes along x and y for a domain of the given bounds
///
/// `ny` is the rounded square root of `nmesh` over the aspect ratio and `nx`
/// the whole number of columns left for it, so `nx * ny <= nmesh`.
pub fn split(domain: [f64; 6], nmesh: u32) -> [u32; 2] {
    let width = (domain[1] - domain[0]).abs();
    let depth = (domain[3] - domain[2]).abs();
    let sized = width > 0.0 && depth > 0.0;
    if nmesh <= 1 || !sized {
        return [1, 1];
    }
    let ratio = width / depth;
    let ny = ((f64::from(nmesh) / ratio).sqrt().round() as u32).clamp(1, nmesh);
    let nx = (nmesh / ny).max(1);
    [nx, ny]
}
