//! Triangulated terrain surface built from sampled quad centres
//!
//! The upstream sampler returns one sample per grid cell centre (x, y, z and
//! land-use code). Vertices sit on cell corners: each corner averages the
//! four cell centres around it, with a ghost ring of centres copied outward
//! so boundary corners have four neighbours too. Every cell yields two
//! triangles that both carry the cell's land-use code.
//!
//! ```text
//!   v(i+1,j) ------ v(i+1,j+1)
//!      |  \    f2      |
//!      |     \         |        i: rows, south to north
//!      |  f1    \      |        j: columns, west to east
//!   v(i,j) -------- v(i,j+1)
//! ```

use super::Vec3;
use crate::coords::{AlignedExtent, CoordinateFrame};
use crate::error::{CaseError, CaseResult};
use nalgebra::{Point2, Vector2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Smallest sample grid that can be triangulated
const MIN_GRID_SIDE: usize = 3;

/// Row-major grid of cell-centre samples in the working frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SampleGridData")]
pub struct SampleGrid {
    /// Number of sample rows (south to north)
    rows: usize,
    /// Number of sample columns (west to east)
    cols: usize,
    /// Absolute sample positions, `[row * cols + col]`
    points: Vec<Vec3>,
    /// Land-use code per sample
    landuse: Vec<i32>,
}

impl SampleGrid {
    /// Create a grid, checking that both sequences have `rows * cols` entries
    ///
    /// # Errors
    /// Returns [`CaseError::Encoding`] on a size mismatch or a grid smaller than 3×3.
    pub fn new(rows: usize, cols: usize, points: Vec<Vec3>, landuse: Vec<i32>) -> CaseResult<Self> {
        if rows < MIN_GRID_SIDE || cols < MIN_GRID_SIDE {
            return Err(CaseError::encoding(format!(
                "Sample grid {rows}x{cols} too small, \
                 at least {MIN_GRID_SIDE}x{MIN_GRID_SIDE} required"
            )));
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| CaseError::encoding(format!("Sample grid {rows}x{cols} too large")))?;
        if points.len() != expected || landuse.len() != expected {
            return Err(CaseError::encoding(format!(
                "Sample grid size mismatch: expected {rows}x{cols} = {expected} samples, \
                 got {} points and {} land-use codes",
                points.len(),
                landuse.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            points,
            landuse,
        })
    }

    /// Load a grid from JSON:
    /// `{"rows": r, "cols": c, "points": [[x, y, z], ...], "landuse": [...]}`
    ///
    /// # Errors
    /// Returns [`CaseError::Import`] if the file cannot be read or the grid is inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> CaseResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CaseError::import(path, e))?;
        let grid: Self = serde_json::from_str(&contents).map_err(|e| CaseError::import(path, e))?;
        info!(
            "Loaded {}x{} samples from <{}>",
            grid.rows,
            grid.cols,
            path.display()
        );
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub(crate) fn point(&self, row: usize, col: usize) -> Vec3 {
        self.points[row * self.cols + col]
    }

    #[inline]
    pub(crate) fn code(&self, row: usize, col: usize) -> i32 {
        self.landuse[row * self.cols + col]
    }

    /// Cell centre extended outward past the grid border
    ///
    /// Ghost centres keep the elevation of the nearest real centre and are
    /// displaced by whole grid steps in the horizontal plane.
    fn ghost_center(
        &self,
        row: isize,
        col: isize,
        step_row: Vector2<f64>,
        step_col: Vector2<f64>,
    ) -> Vec3 {
        let last_row = self.rows as isize - 1;
        let last_col = self.cols as isize - 1;
        let r = row.clamp(0, last_row);
        let c = col.clamp(0, last_col);
        let base = self.point(r as usize, c as usize);
        let shift = step_row * (row - r) as f64 + step_col * (col - c) as f64;
        Vec3::new(base.x + shift.x, base.y + shift.y, base.z)
    }
}

#[derive(Deserialize)]
struct SampleGridData {
    rows: usize,
    cols: usize,
    points: Vec<Vec3>,
    landuse: Vec<i32>,
}

impl TryFrom<SampleGridData> for SampleGrid {
    type Error = CaseError;

    fn try_from(data: SampleGridData) -> CaseResult<Self> {
        Self::new(data.rows, data.cols, data.points, data.landuse)
    }
}

/// What the upstream sampler is asked for
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingRequest {
    /// Extent to cover, already aligned to the sampling spacing
    pub extent: AlignedExtent,
    /// Frame the samples must be expressed in
    pub frame: CoordinateFrame,
}

/// Upstream collaborator producing elevation and land-use samples
pub trait TerrainSampler {
    /// Sample every cell centre of the requested extent
    ///
    /// # Errors
    /// Implementations report unreadable sources as [`CaseError::Import`].
    fn sample(&self, request: &SamplingRequest) -> CaseResult<SampleGrid>;
}

/// Samples taken beforehand are handed out as they are
impl TerrainSampler for SampleGrid {
    fn sample(&self, request: &SamplingRequest) -> CaseResult<SampleGrid> {
        let AlignedExtent { rows, cols, .. } = request.extent;
        if (self.rows, self.cols) != (rows, cols) {
            warn!(
                "Sample grid is {}x{}, requested extent has {}x{} cells",
                self.rows, self.cols, rows, cols
            );
        }
        Ok(self.clone())
    }
}

/// Any `Fn(x, y) -> (z, landuse)` samples cell centres of the request
impl<F> TerrainSampler for F
where
    F: Fn(f64, f64) -> (f64, i32),
{
    fn sample(&self, request: &SamplingRequest) -> CaseResult<SampleGrid> {
        let AlignedExtent {
            extent,
            spacing,
            cols,
            rows,
        } = request.extent;
        let mut points = Vec::with_capacity(rows * cols);
        let mut landuse = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let x = extent.xmin + (col as f64 + 0.5) * spacing;
                let y = extent.ymin + (row as f64 + 0.5) * spacing;
                let (z, code) = self(x, y);
                points.push(Vec3::new(x, y, z));
                landuse.push(code);
            }
        }
        SampleGrid::new(rows, cols, points, landuse)
    }
}

/// Terrain surface ready for classification and encoding
///
/// Vertices are relative to the domain origin horizontally and absolute
/// vertically. Faces and land-use codes are aligned one to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMesh {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    landuse: Vec<i32>,
}

impl TerrainMesh {
    /// Create a mesh from explicit arrays
    ///
    /// # Errors
    /// Returns [`CaseError::Encoding`] if faces and codes differ in length, a
    /// face references a missing vertex, or a vertex is not finite.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>, landuse: Vec<i32>) -> CaseResult<Self> {
        if faces.len() != landuse.len() {
            return Err(CaseError::encoding(format!(
                "{} faces but {} land-use codes",
                faces.len(),
                landuse.len()
            )));
        }
        if let Some(i) = vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(CaseError::encoding(format!("vertex {i} is not finite")));
        }
        let n_verts = vertices.len();
        for (i, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v as usize >= n_verts) {
                return Err(CaseError::encoding(format!(
                    "face {i} references vertex {bad}, only {n_verts} vertices"
                )));
            }
        }
        Ok(Self {
            vertices,
            faces,
            landuse,
        })
    }

    /// Triangulate a sample grid, expressing vertices relative to `origin`
    ///
    /// # Errors
    /// Returns [`CaseError::Encoding`] if the vertex count exceeds the 32-bit
    /// index range of the binary format.
    pub fn from_samples(grid: &SampleGrid, origin: Point2<f64>) -> CaseResult<Self> {
        let rows = grid.rows;
        let cols = grid.cols;
        let vert_cols = cols + 1;
        let n_verts = (rows + 1) * vert_cols;
        if u32::try_from(n_verts).is_err() || i32::try_from(2 * rows * cols).is_err() {
            return Err(CaseError::encoding(format!(
                "Sample grid {rows}x{cols} exceeds the 32-bit index range"
            )));
        }

        let p00 = grid.point(0, 0);
        let step_col = Vector2::new(grid.point(0, 1).x - p00.x, grid.point(0, 1).y - p00.y);
        let step_row = Vector2::new(grid.point(1, 0).x - p00.x, grid.point(1, 0).y - p00.y);

        let vertices: Vec<Vec3> = (0..n_verts)
            .into_par_iter()
            .map(|k| {
                let i = (k / vert_cols) as isize;
                let j = (k % vert_cols) as isize;
                let sum = grid.ghost_center(i - 1, j - 1, step_row, step_col)
                    + grid.ghost_center(i, j - 1, step_row, step_col)
                    + grid.ghost_center(i - 1, j, step_row, step_col)
                    + grid.ghost_center(i, j, step_row, step_col);
                let v = sum / 4.0;
                Vec3::new(v.x - origin.x, v.y - origin.y, v.z)
            })
            .collect();

        let index = |i: usize, j: usize| (i * vert_cols + j) as u32;
        let mut faces = Vec::with_capacity(2 * rows * cols);
        let mut landuse = Vec::with_capacity(2 * rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                faces.push([index(i, j), index(i, j + 1), index(i + 1, j)]);
                faces.push([index(i + 1, j + 1), index(i + 1, j), index(i, j + 1)]);
                let code = grid.code(i, j);
                landuse.push(code);
                landuse.push(code);
            }
        }

        info!(
            "Terrain ready: {} verts, {} faces",
            vertices.len(),
            faces.len()
        );

        Ok(Self {
            vertices,
            faces,
            landuse,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn landuse(&self) -> &[i32] {
        &self.landuse
    }

    /// Lowest and highest vertex elevation, `None` for an empty mesh
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.vertices.iter().fold(None, |acc, v| match acc {
            None => Some((v.z, v.z)),
            Some((lo, hi)) => Some((lo.min(v.z), hi.max(v.z))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Extent;
    use approx::assert_relative_eq;

    /// Flat 3x3 grid of 10 m cells starting at (1000, 2000), land-use = column + 1
    fn flat_grid(z: f64) -> SampleGrid {
        let mut points = Vec::new();
        let mut landuse = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                points.push(Vec3::new(
                    1005.0 + 10.0 * f64::from(col),
                    2005.0 + 10.0 * f64::from(row),
                    z,
                ));
                landuse.push(col + 1);
            }
        }
        SampleGrid::new(3, 3, points, landuse).unwrap()
    }

    #[test]
    fn test_sample_grid_validation() {
        assert!(SampleGrid::new(2, 3, vec![Vec3::zeros(); 6], vec![0; 6]).is_err());
        assert!(SampleGrid::new(3, 3, vec![Vec3::zeros(); 9], vec![0; 8]).is_err());
        assert!(SampleGrid::new(3, 3, vec![Vec3::zeros(); 9], vec![0; 9]).is_ok());
    }

    #[test]
    fn test_from_samples_counts() {
        let mesh =
            TerrainMesh::from_samples(&flat_grid(100.0), Point2::new(1000.0, 2000.0)).unwrap();
        assert_eq!(mesh.vertices().len(), 16);
        assert_eq!(mesh.faces().len(), 18);
        assert_eq!(mesh.landuse().len(), 18);
    }

    #[test]
    fn test_vertices_on_cell_corners() {
        let mesh =
            TerrainMesh::from_samples(&flat_grid(100.0), Point2::new(1000.0, 2000.0)).unwrap();
        let v = mesh.vertices();
        // Corners of the 30 m square, relative to the origin
        assert_relative_eq!(v[0], Vec3::new(0.0, 0.0, 100.0), epsilon = 1e-9);
        assert_relative_eq!(v[3], Vec3::new(30.0, 0.0, 100.0), epsilon = 1e-9);
        assert_relative_eq!(v[12], Vec3::new(0.0, 30.0, 100.0), epsilon = 1e-9);
        assert_relative_eq!(v[15], Vec3::new(30.0, 30.0, 100.0), epsilon = 1e-9);
        assert_relative_eq!(v[5], Vec3::new(10.0, 10.0, 100.0), epsilon = 1e-9);
    }

    #[test]
    fn test_vertex_elevation_is_neighbour_average() {
        let mut grid = flat_grid(0.0);
        grid.points[4].z = 40.0; // centre cell
        let mesh = TerrainMesh::from_samples(&grid, Point2::new(1000.0, 2000.0)).unwrap();
        // The four corners of the centre cell each see it once among four centres
        for k in [5, 6, 9, 10] {
            assert_relative_eq!(mesh.vertices()[k].z, 10.0, epsilon = 1e-12);
        }
        assert_relative_eq!(mesh.vertices()[0].z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_faces_wind_counter_clockwise() {
        let mesh = TerrainMesh::from_samples(&flat_grid(5.0), Point2::new(1000.0, 2000.0)).unwrap();
        let v = mesh.vertices();
        for face in mesh.faces() {
            let a = v[face[0] as usize];
            let b = v[face[1] as usize];
            let c = v[face[2] as usize];
            let normal = (b - a).cross(&(c - a));
            assert!(normal.z > 0.0, "face {face:?} points down");
        }
    }

    #[test]
    fn test_faces_inherit_cell_landuse() {
        let mesh = TerrainMesh::from_samples(&flat_grid(5.0), Point2::new(1000.0, 2000.0)).unwrap();
        assert_eq!(&mesh.landuse()[..6], &[1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_new_rejects_inconsistent_arrays() {
        let verts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ];
        assert!(TerrainMesh::new(verts.clone(), vec![[0, 1, 2]], vec![1]).is_ok());
        assert!(TerrainMesh::new(verts.clone(), vec![[0, 1, 2]], vec![]).is_err());
        assert!(TerrainMesh::new(verts.clone(), vec![[0, 1, 3]], vec![1]).is_err());

        let mut bad = verts;
        bad[1].z = f64::NAN;
        assert!(TerrainMesh::new(bad, vec![[0, 1, 2]], vec![1]).is_err());
    }

    #[test]
    fn test_z_range() {
        let verts = vec![
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(0.0, 1.0, 7.5),
        ];
        let mesh = TerrainMesh::new(verts, vec![[0, 1, 2]], vec![1]).unwrap();
        assert_eq!(mesh.z_range(), Some((-2.0, 7.5)));

        let empty = TerrainMesh::new(vec![], vec![], vec![]).unwrap();
        assert_eq!(empty.z_range(), None);
    }

    #[test]
    fn test_grid_json_is_validated() {
        let json = r#"{"rows": 3, "cols": 3, "points": [[0.0, 0.0, 1.0]], "landuse": [1]}"#;
        assert!(serde_json::from_str::<SampleGrid>(json).is_err());

        let grid = flat_grid(3.0);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<SampleGrid>(&json).unwrap(), grid);
    }

    #[test]
    fn test_load_samples_file() {
        let path = std::env::temp_dir().join("terrain2fds_samples_test.json");
        fs::write(&path, serde_json::to_string(&flat_grid(7.0)).unwrap()).unwrap();

        let grid = SampleGrid::load(&path).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.point(2, 2).z, 7.0);

        let _ = fs::remove_file(&path);
        assert!(matches!(SampleGrid::load(&path), Err(CaseError::Import { .. })));
    }

    #[test]
    fn test_oversized_grid_is_an_error() {
        let err = SampleGrid::new(usize::MAX, 3, vec![], vec![]).unwrap_err();
        assert!(matches!(err, CaseError::Encoding { .. }));

        let path = std::env::temp_dir().join("terrain2fds_samples_oversized.json");
        let side = u64::from(u32::MAX) + 1;
        fs::write(
            &path,
            format!(r#"{{"rows": {side}, "cols": {side}, "points": [], "landuse": []}}"#),
        )
        .unwrap();
        assert!(matches!(SampleGrid::load(&path), Err(CaseError::Import { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_closure_sampler_covers_extent() {
        let extent = Extent::new(0.0, 0.0, 40.0, 30.0).unwrap().aligned(10.0, 1e-6).unwrap();
        let request = SamplingRequest {
            extent,
            frame: CoordinateFrame::Geographic,
        };
        let sampler = |x: f64, y: f64| (x + y, if x < 20.0 { 1 } else { 2 });
        let grid = sampler.sample(&request).unwrap();

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.point(0, 0), Vec3::new(5.0, 5.0, 10.0));
        assert_eq!(grid.code(0, 3), 2);
    }
}
