//! Tunable constants of case generation
//!
//! Every field has a default matching the values FDS terrain cases are
//! usually built with; a JSON file may override any subset of them.

use crate::error::{CaseError, CaseResult};
use crate::mesh::BingeomLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the terrain reaches FDS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainOutput {
    /// Triangulated `&GEOM` read from a binary geometry file
    #[default]
    Geom,
    /// One `&OBST` block per sample, written inline in the deck
    Obst,
}

/// Configuration for one case generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    /// Nominal simulation end time written to `&TIME` (s)
    pub t_end: f64,
    /// Distance of the domain floor below the lowest terrain vertex (m)
    pub floor_margin: f64,
    /// Headroom above the highest terrain vertex (m)
    pub ceiling_margin: f64,
    /// Half side of the square ignition patch (m)
    pub ignition_half_size: f64,
    /// Mesh cell counts along x, y, z when `cell_size` is not set
    pub mesh_cells: [u32; 3],
    /// Uniform mesh cell size (m); overrides `mesh_cells` when set
    pub cell_size: Option<f64>,
    /// Number of meshes the domain is split into
    pub nmesh: u32,
    /// Extra fraction of a sampling cell added to aligned extents
    pub extent_epsilon: f64,
    /// Height above ground of the level-set output slice (m)
    pub slice_agl: f64,
    /// Binary layout of the terrain geometry file
    pub bingeom_layout: BingeomLayout,
    pub terrain_output: TerrainOutput,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            floor_margin: 1.0,
            ceiling_margin: 50.0,
            ignition_half_size: 5.0,
            mesh_cells: [50, 50, 50],
            cell_size: None,
            nmesh: 1,
            extent_epsilon: 1e-6,
            slice_agl: 1.0,
            bingeom_layout: BingeomLayout::Packed,
            terrain_output: TerrainOutput::Geom,
        }
    }
}

impl CaseConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    ///
    /// # Errors
    /// Returns [`CaseError::Import`] if the file cannot be read, parsed, or
    /// holds out-of-range values.
    pub fn load<P: AsRef<Path>>(path: P) -> CaseResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CaseError::import(path, e))?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|e| CaseError::import(path, e))?;
        config
            .validate()
            .map_err(|msg| CaseError::import(path, msg))?;
        Ok(config)
    }

    /// Check that every value is usable
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("t_end", self.t_end),
            ("ignition_half_size", self.ignition_half_size),
            ("slice_agl", self.slice_agl),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }
        let non_negative = [
            ("floor_margin", self.floor_margin),
            ("ceiling_margin", self.ceiling_margin),
            ("extent_epsilon", self.extent_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must not be negative, got {value}"));
            }
        }
        if self.nmesh == 0 {
            return Err("nmesh must be at least 1".to_string());
        }
        if self.mesh_cells.contains(&0) {
            return Err(format!(
                "mesh_cells must all be positive, got {:?}",
                self.mesh_cells
            ));
        }
        if let Some(size) = self.cell_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(format!("cell_size must be positive, got {size}"));
            }
        }
        Ok(())
    }
}
