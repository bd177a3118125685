//! Fully resolved inputs of the case text generator

use super::domain::MeshGrid;
use super::terrain::TerrainSummary;
use crate::config::CaseConfig;
use crate::coords::Georeference;
use crate::fuel::FuelScheme;
use crate::wind::WindRamps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name and version written in the provenance header
pub const GENERATOR: &str = concat!("terrain2fds <", env!("CARGO_PKG_VERSION"), ">");

/// Where a case came from, echoed as comments at the top of the deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Project file the case was generated from, if saved
    pub project_path: Option<PathBuf>,
    /// Name of the elevation layer
    pub dem_layer: String,
    /// Name of the land-use layer, if any
    pub landuse_layer: Option<String>,
    /// Generation time; part of the inputs so output stays reproducible
    pub generated_at: DateTime<Utc>,
}

impl Provenance {
    /// Provenance stamped with the current time
    pub fn now(dem_layer: impl Into<String>) -> Self {
        Self {
            project_path: None,
            dem_layer: dem_layer.into(),
            landuse_layer: None,
            generated_at: Utc::now(),
        }
    }
}

/// Everything [`super::generate`] needs, with no further lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseContext {
    /// Case identifier, prefix of every output file
    pub chid: String,
    pub georef: Georeference,
    pub scheme: FuelScheme,
    /// Encoded terrain, minus its bytes
    pub terrain: TerrainSummary,
    pub wind: WindRamps,
    pub config: CaseConfig,
    pub provenance: Provenance,
}

impl CaseContext {
    /// Name of the text input file
    pub fn fds_file_name(&self) -> String {
        format!("{}.fds", self.chid)
    }

    /// Whole domain bounds relative to the origin: `[xmin, xmax, ymin, ymax, zmin, zmax]`
    ///
    /// The floor sits `floor_margin` below the lowest terrain vertex and the
    /// ceiling `ceiling_margin` above the highest.
    pub fn mesh_xb(&self) -> [f64; 6] {
        let [xmin, xmax, ymin, ymax] = self
            .georef
            .extent
            .extent
            .relative_to(self.georef.origin.utm);
        let (z_lo, z_hi) = self.terrain.z_range;
        [
            xmin,
            xmax,
            ymin,
            ymax,
            z_lo - self.config.floor_margin,
            z_hi + self.config.ceiling_margin,
        ]
    }

    /// Meshes covering the domain, split `nmesh` ways
    pub fn meshes(&self) -> MeshGrid {
        MeshGrid::new(
            self.mesh_xb(),
            self.config.nmesh,
            self.config.cell_size,
            self.config.mesh_cells,
        )
    }

    /// Cell counts of each mesh, derived from `cell_size` when it is set
    pub fn mesh_ijk(&self) -> [u32; 3] {
        self.meshes().ijk
    }
}
