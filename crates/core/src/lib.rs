//! FDS Terrain Case Generator
//!
//! Turns sampled elevation and land-use data into a ready-to-run FDS
//! wildland fire case:
//!
//! - coordinate reconciliation between the project frame, WGS84 and UTM
//! - terrain triangulation with per-face surface classification
//! - binary terrain geometry (`.bingeom`) encoding, or `&OBST` terrain blocks
//! - the text input deck referencing it, including wind ramps
//!
//! Raster sampling itself is delegated to a [`mesh::TerrainSampler`].

pub mod case;
pub mod config;
pub mod coords;
pub mod error;
pub mod fuel;
pub mod mesh;
pub mod pipeline;
pub mod wind;

pub use case::{generate, CaseBundle, CaseContext, MeshGrid, Provenance, WrittenCase};
pub use config::{CaseConfig, TerrainOutput};
pub use coords::{
    reconcile, CoordinateFrame, Extent, Georeference, LonLat, ReconcileRequest, UtmZone,
};
pub use error::{CaseError, CaseResult};
pub use fuel::{classify, Classifier, FuelScheme, FuelTables};
pub use mesh::{BingeomLayout, SampleGrid, TerrainMesh, TerrainSampler, Vec3};
pub use pipeline::{build_case, CaseRequest};
pub use wind::{RampPoint, WindRamps};
