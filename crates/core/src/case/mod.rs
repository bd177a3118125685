//! FDS case assembly: context, deck text and output files

pub mod bundle;
pub mod context;
pub mod domain;
pub mod generator;
pub mod terrain;

pub use bundle::{CaseBundle, WrittenCase};
pub use context::{CaseContext, Provenance, GENERATOR};
pub use domain::MeshGrid;
pub use generator::{generate, geom_block, shorten_path};
pub use terrain::{
    encode_obst_terrain, encode_terrain, EncodedTerrain, TerrainFile, TerrainSummary,
};
