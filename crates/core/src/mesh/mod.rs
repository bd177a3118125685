//! Terrain surface and its binary geometry file

pub mod bingeom;
pub mod obst;
pub mod terrain;

pub use bingeom::{
    encode, terrain_file_name, write_bingeom, BingeomCounts, BingeomLayout, GEOM_TYPE_TERRAIN,
};
pub use obst::{obst_blocks, sample_z_range, ObstBlock};
pub use terrain::{SampleGrid, SamplingRequest, TerrainMesh, TerrainSampler};

/// 3D vector in the working frame (metres)
pub type Vec3 = nalgebra::Vector3<f64>;
