//! End-to-end case generation
//!
//! ```text
//! ReconcileRequest ─► reconcile ─► TerrainSampler ─► SampleGrid
//!                                                        │
//!                          geom: TerrainMesh ─► encode_terrain
//!                          obst: encode_obst_terrain
//!                                                        │
//!            wind CSV ─► WindRamps ─► CaseContext ─► CaseBundle
//! ```

use crate::case::{encode_obst_terrain, encode_terrain, CaseBundle, CaseContext, Provenance};
use crate::config::{CaseConfig, TerrainOutput};
use crate::coords::{reconcile, ReconcileRequest};
use crate::error::CaseResult;
use crate::fuel::{Classifier, FuelScheme, FuelTables};
use crate::mesh::{SamplingRequest, TerrainMesh, TerrainSampler};
use crate::wind::WindRamps;
use std::path::PathBuf;
use tracing::info;

/// User choices for one case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRequest {
    /// Case identifier, prefix of every output file
    pub chid: String,
    pub reconcile: ReconcileRequest,
    pub scheme: FuelScheme,
    /// Optional wind CSV
    pub wind_file: Option<PathBuf>,
    pub provenance: Provenance,
}

/// Run every stage and return the files of the case, not yet written
///
/// # Errors
/// Propagates the first failing stage: coordinate reconciliation, sampling,
/// terrain encoding or wind import.
pub fn build_case<S>(
    request: &CaseRequest,
    sampler: &S,
    tables: &FuelTables,
    config: &CaseConfig,
) -> CaseResult<CaseBundle>
where
    S: TerrainSampler + ?Sized,
{
    info!("Building case <{}>", request.chid);

    let georef = reconcile(&request.reconcile, config.extent_epsilon)?;

    let grid = sampler.sample(&SamplingRequest {
        extent: georef.extent,
        frame: georef.frame(),
    })?;
    let classifier = Classifier::new(tables, request.scheme);
    let encoded = match config.terrain_output {
        TerrainOutput::Geom => {
            let terrain = TerrainMesh::from_samples(&grid, georef.origin.utm)?;
            encode_terrain(&request.chid, &terrain, &classifier, config.bingeom_layout)?
        }
        TerrainOutput::Obst => {
            encode_obst_terrain(&grid, georef.origin.utm, &classifier, config.floor_margin)?
        }
    };

    let wind = WindRamps::import(request.wind_file.as_deref())?;

    let context = CaseContext {
        chid: request.chid.clone(),
        georef,
        scheme: request.scheme,
        terrain: encoded.summary.clone(),
        wind,
        config: config.clone(),
        provenance: request.provenance.clone(),
    };
    Ok(CaseBundle::new(&context, encoded))
}
