//! Terrain classification and encoding as one step
//!
//! The terrain reaches the deck in one of two shapes. A triangulated `&GEOM`
//! comes with its binary geometry file; the file and the `&GEOM` record that
//! names it are produced together, so a caller either holds both or neither.
//! `&OBST` terrain is a block per sample written inline in the deck.

use super::generator::geom_block;
use crate::config::TerrainOutput;
use crate::error::{CaseError, CaseResult};
use crate::fuel::{surface, ClassificationReport, Classifier};
use crate::mesh::{
    self, obst_blocks, sample_z_range, BingeomLayout, ObstBlock, SampleGrid, TerrainMesh,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What the case text needs to know about the encoded terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub output: TerrainOutput,
    /// `&GEOM` record referencing the geometry file, or the `&OBST` records
    pub fds_block: String,
    /// Lowest and highest terrain elevation (m)
    pub z_range: (f64, f64),
    pub report: ClassificationReport,
}

/// Binary geometry file of a `&GEOM` terrain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainFile {
    /// File name relative to the case directory
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Encoded terrain: deck text and, for `&GEOM` terrain, its geometry file
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTerrain {
    pub summary: TerrainSummary,
    pub file: Option<TerrainFile>,
}

/// Classify every face of `terrain` and encode it for case `chid`
///
/// # Errors
/// Returns [`CaseError::Encoding`] for an empty or inconsistent mesh.
pub fn encode_terrain(
    chid: &str,
    terrain: &TerrainMesh,
    classifier: &Classifier<'_>,
    layout: BingeomLayout,
) -> CaseResult<EncodedTerrain> {
    let z_range = terrain
        .z_range()
        .ok_or_else(|| CaseError::encoding("terrain has no vertices"))?;

    let classification = classifier.classify_faces(terrain.landuse());
    let report = classification.report;
    log_report(&report, "faces");

    let bytes = mesh::encode(
        terrain.vertices(),
        terrain.faces(),
        &classification.surface_ids,
        &[],
        layout,
    )?;
    let name = mesh::terrain_file_name(chid);

    Ok(EncodedTerrain {
        summary: TerrainSummary {
            output: TerrainOutput::Geom,
            fds_block: geom_block(&name),
            z_range,
            report,
        },
        file: Some(TerrainFile { name, bytes }),
    })
}

/// Classify every sample of `grid` and render it as `&OBST` blocks
///
/// Blocks stand on the domain floor, `floor_margin` below the lowest sample.
///
/// # Errors
/// Returns [`CaseError::Encoding`] for a degenerate sample grid.
pub fn encode_obst_terrain(
    grid: &SampleGrid,
    origin: Point2<f64>,
    classifier: &Classifier<'_>,
    floor_margin: f64,
) -> CaseResult<EncodedTerrain> {
    let z_range = sample_z_range(grid);
    let blocks = obst_blocks(grid, origin, z_range.0 - floor_margin)?;

    let codes: Vec<i32> = blocks.iter().map(|block| block.code).collect();
    let classification = classifier.classify_faces(&codes);
    let report = classification.report;
    log_report(&report, "OBST blocks");

    let records = blocks
        .iter()
        .zip(&classification.surface_ids)
        .map(|(block, &id)| obst_record(block, id))
        .collect::<CaseResult<Vec<_>>>()?;

    Ok(EncodedTerrain {
        summary: TerrainSummary {
            output: TerrainOutput::Obst,
            fds_block: records.join("\n"),
            z_range,
            report,
        },
        file: None,
    })
}

fn obst_record(block: &ObstBlock, surface_id: u32) -> CaseResult<String> {
    let surf = surface(surface_id).ok_or_else(|| {
        CaseError::encoding(format!("surface index {surface_id} outside the catalog"))
    })?;
    let xb = block
        .xb
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("&OBST XB={xb}, SURF_ID='{}' /", surf.id))
}

fn log_report(report: &ClassificationReport, what: &str) {
    info!(
        "Classified {} {what} as {}, highest surface index {}",
        report.faces, report.scheme, report.max_surface_id
    );
    if report.fallback_faces > 0 {
        warn!(
            "{} {what} have land-use codes unknown to {}, set to the not-available surface",
            report.fallback_faces, report.scheme
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::{FuelScheme, FuelTables};
    use crate::mesh::Vec3;

    fn single_face(code: i32) -> TerrainMesh {
        TerrainMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2]],
            vec![code],
        )
        .unwrap()
    }

    /// 3x3 grid of 10 m cells rising 1 m per row; the last column has code 42
    fn sample_grid() -> SampleGrid {
        let mut points = Vec::new();
        let mut landuse = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                points.push(Vec3::new(
                    5.0 + 10.0 * f64::from(col),
                    5.0 + 10.0 * f64::from(row),
                    100.0 + f64::from(row),
                ));
                landuse.push(if col == 2 { 42 } else { 1 });
            }
        }
        SampleGrid::new(3, 3, points, landuse).unwrap()
    }

    #[test]
    fn test_encode_terrain_bundles_bytes_and_reference() {
        let tables = FuelTables::builtin();
        let classifier = Classifier::new(&tables, FuelScheme::LandfireFbfm13);
        let encoded =
            encode_terrain("hill", &single_face(1), &classifier, BingeomLayout::Packed).unwrap();

        let file = encoded.file.unwrap();
        assert_eq!(file.name, "hill_Terrain.bingeom");
        assert_eq!(encoded.summary.output, TerrainOutput::Geom);
        assert!(encoded
            .summary
            .fds_block
            .contains("BINARY_NAMED_FILE='hill_Terrain.bingeom'"));
        assert_eq!(encoded.summary.z_range, (0.0, 0.0));
        assert_eq!(encoded.summary.report.max_surface_id, 1);
        // declared surface count
        assert_eq!(i32::from_le_bytes(file.bytes[4..8].try_into().unwrap()), 1);
    }

    #[test]
    fn test_encode_terrain_counts_fallback_faces() {
        let tables = FuelTables::builtin();
        let classifier = Classifier::new(&tables, FuelScheme::CimaPropagator);
        let encoded =
            encode_terrain("c", &single_face(99), &classifier, BingeomLayout::Packed).unwrap();

        assert_eq!(encoded.summary.report.fallback_faces, 1);
        assert_eq!(encoded.summary.report.max_surface_id, 19);
    }

    #[test]
    fn test_encode_terrain_rejects_empty_mesh() {
        let tables = FuelTables::builtin();
        let classifier = Classifier::new(&tables, FuelScheme::LandfireFbfm13);
        let empty = TerrainMesh::new(vec![], vec![], vec![]).unwrap();
        let err = encode_terrain("e", &empty, &classifier, BingeomLayout::Packed).unwrap_err();
        assert!(matches!(err, CaseError::Encoding { .. }));
    }

    #[test]
    fn test_obst_terrain_is_inline_text() {
        let tables = FuelTables::builtin();
        let classifier = Classifier::new(&tables, FuelScheme::LandfireFbfm13);
        let encoded =
            encode_obst_terrain(&sample_grid(), Point2::new(0.0, 0.0), &classifier, 1.0).unwrap();

        assert!(encoded.file.is_none());
        assert_eq!(encoded.summary.output, TerrainOutput::Obst);
        assert_eq!(encoded.summary.z_range, (100.0, 102.0));
        assert_eq!(encoded.summary.report.faces, 9);
        assert_eq!(encoded.summary.report.fallback_faces, 3);

        let lines: Vec<&str> = encoded.summary.fds_block.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(
            lines[0],
            "&OBST XB=-0.000001,10.000001,-0.000001,10.000001,99.000000,100.000000, SURF_ID='A01' /"
        );
        assert!(lines[2].ends_with("SURF_ID='NA' /"), "{}", lines[2]);
        assert!(lines[8].contains(",99.000000,102.000000,"), "{}", lines[8]);
    }
}
