//! Binary terrain geometry (`.bingeom`) encoding
//!
//! Two layouts share the same validation:
//!
//! - [`BingeomLayout::Packed`]: contiguous little-endian fields, faces 0-based
//!   and each followed by its surface id.
//! - [`BingeomLayout::FortranRecords`]: unformatted sequential records as FDS
//!   reads them, each framed by its byte length, faces and volumes 1-based.
//!
//! Nothing is written unless the whole geometry is valid.

use super::Vec3;
use crate::error::{CaseError, CaseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Geometry type tag for a terrain surface
pub const GEOM_TYPE_TERRAIN: i32 = 2;

/// Byte layout of a `.bingeom` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BingeomLayout {
    /// Contiguous fields: type, surface count, vertices, faces with surface ids, volumes
    #[default]
    Packed,
    /// Length-tagged Fortran records
    FortranRecords,
}

/// Validated element counts of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BingeomCounts {
    pub n_verts: i32,
    pub n_faces: i32,
    /// Highest surface id referenced by a face
    pub n_surf_id: i32,
    pub n_volus: i32,
}

/// Check a geometry against the format's invariants
///
/// # Errors
/// Returns [`CaseError::Encoding`] if a count overflows `i32`, faces and
/// surface ids differ in length, an index is out of range, a surface id is
/// 0, or a coordinate is not finite.
pub fn validate(
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    surface_ids: &[u32],
    volumes: &[[u32; 4]],
) -> CaseResult<BingeomCounts> {
    let count = |what: &str, n: usize| {
        i32::try_from(n)
            .map_err(|_| CaseError::encoding(format!("{n} {what} exceed the i32 range")))
    };
    let n_verts = count("vertices", vertices.len())?;
    let n_faces = count("faces", faces.len())?;
    let n_volus = count("volumes", volumes.len())?;

    if surface_ids.len() != faces.len() {
        return Err(CaseError::encoding(format!(
            "{} faces but {} surface ids",
            faces.len(),
            surface_ids.len()
        )));
    }
    if let Some(i) = vertices
        .iter()
        .position(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
    {
        return Err(CaseError::encoding(format!("vertex {i} is not finite")));
    }

    let out_of_range = |indices: &[u32]| {
        indices
            .iter()
            .copied()
            .find(|&v| v as usize >= vertices.len())
    };
    for (i, face) in faces.iter().enumerate() {
        if let Some(bad) = out_of_range(&face[..]) {
            return Err(CaseError::encoding(format!(
                "face {i} references vertex {bad}, only {n_verts} vertices"
            )));
        }
    }
    for (i, volume) in volumes.iter().enumerate() {
        if let Some(bad) = out_of_range(&volume[..]) {
            return Err(CaseError::encoding(format!(
                "volume {i} references vertex {bad}, only {n_verts} vertices"
            )));
        }
    }

    if let Some(i) = surface_ids.iter().position(|&id| id == 0) {
        return Err(CaseError::encoding(format!("face {i} has surface id 0, ids start at 1")));
    }
    let max_id = surface_ids.iter().copied().max().unwrap_or(0);
    let n_surf_id = count("surface ids", max_id as usize)?;

    Ok(BingeomCounts {
        n_verts,
        n_faces,
        n_surf_id,
        n_volus,
    })
}

/// Encode a terrain geometry
///
/// Surface ids must be 1-based; the declared surface count is the highest id
/// in use. Volumes are empty for terrain-only cases.
///
/// # Errors
/// Returns [`CaseError::Encoding`] if the geometry fails [`validate`].
pub fn encode(
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    surface_ids: &[u32],
    volumes: &[[u32; 4]],
    layout: BingeomLayout,
) -> CaseResult<Vec<u8>> {
    let counts = validate(vertices, faces, surface_ids, volumes)?;

    let mut buffer = Vec::with_capacity(encoded_len(&counts, layout));
    let result = match layout {
        BingeomLayout::Packed => {
            write_packed(&mut buffer, &counts, vertices, faces, surface_ids, volumes)
        }
        BingeomLayout::FortranRecords => {
            write_records(&mut buffer, &counts, vertices, faces, surface_ids, volumes)
        }
    };
    result.map_err(|e| CaseError::encoding(e.to_string()))?;

    debug!(
        "Encoded {:?} bingeom: {} verts, {} faces, {} surface ids, {} bytes",
        layout,
        counts.n_verts,
        counts.n_faces,
        counts.n_surf_id,
        buffer.len()
    );
    Ok(buffer)
}

/// Exact byte length of an encoded geometry
fn encoded_len(counts: &BingeomCounts, layout: BingeomLayout) -> usize {
    let verts = counts.n_verts as usize * 3 * 8;
    let faces = counts.n_faces as usize * 3 * 4;
    let surfs = counts.n_faces as usize * 4;
    let volus = counts.n_volus as usize * 4 * 4;
    match layout {
        // type, surface count, three element counts
        BingeomLayout::Packed => 5 * 4 + verts + faces + surfs + volus,
        // six records, two tags each
        BingeomLayout::FortranRecords => 6 * 8 + 4 + 4 * 4 + verts + faces + surfs + volus,
    }
}

fn write_packed<W: Write>(
    buffer: &mut W,
    counts: &BingeomCounts,
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    surface_ids: &[u32],
    volumes: &[[u32; 4]],
) -> io::Result<()> {
    buffer.write_all(&GEOM_TYPE_TERRAIN.to_le_bytes())?;
    buffer.write_all(&counts.n_surf_id.to_le_bytes())?;

    buffer.write_all(&counts.n_verts.to_le_bytes())?;
    for v in vertices {
        buffer.write_all(&v.x.to_le_bytes())?;
        buffer.write_all(&v.y.to_le_bytes())?;
        buffer.write_all(&v.z.to_le_bytes())?;
    }

    buffer.write_all(&counts.n_faces.to_le_bytes())?;
    for (face, &surf) in faces.iter().zip(surface_ids) {
        for &index in face {
            buffer.write_all(&(index as i32).to_le_bytes())?;
        }
        buffer.write_all(&(surf as i32).to_le_bytes())?;
    }

    buffer.write_all(&counts.n_volus.to_le_bytes())?;
    for volume in volumes {
        for &index in volume {
            buffer.write_all(&(index as i32).to_le_bytes())?;
        }
    }
    Ok(())
}

/// Write one Fortran record: byte length, payload, byte length
fn write_record<W: Write>(buffer: &mut W, payload: &[u8]) -> io::Result<()> {
    let tag = i32::try_from(payload.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "record longer than i32::MAX bytes",
        )
    })?;
    buffer.write_all(&tag.to_le_bytes())?;
    buffer.write_all(payload)?;
    buffer.write_all(&tag.to_le_bytes())
}

fn write_records<W: Write>(
    buffer: &mut W,
    counts: &BingeomCounts,
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    surface_ids: &[u32],
    volumes: &[[u32; 4]],
) -> io::Result<()> {
    let ints = |values: &mut dyn Iterator<Item = i32>| -> Vec<u8> {
        values.flat_map(i32::to_le_bytes).collect()
    };

    write_record(buffer, &GEOM_TYPE_TERRAIN.to_le_bytes())?;
    write_record(
        buffer,
        &ints(&mut [counts.n_verts, counts.n_faces, counts.n_surf_id, counts.n_volus].into_iter()),
    )?;

    let verts: Vec<u8> = vertices
        .iter()
        .flat_map(|v| [v.x, v.y, v.z])
        .flat_map(f64::to_le_bytes)
        .collect();
    write_record(buffer, &verts)?;

    // Fortran indices are 1-based
    write_record(
        buffer,
        &ints(&mut faces.iter().flatten().map(|&i| i as i32 + 1)),
    )?;
    write_record(buffer, &ints(&mut surface_ids.iter().map(|&s| s as i32)))?;
    write_record(
        buffer,
        &ints(&mut volumes.iter().flatten().map(|&i| i as i32 + 1)),
    )
}

/// Write encoded bytes to `path`, replacing any existing file
///
/// # Errors
/// Returns [`CaseError::Write`] if the file cannot be written.
pub fn write_bingeom<P: AsRef<Path>>(path: P, bytes: &[u8]) -> CaseResult<()> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|e| CaseError::write(path, e))?;
    info!("Saved bingeom file <{}> ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// File name of the terrain geometry of case `chid`
pub fn terrain_file_name(chid: &str) -> String {
    format!("{chid}_Terrain.bingeom")
}
