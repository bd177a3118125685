//! FDS input deck text
//!
//! [`generate`] is a pure function of its [`CaseContext`]: the same context,
//! generation time included, always yields the same bytes.

use super::context::{CaseContext, GENERATOR};
use crate::config::TerrainOutput;
use crate::fuel::{SurfaceDef, SURFACE_CATALOG};
use std::path::Path;

/// Longest path echoed verbatim in comments
const MAX_COMMENT_PATH: usize = 60;

/// Continuation indent of wrapped records
const INDENT: &str = "      ";

/// Render the complete input deck
pub fn generate(ctx: &CaseContext) -> String {
    let chid = &ctx.chid;
    let georef = &ctx.georef;
    let xb = ctx.mesh_xb();
    let meshes = ctx.meshes();
    let fire = georef.fire_offset();
    let half = ctx.config.ignition_half_size;
    let floor = xb[4];
    // Only a &GEOM terrain can carry the ignition patch
    let on_geom = match ctx.terrain.output {
        TerrainOutput::Geom => ", GEOM=T",
        TerrainOutput::Obst => "",
    };

    let mut lines = provenance(ctx);
    lines.extend([
        " ".to_string(),
        format!("&HEAD CHID='{chid}' TITLE='Description of {chid}' /"),
        format!("&TIME T_END={:.1} /", ctx.config.t_end),
        " ".to_string(),
        format!(
            "&MISC ORIGIN_LAT={:.7}, ORIGIN_LON={:.7}, NORTH_BEARING=0.",
            georef.origin.wgs84.lat, georef.origin.wgs84.lon
        ),
        format!(
            "{INDENT}TERRAIN_CASE=T, TERRAIN_IMAGE='{chid}_tex.png', LEVEL_SET_MODE=1 /"
        ),
        " ".to_string(),
        "! Domain and its boundary conditions".to_string(),
        meshes.to_fds(),
    ]);
    // MB names the boundary of a single mesh, DB that of the whole domain
    let boundary = if meshes.len() == 1 { "MB" } else { "DB" };
    for side in ["XMIN", "XMAX", "YMIN", "YMAX", "ZMAX"] {
        lines.push(format!("&VENT {boundary}='{side}', SURF_ID='OPEN' /"));
    }
    lines.extend([
        " ".to_string(),
        "! Fire origin".to_string(),
        "&SURF ID='Ignition', VEG_LSET_IGNITE_TIME=0., COLOR='RED' /".to_string(),
        format!(
            "&VENT XB={}, SURF_ID='Ignition'{on_geom} /",
            join_fixed(&[
                fire.x - half,
                fire.x + half,
                fire.y - half,
                fire.y + half,
                floor,
                floor
            ])
        ),
        " ".to_string(),
        "! Output quantities".to_string(),
        format!(
            "&SLCF AGL_SLICE={:.1}, QUANTITY='LEVEL SET VALUE' /",
            ctx.config.slice_agl
        ),
        " ".to_string(),
        ctx.wind.to_fds(),
        " ".to_string(),
        "! Boundary conditions".to_string(),
        "! 13 Anderson Fire Behavior Fuel Models".to_string(),
    ]);
    lines.extend(SURFACE_CATALOG.iter().map(SurfaceDef::to_fds));
    lines.extend([
        " ".to_string(),
        "! Terrain".to_string(),
        ctx.terrain.fds_block.clone(),
        " ".to_string(),
        "&TAIL /".to_string(),
    ]);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// `&GEOM` record reading the terrain from `file_name`
///
/// Surface ids are listed in catalog order, so surface index `n` in the
/// binary file is the `n`th id.
pub fn geom_block(file_name: &str) -> String {
    let ids = |range: std::ops::Range<usize>| {
        SURFACE_CATALOG[range]
            .iter()
            .map(|s| format!("'{}'", s.id))
            .collect::<Vec<_>>()
            .join(",")
    };
    let fuels = SURFACE_CATALOG
        .iter()
        .take_while(|s| s.fuel_index.is_some())
        .count();
    [
        "&GEOM ID='Terrain' READ_BINARY=T IS_TERRAIN=T EXTEND_TERRAIN=F".to_string(),
        format!("{INDENT}BINARY_NAMED_FILE='{file_name}'"),
        format!("{INDENT}SURF_ID={},", ids(0..fuels)),
        format!("{INDENT}        {} /", ids(fuels..SURFACE_CATALOG.len())),
    ]
    .join("\n")
}

fn provenance(ctx: &CaseContext) -> Vec<String> {
    let georef = &ctx.georef;
    let p = &ctx.provenance;
    let project = p
        .project_path
        .as_deref()
        .map_or_else(|| "not saved".to_string(), shorten_path);
    let wind = ctx
        .wind
        .source
        .as_deref()
        .map_or_else(|| "none".to_string(), shorten_path);
    let (landuse_layer, landuse_type) = match &p.landuse_layer {
        Some(layer) if ctx.scheme.is_provisional() => {
            (layer.clone(), format!("{} (provisional)", ctx.scheme))
        }
        Some(layer) => (layer.clone(), ctx.scheme.to_string()),
        None => ("None".to_string(), "None".to_string()),
    };

    vec![
        format!("! Generated by {GENERATOR}"),
        format!("! Project file: <{project}>"),
        format!("! Selected UTM CRS: <{}>", georef.frame().description()),
        format!("! Terrain extent: <{}>", georef.extent.extent),
        format!("! DEM layer: <{}>", p.dem_layer),
        format!("! Landuse layer: <{landuse_layer}>"),
        format!("! Landuse type: <{landuse_type}>"),
        format!(
            "! Domain Origin: <{:.1}, {:.1}>",
            georef.origin.utm.x, georef.origin.utm.y
        ),
        format!("! Domain Origin Link: <{}>", georef.origin.wgs84.osm_link()),
        format!(
            "! Fire Origin: <{:.1}, {:.1}>",
            georef.fire_origin.utm.x, georef.fire_origin.utm.y
        ),
        format!("! Fire Origin Link: <{}>", georef.fire_origin.wgs84.osm_link()),
        format!("! Wind file: <{wind}>"),
        format!(
            "! Date: <{}>",
            p.generated_at.format("%a, %d %b %Y, %H:%M:%S")
        ),
    ]
}

/// Path as shown in comments, keeping only the tail of long paths
pub fn shorten_path(path: &Path) -> String {
    let text = path.display().to_string();
    let len = text.chars().count();
    if len > MAX_COMMENT_PATH {
        let tail: String = text.chars().skip(len - (MAX_COMMENT_PATH - 3)).collect();
        format!("...{tail}")
    } else {
        text
    }
}

pub(crate) fn join_fixed(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(",")
}
