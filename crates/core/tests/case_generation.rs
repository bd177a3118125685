use chrono::{TimeZone, Utc};
use nalgebra::Point2;
use std::path::PathBuf;
use terrain2fds_core::case::encode_terrain;
use terrain2fds_core::{
    generate, reconcile, CaseConfig, CaseContext, Classifier, CoordinateFrame, Extent,
    FuelScheme, FuelTables, Provenance, ReconcileRequest, TerrainMesh, Vec3, WindRamps,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Single triangle from the origin, land-use code 1
fn single_face() -> TerrainMesh {
    TerrainMesh::new(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ],
        vec![[0, 1, 2]],
        vec![1],
    )
    .unwrap()
}

fn context(terrain: &TerrainMesh, scheme: FuelScheme, config: CaseConfig) -> CaseContext {
    let request = ReconcileRequest {
        project_frame: CoordinateFrame::Geographic,
        extent: Extent::new(8.995, 44.995, 9.005, 45.005).unwrap(),
        origin: None,
        fire_origin: Some(Point2::new(9.001, 45.0005)),
        spacing: 10.0,
    };
    let georef = reconcile(&request, config.extent_epsilon).unwrap();

    let tables = FuelTables::builtin();
    let classifier = Classifier::new(&tables, scheme);
    let encoded = encode_terrain("hill", terrain, &classifier, config.bingeom_layout).unwrap();

    CaseContext {
        chid: "hill".to_string(),
        georef,
        scheme,
        terrain: encoded.summary,
        wind: WindRamps::default(),
        config,
        provenance: Provenance {
            project_path: Some(PathBuf::from("/projects/hill.qgz")),
            dem_layer: "dem_10m".to_string(),
            landuse_layer: Some("fbfm13".to_string()),
            generated_at: Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap(),
        },
    }
}

fn line_starting<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.lines()
        .find(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix}"))
}

#[test]
fn test_single_face_mesh_bounds() {
    let terrain = single_face();
    let ctx = context(&terrain, FuelScheme::LandfireFbfm13, CaseConfig::default());
    assert_eq!(ctx.terrain.report.max_surface_id, 1);

    let text = generate(&ctx);
    let mesh = line_starting(&text, "&MESH");
    assert!(mesh.starts_with("&MESH IJK=50,50,50, XB="), "{mesh}");
    assert!(mesh.ends_with(",-1.000,50.000 /"), "{mesh}");

    let xb = ctx.mesh_xb();
    assert_eq!(xb[4], -1.0);
    assert_eq!(xb[5], 50.0);
}

#[test]
fn test_margins_follow_config() {
    let config = CaseConfig {
        floor_margin: 2.5,
        ceiling_margin: 100.0,
        ..Default::default()
    };
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, config);
    assert!(line_starting(&generate(&ctx), "&MESH").ends_with(",-2.500,100.000 /"));
}

#[test]
fn test_generation_is_deterministic() {
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    assert_eq!(generate(&ctx), generate(&ctx.clone()));
}

#[test]
fn test_record_order() {
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    let text = generate(&ctx);

    let position = |needle: &str| {
        text.find(needle)
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    let order = [
        "! Generated by terrain2fds",
        "&HEAD CHID='hill'",
        "&TIME T_END=1.0 /",
        "&MISC ORIGIN_LAT=",
        "&MESH",
        "&VENT MB='XMIN'",
        "&VENT MB='ZMAX'",
        "&SURF ID='Ignition'",
        "&SLCF",
        "&WIND",
        "&RAMP ID='ws'",
        "&SURF ID='A01'",
        "&SURF ID='NA'",
        "&GEOM ID='Terrain'",
        "&TAIL /",
    ];
    for pair in order.windows(2) {
        assert!(position(pair[0]) < position(pair[1]), "{} after {}", pair[0], pair[1]);
    }
    assert!(text.ends_with("&TAIL /\n"));
    assert_eq!(text.matches("SURF_ID='OPEN'").count(), 5);
    assert!(text.is_ascii());
}

#[test]
fn test_provenance_header() {
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    let text = generate(&ctx);

    assert!(text.contains("! Project file: </projects/hill.qgz>"));
    assert!(text.contains("! Selected UTM CRS: <WGS 84 / UTM zone 32N>"));
    assert!(text.contains("! DEM layer: <dem_10m>"));
    assert!(text.contains("! Landuse type: <Landfire FBFM13>"));
    assert!(text.contains("! Wind file: <none>"));
    assert!(text.contains("! Date: <Sat, 04 May 2024, 12:00:00>"));
    assert!(text.contains("! Domain Origin Link: <http://www.openstreetmap.org/?mlat="));
}

#[test]
fn test_provisional_scheme_is_flagged() {
    let ctx = context(&single_face(), FuelScheme::CimaPropagator, CaseConfig::default());
    assert!(generate(&ctx).contains("! Landuse type: <CIMA Propagator (provisional)>"));
}

#[test]
fn test_ignition_patch_centered_on_fire_origin() {
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    let text = generate(&ctx);

    let fire = ctx.georef.fire_offset();
    let expected = format!(
        "&VENT XB={:.3},{:.3},{:.3},{:.3},-1.000,-1.000, SURF_ID='Ignition', GEOM=T /",
        fire.x - 5.0,
        fire.x + 5.0,
        fire.y - 5.0,
        fire.y + 5.0
    );
    assert_eq!(line_starting(&text, "&VENT XB="), expected);
    // The fire origin lies east of the domain origin
    assert!(fire.x > 0.0);
}

#[test]
fn test_geom_references_binary_file() {
    let ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    let text = generate(&ctx);
    assert!(text.contains("READ_BINARY=T IS_TERRAIN=T"));
    assert!(text.contains("BINARY_NAMED_FILE='hill_Terrain.bingeom'"));
    assert!(text.contains("'Urban','Snow-Ice','Agriculture','Water','Barren','NA' /"));
}

#[test]
fn test_default_and_imported_wind() {
    let mut ctx = context(&single_face(), FuelScheme::LandfireFbfm13, CaseConfig::default());
    let text = generate(&ctx);
    assert_eq!(text.matches("&RAMP ID='ws'").count(), 3);
    assert_eq!(text.matches("&RAMP ID='wd'").count(), 3);

    ctx.wind = WindRamps::parse("time,speed,direction\n0,5,180\n600,15,200\n").unwrap();
    ctx.wind.source = Some(PathBuf::from("wind.csv"));
    let text = generate(&ctx);
    assert_eq!(text.matches("&RAMP ID='ws'").count(), 2);
    assert!(text.contains("&RAMP ID='wd', T=600.0, F=200.0 /"));
    assert!(text.contains("! Wind file: <wind.csv>"));
}

#[test]
fn test_cell_size_derives_ijk() {
    let terrain = TerrainMesh::new(
        vec![
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::new(10.0, 0.0, 110.0),
            Vec3::new(0.0, 10.0, 120.0),
        ],
        vec![[0, 1, 2]],
        vec![1],
    )
    .unwrap();
    let config = CaseConfig {
        cell_size: Some(10.0),
        ..Default::default()
    };
    let ctx = context(&terrain, FuelScheme::LandfireFbfm13, config);

    let xb = ctx.mesh_xb();
    let [i, j, k] = ctx.mesh_ijk();
    assert_eq!(i, ((xb[1] - xb[0]) / 10.0).ceil() as u32);
    assert_eq!(j, ((xb[3] - xb[2]) / 10.0).ceil() as u32);
    // 99 .. 170
    assert_eq!(k, 8);
    assert!(line_starting(&generate(&ctx), "&MESH").starts_with(&format!("&MESH IJK={i},{j},8,")));
}
