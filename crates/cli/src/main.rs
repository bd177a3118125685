use chrono::{DateTime, Utc};
use clap::Parser;
use nalgebra::Point2;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain2fds_core::{
    build_case, CaseConfig, CaseError, CaseRequest, CoordinateFrame, Extent, FuelScheme,
    FuelTables, Provenance, ReconcileRequest, SampleGrid,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate an FDS wildland fire case from sampled terrain and land-use data
#[derive(Parser, Debug)]
#[command(name = "terrain2fds")]
#[command(version, about, long_about = None)]
struct Args {
    /// Case identifier, prefix of every output file
    #[arg(long)]
    chid: String,

    /// JSON file of cell-centre samples in the working UTM frame
    #[arg(long)]
    samples: PathBuf,

    /// Frame of --extent, --origin and --fire-origin (EPSG:4326, EPSG:326zz or EPSG:327zz)
    #[arg(long, default_value = "EPSG:4326")]
    frame: CoordinateFrame,

    /// Terrain extent as xmin,ymin,xmax,ymax
    #[arg(long, allow_hyphen_values = true)]
    extent: Extent,

    /// Domain origin as x,y (defaults to the extent centre)
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    origin: Option<Point2<f64>>,

    /// Fire origin as x,y (defaults to the domain origin)
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    fire_origin: Option<Point2<f64>>,

    /// Sampling grid spacing in metres
    #[arg(long, default_value_t = 10.0)]
    spacing: f64,

    /// Land-use scheme (landfire-fbfm13, cima-propagator)
    #[arg(long, default_value = "landfire-fbfm13")]
    scheme: FuelScheme,

    /// Wind CSV with a header line and time, speed, direction columns
    #[arg(long)]
    wind: Option<PathBuf>,

    /// JSON file overriding case generation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file replacing the built-in land-use tables
    #[arg(long)]
    fuel_tables: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Elevation layer name, for the provenance header
    #[arg(long, default_value = "DEM")]
    dem_layer: String,

    /// Land-use layer name, for the provenance header
    #[arg(long)]
    landuse_layer: Option<String>,

    /// Project file, for the provenance header
    #[arg(long)]
    project: Option<PathBuf>,

    /// Generation time (RFC 3339) written to the header, for reproducible output
    #[arg(long)]
    timestamp: Option<DateTime<Utc>>,
}

fn parse_point(s: &str) -> Result<Point2<f64>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid point <{s}>: {e}"))?;
    match values.as_slice() {
        [x, y] => Ok(Point2::new(*x, *y)),
        _ => Err(format!("invalid point <{s}>: expected x,y")),
    }
}

fn run(args: Args) -> Result<(), CaseError> {
    let config = match &args.config {
        Some(path) => CaseConfig::load(path)?,
        None => CaseConfig::default(),
    };
    let tables = match &args.fuel_tables {
        Some(path) => FuelTables::load(path)?,
        None => FuelTables::builtin(),
    };
    let samples = SampleGrid::load(&args.samples)?;

    let request = CaseRequest {
        chid: args.chid,
        reconcile: ReconcileRequest {
            project_frame: args.frame,
            extent: args.extent,
            origin: args.origin,
            fire_origin: args.fire_origin,
            spacing: args.spacing,
        },
        scheme: args.scheme,
        wind_file: args.wind,
        provenance: Provenance {
            project_path: args.project,
            dem_layer: args.dem_layer,
            landuse_layer: args.landuse_layer,
            generated_at: args.timestamp.unwrap_or_else(Utc::now),
        },
    };

    let bundle = build_case(&request, &samples, &tables, &config)?;
    let written = bundle.write(&args.out)?;
    info!("FDS case ready: <{}>", written.fds_path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12.5, -3").unwrap(), Point2::new(12.5, -3.0));
        assert!(parse_point("1,2,3").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "terrain2fds",
            "--chid",
            "hill",
            "--samples",
            "samples.json",
            "--extent",
            "8.99,44.99,9.01,45.01",
            "--fire-origin",
            "9.0,45.0",
            "--scheme",
            "CIMA Propagator",
            "--timestamp",
            "2024-05-04T12:00:00Z",
        ])
        .unwrap();

        assert_eq!(args.chid, "hill");
        assert_eq!(args.frame, CoordinateFrame::Geographic);
        assert_eq!(args.scheme, FuelScheme::CimaPropagator);
        assert_eq!(args.fire_origin, Some(Point2::new(9.0, 45.0)));
        assert!(args.origin.is_none());
        assert_eq!(args.spacing, 10.0);
        assert!(args.timestamp.is_some());
    }

    #[test]
    fn test_utm_frame_argument() {
        let args = Args::try_parse_from([
            "terrain2fds",
            "--chid",
            "c",
            "--samples",
            "s.json",
            "--frame",
            "EPSG:32633",
            "--extent",
            "268000,5095000,268500,5095500",
        ])
        .unwrap();
        assert_eq!(args.frame.epsg(), 32633);
    }
}
