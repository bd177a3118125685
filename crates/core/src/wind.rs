//! Wind speed and direction ramps
//!
//! Ramps come from an optional CSV file with one header line and rows of
//! `time_s, speed_m_s, direction_deg`. Rows are kept in file order. When no
//! file is given, or the file has no rows, the case uses a three-point example
//! ramp instead.

use crate::error::{CaseError, CaseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ramp id of the wind speed
pub const SPEED_RAMP_ID: &str = "ws";
/// Ramp id of the wind direction
pub const DIRECTION_RAMP_ID: &str = "wd";

/// Example speed ramp (s, m/s)
const DEFAULT_SPEED: [(f64, f64); 3] = [(0.0, 10.0), (600.0, 10.0), (1200.0, 20.0)];
/// Example direction ramp (s, degrees)
const DEFAULT_DIRECTION: [(f64, f64); 3] = [(0.0, 315.0), (600.0, 270.0), (1200.0, 360.0)];

/// One `(time, value)` ramp entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampPoint {
    /// Time (s)
    pub t: f64,
    pub value: f64,
}

impl RampPoint {
    pub fn new(t: f64, value: f64) -> Self {
        Self { t, value }
    }

    fn to_fds(self, id: &str) -> String {
        format!("&RAMP ID='{id}', T={:.1}, F={:.1} /", self.t, self.value)
    }
}

/// Imported wind ramps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindRamps {
    /// Speed over time (m/s)
    pub speed: Vec<RampPoint>,
    /// Direction over time (degrees)
    pub direction: Vec<RampPoint>,
    /// File the ramps were read from
    pub source: Option<PathBuf>,
}

impl WindRamps {
    /// Import ramps from `path`, or return empty ramps when no path is given
    ///
    /// # Errors
    /// Returns [`CaseError::Import`] if the file cannot be read or a row is
    /// not three numbers.
    pub fn import(path: Option<&Path>) -> CaseResult<Self> {
        let Some(path) = path else {
            debug!("No wind file, using example ramps");
            return Ok(Self::default());
        };
        info!("Import wind *.csv file: <{}>", path.display());
        let contents = fs::read_to_string(path).map_err(|e| CaseError::import(path, e))?;
        let mut ramps = Self::parse(&contents).map_err(|cause| CaseError::import(path, cause))?;
        ramps.source = Some(path.to_path_buf());
        info!("Imported {} wind ramp rows", ramps.speed.len());
        Ok(ramps)
    }

    /// Parse CSV text: a header line, then `time, speed, direction` rows
    ///
    /// Fields may be quoted and padded with spaces; blank lines are skipped.
    ///
    /// # Errors
    /// Returns a description naming the offending line.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut ramps = Self::default();
        for result in reader.records() {
            let record = result.map_err(|e| match e.position() {
                Some(pos) => format!("line {}: {e}", pos.line()),
                None => e.to_string(),
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, csv::Position::line);
            if record.len() < 3 {
                return Err(format!(
                    "line {line}: expected 3 columns (time, speed, direction), found {}",
                    record.len()
                ));
            }
            let mut values = [0.0; 3];
            for (value, field) in values.iter_mut().zip(record.iter()) {
                *value = field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("line {line}: '{field}' is not a number"))?;
            }
            let [t, speed, direction] = values;
            ramps.speed.push(RampPoint::new(t, speed));
            ramps.direction.push(RampPoint::new(t, direction));
        }
        Ok(ramps)
    }

    /// The three-point example ramps
    pub fn example() -> Self {
        let points = |table: &[(f64, f64)]| -> Vec<RampPoint> {
            table.iter().map(|&(t, v)| RampPoint::new(t, v)).collect()
        };
        Self {
            speed: points(&DEFAULT_SPEED),
            direction: points(&DEFAULT_DIRECTION),
            source: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty() && self.direction.is_empty()
    }

    /// Ramps the case will use: these, or the example ramps when empty
    pub fn resolved(&self) -> Self {
        if self.is_empty() {
            Self {
                source: self.source.clone(),
                ..Self::example()
            }
        } else {
            self.clone()
        }
    }

    /// `&WIND` record followed by the speed and direction `&RAMP` records
    pub fn to_fds(&self) -> String {
        let resolved = self.resolved();
        let mut lines = vec![
            "! Wind".to_string(),
            format!(
                "&WIND SPEED=1., RAMP_SPEED='{SPEED_RAMP_ID}', \
                 RAMP_DIRECTION='{DIRECTION_RAMP_ID}' /"
            ),
        ];
        if self.is_empty() {
            lines.push("! Example ramps for wind speed and direction".to_string());
        }
        lines.extend(resolved.speed.iter().map(|p| p.to_fds(SPEED_RAMP_ID)));
        lines.extend(resolved.direction.iter().map(|p| p.to_fds(DIRECTION_RAMP_ID)));
        lines.join("\n")
    }
}
