//! Land-use classification schemes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of supported land-use classification schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelScheme {
    /// Landfire.gov 13 Anderson Fire Behavior Fuel Models
    LandfireFbfm13,
    /// CIMA Propagator land-use classes
    CimaPropagator,
}

impl FuelScheme {
    pub const ALL: [FuelScheme; 2] = [FuelScheme::LandfireFbfm13, FuelScheme::CimaPropagator];

    pub fn name(&self) -> &'static str {
        match self {
            FuelScheme::LandfireFbfm13 => "Landfire FBFM13",
            FuelScheme::CimaPropagator => "CIMA Propagator",
        }
    }

    /// Whether the scheme's built-in table is only partially mapped
    pub fn is_provisional(&self) -> bool {
        matches!(self, FuelScheme::CimaPropagator)
    }
}

impl std::fmt::Display for FuelScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FuelScheme {
    type Err = String;

    /// Accepts the display name or a kebab/snake-case form, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "landfirefbfm13" | "landfire" | "fbfm13" => Ok(FuelScheme::LandfireFbfm13),
            "cimapropagator" | "cima" => Ok(FuelScheme::CimaPropagator),
            _ => Err(format!(
                "unknown land-use scheme <{s}>, expected one of: {}",
                FuelScheme::ALL.map(|scheme| scheme.name()).join(", ")
            )),
        }
    }
}
