//! Land-use code to surface index tables
//!
//! Tables are plain data: built in, or loaded once from JSON at start-up and
//! then passed by reference to the classifier. Every table must map the
//! reserved code [`NOT_AVAILABLE_CODE`], which is the fallback for codes the
//! table does not know.

use super::catalog::MAX_SURFACE_INDEX;
use super::scheme::FuelScheme;
use crate::error::{CaseError, CaseResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Reserved land-use code meaning "no data"; its entry is the fallback
pub const NOT_AVAILABLE_CODE: i32 = 0;

/// Mapping of one scheme, guaranteed to contain the fallback entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<i32, u32>", into = "BTreeMap<i32, u32>")]
pub struct SchemeTable {
    mapping: FxHashMap<i32, u32>,
    fallback: u32,
}

impl SchemeTable {
    /// Build a table from `(code, surface_index)` pairs
    ///
    /// # Errors
    /// Returns a description if the fallback code is missing or a surface
    /// index is outside the surface catalog.
    pub fn new(entries: impl IntoIterator<Item = (i32, u32)>) -> Result<Self, String> {
        let mapping: FxHashMap<i32, u32> = entries.into_iter().collect();
        if let Some((code, index)) = mapping
            .iter()
            .find(|&(_, &index)| index == 0 || index > MAX_SURFACE_INDEX)
        {
            return Err(format!(
                "land-use code {code} maps to surface index {index}, \
                 outside 1..={MAX_SURFACE_INDEX}"
            ));
        }
        let fallback = *mapping.get(&NOT_AVAILABLE_CODE).ok_or_else(|| {
            format!("table has no entry for the not-available code {NOT_AVAILABLE_CODE}")
        })?;
        Ok(Self { mapping, fallback })
    }

    /// Table from trusted data whose first entry is the fallback code
    fn builtin(entries: &[(i32, u32)]) -> Self {
        debug_assert_eq!(entries[0].0, NOT_AVAILABLE_CODE);
        Self {
            mapping: entries.iter().copied().collect(),
            fallback: entries[0].1,
        }
    }

    /// Surface index for `code`, if the table maps it explicitly
    pub fn get(&self, code: i32) -> Option<u32> {
        self.mapping.get(&code).copied()
    }

    /// Surface index used for unmapped codes
    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl TryFrom<BTreeMap<i32, u32>> for SchemeTable {
    type Error = String;

    fn try_from(value: BTreeMap<i32, u32>) -> Result<Self, Self::Error> {
        SchemeTable::new(value)
    }
}

impl From<SchemeTable> for BTreeMap<i32, u32> {
    fn from(table: SchemeTable) -> Self {
        table.mapping.into_iter().collect()
    }
}

/// Tables for every scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelTables {
    landfire_fbfm13: SchemeTable,
    /// Partially ported: codes without an entry fall back to "NA"
    cima_propagator: SchemeTable,
}

impl FuelTables {
    /// Built-in tables
    #[must_use]
    pub fn builtin() -> Self {
        // Landfire FBFM13: 1-13 are the Anderson models, 91-99 non-burnable
        let landfire_fbfm13 = [
            (0, 19), // not available
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 5),
            (6, 6),
            (7, 7),
            (8, 8),
            (9, 9),
            (10, 10),
            (11, 11),
            (12, 12),
            (13, 13),
            (91, 14), // urban
            (92, 15), // snow/ice
            (93, 16), // agriculture
            (98, 17), // water
            (99, 18), // barren
        ];
        // Provisional: only the classes below have been mapped so far
        let cima_propagator = [
            (0, 19),
            (1, 5),
            (2, 4),
            (3, 18),
            (4, 10),
            (5, 10),
            (6, 1),
            (7, 1),
        ];

        Self {
            landfire_fbfm13: SchemeTable::builtin(&landfire_fbfm13),
            cima_propagator: SchemeTable::builtin(&cima_propagator),
        }
    }

    /// Load tables from a JSON file of the form
    /// `{"landfire_fbfm13": {"0": 19, ...}, "cima_propagator": {...}}`
    ///
    /// # Errors
    /// Returns [`CaseError::Import`] if the file cannot be read or a table is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> CaseResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CaseError::import(path, e))?;
        serde_json::from_str(&contents).map_err(|e| CaseError::import(path, e))
    }

    pub fn table(&self, scheme: FuelScheme) -> &SchemeTable {
        match scheme {
            FuelScheme::LandfireFbfm13 => &self.landfire_fbfm13,
            FuelScheme::CimaPropagator => &self.cima_propagator,
        }
    }
}

impl Default for FuelTables {
    fn default() -> Self {
        Self::builtin()
    }
}
