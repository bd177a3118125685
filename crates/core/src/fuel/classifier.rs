//! Mapping of sampled land-use codes to surface indices

use super::scheme::FuelScheme;
use super::tables::{FuelTables, SchemeTable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Classifies raw land-use codes under one scheme
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    scheme: FuelScheme,
    table: &'a SchemeTable,
}

impl<'a> Classifier<'a> {
    pub fn new(tables: &'a FuelTables, scheme: FuelScheme) -> Self {
        Self {
            scheme,
            table: tables.table(scheme),
        }
    }

    pub fn scheme(&self) -> FuelScheme {
        self.scheme
    }

    /// Surface index for a land-use code; unmapped codes get the fallback
    #[inline]
    pub fn classify(&self, code: i32) -> u32 {
        self.table.get(code).unwrap_or(self.table.fallback())
    }

    /// Classify the land-use code of every face
    pub fn classify_faces(&self, codes: &[i32]) -> Classification {
        let surface_ids: Vec<u32> = codes.par_iter().map(|&code| self.classify(code)).collect();

        let unmapped_codes: BTreeSet<i32> = codes
            .iter()
            .copied()
            .filter(|&code| self.table.get(code).is_none())
            .collect();
        let fallback_faces = codes
            .iter()
            .filter(|&&code| unmapped_codes.contains(&code))
            .count();
        let max_surface_id = surface_ids.par_iter().copied().max().unwrap_or(0);

        if !unmapped_codes.is_empty() {
            debug!(
                "{} of {} faces use unmapped {} codes {:?}, classified as surface {}",
                fallback_faces,
                codes.len(),
                self.scheme,
                unmapped_codes,
                self.table.fallback()
            );
        }

        Classification {
            surface_ids,
            report: ClassificationReport {
                scheme: self.scheme,
                faces: codes.len(),
                fallback_faces,
                unmapped_codes,
                max_surface_id,
            },
        }
    }
}

/// Per-face surface indices with a summary
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One surface index per face, aligned with the input codes
    pub surface_ids: Vec<u32>,
    pub report: ClassificationReport,
}

/// Summary of a classification run
///
/// Codes missing from a table are not errors; they are reported here and
/// resolved through the fallback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub scheme: FuelScheme,
    pub faces: usize,
    /// Faces whose code was resolved through the fallback
    pub fallback_faces: usize,
    /// Distinct codes the table does not map
    pub unmapped_codes: BTreeSet<i32>,
    /// Highest surface index in use, 0 for no faces
    pub max_surface_id: u32,
}
