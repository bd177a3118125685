//! Land-use classification into FDS surfaces

pub mod catalog;
pub mod classifier;
pub mod scheme;
pub mod tables;

pub use catalog::{surface, SurfaceDef, MAX_SURFACE_INDEX, SURFACE_CATALOG};
pub use classifier::{Classification, ClassificationReport, Classifier};
pub use scheme::FuelScheme;
pub use tables::{FuelTables, SchemeTable, NOT_AVAILABLE_CODE};

/// Surface index of `code` under `scheme`
///
/// Codes the scheme does not map resolve to the scheme's entry for
/// [`NOT_AVAILABLE_CODE`].
pub fn classify(tables: &FuelTables, code: i32, scheme: FuelScheme) -> u32 {
    Classifier::new(tables, scheme).classify(code)
}
