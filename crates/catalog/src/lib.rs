//! Catalog data model and the multi-key in-memory index built from it.
//!
//! A catalog snapshot arrives as loosely shaped rows from an external
//! persistence collaborator. [`CatalogIndex::build`] turns the usable rows
//! into an arena of [`CatalogEntry`] values and four associative lookups
//! over them in one deterministic pass. The index is immutable after
//! build; a catalog change means a full rebuild.

mod entry;
mod index;

pub use entry::{CatalogEntry, CatalogRow, Lineage};
pub use index::CatalogIndex;
