//! Text normalization primitives for product matching.
//!
//! Everything downstream (vendor resolution, catalog indexing, candidate
//! selection, scoring) keys off the normalized forms produced here, so the
//! central invariant is determinism: the same input always yields the same
//! normalized text, token set, and key-term set, and `normalize` is
//! idempotent (`normalize(normalize(x)) == normalize(x)`).

mod terms;
mod text;
pub mod vocab;

pub use terms::extract_key_terms;
pub use text::{normalize, strip_compliance_prefix, tokens};
pub use vocab::{
    known_strains_in, resolve_category, ProductCategory, StrainEntry, COMPLIANCE_PREFIX,
};
