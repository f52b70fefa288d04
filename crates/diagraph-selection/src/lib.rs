//! Selection service (): one bucket of selected ids per
//! entity type, strategy-based mutation (`REPLACE`/`APPEND`/`SUBTRACT`/
//! `TOGGLE`), a cancel/override protocol on every mutation, and an
//! aggregated `$selection` computed over all buckets.

mod bucket;
mod cardinality;
mod diff;
mod service;
mod strategy;

pub use bucket::{ChangeDecision, SelectionBucket};
pub use cardinality::Cardinality;
pub use diff::SelectionDiff;
pub use service::SelectionService;
pub use strategy::Strategy;
