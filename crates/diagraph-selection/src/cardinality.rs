//! Bucket cardinality (): "Each bucket is *single* or
//! *multiple*."

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple,
}
