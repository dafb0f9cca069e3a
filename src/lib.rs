//! Flattening of VEP `CSQ` annotations from VCF files into TSV tables.

pub mod common;
pub mod flatten;
