//! Bank-specific statement layouts.

pub mod bbva_mx;

pub use bbva_mx::BbvaMx;
