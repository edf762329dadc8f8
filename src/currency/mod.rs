//! Currency normalization and display

pub mod format;
pub mod normalizer;

pub use format::*;
pub use normalizer::*;
