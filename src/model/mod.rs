//! Schema model and replay engine

pub mod replay;
pub mod types;

#[cfg(test)]
pub mod builder;

pub use types::*;
