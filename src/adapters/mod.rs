// Adapters layer: concrete implementations for external systems (input files, stores).

pub mod input;
pub mod store;

#[cfg(feature = "aws")]
pub mod dynamodb;
