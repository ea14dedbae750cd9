//! Snapshot loading and validation for the mission engine.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
