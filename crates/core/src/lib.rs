//! Mission cost and value engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod inventory;
pub mod missions;
pub mod resolve;
pub mod reward;
pub mod solver;

pub use cards::*;
pub use config::*;
pub use inventory::*;
pub use missions::*;
pub use resolve::*;
pub use reward::*;
pub use solver::*;
