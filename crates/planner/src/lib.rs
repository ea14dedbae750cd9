//! Budget-constrained mission selection over a resolved evaluation pass.

mod candidate;
mod error;
mod objective;
mod plan;

pub use candidate::*;
pub use error::*;
pub use objective::*;
pub use plan::*;
