use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlannerError {
    #[error("unknown objective strategy: {0}")]
    UnknownStrategy(String),
    #[error("invalid budget: {0}")]
    InvalidBudget(f64),
}
