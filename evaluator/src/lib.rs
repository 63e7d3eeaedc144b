pub mod config;
pub mod device;
mod error;
pub mod evaluator;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod samples;
pub mod version;

#[cfg(test)]
mod tests;

pub use config::{NetworkConfig, OptimizerConfig};
pub use error::EvalError;
pub use evaluator::{Evaluator, EvaluatorState};
pub use optimizer::{Adadelta, ParamsAdadelta, SessionOptimizer};

pub type Result<T> = std::result::Result<T, EvalError>;
