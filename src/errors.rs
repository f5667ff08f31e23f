use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizerError {
    /// The input plan still contains unresolved references; the analyzer
    /// must run first. No recovery.
    #[error("plan is not resolved: {0}")]
    Unresolved(String),
    /// A bounded batch exited without reaching a fixed point. Advisory:
    /// the executor logs this and accepts the last plan.
    #[error("rule batch {0} exceeded {1} iterations without converging")]
    ConvergenceExceeded(String, usize),
    /// A rule produced a malformed plan. Fatal; the result must not be used.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;

impl OptimizerError {
    pub fn should_never_happen(msg: &str) -> Self {
        OptimizerError::InvariantViolation(msg.to_string())
    }
}
