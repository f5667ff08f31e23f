use crate::logical_plans::LogicalPlan;
use crate::{OptimizerError, OptimizerResult};

use self::rules::Rule;
pub mod rules;

/// Convergence policy of a rule batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// Apply each rule exactly once, in order.
    Once,
    /// Iterate the batch until the plan stops changing, or until
    /// `max_iterations` when bounded.
    FixedPoint { max_iterations: Option<usize> },
}

impl Convergence {
    pub const UNLIMITED: Convergence = Convergence::FixedPoint {
        max_iterations: None,
    };

    pub fn bounded(max_iterations: usize) -> Convergence {
        Convergence::FixedPoint {
            max_iterations: Some(max_iterations),
        }
    }
}

/// An ordered group of rules applied together under one convergence policy.
pub struct RuleBatch {
    name: String,
    convergence: Convergence,
    rules: Vec<Box<dyn Rule<LogicalPlan>>>,
}

impl RuleBatch {
    pub fn new(
        name: impl Into<String>,
        convergence: Convergence,
        rules: Vec<Box<dyn Rule<LogicalPlan>>>,
    ) -> Self {
        RuleBatch {
            name: name.into(),
            convergence,
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Rules executor: applies ordered rule batches to a resolved plan until
/// each batch converges. A pure function of its input; safe to share
/// across threads and to call concurrently.
pub struct Optimizer {
    batches: Vec<RuleBatch>,
    abort_check: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// The shipped configuration: one unlimited fixed-point batch holding
    /// the whole rule library.
    pub fn new() -> Self {
        Self::with_batches(vec![RuleBatch::new(
            "Optimizations",
            Convergence::UNLIMITED,
            rules::default_rules(),
        )])
    }

    pub fn with_batches(batches: Vec<RuleBatch>) -> Self {
        Optimizer {
            batches,
            abort_check: Box::new(|| false),
        }
    }

    /// Installs a cooperative-cancellation probe, consulted between rule
    /// applications. When it fires the current plan is accepted as-is.
    pub fn with_abort_check(
        mut self,
        check: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.abort_check = Box::new(check);
        self
    }

    pub fn optimize(&self, plan: LogicalPlan) -> OptimizerResult<LogicalPlan> {
        if !plan.is_resolved() {
            return Err(OptimizerError::Unresolved(
                "optimizer requires a fully resolved plan".to_string(),
            ));
        }
        let mut current = plan;
        for batch in &self.batches {
            current = self.run_batch(batch, current)?;
        }
        if !current.is_resolved() {
            return Err(OptimizerError::InvariantViolation(
                "optimized plan lost resolution".to_string(),
            ));
        }
        Ok(current)
    }

    fn run_batch(
        &self,
        batch: &RuleBatch,
        plan: LogicalPlan,
    ) -> OptimizerResult<LogicalPlan> {
        match batch.convergence {
            Convergence::Once => {
                let (plan, _) = self.run_iteration(batch, plan)?;
                Ok(plan)
            }
            Convergence::FixedPoint { max_iterations } => {
                let mut current = plan;
                let mut iterations = 0usize;
                loop {
                    let before = current.clone();
                    let (next, changed) = self.run_iteration(batch, current)?;
                    current = next;
                    iterations += 1;
                    if !changed || current == before {
                        log::debug!(
                            "batch {} converged after {} iteration(s)",
                            batch.name,
                            iterations
                        );
                        break;
                    }
                    if log::log_enabled!(log::Level::Debug) {
                        log::debug!(
                            "batch {} iteration {}:\nbefore:\n{}after:\n{}",
                            batch.name,
                            iterations,
                            before.pretty_tree(),
                            current.pretty_tree()
                        );
                    }
                    if (self.abort_check)() {
                        log::debug!(
                            "batch {} aborted by caller after {} iteration(s)",
                            batch.name,
                            iterations
                        );
                        break;
                    }
                    if let Some(cap) = max_iterations {
                        if iterations >= cap {
                            log::warn!(
                                "{}",
                                OptimizerError::ConvergenceExceeded(
                                    batch.name.clone(),
                                    cap
                                )
                            );
                            break;
                        }
                    }
                }
                Ok(current)
            }
        }
    }

    /// One pass over the batch: rules run sequentially, each fed the
    /// output of the previous.
    fn run_iteration(
        &self,
        batch: &RuleBatch,
        plan: LogicalPlan,
    ) -> OptimizerResult<(LogicalPlan, bool)> {
        let mut current = plan;
        let mut changed = false;
        for rule in &batch.rules {
            if (self.abort_check)() {
                return Ok((current, false));
            }
            if let Some(new_plan) = rule.apply(&current)? {
                log::trace!("rule {} rewrote the plan", rule.name());
                current = new_plan;
                changed = true;
            }
        }
        Ok((current, changed))
    }
}
