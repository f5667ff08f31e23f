use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Collapses adjacent filters into one conjunction. The inner predicate
/// comes first so short-circuit order is preserved.
pub struct MergeFiltersRule {}

impl Rule<LogicalPlan> for MergeFiltersRule {
    fn name(&self) -> &'static str {
        "MergeFilters"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| match plan {
            LogicalPlan::Filter {
                condition: outer,
                child,
            } => match child.as_ref() {
                LogicalPlan::Filter {
                    condition: inner,
                    child: grandchild,
                } => Ok(Some(LogicalPlan::Filter {
                    condition: Expression::and(inner.clone(), outer.clone()),
                    child: grandchild.clone(),
                })),
                _ => Ok(None),
            },
            _ => Ok(None),
        })
    }
}
