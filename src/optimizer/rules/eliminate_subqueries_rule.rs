use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Subquery aliases only matter for name resolution; once the plan is
/// resolved they are pure wrappers. Unwraps them all, then clears the
/// qualifier of every attribute reference (references compare by id, so
/// the qualifiers carry no information either).
pub struct EliminateSubqueriesRule {}

impl Rule<LogicalPlan> for EliminateSubqueriesRule {
    fn name(&self) -> &'static str {
        "EliminateSubqueries"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        let unwrapped = node.transform_up(&mut |plan| match plan {
            LogicalPlan::Subquery { child, .. } => Ok(Some(child.as_ref().clone())),
            _ => Ok(None),
        })?;

        let base = unwrapped.as_ref().unwrap_or(node);
        let cleared = base.transform_expressions(&mut |expr| match expr {
            Expression::AttributeRef(attr) if attr.qualifier.is_some() => {
                let mut attr = attr.clone();
                attr.qualifier = None;
                Ok(Some(Expression::AttributeRef(attr)))
            }
            _ => Ok(None),
        })?;

        Ok(cleared.or(unwrapped))
    }
}
