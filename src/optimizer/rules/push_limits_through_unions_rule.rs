use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::predicates::same;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Prunes each union branch to the limit's bound; the outer limit stays
/// because both branches together may still exceed it. Skips unions whose
/// branches are already limited by the same bound, so the rewrite is a
/// fixed point of itself.
pub struct PushLimitsThroughUnionsRule {}

impl Rule<LogicalPlan> for PushLimitsThroughUnionsRule {
    fn name(&self) -> &'static str {
        "PushLimitsThroughUnions"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| {
            let LogicalPlan::Limit { count, child } = plan else {
                return Ok(None);
            };
            let LogicalPlan::Union { left, right } = child.as_ref() else {
                return Ok(None);
            };
            if Self::limited_by(left, count) && Self::limited_by(right, count) {
                return Ok(None);
            }
            Ok(Some(LogicalPlan::Limit {
                count: count.clone(),
                child: Box::new(LogicalPlan::Union {
                    left: Self::limit(left, count),
                    right: Self::limit(right, count),
                }),
            }))
        })
    }
}

impl PushLimitsThroughUnionsRule {
    fn limited_by(plan: &LogicalPlan, count: &Expression) -> bool {
        matches!(plan, LogicalPlan::Limit { count: c, .. } if same(c, count))
    }

    fn limit(plan: &LogicalPlan, count: &Expression) -> Box<LogicalPlan> {
        if Self::limited_by(plan, count) {
            return Box::new(plan.clone());
        }
        Box::new(LogicalPlan::Limit {
            count: count.clone(),
            child: Box::new(plan.clone()),
        })
    }
}
