use crate::expressions::{BinaryOp, Expression};
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Collapses nested limits to the tighter bound. The bound is expressed as
/// a conditional so non-literal counts stay lazy; literal counts fold to a
/// single number downstream.
pub struct ReduceLimitsRule {}

impl Rule<LogicalPlan> for ReduceLimitsRule {
    fn name(&self) -> &'static str {
        "ReduceLimits"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| {
            let LogicalPlan::Limit { count: outer, child } = plan else {
                return Ok(None);
            };
            let LogicalPlan::Limit {
                count: inner,
                child: grandchild,
            } = child.as_ref()
            else {
                return Ok(None);
            };
            let tighter = Expression::If {
                condition: Box::new(Expression::BinaryOp {
                    op: BinaryOp::Lt,
                    left: Box::new(outer.clone()),
                    right: Box::new(inner.clone()),
                }),
                then: Box::new(outer.clone()),
                otherwise: Box::new(inner.clone()),
            };
            Ok(Some(LogicalPlan::Limit {
                count: tighter,
                child: grandchild.clone(),
            }))
        })
    }
}
