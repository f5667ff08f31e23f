use crate::expressions::{BinaryOp, Expression};
use crate::logical_plans::LogicalPlan;
use crate::predicates::same;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Deduplicates conjunction/disjunction operands and conditionals whose
/// branches are equivalent.
pub struct EliminateCommonPredicatesRule {}

impl Rule<LogicalPlan> for EliminateCommonPredicatesRule {
    fn name(&self) -> &'static str {
        "EliminateCommonPredicates"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::eliminate)
    }
}

impl Rule<Expression> for EliminateCommonPredicatesRule {
    fn name(&self) -> &'static str {
        "EliminateCommonPredicates"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::eliminate)
    }
}

impl EliminateCommonPredicatesRule {
    fn eliminate(node: &Expression) -> OptimizerResult<Option<Expression>> {
        match node {
            Expression::BinaryOp {
                op: BinaryOp::And | BinaryOp::Or,
                left,
                right,
            } if same(left, right) => Ok(Some(left.as_ref().clone())),
            // Both branches produce the same value, so the conditional is
            // that value regardless of what the condition evaluates to
            // (true, false or null). Only a pure condition may be dropped.
            Expression::If {
                condition,
                then,
                otherwise,
            } if same(then, otherwise) && condition.is_pure() => {
                Ok(Some(then.as_ref().clone()))
            }
            _ => Ok(None),
        }
    }
}
