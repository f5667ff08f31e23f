use crate::expressions::{BinaryOp, Expression, Literal};
use crate::logical_plans::LogicalPlan;
use crate::predicates::same;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Tautological simplifications over the boolean lattice: identity and
/// absorbing elements of AND/OR, duplicate operands, and conditionals with
/// a literal condition.
pub struct FoldLogicalPredicatesRule {}

impl Rule<LogicalPlan> for FoldLogicalPredicatesRule {
    fn name(&self) -> &'static str {
        "FoldLogicalPredicates"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::simplify)
    }
}

impl Rule<Expression> for FoldLogicalPredicatesRule {
    fn name(&self) -> &'static str {
        "FoldLogicalPredicates"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::simplify)
    }
}

impl FoldLogicalPredicatesRule {
    fn simplify(node: &Expression) -> OptimizerResult<Option<Expression>> {
        match node {
            Expression::BinaryOp {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if left.as_bool_literal() == Some(false)
                    || right.as_bool_literal() == Some(false)
                {
                    return Ok(Some(Expression::Literal(Literal::Bool(false))));
                }
                if left.as_bool_literal() == Some(true) {
                    return Ok(Some(right.as_ref().clone()));
                }
                if right.as_bool_literal() == Some(true) {
                    return Ok(Some(left.as_ref().clone()));
                }
                if same(left, right) {
                    return Ok(Some(left.as_ref().clone()));
                }
                Ok(None)
            }
            Expression::BinaryOp {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if left.as_bool_literal() == Some(true)
                    || right.as_bool_literal() == Some(true)
                {
                    return Ok(Some(Expression::Literal(Literal::Bool(true))));
                }
                if left.as_bool_literal() == Some(false) {
                    return Ok(Some(right.as_ref().clone()));
                }
                if right.as_bool_literal() == Some(false) {
                    return Ok(Some(left.as_ref().clone()));
                }
                if same(left, right) {
                    return Ok(Some(left.as_ref().clone()));
                }
                Ok(None)
            }
            Expression::If {
                condition,
                then,
                otherwise,
            } => match condition.as_bool_literal() {
                Some(true) => Ok(Some(then.as_ref().clone())),
                Some(false) => Ok(Some(otherwise.as_ref().clone())),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }
}
