use crate::expressions::{BinaryOp, Expression, Literal, UnaryOp};
use crate::logical_plans::LogicalPlan;
use crate::predicates::complementary;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Pushes NOT inward and collapses contradictory/tautological pairs.
pub struct ReduceNegationsRule {}

impl Rule<LogicalPlan> for ReduceNegationsRule {
    fn name(&self) -> &'static str {
        "ReduceNegations"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::reduce)
    }
}

impl Rule<Expression> for ReduceNegationsRule {
    fn name(&self) -> &'static str {
        "ReduceNegations"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::reduce)
    }
}

impl ReduceNegationsRule {
    fn reduce(node: &Expression) -> OptimizerResult<Option<Expression>> {
        match node {
            Expression::UnaryOp {
                op: UnaryOp::Not,
                input,
            } => Ok(Self::reduce_not(input)),
            // if (NOT c) t else f  ==>  if c f else t
            Expression::If {
                condition,
                then,
                otherwise,
            } => match condition.as_ref() {
                Expression::UnaryOp {
                    op: UnaryOp::Not,
                    input,
                } => Ok(Some(Expression::If {
                    condition: input.clone(),
                    then: otherwise.clone(),
                    otherwise: then.clone(),
                })),
                _ => Ok(None),
            },
            Expression::BinaryOp {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if Self::contradicts(left, right) {
                    Ok(Some(Expression::Literal(Literal::Bool(false))))
                } else {
                    Ok(None)
                }
            }
            Expression::BinaryOp {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if Self::contradicts(left, right) {
                    Ok(Some(Expression::Literal(Literal::Bool(true))))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn reduce_not(input: &Expression) -> Option<Expression> {
        match input {
            Expression::UnaryOp {
                op: UnaryOp::Not,
                input: inner,
            } => Some(inner.as_ref().clone()),
            Expression::UnaryOp {
                op: UnaryOp::IsNull,
                input: inner,
            } => Some(Expression::UnaryOp {
                op: UnaryOp::IsNotNull,
                input: inner.clone(),
            }),
            Expression::UnaryOp {
                op: UnaryOp::IsNotNull,
                input: inner,
            } => Some(Expression::UnaryOp {
                op: UnaryOp::IsNull,
                input: inner.clone(),
            }),
            Expression::BinaryOp { op, left, right } => {
                op.negated_comparison().map(|negated| Expression::BinaryOp {
                    op: negated,
                    left: left.clone(),
                    right: right.clone(),
                })
            }
            _ => None,
        }
    }

    /// Whether one operand is the negation of a predicate `same` as the
    /// other. Negations over comparisons have already been flipped by the
    /// time the parent is visited, so this compares against the computed
    /// negation rather than looking for a literal NOT wrapper.
    fn contradicts(left: &Expression, right: &Expression) -> bool {
        complementary(left, right)
    }
}
