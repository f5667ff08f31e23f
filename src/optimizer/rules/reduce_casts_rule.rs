use crate::data_types::DataType;
use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Drops no-op casts and collapses cast chains whose composition is an
/// admissible cast. An inadmissible chain is left unchanged.
pub struct ReduceCastsRule {}

impl Rule<LogicalPlan> for ReduceCastsRule {
    fn name(&self) -> &'static str {
        "ReduceCasts"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::reduce)
    }
}

impl Rule<Expression> for ReduceCastsRule {
    fn name(&self) -> &'static str {
        "ReduceCasts"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::reduce)
    }
}

impl ReduceCastsRule {
    fn reduce(node: &Expression) -> OptimizerResult<Option<Expression>> {
        match node {
            Expression::Cast { child, data_type } => {
                if child.data_type() == *data_type {
                    return Ok(Some(child.as_ref().clone()));
                }
                if let Expression::Cast { child: inner, .. } = child.as_ref() {
                    if DataType::can_cast(inner.data_type(), *data_type) {
                        // The collapse may itself be a no-op cast.
                        if inner.data_type() == *data_type {
                            return Ok(Some(inner.as_ref().clone()));
                        }
                        return Ok(Some(Expression::Cast {
                            child: inner.clone(),
                            data_type: *data_type,
                        }));
                    }
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}
