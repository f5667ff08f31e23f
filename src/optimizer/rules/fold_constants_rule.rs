use crate::expressions::Expression;
use crate::interpreter::Interpreter;
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Replaces every foldable expression with the literal it evaluates to.
pub struct FoldConstantsRule {}

impl Rule<LogicalPlan> for FoldConstantsRule {
    fn name(&self) -> &'static str {
        "FoldConstants"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::fold_expression)
    }
}

impl Rule<Expression> for FoldConstantsRule {
    fn name(&self) -> &'static str {
        "FoldConstants"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::fold_expression)
    }
}

impl FoldConstantsRule {
    pub(crate) fn fold_expression(
        node: &Expression,
    ) -> OptimizerResult<Option<Expression>> {
        match node {
            Expression::Literal(_) => Ok(None),
            // Aliases carry the names and ids a projection binds; folding
            // them away would rebind the plan's output. Their children
            // still fold.
            Expression::Alias { .. } | Expression::GeneratedAlias { .. } => Ok(None),
            node if node.is_foldable() => match Interpreter::eval_const(node) {
                Ok(value) => Ok(Some(Expression::Literal(value))),
                // Evaluation is not total here (e.g. division by zero);
                // leave the expression for the runtime to report.
                Err(_) => Ok(None),
            },
            _ => Ok(None),
        }
    }
}
