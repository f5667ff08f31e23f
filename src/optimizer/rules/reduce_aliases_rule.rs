use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Collapses directly nested aliases. The outer name and id survive; the
/// inner binding disappears.
pub struct ReduceAliasesRule {}

impl Rule<LogicalPlan> for ReduceAliasesRule {
    fn name(&self) -> &'static str {
        "ReduceAliases"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_expressions_up(&mut Self::reduce)
    }
}

impl Rule<Expression> for ReduceAliasesRule {
    fn name(&self) -> &'static str {
        "ReduceAliases"
    }

    fn apply(&self, node: &Expression) -> OptimizerResult<Option<Expression>> {
        node.transform_up(&mut Self::reduce)
    }
}

impl ReduceAliasesRule {
    fn reduce(node: &Expression) -> OptimizerResult<Option<Expression>> {
        let inner_child = |child: &Expression| match child {
            Expression::Alias { child: inner, .. }
            | Expression::GeneratedAlias { child: inner, .. } => Some(inner.clone()),
            _ => None,
        };
        match node {
            Expression::Alias { id, name, child } => {
                Ok(inner_child(child).map(|inner| Expression::Alias {
                    id: *id,
                    name: name.clone(),
                    child: inner,
                }))
            }
            Expression::GeneratedAlias { id, name, child } => {
                Ok(inner_child(child).map(|inner| Expression::GeneratedAlias {
                    id: *id,
                    name: name.clone(),
                    child: inner,
                }))
            }
            _ => Ok(None),
        }
    }
}
