use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::predicates::inline_aliases;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Removes identity projections and merges adjacent projections by
/// inlining the inner aliases into the outer list.
pub struct MergeProjectsRule {}

impl Rule<LogicalPlan> for MergeProjectsRule {
    fn name(&self) -> &'static str {
        "MergeProjects"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut Self::merge)
    }
}

impl MergeProjectsRule {
    fn merge(plan: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        let LogicalPlan::Project {
            project_list,
            child,
        } = plan
        else {
            return Ok(None);
        };

        if Self::is_identity(project_list, child)? {
            return Ok(Some(child.as_ref().clone()));
        }

        if let LogicalPlan::Project {
            project_list: inner_list,
            child: grandchild,
        } = child.as_ref()
        {
            // Inlining duplicates the aliased expression into every use
            // site; only pure definitions may be duplicated.
            if !inner_list.iter().all(Expression::is_pure) {
                return Ok(None);
            }
            let merged = project_list
                .iter()
                .map(|item| Self::inline_item(inner_list, item))
                .collect::<OptimizerResult<Vec<_>>>()?;
            return Ok(Some(LogicalPlan::Project {
                project_list: merged,
                child: grandchild.clone(),
            }));
        }

        Ok(None)
    }

    /// Whether the projection reproduces its child's output verbatim.
    fn is_identity(
        project_list: &[Expression],
        child: &LogicalPlan,
    ) -> OptimizerResult<bool> {
        let child_output = child.output()?;
        Ok(project_list.len() == child_output.len()
            && project_list.iter().zip(child_output.iter()).all(
                |(item, attr)| match item {
                    Expression::AttributeRef(r) => r.id == attr.id && r.name == attr.name,
                    _ => false,
                },
            ))
    }

    /// A bare reference to an inner alias becomes that alias (the outer
    /// list keeps producing the same name and id); anything else has the
    /// inner aliases inlined into it.
    fn inline_item(
        inner_list: &[Expression],
        item: &Expression,
    ) -> OptimizerResult<Expression> {
        if let Expression::AttributeRef(r) = item {
            for inner in inner_list {
                match inner {
                    Expression::Alias { id, .. } | Expression::GeneratedAlias { id, .. }
                        if *id == r.id =>
                    {
                        return Ok(inner.clone());
                    }
                    _ => {}
                }
            }
        }
        inline_aliases(inner_list, item)
    }
}
