use crate::expressions::Expression;
use crate::logical_plans::LogicalPlan;
use crate::predicates::inline_aliases;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Moves a filter below the projection it sits on, inlining the
/// projection's aliases into the condition. Impure projections block the
/// pushdown.
pub struct PushFiltersThroughProjectsRule {}

impl Rule<LogicalPlan> for PushFiltersThroughProjectsRule {
    fn name(&self) -> &'static str {
        "PushFiltersThroughProjects"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| {
            let LogicalPlan::Filter { condition, child } = plan else {
                return Ok(None);
            };
            let LogicalPlan::Project {
                project_list,
                child: grandchild,
            } = child.as_ref()
            else {
                return Ok(None);
            };
            if !project_list.iter().all(Expression::is_pure) {
                return Ok(None);
            }
            let pushed = inline_aliases(project_list, condition)?;
            Ok(Some(LogicalPlan::Project {
                project_list: project_list.clone(),
                child: Box::new(LogicalPlan::Filter {
                    condition: pushed,
                    child: grandchild.clone(),
                }),
            }))
        })
    }
}
