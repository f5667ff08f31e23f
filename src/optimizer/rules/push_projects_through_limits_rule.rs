use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Reorders `Limit(Project(p))` into `Project(Limit(p))` so the limit
/// prunes rows before the projection expressions run. Projections in this
/// algebra are row-local, so the reorder is always sound.
pub struct PushProjectsThroughLimitsRule {}

impl Rule<LogicalPlan> for PushProjectsThroughLimitsRule {
    fn name(&self) -> &'static str {
        "PushProjectsThroughLimits"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| {
            let LogicalPlan::Limit { count, child } = plan else {
                return Ok(None);
            };
            let LogicalPlan::Project {
                project_list,
                child: grandchild,
            } = child.as_ref()
            else {
                return Ok(None);
            };
            Ok(Some(LogicalPlan::Project {
                project_list: project_list.clone(),
                child: Box::new(LogicalPlan::Limit {
                    count: count.clone(),
                    child: grandchild.clone(),
                }),
            }))
        })
    }
}
