use crate::logical_plans::LogicalPlan;
use crate::predicates::to_cnf;
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Normalizes every filter condition to conjunctive normal form, so the
/// pushdown rules can split it into independent conjuncts.
pub struct CnfConversionRule {}

impl Rule<LogicalPlan> for CnfConversionRule {
    fn name(&self) -> &'static str {
        "CNFConversion"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut |plan| match plan {
            LogicalPlan::Filter { condition, child } => {
                let normalized = to_cnf(condition);
                if normalized == *condition {
                    Ok(None)
                } else {
                    Ok(Some(LogicalPlan::Filter {
                        condition: normalized,
                        child: child.clone(),
                    }))
                }
            }
            _ => Ok(None),
        })
    }
}
