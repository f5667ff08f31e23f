use std::collections::HashSet;

use crate::expressions::{ExprId, Expression};
use crate::logical_plans::{JoinType, LogicalPlan};
use crate::predicates::{conjoin, split_conjunction, to_cnf};
use crate::trees::TreeNode;
use crate::OptimizerResult;

use super::Rule;

/// Distributes a filter over an inner join: conjuncts referencing only one
/// side become a filter on that side, the rest is absorbed into the join
/// condition. Outer joins are left alone — pushing predicates past them
/// changes which rows get null-padded.
pub struct PushFiltersThroughJoinsRule {}

impl Rule<LogicalPlan> for PushFiltersThroughJoinsRule {
    fn name(&self) -> &'static str {
        "PushFiltersThroughJoins"
    }

    fn apply(&self, node: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        node.transform_up(&mut Self::push)
    }
}

impl PushFiltersThroughJoinsRule {
    fn push(plan: &LogicalPlan) -> OptimizerResult<Option<LogicalPlan>> {
        let LogicalPlan::Filter { condition, child } = plan else {
            return Ok(None);
        };
        let LogicalPlan::Join {
            join_type: JoinType::Inner,
            condition: join_condition,
            left,
            right,
        } = child.as_ref()
        else {
            return Ok(None);
        };

        let normalized = to_cnf(condition);
        let left_ids = left.output_id_set()?;
        let right_ids = right.output_id_set()?;

        let mut left_predicates = Vec::new();
        let mut right_predicates = Vec::new();
        let mut common_predicates = Vec::new();
        for conjunct in split_conjunction(&normalized) {
            let refs: HashSet<ExprId> = conjunct.reference_ids();
            if refs.is_subset(&left_ids) {
                left_predicates.push(conjunct.clone());
            } else if refs.is_subset(&right_ids) {
                right_predicates.push(conjunct.clone());
            } else {
                common_predicates.push(conjunct.clone());
            }
        }

        let new_left = Self::filtered(left, conjoin(left_predicates));
        let new_right = Self::filtered(right, conjoin(right_predicates));
        let new_join_condition = match (join_condition.clone(), conjoin(common_predicates))
        {
            (Some(jc), Some(common)) => Some(Expression::and(jc, common)),
            (Some(jc), None) => Some(jc),
            (None, common) => common,
        };

        Ok(Some(LogicalPlan::Join {
            join_type: JoinType::Inner,
            condition: new_join_condition,
            left: new_left,
            right: new_right,
        }))
    }

    fn filtered(
        child: &LogicalPlan,
        predicate: Option<Expression>,
    ) -> Box<LogicalPlan> {
        match predicate {
            Some(condition) => Box::new(LogicalPlan::Filter {
                condition,
                child: Box::new(child.clone()),
            }),
            None => Box::new(child.clone()),
        }
    }
}
