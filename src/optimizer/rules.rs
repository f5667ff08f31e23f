use crate::logical_plans::LogicalPlan;
use crate::trees::TreeNode;
use crate::OptimizerResult;

mod cnf_conversion_rule;
mod eliminate_common_predicates_rule;
mod eliminate_subqueries_rule;
mod fold_constants_rule;
mod fold_logical_predicates_rule;
mod merge_filters_rule;
mod merge_projects_rule;
mod push_filters_through_joins_rule;
mod push_filters_through_projects_rule;
mod push_limits_through_unions_rule;
mod push_projects_through_limits_rule;
mod reduce_aliases_rule;
mod reduce_casts_rule;
mod reduce_limits_rule;
mod reduce_negations_rule;

pub use cnf_conversion_rule::CnfConversionRule;
pub use eliminate_common_predicates_rule::EliminateCommonPredicatesRule;
pub use eliminate_subqueries_rule::EliminateSubqueriesRule;
pub use fold_constants_rule::FoldConstantsRule;
pub use fold_logical_predicates_rule::FoldLogicalPredicatesRule;
pub use merge_filters_rule::MergeFiltersRule;
pub use merge_projects_rule::MergeProjectsRule;
pub use push_filters_through_joins_rule::PushFiltersThroughJoinsRule;
pub use push_filters_through_projects_rule::PushFiltersThroughProjectsRule;
pub use push_limits_through_unions_rule::PushLimitsThroughUnionsRule;
pub use push_projects_through_limits_rule::PushProjectsThroughLimitsRule;
pub use reduce_aliases_rule::ReduceAliasesRule;
pub use reduce_casts_rule::ReduceCastsRule;
pub use reduce_limits_rule::ReduceLimitsRule;
pub use reduce_negations_rule::ReduceNegationsRule;

/// A rewrite rule over one tree family. Total: when the pattern does not
/// match, the input is returned unchanged (`None`). Sound: the rewritten
/// tree is semantically equivalent to the input.
pub trait Rule<T: TreeNode> {
    fn name(&self) -> &'static str;

    fn apply(&self, node: &T) -> OptimizerResult<Option<T>>;
}

/// The shipped rule library, in application order.
pub fn default_rules() -> Vec<Box<dyn Rule<LogicalPlan>>> {
    vec![
        Box::new(FoldConstantsRule {}),
        Box::new(FoldLogicalPredicatesRule {}),
        Box::new(ReduceNegationsRule {}),
        Box::new(ReduceCastsRule {}),
        Box::new(ReduceAliasesRule {}),
        Box::new(CnfConversionRule {}),
        Box::new(EliminateCommonPredicatesRule {}),
        Box::new(MergeFiltersRule {}),
        Box::new(MergeProjectsRule {}),
        Box::new(EliminateSubqueriesRule {}),
        Box::new(PushFiltersThroughProjectsRule {}),
        Box::new(PushFiltersThroughJoinsRule {}),
        Box::new(PushProjectsThroughLimitsRule {}),
        Box::new(ReduceLimitsRule {}),
        Box::new(PushLimitsThroughUnionsRule {}),
    ]
}
