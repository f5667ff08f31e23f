use flintdb::data_types::DataType;
use flintdb::expressions::{Attribute, Expression};
use flintdb::logical_plans::{JoinType, LogicalPlan};
use flintdb::test_utils::{
    alias, eq, filter, gt, int, join, limit, lt, not_eq, plus, project, subquery,
    table_scan, union, normalize_plan_ids, IdGen,
};
use flintdb::Optimizer;

fn optimize(plan: LogicalPlan) -> LogicalPlan {
    let _ = env_logger::builder().is_test(true).try_init();
    Optimizer::new().optimize(plan).unwrap()
}

fn col(plan: &LogicalPlan, name: &str) -> Expression {
    plan.output()
        .unwrap()
        .into_iter()
        .find(|attr| attr.name == name)
        .unwrap()
        .to_expr()
}

fn assert_same_plan(actual: &LogicalPlan, expected: &LogicalPlan) {
    assert_eq!(
        normalize_plan_ids(actual),
        normalize_plan_ids(expected),
        "actual:\n{}expected:\n{}",
        actual.pretty_tree(),
        expected.pretty_tree()
    );
}

fn t1(gen: &mut IdGen) -> LogicalPlan {
    table_scan(gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)])
}

fn t2(gen: &mut IdGen) -> LogicalPlan {
    table_scan(gen, "t2", &[("c", DataType::Int32), ("d", DataType::Int32)])
}

#[test]
fn folds_constant_conjuncts_away() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");

    let plan = filter(
        t1.clone(),
        Expression::and(eq(plus(int(1), int(2)), int(3)), gt(a.clone(), int(0))),
    );
    let optimized = optimize(plan);

    assert_same_plan(&optimized, &filter(t1, gt(a, int(0))));
}

#[test]
fn pushes_filters_through_inner_joins() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = t2(&mut gen);
    let (a, c, d) = (col(&t1, "a"), col(&t2, "c"), col(&t2, "d"));

    let plan = filter(
        join(
            t1.clone(),
            t2.clone(),
            JoinType::Inner,
            Some(eq(a.clone(), c.clone())),
        ),
        Expression::and(
            Expression::and(gt(a.clone(), int(0)), lt(d.clone(), int(5))),
            eq(plus(a.clone(), c.clone()), int(10)),
        ),
    );
    let optimized = optimize(plan);

    let expected = join(
        filter(t1, gt(a.clone(), int(0))),
        filter(t2, lt(d, int(5))),
        JoinType::Inner,
        Some(Expression::and(
            eq(a.clone(), c.clone()),
            eq(plus(a, c), int(10)),
        )),
    );
    assert_same_plan(&optimized, &expected);
}

#[test]
fn pushes_filters_through_projects_inlining_aliases() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let x_id = gen.next_id();
    let x_def = alias(x_id, "x", plus(b.clone(), int(1)));
    let x_ref = Attribute::new(x_id, "x", DataType::Int32).to_expr();

    let plan = filter(project(t1.clone(), vec![x_def.clone()]), gt(x_ref, int(3)));
    let optimized = optimize(plan);

    let expected = project(
        filter(t1, gt(plus(b, int(1)), int(3))),
        vec![x_def],
    );
    assert_same_plan(&optimized, &expected);
}

#[test]
fn reduces_negations_and_applies_de_morgan() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));

    let plan = filter(
        t1.clone(),
        Expression::and(
            Expression::not(Expression::not(gt(a.clone(), int(0)))),
            Expression::not(Expression::and(
                eq(a.clone(), int(1)),
                eq(b.clone(), int(2)),
            )),
        ),
    );
    let optimized = optimize(plan);

    let expected = filter(
        t1,
        Expression::and(
            gt(a.clone(), int(0)),
            Expression::or(not_eq(a, int(1)), not_eq(b, int(2))),
        ),
    );
    assert_same_plan(&optimized, &expected);
}

#[test]
fn pushes_limits_into_union_branches() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = t2(&mut gen);

    let plan = limit(union(t1.clone(), t2.clone()), int(10));
    let optimized = optimize(plan);

    let expected = limit(
        union(limit(t1, int(10)), limit(t2, int(10))),
        int(10),
    );
    assert_same_plan(&optimized, &expected);
}

#[test]
fn collapses_nested_limits_to_the_tighter_bound() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);

    let plan = limit(limit(t1.clone(), int(5)), int(10));
    let optimized = optimize(plan);

    assert_same_plan(&optimized, &limit(t1, int(5)));
}

#[test]
fn eliminates_subqueries_and_clears_qualifiers() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let qualified_a = t1
        .output()
        .unwrap()
        .into_iter()
        .find(|attr| attr.name == "a")
        .unwrap()
        .with_qualifier("s")
        .to_expr();

    let plan = filter(
        subquery(project(t1.clone(), vec![a.clone(), b]), "s"),
        gt(qualified_a, int(0)),
    );
    let optimized = optimize(plan);

    // The subquery wrapper goes away and the qualifier with it; the
    // surviving identity projection then merges into the scan.
    assert_same_plan(&optimized, &filter(t1, gt(a, int(0))));
}

#[test]
fn optimizing_twice_is_a_noop() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = t2(&mut gen);
    let (a, c, d) = (col(&t1, "a"), col(&t2, "c"), col(&t2, "d"));

    let plan = filter(
        join(
            t1,
            limit(t2, int(20)),
            JoinType::Inner,
            Some(eq(a.clone(), c.clone())),
        ),
        Expression::and(
            Expression::not(lt(a.clone(), int(1))),
            Expression::and(gt(d, int(5)), eq(plus(a, c), int(10))),
        ),
    );
    let once = optimize(plan);
    let twice = optimize(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn rejects_unresolved_plans() {
    let plan = filter(
        LogicalPlan::UnresolvedRelation {
            table: "missing".to_string(),
        },
        int(1),
    );
    let result = Optimizer::new().optimize(plan);
    assert!(matches!(
        result,
        Err(flintdb::OptimizerError::Unresolved(_))
    ));
}

#[test]
fn abort_check_accepts_the_current_plan() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let plan = filter(
        t1,
        Expression::and(eq(plus(int(1), int(2)), int(3)), gt(a, int(0))),
    );

    let aborted = Optimizer::new()
        .with_abort_check(|| true)
        .optimize(plan.clone())
        .unwrap();
    assert_eq!(aborted, plan);
}

#[test]
fn bounded_batches_stop_at_the_iteration_cap() {
    use flintdb::optimizer::rules::default_rules;
    use flintdb::{Convergence, RuleBatch};

    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    // Collapsing the nested limits and folding the resulting conditional
    // needs two iterations; a cap of one leaves the conditional in place.
    let plan = limit(limit(t1, int(5)), int(10));

    let capped = Optimizer::with_batches(vec![RuleBatch::new(
        "Optimizations",
        Convergence::bounded(1),
        default_rules(),
    )])
    .optimize(plan.clone())
    .unwrap();
    match capped {
        LogicalPlan::Limit { count, .. } => {
            assert!(matches!(count, Expression::If { .. }))
        }
        other => panic!("expected a limit, got:\n{}", other.pretty_tree()),
    }

    let converged = Optimizer::new().optimize(plan).unwrap();
    match converged {
        LogicalPlan::Limit { count, .. } => assert_eq!(count, int(5)),
        other => panic!("expected a limit, got:\n{}", other.pretty_tree()),
    }
}

#[test]
fn once_batches_apply_each_rule_a_single_time() {
    use flintdb::optimizer::rules::default_rules;
    use flintdb::{Convergence, RuleBatch};

    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let plan = filter(
        t1.clone(),
        Expression::and(eq(plus(int(1), int(2)), int(3)), gt(a.clone(), int(0))),
    );

    let optimized = Optimizer::with_batches(vec![RuleBatch::new(
        "Optimizations",
        Convergence::Once,
        default_rules(),
    )])
    .optimize(plan)
    .unwrap();
    // One pass is enough here: folding runs before the boolean
    // simplification that consumes its output.
    assert_same_plan(&optimized, &filter(t1, gt(a, int(0))));
}

#[test]
fn output_schema_is_stable_under_optimization() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let x_id = gen.next_id();
    let x_def = alias(x_id, "x", plus(b, int(1)));
    let x_ref = Attribute::new(x_id, "x", DataType::Int32).to_expr();

    let plan = limit(
        filter(project(t1, vec![x_def]), gt(x_ref, int(3))),
        int(7),
    );
    let before: Vec<(String, DataType)> = plan
        .output()
        .unwrap()
        .into_iter()
        .map(|attr| (attr.name, attr.data_type))
        .collect();
    let optimized = optimize(plan);
    let after: Vec<(String, DataType)> = optimized
        .output()
        .unwrap()
        .into_iter()
        .map(|attr| (attr.name, attr.data_type))
        .collect();
    assert_eq!(before, after);
}
