use flintdb::data_types::DataType;
use flintdb::expressions::{Attribute, BinaryOp, Expression, Literal, UnaryOp};
use flintdb::logical_plans::{JoinType, LogicalPlan};
use flintdb::optimizer::rules::{
    CnfConversionRule, EliminateCommonPredicatesRule, EliminateSubqueriesRule,
    FoldConstantsRule, FoldLogicalPredicatesRule, MergeFiltersRule, MergeProjectsRule,
    PushFiltersThroughJoinsRule, PushFiltersThroughProjectsRule,
    PushLimitsThroughUnionsRule, PushProjectsThroughLimitsRule, ReduceAliasesRule,
    ReduceCastsRule, ReduceLimitsRule, ReduceNegationsRule, Rule,
};
use flintdb::test_utils::{
    alias, binary, eq, filter, gt, int, join, limit, lt, not_eq, plus, project,
    subquery, table_scan, union, IdGen,
};

fn col(plan: &LogicalPlan, name: &str) -> Expression {
    plan.output()
        .unwrap()
        .into_iter()
        .find(|attr| attr.name == name)
        .unwrap()
        .to_expr()
}

fn apply(rule: &dyn Rule<LogicalPlan>, plan: &LogicalPlan) -> LogicalPlan {
    rule.apply(plan).unwrap().unwrap_or_else(|| plan.clone())
}

/// Applying a rule to its own output must change nothing.
fn assert_idempotent(rule: &dyn Rule<LogicalPlan>, plan: &LogicalPlan) {
    let once = apply(rule, plan);
    let twice = apply(rule, &once);
    assert_eq!(
        once,
        twice,
        "rule {} is not idempotent:\nonce:\n{}twice:\n{}",
        rule.name(),
        once.pretty_tree(),
        twice.pretty_tree()
    );
}

fn t1(gen: &mut IdGen) -> LogicalPlan {
    table_scan(gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)])
}

#[test]
fn fold_constants_replaces_foldable_subtrees() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let plan = filter(
        t1.clone(),
        Expression::and(eq(plus(int(1), int(2)), int(3)), gt(a.clone(), int(0))),
    );

    let rule = FoldConstantsRule {};
    let folded = apply(&rule, &plan);
    let expected = filter(
        t1,
        Expression::and(
            Expression::Literal(Literal::Bool(true)),
            gt(a, int(0)),
        ),
    );
    assert_eq!(folded, expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn fold_constants_leaves_failing_evaluation_alone() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let plan = filter(
        t1,
        eq(binary(BinaryOp::Divide, int(1), int(0)), int(1)),
    );

    let rule = FoldConstantsRule {};
    assert!(rule.apply(&plan).unwrap().is_none());
}

#[test]
fn fold_constants_keeps_aliases_in_place() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let x_id = gen.next_id();
    let plan = project(t1.clone(), vec![alias(x_id, "x", plus(int(1), int(2)))]);

    let rule = FoldConstantsRule {};
    let folded = apply(&rule, &plan);
    let expected = project(
        t1,
        vec![alias(x_id, "x", Expression::Literal(Literal::Int32(3)))],
    );
    assert_eq!(folded, expected);
}

#[test]
fn fold_logical_predicates_applies_boolean_identities() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let a_pos = gt(a.clone(), int(0));
    let yes = Expression::Literal(Literal::Bool(true));
    let no = Expression::Literal(Literal::Bool(false));
    let rule = FoldLogicalPredicatesRule {};

    let cases = vec![
        (Expression::or(yes.clone(), a_pos.clone()), yes.clone()),
        (Expression::or(a_pos.clone(), yes.clone()), yes.clone()),
        (Expression::and(no.clone(), a_pos.clone()), no.clone()),
        (Expression::and(a_pos.clone(), no.clone()), no.clone()),
        (Expression::and(yes.clone(), a_pos.clone()), a_pos.clone()),
        (Expression::or(no.clone(), a_pos.clone()), a_pos.clone()),
        (Expression::and(a_pos.clone(), a_pos.clone()), a_pos.clone()),
        (Expression::or(a_pos.clone(), a_pos.clone()), a_pos.clone()),
        (
            Expression::If {
                condition: Box::new(yes.clone()),
                then: Box::new(a_pos.clone()),
                otherwise: Box::new(no.clone()),
            },
            a_pos.clone(),
        ),
        (
            Expression::If {
                condition: Box::new(no.clone()),
                then: Box::new(yes.clone()),
                otherwise: Box::new(a_pos.clone()),
            },
            a_pos.clone(),
        ),
    ];
    for (input, expected) in cases {
        let plan = filter(t1.clone(), input);
        assert_eq!(apply(&rule, &plan), filter(t1.clone(), expected));
        assert_idempotent(&rule, &plan);
    }
}

#[test]
fn reduce_negations_pushes_not_inward() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let rule = ReduceNegationsRule {};

    let cases = vec![
        (
            Expression::not(Expression::not(gt(a.clone(), int(0)))),
            gt(a.clone(), int(0)),
        ),
        (
            Expression::not(eq(a.clone(), b.clone())),
            not_eq(a.clone(), b.clone()),
        ),
        (
            Expression::not(gt(a.clone(), b.clone())),
            binary(BinaryOp::Lte, a.clone(), b.clone()),
        ),
        (
            Expression::not(binary(BinaryOp::Gte, a.clone(), b.clone())),
            lt(a.clone(), b.clone()),
        ),
        (
            Expression::not(Expression::UnaryOp {
                op: UnaryOp::IsNull,
                input: Box::new(a.clone()),
            }),
            Expression::UnaryOp {
                op: UnaryOp::IsNotNull,
                input: Box::new(a.clone()),
            },
        ),
        (
            Expression::and(gt(a.clone(), int(0)), Expression::not(gt(a.clone(), int(0)))),
            Expression::Literal(Literal::Bool(false)),
        ),
        (
            Expression::or(gt(a.clone(), int(0)), Expression::not(gt(a.clone(), int(0)))),
            Expression::Literal(Literal::Bool(true)),
        ),
    ];
    for (input, expected) in cases {
        let plan = filter(t1.clone(), input);
        assert_eq!(apply(&rule, &plan), filter(t1.clone(), expected));
        assert_idempotent(&rule, &plan);
    }
}

#[test]
fn reduce_negations_swaps_conditional_branches() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let plan = filter(
        t1.clone(),
        Expression::If {
            condition: Box::new(Expression::not(gt(a.clone(), int(0)))),
            then: Box::new(eq(a.clone(), int(1))),
            otherwise: Box::new(eq(a.clone(), int(2))),
        },
    );

    let rule = ReduceNegationsRule {};
    let expected = filter(
        t1,
        Expression::If {
            condition: Box::new(gt(a.clone(), int(0))),
            then: Box::new(eq(a.clone(), int(2))),
            otherwise: Box::new(eq(a, int(1))),
        },
    );
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn reduce_casts_drops_noop_and_composes_chains() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let rule = ReduceCastsRule {};

    let noop = filter(
        t1.clone(),
        gt(
            Expression::Cast {
                child: Box::new(a.clone()),
                data_type: DataType::Int32,
            },
            int(0),
        ),
    );
    assert_eq!(apply(&rule, &noop), filter(t1.clone(), gt(a.clone(), int(0))));
    assert_idempotent(&rule, &noop);

    let chained = filter(
        t1.clone(),
        gt(
            Expression::Cast {
                child: Box::new(Expression::Cast {
                    child: Box::new(a.clone()),
                    data_type: DataType::Int64,
                }),
                data_type: DataType::Float64,
            },
            Expression::Literal(Literal::Float64(0.0)),
        ),
    );
    let expected = filter(
        t1,
        gt(
            Expression::Cast {
                child: Box::new(a),
                data_type: DataType::Float64,
            },
            Expression::Literal(Literal::Float64(0.0)),
        ),
    );
    assert_eq!(apply(&rule, &chained), expected);
    assert_idempotent(&rule, &chained);
}

#[test]
fn reduce_casts_leaves_inadmissible_compositions_alone() {
    let mut gen = IdGen::new();
    let flags = table_scan(&mut gen, "flags", &[("ok", DataType::Boolean)]);
    let ok = col(&flags, "ok");
    // Boolean -> String -> DateTime is admissible stepwise, but the
    // composed Boolean -> DateTime cast is not.
    let plan = project(
        flags,
        vec![alias(
            gen.next_id(),
            "seen",
            Expression::Cast {
                child: Box::new(Expression::Cast {
                    child: Box::new(ok),
                    data_type: DataType::String,
                }),
                data_type: DataType::DateTime,
            },
        )],
    );

    let rule = ReduceCastsRule {};
    assert!(rule.apply(&plan).unwrap().is_none());
}

#[test]
fn reduce_aliases_keeps_the_outer_binding() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let inner_id = gen.next_id();
    let outer_id = gen.next_id();
    let plan = project(
        t1.clone(),
        vec![alias(
            outer_id,
            "outer",
            alias(inner_id, "inner", plus(b.clone(), int(1))),
        )],
    );

    let rule = ReduceAliasesRule {};
    let expected = project(t1, vec![alias(outer_id, "outer", plus(b, int(1)))]);
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn cnf_conversion_distributes_or_over_and() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let (p, q, r) = (gt(a.clone(), int(0)), eq(b.clone(), int(1)), lt(a, int(9)));
    let plan = filter(
        t1.clone(),
        Expression::or(p.clone(), Expression::and(q.clone(), r.clone())),
    );

    let rule = CnfConversionRule {};
    let expected = filter(
        t1,
        Expression::and(
            Expression::or(p.clone(), q),
            Expression::or(p, r),
        ),
    );
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn eliminate_common_predicates_dedups_and_collapses_conditionals() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let a = col(&t1, "a");
    let a_pos = gt(a.clone(), int(0));
    let rule = EliminateCommonPredicatesRule {};

    let dup = filter(t1.clone(), Expression::and(a_pos.clone(), a_pos.clone()));
    assert_eq!(apply(&rule, &dup), filter(t1.clone(), a_pos.clone()));
    assert_idempotent(&rule, &dup);

    let branches = filter(
        t1.clone(),
        Expression::If {
            condition: Box::new(eq(a.clone(), int(7))),
            then: Box::new(a_pos.clone()),
            otherwise: Box::new(a_pos.clone()),
        },
    );
    assert_eq!(apply(&rule, &branches), filter(t1, a_pos));
    assert_idempotent(&rule, &branches);
}

#[test]
fn merge_filters_keeps_inner_predicate_first() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let inner = gt(a, int(0));
    let outer = lt(b, int(9));
    let plan = filter(filter(t1.clone(), inner.clone()), outer.clone());

    let rule = MergeFiltersRule {};
    let expected = filter(t1, Expression::and(inner, outer));
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn merge_projects_removes_identity_projections() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let plan = project(t1.clone(), vec![a, b]);

    let rule = MergeProjectsRule {};
    assert_eq!(apply(&rule, &plan), t1);
    assert_idempotent(&rule, &plan);
}

#[test]
fn merge_projects_inlines_inner_aliases() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let x_id = gen.next_id();
    let y_id = gen.next_id();
    let x_def = alias(x_id, "x", plus(b.clone(), int(1)));
    let x_ref = Attribute::new(x_id, "x", DataType::Int32).to_expr();

    // A bare reference to the inner alias keeps the inner binding; a
    // computed item gets the definition inlined.
    let plan = project(
        project(t1.clone(), vec![x_def.clone()]),
        vec![alias(y_id, "y", plus(x_ref.clone(), int(2)))],
    );
    let rule = MergeProjectsRule {};
    let expected = project(
        t1.clone(),
        vec![alias(y_id, "y", plus(plus(b.clone(), int(1)), int(2)))],
    );
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);

    let passthrough = project(project(t1.clone(), vec![x_def.clone()]), vec![x_ref]);
    assert_eq!(apply(&rule, &passthrough), project(t1, vec![x_def]));
    assert_idempotent(&rule, &passthrough);
}

#[test]
fn eliminate_subqueries_unwraps_and_clears_qualifiers() {
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
        subquery(project(t1.clone(), vec![a.clone(), b.clone()]), "s"),
        gt(qualified_a, int(0)),
    );

    let rule = EliminateSubqueriesRule {};
    let expected = filter(project(t1, vec![a.clone(), b]), gt(a, int(0)));
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn push_filters_through_projects_inlines_the_condition() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let x_id = gen.next_id();
    let x_def = alias(x_id, "x", plus(b.clone(), int(1)));
    let x_ref = Attribute::new(x_id, "x", DataType::Int32).to_expr();
    let plan = filter(project(t1.clone(), vec![x_def.clone()]), gt(x_ref, int(3)));

    let rule = PushFiltersThroughProjectsRule {};
    let expected = project(filter(t1, gt(plus(b, int(1)), int(3))), vec![x_def]);
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn push_filters_through_joins_partitions_conjuncts() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = table_scan(&mut gen, "t2", &[("c", DataType::Int32), ("d", DataType::Int32)]);
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

    let rule = PushFiltersThroughJoinsRule {};
    let expected = join(
        filter(t1, gt(a.clone(), int(0))),
        filter(t2, lt(d, int(5))),
        JoinType::Inner,
        Some(Expression::and(
            eq(a.clone(), c.clone()),
            eq(plus(a, c), int(10)),
        )),
    );
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn push_filters_through_joins_skips_outer_joins() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = table_scan(&mut gen, "t2", &[("c", DataType::Int32), ("d", DataType::Int32)]);
    let (a, c) = (col(&t1, "a"), col(&t2, "c"));
    let plan = filter(
        join(t1, t2, JoinType::LeftOuter, Some(eq(a.clone(), c))),
        gt(a, int(0)),
    );

    let rule = PushFiltersThroughJoinsRule {};
    assert!(rule.apply(&plan).unwrap().is_none());
}

#[test]
fn push_projects_through_limits_reorders() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let b = col(&t1, "b");
    let x_def = alias(gen.next_id(), "x", plus(b, int(1)));
    let plan = limit(project(t1.clone(), vec![x_def.clone()]), int(10));

    let rule = PushProjectsThroughLimitsRule {};
    let expected = project(limit(t1, int(10)), vec![x_def]);
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn reduce_limits_collapses_to_the_tighter_bound() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let plan = limit(limit(t1.clone(), int(5)), int(10));

    let rule = ReduceLimitsRule {};
    let expected = limit(
        t1,
        Expression::If {
            condition: Box::new(lt(int(10), int(5))),
            then: Box::new(int(10)),
            otherwise: Box::new(int(5)),
        },
    );
    assert_eq!(apply(&rule, &plan), expected);
    assert_idempotent(&rule, &plan);
}

#[test]
fn push_limits_through_unions_prunes_both_branches_once() {
    let mut gen = IdGen::new();
    let t1 = t1(&mut gen);
    let t2 = table_scan(&mut gen, "t2", &[("c", DataType::Int32), ("d", DataType::Int32)]);
    let plan = limit(union(t1.clone(), t2.clone()), int(10));

    let rule = PushLimitsThroughUnionsRule {};
    let expected = limit(
        union(limit(t1, int(10)), limit(t2, int(10))),
        int(10),
    );
    let pushed = apply(&rule, &plan);
    assert_eq!(pushed, expected);
    // Both branches are already bounded; the rewrite must not refire.
    assert!(rule.apply(&pushed).unwrap().is_none());
}
