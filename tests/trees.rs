use flintdb::data_types::DataType;
use flintdb::expressions::{Attribute, Expression, Literal};
use flintdb::logical_plans::{JoinType, LogicalPlan};
use flintdb::predicates::{complementary, same, split_conjunction, to_cnf};
use flintdb::test_utils::{
    alias, eq, filter, gt, int, join, lt, normalize_plan_ids, plus, subquery,
    table_scan, IdGen,
};
use flintdb::trees::TreeNode;

fn col(plan: &LogicalPlan, name: &str) -> Expression {
    plan.output()
        .unwrap()
        .into_iter()
        .find(|attr| attr.name == name)
        .unwrap()
        .to_expr()
}

fn bump_ones(expr: &Expression) -> flintdb::OptimizerResult<Option<Expression>> {
    match expr {
        Expression::Literal(Literal::Int32(1)) => {
            Ok(Some(Expression::Literal(Literal::Int32(2))))
        }
        _ => Ok(None),
    }
}

#[test]
fn transform_down_rewrites_every_matching_node() {
    let expr = plus(int(1), plus(int(1), int(3)));
    let rewritten = expr.transform_down(&mut bump_ones).unwrap().unwrap();
    assert_eq!(rewritten, plus(int(2), plus(int(2), int(3))));
}

#[test]
fn transform_returns_none_when_nothing_matches() {
    let expr = plus(int(4), int(5));
    assert!(expr.transform_down(&mut bump_ones).unwrap().is_none());
    assert!(expr.transform_up(&mut bump_ones).unwrap().is_none());
}

#[test]
fn transform_up_visits_children_before_parents() {
    // The parent match only exists once both children have been rewritten.
    let expr = plus(int(1), int(1));
    let collapsed = expr
        .transform_up(&mut |e| match e {
            Expression::Literal(Literal::Int32(1)) => {
                Ok(Some(Expression::Literal(Literal::Int32(2))))
            }
            e if *e == plus(int(2), int(2)) => {
                Ok(Some(Expression::Literal(Literal::Int32(4))))
            }
            _ => Ok(None),
        })
        .unwrap()
        .unwrap();
    assert_eq!(collapsed, int(4));
}

#[test]
fn with_children_preserves_node_attributes() {
    let mut gen = IdGen::new();
    let id = gen.next_id();
    let aliased = alias(id, "x", int(1));
    let swapped = aliased.with_children(vec![int(9)]).unwrap();
    assert_eq!(swapped, alias(id, "x", int(9)));
}

#[test]
fn pretty_tree_is_stable() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)]);
    let a = col(&t1, "a");
    let plan = filter(t1, gt(a, int(0)));
    assert_eq!(
        plan.pretty_tree(),
        "Filter [(a#1 > 0)]\n  TableScan t1 [a#1 Int32, b#2 Int32]\n"
    );
    assert_eq!(plan.pretty_tree(), plan.pretty_tree());
}

#[test]
fn plans_compare_equal_after_id_normalization() {
    let build = |gen: &mut IdGen| {
        let t1 = table_scan(gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)]);
        let a = col(&t1, "a");
        filter(t1, gt(a, int(0)))
    };
    let mut gen_a = IdGen::new();
    let plan_a = build(&mut gen_a);
    let mut gen_b = IdGen::new();
    // Burn a few ids so the second plan carries different numbers.
    gen_b.next_id();
    gen_b.next_id();
    let plan_b = build(&mut gen_b);

    assert_ne!(plan_a, plan_b);
    assert_eq!(normalize_plan_ids(&plan_a), normalize_plan_ids(&plan_b));
}

#[test]
fn join_output_nullability_tracks_the_join_type() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let t2 = table_scan(&mut gen, "t2", &[("c", DataType::Int32)]);
    let (a, c) = (col(&t1, "a"), col(&t2, "c"));

    let left_outer = join(
        t1.clone(),
        t2.clone(),
        JoinType::LeftOuter,
        Some(eq(a.clone(), c.clone())),
    );
    let output = left_outer.output().unwrap();
    assert!(!output[0].nullable);
    assert!(output[1].nullable);

    let full_outer = join(t1, t2, JoinType::FullOuter, Some(eq(a, c)));
    assert!(full_outer.output().unwrap().iter().all(|attr| attr.nullable));
}

#[test]
fn subquery_output_is_qualified() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let wrapped = subquery(t1, "s");
    let output = wrapped.output().unwrap();
    assert_eq!(output[0].qualifier.as_deref(), Some("s"));
    assert_eq!(output[0].name, "a");
}

#[test]
fn resolution_and_typing_flags() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let a = col(&t1, "a");

    let resolved = filter(t1.clone(), gt(a.clone(), int(0)));
    assert!(resolved.is_resolved());
    assert!(resolved.is_well_typed());
    assert!(resolved.is_strictly_typed());

    let unresolved = filter(
        t1.clone(),
        gt(Expression::UnresolvedAttribute("z".to_string()), int(0)),
    );
    assert!(!unresolved.is_resolved());

    // A non-boolean filter condition is ill-typed.
    let ill_typed = filter(t1.clone(), plus(a.clone(), int(1)));
    assert!(!ill_typed.is_well_typed());

    // A redundant cast is well-typed but not strictly typed.
    let lax = filter(
        t1,
        gt(
            Expression::Cast {
                child: Box::new(a),
                data_type: DataType::Int32,
            },
            int(0),
        ),
    );
    assert!(lax.is_well_typed());
    assert!(!lax.is_strictly_typed());
}

#[test]
fn reference_ids_cover_every_attribute_use() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)]);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let expr = Expression::and(gt(a, int(0)), lt(plus(b, int(1)), int(9)));
    let ids = expr.reference_ids();
    assert_eq!(ids.len(), 2);
}

#[test]
fn split_conjunction_preserves_document_order() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)]);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let (p, q, r) = (gt(a.clone(), int(0)), lt(b, int(5)), eq(a, int(3)));
    let expr = Expression::and(Expression::and(p.clone(), q.clone()), r.clone());
    assert_eq!(split_conjunction(&expr), vec![&p, &q, &r]);
}

#[test]
fn same_ignores_alias_wrapping_but_respects_ids() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let a = col(&t1, "a");
    let wrapped = alias(gen.next_id(), "renamed", a.clone());
    assert!(same(&a, &wrapped));

    let other = Attribute::new(gen.next_id(), "a", DataType::Int32).to_expr();
    assert!(!same(&a, &other));
}

#[test]
fn to_cnf_is_idempotent() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32), ("b", DataType::Int32)]);
    let (a, b) = (col(&t1, "a"), col(&t1, "b"));
    let expr = Expression::not(Expression::and(
        Expression::or(gt(a.clone(), int(0)), lt(b.clone(), int(1))),
        eq(a, b),
    ));
    let once = to_cnf(&expr);
    assert_eq!(to_cnf(&once), once);
}

#[test]
fn collect_from_expressions_walks_every_slot_in_document_order() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let a = col(&t1, "a");
    let plan = flintdb::test_utils::limit(
        filter(t1, gt(plus(a.clone(), int(1)), int(2))),
        int(3),
    );
    let literals = plan.collect_from_expressions(&mut |e| match e {
        Expression::Literal(Literal::Int32(v)) => Some(*v),
        _ => None,
    });
    // Limit count first (outermost node), then the filter condition
    // left to right.
    assert_eq!(literals, vec![3, 1, 2]);

    let bindings = plan.collect_from_expressions(&mut |e| e.binding_id());
    assert_eq!(bindings, vec![a.binding_id().unwrap()]);
}

#[test]
fn complementary_detects_flipped_comparisons() {
    let mut gen = IdGen::new();
    let t1 = table_scan(&mut gen, "t1", &[("a", DataType::Int32)]);
    let a = col(&t1, "a");
    assert!(complementary(
        &gt(a.clone(), int(0)),
        &flintdb::test_utils::binary(
            flintdb::expressions::BinaryOp::Lte,
            a.clone(),
            int(0)
        )
    ));
    assert!(!complementary(&gt(a.clone(), int(0)), &gt(a, int(0))));
}
