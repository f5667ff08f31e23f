//! Helpers shared by the predicate-rewriting rules: conjunction handling,
//! conjunctive normal form and alias-aware structural equality.

use crate::expressions::{BinaryOp, Expression, Literal, UnaryOp};
use crate::trees::TreeNode;
use crate::OptimizerResult;

/// Flattens an expression into its top-level conjuncts, document order.
pub fn split_conjunction(expr: &Expression) -> Vec<&Expression> {
    match expr {
        Expression::BinaryOp {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let mut out = split_conjunction(left);
            out.extend(split_conjunction(right));
            out
        }
        _ => vec![expr],
    }
}

/// Left-associated AND over the given predicates, preserving order.
pub fn conjoin(mut predicates: Vec<Expression>) -> Option<Expression> {
    if predicates.is_empty() {
        return None;
    }
    let rest = predicates.split_off(1);
    let first = predicates.into_iter().next()?;
    Some(rest.into_iter().fold(first, Expression::and))
}

/// Structural equality modulo alias wrapping and cosmetic metadata
/// (attribute names and qualifiers). Attribute references compare by id.
pub fn same(a: &Expression, b: &Expression) -> bool {
    let a = strip_aliases(a);
    let b = strip_aliases(b);
    match (a, b) {
        (Expression::Literal(l), Expression::Literal(r)) => l == r,
        (Expression::UnresolvedAttribute(l), Expression::UnresolvedAttribute(r)) => {
            l == r
        }
        (Expression::AttributeRef(l), Expression::AttributeRef(r)) => l.id == r.id,
        (
            Expression::GeneratedAttribute { id: l, .. },
            Expression::GeneratedAttribute { id: r, .. },
        ) => l == r,
        (Expression::AttributeRef(l), Expression::GeneratedAttribute { id, .. })
        | (Expression::GeneratedAttribute { id, .. }, Expression::AttributeRef(l)) => {
            l.id == *id
        }
        (
            Expression::Cast {
                child: lc,
                data_type: lt,
            },
            Expression::Cast {
                child: rc,
                data_type: rt,
            },
        ) => lt == rt && same(lc, rc),
        (
            Expression::BinaryOp {
                op: lo,
                left: ll,
                right: lr,
            },
            Expression::BinaryOp {
                op: ro,
                left: rl,
                right: rr,
            },
        ) => lo == ro && same(ll, rl) && same(lr, rr),
        (
            Expression::UnaryOp { op: lo, input: li },
            Expression::UnaryOp { op: ro, input: ri },
        ) => lo == ro && same(li, ri),
        (
            Expression::If {
                condition: lc,
                then: lt,
                otherwise: lo,
            },
            Expression::If {
                condition: rc,
                then: rt,
                otherwise: ro,
            },
        ) => same(lc, rc) && same(lt, rt) && same(lo, ro),
        (Expression::Coalesce { args: l }, Expression::Coalesce { args: r }) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(a, b)| same(a, b))
        }
        _ => false,
    }
}

fn strip_aliases(expr: &Expression) -> &Expression {
    match expr {
        Expression::Alias { child, .. } | Expression::GeneratedAlias { child, .. } => {
            strip_aliases(child)
        }
        _ => expr,
    }
}

/// Whether one predicate is the negation of the other, up to the rewrites
/// negation normal form performs (double negation, comparison flipping,
/// IS NULL / IS NOT NULL).
pub fn complementary(a: &Expression, b: &Expression) -> bool {
    same(a, &negate(b)) || same(b, &negate(a))
}

/// Semantically equivalent conjunctive normal form: negations pushed to the
/// leaves, then disjunctions distributed over conjunctions.
pub fn to_cnf(expr: &Expression) -> Expression {
    distribute(&to_nnf(expr))
}

fn to_nnf(expr: &Expression) -> Expression {
    match expr {
        Expression::UnaryOp {
            op: UnaryOp::Not,
            input,
        } => negate(input),
        Expression::BinaryOp {
            op: op @ (BinaryOp::And | BinaryOp::Or),
            left,
            right,
        } => Expression::BinaryOp {
            op: *op,
            left: Box::new(to_nnf(left)),
            right: Box::new(to_nnf(right)),
        },
        other => other.clone(),
    }
}

/// Negation-normal form of `NOT expr`.
fn negate(expr: &Expression) -> Expression {
    match expr {
        Expression::Literal(Literal::Bool(b)) => Expression::Literal(Literal::Bool(!b)),
        Expression::UnaryOp {
            op: UnaryOp::Not,
            input,
        } => to_nnf(input),
        Expression::UnaryOp {
            op: UnaryOp::IsNull,
            input,
        } => Expression::UnaryOp {
            op: UnaryOp::IsNotNull,
            input: input.clone(),
        },
        Expression::UnaryOp {
            op: UnaryOp::IsNotNull,
            input,
        } => Expression::UnaryOp {
            op: UnaryOp::IsNull,
            input: input.clone(),
        },
        Expression::BinaryOp {
            op: BinaryOp::And,
            left,
            right,
        } => Expression::or(negate(left), negate(right)),
        Expression::BinaryOp {
            op: BinaryOp::Or,
            left,
            right,
        } => Expression::and(negate(left), negate(right)),
        Expression::BinaryOp { op, left, right } => match op.negated_comparison() {
            Some(negated) => Expression::BinaryOp {
                op: negated,
                left: left.clone(),
                right: right.clone(),
            },
            None => Expression::not(expr.clone()),
        },
        other => Expression::not(other.clone()),
    }
}

/// Distributes OR over AND until no disjunction has a conjunctive operand.
fn distribute(expr: &Expression) -> Expression {
    match expr {
        Expression::BinaryOp {
            op: BinaryOp::And,
            left,
            right,
        } => Expression::and(distribute(left), distribute(right)),
        Expression::BinaryOp {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let left = distribute(left);
            let right = distribute(right);
            distribute_or(left, right)
        }
        other => other.clone(),
    }
}

fn distribute_or(left: Expression, right: Expression) -> Expression {
    match (left, right) {
        (
            Expression::BinaryOp {
                op: BinaryOp::And,
                left: a,
                right: b,
            },
            right,
        ) => Expression::and(
            distribute_or(*a, right.clone()),
            distribute_or(*b, right),
        ),
        (
            left,
            Expression::BinaryOp {
                op: BinaryOp::And,
                left: a,
                right: b,
            },
        ) => Expression::and(
            distribute_or(left.clone(), *a),
            distribute_or(left, *b),
        ),
        (left, right) => Expression::or(left, right),
    }
}

/// Replaces, in `expr`, every reference whose id matches an alias defined
/// by `project_list` with that alias's child expression. Other references
/// are left untouched.
pub fn inline_aliases(
    project_list: &[Expression],
    expr: &Expression,
) -> OptimizerResult<Expression> {
    let inlined = expr.transform_down(&mut |e| {
        let id = match e {
            Expression::AttributeRef(attr) => attr.id,
            Expression::GeneratedAttribute { id, .. } => *id,
            _ => return Ok(None),
        };
        for item in project_list {
            if let Expression::Alias { id: alias_id, child, .. }
            | Expression::GeneratedAlias { id: alias_id, child, .. } = item
            {
                if *alias_id == id {
                    return Ok(Some(child.as_ref().clone()));
                }
            }
        }
        Ok(None)
    })?;
    Ok(inlined.unwrap_or_else(|| expr.clone()))
}
