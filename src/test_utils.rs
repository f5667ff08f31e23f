//! Builders and normalization helpers shared by the test suite. The
//! analyzer normally assigns expression ids; tests mint them through
//! [`IdGen`] instead.

use std::collections::HashMap;

use crate::data_types::DataType;
use crate::expressions::{Attribute, BinaryOp, ExprId, Expression, Literal, UnaryOp};
use crate::logical_plans::{JoinType, LogicalPlan};
use crate::row::Row;
use crate::trees::TreeNode;

#[derive(Debug, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { next: 0 }
    }

    pub fn next_id(&mut self) -> ExprId {
        self.next += 1;
        ExprId(self.next)
    }
}

pub fn int(v: i32) -> Expression {
    Expression::Literal(Literal::Int32(v))
}

pub fn boolean(v: bool) -> Expression {
    Expression::Literal(Literal::Bool(v))
}

pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn eq(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Eq, left, right)
}

pub fn not_eq(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::NotEq, left, right)
}

pub fn gt(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Gt, left, right)
}

pub fn lt(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Lt, left, right)
}

pub fn plus(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Plus, left, right)
}

pub fn neg(input: Expression) -> Expression {
    Expression::UnaryOp {
        op: UnaryOp::Neg,
        input: Box::new(input),
    }
}

pub fn alias(id: ExprId, name: &str, child: Expression) -> Expression {
    Expression::Alias {
        id,
        name: name.to_string(),
        child: Box::new(child),
    }
}

pub fn table_scan(
    gen: &mut IdGen,
    table: &str,
    columns: &[(&str, DataType)],
) -> LogicalPlan {
    LogicalPlan::TableScan {
        table: table.to_string(),
        output: columns
            .iter()
            .map(|(name, data_type)| Attribute::new(gen.next_id(), *name, *data_type))
            .collect(),
    }
}

pub fn local_relation(
    gen: &mut IdGen,
    columns: &[(&str, DataType)],
    rows: Vec<Row>,
) -> LogicalPlan {
    LogicalPlan::LocalRelation {
        output: columns
            .iter()
            .map(|(name, data_type)| Attribute::new(gen.next_id(), *name, *data_type))
            .collect(),
        rows,
    }
}

pub fn filter(child: LogicalPlan, condition: Expression) -> LogicalPlan {
    LogicalPlan::Filter {
        condition,
        child: Box::new(child),
    }
}

pub fn project(child: LogicalPlan, project_list: Vec<Expression>) -> LogicalPlan {
    LogicalPlan::Project {
        project_list,
        child: Box::new(child),
    }
}

pub fn join(
    left: LogicalPlan,
    right: LogicalPlan,
    join_type: JoinType,
    condition: Option<Expression>,
) -> LogicalPlan {
    LogicalPlan::Join {
        join_type,
        condition,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn limit(child: LogicalPlan, count: Expression) -> LogicalPlan {
    LogicalPlan::Limit {
        count,
        child: Box::new(child),
    }
}

pub fn union(left: LogicalPlan, right: LogicalPlan) -> LogicalPlan {
    LogicalPlan::Union {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn subquery(child: LogicalPlan, alias: &str) -> LogicalPlan {
    LogicalPlan::Subquery {
        alias: alias.to_string(),
        child: Box::new(child),
    }
}

/// Renumbers every expression id in the plan by first occurrence in
/// document order. Two plans that differ only in the ids the analyzer
/// happened to mint compare equal after normalization.
pub fn normalize_plan_ids(plan: &LogicalPlan) -> LogicalPlan {
    let mut mapping: HashMap<ExprId, ExprId> = HashMap::new();
    collect_ids(plan, &mut mapping);
    rewrite_ids(plan, &mapping)
}

fn assign(mapping: &mut HashMap<ExprId, ExprId>, id: ExprId) {
    let next = ExprId(mapping.len() as u64 + 1);
    mapping.entry(id).or_insert(next);
}

fn collect_ids(plan: &LogicalPlan, mapping: &mut HashMap<ExprId, ExprId>) {
    match plan {
        LogicalPlan::LocalRelation { output, .. }
        | LogicalPlan::TableScan { output, .. } => {
            for attr in output {
                assign(mapping, attr.id);
            }
        }
        _ => {}
    }
    for expr in plan.expressions() {
        let mut ids = Vec::new();
        expr.collect(&mut expression_id, &mut ids);
        for id in ids {
            assign(mapping, id);
        }
    }
    for child in plan.children() {
        collect_ids(child, mapping);
    }
}

fn expression_id(expr: &Expression) -> Option<ExprId> {
    match expr {
        Expression::AttributeRef(attr) => Some(attr.id),
        Expression::Alias { id, .. }
        | Expression::GeneratedAlias { id, .. }
        | Expression::GeneratedAttribute { id, .. } => Some(*id),
        _ => None,
    }
}

fn rewrite_ids(plan: &LogicalPlan, mapping: &HashMap<ExprId, ExprId>) -> LogicalPlan {
    let remap = |id: ExprId| mapping.get(&id).copied().unwrap_or(id);
    let relations = plan
        .transform_down(&mut |node| match node {
            LogicalPlan::LocalRelation { output, rows } => {
                Ok(Some(LogicalPlan::LocalRelation {
                    output: output
                        .iter()
                        .map(|attr| {
                            let mut attr = attr.clone();
                            attr.id = remap(attr.id);
                            attr
                        })
                        .collect(),
                    rows: rows.clone(),
                }))
            }
            LogicalPlan::TableScan { table, output } => Ok(Some(LogicalPlan::TableScan {
                table: table.clone(),
                output: output
                    .iter()
                    .map(|attr| {
                        let mut attr = attr.clone();
                        attr.id = remap(attr.id);
                        attr
                    })
                    .collect(),
            })),
            _ => Ok(None),
        })
        .expect("infallible rewrite")
        .unwrap_or_else(|| plan.clone());

    relations
        .transform_expressions(&mut |expr| match expr {
            Expression::AttributeRef(attr) => {
                let mut attr = attr.clone();
                attr.id = remap(attr.id);
                Ok(Some(Expression::AttributeRef(attr)))
            }
            Expression::Alias { id, name, child } => Ok(Some(Expression::Alias {
                id: remap(*id),
                name: name.clone(),
                child: child.clone(),
            })),
            Expression::GeneratedAlias { id, name, child } => {
                Ok(Some(Expression::GeneratedAlias {
                    id: remap(*id),
                    name: name.clone(),
                    child: child.clone(),
                }))
            }
            Expression::GeneratedAttribute {
                id,
                name,
                data_type,
                nullable,
            } => Ok(Some(Expression::GeneratedAttribute {
                id: remap(*id),
                name: name.clone(),
                data_type: *data_type,
                nullable: *nullable,
            })),
            _ => Ok(None),
        })
        .expect("infallible rewrite")
        .unwrap_or(relations)
}
