use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Write as _;

use crate::expressions::{Attribute, ExprId, Expression};
use crate::row::Row;
use crate::trees::TreeNode;
use crate::{DataType, OptimizerError, OptimizerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// Leftover from analysis; its presence fails the optimizer
    /// precondition.
    UnresolvedRelation {
        table: String,
    },
    /// An in-memory relation carrying its rows. The unit the reference
    /// evaluator executes against.
    LocalRelation {
        output: Vec<Attribute>,
        rows: Vec<Row>,
    },
    /// Ingestion node: a catalog table resolved to a concrete schema.
    TableScan {
        table: String,
        output: Vec<Attribute>,
    },
    Project {
        project_list: Vec<Expression>,
        child: Box<LogicalPlan>,
    },
    Filter {
        condition: Expression,
        child: Box<LogicalPlan>,
    },
    Join {
        join_type: JoinType,
        condition: Option<Expression>,
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
    },
    Limit {
        count: Expression,
        child: Box<LogicalPlan>,
    },
    Union {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
    },
    Subquery {
        alias: String,
        child: Box<LogicalPlan>,
    },
}

impl TreeNode for LogicalPlan {
    fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::LocalRelation { .. }
            | LogicalPlan::TableScan { .. } => vec![],
            LogicalPlan::Project { child, .. }
            | LogicalPlan::Filter { child, .. }
            | LogicalPlan::Limit { child, .. }
            | LogicalPlan::Subquery { child, .. } => vec![child],
            LogicalPlan::Join { left, right, .. } => vec![left, right],
            LogicalPlan::Union { left, right } => vec![left, right],
        }
    }

    fn with_children(&self, children: Vec<LogicalPlan>) -> OptimizerResult<LogicalPlan> {
        let mut iter = children.into_iter();
        let mut next = || {
            iter.next()
                .ok_or_else(|| OptimizerError::should_never_happen("missing child plan"))
        };
        match self {
            LogicalPlan::UnresolvedRelation { .. }
            | LogicalPlan::LocalRelation { .. }
            | LogicalPlan::TableScan { .. } => Err(OptimizerError::should_never_happen(
                "leaf plan has no children",
            )),
            LogicalPlan::Project { project_list, .. } => Ok(LogicalPlan::Project {
                project_list: project_list.clone(),
                child: Box::new(next()?),
            }),
            LogicalPlan::Filter { condition, .. } => Ok(LogicalPlan::Filter {
                condition: condition.clone(),
                child: Box::new(next()?),
            }),
            LogicalPlan::Limit { count, .. } => Ok(LogicalPlan::Limit {
                count: count.clone(),
                child: Box::new(next()?),
            }),
            LogicalPlan::Subquery { alias, .. } => Ok(LogicalPlan::Subquery {
                alias: alias.clone(),
                child: Box::new(next()?),
            }),
            LogicalPlan::Join {
                join_type,
                condition,
                ..
            } => Ok(LogicalPlan::Join {
                join_type: *join_type,
                condition: condition.clone(),
                left: Box::new(next()?),
                right: Box::new(next()?),
            }),
            LogicalPlan::Union { .. } => Ok(LogicalPlan::Union {
                left: Box::new(next()?),
                right: Box::new(next()?),
            }),
        }
    }
}

impl LogicalPlan {
    /// The ordered attributes this plan produces. Determined from children
    /// and operator-local rules; ids flow through unchanged except where a
    /// projection rebinds them.
    pub fn output(&self) -> OptimizerResult<Vec<Attribute>> {
        match self {
            LogicalPlan::UnresolvedRelation { table } => Err(OptimizerError::Unresolved(
                format!("relation {table} is not resolved"),
            )),
            LogicalPlan::LocalRelation { output, .. }
            | LogicalPlan::TableScan { output, .. } => Ok(output.clone()),
            LogicalPlan::Project { project_list, .. } => project_list
                .iter()
                .map(Expression::to_attribute)
                .collect::<OptimizerResult<Vec<_>>>(),
            LogicalPlan::Filter { child, .. } | LogicalPlan::Limit { child, .. } => {
                child.output()
            }
            LogicalPlan::Join {
                join_type,
                left,
                right,
                ..
            } => {
                let mut left_out = left.output()?;
                let mut right_out = right.output()?;
                match join_type {
                    JoinType::Inner => {}
                    JoinType::LeftOuter => {
                        for attr in &mut right_out {
                            attr.nullable = true;
                        }
                    }
                    JoinType::RightOuter => {
                        for attr in &mut left_out {
                            attr.nullable = true;
                        }
                    }
                    JoinType::FullOuter => {
                        for attr in left_out.iter_mut().chain(right_out.iter_mut()) {
                            attr.nullable = true;
                        }
                    }
                }
                left_out.extend(right_out);
                Ok(left_out)
            }
            LogicalPlan::Union { left, right } => {
                let left_out = left.output()?;
                let right_out = right.output()?;
                Ok(left_out
                    .into_iter()
                    .zip(right_out)
                    .map(|(mut l, r)| {
                        l.nullable = l.nullable || r.nullable;
                        l
                    })
                    .collect())
            }
            LogicalPlan::Subquery { alias, child } => Ok(child
                .output()?
                .into_iter()
                .map(|attr| attr.with_qualifier(alias.clone()))
                .collect()),
        }
    }

    pub fn output_id_set(&self) -> OptimizerResult<HashSet<ExprId>> {
        Ok(self.output()?.into_iter().map(|attr| attr.id).collect())
    }

    pub fn is_resolved(&self) -> bool {
        !self.any(&mut |node| !node.node_resolved())
    }

    fn node_resolved(&self) -> bool {
        match self {
            LogicalPlan::UnresolvedRelation { .. } => false,
            LogicalPlan::Project { project_list, .. } => project_list
                .iter()
                .all(|e| e.is_resolved() && e.to_attribute().is_ok()),
            other => other.expressions().into_iter().all(Expression::is_resolved),
        }
    }

    pub fn is_well_typed(&self) -> bool {
        !self.any(&mut |node| !node.node_well_typed())
    }

    fn node_well_typed(&self) -> bool {
        let exprs_ok = self.expressions().into_iter().all(Expression::is_well_typed);
        let local_ok = match self {
            LogicalPlan::Filter { condition, .. } => condition
                .data_type()
                .is_compatible_with(&DataType::Boolean),
            LogicalPlan::Join { condition, .. } => condition.as_ref().map_or(true, |c| {
                c.data_type().is_compatible_with(&DataType::Boolean)
            }),
            LogicalPlan::Limit { count, .. } => {
                count.data_type().is_integer() || count.data_type() == DataType::Null
            }
            LogicalPlan::Union { left, right } => {
                match (left.output(), right.output()) {
                    (Ok(l), Ok(r)) => {
                        l.len() == r.len()
                            && l.iter()
                                .zip(r.iter())
                                .all(|(a, b)| a.data_type.is_compatible_with(&b.data_type))
                    }
                    _ => false,
                }
            }
            _ => true,
        };
        exprs_ok && local_ok
    }

    pub fn is_strictly_typed(&self) -> bool {
        self.is_well_typed()
            && !self.any(&mut |node| {
                node.expressions().into_iter().any(|e| !e.is_strictly_typed())
            })
    }

    /// The expression slots attached to this node, document order. Child
    /// plans are not visited.
    pub fn expressions(&self) -> Vec<&Expression> {
        match self {
            LogicalPlan::Project { project_list, .. } => project_list.iter().collect(),
            LogicalPlan::Filter { condition, .. } => vec![condition],
            LogicalPlan::Join { condition, .. } => {
                condition.as_ref().map(|c| vec![c]).unwrap_or_default()
            }
            LogicalPlan::Limit { count, .. } => vec![count],
            _ => vec![],
        }
    }

    /// Applies `func` to every expression slot of this node only,
    /// rebuilding the node when any slot changed.
    pub fn map_expressions<F>(&self, func: &mut F) -> OptimizerResult<Option<LogicalPlan>>
    where
        F: FnMut(&Expression) -> OptimizerResult<Option<Expression>>,
    {
        match self {
            LogicalPlan::Project { project_list, child } => {
                let mut any_updated = false;
                let mut new_list = Vec::with_capacity(project_list.len());
                for expr in project_list {
                    match func(expr)? {
                        Some(updated) => {
                            any_updated = true;
                            new_list.push(updated);
                        }
                        None => new_list.push(expr.clone()),
                    }
                }
                Ok(any_updated.then(|| LogicalPlan::Project {
                    project_list: new_list,
                    child: child.clone(),
                }))
            }
            LogicalPlan::Filter { condition, child } => Ok(func(condition)?.map(|c| {
                LogicalPlan::Filter {
                    condition: c,
                    child: child.clone(),
                }
            })),
            LogicalPlan::Join {
                join_type,
                condition: Some(condition),
                left,
                right,
            } => Ok(func(condition)?.map(|c| LogicalPlan::Join {
                join_type: *join_type,
                condition: Some(c),
                left: left.clone(),
                right: right.clone(),
            })),
            LogicalPlan::Limit { count, child } => Ok(func(count)?.map(|c| {
                LogicalPlan::Limit {
                    count: c,
                    child: child.clone(),
                }
            })),
            _ => Ok(None),
        }
    }

    /// Walks every expression slot of every plan node, applying a pre-order
    /// rewrite to each expression tree.
    pub fn transform_expressions<F>(
        &self,
        func: &mut F,
    ) -> OptimizerResult<Option<LogicalPlan>>
    where
        F: FnMut(&Expression) -> OptimizerResult<Option<Expression>>,
    {
        self.transform_up(&mut |plan| {
            plan.map_expressions(&mut |expr| expr.transform_down(func))
        })
    }

    /// Like [`LogicalPlan::transform_expressions`], but post-order within
    /// each expression tree, so a rewrite sees its operands already in
    /// normal form.
    pub fn transform_expressions_up<F>(
        &self,
        func: &mut F,
    ) -> OptimizerResult<Option<LogicalPlan>>
    where
        F: FnMut(&Expression) -> OptimizerResult<Option<Expression>>,
    {
        self.transform_up(&mut |plan| {
            plan.map_expressions(&mut |expr| expr.transform_up(func))
        })
    }

    /// Collects matches across all expressions in the plan, preserving
    /// document order.
    pub fn collect_from_expressions<T, F>(&self, func: &mut F) -> Vec<T>
    where
        F: FnMut(&Expression) -> Option<T>,
    {
        let mut out = Vec::new();
        self.collect_from_expressions_into(func, &mut out);
        out
    }

    fn collect_from_expressions_into<T, F>(&self, func: &mut F, out: &mut Vec<T>)
    where
        F: FnMut(&Expression) -> Option<T>,
    {
        for expr in self.expressions() {
            expr.collect(func, out);
        }
        for child in self.children() {
            child.collect_from_expressions_into(func, out);
        }
    }

    /// Stable textual rendering for diagnostics and tests.
    pub fn pretty_tree(&self) -> String {
        let mut out = String::new();
        self.fmt_tree(0, &mut out);
        out
    }

    fn fmt_tree(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let line = match self {
            LogicalPlan::UnresolvedRelation { table } => {
                format!("UnresolvedRelation {table}")
            }
            LogicalPlan::LocalRelation { output, rows } => format!(
                "LocalRelation [{}] ({} rows)",
                format_attrs(output),
                rows.len()
            ),
            LogicalPlan::TableScan { table, output } => {
                format!("TableScan {table} [{}]", format_attrs(output))
            }
            LogicalPlan::Project { project_list, .. } => format!(
                "Project [{}]",
                project_list
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            LogicalPlan::Filter { condition, .. } => format!("Filter [{condition}]"),
            LogicalPlan::Join {
                join_type,
                condition,
                ..
            } => match condition {
                Some(c) => format!("Join {join_type} [{c}]"),
                None => format!("Join {join_type}"),
            },
            LogicalPlan::Limit { count, .. } => format!("Limit [{count}]"),
            LogicalPlan::Union { .. } => "Union".to_string(),
            LogicalPlan::Subquery { alias, .. } => format!("Subquery {alias}"),
        };
        let _ = writeln!(out, "{indent}{line}");
        for child in self.children() {
            child.fmt_tree(depth + 1, out);
        }
    }
}

fn format_attrs(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .map(|a| format!("{a} {}", a.data_type))
        .collect::<Vec<String>>()
        .join(", ")
}

impl Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_tree().trim_end())
    }
}
