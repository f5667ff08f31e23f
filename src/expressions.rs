use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use crate::data_types::DataType;
use crate::trees::TreeNode;
use crate::{OptimizerError, OptimizerResult};

/// Identifier assigned to every alias and attribute reference during
/// analysis. Globally unique within a plan; distinguishes logically
/// separate occurrences despite identical names. Rewrites never invent or
/// conflate ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub u64);

impl Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved column: what a plan produces and what an `AttributeRef`
/// points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub id: ExprId,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub qualifier: Option<String>,
}

impl Attribute {
    pub fn new(id: ExprId, name: impl Into<String>, data_type: DataType) -> Self {
        Attribute {
            id,
            name: name.into(),
            data_type,
            nullable: false,
            qualifier: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn to_expr(&self) -> Expression {
        Expression::AttributeRef(self.clone())
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}{}", q, self.name, self.id),
            None => write!(f, "{}{}", self.name, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// Leftover from analysis; its presence fails the optimizer
    /// precondition.
    UnresolvedAttribute(String),
    AttributeRef(Attribute),
    Alias {
        id: ExprId,
        name: String,
        child: Box<Expression>,
    },
    /// Alias invented by the analyzer for an unnamed projection item.
    GeneratedAlias {
        id: ExprId,
        name: String,
        child: Box<Expression>,
    },
    /// Reference to a generated alias.
    GeneratedAttribute {
        id: ExprId,
        name: String,
        data_type: DataType,
        nullable: bool,
    },
    Cast {
        child: Box<Expression>,
        data_type: DataType,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOp,
        input: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    Coalesce {
        args: Vec<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Gt,
    Gte,
    Eq,
    NotEq,
    Lt,
    Lte,
    And,
    Or,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Plus => "+".fmt(f),
            BinaryOp::Minus => "-".fmt(f),
            BinaryOp::Multiply => "*".fmt(f),
            BinaryOp::Divide => "/".fmt(f),
            BinaryOp::Gt => ">".fmt(f),
            BinaryOp::Gte => ">=".fmt(f),
            BinaryOp::Eq => "=".fmt(f),
            BinaryOp::NotEq => "<>".fmt(f),
            BinaryOp::Lt => "<".fmt(f),
            BinaryOp::Lte => "<=".fmt(f),
            BinaryOp::And => "AND".fmt(f),
            BinaryOp::Or => "OR".fmt(f),
        }
    }
}

impl BinaryOp {
    pub fn is_comparison_op(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt
                | BinaryOp::Gte
                | BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Lte
        )
    }

    pub fn is_boolean_op(&self) -> bool {
        self.is_comparison_op() || matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_arithmetic_op(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply | BinaryOp::Divide
        )
    }

    /// The comparison with the complementary truth table, if any.
    pub fn negated_comparison(&self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Eq => Some(BinaryOp::NotEq),
            BinaryOp::NotEq => Some(BinaryOp::Eq),
            BinaryOp::Gt => Some(BinaryOp::Lte),
            BinaryOp::Gte => Some(BinaryOp::Lt),
            BinaryOp::Lt => Some(BinaryOp::Gte),
            BinaryOp::Lte => Some(BinaryOp::Gt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    IsNull,
    IsNotNull,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => "NOT".fmt(f),
            UnaryOp::Neg => "-".fmt(f),
            UnaryOp::IsNull => "IS NULL".fmt(f),
            UnaryOp::IsNotNull => "IS NOT NULL".fmt(f),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(l) => l.fmt(f),
            Expression::UnresolvedAttribute(name) => write!(f, "'{name}"),
            Expression::AttributeRef(attr) => attr.fmt(f),
            Expression::Alias { id, name, child } => {
                write!(f, "{child} AS {name}{id}")
            }
            Expression::GeneratedAlias { id, name, child } => {
                write!(f, "{child} AS {name}{id}")
            }
            Expression::GeneratedAttribute { id, name, .. } => write!(f, "{name}{id}"),
            Expression::Cast { child, data_type } => {
                write!(f, "CAST({child} AS {data_type})")
            }
            Expression::BinaryOp { op, left, right } => {
                write!(f, "({left} {op} {right})")
            }
            Expression::UnaryOp { op, input } => match op {
                UnaryOp::Not => write!(f, "(NOT {input})"),
                UnaryOp::Neg => write!(f, "(- {input})"),
                UnaryOp::IsNull => write!(f, "({input} IS NULL)"),
                UnaryOp::IsNotNull => write!(f, "({input} IS NOT NULL)"),
            },
            Expression::If {
                condition,
                then,
                otherwise,
            } => write!(f, "if({condition}, {then}, {otherwise})"),
            Expression::Coalesce { args } => write!(
                f,
                "coalesce({})",
                args.iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl TreeNode for Expression {
    fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_)
            | Expression::UnresolvedAttribute(_)
            | Expression::AttributeRef(_)
            | Expression::GeneratedAttribute { .. } => vec![],
            Expression::Alias { child, .. } => vec![child],
            Expression::GeneratedAlias { child, .. } => vec![child],
            Expression::Cast { child, .. } => vec![child],
            Expression::BinaryOp { left, right, .. } => vec![left, right],
            Expression::UnaryOp { input, .. } => vec![input],
            Expression::If {
                condition,
                then,
                otherwise,
            } => vec![condition, then, otherwise],
            Expression::Coalesce { args } => args.iter().collect(),
        }
    }

    fn with_children(&self, children: Vec<Expression>) -> OptimizerResult<Expression> {
        if let Expression::Coalesce { .. } = self {
            return Ok(Expression::Coalesce { args: children });
        }
        let mut iter = children.into_iter();
        let mut next = || {
            iter.next()
                .ok_or_else(|| OptimizerError::should_never_happen("missing child"))
        };
        match self {
            Expression::Literal(_)
            | Expression::UnresolvedAttribute(_)
            | Expression::AttributeRef(_)
            | Expression::GeneratedAttribute { .. } => {
                Err(OptimizerError::should_never_happen("leaf has no children"))
            }
            Expression::Alias { id, name, .. } => Ok(Expression::Alias {
                id: *id,
                name: name.clone(),
                child: Box::new(next()?),
            }),
            Expression::GeneratedAlias { id, name, .. } => {
                Ok(Expression::GeneratedAlias {
                    id: *id,
                    name: name.clone(),
                    child: Box::new(next()?),
                })
            }
            Expression::Cast { data_type, .. } => Ok(Expression::Cast {
                child: Box::new(next()?),
                data_type: *data_type,
            }),
            Expression::BinaryOp { op, .. } => Ok(Expression::BinaryOp {
                op: *op,
                left: Box::new(next()?),
                right: Box::new(next()?),
            }),
            Expression::UnaryOp { op, .. } => Ok(Expression::UnaryOp {
                op: *op,
                input: Box::new(next()?),
            }),
            Expression::If { .. } => Ok(Expression::If {
                condition: Box::new(next()?),
                then: Box::new(next()?),
                otherwise: Box::new(next()?),
            }),
            Expression::Coalesce { .. } => {
                Err(OptimizerError::should_never_happen("coalesce handled above"))
            }
        }
    }
}

impl Expression {
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(l) => l.data_type(),
            Expression::UnresolvedAttribute(_) => DataType::Null,
            Expression::AttributeRef(attr) => attr.data_type,
            Expression::Alias { child, .. } => child.data_type(),
            Expression::GeneratedAlias { child, .. } => child.data_type(),
            Expression::GeneratedAttribute { data_type, .. } => *data_type,
            Expression::Cast { data_type, .. } => *data_type,
            Expression::BinaryOp { op, left, right } => {
                if op.is_boolean_op() {
                    DataType::Boolean
                } else if left.data_type() == DataType::Null {
                    right.data_type()
                } else {
                    left.data_type()
                }
            }
            Expression::UnaryOp { op, input } => match op {
                UnaryOp::Not | UnaryOp::IsNull | UnaryOp::IsNotNull => DataType::Boolean,
                UnaryOp::Neg => input.data_type(),
            },
            Expression::If {
                then, otherwise, ..
            } => {
                if then.data_type() == DataType::Null {
                    otherwise.data_type()
                } else {
                    then.data_type()
                }
            }
            Expression::Coalesce { args } => args
                .iter()
                .map(|a| a.data_type())
                .find(|t| *t != DataType::Null)
                .unwrap_or(DataType::Null),
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Expression::Literal(l) => matches!(l, Literal::Null),
            Expression::UnresolvedAttribute(_) => true,
            Expression::AttributeRef(attr) => attr.nullable,
            Expression::Alias { child, .. } => child.is_nullable(),
            Expression::GeneratedAlias { child, .. } => child.is_nullable(),
            Expression::GeneratedAttribute { nullable, .. } => *nullable,
            Expression::Cast { child, .. } => child.is_nullable(),
            Expression::BinaryOp { left, right, .. } => {
                left.is_nullable() || right.is_nullable()
            }
            Expression::UnaryOp { op, input } => match op {
                UnaryOp::IsNull | UnaryOp::IsNotNull => false,
                UnaryOp::Not | UnaryOp::Neg => input.is_nullable(),
            },
            Expression::If {
                then, otherwise, ..
            } => then.is_nullable() || otherwise.is_nullable(),
            Expression::Coalesce { args } => args.iter().all(|a| a.is_nullable()),
        }
    }

    /// A foldable expression has no free attributes and evaluates totally
    /// at optimization time.
    pub fn is_foldable(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::UnresolvedAttribute(_)
            | Expression::AttributeRef(_)
            | Expression::GeneratedAttribute { .. } => false,
            _ => self.children().into_iter().all(Expression::is_foldable),
        }
    }

    /// Every operator in this algebra is deterministic and side-effect
    /// free; purity is still checked at the rewrite seams that depend on
    /// it (alias inlining, filter pushdown).
    pub fn is_pure(&self) -> bool {
        match self {
            Expression::UnresolvedAttribute(_) => false,
            _ => self.children().into_iter().all(Expression::is_pure),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.any(&mut |e| matches!(e, Expression::UnresolvedAttribute(_)))
    }

    pub fn is_well_typed(&self) -> bool {
        self.operands_well_typed()
            && self.children().into_iter().all(Expression::is_well_typed)
    }

    /// Well-typed and free of redundant casts.
    pub fn is_strictly_typed(&self) -> bool {
        self.is_well_typed()
            && !self.any(&mut |e| match e {
                Expression::Cast { child, data_type } => child.data_type() == *data_type,
                _ => false,
            })
    }

    fn operands_well_typed(&self) -> bool {
        match self {
            Expression::Literal(_)
            | Expression::UnresolvedAttribute(_)
            | Expression::AttributeRef(_)
            | Expression::GeneratedAttribute { .. }
            | Expression::Alias { .. }
            | Expression::GeneratedAlias { .. } => true,
            Expression::Cast { child, data_type } => {
                DataType::can_cast(child.data_type(), *data_type)
            }
            Expression::BinaryOp { op, left, right } => {
                let (lt, rt) = (left.data_type(), right.data_type());
                match op {
                    BinaryOp::And | BinaryOp::Or => {
                        lt.is_compatible_with(&DataType::Boolean)
                            && rt.is_compatible_with(&DataType::Boolean)
                    }
                    op if op.is_comparison_op() => lt.is_compatible_with(&rt),
                    _ => {
                        lt.is_compatible_with(&rt)
                            && (lt.is_numeric() || lt == DataType::Null)
                            && (rt.is_numeric() || rt == DataType::Null)
                    }
                }
            }
            Expression::UnaryOp { op, input } => match op {
                UnaryOp::Not => input.data_type().is_compatible_with(&DataType::Boolean),
                UnaryOp::Neg => {
                    let t = input.data_type();
                    t.is_numeric() || t == DataType::Null
                }
                UnaryOp::IsNull | UnaryOp::IsNotNull => true,
            },
            Expression::If {
                condition,
                then,
                otherwise,
            } => {
                condition.data_type().is_compatible_with(&DataType::Boolean)
                    && then.data_type().is_compatible_with(&otherwise.data_type())
            }
            Expression::Coalesce { args } => {
                let result_type = self.data_type();
                !args.is_empty()
                    && args
                        .iter()
                        .all(|a| a.data_type().is_compatible_with(&result_type))
            }
        }
    }

    /// Ids of the attributes this expression reads.
    pub fn reference_ids(&self) -> HashSet<ExprId> {
        let mut out = Vec::new();
        self.collect(
            &mut |e| match e {
                Expression::AttributeRef(attr) => Some(attr.id),
                Expression::GeneratedAttribute { id, .. } => Some(*id),
                _ => None,
            },
            &mut out,
        );
        out.into_iter().collect()
    }

    /// The id this expression binds in a projection, if any.
    pub fn binding_id(&self) -> Option<ExprId> {
        match self {
            Expression::AttributeRef(attr) => Some(attr.id),
            Expression::Alias { id, .. }
            | Expression::GeneratedAlias { id, .. }
            | Expression::GeneratedAttribute { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The attribute a resolved projection item produces. Errors for
    /// expressions the analyzer should have named.
    pub fn to_attribute(&self) -> OptimizerResult<Attribute> {
        match self {
            Expression::AttributeRef(attr) => Ok(attr.clone()),
            Expression::Alias { id, name, child }
            | Expression::GeneratedAlias { id, name, child } => {
                Ok(Attribute::new(*id, name.clone(), child.data_type())
                    .with_nullable(child.is_nullable()))
            }
            Expression::GeneratedAttribute {
                id,
                name,
                data_type,
                nullable,
            } => Ok(Attribute::new(*id, name.clone(), *data_type).with_nullable(*nullable)),
            other => Err(OptimizerError::InvariantViolation(format!(
                "projection item {other} has no name"
            ))),
        }
    }

    pub fn as_bool_literal(&self) -> Option<bool> {
        match self {
            Expression::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Expression {
        Expression::BinaryOp {
            op: BinaryOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Expression {
        Expression::BinaryOp {
            op: BinaryOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(input: Expression) -> Expression {
        Expression::UnaryOp {
            op: UnaryOp::Not,
            input: Box::new(input),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Literal {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    DateTime(String),
    Null,
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UInt8(l0), Self::UInt8(r0)) => l0 == r0,
            (Self::UInt16(l0), Self::UInt16(r0)) => l0 == r0,
            (Self::UInt32(l0), Self::UInt32(r0)) => l0 == r0,
            (Self::UInt64(l0), Self::UInt64(r0)) => l0 == r0,
            (Self::Int8(l0), Self::Int8(r0)) => l0 == r0,
            (Self::Int16(l0), Self::Int16(r0)) => l0 == r0,
            (Self::Int32(l0), Self::Int32(r0)) => l0 == r0,
            (Self::Int64(l0), Self::Int64(r0)) => l0 == r0,
            (Self::Float32(l0), Self::Float32(r0)) => l0 == r0,
            (Self::Float64(l0), Self::Float64(r0)) => l0 == r0,
            (Self::Bool(l0), Self::Bool(r0)) => l0 == r0,
            (Self::String(l0), Self::String(r0)) => l0 == r0,
            (Self::DateTime(l0), Self::DateTime(r0)) => l0 == r0,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Needed for using literals in hash-keyed test fixtures.
/// FIXME: deal with NaN
impl Eq for Literal {
    fn assert_receiver_is_total_eq(&self) {}
}

impl Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::UInt8(v) => v.fmt(f),
            Literal::UInt16(v) => v.fmt(f),
            Literal::UInt32(v) => v.fmt(f),
            Literal::UInt64(v) => v.fmt(f),
            Literal::Int8(v) => v.fmt(f),
            Literal::Int16(v) => v.fmt(f),
            Literal::Int32(v) => v.fmt(f),
            Literal::Int64(v) => v.fmt(f),
            Literal::Float32(v) => v.fmt(f),
            Literal::Float64(v) => v.fmt(f),
            Literal::Bool(v) => v.fmt(f),
            Literal::String(v) => write!(f, "\"{v}\""),
            Literal::DateTime(v) => v.fmt(f),
            Literal::Null => "null".fmt(f),
        }
    }
}

impl Literal {
    pub fn as_bool(&self) -> OptimizerResult<bool> {
        match self {
            Literal::Bool(v) => Ok(*v),
            other => Err(OptimizerError::Evaluation(format!(
                "{other} is not a boolean"
            ))),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Literal::UInt8(_) => DataType::UInt8,
            Literal::UInt16(_) => DataType::UInt16,
            Literal::UInt32(_) => DataType::UInt32,
            Literal::UInt64(_) => DataType::UInt64,
            Literal::Int8(_) => DataType::Int8,
            Literal::Int16(_) => DataType::Int16,
            Literal::Int32(_) => DataType::Int32,
            Literal::Int64(_) => DataType::Int64,
            Literal::Float32(_) => DataType::Float32,
            Literal::Float64(_) => DataType::Float64,
            Literal::Bool(_) => DataType::Boolean,
            Literal::String(_) => DataType::String,
            Literal::DateTime(_) => DataType::DateTime,
            Literal::Null => DataType::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}
