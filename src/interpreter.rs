mod arithmetic;
mod booleans;

use crate::data_types::DataType;
use crate::expressions::{Attribute, BinaryOp, ExprId, Expression, Literal, UnaryOp};
use crate::logical_plans::{JoinType, LogicalPlan};
use crate::row::Row;
use crate::{OptimizerError, OptimizerResult, ResultSet};

use self::arithmetic::{divide_impl, minus_impl, multiply_impl, negative_impl, plus_impl};
use self::booleans::{
    and_impl, eq_impl, gt_impl, gte_impl, lt_impl, lte_impl, not_eq_impl, not_impl,
    or_impl,
};

/// Reference evaluator for resolved expressions and `LocalRelation`-rooted
/// plans. The constant folder uses [`Interpreter::eval_const`]; the
/// semantic-soundness tests use [`Interpreter::execute`] as ground truth.
pub struct Interpreter {}

impl Interpreter {
    pub fn eval(
        expr: &Expression,
        schema: &[Attribute],
        row: &Row,
    ) -> OptimizerResult<Literal> {
        match expr {
            Expression::Literal(l) => Ok(l.clone()),
            Expression::UnresolvedAttribute(name) => Err(OptimizerError::Evaluation(
                format!("trying to evaluate unresolved attribute {name}"),
            )),
            Expression::AttributeRef(attr) => {
                row.get_field(field_index(schema, attr.id)?)
            }
            Expression::GeneratedAttribute { id, .. } => {
                row.get_field(field_index(schema, *id)?)
            }
            Expression::Alias { child, .. } | Expression::GeneratedAlias { child, .. } => {
                Self::eval(child, schema, row)
            }
            Expression::Cast { child, data_type } => {
                cast_impl(Self::eval(child, schema, row)?, *data_type)
            }
            Expression::BinaryOp { op, left, right } => {
                let (left, right) = (
                    Self::eval(left, schema, row)?,
                    Self::eval(right, schema, row)?,
                );
                match op {
                    BinaryOp::Plus => plus_impl(left, right),
                    BinaryOp::Minus => minus_impl(left, right),
                    BinaryOp::Multiply => multiply_impl(left, right),
                    BinaryOp::Divide => divide_impl(left, right),
                    BinaryOp::Gt => gt_impl(left, right),
                    BinaryOp::Gte => gte_impl(left, right),
                    BinaryOp::Eq => eq_impl(left, right),
                    BinaryOp::NotEq => not_eq_impl(left, right),
                    BinaryOp::Lt => lt_impl(left, right),
                    BinaryOp::Lte => lte_impl(left, right),
                    BinaryOp::And => and_impl(left, right),
                    BinaryOp::Or => or_impl(left, right),
                }
            }
            Expression::UnaryOp { op, input } => {
                let value = Self::eval(input, schema, row)?;
                match op {
                    UnaryOp::Not => not_impl(value),
                    UnaryOp::Neg => negative_impl(value),
                    UnaryOp::IsNull => Ok(Literal::Bool(value.is_null())),
                    UnaryOp::IsNotNull => Ok(Literal::Bool(!value.is_null())),
                }
            }
            Expression::If {
                condition,
                then,
                otherwise,
            } => match Self::eval(condition, schema, row)? {
                Literal::Bool(true) => Self::eval(then, schema, row),
                // SQL CASE WHEN: a null condition takes the else branch.
                Literal::Bool(false) | Literal::Null => Self::eval(otherwise, schema, row),
                other => Err(OptimizerError::Evaluation(format!(
                    "if condition evaluated to non-boolean {other}"
                ))),
            },
            Expression::Coalesce { args } => {
                for arg in args {
                    let value = Self::eval(arg, schema, row)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Literal::Null)
            }
        }
    }

    /// Evaluates a foldable expression. Errors when the expression still
    /// references attributes or an operator cannot evaluate.
    pub fn eval_const(expr: &Expression) -> OptimizerResult<Literal> {
        Self::eval(expr, &[], &Row::new(vec![]))
    }

    /// Executes a `LocalRelation`-rooted plan to its row bag. There is no
    /// storage at this layer, so `TableScan` refuses.
    pub fn execute(plan: &LogicalPlan) -> OptimizerResult<ResultSet> {
        let schema = plan.output()?;
        match plan {
            LogicalPlan::UnresolvedRelation { table } => Err(OptimizerError::Unresolved(
                format!("relation {table} is not resolved"),
            )),
            LogicalPlan::TableScan { table, .. } => Err(OptimizerError::Evaluation(
                format!("no storage backing table {table} at this layer"),
            )),
            LogicalPlan::LocalRelation { rows, .. } => {
                Ok(ResultSet::new(schema, rows.clone()))
            }
            LogicalPlan::Project {
                project_list,
                child,
            } => {
                let input = Self::execute(child)?;
                let mut rows = Vec::with_capacity(input.rows.len());
                for row in &input.rows {
                    let fields = project_list
                        .iter()
                        .map(|e| Self::eval(e, &input.schema, row))
                        .collect::<OptimizerResult<Vec<_>>>()?;
                    rows.push(Row::new(fields));
                }
                Ok(ResultSet::new(schema, rows))
            }
            LogicalPlan::Filter { condition, child } => {
                let input = Self::execute(child)?;
                let mut rows = Vec::new();
                for row in &input.rows {
                    if let Literal::Bool(true) =
                        Self::eval(condition, &input.schema, row)?
                    {
                        rows.push(row.clone());
                    }
                }
                Ok(ResultSet::new(schema, rows))
            }
            LogicalPlan::Join {
                join_type,
                condition,
                left,
                right,
            } => {
                let left_rs = Self::execute(left)?;
                let right_rs = Self::execute(right)?;
                Self::execute_join(*join_type, condition.as_ref(), left_rs, right_rs, schema)
            }
            LogicalPlan::Limit { count, child } => {
                let input = Self::execute(child)?;
                let n = literal_to_usize(Interpreter::eval_const(count)?)?;
                let rows = input.rows.into_iter().take(n).collect();
                Ok(ResultSet::new(schema, rows))
            }
            LogicalPlan::Union { left, right } => {
                let mut left_rs = Self::execute(left)?;
                let right_rs = Self::execute(right)?;
                left_rs.rows.extend(right_rs.rows);
                Ok(ResultSet::new(schema, left_rs.rows))
            }
            LogicalPlan::Subquery { child, .. } => {
                let input = Self::execute(child)?;
                Ok(ResultSet::new(schema, input.rows))
            }
        }
    }

    fn execute_join(
        join_type: JoinType,
        condition: Option<&Expression>,
        left: ResultSet,
        right: ResultSet,
        schema: Vec<Attribute>,
    ) -> OptimizerResult<ResultSet> {
        let mut combined_schema = left.schema.clone();
        combined_schema.extend(right.schema.clone());

        let matches = |l: &Row, r: &Row| -> OptimizerResult<bool> {
            match condition {
                None => Ok(true),
                Some(cond) => Ok(matches!(
                    Interpreter::eval(cond, &combined_schema, &Row::concat(l, r))?,
                    Literal::Bool(true)
                )),
            }
        };

        let left_nulls = Row::new(vec![Literal::Null; left.schema.len()]);
        let right_nulls = Row::new(vec![Literal::Null; right.schema.len()]);

        let mut rows = Vec::new();
        let mut right_matched = vec![false; right.rows.len()];
        for l in &left.rows {
            let mut l_matched = false;
            for (idx, r) in right.rows.iter().enumerate() {
                if matches(l, r)? {
                    l_matched = true;
                    right_matched[idx] = true;
                    rows.push(Row::concat(l, r));
                }
            }
            if !l_matched
                && matches!(join_type, JoinType::LeftOuter | JoinType::FullOuter)
            {
                rows.push(Row::concat(l, &right_nulls));
            }
        }
        if matches!(join_type, JoinType::RightOuter | JoinType::FullOuter) {
            for (idx, r) in right.rows.iter().enumerate() {
                if !right_matched[idx] {
                    rows.push(Row::concat(&left_nulls, r));
                }
            }
        }
        Ok(ResultSet::new(schema, rows))
    }
}

fn field_index(schema: &[Attribute], id: ExprId) -> OptimizerResult<usize> {
    schema
        .iter()
        .position(|attr| attr.id == id)
        .ok_or_else(|| {
            OptimizerError::Evaluation(format!("attribute {id} not found in input schema"))
        })
}

fn literal_to_usize(literal: Literal) -> OptimizerResult<usize> {
    match literal {
        Literal::UInt8(v) => Ok(v as usize),
        Literal::UInt16(v) => Ok(v as usize),
        Literal::UInt32(v) => Ok(v as usize),
        Literal::UInt64(v) => Ok(v as usize),
        Literal::Int8(v) if v >= 0 => Ok(v as usize),
        Literal::Int16(v) if v >= 0 => Ok(v as usize),
        Literal::Int32(v) if v >= 0 => Ok(v as usize),
        Literal::Int64(v) if v >= 0 => Ok(v as usize),
        other => Err(OptimizerError::Evaluation(format!(
            "{other} is not a valid row count"
        ))),
    }
}

fn cast_impl(value: Literal, to: DataType) -> OptimizerResult<Literal> {
    if value.is_null() || value.data_type() == to {
        return Ok(value);
    }
    match to {
        DataType::Float32 => Ok(Literal::Float32(to_f64(&value)? as f32)),
        DataType::Float64 => Ok(Literal::Float64(to_f64(&value)?)),
        DataType::Int8 => Ok(Literal::Int8(to_i64(&value)? as i8)),
        DataType::Int16 => Ok(Literal::Int16(to_i64(&value)? as i16)),
        DataType::Int32 => Ok(Literal::Int32(to_i64(&value)? as i32)),
        DataType::Int64 => Ok(Literal::Int64(to_i64(&value)?)),
        DataType::UInt8 => Ok(Literal::UInt8(to_i64(&value)? as u8)),
        DataType::UInt16 => Ok(Literal::UInt16(to_i64(&value)? as u16)),
        DataType::UInt32 => Ok(Literal::UInt32(to_i64(&value)? as u32)),
        DataType::UInt64 => Ok(Literal::UInt64(to_i64(&value)? as u64)),
        DataType::String => Ok(Literal::String(raw_string(&value))),
        DataType::DateTime => match value {
            Literal::String(s) => Ok(Literal::DateTime(s)),
            other => Err(cast_error(&other, to)),
        },
        _ => Err(cast_error(&value, to)),
    }
}

fn raw_string(value: &Literal) -> String {
    match value {
        Literal::String(s) => s.clone(),
        Literal::DateTime(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_f64(value: &Literal) -> OptimizerResult<f64> {
    match value {
        Literal::UInt8(v) => Ok(*v as f64),
        Literal::UInt16(v) => Ok(*v as f64),
        Literal::UInt32(v) => Ok(*v as f64),
        Literal::UInt64(v) => Ok(*v as f64),
        Literal::Int8(v) => Ok(*v as f64),
        Literal::Int16(v) => Ok(*v as f64),
        Literal::Int32(v) => Ok(*v as f64),
        Literal::Int64(v) => Ok(*v as f64),
        Literal::Float32(v) => Ok(*v as f64),
        Literal::Float64(v) => Ok(*v),
        other => Err(cast_error(other, DataType::Float64)),
    }
}

fn to_i64(value: &Literal) -> OptimizerResult<i64> {
    match value {
        Literal::UInt8(v) => Ok(*v as i64),
        Literal::UInt16(v) => Ok(*v as i64),
        Literal::UInt32(v) => Ok(*v as i64),
        Literal::UInt64(v) => Ok(*v as i64),
        Literal::Int8(v) => Ok(*v as i64),
        Literal::Int16(v) => Ok(*v as i64),
        Literal::Int32(v) => Ok(*v as i64),
        Literal::Int64(v) => Ok(*v),
        Literal::Float32(v) => Ok(*v as i64),
        Literal::Float64(v) => Ok(*v as i64),
        other => Err(cast_error(other, DataType::Int64)),
    }
}

fn cast_error(value: &Literal, to: DataType) -> OptimizerError {
    OptimizerError::Evaluation(format!("cannot cast {value} to {to}"))
}
