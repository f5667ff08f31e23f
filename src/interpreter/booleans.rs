use crate::expressions::{BinaryOp, Literal, UnaryOp};
use crate::OptimizerError::Evaluation;
use crate::OptimizerResult;

pub fn gt_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match (left, right) {
        (Literal::Null, _) | (_, Literal::Null) => Ok(Literal::Null),
        (Literal::Int8(l), Literal::Int8(r)) => Ok(Literal::Bool(l > r)),
        (Literal::Int16(l), Literal::Int16(r)) => Ok(Literal::Bool(l > r)),
        (Literal::Int32(l), Literal::Int32(r)) => Ok(Literal::Bool(l > r)),
        (Literal::Int64(l), Literal::Int64(r)) => Ok(Literal::Bool(l > r)),
        (Literal::UInt8(l), Literal::UInt8(r)) => Ok(Literal::Bool(l > r)),
        (Literal::UInt16(l), Literal::UInt16(r)) => Ok(Literal::Bool(l > r)),
        (Literal::UInt32(l), Literal::UInt32(r)) => Ok(Literal::Bool(l > r)),
        (Literal::UInt64(l), Literal::UInt64(r)) => Ok(Literal::Bool(l > r)),
        (Literal::Float32(l), Literal::Float32(r)) => Ok(Literal::Bool(l > r)),
        (Literal::Float64(l), Literal::Float64(r)) => Ok(Literal::Bool(l > r)),
        (Literal::String(l), Literal::String(r)) => Ok(Literal::Bool(l > r)),
        (Literal::DateTime(l), Literal::DateTime(r)) => Ok(Literal::Bool(l > r)),
        (left, right) => Err(Evaluation(format!(
            "{} operator not implemented for {left} and {right}",
            BinaryOp::Gt
        ))),
    }
}

pub fn gte_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match (left, right) {
        (Literal::Null, _) | (_, Literal::Null) => Ok(Literal::Null),
        (Literal::Int8(l), Literal::Int8(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::Int16(l), Literal::Int16(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::Int32(l), Literal::Int32(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::Int64(l), Literal::Int64(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::UInt8(l), Literal::UInt8(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::UInt16(l), Literal::UInt16(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::UInt32(l), Literal::UInt32(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::UInt64(l), Literal::UInt64(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::Float32(l), Literal::Float32(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::Float64(l), Literal::Float64(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::String(l), Literal::String(r)) => Ok(Literal::Bool(l >= r)),
        (Literal::DateTime(l), Literal::DateTime(r)) => Ok(Literal::Bool(l >= r)),
        (left, right) => Err(Evaluation(format!(
            "{} operator not implemented for {left} and {right}",
            BinaryOp::Gte
        ))),
    }
}

pub fn lt_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match gte_impl(left, right)? {
        Literal::Bool(v) => Ok(Literal::Bool(!v)),
        other => Ok(other),
    }
}

pub fn lte_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match gt_impl(left, right)? {
        Literal::Bool(v) => Ok(Literal::Bool(!v)),
        other => Ok(other),
    }
}

pub fn eq_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match (left, right) {
        (Literal::Null, _) | (_, Literal::Null) => Ok(Literal::Null),
        (Literal::Int8(l), Literal::Int8(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Int16(l), Literal::Int16(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Int32(l), Literal::Int32(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Int64(l), Literal::Int64(r)) => Ok(Literal::Bool(l == r)),
        (Literal::UInt8(l), Literal::UInt8(r)) => Ok(Literal::Bool(l == r)),
        (Literal::UInt16(l), Literal::UInt16(r)) => Ok(Literal::Bool(l == r)),
        (Literal::UInt32(l), Literal::UInt32(r)) => Ok(Literal::Bool(l == r)),
        (Literal::UInt64(l), Literal::UInt64(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Float32(l), Literal::Float32(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Float64(l), Literal::Float64(r)) => Ok(Literal::Bool(l == r)),
        (Literal::Bool(l), Literal::Bool(r)) => Ok(Literal::Bool(l == r)),
        (Literal::String(l), Literal::String(r)) => Ok(Literal::Bool(l == r)),
        (Literal::DateTime(l), Literal::DateTime(r)) => Ok(Literal::Bool(l == r)),
        (left, right) => Err(Evaluation(format!(
            "{} operator not implemented for {left} and {right}",
            BinaryOp::Eq
        ))),
    }
}

pub fn not_eq_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match eq_impl(left, right)? {
        Literal::Bool(v) => Ok(Literal::Bool(!v)),
        other => Ok(other),
    }
}

/// Kleene three-valued AND.
pub fn and_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match (left, right) {
        (Literal::Bool(false), _) | (_, Literal::Bool(false)) => Ok(Literal::Bool(false)),
        (Literal::Null, _) | (_, Literal::Null) => Ok(Literal::Null),
        (Literal::Bool(l), Literal::Bool(r)) => Ok(Literal::Bool(l && r)),
        (left, right) => Err(Evaluation(format!(
            "{} operator not implemented for {left} and {right}",
            BinaryOp::And
        ))),
    }
}

/// Kleene three-valued OR.
pub fn or_impl(left: Literal, right: Literal) -> OptimizerResult<Literal> {
    match (left, right) {
        (Literal::Bool(true), _) | (_, Literal::Bool(true)) => Ok(Literal::Bool(true)),
        (Literal::Null, _) | (_, Literal::Null) => Ok(Literal::Null),
        (Literal::Bool(l), Literal::Bool(r)) => Ok(Literal::Bool(l || r)),
        (left, right) => Err(Evaluation(format!(
            "{} operator not implemented for {left} and {right}",
            BinaryOp::Or
        ))),
    }
}

pub fn not_impl(input: Literal) -> OptimizerResult<Literal> {
    match input {
        Literal::Null => Ok(Literal::Null),
        Literal::Bool(v) => Ok(Literal::Bool(!v)),
        input => Err(Evaluation(format!(
            "{} operator not implemented for {input}",
            UnaryOp::Not
        ))),
    }
}
