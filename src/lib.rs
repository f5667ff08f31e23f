//! Logical query-plan optimizer: a rule-based, fixed-point rewriter that
//! turns a resolved logical plan into a semantically equivalent but
//! cheaper one. Parsing, analysis, physical planning and execution live in
//! the layers around this crate.

mod errors;

pub mod data_types;
pub mod expressions;
pub mod interpreter;
pub mod logical_plans;
pub mod optimizer;
pub mod predicates;
pub mod row;
pub mod test_utils;
pub mod trees;

pub use data_types::DataType;
pub use errors::*;
pub use optimizer::{Convergence, Optimizer, RuleBatch};

use expressions::{Attribute, Literal};
use row::Row;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize,
};

/// Rows produced by the reference evaluator, paired with the schema that
/// names them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub schema: Vec<Attribute>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn empty() -> Self {
        ResultSet {
            schema: vec![],
            rows: vec![],
        }
    }

    pub fn new(schema: Vec<Attribute>, rows: Vec<Row>) -> Self {
        ResultSet { schema, rows }
    }
}

pub struct RowWithSchema<'a> {
    pub row: &'a Row,
    pub schema: &'a [Attribute],
}

impl<'a> RowWithSchema<'a> {
    pub fn new(schema: &'a [Attribute], row: &'a Row) -> Self {
        Self { row, schema }
    }
}

impl Serialize for ResultSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for r in self.rows.iter() {
            seq.serialize_element(&RowWithSchema::new(&self.schema, r))?;
        }
        seq.end()
    }
}

impl<'a> Serialize for RowWithSchema<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for (idx, attr) in self.schema.iter().enumerate() {
            let value = self.row.get_field(idx).unwrap_or(Literal::Null);
            map.serialize_entry(&attr.name, &value)?;
        }
        map.end()
    }
}
