use serde::Serialize;

use crate::expressions::Literal;
use crate::{OptimizerError, OptimizerResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    fields: Vec<Literal>,
}

impl Row {
    pub fn new(fields: Vec<Literal>) -> Self {
        Row { fields }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn get_field(&self, index: usize) -> OptimizerResult<Literal> {
        match self.fields.get(index) {
            Some(literal) => Ok(literal.clone()),
            None => Err(OptimizerError::Evaluation(format!(
                "row field index {index} out of bound"
            ))),
        }
    }

    pub fn fields(&self) -> &[Literal] {
        &self.fields
    }

    pub fn concat(left: &Row, right: &Row) -> Row {
        let mut fields = Vec::with_capacity(left.num_fields() + right.num_fields());
        fields.extend_from_slice(&left.fields);
        fields.extend_from_slice(&right.fields);
        Row { fields }
    }
}
