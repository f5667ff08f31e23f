use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Boolean,
    DateTime,
    /// The type of the untyped NULL literal. Comparable with every type.
    Null,
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Float32 | Self::Float64)
    }

    /// Whether two operand types are acceptable together for a comparison
    /// or same-type arithmetic operator. The analyzer inserts casts, so at
    /// this layer compatible means identical up to the NULL type.
    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        self == other || *self == DataType::Null || *other == DataType::Null
    }

    /// Admissibility of an explicit cast. Conservative: the cast-collapsing
    /// rewrite consults this before composing two casts, and an
    /// inadmissible chain is left alone rather than reshaped.
    pub fn can_cast(from: DataType, to: DataType) -> bool {
        if from == to || from == DataType::Null {
            return true;
        }
        match to {
            t if t.is_numeric() => from.is_numeric(),
            DataType::String => true,
            DataType::Boolean => from == DataType::Boolean,
            DataType::DateTime => matches!(from, DataType::String | DataType::DateTime),
            _ => false,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
