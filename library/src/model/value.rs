//! The payload carried by signals between node ports.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A value produced on an output port or received on an input port.
///
/// Absence (an unconnected port, or a producer that has not run yet) is
/// represented by `Option<Value>::None`, never by a variant of this enum.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Floating point scalar
    Number(OrderedFloat<f64>),
    /// Integer scalar
    Integer(i64),
    /// Boolean flag
    Boolean(bool),
    /// Text string
    Text(String),
    /// 1D array
    Vector(Vec<f64>),
    /// 2D array in row-major order
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    },
}

impl Value {
    pub fn number(v: f64) -> Self {
        Value::Number(OrderedFloat(v))
    }

    pub fn text(s: &str) -> Self {
        Value::Text(s.to_string())
    }

    /// Build a matrix, returning `None` when `data` does not fit `rows * cols`.
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (rows * cols == data.len()).then_some(Value::Matrix { rows, cols, data })
    }

    /// Extract as a float. Integers are widened.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(v.0),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Multiply every numeric element by `factor`.
    pub fn scaled(&self, factor: f64) -> Option<Value> {
        match self {
            Value::Number(v) => Some(Value::number(v.0 * factor)),
            Value::Integer(v) => Some(Value::number(*v as f64 * factor)),
            Value::Vector(data) => Some(Value::Vector(data.iter().map(|x| x * factor).collect())),
            Value::Matrix { rows, cols, data } => Some(Value::Matrix {
                rows: *rows,
                cols: *cols,
                data: data.iter().map(|x| x * factor).collect(),
            }),
            _ => None,
        }
    }

    /// Element-wise sum. Integer + Integer stays integral; shapes must match.
    pub fn sum(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.checked_add(*b).map(Value::Integer),
            (Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Some(Value::Vector(
                a.iter().zip(b).map(|(x, y)| x + y).collect(),
            )),
            (
                Value::Matrix { rows, cols, data: a },
                Value::Matrix {
                    rows: r2,
                    cols: c2,
                    data: b,
                },
            ) if rows == r2 && cols == c2 => Some(Value::Matrix {
                rows: *rows,
                cols: *cols,
                data: a.iter().zip(b).map(|(x, y)| x + y).collect(),
            }),
            (a, b) => Some(Value::number(a.as_number()? + b.as_number()?)),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}
