//! Runtime values produced while evaluating a script.
//!
//! A series used where a scalar is expected collapses to its latest point.
//! Missing data travels as `Undefined` and turns every comparison false.

use std::fmt;
use std::sync::Arc;

use crate::domain::error::EvalError;
use crate::domain::expr::BinaryOp;
use crate::domain::series::SeriesSource;

/// Tolerance for `==` and `!=` between numbers.
pub const EQUALITY_EPSILON: f64 = 1e-4;

/// Tail-aligned series; `source` is set only when the points are a context
/// series verbatim, which makes indicator calls over it cacheable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesValue {
    pub points: Arc<[f64]>,
    pub source: Option<SeriesSource>,
}

impl SeriesValue {
    pub fn derived(points: impl Into<Arc<[f64]>>) -> Self {
        Self {
            points: points.into(),
            source: None,
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Series(SeriesValue),
    Undefined,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Text(_) => "string",
            Value::Series(_) => "series",
            Value::Undefined => "undefined",
        }
    }

    /// Collapse a series to its latest point; an empty series is undefined.
    pub fn to_scalar(&self) -> Value {
        match self {
            Value::Series(s) => s.latest().map_or(Value::Undefined, Value::Number),
            other => other.clone(),
        }
    }

    /// Numeric reading of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Series(s) => s.latest(),
            _ => None,
        }
    }

    /// Truthiness; `None` stands for undefined.
    pub fn truthy(&self, op: &'static str) -> Result<Option<bool>, EvalError> {
        match self.to_scalar() {
            Value::Bool(b) => Ok(Some(b)),
            Value::Number(n) => Ok(Some(n != 0.0)),
            Value::Undefined => Ok(None),
            other => Err(EvalError::TypeMismatch {
                op,
                left: other.type_name(),
                right: "bool",
            }),
        }
    }

    /// `self[offset]`: the series shifted back by `offset` points.
    pub fn index(&self, offset: usize) -> Result<Value, EvalError> {
        match self {
            Value::Series(s) if offset < s.points.len() => Ok(Value::Series(SeriesValue::derived(
                &s.points[..s.points.len() - offset],
            ))),
            Value::Series(_) | Value::Undefined => Ok(Value::Undefined),
            Value::Number(n) if offset == 0 => Ok(Value::Number(*n)),
            other => Err(EvalError::TypeMismatch {
                op: "[]",
                left: other.type_name(),
                right: "index",
            }),
        }
    }

    pub fn negate(&self) -> Result<Value, EvalError> {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Series(s) => Ok(Value::Series(SeriesValue::derived(
                s.points.iter().map(|v| -v).collect::<Vec<_>>(),
            ))),
            Value::Undefined => Ok(Value::Undefined),
            other => Err(EvalError::TypeMismatch {
                op: "-",
                left: other.type_name(),
                right: "number",
            }),
        }
    }

    /// `+ - * /`, element-wise over series (common tail) and broadcasting numbers.
    pub fn arithmetic(&self, op: BinaryOp, rhs: &Value) -> Result<Value, EvalError> {
        let apply = |a: f64, b: f64| apply_arithmetic(op, a, b);
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(*a, *b))),
            (Value::Series(a), Value::Number(b)) => Ok(Value::Series(SeriesValue::derived(
                a.points.iter().map(|&x| apply(x, *b)).collect::<Vec<_>>(),
            ))),
            (Value::Number(a), Value::Series(b)) => Ok(Value::Series(SeriesValue::derived(
                b.points.iter().map(|&y| apply(*a, y)).collect::<Vec<_>>(),
            ))),
            (Value::Series(a), Value::Series(b)) => {
                let len = a.points.len().min(b.points.len());
                let left = &a.points[a.points.len() - len..];
                let right = &b.points[b.points.len() - len..];
                Ok(Value::Series(SeriesValue::derived(
                    left.iter()
                        .zip(right)
                        .map(|(&x, &y)| apply(x, y))
                        .collect::<Vec<_>>(),
                )))
            }
            (
                Value::Undefined,
                Value::Number(_) | Value::Series(_) | Value::Undefined,
            )
            | (Value::Number(_) | Value::Series(_), Value::Undefined) => Ok(Value::Undefined),
            (left, right) => Err(EvalError::TypeMismatch {
                op: op.symbol(),
                left: left.type_name(),
                right: right.type_name(),
            }),
        }
    }

    /// Comparison of the scalar readings of both sides.
    pub fn compare(&self, op: BinaryOp, rhs: &Value) -> Result<Value, EvalError> {
        let result = match (self.to_scalar(), rhs.to_scalar()) {
            (Value::Undefined, _) | (_, Value::Undefined) => false,
            (Value::Number(a), Value::Number(b)) => match op {
                BinaryOp::Eq => (a - b).abs() < EQUALITY_EPSILON,
                BinaryOp::Ne => (a - b).abs() >= EQUALITY_EPSILON,
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::Ge => a >= b,
                _ => return Err(mismatch(op, "number", "number")),
            },
            (Value::Bool(a), Value::Bool(b)) => match op {
                BinaryOp::Eq => a == b,
                BinaryOp::Ne => a != b,
                _ => return Err(mismatch(op, "bool", "bool")),
            },
            (Value::Text(a), Value::Text(b)) => match op {
                BinaryOp::Eq => a == b,
                BinaryOp::Ne => a != b,
                _ => return Err(mismatch(op, "string", "string")),
            },
            (left, right) => return Err(mismatch(op, left.type_name(), right.type_name())),
        };
        Ok(Value::Bool(result))
    }
}

fn mismatch(op: BinaryOp, left: &'static str, right: &'static str) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        left,
        right,
    }
}

/// Division by zero yields 0.
fn apply_arithmetic(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => 0.0,
        BinaryOp::Div => a / b,
        _ => f64::NAN,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Series(s) => match s.latest() {
                Some(last) => write!(f, "series[{}] (latest {})", s.points.len(), last),
                None => write!(f, "series[0]"),
            },
            Value::Undefined => write!(f, "undefined"),
        }
    }
}
