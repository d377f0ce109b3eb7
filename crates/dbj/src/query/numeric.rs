use std::fmt;
use std::str::FromStr;

use serde_json::Value as Json;
use tracing::debug;

use crate::document::KeySet;
use crate::error::{Error, ExpressionFault, Result};
use crate::store::StoreView;

/// Comparison operators valid in a numeric expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl NumOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(NumOp::Eq),
            "!=" => Some(NumOp::Ne),
            "<" => Some(NumOp::Lt),
            "<=" => Some(NumOp::Le),
            ">" => Some(NumOp::Gt),
            ">=" => Some(NumOp::Ge),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NumOp::Eq => "==",
            NumOp::Ne => "!=",
            NumOp::Lt => "<",
            NumOp::Le => "<=",
            NumOp::Gt => ">",
            NumOp::Ge => ">=",
        }
    }

    /// `lhs <op> rhs` with IEEE semantics (NaN only satisfies `!=`).
    #[allow(clippy::float_cmp)]
    pub fn test(self, lhs: f64, rhs: f64) -> bool {
        match self {
            NumOp::Eq => lhs == rhs,
            NumOp::Ne => lhs != rhs,
            NumOp::Lt => lhs < rhs,
            NumOp::Le => lhs <= rhs,
            NumOp::Gt => lhs > rhs,
            NumOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for NumOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `field operator number` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericExpr {
    pub field: String,
    pub op: NumOp,
    pub number: f64,
}

impl NumericExpr {
    /// Build from the three parts of an expression already split apart.
    ///
    /// `expression` is only used to give errors their context.
    pub fn from_parts(expression: &str, field: &str, op: &str, number: &str) -> Result<Self> {
        let op = NumOp::parse(op).ok_or_else(|| {
            Error::malformed_expression(expression, ExpressionFault::Operator(op.to_string()))
        })?;
        let number = number.parse::<f64>().map_err(|_| {
            Error::malformed_expression(expression, ExpressionFault::Number(number.to_string()))
        })?;
        Ok(Self {
            field: field.to_string(),
            op,
            number,
        })
    }

    /// Whether a field value satisfies the comparison.
    pub fn matches(&self, value: &Json) -> bool {
        coerce_number(value).is_some_and(|n| self.op.test(n, self.number))
    }
}

impl FromStr for NumericExpr {
    type Err = Error;

    fn from_str(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        match parts.as_slice() {
            [field, op, number] => Self::from_parts(expression, field, op, number),
            _ => Err(Error::malformed_expression(
                expression,
                ExpressionFault::TokenCount(parts.len()),
            )),
        }
    }
}

impl fmt::Display for NumericExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.number)
    }
}

/// Numeric reading of a field value.
///
/// Numbers are taken as is and strings are parsed after trimming. Anything
/// else has no numeric reading.
pub fn coerce_number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Keys whose field satisfies `expression` (`"field operator number"`).
///
/// Documents lacking the field, or whose value has no numeric reading, are
/// skipped.
pub fn find_num<S: StoreView + ?Sized>(store: &S, expression: &str) -> Result<KeySet> {
    let expr: NumericExpr = expression.parse()?;
    Ok(find_num_expr(store, &expr))
}

/// [`find_num`] for an expression that is already parsed.
pub fn find_num_expr<S: StoreView + ?Sized>(store: &S, expr: &NumericExpr) -> KeySet {
    let keys: KeySet = store
        .entries()
        .filter(|(_, doc)| doc.get(&expr.field).is_some_and(|v| expr.matches(v)))
        .map(|(key, _)| key.to_string())
        .collect();
    debug!(expression = %expr, matched = keys.len(), "numeric scan");
    keys
}
