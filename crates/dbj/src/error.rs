use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid query \"{query}\": {fault}")]
    MalformedQuery { query: String, fault: QueryFault },

    #[error("invalid expression \"{expression}\": {fault}")]
    MalformedExpression {
        expression: String,
        fault: ExpressionFault,
    },

    /// An operator that has no meaning for a quoted string value, e.g. `<`.
    #[error("invalid string operator \"{operator}\" on field \"{field}\"")]
    InvalidOperator { field: String, operator: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// What exactly is wrong with a malformed query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryFault {
    #[error("expected `field operator value` clauses joined by and/or, found {tokens} tokens")]
    Shape { tokens: usize },

    #[error("invalid logical operator \"{0}\"")]
    LogicalOperator(String),

    #[error("unterminated string literal {0}")]
    UnterminatedLiteral(String),
}

/// What exactly is wrong with a malformed numeric expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionFault {
    #[error("expected `field operator number`, found {0} parts")]
    TokenCount(usize),

    #[error("invalid number operator \"{0}\"")]
    Operator(String),

    #[error("invalid number \"{0}\"")]
    Number(String),
}

impl Error {
    #[inline]
    pub fn malformed_query(query: impl Into<String>, fault: QueryFault) -> Self {
        Error::MalformedQuery {
            query: query.into(),
            fault,
        }
    }

    #[inline]
    pub fn malformed_expression(expression: impl Into<String>, fault: ExpressionFault) -> Self {
        Error::MalformedExpression {
            expression: expression.into(),
            fault,
        }
    }

    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
