use std::fmt;

use crate::document::KeySet;
use crate::query::numeric::NumericExpr;

/// Quote form that delimits a string literal.
///
/// The doubled form (`""...""`) lets a literal contain single `"` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Single,
    Doubled,
}

impl Delimiter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Delimiter::Single => "\"",
            Delimiter::Doubled => "\"\"",
        }
    }

    pub const fn width(self) -> usize {
        self.as_str().len()
    }
}

/// Lexical unit of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Field name, operator, bare number or logical keyword.
    Word(String),
    /// String literal; `raw` still carries its delimiters.
    Quoted { raw: String, delimiter: Delimiter },
}

impl Token {
    /// The token exactly as written in the query.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(word) => word,
            Token::Quoted { raw, .. } => raw,
        }
    }

    /// The token as a comparison value, with delimiters stripped.
    pub fn literal(&self) -> Literal {
        match self {
            Token::Word(word) => Literal::Bare(word.clone()),
            Token::Quoted { raw, delimiter } => {
                let width = delimiter.width();
                let text = raw
                    .get(width..raw.len().saturating_sub(width))
                    .unwrap_or_default();
                Literal::Quoted(text.to_string())
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Quoted(String),
    Bare(String),
}

/// Comparison operators of the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `?=`, substring match; strings only.
    Contains,
}

impl CmpOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            "?=" => Some(CmpOp::Contains),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Contains => "?=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connective between two comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Case-insensitive: `and`, `AND` and `And` are the same operator.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("and") {
            Some(LogicalOp::And)
        } else if s.eq_ignore_ascii_case("or") {
            Some(LogicalOp::Or)
        } else {
            None
        }
    }

    /// `and` keeps keys present in both sets, `or` keeps keys in either.
    ///
    /// The order of `acc` is preserved; `or` appends new keys from `next`.
    pub fn combine(self, mut acc: KeySet, next: KeySet) -> KeySet {
        match self {
            LogicalOp::And => {
                acc.retain(|key| next.contains(key));
                acc
            }
            LogicalOp::Or => {
                acc.extend(next);
                acc
            }
        }
    }
}

/// A single validated comparison, ready to run against a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Text {
        field: String,
        text: String,
        exact: bool,
        invert: bool,
    },
    Numeric(NumericExpr),
}

/// A parsed query: comparisons folded strictly left to right.
///
/// `first <op1> p1 <op2> p2 ...` evaluates as `((first op1 p1) op2 p2) ...`;
/// there is no precedence between `and` and `or`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub first: Predicate,
    pub rest: Vec<(LogicalOp, Predicate)>,
}

impl Query {
    pub fn predicate_count(&self) -> usize {
        1 + self.rest.len()
    }
}

/// Options for [`find`](crate::query::find).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub case_sensitive: bool,
    pub fold_diacritics: bool,
    pub sort_by: Option<String>,
    pub reverse: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            fold_diacritics: true,
            sort_by: None,
            reverse: false,
        }
    }
}

impl FindOptions {
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn fold_diacritics(mut self, yes: bool) -> Self {
        self.fold_diacritics = yes;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, reverse: bool) -> Self {
        self.sort_by = Some(field.into());
        self.reverse = reverse;
        self
    }
}
