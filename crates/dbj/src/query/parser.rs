use tracing::debug;

use crate::error::{Error, QueryFault, Result};
use crate::query::ast::{CmpOp, Literal, LogicalOp, Predicate, Query, Token};
use crate::query::numeric::NumericExpr;
use crate::query::tokenizer::tokenize;

/// Parse and fully validate a query.
///
/// Every error a query can produce is raised here, before any document is
/// looked at: shape, logical operators, string operators and numeric parts.
pub fn parse_query(query: &str) -> Result<Query> {
    let tokens = tokenize(query)?;

    let n = tokens.len();
    if n < 3 || (n - 3) % 4 != 0 {
        return Err(Error::malformed_query(query, QueryFault::Shape { tokens: n }));
    }

    let connectives = tokens
        .iter()
        .skip(3)
        .step_by(4)
        .map(|token| {
            let op = match token {
                Token::Word(word) => LogicalOp::parse(word),
                Token::Quoted { .. } => None,
            };
            op.ok_or_else(|| {
                Error::malformed_query(query, QueryFault::LogicalOperator(token.to_string()))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let first = parse_predicate(&tokens[0..3])?;
    // each step is `connective field operator value`
    let rest = connectives
        .into_iter()
        .zip(tokens[3..].chunks_exact(4))
        .map(|(op, step)| Ok((op, parse_predicate(&step[1..])?)))
        .collect::<Result<Vec<_>>>()?;

    let parsed = Query { first, rest };
    debug!(query, predicates = parsed.predicate_count(), "parsed query");
    Ok(parsed)
}

/// Turn a `field operator value` triple into a predicate.
fn parse_predicate(triple: &[Token]) -> Result<Predicate> {
    let [field, op, value] = triple else {
        return Err(Error::invalid_argument(format!(
            "expected 3 tokens, found {}",
            triple.len()
        )));
    };
    let field = field.as_str();
    let op = op.as_str();

    match value.literal() {
        Literal::Quoted(text) => {
            let (exact, invert) = match CmpOp::parse(op) {
                Some(CmpOp::Eq) => (true, false),
                Some(CmpOp::Ne) => (true, true),
                Some(CmpOp::Contains) => (false, false),
                _ => {
                    return Err(Error::InvalidOperator {
                        field: field.to_string(),
                        operator: op.to_string(),
                    })
                }
            };
            Ok(Predicate::Text {
                field: field.to_string(),
                text,
                exact,
                invert,
            })
        }
        Literal::Bare(word) => {
            let expression = format!("{field} {op} {word}");
            NumericExpr::from_parts(&expression, field, op, &word).map(Predicate::Numeric)
        }
    }
}
