use crate::error::{Error, QueryFault, Result};
use crate::query::ast::{Delimiter, Token};

/// Split a query into tokens.
///
/// Tokens are separated by spaces, except inside string literals:
/// - `"..."` is a literal in the single form,
/// - `""...""` is a literal in the doubled form, which may itself contain `"`.
///
/// A literal spanning several space-separated pieces is re-joined with one
/// space per separator, so runs of spaces inside a literal survive. A literal
/// left open at the end of the query is an error.
pub fn tokenize(query: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut open: Option<(String, Delimiter)> = None;

    for piece in query.split(' ') {
        match open.take() {
            Some((mut raw, delimiter)) => {
                raw.push(' ');
                raw.push_str(piece);
                if piece.ends_with(delimiter.as_str()) {
                    tokens.push(Token::Quoted { raw, delimiter });
                } else {
                    open = Some((raw, delimiter));
                }
            }
            None => {
                if piece.is_empty() {
                    continue;
                }
                match opening_delimiter(piece) {
                    None => tokens.push(Token::Word(piece.to_string())),
                    Some(delimiter) if is_self_contained(piece, delimiter) => {
                        tokens.push(Token::Quoted {
                            raw: piece.to_string(),
                            delimiter,
                        });
                    }
                    Some(delimiter) => open = Some((piece.to_string(), delimiter)),
                }
            }
        }
    }

    if let Some((raw, _)) = open {
        return Err(Error::malformed_query(
            query,
            QueryFault::UnterminatedLiteral(raw),
        ));
    }

    Ok(tokens)
}

fn opening_delimiter(piece: &str) -> Option<Delimiter> {
    // A bare `""` is the empty literal, not the start of a doubled one.
    if piece == Delimiter::Doubled.as_str() {
        Some(Delimiter::Single)
    } else if piece.starts_with(Delimiter::Doubled.as_str()) {
        Some(Delimiter::Doubled)
    } else if piece.starts_with(Delimiter::Single.as_str()) {
        Some(Delimiter::Single)
    } else {
        None
    }
}

fn is_self_contained(piece: &str, delimiter: Delimiter) -> bool {
    piece.len() >= 2 * delimiter.width() && piece.ends_with(delimiter.as_str())
}
