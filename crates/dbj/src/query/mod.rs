//! Query engine: text and numeric predicates, the `and`/`or` query language
//! and sorting of result keys.
//!
//! Everything here only borrows a [`StoreView`](crate::store::StoreView).

pub mod ast;
pub mod eval;
pub mod numeric;
pub mod parser;
pub mod sort;
pub mod text;
pub mod tokenizer;

pub use ast::{CmpOp, Delimiter, FindOptions, Literal, LogicalOp, Predicate, Query, Token};
pub use eval::{eval_predicate, eval_query, find};
pub use numeric::{coerce_number, find_num, find_num_expr, NumOp, NumericExpr};
pub use parser::parse_query;
pub use sort::{compare_values, sort};
pub use text::{find_text, fold_diacritics, TextMatch};
pub use tokenizer::tokenize;
