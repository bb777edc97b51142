//! Lexer and parser for the Basalt expression language.
//!
//! The lexer produces a trivia-preserving token stream; the parser drives a
//! generalized recursive-descent runtime whose rules can fork into parallel
//! alternatives, with memoization keyed on token position and rule identity
//! selecting the best alternative per fork.

use basalt_syntax::{SyntaxArena, SyntaxTree, TokenList};
use std::sync::Arc;

mod lexer;
mod parser;

pub use parser::{ParseError, ParseMetrics};

/// Lex the source into an owning token list. The list ends with an `Eof`
/// token and reproduces the source byte-for-byte through its trivia.
pub fn lex(source: &str) -> TokenList {
    let mut arena = SyntaxArena::new();
    let tokens = lexer::lex_into(source, &mut arena);
    TokenList::new(Arc::new(arena), tokens)
}

/// Lex and parse a single expression occupying the entire input.
pub fn parse_expression(source: &str) -> Result<SyntaxTree, ParseError> {
    parse_expression_with_metrics(source).0
}

/// Like [`parse_expression`], also returning the runtime counters of the
/// parse, for tests and tooling that watch fork behavior.
pub fn parse_expression_with_metrics(
    source: &str,
) -> (Result<SyntaxTree, ParseError>, ParseMetrics) {
    let mut arena = SyntaxArena::new();
    let tokens = lexer::lex_into(source, &mut arena);
    let (result, metrics) = parser::parse_root(&tokens, &mut arena);
    let arena = Arc::new(arena);
    (
        result.map(|root| SyntaxTree::new(arena, root)),
        metrics,
    )
}
