mod grammar;
mod runtime;
mod task;

pub use runtime::ParseMetrics;

use basalt_syntax::{SourcePos, SyntaxArena, SyntaxId, TokenId};
use grammar::{Flags, Precedence, RuleCall};
use thiserror::Error;

/// Terminal parse failure: the runtime exhausted its error retries. The
/// position is that of the deepest error witness.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("cannot parse an expression at {pos}")]
pub struct ParseError {
    pub pos: SourcePos,
    pub token_index: usize,
}

/// Parse one expression spanning the whole token stream, rooted so that
/// anything left before `Eof` is an error.
pub(crate) fn parse_root(
    tokens: &[TokenId],
    arena: &mut SyntaxArena,
) -> (Result<SyntaxId, ParseError>, ParseMetrics) {
    let call = RuleCall::Root {
        flags: Flags::empty(),
        precedence: Precedence::Expression,
    };
    let (result, metrics) = runtime::parse_core(tokens, arena, call);
    let result = result.map_err(|witness| {
        let token_index = (witness as usize).min(tokens.len() - 1);
        ParseError {
            pos: arena.token(tokens[token_index]).pos(),
            token_index,
        }
    });
    (result, metrics)
}
