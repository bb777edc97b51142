use thiserror::Error;

/// A structural lexing error, recorded on the token or trivia it occurred in.
/// Lexing always continues past these; the carrying node holds the best-effort
/// value that was recovered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum LexError {
    #[error("block comment is not terminated before the end of input")]
    OpenBlockComment,
    #[error("character literal is not terminated")]
    OpenCharLiteral,
    #[error("string literal is not terminated")]
    OpenStringLiteral,
    #[error("newline inside a string literal")]
    NewlineInStringLiteral,
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
    #[error("numeric exponent has no digits")]
    InvalidNumericExponent,
}
