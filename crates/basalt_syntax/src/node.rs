use crate::arena::{StrRef, SyntaxArena, SyntaxList, TokenId};
use crate::error::LexError;
use crate::kind::SyntaxKind;
use crate::pos::SourcePos;
use crate::rational::Rational;

/// The newline sequence that ended a piece of trivia, if any. Only whitespace
/// and line-comment trivia can carry one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Newline {
    #[default]
    None,
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::None => "",
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Newline::None)
    }
}

/// A lexeme with no syntactic meaning: whitespace, comments, and runs of
/// illegal bytes. Trivia is preserved so that a token stream reproduces its
/// source byte-for-byte.
#[derive(Clone, Debug)]
pub struct Trivia {
    kind: SyntaxKind,
    pos: SourcePos,
    content: StrRef,
    newline: Newline,
    error: Option<LexError>,
}

impl Trivia {
    pub fn new(
        kind: SyntaxKind,
        pos: SourcePos,
        content: StrRef,
        newline: Newline,
        error: Option<LexError>,
    ) -> Self {
        debug_assert!(kind.is_trivia());
        Self {
            kind,
            pos,
            content,
            newline,
            error,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn pos(&self) -> SourcePos {
        self.pos
    }

    pub fn content<'a>(&self, arena: &'a SyntaxArena) -> &'a str {
        arena.text(self.content)
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    pub fn error(&self) -> Option<LexError> {
        self.error
    }

    /// Write the exact source text of this trivia, reconstructing the
    /// delimiters that the stored content omits.
    pub fn write_text(&self, arena: &SyntaxArena, out: &mut String) {
        match self.kind {
            SyntaxKind::WHITESPACE_TRIVIA | SyntaxKind::ERROR_CHAR_TRIVIA => {
                out.push_str(self.content(arena));
                out.push_str(self.newline.as_str());
            }
            SyntaxKind::LINE_COMMENT_TRIVIA => {
                out.push_str("//");
                out.push_str(self.content(arena));
                out.push_str(self.newline.as_str());
            }
            SyntaxKind::BLOCK_COMMENT_TRIVIA => {
                out.push_str("/*");
                out.push_str(self.content(arena));
                if self.error != Some(LexError::OpenBlockComment) {
                    out.push_str("*/");
                }
            }
            _ => unreachable!("trivia node with non-trivia kind {:?}", self.kind),
        }
    }
}

/// The kind-specific payload of a token. Symbols, keywords, and `Eof` are
/// fully identified by their kind and carry nothing.
#[derive(Clone, Debug)]
pub enum TokenPayload {
    None,
    Name {
        text: StrRef,
        /// True when the name was written with the `@` prefix, which bypasses
        /// keyword resolution.
        verbatim: bool,
    },
    CharLiteral {
        raw: StrRef,
        value: StrRef,
        suffix: Option<TokenId>,
    },
    StringLiteral {
        raw: StrRef,
        value: StrRef,
        suffix: Option<TokenId>,
    },
    NumericLiteral {
        raw: StrRef,
        value: Rational,
        suffix: Option<TokenId>,
    },
    Missing {
        expected: SyntaxKind,
        actual: TokenId,
    },
}

/// A significant lexeme together with the trivia attached around it. Leading
/// trivia is everything gathered since the previous token's trailing trivia
/// ended; trailing trivia runs to the end of the token's line at most.
#[derive(Clone, Debug)]
pub struct Token {
    kind: SyntaxKind,
    pos: SourcePos,
    leading: SyntaxList,
    trailing: SyntaxList,
    payload: TokenPayload,
    error: Option<LexError>,
}

impl Token {
    pub fn new(
        kind: SyntaxKind,
        pos: SourcePos,
        leading: SyntaxList,
        trailing: SyntaxList,
        payload: TokenPayload,
        error: Option<LexError>,
    ) -> Self {
        debug_assert!(kind.is_token() || kind == SyntaxKind::MISSING || kind == SyntaxKind::EOF);
        Self {
            kind,
            pos,
            leading,
            trailing,
            payload,
            error,
        }
    }

    pub fn missing(expected: SyntaxKind, actual: TokenId, pos: SourcePos) -> Self {
        Self {
            kind: SyntaxKind::MISSING,
            pos,
            leading: SyntaxList::empty(),
            trailing: SyntaxList::empty(),
            payload: TokenPayload::Missing { expected, actual },
            error: None,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn pos(&self) -> SourcePos {
        self.pos
    }

    pub fn leading(&self) -> SyntaxList {
        self.leading
    }

    pub fn trailing(&self) -> SyntaxList {
        self.trailing
    }

    pub fn payload(&self) -> &TokenPayload {
        &self.payload
    }

    pub fn error(&self) -> Option<LexError> {
        self.error
    }

    pub fn is_missing(&self) -> bool {
        self.kind == SyntaxKind::MISSING
    }

    /// The word content of a name or keyword token, without any `@` prefix.
    pub fn word_text<'a>(&self, arena: &'a SyntaxArena) -> Option<&'a str> {
        match &self.payload {
            TokenPayload::Name { text, .. } => Some(arena.text(*text)),
            _ => self.kind.static_text().filter(|_| self.kind.is_keyword()),
        }
    }

    pub fn is_verbatim(&self) -> bool {
        matches!(self.payload, TokenPayload::Name { verbatim: true, .. })
    }

    pub fn numeric_value(&self) -> Option<Rational> {
        match &self.payload {
            TokenPayload::NumericLiteral { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn literal_value<'a>(&self, arena: &'a SyntaxArena) -> Option<&'a str> {
        match &self.payload {
            TokenPayload::CharLiteral { value, .. } | TokenPayload::StringLiteral { value, .. } => {
                Some(arena.text(*value))
            }
            _ => None,
        }
    }

    pub fn suffix(&self) -> Option<TokenId> {
        match &self.payload {
            TokenPayload::CharLiteral { suffix, .. }
            | TokenPayload::StringLiteral { suffix, .. }
            | TokenPayload::NumericLiteral { suffix, .. } => *suffix,
            _ => None,
        }
    }

    /// Write the exact source text of the token itself, excluding trivia. The
    /// literal payloads keep their raw spelling for this purpose; missing
    /// tokens have no source text at all.
    pub fn write_lexeme(&self, arena: &SyntaxArena, out: &mut String) {
        match &self.payload {
            TokenPayload::None => {
                if let Some(text) = self.kind.static_text() {
                    out.push_str(text);
                }
            }
            TokenPayload::Name { text, verbatim } => {
                if *verbatim {
                    out.push('@');
                }
                out.push_str(arena.text(*text));
            }
            TokenPayload::CharLiteral { raw, suffix, .. }
            | TokenPayload::StringLiteral { raw, suffix, .. }
            | TokenPayload::NumericLiteral { raw, suffix, .. } => {
                out.push_str(arena.text(*raw));
                if let Some(suffix) = suffix {
                    arena.token(*suffix).write_lexeme(arena, out);
                }
            }
            TokenPayload::Missing { .. } => {}
        }
    }

    /// Write leading trivia, the lexeme, and trailing trivia, reproducing the
    /// token's full span of the source.
    pub fn write_text(&self, arena: &SyntaxArena, out: &mut String) {
        for id in arena.list(self.leading) {
            arena.trivia_at(*id).write_text(arena, out);
        }
        self.write_lexeme(arena, out);
        for id in arena.list(self.trailing) {
            arena.trivia_at(*id).write_text(arena, out);
        }
    }
}
