use basalt_syntax::{SyntaxArena, SyntaxId, SyntaxKind, Token, TokenId};
use std::fmt::Debug;
use std::hash::Hash;

/// Identity of a rule invocation: the rule plus its full argument tuple.
/// Two invocations at the same token index merge into one frame exactly when
/// their identities compare equal, so equality must be structural.
pub(crate) trait Rule: Clone + Eq + Hash + Debug {
    /// Create a fresh suspended task for this invocation.
    fn spawn(&self) -> Box<dyn RuleTask<Self>>;
}

/// What a rule task declared when it suspended or finished.
#[derive(Debug)]
pub(crate) enum Step<C> {
    /// Clone this task into `n` siblings, resumed with indices `0..n`.
    Fork(u32),
    /// Block until the given rule resolves at the current token index.
    Parse(C),
    /// This task cannot continue. It stays resumable only for swallow mode.
    Error,
    /// Success, with the produced syntax node.
    Done(SyntaxId),
}

/// The value a task is resumed with, mirroring the suspension it declared.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Wake {
    /// First resumption of a fresh task.
    Start,
    /// The index of this sibling after a fork.
    Fork(u32),
    /// The syntax produced by the awaited rule; the cursor has been advanced
    /// past it.
    Parse(SyntaxId),
    /// Error recovery: continue best-effort past the declared error.
    Swallow,
}

/// A suspended rule body, reified as a resumable state machine. Cloning must
/// produce an equivalent task: a clone resumed independently behaves exactly
/// as the original would have.
pub(crate) trait RuleTask<C> {
    fn resume(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<C>;

    fn clone_task(&self) -> Box<dyn RuleTask<C>>;
}

/// The per-resumption view a rule body works through: the read-only token
/// stream at the fork's position, plus the shared arena for node creation.
pub(crate) struct ParseCursor<'a> {
    tokens: &'a [TokenId],
    pub(crate) arena: &'a mut SyntaxArena,
    index: usize,
}

impl<'a> ParseCursor<'a> {
    pub(crate) fn new(tokens: &'a [TokenId], arena: &'a mut SyntaxArena, index: usize) -> Self {
        Self {
            tokens,
            arena,
            index,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// The token at the current index plus `offset`. Peeking past the end of
    /// the stream yields the trailing `Eof` token.
    pub(crate) fn peek(&self, offset: usize) -> TokenId {
        let at = (self.index + offset).min(self.tokens.len() - 1);
        self.tokens[at]
    }

    pub(crate) fn peek_token(&self, offset: usize) -> &Token {
        self.arena.token(self.peek(offset))
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> SyntaxKind {
        self.peek_token(offset).kind()
    }

    /// Consume and return the current token.
    pub(crate) fn eat(&mut self) -> TokenId {
        debug_assert!(self.index < self.tokens.len(), "cannot eat past Eof");
        let token = self.peek(0);
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    /// Synthesize a `Missing` token recording the kind that was expected here
    /// and the token actually found. The stream does not advance.
    pub(crate) fn missing_token(&mut self, expected: SyntaxKind) -> TokenId {
        let actual = self.peek(0);
        let pos = self.arena.token(actual).pos();
        self.arena
            .alloc_token(Token::missing(expected, actual, pos))
    }
}
