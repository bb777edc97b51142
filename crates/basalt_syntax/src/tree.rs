use crate::arena::{SyntaxArena, SyntaxId, TokenId};
use crate::kind::SyntaxKind;
use crate::node::Token;
use std::sync::Arc;

/// The ordered token sequence of one lexed source, terminated by an `Eof`
/// token. The list shares ownership of the arena holding the tokens, so it
/// stays valid independently of any tree parsed from it.
#[derive(Clone, Debug)]
pub struct TokenList {
    arena: Arc<SyntaxArena>,
    tokens: Vec<TokenId>,
}

impl TokenList {
    pub fn new(arena: Arc<SyntaxArena>, tokens: Vec<TokenId>) -> Self {
        debug_assert!(
            tokens
                .last()
                .is_some_and(|last| arena.token(*last).kind() == SyntaxKind::EOF),
            "token list must be terminated by an Eof token"
        );
        Self { arena, tokens }
    }

    pub fn arena(&self) -> &Arc<SyntaxArena> {
        &self.arena
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn ids(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> &Token {
        self.arena.token(self.tokens[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|id| self.arena.token(*id))
    }

    /// Reassemble the original source byte-for-byte from the trivia and
    /// lexemes of every token in order.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        for token in self.iter() {
            token.write_text(&self.arena, &mut out);
        }
        out
    }
}

/// A parsed syntax tree together with the arena that owns its nodes. The
/// arena is shared by reference count, so a `TokenList` over the same source
/// and this tree can outlive one another in either order.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    arena: Arc<SyntaxArena>,
    root: SyntaxId,
}

impl SyntaxTree {
    pub fn new(arena: Arc<SyntaxArena>, root: SyntaxId) -> Self {
        Self { arena, root }
    }

    pub fn arena(&self) -> &Arc<SyntaxArena> {
        &self.arena
    }

    pub fn root(&self) -> SyntaxId {
        self.root
    }

    pub fn root_kind(&self) -> SyntaxKind {
        self.arena.kind(self.root)
    }
}
