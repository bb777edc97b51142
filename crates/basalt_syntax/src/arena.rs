use crate::expr::{Argument, ArgumentList, Expr};
use crate::kind::SyntaxKind;
use crate::node::{Token, Trivia};

/// Handle to any node in a [`SyntaxArena`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SyntaxId(u32);

impl SyntaxId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub struct $name(SyntaxId);

        impl $name {
            pub fn syntax(&self) -> SyntaxId {
                self.0
            }
        }

        impl From<$name> for SyntaxId {
            fn from(id: $name) -> SyntaxId {
                id.0
            }
        }
    };
}

typed_id!(
    /// Handle to a trivia node.
    TriviaId
);
typed_id!(
    /// Handle to a token node.
    TokenId
);
typed_id!(
    /// Handle to an expression node.
    ExprId
);
typed_id!(
    /// Handle to an argument node.
    ArgumentId
);
typed_id!(
    /// Handle to an argument-list node.
    ArgumentListId
);

/// A stable slice of text interned in the arena.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct StrRef {
    start: u32,
    len: u32,
}

impl StrRef {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }
}

/// An immutable span of child node ids allocated in the arena.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SyntaxList {
    start: u32,
    len: u32,
}

impl SyntaxList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }
}

/// The tagged union stored per node slot.
#[derive(Clone, Debug)]
pub enum SyntaxData {
    Trivia(Trivia),
    Token(Token),
    Expr(Expr),
    Argument(Argument),
    ArgumentList(ArgumentList),
}

impl SyntaxData {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxData::Trivia(trivia) => trivia.kind(),
            SyntaxData::Token(token) => token.kind(),
            SyntaxData::Expr(expr) => expr.kind(),
            SyntaxData::Argument(_) => SyntaxKind::ARGUMENT,
            SyntaxData::ArgumentList(_) => SyntaxKind::ARGUMENT_LIST,
        }
    }
}

/// Bulk storage for one lex/parse: every syntax node, every child list, and
/// every interned string. Nodes are addressed by id and never freed
/// individually; dropping the arena (the last `Arc` handle on it, in
/// practice) releases the whole tree at once.
#[derive(Debug, Default)]
pub struct SyntaxArena {
    nodes: Vec<SyntaxData>,
    children: Vec<SyntaxId>,
    strings: String,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, data: SyntaxData) -> SyntaxId {
        let id = SyntaxId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    pub fn alloc_trivia(&mut self, trivia: Trivia) -> TriviaId {
        TriviaId(self.alloc(SyntaxData::Trivia(trivia)))
    }

    pub fn alloc_token(&mut self, token: Token) -> TokenId {
        TokenId(self.alloc(SyntaxData::Token(token)))
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        ExprId(self.alloc(SyntaxData::Expr(expr)))
    }

    pub fn alloc_argument(&mut self, argument: Argument) -> ArgumentId {
        ArgumentId(self.alloc(SyntaxData::Argument(argument)))
    }

    pub fn alloc_argument_list(&mut self, list: ArgumentList) -> ArgumentListId {
        ArgumentListId(self.alloc(SyntaxData::ArgumentList(list)))
    }

    /// Allocate an immutable child list from an iterator of ids.
    pub fn alloc_list<I>(&mut self, ids: I) -> SyntaxList
    where
        I: IntoIterator<Item = SyntaxId>,
    {
        let start = self.children.len() as u32;
        self.children.extend(ids);
        SyntaxList {
            start,
            len: self.children.len() as u32 - start,
        }
    }

    /// Intern a string, returning a stable reference into the arena.
    pub fn intern(&mut self, text: &str) -> StrRef {
        let start = self.strings.len() as u32;
        self.strings.push_str(text);
        StrRef {
            start,
            len: text.len() as u32,
        }
    }

    /// Intern a string assembled from multiple parts without building an
    /// intermediate buffer.
    pub fn intern_parts<'a, I>(&mut self, parts: I) -> StrRef
    where
        I: IntoIterator<Item = &'a str>,
    {
        let start = self.strings.len() as u32;
        for part in parts {
            self.strings.push_str(part);
        }
        StrRef {
            start,
            len: self.strings.len() as u32 - start,
        }
    }

    pub fn node(&self, id: SyntaxId) -> &SyntaxData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: SyntaxId) -> SyntaxKind {
        self.node(id).kind()
    }

    pub fn trivia(&self, id: TriviaId) -> &Trivia {
        self.trivia_at(id.0)
    }

    pub fn trivia_at(&self, id: SyntaxId) -> &Trivia {
        match self.node(id) {
            SyntaxData::Trivia(trivia) => trivia,
            data => panic!("expected trivia node, found {:?}", data.kind()),
        }
    }

    pub fn token(&self, id: TokenId) -> &Token {
        match self.node(id.0) {
            SyntaxData::Token(token) => token,
            data => panic!("expected token node, found {:?}", data.kind()),
        }
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        match self.node(id.0) {
            SyntaxData::Expr(expr) => expr,
            data => panic!("expected expression node, found {:?}", data.kind()),
        }
    }

    pub fn argument(&self, id: ArgumentId) -> &Argument {
        self.argument_at(id.0)
    }

    pub fn argument_at(&self, id: SyntaxId) -> &Argument {
        match self.node(id) {
            SyntaxData::Argument(argument) => argument,
            data => panic!("expected argument node, found {:?}", data.kind()),
        }
    }

    pub fn argument_list(&self, id: ArgumentListId) -> &ArgumentList {
        match self.node(id.0) {
            SyntaxData::ArgumentList(list) => list,
            data => panic!("expected argument list node, found {:?}", data.kind()),
        }
    }

    /// Downcast an untyped id to an expression id, checking the slot.
    pub fn as_expr_id(&self, id: SyntaxId) -> ExprId {
        debug_assert!(matches!(self.node(id), SyntaxData::Expr(_)));
        ExprId(id)
    }

    pub fn as_argument_id(&self, id: SyntaxId) -> ArgumentId {
        debug_assert!(matches!(self.node(id), SyntaxData::Argument(_)));
        ArgumentId(id)
    }

    pub fn as_argument_list_id(&self, id: SyntaxId) -> ArgumentListId {
        debug_assert!(matches!(self.node(id), SyntaxData::ArgumentList(_)));
        ArgumentListId(id)
    }

    pub fn list(&self, list: SyntaxList) -> &[SyntaxId] {
        &self.children[list.start as usize..(list.start + list.len) as usize]
    }

    pub fn text(&self, text: StrRef) -> &str {
        &self.strings[text.start as usize..(text.start + text.len) as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Discard every node, list, and string while keeping the allocations.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.strings.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{Token, TokenPayload};
    use crate::pos::SourcePos;

    #[test]
    fn intern_is_stable() {
        let mut arena = SyntaxArena::new();
        let a = arena.intern("hello");
        let b = arena.intern_parts(["wo", "rld"]);
        assert_eq!(arena.text(a), "hello");
        assert_eq!(arena.text(b), "world");
        assert!(arena.intern("").is_empty());
    }

    #[test]
    fn lists_preserve_order() {
        let mut arena = SyntaxArena::new();
        let ids: Vec<SyntaxId> = (0..3)
            .map(|_| {
                arena
                    .alloc_token(Token::new(
                        SyntaxKind::COMMA,
                        SourcePos::default(),
                        SyntaxList::empty(),
                        SyntaxList::empty(),
                        TokenPayload::None,
                        None,
                    ))
                    .syntax()
            })
            .collect();
        let list = arena.alloc_list(ids.iter().copied());
        assert_eq!(arena.list(list), ids.as_slice());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn reset_releases_everything() {
        let mut arena = SyntaxArena::new();
        arena.intern("text");
        arena.alloc_token(Token::new(
            SyntaxKind::EOF,
            SourcePos::default(),
            SyntaxList::empty(),
            SyntaxList::empty(),
            TokenPayload::None,
            None,
        ));
        arena.reset();
        assert_eq!(arena.node_count(), 0);
    }
}
