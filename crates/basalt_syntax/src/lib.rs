//! Syntax definitions for the Basalt expression language: the flat kind
//! enumeration, trivia and token nodes, expression nodes, the arena they all
//! live in, and the owning token-list / syntax-tree containers.

mod arena;
mod error;
mod expr;
mod kind;
mod node;
mod pos;
pub mod printer;
mod rational;
mod tree;

pub use arena::{
    ArgumentId, ArgumentListId, ExprId, StrRef, SyntaxArena, SyntaxData, SyntaxId, SyntaxList,
    TokenId, TriviaId,
};
pub use error::LexError;
pub use expr::{
    AccessOperator, Argument, ArgumentList, BinaryOperator, Expr, InvokeOperator, UnaryOperator,
};
pub use kind::{keyword_from_str, SyntaxKind};
pub use node::{Newline, Token, TokenPayload, Trivia};
pub use pos::SourcePos;
pub use rational::Rational;
pub use tree::{SyntaxTree, TokenList};
