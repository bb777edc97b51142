use crate::arena::{ArgumentListId, ExprId, SyntaxList, TokenId};
use crate::kind::SyntaxKind;

/// Unary operators, prefix and postfix. The discriminator doubles as the
/// syntax kind of the expression node it produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Addressof,
    Await,
    Indirection,
    LogicalNot,
    Minus,
    Not,
    Nullable,
    Plus,
    Pointer,
    PostfixDecrement,
    PostfixIncrement,
    PostfixEllipsis,
    PrefixDecrement,
    PrefixIncrement,
    Reference,
}

impl UnaryOperator {
    pub const fn syntax_kind(&self) -> SyntaxKind {
        match self {
            UnaryOperator::Addressof => SyntaxKind::ADDRESSOF_EXPRESSION,
            UnaryOperator::Await => SyntaxKind::AWAIT_EXPRESSION,
            UnaryOperator::Indirection => SyntaxKind::INDIRECTION_EXPRESSION,
            UnaryOperator::LogicalNot => SyntaxKind::LOGICAL_NOT_EXPRESSION,
            UnaryOperator::Minus => SyntaxKind::MINUS_EXPRESSION,
            UnaryOperator::Not => SyntaxKind::NOT_EXPRESSION,
            UnaryOperator::Nullable => SyntaxKind::NULLABLE_EXPRESSION,
            UnaryOperator::Plus => SyntaxKind::PLUS_EXPRESSION,
            UnaryOperator::Pointer => SyntaxKind::POINTER_EXPRESSION,
            UnaryOperator::PostfixDecrement => SyntaxKind::POSTFIX_DECREMENT_EXPRESSION,
            UnaryOperator::PostfixIncrement => SyntaxKind::POSTFIX_INCREMENT_EXPRESSION,
            UnaryOperator::PostfixEllipsis => SyntaxKind::POSTFIX_ELLIPSIS_EXPRESSION,
            UnaryOperator::PrefixDecrement => SyntaxKind::PREFIX_DECREMENT_EXPRESSION,
            UnaryOperator::PrefixIncrement => SyntaxKind::PREFIX_INCREMENT_EXPRESSION,
            UnaryOperator::Reference => SyntaxKind::REFERENCE_EXPRESSION,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Addition,
    AdditionAssignment,
    And,
    AndAssignment,
    Assignment,
    Division,
    DivisionAssignment,
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    Modulo,
    ModuloAssignment,
    Multiplication,
    MultiplicationAssignment,
    NotAssignment,
    NotEqual,
    Coalescing,
    LeftShift,
    LeftShiftAssignment,
    LessThan,
    LessThanOrEqual,
    LogicalAnd,
    LogicalOr,
    Or,
    OrAssignment,
    RightShift,
    RightShiftAssignment,
    Subtraction,
    SubtractionAssignment,
    Xor,
    XorAssignment,
}

impl BinaryOperator {
    pub const fn syntax_kind(&self) -> SyntaxKind {
        match self {
            BinaryOperator::Addition => SyntaxKind::ADDITION_EXPRESSION,
            BinaryOperator::AdditionAssignment => SyntaxKind::ADDITION_ASSIGNMENT_EXPRESSION,
            BinaryOperator::And => SyntaxKind::AND_EXPRESSION,
            BinaryOperator::AndAssignment => SyntaxKind::AND_ASSIGNMENT_EXPRESSION,
            BinaryOperator::Assignment => SyntaxKind::ASSIGNMENT_EXPRESSION,
            BinaryOperator::Division => SyntaxKind::DIVISION_EXPRESSION,
            BinaryOperator::DivisionAssignment => SyntaxKind::DIVISION_ASSIGNMENT_EXPRESSION,
            BinaryOperator::Equal => SyntaxKind::EQUAL_EXPRESSION,
            BinaryOperator::GreaterThan => SyntaxKind::GREATER_THAN_EXPRESSION,
            BinaryOperator::GreaterThanOrEqual => SyntaxKind::GREATER_THAN_OR_EQUAL_EXPRESSION,
            BinaryOperator::Modulo => SyntaxKind::MODULO_EXPRESSION,
            BinaryOperator::ModuloAssignment => SyntaxKind::MODULO_ASSIGNMENT_EXPRESSION,
            BinaryOperator::Multiplication => SyntaxKind::MULTIPLICATION_EXPRESSION,
            BinaryOperator::MultiplicationAssignment => {
                SyntaxKind::MULTIPLICATION_ASSIGNMENT_EXPRESSION
            }
            BinaryOperator::NotAssignment => SyntaxKind::NOT_ASSIGNMENT_EXPRESSION,
            BinaryOperator::NotEqual => SyntaxKind::NOT_EQUAL_EXPRESSION,
            BinaryOperator::Coalescing => SyntaxKind::COALESCING_EXPRESSION,
            BinaryOperator::LeftShift => SyntaxKind::LEFT_SHIFT_EXPRESSION,
            BinaryOperator::LeftShiftAssignment => SyntaxKind::LEFT_SHIFT_ASSIGNMENT_EXPRESSION,
            BinaryOperator::LessThan => SyntaxKind::LESS_THAN_EXPRESSION,
            BinaryOperator::LessThanOrEqual => SyntaxKind::LESS_THAN_OR_EQUAL_EXPRESSION,
            BinaryOperator::LogicalAnd => SyntaxKind::LOGICAL_AND_EXPRESSION,
            BinaryOperator::LogicalOr => SyntaxKind::LOGICAL_OR_EXPRESSION,
            BinaryOperator::Or => SyntaxKind::OR_EXPRESSION,
            BinaryOperator::OrAssignment => SyntaxKind::OR_ASSIGNMENT_EXPRESSION,
            BinaryOperator::RightShift => SyntaxKind::RIGHT_SHIFT_EXPRESSION,
            BinaryOperator::RightShiftAssignment => SyntaxKind::RIGHT_SHIFT_ASSIGNMENT_EXPRESSION,
            BinaryOperator::Subtraction => SyntaxKind::SUBTRACTION_EXPRESSION,
            BinaryOperator::SubtractionAssignment => SyntaxKind::SUBTRACTION_ASSIGNMENT_EXPRESSION,
            BinaryOperator::Xor => SyntaxKind::XOR_EXPRESSION,
            BinaryOperator::XorAssignment => SyntaxKind::XOR_ASSIGNMENT_EXPRESSION,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InvokeOperator {
    Call,
    Index,
    Specialization,
}

impl InvokeOperator {
    pub const fn syntax_kind(&self) -> SyntaxKind {
        match self {
            InvokeOperator::Call => SyntaxKind::CALL_EXPRESSION,
            InvokeOperator::Index => SyntaxKind::INDEX_EXPRESSION,
            InvokeOperator::Specialization => SyntaxKind::SPECIALIZATION_EXPRESSION,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AccessOperator {
    Direct,
    Indirect,
    Scope,
}

impl AccessOperator {
    pub const fn syntax_kind(&self) -> SyntaxKind {
        match self {
            AccessOperator::Direct => SyntaxKind::DIRECT_ACCESS_EXPRESSION,
            AccessOperator::Indirect => SyntaxKind::INDIRECT_ACCESS_EXPRESSION,
            AccessOperator::Scope => SyntaxKind::SCOPE_ACCESS_EXPRESSION,
        }
    }
}

/// An expression node. Children are ids into the owning arena; parent-to-child
/// ownership is structural and acyclic.
#[derive(Clone, Debug)]
pub enum Expr {
    Cast {
        open: TokenId,
        ty: ExprId,
        close: TokenId,
        operand: ExprId,
    },
    Literal {
        token: TokenId,
    },
    Meta {
        dollar: TokenId,
        open: TokenId,
        operand: ExprId,
        close: TokenId,
    },
    Parenthesized {
        open: TokenId,
        operand: ExprId,
        close: TokenId,
    },
    Ternary {
        condition: ExprId,
        question: TokenId,
        when_true: Option<ExprId>,
        colon: TokenId,
        when_false: ExprId,
    },
    Wildcard {
        operand: ExprId,
        operator: TokenId,
        star: TokenId,
    },
    Word {
        token: TokenId,
    },
    Unary {
        operator: UnaryOperator,
        token: TokenId,
        operand: ExprId,
    },
    Binary {
        operator: BinaryOperator,
        lhs: ExprId,
        token: TokenId,
        rhs: ExprId,
    },
    Invoke {
        operator: InvokeOperator,
        target: ExprId,
        open: TokenId,
        arguments: ArgumentListId,
        close: TokenId,
    },
    Access {
        operator: AccessOperator,
        target: ExprId,
        token: TokenId,
        name: TokenId,
    },
}

impl Expr {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Expr::Cast { .. } => SyntaxKind::CAST_EXPRESSION,
            Expr::Literal { .. } => SyntaxKind::LITERAL_EXPRESSION,
            Expr::Meta { .. } => SyntaxKind::META_EXPRESSION,
            Expr::Parenthesized { .. } => SyntaxKind::PARENTHESIZED_EXPRESSION,
            Expr::Ternary { .. } => SyntaxKind::TERNARY_EXPRESSION,
            Expr::Wildcard { .. } => SyntaxKind::WILDCARD_EXPRESSION,
            Expr::Word { .. } => SyntaxKind::WORD_EXPRESSION,
            Expr::Unary { operator, .. } => operator.syntax_kind(),
            Expr::Binary { operator, .. } => operator.syntax_kind(),
            Expr::Invoke { operator, .. } => operator.syntax_kind(),
            Expr::Access { operator, .. } => operator.syntax_kind(),
        }
    }

    /// Whether this expression can denote a type, which decides if a
    /// following `<` may start a specialization.
    pub fn is_type_like(&self) -> bool {
        matches!(
            self.kind(),
            SyntaxKind::META_EXPRESSION
                | SyntaxKind::WORD_EXPRESSION
                | SyntaxKind::SCOPE_ACCESS_EXPRESSION
                | SyntaxKind::SPECIALIZATION_EXPRESSION
        )
    }
}

/// A single argument of an invoke expression, optionally labeled
/// (`name: value`).
#[derive(Clone, Debug)]
pub struct Argument {
    pub name: Option<TokenId>,
    pub colon: Option<TokenId>,
    pub expression: ExprId,
}

/// The comma-separated argument sequence of a call, index, or specialization.
#[derive(Clone, Debug)]
pub struct ArgumentList {
    pub arguments: SyntaxList,
}
