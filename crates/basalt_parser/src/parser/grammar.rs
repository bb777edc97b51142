//! The expression grammar, written as suspendable rule tasks over the
//! runtime. Each rule is a state machine with one state per suspension point;
//! forking clones the whole machine, so every state is plain data.

use super::task::{ParseCursor, Rule, RuleTask, Step, Wake};
use basalt_syntax::{
    AccessOperator, Argument, ArgumentList, ArgumentListId, BinaryOperator, Expr, ExprId,
    InvokeOperator, SyntaxId, SyntaxKind, TokenId, UnaryOperator,
};
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub(crate) struct Flags: u32 {
        /// The expression must denote a type: binary operators, ternaries,
        /// calls, and most postfix forms are not allowed.
        const TYPE_EXPR = 1 << 0;
    }
}

/// Binding strengths, weakest first. An operator only binds inside a parse
/// running at a precedence at or below its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Precedence {
    Expression = 0,
    Assignment,
    Ternary,
    Coalescing,
    LogicalOr,
    LogicalAnd,
    Equality,
    Relation,
    Or,
    Xor,
    And,
    Shift,
    Additive,
    Multiplicative,
    UnaryPrefix,
    TypeCast,
    UnaryPostfix,
    Invoke,
    Access,
    Primary,
}

/// Rule identity: the rule plus its argument tuple. Structural equality over
/// this enum is what merges duplicate subparses at one token index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum RuleCall {
    Root { flags: Flags, precedence: Precedence },
    Expression { flags: Flags, precedence: Precedence },
    Unary { flags: Flags },
    Primary { flags: Flags },
    Parens { flags: Flags },
    Cast { flags: Flags },
    Meta { flags: Flags },
    Call { flags: Flags, target: ExprId },
    Index { flags: Flags, target: ExprId },
    Specialization { flags: Flags, target: ExprId },
    ScopeAccess { flags: Flags, target: ExprId },
    DirectAccess { flags: Flags, target: ExprId },
    IndirectAccess { flags: Flags, target: ExprId },
    Argument { flags: Flags },
    ArgumentList { flags: Flags },
}

impl Rule for RuleCall {
    fn spawn(&self) -> Box<dyn RuleTask<RuleCall>> {
        match *self {
            RuleCall::Root { flags, precedence } => Box::new(RootRule::Start { flags, precedence }),
            RuleCall::Expression { flags, precedence } => {
                Box::new(ExpressionRule::Start { flags, precedence })
            }
            RuleCall::Unary { flags } => Box::new(UnaryRule::Start { flags }),
            RuleCall::Primary { flags } => Box::new(PrimaryRule::Start { flags }),
            RuleCall::Parens { flags } => Box::new(ParensRule::Start { flags }),
            RuleCall::Cast { flags } => Box::new(CastRule::Start { flags }),
            RuleCall::Meta { flags } => Box::new(MetaRule::Start { flags }),
            RuleCall::Call { flags, target } => Box::new(InvokeRule::Start {
                flags,
                operator: InvokeOperator::Call,
                target,
            }),
            RuleCall::Index { flags, target } => Box::new(InvokeRule::Start {
                flags,
                operator: InvokeOperator::Index,
                target,
            }),
            RuleCall::Specialization { flags, target } => Box::new(InvokeRule::Start {
                flags,
                operator: InvokeOperator::Specialization,
                target,
            }),
            RuleCall::ScopeAccess { flags: _, target } => Box::new(AccessRule::Start {
                operator: AccessOperator::Scope,
                target,
            }),
            RuleCall::DirectAccess { flags: _, target } => Box::new(AccessRule::Start {
                operator: AccessOperator::Direct,
                target,
            }),
            RuleCall::IndirectAccess { flags: _, target } => Box::new(AccessRule::Start {
                operator: AccessOperator::Indirect,
                target,
            }),
            RuleCall::Argument { flags } => Box::new(ArgumentRule::Start { flags }),
            RuleCall::ArgumentList { flags } => Box::new(ArgumentListRule::Start { flags }),
        }
    }
}

macro_rules! impl_rule_task {
    ($machine:ident) => {
        impl RuleTask<RuleCall> for $machine {
            fn resume(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
                self.step(ctx, wake)
            }

            fn clone_task(&self) -> Box<dyn RuleTask<RuleCall>> {
                Box::new(self.clone())
            }
        }
    };
}

fn woken_syntax(wake: Wake) -> SyntaxId {
    match wake {
        Wake::Parse(syntax) => syntax,
        other => unreachable!("rule awaiting a parse result was woken with {other:?}"),
    }
}

//#region Root

/// Wraps the top-level rule and requires the whole input to be consumed.
#[derive(Clone)]
enum RootRule {
    Start { flags: Flags, precedence: Precedence },
    Inner,
    TrailingInput { syntax: SyntaxId },
}

impl RootRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            RootRule::Start { flags, precedence } => {
                *self = RootRule::Inner;
                Step::Parse(RuleCall::Expression { flags, precedence })
            }
            RootRule::Inner => {
                let syntax = woken_syntax(wake);
                if ctx.peek_kind(0) == SyntaxKind::EOF {
                    Step::Done(syntax)
                } else {
                    *self = RootRule::TrailingInput { syntax };
                    Step::Error
                }
            }
            // Swallow mode: give back what parsed, leaving the rest behind.
            RootRule::TrailingInput { syntax } => Step::Done(syntax),
        }
    }
}

impl_rule_task!(RootRule);
//#endregion

//#region Expression

/// Precedence-climbing binary/ternary layer above the unary rule.
#[derive(Clone)]
enum ExpressionRule {
    Start {
        flags: Flags,
        precedence: Precedence,
    },
    Operand {
        flags: Flags,
        precedence: Precedence,
    },
    Rhs {
        flags: Flags,
        precedence: Precedence,
        operator: BinaryOperator,
        token: TokenId,
        lhs: ExprId,
    },
    TernaryTrue {
        flags: Flags,
        condition: ExprId,
        question: TokenId,
    },
    TernaryColonMissing {
        flags: Flags,
        condition: ExprId,
        question: TokenId,
        when_true: ExprId,
    },
    TernaryFalse {
        flags: Flags,
        condition: ExprId,
        question: TokenId,
        when_true: Option<ExprId>,
        colon: TokenId,
    },
}

impl ExpressionRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            ExpressionRule::Start { flags, precedence } => {
                *self = ExpressionRule::Operand { flags, precedence };
                Step::Parse(RuleCall::Unary { flags })
            }
            ExpressionRule::Operand { flags, precedence } => {
                let lhs = ctx.arena.as_expr_id(woken_syntax(wake));
                if flags.contains(Flags::TYPE_EXPR) {
                    return Step::Done(lhs.syntax());
                }
                self.binary_loop(ctx, flags, precedence, lhs)
            }
            ExpressionRule::Rhs {
                flags,
                precedence,
                operator,
                token,
                lhs,
            } => {
                let rhs = ctx.arena.as_expr_id(woken_syntax(wake));
                let lhs = ctx.arena.alloc_expr(Expr::Binary {
                    operator,
                    lhs,
                    token,
                    rhs,
                });
                self.binary_loop(ctx, flags, precedence, lhs)
            }
            ExpressionRule::TernaryTrue {
                flags,
                condition,
                question,
            } => {
                let when_true = ctx.arena.as_expr_id(woken_syntax(wake));
                if ctx.peek_kind(0) == SyntaxKind::COLON {
                    let colon = ctx.eat();
                    *self = ExpressionRule::TernaryFalse {
                        flags,
                        condition,
                        question,
                        when_true: Some(when_true),
                        colon,
                    };
                    Step::Parse(RuleCall::Expression {
                        flags,
                        precedence: Precedence::Expression,
                    })
                } else {
                    *self = ExpressionRule::TernaryColonMissing {
                        flags,
                        condition,
                        question,
                        when_true,
                    };
                    Step::Error
                }
            }
            ExpressionRule::TernaryColonMissing {
                flags,
                condition,
                question,
                when_true,
            } => {
                let colon = ctx.missing_token(SyntaxKind::COLON);
                *self = ExpressionRule::TernaryFalse {
                    flags,
                    condition,
                    question,
                    when_true: Some(when_true),
                    colon,
                };
                Step::Parse(RuleCall::Expression {
                    flags,
                    precedence: Precedence::Expression,
                })
            }
            ExpressionRule::TernaryFalse {
                condition,
                question,
                when_true,
                colon,
                ..
            } => {
                let when_false = ctx.arena.as_expr_id(woken_syntax(wake));
                let node = ctx.arena.alloc_expr(Expr::Ternary {
                    condition,
                    question,
                    when_true,
                    colon,
                    when_false,
                });
                Step::Done(node.syntax())
            }
        }
    }

    /// Consume binary operators while they bind at this precedence, then
    /// check for a trailing ternary.
    fn binary_loop(
        &mut self,
        ctx: &mut ParseCursor<'_>,
        flags: Flags,
        precedence: Precedence,
        lhs: ExprId,
    ) -> Step<RuleCall> {
        if let Some(op) = classify_binary_operator(ctx) {
            let binds = op.precedence > precedence
                || (op.precedence == precedence && !op.left_associative);
            if binds {
                let token = ctx.eat();
                // Composed operators (`>>`, `>=`, `>>=`) span extra tokens;
                // only the first `>` is kept on the node.
                for _ in 0..op.extra_tokens {
                    ctx.eat();
                }
                *self = ExpressionRule::Rhs {
                    flags,
                    precedence,
                    operator: op.operator,
                    token,
                    lhs,
                };
                return Step::Parse(RuleCall::Expression {
                    flags,
                    precedence: op.precedence,
                });
            }
        }

        if precedence <= Precedence::Ternary && ctx.peek_kind(0) == SyntaxKind::QUESTION {
            let question = ctx.eat();
            if ctx.peek_kind(0) == SyntaxKind::COLON {
                let colon = ctx.eat();
                *self = ExpressionRule::TernaryFalse {
                    flags,
                    condition: lhs,
                    question,
                    when_true: None,
                    colon,
                };
            } else {
                *self = ExpressionRule::TernaryTrue {
                    flags,
                    condition: lhs,
                    question,
                };
            }
            return Step::Parse(RuleCall::Expression {
                flags,
                precedence: Precedence::Expression,
            });
        }

        Step::Done(lhs.syntax())
    }
}

impl_rule_task!(ExpressionRule);

struct BinaryOp {
    operator: BinaryOperator,
    precedence: Precedence,
    left_associative: bool,
    /// Tokens consumed beyond the operator token itself, for the operators
    /// the parser composes from adjacent tokens.
    extra_tokens: u32,
}

impl BinaryOp {
    fn new(operator: BinaryOperator, precedence: Precedence) -> Self {
        Self {
            operator,
            precedence,
            left_associative: true,
            extra_tokens: 0,
        }
    }

    fn right_assoc(operator: BinaryOperator, precedence: Precedence) -> Self {
        Self {
            left_associative: false,
            ..Self::new(operator, precedence)
        }
    }

    fn composed(operator: BinaryOperator, precedence: Precedence, extra_tokens: u32) -> Self {
        Self {
            extra_tokens,
            ..Self::new(operator, precedence)
        }
    }
}

fn classify_binary_operator(ctx: &ParseCursor<'_>) -> Option<BinaryOp> {
    use BinaryOperator as Op;
    use Precedence as Prec;

    let op = match ctx.peek_kind(0) {
        SyntaxKind::ADD => BinaryOp::new(Op::Addition, Prec::Additive),
        SyntaxKind::AND => BinaryOp::new(Op::And, Prec::And),
        SyntaxKind::ASSIGN => BinaryOp::right_assoc(Op::Assignment, Prec::Assignment),
        SyntaxKind::ASSIGN_ADD => BinaryOp::right_assoc(Op::AdditionAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_AND => BinaryOp::right_assoc(Op::AndAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_DIV => BinaryOp::right_assoc(Op::DivisionAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_LHS => BinaryOp::right_assoc(Op::LeftShiftAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_MOD => BinaryOp::right_assoc(Op::ModuloAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_MUL => {
            BinaryOp::right_assoc(Op::MultiplicationAssignment, Prec::Assignment)
        }
        SyntaxKind::ASSIGN_NOT => BinaryOp::right_assoc(Op::NotAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_OR => BinaryOp::right_assoc(Op::OrAssignment, Prec::Assignment),
        SyntaxKind::ASSIGN_SUB => {
            BinaryOp::right_assoc(Op::SubtractionAssignment, Prec::Assignment)
        }
        SyntaxKind::ASSIGN_XOR => BinaryOp::right_assoc(Op::XorAssignment, Prec::Assignment),
        SyntaxKind::DIV => BinaryOp::new(Op::Division, Prec::Multiplicative),
        SyntaxKind::EQUAL => BinaryOp::new(Op::Equal, Prec::Equality),
        SyntaxKind::GREATER => classify_greater(ctx),
        SyntaxKind::MOD => BinaryOp::new(Op::Modulo, Prec::Multiplicative),
        SyntaxKind::MUL => BinaryOp::new(Op::Multiplication, Prec::Multiplicative),
        SyntaxKind::NOT_EQUAL => BinaryOp::new(Op::NotEqual, Prec::Equality),
        SyntaxKind::COALESCING => BinaryOp::right_assoc(Op::Coalescing, Prec::Coalescing),
        SyntaxKind::LEFT_SHIFT => BinaryOp::new(Op::LeftShift, Prec::Shift),
        SyntaxKind::LESS => BinaryOp::new(Op::LessThan, Prec::Relation),
        SyntaxKind::LESS_OR_EQUAL => BinaryOp::new(Op::LessThanOrEqual, Prec::Relation),
        SyntaxKind::LOGICAL_AND => BinaryOp::new(Op::LogicalAnd, Prec::LogicalAnd),
        SyntaxKind::LOGICAL_OR => BinaryOp::new(Op::LogicalOr, Prec::LogicalOr),
        SyntaxKind::OR => BinaryOp::new(Op::Or, Prec::Or),
        SyntaxKind::SUB => BinaryOp::new(Op::Subtraction, Prec::Additive),
        SyntaxKind::XOR => BinaryOp::new(Op::Xor, Prec::Xor),
        _ => return None,
    };
    Some(op)
}

/// A `>` token may begin `>`, `>=`, `>>`, or `>>=`. The longer operators
/// only exist when the following tokens are adjacent with no trivia between
/// them; that is what keeps `Map<K, List<V>>` parseable.
fn classify_greater(ctx: &ParseCursor<'_>) -> BinaryOp {
    use BinaryOperator as Op;
    use Precedence as Prec;

    let greater_than = BinaryOp::new(Op::GreaterThan, Prec::Relation);

    if !ctx.peek_token(0).trailing().is_empty() {
        return greater_than;
    }
    let second = ctx.peek_token(1);
    if !second.leading().is_empty() {
        return greater_than;
    }

    match second.kind() {
        SyntaxKind::GREATER => {
            if second.trailing().is_empty() {
                let third = ctx.peek_token(2);
                if third.kind() == SyntaxKind::ASSIGN && third.leading().is_empty() {
                    return BinaryOp {
                        left_associative: false,
                        ..BinaryOp::composed(Op::RightShiftAssignment, Prec::Assignment, 2)
                    };
                }
            }
            BinaryOp::composed(Op::RightShift, Prec::Shift, 1)
        }
        SyntaxKind::ASSIGN => BinaryOp::composed(Op::GreaterThanOrEqual, Prec::Relation, 1),
        _ => greater_than,
    }
}
//#endregion

//#region Unary

#[derive(Clone)]
enum UnaryRule {
    Start {
        flags: Flags,
    },
    Operand {
        operator: UnaryOperator,
        token: TokenId,
    },
    Passthrough,
}

impl UnaryRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            UnaryRule::Start { flags } => {
                let operator = match ctx.peek_kind(0) {
                    SyntaxKind::ADD => Some(UnaryOperator::Plus),
                    SyntaxKind::AND => Some(UnaryOperator::Addressof),
                    SyntaxKind::AWAIT_KW => Some(UnaryOperator::Await),
                    SyntaxKind::DECREMENT => Some(UnaryOperator::PrefixDecrement),
                    SyntaxKind::MUL => Some(UnaryOperator::Indirection),
                    SyntaxKind::NOT => Some(UnaryOperator::Not),
                    SyntaxKind::INCREMENT => Some(UnaryOperator::PrefixIncrement),
                    SyntaxKind::LOGICAL_NOT => Some(UnaryOperator::LogicalNot),
                    SyntaxKind::SUB => Some(UnaryOperator::Minus),
                    _ => None,
                };
                match operator {
                    Some(operator) => {
                        let token = ctx.eat();
                        *self = UnaryRule::Operand { operator, token };
                        Step::Parse(RuleCall::Expression {
                            flags,
                            precedence: Precedence::UnaryPrefix,
                        })
                    }
                    None => {
                        *self = UnaryRule::Passthrough;
                        Step::Parse(RuleCall::Primary { flags })
                    }
                }
            }
            UnaryRule::Operand { operator, token } => {
                let operand = ctx.arena.as_expr_id(woken_syntax(wake));
                let node = ctx.arena.alloc_expr(Expr::Unary {
                    operator,
                    token,
                    operand,
                });
                Step::Done(node.syntax())
            }
            UnaryRule::Passthrough => Step::Done(woken_syntax(wake)),
        }
    }
}

impl_rule_task!(UnaryRule);
//#endregion

//#region Primary

/// Primary expressions and the postfix loop over them. This is where both
/// forks live: parenthesized-vs-cast after `(`, and less-than-vs-
/// specialization after a type-like expression and `<`.
#[derive(Clone)]
enum PrimaryRule {
    Start {
        flags: Flags,
    },
    /// Choosing between the parenthesized and cast readings of `(`.
    PrefixForkChoice {
        flags: Flags,
    },
    /// Awaiting a parens/cast/meta subparse that yields the first operand.
    Prefix {
        flags: Flags,
    },
    /// Awaiting a postfix subparse (call, index, access) replacing the
    /// current operand.
    Postfix {
        flags: Flags,
    },
    /// Choosing between the specialization and less-than readings of `<`.
    AngleForkChoice {
        flags: Flags,
        expr: ExprId,
    },
    /// Awaiting a specialization subparse; its follow set decides whether
    /// this alternative survives.
    AfterSpecialization {
        flags: Flags,
    },
    /// No token that can start an expression was found.
    NoExpression {
        flags: Flags,
    },
    /// The postfix loop hit a token not allowed here; on swallow, the
    /// operand parsed so far is the result.
    PostfixStop {
        expr: ExprId,
    },
}

impl PrimaryRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            PrimaryRule::Start { flags } => {
                match ctx.peek_kind(0) {
                    // Rooted names (`::name`) are not part of the expression
                    // grammar yet.
                    SyntaxKind::SCOPE => {
                        *self = PrimaryRule::NoExpression { flags };
                        Step::Error
                    }
                    kind if kind.is_word_token() => {
                        let token = ctx.eat();
                        let expr = ctx.arena.alloc_expr(Expr::Word { token });
                        self.postfix_loop(ctx, flags, expr)
                    }
                    SyntaxKind::CHAR_LITERAL
                    | SyntaxKind::STRING_LITERAL
                    | SyntaxKind::NUMERIC_LITERAL => {
                        let token = ctx.eat();
                        let expr = ctx.arena.alloc_expr(Expr::Literal { token });
                        self.postfix_loop(ctx, flags, expr)
                    }
                    SyntaxKind::DOLLAR => {
                        if ctx.peek_kind(1) == SyntaxKind::LPAREN {
                            *self = PrimaryRule::Prefix { flags };
                            Step::Parse(RuleCall::Meta { flags })
                        } else {
                            *self = PrimaryRule::NoExpression { flags };
                            Step::Error
                        }
                    }
                    SyntaxKind::LPAREN => {
                        if flags.contains(Flags::TYPE_EXPR) {
                            *self = PrimaryRule::NoExpression { flags };
                            Step::Error
                        } else {
                            *self = PrimaryRule::PrefixForkChoice { flags };
                            Step::Fork(2)
                        }
                    }
                    _ => {
                        *self = PrimaryRule::NoExpression { flags };
                        Step::Error
                    }
                }
            }
            PrimaryRule::PrefixForkChoice { flags } => {
                *self = PrimaryRule::Prefix { flags };
                match wake {
                    Wake::Fork(0) => Step::Parse(RuleCall::Parens { flags }),
                    Wake::Fork(1) => Step::Parse(RuleCall::Cast { flags }),
                    other => unreachable!("prefix fork woken with {other:?}"),
                }
            }
            PrimaryRule::Prefix { flags } | PrimaryRule::Postfix { flags } => {
                let expr = ctx.arena.as_expr_id(woken_syntax(wake));
                self.postfix_loop(ctx, flags, expr)
            }
            PrimaryRule::AngleForkChoice { flags, expr } => match wake {
                Wake::Fork(0) => {
                    *self = PrimaryRule::AfterSpecialization { flags };
                    Step::Parse(RuleCall::Specialization {
                        flags,
                        target: expr,
                    })
                }
                // The less-than reading: the primary ends here and the
                // enclosing expression sees `<` as an operator.
                Wake::Fork(1) => Step::Done(expr.syntax()),
                other => unreachable!("angle fork woken with {other:?}"),
            },
            PrimaryRule::AfterSpecialization { flags } => {
                let expr = ctx.arena.as_expr_id(woken_syntax(wake));
                // A specialization followed by the start of another primary
                // means the relational reading was the right one; kill this
                // alternative. A following `(` stays valid: that is a call
                // of the specialized name.
                match ctx.peek_kind(0) {
                    kind if kind.is_word_token() => {
                        *self = PrimaryRule::PostfixStop { expr };
                        Step::Error
                    }
                    SyntaxKind::CHAR_LITERAL
                    | SyntaxKind::STRING_LITERAL
                    | SyntaxKind::NUMERIC_LITERAL
                    | SyntaxKind::DOLLAR => {
                        *self = PrimaryRule::PostfixStop { expr };
                        Step::Error
                    }
                    _ => self.postfix_loop(ctx, flags, expr),
                }
            }
            PrimaryRule::NoExpression { flags } => {
                // Swallow mode: stand in a missing name so the enclosing
                // rules still receive an expression.
                let token = ctx.missing_token(SyntaxKind::NAME);
                let expr = ctx.arena.alloc_expr(Expr::Word { token });
                self.postfix_loop(ctx, flags, expr)
            }
            PrimaryRule::PostfixStop { expr } => Step::Done(expr.syntax()),
        }
    }

    fn postfix_loop(
        &mut self,
        ctx: &mut ParseCursor<'_>,
        flags: Flags,
        mut expr: ExprId,
    ) -> Step<RuleCall> {
        let type_expr = flags.contains(Flags::TYPE_EXPR);
        loop {
            match ctx.peek_kind(0) {
                SyntaxKind::LPAREN => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    *self = PrimaryRule::Postfix { flags };
                    return Step::Parse(RuleCall::Call {
                        flags,
                        target: expr,
                    });
                }
                SyntaxKind::LBRACK => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    *self = PrimaryRule::Postfix { flags };
                    return Step::Parse(RuleCall::Index {
                        flags,
                        target: expr,
                    });
                }
                SyntaxKind::LESS => {
                    if type_expr {
                        *self = PrimaryRule::AfterSpecialization { flags };
                        return Step::Parse(RuleCall::Specialization {
                            flags,
                            target: expr,
                        });
                    }
                    if !ctx.arena.expr(expr).is_type_like() {
                        break;
                    }
                    *self = PrimaryRule::AngleForkChoice { flags, expr };
                    return Step::Fork(2);
                }
                SyntaxKind::SCOPE => {
                    *self = PrimaryRule::Postfix { flags };
                    return Step::Parse(RuleCall::ScopeAccess {
                        flags,
                        target: expr,
                    });
                }
                SyntaxKind::DOT => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    *self = PrimaryRule::Postfix { flags };
                    return Step::Parse(RuleCall::DirectAccess {
                        flags,
                        target: expr,
                    });
                }
                SyntaxKind::ARROW => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    *self = PrimaryRule::Postfix { flags };
                    return Step::Parse(RuleCall::IndirectAccess {
                        flags,
                        target: expr,
                    });
                }
                SyntaxKind::INCREMENT => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    let token = ctx.eat();
                    expr = ctx.arena.alloc_expr(Expr::Unary {
                        operator: UnaryOperator::PostfixIncrement,
                        token,
                        operand: expr,
                    });
                }
                SyntaxKind::DECREMENT => {
                    if type_expr {
                        *self = PrimaryRule::PostfixStop { expr };
                        return Step::Error;
                    }
                    let token = ctx.eat();
                    expr = ctx.arena.alloc_expr(Expr::Unary {
                        operator: UnaryOperator::PostfixDecrement,
                        token,
                        operand: expr,
                    });
                }
                _ => break,
            }
        }
        Step::Done(expr.syntax())
    }
}

impl_rule_task!(PrimaryRule);
//#endregion

//#region Parenthesized, cast, meta

#[derive(Clone)]
enum ParensRule {
    Start {
        flags: Flags,
    },
    Inner {
        open: TokenId,
    },
    MissingClose {
        open: TokenId,
        operand: ExprId,
    },
}

impl ParensRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            ParensRule::Start { flags } => {
                let open = ctx.eat();
                debug_assert_eq!(ctx.arena.token(open).kind(), SyntaxKind::LPAREN);
                *self = ParensRule::Inner { open };
                Step::Parse(RuleCall::Expression {
                    flags,
                    precedence: Precedence::Expression,
                })
            }
            ParensRule::Inner { open } => {
                let operand = ctx.arena.as_expr_id(woken_syntax(wake));
                if ctx.peek_kind(0) == SyntaxKind::RPAREN {
                    let close = ctx.eat();
                    let node = ctx.arena.alloc_expr(Expr::Parenthesized {
                        open,
                        operand,
                        close,
                    });
                    Step::Done(node.syntax())
                } else {
                    *self = ParensRule::MissingClose { open, operand };
                    Step::Error
                }
            }
            ParensRule::MissingClose { open, operand } => {
                let close = ctx.missing_token(SyntaxKind::RPAREN);
                let node = ctx.arena.alloc_expr(Expr::Parenthesized {
                    open,
                    operand,
                    close,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(ParensRule);

#[derive(Clone)]
enum CastRule {
    Start {
        flags: Flags,
    },
    Type {
        flags: Flags,
        open: TokenId,
    },
    MissingClose {
        flags: Flags,
        open: TokenId,
        ty: ExprId,
    },
    Operand {
        open: TokenId,
        ty: ExprId,
        close: TokenId,
    },
}

impl CastRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            CastRule::Start { flags } => {
                let open = ctx.eat();
                debug_assert_eq!(ctx.arena.token(open).kind(), SyntaxKind::LPAREN);
                *self = CastRule::Type { flags, open };
                Step::Parse(RuleCall::Expression {
                    flags: flags | Flags::TYPE_EXPR,
                    precedence: Precedence::Expression,
                })
            }
            CastRule::Type { flags, open } => {
                let ty = ctx.arena.as_expr_id(woken_syntax(wake));
                if ctx.peek_kind(0) == SyntaxKind::RPAREN {
                    let close = ctx.eat();
                    *self = CastRule::Operand { open, ty, close };
                    Step::Parse(RuleCall::Expression {
                        flags,
                        precedence: Precedence::TypeCast,
                    })
                } else {
                    *self = CastRule::MissingClose { flags, open, ty };
                    Step::Error
                }
            }
            CastRule::MissingClose { flags, open, ty } => {
                let close = ctx.missing_token(SyntaxKind::RPAREN);
                *self = CastRule::Operand { open, ty, close };
                Step::Parse(RuleCall::Expression {
                    flags,
                    precedence: Precedence::TypeCast,
                })
            }
            CastRule::Operand { open, ty, close } => {
                let operand = ctx.arena.as_expr_id(woken_syntax(wake));
                let node = ctx.arena.alloc_expr(Expr::Cast {
                    open,
                    ty,
                    close,
                    operand,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(CastRule);

#[derive(Clone)]
enum MetaRule {
    Start {
        flags: Flags,
    },
    Inner {
        dollar: TokenId,
        open: TokenId,
    },
    MissingClose {
        dollar: TokenId,
        open: TokenId,
        operand: ExprId,
    },
}

impl MetaRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            MetaRule::Start { flags } => {
                let dollar = ctx.eat();
                debug_assert_eq!(ctx.arena.token(dollar).kind(), SyntaxKind::DOLLAR);
                let open = ctx.eat();
                debug_assert_eq!(ctx.arena.token(open).kind(), SyntaxKind::LPAREN);
                *self = MetaRule::Inner { dollar, open };
                Step::Parse(RuleCall::Expression {
                    flags: flags - Flags::TYPE_EXPR,
                    precedence: Precedence::Expression,
                })
            }
            MetaRule::Inner { dollar, open } => {
                let operand = ctx.arena.as_expr_id(woken_syntax(wake));
                if ctx.peek_kind(0) == SyntaxKind::RPAREN {
                    let close = ctx.eat();
                    let node = ctx.arena.alloc_expr(Expr::Meta {
                        dollar,
                        open,
                        operand,
                        close,
                    });
                    Step::Done(node.syntax())
                } else {
                    *self = MetaRule::MissingClose {
                        dollar,
                        open,
                        operand,
                    };
                    Step::Error
                }
            }
            MetaRule::MissingClose {
                dollar,
                open,
                operand,
            } => {
                let close = ctx.missing_token(SyntaxKind::RPAREN);
                let node = ctx.arena.alloc_expr(Expr::Meta {
                    dollar,
                    open,
                    operand,
                    close,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(MetaRule);
//#endregion

//#region Invoke and access

#[derive(Clone)]
enum InvokeRule {
    Start {
        flags: Flags,
        operator: InvokeOperator,
        target: ExprId,
    },
    Arguments {
        operator: InvokeOperator,
        target: ExprId,
        open: TokenId,
    },
    MissingClose {
        operator: InvokeOperator,
        target: ExprId,
        open: TokenId,
        arguments: ArgumentListId,
    },
}

impl InvokeRule {
    fn close_kind(operator: InvokeOperator) -> SyntaxKind {
        match operator {
            InvokeOperator::Call => SyntaxKind::RPAREN,
            InvokeOperator::Index => SyntaxKind::RBRACK,
            InvokeOperator::Specialization => SyntaxKind::RANGLE,
        }
    }

    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            InvokeRule::Start {
                flags,
                operator,
                target,
            } => {
                let open = ctx.eat();
                // Specialization argument lists are always type expressions.
                let argument_flags = match operator {
                    InvokeOperator::Specialization => flags | Flags::TYPE_EXPR,
                    _ => flags,
                };
                *self = InvokeRule::Arguments {
                    operator,
                    target,
                    open,
                };
                Step::Parse(RuleCall::ArgumentList {
                    flags: argument_flags,
                })
            }
            InvokeRule::Arguments {
                operator,
                target,
                open,
            } => {
                let arguments = ctx.arena.as_argument_list_id(woken_syntax(wake));
                if ctx.peek_kind(0) == Self::close_kind(operator) {
                    let close = ctx.eat();
                    let node = ctx.arena.alloc_expr(Expr::Invoke {
                        operator,
                        target,
                        open,
                        arguments,
                        close,
                    });
                    Step::Done(node.syntax())
                } else {
                    *self = InvokeRule::MissingClose {
                        operator,
                        target,
                        open,
                        arguments,
                    };
                    Step::Error
                }
            }
            InvokeRule::MissingClose {
                operator,
                target,
                open,
                arguments,
            } => {
                let close = ctx.missing_token(Self::close_kind(operator));
                let node = ctx.arena.alloc_expr(Expr::Invoke {
                    operator,
                    target,
                    open,
                    arguments,
                    close,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(InvokeRule);

#[derive(Clone)]
enum AccessRule {
    Start {
        operator: AccessOperator,
        target: ExprId,
    },
    MissingName {
        operator: AccessOperator,
        target: ExprId,
        token: TokenId,
    },
}

impl AccessRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, _wake: Wake) -> Step<RuleCall> {
        match *self {
            AccessRule::Start { operator, target } => {
                let token = ctx.eat();
                if ctx.peek_kind(0).is_word_token() {
                    let name = ctx.eat();
                    let node = ctx.arena.alloc_expr(Expr::Access {
                        operator,
                        target,
                        token,
                        name,
                    });
                    Step::Done(node.syntax())
                } else {
                    *self = AccessRule::MissingName {
                        operator,
                        target,
                        token,
                    };
                    Step::Error
                }
            }
            AccessRule::MissingName {
                operator,
                target,
                token,
            } => {
                let name = ctx.missing_token(SyntaxKind::NAME);
                let node = ctx.arena.alloc_expr(Expr::Access {
                    operator,
                    target,
                    token,
                    name,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(AccessRule);
//#endregion

//#region Arguments

#[derive(Clone)]
enum ArgumentRule {
    Start {
        flags: Flags,
    },
    Expression {
        name: Option<TokenId>,
        colon: Option<TokenId>,
    },
}

impl ArgumentRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match *self {
            ArgumentRule::Start { flags } => {
                let mut name = None;
                let mut colon = None;
                if ctx.peek_kind(0).is_word_token() && ctx.peek_kind(1) == SyntaxKind::COLON {
                    name = Some(ctx.eat());
                    colon = Some(ctx.eat());
                }
                *self = ArgumentRule::Expression { name, colon };
                Step::Parse(RuleCall::Expression {
                    flags,
                    precedence: Precedence::Expression,
                })
            }
            ArgumentRule::Expression { name, colon } => {
                let expression = ctx.arena.as_expr_id(woken_syntax(wake));
                let node = ctx.arena.alloc_argument(Argument {
                    name,
                    colon,
                    expression,
                });
                Step::Done(node.syntax())
            }
        }
    }
}

impl_rule_task!(ArgumentRule);

#[derive(Clone)]
enum ArgumentListRule {
    Start {
        flags: Flags,
    },
    Item {
        flags: Flags,
        arguments: Vec<SyntaxId>,
    },
}

impl ArgumentListRule {
    fn step(&mut self, ctx: &mut ParseCursor<'_>, wake: Wake) -> Step<RuleCall> {
        match self {
            ArgumentListRule::Start { flags } => {
                let flags = *flags;
                match ctx.peek_kind(0) {
                    SyntaxKind::RPAREN | SyntaxKind::RBRACK | SyntaxKind::RANGLE => {
                        let arguments = ctx.arena.alloc_list([]);
                        let node = ctx.arena.alloc_argument_list(ArgumentList { arguments });
                        Step::Done(node.syntax())
                    }
                    _ => {
                        *self = ArgumentListRule::Item {
                            flags,
                            arguments: Vec::new(),
                        };
                        Step::Parse(RuleCall::Argument { flags })
                    }
                }
            }
            ArgumentListRule::Item { flags, arguments } => {
                arguments.push(woken_syntax(wake));
                if ctx.peek_kind(0) == SyntaxKind::COMMA {
                    // The separating comma is consumed and not kept.
                    ctx.eat();
                    Step::Parse(RuleCall::Argument { flags: *flags })
                } else {
                    let arguments = ctx.arena.alloc_list(arguments.iter().copied());
                    let node = ctx.arena.alloc_argument_list(ArgumentList { arguments });
                    Step::Done(node.syntax())
                }
            }
        }
    }
}

impl_rule_task!(ArgumentListRule);
//#endregion
