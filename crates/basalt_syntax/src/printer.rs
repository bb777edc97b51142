use crate::arena::{SyntaxArena, SyntaxId, TokenId};
use crate::expr::Expr;
use crate::node::TokenPayload;
use crate::tree::SyntaxTree;

/// Render an indented dump of a syntax tree: one line per node with its kind,
/// `| `-prefixed per nesting level, with word and literal content inlined
/// beneath the node that owns it.
pub fn print_tree(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    print_syntax(&mut out, tree.arena(), 0, tree.root());
    out
}

pub fn print_syntax(out: &mut String, arena: &SyntaxArena, indent: usize, id: SyntaxId) {
    print_indent(out, indent);
    out.push_str(&format!("{:?}\n", arena.kind(id)));

    let indent = indent + 1;
    match arena.node(id) {
        crate::arena::SyntaxData::Expr(expr) => print_expr(out, arena, indent, expr),
        crate::arena::SyntaxData::Argument(argument) => {
            if let Some(name) = argument.name {
                print_word(out, arena, indent, name);
            }
            print_syntax(out, arena, indent, argument.expression.syntax());
        }
        crate::arena::SyntaxData::ArgumentList(list) => {
            for child in arena.list(list.arguments) {
                print_syntax(out, arena, indent, *child);
            }
        }
        _ => {
            print_indent(out, indent);
            out.push_str("?\n");
        }
    }
}

fn print_expr(out: &mut String, arena: &SyntaxArena, indent: usize, expr: &Expr) {
    match expr {
        Expr::Cast { ty, operand, .. } => {
            print_syntax(out, arena, indent, ty.syntax());
            print_syntax(out, arena, indent, operand.syntax());
        }
        Expr::Literal { token } => print_literal(out, arena, indent, *token),
        Expr::Meta { operand, .. } => print_syntax(out, arena, indent, operand.syntax()),
        Expr::Parenthesized { operand, .. } => print_syntax(out, arena, indent, operand.syntax()),
        Expr::Ternary {
            condition,
            when_true,
            when_false,
            ..
        } => {
            print_syntax(out, arena, indent, condition.syntax());
            if let Some(when_true) = when_true {
                print_syntax(out, arena, indent, when_true.syntax());
            }
            print_syntax(out, arena, indent, when_false.syntax());
        }
        Expr::Wildcard { operand, .. } => print_syntax(out, arena, indent, operand.syntax()),
        Expr::Word { token } => print_word(out, arena, indent, *token),
        Expr::Unary { operand, .. } => print_syntax(out, arena, indent, operand.syntax()),
        Expr::Binary { lhs, rhs, .. } => {
            print_syntax(out, arena, indent, lhs.syntax());
            print_syntax(out, arena, indent, rhs.syntax());
        }
        Expr::Invoke {
            target, arguments, ..
        } => {
            print_syntax(out, arena, indent, target.syntax());
            print_syntax(out, arena, indent, arguments.syntax());
        }
        Expr::Access { target, name, .. } => {
            print_syntax(out, arena, indent, target.syntax());
            print_word(out, arena, indent, *name);
        }
    }
}

fn print_literal(out: &mut String, arena: &SyntaxArena, indent: usize, token: TokenId) {
    print_indent(out, indent);
    let token = arena.token(token);
    match token.payload() {
        TokenPayload::CharLiteral { value, .. } => {
            out.push('\'');
            out.push_str(arena.text(*value));
            out.push('\'');
        }
        TokenPayload::StringLiteral { value, .. } => {
            out.push('"');
            out.push_str(arena.text(*value));
            out.push('"');
        }
        TokenPayload::NumericLiteral { value, .. } => {
            out.push_str(&value.to_string());
        }
        _ => out.push('?'),
    }
    if let Some(suffix) = token.suffix() {
        write_word(out, arena, suffix);
    }
    out.push('\n');
}

fn print_word(out: &mut String, arena: &SyntaxArena, indent: usize, token: TokenId) {
    print_indent(out, indent);
    write_word(out, arena, token);
    out.push('\n');
}

fn write_word(out: &mut String, arena: &SyntaxArena, token: TokenId) {
    let token = arena.token(token);
    if token.is_verbatim() {
        out.push('@');
    }
    match token.word_text(arena) {
        Some(text) => out.push_str(text),
        None if token.is_missing() => out.push_str("<missing>"),
        None => out.push('?'),
    }
}

fn print_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("| ");
    }
}
