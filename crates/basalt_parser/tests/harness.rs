use basalt_syntax::{Expr, ExprId, SyntaxKind, SyntaxTree, TokenId};

#[allow(unused)]
pub fn parse(source: &str) -> SyntaxTree {
    basalt_parser::parse_expression(source).expect("expression parses")
}

#[allow(unused)]
pub fn root_kind(source: &str) -> SyntaxKind {
    parse(source).root_kind()
}

#[allow(unused)]
pub fn root_expr(tree: &SyntaxTree) -> &Expr {
    expr(tree, tree.arena().as_expr_id(tree.root()))
}

#[allow(unused)]
pub fn expr(tree: &SyntaxTree, id: ExprId) -> &Expr {
    tree.arena().expr(id)
}

#[allow(unused)]
pub fn expr_kind(tree: &SyntaxTree, id: ExprId) -> SyntaxKind {
    expr(tree, id).kind()
}

#[allow(unused)]
pub fn word_text(tree: &SyntaxTree, token: TokenId) -> String {
    tree.arena()
        .token(token)
        .word_text(tree.arena())
        .expect("token is a word")
        .to_string()
}
