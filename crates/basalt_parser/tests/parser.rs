mod harness;

use basalt_parser::parse_expression_with_metrics;
use basalt_syntax::{BinaryOperator, Expr, SyntaxKind, UnaryOperator};
use harness::{expr, expr_kind, parse, root_expr, root_kind, word_text};
use test_case::test_case;

#[test_case("1 + 2 * 3", SyntaxKind::ADDITION_EXPRESSION ; "addition of product")]
#[test_case("(int)x", SyntaxKind::CAST_EXPRESSION ; "cast")]
#[test_case("a.b->c::d", SyntaxKind::SCOPE_ACCESS_EXPRESSION ; "access chain")]
#[test_case("f<T>(x)", SyntaxKind::CALL_EXPRESSION ; "call of specialization")]
#[test_case("a ? : b", SyntaxKind::TERNARY_EXPRESSION ; "ternary without true arm")]
#[test_case("@class", SyntaxKind::WORD_EXPRESSION ; "verbatim word")]
#[test_case("0x1.8p+1", SyntaxKind::LITERAL_EXPRESSION ; "hex float literal")]
#[test_case("Vec<T>", SyntaxKind::SPECIALIZATION_EXPRESSION ; "specialization")]
#[test_case("(a + b) * c", SyntaxKind::MULTIPLICATION_EXPRESSION ; "parenthesized lhs")]
#[test_case("$(x)", SyntaxKind::META_EXPRESSION ; "meta")]
#[test_case("a[i]", SyntaxKind::INDEX_EXPRESSION ; "index")]
#[test_case("x++", SyntaxKind::POSTFIX_INCREMENT_EXPRESSION ; "postfix increment")]
#[test_case("await x", SyntaxKind::AWAIT_EXPRESSION ; "await prefix")]
#[test_case("a >> b", SyntaxKind::RIGHT_SHIFT_EXPRESSION ; "composed right shift")]
#[test_case("a >= b", SyntaxKind::GREATER_THAN_OR_EQUAL_EXPRESSION ; "composed greater or equal")]
#[test_case("a >>= b", SyntaxKind::RIGHT_SHIFT_ASSIGNMENT_EXPRESSION ; "composed shift assignment")]
fn root_kinds(source: &str, expected: SyntaxKind) {
    assert_eq!(root_kind(source), expected);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let tree = parse("1 + 2 * 3");
    match root_expr(&tree) {
        Expr::Binary {
            operator: BinaryOperator::Addition,
            lhs,
            rhs,
            ..
        } => {
            assert_eq!(expr_kind(&tree, *lhs), SyntaxKind::LITERAL_EXPRESSION);
            assert_eq!(expr_kind(&tree, *rhs), SyntaxKind::MULTIPLICATION_EXPRESSION);
        }
        other => panic!("expected an addition at the root, found {:?}", other.kind()),
    }
}

#[test_case("a = b = c", SyntaxKind::ASSIGNMENT_EXPRESSION ; "assignment")]
#[test_case("a ?? b ?? c", SyntaxKind::COALESCING_EXPRESSION ; "coalescing")]
fn right_associative_operators_nest_rightward(source: &str, kind: SyntaxKind) {
    let tree = parse(source);
    match root_expr(&tree) {
        Expr::Binary { lhs, rhs, .. } => {
            assert_eq!(expr_kind(&tree, *lhs), SyntaxKind::WORD_EXPRESSION);
            assert_eq!(expr_kind(&tree, *rhs), kind);
        }
        other => panic!("expected a binary root, found {:?}", other.kind()),
    }
}

/// With spaces around them, `<` and `>` are plain relational operators and
/// chain left-associatively.
#[test]
fn relational_reading_of_angles() {
    let tree = parse("a < b > c");
    match root_expr(&tree) {
        Expr::Binary {
            operator: BinaryOperator::GreaterThan,
            lhs,
            rhs,
            ..
        } => {
            assert_eq!(expr_kind(&tree, *lhs), SyntaxKind::LESS_THAN_EXPRESSION);
            assert_eq!(expr_kind(&tree, *rhs), SyntaxKind::WORD_EXPRESSION);
        }
        other => panic!("expected greater-than at the root, found {:?}", other.kind()),
    }
}

#[test]
fn nested_specializations_compose_adjacent_angles() {
    let tree = parse("Map<K, List<V>>");
    match root_expr(&tree) {
        Expr::Invoke {
            target, arguments, ..
        } => {
            assert_eq!(expr_kind(&tree, *target), SyntaxKind::WORD_EXPRESSION);
            let arena = tree.arena();
            let list = arena.argument_list(*arguments);
            let items = arena.list(list.arguments);
            assert_eq!(items.len(), 2);
            let second = arena.argument_at(items[1]);
            assert_eq!(
                expr_kind(&tree, second.expression),
                SyntaxKind::SPECIALIZATION_EXPRESSION
            );
        }
        other => panic!("expected a specialization, found {:?}", other.kind()),
    }
}

#[test]
fn cast_wins_over_parenthesized_when_followed_by_an_operand() {
    let tree = parse("(int)x");
    match root_expr(&tree) {
        Expr::Cast { ty, operand, .. } => {
            assert_eq!(expr_kind(&tree, *ty), SyntaxKind::WORD_EXPRESSION);
            assert_eq!(expr_kind(&tree, *operand), SyntaxKind::WORD_EXPRESSION);
        }
        other => panic!("expected a cast at the root, found {:?}", other.kind()),
    }
}

#[test]
fn parenthesized_wins_when_nothing_follows() {
    assert_eq!(root_kind("(x)"), SyntaxKind::PARENTHESIZED_EXPRESSION);
}

/// `(x)*y` is ambiguous between a multiplication and a cast of `*y`. The
/// cast alternative ends further into the input at the fork's own frame (the
/// parenthesized alternative stops before the `*`), so the cast is selected.
#[test]
fn cast_wins_the_ambiguous_postfix_star() {
    assert_eq!(root_kind("(x)*y"), SyntaxKind::CAST_EXPRESSION);
}

#[test]
fn access_chain_shape() {
    let tree = parse("a.b->c::d");
    let Expr::Access {
        target: indirect, name: d, ..
    } = root_expr(&tree)
    else {
        panic!("expected an access at the root");
    };
    assert_eq!(word_text(&tree, *d), "d");

    let Expr::Access {
        target: direct, name: c, ..
    } = expr(&tree, *indirect)
    else {
        panic!("expected an indirect access");
    };
    assert_eq!(expr_kind(&tree, *indirect), SyntaxKind::INDIRECT_ACCESS_EXPRESSION);
    assert_eq!(word_text(&tree, *c), "c");

    assert_eq!(expr_kind(&tree, *direct), SyntaxKind::DIRECT_ACCESS_EXPRESSION);
}

#[test]
fn call_of_specialization_shape() {
    let tree = parse("f<T>(x)");
    let Expr::Invoke {
        target, arguments, ..
    } = root_expr(&tree)
    else {
        panic!("expected a call at the root");
    };
    assert_eq!(
        expr_kind(&tree, *target),
        SyntaxKind::SPECIALIZATION_EXPRESSION
    );
    let arena = tree.arena();
    let items = arena.list(arena.argument_list(*arguments).arguments);
    assert_eq!(items.len(), 1);
}

#[test]
fn ternary_with_elided_true_arm() {
    let tree = parse("a ? : b");
    let Expr::Ternary {
        when_true,
        when_false,
        ..
    } = root_expr(&tree)
    else {
        panic!("expected a ternary at the root");
    };
    assert!(when_true.is_none());
    assert_eq!(expr_kind(&tree, *when_false), SyntaxKind::WORD_EXPRESSION);
}

#[test]
fn full_ternary() {
    let tree = parse("a ? b : c");
    let Expr::Ternary { when_true, .. } = root_expr(&tree) else {
        panic!("expected a ternary at the root");
    };
    assert!(when_true.is_some());
}

#[test]
fn verbatim_word_expression() {
    let tree = parse("@class");
    let Expr::Word { token } = root_expr(&tree) else {
        panic!("expected a word at the root");
    };
    assert!(tree.arena().token(*token).is_verbatim());
    assert_eq!(word_text(&tree, *token), "class");
}

#[test]
fn prefix_unary_chain() {
    let tree = parse("-*p");
    let Expr::Unary {
        operator: UnaryOperator::Minus,
        operand,
        ..
    } = root_expr(&tree)
    else {
        panic!("expected a minus at the root");
    };
    assert_eq!(expr_kind(&tree, *operand), SyntaxKind::INDIRECTION_EXPRESSION);
}

#[test]
fn named_call_argument() {
    let tree = parse("f(x: 1)");
    let Expr::Invoke { arguments, .. } = root_expr(&tree) else {
        panic!("expected a call at the root");
    };
    let arena = tree.arena();
    let items = arena.list(arena.argument_list(*arguments).arguments);
    let argument = arena.argument_at(items[0]);
    let name = argument.name.expect("argument is named");
    assert_eq!(word_text(&tree, name), "x");
    assert!(argument.colon.is_some());
}

#[test]
fn logical_operators_bind_in_order() {
    let tree = parse("a && b || c");
    match root_expr(&tree) {
        Expr::Binary {
            operator: BinaryOperator::LogicalOr,
            lhs,
            ..
        } => {
            assert_eq!(expr_kind(&tree, *lhs), SyntaxKind::LOGICAL_AND_EXPRESSION);
        }
        other => panic!("expected logical-or at the root, found {:?}", other.kind()),
    }
}

//#region Fork behavior

/// Resolving the parenthesized-vs-cast fork must not leak any task: every
/// spawned fork is either pruned or resolved by the time the parse returns.
#[test_case("(x)y" ; "cast fork")]
#[test_case("(int)x" ; "keywordless cast fork")]
#[test_case("(a + b) * c" ; "parenthesized fork")]
#[test_case("f<T>(x)" ; "specialization fork")]
#[test_case("a < b > c" ; "relational fork")]
#[test_case("A<B<C<D<x>>>>" ; "nested specializations")]
fn fork_resolution_leaks_nothing(source: &str) {
    let (result, metrics) = parse_expression_with_metrics(source);
    assert!(result.is_ok());
    assert_eq!(metrics.forks_suspended_at_end, 0);
    assert_eq!(
        metrics.forks_spawned,
        metrics.forks_pruned + metrics.forks_live_at_end
    );
}

#[test]
fn cast_fork_selects_the_cast_branch() {
    let (result, metrics) = parse_expression_with_metrics("(x)y");
    let tree = result.expect("expression parses");
    assert_eq!(tree.root_kind(), SyntaxKind::CAST_EXPRESSION);
    // Two alternatives were explored and one was pruned.
    assert!(metrics.forks_pruned >= 1);
}

#[test]
fn deeply_nested_generics_stay_tractable() {
    // Each `<` forks; without positional memoization this family is
    // exponential.
    let (result, metrics) =
        parse_expression_with_metrics("A<B<C<D<E<F<G<H<x>>>>>>>>");
    assert!(result.is_ok());
    assert!(metrics.forks_spawned < 500, "spawned {}", metrics.forks_spawned);
}
//#endregion

//#region Error recovery

#[test]
fn missing_close_paren_recovers_with_a_missing_token() {
    let (result, metrics) = parse_expression_with_metrics("(a");
    let tree = result.expect("best-effort tree");
    assert!(metrics.error_retries > 0);

    let Expr::Parenthesized { close, .. } = root_expr(&tree) else {
        panic!("expected a parenthesized expression at the root");
    };
    assert!(tree.arena().token(*close).is_missing());
}

#[test]
fn empty_input_recovers_with_a_missing_word() {
    let tree = parse("");
    let Expr::Word { token } = root_expr(&tree) else {
        panic!("expected a word at the root");
    };
    assert!(tree.arena().token(*token).is_missing());
}

#[test]
fn missing_access_name_recovers() {
    let tree = parse("a.");
    let Expr::Access { name, .. } = root_expr(&tree) else {
        panic!("expected an access at the root");
    };
    assert!(tree.arena().token(*name).is_missing());
}

#[test]
fn missing_ternary_colon_recovers() {
    let tree = parse("a ? b");
    let Expr::Ternary {
        colon, when_false, ..
    } = root_expr(&tree)
    else {
        panic!("expected a ternary at the root");
    };
    assert!(tree.arena().token(*colon).is_missing());
    // The false arm is a missing word conjured at the end of input.
    assert_eq!(expr_kind(&tree, *when_false), SyntaxKind::WORD_EXPRESSION);
}
//#endregion

#[test]
fn parse_is_deterministic() {
    let source = "f<T>(a, b[i], (x)y) ?? c ? d : -e";
    let first = basalt_syntax::printer::print_tree(&parse(source));
    let second = basalt_syntax::printer::print_tree(&parse(source));
    assert_eq!(first, second);
}

#[test]
fn printer_renders_kinds_and_words() {
    let printed = basalt_syntax::printer::print_tree(&parse("1 + x"));
    assert!(printed.contains("ADDITION_EXPRESSION"));
    assert!(printed.contains("| | 1"));
    assert!(printed.contains("| | x"));
}
