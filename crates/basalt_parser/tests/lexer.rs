use basalt_parser::lex;
use basalt_syntax::{LexError, Rational, SyntaxKind, TokenPayload};
use test_case::test_case;

/// Concatenating every token's leading trivia, lexeme, and trailing trivia
/// must reproduce the input byte-for-byte.
#[test_case("" ; "empty input")]
#[test_case("   \t  " ; "whitespace only")]
#[test_case("1 + 2 * 3" ; "simple expression")]
#[test_case("a+b\t// trailing comment\nnext" ; "line comment")]
#[test_case("/* block\n comment */ x" ; "block comment")]
#[test_case("x /* never closed" ; "open block comment")]
#[test_case("a\r\nb\nc" ; "mixed newlines")]
#[test_case("@\"verbatim \"\" text\" tail" ; "verbatim string")]
#[test_case("'c' \"str\\n\" 0x1F 1.5f @name" ; "literals and words")]
#[test_case("x §§ y € z" ; "error characters")]
#[test_case("a <<= b ?? c :: d ... e .. f" ; "compound punctuation")]
#[test_case("\"broken\nline\"" ; "newline in string literal")]
#[test_case("while @while iword" ; "keywords and verbatim words")]
fn round_trip(source: &str) {
    let tokens = lex(source);
    assert_eq!(tokens.source_text(), source);
}

#[test]
fn lexing_is_deterministic() {
    let source = "f<T>(x) + 0x1.8p+1 // done\n";
    let first = lex(source);
    let second = lex(source);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.pos(), b.pos());
    }
}

#[test]
fn token_positions_increase() {
    let source = "alpha beta\n  gamma /* x */ delta\r\nepsilon";
    let tokens = lex(source);
    let mut previous = None;
    for token in tokens.iter() {
        if token.kind() == SyntaxKind::EOF {
            break;
        }
        let pos = (token.pos().line(), token.pos().column());
        if let Some(previous) = previous {
            assert!(pos > previous, "{pos:?} does not advance past {previous:?}");
        }
        previous = Some(pos);
    }
}

#[test]
fn expected_positions() {
    let tokens = lex("a\n  b\r\nc");
    let positions: Vec<(u32, u32)> = tokens
        .iter()
        .map(|token| (token.pos().line(), token.pos().column()))
        .collect();
    assert_eq!(positions, vec![(0, 0), (1, 2), (2, 0), (2, 1)]);
}

/// Trailing trivia never crosses a line: at most one newline-bearing trivia,
/// and always as the last element.
#[test_case("a \nb")]
#[test_case("a // comment\nb // another")]
#[test_case("a /* multi\nline */ b")]
#[test_case("x  y\t\tz\n\n\nw")]
fn trailing_trivia_stops_at_newline(source: &str) {
    let tokens = lex(source);
    let arena = tokens.arena();
    for token in tokens.iter() {
        let trailing = arena.list(token.trailing());
        for (at, id) in trailing.iter().enumerate() {
            if arena.trivia_at(*id).newline().is_present() {
                assert_eq!(at, trailing.len() - 1, "newline trivia must come last");
            }
        }
    }
}

#[test]
fn kinds_for_punctuation() {
    let source = "< <= << <<= > :: : . .. ... ? ?? -> => != ~ ^=";
    let kinds: Vec<SyntaxKind> = lex(source).iter().map(|token| token.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::LESS,
            SyntaxKind::LESS_OR_EQUAL,
            SyntaxKind::LEFT_SHIFT,
            SyntaxKind::ASSIGN_LHS,
            SyntaxKind::GREATER,
            SyntaxKind::SCOPE,
            SyntaxKind::COLON,
            SyntaxKind::DOT,
            SyntaxKind::DOUBLE_ELLIPSIS,
            SyntaxKind::TRIPLE_ELLIPSIS,
            SyntaxKind::QUESTION,
            SyntaxKind::COALESCING,
            SyntaxKind::ARROW,
            SyntaxKind::LAMBDA,
            SyntaxKind::NOT_EQUAL,
            SyntaxKind::NOT,
            SyntaxKind::ASSIGN_XOR,
            SyntaxKind::EOF,
        ]
    );
}

/// `>>` is never a single token; adjacent `>` tokens are left for the parser
/// to compose.
#[test]
fn greater_greater_is_two_tokens() {
    let kinds: Vec<SyntaxKind> = lex("a >> b").iter().map(|token| token.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::NAME,
            SyntaxKind::GREATER,
            SyntaxKind::GREATER,
            SyntaxKind::NAME,
            SyntaxKind::EOF,
        ]
    );
}

#[test]
fn keywords_resolve_unless_verbatim() {
    let tokens = lex("while @while wend");
    assert_eq!(tokens.token(0).kind(), SyntaxKind::WHILE_KW);

    let verbatim = tokens.token(1);
    assert_eq!(verbatim.kind(), SyntaxKind::NAME);
    assert!(verbatim.is_verbatim());
    assert_eq!(verbatim.word_text(tokens.arena()), Some("while"));

    let name = tokens.token(2);
    assert_eq!(name.kind(), SyntaxKind::NAME);
    assert!(!name.is_verbatim());
    assert_eq!(name.word_text(tokens.arena()), Some("wend"));
}

#[test_case("1.5", 3, 2 ; "decimal fraction")]
#[test_case("0.1", 1, 10 ; "tenth")]
#[test_case("0.01", 1, 100 ; "hundredth keeps leading zero")]
#[test_case(".5", 1, 2 ; "leading dot")]
#[test_case("0x1.8p+1", 3, 1 ; "hex float with binary exponent")]
#[test_case("1e2", 100, 1 ; "decimal exponent")]
#[test_case("1e-2", 1, 100 ; "negative exponent")]
#[test_case("0b101", 5, 1 ; "binary")]
#[test_case("0o17", 15, 1 ; "octal")]
#[test_case("0x10", 16, 1 ; "hexadecimal")]
#[test_case("42", 42, 1 ; "integer")]
fn numeric_rational_values(source: &str, numerator: i64, denominator: i64) {
    let tokens = lex(source);
    let token = tokens.token(0);
    assert_eq!(token.kind(), SyntaxKind::NUMERIC_LITERAL);
    assert_eq!(
        token.numeric_value(),
        Some(Rational::new(numerator, denominator))
    );
}

#[test]
fn numeric_suffix_is_a_sub_token() {
    let tokens = lex("1.5f");
    let token = tokens.token(0);
    assert_eq!(token.numeric_value(), Some(Rational::new(3, 2)));

    let suffix = token.suffix().expect("literal has a suffix");
    let suffix = tokens.arena().token(suffix);
    assert_eq!(suffix.kind(), SyntaxKind::NAME);
    assert_eq!(suffix.word_text(tokens.arena()), Some("f"));
    assert!(tokens.arena().list(suffix.leading()).is_empty());
    assert!(tokens.arena().list(suffix.trailing()).is_empty());
}

#[test]
fn invalid_exponent_still_produces_the_literal() {
    let tokens = lex("1e");
    let token = tokens.token(0);
    assert_eq!(token.kind(), SyntaxKind::NUMERIC_LITERAL);
    assert_eq!(token.error(), Some(LexError::InvalidNumericExponent));
    assert_eq!(token.numeric_value(), Some(Rational::from(1)));
}

#[test]
fn string_escapes_unescape() {
    let tokens = lex(r#""a\tb\\c\"d""#);
    let token = tokens.token(0);
    assert_eq!(token.literal_value(tokens.arena()), Some("a\tb\\c\"d"));
    assert_eq!(token.error(), None);
}

#[test]
fn reserved_unicode_escapes_expand_to_nothing() {
    let tokens = lex(r#""a\u0041b""#);
    let token = tokens.token(0);
    // `\u` is consumed but produces no expansion; the digits remain content.
    assert_eq!(token.literal_value(tokens.arena()), Some("a0041b"));
}

#[test]
fn newline_terminates_string_with_error() {
    let tokens = lex("\"abc\ndef\"");
    let first = tokens.token(0);
    assert_eq!(first.kind(), SyntaxKind::STRING_LITERAL);
    assert_eq!(first.error(), Some(LexError::NewlineInStringLiteral));
    assert_eq!(first.literal_value(tokens.arena()), Some("abc"));

    // Lexing continues: the rest of the input still becomes tokens.
    assert_eq!(tokens.token(1).kind(), SyntaxKind::NAME);
    assert_eq!(tokens.token(2).kind(), SyntaxKind::STRING_LITERAL);
    assert_eq!(tokens.token(2).error(), Some(LexError::OpenStringLiteral));
}

#[test]
fn verbatim_string_rules() {
    let tokens = lex("@\"say \"\"hi\"\"\r\nnext line\"");
    let token = tokens.token(0);
    assert_eq!(token.kind(), SyntaxKind::STRING_LITERAL);
    assert_eq!(
        token.literal_value(tokens.arena()),
        Some("say \"hi\"\nnext line")
    );
}

#[test]
fn char_literal_with_invalid_escape() {
    let tokens = lex(r"'\q'");
    let token = tokens.token(0);
    assert_eq!(token.kind(), SyntaxKind::CHAR_LITERAL);
    assert_eq!(token.error(), Some(LexError::InvalidEscapeSequence));
    assert_eq!(token.literal_value(tokens.arena()), Some("q"));
}

#[test]
fn unterminated_block_comment_is_marked() {
    let tokens = lex("x /* open");
    let arena = tokens.arena();
    let trailing = arena.list(tokens.token(0).trailing());
    let comment = arena.trivia_at(*trailing.last().expect("comment trivia"));
    assert_eq!(comment.kind(), SyntaxKind::BLOCK_COMMENT_TRIVIA);
    assert_eq!(comment.error(), Some(LexError::OpenBlockComment));
    assert_eq!(comment.content(arena), " open");
}

#[test]
fn error_characters_are_preserved_as_trivia() {
    let source = "a § b";
    let tokens = lex(source);
    let arena = tokens.arena();
    // The error run lands in the trailing trivia of `a`.
    let trailing = arena.list(tokens.token(0).trailing());
    let has_error_chars = trailing
        .iter()
        .any(|id| arena.trivia_at(*id).kind() == SyntaxKind::ERROR_CHAR_TRIVIA);
    assert!(has_error_chars);
    assert_eq!(tokens.source_text(), source);
}

#[test]
fn eof_collects_final_trivia() {
    let tokens = lex("x  // the end");
    let last = tokens.token(tokens.len() - 1);
    assert_eq!(last.kind(), SyntaxKind::EOF);
    // Same-line trivia belongs to `x`; Eof itself is empty here.
    assert!(tokens.arena().list(last.leading()).is_empty());

    let tokens = lex("x\n// floating\n");
    let last = tokens.token(tokens.len() - 1);
    assert_eq!(last.kind(), SyntaxKind::EOF);
    assert!(!tokens.arena().list(last.leading()).is_empty());
}

#[test]
fn name_payloads_are_interned() {
    let tokens = lex("alpha");
    match tokens.token(0).payload() {
        TokenPayload::Name { verbatim, .. } => assert!(!verbatim),
        payload => panic!("expected a name payload, found {payload:?}"),
    }
}
