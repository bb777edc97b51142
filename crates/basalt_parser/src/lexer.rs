use basalt_syntax::{
    keyword_from_str, LexError, Newline, SourcePos, StrRef, SyntaxArena, SyntaxId, SyntaxKind,
    Token, TokenId, TokenPayload, Trivia,
};

/// Lex the entire source into the given arena, returning the token ids in
/// order. The sequence always ends with an `Eof` token, which carries any
/// trivia left at the end of the input.
pub(crate) fn lex_into(source: &str, arena: &mut SyntaxArena) -> Vec<TokenId> {
    let mut lexer = Lexer::new(source, arena);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.scan_token();
        let kind = lexer.arena.token(token).kind();
        tokens.push(token);
        if kind == SyntaxKind::EOF {
            break;
        }
    }
    tokens
}

struct Lexer<'s, 'a> {
    source: &'s str,
    bytes: &'s [u8],
    arena: &'a mut SyntaxArena,
    /// Current byte offset into the text.
    position: usize,
    line_index: u32,
    line_start: usize,
    /// Multi-line trivia gathered before the token currently being scanned.
    pending_leading: Vec<SyntaxId>,
}

impl<'s, 'a> Lexer<'s, 'a> {
    fn new(source: &'s str, arena: &'a mut SyntaxArena) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            arena,
            position: 0,
            line_index: 0,
            line_start: 0,
            pending_leading: Vec::new(),
        }
    }

    /// Scan the next token, gathering its leading and trailing trivia. At the
    /// end of input this returns the final `Eof` token and every call after
    /// that would return `Eof` again.
    fn scan_token(&mut self) -> TokenId {
        let leading = self.scan_trivia(true);
        self.pending_leading = leading;

        let pos = self.pos();

        let Some(next) = self.current() else {
            return self.finish_token(SyntaxKind::EOF, pos, TokenPayload::None, None);
        };

        match next {
            b'\'' => self.scan_char_literal(pos),
            b'"' => self.scan_string_literal(pos),
            b'@' => {
                if self.peek(1) == Some(b'"') {
                    self.scan_verbatim_string_literal(pos)
                } else {
                    self.scan_word(pos, true, false)
                }
            }
            b'$' => self.scan_symbol(pos, SyntaxKind::DOLLAR, 1),
            b'(' => self.scan_symbol(pos, SyntaxKind::LPAREN, 1),
            b')' => self.scan_symbol(pos, SyntaxKind::RPAREN, 1),
            b'{' => self.scan_symbol(pos, SyntaxKind::LBRACE, 1),
            b'}' => self.scan_symbol(pos, SyntaxKind::RBRACE, 1),
            b'[' => self.scan_symbol(pos, SyntaxKind::LBRACK, 1),
            b']' => self.scan_symbol(pos, SyntaxKind::RBRACK, 1),
            b'.' => match self.peek(1) {
                Some(b'.') if self.peek(2) == Some(b'.') => {
                    self.scan_symbol(pos, SyntaxKind::TRIPLE_ELLIPSIS, 3)
                }
                Some(b'.') => self.scan_symbol(pos, SyntaxKind::DOUBLE_ELLIPSIS, 2),
                Some(b'0'..=b'9') => self.scan_numeric_literal(pos),
                _ => self.scan_symbol(pos, SyntaxKind::DOT, 1),
            },
            b',' => self.scan_symbol(pos, SyntaxKind::COMMA, 1),
            b':' => {
                if self.peek(1) == Some(b':') {
                    self.scan_symbol(pos, SyntaxKind::SCOPE, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::COLON, 1)
                }
            }
            b';' => self.scan_symbol(pos, SyntaxKind::SEMICOLON, 1),
            b'?' => {
                if self.peek(1) == Some(b'?') {
                    self.scan_symbol(pos, SyntaxKind::COALESCING, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::QUESTION, 1)
                }
            }
            b'+' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::ASSIGN_ADD, 2),
                Some(b'+') => self.scan_symbol(pos, SyntaxKind::INCREMENT, 2),
                _ => self.scan_symbol(pos, SyntaxKind::ADD, 1),
            },
            b'-' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::ASSIGN_SUB, 2),
                Some(b'-') => self.scan_symbol(pos, SyntaxKind::DECREMENT, 2),
                Some(b'>') => self.scan_symbol(pos, SyntaxKind::ARROW, 2),
                _ => self.scan_symbol(pos, SyntaxKind::SUB, 1),
            },
            b'*' => {
                if self.peek(1) == Some(b'=') {
                    self.scan_symbol(pos, SyntaxKind::ASSIGN_MUL, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::MUL, 1)
                }
            }
            b'/' => {
                if self.peek(1) == Some(b'=') {
                    self.scan_symbol(pos, SyntaxKind::ASSIGN_DIV, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::DIV, 1)
                }
            }
            b'%' => {
                if self.peek(1) == Some(b'=') {
                    self.scan_symbol(pos, SyntaxKind::ASSIGN_MOD, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::MOD, 1)
                }
            }
            b'=' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::EQUAL, 2),
                Some(b'>') => self.scan_symbol(pos, SyntaxKind::LAMBDA, 2),
                _ => self.scan_symbol(pos, SyntaxKind::ASSIGN, 1),
            },
            b'<' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::LESS_OR_EQUAL, 2),
                Some(b'<') if self.peek(2) == Some(b'=') => {
                    self.scan_symbol(pos, SyntaxKind::ASSIGN_LHS, 3)
                }
                Some(b'<') => self.scan_symbol(pos, SyntaxKind::LEFT_SHIFT, 2),
                _ => self.scan_symbol(pos, SyntaxKind::LESS, 1),
            },
            // `>>`, `>=`, and `>>=` are deliberately not lexed: the parser
            // composes them from adjacent `>` tokens so that nested generic
            // argument lists stay unambiguous.
            b'>' => self.scan_symbol(pos, SyntaxKind::GREATER, 1),
            b'!' => {
                if self.peek(1) == Some(b'=') {
                    self.scan_symbol(pos, SyntaxKind::NOT_EQUAL, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::LOGICAL_NOT, 1)
                }
            }
            b'&' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::ASSIGN_AND, 2),
                Some(b'&') => self.scan_symbol(pos, SyntaxKind::LOGICAL_AND, 2),
                _ => self.scan_symbol(pos, SyntaxKind::AND, 1),
            },
            b'|' => match self.peek(1) {
                Some(b'=') => self.scan_symbol(pos, SyntaxKind::ASSIGN_OR, 2),
                Some(b'|') => self.scan_symbol(pos, SyntaxKind::LOGICAL_OR, 2),
                _ => self.scan_symbol(pos, SyntaxKind::OR, 1),
            },
            b'~' => self.scan_symbol(pos, SyntaxKind::NOT, 1),
            b'^' => {
                if self.peek(1) == Some(b'=') {
                    self.scan_symbol(pos, SyntaxKind::ASSIGN_XOR, 2)
                } else {
                    self.scan_symbol(pos, SyntaxKind::XOR, 1)
                }
            }
            b'0'..=b'9' => self.scan_numeric_literal(pos),
            _ => self.scan_word(pos, false, false),
        }
    }

    //#region Trivia

    /// Scan a run of trivia. In multi-line mode everything up to the next
    /// significant byte is collected; in single-line mode the scan stops
    /// after the first trivia that ends a line, so a token's trailing trivia
    /// never crosses into the next line.
    fn scan_trivia(&mut self, multi_line: bool) -> Vec<SyntaxId> {
        let mut out = Vec::new();
        let line = self.line_index;

        while let Some(next) = self.current() {
            match next {
                b' ' | b'\t' | b'\x0B' | b'\x0C' | b'\r' | b'\n' => {
                    out.push(self.scan_whitespace_trivia().into());
                    if !multi_line && self.line_index != line {
                        break;
                    }
                }
                b'/' => match self.peek(1) {
                    Some(b'/') => {
                        out.push(self.scan_line_comment_trivia().into());
                        if !multi_line {
                            break;
                        }
                    }
                    Some(b'*') => {
                        out.push(self.scan_block_comment_trivia().into());
                        if !multi_line && self.line_index != line {
                            break;
                        }
                    }
                    _ => break,
                },
                _ if is_error_char(next) => {
                    out.push(self.scan_error_char_trivia().into());
                }
                _ => break,
            }
        }

        out
    }

    /// A run of whitespace characters, ending at (and including) the first
    /// newline. A lone `\r` not followed by `\n` counts as plain whitespace.
    fn scan_whitespace_trivia(&mut self) -> basalt_syntax::TriviaId {
        let pos = self.pos();
        let start = self.position;
        let content_end;
        let mut newline = Newline::None;

        loop {
            match self.current() {
                Some(b'\n') => {
                    content_end = self.position;
                    newline = Newline::Lf;
                    self.advance(1);
                    self.break_line();
                    break;
                }
                Some(b'\r') if self.peek(1) == Some(b'\n') => {
                    content_end = self.position;
                    newline = Newline::CrLf;
                    self.advance(2);
                    self.break_line();
                    break;
                }
                Some(b' ' | b'\t' | b'\x0B' | b'\x0C' | b'\r') => self.advance(1),
                _ => {
                    content_end = self.position;
                    break;
                }
            }
        }

        let content = self.intern_span(start, content_end);
        self.arena.alloc_trivia(Trivia::new(
            SyntaxKind::WHITESPACE_TRIVIA,
            pos,
            content,
            newline,
            None,
        ))
    }

    fn scan_line_comment_trivia(&mut self) -> basalt_syntax::TriviaId {
        let pos = self.pos();
        self.advance(2);

        let start = self.position;
        let content_end;
        let mut newline = Newline::None;

        loop {
            // Jump to the next line-ending candidate in one scan.
            match memchr::memchr2(b'\n', b'\r', &self.bytes[self.position..]) {
                None => {
                    self.position = self.bytes.len();
                    content_end = self.position;
                    break;
                }
                Some(offset) => self.position += offset,
            }

            match self.current() {
                Some(b'\n') => {
                    content_end = self.position;
                    newline = Newline::Lf;
                    self.advance(1);
                    self.break_line();
                    break;
                }
                Some(b'\r') if self.peek(1) == Some(b'\n') => {
                    content_end = self.position;
                    newline = Newline::CrLf;
                    self.advance(2);
                    self.break_line();
                    break;
                }
                // A lone carriage return is comment content.
                _ => self.advance(1),
            }
        }

        let content = self.intern_span(start, content_end);
        self.arena.alloc_trivia(Trivia::new(
            SyntaxKind::LINE_COMMENT_TRIVIA,
            pos,
            content,
            newline,
            None,
        ))
    }

    fn scan_block_comment_trivia(&mut self) -> basalt_syntax::TriviaId {
        let pos = self.pos();
        self.advance(2);

        let start = self.position;
        let content_end;
        let mut error = None;

        loop {
            match memchr::memchr2(b'*', b'\n', &self.bytes[self.position..]) {
                None => {
                    self.position = self.bytes.len();
                    content_end = self.position;
                    error = Some(LexError::OpenBlockComment);
                    break;
                }
                Some(offset) => self.position += offset,
            }

            match self.current() {
                Some(b'\n') => {
                    self.advance(1);
                    self.break_line();
                }
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    content_end = self.position;
                    self.advance(2);
                    break;
                }
                _ => self.advance(1),
            }
        }

        let content = self.intern_span(start, content_end);
        self.arena.alloc_trivia(Trivia::new(
            SyntaxKind::BLOCK_COMMENT_TRIVIA,
            pos,
            content,
            Newline::None,
            error,
        ))
    }

    /// A run of bytes that can never start a token. They are preserved as
    /// trivia rather than dropped so the source still round-trips.
    fn scan_error_char_trivia(&mut self) -> basalt_syntax::TriviaId {
        let pos = self.pos();
        let start = self.position;

        while let Some(next) = self.current() {
            if !is_error_char(next) {
                break;
            }
            self.advance(1);
        }

        let content = self.intern_span(start, self.position);
        self.arena.alloc_trivia(Trivia::new(
            SyntaxKind::ERROR_CHAR_TRIVIA,
            pos,
            content,
            Newline::None,
            None,
        ))
    }
    //#endregion

    //#region Words

    fn scan_word(&mut self, pos: SourcePos, verbatim: bool, sub_token: bool) -> TokenId {
        if verbatim {
            self.advance(1);
        }

        let start = self.position;
        while let Some(next) = self.current() {
            if !is_name_char(next) {
                break;
            }
            self.advance(1);
        }

        let text = &self.source[start..self.position];
        if !verbatim {
            if let Some(keyword) = keyword_from_str(text) {
                return if sub_token {
                    self.finish_sub_token(keyword, pos, TokenPayload::None, None)
                } else {
                    self.finish_token(keyword, pos, TokenPayload::None, None)
                };
            }
        }

        let text = self.intern_span(start, self.position);
        let payload = TokenPayload::Name { text, verbatim };
        if sub_token {
            self.finish_sub_token(SyntaxKind::NAME, pos, payload, None)
        } else {
            self.finish_token(SyntaxKind::NAME, pos, payload, None)
        }
    }

    /// A literal may be directly followed by a user-defined suffix, scanned
    /// as a word sub-token that carries no trivia of its own.
    fn scan_literal_suffix(&mut self) -> Option<TokenId> {
        let pos = self.pos();
        match self.current() {
            Some(b'@') => Some(self.scan_word(pos, true, true)),
            Some(next) if is_name_char(next) => Some(self.scan_word(pos, false, true)),
            _ => None,
        }
    }
    //#endregion

    //#region Literals

    /// Scan one escape sequence, positioned just after the backslash. Returns
    /// the expansion text, or an error when the character is not a valid
    /// escape (which is then left unconsumed). `\u` and `\U` are reserved and
    /// currently expand to nothing.
    fn scan_escape_sequence(&mut self) -> Result<&'static str, LexError> {
        let expansion = match self.current() {
            Some(b'\'') => "\'",
            Some(b'"') => "\"",
            Some(b'\\') => "\\",
            Some(b'0') => "\0",
            Some(b'a') => "\x07",
            Some(b'b') => "\x08",
            Some(b'f') => "\x0C",
            Some(b'n') => "\n",
            Some(b'r') => "\r",
            Some(b't') => "\t",
            Some(b'v') => "\x0B",
            Some(b'u') => "",
            Some(b'U') => "",
            _ => return Err(LexError::InvalidEscapeSequence),
        };
        self.advance(1);
        Ok(expansion)
    }

    fn scan_char_literal(&mut self, pos: SourcePos) -> TokenId {
        let raw_start = self.position;
        self.advance(1);

        let mut cooker = Cooker::new(self.position);
        let mut error = None;
        let content_end;

        loop {
            match self.current() {
                Some(b'\'') => {
                    content_end = self.position;
                    self.advance(1);
                    break;
                }
                Some(b'\\') => {
                    cooker.flush(self.source, self.position);
                    self.advance(1);
                    match self.scan_escape_sequence() {
                        Ok(expansion) => cooker.push(expansion),
                        Err(invalid) => error = error.or(Some(invalid)),
                    }
                    cooker.restart(self.position);
                }
                None => {
                    content_end = self.position;
                    error = error.or(Some(LexError::OpenCharLiteral));
                    break;
                }
                _ => self.advance(1),
            }
        }

        let value = cooker.finish(self.source, content_end, self.arena);
        let raw = self.intern_span(raw_start, self.position);
        let suffix = self.scan_literal_suffix();
        self.finish_token(
            SyntaxKind::CHAR_LITERAL,
            pos,
            TokenPayload::CharLiteral { raw, value, suffix },
            error,
        )
    }

    fn scan_string_literal(&mut self, pos: SourcePos) -> TokenId {
        let raw_start = self.position;
        self.advance(1);

        let mut cooker = Cooker::new(self.position);
        let mut error = None;
        let content_end;

        loop {
            match self.current() {
                Some(b'"') => {
                    content_end = self.position;
                    self.advance(1);
                    break;
                }
                Some(b'\\') => {
                    cooker.flush(self.source, self.position);
                    self.advance(1);
                    match self.scan_escape_sequence() {
                        Ok(expansion) => cooker.push(expansion),
                        Err(invalid) => error = error.or(Some(invalid)),
                    }
                    cooker.restart(self.position);
                }
                // A newline terminates the literal with an error; both a bare
                // `\n` and a `\r\n` pair count. The newline itself is left
                // for the next token's trivia.
                Some(b'\n') => {
                    content_end = self.position;
                    error = error.or(Some(LexError::NewlineInStringLiteral));
                    break;
                }
                Some(b'\r') if self.peek(1) == Some(b'\n') => {
                    content_end = self.position;
                    error = error.or(Some(LexError::NewlineInStringLiteral));
                    break;
                }
                None => {
                    content_end = self.position;
                    error = error.or(Some(LexError::OpenStringLiteral));
                    break;
                }
                _ => self.advance(1),
            }
        }

        let value = cooker.finish(self.source, content_end, self.arena);
        let raw = self.intern_span(raw_start, self.position);
        let suffix = self.scan_literal_suffix();
        self.finish_token(
            SyntaxKind::STRING_LITERAL,
            pos,
            TokenPayload::StringLiteral { raw, value, suffix },
            error,
        )
    }

    /// `@"..."`: no escape processing. A doubled `""` is a literal quote,
    /// `\r\n` collapses to `\n`, and other newlines are kept verbatim.
    fn scan_verbatim_string_literal(&mut self, pos: SourcePos) -> TokenId {
        let raw_start = self.position;
        self.advance(2);

        let mut cooker = Cooker::new(self.position);
        let mut error = None;
        let content_end;

        loop {
            match self.current() {
                Some(b'"') if self.peek(1) == Some(b'"') => {
                    cooker.flush(self.source, self.position);
                    cooker.push("\"");
                    self.advance(2);
                    cooker.restart(self.position);
                }
                Some(b'"') => {
                    content_end = self.position;
                    self.advance(1);
                    break;
                }
                Some(b'\r') if self.peek(1) == Some(b'\n') => {
                    cooker.flush(self.source, self.position);
                    cooker.push("\n");
                    self.advance(2);
                    self.break_line();
                    cooker.restart(self.position);
                }
                Some(b'\r') | Some(b'\n') => {
                    self.advance(1);
                    self.break_line();
                }
                None => {
                    content_end = self.position;
                    error = error.or(Some(LexError::OpenStringLiteral));
                    break;
                }
                _ => self.advance(1),
            }
        }

        let value = cooker.finish(self.source, content_end, self.arena);
        let raw = self.intern_span(raw_start, self.position);
        let suffix = self.scan_literal_suffix();
        self.finish_token(
            SyntaxKind::STRING_LITERAL,
            pos,
            TokenPayload::StringLiteral { raw, value, suffix },
            error,
        )
    }

    /// Accumulate digits of the given radix into `acc`, returning how many
    /// digits were consumed. Accumulation saturates rather than overflowing.
    fn scan_integer(&mut self, radix: i64, acc: &mut i64) -> u32 {
        let mut digits = 0;

        while let Some(next) = self.current() {
            let digit = match next {
                b'0'..=b'9' => (next - b'0') as i64,
                b'a'..=b'f' if radix > 10 => 10 + (next - b'a') as i64,
                b'A'..=b'F' if radix > 10 => 10 + (next - b'A') as i64,
                _ => break,
            };
            if digit >= radix {
                break;
            }

            self.advance(1);
            *acc = acc.saturating_mul(radix).saturating_add(digit);
            digits += 1;
        }

        digits
    }

    fn scan_numeric_literal(&mut self, pos: SourcePos) -> TokenId {
        let raw_start = self.position;

        let mut radix = 10;
        if self.current() == Some(b'0') {
            self.advance(1);
            match self.current() {
                Some(b'b' | b'B') => {
                    self.advance(1);
                    radix = 2;
                }
                Some(b'o' | b'O') => {
                    self.advance(1);
                    radix = 8;
                }
                Some(b'x' | b'X') => {
                    self.advance(1);
                    radix = 16;
                }
                _ => {}
            }
        }

        let mut num: i64 = 0;
        self.scan_integer(radix, &mut num);

        // Fractional digits all count toward the scale, zeros included:
        // `0.01` is 1/100.
        let mut frac_digits = 0;
        if self.current() == Some(b'.') {
            self.advance(1);
            frac_digits = self.scan_integer(radix, &mut num);
        }

        let mut value = basalt_syntax::Rational::from(num);
        let mut error = None;

        let base = match self.current() {
            Some(b'e' | b'E') => Some(10),
            Some(b'p' | b'P') => Some(2),
            _ => None,
        };
        if let Some(base) = base {
            self.advance(1);

            let mut positive = true;
            match self.current() {
                Some(b'-') => {
                    positive = false;
                    self.advance(1);
                }
                Some(b'+') => {
                    self.advance(1);
                }
                _ => {}
            }

            let mut exponent: i64 = 0;
            if self.scan_integer(10, &mut exponent) > 0 {
                let scale = integer_pow(base, exponent);
                if positive {
                    value.scale_up(scale);
                } else {
                    value.scale_down(scale);
                }
            } else {
                error = Some(LexError::InvalidNumericExponent);
            }
        }

        if frac_digits > 0 {
            value.scale_down(integer_pow(radix, frac_digits as i64));
        }

        let raw = self.intern_span(raw_start, self.position);
        let suffix = self.scan_literal_suffix();
        self.finish_token(
            SyntaxKind::NUMERIC_LITERAL,
            pos,
            TokenPayload::NumericLiteral { raw, value, suffix },
            error,
        )
    }
    //#endregion

    //#region Internal API

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn advance(&mut self, count: usize) {
        debug_assert!(self.position + count <= self.bytes.len());
        self.position += count;
    }

    fn break_line(&mut self) {
        self.line_index += 1;
        self.line_start = self.position;
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(self.line_index, (self.position - self.line_start) as u32)
    }

    fn intern_span(&mut self, start: usize, end: usize) -> StrRef {
        self.arena.intern(&self.source[start..end])
    }

    /// Finish the token: scan its trailing trivia (same-line only), attach
    /// the leading trivia gathered before it, and allocate the node.
    fn finish_token(
        &mut self,
        kind: SyntaxKind,
        pos: SourcePos,
        payload: TokenPayload,
        error: Option<LexError>,
    ) -> TokenId {
        let trailing = self.scan_trivia(false);
        let leading = std::mem::take(&mut self.pending_leading);
        let leading = self.arena.alloc_list(leading);
        let trailing = self.arena.alloc_list(trailing);
        self.arena
            .alloc_token(Token::new(kind, pos, leading, trailing, payload, error))
    }

    /// Sub-tokens (literal suffixes) carry no trivia at all.
    fn finish_sub_token(
        &mut self,
        kind: SyntaxKind,
        pos: SourcePos,
        payload: TokenPayload,
        error: Option<LexError>,
    ) -> TokenId {
        let leading = self.arena.alloc_list([]);
        let trailing = self.arena.alloc_list([]);
        self.arena
            .alloc_token(Token::new(kind, pos, leading, trailing, payload, error))
    }

    fn scan_symbol(&mut self, pos: SourcePos, kind: SyntaxKind, len: usize) -> TokenId {
        self.advance(len);
        self.finish_token(kind, pos, TokenPayload::None, None)
    }
    //#endregion
}

/// Incremental builder for literal content. As long as no escape or collapse
/// has occurred the value is a plain span of the source and no buffer is
/// needed; the first rewrite switches to an owned buffer.
struct Cooker {
    segment_start: usize,
    cooked: Option<String>,
}

impl Cooker {
    fn new(start: usize) -> Self {
        Self {
            segment_start: start,
            cooked: None,
        }
    }

    fn flush(&mut self, source: &str, end: usize) {
        let segment = &source[self.segment_start..end];
        self.cooked.get_or_insert_with(String::new).push_str(segment);
    }

    fn push(&mut self, expansion: &str) {
        self.cooked
            .get_or_insert_with(String::new)
            .push_str(expansion);
    }

    fn restart(&mut self, start: usize) {
        self.segment_start = start;
    }

    fn finish(mut self, source: &str, end: usize, arena: &mut SyntaxArena) -> StrRef {
        match self.cooked.take() {
            Some(mut cooked) => {
                cooked.push_str(&source[self.segment_start..end]);
                arena.intern(&cooked)
            }
            None => arena.intern(&source[self.segment_start..end]),
        }
    }
}

fn is_name_char(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_')
}

/// True for bytes that can never begin trivia or a token: everything except
/// whitespace, word characters, digits, and the recognized punctuation.
fn is_error_char(byte: u8) -> bool {
    !matches!(byte,
        b' ' | b'\t' | b'\x0B' | b'\x0C' | b'\r' | b'\n'
        | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_'
        | b'\'' | b'"' | b'@' | b'$'
        | b'(' | b')' | b'{' | b'}' | b'[' | b']'
        | b'.' | b',' | b':' | b';' | b'?'
        | b'+' | b'-' | b'*' | b'/' | b'%'
        | b'=' | b'<' | b'>' | b'!' | b'&' | b'|' | b'~' | b'^')
}

fn integer_pow(base: i64, exponent: i64) -> i64 {
    let mut result: i64 = 1;
    for _ in 0..exponent {
        result = result.saturating_mul(base);
        if result == i64::MAX {
            break;
        }
    }
    result
}
