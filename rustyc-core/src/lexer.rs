//! Lexer: source text to tokens.
//!
//! The lexer is total. Every malformed input is reported through the
//! [`DiagnosticsEngine`] and skipped, and the token stream always ends with
//! exactly one [`TokenKind::Eof`].

use crate::cursor::Cursor;
use crate::diagnostic::{DiagId, DiagnosticsEngine};
use crate::span::{FileId, Span};
use crate::token::{Token, TokenKind, TokenValue, keyword};

/// Lex a source string into tokens.
pub fn tokenize(file: FileId, source: &str, diags: &mut DiagnosticsEngine) -> Vec<Token> {
    let mut lexer = Lexer {
        file,
        source,
        cursor: Cursor::new(source.as_bytes()),
        diags,
    };
    let tokens = lexer.run();
    tracing::debug!(tokens = tokens.len(), "lexed translation unit");
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    fn from_suffix(suffix: &str) -> Option<IntWidth> {
        Some(match suffix {
            "i8" => IntWidth::I8,
            "i16" => IntWidth::I16,
            "i32" => IntWidth::I32,
            "i64" => IntWidth::I64,
            "u8" => IntWidth::U8,
            "u16" => IntWidth::U16,
            "u32" => IntWidth::U32,
            "u64" => IntWidth::U64,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
            IntWidth::U64 => "u64",
        }
    }

    fn max(self) -> u64 {
        match self {
            IntWidth::I8 => i8::MAX as u64,
            IntWidth::I16 => i16::MAX as u64,
            IntWidth::I32 => i32::MAX as u64,
            IntWidth::I64 => i64::MAX as u64,
            IntWidth::U8 => u8::MAX as u64,
            IntWidth::U16 => u16::MAX as u64,
            IntWidth::U32 => u32::MAX as u64,
            IntWidth::U64 => u64::MAX,
        }
    }

    /// Truncating conversion, two's complement for the signed widths.
    fn value(self, raw: u64) -> TokenValue {
        match self {
            IntWidth::I8 => TokenValue::I8(raw as i8),
            IntWidth::I16 => TokenValue::I16(raw as i16),
            IntWidth::I32 => TokenValue::I32(raw as i32),
            IntWidth::I64 => TokenValue::I64(raw as i64),
            IntWidth::U8 => TokenValue::U8(raw as u8),
            IntWidth::U16 => TokenValue::U16(raw as u16),
            IntWidth::U32 => TokenValue::U32(raw as u32),
            IntWidth::U64 => TokenValue::U64(raw),
        }
    }
}

struct Lexer<'src, 'd> {
    file: FileId,
    source: &'src str,
    cursor: Cursor<'src, u8>,
    diags: &'d mut DiagnosticsEngine,
}

impl<'src> Lexer<'src, '_> {
    fn run(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            if self.cursor.is_end() {
                break;
            }

            let start = self.pos();
            let ch = self.cursor.peek_byte();
            let token = if is_ident_start(ch) {
                Some(self.lex_ident_or_keyword(start))
            } else if ch.is_ascii_digit() {
                Some(self.lex_number(start))
            } else if ch == b'"' {
                self.lex_string(start)
            } else {
                self.lex_punct(start)
            };

            if let Some(tok) = token {
                tokens.push(tok);
            }
        }

        let end = self.source.len() as u32;
        tokens.push(Token::new(TokenKind::Eof, Span::new(self.file, end, end)));
        tokens
    }

    fn pos(&self) -> u32 {
        self.cursor.position() as u32
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(self.file, start, self.pos())
    }

    fn text_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.cursor.position()]
    }

    fn report(&mut self, id: DiagId, start: u32, message: impl Into<String>) {
        let span = self.span_from(start);
        self.diags.report(id, span, message);
    }

    /// Whitespace, `// line` comments and nested `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.skip_while(is_whitespace);
            match (self.cursor.peek_byte(), self.cursor.peek_byte_nth(1)) {
                (b'/', b'/') => {
                    self.cursor.skip_while(|b| b != b'\n');
                }
                (b'/', b'*') => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos();
        self.cursor.skip_n(2);
        let mut depth = 1usize;
        while depth > 0 {
            match (self.cursor.peek().copied(), self.cursor.peek_byte_nth(1)) {
                (None, _) => {
                    self.report(
                        DiagId::ErrUnterminatedComment,
                        start,
                        "unterminated block comment",
                    );
                    return;
                }
                (Some(b'/'), b'*') => {
                    self.cursor.skip_n(2);
                    depth += 1;
                }
                (Some(b'*'), b'/') => {
                    self.cursor.skip_n(2);
                    depth -= 1;
                }
                _ => self.cursor.skip(),
            }
        }
    }

    fn simple(&mut self, kind: TokenKind, len: usize, start: u32) -> Option<Token> {
        self.cursor.skip_n(len);
        Some(Token::new(kind, self.span_from(start)))
    }

    fn lex_punct(&mut self, start: u32) -> Option<Token> {
        use TokenKind::*;
        let next = self.cursor.peek_byte_nth(1);
        match self.cursor.peek_byte() {
            b'+' => self.simple(Plus, 1, start),
            b'-' if next == b'>' => self.simple(RArrow, 2, start),
            b'-' => self.simple(Minus, 1, start),
            b'*' => self.simple(Star, 1, start),
            b'/' => self.simple(Slash, 1, start),
            b'%' => self.simple(Percent, 1, start),
            b'^' => self.simple(Caret, 1, start),
            b'&' if next == b'&' => self.simple(AndAnd, 2, start),
            b'&' => self.simple(And, 1, start),
            b'|' if next == b'|' => self.simple(OrOr, 2, start),
            b'|' => self.simple(Or, 1, start),
            b'=' if next == b'=' => self.simple(EqEq, 2, start),
            b'=' => self.simple(TokenKind::Eq, 1, start),
            b'!' if next == b'=' => self.simple(Ne, 2, start),
            b'!' => self.simple(Not, 1, start),
            b'<' if next == b'=' => self.simple(Le, 2, start),
            b'<' if next == b'<' => self.simple(Shl, 2, start),
            b'<' => self.simple(Lt, 1, start),
            b'>' if next == b'=' => self.simple(Ge, 2, start),
            b'>' if next == b'>' => self.simple(Shr, 2, start),
            b'>' => self.simple(Gt, 1, start),
            b';' => self.simple(Semi, 1, start),
            b':' => self.simple(Colon, 1, start),
            b',' => self.simple(Comma, 1, start),
            b'.' => self.simple(Dot, 1, start),
            b'(' => self.simple(LParen, 1, start),
            b')' => self.simple(RParen, 1, start),
            b'{' => self.simple(LBrace, 1, start),
            b'}' => self.simple(RBrace, 1, start),
            b'[' => self.simple(LBracket, 1, start),
            b']' => self.simple(RBracket, 1, start),
            _ => {
                self.unexpected_char(start);
                None
            }
        }
    }

    fn unexpected_char(&mut self, start: u32) {
        let ch = self.source[start as usize..].chars().next().unwrap_or('\0');
        self.cursor.skip_n(ch.len_utf8());
        self.report(
            DiagId::ErrUnexpectedChar,
            start,
            format!("unexpected character `{}`", ch.escape_default()),
        );
    }

    fn lex_string(&mut self, start: u32) -> Option<Token> {
        // Consume the opening quote
        self.cursor.skip();
        let content_start = self.cursor.position();
        while let Some(&ch) = self.cursor.peek() {
            match ch {
                b'"' => {
                    let contents = &self.source[content_start..self.cursor.position()];
                    self.cursor.skip();
                    return Some(Token::with_value(
                        TokenKind::StringLiteral,
                        TokenValue::Str(contents.to_string()),
                        self.span_from(start),
                    ));
                }
                b'\\' => self.cursor.skip_n(2),
                _ => self.cursor.skip(),
            }
        }

        self.report(
            DiagId::ErrUnterminatedString,
            start,
            "unterminated string literal",
        );
        None
    }

    fn lex_ident_or_keyword(&mut self, start: u32) -> Token {
        self.cursor.skip_while(is_ident_continue);
        let span = self.span_from(start);
        let text = self.text_from(start);
        match text {
            "true" => Token::with_value(TokenKind::Literal, TokenValue::Bool(true), span),
            "false" => Token::with_value(TokenKind::Literal, TokenValue::Bool(false), span),
            _ => match keyword(text) {
                Some(kind) => Token::new(kind, span),
                None => Token::with_value(
                    TokenKind::Identifier,
                    TokenValue::Str(text.to_string()),
                    span,
                ),
            },
        }
    }

    fn lex_number(&mut self, start: u32) -> Token {
        let base = match (self.cursor.peek_byte(), self.cursor.peek_byte_nth(1)) {
            (b'0', b'b') => 2,
            (b'0', b'o') => 8,
            (b'0', b'x') => 16,
            _ => 10,
        };
        if base != 10 {
            self.cursor.skip_n(2);
        }
        self.cursor.skip_while(|b| is_digit_in(b, base) || b == b'_');

        if base == 10 && self.at_float_continuation() {
            self.cursor.reset_to(start as usize);
            return self.lex_float(start);
        }
        if base != 10
            && self.cursor.peek_byte() == b'.'
            && self.cursor.peek_byte_nth(1).is_ascii_digit()
        {
            let dot = self.pos();
            self.cursor.skip();
            self.cursor.skip_while(is_ident_continue);
            self.report(
                DiagId::ErrInvalidLiteral,
                dot,
                format!("base {base} literals cannot have a fractional part"),
            );
            let end = self.cursor.position();
            self.cursor.reset_to(start as usize);
            let token = self.lex_integer(start, base);
            self.cursor.reset_to(end);
            return token;
        }

        self.cursor.reset_to(start as usize);
        self.lex_integer(start, base)
    }

    /// `.` not followed by another `.` or an identifier, or an exponent.
    fn at_float_continuation(&self) -> bool {
        let next = self.cursor.peek_byte_nth(1);
        match self.cursor.peek_byte() {
            b'.' => next != b'.' && !is_ident_start(next),
            b'e' | b'E' => self.at_exponent(),
            _ => false,
        }
    }

    fn lex_integer(&mut self, start: u32, base: u32) -> Token {
        if base != 10 {
            self.cursor.skip_n(2);
        }

        let mut value: u64 = 0;
        let mut digits = 0usize;
        let mut overflow = false;
        while let Some(&ch) = self.cursor.peek() {
            if ch == b'_' {
                self.cursor.skip();
                continue;
            }
            let Some(digit) = (ch as char).to_digit(base) else {
                break;
            };
            match value
                .checked_mul(base as u64)
                .and_then(|v| v.checked_add(digit as u64))
            {
                Some(v) => value = v,
                None => overflow = true,
            }
            digits += 1;
            self.cursor.skip();
        }

        if digits == 0 {
            self.report(
                DiagId::ErrInvalidLiteral,
                start,
                "missing digits after the integer base prefix",
            );
        }
        if overflow {
            self.report(
                DiagId::ErrInvalidLiteral,
                start,
                "integer literal is too large",
            );
        }

        let width = self.lex_int_suffix();
        if !overflow && value > width.max() {
            self.report(
                DiagId::WarnLiteralOutOfRange,
                start,
                format!("literal out of range for `{}`", width.name()),
            );
        }

        Token::with_value(TokenKind::Literal, width.value(value), self.span_from(start))
    }

    fn lex_int_suffix(&mut self) -> IntWidth {
        let suffix_start = self.pos();
        if self.cursor.skip_while(is_ident_continue) == 0 {
            return IntWidth::I32;
        }
        let suffix = self.text_from(suffix_start);
        match IntWidth::from_suffix(suffix) {
            Some(width) => width,
            None => {
                self.report(
                    DiagId::ErrInvalidIntegerSuffix,
                    suffix_start,
                    format!("invalid suffix `{suffix}` for number literal"),
                );
                IntWidth::I32
            }
        }
    }

    /// Rescan a decimal literal as a float: `digits [. digits] [e [+-] digits]`.
    fn lex_float(&mut self, start: u32) -> Token {
        let mut text = String::new();
        take_digits(&mut self.cursor, &mut text);
        if self.cursor.peek_byte() == b'.' {
            let next = self.cursor.peek_byte_nth(1);
            if next != b'.' && !is_ident_start(next) {
                self.cursor.skip();
                text.push('.');
                take_digits(&mut self.cursor, &mut text);
            }
        }
        if self.at_exponent() {
            text.push('e');
            self.cursor.skip();
            if let sign @ (b'+' | b'-') = self.cursor.peek_byte() {
                text.push(sign as char);
                self.cursor.skip();
            }
            take_digits(&mut self.cursor, &mut text);
        }

        let suffix_start = self.pos();
        self.cursor.skip_while(is_ident_continue);
        let suffix = self.text_from(suffix_start);
        let value = match suffix {
            "f32" => text.parse::<f32>().map(TokenValue::F32).ok(),
            "" | "f64" => text.parse::<f64>().map(TokenValue::F64).ok(),
            _ => {
                self.report(
                    DiagId::ErrInvalidFloatSuffix,
                    suffix_start,
                    format!("invalid suffix `{suffix}` for float literal"),
                );
                text.parse::<f64>().map(TokenValue::F64).ok()
            }
        };
        let value = value.unwrap_or_else(|| {
            self.report(
                DiagId::ErrInvalidLiteral,
                start,
                format!("invalid float literal `{text}`"),
            );
            TokenValue::F64(0.0)
        });

        Token::with_value(TokenKind::Literal, value, self.span_from(start))
    }

    fn at_exponent(&self) -> bool {
        let next = self.cursor.peek_byte_nth(1);
        matches!(self.cursor.peek_byte(), b'e' | b'E')
            && (next.is_ascii_digit()
                || (matches!(next, b'+' | b'-') && self.cursor.peek_byte_nth(2).is_ascii_digit()))
    }
}

/// Appends decimal digits to `text`, dropping `_` separators.
fn take_digits(cursor: &mut Cursor<'_, u8>, text: &mut String) {
    while let Some(&ch) = cursor.peek() {
        match ch {
            b'_' => {}
            b'0'..=b'9' => text.push(ch as char),
            _ => break,
        }
        cursor.skip();
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

fn is_digit_in(ch: u8, base: u32) -> bool {
    (ch as char).is_digit(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, DiagnosticsEngine) {
        let mut diags = DiagnosticsEngine::new();
        let tokens = tokenize(FileId(0), source, &mut diags);
        (tokens, diags)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|t| t.kind).collect()
    }

    fn single_value(source: &str) -> TokenValue {
        let (tokens, diags) = lex(source);
        assert_eq!(diags.num_errors(), 0, "{:?}", diags.diagnostics());
        assert_eq!(tokens.len(), 2, "{tokens:?}");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
        tokens[0].value.clone().expect("literal payload")
    }

    #[test]
    fn lexes_integer_literals_with_suffixes() {
        assert_eq!(single_value("123i8"), TokenValue::I8(123));
        assert_eq!(single_value("0xAB_CD"), TokenValue::I32(0xABCD));
        assert_eq!(single_value("0b1010u8"), TokenValue::U8(10));
        assert_eq!(single_value("0o777_u16"), TokenValue::U16(0o777));
        assert_eq!(single_value("0x_ff_i64"), TokenValue::I64(255));
        assert_eq!(single_value("1_000_000"), TokenValue::I32(1_000_000));
        assert_eq!(single_value("42"), TokenValue::I32(42));
        assert_eq!(single_value("18446744073709551615u64"), TokenValue::U64(u64::MAX));
    }

    #[test]
    fn lexes_float_literals() {
        assert_eq!(single_value("3.14f32"), TokenValue::F32(3.14));
        assert_eq!(single_value("3.14"), TokenValue::F64(3.14));
        assert_eq!(single_value("2.5_f64"), TokenValue::F64(2.5));
        assert_eq!(single_value("1e3"), TokenValue::F64(1000.0));
        assert_eq!(single_value("1_0.2_5"), TokenValue::F64(10.25));
        assert_eq!(single_value("1."), TokenValue::F64(1.0));
    }

    #[test]
    fn rendered_literals_lex_back_to_themselves() {
        for value in [
            TokenValue::I8(123),
            TokenValue::U16(65535),
            TokenValue::I64(-0i64),
            TokenValue::U64(7),
            TokenValue::I32(0xABCD),
            TokenValue::F32(3.14),
            TokenValue::F64(0.5),
            TokenValue::Bool(false),
        ] {
            assert_eq!(single_value(&value.to_string()), value);
        }
    }

    #[test]
    fn booleans_are_literals_not_identifiers() {
        let (tokens, _) = lex("true false truthy");
        assert_eq!(tokens[0].value, Some(TokenValue::Bool(true)));
        assert_eq!(tokens[1].value, Some(TokenValue::Bool(false)));
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].ident(), Some("truthy"));
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("fn let if else loop while return extern _x1 struct"),
            vec![
                KwFn, KwLet, KwIf, KwElse, KwLoop, KwWhile, KwReturn, KwExtern, Identifier,
                KwStruct, Eof
            ]
        );
    }

    #[test]
    fn lexes_two_character_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("-> == <= >= != << >> && || = < > ! - & |"),
            vec![
                RArrow, EqEq, Le, Ge, Ne, Shl, Shr, AndAnd, OrOr, TokenKind::Eq, Lt, Gt, Not,
                Minus, And, Or, Eof
            ]
        );
    }

    #[test]
    fn skips_comments() {
        use TokenKind::*;
        assert_eq!(
            kinds("a // line\n/* block /* nested */ still */ b"),
            vec![Identifier, Identifier, Eof]
        );
        let (_, diags) = lex("a /* open");
        assert_eq!(diags.count(DiagId::ErrUnterminatedComment), 1);
    }

    #[test]
    fn spans_point_into_the_source() {
        let source = "let answer = 42i64;";
        let (tokens, _) = lex(source);
        let spelled: Vec<&str> = tokens
            .iter()
            .map(|t| &source[t.span.range()])
            .collect();
        assert_eq!(spelled, vec!["let", "answer", "=", "42i64", ";", ""]);
    }

    #[test]
    fn malformed_suffix_is_reported_and_skipped() {
        let (tokens, diags) = lex("12i7 + 1.5u8");
        assert_eq!(diags.count(DiagId::ErrInvalidIntegerSuffix), 1);
        assert_eq!(diags.count(DiagId::ErrInvalidFloatSuffix), 1);
        assert_eq!(tokens[0].value, Some(TokenValue::I32(12)));
        assert_eq!(tokens[1].kind, TokenKind::Plus);
        assert_eq!(tokens[2].value, Some(TokenValue::F64(1.5)));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn octal_fraction_is_a_lexing_error() {
        let (tokens, diags) = lex("0o17.5");
        assert_eq!(diags.count(DiagId::ErrInvalidLiteral), 1);
        assert_eq!(tokens[0].value, Some(TokenValue::I32(0o17)));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn hex_and_binary_fractions_are_lexing_errors() {
        let (tokens, diags) = lex("0x1.5");
        assert_eq!(diags.count(DiagId::ErrInvalidLiteral), 1);
        assert_eq!(diags.num_errors(), 1);
        assert_eq!(tokens[0].value, Some(TokenValue::I32(1)));
        assert_eq!(tokens[1].kind, TokenKind::Eof);

        let (tokens, diags) = lex("0b10.1 + 2");
        assert_eq!(diags.count(DiagId::ErrInvalidLiteral), 1);
        assert_eq!(tokens[0].value, Some(TokenValue::I32(2)));
        assert_eq!(tokens[1].kind, TokenKind::Plus);
    }

    #[test]
    fn integer_overflowing_u64_is_invalid() {
        let (tokens, diags) = lex("99999999999999999999");
        assert_eq!(diags.count(DiagId::ErrInvalidLiteral), 1);
        assert_eq!(diags.num_errors(), 1);
        assert_eq!(diags.count(DiagId::WarnLiteralOutOfRange), 0);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Literal);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn out_of_range_literal_warns_and_truncates() {
        let (tokens, diags) = lex("128i8");
        assert_eq!(diags.num_errors(), 0);
        assert_eq!(diags.count(DiagId::WarnLiteralOutOfRange), 1);
        assert_eq!(tokens[0].value, Some(TokenValue::I8(-128)));
    }

    #[test]
    fn unexpected_characters_are_skipped() {
        let (tokens, diags) = lex("a @ b # é");
        assert_eq!(diags.count(DiagId::ErrUnexpectedChar), 3);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn strings_keep_raw_contents() {
        let (tokens, diags) = lex(r#""hi \"there\"" "open"#);
        assert_eq!(
            tokens[0].value,
            Some(TokenValue::Str(r#"hi \"there\""#.to_string()))
        );
        assert_eq!(diags.count(DiagId::ErrUnterminatedString), 1);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn empty_input_is_just_eof() {
        let (tokens, diags) = lex("  \n\t ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert!(!diags.has_errors());
    }
}
