//! Tokens produced by the lexer.

use std::fmt;

use crate::span::Span;

/// Kind of a token.
///
/// The lexer attaches no meaning beyond keywords and literal payloads;
/// the parser decides what a token sequence means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Identifier,
    /// Integer, float and boolean literals; the payload carries the width.
    Literal,
    StringLiteral,

    // Punctuation
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Caret,      // ^
    And,        // &
    Or,         // |
    AndAnd,     // &&
    OrOr,       // ||
    Shl,        // <<
    Shr,        // >>
    Eq,         // =
    EqEq,       // ==
    Ne,         // !=
    Gt,         // >
    Lt,         // <
    Ge,         // >=
    Le,         // <=
    Not,        // !
    RArrow,     // ->
    Semi,       // ;
    Colon,      // :
    Comma,      // ,
    Dot,        // .
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]

    // Keywords
    KwFn,
    KwLet,
    KwIf,
    KwElse,
    KwLoop,
    KwWhile,
    KwReturn,
    KwExtern,
    KwMut,
    KwPub,
    KwAs,
    KwBreak,
    KwContinue,
    KwMatch,
    KwMod,
    KwStruct,
    KwEnum,
    KwUnion,
    KwTrait,
    KwImpl,
    KwUse,
    KwConst,
    KwStatic,
    KwType,
}

impl TokenKind {
    /// Spelling used in diagnostics.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "end of input",
            Identifier => "identifier",
            Literal => "literal",
            StringLiteral => "string literal",
            Plus => "`+`",
            Minus => "`-`",
            Star => "`*`",
            Slash => "`/`",
            Percent => "`%`",
            Caret => "`^`",
            And => "`&`",
            Or => "`|`",
            AndAnd => "`&&`",
            OrOr => "`||`",
            Shl => "`<<`",
            Shr => "`>>`",
            Eq => "`=`",
            EqEq => "`==`",
            Ne => "`!=`",
            Gt => "`>`",
            Lt => "`<`",
            Ge => "`>=`",
            Le => "`<=`",
            Not => "`!`",
            RArrow => "`->`",
            Semi => "`;`",
            Colon => "`:`",
            Comma => "`,`",
            Dot => "`.`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            LBracket => "`[`",
            RBracket => "`]`",
            KwFn => "`fn`",
            KwLet => "`let`",
            KwIf => "`if`",
            KwElse => "`else`",
            KwLoop => "`loop`",
            KwWhile => "`while`",
            KwReturn => "`return`",
            KwExtern => "`extern`",
            KwMut => "`mut`",
            KwPub => "`pub`",
            KwAs => "`as`",
            KwBreak => "`break`",
            KwContinue => "`continue`",
            KwMatch => "`match`",
            KwMod => "`mod`",
            KwStruct => "`struct`",
            KwEnum => "`enum`",
            KwUnion => "`union`",
            KwTrait => "`trait`",
            KwImpl => "`impl`",
            KwUse => "`use`",
            KwConst => "`const`",
            KwStatic => "`static`",
            KwType => "`type`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Keyword table. `true`/`false` are handled by the lexer as literals.
pub fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match text {
        "fn" => KwFn,
        "let" => KwLet,
        "if" => KwIf,
        "else" => KwElse,
        "loop" => KwLoop,
        "while" => KwWhile,
        "return" => KwReturn,
        "extern" => KwExtern,
        "mut" => KwMut,
        "pub" => KwPub,
        "as" => KwAs,
        "break" => KwBreak,
        "continue" => KwContinue,
        "match" => KwMatch,
        "mod" => KwMod,
        "struct" => KwStruct,
        "enum" => KwEnum,
        "union" => KwUnion,
        "trait" => KwTrait,
        "impl" => KwImpl,
        "use" => KwUse,
        "const" => KwConst,
        "static" => KwStatic,
        "type" => KwType,
        _ => return None,
    };
    Some(kind)
}

/// Literal payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Identifier spelling or string literal contents.
    Str(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Bool(v) => write!(f, "{v}"),
            TokenValue::I8(v) => write!(f, "{v}i8"),
            TokenValue::I16(v) => write!(f, "{v}i16"),
            TokenValue::I32(v) => write!(f, "{v}"),
            TokenValue::I64(v) => write!(f, "{v}i64"),
            TokenValue::U8(v) => write!(f, "{v}u8"),
            TokenValue::U16(v) => write!(f, "{v}u16"),
            TokenValue::U32(v) => write!(f, "{v}u32"),
            TokenValue::U64(v) => write!(f, "{v}u64"),
            TokenValue::F32(v) => write!(f, "{v:?}f32"),
            TokenValue::F64(v) => write!(f, "{v:?}"),
            TokenValue::Str(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<TokenValue>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            value: None,
            span,
        }
    }

    pub fn with_value(kind: TokenKind, value: TokenValue, span: Span) -> Self {
        Token {
            kind,
            value: Some(value),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_one_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Identifier spelling, if this is an identifier token.
    pub fn ident(&self) -> Option<&str> {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, Some(TokenValue::Str(name))) => Some(name),
            _ => None,
        }
    }
}
