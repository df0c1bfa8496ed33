//! Parser: tokens to AST.
//!
//! Items and statements are parsed by recursive descent, expressions by
//! binding power (see [`BinaryOp::binding_power`]). Syntax errors are
//! reported to the [`DiagnosticsEngine`] and parsing resumes at the next
//! statement boundary; only unsupported language constructs abort the
//! file with [`CoreError::Unsupported`].

use crate::ast::*;
use crate::cursor::Cursor;
use crate::diagnostic::{DiagId, DiagnosticsEngine};
use crate::error::CoreError;
use crate::lexer::tokenize;
use crate::span::{FileId, Span};
use crate::token::{Token, TokenKind, TokenValue};
use crate::types::{FunctionType, Type};

/// Why a production gave up.
#[derive(Debug)]
enum Abort {
    /// A diagnostic was already reported; the caller resynchronizes.
    Syntax,
    Unsupported(CoreError),
}

type PResult<T> = Result<T, Abort>;

fn unsupported<T>(construct: impl Into<String>, span: Span) -> PResult<T> {
    Err(Abort::Unsupported(CoreError::unsupported(construct, span)))
}

/// Contents of a block between its braces.
struct BlockBody {
    items: Vec<Item>,
    stmts: Vec<Stmt>,
    /// An item is never a block's tail, even directly before `}`.
    ends_with_item: bool,
}

/// Statement-level expressions stop at these.
const STMT_STOP: &[TokenKind] = &[TokenKind::Semi, TokenKind::RBrace];

pub struct Parser<'t, 'd> {
    cursor: Cursor<'t, Token>,
    diags: &'d mut DiagnosticsEngine,
    next_id: u32,
}

impl<'t, 'd> Parser<'t, 'd> {
    /// `tokens` must end with an `Eof` token, as produced by
    /// [`tokenize`].
    pub fn new(tokens: &'t [Token], diags: &'d mut DiagnosticsEngine) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            diags,
            next_id: 0,
        }
    }

    pub fn parse_crate(&mut self) -> Result<Crate, CoreError> {
        let start = self.span();
        let mut items = Vec::new();

        while !self.at(TokenKind::Eof) {
            let before = self.cursor.position();
            match self.parse_item() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {
                    self.unexpected("expected item");
                    self.recover_item(before);
                }
                Err(Abort::Syntax) => self.recover_item(before),
                Err(Abort::Unsupported(err)) => return Err(err),
            }
        }

        tracing::debug!(
            items = items.len(),
            nodes = self.next_id,
            errors = self.diags.num_errors(),
            "parsed crate"
        );
        Ok(Crate {
            items,
            span: start.to(self.span()),
        })
    }

    /// Parses a bare statement list up to the end of input.
    pub fn parse_stmts(&mut self) -> Result<Vec<Stmt>, CoreError> {
        let mut stmts = Vec::new();
        loop {
            let body = match self.parse_block_body() {
                Ok(body) => body,
                Err(Abort::Unsupported(err)) => return Err(err),
                Err(Abort::Syntax) => {
                    return Err(CoreError::CompilationFailed {
                        errors: self.diags.num_errors(),
                    });
                }
            };
            for item in &body.items {
                self.diags.report(
                    DiagId::ErrUnexpected,
                    item.span(),
                    "expected statement, found item",
                );
            }
            stmts.extend(body.stmts);
            if self.at(TokenKind::Eof) {
                return Ok(stmts);
            }
            self.unexpected("expected statement");
            self.bump();
        }
    }

    /// Parses one expression that must span the whole input.
    pub fn parse_expression(&mut self) -> Result<Expr, CoreError> {
        let result = self.parse_expr(&[]).and_then(|expr| {
            if !self.at(TokenKind::Eof) {
                self.unexpected("expected end of input");
                return Err(Abort::Syntax);
            }
            Ok(expr)
        });
        match result {
            Ok(expr) => Ok(expr),
            Err(Abort::Unsupported(err)) => Err(err),
            Err(Abort::Syntax) => Err(CoreError::CompilationFailed {
                errors: self.diags.num_errors(),
            }),
        }
    }

    // ---- token helpers ----

    fn kind(&self) -> TokenKind {
        self.cursor.peek().map_or(TokenKind::Eof, |tok| tok.kind)
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.cursor.peek_nth(n).map_or(TokenKind::Eof, |tok| tok.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn span(&self) -> Span {
        self.cursor
            .peek()
            .or_else(|| self.cursor.peek_back(1))
            .map(|tok| tok.span)
            .unwrap_or_default()
    }

    fn prev_span(&self) -> Span {
        self.cursor
            .peek_back(1)
            .map_or_else(|| self.span(), |tok| tok.span)
    }

    /// Consumes the current token. `Eof` is never consumed.
    fn bump(&mut self) -> Option<&'t Token> {
        let tok = self.cursor.peek()?;
        if tok.kind != TokenKind::Eof {
            self.cursor.skip();
        }
        Some(tok)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.at(kind) {
            let span = self.span();
            self.bump();
            Ok(span)
        } else {
            self.unexpected(&format!("expected {}", kind.describe()));
            Err(Abort::Syntax)
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        if let Some(tok) = self.cursor.peek() {
            if let Some(name) = tok.ident() {
                self.bump();
                return Ok(Ident::new(name, tok.span));
            }
        }
        self.unexpected("expected identifier");
        Err(Abort::Syntax)
    }

    fn unexpected(&mut self, expected: &str) {
        let found = self.describe_current();
        let span = self.span();
        self.diags
            .report(DiagId::ErrUnexpected, span, format!("{expected}, found {found}"));
    }

    fn describe_current(&self) -> String {
        match self.cursor.peek() {
            Some(tok) => match (&tok.kind, &tok.value) {
                (TokenKind::Identifier, Some(value)) => format!("identifier `{value}`"),
                (TokenKind::Literal, Some(value)) => format!("literal `{value}`"),
                (kind, _) => kind.describe().to_string(),
            },
            None => TokenKind::Eof.describe().to_string(),
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- recovery ----

    /// Skips to the end of the current statement: past the next `;`, up to
    /// the closing `}` of the enclosing block, or past a balanced `{ .. }`.
    fn recover_stmt(&mut self, before: usize) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::Semi if depth == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        self.ensure_progress(before);
    }

    /// Skips to the next `fn` or `extern` outside any braces.
    fn recover_item(&mut self, before: usize) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::KwFn | TokenKind::KwExtern if depth == 0 => break,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        self.ensure_progress(before);
    }

    fn ensure_progress(&mut self, before: usize) {
        if self.cursor.position() == before {
            self.bump();
        }
    }

    // ---- items ----

    fn parse_item(&mut self) -> PResult<Option<Item>> {
        let span = self.span();
        match self.kind() {
            TokenKind::KwFn => Ok(Some(Item::Function(self.parse_function(false)?))),
            TokenKind::KwExtern => Ok(Some(Item::ExternBlock(self.parse_extern_block()?))),
            TokenKind::KwPub => unsupported("`pub` visibility", span),
            kind @ (TokenKind::KwMod
            | TokenKind::KwStruct
            | TokenKind::KwEnum
            | TokenKind::KwUnion
            | TokenKind::KwTrait
            | TokenKind::KwImpl
            | TokenKind::KwUse
            | TokenKind::KwConst
            | TokenKind::KwStatic
            | TokenKind::KwType) => unsupported(format!("{kind} item"), span),
            _ => Ok(None),
        }
    }

    fn parse_function(&mut self, in_extern: bool) -> PResult<FunctionItem> {
        let start = self.span();
        let id = self.fresh_id();
        self.expect(TokenKind::KwFn)?;
        let name = self.expect_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut param_types = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            self.eat(TokenKind::KwMut);
            params.push(self.expect_ident()?);
            self.expect(TokenKind::Colon)?;
            param_types.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let ret = if self.eat(TokenKind::RArrow) {
            self.parse_type()?
        } else {
            Type::unit()
        };

        let body = if in_extern {
            self.expect(TokenKind::Semi)?;
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(FunctionItem {
            id,
            name,
            params,
            ty: FunctionType::new(param_types, ret),
            body,
            span: start.to(self.prev_span()),
        })
    }

    fn parse_extern_block(&mut self) -> PResult<ExternBlockItem> {
        let start = self.span();
        self.expect(TokenKind::KwExtern)?;
        let abi = match self.cursor.peek() {
            Some(Token {
                kind: TokenKind::StringLiteral,
                value: Some(TokenValue::Str(abi)),
                ..
            }) => {
                self.bump();
                abi.clone()
            }
            _ => "C".to_string(),
        };
        self.expect(TokenKind::LBrace)?;

        let mut functions = Vec::new();
        loop {
            match self.kind() {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::KwFn => {
                    let before = self.cursor.position();
                    match self.parse_function(true) {
                        Ok(func) => functions.push(func),
                        Err(Abort::Syntax) => self.recover_stmt(before),
                        Err(err) => return Err(err),
                    }
                }
                _ => {
                    self.unexpected("expected `fn` or `}`");
                    return Err(Abort::Syntax);
                }
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(ExternBlockItem {
            abi,
            functions,
            span: start.to(self.prev_span()),
        })
    }

    // ---- types ----

    fn parse_type(&mut self) -> PResult<Type> {
        let span = self.span();
        match self.kind() {
            TokenKind::Identifier => {
                let ident = self.expect_ident()?;
                match Type::from_name(&ident.name) {
                    Some(ty) => Ok(ty),
                    None => {
                        self.diags.report(
                            DiagId::ErrExpectedType,
                            ident.span,
                            format!("cannot find type `{}`", ident.name),
                        );
                        Ok(Type::Unknown)
                    }
                }
            }
            TokenKind::Not => {
                self.bump();
                Ok(Type::Never)
            }
            TokenKind::LParen => {
                self.bump();
                let mut elems = Vec::new();
                let mut trailing_comma = false;
                while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                    elems.push(self.parse_type()?);
                    trailing_comma = self.eat(TokenKind::Comma);
                    if !trailing_comma {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                if elems.len() == 1 && !trailing_comma {
                    return Ok(elems.remove(0));
                }
                Ok(Type::Tuple(elems))
            }
            TokenKind::KwFn => {
                self.bump();
                self.expect(TokenKind::LParen)?;
                let mut params = Vec::new();
                while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                    params.push(self.parse_type()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                let ret = if self.eat(TokenKind::RArrow) {
                    self.parse_type()?
                } else {
                    Type::unit()
                };
                Ok(Type::Function(FunctionType::new(params, ret)))
            }
            TokenKind::And => unsupported("reference type", span),
            TokenKind::LBracket => unsupported("array or slice type", span),
            _ => {
                let found = self.describe_current();
                self.diags.report(
                    DiagId::ErrExpectedType,
                    span,
                    format!("expected type, found {found}"),
                );
                Err(Abort::Syntax)
            }
        }
    }

    // ---- blocks and statements ----

    fn parse_block(&mut self) -> PResult<BlockExpr> {
        let start = self.span();
        let id = self.fresh_id();
        self.expect(TokenKind::LBrace)?;
        let BlockBody {
            items,
            mut stmts,
            ends_with_item,
        } = self.parse_block_body()?;

        // `{ ..; expr }`: a trailing expression statement without `;`
        // becomes the block's value.
        let mut tail = None;
        let before_close = self.cursor.peek_back(1).map(|tok| tok.kind);
        let last_is_expr = matches!(stmts.last(), Some(Stmt::Expr(stmt)) if !stmt.has_semi);
        if last_is_expr && !ends_with_item && before_close != Some(TokenKind::Semi) {
            if let Some(Stmt::Expr(stmt)) = stmts.pop() {
                tail = Some(Box::new(stmt.expr));
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(BlockExpr {
            id,
            items,
            stmts,
            tail,
            span: start.to(self.prev_span()),
        })
    }

    /// Items and statements up to a `}` or the end of input.
    fn parse_block_body(&mut self) -> PResult<BlockBody> {
        let mut items = Vec::new();
        let mut stmts = Vec::new();
        let mut ends_with_item = false;

        loop {
            match self.kind() {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Semi => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let before = self.cursor.position();
            match self.parse_item() {
                Ok(Some(item)) => {
                    items.push(item);
                    ends_with_item = true;
                    continue;
                }
                Ok(None) => {}
                Err(Abort::Syntax) => {
                    self.recover_stmt(before);
                    continue;
                }
                Err(err) => return Err(err),
            }

            match self.parse_stmt() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    ends_with_item = false;
                }
                Err(Abort::Syntax) => self.recover_stmt(before),
                Err(err) => return Err(err),
            }
        }

        Ok(BlockBody {
            items,
            stmts,
            ends_with_item,
        })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        if self.at(TokenKind::KwLet) {
            return self.parse_let().map(Stmt::Let);
        }

        let start = self.span();
        let expr = if self.at_with_block_start() {
            self.parse_with_block_expr()?
        } else {
            self.parse_expr(STMT_STOP)?
        };

        let has_semi = self.eat(TokenKind::Semi);
        if !has_semi && !expr.is_with_block() && !self.at(TokenKind::RBrace) {
            self.unexpected("expected `;` or `}`");
            return Err(Abort::Syntax);
        }

        Ok(Stmt::Expr(ExprStmt {
            expr,
            has_semi,
            span: start.to(self.prev_span()),
        }))
    }

    fn parse_let(&mut self) -> PResult<LetStmt> {
        let start = self.span();
        let id = self.fresh_id();
        self.expect(TokenKind::KwLet)?;
        self.eat(TokenKind::KwMut);
        let name = self.expect_ident()?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq)?;
        let init = self.parse_expr(&[TokenKind::Semi])?;
        self.expect(TokenKind::Semi)?;

        Ok(LetStmt {
            id,
            name,
            ty,
            init,
            span: start.to(self.prev_span()),
        })
    }

    // ---- expressions ----

    fn parse_expr(&mut self, stop: &[TokenKind]) -> PResult<Expr> {
        self.parse_binary_expr(stop, 0)
    }

    /// Binding-power loop. Consumes binary operators whose left power is at
    /// least `min_bp`; stops at `Eof`, any token in `stop`, or any token that
    /// is not a binary operator.
    fn parse_binary_expr(&mut self, stop: &[TokenKind], min_bp: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary_expr(stop)?;

        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof || stop.contains(&kind) {
                break;
            }
            match kind {
                TokenKind::AndAnd | TokenKind::OrOr => {
                    let span = self.span();
                    self.diags.report(
                        DiagId::ErrInvalidBinaryOp,
                        span,
                        format!("{} is not a supported binary operator", kind.describe()),
                    );
                    return Err(Abort::Syntax);
                }
                TokenKind::KwAs => return unsupported("`as` cast", self.span()),
                _ => {}
            }
            let Some(op) = BinaryOp::from_token(kind) else {
                break;
            };
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.bump();

            let rhs = self.parse_binary_expr(stop, right_bp)?;
            let span = lhs.span.to(rhs.span);
            let id = self.fresh_id();
            lhs = Expr::new(
                id,
                ExprKind::WithoutBlock(ExprWithoutBlock::Operator(OperatorExpr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })),
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_unary_expr(&mut self, stop: &[TokenKind]) -> PResult<Expr> {
        let Some(op) = UnaryOp::from_token(self.kind()) else {
            return self.parse_primary_expr(stop);
        };
        let start = self.span();
        self.bump();
        let operand = self.parse_binary_expr(stop, op.binding_power())?;
        let span = start.to(operand.span);
        let id = self.fresh_id();
        Ok(Expr::new(
            id,
            ExprKind::WithoutBlock(ExprWithoutBlock::Operator(OperatorExpr::Unary {
                op,
                operand: Box::new(operand),
            })),
            span,
        ))
    }

    fn parse_primary_expr(&mut self, stop: &[TokenKind]) -> PResult<Expr> {
        let start = self.span();
        let kind = self.kind();
        if kind == TokenKind::Eof || stop.contains(&kind) {
            self.expected_expr();
            return Err(Abort::Syntax);
        }

        match kind {
            TokenKind::Literal | TokenKind::StringLiteral => {
                let value = self
                    .bump()
                    .and_then(|tok| tok.value.clone())
                    .unwrap_or(TokenValue::I32(0));
                let id = self.fresh_id();
                Ok(Expr::new(
                    id,
                    ExprKind::WithoutBlock(ExprWithoutBlock::Literal(value)),
                    start,
                ))
            }
            TokenKind::Identifier if self.nth_kind(1) == TokenKind::LParen => self.parse_call(),
            TokenKind::Identifier => {
                let ident = self.expect_ident()?;
                let id = self.fresh_id();
                Ok(Expr::new(
                    id,
                    ExprKind::WithoutBlock(ExprWithoutBlock::Path(ident)),
                    start,
                ))
            }
            TokenKind::LParen => {
                self.bump();
                if self.at(TokenKind::RParen) {
                    return unsupported("tuple expression", start.to(self.span()));
                }
                let inner = self.parse_expr(&[TokenKind::RParen, TokenKind::Comma])?;
                if self.at(TokenKind::Comma) {
                    return unsupported("tuple expression", start.to(self.span()));
                }
                self.expect(TokenKind::RParen)?;
                let id = self.fresh_id();
                Ok(Expr::new(
                    id,
                    ExprKind::WithoutBlock(ExprWithoutBlock::Grouped(Box::new(inner))),
                    start.to(self.prev_span()),
                ))
            }
            TokenKind::LBrace | TokenKind::KwIf | TokenKind::KwLoop | TokenKind::KwWhile => {
                self.parse_with_block_expr()
            }
            TokenKind::KwReturn => self.parse_return(stop),
            TokenKind::KwMatch | TokenKind::KwBreak | TokenKind::KwContinue => {
                unsupported(format!("{} expression", kind.describe()), start)
            }
            TokenKind::LBracket => unsupported("array expression", start),
            _ => {
                self.expected_expr();
                Err(Abort::Syntax)
            }
        }
    }

    fn expected_expr(&mut self) {
        let found = self.describe_current();
        let span = self.span();
        self.diags.report(
            DiagId::ErrExpectedExpr,
            span,
            format!("expected expression, found {found}"),
        );
    }

    fn parse_call(&mut self) -> PResult<Expr> {
        let start = self.span();
        let callee = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            args.push(self.parse_expr(&[TokenKind::Comma, TokenKind::RParen])?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let id = self.fresh_id();
        Ok(Expr::new(
            id,
            ExprKind::WithoutBlock(ExprWithoutBlock::Call(CallExpr { callee, args })),
            start.to(self.prev_span()),
        ))
    }

    fn parse_return(&mut self, stop: &[TokenKind]) -> PResult<Expr> {
        let start = self.span();
        self.expect(TokenKind::KwReturn)?;

        let kind = self.kind();
        let value = if matches!(kind, TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof)
            || stop.contains(&kind)
        {
            None
        } else {
            Some(Box::new(self.parse_expr(stop)?))
        };

        let id = self.fresh_id();
        Ok(Expr::new(
            id,
            ExprKind::WithoutBlock(ExprWithoutBlock::Return(value)),
            start.to(self.prev_span()),
        ))
    }

    fn at_with_block_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::LBrace | TokenKind::KwIf | TokenKind::KwLoop | TokenKind::KwWhile
        )
    }

    fn parse_with_block_expr(&mut self) -> PResult<Expr> {
        let start = self.span();
        let kind = match self.kind() {
            TokenKind::LBrace => ExprWithBlock::Block(self.parse_block()?),
            TokenKind::KwIf => ExprWithBlock::If(self.parse_if()?),
            TokenKind::KwLoop => {
                self.bump();
                ExprWithBlock::Loop(LoopExpr::Infinite {
                    body: self.parse_block()?,
                })
            }
            TokenKind::KwWhile => {
                self.bump();
                let cond = self.parse_expr(&[TokenKind::LBrace])?;
                ExprWithBlock::Loop(LoopExpr::Predicate {
                    cond: Box::new(cond),
                    body: self.parse_block()?,
                })
            }
            _ => {
                self.expected_expr();
                return Err(Abort::Syntax);
            }
        };
        let id = self.fresh_id();
        Ok(Expr::new(
            id,
            ExprKind::WithBlock(kind),
            start.to(self.prev_span()),
        ))
    }

    fn parse_if(&mut self) -> PResult<IfExpr> {
        self.expect(TokenKind::KwIf)?;
        let cond = self.parse_expr(&[TokenKind::LBrace])?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.at(TokenKind::KwIf) {
                Some(ElseBranch::If(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(IfExpr {
            cond: Box::new(cond),
            then_block,
            else_branch,
        })
    }
}

/// Lexes and parses a single expression. Any lexing or syntax error fails
/// the parse.
pub fn parse_expr_str(source: &str) -> Result<Expr, CoreError> {
    let mut diags = DiagnosticsEngine::new();
    let tokens = tokenize(FileId(0), source, &mut diags);
    let expr = Parser::new(&tokens, &mut diags).parse_expression()?;
    if diags.has_errors() {
        return Err(CoreError::CompilationFailed {
            errors: diags.num_errors(),
        });
    }
    Ok(expr)
}
