//! Syntax tree produced by the parser.
//!
//! The tree is strictly owned: every node owns its children and nothing
//! points back up. Expressions are split in two levels, with-block and
//! without-block, the same way Rust's reference grammar splits them, so
//! that every consumer matches exhaustively on a closed set.
//!
//! Expressions, blocks and `let` statements carry a [`NodeId`]. Later
//! passes key their results by that id instead of mutating the tree.

use std::fmt;

use crate::span::Span;
use crate::token::{TokenKind, TokenValue};
use crate::types::{FunctionType, Type};

/// Dense per-crate node number, assigned by the parser in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A whole translation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Crate {
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionItem),
    ExternBlock(ExternBlockItem),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(func) => func.span,
            Item::ExternBlock(block) => block.span,
        }
    }
}

/// `fn name(params) -> ret { body }`, or a bodiless declaration inside an
/// `extern` block.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionItem {
    pub id: NodeId,
    pub name: Ident,
    pub params: Vec<Ident>,
    pub ty: FunctionType,
    pub body: Option<BlockExpr>,
    pub span: Span,
}

/// `extern "abi" { fn ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct ExternBlockItem {
    pub abi: String,
    pub functions: Vec<FunctionItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(stmt) => stmt.span,
            Stmt::Expr(stmt) => stmt.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub id: NodeId,
    pub name: Ident,
    pub ty: Option<Type>,
    pub init: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    /// Whether a `;` terminated the statement.
    pub has_semi: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Expr { id, kind, span }
    }

    pub fn is_with_block(&self) -> bool {
        matches!(self.kind, ExprKind::WithBlock(_))
    }

    /// `return` or `return expr`.
    pub fn as_return(&self) -> Option<Option<&Expr>> {
        match &self.kind {
            ExprKind::WithoutBlock(ExprWithoutBlock::Return(value)) => Some(value.as_deref()),
            _ => None,
        }
    }

    /// The local a place expression names, if it is one.
    pub fn as_place(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::WithoutBlock(ExprWithoutBlock::Path(ident)) => Some(ident),
            ExprKind::WithoutBlock(ExprWithoutBlock::Grouped(inner)) => inner.as_place(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    WithBlock(ExprWithBlock),
    WithoutBlock(ExprWithoutBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprWithBlock {
    Block(BlockExpr),
    Loop(LoopExpr),
    If(IfExpr),
}

/// `{ items; stmts; tail }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr {
    pub id: NodeId,
    pub items: Vec<Item>,
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

impl BlockExpr {
    /// The value of `return expr` when it is the last statement.
    pub fn trailing_return(&self) -> Option<Option<&Expr>> {
        match self.stmts.last() {
            Some(Stmt::Expr(stmt)) if self.tail.is_none() => stmt.expr.as_return(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopExpr {
    /// `loop { .. }`
    Infinite { body: BlockExpr },
    /// `while cond { .. }`
    Predicate { cond: Box<Expr>, body: BlockExpr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_block: BlockExpr,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(BlockExpr),
    If(Box<IfExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprWithoutBlock {
    Literal(TokenValue),
    Path(Ident),
    Grouped(Box<Expr>),
    Operator(OperatorExpr),
    Call(CallExpr),
    Return(Option<Box<Expr>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorExpr {
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<UnaryOp> {
        match kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        }
    }

    /// Prefix operators bind tighter than every binary operator.
    pub fn binding_power(self) -> u8 {
        26
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Assign,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::And => BinaryOp::BitAnd,
            TokenKind::Or => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Shr => BinaryOp::Shr,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Eq => BinaryOp::Assign,
            _ => return None,
        })
    }

    /// `(left, right)` binding power. Right-associative operators have the
    /// smaller power on the right.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            BinaryOp::Assign => (3, 2),
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Gt
            | BinaryOp::Lt
            | BinaryOp::Ge
            | BinaryOp::Le => (10, 11),
            BinaryOp::BitOr => (12, 13),
            BinaryOp::BitXor => (14, 15),
            BinaryOp::BitAnd => (16, 17),
            BinaryOp::Shl | BinaryOp::Shr => (18, 19),
            BinaryOp::Add | BinaryOp::Sub => (20, 21),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (22, 23),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::Assign => "=",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le
        )
    }

    /// `<`, `>`, `<=`, `>=`
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_right_associative() {
        let (l, r) = BinaryOp::Assign.binding_power();
        assert!(r < l);
        let (l, r) = BinaryOp::Add.binding_power();
        assert!(r > l);
    }

    #[test]
    fn prefix_binds_tighter_than_any_infix() {
        let max_infix = [
            BinaryOp::Mul,
            BinaryOp::Add,
            BinaryOp::Shl,
            BinaryOp::BitAnd,
            BinaryOp::Eq,
        ]
        .iter()
        .map(|op| op.binding_power().1)
        .max()
        .unwrap_or(0);
        assert!(UnaryOp::Neg.binding_power() > max_infix);
    }

    #[test]
    fn logical_operators_are_not_binary_ops() {
        assert_eq!(BinaryOp::from_token(TokenKind::AndAnd), None);
        assert_eq!(BinaryOp::from_token(TokenKind::OrOr), None);
        assert_eq!(BinaryOp::from_token(TokenKind::Eq), Some(BinaryOp::Assign));
    }
}
