//! Read-only AST traversal.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the children in declaration order. Overriding a method and not
//! calling `walk_*` prunes the subtree.

use crate::ast::*;
use crate::token::TokenValue;

pub trait Visitor: Sized {
    fn visit_crate(&mut self, krate: &Crate) {
        walk_crate(self, krate);
    }

    fn visit_item(&mut self, item: &Item) {
        walk_item(self, item);
    }

    fn visit_function(&mut self, func: &FunctionItem) {
        walk_function(self, func);
    }

    fn visit_extern_block(&mut self, block: &ExternBlockItem) {
        walk_extern_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_let(&mut self, stmt: &LetStmt) {
        self.visit_expr(&stmt.init);
    }

    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        self.visit_expr(&stmt.expr);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_block(&mut self, block: &BlockExpr) {
        walk_block(self, block);
    }

    fn visit_loop(&mut self, expr: &LoopExpr) {
        walk_loop(self, expr);
    }

    fn visit_if(&mut self, expr: &IfExpr) {
        walk_if(self, expr);
    }

    fn visit_literal(&mut self, _value: &TokenValue) {}

    fn visit_path(&mut self, _ident: &Ident) {}

    fn visit_grouped(&mut self, inner: &Expr) {
        self.visit_expr(inner);
    }

    fn visit_unary(&mut self, _op: UnaryOp, operand: &Expr) {
        self.visit_expr(operand);
    }

    fn visit_binary(&mut self, _op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        self.visit_expr(lhs);
        self.visit_expr(rhs);
    }

    fn visit_call(&mut self, call: &CallExpr) {
        for arg in &call.args {
            self.visit_expr(arg);
        }
    }

    fn visit_return(&mut self, value: Option<&Expr>) {
        if let Some(value) = value {
            self.visit_expr(value);
        }
    }
}

pub fn walk_crate<V: Visitor>(visitor: &mut V, krate: &Crate) {
    for item in &krate.items {
        visitor.visit_item(item);
    }
}

pub fn walk_item<V: Visitor>(visitor: &mut V, item: &Item) {
    match item {
        Item::Function(func) => visitor.visit_function(func),
        Item::ExternBlock(block) => visitor.visit_extern_block(block),
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, func: &FunctionItem) {
    if let Some(body) = &func.body {
        visitor.visit_block(body);
    }
}

pub fn walk_extern_block<V: Visitor>(visitor: &mut V, block: &ExternBlockItem) {
    for func in &block.functions {
        visitor.visit_function(func);
    }
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Let(stmt) => visitor.visit_let(stmt),
        Stmt::Expr(stmt) => visitor.visit_expr_stmt(stmt),
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::WithBlock(with_block) => match with_block {
            ExprWithBlock::Block(block) => visitor.visit_block(block),
            ExprWithBlock::Loop(expr) => visitor.visit_loop(expr),
            ExprWithBlock::If(expr) => visitor.visit_if(expr),
        },
        ExprKind::WithoutBlock(without_block) => match without_block {
            ExprWithoutBlock::Literal(value) => visitor.visit_literal(value),
            ExprWithoutBlock::Path(ident) => visitor.visit_path(ident),
            ExprWithoutBlock::Grouped(inner) => visitor.visit_grouped(inner),
            ExprWithoutBlock::Operator(OperatorExpr::Unary { op, operand }) => {
                visitor.visit_unary(*op, operand)
            }
            ExprWithoutBlock::Operator(OperatorExpr::Binary { op, lhs, rhs }) => {
                visitor.visit_binary(*op, lhs, rhs)
            }
            ExprWithoutBlock::Call(call) => visitor.visit_call(call),
            ExprWithoutBlock::Return(value) => visitor.visit_return(value.as_deref()),
        },
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &BlockExpr) {
    for item in &block.items {
        visitor.visit_item(item);
    }
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
    if let Some(tail) = &block.tail {
        visitor.visit_expr(tail);
    }
}

pub fn walk_loop<V: Visitor>(visitor: &mut V, expr: &LoopExpr) {
    match expr {
        LoopExpr::Infinite { body } => visitor.visit_block(body),
        LoopExpr::Predicate { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_block(body);
        }
    }
}

pub fn walk_if<V: Visitor>(visitor: &mut V, expr: &IfExpr) {
    visitor.visit_expr(&expr.cond);
    visitor.visit_block(&expr.then_block);
    match &expr.else_branch {
        Some(ElseBranch::Block(block)) => visitor.visit_block(block),
        Some(ElseBranch::If(nested)) => visitor.visit_if(nested),
        None => {}
    }
}
