//! Debug stringifier.
//!
//! Prints source-like text on one line per item. Operator trees come out
//! fully parenthesized (`(a + (b * c))`) so the output shows the parsed
//! structure; grouping parentheses from the source are not repeated.

use crate::ast::*;
use crate::token::TokenValue;
use crate::visit::Visitor;

pub fn crate_to_string(krate: &Crate) -> String {
    let mut printer = Printer::default();
    printer.visit_crate(krate);
    printer.out
}

pub fn expr_to_string(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.visit_expr(expr);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn signature(&mut self, func: &FunctionItem) {
        self.out.push_str("fn ");
        self.out.push_str(&func.name.name);
        self.out.push('(');
        for (i, (name, ty)) in func.params.iter().zip(&func.ty.params).enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&format!("{name}: {ty}"));
        }
        self.out.push(')');
        if !func.ty.ret.is_unit() {
            self.out.push_str(&format!(" -> {}", func.ty.ret));
        }
    }
}

impl Visitor for Printer {
    fn visit_crate(&mut self, krate: &Crate) {
        for (i, item) in krate.items.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.visit_item(item);
        }
    }

    fn visit_function(&mut self, func: &FunctionItem) {
        self.signature(func);
        match &func.body {
            Some(body) => {
                self.out.push(' ');
                self.visit_block(body);
            }
            None => self.out.push(';'),
        }
    }

    fn visit_extern_block(&mut self, block: &ExternBlockItem) {
        self.out.push_str(&format!("extern \"{}\" {{", block.abi));
        for func in &block.functions {
            self.out.push(' ');
            self.visit_function(func);
        }
        self.out.push_str(" }");
    }

    fn visit_let(&mut self, stmt: &LetStmt) {
        self.out.push_str("let ");
        self.out.push_str(&stmt.name.name);
        if let Some(ty) = &stmt.ty {
            self.out.push_str(&format!(": {ty}"));
        }
        self.out.push_str(" = ");
        self.visit_expr(&stmt.init);
        self.out.push(';');
    }

    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        self.visit_expr(&stmt.expr);
        if stmt.has_semi {
            self.out.push(';');
        }
    }

    fn visit_block(&mut self, block: &BlockExpr) {
        self.out.push('{');
        for item in &block.items {
            self.out.push(' ');
            self.visit_item(item);
        }
        for stmt in &block.stmts {
            self.out.push(' ');
            self.visit_stmt(stmt);
        }
        if let Some(tail) = &block.tail {
            self.out.push(' ');
            self.visit_expr(tail);
        }
        self.out.push_str(" }");
    }

    fn visit_loop(&mut self, expr: &LoopExpr) {
        match expr {
            LoopExpr::Infinite { body } => {
                self.out.push_str("loop ");
                self.visit_block(body);
            }
            LoopExpr::Predicate { cond, body } => {
                self.out.push_str("while ");
                self.visit_expr(cond);
                self.out.push(' ');
                self.visit_block(body);
            }
        }
    }

    fn visit_if(&mut self, expr: &IfExpr) {
        self.out.push_str("if ");
        self.visit_expr(&expr.cond);
        self.out.push(' ');
        self.visit_block(&expr.then_block);
        match &expr.else_branch {
            Some(ElseBranch::Block(block)) => {
                self.out.push_str(" else ");
                self.visit_block(block);
            }
            Some(ElseBranch::If(nested)) => {
                self.out.push_str(" else ");
                self.visit_if(nested);
            }
            None => {}
        }
    }

    fn visit_literal(&mut self, value: &TokenValue) {
        match value {
            TokenValue::Str(text) => self.out.push_str(&format!("\"{text}\"")),
            other => self.out.push_str(&other.to_string()),
        }
    }

    fn visit_path(&mut self, ident: &Ident) {
        self.out.push_str(&ident.name);
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr) {
        self.out.push('(');
        self.out.push_str(op.symbol());
        self.visit_expr(operand);
        self.out.push(')');
    }

    fn visit_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        self.out.push('(');
        self.visit_expr(lhs);
        self.out.push_str(&format!(" {op} "));
        self.visit_expr(rhs);
        self.out.push(')');
    }

    fn visit_call(&mut self, call: &CallExpr) {
        self.out.push_str(&call.callee.name);
        self.out.push('(');
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.visit_expr(arg);
        }
        self.out.push(')');
    }

    fn visit_return(&mut self, value: Option<&Expr>) {
        self.out.push_str("return");
        if let Some(value) = value {
            self.out.push(' ');
            self.visit_expr(value);
        }
    }
}
