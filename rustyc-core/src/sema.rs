//! Semantic analysis: name resolution and type checking.
//!
//! One walk over the crate resolves every name against a [`Scopes`] stack
//! and computes a type for every expression and block. Types are stored in
//! a [`TypeTable`] keyed by [`NodeId`]; the tree itself is never mutated.
//! Problems are reported as diagnostics and the walk continues with
//! [`Type::Unknown`] in place of the failed result. A mismatch involving
//! `Unknown` is never reported, so one mistake yields one diagnostic.

use std::collections::HashMap;

use crate::ast::*;
use crate::diagnostic::{DiagId, Diagnostic, DiagnosticsEngine};
use crate::scope::{ItemDecl, ScopeRecord, Scopes};
use crate::span::Span;
use crate::token::TokenValue;
use crate::types::{Type, type_equals};

/// Checked type of every expression, block and `let` binding.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn insert(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug)]
pub struct SemaResult {
    pub types: TypeTable,
    pub record: ScopeRecord,
}

/// The function whose body is being checked.
struct FunctionContext {
    name: String,
    ret: Type,
}

pub struct Sema<'d> {
    diags: &'d mut DiagnosticsEngine,
    scopes: Scopes,
    types: TypeTable,
    functions: Vec<FunctionContext>,
}

impl<'d> Sema<'d> {
    pub fn new(diags: &'d mut DiagnosticsEngine) -> Self {
        Sema {
            diags,
            scopes: Scopes::new(),
            types: TypeTable::default(),
            functions: Vec::new(),
        }
    }

    pub fn act_on_crate(mut self, krate: &Crate) -> SemaResult {
        self.in_scope(|sema| {
            sema.declare_items(&krate.items);
            for item in &krate.items {
                sema.act_on_item(item);
            }
        });

        tracing::debug!(
            typed_nodes = self.types.len(),
            errors = self.diags.num_errors(),
            "checked crate"
        );
        SemaResult {
            types: self.types,
            record: self.scopes.into_record(),
        }
    }

    fn in_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.enter_scope();
        let result = f(self);
        self.scopes.leave_scope();
        result
    }

    fn in_function_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.enter_function_scope();
        let result = f(self);
        self.scopes.leave_scope();
        result
    }

    fn record(&mut self, id: NodeId, ty: &Type) {
        self.types.insert(id, ty.clone());
    }

    fn error(&mut self, id: DiagId, span: Span, message: String) {
        self.diags.report(id, span, message);
    }

    /// Whether a value of type `found` may stand where `expected` is
    /// required. `!` fits everywhere; unknown types are assumed to fit.
    fn compatible(found: &Type, expected: &Type) -> bool {
        found.contains_unknown()
            || expected.contains_unknown()
            || matches!(found, Type::Never)
            || type_equals(found, expected)
    }

    // ---- items ----

    fn declare_items(&mut self, items: &[Item]) {
        for item in items {
            match item {
                Item::Function(func) => self.declare_function(func),
                Item::ExternBlock(block) => {
                    for func in &block.functions {
                        self.declare_function(func);
                    }
                }
            }
        }
    }

    fn declare_function(&mut self, func: &FunctionItem) {
        let decl = ItemDecl {
            id: func.id,
            name: func.name.name.clone(),
            ty: func.ty.clone(),
        };
        if !self.scopes.insert_item(decl) {
            self.error(
                DiagId::ErrRedefinition,
                func.name.span,
                format!("the name `{}` is defined multiple times", func.name),
            );
        }
    }

    fn act_on_item(&mut self, item: &Item) {
        match item {
            Item::Function(func) => self.act_on_function(func),
            // Extern declarations have no bodies; declaring them was enough.
            Item::ExternBlock(_) => {}
        }
    }

    fn act_on_function(&mut self, func: &FunctionItem) {
        let Some(body) = &func.body else {
            return;
        };

        self.functions.push(FunctionContext {
            name: func.name.name.clone(),
            ret: (*func.ty.ret).clone(),
        });
        self.in_function_scope(|sema| {
            for (param, ty) in func.params.iter().zip(&func.ty.params) {
                if !sema.scopes.insert_identifier(&param.name, ty.clone()) {
                    sema.error(
                        DiagId::ErrRedefinition,
                        param.span,
                        format!(
                            "identifier `{param}` is bound more than once in this parameter list"
                        ),
                    );
                }
            }

            let body_ty = sema.act_on_block(body);
            // A trailing `return` was already checked against the signature.
            if body.trailing_return().is_none() && !Self::compatible(&body_ty, &func.ty.ret) {
                sema.error(
                    DiagId::ErrIncompatibleTypes,
                    body.span,
                    format!(
                        "mismatched types: function `{}` is declared to return `{}` but its body has type `{}`",
                        func.name, func.ty.ret, body_ty
                    ),
                );
            }
        });
        self.functions.pop();
    }

    // ---- blocks and statements ----

    fn act_on_block(&mut self, block: &BlockExpr) -> Type {
        let ty = self.in_scope(|sema| {
            sema.declare_items(&block.items);
            for item in &block.items {
                sema.act_on_item(item);
            }
            for stmt in &block.stmts {
                sema.act_on_stmt(stmt);
            }
            let tail_ty = block.tail.as_ref().map(|tail| sema.act_on_expr(tail));

            match block.trailing_return() {
                Some(Some(value)) => sema.types.get(value.id).cloned().unwrap_or(Type::Unknown),
                Some(None) => Type::unit(),
                None => tail_ty.unwrap_or_else(Type::unit),
            }
        });
        self.record(block.id, &ty);
        ty
    }

    fn act_on_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(stmt) => self.act_on_let(stmt),
            Stmt::Expr(stmt) => {
                self.act_on_expr(&stmt.expr);
            }
        }
    }

    fn act_on_let(&mut self, stmt: &LetStmt) {
        let init_ty = self.act_on_expr(&stmt.init);
        let binding_ty = match &stmt.ty {
            Some(declared) => {
                if !Self::compatible(&init_ty, declared) {
                    self.error(
                        DiagId::ErrIncompatibleTypes,
                        stmt.init.span,
                        format!("mismatched types: expected `{declared}`, found `{init_ty}`"),
                    );
                }
                declared.clone()
            }
            None => init_ty,
        };

        self.record(stmt.id, &binding_ty);
        if !self.scopes.insert_identifier(&stmt.name.name, binding_ty) {
            self.error(
                DiagId::ErrRedefinition,
                stmt.name.span,
                format!("`{}` is already bound in this scope", stmt.name),
            );
        }
    }

    // ---- expressions ----

    fn act_on_expr(&mut self, expr: &Expr) -> Type {
        let ty = match &expr.kind {
            ExprKind::WithBlock(with_block) => match with_block {
                ExprWithBlock::Block(block) => self.act_on_block(block),
                ExprWithBlock::Loop(LoopExpr::Infinite { body }) => {
                    self.act_on_block(body);
                    Type::unit()
                }
                ExprWithBlock::Loop(LoopExpr::Predicate { cond, body }) => {
                    self.act_on_condition(cond);
                    self.act_on_block(body);
                    Type::unit()
                }
                ExprWithBlock::If(if_expr) => self.act_on_if(if_expr),
            },
            ExprKind::WithoutBlock(without_block) => match without_block {
                ExprWithoutBlock::Literal(value) => literal_type(value),
                ExprWithoutBlock::Path(ident) => self.act_on_path(ident),
                ExprWithoutBlock::Grouped(inner) => self.act_on_expr(inner),
                ExprWithoutBlock::Operator(OperatorExpr::Unary { op, operand }) => {
                    self.act_on_unary(*op, operand, expr.span)
                }
                ExprWithoutBlock::Operator(OperatorExpr::Binary { op, lhs, rhs }) => {
                    self.act_on_binary(*op, lhs, rhs, expr.span)
                }
                ExprWithoutBlock::Call(call) => self.act_on_call(call, expr.span),
                ExprWithoutBlock::Return(value) => self.act_on_return(value.as_deref(), expr.span),
            },
        };
        self.record(expr.id, &ty);
        ty
    }

    fn act_on_condition(&mut self, cond: &Expr) {
        let ty = self.act_on_expr(cond);
        if !Self::compatible(&ty, &Type::Bool) {
            self.error(
                DiagId::ErrIncompatibleTypes,
                cond.span,
                format!("mismatched types: expected `bool`, found `{ty}`"),
            );
        }
    }

    fn act_on_if(&mut self, expr: &IfExpr) -> Type {
        self.act_on_condition(&expr.cond);
        let then_ty = self.act_on_block(&expr.then_block);

        let (else_ty, else_span, else_returns) = match &expr.else_branch {
            Some(ElseBranch::Block(block)) => (
                self.act_on_block(block),
                block.span,
                block.trailing_return().is_some(),
            ),
            Some(ElseBranch::If(nested)) => (
                self.act_on_if(nested),
                nested.cond.span.to(nested.then_block.span),
                false,
            ),
            None => {
                let returns = expr.then_block.trailing_return().is_some();
                if !returns && !Self::compatible(&then_ty, &Type::unit()) {
                    self.error(
                        DiagId::ErrIncompatibleTypes,
                        expr.then_block.span,
                        format!("`if` without `else` must have type `()`, found `{then_ty}`"),
                    );
                }
                return Type::unit();
            }
        };

        // A branch that always returns takes the type of the other one.
        if matches!(then_ty, Type::Never) || expr.then_block.trailing_return().is_some() {
            return else_ty;
        }
        if matches!(else_ty, Type::Never) || else_returns {
            return then_ty;
        }
        if !Self::compatible(&else_ty, &then_ty) {
            self.error(
                DiagId::ErrIncompatibleTypes,
                else_span,
                format!(
                    "`if` and `else` have incompatible types: expected `{then_ty}`, found `{else_ty}`"
                ),
            );
        }
        then_ty
    }

    fn act_on_path(&mut self, ident: &Ident) -> Type {
        if let Some(ty) = self.scopes.lookup_identifier(&ident.name) {
            return ty.clone();
        }
        if let Some(decl) = self.scopes.lookup_item(&ident.name) {
            return Type::Function(decl.ty.clone());
        }
        self.error(
            DiagId::ErrUndefinedSym,
            ident.span,
            format!("cannot find value `{ident}` in this scope"),
        );
        Type::Unknown
    }

    fn act_on_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Type {
        let ty = self.act_on_expr(operand);
        if ty.contains_unknown() || matches!(ty, Type::Never) {
            return ty;
        }
        let ok = match op {
            UnaryOp::Neg => ty.is_signed() || ty.is_float(),
            UnaryOp::Not => ty.is_integer() || ty == Type::Bool,
        };
        if !ok {
            self.error(
                DiagId::ErrInvalidOperand,
                span,
                format!(
                    "cannot apply unary operator `{}` to type `{ty}`",
                    op.symbol()
                ),
            );
        }
        ty
    }

    fn act_on_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, span: Span) -> Type {
        let lhs_ty = self.act_on_expr(lhs);
        let rhs_ty = self.act_on_expr(rhs);

        if op == BinaryOp::Assign {
            if lhs_ty.contains_unknown() {
                // The target was already reported.
                return Type::unit();
            }
            let is_local = lhs
                .as_place()
                .is_some_and(|ident| self.scopes.lookup_identifier(&ident.name).is_some());
            if !is_local {
                self.error(
                    DiagId::ErrInvalidAssignment,
                    lhs.span,
                    "invalid left-hand side of assignment".to_string(),
                );
            } else if !Self::compatible(&rhs_ty, &lhs_ty) {
                self.error(
                    DiagId::ErrIncompatibleTypes,
                    rhs.span,
                    format!("mismatched types: expected `{lhs_ty}`, found `{rhs_ty}`"),
                );
            }
            return Type::unit();
        }

        let operand_ty = if matches!(lhs_ty, Type::Never) {
            rhs_ty.clone()
        } else {
            lhs_ty.clone()
        };
        let result = if op.is_comparison() {
            Type::Bool
        } else {
            operand_ty.clone()
        };

        if lhs_ty.contains_unknown() || rhs_ty.contains_unknown() {
            return result;
        }
        let either_never = matches!(lhs_ty, Type::Never) || matches!(rhs_ty, Type::Never);
        if !either_never && !type_equals(&lhs_ty, &rhs_ty) {
            self.error(
                DiagId::ErrIncompatibleTypes,
                span,
                format!("mismatched types: cannot apply `{op}` to `{lhs_ty}` and `{rhs_ty}`"),
            );
            return result;
        }

        let ok = if op.is_arithmetic() || op.is_ordering() {
            operand_ty.is_numeric()
        } else if op.is_bitwise() {
            operand_ty.is_integer() || operand_ty == Type::Bool
        } else if op.is_shift() {
            operand_ty.is_integer()
        } else {
            // `==` and `!=`
            operand_ty.is_numeric() || operand_ty == Type::Bool
        };
        if !ok && operand_ty != Type::Never {
            self.error(
                DiagId::ErrInvalidOperand,
                span,
                format!("cannot apply binary operator `{op}` to type `{operand_ty}`"),
            );
        }
        result
    }

    fn act_on_call(&mut self, call: &CallExpr, span: Span) -> Type {
        let callee = &call.callee;
        let arg_types: Vec<Type> = call.args.iter().map(|arg| self.act_on_expr(arg)).collect();

        if let Some(local) = self.scopes.lookup_identifier(&callee.name) {
            let message = format!("`{callee}` is a local of type `{local}`, not a function");
            self.error(DiagId::ErrInvalidFunctionCall, callee.span, message);
            return Type::Unknown;
        }
        let Some(decl) = self.scopes.lookup_item(&callee.name) else {
            self.error(
                DiagId::ErrUndefinedSym,
                callee.span,
                format!("cannot find function `{callee}` in this scope"),
            );
            return Type::Unknown;
        };
        let ty = decl.ty.clone();

        if arg_types.len() != ty.params.len() {
            self.diags.emit(
                Diagnostic::new(
                    DiagId::ErrInvalidFunctionCall,
                    span,
                    format!(
                        "function `{callee}` takes {} argument(s) but {} were supplied",
                        ty.params.len(),
                        arg_types.len()
                    ),
                )
                .with_note(format!("`{callee}` is declared as `{ty}`")),
            );
            return *ty.ret;
        }

        for (index, ((arg, found), expected)) in
            call.args.iter().zip(&arg_types).zip(&ty.params).enumerate()
        {
            if !Self::compatible(found, expected) {
                self.error(
                    DiagId::ErrInvalidFunctionCall,
                    arg.span,
                    format!(
                        "argument {} of `{callee}` has type `{found}`, expected `{expected}`",
                        index + 1
                    ),
                );
            }
        }
        *ty.ret
    }

    fn act_on_return(&mut self, value: Option<&Expr>, span: Span) -> Type {
        let (value_ty, value_span) = match value {
            Some(value) => (self.act_on_expr(value), value.span),
            None => (Type::unit(), span),
        };

        if let Some(func) = self.functions.last() {
            if !Self::compatible(&value_ty, &func.ret) {
                let message = format!(
                    "mismatched types: function `{}` returns `{}`, found `{value_ty}`",
                    func.name, func.ret
                );
                self.error(DiagId::ErrIncompatibleTypes, value_span, message);
            }
        }
        Type::Never
    }
}

fn literal_type(value: &TokenValue) -> Type {
    match value {
        TokenValue::Bool(_) => Type::Bool,
        TokenValue::I8(_) => Type::I8,
        TokenValue::I16(_) => Type::I16,
        TokenValue::I32(_) => Type::I32,
        TokenValue::I64(_) => Type::I64,
        TokenValue::U8(_) => Type::U8,
        TokenValue::U16(_) => Type::U16,
        TokenValue::U32(_) => Type::U32,
        TokenValue::U64(_) => Type::U64,
        TokenValue::F32(_) => Type::F32,
        TokenValue::F64(_) => Type::F64,
        TokenValue::Str(_) => Type::Str,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::span::FileId;

    fn check(source: &str) -> (SemaResult, DiagnosticsEngine) {
        let mut diags = DiagnosticsEngine::new();
        let tokens = tokenize(FileId(0), source, &mut diags);
        let krate = Parser::new(&tokens, &mut diags)
            .parse_crate()
            .expect("supported program");
        assert!(!diags.has_errors(), "syntax errors: {:?}", diags.diagnostics());
        let result = Sema::new(&mut diags).act_on_crate(&krate);
        (result, diags)
    }

    fn errors(source: &str) -> Vec<DiagId> {
        let (_, diags) = check(source);
        diags.diagnostics().iter().map(|d| d.id).collect()
    }

    #[test]
    fn accepts_well_typed_program() {
        let source = r#"
            extern { fn putchar(c: i32) -> i32; }
            fn fib(n: i32) -> i32 { if n < 2 { n } else { fib(n - 1) + fib(n - 2) } }
            fn main() -> i32 {
                let mut total = 0;
                let mut i = 0;
                while i < 10 { total = total + fib(i); i = i + 1; }
                fn twice(x: i64) -> i64 { x * 2i64 }
                let big: i64 = twice(21i64);
                if big == 42i64 { putchar(79); } else { putchar(88); }
                let flags = 0b1010u8 & !0u8 | 1u8 << 2u8;
                let ratio = -1.5f32 / 2.0f32;
                total
            }
        "#;
        assert_eq!(errors(source), vec![]);
    }

    #[test]
    fn body_type_mismatch_cites_both_types() {
        let (_, diags) = check("fn f() -> i32 { 1.0 }");
        assert_eq!(diags.diagnostics().len(), 1);
        let diag = &diags.diagnostics()[0];
        assert_eq!(diag.id, DiagId::ErrIncompatibleTypes);
        assert!(diag.message.contains("`f`"), "{}", diag.message);
        assert!(diag.message.contains("`i32`"), "{}", diag.message);
        assert!(diag.message.contains("`f64`"), "{}", diag.message);
    }

    #[test]
    fn argument_type_mismatch_is_one_call_error() {
        assert_eq!(
            errors("fn g(a: i32) {} fn main() { g(1.0); }"),
            vec![DiagId::ErrInvalidFunctionCall]
        );
    }

    #[test]
    fn undeclared_callee_is_one_error() {
        assert_eq!(
            errors("fn main() { let r = h(1); let s: bool = r; }"),
            vec![DiagId::ErrUndefinedSym]
        );
    }

    #[test]
    fn wrong_arity_keeps_declared_return_type() {
        assert_eq!(
            errors("fn g(a: i32) -> i64 { 1i64 } fn main() { let x = g(1, 2); let y: i64 = x; }"),
            vec![DiagId::ErrInvalidFunctionCall]
        );
        let (_, diags) = check("fn g(a: i32) {} fn main() { g(); }");
        assert_eq!(
            diags.diagnostics()[0].notes,
            vec!["`g` is declared as `fn(i32)`".to_string()]
        );
    }

    #[test]
    fn locals_are_not_callable() {
        assert_eq!(
            errors("fn f() {} fn main() { let f = 1; f(); }"),
            vec![DiagId::ErrInvalidFunctionCall]
        );
    }

    #[test]
    fn items_are_visible_before_declaration_and_from_nested_functions() {
        assert_eq!(
            errors(
                "fn main() -> i32 { fn inner() -> i32 { helper() } inner() }\n\
                 fn helper() -> i32 { 1 }"
            ),
            vec![]
        );
    }

    #[test]
    fn locals_do_not_cross_function_items() {
        assert_eq!(
            errors("fn main() { let x = 1; fn inner() -> i32 { x } }"),
            vec![DiagId::ErrUndefinedSym]
        );
    }

    #[test]
    fn inner_blocks_shadow_outer_bindings() {
        assert_eq!(
            errors("fn main() -> bool { let x = 1; { let x = true; x } }"),
            vec![]
        );
        assert_eq!(
            errors("fn main() -> bool { let x = 1; { let x = true; } x }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
    }

    #[test]
    fn reports_redefinitions() {
        assert_eq!(errors("fn f() {} fn f() {}"), vec![DiagId::ErrRedefinition]);
        assert_eq!(
            errors("fn main() { let x = 1; let x = 2; }"),
            vec![DiagId::ErrRedefinition]
        );
        assert_eq!(errors("fn f(a: i32, a: i32) {}"), vec![DiagId::ErrRedefinition]);
        assert_eq!(
            errors("extern { fn f(); } fn f() {}"),
            vec![DiagId::ErrRedefinition]
        );
    }

    #[test]
    fn conditions_must_be_bool() {
        assert_eq!(
            errors("fn main() { if 1 { } while 0u8 { } }"),
            vec![DiagId::ErrIncompatibleTypes, DiagId::ErrIncompatibleTypes]
        );
    }

    #[test]
    fn if_typing() {
        assert_eq!(
            errors("fn main() { let x = if true { 1 }; }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
        assert_eq!(
            errors("fn f() -> i32 { if true { 1 } else { false } }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
        assert_eq!(
            errors("fn f(a: bool) -> i32 { if a { return 2; } 3 }"),
            vec![]
        );
        assert_eq!(
            errors("fn f(a: bool) -> i32 { if a { return 1; } else { } 0 }"),
            vec![]
        );
        assert_eq!(
            errors("fn f(a: u8) -> u8 { if a == 0u8 { 1u8 } else if a == 1u8 { 2u8 } else { a } }"),
            vec![]
        );
    }

    #[test]
    fn assignment_needs_a_local() {
        assert_eq!(
            errors("fn main() { 1 = 2; main = main; }"),
            vec![DiagId::ErrInvalidAssignment, DiagId::ErrInvalidAssignment]
        );
        assert_eq!(
            errors("fn main() { let x = 1; x = true; }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
    }

    #[test]
    fn assignment_to_undefined_name_reports_once() {
        assert_eq!(errors("fn f() { x = 1; }"), vec![DiagId::ErrUndefinedSym]);
    }

    #[test]
    fn operand_classes_are_checked() {
        assert_eq!(
            errors("fn main() { let a = true + false; let b = -1u8; let c = 1.0 << 2.0; }"),
            vec![
                DiagId::ErrInvalidOperand,
                DiagId::ErrInvalidOperand,
                DiagId::ErrInvalidOperand
            ]
        );
        assert_eq!(
            errors("fn main() { let x = 1 + 1i64; }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
    }

    #[test]
    fn unknown_types_do_not_cascade() {
        assert_eq!(
            errors("fn main() { let x = y + 1; let z: bool = x; if x { } }"),
            vec![DiagId::ErrUndefinedSym]
        );
    }

    #[test]
    fn return_is_checked_against_the_enclosing_function() {
        assert_eq!(
            errors("fn f() -> i32 { return true; }"),
            vec![DiagId::ErrIncompatibleTypes]
        );
        assert_eq!(errors("fn f() -> i32 { return 1; }"), vec![]);
        assert_eq!(errors("fn f() { return; }"), vec![]);
        assert_eq!(
            errors("fn f() -> i32 { fn g() -> bool { return false; } return 1; }"),
            vec![]
        );
    }

    #[test]
    fn records_types_and_scopes() {
        let mut diags = DiagnosticsEngine::new();
        let tokens = tokenize(FileId(0), "fn main() -> bool { { } 1 < 2 }", &mut diags);
        let krate = Parser::new(&tokens, &mut diags).parse_crate().expect("parse");
        let result = Sema::new(&mut diags).act_on_crate(&krate);
        assert!(!diags.has_errors());

        let Item::Function(main) = &krate.items[0] else {
            panic!("expected main");
        };
        let body = main.body.as_ref().expect("body");
        assert_eq!(result.types.get(body.id), Some(&Type::Bool));
        let tail = body.tail.as_ref().expect("tail");
        assert_eq!(result.types.get(tail.id), Some(&Type::Bool));

        // crate, function, body block, inner block
        assert_eq!(result.record.frames().len(), 4);
        assert_eq!(result.record.events().len(), 8);
        assert!(result.record.frames()[0].item("main").is_some());
    }
}
