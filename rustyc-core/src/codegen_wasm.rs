//! WebAssembly backend.
//!
//! Lowers a checked crate into a wasm module with `wasm-encoder`. The
//! backend trusts sema: it runs only on crates without errors, reads every
//! type from the [`TypeTable`] and resolves callees by replaying the
//! recorded scopes instead of resolving names again.
//!
//! Function index space: imports (extern declarations) first, then every
//! function item with a body in depth-first source order. Crate-level
//! functions are exported under their own name.

use std::collections::{HashMap, HashSet};

use wasm_encoder::{
    BlockType, CodeSection, EntityType, ExportKind, ExportSection, Function, FunctionSection,
    ImportSection, Instruction, Module, TypeSection, ValType,
};

use crate::ast::*;
use crate::error::CoreError;
use crate::scope::ScopeReplay;
use crate::sema::{SemaResult, TypeTable};
use crate::token::TokenValue;
use crate::types::Type;
use crate::visit::{self, Visitor};

/// Encodes a checked crate as a wasm module.
pub fn generate(krate: &Crate, sema: &SemaResult) -> Result<Vec<u8>, CoreError> {
    let mut collector = FunctionCollector::default();
    collector.visit_crate(krate);
    let FunctionCollector { imports, defined } = collector;

    let exported: HashSet<NodeId> = krate
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Function(func) if func.body.is_some() => Some(func.id),
            _ => None,
        })
        .collect();

    let mut builder = ModuleBuilder {
        types: &sema.types,
        indices: HashMap::new(),
        bodies: Vec::new(),
        defined_slots: HashMap::new(),
    };
    for (index, info) in imports.iter().chain(&defined).enumerate() {
        builder.indices.insert(info.id, index as u32);
    }
    for (slot, info) in defined.iter().enumerate() {
        builder.defined_slots.insert(info.id, slot);
        builder.bodies.push(None);
    }

    let mut replay = ScopeReplay::new(&sema.record);
    replay.in_scope(|replay| {
        for item in &krate.items {
            builder.emit_item(replay, item)?;
        }
        Ok(())
    })?;
    if !replay.is_finished() {
        return Err(CoreError::ScopeMismatch(
            "not every recorded scope was replayed".to_string(),
        ));
    }

    let mut module = Module::new();

    let mut types = TypeSection::new();
    for info in imports.iter().chain(&defined) {
        let (params, results) = signature(info)?;
        types.ty().function(params, results);
    }
    module.section(&types);

    if !imports.is_empty() {
        let mut import_section = ImportSection::new();
        for (type_index, info) in imports.iter().enumerate() {
            let module_name = info.abi.as_deref().unwrap_or("C");
            import_section.import(
                module_name,
                &info.name,
                EntityType::Function(type_index as u32),
            );
        }
        module.section(&import_section);
    }

    let mut functions = FunctionSection::new();
    for type_index in imports.len()..imports.len() + defined.len() {
        functions.function(type_index as u32);
    }
    module.section(&functions);

    let mut exports = ExportSection::new();
    for info in defined.iter().filter(|info| exported.contains(&info.id)) {
        exports.export(&info.name, ExportKind::Func, builder.indices[&info.id]);
    }
    module.section(&exports);

    let mut code = CodeSection::new();
    for (info, body) in defined.iter().zip(&builder.bodies) {
        let body = body.as_ref().ok_or_else(|| {
            CoreError::Codegen(format!("no body was generated for `{}`", info.name))
        })?;
        code.function(body);
    }
    module.section(&code);

    tracing::debug!(
        imports = imports.len(),
        functions = defined.len(),
        "generated wasm module"
    );
    Ok(module.finish())
}

struct FunctionInfo {
    id: NodeId,
    name: String,
    params: Vec<Type>,
    ret: Type,
    /// Import module for extern declarations.
    abi: Option<String>,
}

impl FunctionInfo {
    fn new(func: &FunctionItem, abi: Option<String>) -> Self {
        FunctionInfo {
            id: func.id,
            name: func.name.name.clone(),
            params: func.ty.params.clone(),
            ret: (*func.ty.ret).clone(),
            abi,
        }
    }
}

/// Every function item in depth-first order, split into extern
/// declarations and definitions.
#[derive(Default)]
struct FunctionCollector {
    imports: Vec<FunctionInfo>,
    defined: Vec<FunctionInfo>,
}

impl Visitor for FunctionCollector {
    fn visit_function(&mut self, func: &FunctionItem) {
        self.defined.push(FunctionInfo::new(func, None));
        visit::walk_function(self, func);
    }

    fn visit_extern_block(&mut self, block: &ExternBlockItem) {
        for func in &block.functions {
            self.imports
                .push(FunctionInfo::new(func, Some(block.abi.clone())));
        }
    }
}

fn signature(info: &FunctionInfo) -> Result<(Vec<ValType>, Vec<ValType>), CoreError> {
    let mut params = Vec::with_capacity(info.params.len());
    for ty in &info.params {
        match val_type(ty)? {
            Some(val) => params.push(val),
            None => {
                return Err(CoreError::Codegen(format!(
                    "parameter of type `{ty}` in `{}` has no wasm representation",
                    info.name
                )));
            }
        }
    }
    let results = val_type(&info.ret)?.into_iter().collect();
    Ok((params, results))
}

/// Wasm value type of a language type; `None` for types without a value.
fn val_type(ty: &Type) -> Result<Option<ValType>, CoreError> {
    match ty {
        Type::Bool
        | Type::I8
        | Type::I16
        | Type::I32
        | Type::U8
        | Type::U16
        | Type::U32 => Ok(Some(ValType::I32)),
        Type::I64 | Type::U64 => Ok(Some(ValType::I64)),
        Type::F32 => Ok(Some(ValType::F32)),
        Type::F64 => Ok(Some(ValType::F64)),
        Type::Never => Ok(None),
        Type::Tuple(elems) if elems.is_empty() => Ok(None),
        Type::Str | Type::Tuple(_) | Type::Function(_) | Type::Unknown => Err(CoreError::Codegen(
            format!("values of type `{ty}` are not supported by the wasm backend"),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumClass {
    I32 { signed: bool },
    I64 { signed: bool },
    F32,
    F64,
}

fn num_class(ty: &Type) -> Option<NumClass> {
    Some(match ty {
        Type::Bool | Type::U8 | Type::U16 | Type::U32 => NumClass::I32 { signed: false },
        Type::I8 | Type::I16 | Type::I32 => NumClass::I32 { signed: true },
        Type::I64 => NumClass::I64 { signed: true },
        Type::U64 => NumClass::I64 { signed: false },
        Type::F32 => NumClass::F32,
        Type::F64 => NumClass::F64,
        _ => return None,
    })
}

fn binary_instruction(op: BinaryOp, class: NumClass) -> Option<Instruction<'static>> {
    use BinaryOp as B;
    use Instruction as I;
    use NumClass as C;

    Some(match (class, op) {
        (C::I32 { .. }, B::Add) => I::I32Add,
        (C::I32 { .. }, B::Sub) => I::I32Sub,
        (C::I32 { .. }, B::Mul) => I::I32Mul,
        (C::I32 { signed: true }, B::Div) => I::I32DivS,
        (C::I32 { signed: false }, B::Div) => I::I32DivU,
        (C::I32 { signed: true }, B::Rem) => I::I32RemS,
        (C::I32 { signed: false }, B::Rem) => I::I32RemU,
        (C::I32 { .. }, B::BitAnd) => I::I32And,
        (C::I32 { .. }, B::BitOr) => I::I32Or,
        (C::I32 { .. }, B::BitXor) => I::I32Xor,
        (C::I32 { .. }, B::Shl) => I::I32Shl,
        (C::I32 { signed: true }, B::Shr) => I::I32ShrS,
        (C::I32 { signed: false }, B::Shr) => I::I32ShrU,
        (C::I32 { .. }, B::Eq) => I::I32Eq,
        (C::I32 { .. }, B::Ne) => I::I32Ne,
        (C::I32 { signed: true }, B::Lt) => I::I32LtS,
        (C::I32 { signed: false }, B::Lt) => I::I32LtU,
        (C::I32 { signed: true }, B::Gt) => I::I32GtS,
        (C::I32 { signed: false }, B::Gt) => I::I32GtU,
        (C::I32 { signed: true }, B::Le) => I::I32LeS,
        (C::I32 { signed: false }, B::Le) => I::I32LeU,
        (C::I32 { signed: true }, B::Ge) => I::I32GeS,
        (C::I32 { signed: false }, B::Ge) => I::I32GeU,

        (C::I64 { .. }, B::Add) => I::I64Add,
        (C::I64 { .. }, B::Sub) => I::I64Sub,
        (C::I64 { .. }, B::Mul) => I::I64Mul,
        (C::I64 { signed: true }, B::Div) => I::I64DivS,
        (C::I64 { signed: false }, B::Div) => I::I64DivU,
        (C::I64 { signed: true }, B::Rem) => I::I64RemS,
        (C::I64 { signed: false }, B::Rem) => I::I64RemU,
        (C::I64 { .. }, B::BitAnd) => I::I64And,
        (C::I64 { .. }, B::BitOr) => I::I64Or,
        (C::I64 { .. }, B::BitXor) => I::I64Xor,
        (C::I64 { .. }, B::Shl) => I::I64Shl,
        (C::I64 { signed: true }, B::Shr) => I::I64ShrS,
        (C::I64 { signed: false }, B::Shr) => I::I64ShrU,
        (C::I64 { .. }, B::Eq) => I::I64Eq,
        (C::I64 { .. }, B::Ne) => I::I64Ne,
        (C::I64 { signed: true }, B::Lt) => I::I64LtS,
        (C::I64 { signed: false }, B::Lt) => I::I64LtU,
        (C::I64 { signed: true }, B::Gt) => I::I64GtS,
        (C::I64 { signed: false }, B::Gt) => I::I64GtU,
        (C::I64 { signed: true }, B::Le) => I::I64LeS,
        (C::I64 { signed: false }, B::Le) => I::I64LeU,
        (C::I64 { signed: true }, B::Ge) => I::I64GeS,
        (C::I64 { signed: false }, B::Ge) => I::I64GeU,

        (C::F32, B::Add) => I::F32Add,
        (C::F32, B::Sub) => I::F32Sub,
        (C::F32, B::Mul) => I::F32Mul,
        (C::F32, B::Div) => I::F32Div,
        (C::F32, B::Eq) => I::F32Eq,
        (C::F32, B::Ne) => I::F32Ne,
        (C::F32, B::Lt) => I::F32Lt,
        (C::F32, B::Gt) => I::F32Gt,
        (C::F32, B::Le) => I::F32Le,
        (C::F32, B::Ge) => I::F32Ge,

        (C::F64, B::Add) => I::F64Add,
        (C::F64, B::Sub) => I::F64Sub,
        (C::F64, B::Mul) => I::F64Mul,
        (C::F64, B::Div) => I::F64Div,
        (C::F64, B::Eq) => I::F64Eq,
        (C::F64, B::Ne) => I::F64Ne,
        (C::F64, B::Lt) => I::F64Lt,
        (C::F64, B::Gt) => I::F64Gt,
        (C::F64, B::Le) => I::F64Le,
        (C::F64, B::Ge) => I::F64Ge,

        _ => return None,
    })
}

/// Instruction buffer and locals of the function being lowered.
struct FunctionState {
    param_count: u32,
    locals: Vec<ValType>,
    /// Name to local index per open block; `None` for bindings of a type
    /// without a value.
    frames: Vec<Vec<(String, Option<u32>)>>,
    instructions: Vec<Instruction<'static>>,
}

impl FunctionState {
    fn new(param_count: u32) -> Self {
        FunctionState {
            param_count,
            locals: Vec::new(),
            frames: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn emit(&mut self, instruction: Instruction<'static>) {
        self.instructions.push(instruction);
    }

    fn add_local(&mut self, ty: ValType) -> u32 {
        self.locals.push(ty);
        self.param_count + self.locals.len() as u32 - 1
    }

    fn declare(&mut self, name: &str, slot: Option<u32>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push((name.to_string(), slot));
        }
    }

    fn lookup(&self, name: &str) -> Option<Option<u32>> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .iter()
                .rev()
                .find(|(bound, _)| bound == name)
                .map(|(_, slot)| *slot)
        })
    }

    fn finish(self) -> Function {
        let mut function = Function::new(self.locals.into_iter().map(|ty| (1, ty)));
        for instruction in &self.instructions {
            function.instruction(instruction);
        }
        function.instruction(&Instruction::End);
        function
    }
}

struct ModuleBuilder<'a> {
    types: &'a TypeTable,
    /// Function index of every function item, imports included.
    indices: HashMap<NodeId, u32>,
    bodies: Vec<Option<Function>>,
    defined_slots: HashMap<NodeId, usize>,
}

impl ModuleBuilder<'_> {
    fn type_of(&self, id: NodeId) -> Result<&Type, CoreError> {
        self.types
            .get(id)
            .ok_or_else(|| CoreError::Codegen(format!("node {id:?} has no checked type")))
    }

    fn emit_item(&mut self, replay: &mut ScopeReplay<'_>, item: &Item) -> Result<(), CoreError> {
        match item {
            Item::Function(func) => self.emit_function(replay, func),
            Item::ExternBlock(_) => Ok(()),
        }
    }

    fn emit_function(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        func: &FunctionItem,
    ) -> Result<(), CoreError> {
        let Some(body) = &func.body else {
            return Ok(());
        };
        let slot = *self.defined_slots.get(&func.id).ok_or_else(|| {
            CoreError::Codegen(format!("function `{}` was not collected", func.name))
        })?;

        let mut state = FunctionState::new(func.params.len() as u32);
        replay.in_scope(|replay| {
            state.frames.push(Vec::new());
            for (index, param) in func.params.iter().enumerate() {
                state.declare(&param.name, Some(index as u32));
            }
            self.emit_block(replay, &mut state, body)?;
            state.frames.pop();
            Ok(())
        })?;

        self.bodies[slot] = Some(state.finish());
        Ok(())
    }

    /// Leaves the tail's value, if any, on the stack.
    fn emit_block(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        block: &BlockExpr,
    ) -> Result<(), CoreError> {
        replay.in_scope(|replay| {
            state.frames.push(Vec::new());
            for item in &block.items {
                self.emit_item(replay, item)?;
            }
            for stmt in &block.stmts {
                self.emit_stmt(replay, state, stmt)?;
            }
            if let Some(tail) = &block.tail {
                self.emit_expr(replay, state, tail)?;
            }
            state.frames.pop();
            Ok(())
        })
    }

    fn emit_stmt(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        stmt: &Stmt,
    ) -> Result<(), CoreError> {
        match stmt {
            Stmt::Let(stmt) => {
                self.emit_expr(replay, state, &stmt.init)?;
                let slot = match val_type(self.type_of(stmt.id)?)? {
                    Some(ty) => {
                        let index = state.add_local(ty);
                        state.emit(Instruction::LocalSet(index));
                        Some(index)
                    }
                    None => None,
                };
                state.declare(&stmt.name.name, slot);
            }
            Stmt::Expr(stmt) => {
                self.emit_expr(replay, state, &stmt.expr)?;
                let ty = self.type_of(stmt.expr.id)?;
                if val_type(ty)?.is_some() {
                    state.emit(Instruction::Drop);
                }
            }
        }
        Ok(())
    }

    fn emit_expr(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        expr: &Expr,
    ) -> Result<(), CoreError> {
        let ty = self.type_of(expr.id)?.clone();
        match &expr.kind {
            ExprKind::WithBlock(ExprWithBlock::Block(block)) => {
                self.emit_block(replay, state, block)?
            }
            ExprKind::WithBlock(ExprWithBlock::If(if_expr)) => {
                self.emit_if(replay, state, if_expr, &ty)?
            }
            ExprKind::WithBlock(ExprWithBlock::Loop(LoopExpr::Infinite { body })) => {
                state.emit(Instruction::Loop(BlockType::Empty));
                self.emit_block(replay, state, body)?;
                self.drop_value(state, body.id)?;
                state.emit(Instruction::Br(0));
                state.emit(Instruction::End);
                // No `break`: control never leaves the loop.
                state.emit(Instruction::Unreachable);
            }
            ExprKind::WithBlock(ExprWithBlock::Loop(LoopExpr::Predicate { cond, body })) => {
                state.emit(Instruction::Block(BlockType::Empty));
                state.emit(Instruction::Loop(BlockType::Empty));
                self.emit_expr(replay, state, cond)?;
                state.emit(Instruction::I32Eqz);
                state.emit(Instruction::BrIf(1));
                self.emit_block(replay, state, body)?;
                self.drop_value(state, body.id)?;
                state.emit(Instruction::Br(0));
                state.emit(Instruction::End);
                state.emit(Instruction::End);
            }
            ExprKind::WithoutBlock(ExprWithoutBlock::Literal(value)) => {
                state.emit(literal_instruction(value)?)
            }
            ExprKind::WithoutBlock(ExprWithoutBlock::Path(ident)) => {
                match state.lookup(&ident.name) {
                    Some(Some(index)) => state.emit(Instruction::LocalGet(index)),
                    Some(None) => {}
                    None => {
                        return Err(CoreError::Codegen(format!(
                            "function `{ident}` used as a value is not supported by the wasm backend"
                        )));
                    }
                }
            }
            ExprKind::WithoutBlock(ExprWithoutBlock::Grouped(inner)) => {
                self.emit_expr(replay, state, inner)?
            }
            ExprKind::WithoutBlock(ExprWithoutBlock::Operator(OperatorExpr::Unary {
                op,
                operand,
            })) => self.emit_unary(replay, state, *op, operand, &ty)?,
            ExprKind::WithoutBlock(ExprWithoutBlock::Operator(OperatorExpr::Binary {
                op,
                lhs,
                rhs,
            })) => self.emit_binary(replay, state, *op, lhs, rhs)?,
            ExprKind::WithoutBlock(ExprWithoutBlock::Call(call)) => {
                for arg in &call.args {
                    self.emit_expr(replay, state, arg)?;
                }
                let decl = replay.lookup_item(&call.callee.name).ok_or_else(|| {
                    CoreError::Codegen(format!("unresolved callee `{}`", call.callee))
                })?;
                let index = self.indices.get(&decl.id).copied().ok_or_else(|| {
                    CoreError::Codegen(format!("callee `{}` has no function index", call.callee))
                })?;
                state.emit(Instruction::Call(index));
            }
            ExprKind::WithoutBlock(ExprWithoutBlock::Return(value)) => {
                if let Some(value) = value {
                    self.emit_expr(replay, state, value)?;
                }
                state.emit(Instruction::Return);
            }
        }

        if ty == Type::Never {
            state.emit(Instruction::Unreachable);
        }
        Ok(())
    }

    /// Drops the value a loop body left behind.
    fn drop_value(&self, state: &mut FunctionState, id: NodeId) -> Result<(), CoreError> {
        if val_type(self.type_of(id)?)?.is_some() {
            state.emit(Instruction::Drop);
        }
        Ok(())
    }

    fn emit_if(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        expr: &IfExpr,
        ty: &Type,
    ) -> Result<(), CoreError> {
        self.emit_expr(replay, state, &expr.cond)?;

        let block_type = match (&expr.else_branch, val_type(ty)?) {
            (Some(_), Some(val)) => BlockType::Result(val),
            _ => BlockType::Empty,
        };
        state.emit(Instruction::If(block_type));
        self.emit_block(replay, state, &expr.then_block)?;
        if expr.else_branch.is_none() {
            self.drop_value(state, expr.then_block.id)?;
        }
        match &expr.else_branch {
            Some(ElseBranch::Block(block)) => {
                state.emit(Instruction::Else);
                self.emit_block(replay, state, block)?;
            }
            Some(ElseBranch::If(nested)) => {
                state.emit(Instruction::Else);
                self.emit_if(replay, state, nested, ty)?;
            }
            None => {}
        }
        state.emit(Instruction::End);
        Ok(())
    }

    fn emit_unary(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        op: UnaryOp,
        operand: &Expr,
        ty: &Type,
    ) -> Result<(), CoreError> {
        if *self.type_of(operand.id)? == Type::Never {
            // The operand diverges; the operator is never reached.
            return self.emit_expr(replay, state, operand);
        }
        let class = num_class(ty).ok_or_else(|| {
            CoreError::Codegen(format!(
                "operator `{}` on `{ty}` is not supported",
                op.symbol()
            ))
        })?;

        match (op, class) {
            (UnaryOp::Neg, NumClass::I32 { .. }) => {
                state.emit(Instruction::I32Const(0));
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::I32Sub);
            }
            (UnaryOp::Neg, NumClass::I64 { .. }) => {
                state.emit(Instruction::I64Const(0));
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::I64Sub);
            }
            (UnaryOp::Neg, NumClass::F32) => {
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::F32Neg);
            }
            (UnaryOp::Neg, NumClass::F64) => {
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::F64Neg);
            }
            (UnaryOp::Not, NumClass::I32 { .. }) if *ty == Type::Bool => {
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::I32Eqz);
            }
            (UnaryOp::Not, NumClass::I32 { .. }) => {
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::I32Const(-1));
                state.emit(Instruction::I32Xor);
            }
            (UnaryOp::Not, NumClass::I64 { .. }) => {
                self.emit_expr(replay, state, operand)?;
                state.emit(Instruction::I64Const(-1));
                state.emit(Instruction::I64Xor);
            }
            (UnaryOp::Not, NumClass::F32 | NumClass::F64) => {
                return Err(CoreError::Codegen(format!(
                    "operator `!` on `{ty}` is not supported"
                )));
            }
        }
        normalize(state, ty);
        Ok(())
    }

    fn emit_binary(
        &mut self,
        replay: &mut ScopeReplay<'_>,
        state: &mut FunctionState,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(), CoreError> {
        if op == BinaryOp::Assign {
            let ident = lhs.as_place().ok_or_else(|| {
                CoreError::Codegen("assignment target is not a local".to_string())
            })?;
            self.emit_expr(replay, state, rhs)?;
            match state.lookup(&ident.name) {
                Some(Some(index)) => state.emit(Instruction::LocalSet(index)),
                Some(None) => {}
                None => {
                    return Err(CoreError::Codegen(format!(
                        "assignment to unknown local `{ident}`"
                    )));
                }
            }
            return Ok(());
        }

        self.emit_expr(replay, state, lhs)?;
        self.emit_expr(replay, state, rhs)?;

        let lhs_ty = self.type_of(lhs.id)?;
        let operand_ty = if *lhs_ty == Type::Never {
            self.type_of(rhs.id)?
        } else {
            lhs_ty
        }
        .clone();
        if operand_ty == Type::Never {
            // Both operands diverge; nothing after them runs.
            return Ok(());
        }

        let class = num_class(&operand_ty);
        if op == BinaryOp::Rem {
            match class {
                Some(NumClass::F32) => {
                    float_remainder(state, ValType::F32);
                    return Ok(());
                }
                Some(NumClass::F64) => {
                    float_remainder(state, ValType::F64);
                    return Ok(());
                }
                _ => {}
            }
        }

        let instruction = class
            .and_then(|class| binary_instruction(op, class))
            .ok_or_else(|| {
                CoreError::Codegen(format!(
                    "operator `{op}` on `{operand_ty}` is not supported by the wasm backend"
                ))
            })?;
        state.emit(instruction);

        if op.is_arithmetic() || op.is_shift() {
            normalize(state, &operand_ty);
        }
        Ok(())
    }
}

/// `a % b` for floats as `a - trunc(a / b) * b`, with the sign of `a`.
/// Expects both operands on the stack.
fn float_remainder(state: &mut FunctionState, ty: ValType) {
    let lhs = state.add_local(ty);
    let rhs = state.add_local(ty);
    state.emit(Instruction::LocalSet(rhs));
    state.emit(Instruction::LocalTee(lhs));
    state.emit(Instruction::LocalGet(lhs));
    state.emit(Instruction::LocalGet(rhs));
    if ty == ValType::F32 {
        state.emit(Instruction::F32Div);
        state.emit(Instruction::F32Trunc);
        state.emit(Instruction::LocalGet(rhs));
        state.emit(Instruction::F32Mul);
        state.emit(Instruction::F32Sub);
    } else {
        state.emit(Instruction::F64Div);
        state.emit(Instruction::F64Trunc);
        state.emit(Instruction::LocalGet(rhs));
        state.emit(Instruction::F64Mul);
        state.emit(Instruction::F64Sub);
    }
}

/// Re-establishes the canonical i32 form of 8 and 16-bit values:
/// sign-extended for signed types, zero-extended for unsigned ones.
fn normalize(state: &mut FunctionState, ty: &Type) {
    match ty {
        Type::I8 => state.emit(Instruction::I32Extend8S),
        Type::I16 => state.emit(Instruction::I32Extend16S),
        Type::U8 => {
            state.emit(Instruction::I32Const(0xFF));
            state.emit(Instruction::I32And);
        }
        Type::U16 => {
            state.emit(Instruction::I32Const(0xFFFF));
            state.emit(Instruction::I32And);
        }
        _ => {}
    }
}

fn literal_instruction(value: &TokenValue) -> Result<Instruction<'static>, CoreError> {
    Ok(match value {
        TokenValue::Bool(v) => Instruction::I32Const(i32::from(*v)),
        TokenValue::I8(v) => Instruction::I32Const(i32::from(*v)),
        TokenValue::I16(v) => Instruction::I32Const(i32::from(*v)),
        TokenValue::I32(v) => Instruction::I32Const(*v),
        TokenValue::U8(v) => Instruction::I32Const(i32::from(*v)),
        TokenValue::U16(v) => Instruction::I32Const(i32::from(*v)),
        TokenValue::U32(v) => Instruction::I32Const(*v as i32),
        TokenValue::I64(v) => Instruction::I64Const(*v),
        TokenValue::U64(v) => Instruction::I64Const(*v as i64),
        TokenValue::F32(v) => Instruction::F32Const((*v).into()),
        TokenValue::F64(v) => Instruction::F64Const((*v).into()),
        TokenValue::Str(_) => {
            return Err(CoreError::Codegen(
                "string literals are not supported by the wasm backend".to_string(),
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticsEngine;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::sema::Sema;
    use crate::span::FileId;

    fn compile(source: &str) -> Result<Vec<u8>, CoreError> {
        let mut diags = DiagnosticsEngine::new();
        let tokens = tokenize(FileId(0), source, &mut diags);
        let krate = Parser::new(&tokens, &mut diags).parse_crate()?;
        let sema = Sema::new(&mut diags).act_on_crate(&krate);
        assert!(!diags.has_errors(), "{:?}", diags.diagnostics());
        generate(&krate, &sema)
    }

    fn wasm(source: &str) -> Vec<u8> {
        let bytes = compile(source).expect("codegen should succeed");
        wasmparser::validate(&bytes).expect("valid wasm module");
        bytes
    }

    fn run_main(source: &str) -> i32 {
        let bytes = wasm(source);
        let engine = wasmi::Engine::default();
        let module = wasmi::Module::new(&engine, &bytes).expect("module");
        let linker = wasmi::Linker::new(&engine);
        let mut store = wasmi::Store::new(&engine, ());
        let instance = linker
            .instantiate_and_start(&mut store, &module)
            .expect("instantiate");
        let main = instance
            .get_typed_func::<(), i32>(&store, "main")
            .expect("typed func");
        main.call(&mut store, ()).expect("execute main")
    }

    #[test]
    fn runs_arithmetic() {
        assert_eq!(run_main("fn main() -> i32 { 40 + 2 * 1 }"), 42);
        assert_eq!(run_main("fn main() -> i32 { (7 - 10) / 2 % 5 }"), -1);
        assert_eq!(run_main("fn main() -> i32 { -(1 << 4) | 3 ^ 1 }"), -14);
    }

    #[test]
    fn runs_recursion() {
        let source = "fn fib(n: i32) -> i32 { if n < 2 { n } else { fib(n - 1) + fib(n - 2) } }\n\
                      fn main() -> i32 { fib(10) }";
        assert_eq!(run_main(source), 55);
    }

    #[test]
    fn runs_while_loops_with_assignment() {
        let source = "fn main() -> i32 {\n\
                          let mut i = 1;\n\
                          let mut sum = 0;\n\
                          while i <= 10 { sum = sum + i; i = i + 1; }\n\
                          sum\n\
                      }";
        assert_eq!(run_main(source), 55);
    }

    #[test]
    fn returns_from_inside_loops_and_branches() {
        let source = "fn first_over(limit: i32) -> i32 {\n\
                          let mut n = 0;\n\
                          loop { n = n + 7; if n > limit { return n; } }\n\
                          return -1;\n\
                      }\n\
                      fn sign(a: i32) -> i32 {\n\
                          if a > 0 { return 1 } else if a < 0 { return -1 } else { return 0 }\n\
                      }\n\
                      fn main() -> i32 { first_over(20) * 10 + sign(-5) }";
        assert_eq!(run_main(source), 209);
    }

    #[test]
    fn nested_functions_and_shadowing() {
        let source = "fn main() -> i32 {\n\
                          let x = 1;\n\
                          let y = { let x = 10; x + 1 };\n\
                          fn add(a: i32, b: i32) -> i32 { a + b }\n\
                          add(x, y)\n\
                      }";
        assert_eq!(run_main(source), 12);
    }

    #[test]
    fn narrow_integers_wrap() {
        assert_eq!(
            run_main("fn main() -> i32 { let y = 127i8 + 1i8; if y < 0i8 { 1 } else { 0 } }"),
            1
        );
        assert_eq!(
            run_main("fn main() -> i32 { let x = 255u8 + 1u8; if x == 0u8 { 1 } else { 0 } }"),
            1
        );
        assert_eq!(
            run_main("fn main() -> i32 { let x = !0u16; if x == 65535u16 { 1 } else { 0 } }"),
            1
        );
    }

    #[test]
    fn unsigned_and_wide_comparisons() {
        assert_eq!(
            run_main("fn main() -> i32 { if 3000000000u32 > 1u32 { 1 } else { 0 } }"),
            1
        );
        assert_eq!(
            run_main("fn main() -> i32 { if 1i64 << 40i64 > 1000i64 { 1 } else { 0 } }"),
            1
        );
    }

    #[test]
    fn floats() {
        let source = "fn half(x: f64) -> f64 { x / 2.0 }\n\
                      fn main() -> i32 { if half(5.0) == 2.5 { 7 } else { 0 } }";
        assert_eq!(run_main(source), 7);
        assert_eq!(
            run_main("fn main() -> i32 { if -1.5f32 < 0.0f32 { 1 } else { 0 } }"),
            1
        );
    }

    #[test]
    fn float_remainder_truncates_toward_zero() {
        assert_eq!(
            run_main("fn main() -> i32 { if 5.5 % 2.0 == 1.5 { 1 } else { 0 } }"),
            1
        );
        assert_eq!(
            run_main("fn main() -> i32 { let r = -7.5 % 2.0; if r == -1.5 { 1 } else { 0 } }"),
            1
        );
        assert_eq!(
            run_main("fn main() -> i32 { if 5.5f32 % 2.0f32 == 1.5f32 { 1 } else { 0 } }"),
            1
        );
    }

    #[test]
    fn unary_operator_on_diverging_operand() {
        let source = "fn f() -> i32 { -(return 4) }\n\
                      fn main() -> i32 { f() }";
        assert_eq!(run_main(source), 4);
        assert_eq!(run_main("fn main() -> i32 { !(return 5) }"), 5);
    }

    #[test]
    fn calls_imported_functions() {
        let bytes = wasm(
            "extern \"env\" { fn host(v: i32) -> i32; }\n\
             fn main() -> i32 { host(20) + 1 }",
        );
        let engine = wasmi::Engine::default();
        let module = wasmi::Module::new(&engine, &bytes).expect("module");
        let mut linker = wasmi::Linker::new(&engine);
        linker
            .func_wrap("env", "host", |v: i32| -> i32 { v * 2 })
            .expect("link host");
        let mut store = wasmi::Store::new(&engine, ());
        let instance = linker
            .instantiate_and_start(&mut store, &module)
            .expect("instantiate");
        let main = instance
            .get_typed_func::<(), i32>(&store, "main")
            .expect("typed func");
        assert_eq!(main.call(&mut store, ()).expect("execute main"), 41);
    }

    #[test]
    fn exports_only_crate_level_functions() {
        let bytes = wasm("fn main() { fn helper() {} helper(); }\nfn other() -> i64 { 2i64 }");
        let engine = wasmi::Engine::default();
        let module = wasmi::Module::new(&engine, &bytes).expect("module");
        let exports: Vec<String> = module.exports().map(|e| e.name().to_string()).collect();
        assert_eq!(exports, vec!["main".to_string(), "other".to_string()]);
    }

    #[test]
    fn drops_unused_values() {
        wasm("fn one() -> i32 { 1 } fn main() { one(); 2 + 3; { 4 }; }");
    }

    #[test]
    fn rejects_values_without_wasm_type() {
        let err = compile("fn main() { let s = \"hi\"; }").unwrap_err();
        assert!(matches!(err, CoreError::Codegen(_)));

        let err = compile("fn f() {} fn main() { let g = f; }").unwrap_err();
        assert!(matches!(err, CoreError::Codegen(_)));
    }
}
