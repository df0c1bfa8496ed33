//! Lexical scopes.
//!
//! [`Scopes`] is the live frame stack used while checking. Every frame it
//! pops is kept, in push order, inside a [`ScopeRecord`] together with the
//! sequence of push/pop events. Code generation walks the tree again with
//! a [`ScopeReplay`], which re-enters the recorded frames in the same order
//! and answers lookups without re-running name resolution.

use std::collections::BTreeMap;

use crate::ast::NodeId;
use crate::error::CoreError;
use crate::types::{FunctionType, Type};

/// A function visible in some scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDecl {
    pub id: NodeId,
    pub name: String,
    pub ty: FunctionType,
}

/// One frame: locals and items declared directly in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    identifiers: BTreeMap<String, Type>,
    items: BTreeMap<String, ItemDecl>,
    function_boundary: bool,
}

impl Scope {
    fn new(function_boundary: bool) -> Self {
        Scope {
            function_boundary,
            ..Scope::default()
        }
    }

    pub fn identifier(&self, name: &str) -> Option<&Type> {
        self.identifiers.get(name)
    }

    pub fn item(&self, name: &str) -> Option<&ItemDecl> {
        self.items.get(name)
    }

    /// Locals of enclosing frames are invisible past this frame.
    pub fn is_function_boundary(&self) -> bool {
        self.function_boundary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEvent {
    Push,
    Pop,
}

/// Frames in push order plus the push/pop sequence that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeRecord {
    events: Vec<ScopeEvent>,
    frames: Vec<Scope>,
}

impl ScopeRecord {
    pub fn events(&self) -> &[ScopeEvent] {
        &self.events
    }

    pub fn frames(&self) -> &[Scope] {
        &self.frames
    }
}

/// The live scope stack.
#[derive(Debug, Default)]
pub struct Scopes {
    /// `(index into record.frames, frame)`
    stack: Vec<(usize, Scope)>,
    record: ScopeRecord,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.push(false);
    }

    pub fn enter_function_scope(&mut self) {
        self.push(true);
    }

    fn push(&mut self, function_boundary: bool) {
        let index = self.record.frames.len();
        self.record.frames.push(Scope::default());
        self.record.events.push(ScopeEvent::Push);
        self.stack.push((index, Scope::new(function_boundary)));
        tracing::trace!(depth = self.depth(), function_boundary, "enter scope");
    }

    pub fn leave_scope(&mut self) {
        if let Some((index, frame)) = self.stack.pop() {
            self.record.frames[index] = frame;
            self.record.events.push(ScopeEvent::Pop);
            tracing::trace!(depth = self.depth(), "leave scope");
        }
    }

    /// Runs `f` inside a fresh frame.
    pub fn in_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter_scope();
        let result = f(self);
        self.leave_scope();
        result
    }

    /// Runs `f` inside a fresh function frame.
    pub fn in_function_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter_function_scope();
        let result = f(self);
        self.leave_scope();
        result
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `false` when the innermost frame already binds `name`.
    pub fn insert_identifier(&mut self, name: &str, ty: Type) -> bool {
        let Some((_, frame)) = self.stack.last_mut() else {
            return false;
        };
        if frame.identifiers.contains_key(name) {
            return false;
        }
        frame.identifiers.insert(name.to_string(), ty);
        true
    }

    /// Returns `false` when the innermost frame already declares an item
    /// with the same name.
    pub fn insert_item(&mut self, decl: ItemDecl) -> bool {
        let Some((_, frame)) = self.stack.last_mut() else {
            return false;
        };
        if frame.items.contains_key(&decl.name) {
            return false;
        }
        frame.items.insert(decl.name.clone(), decl);
        true
    }

    /// Innermost binding of `name`, not looking past the innermost
    /// function boundary.
    pub fn lookup_identifier(&self, name: &str) -> Option<&Type> {
        lookup_identifier_in(self.stack.iter().rev().map(|(_, frame)| frame), name)
    }

    pub fn lookup_item(&self, name: &str) -> Option<&ItemDecl> {
        self.stack
            .iter()
            .rev()
            .find_map(|(_, frame)| frame.item(name))
    }

    pub fn lookup_identifier_in_current(&self, name: &str) -> Option<&Type> {
        self.stack.last().and_then(|(_, frame)| frame.identifier(name))
    }

    pub fn lookup_item_in_current(&self, name: &str) -> Option<&ItemDecl> {
        self.stack.last().and_then(|(_, frame)| frame.item(name))
    }

    /// Closes any frames still open and hands over the record.
    pub fn into_record(mut self) -> ScopeRecord {
        while self.depth() > 0 {
            self.leave_scope();
        }
        self.record
    }
}

fn lookup_identifier_in<'s>(
    frames: impl Iterator<Item = &'s Scope>,
    name: &str,
) -> Option<&'s Type> {
    for frame in frames {
        if let Some(ty) = frame.identifier(name) {
            return Some(ty);
        }
        if frame.is_function_boundary() {
            break;
        }
    }
    None
}

/// Walks a [`ScopeRecord`] in the order it was recorded.
#[derive(Debug)]
pub struct ScopeReplay<'r> {
    record: &'r ScopeRecord,
    next_event: usize,
    next_frame: usize,
    stack: Vec<usize>,
}

impl<'r> ScopeReplay<'r> {
    pub fn new(record: &'r ScopeRecord) -> Self {
        ScopeReplay {
            record,
            next_event: 0,
            next_frame: 0,
            stack: Vec::new(),
        }
    }

    pub fn enter_scope(&mut self) -> Result<(), CoreError> {
        self.expect_event(ScopeEvent::Push)?;
        if self.next_frame >= self.record.frames.len() {
            return Err(CoreError::ScopeMismatch(
                "more scopes entered than were recorded".to_string(),
            ));
        }
        self.stack.push(self.next_frame);
        self.next_frame += 1;
        Ok(())
    }

    pub fn leave_scope(&mut self) -> Result<(), CoreError> {
        self.expect_event(ScopeEvent::Pop)?;
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| {
                CoreError::ScopeMismatch("left a scope that was never entered".to_string())
            })
    }

    /// Runs `f` inside the next recorded frame.
    pub fn in_scope<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        self.enter_scope()?;
        let result = f(self)?;
        self.leave_scope()?;
        Ok(result)
    }

    fn expect_event(&mut self, expected: ScopeEvent) -> Result<(), CoreError> {
        match self.record.events.get(self.next_event) {
            Some(event) if *event == expected => {
                self.next_event += 1;
                Ok(())
            }
            found => Err(CoreError::ScopeMismatch(format!(
                "expected {expected:?} at event {}, recorded {found:?}",
                self.next_event
            ))),
        }
    }

    fn frames(&self) -> impl Iterator<Item = &'r Scope> + '_ {
        let record = self.record;
        self.stack.iter().rev().map(move |&index| &record.frames[index])
    }

    pub fn lookup_item(&self, name: &str) -> Option<&'r ItemDecl> {
        self.frames().find_map(|frame| frame.item(name))
    }

    pub fn lookup_identifier(&self, name: &str) -> Option<&'r Type> {
        lookup_identifier_in(self.frames(), name)
    }

    /// Whether every recorded event has been replayed.
    pub fn is_finished(&self) -> bool {
        self.next_event == self.record.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(id: u32, name: &str) -> ItemDecl {
        ItemDecl {
            id: NodeId(id),
            name: name.to_string(),
            ty: FunctionType::new(vec![], Type::I32),
        }
    }

    #[test]
    fn inner_frames_shadow_and_restore() {
        let mut scopes = Scopes::new();
        scopes.enter_scope();
        assert!(scopes.insert_identifier("x", Type::I32));

        scopes.in_scope(|scopes| {
            assert!(scopes.insert_identifier("x", Type::Bool));
            assert_eq!(scopes.lookup_identifier("x"), Some(&Type::Bool));
            assert_eq!(scopes.lookup_identifier_in_current("x"), Some(&Type::Bool));
        });

        assert_eq!(scopes.lookup_identifier("x"), Some(&Type::I32));
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn same_frame_rebinding_is_rejected() {
        let mut scopes = Scopes::new();
        scopes.enter_scope();
        assert!(scopes.insert_identifier("x", Type::I32));
        assert!(!scopes.insert_identifier("x", Type::I64));
        assert!(scopes.insert_item(decl(0, "f")));
        assert!(!scopes.insert_item(decl(1, "f")));
        assert_eq!(scopes.lookup_item("f").map(|d| d.id), Some(NodeId(0)));
    }

    #[test]
    fn locals_stop_at_function_boundary_but_items_do_not() {
        let mut scopes = Scopes::new();
        scopes.enter_scope();
        scopes.insert_identifier("outer", Type::I32);
        scopes.insert_item(decl(0, "helper"));

        scopes.in_function_scope(|scopes| {
            scopes.in_scope(|scopes| {
                assert_eq!(scopes.lookup_identifier("outer"), None);
                assert!(scopes.lookup_item("helper").is_some());
                assert!(scopes.lookup_item_in_current("helper").is_none());
            });
        });
    }

    #[test]
    fn replay_follows_the_record() {
        let mut scopes = Scopes::new();
        scopes.enter_scope();
        scopes.insert_item(decl(0, "main"));
        scopes.in_function_scope(|scopes| {
            scopes.insert_identifier("arg", Type::U8);
            scopes.in_scope(|scopes| {
                scopes.insert_item(decl(1, "nested"));
            });
        });
        let record = scopes.into_record();
        assert_eq!(record.frames().len(), 3);
        assert_eq!(record.events().len(), 6);

        let mut replay = ScopeReplay::new(&record);
        replay.enter_scope().expect("crate frame");
        replay
            .in_scope(|replay| {
                assert_eq!(replay.lookup_identifier("arg"), Some(&Type::U8));
                replay.in_scope(|replay| {
                    assert_eq!(replay.lookup_item("nested").map(|d| d.id), Some(NodeId(1)));
                    assert_eq!(replay.lookup_item("main").map(|d| d.id), Some(NodeId(0)));
                    Ok(())
                })
            })
            .expect("function frames");
        replay.leave_scope().expect("crate frame");
        assert!(replay.is_finished());
    }

    #[test]
    fn replay_rejects_divergence() {
        let mut scopes = Scopes::new();
        scopes.in_scope(|_| {});
        let record = scopes.into_record();

        let mut replay = ScopeReplay::new(&record);
        assert!(matches!(replay.leave_scope(), Err(CoreError::ScopeMismatch(_))));
        replay.enter_scope().expect("enter");
        assert!(matches!(replay.enter_scope(), Err(CoreError::ScopeMismatch(_))));
    }
}
