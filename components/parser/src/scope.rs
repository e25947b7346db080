//! Block scopes and local slot allocation for one function body

use bytecode_system::SlotId;
use core_types::ValueType;
use std::collections::HashMap;

/// A resolved local variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    /// Frame slot holding the value
    pub slot: SlotId,
    /// Declared type
    pub ty: ValueType,
}

#[derive(Debug, Default)]
struct Scope {
    names: HashMap<String, Local>,
    first_slot: u32,
}

/// Stack of nested block scopes.
///
/// Slots of a closed scope are reused by later siblings; the frame needs
/// [`ScopeStack::slot_count`] slots in total.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    next_slot: u32,
    high_water: u32,
}

impl ScopeStack {
    /// Create a stack holding the outermost function scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            next_slot: 0,
            high_water: 0,
        }
    }

    /// Open a nested scope
    pub fn push(&mut self) {
        self.scopes.push(Scope {
            names: HashMap::new(),
            first_slot: self.next_slot,
        });
    }

    /// Close the innermost scope, releasing its slots
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                self.next_slot = scope.first_slot;
            }
        }
    }

    /// Declare a name in the innermost scope.
    ///
    /// Returns `None` if the name already exists in that scope.
    pub fn declare(&mut self, name: &str, ty: ValueType) -> Option<Local> {
        let scope = self.scopes.last_mut()?;
        if scope.names.contains_key(name) {
            return None;
        }
        let local = Local {
            slot: SlotId(self.next_slot),
            ty,
        };
        scope.names.insert(name.to_string(), local);
        self.next_slot += 1;
        self.high_water = self.high_water.max(self.next_slot);
        Some(local)
    }

    /// Innermost binding of `name`
    pub fn resolve(&self, name: &str) -> Option<Local> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.names.get(name).copied())
    }

    /// Frame size needed by everything declared so far
    pub fn slot_count(&self) -> usize {
        self.high_water as usize
    }

    /// Current nesting depth, 1 for the function scope
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
