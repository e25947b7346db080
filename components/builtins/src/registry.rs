//! Native function registry.
//!
//! Host functions are registered by name and parameter-type signature before
//! a program is compiled. Call sites resolve against this table at compile
//! time; the interpreter dispatches by [`NativeId`] at runtime.

use crate::var_store::VarStore;
use bytecode_system::{format_types, NativeId};
use core_types::{LinkError, NativeResult, Operand, ValueType};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// State a native may touch while it runs
pub struct NativeContext<'a> {
    /// The owning program's variable store
    pub vars: &'a mut VarStore,
    /// The owning program's output sink
    pub out: &'a mut dyn Write,
}

impl<'a> NativeContext<'a> {
    /// Create a new context
    pub fn new(vars: &'a mut VarStore, out: &'a mut dyn Write) -> Self {
        Self { vars, out }
    }
}

/// Callable behind a native binding.
///
/// Arguments arrive already coerced to the declared parameter types. The
/// returned value is ignored for `void` bindings.
pub type NativeHandle =
    Arc<dyn Fn(&mut NativeContext<'_>, &[Operand]) -> NativeResult<Operand> + Send + Sync>;

/// A registered host function
#[derive(Clone)]
pub struct NativeBinding {
    /// Symbol scripts call
    pub name: String,
    /// Parameter types, in order
    pub params: Vec<ValueType>,
    /// Return type
    pub return_type: ValueType,
    /// Implementation
    pub handle: NativeHandle,
}

impl NativeBinding {
    /// `name(int, float)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, format_types(&self.params))
    }

    /// Run the handle
    pub fn call(&self, ctx: &mut NativeContext<'_>, args: &[Operand]) -> NativeResult<Operand> {
        (self.handle)(ctx, args)
    }
}

impl fmt::Debug for NativeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBinding")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// Table of native bindings, indexed by [`NativeId`]
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    bindings: Vec<NativeBinding>,
}

impl NativeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard library linked
    pub fn with_stdlib() -> Result<Self, LinkError> {
        let mut registry = Self::new();
        crate::link_stdlib(&mut registry)?;
        Ok(registry)
    }

    /// Register a native.
    ///
    /// Fails with [`LinkError::DuplicateNative`] if the same name and
    /// parameter types are already registered.
    pub fn register<F>(
        &mut self,
        name: &str,
        params: &[ValueType],
        return_type: ValueType,
        handle: F,
    ) -> Result<NativeId, LinkError>
    where
        F: Fn(&mut NativeContext<'_>, &[Operand]) -> NativeResult<Operand> + Send + Sync + 'static,
    {
        self.register_handle(name, params, return_type, Arc::new(handle))
    }

    /// Register an already shared handle
    pub fn register_handle(
        &mut self,
        name: &str,
        params: &[ValueType],
        return_type: ValueType,
        handle: NativeHandle,
    ) -> Result<NativeId, LinkError> {
        if self.find_exact(name, params).is_some() {
            return Err(LinkError::DuplicateNative {
                signature: format!("{}({})", name, format_types(params)),
            });
        }
        let id = NativeId(self.bindings.len() as u32);
        self.bindings.push(NativeBinding {
            name: name.to_string(),
            params: params.to_vec(),
            return_type,
            handle,
        });
        Ok(id)
    }

    /// Binding by id
    pub fn get(&self, id: NativeId) -> Option<&NativeBinding> {
        self.bindings.get(id.0 as usize)
    }

    /// Binding whose name and parameter types match exactly
    pub fn find_exact(&self, name: &str, params: &[ValueType]) -> Option<(NativeId, &NativeBinding)> {
        self.iter()
            .find(|(_, b)| b.name == name && b.params == params)
    }

    /// All overloads of `name`
    pub fn overloads(&self, name: &str) -> Vec<(NativeId, &NativeBinding)> {
        self.iter().filter(|(_, b)| b.name == name).collect()
    }

    /// Returns true if any overload of `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b.name == name)
    }

    /// All bindings in registration order
    pub fn iter(&self) -> impl Iterator<Item = (NativeId, &NativeBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(idx, b)| (NativeId(idx as u32), b))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
