//! Host handles to compiled script functions

use bytecode_system::{FunctionId, FunctionInfo};
use core_types::ValueType;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUILD: AtomicU64 = AtomicU64::new(1);

/// Allocate an id for one successful compile of one program
pub(crate) fn next_build_id() -> u64 {
    NEXT_BUILD.fetch_add(1, Ordering::Relaxed)
}

/// A compiled script function, as returned by lookup.
///
/// The handle remembers which compile produced it, so invoking it on any
/// other program (or after a recompile) is rejected instead of jumping into
/// an unrelated instruction buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    build: u64,
    id: FunctionId,
    name: String,
    params: Vec<ValueType>,
    return_type: ValueType,
}

impl Function {
    pub(crate) fn new(build: u64, id: FunctionId, info: &FunctionInfo) -> Self {
        Self {
            build,
            id,
            name: info.name.clone(),
            params: info.params.clone(),
            return_type: info.return_type,
        }
    }

    pub(crate) fn build(&self) -> u64 {
        self.build
    }

    pub(crate) fn id(&self) -> FunctionId {
        self.id
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types, in order
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared return type
    pub fn return_type(&self) -> ValueType {
        self.return_type
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            bytecode_system::format_types(&self.params)
        )
    }
}
