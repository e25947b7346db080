//! Compiled program artifact: buffer, function table and global table.

use crate::chunk::BytecodeChunk;
use crate::opcode::{FunctionId, GlobalId, NativeId};
use core_types::{SourcePosition, ValueType};
use std::fmt;

/// Name of the synthetic function that initializes global constants.
///
/// Not a valid identifier, so scripts and hosts can never look it up.
pub const INITIALIZER_NAME: &str = "<const-init>";

/// Render a parameter list as `int, float`
pub fn format_types(types: &[ValueType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Metadata of one compiled function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// Function name
    pub name: String,
    /// Parameter types, in order
    pub params: Vec<ValueType>,
    /// Declared return type
    pub return_type: ValueType,
    /// Offset of the first instruction
    pub entry: usize,
    /// Number of local slots, parameters included
    pub local_count: usize,
    /// Position of the declaration
    pub position: SourcePosition,
}

impl FunctionInfo {
    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `name(int, float)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, format_types(&self.params))
    }
}

/// A global constant declared in a `const { ... }` block
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalInfo {
    /// Constant name
    pub name: String,
    /// Declared type
    pub ty: ValueType,
    /// Declaration position
    pub position: SourcePosition,
}

/// Everything the interpreter needs to run a program
#[derive(Debug, Clone, Default)]
pub struct CompiledProgram {
    /// Shared instruction buffer
    pub chunk: BytecodeChunk,
    /// Function table, indexed by [`FunctionId`]
    pub functions: Vec<FunctionInfo>,
    /// Global constants, indexed by [`GlobalId`]
    pub globals: Vec<GlobalInfo>,
    /// Synthetic constant initializer, if the program declares constants
    pub initializer: Option<FunctionId>,
    /// Natives referenced by call sites
    pub natives: Vec<NativeId>,
}

impl CompiledProgram {
    /// Function metadata by id
    pub fn function(&self, id: FunctionId) -> Option<&FunctionInfo> {
        self.functions.get(id.0 as usize)
    }

    /// Script functions in declaration order, the initializer excluded
    pub fn script_functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionInfo)> {
        let initializer = self.initializer;
        self.functions
            .iter()
            .enumerate()
            .map(|(idx, info)| (FunctionId(idx as u32), info))
            .filter(move |(id, _)| Some(*id) != initializer)
    }

    /// First declared overload named `name`
    pub fn find(&self, name: &str) -> Option<(FunctionId, &FunctionInfo)> {
        self.script_functions().find(|(_, info)| info.name == name)
    }

    /// Overload of `name` whose parameter types equal `params`
    pub fn find_exact(&self, name: &str, params: &[ValueType]) -> Option<(FunctionId, &FunctionInfo)> {
        self.script_functions()
            .find(|(_, info)| info.name == name && info.params == params)
    }

    /// All overloads named `name`, in declaration order
    pub fn overloads(&self, name: &str) -> Vec<(FunctionId, &FunctionInfo)> {
        self.script_functions()
            .filter(|(_, info)| info.name == name)
            .collect()
    }

    /// Global constant by id
    pub fn global(&self, id: GlobalId) -> Option<&GlobalInfo> {
        self.globals.get(id.0 as usize)
    }

    /// Global constant by name
    pub fn find_global(&self, name: &str) -> Option<(GlobalId, &GlobalInfo)> {
        self.globals
            .iter()
            .enumerate()
            .find(|(_, g)| g.name == name)
            .map(|(idx, g)| (GlobalId(idx as u32), g))
    }
}

/// Disassembly listing, one function at a time
impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.chunk.constants.is_empty() {
            writeln!(f, "constants:")?;
            for (idx, value) in self.chunk.constants.iter().enumerate() {
                writeln!(f, "  #{:<4} {:?}", idx, value)?;
            }
        }
        let mut order: Vec<&FunctionInfo> = self.functions.iter().collect();
        order.sort_by_key(|info| info.entry);
        for (i, info) in order.iter().enumerate() {
            let end = order
                .get(i + 1)
                .map(|next| next.entry)
                .unwrap_or(self.chunk.instruction_count());
            writeln!(
                f,
                "\n{} {} (entry {:04}, {} locals):",
                info.return_type,
                info.signature(),
                info.entry,
                info.local_count
            )?;
            self.chunk.write_range(f, info.entry..end)?;
        }
        Ok(())
    }
}
