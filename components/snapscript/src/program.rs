//! The program façade: compile, initialize, look up, invoke

use builtins::{link_stdlib_since, NativeContext, NativeRegistry, VarStore};
use bytecode_system::CompiledProgram;
use core_types::{
    CompileError, CompileResult, LinkError, NativeResult, Operand, Precision, RuntimeFault,
    ScriptInvocationError, ValueType,
};
use interpreter::{ExecutionContext, Vm, VmState};
use log::{debug, info, warn};
use parser::{compile_program, ScriptSource};
use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use crate::error::{LookupError, RuntimeInitError};
use crate::function::{next_build_id, Function};
use crate::options::ProgramOptions;

/// Output of one successful compile
struct Build {
    id: u64,
    program: CompiledProgram,
    registry: NativeRegistry,
}

/// A set of script sources compiled and run as one unit.
///
/// Each program owns its instruction buffer, function table, natives,
/// variable store, output sink and VM. Programs share nothing, so separate
/// programs may run on separate threads.
///
/// # Examples
///
/// ```
/// use snapscript::{Operand, ScriptProgram, ScriptSource, SharedOutput};
///
/// let mut program = ScriptProgram::new(vec![ScriptSource::new(
///     "main",
///     "int Twice(int x) { return x * 2; }",
/// )]);
/// assert!(program.compile());
/// program.init_runtime(false).unwrap();
///
/// let twice = program.find_function("Twice").unwrap();
/// assert_eq!(program.invoke(&twice, &[Operand::Int(21)]).unwrap(), Operand::Int(42));
/// ```
pub struct ScriptProgram {
    options: ProgramOptions,
    sources: Vec<ScriptSource>,
    host_natives: NativeRegistry,
    build: Option<Build>,
    last_error: Option<CompileError>,
    vars: VarStore,
    out: Box<dyn Write + Send>,
    vm: Option<Vm>,
    created: Instant,
}

impl ScriptProgram {
    /// Create a program with default options
    pub fn new(sources: Vec<ScriptSource>) -> Self {
        Self::with_options(ProgramOptions::default(), sources)
    }

    /// Create a program with explicit options
    pub fn with_options(options: ProgramOptions, sources: Vec<ScriptSource>) -> Self {
        let mut vars = VarStore::new();
        vars.set_max_array_len(options.max_array_len);
        Self {
            options,
            sources,
            host_natives: NativeRegistry::new(),
            build: None,
            last_error: None,
            vars,
            out: Box::new(io::stdout()),
            vm: None,
            created: Instant::now(),
        }
    }

    /// Options this program was created with
    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// Sources in compile order
    pub fn sources(&self) -> &[ScriptSource] {
        &self.sources
    }

    /// Add a source. Any previous compile is discarded.
    pub fn add_source(&mut self, source: ScriptSource) {
        self.invalidate();
        self.sources.push(source);
    }

    /// Register a host native. Any previous compile is discarded.
    ///
    /// Fails if the same name and parameter types were already registered
    /// by the host. Clashes with the standard library surface at compile
    /// time as [`LinkError::DuplicateNative`].
    pub fn register_native<F>(
        &mut self,
        name: &str,
        params: &[ValueType],
        return_type: ValueType,
        handle: F,
    ) -> Result<(), LinkError>
    where
        F: Fn(&mut NativeContext<'_>, &[Operand]) -> NativeResult<Operand> + Send + Sync + 'static,
    {
        self.invalidate();
        self.host_natives.register(name, params, return_type, handle)?;
        debug!("registered host native {}", name);
        Ok(())
    }

    /// Redirect `print`/`println` output (stdout by default)
    pub fn set_output<W: Write + Send + 'static>(&mut self, writer: W) {
        self.out = Box::new(writer);
    }

    fn invalidate(&mut self) {
        self.build = None;
        self.vm = None;
    }

    /// Standard library first, then host natives in registration order.
    /// `timeMillis` counts from program construction across recompiles.
    fn link(&self) -> CompileResult<NativeRegistry> {
        let mut registry = NativeRegistry::new();
        if self.options.link_stdlib {
            link_stdlib_since(&mut registry, self.created)?;
        }
        for (_, binding) in self.host_natives.iter() {
            registry.register_handle(
                &binding.name,
                &binding.params,
                binding.return_type,
                binding.handle.clone(),
            )?;
        }
        info!("linked {} native(s)", registry.len());
        Ok(registry)
    }

    /// Compile every source into one program.
    ///
    /// Returns false on failure; the error is kept in
    /// [`last_compile_error`](Self::last_compile_error). A successful compile
    /// clears it. The runtime must be (re)initialized after every compile.
    pub fn compile(&mut self) -> bool {
        self.invalidate();
        info!("compiling {} source(s)", self.sources.len());
        let result = self.link().and_then(|registry| {
            let program = compile_program(&self.sources, &registry, &self.options.compile_options())?;
            Ok((registry, program))
        });
        match result {
            Ok((registry, program)) => {
                let id = next_build_id();
                info!(
                    "compiled build {}: {} function(s), {} instruction(s)",
                    id,
                    program.script_functions().count(),
                    program.chunk.instruction_count()
                );
                self.build = Some(Build {
                    id,
                    program,
                    registry,
                });
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!("compile failed: {}", err);
                self.last_error = Some(err);
                false
            }
        }
    }

    /// Error of the most recent failed compile
    pub fn last_compile_error(&self) -> Option<&CompileError> {
        self.last_error.as_ref()
    }

    /// Returns true after a successful compile
    pub fn is_compiled(&self) -> bool {
        self.build.is_some()
    }

    /// Compiled artifact, for disassembly
    pub fn bytecode(&self) -> Option<&CompiledProgram> {
        self.build.as_ref().map(|b| &b.program)
    }

    /// Build the VM and run the constant initializer.
    ///
    /// `use_double` selects `f64` storage for script floats, both in the VM
    /// and in the variable store.
    pub fn init_runtime(&mut self, use_double: bool) -> Result<(), RuntimeInitError> {
        self.vm = None;
        let build = self.build.as_ref().ok_or(RuntimeInitError::NotCompiled)?;
        let precision = Precision::from_use_double(use_double);
        self.vars.set_use_double(use_double);

        let mut vm = Vm::new(self.options.vm_config(precision));
        let mut ctx = ExecutionContext::new(&build.program, &build.registry, &mut self.vars, &mut *self.out);
        vm.initialize(&mut ctx).map_err(|err| {
            warn!("constant initialization failed: {}", err);
            RuntimeInitError::Initializer(err)
        })?;

        info!(
            "runtime initialized: {} precision, {} constant(s)",
            if use_double { "double" } else { "single" },
            vm.globals().len()
        );
        self.vm = Some(vm);
        Ok(())
    }

    /// Returns true once `init_runtime` has succeeded for the current build
    pub fn is_initialized(&self) -> bool {
        self.vm.is_some()
    }

    /// First declared overload of `name`
    pub fn find_function(&self, name: &str) -> Result<Function, LookupError> {
        let build = self.build.as_ref().ok_or(LookupError::NotCompiled)?;
        build
            .program
            .find(name)
            .map(|(id, info)| Function::new(build.id, id, info))
            .ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
            })
    }

    /// The overload of `name` taking exactly `params`
    pub fn find_function_with(&self, name: &str, params: &[ValueType]) -> Result<Function, LookupError> {
        let build = self.build.as_ref().ok_or(LookupError::NotCompiled)?;
        if let Some((id, info)) = build.program.find_exact(name, params) {
            return Ok(Function::new(build.id, id, info));
        }
        if build.program.find(name).is_some() {
            Err(LookupError::NoOverload {
                name: name.to_string(),
                params: params.to_vec(),
            })
        } else {
            Err(LookupError::NotFound {
                name: name.to_string(),
            })
        }
    }

    /// Every overload of `name`, in declaration order
    pub fn find_functions(&self, name: &str) -> Vec<Function> {
        match &self.build {
            Some(build) => build
                .program
                .overloads(name)
                .into_iter()
                .map(|(id, info)| Function::new(build.id, id, info))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every script function, in declaration order
    pub fn script_functions(&self) -> Vec<Function> {
        match &self.build {
            Some(build) => build
                .program
                .script_functions()
                .map(|(id, info)| Function::new(build.id, id, info))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Run `function` to completion.
    ///
    /// The argument count must match and each argument must have the
    /// parameter's type; ints are accepted for float parameters.
    pub fn invoke(&mut self, function: &Function, args: &[Operand]) -> Result<Operand, ScriptInvocationError> {
        let (build, vm) = match (&self.build, &mut self.vm) {
            (Some(build), Some(vm)) => (build, vm),
            _ => {
                return Err(ScriptInvocationError::new(
                    function.name(),
                    0,
                    RuntimeFault::NotInitialized,
                ))
            }
        };
        if function.build() != build.id {
            return Err(ScriptInvocationError::new(
                function.name(),
                0,
                RuntimeFault::ForeignFunction,
            ));
        }
        let mut ctx = ExecutionContext::new(&build.program, &build.registry, &mut self.vars, &mut *self.out);
        vm.invoke(&mut ctx, function.id(), args)
    }

    /// Global constants and their current values, in declaration order.
    /// Empty until the runtime is initialized.
    pub fn constants(&self) -> Vec<(&str, &Operand)> {
        match (&self.build, &self.vm) {
            (Some(build), Some(vm)) => build
                .program
                .globals
                .iter()
                .zip(vm.globals())
                .map(|(info, value)| (info.name.as_str(), value))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Value of the global constant `name`
    pub fn constant_value(&self, name: &str) -> Option<&Operand> {
        let build = self.build.as_ref()?;
        let (id, _) = build.program.find_global(name)?;
        self.vm.as_ref()?.globals().get(id.0 as usize)
    }

    /// The program's variable store
    pub fn var_store(&self) -> &VarStore {
        &self.vars
    }

    /// Mutable access to the program's variable store
    pub fn var_store_mut(&mut self) -> &mut VarStore {
        &mut self.vars
    }

    /// State of the most recent invocation
    pub fn state(&self) -> VmState {
        self.vm.as_ref().map(Vm::state).unwrap_or_default()
    }
}

impl fmt::Debug for ScriptProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptProgram")
            .field("options", &self.options)
            .field("sources", &self.sources.len())
            .field("compiled", &self.is_compiled())
            .field("initialized", &self.is_initialized())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
