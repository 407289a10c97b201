use crate::buffer::{self, Buffer};
use crate::config::Config;
use crate::instance::Instance;
use crate::invocation::{Invocation, Outcome, Returns};
use crate::module::{Compiled, Import, Signature};
use crate::abi;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to load module: {0}")]
    Io(#[from] buffer::Error),
    #[error("unable to compile module: {0:#}")]
    Compilation(wasmtime::Error),
    #[error("unable to instantiate module: {0}")]
    Instantiation(#[from] InstantiationError),
    #[error("export not found: '{0}'")]
    ExportNotFound(String),
    #[error("invocation of '{export}' failed: {cause}")]
    Invocation {
        export: String,
        cause: InvocationError,
    },
    #[error("unable to write output: {0}")]
    Emit(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum InstantiationError {
    #[error("unresolved imports: {0}")]
    MissingImports(Imports),
    #[error("store setup failed: {0:#}")]
    Store(wasmtime::Error),
    #[error("{0:#}")]
    Start(wasmtime::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("expected {expected} parameters but got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("argument {index}: expected {expected} but got {got}")]
    TypeMismatch {
        index: usize,
        expected: String,
        got: &'static str,
    },
    #[error("signature {sig} cannot be read as {returns:?}")]
    ResultMismatch { returns: Returns, sig: Signature },
    #[error("out of fuel")]
    OutOfFuel,
    #[error("{0:#}")]
    Trap(wasmtime::Error),
    #[error("{0}")]
    Abi(#[from] abi::Error),
}

#[derive(Debug)]
pub struct Imports(Vec<Import>);

impl From<Vec<Import>> for Imports {
    fn from(imports: Vec<Import>) -> Self {
        Self(imports)
    }
}

impl Imports {
    pub fn as_slice(&self) -> &[Import] {
        &self.0
    }
}

impl Display for Imports {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let imports = self
            .0
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{}", imports)
    }
}

/// Progress of a single run. Only ever moves forward.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Stage {
    Unloaded,
    Compiled,
    Instantiated,
    Invoked,
}

/// Loads a module, instantiates it and calls its exports.
#[derive(Default)]
pub struct Runner {
    cfg: Config,
}

impl Runner {
    pub fn new<C: Into<Config>>(cfg: C) -> Self {
        Self { cfg: cfg.into() }
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Buffer> {
        let buffer = Buffer::new(path)?;
        log::debug!(
            target: "runner",
            "loaded {} bytes ({}) from {:?}",
            buffer.len(),
            buffer.format(),
            buffer.origin()
        );
        Ok(buffer)
    }

    pub fn compile(&self, buffer: &Buffer) -> Result<Compiled> {
        let compiled = Compiled::new(self.cfg.clone(), buffer)?;
        log::debug!(target: "runner", "stage -> {:?}", Stage::Compiled);
        Ok(compiled)
    }

    pub fn instantiate(&self, compiled: &Compiled) -> Result<Instance> {
        let instance = compiled.instantiate()?;
        log::debug!(target: "runner", "stage -> {:?}", Stage::Instantiated);
        Ok(instance)
    }

    pub fn invoke(&self, instance: &mut Instance, invocation: &Invocation) -> Result<Outcome> {
        let outcome = instance.invoke(invocation)?;
        log::debug!(
            target: "runner",
            "stage -> {:?}: {} returned {:?}",
            Stage::Invoked,
            invocation.export(),
            outcome.value
        );
        Ok(outcome)
    }

    /// Write `<label> <sep> <value>` followed by a newline.
    pub fn emit<W: Write>(
        &self,
        out: &mut W,
        invocation: &Invocation,
        outcome: &Outcome,
    ) -> Result<()> {
        writeln!(out, "{}", outcome.line(invocation))?;
        Ok(())
    }

    /// Run the whole pipeline. Stops at the first failure; lines already written stay written.
    pub fn run<P, W>(&self, path: P, invocations: &[Invocation], out: &mut W) -> Result<Vec<Outcome>>
    where
        P: AsRef<Path>,
        W: Write,
    {
        log::debug!(target: "runner", "stage -> {:?}", Stage::Unloaded);
        let buffer = self.load(path)?;
        let compiled = self.compile(&buffer)?;
        let mut instance = self.instantiate(&compiled)?;

        let mut outcomes = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            let outcome = self.invoke(&mut instance, invocation)?;
            self.emit(out, invocation, &outcome)?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
