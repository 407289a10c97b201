mod abi;
mod buffer;
mod config;
mod instance;
mod invocation;
mod module;
mod runtime;
mod value;

pub use buffer::{Buffer, Format, Error as LoadError};
pub use config::{Config, ConfigBuilder};
pub use instance::Instance;
pub use invocation::{Invocation, Line, Outcome, Returns, Separator};
pub use module::{Compiled, Export, Import, ItemKind, Signature};
pub use runtime::{Error, Imports, InstantiationError, InvocationError, Result, Runner, Stage};
pub use value::{ParseError, Value};

pub mod guest {
    pub use crate::abi::{ALLOC_EXPORT, Error, FREE_EXPORT, MEMORY_EXPORT};
}

/// The default upper bound for an instance's linear memory (64MiB)
pub(crate) const DEFAULT_MAX_MEMORY: usize = 64 * 1024 * 1024;
