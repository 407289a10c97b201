use crate::buffer::Buffer;
use crate::config::Config;
use crate::instance::Instance;
use crate::runtime::{Error, Result};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use wasmtime::{Engine, ExternType, FuncType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<String>,
    pub results: Vec<String>,
}

impl From<&FuncType> for Signature {
    fn from(ty: &FuncType) -> Self {
        Self {
            params: ty.params().map(|p| p.to_string()).collect(),
            results: ty.results().map(|r| r.to_string()).collect(),
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.params.join(", "))?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " -> {}", self.results[0]),
            _ => write!(f, " -> ({})", self.results.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemKind {
    Func,
    Global,
    Table,
    Memory,
    Tag,
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Func => write!(f, "func"),
            ItemKind::Global => write!(f, "global"),
            ItemKind::Table => write!(f, "table"),
            ItemKind::Memory => write!(f, "memory"),
            ItemKind::Tag => write!(f, "tag"),
        }
    }
}

fn describe(ty: &ExternType) -> (ItemKind, Option<Signature>) {
    match ty {
        ExternType::Func(func) => (ItemKind::Func, Some(Signature::from(func))),
        ExternType::Global(_) => (ItemKind::Global, None),
        ExternType::Table(_) => (ItemKind::Table, None),
        ExternType::Memory(_) => (ItemKind::Memory, None),
        _ => (ItemKind::Tag, None),
    }
}

/// An item a module makes available after instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub kind: ItemKind,
    pub sig: Option<Signature>,
}

impl PartialOrd for Export {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Export {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Display for Export {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.sig {
            Some(sig) => write!(f, "{}{}", self.name, sig),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// An item a module expects the host to provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub kind: ItemKind,
    pub sig: Option<Signature>,
}

impl Display for Import {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.module, self.name)?;
        match &self.sig {
            Some(sig) => write!(f, "{}", sig),
            None => write!(f, " ({})", self.kind),
        }
    }
}

/// A validated module, ready to be instantiated.
pub struct Compiled {
    pub(crate) cfg: Config,
    pub(crate) engine: Engine,
    pub(crate) module: wasmtime::Module,
}

impl Compiled {
    pub(crate) fn new(cfg: Config, buffer: &Buffer) -> Result<Self> {
        let mut engine_cfg = wasmtime::Config::new();
        engine_cfg.consume_fuel(cfg.fuel.is_some());
        let engine = Engine::new(&engine_cfg).map_err(Error::Compilation)?;

        // text modules are translated by the engine as well
        let module = wasmtime::Module::new(&engine, buffer).map_err(Error::Compilation)?;

        Ok(Self {
            cfg,
            engine,
            module,
        })
    }

    pub fn instantiate(&self) -> Result<Instance> {
        Instance::new(self)
    }

    /// All exports, functions first, each kind ordered by name.
    pub fn exports(&self) -> Vec<Export> {
        let mut exports = self
            .module
            .exports()
            .map(|e| {
                let (kind, sig) = describe(&e.ty());
                Export {
                    name: e.name().to_string(),
                    kind,
                    sig,
                }
            })
            .collect::<Vec<_>>();
        exports.sort();
        exports
    }

    /// Imports in declaration order.
    pub fn imports(&self) -> Vec<Import> {
        self.module
            .imports()
            .map(|i| {
                let (kind, sig) = describe(&i.ty());
                Import {
                    module: i.module().to_string(),
                    name: i.name().to_string(),
                    kind,
                    sig,
                }
            })
            .collect()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(wat: &str) -> Result<Compiled> {
        Compiled::new(Config::default(), &Buffer::from_bytes(wat))
    }

    #[test]
    fn rejects_garbage() {
        let garbage = Buffer::from_bytes(b"\0asm\x02garbage".to_vec());
        let err = Compiled::new(Config::default(), &garbage).err().unwrap();
        assert!(matches!(err, Error::Compilation(_)));

        let err = compile("(module (func (result i32)))").err().unwrap();
        assert!(matches!(err, Error::Compilation(_)));
    }

    #[test]
    fn exports_and_imports() {
        let compiled = compile(
            r#"
            (module
              (import "env" "log" (func (param i32)))
              (memory (export "memory") 1)
              (func (export "swap") (param i32 i64) (result i64 i32)
                local.get 1
                local.get 0)
              (func (export "add") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                i32.add))
            "#,
        )
        .unwrap();

        let exports = compiled
            .exports()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            exports,
            vec![
                "add(i32, i32) -> i32",
                "swap(i32, i64) -> (i64, i32)",
                "memory memory"
            ]
        );

        let imports = compiled.imports();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].to_string(), "env::log(i32)");
    }
}
