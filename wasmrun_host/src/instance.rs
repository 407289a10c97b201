use crate::abi::{Block, Guest};
use crate::invocation::{Invocation, Outcome, Returns};
use crate::module::{Compiled, Signature};
use crate::runtime::{Error, InstantiationError, InvocationError, Result};
use crate::value::Value;
use wasmtime::{Func, Linker, Store, StoreLimits, StoreLimitsBuilder, Trap, Val, ValType};

pub(crate) struct StoreState {
    limits: StoreLimits,
}

/// A live module instance. Owns its store exclusively.
pub struct Instance {
    store: Store<StoreState>,
    inner: wasmtime::Instance,
    fuel: Option<u64>,
}

impl Instance {
    pub(crate) fn new(compiled: &Compiled) -> Result<Self> {
        // nothing is provided to the guest, so any import is unresolvable
        let imports = compiled.imports();
        if !imports.is_empty() {
            return Err(InstantiationError::MissingImports(imports.into()).into());
        }

        let limits = StoreLimitsBuilder::new()
            .memory_size(compiled.cfg.max_memory)
            .build();
        let mut store = Store::new(&compiled.engine, StoreState { limits });
        store.limiter(|state| &mut state.limits);

        let fuel = compiled.cfg.fuel;
        if let Some(limit) = fuel {
            store.set_fuel(limit).map_err(InstantiationError::Store)?;
        }

        let linker = Linker::new(&compiled.engine);
        let inner = linker
            .instantiate(&mut store, &compiled.module)
            .map_err(InstantiationError::Start)?;

        Ok(Self { store, inner, fuel })
    }

    /// Call an export. Lists are passed through guest memory, see [`crate::abi`].
    pub fn invoke(&mut self, invocation: &Invocation) -> Result<Outcome> {
        let func = self
            .inner
            .get_func(&mut self.store, &invocation.export)
            .ok_or_else(|| Error::ExportNotFound(invocation.export.clone()))?;

        self.call(func, invocation)
            .map_err(|cause| Error::Invocation {
                export: invocation.export.clone(),
                cause,
            })
    }

    /// Fuel left after the last call, if metering is enabled.
    pub fn fuel_remaining(&self) -> Option<u64> {
        self.fuel.and_then(|_| self.store.get_fuel().ok())
    }

    fn call(
        &mut self,
        func: Func,
        invocation: &Invocation,
    ) -> std::result::Result<Outcome, InvocationError> {
        let ty = func.ty(&self.store);
        let params = ty.params().collect::<Vec<_>>();
        let results = ty.results().collect::<Vec<_>>();

        check_params(&invocation.args, &params)?;
        check_results(invocation.returns, &results, &Signature::from(&ty))?;

        // refuel first, guest allocations are metered too
        if let Some(limit) = self.fuel {
            self.store.set_fuel(limit).map_err(InvocationError::Trap)?;
        }

        let needs_memory = invocation.returns == Returns::List
            || invocation.args.iter().any(|a| matches!(a, Value::List(_)));
        let guest = match needs_memory {
            true => Some(Guest::resolve(&mut self.store, &self.inner)?),
            false => None,
        };

        let mut blocks = Vec::new();
        let result = self.exchange(func, invocation, guest.as_ref(), &mut blocks, results.len());

        let Some(guest) = &guest else {
            return result;
        };

        // a failed call may have drained the fuel the release needs
        if let (Err(_), Some(limit)) = (&result, self.fuel) {
            self.store.set_fuel(limit).map_err(InvocationError::Trap)?;
        }

        let mut released = Ok(());
        for block in blocks {
            if let Err(err) = guest.release(&mut self.store, block) {
                log::warn!(target: "instance", "{}", err);
                if released.is_ok() {
                    released = Err(err);
                }
            }
        }

        let outcome = result?;
        released?;
        Ok(outcome)
    }

    /// Lower the arguments, call `func` and lift its result. Every guest block handed out or
    /// received ends up in `blocks`, whether the call succeeds or not.
    fn exchange(
        &mut self,
        func: Func,
        invocation: &Invocation,
        guest: Option<&Guest>,
        blocks: &mut Vec<Block>,
        arity: usize,
    ) -> std::result::Result<Outcome, InvocationError> {
        let mut raw_params = Vec::new();
        for arg in invocation.args.iter() {
            match (arg, guest) {
                (Value::List(items), Some(guest)) => {
                    let block = guest.write_list(&mut self.store, items)?;
                    blocks.push(block);
                    raw_params.push(Val::I32(block.ptr));
                    raw_params.push(Val::I32(block.len));
                }
                _ => raw_params.extend(arg.to_val()),
            }
        }

        log::debug!(target: "instance", "calling '{}' with {:?}", invocation.export, raw_params);
        let mut raw_results = vec![Val::I32(0); arity];
        func.call(&mut self.store, &raw_params, &mut raw_results)
            .map_err(|err| {
                if matches!(err.downcast_ref::<Trap>(), Some(Trap::OutOfFuel)) {
                    InvocationError::OutOfFuel
                } else {
                    InvocationError::Trap(err)
                }
            })?;

        let fuel_consumed = match self.fuel {
            Some(limit) => Some(limit - self.store.get_fuel().map_err(InvocationError::Trap)?),
            None => None,
        };

        let value = match invocation.returns {
            Returns::Value => raw_results.first().and_then(Value::from_val),
            Returns::Bool => raw_results.first().and_then(Val::i32).map(|v| Value::Bool(v != 0)),
            Returns::List => match (&raw_results[..], guest) {
                ([Val::I32(ptr), Val::I32(len)], Some(guest)) => {
                    let block = Block {
                        ptr: *ptr,
                        len: *len,
                    };
                    // only a block that could be read is handed back to the allocator
                    let items = guest.read_list(&self.store, block)?;
                    blocks.push(block);
                    Some(Value::List(items))
                }
                _ => None,
            },
        };

        Ok(Outcome {
            value,
            fuel_consumed,
        })
    }
}

fn check_params(args: &[Value], params: &[ValType]) -> std::result::Result<(), InvocationError> {
    let got = args.iter().map(Value::arity).sum::<usize>();
    if got != params.len() {
        return Err(InvocationError::ArityMismatch {
            expected: params.len(),
            got,
        });
    }

    let mut slot = 0;
    for (index, arg) in args.iter().enumerate() {
        for ty in &params[slot..slot + arg.arity()] {
            if !arg.fits(ty) {
                return Err(InvocationError::TypeMismatch {
                    index,
                    expected: ty.to_string(),
                    got: arg.kind(),
                });
            }
        }
        slot += arg.arity();
    }

    Ok(())
}

fn check_results(
    returns: Returns,
    results: &[ValType],
    sig: &Signature,
) -> std::result::Result<(), InvocationError> {
    let ok = match returns {
        Returns::Value => {
            results.len() <= 1
                && results
                    .iter()
                    .all(|r| matches!(r, ValType::I32 | ValType::I64 | ValType::F32 | ValType::F64))
        }
        Returns::Bool => matches!(results, [ValType::I32]),
        Returns::List => matches!(results, [ValType::I32, ValType::I32]),
    };

    match ok {
        true => Ok(()),
        false => Err(InvocationError::ResultMismatch {
            returns,
            sig: sig.clone(),
        }),
    }
}
