//! Passing sequences through guest linear memory.
//!
//! A list argument is copied into a block obtained from the guest's `alloc` export and handed
//! over as `(ptr, len)`. A list result comes back as a `(ptr, len)` pair as well. Blocks are
//! released through `free` when the module provides one.

use wasmtime::{Instance, Memory, Store, TypedFunc};

pub const MEMORY_EXPORT: &str = "memory";
pub const ALLOC_EXPORT: &str = "alloc";
pub const FREE_EXPORT: &str = "free";

const ITEM_SIZE: usize = size_of::<i32>();

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("module does not export a linear memory named 'memory'")]
    MissingMemory,
    #[error("module does not export 'alloc(i32) -> i32': {0:#}")]
    MissingAllocator(wasmtime::Error),
    #[error("guest allocation of {size} bytes failed: {cause:#}")]
    Alloc { size: i32, cause: wasmtime::Error },
    #[error("guest release of block {ptr:#x} failed: {cause:#}")]
    Free { ptr: i32, cause: wasmtime::Error },
    #[error("guest memory access out of bounds: {len} bytes at {ptr:#x}")]
    OutOfBounds { ptr: i32, len: usize },
    #[error("invalid block returned by guest: ptr={ptr}, len={len}")]
    InvalidBlock { ptr: i32, len: i32 },
    #[error("list with {0} items does not fit into guest memory")]
    TooLong(usize),
}

/// A block of `len` `i32`s at `ptr` in guest memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
    pub ptr: i32,
    pub len: i32,
}

impl Block {
    fn size(&self) -> i32 {
        self.len.saturating_mul(ITEM_SIZE as i32)
    }
}

/// The memory related exports of an instance.
pub(crate) struct Guest {
    memory: Memory,
    alloc: TypedFunc<i32, i32>,
    free: Option<TypedFunc<(i32, i32), ()>>,
}

impl Guest {
    pub(crate) fn resolve<T: 'static>(store: &mut Store<T>, instance: &Instance) -> Result<Self> {
        let memory = instance
            .get_memory(&mut *store, MEMORY_EXPORT)
            .ok_or(Error::MissingMemory)?;
        let alloc = instance
            .get_typed_func::<i32, i32>(&mut *store, ALLOC_EXPORT)
            .map_err(Error::MissingAllocator)?;

        let free = match instance.get_func(&mut *store, FREE_EXPORT) {
            None => None,
            Some(_) => match instance.get_typed_func::<(i32, i32), ()>(&mut *store, FREE_EXPORT) {
                Ok(free) => Some(free),
                Err(err) => {
                    log::warn!("ignoring '{}' export with unexpected signature: {:#}", FREE_EXPORT, err);
                    None
                }
            },
        };

        Ok(Self {
            memory,
            alloc,
            free,
        })
    }

    /// Copy `items` into a freshly allocated guest block.
    pub(crate) fn write_list<T: 'static>(&self, store: &mut Store<T>, items: &[i32]) -> Result<Block> {
        let len = i32::try_from(items.len()).map_err(|_| Error::TooLong(items.len()))?;
        let size = len
            .checked_mul(ITEM_SIZE as i32)
            .ok_or(Error::TooLong(items.len()))?;

        let ptr = self
            .alloc
            .call(&mut *store, size)
            .map_err(|cause| Error::Alloc { size, cause })?;

        let bytes = items
            .iter()
            .flat_map(|x| x.to_le_bytes())
            .collect::<Vec<u8>>();
        let offset = usize::try_from(ptr).map_err(|_| Error::InvalidBlock { ptr, len })?;
        self.memory
            .write(&mut *store, offset, &bytes)
            .map_err(|_| Error::OutOfBounds {
                ptr,
                len: bytes.len(),
            })?;

        Ok(Block { ptr, len })
    }

    pub(crate) fn read_list<T: 'static>(&self, store: &Store<T>, block: Block) -> Result<Vec<i32>> {
        let (offset, len) = match (usize::try_from(block.ptr), usize::try_from(block.len)) {
            (Ok(offset), Ok(len)) => (offset, len),
            _ => {
                return Err(Error::InvalidBlock {
                    ptr: block.ptr,
                    len: block.len,
                });
            }
        };

        // guest controlled length, check bounds before copying
        let size = len.saturating_mul(ITEM_SIZE);
        let bytes = offset
            .checked_add(size)
            .and_then(|end| self.memory.data(store).get(offset..end))
            .ok_or(Error::OutOfBounds {
                ptr: block.ptr,
                len: size,
            })?;

        Ok(bytes
            .chunks_exact(ITEM_SIZE)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Hand the block back to the guest allocator. No-op without a `free` export.
    pub(crate) fn release<T: 'static>(&self, store: &mut Store<T>, block: Block) -> Result<()> {
        let Some(free) = &self.free else {
            return Ok(());
        };

        free.call(&mut *store, (block.ptr, block.size()))
            .map_err(|cause| Error::Free {
                ptr: block.ptr,
                cause,
            })
    }
}
