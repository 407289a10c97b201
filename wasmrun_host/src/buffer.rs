use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Magic number every binary WebAssembly module starts with
const WASM_MAGIC: &[u8; 4] = b"\0asm";

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("unable to read {}: {source}", .path.display())]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Text,
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Binary => write!(f, "binary"),
            Format::Text => write!(f, "text"),
        }
    }
}

/// The complete, unparsed content of a module artifact.
pub struct Buffer {
    inner: Vec<u8>,
    origin: Option<PathBuf>,
}

impl Buffer {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // early exit if minimal requirements are not met
        check_minimal_file_requirements(path)?;
        let buf = fs::read(path).map_err(|source| Error::IO {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            inner: buf,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            inner: bytes.into(),
            origin: None,
        }
    }

    /// Best guess at the encoding. Anything without the binary magic is handed to the text parser.
    pub fn format(&self) -> Format {
        if self.inner.starts_with(WASM_MAGIC) {
            Format::Binary
        } else {
            Format::Text
        }
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

fn check_minimal_file_requirements(path: &Path) -> Result<()> {
    let file_meta = path.metadata().map_err(|source| Error::IO {
        path: path.to_path_buf(),
        source,
    })?;

    if !file_meta.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }

    Ok(())
}
