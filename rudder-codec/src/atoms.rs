//! Browser atoms and the load-once cache in front of them.
//!
//! A handful of commands have no native endpoint and are emulated by
//! injecting a self-contained JavaScript function (an "atom") through
//! `executeScript`. Atom bodies are function expressions; before injection
//! they are wrapped so the remote end applies them to the script arguments.
//!
//! Sources are pluggable via [`AtomSource`]: the default [`BundledAtoms`]
//! serves copies compiled into the binary, [`DirAtoms`] reads them from a
//! directory at runtime. The [`AtomCache`] in front guarantees each atom is
//! read at most once per process; failed reads are reported every time and
//! never poison the cache.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::CodecError;

/// Where atom bodies come from.
pub trait AtomSource: Send + Sync {
    /// Fetch the raw function expression for `name` (e.g. `get-attribute.js`).
    fn load(&self, name: &str) -> io::Result<String>;
}

const GET_ATTRIBUTE_JS: &str = include_str!("../atoms/get-attribute.js");
const IS_DISPLAYED_JS: &str = include_str!("../atoms/is-displayed.js");

/// Atoms compiled into the binary via `include_str!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledAtoms;

impl AtomSource for BundledAtoms {
    fn load(&self, name: &str) -> io::Result<String> {
        match name {
            "get-attribute.js" => Ok(GET_ATTRIBUTE_JS.to_string()),
            "is-displayed.js" => Ok(IS_DISPLAYED_JS.to_string()),
            other => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bundled atom named {other}"),
            )),
        }
    }
}

/// Atoms read from a directory on disk, one file per atom.
#[derive(Debug, Clone)]
pub struct DirAtoms {
    root: PathBuf,
}

impl DirAtoms {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AtomSource for DirAtoms {
    fn load(&self, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(name))
    }
}

/// Memoizing front for an [`AtomSource`].
///
/// The cache is shared by every command encoded through one codec; the lock
/// is held across the underlying read so concurrent first requests for the
/// same atom still load it exactly once.
pub struct AtomCache {
    source: Box<dyn AtomSource>,
    loaded: Mutex<HashMap<String, Arc<str>>>,
}

impl AtomCache {
    pub fn new(source: impl AtomSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// The atom wrapped into an injectable script body.
    pub(crate) fn wrapped(&self, name: &str) -> Result<String, CodecError> {
        let body = self.fetch(name)?;
        Ok(format!("return ({body}).apply(null, arguments);"))
    }

    fn fetch(&self, name: &str) -> Result<Arc<str>, CodecError> {
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(atom) = loaded.get(name) {
            return Ok(Arc::clone(atom));
        }
        match self.source.load(name) {
            Ok(text) => {
                tracing::debug!(atom = name, bytes = text.len(), "atoms.loaded");
                let atom: Arc<str> = Arc::from(text);
                loaded.insert(name.to_string(), Arc::clone(&atom));
                Ok(atom)
            }
            Err(source) => Err(CodecError::AtomLoad {
                atom: name.to_string(),
                source,
            }),
        }
    }
}

impl Default for AtomCache {
    fn default() -> Self {
        Self::new(BundledAtoms)
    }
}
