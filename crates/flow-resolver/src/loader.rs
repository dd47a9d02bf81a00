//! # Program Loading
//!
//! A [`Loader`] turns a location string into program source. The resolver treats
//! locations as opaque keys; a loader may additionally say how an import written
//! inside one program maps onto the location of another.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Loader`] | Trait for source loading and location normalization |
//! | [`FileLoader`] | Reads files below a base directory, resolves `./` and `../` imports |
//! | [`MemoryLoader`] | In-memory location -> source map |

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source of program code.
///
/// Only [`load`](Loader::load) is required. The default location hooks are identities,
/// which makes import lookup an exact string match.
pub trait Loader {
    /// Load the UTF-8 source for `location`.
    fn load(&self, location: &str) -> Result<String>;

    /// Map an import written inside `importer` to a location.
    fn resolve_import(&self, importer: &str, import: &str) -> String {
        let _ = importer;
        import.to_string()
    }

    /// Canonical form of a location, used to compare program locations with each other
    /// and with resolved imports.
    fn canonicalize(&self, location: &str) -> String {
        location.to_string()
    }
}

impl<L: Loader + ?Sized> Loader for &L {
    fn load(&self, location: &str) -> Result<String> {
        (**self).load(location)
    }

    fn resolve_import(&self, importer: &str, import: &str) -> String {
        (**self).resolve_import(importer, import)
    }

    fn canonicalize(&self, location: &str) -> String {
        (**self).canonicalize(location)
    }
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn load(&self, location: &str) -> Result<String> {
        (**self).load(location)
    }

    fn resolve_import(&self, importer: &str, import: &str) -> String {
        (**self).resolve_import(importer, import)
    }

    fn canonicalize(&self, location: &str) -> String {
        (**self).canonicalize(location)
    }
}

// =============================================================================
// FileLoader
// =============================================================================

/// Loads programs from files relative to a base directory.
///
/// Locations are slash-separated paths. An import starting with `./` or `../` is
/// resolved against the directory of the importing program, so
/// `import Token from "./Token.cdc"` inside `contracts/NFT.cdc` names `contracts/Token.cdc`.
/// Any other import string is taken as-is.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base_dir: PathBuf,
}

impl FileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Loader for FileLoader {
    fn load(&self, location: &str) -> Result<String> {
        let path = self.base_dir.join(location);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
    }

    fn resolve_import(&self, importer: &str, import: &str) -> String {
        if !(import.starts_with("./") || import.starts_with("../")) {
            return import.to_string();
        }
        match importer.rfind('/') {
            Some(i) => format!("{}/{}", &importer[..i], import),
            None => import.to_string(),
        }
    }

    fn canonicalize(&self, location: &str) -> String {
        normalize_path(location)
    }
}

/// Lexically normalize a slash-separated path: drop `.` and empty segments, fold `..`.
///
/// Leading `..` segments of a relative path are kept; `..` at the root of an absolute
/// path is dropped.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            segment => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

// =============================================================================
// MemoryLoader
// =============================================================================

/// In-memory loader keyed by exact location.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, location: impl Into<String>, code: impl Into<String>) -> Self {
        self.insert(location, code);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, code: impl Into<String>) {
        self.sources.insert(location.into(), code.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, location: &str) -> Result<String> {
        self.sources
            .get(location)
            .cloned()
            .ok_or_else(|| anyhow!("no source registered for location {:?}", location))
    }
}
