use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use threesg::{Binding, Generator, Loader, Result};

/// An in-memory project, paths are relative to the project directory.
#[derive(Debug, Default)]
pub struct Memory {
    files: BTreeMap<PathBuf, String>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(PathBuf::from(path), contents.to_owned());
        self
    }

    pub fn generator(self) -> Generator<Self> {
        Generator::with_loader("", self)
    }

    /// Renders `page` from the `web` directory.
    pub fn render(self, page: &str) -> Result<String> {
        self.render_with(&[], page)
    }

    pub fn render_with(self, globals: &[Binding], page: &str) -> Result<String> {
        self.generator()
            .page(Path::new("web"), page)
            .with_globals(globals)
            .to_string()
    }
}

impl Loader for Memory {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
