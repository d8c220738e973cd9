use std::fs;
use std::io;
use std::path::Path;

/// Reads template and configuration sources.
///
/// The generator never touches the filesystem directly, it goes through a
/// loader. [`FileSystem`] is the default implementation.
pub trait Loader {
    /// Reads the full contents of the source at `path`.
    fn load(&self, path: &Path) -> io::Result<String>;

    /// Returns `true` if a source exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// A [`Loader`] that reads from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystem;

impl Loader for FileSystem {
    #[inline]
    fn load(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<L> Loader for &L
where
    L: Loader + ?Sized,
{
    #[inline]
    fn load(&self, path: &Path) -> io::Result<String> {
        (**self).load(path)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}
