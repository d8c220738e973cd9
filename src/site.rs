use std::fs;
use std::path::{Path, PathBuf};

use crate::{Binding, Error, FileSystem, Generator, Loader, Result};

/// Generates a set of pages from a web root into an output directory.
///
/// # Examples
///
/// ```no_run
/// use threesg::{Generator, Site};
///
/// let mut site = Site::new(Generator::new("."), "content", "output");
/// site.load_globals("global.cfg".as_ref())?;
/// site.build(["/index.html", "/blog/index.html"])?;
/// # Ok::<(), threesg::Error>(())
/// ```
#[derive(Debug)]
pub struct Site<L = FileSystem> {
    generator: Generator<L>,
    web_root: PathBuf,
    output_dir: PathBuf,
    globals: Vec<Binding>,
}

impl<L> Site<L>
where
    L: Loader,
{
    /// Construct a new site with no global bindings.
    pub fn new(
        generator: Generator<L>,
        web_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            web_root: web_root.into(),
            output_dir: output_dir.into(),
            globals: Vec::new(),
        }
    }

    /// Returns the generator.
    #[inline]
    pub fn generator(&self) -> &Generator<L> {
        &self.generator
    }

    /// Returns the global bindings.
    #[inline]
    pub fn globals(&self) -> &[Binding] {
        &self.globals
    }

    /// Set the global bindings, visible to every page unless shadowed.
    #[inline]
    pub fn set_globals(&mut self, globals: Vec<Binding>) {
        self.globals = globals;
    }

    /// Read the global bindings from the configuration file at `path`.
    ///
    /// Unlike per source configuration, the file must exist.
    pub fn load_globals(&mut self, path: &Path) -> Result<()> {
        let text = self
            .generator
            .loader()
            .load(path)
            .map_err(|err| Error::io(err, path))?;
        self.globals = crate::parse_config(&text).map_err(|err| err.with_path(path))?;
        log::debug!("loaded {} global bindings", self.globals.len());
        Ok(())
    }

    /// Returns the path `page` is written to.
    pub fn output_path(&self, page: &str) -> PathBuf {
        self.output_dir.join(page.trim_start_matches('/'))
    }

    /// Generate a single page and write it to the output directory.
    ///
    /// The page is fully generated before its output file is touched, so a
    /// failed page leaves no partial output behind.
    pub fn build_page(&self, page: &str) -> Result<PathBuf> {
        let html = self
            .generator
            .page(&self.web_root, page)
            .with_globals(&self.globals)
            .to_string()?;

        let out = self.output_path(page);
        if let Some(dir) = out.parent() {
            fs::create_dir_all(dir).map_err(|err| Error::io(err, dir))?;
        }
        fs::write(&out, html).map_err(|err| Error::io(err, &out))?;
        log::info!("generated {page}");
        Ok(out)
    }

    /// Generate every page in order, stopping at the first failure.
    ///
    /// Returns the number of pages generated.
    pub fn build<I, S>(&self, pages: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for page in pages {
            self.build_page(page.as_ref())?;
            count += 1;
        }
        Ok(count)
    }
}

/// Returns `true` if page `b` lives in the same directory as page `a`, or is
/// the `index.html` of an immediate subdirectory of that directory.
///
/// Both pages are expected to be normalized site paths.
///
/// # Examples
///
/// ```
/// use threesg::is_subpage;
///
/// assert!(is_subpage("/blog/index.html", "/blog/first.html"));
/// assert!(is_subpage("/blog/index.html", "/blog/2024/index.html"));
/// assert!(!is_subpage("/blog/index.html", "/blog/2024/first.html"));
/// assert!(!is_subpage("/blog/index.html", "/about.html"));
/// ```
pub fn is_subpage(a: &str, b: &str) -> bool {
    let common = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    if a.as_bytes()[common..].contains(&b'/') {
        return false;
    }
    match b.as_bytes()[common..].iter().position(|&c| c == b'/') {
        Some(i) => &b.as_bytes()[common + i..] == b"/index.html",
        None => true,
    }
}
