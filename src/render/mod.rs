mod core;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::fmt::Writer;
pub(crate) use crate::render::core::{Config, RendererImpl};
use crate::scope::{Binding, ScopeChain};
use crate::{Error, Generator, Loader, Result};

/// The site-relative path of the page being generated.
pub(crate) const PATH: &str = "PATH";
/// The template that wraps a source.
pub(crate) const TEMPLATE: &str = "TEMPLATE";
/// The source wrapped by the current template.
pub(crate) const CONTENT: &str = "CONTENT";

/// A renderer that generates a single page.
///
/// This struct is created by [`Generator::page`].
#[must_use = "must call `.to_string()` or `.to_writer(..)` on the renderer"]
pub struct Renderer<'render, L> {
    generator: &'render Generator<L>,
    web_root: &'render Path,
    page: &'render str,
    globals: &'render [Binding],
    max_depth: Option<usize>,
}

impl<'render, L> Renderer<'render, L>
where
    L: Loader,
{
    pub(crate) fn new(
        generator: &'render Generator<L>,
        web_root: &'render Path,
        page: &'render str,
    ) -> Self {
        Self {
            generator,
            web_root,
            page,
            globals: &[],
            max_depth: None,
        }
    }

    /// Set the global bindings, visible to every source unless shadowed.
    pub fn with_globals(mut self, globals: &'render [Binding]) -> Self {
        self.globals = globals;
        self
    }

    /// Set the maximum number of nested templates and includes, as counted
    /// from the page source.
    ///
    /// Defaults to the generator setting.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Returns the path of the page source under the web root.
    pub fn source_path(&self) -> PathBuf {
        self.web_root.join(self.page.trim_start_matches('/'))
    }

    /// Render the page to a string.
    pub fn to_string(self) -> Result<String> {
        let mut s = String::new();
        self.render(&mut s)?;
        Ok(s)
    }

    /// Render the page to the given writer.
    ///
    /// Output is written as it is generated, so on error the writer may hold
    /// a partial page.
    pub fn to_writer<W>(self, w: W) -> Result<()>
    where
        W: io::Write,
    {
        let mut w = Writer::new(w);
        self.render(&mut w)
            .and_then(|()| w.flush().map_err(Error::from))
            .map_err(|err| w.take_err().map(Error::from).unwrap_or(err))
    }

    fn render(&self, out: &mut dyn fmt::Write) -> Result<()> {
        let generator = self.generator;
        let mut vars = ScopeChain::new();
        let mut scope = vars.root();
        vars.merge(scope, self.globals.iter().cloned());

        // Each directory between the web root and the page may carry its own
        // configuration, nearer directories shadowing farther ones.
        let mut dir = self.web_root.to_path_buf();
        for name in page_dirs(self.page) {
            dir.push(name);
            if let Some(bindings) = generator.load_config(&dir)? {
                log::trace!("merging {} bindings for {}", bindings.len(), dir.display());
                scope = vars.enter(scope);
                vars.merge(scope, bindings);
            }
        }
        vars.bind(scope, Binding::new(PATH, self.page));

        let source = self.source_path();
        log::debug!("generating {} from {}", self.page, source.display());
        RendererImpl {
            generator,
            vars: &mut vars,
            out,
            max_depth: self.max_depth.unwrap_or(generator.max_depth()),
            depth: 0,
            floor: scope.index(),
        }
        .generate(scope, &source, Config::Scoped)
    }
}

/// Returns the directories containing `page`, outermost first.
fn page_dirs(page: &str) -> impl Iterator<Item = &str> {
    let page = page.trim_start_matches('/');
    let dirs = page.rsplit_once('/').map_or("", |(dirs, _)| dirs);
    dirs.split('/').filter(|d| !d.is_empty() && *d != ".")
}
