//! A small static site generator built around layered variable scopes.
//!
//! # Features
//!
//! - Variables: `[title]`
//! - Page path: `[PATH]`
//! - Template inheritance: a source sets `TEMPLATE = base.html` and the
//!   template pulls the source back in with `[CONTENT]`
//! - Includes: `[INCL nav.html]`
//! - Per source, per directory and global configuration files
//! - Configurable delimiters: `{{ title }}`, `<? INCL nav.html ?>`
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//!
//! # Getting started
//!
//! Your entry point is the [`Generator`] struct. A generator holds the project
//! directory that templates and includes are resolved against, the directive
//! syntax and the loader used to read sources.
//!
//! ```no_run
//! let generator = threesg::Generator::new("site");
//! ```
//!
//! Every source may be accompanied by a configuration file with the same name
//! plus a `.cfg` extension. Configuration files hold `key = value` lines.
//!
//! ```
//! let bindings = threesg::parse_config("title = Hello  # the page title")?;
//! assert_eq!(bindings[0].key(), "title");
//! assert_eq!(bindings[0].value(), Some("Hello"));
//! # Ok::<(), threesg::Error>(())
//! ```
//!
//! Pages are rendered using [`.page`][Generator::page].
//!
//! ```no_run
//! # let generator = threesg::Generator::new("site");
//! let globals = [threesg::Binding::new("site", "Example")];
//! let html = generator
//!     .page("site/content".as_ref(), "/blog/index.html")
//!     .with_globals(&globals)
//!     .to_string()?;
//! # Ok::<(), threesg::Error>(())
//! ```
//!
//! To generate many pages into an output directory use a [`Site`].
//!
//! # Scoping
//!
//! Variables are resolved through a [`ScopeChain`]. Global bindings live in
//! the root scope. Each directory between the web root and a page may carry a
//! `<dir>.cfg` layered on top, then `PATH` is bound to the page path and the
//! page's own configuration is layered on top of that. A template sees the
//! bindings of the source it wraps, and bindings set by a template are not
//! visible once the template is done. Configuration of an included fragment is
//! merged into the including source's scope.
//!
//! # Custom loaders
//!
//! Sources are read through the [`Loader`] trait, the default [`FileSystem`]
//! loader reads from disk.
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::io;
//! use std::path::{Path, PathBuf};
//!
//! use threesg::{Generator, Loader};
//!
//! struct Memory(BTreeMap<PathBuf, String>);
//!
//! impl Loader for Memory {
//!     fn load(&self, path: &Path) -> io::Result<String> {
//!         self.0.get(path).cloned().ok_or_else(|| io::ErrorKind::NotFound.into())
//!     }
//!
//!     fn exists(&self, path: &Path) -> bool {
//!         self.0.contains_key(path)
//!     }
//! }
//!
//! let mut files = BTreeMap::new();
//! files.insert(PathBuf::from("web/index.html"), "World".into());
//! files.insert(PathBuf::from("web/index.html.cfg"), "TEMPLATE = base.html".into());
//! files.insert(PathBuf::from("base.html"), "<p>[CONTENT]</p>".into());
//!
//! let generator = Generator::with_loader("", Memory(files));
//! let html = generator.page("web".as_ref(), "/index.html").to_string()?;
//! assert_eq!(html, "<p>World</p>");
//! # Ok::<(), threesg::Error>(())
//! ```
//!
//! # Feature flags
//!
//! - **unicode** _(enabled by default)_: allows variable names to start with
//!   any lowercase Unicode identifier character and uses the display width
//!   of the source when pointing at errors.

mod error;
mod fmt;
mod loader;
mod parse;
mod render;
mod scope;
mod site;
mod types;
mod vars;

use std::fmt as std_fmt;
use std::path::{Path, PathBuf};

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::loader::{FileSystem, Loader};
pub use crate::parse::parse_directive;
pub use crate::render::Renderer;
pub use crate::scope::{Binding, ScopeChain, ScopeId};
pub use crate::site::{is_subpage, Site};
pub use crate::types::directive::{Directive, Keyword};
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
pub use crate::vars::parse_config;

use crate::parse::Searcher;
use crate::render::{Config, RendererImpl};

/// The default extension of configuration files.
const CONFIG_EXTENSION: &str = "cfg";

/// The default maximum number of nested templates and includes.
const MAX_DEPTH: usize = 64;

/// Generates pages from sources, templates and configuration files.
pub struct Generator<L = FileSystem> {
    loader: L,
    project_dir: PathBuf,
    syntax: Syntax,
    searcher: Searcher,
    config_extension: String,
    max_depth: usize,
}

impl Generator {
    /// Construct a new generator that reads from the filesystem.
    ///
    /// `TEMPLATE` values and `INCL` arguments are resolved against
    /// `project_dir`.
    #[inline]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(project_dir, FileSystem)
    }
}

impl<L> Generator<L>
where
    L: Loader,
{
    /// Construct a new generator that reads sources using `loader`.
    pub fn with_loader(project_dir: impl Into<PathBuf>, loader: L) -> Self {
        let syntax = Syntax::default();
        Self {
            loader,
            project_dir: project_dir.into(),
            searcher: Searcher::new(&syntax),
            syntax,
            config_extension: CONFIG_EXTENSION.to_owned(),
            max_depth: MAX_DEPTH,
        }
    }

    /// Set the directive syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use threesg::{Generator, Syntax};
    ///
    /// let mut generator = Generator::new(".");
    /// generator.set_syntax(Syntax::builder().directive("{{", "}}").build());
    /// ```
    #[inline]
    pub fn set_syntax(&mut self, syntax: Syntax) {
        self.searcher = Searcher::new(&syntax);
        self.syntax = syntax;
    }

    /// Set the extension appended to a source path to find its configuration.
    ///
    /// Defaults to `cfg`.
    #[inline]
    pub fn set_config_extension(&mut self, ext: impl Into<String>) {
        self.config_extension = ext.into();
    }

    /// Set the maximum number of nested templates and includes.
    ///
    /// Defaults to 64.
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Returns the directory that templates and includes are resolved against.
    #[inline]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Returns the directive syntax.
    #[inline]
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Returns the maximum number of nested templates and includes.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the loader.
    #[inline]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Returns the path of the configuration file that accompanies `path`.
    ///
    /// ```
    /// let generator = threesg::Generator::new(".");
    /// let cfg = generator.config_path("blog/index.html".as_ref());
    /// assert_eq!(cfg, std::path::Path::new("blog/index.html.cfg"));
    /// ```
    pub fn config_path(&self, path: &Path) -> PathBuf {
        let mut s = path.as_os_str().to_owned();
        s.push(".");
        s.push(&self.config_extension);
        PathBuf::from(s)
    }

    /// Load and parse the configuration file that accompanies `path`.
    ///
    /// Returns `Ok(None)` if there is no configuration file.
    pub fn load_config(&self, path: &Path) -> Result<Option<Vec<Binding>>> {
        let cfg = self.config_path(path);
        if !self.loader.exists(&cfg) {
            return Ok(None);
        }
        let text = self.loader.load(&cfg).map_err(|err| Error::io(err, &cfg))?;
        let bindings = parse_config(&text).map_err(|err| err.with_path(&cfg))?;
        Ok(Some(bindings))
    }

    /// Returns a renderer for the page at `page` under `web_root`.
    ///
    /// `page` is the site-relative path of the page, for example
    /// `/blog/index.html`. It is bound to `PATH` while rendering.
    #[inline]
    pub fn page<'render>(
        &'render self,
        web_root: &'render Path,
        page: &'render str,
    ) -> Renderer<'render, L> {
        Renderer::new(self, web_root, page)
    }

    /// Generate the source at `path` as seen from `scope`, writing to `out`.
    ///
    /// The source's configuration is merged into a new scope nested in
    /// `scope`, which is left again before returning. If generation fails
    /// every scope it entered is left as well, output already written to
    /// `out` is not undone.
    ///
    /// `[CONTENT]` only renders content wrapped by a template during this
    /// call. A `CONTENT` binding the caller placed in `scope` is not used,
    /// such a directive fails as it would outside of a template.
    ///
    /// # Panics
    ///
    /// If a source uses `[PATH]` and `PATH` is not visible from `scope`.
    pub fn generate(
        &self,
        vars: &mut ScopeChain,
        scope: ScopeId,
        path: &Path,
        out: &mut dyn std_fmt::Write,
    ) -> Result<()> {
        let innermost = vars.innermost();
        let result = RendererImpl {
            generator: self,
            vars: &mut *vars,
            out,
            max_depth: self.max_depth,
            depth: 0,
            floor: innermost.index(),
        }
        .generate(scope, path, Config::Scoped);
        if result.is_err() {
            vars.unwind(innermost);
        }
        result
    }

    pub(crate) fn searcher(&self) -> &Searcher {
        &self.searcher
    }
}

impl<L> std_fmt::Debug for Generator<L> {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.debug_struct("Generator")
            .field("project_dir", &self.project_dir)
            .field("syntax", &self.syntax)
            .field("config_extension", &self.config_extension)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
