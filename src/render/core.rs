use std::fmt;
use std::path::{Path, PathBuf};

use crate::parse::parse_directive;
use crate::render::{CONTENT, PATH, TEMPLATE};
use crate::scope::{Binding, ScopeChain, ScopeId};
use crate::types::directive::Directive;
use crate::types::span::Span;
use crate::types::syntax::{Kind, ESCAPE};
use crate::{Error, Generator, Loader, Result};

/// How a source's own configuration file is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Config {
    /// Enter a new scope and merge the configuration into it.
    Scoped,
    /// Merge the configuration into the caller's scope.
    Shared,
    /// Ignore the configuration.
    Skip,
}

pub(crate) struct RendererImpl<'render, L> {
    pub(crate) generator: &'render Generator<L>,
    pub(crate) vars: &'render mut ScopeChain,
    pub(crate) out: &'render mut dyn fmt::Write,
    pub(crate) max_depth: usize,
    pub(crate) depth: usize,
    /// Scopes at or below this position belong to the caller, `CONTENT` may
    /// not render into them.
    pub(crate) floor: usize,
}

impl<'render, L> RendererImpl<'render, L>
where
    L: Loader,
{
    /// Generate the output for the source at `path` as seen from `scope`.
    pub(crate) fn generate(&mut self, scope: ScopeId, path: &Path, config: Config) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::max_depth(self.max_depth).with_path(path));
        }
        self.depth += 1;
        let result = self.generate_one(scope, path, config);
        self.depth -= 1;
        result
    }

    fn generate_one(&mut self, scope: ScopeId, path: &Path, config: Config) -> Result<()> {
        let local = match config {
            Config::Scoped => Some(self.vars.enter(scope)),
            Config::Shared | Config::Skip => None,
        };
        let scope = local.unwrap_or(scope);
        if config != Config::Skip {
            if let Some(bindings) = self.generator.load_config(path)? {
                log::trace!("merging {} bindings for {}", bindings.len(), path.display());
                self.vars.merge(scope, bindings);
            }
        }

        match self.vars.lookup(scope, TEMPLATE).filter(|t| !t.is_empty()) {
            Some(template) => {
                let template = self.generator.project_dir().join(template);
                log::debug!(
                    "wrapping {} in template {}",
                    path.display(),
                    template.display()
                );
                self.vars.merge(
                    scope,
                    [
                        Binding::cleared(TEMPLATE),
                        Binding::new(CONTENT, path.to_string_lossy()),
                    ],
                );
                self.generate(scope, &template, Config::Scoped)?;
            }
            None => self.render_source(scope, path)?,
        }

        if let Some(local) = local {
            self.vars.leave(local);
        }
        Ok(())
    }

    fn render_source(&mut self, scope: ScopeId, path: &Path) -> Result<()> {
        log::debug!("rendering {}", path.display());
        let source = self
            .generator
            .loader()
            .load(path)
            .map_err(|err| Error::io(err, path))?;
        self.render_text(scope, &source)
            .map_err(|err| err.with_path(path))
    }

    fn render_text(&mut self, scope: ScopeId, source: &str) -> Result<()> {
        let generator = self.generator;
        let syntax = generator.syntax();

        let mut i = 0;
        while let Some((kind, j, k)) = generator.searcher().find_at(source, i) {
            self.out.write_str(&source[i..j])?;
            i = match kind {
                Kind::Escape => self.render_escape(source, k)?,
                Kind::Close => {
                    let reason = format!("unmatched `{}`", syntax.close());
                    return Err(Error::syntax(reason, source, j..k));
                }
                Kind::Open => {
                    let (directive, n) = parse_directive(syntax, source, j)?;
                    self.evaluate(scope, directive, source, Span::from(j..n))?;
                    n
                }
            };
        }
        self.out.write_str(&source[i..])?;
        Ok(())
    }

    /// Emits an escaped opening delimiter, and the rest of the directive it
    /// opens if that directive closes on the same line before another opening
    /// delimiter. Returns the offset to continue scanning from.
    fn render_escape(&mut self, source: &str, i: usize) -> Result<usize> {
        let syntax = self.generator.syntax();
        if !source[i..].starts_with(syntax.open()) {
            self.out.write_str(ESCAPE)?;
            return Ok(i);
        }
        // The literal run ends at the first close delimiter on the line unless
        // another open delimiter starts before it.
        let m = i + syntax.open().len();
        let mut limit = source[m..].find(['\n', '\r']).map_or(source.len(), |d| m + d);
        if let Some(d) = source[m..limit].find(syntax.open()) {
            limit = m + d;
        }
        let n = source[m..limit]
            .find(syntax.close())
            .map_or(m, |d| m + d + syntax.close().len());
        self.out.write_str(&source[i..n])?;
        Ok(n)
    }

    fn evaluate(
        &mut self,
        scope: ScopeId,
        directive: Directive<'_>,
        source: &str,
        span: Span,
    ) -> Result<()> {
        match directive {
            Directive::Var(name) => match self.vars.lookup(scope, name) {
                Some(value) => self.out.write_str(value)?,
                None => {
                    let reason = format!("undefined variable `{name}`");
                    return Err(Error::render(reason, source, span));
                }
            },

            Directive::Path => {
                let value = self
                    .vars
                    .lookup(scope, PATH)
                    .expect("`PATH` is bound for every page");
                self.out.write_str(value)?;
            }

            Directive::Content => {
                let content = self.vars.enclosing(scope).and_then(|(parent, b)| {
                    match (b.key(), b.value()) {
                        (CONTENT, Some(v)) => Some((parent, PathBuf::from(v))),
                        _ => None,
                    }
                });
                let content = content.filter(|(parent, _)| parent.index() > self.floor);
                let Some((parent, content)) = content else {
                    let reason = format!("`{CONTENT}` used outside of a template");
                    return Err(Error::render(reason, source, span));
                };
                self.generate(parent, &content, Config::Skip)?;
            }

            Directive::Include(name) => {
                let path = self.generator.project_dir().join(name);
                self.generate(scope, &path, Config::Shared)?;
            }

            directive => {
                let kw = directive
                    .keyword()
                    .expect("only variables have no keyword");
                let reason = format!("`{}` directives are not supported", kw.human());
                return Err(Error::unsupported(reason, source, span));
            }
        }
        Ok(())
    }
}
