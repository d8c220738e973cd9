use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "unicode")]
use unicode_width::UnicodeWidthStr;

use crate::types::span::Span;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while parsing configuration or generating a page.
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
    path: Option<PathBuf>,
    pretty: Option<Pretty>,
    source: Option<io::Error>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A malformed directive or an unmatched delimiter.
    Syntax,
    /// A malformed configuration line.
    Config,
    /// A directive that could not be evaluated.
    Render,
    /// A directive that is recognized but has no evaluation semantics.
    Unsupported,
    /// The maximum template or include depth was exceeded.
    MaxDepth,
    /// Reading a source or writing the output failed.
    Io,
}

/// The offending source line, captured when the error is created so that it
/// can be displayed after the source is gone.
struct Pretty {
    line: usize,
    col: usize,
    width: usize,
    code: String,
}

impl Error {
    fn new(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: Some(reason.into()),
            path: None,
            pretty: None,
            source: None,
        }
    }

    fn spanned(
        kind: ErrorKind,
        reason: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        let mut err = Self::new(kind, reason);
        err.pretty = Some(Pretty::new(source, span.into()));
        err
    }

    pub(crate) fn syntax(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::spanned(ErrorKind::Syntax, reason, source, span)
    }

    pub(crate) fn config(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::spanned(ErrorKind::Config, reason, source, span)
    }

    pub(crate) fn render(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::spanned(ErrorKind::Render, reason, source, span)
    }

    pub(crate) fn unsupported(
        reason: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self::spanned(ErrorKind::Unsupported, reason, source, span)
    }

    pub(crate) fn max_depth(max: usize) -> Self {
        Self::new(
            ErrorKind::MaxDepth,
            format!("reached maximum template depth ({max})"),
        )
    }

    pub(crate) fn io(err: io::Error, path: &Path) -> Self {
        Self {
            kind: ErrorKind::Io,
            reason: None,
            path: Some(path.to_owned()),
            pretty: None,
            source: Some(err),
        }
    }

    /// Attaches the path of the offending source, unless one is already set
    /// by a nested page.
    pub(crate) fn with_path(mut self, path: &Path) -> Self {
        if self.path.is_none() {
            self.path = Some(path.to_owned());
        }
        self
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for this error, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the path of the source that caused this error.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the 1-based line in the source that caused this error.
    pub fn line(&self) -> Option<usize> {
        self.pretty.as_ref().map(|p| p.line)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            reason: None,
            path: None,
            pretty: None,
            source: Some(err),
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::new(ErrorKind::Io, "failed to write output")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as _)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pretty {
            Some(pretty) => fmt_pretty(
                self.kind.human(),
                self.reason().unwrap_or(""),
                self.path(),
                pretty,
                f,
            ),
            None => fmt::Display::fmt(self, f),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.human();
        if f.alternate() {
            if let Some(pretty) = &self.pretty {
                return fmt_pretty(kind, self.reason().unwrap_or(""), self.path(), pretty, f);
            }
        }
        write!(f, "{kind}")?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        if let Some(err) = &self.source {
            write!(f, ": {err}")?;
        }
        match (&self.path, self.line()) {
            (Some(path), Some(line)) => write!(f, " ({}:{line})", path.display()),
            (Some(path), None) => write!(f, " ({})", path.display()),
            (None, Some(line)) => write!(f, " (<anonymous>:{line})"),
            (None, None) => Ok(()),
        }
    }
}

impl ErrorKind {
    fn human(&self) -> &'static str {
        match self {
            Self::Syntax => "invalid syntax",
            Self::Config => "invalid configuration",
            Self::Render => "failed to render",
            Self::Unsupported => "unsupported directive",
            Self::MaxDepth => "maximum depth exceeded",
            Self::Io => "io error",
        }
    }
}

impl Pretty {
    fn new(source: &str, span: Span) -> Self {
        let line = span.line(source);
        let start = source[..span.m].rfind('\n').map_or(0, |i| i + 1);
        let end = source[span.m..]
            .find(['\n', '\r'])
            .map_or(source.len(), |i| span.m + i);
        let code = &source[start..end];
        let col = width(&source[start..span.m]);
        let width = width(&source[span.m..span.n.min(end)]).max(1);
        Self {
            line,
            col,
            width,
            code: code.to_owned(),
        }
    }
}

fn fmt_pretty(
    kind: &str,
    reason: &str,
    path: Option<&Path>,
    pretty: &Pretty,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let (line, col, width, code) = (pretty.line, pretty.col, pretty.width, &pretty.code);

    let num = line.to_string();
    let pad = num.len();
    let underline = "^".repeat(width);
    let location = match path {
        Some(path) => path.display().to_string(),
        None => String::from("<anonymous>"),
    };

    write!(
        f,
        "{kind}\n\
        {0:pad$} --> {location}:{line}:{col1}\n\
        {0:pad$} |\n\
        {num} | {code}\n\
        {0:pad$} | {0:col$}{underline}\n\
        {0:pad$} |\n\
        {0:pad$} = reason: {reason}\n",
        "",
        col1 = col + 1,
    )
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    s.width()
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_path_and_line() {
        let source = "lorem\nipsum [Foo] dolor";
        let err = Error::syntax("unknown keyword `Foo`", source, 12..17)
            .with_path(Path::new("content/index.html"));
        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.to_string(),
            "invalid syntax: unknown keyword `Foo` (content/index.html:2)"
        );
    }

    #[test]
    fn display_pretty() {
        let source = "lorem\nipsum [Foo] dolor";
        let err = Error::syntax("unknown keyword `Foo`", source, 13..16)
            .with_path(Path::new("content/index.html"));
        assert_eq!(
            format!("{err:#}"),
            "invalid syntax
  --> content/index.html:2:8
  |
2 | ipsum [Foo] dolor
  |        ^^^
  |
  = reason: unknown keyword `Foo`
"
        );
    }

    #[test]
    fn with_path_keeps_innermost() {
        let err = Error::render("undefined variable `x`", "[x]", 0..3)
            .with_path(Path::new("inner.html"))
            .with_path(Path::new("outer.html"));
        assert_eq!(err.path(), Some(Path::new("inner.html")));
    }

    #[test]
    fn io_error_display() {
        let err = Error::io(
            io::Error::new(io::ErrorKind::NotFound, "not found"),
            Path::new("missing.html"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "io error: not found (missing.html)");
    }
}
