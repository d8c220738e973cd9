//! Parse a single directive from template source.
//!
//! A directive is an opening delimiter, optional blanks, a keyword or a
//! lowercase identifier, optional blanks and one argument token when the
//! keyword requires one, optional blanks and a closing delimiter. Blanks are
//! spaces and tabs. A directive must close on the line on which it opens and
//! may not contain another opening delimiter.

mod search;

pub use crate::parse::search::Searcher;

use crate::types::directive::{Directive, Keyword};
use crate::types::span::Span;
use crate::types::syntax::Syntax;
use crate::{Error, Result};

/// Parse the directive whose opening delimiter starts at `at`.
///
/// Returns the directive and the offset just past its closing delimiter.
///
/// # Panics
///
/// If `source` does not contain the opening delimiter at `at`.
///
/// # Examples
///
/// ```
/// use threesg::{parse_directive, Directive, Syntax};
///
/// let source = "Hello [INCL nav.html]!";
/// let (directive, end) = parse_directive(&Syntax::default(), source, 6)?;
/// assert_eq!(directive, Directive::Include("nav.html"));
/// assert_eq!(&source[end..], "!");
/// # Ok::<(), threesg::Error>(())
/// ```
pub fn parse_directive<'source>(
    syntax: &Syntax,
    source: &'source str,
    at: usize,
) -> Result<(Directive<'source>, usize)> {
    Parser::new(syntax, source, at)?.parse()
}

/// A parser over the inside of one directive.
struct Parser<'source> {
    source: &'source str,
    /// The span of the closing delimiter.
    end: Span,
    /// A cursor between the delimiters.
    cursor: usize,
}

impl<'source> Parser<'source> {
    fn new(syntax: &Syntax, source: &'source str, at: usize) -> Result<Self> {
        assert!(
            source[at..].starts_with(syntax.open()),
            "expected opening delimiter"
        );
        let begin = Span::from(at..at + syntax.open().len());
        let i = begin.n;

        // The directive must close before the end of the line and before any
        // other opening delimiter.
        let limit = source[i..].find(['\n', '\r']).map_or(source.len(), |d| i + d);
        let j = match source[i..limit].find(syntax.close()) {
            Some(d) => i + d,
            None => return Err(err_unclosed(source, begin)),
        };
        if source[i..j].contains(syntax.open()) {
            return Err(err_unclosed(source, begin));
        }

        Ok(Self {
            source,
            end: Span::from(j..j + syntax.close().len()),
            cursor: i,
        })
    }

    fn parse(mut self) -> Result<(Directive<'source>, usize)> {
        let span = match self.next_token() {
            Some(span) => span,
            None => return Err(self.err_unexpected_end("keyword or identifier")),
        };
        let token = &self.source[span];

        let directive = if token.starts_with(is_var_start) {
            Directive::Var(token)
        } else {
            let kw = Keyword::from_str(token).ok_or_else(|| {
                Error::syntax(format!("unknown keyword `{token}`"), self.source, span)
            })?;
            self.parse_keyword(kw)?
        };

        if let Some(span) = self.next_token() {
            return Err(Error::syntax("unexpected token", self.source, span));
        }
        Ok((directive, self.end.n))
    }

    /// Parses the argument, if any, following the given keyword.
    fn parse_keyword(&mut self, kw: Keyword) -> Result<Directive<'source>> {
        let arg = if kw.takes_arg() {
            match self.next_token() {
                Some(span) => Some(&self.source[span]),
                None => {
                    let exp = format!("argument for `{}`", kw.human());
                    return Err(self.err_unexpected_end(exp));
                }
            }
        } else {
            if let Some(span) = self.next_token() {
                return Err(Error::syntax(
                    format!("unexpected argument for `{}`", kw.human()),
                    self.source,
                    span,
                ));
            }
            None
        };
        // We can `.unwrap()` since the argument was checked against the
        // keyword above.
        Ok(Directive::with_keyword(kw, arg).unwrap())
    }

    /// Returns the span of the next blank delimited token before the closing
    /// delimiter.
    fn next_token(&mut self) -> Option<Span> {
        let limit = self.end.m;
        let rest = &self.source[self.cursor..limit];
        let m = self.cursor + (rest.len() - rest.trim_start_matches(is_blank).len());
        if m == limit {
            self.cursor = limit;
            return None;
        }
        let n = self.source[m..limit]
            .find(is_blank)
            .map_or(limit, |d| m + d);
        self.cursor = n;
        Some(Span::from(m..n))
    }

    fn err_unexpected_end(&self, exp: impl std::fmt::Display) -> Error {
        Error::syntax(
            format!("expected {exp}, found end of directive"),
            self.source,
            self.end,
        )
    }
}

fn err_unclosed(source: &str, begin: Span) -> Error {
    Error::syntax("unclosed directive", source, begin)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

#[cfg(feature = "unicode")]
fn is_var_start(c: char) -> bool {
    c == '_' || (c.is_lowercase() && unicode_ident::is_xid_start(c))
}

#[cfg(not(feature = "unicode"))]
fn is_var_start(c: char) -> bool {
    matches!(c, 'a'..='z' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn parse_var() {
        assert_eq!(parse("[title]").unwrap(), (Directive::Var("title"), 7));
        assert_eq!(parse("[ _private\t]").unwrap().0, Directive::Var("_private"));
        assert_eq!(parse("[camelCase]").unwrap().0, Directive::Var("camelCase"));
    }

    #[cfg(feature = "unicode")]
    #[test]
    fn parse_var_unicode() {
        assert_eq!(parse("[привіт]").unwrap().0, Directive::Var("привіт"));
    }

    #[test]
    fn parse_keywords_without_argument() {
        assert_eq!(parse("[PATH]").unwrap().0, Directive::Path);
        assert_eq!(parse("[ CONTENT ]").unwrap().0, Directive::Content);
        assert_eq!(parse("[ENDFOR]").unwrap().0, Directive::EndFor);
        assert_eq!(parse("[ENDREVFORALL]").unwrap().0, Directive::EndRevForAll);
    }

    #[test]
    fn parse_keywords_with_argument() {
        assert_eq!(
            parse("[INCL nav.html]").unwrap().0,
            Directive::Include("nav.html")
        );
        assert_eq!(parse("[IF\tdraft ]").unwrap().0, Directive::If("draft"));
        assert_eq!(parse("[REVFOR posts]").unwrap().0, Directive::RevFor("posts"));
        assert_eq!(
            parse("[FORALL /blog/]").unwrap().0,
            Directive::ForAll("/blog/")
        );
    }

    #[test]
    fn parse_returns_offset_after_close() {
        let source = "ab[PATH]cd";
        let (_, end) = parse_directive(&Syntax::default(), source, 2).unwrap();
        assert_eq!(&source[end..], "cd");
    }

    #[test]
    fn parse_multi_character_delimiters() {
        let syntax = Syntax::builder().directive("{{", "}}").build();
        let source = "{{ INCL a.html }}{{x}}";
        let (directive, end) = parse_directive(&syntax, source, 0).unwrap();
        assert_eq!(directive, Directive::Include("a.html"));
        assert_eq!(end, 17);
        let (directive, _) = parse_directive(&syntax, source, end).unwrap();
        assert_eq!(directive, Directive::Var("x"));
    }

    #[test]
    fn parse_err_unknown_keyword() {
        let err = parse("[Title]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.reason(), Some("unknown keyword `Title`"));

        let err = parse("[path]").map(|(d, _)| d);
        assert_eq!(err.unwrap(), Directive::Var("path"));

        let err = parse("[INCLUDE x]").unwrap_err();
        assert_eq!(err.reason(), Some("unknown keyword `INCLUDE`"));
    }

    #[test]
    fn parse_err_empty() {
        let err = parse("[ ]").unwrap_err();
        assert_eq!(
            err.reason(),
            Some("expected keyword or identifier, found end of directive")
        );
    }

    #[test]
    fn parse_err_missing_argument() {
        let err = parse("[INCL]").unwrap_err();
        assert_eq!(
            err.reason(),
            Some("expected argument for `INCL`, found end of directive")
        );
    }

    #[test]
    fn parse_err_unexpected_argument() {
        let err = parse("[PATH extra]").unwrap_err();
        assert_eq!(err.reason(), Some("unexpected argument for `PATH`"));
    }

    #[test]
    fn parse_err_extra_tokens() {
        let err = parse("[INCL a b]").unwrap_err();
        assert_eq!(err.reason(), Some("unexpected token"));

        let err = parse("[title more]").unwrap_err();
        assert_eq!(err.reason(), Some("unexpected token"));
    }

    #[test]
    fn parse_err_unclosed() {
        for source in ["[title", "[title\n]", "[title [PATH]"] {
            let err = parse(source).unwrap_err();
            assert_eq!(err.reason(), Some("unclosed directive"));
            assert_eq!(err.line(), Some(1));
        }
    }

    #[track_caller]
    fn parse(source: &str) -> Result<(Directive<'_>, usize)> {
        parse_directive(&Syntax::default(), source, 0)
    }
}
