//! The directives that can appear between delimiters in a template.

/// One of the reserved directive keywords.
///
/// Only `PATH`, `CONTENT` and `INCL` are evaluated. The control-flow keywords
/// are parsed but rejected when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `PATH`, the site path of the page.
    Path,
    /// `CONTENT`, the source wrapped by a template.
    Content,
    /// `INCL`, takes the path of a source to include.
    Incl,
    /// `IF`, takes a condition.
    If,
    /// `ENDIF`
    EndIf,
    /// `IFNOT`, takes a condition.
    IfNot,
    /// `ENDIFNOT`
    EndIfNot,
    /// `FOR`, takes the list to iterate.
    For,
    /// `ENDFOR`
    EndFor,
    /// `REVFOR`, takes the list to iterate in reverse.
    RevFor,
    /// `ENDREVFOR`
    EndRevFor,
    /// `FORALL`, takes the list to iterate.
    ForAll,
    /// `ENDFORALL`
    EndForAll,
    /// `REVFORALL`, takes the list to iterate in reverse.
    RevForAll,
    /// `ENDREVFORALL`
    EndRevForAll,
}

/// A single parsed directive.
///
/// Directives that take an argument carry it, borrowed from the template
/// source. A variable reference carries the variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'source> {
    /// A lowercase identifier, e.g. `[title]`.
    Var(&'source str),
    /// `[PATH]`
    Path,
    /// `[CONTENT]`
    Content,
    /// `[INCL path/to/file]`
    Include(&'source str),
    If(&'source str),
    EndIf,
    IfNot(&'source str),
    EndIfNot,
    For(&'source str),
    EndFor,
    RevFor(&'source str),
    EndRevFor,
    ForAll(&'source str),
    EndForAll,
    RevForAll(&'source str),
    EndRevForAll,
}

impl Keyword {
    /// The spelling of every keyword, in declaration order.
    pub const fn all() -> &'static [&'static str] {
        &[
            "PATH",
            "CONTENT",
            "INCL",
            "IF",
            "ENDIF",
            "IFNOT",
            "ENDIFNOT",
            "FOR",
            "ENDFOR",
            "REVFOR",
            "ENDREVFOR",
            "FORALL",
            "ENDFORALL",
            "REVFORALL",
            "ENDREVFORALL",
        ]
    }

    /// The keyword as written in a directive.
    pub const fn human(&self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Content => "CONTENT",
            Self::Incl => "INCL",
            Self::If => "IF",
            Self::EndIf => "ENDIF",
            Self::IfNot => "IFNOT",
            Self::EndIfNot => "ENDIFNOT",
            Self::For => "FOR",
            Self::EndFor => "ENDFOR",
            Self::RevFor => "REVFOR",
            Self::EndRevFor => "ENDREVFOR",
            Self::ForAll => "FORALL",
            Self::EndForAll => "ENDFORALL",
            Self::RevForAll => "REVFORALL",
            Self::EndRevForAll => "ENDREVFORALL",
        }
    }

    /// Whether the keyword must be followed by exactly one argument.
    pub const fn takes_arg(&self) -> bool {
        matches!(
            self,
            Self::Incl
                | Self::If
                | Self::IfNot
                | Self::For
                | Self::RevFor
                | Self::ForAll
                | Self::RevForAll
        )
    }

    /// Resolve a token to a keyword, `None` if it is not reserved.
    pub fn from_str(s: &str) -> Option<Self> {
        let kw = match s {
            "PATH" => Self::Path,
            "CONTENT" => Self::Content,
            "INCL" => Self::Incl,
            "IF" => Self::If,
            "ENDIF" => Self::EndIf,
            "IFNOT" => Self::IfNot,
            "ENDIFNOT" => Self::EndIfNot,
            "FOR" => Self::For,
            "ENDFOR" => Self::EndFor,
            "REVFOR" => Self::RevFor,
            "ENDREVFOR" => Self::EndRevFor,
            "FORALL" => Self::ForAll,
            "ENDFORALL" => Self::EndForAll,
            "REVFORALL" => Self::RevForAll,
            "ENDREVFORALL" => Self::EndRevForAll,
            _ => return None,
        };
        Some(kw)
    }
}

impl<'source> Directive<'source> {
    /// Returns the keyword of this directive, or `None` for a variable.
    pub fn keyword(&self) -> Option<Keyword> {
        let kw = match self {
            Self::Var(_) => return None,
            Self::Path => Keyword::Path,
            Self::Content => Keyword::Content,
            Self::Include(_) => Keyword::Incl,
            Self::If(_) => Keyword::If,
            Self::EndIf => Keyword::EndIf,
            Self::IfNot(_) => Keyword::IfNot,
            Self::EndIfNot => Keyword::EndIfNot,
            Self::For(_) => Keyword::For,
            Self::EndFor => Keyword::EndFor,
            Self::RevFor(_) => Keyword::RevFor,
            Self::EndRevFor => Keyword::EndRevFor,
            Self::ForAll(_) => Keyword::ForAll,
            Self::EndForAll => Keyword::EndForAll,
            Self::RevForAll(_) => Keyword::RevForAll,
            Self::EndRevForAll => Keyword::EndRevForAll,
        };
        Some(kw)
    }

    /// Returns the argument of this directive, if it has one.
    pub fn arg(&self) -> Option<&'source str> {
        match *self {
            Self::Var(arg)
            | Self::Include(arg)
            | Self::If(arg)
            | Self::IfNot(arg)
            | Self::For(arg)
            | Self::RevFor(arg)
            | Self::ForAll(arg)
            | Self::RevForAll(arg) => Some(arg),
            _ => None,
        }
    }

    /// Builds a directive from a keyword and its argument.
    ///
    /// Returns `None` if the argument's presence does not match
    /// [`Keyword::takes_arg`].
    pub(crate) fn with_keyword(kw: Keyword, arg: Option<&'source str>) -> Option<Self> {
        let directive = match (kw, arg) {
            (Keyword::Path, None) => Self::Path,
            (Keyword::Content, None) => Self::Content,
            (Keyword::Incl, Some(a)) => Self::Include(a),
            (Keyword::If, Some(a)) => Self::If(a),
            (Keyword::EndIf, None) => Self::EndIf,
            (Keyword::IfNot, Some(a)) => Self::IfNot(a),
            (Keyword::EndIfNot, None) => Self::EndIfNot,
            (Keyword::For, Some(a)) => Self::For(a),
            (Keyword::EndFor, None) => Self::EndFor,
            (Keyword::RevFor, Some(a)) => Self::RevFor(a),
            (Keyword::EndRevFor, None) => Self::EndRevFor,
            (Keyword::ForAll, Some(a)) => Self::ForAll(a),
            (Keyword::EndForAll, None) => Self::EndForAll,
            (Keyword::RevForAll, Some(a)) => Self::RevForAll(a),
            (Keyword::EndRevForAll, None) => Self::EndRevForAll,
            _ => return None,
        };
        Some(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trips_through_human() {
        for s in Keyword::all() {
            let kw = Keyword::from_str(s).unwrap();
            assert_eq!(kw.human(), *s);
        }
    }

    #[test]
    fn with_keyword_enforces_arguments() {
        for s in Keyword::all() {
            let kw = Keyword::from_str(s).unwrap();
            let (good, bad) = match kw.takes_arg() {
                true => (Some("x"), None),
                false => (None, Some("x")),
            };
            let directive = Directive::with_keyword(kw, good).unwrap();
            assert_eq!(directive.keyword(), Some(kw));
            assert_eq!(directive.arg(), good);
            assert!(Directive::with_keyword(kw, bad).is_none());
        }
    }
}
