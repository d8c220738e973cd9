/// The directive syntax configuration.
///
/// Use [`Syntax::default()`] to get the default syntax configuration and
/// [`Syntax::builder()`] to create a custom syntax configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub(crate) open: String,
    pub(crate) close: String,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder<'a> {
    directive: Option<(&'a str, &'a str)>,
}

/// The escape character, only meaningful in front of an opening delimiter.
pub(crate) const ESCAPE: &str = "\\";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Escape = 0,
    Close = 1,
    Open = 2,
}

#[test]
fn kind_usize() {
    for p in 0..3 {
        let k = Kind::from_usize(p);
        assert_eq!(k as usize, p);
    }
}

impl Default for Syntax {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use threesg::Syntax;
    ///
    /// let syntax = Syntax::builder().directive("[", "]").build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder().directive("[", "]").build()
    }
}

impl Syntax {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = threesg::Syntax::builder()
    ///     .directive("{{", "}}")
    ///     .build();
    /// ```
    #[inline]
    pub fn builder<'a>() -> SyntaxBuilder<'a> {
        SyntaxBuilder::new()
    }

    /// Returns the opening delimiter.
    #[inline]
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Returns the closing delimiter.
    #[inline]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Returns the search patterns, ordered by priority when more than one
    /// matches at the same position.
    pub(crate) fn patterns(&self) -> [(Kind, &str); 3] {
        [
            (Kind::Escape, ESCAPE),
            (Kind::Close, &self.close),
            (Kind::Open, &self.open),
        ]
    }
}

impl<'a> SyntaxBuilder<'a> {
    /// Creates a new syntax builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { directive: None }
    }

    /// Set the directive delimiters.
    ///
    /// If not set then the default `[` and `]` are used.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty, if they are equal, or if either
    /// starts with the escape character `\`.
    #[inline]
    pub fn directive(&mut self, open: &'a str, close: &'a str) -> &mut Self {
        assert!(!open.is_empty() && !close.is_empty());
        assert!(open != close, "delimiters must differ");
        assert!(
            !open.starts_with(ESCAPE) && !close.starts_with(ESCAPE),
            "delimiters must not start with `\\`"
        );
        self.directive = Some((open, close));
        self
    }

    /// Builds the syntax configuration.
    pub fn build(&self) -> Syntax {
        let (open, close) = self.directive.unwrap_or(("[", "]"));
        Syntax {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Kind {
    pub fn from_usize(id: usize) -> Self {
        match id {
            0 => Self::Escape,
            1 => Self::Close,
            2 => Self::Open,
            _ => unreachable!(),
        }
    }
}

impl From<Kind> for usize {
    fn from(k: Kind) -> Self {
        k as usize
    }
}
