use aho_corasick::{AhoCorasick, Input, MatchKind};

use crate::types::syntax::{Kind, Syntax};

/// Finds the next escape character or delimiter in a template source.
#[derive(Debug, Clone)]
pub struct Searcher {
    imp: AhoCorasick,
}

impl Searcher {
    pub fn new(syntax: &Syntax) -> Self {
        let patterns = syntax.patterns().map(|(_, p)| p);
        // Leftmost-first gives the escape priority over the closing delimiter
        // and the closing delimiter priority over the opening one.
        let imp = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(patterns)
            .expect("three short patterns always build");
        Self { imp }
    }

    pub fn find_at(&self, haystack: &str, at: usize) -> Option<(Kind, usize, usize)> {
        let input = Input::new(haystack).range(at..);
        self.imp.find(input).map(|m| {
            let kind = Kind::from_usize(m.pattern().as_usize());
            (kind, m.start(), m.end())
        })
    }
}
