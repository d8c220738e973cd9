//! Defines a [`Span`] which is used to represent a region in a template or
//! configuration source.

use std::ops::{Index, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub m: usize,
    pub n: usize,
}

impl Span {
    /// Returns the 1-based line on which this span starts.
    pub fn line(&self, source: &str) -> usize {
        source[..self.m].matches('\n').count() + 1
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        let Span { m, n } = span;
        &self[m..n]
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Self {
            m: r.start,
            n: r.end,
        }
    }
}
