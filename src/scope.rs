//! Layered variable scopes over a single shared list of bindings.
//!
//! All bindings live in one arena. Each binding links to the binding that was
//! the head of its scope when it was added, so every scope sees a singly linked
//! list running from its own head through all of its ancestors. Entering a
//! scope and shadowing a variable are both O(1) and nothing is copied.
//!
//! A scope owns exactly the bindings between its head and its boundary, the
//! parent's head at the moment the scope was entered. Leaving a scope releases
//! that region and nothing else, the boundary and everything behind it belong
//! to an ancestor.

use std::fmt;

/// A single variable binding.
///
/// A binding without a value explicitly clears any binding of the same key in
/// an enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    key: String,
    value: Option<String>,
}

/// A handle to a scope in a [`ScopeChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId {
    index: usize,
    serial: usize,
}

impl ScopeId {
    /// The position of this scope in the frame stack, scopes entered later
    /// have larger positions.
    pub(crate) fn index(self) -> usize {
        self.index
    }
}

/// A stack of scopes over one shared binding list.
#[derive(Clone)]
pub struct ScopeChain {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    frames: Vec<Frame>,
    serial: usize,
}

#[derive(Debug, Clone)]
struct Node {
    binding: Binding,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
struct Frame {
    /// The newest binding visible from this scope.
    head: Option<usize>,
    /// The parent's head when this scope was entered, owned by the parent.
    boundary: Option<usize>,
    parent: Option<ScopeId>,
    serial: usize,
}

impl Binding {
    /// Construct a new binding.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Construct a binding that hides any outer binding of the same key.
    pub fn cleared(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Returns the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value, or `None` if this binding clears the key.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    /// Construct a new chain containing only the empty root scope.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            frames: vec![Frame {
                head: None,
                boundary: None,
                parent: None,
                serial: 0,
            }],
            serial: 0,
        }
    }

    /// Returns the root scope, which lives as long as the chain.
    pub fn root(&self) -> ScopeId {
        ScopeId {
            index: 0,
            serial: 0,
        }
    }

    /// Returns the innermost live scope.
    pub fn innermost(&self) -> ScopeId {
        let index = self.frames.len() - 1;
        ScopeId {
            index,
            serial: self.frames[index].serial,
        }
    }

    /// Returns the number of live bindings across all scopes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns `true` if no scope holds any binding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enter a new scope nested in `parent`.
    ///
    /// The new scope sees every binding visible from `parent` at this moment.
    /// Bindings added to it later are released by [`leave`][Self::leave].
    pub fn enter(&mut self, parent: ScopeId) -> ScopeId {
        let head = self.frame(parent).head;
        self.serial += 1;
        self.frames.push(Frame {
            head,
            boundary: head,
            parent: Some(parent),
            serial: self.serial,
        });
        log::trace!("entered scope {}", self.frames.len() - 1);
        self.innermost()
    }

    /// Add bindings to `scope`, each shadowing any earlier binding with the
    /// same key.
    ///
    /// Scopes nested in `scope` that are already live do not see the new
    /// bindings.
    pub fn merge<I>(&mut self, scope: ScopeId, bindings: I)
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut head = self.frame(scope).head;
        for binding in bindings {
            head = Some(self.alloc(Node {
                binding,
                next: head,
            }));
        }
        self.frames[scope.index].head = head;
    }

    /// Add a single binding to `scope`.
    pub fn bind(&mut self, scope: ScopeId, binding: Binding) {
        self.merge(scope, [binding]);
    }

    /// Lookup the value of `key` as seen from `scope`.
    ///
    /// Returns `None` if there is no binding or if the nearest binding clears
    /// the key.
    pub fn lookup(&self, scope: ScopeId, key: &str) -> Option<&str> {
        self.iter(self.frame(scope).head)
            .find(|b| b.key == key)
            .and_then(Binding::value)
    }

    /// Returns the enclosing scope together with its newest binding at the
    /// moment `scope` was entered.
    ///
    /// Returns `None` for the root scope or when the enclosing scope was
    /// empty.
    pub fn enclosing(&self, scope: ScopeId) -> Option<(ScopeId, &Binding)> {
        let frame = self.frame(scope);
        let parent = frame.parent?;
        let i = frame.boundary?;
        Some((parent, &self.node(i).binding))
    }

    /// Leave `scope`, releasing every binding it owns.
    ///
    /// # Panics
    ///
    /// If `scope` is the root scope or is not the innermost scope.
    pub fn leave(&mut self, scope: ScopeId) {
        assert!(scope.index != 0, "cannot leave the root scope");
        self.frame(scope);
        assert!(
            scope.index == self.frames.len() - 1,
            "scope is not the innermost scope"
        );
        let frame = self.frames.pop().unwrap();

        let mut next = frame.head;
        let mut released = 0;
        while next != frame.boundary {
            // Every binding of this scope was prepended on top of the boundary,
            // so walking from the head always reaches it.
            let i = next.expect("scope boundary is unreachable");
            let node = self.nodes[i].take().expect("binding released twice");
            self.free.push(i);
            next = node.next;
            released += 1;
        }
        log::trace!("left scope {}, released {released} bindings", scope.index);
    }

    /// Leave every scope nested in `scope`, innermost first.
    ///
    /// `scope` itself stays live.
    pub fn unwind(&mut self, scope: ScopeId) {
        self.frame(scope);
        while self.frames.len() - 1 > scope.index {
            self.leave(self.innermost());
        }
    }

    fn frame(&self, scope: ScopeId) -> &Frame {
        match self.frames.get(scope.index) {
            Some(frame) if frame.serial == scope.serial => frame,
            _ => panic!("scope is no longer live"),
        }
    }

    fn node(&self, i: usize) -> &Node {
        self.nodes[i].as_ref().expect("binding is live")
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                i
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn iter(&self, head: Option<usize>) -> impl Iterator<Item = &Binding> + '_ {
        let mut next = head;
        std::iter::from_fn(move || {
            let node = self.node(next?);
            next = node.next;
            Some(&node.binding)
        })
    }
}

impl fmt::Debug for ScopeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeChain")
            .field("scopes", &self.frames.len())
            .field("bindings", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_shadowed() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.bind(root, Binding::new("a", "1"));

        let inner = chain.enter(root);
        chain.bind(inner, Binding::new("a", "2"));
        assert_eq!(chain.lookup(inner, "a"), Some("2"));
        assert_eq!(chain.lookup(root, "a"), Some("1"));

        chain.leave(inner);
        assert_eq!(chain.lookup(root, "a"), Some("1"));
    }

    #[test]
    fn lookup_merge_order() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.merge(
            root,
            [
                Binding::new("a", "first"),
                Binding::new("b", "b"),
                Binding::new("a", "second"),
            ],
        );
        assert_eq!(chain.lookup(root, "a"), Some("second"));
        assert_eq!(chain.lookup(root, "b"), Some("b"));
        assert_eq!(chain.lookup(root, "c"), None);
    }

    #[test]
    fn lookup_cleared() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.bind(root, Binding::new("TEMPLATE", "base.html"));
        let inner = chain.enter(root);
        chain.bind(inner, Binding::cleared("TEMPLATE"));
        assert_eq!(chain.lookup(inner, "TEMPLATE"), None);
        chain.leave(inner);
        assert_eq!(chain.lookup(root, "TEMPLATE"), Some("base.html"));
    }

    #[test]
    fn leave_releases_only_own_bindings() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.bind(root, Binding::new("a", "1"));
        let s1 = chain.enter(root);
        chain.merge(s1, [Binding::new("b", "2"), Binding::new("c", "3")]);
        let s2 = chain.enter(s1);
        chain.bind(s2, Binding::new("d", "4"));
        assert_eq!(chain.len(), 4);

        chain.leave(s2);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.lookup(s1, "c"), Some("3"));

        chain.leave(s1);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.lookup(root, "a"), Some("1"));
    }

    #[test]
    fn sibling_scope_does_not_see_previous_sibling() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        let s1 = chain.enter(root);
        chain.bind(s1, Binding::new("x", "1"));
        chain.leave(s1);
        let s2 = chain.enter(root);
        assert_eq!(chain.lookup(s2, "x"), None);
    }

    #[test]
    fn child_of_outer_scope_skips_newer_siblings() {
        // A scope entered from an outer scope while a deeper scope is still
        // live only sees the outer scope's bindings.
        let mut chain = ScopeChain::new();
        let root = chain.root();
        let page = chain.enter(root);
        chain.bind(page, Binding::new("CONTENT", "page.html"));
        let template = chain.enter(page);
        chain.bind(template, Binding::new("title", "from template"));

        let include = chain.enter(page);
        assert_eq!(chain.lookup(include, "title"), None);
        assert_eq!(chain.lookup(include, "CONTENT"), Some("page.html"));
        chain.leave(include);

        assert_eq!(chain.lookup(template, "title"), Some("from template"));
        chain.leave(template);
        chain.leave(page);
        assert!(chain.is_empty());
    }

    #[test]
    fn enclosing_binding() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        assert!(chain.enclosing(root).is_none());

        let page = chain.enter(root);
        assert!(chain.enclosing(page).is_none());
        chain.bind(page, Binding::new("CONTENT", "page.html"));

        let template = chain.enter(page);
        chain.bind(template, Binding::new("other", "x"));
        let (parent, binding) = chain.enclosing(template).unwrap();
        assert_eq!(parent, page);
        assert_eq!(binding.key(), "CONTENT");
        assert_eq!(binding.value(), Some("page.html"));
    }

    #[test]
    #[should_panic(expected = "scope is not the innermost scope")]
    fn leave_out_of_order() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        let s1 = chain.enter(root);
        let _s2 = chain.enter(s1);
        chain.leave(s1);
    }

    #[test]
    fn merge_into_outer_scope_while_inner_is_live() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        let outer = chain.enter(root);
        chain.bind(outer, Binding::new("a", "1"));
        let inner = chain.enter(outer);
        chain.bind(inner, Binding::new("b", "2"));

        chain.bind(outer, Binding::new("c", "3"));
        assert_eq!(chain.lookup(outer, "c"), Some("3"));
        assert_eq!(chain.lookup(inner, "c"), None);
        assert_eq!(chain.lookup(inner, "a"), Some("1"));

        chain.leave(inner);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.lookup(outer, "a"), Some("1"));
        assert_eq!(chain.lookup(outer, "c"), Some("3"));
        chain.leave(outer);
        assert!(chain.is_empty());
    }

    #[test]
    fn released_slots_are_reused() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        for _ in 0..3 {
            let s = chain.enter(root);
            chain.merge(s, [Binding::new("a", "1"), Binding::new("b", "2")]);
            chain.leave(s);
        }
        assert_eq!(chain.nodes.len(), 2);
        assert!(chain.is_empty());
    }

    #[test]
    fn unwind_leaves_nested_scopes() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.bind(root, Binding::new("a", "1"));
        let s1 = chain.enter(root);
        chain.bind(s1, Binding::new("b", "2"));
        let s2 = chain.enter(s1);
        chain.bind(s2, Binding::new("c", "3"));
        let _s3 = chain.enter(s2);

        chain.unwind(s1);
        assert_eq!(chain.innermost(), s1);
        assert_eq!(chain.len(), 2);
        chain.unwind(root);
        assert_eq!(chain.innermost(), root);
        assert_eq!(chain.lookup(root, "a"), Some("1"));
    }

    #[test]
    #[should_panic(expected = "scope is no longer live")]
    fn stale_scope() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        let s1 = chain.enter(root);
        chain.leave(s1);
        let _s2 = chain.enter(root);
        chain.lookup(s1, "a");
    }

    #[test]
    #[should_panic(expected = "cannot leave the root scope")]
    fn leave_root() {
        let mut chain = ScopeChain::new();
        let root = chain.root();
        chain.leave(root);
    }
}
