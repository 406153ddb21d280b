use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

/// The provenance of a parsed node: byte range plus the line/column of its
/// first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

/// A reference-counted smart pointer for AST nodes.
///
/// In addition to `T`, carries an optional [`SourceSpan`] stamped by the
/// grammar. The span is provenance only: equality and hashing compare the
/// inner node and ignore the span, so structurally identical nodes from
/// different positions compare equal.
pub struct Node<T>(triomphe::Arc<NodeInner<T>>);

struct NodeInner<T> {
    span: Option<SourceSpan>,
    node: T,
}

impl<T> Node<T> {
    /// Create a new `Node` for something created programmatically, not
    /// parsed from a source file.
    pub fn new(node: T) -> Self {
        Self(triomphe::Arc::new(NodeInner { span: None, node }))
    }

    /// Create a new `Node` for something parsed from the given span.
    pub fn new_parsed(node: T, span: SourceSpan) -> Self {
        Self(triomphe::Arc::new(NodeInner {
            span: Some(span),
            node,
        }))
    }

    pub fn span(&self) -> Option<SourceSpan> {
        self.0.span
    }

    /// Returns whether two `Node`s point to the same memory allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        triomphe::Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> std::ops::Deref for Node<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0.node
    }
}

impl<T> AsRef<T> for Node<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> From<T> for Node<T> {
    fn from(node: T) -> Self {
        Self::new(node)
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.node.fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        T::fmt(self, f)
    }
}

impl<T: Eq> Eq for Node<T> {}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) // fast path
            || self.0.node == other.0.node // span not included
    }
}

impl<T: Hash> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.node.hash(state) // span not included
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_span() {
        let span = SourceSpan {
            start: 3,
            end: 7,
            line: 1,
            column: 4,
        };
        let parsed = Node::new_parsed("hero", span);
        let synthetic = Node::new("hero");
        assert_eq!(parsed, synthetic);
        assert_eq!(parsed.span(), Some(span));
        assert_eq!(synthetic.span(), None);
    }

    #[test]
    fn clone_shares_the_allocation() {
        let a = Node::new(42);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
    }
}
