//! Segment trie used by the router.
//!
//! Each edge is one `/`-separated path segment. A segment is either literal
//! text, a `:name` parameter binding exactly one component, or a `*name`
//! wildcard that swallows every remaining component.
//!
//! # Ambiguity
//!
//! Children are kept in insertion order and both insertion and search accept
//! a child when its text matches *or* when it is wild. Two consequences:
//!
//! - Once a wild child exists at some depth, every later registration at that
//!   depth is merged into it, literal or not. A node therefore has at most
//!   one wild child, and a literal registered after a wild sibling is never
//!   reachable as its own branch.
//! - Search is depth-first over matching children in registration order and
//!   the first branch that reaches a registered route wins. A literal child
//!   registered before a wild sibling is tried first; there is no
//!   specificity ranking.

use std::fmt;

use tracing::warn;

/// One path segment of a registered pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

impl Segment {
    pub(crate) fn parse(part: &str) -> Self {
        if let Some(name) = part.strip_prefix(':') {
            Self::Param(name.to_owned())
        } else if let Some(name) = part.strip_prefix('*') {
            Self::Wildcard(name.to_owned())
        } else {
            Self::Literal(part.to_owned())
        }
    }

    pub(crate) fn is_wild(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    /// True when this edge can be taken for `part`, at insertion or search.
    fn accepts(&self, part: &str) -> bool {
        match self {
            Self::Literal(text) => text == part,
            Self::Param(_) | Self::Wildcard(_) => true,
        }
    }

    /// Exact textual equality with the raw segment `part`.
    fn is(&self, part: &str) -> bool {
        match self {
            Self::Literal(text) => text == part,
            Self::Param(name) => part.strip_prefix(':') == Some(name.as_str()),
            Self::Wildcard(name) => part.strip_prefix('*') == Some(name.as_str()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Param(name) => write!(f, ":{name}"),
            Self::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// A trie vertex. Owns its children; carries the registration pattern only
/// when a route terminates here.
#[derive(Debug)]
pub(crate) struct Node {
    pattern: Option<String>,
    segment: Segment,
    children: Vec<Node>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self::with_segment(Segment::Literal(String::new()))
    }

    fn with_segment(segment: Segment) -> Self {
        Self { pattern: None, segment, children: Vec::new() }
    }

    /// The full pattern of the route terminating at this node, if any.
    pub(crate) fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Registers `pattern`, whose segments are `parts`, below this node.
    ///
    /// Re-registering a pattern that ends on an existing terminal node
    /// replaces the stored pattern silently.
    pub(crate) fn insert(&mut self, pattern: &str, parts: &[String], depth: usize) {
        if depth == parts.len() {
            self.pattern = Some(pattern.to_owned());
            return;
        }

        let part = parts[depth].as_str();
        let index = match self.children.iter().position(|child| child.segment.accepts(part)) {
            Some(index) => {
                let existing = &self.children[index].segment;
                if existing.is_wild() && !existing.is(part) {
                    warn!(
                        pattern,
                        existing = %existing,
                        absorbed = part,
                        "segment merged into existing wild sibling"
                    );
                }
                index
            }
            None => {
                self.children.push(Self::with_segment(Segment::parse(part)));
                self.children.len() - 1
            }
        };

        self.children[index].insert(pattern, parts, depth + 1);
    }

    /// Finds the node of the first registered route matching `parts`.
    pub(crate) fn search(&self, parts: &[&str], depth: usize) -> Option<&Node> {
        if depth == parts.len() || matches!(self.segment, Segment::Wildcard(_)) {
            return self.pattern.is_some().then_some(self);
        }

        let part = parts[depth];
        self.children
            .iter()
            .filter(|child| child.segment.accepts(part))
            .find_map(|child| child.search(parts, depth + 1))
    }
}
