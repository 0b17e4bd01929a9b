//! # Template AST Definitions
//!
//! Node types produced by the template parser. The tree is immutable once
//! built; the detector only reads it.
//!
//! Node kinds are a tagged sum type so that consumers match exhaustively
//! instead of probing for incidental shape (e.g. "has a children array").

use serde::{Deserialize, Serialize};

/// A source position. Lines are 1-based, columns 0-based, following the
/// ESTree convention used by the Svelte compiler's own locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A half-open source range: `end` points one past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A single template tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// The implicit root container of a template (or of a block branch).
    Fragment(Fragment),

    /// An HTML element or Svelte component, e.g. `<div>...</div>`.
    Element(Element),

    /// A logic block container, e.g. `{#if ...}...{/if}`.
    Block(Block),

    /// A run of literal text.
    Text(Text),

    /// An HTML comment, possibly carrying `svelte-ignore` directives.
    Comment(Comment),

    /// An escaped mustache tag, e.g. `{value}` (also `{@debug}`/`{@const}`).
    Mustache(MustacheTag),

    /// A raw HTML insertion, e.g. `{@html value}`. Bypasses escaping.
    RawMustache(RawMustacheTag),
}

impl Node {
    /// Returns the ordered child sequence if this node is a container.
    ///
    /// Order is significant: it encodes source order, which the detector's
    /// suppression-comment adjacency rules depend on.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Fragment(f) => Some(&f.children),
            Node::Element(e) => Some(&e.children),
            Node::Block(b) => Some(&b.children),
            Node::Text(_) | Node::Comment(_) | Node::Mustache(_) | Node::RawMustache(_) => None,
        }
    }

    /// Source span covering the whole node.
    pub fn span(&self) -> Span {
        match self {
            Node::Fragment(f) => f.span,
            Node::Element(e) => e.span,
            Node::Block(b) => b.span,
            Node::Text(t) => t.span,
            Node::Comment(c) => c.span,
            Node::Mustache(m) => m.span,
            Node::RawMustache(r) => r.span,
        }
    }
}

/// Root container produced for a whole template.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub children: Vec<Node>,
    pub span: Span,
}

/// An element with its tag name and nested children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
    pub span: Span,
}

/// A logic block (`if`, `each`, `await`, `key`, `snippet`). Branch markers
/// such as `{:else}` are consumed by the parser; all branch content lands in
/// one ordered `children` sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub children: Vec<Node>,
    pub span: Span,
}

/// A literal text run.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub data: String,
    pub span: Span,
}

impl Text {
    /// True if the text contains nothing but whitespace. Whitespace-only
    /// text may be skipped (once) by the suppression adjacency rules.
    pub fn is_whitespace(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// An HTML comment and the set of rule names it suppresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub data: String,
    pub ignores: Vec<String>,
    pub span: Span,
}

impl Comment {
    /// Builds a comment node, deriving `ignores` from a
    /// `svelte-ignore <rule...>` directive. Anything that does not follow
    /// the directive syntax yields an empty set, so it suppresses nothing.
    pub fn from_data(data: String, span: Span) -> Self {
        let ignores = parse_ignores(&data);
        Self {
            data,
            ignores,
            span,
        }
    }

    /// True if this comment suppresses the given rule name.
    pub fn suppresses(&self, rule: &str) -> bool {
        self.ignores.iter().any(|r| r == rule)
    }
}

/// An escaped mustache tag.
#[derive(Debug, Clone, PartialEq)]
pub struct MustacheTag {
    pub expression: Expression,
    pub span: Span,
}

/// A raw `{@html ...}` insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMustacheTag {
    pub expression: Expression,
    pub span: Span,
}

/// Shallow syntactic classification of a tag expression.
///
/// The sanitizer check is purely syntactic: it only needs to know whether
/// the expression is a direct call with a plain callee name. Everything
/// else collapses into the conservative buckets below.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A bare identifier reference, e.g. `userInput`.
    Identifier { name: String, span: Span },

    /// A function call. `callee` is the plain name when the callee is a
    /// simple identifier, `None` when it is computed or a member access.
    Call { callee: Option<String>, span: Span },

    /// A member/property access chain, e.g. `props.markup`.
    Member { span: Span },

    /// Any other expression shape.
    Other { span: Span },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier { span, .. }
            | Expression::Call { span, .. }
            | Expression::Member { span }
            | Expression::Other { span } => *span,
        }
    }
}

/// Parses a `svelte-ignore` directive out of a comment body.
///
/// Accepts whitespace- or comma-separated rule names after the keyword.
fn parse_ignores(data: &str) -> Vec<String> {
    let trimmed = data.trim();
    let Some(rest) = trimmed.strip_prefix("svelte-ignore") else {
        return Vec::new();
    };
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Vec::new();
    }
    rest.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        let pos = Position { line: 1, column: 0 };
        Span {
            start: pos,
            end: pos,
        }
    }

    #[test]
    fn test_ignore_directive_parsing() {
        let c = Comment::from_data(" svelte-ignore unsafe_html ".to_string(), span());
        assert_eq!(c.ignores, vec!["unsafe_html"]);
        assert!(c.suppresses("unsafe_html"));
        assert!(!c.suppresses("a11y-missing-attribute"));
    }

    #[test]
    fn test_ignore_directive_multiple_rules() {
        let c = Comment::from_data("svelte-ignore unsafe_html, a11y-autofocus".to_string(), span());
        assert_eq!(c.ignores, vec!["unsafe_html", "a11y-autofocus"]);
    }

    #[test]
    fn test_plain_comment_suppresses_nothing() {
        let c = Comment::from_data(" reviewed by security ".to_string(), span());
        assert!(c.ignores.is_empty());
    }

    #[test]
    fn test_malformed_directive_suppresses_nothing() {
        // Keyword must be its own word.
        let c = Comment::from_data("svelte-ignored unsafe_html".to_string(), span());
        assert!(c.ignores.is_empty());
    }

    #[test]
    fn test_whitespace_text() {
        let t = Text {
            data: " \n\t ".to_string(),
            span: span(),
        };
        assert!(t.is_whitespace());
        let t = Text {
            data: " x ".to_string(),
            span: span(),
        };
        assert!(!t.is_whitespace());
    }
}
