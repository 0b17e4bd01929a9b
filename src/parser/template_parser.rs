//! # Template Parser
//!
//! A recursive-descent parser for the Svelte template subset the scanner
//! needs: elements, comments, mustache tags, raw `{@html}` tags, and logic
//! blocks. It tracks 1-based lines and 0-based columns so that warning
//! locations line up with the compiler's own conventions.
//!
//! The parser is strict: mismatched closing tags, unterminated constructs,
//! and unknown block or `@` tags are reported as [`ParseError`]s rather
//! than recovered from.

use regex::Regex;

use super::ast::*;
use super::ParseError;

/// Elements whose tags never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than nested template nodes.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses template source into a tree rooted at a [`Node::Fragment`].
///
/// `modern` selects the runes dialect: it gates `{@render}` tags and
/// `{#snippet}` blocks and has no other effect.
pub fn parse_template(source: &str, modern: bool) -> Result<Node, ParseError> {
    TemplateParser::new(source, modern).parse()
}

/// What a nested `parse_children` call is allowed to be terminated by.
enum Closer {
    Tag(String),
    Block(String),
}

struct TemplateParser {
    chars: Vec<char>,
    offset: usize,
    line: usize,
    column: usize,
    modern: bool,
}

impl TemplateParser {
    fn new(source: &str, modern: bool) -> Self {
        Self {
            chars: source.chars().collect(),
            offset: 0,
            line: 1,
            column: 0,
            modern,
        }
    }

    fn parse(mut self) -> Result<Node, ParseError> {
        let start = self.pos();
        let children = self.parse_children(None)?;
        Ok(Node::Fragment(Fragment {
            children,
            span: Span {
                start,
                end: self.pos(),
            },
        }))
    }

    // ---- cursor primitives ----

    fn pos(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn eof(&self) -> bool {
        self.offset >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, expected: &str) -> bool {
        expected
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.offset + i) == Some(&c))
    }

    /// Consumes `expected` if the cursor sits on it.
    fn eat(&mut self, expected: &str) -> bool {
        if !self.starts_with(expected) {
            return false;
        }
        for _ in expected.chars() {
            self.advance();
        }
        true
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.pos())
    }

    fn error_at(&self, pos: Position, message: impl Into<String>) -> ParseError {
        ParseError::new(message, pos)
    }

    // ---- node parsing ----

    /// Parses sibling nodes until the given closer (or end of input when
    /// parsing the root fragment).
    fn parse_children(&mut self, until: Option<&Closer>) -> Result<Vec<Node>, ParseError> {
        let mut children = Vec::new();
        loop {
            if self.eof() {
                return match until {
                    None => Ok(children),
                    Some(Closer::Tag(name)) => {
                        Err(self.error(format!("unexpected end of input, expected </{name}>")))
                    }
                    Some(Closer::Block(name)) => {
                        Err(self.error(format!("unexpected end of input, expected {{/{name}}}")))
                    }
                };
            }
            if self.starts_with("</") {
                self.consume_closing_tag(until)?;
                return Ok(children);
            }
            if self.starts_with("{/") {
                self.consume_block_close(until)?;
                return Ok(children);
            }
            if self.starts_with("{:") {
                match until {
                    Some(Closer::Block(_)) => {
                        self.consume_branch_marker()?;
                        continue;
                    }
                    _ => return Err(self.error("unexpected block branch outside of a block")),
                }
            }
            let node = if self.starts_with("<!--") {
                self.parse_comment()?
            } else if self.starts_with("{#") {
                self.parse_block()?
            } else if self.starts_with("{") {
                self.parse_mustache()?
            } else if self.starts_with("<") {
                self.parse_element()?
            } else {
                self.parse_text()
            };
            children.push(node);
        }
    }

    fn parse_text(&mut self) -> Node {
        let start = self.pos();
        let mut data = String::new();
        while let Some(c) = self.peek() {
            if c == '<' || c == '{' {
                break;
            }
            data.push(c);
            self.advance();
        }
        Node::Text(Text {
            data,
            span: Span {
                start,
                end: self.pos(),
            },
        })
    }

    fn parse_comment(&mut self) -> Result<Node, ParseError> {
        let start = self.pos();
        self.eat("<!--");
        let mut data = String::new();
        while !self.starts_with("-->") {
            match self.advance() {
                Some(c) => data.push(c),
                None => return Err(self.error("unexpected end of input, expected -->")),
            }
        }
        self.eat("-->");
        Ok(Node::Comment(Comment::from_data(
            data,
            Span {
                start,
                end: self.pos(),
            },
        )))
    }

    fn parse_element(&mut self) -> Result<Node, ParseError> {
        let start = self.pos();
        self.eat("<");
        let name = self.read_tag_name()?;
        self.skip_attributes()?;
        if self.eat("/>") {
            return Ok(self.element(name, Vec::new(), start));
        }
        if !self.eat(">") {
            return Err(self.error("expected >"));
        }
        if VOID_ELEMENTS.contains(&name.as_str()) {
            return Ok(self.element(name, Vec::new(), start));
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let children = self.read_raw_text(&name)?;
            return Ok(self.element(name, children, start));
        }
        let children = self.parse_children(Some(&Closer::Tag(name.clone())))?;
        Ok(self.element(name, children, start))
    }

    fn element(&self, name: String, children: Vec<Node>, start: Position) -> Node {
        Node::Element(Element {
            name,
            children,
            span: Span {
                start,
                end: self.pos(),
            },
        })
    }

    fn read_tag_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '.' | '_') {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            Err(self.error("expected a tag name"))
        } else {
            Ok(name)
        }
    }

    /// Skips past attributes up to (but not including) `>` or `/>`.
    ///
    /// Quoted values and `{...}` expression values are skipped whole, so a
    /// `>` inside `on:click={() => x > 1}` does not end the tag.
    fn skip_attributes(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                None => return Err(self.error("unexpected end of input inside a tag")),
                Some('>') => return Ok(()),
                Some('/') if self.starts_with("/>") => return Ok(()),
                Some(q @ ('"' | '\'')) => {
                    self.advance();
                    self.skip_string(q)?;
                }
                Some('{') => self.skip_braced()?,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Skips a balanced `{...}` group, honoring string literals inside.
    fn skip_braced(&mut self) -> Result<(), ParseError> {
        self.eat("{");
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                None => return Err(self.error("unexpected end of input, expected }")),
                Some('{') => depth += 1,
                Some('}') => depth -= 1,
                Some(q @ ('"' | '\'' | '`')) => self.skip_string(q)?,
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Skips to the closing quote, honoring backslash escapes. The opening
    /// quote has already been consumed.
    fn skip_string(&mut self, quote: char) -> Result<(), ParseError> {
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    /// Consumes raw-text element content up to and including `</name>`.
    fn read_raw_text(&mut self, name: &str) -> Result<Vec<Node>, ParseError> {
        let start = self.pos();
        let closing = format!("</{name}");
        let mut data = String::new();
        while !self.starts_with(&closing) {
            match self.advance() {
                Some(c) => data.push(c),
                None => return Err(self.error(format!("unexpected end of input, expected </{name}>"))),
            }
        }
        let end = self.pos();
        self.eat(&closing);
        self.skip_whitespace();
        if !self.eat(">") {
            return Err(self.error("expected >"));
        }
        let mut children = Vec::new();
        if !data.is_empty() {
            children.push(Node::Text(Text {
                data,
                span: Span { start, end },
            }));
        }
        Ok(children)
    }

    /// Consumes a `</name>` closing tag and checks it against the closer
    /// the caller is waiting for.
    fn consume_closing_tag(&mut self, until: Option<&Closer>) -> Result<(), ParseError> {
        let pos = self.pos();
        self.eat("</");
        let name = self.read_tag_name()?;
        self.skip_whitespace();
        if !self.eat(">") {
            return Err(self.error("expected >"));
        }
        match until {
            Some(Closer::Tag(expected)) if *expected == name => Ok(()),
            Some(Closer::Tag(expected)) => Err(self.error_at(
                pos,
                format!("unexpected closing tag </{name}>, expected </{expected}>"),
            )),
            _ => Err(self.error_at(pos, format!("unexpected closing tag </{name}>"))),
        }
    }

    /// Consumes a `{/name}` block close and checks it against the closer.
    fn consume_block_close(&mut self, until: Option<&Closer>) -> Result<(), ParseError> {
        let pos = self.pos();
        self.eat("{/");
        let name = self.read_identifier();
        self.skip_whitespace();
        if !self.eat("}") {
            return Err(self.error("expected }"));
        }
        match until {
            Some(Closer::Block(expected)) if *expected == name => Ok(()),
            Some(Closer::Block(expected)) => Err(self.error_at(
                pos,
                format!("mismatched closing block {{/{name}}}, expected {{/{expected}}}"),
            )),
            _ => Err(self.error_at(pos, format!("unexpected closing block {{/{name}}}"))),
        }
    }

    /// Consumes a `{:else}` / `{:then v}` / `{:catch e}` branch marker.
    fn consume_branch_marker(&mut self) -> Result<(), ParseError> {
        self.eat("{:");
        let _name = self.read_identifier();
        let _ = self.scan_expression()?;
        Ok(())
    }

    fn parse_block(&mut self) -> Result<Node, ParseError> {
        let start = self.pos();
        self.eat("{#");
        let name = self.read_identifier();
        match name.as_str() {
            "if" | "each" | "await" | "key" => {}
            "snippet" => {
                if !self.modern {
                    return Err(
                        self.error_at(start, "{#snippet} is only valid in runes mode")
                    );
                }
            }
            other => {
                return Err(self.error_at(start, format!("unknown block type {{#{other}}}")))
            }
        }
        let _header = self.scan_expression()?;
        let children = self.parse_children(Some(&Closer::Block(name.clone())))?;
        Ok(Node::Block(Block {
            name,
            children,
            span: Span {
                start,
                end: self.pos(),
            },
        }))
    }

    fn parse_mustache(&mut self) -> Result<Node, ParseError> {
        let start = self.pos();
        self.eat("{");
        if self.eat("@") {
            let keyword = self.read_identifier();
            match keyword.as_str() {
                "html" => {
                    let expression = self.parse_expression()?;
                    Ok(Node::RawMustache(RawMustacheTag {
                        expression,
                        span: Span {
                            start,
                            end: self.pos(),
                        },
                    }))
                }
                "render" => {
                    if !self.modern {
                        return Err(
                            self.error_at(start, "{@render} is only valid in runes mode")
                        );
                    }
                    let expression = self.parse_expression()?;
                    Ok(self.mustache(expression, start))
                }
                "debug" | "const" => {
                    let expression = self.parse_expression()?;
                    Ok(self.mustache(expression, start))
                }
                other => Err(self.error_at(start, format!("unknown tag {{@{other}}}"))),
            }
        } else {
            let expression = self.parse_expression()?;
            Ok(self.mustache(expression, start))
        }
    }

    fn mustache(&self, expression: Expression, start: Position) -> Node {
        Node::Mustache(MustacheTag {
            expression,
            span: Span {
                start,
                end: self.pos(),
            },
        })
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let pos = self.pos();
        let (text, span) = self.scan_expression()?;
        if text.is_empty() {
            return Err(self.error_at(pos, "expected an expression"));
        }
        Ok(classify_expression(&text, span))
    }

    /// Scans expression text up to and including the closing `}`, honoring
    /// nested braces and string literals. Returns the trimmed text and the
    /// span of its non-whitespace extent.
    fn scan_expression(&mut self) -> Result<(String, Span), ParseError> {
        self.skip_whitespace();
        let start = self.pos();
        let mut end = self.pos();
        let mut raw = String::new();
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unexpected end of input, expected }"));
            };
            if c == '}' && depth == 0 {
                self.advance();
                break;
            }
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                '"' | '\'' | '`' => {
                    raw.push(c);
                    self.advance();
                    end = self.scan_string_into(c, &mut raw)?;
                    continue;
                }
                _ => {}
            }
            raw.push(c);
            self.advance();
            if !c.is_whitespace() {
                end = self.pos();
            }
        }
        Ok((raw.trim_end().to_string(), Span { start, end }))
    }

    /// Copies a string literal (opening quote already consumed and pushed)
    /// into `raw`, returning the position just past the closing quote.
    fn scan_string_into(&mut self, quote: char, raw: &mut String) -> Result<Position, ParseError> {
        loop {
            let Some(c) = self.advance() else {
                return Err(self.error("unterminated string literal"));
            };
            raw.push(c);
            if c == '\\' {
                if let Some(escaped) = self.advance() {
                    raw.push(escaped);
                }
            } else if c == quote {
                return Ok(self.pos());
            }
        }
    }
}

/// Classifies expression text into the shallow shapes the detector cares
/// about. Only a direct call with a plain identifier callee can ever pass
/// the sanitizer check; everything ambiguous falls into `Other`.
fn classify_expression(text: &str, span: Span) -> Expression {
    let ident = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
    if ident.is_match(text) {
        return Expression::Identifier {
            name: text.to_string(),
            span,
        };
    }
    let call = Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$]*)\s*\(").unwrap();
    if let Some(caps) = call.captures(text) {
        let open = caps.get(0).unwrap().end() - 1;
        if parens_close_at_end(text, open) {
            return Expression::Call {
                callee: Some(caps[1].to_string()),
                span,
            };
        }
    }
    if text.ends_with(')') {
        // Call through a member or computed callee, or a call of a call.
        return Expression::Call { callee: None, span };
    }
    let member = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\s*\.\s*[A-Za-z_$][A-Za-z0-9_$]*)+$")
        .unwrap();
    if member.is_match(text) {
        return Expression::Member { span };
    }
    Expression::Other { span }
}

/// True if the `(` at byte offset `open` is matched by the final character
/// of `text`, i.e. the whole expression is one call.
fn parens_close_at_end(text: &str, open: usize) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if i < open {
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Node {
        parse_template(source, false).expect("template should parse")
    }

    fn first_raw(node: &Node) -> &RawMustacheTag {
        fn find(node: &Node) -> Option<&RawMustacheTag> {
            if let Node::RawMustache(tag) = node {
                return Some(tag);
            }
            node.children()?.iter().find_map(find)
        }
        find(node).expect("expected a raw mustache tag")
    }

    #[test]
    fn test_expression_location() {
        let root = parse("<div>{@html userInput}</div>");
        let tag = first_raw(&root);
        let span = tag.expression.span();
        assert_eq!(span.start, Position { line: 1, column: 12 });
        assert_eq!(span.end, Position { line: 1, column: 21 });
    }

    #[test]
    fn test_expression_location_across_lines() {
        let root = parse("<p>ok</p>\n{@html markup}\n");
        let span = first_raw(&root).expression.span();
        assert_eq!(span.start, Position { line: 2, column: 7 });
        assert_eq!(span.end, Position { line: 2, column: 13 });
    }

    #[test]
    fn test_classify_identifier_and_calls() {
        let root = parse("{@html sanitize(userInput)}");
        assert!(matches!(
            &first_raw(&root).expression,
            Expression::Call { callee: Some(name), .. } if name == "sanitize"
        ));

        let root = parse("{@html DOMPurify.sanitize(userInput)}");
        assert!(matches!(
            &first_raw(&root).expression,
            Expression::Call { callee: None, .. }
        ));

        let root = parse("{@html props.markup}");
        assert!(matches!(&first_raw(&root).expression, Expression::Member { .. }));

        let root = parse("{@html a + b}");
        assert!(matches!(&first_raw(&root).expression, Expression::Other { .. }));
    }

    #[test]
    fn test_call_of_call_has_no_plain_callee() {
        let root = parse("{@html make()(x)}");
        assert!(matches!(
            &first_raw(&root).expression,
            Expression::Call { callee: None, .. }
        ));
    }

    #[test]
    fn test_string_argument_with_paren() {
        let root = parse(r#"{@html wrap("a)b")}"#);
        assert!(matches!(
            &first_raw(&root).expression,
            Expression::Call { callee: Some(name), .. } if name == "wrap"
        ));
    }

    #[test]
    fn test_comment_directive_in_tree() {
        let root = parse("<!-- svelte-ignore unsafe_html -->");
        let children = root.children().unwrap();
        assert_eq!(children.len(), 1);
        let Node::Comment(comment) = &children[0] else {
            panic!("expected a comment node");
        };
        assert!(comment.suppresses("unsafe_html"));
    }

    #[test]
    fn test_nested_blocks_and_elements() {
        let root = parse("{#if show}<ul>{#each items as it}<li>{it}</li>{/each}</ul>{/if}");
        let Node::Block(block) = &root.children().unwrap()[0] else {
            panic!("expected a block");
        };
        assert_eq!(block.name, "if");
        let Node::Element(ul) = &block.children[0] else {
            panic!("expected an element");
        };
        assert_eq!(ul.name, "ul");
        assert!(matches!(&ul.children[0], Node::Block(b) if b.name == "each"));
    }

    #[test]
    fn test_else_branch_content_is_kept() {
        let root = parse("{#if ok}<b>y</b>{:else}{@html fallback}{/if}");
        let Node::Block(block) = &root.children().unwrap()[0] else {
            panic!("expected a block");
        };
        assert!(block
            .children
            .iter()
            .any(|n| matches!(n, Node::RawMustache(_))));
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let root = parse("<br>\n<img src=\"x.png\">\n<Widget prop={a > b} />");
        let names: Vec<_> = root
            .children()
            .unwrap()
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["br", "img", "Widget"]);
    }

    #[test]
    fn test_script_content_is_raw_text() {
        let root = parse("<script>let x = 1 < 2;</script><p>hi</p>");
        let Node::Element(script) = &root.children().unwrap()[0] else {
            panic!("expected an element");
        };
        assert_eq!(script.name, "script");
        assert!(matches!(&script.children[0], Node::Text(t) if t.data.contains("1 < 2")));
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = parse_template("<div>\n  <span>oops\n", false).unwrap_err();
        assert_eq!(err.message, "unexpected end of input, expected </span>");
        assert_eq!((err.line, err.column), (3, 0));
    }

    #[test]
    fn test_mismatched_closing_tag_is_an_error() {
        let err = parse_template("<div></span>", false).unwrap_err();
        assert!(err.message.contains("</span>"));
        assert!(err.message.contains("</div>"));
    }

    #[test]
    fn test_render_tag_requires_modern_mode() {
        assert!(parse_template("{@render row()}", false).is_err());
        assert!(parse_template("{@render row()}", true).is_ok());
    }

    #[test]
    fn test_snippet_block_requires_modern_mode() {
        let src = "{#snippet row()}<b>x</b>{/snippet}";
        assert!(parse_template(src, false).is_err());
        assert!(parse_template(src, true).is_ok());
    }

    #[test]
    fn test_unknown_at_tag_is_an_error() {
        let err = parse_template("{@nonsense x}", false).unwrap_err();
        assert!(err.message.contains("{@nonsense}"));
    }
}
