//! Lexical markup rewrite
//!
//! The snippet language is standard expression syntax extended with
//! embedded element markup. This module rewrites the extension away
//! before parsing, without evaluating anything:
//!
//! ```text
//! <Box title="hi" count={n}>text {expr} <i/></Box>
//!   ⟶ element(Box, [("title", "hi"), ("count", (n))], ["text ", (expr), element("i", [], [])])
//! <>a</>            ⟶ fragment(["a"])
//! <div/>            ⟶ element("div", [], [])
//! ```
//!
//! Capitalized tags stay identifiers (resolved through the scope table);
//! lowercase tags become string tags. A `<` opens markup only in
//! expression position - never directly after an operand - so
//! comparisons like `a < b` pass through untouched. String literals and
//! comments are copied verbatim.

use crate::error::{Position, TransformError};

/// Rewrite embedded markup to plain call form.
pub(crate) fn rewrite(source: &str) -> Result<String, TransformError> {
    rewrite_from(source, 1, 1)
}

/// Rewrite with an origin offset, for text nested inside `{..}`.
fn rewrite_from(source: &str, line: usize, column: usize) -> Result<String, TransformError> {
    let chars: Vec<char> = source.chars().collect();
    let mut scanner = Scanner {
        chars: &chars,
        pos: 0,
        line,
        column,
        out: String::with_capacity(source.len()),
        last_significant: None,
    };
    scanner.run()?;
    Ok(scanner.out)
}

/// A child of an element, before final emission.
enum Child {
    /// A text run (whitespace not yet normalized)
    Text(String),

    /// Already-rewritten code (nested element or interpolation)
    Code(String),
}

struct Scanner<'a> {
    chars: &'a [char],
    pos: usize,
    line: usize,
    column: usize,
    out: String,
    /// Last non-whitespace character emitted as plain code; used to
    /// decide whether `<` is markup or a comparison.
    last_significant: Option<char>,
}

impl Scanner<'_> {
    fn run(&mut self) -> Result<(), TransformError> {
        while let Some(c) = self.peek() {
            match c {
                '"' => self.copy_string()?,
                '\'' => self.copy_char_literal(),
                '/' if self.peek_at(1) == Some('/') => self.copy_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.copy_block_comment()?,
                '<' if self.at_markup_start() => {
                    let element = self.parse_element()?;
                    self.out.push_str(&element);
                    self.last_significant = Some(')');
                }
                _ => {
                    self.bump_into_out();
                }
            }
        }
        Ok(())
    }

    // ── cursor ────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_into_out(&mut self) {
        if let Some(c) = self.bump() {
            self.out.push(c);
            if !c.is_whitespace() {
                self.last_significant = Some(c);
            }
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn error(&self, message: impl Into<String>) -> TransformError {
        TransformError::Markup {
            message: message.into(),
            position: self.position(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TransformError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    // ── verbatim copies ───────────────────────────────────────────────

    fn copy_string(&mut self) -> Result<(), TransformError> {
        self.bump_into_out(); // opening quote
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => {
                    self.bump_into_out();
                    self.bump_into_out();
                }
                Some('"') => {
                    self.bump_into_out();
                    return Ok(());
                }
                Some(_) => self.bump_into_out(),
            }
        }
    }

    /// Copy a char literal like `'a'` or `'\n'`. Anything that doesn't
    /// look like one is copied as a lone quote and left to the parser.
    fn copy_char_literal(&mut self) {
        let looks_like_char = match self.peek_at(1) {
            Some('\\') => true,
            Some(_) => self.peek_at(2) == Some('\''),
            None => false,
        };
        self.bump_into_out(); // opening quote
        if !looks_like_char {
            return;
        }
        if self.peek() == Some('\\') {
            self.bump_into_out();
        }
        self.bump_into_out(); // the character
        if self.peek() == Some('\'') {
            self.bump_into_out();
        }
    }

    fn copy_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump_into_out();
        }
    }

    fn copy_block_comment(&mut self) -> Result<(), TransformError> {
        self.bump_into_out(); // /
        self.bump_into_out(); // *
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(), self.peek_at(1)) {
                (Some('*'), Some('/')) => {
                    depth -= 1;
                    self.bump_into_out();
                    self.bump_into_out();
                }
                (Some('/'), Some('*')) => {
                    depth += 1;
                    self.bump_into_out();
                    self.bump_into_out();
                }
                (Some(_), _) => {
                    self.bump_into_out();
                }
                (None, _) => return Err(self.error("unterminated block comment")),
            }
        }
        Ok(())
    }

    // ── markup ────────────────────────────────────────────────────────

    /// `<` opens markup when the next character starts a tag (or a
    /// fragment) and the previous significant character cannot end an
    /// operand. `render(<Box/>)` qualifies; `a < b` does not.
    fn at_markup_start(&self) -> bool {
        let opens_tag = matches!(
            self.peek_at(1),
            Some(c) if c.is_ascii_alphabetic() || c == '>'
        );
        if !opens_tag {
            return false;
        }
        !matches!(
            self.last_significant,
            Some(c) if c.is_alphanumeric() || c == '_' || c == ')' || c == ']' || c == '"' || c == '\''
        )
    }

    /// Parse one element (cursor on `<`) and return its call form.
    fn parse_element(&mut self) -> Result<String, TransformError> {
        self.bump(); // <

        // Fragment: <>children</>
        if self.peek() == Some('>') {
            self.bump();
            let children = self.parse_children(None)?;
            return Ok(format!("fragment([{}])", children.join(", ")));
        }

        let tag = self.read_ident(false)?;
        let component = if tag.chars().next().is_some_and(char::is_uppercase) {
            tag.clone()
        } else {
            format!("{:?}", tag)
        };

        let mut attrs: Vec<String> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(format!("unterminated element `<{}>`", tag))),

                Some('/') => {
                    self.bump();
                    self.expect('>')?;
                    return Ok(emit_element(&component, &attrs, &[]));
                }

                Some('>') => {
                    self.bump();
                    let children = self.parse_children(Some(tag.as_str()))?;
                    return Ok(emit_element(&component, &attrs, &children));
                }

                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    let attr = self.parse_attr()?;
                    attrs.push(attr);
                }

                Some(c) => {
                    return Err(
                        self.error(format!("unexpected `{c}` in element `<{}>`", tag))
                    )
                }
            }
        }
    }

    /// Parse one attribute: `name`, `name="str"`, or `name={expr}`.
    fn parse_attr(&mut self) -> Result<String, TransformError> {
        let key = self.read_ident(true)?;
        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Ok(format!("({:?}, true)", key));
        }
        self.bump(); // =
        self.skip_whitespace();
        match self.peek() {
            Some('"') => {
                let literal = self.read_string_raw()?;
                Ok(format!("({:?}, {literal})", key))
            }
            Some('{') => {
                let expr = self.read_braced_expr()?;
                if expr.trim().is_empty() {
                    return Err(self.error(format!("empty value for attribute `{}`", key)));
                }
                Ok(format!("({:?}, ({expr}))", key))
            }
            _ => Err(self.error(format!(
                "expected a string or braced expression for attribute `{}`",
                key
            ))),
        }
    }

    /// Parse children until the matching closing tag. `closing` of
    /// `None` means a fragment, closed by `</>`.
    fn parse_children(&mut self, closing: Option<&str>) -> Result<Vec<String>, TransformError> {
        let mut pieces: Vec<Child> = Vec::new();
        let mut text = String::new();

        loop {
            match self.peek() {
                None => {
                    let name = closing.unwrap_or("");
                    return Err(self.error(format!("unterminated element `<{name}>`")));
                }

                // Closing tag
                Some('<') if self.peek_at(1) == Some('/') => {
                    flush_text(&mut pieces, &mut text);
                    self.bump(); // <
                    self.bump(); // /
                    match closing {
                        Some(name) => {
                            let got = self.read_ident(false)?;
                            self.skip_whitespace();
                            self.expect('>')?;
                            if got != name {
                                return Err(self.error(format!(
                                    "mismatched closing tag `</{}>`, expected `</{name}>`",
                                    got
                                )));
                            }
                        }
                        None => {
                            self.skip_whitespace();
                            self.expect('>')?;
                        }
                    }
                    return Ok(emit_children(pieces));
                }

                // Nested element
                Some('<') if matches!(self.peek_at(1), Some(c) if c.is_ascii_alphabetic()) => {
                    flush_text(&mut pieces, &mut text);
                    let nested = self.parse_element()?;
                    pieces.push(Child::Code(nested));
                }

                Some('<') => {
                    return Err(
                        self.error("stray `<` in element content; use a braced expression")
                    );
                }

                // Interpolation
                Some('{') => {
                    flush_text(&mut pieces, &mut text);
                    let expr = self.read_braced_expr()?;
                    if !expr.trim().is_empty() {
                        pieces.push(Child::Code(format!("({expr})")));
                    }
                }

                Some(_) => {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
            }
        }
    }

    /// Copy a string literal and return it verbatim, quotes included.
    fn read_string_raw(&mut self) -> Result<String, TransformError> {
        let start = self.out.len();
        self.copy_string()?;
        Ok(self.out.split_off(start))
    }

    /// Read a `{..}`-balanced expression, rewrite any markup inside it,
    /// and return the rewritten interior (braces stripped).
    fn read_braced_expr(&mut self) -> Result<String, TransformError> {
        self.expect('{')?;
        let origin = self.position();
        let start = self.pos;
        let mut depth = 1usize;

        while depth > 0 {
            match self.peek() {
                None => return Err(self.error("unterminated `{` expression")),
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    self.bump();
                }
                Some('"') => {
                    self.skip_string()?;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        let inner: String = self.chars[start..self.pos].iter().collect();
        self.bump(); // closing }
        rewrite_from(&inner, origin.line, origin.column)
    }

    /// Advance past a string literal without emitting it.
    fn skip_string(&mut self) -> Result<(), TransformError> {
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Read an identifier; attribute names may also contain `-`.
    fn read_ident(&mut self, allow_dash: bool) -> Result<String, TransformError> {
        let mut text = String::new();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                text.push(c);
                self.bump();
            }
            _ => return Err(self.error("expected an identifier")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || (allow_dash && c == '-') {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(text)
    }
}

fn emit_element(component: &str, attrs: &[String], children: &[String]) -> String {
    format!(
        "element({component}, [{}], [{}])",
        attrs.join(", "),
        children.join(", ")
    )
}

fn flush_text(pieces: &mut Vec<Child>, text: &mut String) {
    if !text.is_empty() {
        pieces.push(Child::Text(std::mem::take(text)));
    }
}

/// Normalize text runs and emit children as code.
///
/// Whitespace runs collapse to a single space; the first and last runs
/// are trimmed at the outer edge; whitespace-only runs disappear. Edge
/// spaces adjacent to interpolations survive, so `hello {name}` keeps
/// its separator.
fn emit_children(pieces: Vec<Child>) -> Vec<String> {
    let last_index = pieces.len().saturating_sub(1);
    let mut out = Vec::new();
    for (i, piece) in pieces.into_iter().enumerate() {
        match piece {
            Child::Code(code) => out.push(code),
            Child::Text(raw) => {
                let mut collapsed = collapse_whitespace(&raw);
                if i == 0 {
                    collapsed = collapsed.trim_start().to_string();
                }
                if i == last_index {
                    collapsed = collapsed.trim_end().to_string();
                }
                if !collapsed.trim().is_empty() {
                    out.push(format!("{collapsed:?}"));
                }
            }
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
