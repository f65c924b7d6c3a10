//! XML parser implementation
//!
//! Covers what the CLDR sources use: a prolog with declaration, comments
//! and a DOCTYPE, elements with quoted attributes, character data with the
//! predefined and numeric entities, and CDATA sections. DTDs are skipped,
//! never interpreted. Line endings are normalized to `\n` and attribute
//! values get XML whitespace normalization.

use indexmap::IndexMap;

use crate::error::{Pos, Span, SyntaxError, SyntaxErrorKind};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest element nesting accepted before giving up
pub const MAX_DEPTH: u16 = 256;

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
            depth: 0,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> ParseResult<Document> {
        if self.cursor.starts_with(b"\xEF\xBB\xBF") {
            self.cursor.advance_by(3);
        }
        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(SyntaxError::at(
                SyntaxErrorKind::MissingRoot,
                self.cursor.position(),
            ));
        }

        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(SyntaxError::at(
                SyntaxErrorKind::TrailingContent,
                self.cursor.position(),
            ));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    fn skip_misc(&mut self) -> ParseResult<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> ParseResult<Element> {
        self.expect_byte(b'<')?;
        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(SyntaxErrorKind::UnexpectedClosingTag));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }
        self.expect_byte(b'>')?;

        if self.depth >= MAX_DEPTH {
            return Err(self.error_here(SyntaxErrorKind::MaxDepthExceeded { max: MAX_DEPTH }));
        }
        self.depth += 1;
        let children = self.parse_children(&name)?;
        self.depth -= 1;

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    /// Parse content up to and including the closing tag of `name`
    fn parse_children(&mut self, name: &str) -> ParseResult<Vec<Content>> {
        let mut children = Vec::new();
        loop {
            if self.cursor.current() == Some(b'<') && self.cursor.peek(1) == Some(b'/') {
                let start = self.cursor.position();
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::MismatchedClosingTag {
                            expected: name.to_string(),
                            found: close_name,
                        },
                        Span::new(start, self.cursor.position()),
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                return Ok(children);
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.take_until(b"]]>")?;
                push_text(&mut children, text);
            } else if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
            } else if self.cursor.is_eof() {
                return Err(self.error_here(SyntaxErrorKind::UnexpectedEof));
            } else {
                let text = self.parse_text()?;
                push_text(&mut children, text);
            }
        }
    }

    fn parse_attributes(&mut self) -> ParseResult<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(SyntaxErrorKind::UnexpectedEof)),
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::DuplicateAttribute { name },
                    Span::new(start, self.cursor.position()),
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> ParseResult<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(self.error_with_message(
                    SyntaxErrorKind::UnexpectedToken,
                    "expected quoted attribute value",
                ))
            }
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw, start_pos)?;
                // literal tab and newline become spaces; character references are kept
                let text = text.replace(['\t', '\n'], " ");
                return decode_entities(&text, start_pos);
            }
            self.cursor.advance();
        }

        Err(self.error_here(SyntaxErrorKind::UnexpectedEof))
    }

    /// Character data up to the next markup
    fn parse_text(&mut self) -> ParseResult<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw, start_pos)?;
        decode_entities(&text, start_pos)
    }

    fn parse_name(&mut self) -> ParseResult<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => {
                return Err(SyntaxError::with_message(
                    SyntaxErrorKind::UnexpectedToken,
                    Span::point(start_pos),
                    "expected name",
                ))
            }
            None => return Err(self.error_here(SyntaxErrorKind::UnexpectedEof)),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start), start_pos)
    }

    /// Skip a DOCTYPE declaration, including a bracketed internal subset
    fn skip_doctype(&mut self) -> ParseResult<()> {
        let start = self.cursor.position();
        let mut in_subset = false;
        let mut quote: Option<u8> = None;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => in_subset = true,
                (None, b']') => in_subset = false,
                (None, b'>') if !in_subset => return Ok(()),
                _ => {}
            }
        }
        Err(SyntaxError::at(SyntaxErrorKind::UnterminatedMarkup, start))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> ParseResult<()> {
        self.take_raw_until(pattern).map(|_| ())
    }

    /// Raw text up to `pattern`, consuming the pattern
    fn take_until(&mut self, pattern: &[u8]) -> ParseResult<String> {
        let start_pos = self.cursor.position();
        let raw = self.take_raw_until(pattern)?;
        bytes_to_string(raw, start_pos)
    }

    fn take_raw_until(&mut self, pattern: &[u8]) -> ParseResult<&'a [u8]> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return Ok(raw);
            }
            self.cursor.advance();
        }
        Err(SyntaxError::at(
            SyntaxErrorKind::UnterminatedMarkup,
            start_pos,
        ))
    }

    fn expect_byte(&mut self, expected: u8) -> ParseResult<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error_here(SyntaxErrorKind::UnexpectedEof))
        } else {
            Err(self.error_with_message(
                SyntaxErrorKind::UnexpectedToken,
                format!("expected '{}'", char::from(expected)),
            ))
        }
    }

    fn error_here(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::at(kind, self.cursor.position())
    }

    fn error_with_message(&self, kind: SyntaxErrorKind, message: impl Into<String>) -> SyntaxError {
        SyntaxError::with_message(kind, Span::point(self.cursor.position()), message)
    }
}

/// Append character data, merging it into a preceding text node
fn push_text(children: &mut Vec<Content>, text: String) {
    if text.is_empty() {
        return;
    }
    match children.last_mut() {
        Some(Content::Text(prev)) => prev.push_str(&text),
        _ => children.push(Content::Text(text)),
    }
}

/// Decode UTF-8, turning `\r\n` and lone `\r` into `\n`
fn bytes_to_string(bytes: &[u8], pos: Pos) -> ParseResult<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| SyntaxError::at(SyntaxErrorKind::InvalidUtf8, pos))?;
    if text.contains('\r') {
        Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Ok(text.to_string())
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> ParseResult<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = match entity.as_str() {
            _ if !terminated => None,
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(&entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(SyntaxError::at(
                    SyntaxErrorKind::InvalidEntity { entity },
                    pos,
                ))
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
