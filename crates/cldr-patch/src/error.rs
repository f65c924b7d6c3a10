//! Error types for cldr-patch

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Position in an XML source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in an XML source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn point(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// What went wrong while reading XML markup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    UnexpectedClosingTag,
    MismatchedClosingTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    InvalidUtf8,
    UnterminatedMarkup,
    MissingRoot,
    TrailingContent,
    MaxDepthExceeded { max: u16 },
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedClosingTag => write!(f, "unexpected closing tag"),
            Self::MismatchedClosingTag { expected, found } => {
                write!(f, "expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::MissingRoot => write!(f, "document has no root element"),
            Self::TrailingContent => write!(f, "content after root element"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
        }
    }
}

/// Malformed XML, with the location it was detected at
#[derive(Error, Clone, Debug, PartialEq)]
pub struct SyntaxError {
    kind: SyntaxErrorKind,
    span: Span,
    message: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: SyntaxErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create error at specific position
    pub fn at(kind: SyntaxErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::point(pos))
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}: {}", self.span.start, self.message)
    }
}

/// Main error type for cldr-patch
#[derive(Error, Debug)]
pub enum Error {
    /// A structural node is absent (`count == 0`) or not unique
    #[error("expected exactly one `{path}`, found {count}")]
    NotFound { path: String, count: usize },

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> has unusable `{attribute}`: {reason}")]
    MalformedValue {
        element: String,
        attribute: &'static str,
        reason: String,
    },

    #[error("{}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing(element: &str, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute,
        }
    }
}

/// Result type alias for cldr-patch
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "42:10:5");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::at(SyntaxErrorKind::UnterminatedMarkup, Pos::new(10, 2, 5));
        let display = err.to_string();
        assert!(display.contains("error at 10:2:5"));
        assert!(display.contains("unterminated markup"));
    }

    #[test]
    fn test_syntax_error_custom_message() {
        let err = SyntaxError::with_message(
            SyntaxErrorKind::UnexpectedToken,
            Span::default(),
            "expected '='",
        );
        assert_eq!(err.kind(), &SyntaxErrorKind::UnexpectedToken);
        assert_eq!(err.message(), "expected '='");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            path: "languageMatches[@type=\"written_new\"]".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "expected exactly one `languageMatches[@type=\"written_new\"]`, found 2"
        );
    }

    #[test]
    fn test_missing_attribute_display() {
        let err = Error::missing("pluralRanges", "locales");
        assert_eq!(
            err.to_string(),
            "<pluralRanges> is missing required attribute `locales`"
        );
    }
}
