//! XML reading

pub mod cursor;
pub mod model;
pub mod parser;

pub use model::{select_one, Content, Document, Element};
pub use parser::Parser;

use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{Error, Result, SyntaxError};

/// Parse XML from string
pub fn from_str(s: &str) -> std::result::Result<Document, SyntaxError> {
    from_bytes(s.as_bytes())
}

/// Parse XML from bytes
pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Document, SyntaxError> {
    Parser::new(bytes).parse()
}

/// Read and parse one XML file
#[instrument(level = "debug")]
pub fn read_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    debug!(bytes = bytes.len(), "read xml source");
    from_bytes(&bytes).map_err(|source| Error::Syntax {
        path: path.to_path_buf(),
        source,
    })
}
