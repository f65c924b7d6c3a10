//! JSON output and destination housekeeping

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::KeyOrder;
use crate::error::{Error, Result};

/// Render `value` as the patch file text: 2-space indent, UTF-8 kept
/// literal, trailing newline.
pub fn to_json_string<T: Serialize>(value: &T, key_order: KeyOrder) -> serde_json::Result<String> {
    let mut tree = serde_json::to_value(value)?;
    if key_order == KeyOrder::Sorted {
        sort_keys(&mut tree);
    }
    let mut text = serde_json::to_string_pretty(&tree)?;
    text.push('\n');
    Ok(text)
}

/// Write `value` to `path`, replacing whatever is there
pub fn write_json<T: Serialize>(path: &Path, value: &T, key_order: KeyOrder) -> Result<()> {
    let text = to_json_string(value, key_order).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, text.as_bytes()).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote patch");
    Ok(())
}

/// Delete `dir` with everything in it, then recreate it empty
pub fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => info!(dir = %dir.display(), "cleared destination"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Recursively order every object's keys
pub fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.sort_keys();
            map.values_mut().for_each(sort_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
