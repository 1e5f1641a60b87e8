#![forbid(unsafe_code)]

use super::StoreError;
use super::fs::{ensure_parent, now_rfc3339};
use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Appends `record` as one compact JSON line and returns its 1-based line number.
///
/// A missing (or null) `ts` is stamped with the current time. The line number is the count
/// of non-blank lines present before the write, plus one. Nothing serializes concurrent
/// appenders; two writers racing on the same file may report the same number.
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<usize, StoreError> {
    let mut value = serde_json::to_value(record)?;
    let Some(obj) = value.as_object_mut() else {
        return Err(StoreError::InvalidInput(
            "jsonl record must be a JSON object".to_string(),
        ));
    };
    if obj.get("ts").is_none_or(Value::is_null) {
        obj.insert("ts".to_string(), Value::String(now_rfc3339()));
    }

    ensure_parent(path)?;
    let existing = count_records(path)?;

    let mut line = serde_json::to_string(&value)?;
    line.push('\n');
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(StoreError::io(path))?;
    file.write_all(line.as_bytes())
        .map_err(StoreError::io(path))?;
    Ok(existing + 1)
}

/// Non-blank lines in a JSON-lines file; a missing file has none.
pub fn count_records(path: &Path) -> Result<usize, StoreError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(StoreError::io(path)(err)),
    };
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(StoreError::io(path))?;
        if !line.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Every non-blank line parsed as JSON, in file order.
pub fn read_jsonl(path: &Path) -> Result<Vec<Value>, StoreError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StoreError::io(path)(err)),
    };
    let mut out = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(StoreError::io(path))?;
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        out.push(serde_json::from_str(raw)?);
    }
    Ok(out)
}
