#![forbid(unsafe_code)]

use super::StoreError;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// UTC calendar date, `YYYY-MM-DD`.
pub fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(StoreError::io(dir))
}

/// Replaces `path` in one rename: the bytes go to a sibling temp file first.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let tmp_path = temp_sibling(path, bytes);
    if let Err(err) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StoreError::io(&tmp_path)(err));
    }
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StoreError::io(path)(err));
    }
    Ok(())
}

fn temp_sibling(path: &Path, bytes: &[u8]) -> PathBuf {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let digest = Sha256::digest(bytes);
    let mut short = String::with_capacity(8);
    for b in digest.iter().take(4) {
        let _ = write!(&mut short, "{b:02x}");
    }
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".tmp.{millis}.{short}"));
    path.with_file_name(name)
}

/// Joins a caller-supplied relative path onto a repository root, refusing anything that
/// could land outside it.
pub(crate) fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf, StoreError> {
    let trimmed = relative.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput("path must not be empty".to_string()));
    }
    let rel = Path::new(trimmed);
    for component in rel.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::PathEscape(trimmed.to_string()));
            }
        }
    }
    Ok(root.join(rel))
}
