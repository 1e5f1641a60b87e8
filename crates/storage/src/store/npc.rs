#![forbid(unsafe_code)]

use super::StoreError;
use super::fs::write_atomic;
use growth_core::ids::NpcSlug;
use growth_core::tags::merge_tags;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Stored NPC card, `npcs/<slug>.json`.
///
/// Fields this server does not manage are kept in `extra` and written back untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "empty_stats")]
    pub stats: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_stats() -> Value {
    Value::Object(Map::new())
}

#[derive(Clone, Debug, Default)]
pub struct NpcUpsertRequest {
    pub id: Option<String>,
    pub name: String,
    pub first_seen: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub stats: Option<Map<String, Value>>,
}

impl NpcUpsertRequest {
    /// Explicit id when given, the name otherwise.
    pub fn slug(&self) -> Result<NpcSlug, StoreError> {
        let key = self.id.as_deref().unwrap_or(&self.name);
        NpcSlug::derive(key).map_err(|err| StoreError::InvalidInput(err.message().to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct NpcUpsertOutcome {
    pub slug: NpcSlug,
    pub relative_path: String,
    pub created: bool,
    pub document: NpcDocument,
}

impl NpcDocument {
    /// Folds an upsert into the stored card (if any).
    ///
    /// Scalars are overwritten, tags are unioned, `stats` keeps the stored value unless the
    /// request carries keys to lay over it, `created` is written once and `updated` always.
    pub fn merge(
        existing: Option<NpcDocument>,
        request: &NpcUpsertRequest,
        slug: &NpcSlug,
        now: &str,
    ) -> NpcDocument {
        let (stored_id, stored_tags, stored_stats, created, extra) = match existing {
            Some(doc) => (
                Some(doc.id).filter(|id| !id.is_empty()),
                doc.tags,
                doc.stats,
                doc.created,
                doc.extra,
            ),
            None => (None, Vec::new(), empty_stats(), None, Map::new()),
        };

        let id = request
            .id
            .clone()
            .or(stored_id)
            .unwrap_or_else(|| slug.as_str().to_string());

        let stats = match (stored_stats, request.stats.as_ref()) {
            (Value::Object(mut stored), Some(incoming)) => {
                for (key, value) in incoming {
                    stored.insert(key.clone(), value.clone());
                }
                Value::Object(stored)
            }
            (_, Some(incoming)) => Value::Object(incoming.clone()),
            (stored, None) => stored,
        };

        NpcDocument {
            id,
            name: request.name.clone(),
            first_seen: request.first_seen.clone(),
            summary: request.summary.clone(),
            tags: merge_tags(&stored_tags, &request.tags),
            notes: request.notes.clone(),
            stats,
            created: created.or_else(|| Some(now.to_string())),
            updated: Some(now.to_string()),
            extra,
        }
    }
}

pub(crate) fn load_npc(path: &Path) -> Result<Option<NpcDocument>, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path)(err)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn save_npc(path: &Path, doc: &NpcDocument) -> Result<(), StoreError> {
    let mut body = serde_json::to_string_pretty(doc)?;
    body.push('\n');
    write_atomic(path, body.as_bytes())
}
