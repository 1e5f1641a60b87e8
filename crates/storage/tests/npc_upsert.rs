#![forbid(unsafe_code)]

use growth_core::ids::NpcSlug;
use growth_storage::{CampaignStore, NpcUpsertRequest, StoreError};
use serde_json::{Map, Value, json};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("growth_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn request(name: &str, tags: &[&str]) -> NpcUpsertRequest {
    NpcUpsertRequest {
        id: None,
        name: name.to_string(),
        first_seen: "Session 1, the docks".to_string(),
        summary: "Grizzled ferryman".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        notes: String::new(),
        stats: None,
    }
}

#[test]
fn second_upsert_unions_tags_and_keeps_created() {
    let root = temp_dir("second_upsert_unions_tags_and_keeps_created");
    let store = CampaignStore::open(&root);

    let first = store
        .npc_upsert(&request("Old Man Henrik", &["ferryman", "ally"]))
        .expect("first upsert");
    assert!(first.created);
    assert_eq!(first.relative_path, "npcs/old-man-henrik.json");
    assert_eq!(first.document.id, "old-man-henrik");
    let created_at = first.document.created.clone().expect("created");

    std::thread::sleep(std::time::Duration::from_millis(5));

    let mut second = request("Old Man Henrik", &["smuggler"]);
    second.summary = "Ferryman with a secret cargo".to_string();
    second.notes = "Owes the guild".to_string();
    let second = store.npc_upsert(&second).expect("second upsert");
    assert!(!second.created);

    let stored = store
        .npc_get(&second.slug)
        .expect("load")
        .expect("document exists");
    assert_eq!(stored.tags, vec!["ferryman", "ally", "smuggler"]);
    assert_eq!(stored.created.as_deref(), Some(created_at.as_str()));
    assert_eq!(stored.updated, second.document.updated);
    assert_ne!(stored.updated.as_deref(), Some(created_at.as_str()));
    assert_eq!(stored.summary, "Ferryman with a secret cargo");
    assert_eq!(stored.notes, "Owes the guild");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn explicit_id_targets_the_name_slug() {
    let root = temp_dir("explicit_id_targets_the_name_slug");
    let store = CampaignStore::open(&root);

    store
        .npc_upsert(&request("Old Man Henrik", &["ferryman"]))
        .expect("by name");
    let mut by_id = request("Henrik", &[]);
    by_id.id = Some("old-man-henrik".to_string());
    let outcome = store.npc_upsert(&by_id).expect("by id");

    assert!(!outcome.created);
    assert_eq!(outcome.document.name, "Henrik");
    assert_eq!(outcome.document.tags, vec!["ferryman"]);
    let entries = std::fs::read_dir(root.join("npcs")).unwrap().count();
    assert_eq!(entries, 1, "no temp files or second card left behind");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn stats_and_unknown_fields_survive_updates() {
    let root = temp_dir("stats_and_unknown_fields_survive_updates");
    let store = CampaignStore::open(&root);
    let slug = NpcSlug::derive("Mira").unwrap();
    std::fs::create_dir_all(root.join("npcs")).unwrap();
    std::fs::write(
        store.npc_path(&slug),
        serde_json::to_string_pretty(&json!({
            "id": "npc-007",
            "name": "Mira",
            "stats": { "hp": 12, "body": 3 },
            "created": "2024-01-01T00:00:00Z",
            "portrait": "mira.png"
        }))
        .unwrap(),
    )
    .unwrap();

    let outcome = store.npc_upsert(&request("Mira", &["healer"])).expect("upsert");
    assert!(!outcome.created);
    assert_eq!(outcome.document.id, "npc-007");
    assert_eq!(outcome.document.stats, json!({ "hp": 12, "body": 3 }));
    assert_eq!(outcome.document.created.as_deref(), Some("2024-01-01T00:00:00Z"));

    let raw = std::fs::read_to_string(store.npc_path(&slug)).unwrap();
    assert!(raw.contains("\n  \"id\": \"npc-007\""), "2-space indent: {raw}");
    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["portrait"], "mira.png");
    assert_eq!(on_disk["firstSeen"], "Session 1, the docks");

    let mut with_stats = request("Mira", &[]);
    let mut patch = Map::new();
    patch.insert("hp".to_string(), json!(9));
    with_stats.stats = Some(patch);
    let outcome = store.npc_upsert(&with_stats).expect("stats upsert");
    assert_eq!(outcome.document.stats, json!({ "hp": 9, "body": 3 }));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn malformed_card_is_an_error_and_left_alone() {
    let root = temp_dir("malformed_card_is_an_error_and_left_alone");
    let store = CampaignStore::open(&root);
    let slug = NpcSlug::derive("Broken").unwrap();
    std::fs::create_dir_all(root.join("npcs")).unwrap();
    std::fs::write(store.npc_path(&slug), "{ not json").unwrap();

    let err = store.npc_upsert(&request("Broken", &[])).unwrap_err();
    assert!(matches!(err, StoreError::MalformedDocument { .. }), "got {err:?}");
    assert_eq!(
        std::fs::read_to_string(store.npc_path(&slug)).unwrap(),
        "{ not json"
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn name_without_slug_characters_is_rejected() {
    let root = temp_dir("name_without_slug_characters_is_rejected");
    let store = CampaignStore::open(&root);

    let err = store.npc_upsert(&request("???", &[])).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
    assert!(!root.join("npcs").exists());

    let _ = std::fs::remove_dir_all(&root);
}
