#![forbid(unsafe_code)]

mod support;
use support::*;

use serde_json::json;

fn npc_args(name: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "name": name,
        "first_seen": "Session 1, Riverside market",
        "summary": "Sells maps of questionable accuracy",
        "tags": tags,
    })
}

#[test]
fn log_issue_appends_and_reports_line_numbers() {
    let mut server = Server::start_initialized("log_issue_lines");
    let args = json!({
        "title": "Stamina regen unclear",
        "location": "rules/recovery.md#stamina",
        "observed": "No rate given for short rests",
        "expected": "1 per short rest",
        "severity": "high",
        "tags": ["recovery"],
        "source": "voice"
    });

    let first = server.call_tool(2, "log_issue", args.clone());
    assert!(!is_tool_error(&first));
    assert_eq!(
        extract_tool_text(&first),
        "Issue logged successfully at line 1 in corrections/issues.jsonl"
    );
    let second = server.call_tool(3, "log_issue", args);
    assert_eq!(
        extract_tool_text(&second),
        "Issue logged successfully at line 2 in corrections/issues.jsonl"
    );

    let rows = read_jsonl(&server.growth_dir().join("corrections/issues.jsonl"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["severity"], json!("high"));
    assert_eq!(rows[0]["source"], json!("voice"));
    assert!(rows[0]["ts"].as_str().is_some_and(|ts| ts.contains('T')));
}

#[test]
fn log_issue_rejects_unknown_severity_without_writing() {
    let mut server = Server::start_initialized("log_issue_bad_severity");
    let resp = server.call_tool(
        2,
        "log_issue",
        json!({
            "title": "t",
            "location": "l",
            "observed": "o",
            "expected": "e",
            "severity": "urgent",
            "tags": []
        }),
    );
    assert!(resp.get("error").is_none(), "tool failures are not protocol errors");
    assert!(is_tool_error(&resp));
    assert!(extract_tool_text(&resp).starts_with("Error logging issue: invalid severity 'urgent'"));
    assert!(!server.growth_dir().join("corrections/issues.jsonl").exists());
}

#[test]
fn log_event_keeps_caller_timestamp_and_refs() {
    let mut server = Server::start_initialized("log_event_ts");
    let resp = server.call_tool(
        2,
        "log_event",
        json!({
            "event_type": "ruling",
            "actors": ["GM", "Kira"],
            "summary": "Climbing in armor costs double stamina",
            "source": "oracle",
            "raw_data": "ruling text",
            "refs": ["rules/movement.md#climb"],
            "ts": "2024-05-01T18:30:00Z"
        }),
    );
    assert_eq!(
        extract_tool_text(&resp),
        "Event logged successfully at line 1 in events.jsonl"
    );

    let rows = read_jsonl(&server.campaign_dir().join("events.jsonl"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["type"], json!("ruling"));
    assert_eq!(rows[0]["ts"], json!("2024-05-01T18:30:00Z"));
    assert_eq!(
        rows[0]["data"],
        json!({ "raw": "ruling text", "refs": ["rules/movement.md#climb"] })
    );
}

#[test]
fn create_npc_merges_tags_and_preserves_created() {
    let mut server = Server::start_initialized("create_npc_merge");

    let resp = server.call_tool(2, "create_npc", npc_args("Tomas Reed", &["merchant", "maps"]));
    assert_eq!(
        extract_tool_text(&resp),
        "NPC 'Tomas Reed' created successfully in npcs/tomas-reed.json"
    );
    let path = server.campaign_dir().join("npcs/tomas-reed.json");
    let first = read_json(&path);

    let mut update = npc_args("Tomas Reed", &["maps", "liar"]);
    update["notes"] = json!("Owes the guild money");
    update["stats"] = json!({ "hp": 9 });
    let resp = server.call_tool(3, "create_npc", update);
    assert_eq!(
        extract_tool_text(&resp),
        "NPC 'Tomas Reed' updated successfully in npcs/tomas-reed.json"
    );

    let second = read_json(&path);
    assert_eq!(second["id"], json!("tomas-reed"));
    assert_eq!(second["tags"], json!(["merchant", "maps", "liar"]));
    assert_eq!(second["notes"], json!("Owes the guild money"));
    assert_eq!(second["stats"], json!({ "hp": 9 }));
    assert_eq!(second["created"], first["created"]);
    assert!(second["updated"].is_string());
    assert_eq!(second["firstSeen"], json!("Session 1, Riverside market"));
}

#[test]
fn create_npc_uses_explicit_id_for_the_file_key() {
    let mut server = Server::start_initialized("create_npc_id");
    let mut args = npc_args("Captain Ysolde", &[]);
    args["npc_id"] = json!("Ysolde_The Red");

    let resp = server.call_tool(2, "create_npc", args);
    assert_eq!(
        extract_tool_text(&resp),
        "NPC 'Captain Ysolde' created successfully in npcs/ysolde-the-red.json"
    );
    assert!(server.campaign_dir().join("npcs/ysolde-the-red.json").exists());
}

#[test]
fn create_npc_rejects_names_without_slug_characters() {
    let mut server = Server::start_initialized("create_npc_empty_slug");
    let resp = server.call_tool(2, "create_npc", npc_args("???", &[]));
    assert!(is_tool_error(&resp));
    assert!(extract_tool_text(&resp).starts_with("Error creating NPC: "));
    assert!(!server.campaign_dir().join("npcs").exists());
}

#[test]
fn propose_then_apply_replaces_anchored_section() {
    let mut server = Server::start_initialized("propose_apply");
    let rules_dir = server.growth_dir().join("rules");
    std::fs::create_dir_all(&rules_dir).expect("rules dir");
    std::fs::write(
        rules_dir.join("combat.md"),
        "# Combat\n\n## Grapple\n\nRoll opposed.\n\n## Disarm\n\nRoll vs DC 10.\n",
    )
    .expect("seed rules");

    let resp = server.call_tool(
        2,
        "propose_change",
        json!({
            "target": "rules/combat.md#grapple",
            "title": "Fixed grapple DC",
            "rationale": "Opposed rolls slow the table down",
            "before": "Roll opposed.",
            "after": "Roll vs DC 12.",
            "related_issues": ["issue-7"]
        }),
    );
    let text = extract_tool_text(&resp);
    let proposal_path = text
        .strip_prefix("Change proposal created at ")
        .expect("proposal path")
        .to_string();
    assert!(proposal_path.starts_with("proposals/"));
    assert!(proposal_path.ends_with("-fixed-grapple-dc.md"));

    let resp = server.call_tool(
        3,
        "apply_patch",
        json!({ "proposal_path": proposal_path, "mode": "direct" }),
    );
    assert_eq!(extract_tool_text(&resp), "Patch applied to rules/combat.md");

    let rules = std::fs::read_to_string(rules_dir.join("combat.md")).expect("rules");
    assert!(rules.contains("## Grapple\n\nRoll vs DC 12.\n\n## Disarm"), "{rules}");
    assert!(!rules.contains("Roll opposed."));
}

#[test]
fn apply_patch_stages_when_anchor_is_missing() {
    let mut server = Server::start_initialized("apply_staging");
    let rules_dir = server.growth_dir().join("rules");
    std::fs::create_dir_all(&rules_dir).expect("rules dir");
    std::fs::write(rules_dir.join("magic.md"), "# Magic\n\nNothing yet.\n").expect("seed");

    let resp = server.call_tool(
        2,
        "propose_change",
        json!({
            "target": "rules/magic.md#wards",
            "title": "Add wards",
            "rationale": "Players keep asking",
            "before": "",
            "after": "Wards absorb 5 damage."
        }),
    );
    let text = extract_tool_text(&resp);
    let proposal_path = text
        .strip_prefix("Change proposal created at ")
        .expect("proposal path")
        .to_string();

    let resp = server.call_tool(3, "apply_patch", json!({ "proposal_path": proposal_path.clone() }));
    assert_eq!(
        extract_tool_text(&resp),
        "Anchor not found; wrote section to staging/rules-magic.md-wards.md"
    );
    let staged = std::fs::read_to_string(server.growth_dir().join("staging/rules-magic.md-wards.md"))
        .expect("staged section");
    assert_eq!(staged, "Wards absorb 5 damage.");

    let resp = server.call_tool(
        4,
        "apply_patch",
        json!({ "proposal_path": proposal_path, "mode": "direct" }),
    );
    assert!(is_tool_error(&resp));
    assert!(extract_tool_text(&resp).starts_with("Error applying patch: "));
}

#[test]
fn apply_patch_refuses_paths_outside_the_repository() {
    let mut server = Server::start_initialized("apply_escape");
    let resp = server.call_tool(2, "apply_patch", json!({ "proposal_path": "../outside.md" }));
    assert!(is_tool_error(&resp));
    assert!(extract_tool_text(&resp).starts_with("Error applying patch: "));
}
