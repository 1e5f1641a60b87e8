#![forbid(unsafe_code)]

use growth_core::model::{ApplyMode, EventSource, EventType, IssueSource, Severity};
use serde_json::{Value, json};

fn string_array(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub(crate) fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "log_issue",
            "description": "Log a rule issue or bug in the GROWTH repository.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Issue title" },
                    "location": { "type": "string", "description": "Location in rules (e.g., rules/combat.md#anchor)" },
                    "observed": { "type": "string", "description": "What was observed" },
                    "expected": { "type": "string", "description": "What was expected" },
                    "severity": { "type": "string", "enum": Severity::ALL },
                    "tags": string_array("List of tags"),
                    "source": { "type": "string", "enum": IssueSource::ALL, "default": "manual" }
                },
                "required": ["title", "location", "observed", "expected", "severity", "tags"]
            }
        }),
        json!({
            "name": "log_event",
            "description": "Log a campaign event to the events journal.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "event_type": { "type": "string", "enum": EventType::ALL },
                    "actors": string_array("Characters/NPCs involved"),
                    "summary": { "type": "string", "description": "Brief description of the event" },
                    "source": { "type": "string", "enum": EventSource::ALL },
                    "raw_data": { "type": "string", "description": "Raw event data" },
                    "refs": string_array("References to other entities"),
                    "ts": { "type": "string", "description": "ISO timestamp (optional, auto-generated if not provided)" }
                },
                "required": ["event_type", "actors", "summary", "source", "raw_data"]
            }
        }),
        json!({
            "name": "create_npc",
            "description": "Create or update an NPC in the campaign.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "NPC name" },
                    "first_seen": { "type": "string", "description": "Where/when first encountered" },
                    "summary": { "type": "string", "description": "Brief description of the NPC" },
                    "tags": string_array("Descriptive tags"),
                    "notes": { "type": "string", "description": "Additional notes", "default": "" },
                    "npc_id": { "type": "string", "description": "Unique NPC identifier (optional)" },
                    "stats": { "type": "object", "description": "Game statistics laid over the stored ones (optional)" }
                },
                "required": ["name", "first_seen", "summary", "tags"]
            }
        }),
        json!({
            "name": "propose_change",
            "description": "Create a change proposal for GROWTH rules.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Target rule location (e.g., rules/combat.md#anchor)" },
                    "title": { "type": "string", "description": "Proposal title" },
                    "rationale": { "type": "string", "description": "Why this change is needed" },
                    "before": { "type": "string", "description": "Current rule text" },
                    "after": { "type": "string", "description": "Proposed rule text" },
                    "related_issues": string_array("Related issue references")
                },
                "required": ["target", "title", "rationale", "before", "after"]
            }
        }),
        json!({
            "name": "apply_patch",
            "description": "Apply a rule change proposal to the repository.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "proposal_path": { "type": "string", "description": "Proposal file, relative to the GROWTH repository" },
                    "mode": { "type": "string", "enum": ApplyMode::ALL, "default": "staging" }
                },
                "required": ["proposal_path"]
            }
        }),
    ]
}
