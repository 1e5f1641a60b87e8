#![forbid(unsafe_code)]

use super::ToolError;
use crate::{
    McpServer, ToolReply, args_object, optional_nonblank_string, optional_object,
    optional_string, require_string, require_string_array,
};
use growth_storage::{NpcUpsertOutcome, NpcUpsertRequest};
use serde_json::Value;

pub(super) fn handle(server: &mut McpServer, args: &Value) -> ToolReply {
    match create_npc(server, args) {
        Ok(outcome) => {
            let verb = if outcome.created { "created" } else { "updated" };
            ToolReply::ok(format!(
                "NPC '{}' {verb} successfully in {}",
                outcome.document.name, outcome.relative_path
            ))
        }
        Err(err) => ToolReply::error("Error creating NPC", &err),
    }
}

fn create_npc(server: &McpServer, args: &Value) -> Result<NpcUpsertOutcome, ToolError> {
    let args = args_object(args)?;
    let request = NpcUpsertRequest {
        id: optional_nonblank_string(args, "npc_id")?,
        name: require_string(args, "name")?,
        first_seen: require_string(args, "first_seen")?,
        summary: require_string(args, "summary")?,
        tags: require_string_array(args, "tags")?,
        notes: optional_string(args, "notes")?.unwrap_or_default(),
        stats: optional_object(args, "stats")?,
    };
    Ok(server.campaign().npc_upsert(&request)?)
}
