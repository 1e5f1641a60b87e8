#![forbid(unsafe_code)]

use crate::{McpServer, ToolReply};
use serde_json::Value;

use super::{events, issues, npcs, rules};

pub(crate) fn dispatch_tool(server: &mut McpServer, name: &str, args: Value) -> Option<ToolReply> {
    let reply = match name {
        "log_issue" => issues::handle(server, &args),
        "log_event" => events::handle(server, &args),
        "create_npc" => npcs::handle(server, &args),
        "propose_change" => rules::handle_propose(server, &args),
        "apply_patch" => rules::handle_apply(server, &args),
        _ => return None,
    };
    Some(reply)
}
