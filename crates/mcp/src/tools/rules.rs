#![forbid(unsafe_code)]

use super::ToolError;
use crate::{
    McpServer, ToolReply, args_object, optional_string, optional_string_array, require_string,
};
use growth_core::model::ApplyMode;
use growth_storage::{ApplyPatchOutcome, ApplyPatchRequest, ProposalRequest};
use serde_json::Value;

pub(super) fn handle_propose(server: &mut McpServer, args: &Value) -> ToolReply {
    match propose_change(server, args) {
        Ok(path) => ToolReply::ok(format!("Change proposal created at {path}")),
        Err(err) => ToolReply::error("Error proposing change", &err),
    }
}

fn propose_change(server: &McpServer, args: &Value) -> Result<String, ToolError> {
    let args = args_object(args)?;
    let request = ProposalRequest {
        target: require_string(args, "target")?,
        title: require_string(args, "title")?,
        rationale: require_string(args, "rationale")?,
        before: require_string(args, "before")?,
        after: require_string(args, "after")?,
        related_issues: optional_string_array(args, "related_issues")?.unwrap_or_default(),
    };
    Ok(server.growth().propose_change(&request)?.relative_path)
}

pub(super) fn handle_apply(server: &mut McpServer, args: &Value) -> ToolReply {
    match apply_patch(server, args) {
        Ok(ApplyPatchOutcome::Applied { changed_file }) => {
            ToolReply::ok(format!("Patch applied to {changed_file}"))
        }
        Ok(ApplyPatchOutcome::Staged { staging_file }) => {
            ToolReply::ok(format!("Anchor not found; wrote section to {staging_file}"))
        }
        Err(err) => ToolReply::error("Error applying patch", &err),
    }
}

fn apply_patch(server: &McpServer, args: &Value) -> Result<ApplyPatchOutcome, ToolError> {
    let args = args_object(args)?;
    let request = ApplyPatchRequest {
        proposal_path: require_string(args, "proposal_path")?,
        mode: match optional_string(args, "mode")? {
            Some(raw) => ApplyMode::parse(&raw)?,
            None => ApplyMode::default(),
        },
    };
    Ok(server.growth().apply_patch(&request)?)
}
