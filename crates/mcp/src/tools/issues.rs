#![forbid(unsafe_code)]

use super::ToolError;
use crate::{McpServer, ToolReply, args_object, optional_string, require_string, require_string_array};
use growth_core::model::{IssueSource, Severity};
use growth_core::tags::dedupe_tags;
use growth_storage::{ISSUES_LOG, IssueRecord};
use serde_json::Value;

pub(super) fn handle(server: &mut McpServer, args: &Value) -> ToolReply {
    match log_issue(server, args) {
        Ok(line) => ToolReply::ok(format!(
            "Issue logged successfully at line {line} in {ISSUES_LOG}"
        )),
        Err(err) => ToolReply::error("Error logging issue", &err),
    }
}

fn log_issue(server: &McpServer, args: &Value) -> Result<usize, ToolError> {
    let args = args_object(args)?;
    let record = IssueRecord {
        title: require_string(args, "title")?,
        location: require_string(args, "location")?,
        observed: require_string(args, "observed")?,
        expected: require_string(args, "expected")?,
        severity: Severity::parse(&require_string(args, "severity")?)?,
        tags: dedupe_tags(&require_string_array(args, "tags")?),
        source: match optional_string(args, "source")? {
            Some(raw) => IssueSource::parse(&raw)?,
            None => IssueSource::default(),
        },
        ts: None,
    };
    Ok(server.growth().log_issue(&record)?)
}
