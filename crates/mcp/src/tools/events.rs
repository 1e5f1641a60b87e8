#![forbid(unsafe_code)]

use super::ToolError;
use crate::{
    McpServer, ToolReply, args_object, optional_nonblank_string, optional_string_array,
    require_string, require_string_array,
};
use growth_core::model::{EventSource, EventType};
use growth_storage::{EVENTS_LOG, EventData, EventRecord};
use serde_json::Value;

pub(super) fn handle(server: &mut McpServer, args: &Value) -> ToolReply {
    match log_event(server, args) {
        Ok(line) => ToolReply::ok(format!(
            "Event logged successfully at line {line} in {EVENTS_LOG}"
        )),
        Err(err) => ToolReply::error("Error logging event", &err),
    }
}

fn log_event(server: &McpServer, args: &Value) -> Result<usize, ToolError> {
    let args = args_object(args)?;
    let record = EventRecord {
        event_type: EventType::parse(&require_string(args, "event_type")?)?,
        actors: require_string_array(args, "actors")?,
        summary: require_string(args, "summary")?,
        source: EventSource::parse(&require_string(args, "source")?)?,
        data: EventData {
            raw: require_string(args, "raw_data")?,
            refs: optional_string_array(args, "refs")?.unwrap_or_default(),
        },
        // Caller-supplied timestamps are kept verbatim; blank means "stamp it now".
        ts: optional_nonblank_string(args, "ts")?,
    };
    Ok(server.campaign().log_event(&record)?)
}
