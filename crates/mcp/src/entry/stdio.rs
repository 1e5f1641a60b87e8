#![forbid(unsafe_code)]

use super::framing::{
    Frame, TransportMode, detect_mode_from_first_line, parse_request, read_content_length_frame,
    read_raw_line, write_frame,
};
use crate::{INVALID_REQUEST, McpServer, SessionLog, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

pub(crate) fn run_stdio(
    server: &mut McpServer,
    session: &mut SessionLog,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    serve(server, &mut reader, &mut stdout, Some(session))?;
    Ok(())
}

/// Request/response loop. One request is handled to completion before the next is read;
/// returns when the input stream closes. Malformed input is answered with a JSON-RPC error
/// and the loop keeps going; only read and write failures on the stream itself end it.
///
/// Framing is detected once from the first non-empty line and then used for every
/// response, so the two styles never interleave on one transport.
pub(crate) fn serve<R: BufRead, W: Write>(
    server: &mut McpServer,
    reader: &mut R,
    writer: &mut W,
    mut session: Option<&mut SessionLog>,
) -> std::io::Result<()> {
    let mut mode: Option<TransportMode> = None;

    loop {
        let Some(raw) = read_raw_line(reader)? else {
            break;
        };
        let line = String::from_utf8_lossy(&raw);

        let current = match mode {
            Some(current) => current,
            None => {
                let Some(detected) = detect_mode_from_first_line(&line) else {
                    continue;
                };
                log::debug!("stdio framing detected: {}", detected.as_str());
                if let Some(session) = session.as_deref_mut() {
                    session.note_mode(detected.as_str());
                }
                mode = Some(detected);
                detected
            }
        };

        // Undecodable bytes reach the JSON parser and come back as a parse error reply.
        let body = match current {
            TransportMode::NewlineJson => {
                let trimmed = raw.trim_ascii();
                if trimmed.is_empty() {
                    continue;
                }
                trimmed.to_vec()
            }
            TransportMode::ContentLength => {
                if line.trim().is_empty() {
                    continue;
                }
                match read_content_length_frame(reader, Some(line.into_owned()))? {
                    Frame::Body(body) => body,
                    Frame::Rejected(reason) => {
                        log::warn!("dropped stdio frame: {reason}");
                        let reply = json_rpc_error(None, INVALID_REQUEST, reason);
                        if let Some(session) = session.as_deref_mut() {
                            session.note_error(reason);
                        }
                        write_frame(writer, current, &reply)?;
                        continue;
                    }
                    Frame::Eof => break,
                }
            }
        };

        let mut tool_name = None;
        let response = match parse_request(&body) {
            Ok(request) => {
                if request.method == "tools/call" {
                    tool_name = request
                        .params
                        .as_ref()
                        .and_then(|params| params.get("name"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                if let Some(session) = session.as_deref_mut() {
                    session.note_request();
                }
                server.handle(request)
            }
            Err(reply) => Some(reply),
        };

        if let Some(response) = response {
            if let Some(session) = session.as_deref_mut() {
                if let Some(name) = &tool_name {
                    let failed = response.pointer("/result/isError").and_then(Value::as_bool);
                    session.note_tool(name, failed != Some(false));
                }
                if let Some(message) = failure_message(&response) {
                    session.note_error(message);
                }
            }
            write_frame(writer, current, &response)?;
        }
    }

    Ok(())
}

fn failure_message(response: &Value) -> Option<&str> {
    if let Some(message) = response.pointer("/error/message").and_then(Value::as_str) {
        return Some(message);
    }
    let result = response.get("result")?;
    if result.get("isError").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    result.pointer("/content/0/text").and_then(Value::as_str)
}
