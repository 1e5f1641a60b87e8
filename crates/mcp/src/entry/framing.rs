#![forbid(unsafe_code)]

use crate::{INVALID_REQUEST, JsonRpcRequest, PARSE_ERROR, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, Read, Write};

const MAX_CONTENT_LENGTH_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransportMode {
    NewlineJson,
    ContentLength,
}

impl TransportMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::NewlineJson => "newline_json",
            Self::ContentLength => "content_length",
        }
    }
}

pub(crate) fn detect_mode_from_first_line(line: &str) -> Option<TransportMode> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(TransportMode::NewlineJson);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("content-length:") || lower.starts_with("content-type:") {
        return Some(TransportMode::ContentLength);
    }
    None
}

pub(crate) fn parse_content_length_header(line: &str) -> Option<usize> {
    let (key, value) = line.trim().split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

/// One `Content-Length` frame off the wire.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    Body(Vec<u8>),
    /// The frame was consumed but cannot be handled; the loop answers and keeps reading.
    Rejected(&'static str),
    Eof,
}

/// Reads one raw line including its `\n`. `Ok(None)` on EOF.
pub(crate) fn read_raw_line<R: BufRead>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

/// Reads headers up to the blank separator line, then the body.
///
/// Headers are decoded lossily; a frame with no usable length or one over the size cap is
/// skipped and reported as `Rejected`.
pub(crate) fn read_content_length_frame<R: BufRead>(
    reader: &mut R,
    first_header: Option<String>,
) -> std::io::Result<Frame> {
    let mut header = match first_header {
        Some(seed) => seed,
        None => match read_raw_line(reader)? {
            Some(raw) => String::from_utf8_lossy(&raw).into_owned(),
            None => return Ok(Frame::Eof),
        },
    };

    let mut content_length = parse_content_length_header(&header);
    while !header.trim_end().is_empty() {
        header = match read_raw_line(reader)? {
            Some(raw) => String::from_utf8_lossy(&raw).into_owned(),
            None => return Ok(Frame::Eof),
        };
        if content_length.is_none() {
            content_length = parse_content_length_header(&header);
        }
    }

    let Some(len) = content_length else {
        return Ok(Frame::Rejected("Missing Content-Length header"));
    };
    if len > MAX_CONTENT_LENGTH_BYTES {
        let mut rest = Read::take(&mut *reader, len as u64);
        let skipped = std::io::copy(&mut rest, &mut std::io::sink())?;
        if skipped < len as u64 {
            return Ok(Frame::Eof);
        }
        return Ok(Frame::Rejected("Content-Length exceeds max allowed size"));
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body) {
        Ok(()) => Ok(Frame::Body(body)),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(Frame::Eof),
        Err(err) => Err(err),
    }
}

pub(crate) fn write_frame<W: Write>(
    writer: &mut W,
    mode: TransportMode,
    resp: &Value,
) -> std::io::Result<()> {
    let body = serde_json::to_vec(resp)?;
    match mode {
        TransportMode::NewlineJson => {
            writer.write_all(&body)?;
            writer.write_all(b"\n")?;
        }
        TransportMode::ContentLength => {
            write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
            writer.write_all(&body)?;
        }
    }
    writer.flush()
}

/// Decodes one request body; the error side is the ready-made JSON-RPC error reply.
pub(crate) fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, Value> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| json_rpc_error(None, PARSE_ERROR, &format!("Parse error: {e}")))?;

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => return Err(json_rpc_error(None, INVALID_REQUEST, "Invalid Request")),
    };
    if !has_method {
        return Err(json_rpc_error(id, INVALID_REQUEST, "Invalid Request"));
    }

    serde_json::from_value::<JsonRpcRequest>(data)
        .map_err(|e| json_rpc_error(id, INVALID_REQUEST, &format!("Invalid Request: {e}")))
}
