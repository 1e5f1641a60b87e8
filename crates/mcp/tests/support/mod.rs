#![forbid(unsafe_code)]
#![allow(dead_code)]

use serde_json::Value;
use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Framing {
    NewlineJson,
    ContentLength,
}

/// A spawned `growth_mcp` with its own rules, campaign and state directories.
pub(crate) struct Server {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    framing: Framing,
    root: PathBuf,
}

impl Server {
    pub(crate) fn start(test_name: &str) -> Self {
        Self::start_with_framing(test_name, Framing::NewlineJson)
    }

    pub(crate) fn start_with_framing(test_name: &str, framing: Framing) -> Self {
        let root = temp_dir(test_name);
        let mut child = Command::new(env!("CARGO_BIN_EXE_growth_mcp"))
            .env("GROWTH_REPO", root.join("growth"))
            .env("CAMPAIGN_REPO", root.join("campaign"))
            .env("GROWTH_MCP_STATE_DIR", root.join("state"))
            .env("RUST_LOG", "off")
            .current_dir(&root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn growth_mcp");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = BufReader::new(child.stdout.take().expect("stdout"));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            framing,
            root,
        }
    }

    pub(crate) fn start_initialized(test_name: &str) -> Self {
        let mut server = Self::start(test_name);
        server.initialize_default();
        server
    }

    pub(crate) fn growth_dir(&self) -> PathBuf {
        self.root.join("growth")
    }

    pub(crate) fn campaign_dir(&self) -> PathBuf {
        self.root.join("campaign")
    }

    pub(crate) fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub(crate) fn send(&mut self, req: Value) {
        let body = serde_json::to_vec(&req).expect("serialize request");
        self.send_raw(&body);
    }

    pub(crate) fn send_raw(&mut self, body: &[u8]) {
        let stdin = self.stdin.as_mut().expect("stdin open");
        match self.framing {
            Framing::NewlineJson => {
                stdin.write_all(body).expect("write request");
                stdin.write_all(b"\n").expect("write newline");
            }
            Framing::ContentLength => {
                write!(stdin, "Content-Length: {}\r\n\r\n", body.len()).expect("write header");
                stdin.write_all(body).expect("write body");
            }
        }
        stdin.flush().expect("flush request");
    }

    pub(crate) fn recv(&mut self) -> Value {
        match self.framing {
            Framing::NewlineJson => {
                let mut line = String::new();
                self.stdout.read_line(&mut line).expect("read response");
                assert!(!line.trim().is_empty(), "empty response line");
                serde_json::from_str(&line).expect("parse response json")
            }
            Framing::ContentLength => {
                let mut content_length: Option<usize> = None;
                loop {
                    let mut line = String::new();
                    let read = self.stdout.read_line(&mut line).expect("read header line");
                    assert!(read > 0, "unexpected EOF reading response headers");
                    let trimmed = line.trim_end();
                    if trimmed.is_empty() {
                        break;
                    }
                    if let Some((key, value)) = trimmed.split_once(':')
                        && key.trim().eq_ignore_ascii_case("content-length")
                    {
                        content_length =
                            Some(value.trim().parse::<usize>().expect("content-length"));
                    }
                }
                let len = content_length.expect("missing Content-Length in response");
                let mut buf = vec![0u8; len];
                self.stdout.read_exact(&mut buf).expect("read response body");
                serde_json::from_slice(&buf).expect("parse response json")
            }
        }
    }

    pub(crate) fn request(&mut self, req: Value) -> Value {
        self.send(req);
        self.recv()
    }

    pub(crate) fn call_tool(&mut self, id: i64, name: &str, arguments: Value) -> Value {
        self.request(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }))
    }

    pub(crate) fn initialize_default(&mut self) {
        let _ = self.request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": { "protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": { "name": "test", "version": "0" } }
        }));
        self.send(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {}
        }));
    }

    /// Closes stdin and waits for the server to exit on its own.
    pub(crate) fn close_stdin_and_wait(&mut self) -> std::process::ExitStatus {
        drop(self.stdin.take());
        self.child.wait().expect("wait growth_mcp")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("growth_mcp_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn extract_tool_text(resp: &Value) -> String {
    resp.get("result")
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("text"))
        .and_then(|v| v.as_str())
        .expect("result.content[0].text")
        .to_string()
}

pub(crate) fn is_tool_error(resp: &Value) -> bool {
    resp.get("result")
        .and_then(|v| v.get("isError"))
        .and_then(|v| v.as_bool())
        .expect("result.isError")
}

pub(crate) fn assert_json_rpc_error(resp: &Value, expected_code: i64) {
    let code = resp
        .get("error")
        .and_then(|v| v.get("code"))
        .and_then(|v| v.as_i64())
        .expect("error.code");
    assert_eq!(code, expected_code);
}

pub(crate) fn read_jsonl(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .expect("read jsonl")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("jsonl line"))
        .collect()
}

pub(crate) fn read_json(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path).expect("read json");
    serde_json::from_str(&raw).expect("parse json")
}
