#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub(crate) const SESSION_LOG_FILE: &str = "growth_mcp_last_session.txt";

const MAX_ERROR_CHARS: usize = 300;

/// Latest session as `key=value` lines, rewritten on every change. Records which repositories
/// were served and how the tool calls went; never argument values.
#[derive(Debug)]
pub(crate) struct SessionLog {
    path: PathBuf,
    header: String,
    mode: Option<&'static str>,
    requests: u64,
    tool_calls: u64,
    tool_errors: u64,
    last_tool: Option<(String, bool)>,
    last_error: Option<String>,
    exit: Option<String>,
}

impl SessionLog {
    pub(crate) fn new(cfg: &crate::ServerConfig) -> Self {
        let mut header = String::new();
        let _ = writeln!(header, "started={}", growth_storage::now_rfc3339());
        let _ = writeln!(header, "pid={}", std::process::id());
        let _ = writeln!(header, "version={}", crate::version_line());
        let _ = writeln!(header, "growth_repo={}", cfg.growth_repo.display());
        let _ = writeln!(header, "campaign_repo={}", cfg.campaign_repo.display());

        let this = Self {
            path: cfg.state_dir.join(SESSION_LOG_FILE),
            header,
            mode: None,
            requests: 0,
            tool_calls: 0,
            tool_errors: 0,
            last_tool: None,
            last_error: None,
            exit: None,
        };
        this.flush();
        this
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn note_mode(&mut self, mode: &'static str) {
        self.mode = Some(mode);
        self.flush();
    }

    pub(crate) fn note_request(&mut self) {
        self.requests += 1;
        self.flush();
    }

    /// One finished `tools/call`; `failed` mirrors the reply's `isError`.
    pub(crate) fn note_tool(&mut self, name: &str, failed: bool) {
        self.tool_calls += 1;
        if failed {
            self.tool_errors += 1;
        }
        self.last_tool = Some((name.chars().take(64).collect(), failed));
        self.flush();
    }

    pub(crate) fn note_error(&mut self, error: &str) {
        let error = error.trim();
        if error.is_empty() {
            return;
        }
        self.last_error = Some(error.chars().take(MAX_ERROR_CHARS).collect());
        self.flush();
    }

    pub(crate) fn note_exit(&mut self, reason: &str) {
        self.exit = Some(reason.trim().to_string());
        self.flush();
    }

    fn render(&self) -> String {
        let mut out = self.header.clone();
        if let Some(mode) = self.mode {
            let _ = writeln!(out, "mode={mode}");
        }
        let _ = writeln!(out, "requests={}", self.requests);
        let _ = writeln!(out, "tool_calls={} tool_errors={}", self.tool_calls, self.tool_errors);
        if let Some((name, failed)) = &self.last_tool {
            let outcome = if *failed { "error" } else { "ok" };
            let _ = writeln!(out, "last_tool={name} ({outcome})");
        }
        if let Some(err) = &self.last_error {
            let _ = writeln!(out, "last_error={err}");
        }
        if let Some(exit) = &self.exit {
            let _ = writeln!(out, "exit={exit}");
        }
        out
    }

    fn flush(&self) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(err) = std::fs::write(&self.path, self.render()) {
            log::debug!("session log not written to {}: {err}", self.path.display());
        }
    }
}
