#![forbid(unsafe_code)]

mod entry;
mod server;
mod support;
mod tools;

pub(crate) use support::*;

use growth_storage::{CampaignStore, GrowthStore};
use std::fmt::Write as _;

// Baseline protocol version; `initialize` echoes the client's version when it sends one.
const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "growth-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const CRASH_FILE: &str = "growth_mcp_last_crash.txt";

fn write_last_crash(state_dir: &std::path::Path, kind: &str, detail: &str) {
    let _ = std::fs::create_dir_all(state_dir);
    let path = state_dir.join(CRASH_FILE);

    let mut out = String::new();
    let _ = writeln!(out, "ts={}", growth_storage::now_rfc3339());
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "kind={kind}");
    let _ = writeln!(out, "version={}", version_line());
    let _ = writeln!(out, "args={:?}", std::env::args().collect::<Vec<_>>());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(state_dir: std::path::PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&state_dir, "panic", &detail);
        default_hook(info);
    }));
}

pub(crate) struct McpServer {
    initialized: bool,
    growth: GrowthStore,
    campaign: CampaignStore,
}

fn usage() -> &'static str {
    "growth_mcp: GROWTH rules and campaign companion MCP server (stdio)\n\n\
USAGE:\n\
  growth_mcp [--growth-repo DIR] [--campaign-repo DIR] [--state-dir DIR]\n\
\n\
ENVIRONMENT:\n\
  GROWTH_REPO            Rules repository (issues, proposals). Default: ./GROWTH_Repository\n\
  CAMPAIGN_REPO          Campaign data (events, NPCs). Default: ./Campaign_Data\n\
  GROWTH_MCP_STATE_DIR   Session/crash records. Default: $XDG_RUNTIME_DIR/growth_mcp\n\
  RUST_LOG               stderr log filter (default: info)\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n"
}

pub(crate) fn version_line() -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    format!("growth_mcp {SERVER_VERSION} ({profile})")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let dotenv = dotenvy::dotenv();

    // stdout carries the protocol; diagnostics go to stderr only.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Ok(path) = dotenv {
        log::info!("loaded environment from {}", path.display());
    }

    let config = ServerConfig::from_process();
    install_crash_reporter(config.state_dir.clone());
    let mut session = SessionLog::new(&config);
    log::info!(
        "{} starting: growth_repo={} campaign_repo={} session_log={}",
        version_line(),
        config.growth_repo.display(),
        config.campaign_repo.display(),
        session.path().display()
    );

    let mut server = McpServer::new(&config);
    let result = entry::run_stdio(&mut server, &mut session);
    match &result {
        Ok(()) => {
            session.note_exit("stdin closed");
            log::info!("stdin closed, exiting");
        }
        Err(err) => {
            session.note_exit(&format!("error: {err}"));
            log::error!("transport failed: {err}");
            write_last_crash(&config.state_dir, "error", &format!("{err:?}"));
        }
    }
    result
}
