#![forbid(unsafe_code)]

use std::path::PathBuf;

pub(crate) const DEFAULT_GROWTH_REPO: &str = "GROWTH_Repository";
pub(crate) const DEFAULT_CAMPAIGN_REPO: &str = "Campaign_Data";

/// Resolved once at startup and handed to the server; nothing reads the environment after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) growth_repo: PathBuf,
    pub(crate) campaign_repo: PathBuf,
    pub(crate) state_dir: PathBuf,
}

impl ServerConfig {
    pub(crate) fn from_process() -> Self {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// CLI flag, then environment variable, then the literal default.
    pub(crate) fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let growth_repo = flag_value(args, "--growth-repo")
            .or_else(|| nonempty(env("GROWTH_REPO")))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GROWTH_REPO));
        let campaign_repo = flag_value(args, "--campaign-repo")
            .or_else(|| nonempty(env("CAMPAIGN_REPO")))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAMPAIGN_REPO));
        let state_dir = flag_value(args, "--state-dir")
            .or_else(|| nonempty(env("GROWTH_MCP_STATE_DIR")))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_state_dir(env("XDG_RUNTIME_DIR")));
        Self {
            growth_repo,
            campaign_repo,
            state_dir,
        }
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let mut iter = args.iter();
    let mut found = None;
    while let Some(arg) = iter.next() {
        if arg.as_str() == flag
            && let Some(value) = iter.next()
        {
            found = Some(value.clone());
        } else if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            found = Some(value.to_string());
        }
    }
    found.and_then(|v| nonempty(Some(v)))
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Session and crash records stay out of the data repositories.
fn default_state_dir(xdg_runtime_dir: Option<String>) -> PathBuf {
    let base = xdg_runtime_dir
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(std::env::temp_dir);
    base.join("growth_mcp")
}
