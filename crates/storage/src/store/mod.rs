#![forbid(unsafe_code)]

mod error;
mod fs;
mod jsonl;
mod npc;
mod proposals;
mod records;

pub use error::StoreError;
pub use fs::{now_rfc3339, today};
pub use jsonl::{append_jsonl, count_records, read_jsonl};
pub use npc::{NpcDocument, NpcUpsertOutcome, NpcUpsertRequest};
pub use proposals::{ParsedProposal, ProposalOutcome, ProposalRequest, parse_proposal, render_proposal};
pub use records::{EventData, EventRecord, IssueRecord};

use growth_core::ids::{NpcSlug, title_slug};
use growth_core::markdown::{normalize_anchor, replace_anchor_section};
use growth_core::model::ApplyMode;
use std::path::{Path, PathBuf};

pub const ISSUES_LOG: &str = "corrections/issues.jsonl";
pub const EVENTS_LOG: &str = "events.jsonl";
pub const NPC_DIR: &str = "npcs";
pub const PROPOSALS_DIR: &str = "proposals";
pub const STAGING_DIR: &str = "staging";

/// The rules repository (`GROWTH_REPO`): issue log, proposals, rule files.
#[derive(Clone, Debug)]
pub struct GrowthStore {
    root: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ApplyPatchRequest {
    pub proposal_path: String,
    pub mode: ApplyMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyPatchOutcome {
    Applied { changed_file: String },
    Staged { staging_file: String },
}

impl GrowthStore {
    /// Nothing is touched on disk until the first write.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn issues_path(&self) -> PathBuf {
        self.root.join(ISSUES_LOG)
    }

    pub fn log_issue(&self, record: &IssueRecord) -> Result<usize, StoreError> {
        append_jsonl(&self.issues_path(), record)
    }

    pub fn propose_change(&self, request: &ProposalRequest) -> Result<ProposalOutcome, StoreError> {
        let slug = title_slug(&request.title);
        if slug.is_empty() {
            return Err(StoreError::InvalidInput(
                "title must contain at least one letter or digit".to_string(),
            ));
        }
        let relative_path = format!("{PROPOSALS_DIR}/{}-{slug}.md", today());
        let body = render_proposal(request, &now_rfc3339())?;
        fs::write_atomic(&self.root.join(&relative_path), body.as_bytes())?;
        Ok(ProposalOutcome { relative_path })
    }

    pub fn apply_patch(&self, request: &ApplyPatchRequest) -> Result<ApplyPatchOutcome, StoreError> {
        let proposal_path = fs::resolve_within(&self.root, &request.proposal_path)?;
        let content = std::fs::read_to_string(&proposal_path)
            .map_err(StoreError::io(&proposal_path))?;
        let proposal = parse_proposal(&content)?;

        let Some((target_file, raw_anchor)) = proposal.target.split_once('#') else {
            return Err(StoreError::MalformedProposal("target has no #anchor"));
        };
        let anchor = normalize_anchor(raw_anchor);
        if anchor.is_empty() {
            return Err(StoreError::MalformedProposal("target has an empty anchor"));
        }
        let target_file = target_file.trim();
        let target_path = fs::resolve_within(&self.root, target_file)?;
        let rules = std::fs::read_to_string(&target_path).map_err(StoreError::io(&target_path))?;

        if let Some(updated) = replace_anchor_section(&rules, &anchor, &proposal.after) {
            fs::write_atomic(&target_path, updated.as_bytes())?;
            return Ok(ApplyPatchOutcome::Applied {
                changed_file: target_file.to_string(),
            });
        }

        match request.mode {
            ApplyMode::Direct => Err(StoreError::AnchorNotFound {
                file: target_file.to_string(),
                anchor,
            }),
            ApplyMode::Staging => {
                let staging_file = staging_file_name(target_file, raw_anchor)?;
                let staging_path = fs::resolve_within(&self.root, &staging_file)?;
                fs::write_atomic(&staging_path, proposal.after.as_bytes())?;
                Ok(ApplyPatchOutcome::Staged { staging_file })
            }
        }
    }
}

/// `staging/<target with separators as '-'>-<anchor>.md`, keeping the anchor's spelling.
///
/// The anchor is reduced to letters, digits, `-` and `_` (whitespace becomes `-`), so the
/// name is always a single path component under `staging/`.
fn staging_file_name(target_file: &str, raw_anchor: &str) -> Result<String, StoreError> {
    let flattened = target_file.replace(['/', '\\'], "-");
    let anchor = raw_anchor
        .trim()
        .trim_start_matches('#')
        .trim()
        .chars()
        .map(|ch| if ch.is_whitespace() { '-' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_'))
        .collect::<String>();
    if anchor.is_empty() {
        return Err(StoreError::MalformedProposal(
            "anchor has no characters usable in a file name",
        ));
    }
    Ok(format!("{STAGING_DIR}/{flattened}-{anchor}.md"))
}

/// The campaign data repository (`CAMPAIGN_REPO`): event journal and NPC cards.
#[derive(Clone, Debug)]
pub struct CampaignStore {
    root: PathBuf,
}

impl CampaignStore {
    /// Nothing is touched on disk until the first write.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.join(EVENTS_LOG)
    }

    pub fn npc_path(&self, slug: &NpcSlug) -> PathBuf {
        self.root.join(NPC_DIR).join(slug.file_name())
    }

    pub fn log_event(&self, record: &EventRecord) -> Result<usize, StoreError> {
        append_jsonl(&self.events_path(), record)
    }

    pub fn npc_get(&self, slug: &NpcSlug) -> Result<Option<NpcDocument>, StoreError> {
        npc::load_npc(&self.npc_path(slug))
    }

    /// Read-merge-write of one NPC card. Not guarded against a concurrent writer on the
    /// same slug; the last rename wins.
    pub fn npc_upsert(&self, request: &NpcUpsertRequest) -> Result<NpcUpsertOutcome, StoreError> {
        let slug = request.slug()?;
        let path = self.npc_path(&slug);
        let existing = npc::load_npc(&path)?;
        let created = existing.is_none();
        let document = NpcDocument::merge(existing, request, &slug, &now_rfc3339());
        npc::save_npc(&path, &document)?;
        Ok(NpcUpsertOutcome {
            relative_path: format!("{NPC_DIR}/{}", slug.file_name()),
            slug,
            created,
            document,
        })
    }
}
