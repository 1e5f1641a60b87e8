#![forbid(unsafe_code)]

use super::StoreError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
pub struct ProposalRequest {
    pub target: String,
    pub title: String,
    pub rationale: String,
    pub before: String,
    pub after: String,
    pub related_issues: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalOutcome {
    pub relative_path: String,
}

#[derive(Serialize)]
struct Frontmatter<'a> {
    status: &'a str,
    target: &'a str,
    title: &'a str,
    created: &'a str,
    related_issues: &'a [String],
}

#[derive(Deserialize)]
struct FrontmatterTarget {
    #[serde(default)]
    target: Option<String>,
}

/// The two pieces `apply_patch` needs out of a proposal file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedProposal {
    pub target: String,
    pub after: String,
}

const AFTER_OPEN: &str = "## After\n\n```\n";
const FENCE_CLOSE: &str = "\n```";

pub fn render_proposal(request: &ProposalRequest, created: &str) -> Result<String, StoreError> {
    let frontmatter = serde_yaml::to_string(&Frontmatter {
        status: "proposed",
        target: &request.target,
        title: &request.title,
        created,
        related_issues: &request.related_issues,
    })?;

    let title = &request.title;
    let rationale = &request.rationale;
    let before = &request.before;
    let after = &request.after;
    Ok(format!(
        "---\n{frontmatter}---\n\n\
# {title}\n\n\
## Rationale\n\n\
{rationale}\n\n\
## Before\n\n\
```\n{before}\n```\n\n\
## After\n\n\
```\n{after}\n```\n\n\
## Diff\n\n\
```diff\n- {before}\n+ {after}\n```\n"
    ))
}

pub fn parse_proposal(content: &str) -> Result<ParsedProposal, StoreError> {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return Err(StoreError::MalformedProposal("missing frontmatter"));
    };
    let Some(end) = rest.find("\n---") else {
        return Err(StoreError::MalformedProposal("unterminated frontmatter"));
    };
    let header: FrontmatterTarget = serde_yaml::from_str(&rest[..end])?;
    let target = header
        .target
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(StoreError::MalformedProposal("frontmatter has no target"))?;

    let Some(open) = content.find(AFTER_OPEN) else {
        return Err(StoreError::MalformedProposal("missing '## After' block"));
    };
    let body = &content[open + AFTER_OPEN.len()..];
    let Some(close) = body.find(FENCE_CLOSE) else {
        return Err(StoreError::MalformedProposal("unterminated '## After' block"));
    };

    Ok(ParsedProposal {
        target,
        after: body[..close].to_string(),
    })
}
