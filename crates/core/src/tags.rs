#![forbid(unsafe_code)]

use std::collections::HashSet;

/// Drops repeated tags, keeping the first occurrence of each.
pub fn dedupe_tags(tags: &[String]) -> Vec<String> {
    merge_tags(&[], tags)
}

/// Set union of stored and incoming tags. Stored order wins; new tags follow in the order
/// they were given.
pub fn merge_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(existing.len() + incoming.len());
    let mut out = Vec::with_capacity(existing.len() + incoming.len());
    for tag in existing.iter().chain(incoming) {
        if seen.insert(tag.as_str()) {
            out.push(tag.clone());
        }
    }
    out
}
