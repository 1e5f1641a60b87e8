#![forbid(unsafe_code)]

/// Level of an ATX heading (`## Title` -> 2). Hashes must be followed by whitespace.
pub fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|ch| *ch == '#').count();
    if hashes == 0 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.chars().next().is_some_and(char::is_whitespace) {
        Some(hashes)
    } else {
        None
    }
}

/// Index and level of the first heading whose text contains `anchor`, ignoring case.
pub fn find_anchor_heading(content: &str, anchor: &str) -> Option<(usize, usize)> {
    let needle = normalize_anchor(anchor);
    if needle.is_empty() {
        return None;
    }
    content.split('\n').enumerate().find_map(|(index, line)| {
        let level = heading_level(line)?;
        let text = line[level..].trim_start().to_lowercase();
        text.contains(&needle).then_some((index, level))
    })
}

/// Replaces the body of the section opened by the anchored heading.
///
/// The heading line is kept; the body runs until the next heading of the same or a higher
/// level (or the end of the document) and becomes a blank line, the trimmed new body, and
/// another blank line. Returns `None` when no heading matches.
pub fn replace_anchor_section(content: &str, anchor: &str, new_body: &str) -> Option<String> {
    let (start, level) = find_anchor_heading(content, anchor)?;
    let lines = content.split('\n').collect::<Vec<_>>();
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| heading_level(line).is_some_and(|l| l <= level))
        .map(|(index, _)| index)
        .unwrap_or(lines.len());

    let mut out = Vec::with_capacity(lines.len() + 3);
    out.extend_from_slice(&lines[..=start]);
    out.push("");
    out.push(new_body.trim());
    out.push("");
    out.extend_from_slice(&lines[end..]);
    Some(out.join("\n"))
}

/// Anchors may arrive with a leading `#` (`rules/combat.md#initiative`).
pub fn normalize_anchor(anchor: &str) -> String {
    anchor.trim().trim_start_matches('#').trim().to_lowercase()
}
