//! Ticket, branch and message naming for bump changes

use crate::types::{CommitInfo, FALLBACK_TICKET};

/// Pick the merged commit's issue key belonging to `project_key`
///
/// Falls back to [`FALLBACK_TICKET`] when no linked key mentions the project.
pub fn resolve_ticket(commit: &CommitInfo, project_key: &str) -> String {
    commit
        .tickets()
        .iter()
        .find(|key| key.contains(project_key))
        .cloned()
        .unwrap_or_else(|| FALLBACK_TICKET.to_string())
}

/// Branch carrying the bump; identical for every attempt at the same bump
pub fn branch_name(ticket: &str, merged_repo_name: &str) -> String {
    format!("feature/{ticket}-bump-{merged_repo_name}")
}

/// Commit message for the bump commit
pub fn commit_message(ticket: &str, candidate_name: &str, merged_repo_name: &str) -> String {
    format!("{ticket} = {candidate_name}: [submodule-bot] bump {merged_repo_name}")
}

/// Pull request title
pub fn pr_title(merged_repo_name: &str) -> String {
    format!("Bump {merged_repo_name} version")
}

/// Pull request description
///
/// Names the submodule path, the old and new commits, and the merged
/// commit's summary line and author date when known.
pub fn pr_description(
    merged_repo_name: &str,
    path: &str,
    from: &str,
    commit: &CommitInfo,
) -> String {
    let mut body = format!("Auto PR for bumping {merged_repo_name} version");

    let summary = commit.message.lines().next().unwrap_or_default().trim();
    let target = if commit.display_id.is_empty() {
        &commit.id
    } else {
        &commit.display_id
    };
    body.push_str(&format!("\n\nMoves `{path}` from `{from}` to `{target}`"));
    if !summary.is_empty() {
        body.push_str(&format!(": {summary}"));
    }
    if let Some(at) = commit.authored_at {
        body.push_str(&format!(" (authored {})", at.format("%Y-%m-%d")));
    }
    body
}
