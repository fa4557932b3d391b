//! Matching declared submodules to a merged repository

use crate::types::{SubmoduleDeclaration, SubmoduleStatus};
use tracing::debug;

/// Find the declared submodule that refers to `merged_repo_name`
///
/// A declaration matches when its URL or path contains the repository name
/// as a literal, case-sensitive substring, so `foo` matches both
/// `.../foo.git` and `.../foo-shared.git`. Returns `None` unless exactly one
/// declaration matches.
pub fn locate<'a>(
    declarations: &'a [SubmoduleDeclaration],
    merged_repo_name: &str,
) -> Option<&'a SubmoduleDeclaration> {
    let mut matches = declarations
        .iter()
        .filter(|d| d.url.contains(merged_repo_name) || d.path.contains(merged_repo_name));

    let first = matches.next()?;
    if matches.next().is_some() {
        debug!("Multiple submodules match {merged_repo_name}, not picking one");
        return None;
    }
    Some(first)
}

/// Find the status entry for a declared submodule path
pub fn find_status<'a>(
    statuses: &'a [SubmoduleStatus],
    path: &str,
) -> Option<&'a SubmoduleStatus> {
    let path = path.trim_end_matches('/');
    statuses
        .iter()
        .find(|s| s.path.trim_end_matches('/') == path)
}
