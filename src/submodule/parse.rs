//! Parsers for git submodule command output

use crate::types::{SubmoduleDeclaration, SubmoduleStatus};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// Key pattern passed to `git config --get-regexp` to list path and url keys
pub const SUBMODULE_KEY_PATTERN: &str = r"^submodule\..*\.(path|url)$";

static CONFIG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^submodule\.(.+)\.(path|url)\s+(.+)$").expect("hardcoded regex is valid")
});

#[derive(Default)]
struct PartialDeclaration {
    path: Option<String>,
    url: Option<String>,
}

/// Parse `git config --file .gitmodules --get-regexp` output into declarations
///
/// Lines look like `submodule.<name>.path <value>` or
/// `submodule.<name>.url <value>`. Entries are grouped by name; a declaration
/// without a path is dropped.
pub fn parse_declarations<S: AsRef<str>>(lines: &[S]) -> Vec<SubmoduleDeclaration> {
    let mut by_name: BTreeMap<String, PartialDeclaration> = BTreeMap::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let Some(caps) = CONFIG_LINE.captures(line) else {
            debug!("Ignoring unrecognised submodule config line: {line}");
            continue;
        };

        let entry = by_name.entry(caps[1].to_string()).or_default();
        let value = caps[3].trim().to_string();
        match &caps[2] {
            "path" => entry.path = Some(value),
            _ => entry.url = Some(value),
        }
    }

    by_name
        .into_iter()
        .filter_map(|(name, partial)| {
            partial.path.map(|path| SubmoduleDeclaration {
                name,
                path,
                url: partial.url.unwrap_or_default(),
            })
        })
        .collect()
}

/// Parse `git submodule status` output
///
/// Each line is `<flag><commit> <path> (<describe>)`, where the flag is a
/// space for a clean submodule, `+` for a checked-out commit that differs
/// from the index, `-` for an uninitialized one and `U` for merge conflicts.
pub fn parse_status<S: AsRef<str>>(lines: &[S]) -> Vec<SubmoduleStatus> {
    lines
        .iter()
        .filter_map(|line| {
            let line = line.as_ref();
            let mut chars = line.chars();
            let flag = chars.next()?;
            let mut tokens = chars.as_str().split_whitespace();
            let commit = tokens.next()?;
            let path = tokens.next()?;
            Some(SubmoduleStatus {
                flag,
                commit: commit.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}
