//! Submodule discovery
//!
//! Parses `.gitmodules` and `git submodule status` output and picks the
//! submodule that corresponds to a merged repository.

mod locate;
mod parse;

pub use locate::{find_status, locate};
pub use parse::{parse_declarations, parse_status, SUBMODULE_KEY_PATTERN};
