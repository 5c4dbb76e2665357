//! Unified line diffs and change counting.

use std::fmt;

use serde::Serialize;
use similar::TextDiff;

/// Added and removed line counts of a patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    pub added: usize,
    pub removed: usize,
}

impl fmt::Display for LineCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}/-{}", self.added, self.removed)
    }
}

/// Unified diff of `old` against `new` with three lines of context.
///
/// Line endings are significant: a CRLF line differs from its LF twin.
/// Returns an empty string when the texts are equal.
pub fn unified_diff(old: &str, new: &str, old_header: &str, new_header: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(old_header, new_header)
        .context_radius(3)
        .to_string()
}

/// Diff a template source against the file generated from it.
///
/// Headers read `template/<source_path>` and `<output_path>`.
pub fn source_diff(template: &str, app: &str, source_path: &str, output_path: &str) -> String {
    unified_diff(template, app, &format!("template/{source_path}"), output_path)
}

/// Count `+` and `-` lines of a patch, ignoring the `+++` / `---` file headers.
pub fn count_changes(patch: &str) -> LineCounts {
    patch.lines().fold(LineCounts::default(), |mut counts, line| {
        if line.starts_with("+++") || line.starts_with("---") {
            return counts;
        }
        if line.starts_with('+') {
            counts.added += 1;
        } else if line.starts_with('-') {
            counts.removed += 1;
        }
        counts
    })
}
