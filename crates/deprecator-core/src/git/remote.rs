//! Parsing of `git remote show origin` output.

const HEAD_BRANCH_MARKER: &str = "HEAD branch:";

/// Extract the remote default branch from `git remote show` output.
///
/// Returns `None` when no `HEAD branch:` line is present or git reports the
/// branch as `(unknown)`.
pub fn parse_head_branch(output: &str) -> Option<String> {
    let line = output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with(HEAD_BRANCH_MARKER))?;
    let (_, branch) = line.split_once(": ")?;
    let branch = branch.trim();
    if branch.is_empty() || branch == "(unknown)" {
        return None;
    }
    Some(branch.to_string())
}
