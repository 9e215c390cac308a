//! Branch-name version classification.
//!
//! Branches encode the release they target in their name: `17.0-feature-x`
//! targets `17.0`, `saas-17.2-fix` targets `saas-17.2`. A branch whose name
//! equals its own derived token is a "version branch". All functions here are
//! pure; no git access.

use std::cmp::Ordering;

/// Prefix marking the special release line.
pub const SAAS_PREFIX: &str = "saas-";

/// Derive the version token from a branch name.
///
/// For `saas-` branches the token is the prefix plus the first dash-delimited
/// segment after it; otherwise the first dash-delimited segment of the whole
/// name (the whole name when it contains no dash).
pub fn derive_version(branch: &str) -> String {
    if let Some(rest) = branch.strip_prefix(SAAS_PREFIX) {
        let segment = rest.split('-').next().unwrap_or(rest);
        return format!("{}{}", SAAS_PREFIX, segment);
    }
    branch.split('-').next().unwrap_or(branch).to_string()
}

/// A branch is a version branch iff its name equals its derived token.
pub fn is_version_branch(branch: &str) -> bool {
    branch == derive_version(branch)
}

/// Compare two branch names for display: derived tokens descending as raw
/// strings, ties broken by ascending full-name comparison.
///
/// This is lexicographic, not numeric. Callers must not assume
/// release-number ordering beyond what string comparison yields.
pub fn compare_descending(a: &str, b: &str) -> Ordering {
    derive_version(b).cmp(&derive_version(a)).then_with(|| a.cmp(b))
}

/// Stable sort of branch names, newest version token first.
pub fn sort_branches(branches: &mut [String]) {
    branches.sort_by(|a, b| compare_descending(a, b));
}

/// Which remote is authoritative for a branch.
///
/// Version branches live on the canonical remote; work branches on the
/// development remote. Remote names come from configuration, not constants.
#[derive(Debug, Clone)]
pub struct RemotePolicy {
    /// Remote holding the version branches (e.g. "origin")
    pub canonical: String,
    /// Remote holding development branches (e.g. "dev")
    pub development: String,
}

impl RemotePolicy {
    pub fn new(canonical: impl Into<String>, development: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            development: development.into(),
        }
    }

    /// The remote to probe or integrate against for `branch`.
    pub fn remote_for(&self, branch: &str) -> &str {
        if is_version_branch(branch) {
            &self.canonical
        } else {
            &self.development
        }
    }
}
