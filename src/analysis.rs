use std::collections::BTreeSet;

/// Account usernames, unique and lexically ordered by construction.
pub type AccountSet = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Accounts the user follows that do not follow back (followees − followers).
    pub not_following_back: AccountSet,
    /// Accounts followed in both directions (followees ∩ followers).
    pub mutual: AccountSet,
    /// Followers the user does not follow back (followers − followees).
    pub not_followed_by_you: AccountSet,
}

/// Pure set arithmetic over the two relationship sets. No I/O, no hidden
/// state; calling it twice with the same inputs yields identical results.
pub fn analyze(followers: &AccountSet, followees: &AccountSet) -> AnalysisResult {
    AnalysisResult {
        not_following_back: followees.difference(followers).cloned().collect(),
        mutual: followees.intersection(followers).cloned().collect(),
        not_followed_by_you: followers.difference(followees).cloned().collect(),
    }
}
