use serde::Serialize;

use crate::error::ClientError;

/// A lazy, finite, non-restartable stream of account usernames. An `Err`
/// item ends the stream; implementations must not yield after one.
pub type AccountIter<'a> = Box<dyn Iterator<Item = Result<String, ClientError>> + 'a>;

/// Seam between the pipeline and whatever talks to the network. The HTTP
/// implementation lives in `http`; tests substitute in-memory fakes.
pub trait InstagramClient {
    fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError>;

    /// Completes a login that returned [`ClientError::TwoFactorRequired`].
    fn two_factor_login(&mut self, code: &str) -> Result<(), ClientError>;

    fn resolve_profile(&self, username: &str)
        -> Result<(ProfileHandle, ProfileStats), ClientError>;

    fn followers(&self, profile: &ProfileHandle) -> AccountIter<'_>;

    fn followees(&self, profile: &ProfileHandle) -> AccountIter<'_>;
}

/// Opaque reference to a resolved profile, enough to enumerate its lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileHandle {
    pub user_id: String,
    pub username: String,
}

/// Immutable summary of a profile, captured once per run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub full_name: String,
    pub followers: u64,
    pub followees: u64,
    pub posts: u64,
    pub is_private: bool,
    pub followed_by_viewer: bool,
}

/// An authenticated handle bound to one account. Owns the client; the
/// resolver and fetcher borrow it strictly sequentially.
#[derive(Debug)]
pub struct Session<C> {
    client: C,
    username: String,
}

impl<C: InstagramClient> Session<C> {
    pub(crate) fn new(client: C, username: &str) -> Self {
        Self {
            client,
            username: username.to_string(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The username this session is logged in as.
    pub fn username(&self) -> &str {
        &self.username
    }
}
