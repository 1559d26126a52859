use tracing::{info, warn};

use crate::client::{InstagramClient, ProfileHandle, ProfileStats, Session};
use crate::error::{ClientError, ResolveError};

/// Whether the session may enumerate the profile's relationship lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Full,
    /// Private profile the viewer does not follow. Resolution succeeded,
    /// but the lists must not be enumerated.
    Restricted,
}

#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub handle: ProfileHandle,
    pub stats: ProfileStats,
    pub access: Access,
}

/// Looks up `username` and captures its summary stats. A private profile
/// the viewer does not follow is not an error: it resolves with
/// [`Access::Restricted`] and the caller reports zero counts instead.
pub fn resolve<C: InstagramClient>(
    session: &Session<C>,
    username: &str,
) -> Result<ResolvedProfile, ResolveError> {
    info!(action = "start", component = "resolve", username, "Resolving profile");

    let (handle, stats) = match session.client().resolve_profile(username) {
        Ok(pair) => pair,
        Err(ClientError::NotFound) => {
            return Err(ResolveError::ProfileNotFound(username.to_string()))
        }
        Err(ClientError::Network(msg)) => return Err(ResolveError::ConnectionFailed(msg)),
        Err(e) => return Err(ResolveError::Unknown(e.to_string())),
    };

    // Own profiles are always fully visible, private or not.
    let own = handle.username.eq_ignore_ascii_case(session.username());
    let access = if stats.is_private && !stats.followed_by_viewer && !own {
        warn!(
            action = "restricted",
            component = "resolve",
            username = %handle.username,
            "Profile is private and not followed by the viewer"
        );
        Access::Restricted
    } else {
        Access::Full
    };

    info!(
        action = "complete",
        component = "resolve",
        username = %handle.username,
        followers = stats.followers,
        followees = stats.followees,
        is_private = stats.is_private,
        "Profile resolved"
    );

    Ok(ResolvedProfile {
        handle,
        stats,
        access,
    })
}
