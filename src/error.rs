use thiserror::Error;

/// Low-level failures surfaced by an API client implementation. The
/// pipeline stages translate these into the user-facing taxonomy below.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("incorrect username or password")]
    BadCredentials,

    #[error("a two-factor code is required to continue")]
    TwoFactorRequired,

    #[error("the two-factor code was rejected")]
    TwoFactorCodeRejected,

    #[error("profile not found")]
    NotFound,

    #[error("connection failed: {0}")]
    Network(String),

    #[error("{0}")]
    Api(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("two-factor verification failed after {attempts} attempts")]
    TwoFactorExhausted { attempts: u32 },

    #[error("could not reach the server: {0}")]
    ConnectionFailed(String),

    #[error("login failed: {0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("profile @{0} does not exist")]
    ProfileNotFound(String),

    #[error("could not reach the server: {0}")]
    ConnectionFailed(String),

    #[error("profile lookup failed: {0}")]
    Unknown(String),
}

/// Which relationship list a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Followers,
    Followees,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Followers => write!(f, "followers"),
            ListKind::Followees => write!(f, "followees"),
        }
    }
}

/// Non-fatal conditions recorded while fetching. These are reported to the
/// user alongside the results; they never abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWarning {
    /// Enumeration of one list failed mid-stream; the partial set is kept.
    Partial {
        list: ListKind,
        fetched: usize,
        reason: String,
    },
    /// The profile is private and not followed by the viewer; nothing was
    /// enumerated at all.
    Restricted,
    /// The user interrupted enumeration; the partial set is kept.
    Interrupted { list: ListKind, fetched: usize },
}

impl std::fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchWarning::Partial {
                list,
                fetched,
                reason,
            } => write!(
                f,
                "{list} list incomplete after {fetched} accounts: {reason}"
            ),
            FetchWarning::Restricted => write!(
                f,
                "profile is private and not followed by you; follower data is unavailable"
            ),
            FetchWarning::Interrupted { list, fetched } => {
                write!(f, "{list} fetch interrupted after {fetched} accounts")
            }
        }
    }
}
