use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::analysis::AccountSet;
use crate::client::{InstagramClient, Session};
use crate::error::{FetchWarning, ListKind};
use crate::profile::{Access, ResolvedProfile};

/// Pause policy applied while draining a relationship list. Injected so
/// tests can run without real delays.
pub trait RateLimiter {
    /// Called after each item with the running count for the current list.
    fn on_item(&mut self, count: usize);
}

/// Sleeps for a fixed duration every `every` items. The defaults match the
/// external API's tolerance: a one-second pause every 100 accounts.
pub struct IntervalSleeper {
    every: usize,
    pause: Duration,
}

impl IntervalSleeper {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }
}

impl Default for IntervalSleeper {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(1))
    }
}

impl RateLimiter for IntervalSleeper {
    fn on_item(&mut self, count: usize) {
        if count > 0 && count % self.every == 0 {
            info!(
                action = "pause",
                component = "fetch",
                items = count,
                pause_ms = self.pause.as_millis(),
                "Rate-limit pause"
            );
            std::thread::sleep(self.pause);
        }
    }
}

/// No pauses at all. Used when there is nothing to throttle.
pub struct NoPause;

impl RateLimiter for NoPause {
    fn on_item(&mut self, _count: usize) {}
}

#[derive(Debug, Default)]
pub struct Relationships {
    pub followers: AccountSet,
    pub followees: AccountSet,
    pub warnings: Vec<FetchWarning>,
}

/// Drains both relationship lists of `profile` into sets. Mid-stream
/// failures and interrupts keep the partial set and record a warning; the
/// other list is still fetched independently. Restricted profiles yield
/// empty sets with a single warning and no enumeration.
pub fn fetch_relationships<C: InstagramClient>(
    session: &Session<C>,
    profile: &ResolvedProfile,
    limiter: &mut dyn RateLimiter,
    interrupt: &AtomicBool,
) -> Relationships {
    if profile.access == Access::Restricted {
        warn!(
            action = "skip",
            component = "fetch",
            username = %profile.handle.username,
            "Profile is restricted; skipping enumeration"
        );
        return Relationships {
            warnings: vec![FetchWarning::Restricted],
            ..Relationships::default()
        };
    }

    let mut out = Relationships::default();

    println!("Fetching followers...");
    let followers_iter = session.client().followers(&profile.handle);
    drain_list(
        followers_iter,
        ListKind::Followers,
        &mut out.followers,
        &mut out.warnings,
        limiter,
        interrupt,
    );

    println!("Fetching followees (accounts you follow)...");
    let followees_iter = session.client().followees(&profile.handle);
    drain_list(
        followees_iter,
        ListKind::Followees,
        &mut out.followees,
        &mut out.warnings,
        limiter,
        interrupt,
    );

    out
}

fn drain_list(
    iter: impl Iterator<Item = Result<String, crate::error::ClientError>>,
    list: ListKind,
    set: &mut AccountSet,
    warnings: &mut Vec<FetchWarning>,
    limiter: &mut dyn RateLimiter,
    interrupt: &AtomicBool,
) {
    let start_time = Instant::now();
    info!(action = "start", component = "fetch", list = %list, "Draining list");

    for item in iter {
        if interrupt.load(Ordering::Relaxed) {
            warn!(
                action = "interrupt",
                component = "fetch",
                list = %list,
                fetched = set.len(),
                "Enumeration interrupted"
            );
            warnings.push(FetchWarning::Interrupted {
                list,
                fetched: set.len(),
            });
            return;
        }

        match item {
            Ok(username) => {
                set.insert(username);
                limiter.on_item(set.len());
            }
            Err(e) => {
                warn!(
                    action = "partial",
                    component = "fetch",
                    list = %list,
                    fetched = set.len(),
                    error = %e,
                    "Enumeration failed mid-stream; keeping partial set"
                );
                warnings.push(FetchWarning::Partial {
                    list,
                    fetched: set.len(),
                    reason: e.to_string(),
                });
                return;
            }
        }
    }

    info!(
        action = "complete",
        component = "fetch",
        list = %list,
        fetched = set.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "List drained"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AccountIter, ProfileHandle, ProfileStats};
    use crate::error::ClientError;

    /// Serves scripted follower/followee streams.
    struct ScriptedClient {
        followers: Vec<Result<String, ClientError>>,
        followees: Vec<Result<String, ClientError>>,
    }

    impl ScriptedClient {
        fn items(names: &[&str]) -> Vec<Result<String, ClientError>> {
            names.iter().map(|n| Ok(n.to_string())).collect()
        }
    }

    fn clone_item(item: &Result<String, ClientError>) -> Result<String, ClientError> {
        match item {
            Ok(s) => Ok(s.clone()),
            Err(e) => Err(ClientError::Api(e.to_string())),
        }
    }

    /// Records pause points instead of sleeping.
    struct RecordingLimiter {
        every: usize,
        pauses: Vec<usize>,
    }

    impl RateLimiter for RecordingLimiter {
        fn on_item(&mut self, count: usize) {
            if count > 0 && count % self.every == 0 {
                self.pauses.push(count);
            }
        }
    }

    // Borrowing impl so each test can keep its client on the stack.
    impl<'a> InstagramClient for &'a ScriptedClient {
        fn login(&mut self, _: &str, _: &str) -> Result<(), ClientError> {
            Ok(())
        }

        fn two_factor_login(&mut self, _: &str) -> Result<(), ClientError> {
            Ok(())
        }

        fn resolve_profile(
            &self,
            _: &str,
        ) -> Result<(ProfileHandle, ProfileStats), ClientError> {
            unimplemented!("not used by fetch tests")
        }

        fn followers(&self, _: &ProfileHandle) -> AccountIter<'_> {
            Box::new(self.followers.iter().map(clone_item))
        }

        fn followees(&self, _: &ProfileHandle) -> AccountIter<'_> {
            Box::new(self.followees.iter().map(clone_item))
        }
    }

    fn full_profile(client: &ScriptedClient) -> (Session<&ScriptedClient>, ResolvedProfile) {
        let session = Session::new(client, "me");
        let profile = ResolvedProfile {
            handle: ProfileHandle {
                user_id: "1".into(),
                username: "me".into(),
            },
            stats: ProfileStats {
                full_name: "Me".into(),
                followers: 0,
                followees: 0,
                posts: 0,
                is_private: false,
                followed_by_viewer: false,
            },
            access: Access::Full,
        };
        (session, profile)
    }

    #[test]
    fn fetches_both_lists() {
        let client = ScriptedClient {
            followers: ScriptedClient::items(&["a", "b", "c"]),
            followees: ScriptedClient::items(&["b", "c", "d"]),
        };
        let (session, profile) = full_profile(&client);

        let rel = fetch_relationships(&session, &profile, &mut NoPause, &AtomicBool::new(false));

        assert_eq!(rel.followers.len(), 3);
        assert_eq!(rel.followees.len(), 3);
        assert!(rel.warnings.is_empty());
    }

    #[test]
    fn partial_failure_keeps_partial_set_and_continues() {
        let mut followers = ScriptedClient::items(&["a", "b"]);
        followers.push(Err(ClientError::Network("reset by peer".into())));
        followers.extend(ScriptedClient::items(&["c", "d", "e"]));

        let client = ScriptedClient {
            followers,
            followees: ScriptedClient::items(&["x", "y"]),
        };
        let (session, profile) = full_profile(&client);

        let rel = fetch_relationships(&session, &profile, &mut NoPause, &AtomicBool::new(false));

        // Exactly the two items yielded before the error, nothing after it.
        assert_eq!(
            rel.followers.iter().collect::<Vec<_>>(),
            ["a", "b"]
        );
        // The other list still fetched in full.
        assert_eq!(rel.followees.len(), 2);
        assert_eq!(rel.warnings.len(), 1);
        assert!(matches!(
            rel.warnings[0],
            FetchWarning::Partial {
                list: ListKind::Followers,
                fetched: 2,
                ..
            }
        ));
    }

    #[test]
    fn restricted_profile_yields_empty_sets_with_warning() {
        let client = ScriptedClient {
            followers: ScriptedClient::items(&["a"]),
            followees: ScriptedClient::items(&["b"]),
        };
        let session = Session::new(&client, "me");
        let profile = ResolvedProfile {
            handle: ProfileHandle {
                user_id: "2".into(),
                username: "someone_private".into(),
            },
            stats: ProfileStats {
                full_name: String::new(),
                followers: 10,
                followees: 20,
                posts: 0,
                is_private: true,
                followed_by_viewer: false,
            },
            access: Access::Restricted,
        };

        let rel = fetch_relationships(&session, &profile, &mut NoPause, &AtomicBool::new(false));

        assert!(rel.followers.is_empty());
        assert!(rel.followees.is_empty());
        assert_eq!(rel.warnings, vec![FetchWarning::Restricted]);
    }

    #[test]
    fn limiter_fires_every_n_items() {
        let names: Vec<String> = (0..250).map(|i| format!("user{i:04}")).collect();
        let client = ScriptedClient {
            followers: names.iter().map(|n| Ok(n.clone())).collect(),
            followees: Vec::new(),
        };
        let (session, profile) = full_profile(&client);

        let mut limiter = RecordingLimiter {
            every: 100,
            pauses: Vec::new(),
        };
        let rel =
            fetch_relationships(&session, &profile, &mut limiter, &AtomicBool::new(false));

        assert_eq!(rel.followers.len(), 250);
        assert_eq!(limiter.pauses, vec![100, 200]);
    }

    #[test]
    fn interrupt_stops_enumeration_with_warning() {
        let client = ScriptedClient {
            followers: ScriptedClient::items(&["a", "b", "c"]),
            followees: ScriptedClient::items(&["d"]),
        };
        let (session, profile) = full_profile(&client);

        // Already set before the fetch starts: nothing gets drained.
        let interrupt = AtomicBool::new(true);
        let rel = fetch_relationships(&session, &profile, &mut NoPause, &interrupt);

        assert!(rel.followers.is_empty());
        assert!(rel.followees.is_empty());
        assert_eq!(rel.warnings.len(), 2);
        assert!(matches!(
            rel.warnings[0],
            FetchWarning::Interrupted {
                list: ListKind::Followers,
                fetched: 0
            }
        ));
    }
}
