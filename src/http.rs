//! Instagram web API implementation of [`InstagramClient`]. Covers exactly
//! the five operations the pipeline needs: login, two-factor login, profile
//! lookup, and the two paginated friendship lists. Everything else about
//! the protocol is out of scope; the trait seam keeps callers independent
//! of this module.

use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::{AccountIter, InstagramClient, ProfileHandle, ProfileStats};
use crate::error::ClientError;

const BASE: &str = "https://www.instagram.com";
// App id the web client sends; friendship endpoints reject requests without it.
const APP_ID: &str = "936619743392459";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";
const PAGE_SIZE: usize = 100;

pub struct WebApiClient {
    http: Client,
    csrf: Option<String>,
    pending_two_factor: Option<PendingTwoFactor>,
}

struct PendingTwoFactor {
    identifier: String,
    username: String,
}

impl WebApiClient {
    pub fn new() -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert("X-IG-App-ID", HeaderValue::from_static(APP_ID));
        headers.insert("Referer", HeaderValue::from_static(BASE));

        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            csrf: None,
            pending_two_factor: None,
        })
    }

    /// Loads the login page so the cookie jar holds a csrf token, and
    /// remembers the token for the POSTs that require it as a header.
    fn prime_csrf(&mut self) -> Result<String, ClientError> {
        let resp = self
            .http
            .get(format!("{BASE}/accounts/login/"))
            .send()
            .map_err(send_err)?;

        let token = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookie| {
                cookie
                    .split(';')
                    .next()
                    .and_then(|kv| kv.strip_prefix("csrftoken="))
                    .map(str::to_string)
            })
            .ok_or_else(|| ClientError::Api("no csrf token in login page response".into()))?;

        debug!(action = "csrf", component = "http", "Csrf token obtained");
        self.csrf = Some(token.clone());
        Ok(token)
    }

    fn csrf_header(&self) -> Result<&str, ClientError> {
        self.csrf
            .as_deref()
            .ok_or_else(|| ClientError::Api("not logged in".into()))
    }
}

fn send_err(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

fn decode_err(e: reqwest::Error) -> ClientError {
    ClientError::Api(format!("unexpected response: {e}"))
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: Option<bool>,
    /// `Some(false)` means the username does not exist.
    #[serde(default)]
    user: Option<bool>,
    #[serde(default)]
    two_factor_required: Option<bool>,
    #[serde(default)]
    two_factor_info: Option<TwoFactorInfo>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TwoFactorInfo {
    two_factor_identifier: String,
}

impl InstagramClient for WebApiClient {
    fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let csrf = self.prime_csrf()?;

        // Browser-style password envelope, version 0 (no client-side
        // encryption), as sent by the web login form.
        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            password
        );

        let resp = self
            .http
            .post(format!("{BASE}/api/v1/web/accounts/login/ajax/"))
            .header("X-CSRFToken", &csrf)
            .form(&[
                ("username", username),
                ("enc_password", enc_password.as_str()),
            ])
            .send()
            .map_err(send_err)?;

        let body: LoginResponse = resp.json().map_err(decode_err)?;

        if body.two_factor_required == Some(true) {
            let info = body
                .two_factor_info
                .ok_or_else(|| ClientError::Api("two-factor challenge without identifier".into()))?;
            self.pending_two_factor = Some(PendingTwoFactor {
                identifier: info.two_factor_identifier,
                username: username.to_string(),
            });
            return Err(ClientError::TwoFactorRequired);
        }

        if body.authenticated == Some(true) {
            info!(action = "login", component = "http", username, "Authenticated");
            return Ok(());
        }

        if body.user == Some(false) || body.authenticated == Some(false) {
            return Err(ClientError::BadCredentials);
        }

        Err(ClientError::Api(
            body.message.unwrap_or_else(|| "login failed".into()),
        ))
    }

    fn two_factor_login(&mut self, code: &str) -> Result<(), ClientError> {
        let csrf = self.csrf_header()?.to_string();
        let pending = self
            .pending_two_factor
            .as_ref()
            .ok_or_else(|| ClientError::Api("no pending two-factor challenge".into()))?;

        let resp = self
            .http
            .post(format!("{BASE}/api/v1/web/accounts/login/ajax/two_factor/"))
            .header("X-CSRFToken", &csrf)
            .form(&[
                ("username", pending.username.as_str()),
                ("verificationCode", code),
                ("identifier", pending.identifier.as_str()),
            ])
            .send()
            .map_err(send_err)?;

        let body: LoginResponse = resp.json().map_err(decode_err)?;

        if body.authenticated == Some(true) {
            self.pending_two_factor = None;
            info!(action = "two_factor", component = "http", "Authenticated");
            Ok(())
        } else {
            Err(ClientError::TwoFactorCodeRejected)
        }
    }

    fn resolve_profile(
        &self,
        username: &str,
    ) -> Result<(ProfileHandle, ProfileStats), ClientError> {
        let resp = self
            .http
            .get(format!("{BASE}/api/v1/users/web_profile_info/"))
            .query(&[("username", username)])
            .send()
            .map_err(send_err)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }

        let body: WebProfileResponse = resp.json().map_err(decode_err)?;
        let user = body.data.user.ok_or(ClientError::NotFound)?;

        let handle = ProfileHandle {
            user_id: user.id,
            username: user.username,
        };
        let stats = ProfileStats {
            full_name: user.full_name,
            followers: user.edge_followed_by.count,
            followees: user.edge_follow.count,
            posts: user.edge_owner_to_timeline_media.count,
            is_private: user.is_private,
            followed_by_viewer: user.followed_by_viewer,
        };
        Ok((handle, stats))
    }

    fn followers(&self, profile: &ProfileHandle) -> AccountIter<'_> {
        Box::new(FriendshipPages::new(
            self.http.clone(),
            format!("{BASE}/api/v1/friendships/{}/followers/", profile.user_id),
        ))
    }

    fn followees(&self, profile: &ProfileHandle) -> AccountIter<'_> {
        Box::new(FriendshipPages::new(
            self.http.clone(),
            format!("{BASE}/api/v1/friendships/{}/following/", profile.user_id),
        ))
    }
}

#[derive(Deserialize)]
struct WebProfileResponse {
    data: WebProfileData,
}

#[derive(Deserialize)]
struct WebProfileData {
    user: Option<WebProfileUser>,
}

#[derive(Deserialize)]
struct WebProfileUser {
    id: String,
    username: String,
    #[serde(default)]
    full_name: String,
    is_private: bool,
    #[serde(default)]
    followed_by_viewer: bool,
    edge_followed_by: EdgeCount,
    edge_follow: EdgeCount,
    edge_owner_to_timeline_media: EdgeCount,
}

#[derive(Deserialize)]
struct EdgeCount {
    count: u64,
}

#[derive(Deserialize)]
struct FriendshipPage {
    #[serde(default)]
    users: Vec<FriendshipUser>,
    #[serde(default)]
    next_max_id: Option<String>,
}

#[derive(Deserialize)]
struct FriendshipUser {
    username: String,
}

/// Lazy cursor over one friendship list. Finite and non-restartable: the
/// first error ends the stream for good.
struct FriendshipPages {
    http: Client,
    url: String,
    buffer: std::vec::IntoIter<String>,
    next_max_id: Option<String>,
    exhausted: bool,
}

impl FriendshipPages {
    fn new(http: Client, url: String) -> Self {
        Self {
            http,
            url,
            buffer: Vec::new().into_iter(),
            next_max_id: None,
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> Result<(), ClientError> {
        let mut request = self
            .http
            .get(&self.url)
            .query(&[("count", PAGE_SIZE.to_string())]);
        if let Some(cursor) = &self.next_max_id {
            request = request.query(&[("max_id", cursor.as_str())]);
        }

        let resp = request.send().map_err(send_err)?;
        if !resp.status().is_success() {
            return Err(ClientError::Api(format!(
                "friendship request failed with status {}",
                resp.status()
            )));
        }

        let page: FriendshipPage = resp.json().map_err(decode_err)?;
        debug!(
            action = "page",
            component = "http",
            users = page.users.len(),
            has_next = page.next_max_id.is_some(),
            "Friendship page fetched"
        );

        self.next_max_id = page.next_max_id;
        if self.next_max_id.is_none() {
            self.exhausted = true;
        }
        self.buffer = page
            .users
            .into_iter()
            .map(|u| u.username)
            .collect::<Vec<_>>()
            .into_iter();
        Ok(())
    }
}

impl Iterator for FriendshipPages {
    type Item = Result<String, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(username) = self.buffer.next() {
                return Some(Ok(username));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}
