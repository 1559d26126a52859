use dialoguer::Input;
use tracing::{info, warn};

use crate::client::{InstagramClient, Session};
use crate::error::{AuthError, ClientError};

/// Bounded retries for the one-time code.
const TWO_FACTOR_ATTEMPTS: u32 = 3;

/// Source of one-time codes. The console implementation prompts the user;
/// tests inject scripted sequences.
pub trait SecondFactorPrompt {
    /// `remaining` counts this attempt, so it starts at the full budget.
    fn code(&mut self, remaining: u32) -> anyhow::Result<String>;
}

pub struct ConsolePrompt;

impl SecondFactorPrompt for ConsolePrompt {
    fn code(&mut self, _remaining: u32) -> anyhow::Result<String> {
        let code: String = Input::new()
            .with_prompt("Enter 2FA code sent to your device")
            .interact_text()?;
        Ok(code.trim().to_string())
    }
}

/// Exchanges credentials for an authenticated session, running the bounded
/// two-factor loop when the account requires it. Hard failures are typed
/// per kind; none of them are retried here except the one-time code.
pub fn login<C: InstagramClient>(
    mut client: C,
    username: &str,
    password: &str,
    prompt: &mut dyn SecondFactorPrompt,
) -> Result<Session<C>, AuthError> {
    info!(action = "start", component = "auth", username, "Logging in");

    match client.login(username, password) {
        Ok(()) => {
            info!(action = "complete", component = "auth", username, "Login succeeded");
            Ok(Session::new(client, username))
        }
        Err(ClientError::TwoFactorRequired) => {
            println!("Two-factor authentication required.");
            two_factor_loop(client, username, prompt)
        }
        Err(ClientError::BadCredentials) => Err(AuthError::InvalidCredentials),
        Err(ClientError::Network(msg)) => Err(AuthError::ConnectionFailed(msg)),
        Err(e) => Err(AuthError::Unknown(e.to_string())),
    }
}

fn two_factor_loop<C: InstagramClient>(
    mut client: C,
    username: &str,
    prompt: &mut dyn SecondFactorPrompt,
) -> Result<Session<C>, AuthError> {
    for attempt in 1..=TWO_FACTOR_ATTEMPTS {
        let remaining = TWO_FACTOR_ATTEMPTS - attempt + 1;
        let code = prompt
            .code(remaining)
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        match client.two_factor_login(&code) {
            Ok(()) => {
                info!(
                    action = "complete",
                    component = "auth",
                    username,
                    attempt,
                    "Two-factor login succeeded"
                );
                return Ok(Session::new(client, username));
            }
            Err(ClientError::TwoFactorCodeRejected) => {
                let left = TWO_FACTOR_ATTEMPTS - attempt;
                warn!(
                    action = "retry",
                    component = "auth",
                    attempt,
                    remaining = left,
                    "Two-factor code rejected"
                );
                if left > 0 {
                    println!("Code rejected. {left} attempt(s) remaining.");
                }
            }
            Err(ClientError::Network(msg)) => return Err(AuthError::ConnectionFailed(msg)),
            Err(e) => return Err(AuthError::Unknown(e.to_string())),
        }
    }

    Err(AuthError::TwoFactorExhausted {
        attempts: TWO_FACTOR_ATTEMPTS,
    })
}
