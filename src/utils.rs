use anyhow::Result;
use dialoguer::{Confirm, Input, Password};
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_directive = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn prompt_username() -> Result<String> {
    let username: String = Input::new()
        .with_prompt("Enter your Instagram username")
        .interact_text()?;
    Ok(username.trim().trim_start_matches('@').to_string())
}

pub fn prompt_password(username: &str) -> Result<String> {
    let password = Password::new()
        .with_prompt(format!("Enter Instagram password for @{username}"))
        .interact()?;
    Ok(password)
}

/// Save-to-file choice, defaulting to yes.
pub fn confirm_save() -> Result<bool> {
    let save = Confirm::new()
        .with_prompt("Save results to file?")
        .default(true)
        .interact()?;
    Ok(save)
}

pub fn validate_args(args: &crate::args::Args) -> Result<()> {
    if let Some(username) = &args.username {
        if username.trim().is_empty() {
            anyhow::bail!("--username must not be empty");
        }
    }

    if !args.output_dir.is_dir() {
        anyhow::bail!("--output-dir {:?} is not a directory", args.output_dir);
    }

    Ok(())
}
