use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use unfollowers::analysis::analyze;
use unfollowers::args::Args;
use unfollowers::auth::{self, ConsolePrompt};
use unfollowers::error::FetchWarning;
use unfollowers::fetch::{fetch_relationships, IntervalSleeper};
use unfollowers::http::WebApiClient;
use unfollowers::profile::{self, Access};
use unfollowers::report::{self, Report};
use unfollowers::utils;

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupt.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("Failed to install interrupt handler")?;
    }

    // Failures end the run with a message, not a distinct exit code.
    if let Err(e) = run(&args, &interrupt) {
        error!(action = "abort", component = "main", error = %e, "Run failed");
        eprintln!("Error: {e}");
    }

    if interrupt.load(Ordering::Relaxed) {
        println!("\nInterrupted. Exiting.");
    }

    Ok(())
}

fn run(args: &Args, interrupt: &AtomicBool) -> Result<()> {
    let username = match &args.username {
        Some(u) => u.trim().trim_start_matches('@').to_string(),
        None => utils::prompt_username()?,
    };
    let password = utils::prompt_password(&username)?;
    let save = utils::confirm_save()?;

    println!("Logging in...");
    let client = WebApiClient::new()?;
    let session = auth::login(client, &username, &password, &mut ConsolePrompt)?;

    println!("Fetching profile data for @{username}...");
    let resolved = profile::resolve(&session, &username)?;

    let relationships = fetch_relationships(
        &session,
        &resolved,
        &mut IntervalSleeper::default(),
        interrupt,
    );

    for warning in &relationships.warnings {
        println!("Warning: {warning}");
    }

    // Nothing retrieved because every enumeration failed is a total
    // failure; a restricted profile still gets its zero-count summary.
    let restricted = resolved.access == Access::Restricted;
    let fetch_failed = relationships
        .warnings
        .iter()
        .any(|w| matches!(w, FetchWarning::Partial { .. }));
    if !restricted
        && fetch_failed
        && relationships.followers.is_empty()
        && relationships.followees.is_empty()
    {
        anyhow::bail!("failed to fetch data: no relationship data could be retrieved");
    }

    let result = analyze(&relationships.followers, &relationships.followees);
    report::print_summary(
        &username,
        &relationships.followers,
        &relationships.followees,
        &result,
    );

    if save {
        let report = Report::new(&username, &resolved.stats, &result);
        let saved = report::save(&report, &args.output_dir)?;
        if let Some(path) = saved.report {
            println!("\nReport saved to {}", path.display());
        }
        if let Some(path) = saved.list {
            println!("List saved to {}", path.display());
        }
    }

    Ok(())
}
