use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::analysis::{AccountSet, AnalysisResult};
use crate::client::ProfileStats;

/// Serializable snapshot of one analysis run. Written once, never mutated.
#[derive(Debug, Serialize)]
pub struct Report {
    pub username: String,
    /// `YYYYMMDD_HHMMSS`, second resolution; also used in filenames.
    pub timestamp: String,
    pub stats: ProfileStats,
    pub analysis: ReportAnalysis,
    pub summary: ReportSummary,
}

#[derive(Debug, Serialize)]
pub struct ReportAnalysis {
    pub not_following_back: Vec<String>,
    pub not_followed_by_you: Vec<String>,
    pub mutual_follows: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub not_following_back: usize,
    pub not_followed_by_you: usize,
    pub mutual_follows: usize,
}

impl Report {
    pub fn new(username: &str, stats: &ProfileStats, result: &AnalysisResult) -> Self {
        Self::with_timestamp(username, stats, result, timestamp_now())
    }

    pub fn with_timestamp(
        username: &str,
        stats: &ProfileStats,
        result: &AnalysisResult,
        timestamp: String,
    ) -> Self {
        Self {
            username: username.to_string(),
            timestamp,
            stats: stats.clone(),
            analysis: ReportAnalysis {
                not_following_back: result.not_following_back.iter().cloned().collect(),
                not_followed_by_you: result.not_followed_by_you.iter().cloned().collect(),
                mutual_follows: result.mutual.iter().cloned().collect(),
            },
            summary: ReportSummary {
                not_following_back: result.not_following_back.len(),
                not_followed_by_you: result.not_followed_by_you.len(),
                mutual_follows: result.mutual.len(),
            },
        }
    }
}

pub fn timestamp_now() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Prints the five counts and the sorted not-following-back list.
pub fn print_summary(
    username: &str,
    followers: &AccountSet,
    followees: &AccountSet,
    result: &AnalysisResult,
) {
    println!("\n--- Analysis for @{username} ---");
    println!("Followers: {}", followers.len());
    println!("Following: {}", followees.len());
    println!("Not following you back: {}", result.not_following_back.len());
    println!("Mutual follows: {}", result.mutual.len());
    println!("Not followed back by you: {}", result.not_followed_by_you.len());

    if result.not_following_back.is_empty() {
        println!("\nEveryone you follow follows you back!");
    } else {
        println!("\nAccounts you follow that do NOT follow back:\n");
        for account in &result.not_following_back {
            println!("- @{account}");
        }
    }
}

/// Paths written by [`save`], when anything was written at all.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SavedFiles {
    pub report: Option<PathBuf>,
    pub list: Option<PathBuf>,
}

/// Persists the report to `dir`. Nothing is written when both difference
/// sets are empty; the plain-text list is written only when someone is not
/// following back.
pub fn save(report: &Report, dir: &Path) -> Result<SavedFiles> {
    let mut saved = SavedFiles::default();

    if report.summary.not_following_back == 0 && report.summary.not_followed_by_you == 0 {
        info!(
            action = "skip",
            component = "report",
            "Both difference sets empty; nothing to persist"
        );
        return Ok(saved);
    }

    let json_path = dir.join(format!(
        "instagram_analysis_{}_{}.json",
        report.username, report.timestamp
    ));
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(&json_path, json)
        .with_context(|| format!("Failed to write report to {json_path:?}"))?;
    info!(action = "write", component = "report", path = ?json_path, "Report written");
    saved.report = Some(json_path);

    if !report.analysis.not_following_back.is_empty() {
        let list_path = dir.join(format!(
            "not_following_back_{}_{}.txt",
            report.username, report.timestamp
        ));
        let mut body = format!(
            "Accounts not following back @{}\nGenerated: {}\n\n",
            report.username,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for account in &report.analysis.not_following_back {
            body.push('@');
            body.push_str(account);
            body.push('\n');
        }
        fs::write(&list_path, body)
            .with_context(|| format!("Failed to write list to {list_path:?}"))?;
        info!(action = "write", component = "report", path = ?list_path, "Plain-text list written");
        saved.list = Some(list_path);
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    fn set(items: &[&str]) -> AccountSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn stats() -> ProfileStats {
        ProfileStats {
            full_name: "Some One".into(),
            followers: 3,
            followees: 3,
            posts: 12,
            is_private: false,
            followed_by_viewer: false,
        }
    }

    #[test]
    fn report_carries_sorted_arrays_and_counts() {
        let followers = set(&["a", "b", "c"]);
        let followees = set(&["b", "c", "d"]);
        let result = analyze(&followers, &followees);

        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        assert_eq!(report.analysis.not_following_back, ["d"]);
        assert_eq!(report.analysis.mutual_follows, ["b", "c"]);
        assert_eq!(report.analysis.not_followed_by_you, ["a"]);
        assert_eq!(report.summary.not_following_back, 1);
        assert_eq!(report.summary.mutual_follows, 2);
        assert_eq!(report.summary.not_followed_by_you, 1);
    }

    #[test]
    fn json_shape_matches_contract() {
        let followers = set(&["a", "b"]);
        let followees = set(&["b", "c"]);
        let result = analyze(&followers, &followees);
        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();

        assert_eq!(value["username"], "someone");
        assert_eq!(value["timestamp"], "20260824_120000");
        assert_eq!(value["stats"]["is_private"], false);
        assert_eq!(value["analysis"]["not_following_back"][0], "c");
        assert_eq!(value["analysis"]["not_followed_by_you"][0], "a");
        assert_eq!(value["analysis"]["mutual_follows"][0], "b");
        assert_eq!(value["summary"]["not_following_back"], 1);
    }

    #[test]
    fn save_writes_both_files_with_expected_names() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze(&set(&["a"]), &set(&["b"]));
        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        let saved = save(&report, dir.path()).unwrap();

        let json_path = saved.report.expect("report file");
        assert_eq!(
            json_path.file_name().unwrap(),
            "instagram_analysis_someone_20260824_120000.json"
        );
        let list_path = saved.list.expect("list file");
        assert_eq!(
            list_path.file_name().unwrap(),
            "not_following_back_someone_20260824_120000.txt"
        );
    }

    #[test]
    fn text_list_is_sorted_with_header_and_at_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze(&set(&[]), &set(&["zed", "alice", "mike"]));
        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        let saved = save(&report, dir.path()).unwrap();
        let body = fs::read_to_string(saved.list.unwrap()).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines[0], "Accounts not following back @someone");
        assert!(lines[1].starts_with("Generated: "));
        assert_eq!(lines[2], "");
        assert_eq!(&lines[3..], ["@alice", "@mike", "@zed"]);
    }

    #[test]
    fn no_text_file_when_everyone_follows_back() {
        let dir = tempfile::tempdir().unwrap();
        // Someone follows us that we do not follow, so the JSON still goes out.
        let result = analyze(&set(&["a", "b"]), &set(&["b"]));
        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        let saved = save(&report, dir.path()).unwrap();

        assert!(saved.report.is_some());
        assert!(saved.list.is_none());
    }

    #[test]
    fn nothing_written_when_both_difference_sets_empty() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze(&set(&["a", "b"]), &set(&["a", "b"]));
        let report =
            Report::with_timestamp("someone", &stats(), &result, "20260824_120000".into());

        assert_eq!(report.summary.not_following_back, 0);
        assert_eq!(report.summary.not_followed_by_you, 0);

        let saved = save(&report, dir.path()).unwrap();
        assert_eq!(saved, SavedFiles::default());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
