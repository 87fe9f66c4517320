//! `storysync labels` — derive the labels each linked issue should carry.
//!
//! Stories are deduplicated (unless disabled), grouped by `external_id`, and
//! each group is run through label derivation. A story in an unknown state
//! stops the whole batch: no labels are reported for any issue.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use storysync_core::config::ProjectConfig;
use storysync_core::error::ErrorCode;
use storysync_core::story_set::NEVER_ACCEPTED;
use storysync_core::{IssueLabel, StorySet};
use tracing::{debug, info};

use super::load_stories;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, render_error, render_mode};

const UNLINKED_GROUP: &str = "(unlinked)";

#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Story snapshot (JSON). Use `-` to read stdin.
    pub snapshot: PathBuf,

    /// Keep duplicate stories instead of folding them into the oldest copy.
    #[arg(long)]
    pub no_dedupe: bool,

    /// Only report this issue (its `external_id`).
    #[arg(long)]
    pub issue: Option<String>,

    /// Also report stories that are not linked to any issue.
    #[arg(long)]
    pub include_unlinked: bool,
}

#[derive(Debug, Serialize)]
pub struct IssueReport {
    pub issue: String,
    pub stories: Vec<u64>,
    pub labels: Vec<IssueLabel>,
    pub has_pr: bool,
    pub untriaged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accepted: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct LabelsReport {
    pub discarded: usize,
    pub issues: Vec<IssueReport>,
}

pub fn run_labels(
    args: &LabelsArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let stories = load_stories(&args.snapshot, output)?;

    let (stories, discarded) = if config.dedupe.enabled && !args.no_dedupe {
        let result = stories.dedupe();
        (result.canonical, result.discarded.len())
    } else {
        debug!("deduplication disabled");
        (stories, 0)
    };

    let groups = stories.group_by_issue();
    let mut selected: Vec<(String, StorySet)> = groups.linked.into_iter().collect();
    if (args.include_unlinked || config.labels.include_unlinked) && !groups.unlinked.is_empty() {
        selected.push((UNLINKED_GROUP.to_string(), groups.unlinked));
    }

    if let Some(wanted) = &args.issue {
        selected.retain(|(issue, _)| issue == wanted);
        if selected.is_empty() {
            let message = format!("issue '{wanted}' has no linked stories");
            render_error(output, &CliError::from_code(ErrorCode::IssueNotFound, &message))?;
            anyhow::bail!(message);
        }
    }

    let mut issues = Vec::with_capacity(selected.len());
    for (issue, group) in selected {
        let labels = match group.issue_labels() {
            Ok(labels) => labels,
            Err(err) => {
                let message = format!("{err} (issue {issue})");
                render_error(output, &CliError::from_code(err.error_code(), &message))?;
                return Err(anyhow::Error::new(err).context(format!("labeling issue {issue}")));
            }
        };

        let last_accepted = Some(group.last_accepted()).filter(|at| *at != NEVER_ACCEPTED);
        issues.push(IssueReport {
            stories: group.ids(),
            has_pr: group.has_pr(),
            untriaged: group.untriaged(),
            last_accepted,
            labels,
            issue,
        });
    }

    info!(issues = issues.len(), discarded, "derived issue labels");
    let report = LabelsReport { discarded, issues };
    render_mode(output, &report, render_text, render_pretty)
}

fn label_list(labels: &[IssueLabel]) -> String {
    labels
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn render_text(report: &LabelsReport, w: &mut dyn Write) -> std::io::Result<()> {
    for issue in &report.issues {
        writeln!(w, "{}\t{}", issue.issue, label_list(&issue.labels))?;
    }
    Ok(())
}

fn render_pretty(report: &LabelsReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.issues.is_empty() {
        writeln!(w, "No linked issues found.")?;
        return Ok(());
    }

    for issue in &report.issues {
        writeln!(w, "{}", issue.issue)?;
        pretty_rule(w)?;
        let labels = if issue.labels.is_empty() {
            "(none)".to_string()
        } else {
            label_list(&issue.labels)
        };
        pretty_kv(w, "Labels", labels)?;
        let ids: Vec<String> = issue.stories.iter().map(|id| format!("#{id}")).collect();
        pretty_kv(w, "Stories", ids.join(" "))?;
        pretty_kv(w, "Has PR", if issue.has_pr { "yes" } else { "no" })?;
        if issue.untriaged {
            pretty_kv(w, "Triage", "all chores")?;
        }
        if let Some(at) = issue.last_accepted {
            pretty_kv(w, "Last accepted", at.to_rfc3339())?;
        }
        writeln!(w)?;
    }

    if report.discarded > 0 {
        writeln!(w, "{} duplicate story(s) ignored.", report.discarded)?;
    }
    Ok(())
}
