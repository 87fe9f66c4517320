//! `storysync dedupe` — report duplicate stories in a snapshot.
//!
//! Stories with identical name, description, and label set are duplicates;
//! the oldest (lowest id) is kept.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::warn;

use super::{StoryRow, load_stories};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct DedupeArgs {
    /// Story snapshot (JSON). Use `-` to read stdin.
    pub snapshot: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct DuplicateRow {
    #[serde(flatten)]
    pub story: StoryRow,
    pub duplicate_of: u64,
}

#[derive(Debug, Serialize)]
pub struct DedupeReport {
    pub total: usize,
    pub canonical: Vec<StoryRow>,
    pub discarded: Vec<DuplicateRow>,
}

pub fn run_dedupe(args: &DedupeArgs, output: OutputMode) -> anyhow::Result<()> {
    let stories = load_stories(&args.snapshot, output)?;
    let total = stories.len();
    let result = stories.dedupe();

    let mut discarded = Vec::with_capacity(result.discarded.len());
    for story in &result.discarded {
        let Some(duplicate_of) = result.survivor_of(story.id) else {
            anyhow::bail!("discarded story {} has no canonical survivor", story.id);
        };
        warn!(story = story.id, duplicate_of, "duplicate story");
        discarded.push(DuplicateRow {
            story: story.into(),
            duplicate_of,
        });
    }

    let report = DedupeReport {
        total,
        canonical: result.canonical.iter().map(StoryRow::from).collect(),
        discarded,
    };

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &DedupeReport, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &report.discarded {
        writeln!(
            w,
            "{}\tduplicate-of\t{}\t{}",
            row.story.id, row.duplicate_of, row.story.name
        )?;
    }
    Ok(())
}

fn render_pretty(report: &DedupeReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Deduplication")?;
    pretty_kv(w, "Stories", report.total.to_string())?;
    pretty_kv(w, "Canonical", report.canonical.len().to_string())?;
    pretty_kv(w, "Duplicates", report.discarded.len().to_string())?;

    if report.discarded.is_empty() {
        writeln!(w, "\nNo duplicate stories found.")?;
        return Ok(());
    }

    writeln!(w)?;
    for row in &report.discarded {
        writeln!(
            w,
            "  #{:<10} duplicates #{:<10} {}",
            row.story.id, row.duplicate_of, row.story.name
        )?;
    }
    Ok(())
}
