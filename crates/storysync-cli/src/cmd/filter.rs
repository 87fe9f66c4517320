//! `storysync filter` — list stories carrying a label.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::{StoryRow, load_stories};
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Story snapshot (JSON). Use `-` to read stdin.
    pub snapshot: PathBuf,

    /// Label to match, case-insensitively.
    #[arg(long)]
    pub label: String,
}

pub fn run_filter(args: &FilterArgs, output: OutputMode) -> anyhow::Result<()> {
    let stories = load_stories(&args.snapshot, output)?;
    let rows: Vec<StoryRow> = stories
        .with_label(&args.label)
        .iter()
        .map(StoryRow::from)
        .collect();
    render_mode(output, &rows, render_text, render_pretty)
}

fn render_text(rows: &Vec<StoryRow>, w: &mut dyn Write) -> std::io::Result<()> {
    for row in rows {
        writeln!(w, "{}\t{}\t{}\t{}", row.id, row.story_type, row.state, row.name)?;
    }
    Ok(())
}

fn render_pretty(rows: &Vec<StoryRow>, w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(w, "No matching stories.")?;
        return Ok(());
    }
    for row in rows {
        writeln!(
            w,
            "#{:<10} {:<8} {:<12} {}",
            row.id, row.story_type, row.state, row.name
        )?;
    }
    Ok(())
}
