//! `storysync vocab` — list the issue label vocabulary.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use storysync_core::IssueLabel;

use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct VocabArgs {}

#[derive(Debug, Serialize)]
pub struct VocabRow {
    pub name: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    pub derived: bool,
}

impl From<IssueLabel> for VocabRow {
    fn from(label: IssueLabel) -> Self {
        let kind = if label.is_status() {
            "status"
        } else if label.is_derived() {
            "type"
        } else {
            "manual"
        };
        Self {
            name: label.as_str(),
            kind,
            color: label.color(),
            derived: label.is_derived(),
        }
    }
}

pub fn run_vocab(_args: &VocabArgs, output: OutputMode) -> anyhow::Result<()> {
    let rows: Vec<VocabRow> = IssueLabel::ALL.into_iter().map(VocabRow::from).collect();
    render_mode(output, &rows, render_text, render_pretty)
}

fn render_text(rows: &Vec<VocabRow>, w: &mut dyn Write) -> std::io::Result<()> {
    for row in rows {
        writeln!(w, "{}\t{}\t{}", row.name, row.kind, row.color.unwrap_or("-"))?;
    }
    Ok(())
}

fn render_pretty(rows: &Vec<VocabRow>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Issue labels")?;
    for row in rows {
        let color = row.color.map_or_else(|| "tracker default".to_string(), |c| format!("#{c}"));
        writeln!(w, "  {:<12} {:<7} {}", row.name, row.kind, color)?;
    }
    Ok(())
}
