#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use storysync_core::config::resolve_config;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "storysync: dedupe tracker stories and derive issue labels",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json`, `FORMAT`, and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Project config file (default: .storysync/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Stories",
        about = "Report duplicate stories",
        long_about = "Fold stories with identical name, description, and labels into the oldest copy.",
        after_help = "EXAMPLES:\n    # Report duplicates in a snapshot\n    storysync dedupe stories.json\n\n    # Read the snapshot from stdin\n    cat stories.json | storysync dedupe -\n\n    # Emit machine-readable output\n    storysync dedupe stories.json --json"
    )]
    Dedupe(cmd::dedupe::DedupeArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Derive labels for linked issues",
        long_about = "Dedupe stories, group them by linked issue, and derive the labels each issue should carry.",
        after_help = "EXAMPLES:\n    # Labels for every linked issue\n    storysync labels stories.json\n\n    # One issue only\n    storysync labels stories.json --issue acme/web#12\n\n    # Keep duplicates\n    storysync labels stories.json --no-dedupe --json"
    )]
    Labels(cmd::labels::LabelsArgs),

    #[command(
        next_help_heading = "Stories",
        about = "List stories carrying a label",
        long_about = "List stories with a given label; matching ignores case.",
        after_help = "EXAMPLES:\n    # Stories labeled backend\n    storysync filter stories.json --label backend"
    )]
    Filter(cmd::filter::FilterArgs),

    #[command(
        next_help_heading = "Issues",
        about = "List the issue label vocabulary",
        after_help = "EXAMPLES:\n    # Show label names and colors\n    storysync vocab"
    )]
    Vocab(cmd::vocab::VocabArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("STORYSYNC_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "storysync=debug,storysync_core=debug,info"
        } else {
            "storysync=info,storysync_core=info,warn"
        })
    });

    let format = env::var("STORYSYNC_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let config = resolve_config(&project_root, cli.config.as_deref(), cli.json)?;
    let output = cli
        .format
        .unwrap_or_else(|| OutputMode::from_resolved(&config.resolved_output));
    debug!(?output, "resolved output mode");

    match cli.command {
        Commands::Dedupe(ref args) => cmd::dedupe::run_dedupe(args, output),
        Commands::Labels(ref args) => cmd::labels::run_labels(args, &config.project, output),
        Commands::Filter(ref args) => cmd::filter::run_filter(args, output),
        Commands::Vocab(ref args) => cmd::vocab::run_vocab(args, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["storysync", "labels", "s.json", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Labels(_)));
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["storysync", "--format", "text", "vocab"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn labels_flags_parse() {
        let cli = Cli::parse_from([
            "storysync",
            "labels",
            "stories.json",
            "--no-dedupe",
            "--issue",
            "acme/web#1",
            "--include-unlinked",
        ]);
        let Commands::Labels(args) = cli.command else {
            panic!("expected labels command");
        };
        assert!(args.no_dedupe);
        assert!(args.include_unlinked);
        assert_eq!(args.issue.as_deref(), Some("acme/web#1"));
        assert_eq!(args.snapshot, PathBuf::from("stories.json"));
    }

    #[test]
    fn filter_requires_label() {
        assert!(Cli::try_parse_from(["storysync", "filter", "s.json"]).is_err());
        let cli = Cli::parse_from(["storysync", "filter", "s.json", "--label", "ui"]);
        assert!(matches!(cli.command, Commands::Filter(_)));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["storysync", "dedupe", "s.json", "--config", "c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(!cli.verbose);
    }
}
