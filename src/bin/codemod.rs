//! CLI for running codemods.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use codemod_runner::{diff, lang};
use codemod_runner::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codemod")]
#[command(author, version, about = "Run codemods across repositories and open pull requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the codemods of a configuration file
    Run {
        /// Path to the YAML configuration
        config: PathBuf,

        /// Transform without writing files or publishing
        #[arg(long)]
        dry_run: bool,

        /// Overrides the configured workspace
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Apply one find-and-replace stage to a local directory
    Apply {
        /// Directory to transform
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Language to parse files as (e.g., "typescript", "rust")
        #[arg(short, long)]
        language: String,

        /// Tree-sitter query pattern
        #[arg(short, long)]
        query: String,

        /// Replacement text; may reference meta-variables
        #[arg(short, long)]
        replace: String,

        /// Meta-variable pattern matched against each node
        #[arg(short, long)]
        pattern: Option<String>,

        /// Only replace nodes bound to this capture
        #[arg(short, long)]
        capture: Option<String>,

        /// Preview changes without applying
        #[arg(long)]
        dry_run: bool,
    },

    /// Show supported languages
    Languages,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            dry_run,
            workspace,
        } => cmd_run(config, dry_run, workspace),
        Commands::Apply {
            path,
            language,
            query,
            replace,
            pattern,
            capture,
            dry_run,
        } => {
            let mut rule = Rule::new(query);
            if let Some(pattern) = pattern {
                rule = rule.pattern(pattern);
            }
            if let Some(capture) = capture {
                rule = rule.capture(capture);
            }
            cmd_apply(path, language, rule, replace, dry_run)
        }
        Commands::Languages => cmd_languages(),
    }
}

fn cmd_run(config_path: PathBuf, dry_run: bool, workspace: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::from_yaml(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let codemods = config.runner_codemods().context("Invalid codemod configuration")?;

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    let hosting = config
        .hosting(Arc::clone(&runner))
        .context("Failed to set up hosting")?;

    let mut orchestrator = CodemodRunner::new(
        workspace.unwrap_or_else(|| config.workspace()),
        config.repositories.clone(),
    )
    .runner(runner)
    .hosting(hosting);
    if dry_run {
        orchestrator = orchestrator.dry_run();
    }

    let outcomes = orchestrator.run(&codemods);

    let mut failed = 0;
    for (name, outcome) in &outcomes {
        if let Some(error) = &outcome.error {
            println!("{name}: failed: {error}");
            failed += 1;
            continue;
        }
        let (success, failure) = group_results(outcome.results.iter().map(|r| r.as_ref()));
        let changed = success.iter().filter(|r| r.has_changes).count();
        println!("{name}: {changed} file(s) changed, {} failed", failure.len());

        if dry_run {
            let owned: Vec<RunCodemodOkResult> = success.into_iter().cloned().collect();
            print!("{}", diff::results_diff(&owned, true));
            println!("{}", DiffSummary::from_results(&owned));
        }
        for publication in &outcome.publications {
            match &publication.outcome {
                PublishOutcome::PullRequestCreated { url } => println!("  {}: {url}", publication.repository),
                PublishOutcome::AlreadyOpen => {
                    println!("  {}: pull request already open", publication.repository)
                }
                PublishOutcome::CommitFailed(e) | PublishOutcome::PushFailed(e) => {
                    println!("  {}: {e}", publication.repository)
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} codemod(s) failed");
    }
    Ok(())
}

fn cmd_apply(path: PathBuf, language: String, rule: Rule, replace: String, dry_run: bool) -> Result<()> {
    if lang::lookup(&language).is_none() {
        bail!("Unsupported language '{language}'; run `codemod languages` for the list");
    }

    let codemod = Codemod::from_stages(
        "apply",
        [language],
        vec![FindAndReplaceConfig::new(rule, replace)],
    );
    let options = RunCodemodOptions::new().dry(dry_run);
    let results = run_codemod(&codemod, &path, &options).context("Codemod failed")?;

    let (success, failure) = group_results(results);
    for error in &failure {
        eprintln!("error: {error}");
    }

    if dry_run {
        println!("{}", diff::results_diff(&success, true));
        println!("\n{}", DiffSummary::from_results(&success));
    } else {
        println!(
            "Modified {} file(s)",
            success.iter().filter(|r| r.has_changes).count()
        );
    }

    Ok(())
}

fn cmd_languages() -> Result<()> {
    println!("Supported languages:");
    for language in lang::all() {
        let aliases = if language.aliases().is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", language.aliases().join(", "))
        };
        println!(
            "  {}{} (extensions: {})",
            language.name(),
            aliases,
            language.extensions().join(", ")
        );
    }
    Ok(())
}
