use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use jacoco_review::config::Config;
use jacoco_review::git::GitDiff;
use jacoco_review::{format_percentage, ChangedFiles, CollectedFeedback, CoverageReview, ReportOptions};

const CONFIG_FILE: &str = "jacoco.toml";

#[derive(Parser)]
#[command(name = "jacoco-review")]
#[command(about = "Check JaCoCo coverage reports against review thresholds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: jacoco.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JaCoCo XML report and print the markdown summary
    Report {
        /// Path to the JaCoCo XML report
        file: PathBuf,

        /// Base URL of the published HTML report, used for class links
        #[arg(long)]
        link_base_url: Option<String>,

        /// Fail (true) or only warn (false) when the report has no classes
        #[arg(long)]
        fail_on_no_data: Option<bool>,

        /// Only report classes whose source files changed
        #[arg(long)]
        only_new_files: bool,

        /// Modified source file (repeatable)
        #[arg(long = "modified")]
        modified: Vec<String>,

        /// Added source file (repeatable)
        #[arg(long = "added")]
        added: Vec<String>,

        /// Collect modified and added files from git relative to this reference
        #[arg(long)]
        git_base: Option<String>,

        /// Write the markdown summary to a file instead of stdout
        #[arg(long)]
        markdown_out: Option<PathBuf>,

        /// Print the verdict as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Show the required coverage resolved for class names
    Resolve {
        /// Slash separated class names, e.g. com/example/CachedRepository
        #[arg(required = true)]
        classes: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;

    match cli.command {
        Commands::Report {
            file,
            link_base_url,
            fail_on_no_data,
            only_new_files,
            modified,
            added,
            git_base,
            markdown_out,
            json,
        } => {
            let mut changes = ChangedFiles::new(modified, added);
            if let Some(base) = git_base {
                let cwd = std::env::current_dir()?;
                let from_git = GitDiff::new(&cwd)?.changed_files(&base)?;
                changes.modified.extend(from_git.modified);
                changes.added.extend(from_git.added);
            }

            let mut options = config.report_options();
            if link_base_url.is_some() {
                options.link_base_url = link_base_url;
            }
            if fail_on_no_data.is_some() {
                options.fail_on_no_data = fail_on_no_data;
            }

            let mut scope = config.scope_config()?;
            scope.only_new_files |= only_new_files;

            let review = CoverageReview::new(config.threshold_config()?, scope, changes);
            cmd_report(&review, &file, options, markdown_out, json)
        }
        Commands::Resolve { classes } => cmd_resolve(&config, &classes),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_report(
    review: &CoverageReview,
    file: &Path,
    options: ReportOptions,
    markdown_out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut feedback = CollectedFeedback::default();
    let verdict = review.report(file, options, &mut feedback)?;

    for message in &feedback.errors {
        eprintln!("{} {}", "✗".red(), message.red());
    }
    for message in &feedback.warnings {
        eprintln!("{} {}", "!".yellow(), message.yellow());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        let markdown = feedback.markdowns.join("\n");
        match markdown_out {
            Some(path) => {
                fs::write(&path, &markdown)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "\n{} Summary written to {}",
                    "📊".cyan(),
                    path.display().to_string().green()
                );
            }
            None => print!("{}", markdown),
        }
    }

    // Exit with error code if any check failed
    if !feedback.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_resolve(config: &Config, classes: &[String]) -> Result<()> {
    let thresholds = config.threshold_config()?;

    for class in classes {
        println!(
            "  {} {} {}%",
            "•".green(),
            class.cyan(),
            format_percentage(thresholds.resolve(class)).bold()
        );
    }

    Ok(())
}
