//! Campaigner - social media campaigns from a single URL.
//!
//! Fetches a page, analyzes it, drafts a week of posts, and schedules the
//! ones the operator approves.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campaigner::pipeline::{commit, commit_posts};
use campaigner::review::{print_posts, Reviewer};
use campaigner::{
    provider_from_config, CampaignError, CampaignPost, CommitReport, CompletionProvider, Config,
    ScheduleStore, ScheduledPost, Workflow,
};

/// Turn a product announcement URL into a reviewed, scheduled week of social posts
#[derive(Parser)]
#[command(name = "campaigner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to .campaigner.toml, then the user config dir)
    #[arg(long, global = true, env = "CAMPAIGNER_CONFIG")]
    config: Option<PathBuf>,

    /// Schedule database file
    #[arg(long, global = true, env = "CAMPAIGNER_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a campaign from a URL, review it, and schedule approved posts
    Run {
        /// Page to build the campaign from (https:// is assumed)
        url: String,

        /// Approve every generated post without reviewing
        #[arg(short = 'y', long)]
        yes: bool,

        /// Write the candidate posts to a JSON file for editing instead of scheduling
        #[arg(short, long, conflicts_with = "yes")]
        export: Option<PathBuf>,
    },

    /// Schedule the approved posts from an edited JSON batch
    Commit {
        /// JSON file written by `run --export`
        file: PathBuf,
    },

    /// Fetch and analyze a page without generating posts
    Analyze {
        /// Page to analyze
        url: String,
    },

    /// List scheduled posts in date order
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("campaigner=info,warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let config = match cli.config {
        Some(ref path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    let store = ScheduleStore::new(cli.db.clone().unwrap_or_else(|| config.database_path()));

    match cli.command {
        Commands::Run { url, yes, export } => cmd_run(&config, &store, &url, yes, export.as_deref()),
        Commands::Commit { file } => cmd_commit(&store, &file),
        Commands::Analyze { url } => cmd_analyze(&config, &url),
        Commands::List { format } => cmd_list(&store, &format),
        Commands::Config { path } => cmd_config(&config, &store, path),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "campaigner", &mut io::stdout());
            Ok(())
        }
    }
}

/// Resolve the completion provider, refusing to start without a credential.
fn completion_provider(config: &Config) -> Result<std::sync::Arc<dyn CompletionProvider>> {
    provider_from_config(&config.ai).map_err(|e| match e {
        CampaignError::MissingCredential { ref variable } => anyhow::anyhow!(
            "{variable} environment variable not set.\n\
             Please create a .env file or export {variable} before running a campaign."
        ),
        other => other.into(),
    })
}

/// Operator-facing message for an aborted run.
fn abort_message(error: &CampaignError) -> String {
    let hint = match error {
        CampaignError::Fetch { .. } => "Failed to scrape the URL. Please check the URL and try again.",
        CampaignError::Analysis(_) => "Failed to analyze the content.",
        CampaignError::Generation(_) => "Failed to generate the campaign content.",
        _ => "Campaign run aborted.",
    };
    format!("{hint}\n  {error}")
}

fn cmd_run(
    config: &Config,
    store: &ScheduleStore,
    url: &str,
    yes: bool,
    export: Option<&Path>,
) -> Result<()> {
    let provider = completion_provider(config)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let workflow = Workflow::from_config(config, provider)?;

        println!("Generating campaign for {url}...\n");
        let mut session = workflow.run(url).await.map_err(|e| anyhow::anyhow!(abort_message(&e)))?;

        if let Some(ref analysis) = session.analysis {
            println!("AI Analysis\n-----------\n{analysis}\n");
        }

        println!("Generated {} posts:\n", session.posts.len());
        print_posts(&mut io::stdout(), &session.posts)?;

        if let Some(path) = export {
            let json = serde_json::to_string_pretty(&session.posts)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "\nWrote {} candidate posts to {}.\nEdit the file, then run `campaigner commit {}`.",
                session.posts.len(),
                path.display(),
                path.display()
            );
            return Ok(());
        }

        if !yes {
            println!("\nReview and approve your campaign.");
            let stdin = io::stdin();
            let summary = Reviewer::new(stdin.lock(), io::stdout()).review(&mut session.posts)?;
            println!(
                "\n{} approved, {} rejected, {} added.",
                summary.approved, summary.rejected, summary.added
            );
        }

        let (_, report) = commit(store, session).await?;
        print_report(&report);
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_commit(store: &ScheduleStore, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let posts: Vec<CampaignPost> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a campaign batch", file.display()))?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(commit_posts(store, &posts))?;
    print_report(&report);
    Ok(())
}

fn cmd_analyze(config: &Config, url: &str) -> Result<()> {
    let provider = completion_provider(config)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let workflow = Workflow::from_config(config, provider)?;
        let session = campaigner::Session::new(url);
        let session = workflow.fetch(session).await.map_err(|e| anyhow::anyhow!(abort_message(&e)))?;
        let session =
            workflow.analyze(session).await.map_err(|e| anyhow::anyhow!(abort_message(&e)))?;

        println!("{}", session.analysis.unwrap_or_default());
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_list(store: &ScheduleStore, format: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let posts = rt.block_on(async {
        store.initialize().await?;
        store.list_all().await
    })?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&posts)?),
        "text" => print_scheduled(&mut io::stdout(), &posts)?,
        other => anyhow::bail!("Unknown format '{other}' (expected text or json)"),
    }
    Ok(())
}

fn cmd_config(config: &Config, store: &ScheduleStore, path: bool) -> Result<()> {
    if path {
        match Config::active_path() {
            Some(path) => println!("{}", path.display()),
            None => {
                println!("No config file found; using defaults.");
                if let Some(global) = Config::global_config_path() {
                    println!("Create {} or ./{}", global.display(), campaigner::core::LOCAL_CONFIG_FILE);
                }
            }
        }
        return Ok(());
    }

    println!("# database: {}", store.path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_report(report: &CommitReport) {
    if report.submitted() == 0 {
        println!("No posts were approved for scheduling.");
        return;
    }

    if report.is_complete() {
        println!("Successfully scheduled {} posts!", report.scheduled.len());
    } else {
        println!("{}", report.summary());
        for skipped in &report.skipped {
            println!(
                "  skipped #{} ({} on {}): {}",
                skipped.index + 1,
                skipped.post.platform,
                skipped.post.scheduled_date,
                skipped.reason
            );
        }
    }
}

fn print_scheduled<W: Write>(output: &mut W, posts: &[ScheduledPost]) -> io::Result<()> {
    if posts.is_empty() {
        writeln!(output, "No posts are currently scheduled.")?;
        return Ok(());
    }

    writeln!(output, "{:<5} {:<10} {:<10} {:<10} Content", "ID", "Date", "Platform", "Status")?;
    for post in posts {
        let content: String = post.content.replace('\n', " ").chars().take(70).collect();
        writeln!(
            output,
            "{:<5} {:<10} {:<10} {:<10} {content}",
            post.id,
            post.scheduled_date,
            post.platform.name(),
            post.status
        )?;
    }
    Ok(())
}
