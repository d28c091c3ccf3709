//! `postman` - fetch the RealWorld API collection and run it with Newman

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use realworld_postman::{require, NewmanOutcome, NewmanRun, PostmanClient};

#[derive(Parser)]
#[command(name = "postman")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Postman API key
    #[arg(long, env = "POSTMAN_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Postman API root
    #[arg(long, env = "POSTMAN_API_URL", default_value = realworld_postman::DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Collection UID
    #[arg(long, env = "COLLECTION_UID", global = true)]
    collection_uid: Option<String>,

    /// Environment UID
    #[arg(long, env = "ENVIRONMENT_UID", global = true)]
    environment_uid: Option<String>,

    /// Where the collection JSON lives
    #[arg(long, env = "COLLECTION_PATH", global = true)]
    collection_path: Option<String>,

    /// Where the environment JSON lives
    #[arg(long, env = "ENVIRONMENT_PATH", global = true)]
    environment_path: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the collection to COLLECTION_PATH
    FetchCollection,

    /// Download the environment (enabled variables only) to ENVIRONMENT_PATH
    FetchEnvironment,

    /// Run the collection with newman
    Run(RunArgs),

    /// Fetch both files, then run
    All {
        /// Do not pause for confirmation between fetching and running
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Newman executable
    #[arg(long, env = "NEWMAN_BIN", default_value = "newman")]
    newman: PathBuf,

    /// Report directory
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Commands::FetchCollection => fetch_collection(&cli).await?,
        Commands::FetchEnvironment => fetch_environment(&cli).await?,
        Commands::Run(args) => {
            let outcome = run_newman(&cli, args).await?;
            finish(outcome);
        }
        Commands::All { yes, run } => {
            // Validate everything before the first request
            newman_run(&cli, run)?;

            println!("\n📥 [1] Fetching collection...");
            fetch_collection(&cli).await?;
            println!("\n📥 [2] Fetching environment...");
            fetch_environment(&cli).await?;

            if !yes {
                confirm()?;
            }

            println!("\n🧪 [3] Running newman...");
            let outcome = run_newman(&cli, run).await?;
            finish(outcome);
        }
    }

    Ok(())
}

async fn fetch_collection(cli: &Cli) -> anyhow::Result<()> {
    let api_key = require(&cli.api_key, "POSTMAN_API_KEY")?;
    let uid = require(&cli.collection_uid, "COLLECTION_UID")?;
    let path = require(&cli.collection_path, "COLLECTION_PATH")?;

    let client = PostmanClient::with_base_url(&cli.api_url, api_key)?;
    let saved = client.fetch_collection(uid, Path::new(path)).await?;
    println!("✔️  Collection saved: {}", saved.display());
    Ok(())
}

async fn fetch_environment(cli: &Cli) -> anyhow::Result<()> {
    let api_key = require(&cli.api_key, "POSTMAN_API_KEY")?;
    let uid = require(&cli.environment_uid, "ENVIRONMENT_UID")?;
    let path = require(&cli.environment_path, "ENVIRONMENT_PATH")?;

    let client = PostmanClient::with_base_url(&cli.api_url, api_key)?;
    let saved = client.fetch_environment(uid, Path::new(path)).await?;
    println!("✔️  Environment saved: {}", saved.display());
    Ok(())
}

fn newman_run(cli: &Cli, args: &RunArgs) -> anyhow::Result<NewmanRun> {
    let collection = require(&cli.collection_path, "COLLECTION_PATH")?;
    let environment = require(&cli.environment_path, "ENVIRONMENT_PATH")?;
    if matches!(cli.command, Commands::All { .. }) {
        require(&cli.api_key, "POSTMAN_API_KEY")?;
        require(&cli.collection_uid, "COLLECTION_UID")?;
        require(&cli.environment_uid, "ENVIRONMENT_UID")?;
    }

    Ok(NewmanRun {
        program: args.newman.clone(),
        report_dir: args.report_dir.clone(),
        ..NewmanRun::new(collection, environment)
    })
}

async fn run_newman(cli: &Cli, args: &RunArgs) -> anyhow::Result<NewmanOutcome> {
    let run = newman_run(cli, args)?;
    info!("Collection: {}", run.collection.display());
    info!("Environment: {}", run.environment.display());
    Ok(run.execute().await?)
}

fn confirm() -> anyhow::Result<()> {
    print!("\n✅ Check both files, then press Enter to continue...");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Print the summary and exit with newman's status on failure.
fn finish(outcome: NewmanOutcome) {
    let summary = outcome.summary;
    if outcome.success() {
        println!("✅ Newman: all {} requests passed", summary.total);
        return;
    }

    println!("\n📊 Newman summary");
    println!("  Requests : {}", summary.total);
    println!("  Passed   : {}", summary.passed());
    println!("  Failed   : {}", summary.failures);
    std::process::exit(if outcome.code == 0 { 1 } else { outcome.code });
}
