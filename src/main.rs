mod config;
mod github;
mod report;
mod scan;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Hotspots — walks the recently merged pull requests of a GitHub
/// repository, keeps the ones fixing tracked bugs, and maps every file they
/// touched to the titles of those pull requests.
#[derive(Parser, Debug)]
#[command(name = "pr-hotspots", version, about)]
struct Cli {
    /// Repository as owner/name or https://github.com/owner/name
    ///
    /// Defaults to github.owner/github.repo from the config file or
    /// GITHUB_OWNER/GITHUB_REPO.
    #[arg(long)]
    repo: Option<String>,

    /// Config file (default: .pr-hotspots.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File with one tracked bug id per line
    #[arg(long)]
    bugs: Option<PathBuf>,

    /// Output JSON file (default: output.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page size for both list endpoints (1-100)
    #[arg(long)]
    per_page: Option<u32>,

    /// First page of pull requests to request
    #[arg(long)]
    start_page: Option<u32>,

    /// Ignore pull requests merged more than this many months ago
    #[arg(long)]
    retention_months: Option<u32>,

    /// Number of most touched files to print
    #[arg(long, default_value_t = 10)]
    top: usize,
}

impl Cli {
    /// Flags take precedence over the config file and environment.
    fn apply(&self, config: &mut config::Config) -> Result<(), github::GitHubError> {
        if let Some(repo) = &self.repo {
            let slug = github::parse_repo(repo)?;
            config.github.owner = Some(slug.owner);
            config.github.repo = Some(slug.repo);
        }
        if let Some(bugs) = &self.bugs {
            config.bugs.file = Some(bugs.clone());
        }
        if let Some(output) = &self.output {
            config.scan.output = output.clone();
        }
        if let Some(per_page) = self.per_page {
            config.scan.per_page = per_page;
        }
        if let Some(start_page) = self.start_page {
            config.scan.start_page = start_page;
        }
        if let Some(months) = self.retention_months {
            config.scan.retention_months = months;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    config.validate()?;

    let repo = config.repository()?;
    let token = config.github_token()?;
    let bug_ids = config.bug_ids()?;
    let matcher = scan::BugMatcher::new(config.bugs.prefix.as_deref(), bug_ids)?;
    let cutoff = scan::cutoff_from(chrono::Utc::now(), config.scan.retention_months);
    debug!(known_ids = matcher.known_ids(), %cutoff, "prepared bug matcher");

    let _main_span = info_span!("pr_hotspots", repo = %repo).entered();

    let mut client = github::GitHubClient::new(repo.clone(), token)?;
    if let Some(api_url) = &config.github.api_url {
        client = client.with_base_url(api_url.as_str());
    }

    let user = client.authenticated_user().await?;
    report::greet(&user.login);

    info!("running scan");
    let settings = scan::ScanSettings {
        start_page: config.scan.start_page,
        per_page: config.scan.per_page,
    };
    let outcome = scan::run(&client, &matcher, cutoff, settings).await?;

    info!(path = %config.scan.output.display(), "writing document");
    report::write_document(&outcome.document, &config.scan.output)?;

    let summary = report::build_summary(&repo, &outcome, cli.top);
    report::print_summary(&summary, &config.scan.output);
    info!(files = outcome.files.len(), pulls = outcome.pulls_matched, "done");

    Ok(())
}
