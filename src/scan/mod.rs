pub mod aggregate;
pub mod matcher;
pub mod resolver;
pub mod walker;

pub use aggregate::{aggregate, AggregatedDocument};
pub use matcher::BugMatcher;
pub use walker::{cutoff_from, Termination};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, Instrument};

use crate::github::{DecoratedFile, GitHubError, PullsApi};
use resolver::FileResolver;
use walker::PageWalker;

/// Paging parameters for one scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub start_page: u32,
    pub per_page: u32,
}

/// Everything one scan produced, kept in memory until it is written out.
#[derive(Debug)]
pub struct ScanOutcome {
    pub termination: Termination,
    pub pages_fetched: u32,
    pub pulls_matched: usize,
    pub files: Vec<DecoratedFile>,
    pub document: AggregatedDocument,
}

/// Walk the closed PRs, resolve the files of the matching ones and group
/// them by filename.
///
/// Requests are issued strictly one after another. Any request failure
/// aborts the scan.
pub async fn run(
    api: &dyn PullsApi,
    matcher: &BugMatcher,
    cutoff: DateTime<Utc>,
    settings: ScanSettings,
) -> Result<ScanOutcome, GitHubError> {
    let walk = PageWalker::new(api, matcher, cutoff)
        .walk(settings.start_page, settings.per_page)
        .instrument(info_span!("walk_pulls"))
        .await?;
    info!(
        matched = walk.pulls.len(),
        pages = walk.pages_fetched,
        stopped = %walk.termination,
        "collected matching pull requests"
    );

    let files = FileResolver::new(api)
        .resolve(&walk.pulls, settings.per_page)
        .instrument(info_span!("resolve_files"))
        .await?;
    info!(files = files.len(), "fetched files from pull requests");

    let document = aggregate(&files);

    Ok(ScanOutcome {
        termination: walk.termination,
        pages_fetched: walk.pages_fetched,
        pulls_matched: walk.pulls.len(),
        files,
        document,
    })
}
