use chrono::{DateTime, Months, Utc};
use tracing::{debug, info, instrument, warn};

use super::matcher::BugMatcher;
use crate::github::{GitHubError, PullRequestSummary, PullsApi};

/// Earliest merge time still in scope: `now` minus `retention_months`.
pub fn cutoff_from(now: DateTime<Utc>, retention_months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(retention_months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Why the walker stopped requesting pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The list endpoint returned an empty page.
    Exhausted,
    /// A page started with a PR merged before the cutoff.
    Expired,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Exhausted => write!(f, "no more pull requests"),
            Termination::Expired => write!(f, "reached retention cutoff"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Fetching { page: u32 },
    Exhausted,
    Expired,
    Done(Termination),
}

/// Result of one walk over the closed pull requests.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Matching PRs in the order they were listed
    pub pulls: Vec<PullRequestSummary>,
    pub termination: Termination,
    pub pages_fetched: u32,
}

/// Walks the newest-first list of closed pull requests page by page,
/// keeping the ones the matcher accepts.
pub struct PageWalker<'a> {
    api: &'a dyn PullsApi,
    matcher: &'a BugMatcher,
    cutoff: DateTime<Utc>,
}

impl<'a> PageWalker<'a> {
    pub fn new(api: &'a dyn PullsApi, matcher: &'a BugMatcher, cutoff: DateTime<Utc>) -> Self {
        Self {
            api,
            matcher,
            cutoff,
        }
    }

    /// Request pages from `start_page` on until a page comes back empty or
    /// begins with a PR older than the cutoff. The page that crosses the
    /// cutoff is still matched in full.
    #[instrument(skip(self), fields(cutoff = %self.cutoff))]
    pub async fn walk(&self, start_page: u32, per_page: u32) -> Result<WalkOutcome, GitHubError> {
        let mut state = WalkState::Fetching { page: start_page };
        let mut pulls = Vec::new();
        let mut pages_fetched = 0;

        let termination = loop {
            state = match state {
                WalkState::Fetching { page } => {
                    let batch = self.api.list_pulls(page, per_page).await?;
                    pages_fetched += 1;
                    self.process_page(page, batch, &mut pulls)
                }
                WalkState::Exhausted => {
                    info!(matched = pulls.len(), "no pull requests any more");
                    WalkState::Done(Termination::Exhausted)
                }
                WalkState::Expired => {
                    warn!(matched = pulls.len(), cutoff = %self.cutoff, "reached retention cutoff");
                    WalkState::Done(Termination::Expired)
                }
                WalkState::Done(termination) => break termination,
            };
        };

        Ok(WalkOutcome {
            pulls,
            termination,
            pages_fetched,
        })
    }

    fn process_page(
        &self,
        page: u32,
        batch: Vec<PullRequestSummary>,
        pulls: &mut Vec<PullRequestSummary>,
    ) -> WalkState {
        let Some(first) = batch.first() else {
            return WalkState::Exhausted;
        };
        let expired = first.merge_timestamp() < self.cutoff;

        let listed = batch.len();
        let before = pulls.len();
        pulls.extend(
            batch
                .into_iter()
                .filter(|pr| self.matcher.matches(&pr.title)),
        );
        debug!(page, listed, matched = pulls.len() - before, expired, "processed page");

        if expired {
            WalkState::Expired
        } else {
            WalkState::Fetching { page: page + 1 }
        }
    }
}
