use tracing::{debug, info, instrument};

use crate::github::{DecoratedFile, FileChange, GitHubError, PullRequestSummary, PullsApi};

/// Fetches the changed files of each matched pull request, one PR at a time.
pub struct FileResolver<'a> {
    api: &'a dyn PullsApi,
}

impl<'a> FileResolver<'a> {
    pub fn new(api: &'a dyn PullsApi) -> Self {
        Self { api }
    }

    /// Decorate every file of every PR with its owning PR.
    ///
    /// Output order follows `pulls`, then the API's file order within each PR.
    #[instrument(skip(self, pulls), fields(pulls = pulls.len()))]
    pub async fn resolve(
        &self,
        pulls: &[PullRequestSummary],
        per_page: u32,
    ) -> Result<Vec<DecoratedFile>, GitHubError> {
        let mut decorated = Vec::new();
        for pr in pulls {
            let files = self.fetch_all_files(pr.number, per_page).await?;
            let count = files.len();
            decorated.extend(
                files
                    .into_iter()
                    .map(|file| DecoratedFile::new(file, pr.clone())),
            );
            info!(pr = pr.number, files = count, total = decorated.len(), "pulled files");
        }
        Ok(decorated)
    }

    /// Follow the file list of one PR until a short page comes back.
    async fn fetch_all_files(
        &self,
        number: u64,
        per_page: u32,
    ) -> Result<Vec<FileChange>, GitHubError> {
        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.api.list_files(number, page, per_page).await?;
            let received = batch.len();
            files.extend(batch);
            debug!(pr = number, page, received, "file page");
            if received == 0 || received < per_page as usize {
                break;
            }
            page += 1;
        }
        Ok(files)
    }
}
